//! `Content-Type` values.

/// Lower-cased `type/subtype` of a media type, or `None` if it is malformed.
///
/// Parameters must be `name=value` pairs; their values are not checked.
pub(crate) fn parse_media_type(value: &str) -> Option<String> {
    let mut parts = value.split(';');
    let essence = parts.next()?.trim();

    let (kind, subtype) = essence.split_once('/')?;
    if !is_token(kind) || !is_token(subtype) {
        return None;
    }

    for param in parts.map(str::trim).filter(|p| !p.is_empty()) {
        let (name, _) = param.split_once('=')?;
        if !is_token(name.trim()) {
            return None;
        }
    }

    Some(essence.to_ascii_lowercase())
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}
