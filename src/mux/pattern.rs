//! Registration patterns: `[METHOD ]/path/{param}/{rest...}`.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use crate::parser::Method;
use crate::server::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Rest(String),
}

impl Segment {
    /// Literal beats `{name}` beats `{name...}`.
    fn weight(&self) -> u8 {
        match self {
            Segment::Literal(_) => 2,
            Segment::Param(_) => 1,
            Segment::Rest(_) => 0,
        }
    }
}

/// A parsed registration pattern.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    pub(crate) raw: String,
    pub(crate) method: Option<Method>,
    segments: Vec<Segment>,
    /// The path ended in `/`: matches everything below it.
    subtree: bool,
}

impl Pattern {
    pub(crate) fn parse(raw: &str) -> Result<Self, Error> {
        let invalid = |reason: &str| Error::InvalidPattern(raw.to_string(), reason.to_string());

        let (method, path) = match raw.split_once(' ') {
            Some((method, path)) => {
                let method = match method {
                    "" => None,
                    token => Some(Method::from_str(token).map_err(|_| invalid("unknown method"))?),
                };
                (method, path.trim_start())
            }
            None => (None, raw),
        };

        if path.is_empty() {
            return Err(invalid("empty path"));
        }
        let Some(rest) = path.strip_prefix('/') else {
            return Err(invalid("path must start with '/'"));
        };

        let (rest, subtree) = match rest.strip_suffix('/') {
            Some(stripped) => (stripped, true),
            None => (rest, rest.is_empty()),
        };

        let mut segments = Vec::new();
        let mut names = HashSet::new();
        if !rest.is_empty() {
            let parts: Vec<&str> = rest.split('/').collect();
            for (i, part) in parts.iter().enumerate() {
                let segment = parse_segment(part).map_err(|reason| invalid(reason))?;
                if let Segment::Param(name) | Segment::Rest(name) = &segment {
                    if !names.insert(name.clone()) {
                        return Err(invalid("duplicate parameter name"));
                    }
                }
                if matches!(segment, Segment::Rest(_)) && (i + 1 != parts.len() || subtree) {
                    return Err(invalid("{name...} must be the last segment"));
                }
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            method,
            segments,
            subtree,
        })
    }

    /// Same method and same shape, ignoring parameter names.
    pub(crate) fn conflicts_with(&self, other: &Pattern) -> bool {
        self.method == other.method
            && self.subtree == other.subtree
            && self.segments.len() == other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| match (a, b) {
                (Segment::Literal(a), Segment::Literal(b)) => a == b,
                (Segment::Param(_), Segment::Param(_)) | (Segment::Rest(_), Segment::Rest(_)) => true,
                _ => false,
            })
    }

    /// Sort key for path specificity; greater is more specific.
    ///
    /// Exact patterns outrank subtree patterns. After that segments are
    /// compared in order by weight, and a longer pattern outranks its prefix.
    pub(crate) fn specificity(&self) -> (bool, Vec<u8>) {
        (!self.subtree, self.segments.iter().map(Segment::weight).collect())
    }

    /// Match a request path, returning the captured parameters.
    pub(crate) fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let parts: Vec<&str> = path.split('/').collect();

        let mut params = HashMap::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest(name) => {
                    let rest = parts.get(i..).filter(|rest| !rest.is_empty())?;
                    params.insert(name.clone(), rest.join("/"));
                    return Some(params);
                }
                Segment::Literal(literal) => {
                    if parts.get(i) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => match parts.get(i) {
                    Some(value) if !value.is_empty() => {
                        params.insert(name.clone(), value.to_string());
                    }
                    _ => return None,
                },
            }
        }

        let matched = if self.subtree {
            self.segments.is_empty() || parts.len() > self.segments.len()
        } else {
            parts.len() == self.segments.len()
        };
        matched.then_some(params)
    }
}

fn parse_segment(part: &str) -> Result<Segment, &'static str> {
    let Some(inner) = part.strip_prefix('{') else {
        if part.contains(['{', '}']) {
            return Err("a wildcard must be a whole segment");
        }
        return Ok(Segment::Literal(part.to_string()));
    };
    let inner = inner.strip_suffix('}').ok_or("unbalanced '{'")?;
    if inner.contains(['{', '}']) {
        return Err("unbalanced '{'");
    }

    match inner.strip_suffix("...") {
        Some("") => Err("empty wildcard name"),
        Some(name) => Ok(Segment::Rest(name.to_string())),
        None if inner.is_empty() => Err("empty wildcard name"),
        None => Ok(Segment::Param(inner.to_string())),
    }
}
