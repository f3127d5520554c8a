//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;
use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::media_type::parse_media_type;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request as seen by handlers and middlewares.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path, without the query string
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers, keyed as received
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
    /// Query parameters parsed from the request target
    pub query_params: HashMap<String, String>,
    /// Path parameters captured by the multiplexer, e.g. `{id}`
    pub params: HashMap<String, String>,
}

impl HttpRequest {
    /// Create a request for `target`, which may carry a query string.
    ///
    /// The version defaults to HTTP/1.1 and headers and body start empty.
    pub fn new(method: Method, target: impl AsRef<str>) -> Self {
        let target = target.as_ref();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        let query_params = query
            .map(|query| query
                .split('&')
                .filter(|s| !s.is_empty())
                .map(|pair| match pair.split_once('=') {
                    Some((k, v)) => (k.to_string(), v.to_string()),
                    None => (pair.to_string(), String::new()),
                })
                .collect())
            .unwrap_or_default();

        Self {
            method,
            path: path.to_string(),
            version: HttpVersion::default(),
            headers: HashMap::new(),
            body: Vec::new(),
            query_params,
            params: HashMap::new(),
        }
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Insert a header, replacing any existing one with the same name regardless of case.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// Get a header value. Header names are matched case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v))
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// Get a path parameter captured by the multiplexer.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Check if the Content-Type header announces a JSON body.
    ///
    /// The media type is compared case-insensitively and parameters such as
    /// `charset` are ignored.
    pub fn is_json(&self) -> bool {
        self.get_header("Content-Type")
            .and_then(|content_type| parse_media_type(content_type))
            .is_some_and(|media_type| media_type == "application/json")
    }

    /// Parse the request body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Parse an HTTP/1.x request from a byte slice.
///
/// The header section must be valid UTF-8. When a `Content-Length` header is
/// present, exactly that many bytes after the blank line become the body;
/// otherwise the body is empty.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let (head, rest) = split_head(input);
    let head = std::str::from_utf8(head)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    let mut lines = head.lines();
    let request_line = lines.next().filter(|l| !l.trim().is_empty()).ok_or(Error::EmptyRequest)?;

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let [method, target, version] = parts[..] else {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    };

    let method = Method::from_str(method)?;
    if !target.starts_with('/') {
        return Err(Error::InvalidPath(target.to_string()));
    }
    let version = HttpVersion::from_str(version)?;

    let mut request = HttpRequest::new(method, target);
    request.version = version;

    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| Error::InvalidHeaderFormat(line.to_string()))?;
        request.headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    if version == HttpVersion::Http11 && !request.has_header("Host") {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    if let Some(length) = request.get_header("Content-Length") {
        let length: usize = length
            .parse()
            .map_err(|_| Error::InvalidContentLength(length.clone()))?;
        if length > rest.len() {
            return Err(Error::InvalidContentLength(format!(
                "expected {length} bytes, received {received}",
                received = rest.len()
            )));
        }
        request.body = rest[..length].to_vec();
    }

    Ok(request)
}

/// Total length of the request starting at `input`, once its head is complete.
///
/// Returns `None` while the blank line ending the header section has not
/// arrived yet. The body length comes from `Content-Length`; a missing or
/// unparseable value counts as no body and is reported by [`parse_request`].
pub fn request_len(input: &[u8]) -> Option<usize> {
    let body_start = body_start(input)?;
    let head = String::from_utf8_lossy(&input[..body_start]);
    let content_length = head
        .lines()
        .skip(1)
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("Content-Length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    Some(body_start.saturating_add(content_length))
}

/// Offset of the first body byte, just past the blank line ending the head.
fn body_start(input: &[u8]) -> Option<usize> {
    let crlf = input.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| pos + 4);
    let lf = input.windows(2).position(|w| w == b"\n\n").map(|pos| pos + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Split raw bytes at the blank line ending the header section.
fn split_head(input: &[u8]) -> (&[u8], &[u8]) {
    match body_start(input) {
        Some(start) => {
            let head = input[..start].strip_suffix(b"\r\n\r\n").or_else(|| input[..start].strip_suffix(b"\n\n"));
            (head.unwrap_or(&input[..start]), &input[start..])
        }
        None => (input, &[]),
    }
}
