use std::fmt;

use crate::http::request::Method;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing but spaces on the request line
    EmptyLine,
    /// A method token with no target after it
    MissingTarget,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyLine => f.write_str("empty request line"),
            ParseError::MissingTarget => f.write_str("request line has no target"),
        }
    }
}

impl std::error::Error for ParseError {}

/// First line of a request, before any header has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub target: String,
    pub version: Option<String>,
}

/// Splits `METHOD SP TARGET SP VERSION` on single spaces.
///
/// Empty tokens at the end of the line are dropped; empty tokens in between
/// are kept, so `"GET  /x"` yields an empty target.
pub fn parse_request_line(line: &str) -> Result<RequestLine, ParseError> {
    let mut parts: Vec<&str> = line.split(' ').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }

    match parts.as_slice() {
        [] => Err(ParseError::EmptyLine),
        [_] => Err(ParseError::MissingTarget),
        [method, target, rest @ ..] => Ok(RequestLine {
            method: Method::from_token(method),
            target: target.to_string(),
            version: rest.first().map(|v| v.to_string()),
        }),
    }
}

/// Splits a header line on the first `": "`. Lines without it are not headers.
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}
