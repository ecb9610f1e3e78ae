use crate::http::date::{format_http_date, http_date_now};
use crate::resource::Resource;

pub const HTTP_VERSION: &str = "HTTP/1.0";

/// HTTP status codes the server answers with.
///
/// - `Ok` (200): Resource sent
/// - `NotModified` (304): Conditional GET short-circuit
/// - `BadRequest` (400): Unsupported method
/// - `NotFound` (404): Resource not found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 304 Not Modified
    NotModified,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use ficserver::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotModified.as_u16(), 304);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }

    /// `HTTP/1.0 200 OK` style status line, without terminator.
    pub fn status_line(&self) -> String {
        format!("{} {} {}", HTTP_VERSION, self.as_u16(), self.reason_phrase())
    }
}

/// Status line plus headers, in the order they go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Serializes the head, terminated by the blank line.
    pub fn header_block(&self) -> String {
        let mut block = self.status.status_line();
        block.push_str("\r\n");

        for (k, v) in &self.headers {
            block.push_str(k);
            block.push_str(": ");
            block.push_str(v);
            block.push_str("\r\n");
        }

        block.push_str("\r\n");
        block
    }
}

/// Builder for response heads.
///
/// `Date` and `Server` always come first. Resource headers follow only when
/// a resource is attached.
///
/// # Example
///
/// ```ignore
/// let head = ResponseBuilder::new(StatusCode::Ok, "ficServer/0.0.1 (Rust)")
///     .resource(&resource)
///     .build();
/// ```
pub struct ResponseBuilder<'a> {
    status: StatusCode,
    server: String,
    date: Option<String>,
    resource: Option<&'a Resource>,
}

impl<'a> ResponseBuilder<'a> {
    pub fn new(status: StatusCode, server: impl Into<String>) -> Self {
        Self {
            status,
            server: server.into(),
            date: None,
            resource: None,
        }
    }

    /// Pins the `Date` value; the current time is used otherwise.
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Adds `Last-Modified`, `Content-Length` and `Content-Type` from the
    /// resource metadata.
    pub fn resource(mut self, resource: &'a Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn build(self) -> ResponseHead {
        let mut headers = vec![
            ("Date".to_string(), self.date.unwrap_or_else(http_date_now)),
            ("Server".to_string(), self.server),
        ];

        if let Some(resource) = self.resource {
            if let Some(modified) = resource.modified {
                headers.push(("Last-Modified".to_string(), format_http_date(modified)));
            }
            headers.push(("Content-Length".to_string(), resource.length.to_string()));
            if let Some(content_type) = &resource.content_type {
                headers.push(("Content-Type".to_string(), content_type.clone()));
            }
        }

        ResponseHead {
            status: self.status,
            headers,
        }
    }
}
