use std::fmt;

pub const HTTP_VERSION: &str = "HTTP/1.1";

/// HTTP request methods.
///
/// Method tokens are case-sensitive. Anything that is not a registered
/// method is kept verbatim in `Other` so it can still be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Connect,
    Trace,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Other(token) => token,
        }
    }
}

impl From<&str> for HttpMethod {
    fn from(s: &str) -> Self {
        match s {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            "OPTIONS" => HttpMethod::Options,
            "CONNECT" => HttpMethod::Connect,
            "TRACE" => HttpMethod::Trace,
            other => HttpMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status codes this server can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    MovedPermanently,
    BadRequest,
    NotFound,
    MethodNotAllowed,
}

impl StatusCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::MovedPermanently => 301,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Response headers - insertion ordered, case-insensitive key lookup.
///
/// Names keep the casing they were inserted with so the wire output reads
/// `Content-Type`, not `content-type`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    headers: Vec<(String, String)>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        HttpHeaders {
            headers: Vec::new(),
        }
    }

    /// Add a header, replacing the value of an existing one in place
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
    }

    /// Get a header value (case-insensitive)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Headers in the order they were inserted
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

/// HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Build a response. `Content-Length` is always derived from `body`,
    /// overriding whatever the caller put in `headers`.
    pub fn new(status: StatusCode, mut headers: HttpHeaders, body: Vec<u8>) -> Self {
        headers.insert("Content-Length", body.len().to_string());
        HttpResponse {
            status,
            headers,
            body,
        }
    }

    pub fn ok(content_type: &str, body: Vec<u8>) -> Self {
        let mut headers = HttpHeaders::new();
        headers.insert("Content-Type", content_type);
        Self::new(StatusCode::Ok, headers, body)
    }

    pub fn moved_permanently(location: &str) -> Self {
        let mut headers = HttpHeaders::new();
        headers.insert("Location", location);
        Self::new(StatusCode::MovedPermanently, headers, Vec::new())
    }

    pub fn not_found() -> Self {
        Self::empty(StatusCode::NotFound)
    }

    pub fn bad_request() -> Self {
        Self::empty(StatusCode::BadRequest)
    }

    pub fn method_not_allowed() -> Self {
        let mut headers = HttpHeaders::new();
        headers.insert("Content-Type", "text/html");
        headers.insert("Allow", "GET");
        Self::new(StatusCode::MethodNotAllowed, headers, Vec::new())
    }

    /// Error responses carry a declared but empty html body
    fn empty(status: StatusCode) -> Self {
        let mut headers = HttpHeaders::new();
        headers.insert("Content-Type", "text/html");
        Self::new(status, headers, Vec::new())
    }

    /// Format the status line and headers as bytes
    pub fn serialize(&self) -> Vec<u8> {
        let mut result = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            self.status.as_u16(),
            self.status.reason_phrase()
        );

        for (key, value) in self.headers.iter() {
            result.push_str(&format!("{}: {}\r\n", key, value));
        }

        result.push_str("\r\n");
        result.into_bytes()
    }

    /// Combine headers and body into complete response
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut response = self.serialize();
        response.extend_from_slice(&self.body);
        response
    }
}
