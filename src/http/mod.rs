pub mod types;
pub mod parser;

pub use types::{HttpMethod, HttpResponse, HttpHeaders, StatusCode};
pub use parser::{parse_request_line, ParseError, RequestLine};
