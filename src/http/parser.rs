use nom::bytes::complete::take_till1;
use nom::character::complete::char;
use nom::combinator::all_consuming;
use nom::sequence::{preceded, tuple};
use nom::IResult;
use thiserror::Error;

use crate::http::types::HttpMethod;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty request")]
    Empty,
    #[error("request line is not valid UTF-8")]
    InvalidUtf8,
    #[error("malformed HTTP request line: '{0}'")]
    MalformedRequestLine(String),
}

/// The first line of a request. Headers and body are never looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: HttpMethod,
    pub target: String,
    pub version: String,
}

fn token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c == ' ')(input)
}

/// Exactly three non-empty fields separated by single spaces
fn request_line(input: &str) -> IResult<&str, (&str, &str, &str)> {
    all_consuming(tuple((
        token,
        preceded(char(' '), token),
        preceded(char(' '), token),
    )))(input)
}

/// Extract the first line of `raw`, without its line terminator.
///
/// Leading whitespace (including blank lines) is skipped. A buffer with no
/// `\n` at all is taken as one line.
fn first_line(raw: &[u8]) -> &[u8] {
    let start = raw
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(raw.len());
    let rest = &raw[start..];
    let line = match rest.iter().position(|&b| b == b'\n') {
        Some(end) => &rest[..end],
        None => rest,
    };
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse the request line out of a raw request buffer
pub fn parse_request_line(raw: &[u8]) -> Result<RequestLine, ParseError> {
    let line = first_line(raw);
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidUtf8)?;
    let (_, (method, target, version)) =
        request_line(line).map_err(|_| ParseError::MalformedRequestLine(line.to_string()))?;

    Ok(RequestLine {
        method: HttpMethod::from(method),
        target: target.to_string(),
        version: version.to_string(),
    })
}
