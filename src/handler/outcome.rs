use std::io;
use std::path::PathBuf;

use crate::handler::mime::guess_mime_type;
use crate::handler::path::{target_path, DocumentRoot};
use crate::handler::source::FileSource;
use crate::handler::RequestError;
use crate::http::{HttpMethod, HttpResponse, RequestLine, StatusCode};

/// File served for requests that name a directory.
pub const INDEX_FILE: &str = "index.html";

/// What a single request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    ServeFile {
        path: PathBuf,
        content_type: String,
        body: Vec<u8>,
    },
    Redirect {
        location: String,
    },
    NotFound,
    MethodNotAllowed,
    BadRequest,
}

impl Outcome {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::ServeFile { .. } => StatusCode::Ok,
            Outcome::Redirect { .. } => StatusCode::MovedPermanently,
            Outcome::NotFound => StatusCode::NotFound,
            Outcome::MethodNotAllowed => StatusCode::MethodNotAllowed,
            Outcome::BadRequest => StatusCode::BadRequest,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        match self {
            Outcome::ServeFile {
                content_type, body, ..
            } => HttpResponse::ok(&content_type, body),
            Outcome::Redirect { location } => HttpResponse::moved_permanently(&location),
            Outcome::NotFound => HttpResponse::not_found(),
            Outcome::MethodNotAllowed => HttpResponse::method_not_allowed(),
            Outcome::BadRequest => HttpResponse::bad_request(),
        }
    }
}

impl From<RequestError> for Outcome {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Malformed(_) | RequestError::InvalidTarget(_) => Outcome::BadRequest,
            RequestError::MethodNotAllowed(_) => Outcome::MethodNotAllowed,
            RequestError::PathTraversal(_)
            | RequestError::FileNotFound(_)
            | RequestError::Unreadable { .. } => Outcome::NotFound,
        }
    }
}

/// Decide what to answer for a parsed request line.
///
/// Non-GET methods are refused before the target is looked at. Directories
/// are redirected to their slash form, or served through their index file.
/// Exactly one read is attempted.
pub fn classify<S: FileSource + ?Sized>(
    line: &RequestLine,
    root: &DocumentRoot,
    source: &S,
) -> Result<Outcome, RequestError> {
    if line.method != HttpMethod::Get {
        return Err(RequestError::MethodNotAllowed(line.method.to_string()));
    }

    let mut path = root.resolve(&line.target)?;

    if source.is_dir(&path) {
        let requested = target_path(&line.target);
        if !requested.ends_with('/') {
            return Ok(Outcome::Redirect {
                location: redirect_location(requested),
            });
        }
        path.push(INDEX_FILE);
    }

    let content_type = guess_mime_type(&path);
    let body = source.read(&path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => RequestError::FileNotFound(path.clone()),
        _ => RequestError::Unreadable {
            path: path.clone(),
            source: err,
        },
    })?;

    Ok(Outcome::ServeFile {
        path,
        content_type,
        body,
    })
}

/// `requested` with exactly one leading `/` and a trailing `/`.
///
/// Repeated leading slashes would make the location protocol-relative.
fn redirect_location(requested: &str) -> String {
    match requested.trim_start_matches('/') {
        "" => "/".to_string(),
        rest => format!("/{}/", rest),
    }
}
