use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::http::{parse_request_line, HttpResponse, ParseError};

pub mod mime;
pub mod outcome;
pub mod path;
pub mod source;

pub use outcome::{classify, Outcome};
pub use path::DocumentRoot;
pub use source::{DiskSource, FileSource};

/// Every way a request can fail. Each maps to exactly one [`Outcome`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Malformed(#[from] ParseError),
    #[error("request target is not valid UTF-8 once decoded: '{0}'")]
    InvalidTarget(String),
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),
    #[error("path escapes the document root: '{0}'")]
    PathTraversal(String),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to read {}: {}", .path.display(), .source)]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Turns one raw request into one raw response.
///
/// Holds nothing but the document root and a read-only file source, so one
/// instance can be shared by every connection.
#[derive(Debug, Clone)]
pub struct RequestHandler<S = DiskSource> {
    root: DocumentRoot,
    source: S,
}

impl RequestHandler<DiskSource> {
    pub fn new(root: DocumentRoot) -> Self {
        Self::with_source(root, DiskSource)
    }
}

impl<S: FileSource> RequestHandler<S> {
    pub fn with_source(root: DocumentRoot, source: S) -> Self {
        RequestHandler { root, source }
    }

    pub fn root(&self) -> &DocumentRoot {
        &self.root
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Handle a raw request buffer and return the bytes to send back
    pub fn handle(&self, raw: &[u8]) -> Vec<u8> {
        self.respond(raw).to_bytes()
    }

    pub fn respond(&self, raw: &[u8]) -> HttpResponse {
        self.outcome(raw).into_response()
    }

    pub fn outcome(&self, raw: &[u8]) -> Outcome {
        match self.try_outcome(raw) {
            Ok(outcome) => {
                log::debug!("Answering {}", outcome.status());
                outcome
            }
            Err(err) => {
                match err {
                    RequestError::Unreadable { .. } => log::warn!("{}", err),
                    _ => log::debug!("Rejected request: {}", err),
                }
                Outcome::from(err)
            }
        }
    }

    fn try_outcome(&self, raw: &[u8]) -> Result<Outcome, RequestError> {
        let line = parse_request_line(raw)?;
        log::debug!("Got a request of: {} {} {}", line.method, line.target, line.version);
        classify(&line, &self.root, &self.source)
    }
}
