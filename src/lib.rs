//! A static file server that answers GET requests from a single document root.
//!
//! [`RequestHandler`] turns one raw request into one raw response without
//! touching anything outside the root; [`Server`] puts it behind a TCP
//! listener with one connection per thread.

pub mod args;
pub mod config;
pub mod handler;
pub mod http;
pub mod server;

pub use config::ServerConfig;
pub use handler::{DiskSource, DocumentRoot, FileSource, Outcome, RequestError, RequestHandler};
pub use http::{HttpMethod, HttpResponse, HttpHeaders, StatusCode, parse_request_line};
pub use server::Server;
