// Integration test utilities
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use static_http_server::{DocumentRoot, FileSource, RequestHandler, Server};
use tempfile::TempDir;

/// How long to wait for the server port to become available.
const PORT_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// How often to check if the port is available.
const PORT_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Timeout for socket read/write operations.
const SOCKET_TIMEOUT: Duration = Duration::from_secs(5);

/// Buffer size for reading HTTP responses.
const READ_BUFFER_SIZE: usize = 4096;

pub const ABOUT_HTML: &str = "<h1>About</h1>";
pub const DOCS_INDEX_HTML: &str = "<h1>Docs</h1>";
pub const LOGO_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
pub const SECRET: &str = "top secret";

/// A document root on disk with a secret file next to it.
///
/// ```text
/// <tmp>/secret.txt
/// <tmp>/www-secret/key.txt
/// <tmp>/www/about.html
/// <tmp>/www/index.html
/// <tmp>/www/notes.zzzq
/// <tmp>/www/img/logo.png
/// <tmp>/www/docs/index.html
/// <tmp>/www/empty/
/// ```
pub struct Site {
    _dir: TempDir,
    pub root: DocumentRoot,
}

impl Site {
    pub fn create() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let base = dir.path();
        let www = base.join("www");

        fs::write(base.join("secret.txt"), SECRET).unwrap();
        fs::create_dir_all(base.join("www-secret")).unwrap();
        fs::write(base.join("www-secret/key.txt"), SECRET).unwrap();

        fs::create_dir_all(www.join("img")).unwrap();
        fs::create_dir_all(www.join("docs")).unwrap();
        fs::create_dir_all(www.join("empty")).unwrap();
        fs::write(www.join("about.html"), ABOUT_HTML).unwrap();
        fs::write(www.join("index.html"), "<h1>Home</h1>").unwrap();
        fs::write(www.join("notes.zzzq"), "plain notes").unwrap();
        fs::write(www.join("img/logo.png"), LOGO_PNG).unwrap();
        fs::write(www.join("docs/index.html"), DOCS_INDEX_HTML).unwrap();

        let root = DocumentRoot::open(&www).expect("Failed to open document root");
        Site { _dir: dir, root }
    }

    pub fn handler(&self) -> RequestHandler {
        RequestHandler::new(self.root.clone())
    }
}

/// In-memory file source that remembers every path it was asked about.
#[derive(Debug, Default)]
pub struct RecordingSource {
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
    accessed: Mutex<Vec<PathBuf>>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; every ancestor becomes a directory
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        let path = PathBuf::from(path);
        for ancestor in path.ancestors().skip(1) {
            self.dirs.insert(ancestor.to_path_buf());
        }
        self.files.insert(path, content.to_vec());
        self
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        let path = PathBuf::from(path);
        for ancestor in path.ancestors() {
            self.dirs.insert(ancestor.to_path_buf());
        }
        self
    }

    pub fn accessed(&self) -> Vec<PathBuf> {
        self.accessed.lock().unwrap().clone()
    }

    fn record(&self, path: &Path) {
        self.accessed.lock().unwrap().push(path.to_path_buf());
    }
}

impl FileSource for RecordingSource {
    fn is_dir(&self, path: &Path) -> bool {
        self.record(path);
        self.dirs.contains(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.record(path);
        if self.dirs.contains(path) {
            return Err(io::Error::new(io::ErrorKind::Other, "is a directory"));
        }
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

/// Handler over an in-memory `/www`
pub fn www_handler(source: RecordingSource) -> RequestHandler<RecordingSource> {
    let root = DocumentRoot::new("/www").unwrap();
    RequestHandler::with_source(root, source)
}

/// A response split back into its parts
#[derive(Debug)]
pub struct ParsedResponse {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn header_names(&self) -> Vec<&str> {
        self.headers.iter().map(|(key, _)| key.as_str()).collect()
    }
}

/// Split raw response bytes into status line, headers and body
pub fn parse_response(bytes: &[u8]) -> ParsedResponse {
    let head_end = bytes
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("Response has no blank line after the headers");
    let head = std::str::from_utf8(&bytes[..head_end]).expect("Response head is not UTF-8");
    let mut lines = head.split("\r\n");

    let status_line = lines.next().expect("Missing status line");
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().expect("Missing version").to_string();
    let status = parts
        .next()
        .expect("Missing status code")
        .parse()
        .expect("Invalid status code");
    let reason = parts.next().expect("Missing reason phrase").to_string();

    let headers = lines
        .map(|line| {
            let (key, value) = line.split_once(": ").expect("Malformed header line");
            (key.to_string(), value.to_string())
        })
        .collect();

    ParsedResponse {
        version,
        status,
        reason,
        headers,
        body: bytes[head_end + 4..].to_vec(),
    }
}

/// Wait for a port to become available within timeout
fn wait_for_port(port: u16) -> bool {
    let start = std::time::Instant::now();
    loop {
        match TcpStream::connect(format!("127.0.0.1:{}", port)) {
            Ok(_) => return true,
            Err(_) => {
                if start.elapsed() > PORT_READY_TIMEOUT {
                    return false;
                }
                thread::sleep(PORT_CHECK_INTERVAL);
            }
        }
    }
}

/// Test server that wraps the real Server for integration testing.
/// Provides convenience methods for sending test requests.
pub struct TestServer {
    server: Server,
}

impl TestServer {
    /// Create and start a new test server on a free port
    pub fn start<S: FileSource + 'static>(handler: RequestHandler<S>) -> Self {
        let server = Server::start_with_dynamic_port(handler).expect("Failed to start test server");

        // Wait for server to be ready
        wait_for_port(server.port());

        TestServer { server }
    }

    pub fn server_mut(&mut self) -> &mut Server {
        &mut self.server
    }

    /// Get the server address as "127.0.0.1:port"
    pub fn addr(&self) -> String {
        self.server.addr().to_string()
    }

    /// Send a raw request and read the response until the server closes
    /// the connection.
    pub fn send_request_bytes(&self, request: &[u8]) -> Vec<u8> {
        let mut stream = self.connect();

        stream.write_all(request).expect("Failed to write request");

        let mut response = Vec::new();
        let mut buffer = [0; READ_BUFFER_SIZE];
        loop {
            match stream.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => response.extend_from_slice(&buffer[..n]),
                Err(e) => panic!("Read error: {}", e),
            }
        }

        response
    }

    pub fn send_request(&self, request: &str) -> ParsedResponse {
        parse_response(&self.send_request_bytes(request.as_bytes()))
    }

    fn connect(&self) -> TcpStream {
        let stream =
            TcpStream::connect(self.server.addr()).expect("Failed to connect to test server");
        stream
            .set_read_timeout(Some(SOCKET_TIMEOUT))
            .expect("Failed to set read timeout");
        stream
            .set_write_timeout(Some(SOCKET_TIMEOUT))
            .expect("Failed to set write timeout");
        stream
    }
}
