//! TCP transport: one bounded read, one response, then the connection is closed.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::config::ServerConfig;
use crate::handler::{FileSource, RequestHandler};

/// How long to wait for in-flight requests to complete during shutdown.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_millis(50);

/// Pause between accept attempts when nothing is pending or accept failed transiently.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A client that connects and never sends anything is dropped after this.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Only the request line matters, so a single read of this size is enough.
pub const REQUEST_READ_LIMIT: usize = 1024;

/// A listening static file server; stops when shut down or dropped.
pub struct Server {
    addr: SocketAddr,
    /// Set to ask the accept loop to exit
    shutdown_flag: Arc<AtomicBool>,
    /// Accept loop thread, taken once it has been joined
    thread_handle: Option<JoinHandle<Result<()>>>,
}

impl Server {
    /// Bind `addr` and serve every connection with `handler` on its own thread.
    pub fn start<A, S>(addr: A, handler: RequestHandler<S>) -> Result<Self>
    where
        A: ToSocketAddrs,
        S: FileSource + 'static,
    {
        let listener = TcpListener::bind(&addr).context("Failed to bind to address")?;

        let local_addr = listener
            .local_addr()
            .context("Failed to get local address")?;

        listener
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;

        let shutdown_flag = Arc::new(AtomicBool::new(false));

        let shutdown_clone = Arc::clone(&shutdown_flag);
        let handler = Arc::new(handler);
        let thread_handle =
            thread::spawn(move || Self::run_accept_loop(listener, handler, shutdown_clone));

        log::info!("Server listening on {}", local_addr);

        Ok(Server {
            addr: local_addr,
            shutdown_flag,
            thread_handle: Some(thread_handle),
        })
    }

    /// Start a server for `config`: resolve its document root and bind its address.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let handler = RequestHandler::new(config.document_root()?);
        log::info!("Document root: {}", handler.root().path().display());
        Self::start(config.addr(), handler)
    }

    /// Start on an OS-assigned loopback port.
    pub fn start_with_dynamic_port<S: FileSource + 'static>(
        handler: RequestHandler<S>,
    ) -> Result<Self> {
        Self::start("127.0.0.1:0", handler)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Block until the accept loop exits.
    ///
    /// Returns the error that stopped the loop, if any, so the binary can
    /// exit non-zero.
    pub fn wait(mut self) -> Result<()> {
        match self.thread_handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("Accept loop panicked"))?,
            None => Ok(()),
        }
    }

    /// Stop accepting, give in-flight requests a moment, then join the loop.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.shutdown_flag.store(true, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.take() {
            thread::sleep(SHUTDOWN_GRACE_PERIOD);
            match handle.join() {
                Ok(Err(e)) => log::error!("Accept loop stopped with error: {:#}", e),
                Err(_) => log::error!("Accept loop panicked"),
                Ok(Ok(())) => {}
            }
        }
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown_flag.load(Ordering::SeqCst)
    }

    /// Accept until shutdown is requested. Transient accept failures are
    /// logged and retried; anything else ends the loop with an error.
    fn run_accept_loop<S: FileSource + 'static>(
        listener: TcpListener,
        handler: Arc<RequestHandler<S>>,
        shutdown_flag: Arc<AtomicBool>,
    ) -> Result<()> {
        loop {
            if shutdown_flag.load(Ordering::SeqCst) {
                log::debug!("Server shutdown requested");
                break;
            }

            match listener.accept() {
                Ok((stream, peer_addr)) => {
                    log::debug!("Accepted connection from {}", peer_addr);
                    let handler = Arc::clone(&handler);
                    thread::spawn(move || {
                        if let Err(e) = Self::handle_connection(stream, &handler) {
                            log::error!("Error handling connection from {}: {:#}", peer_addr, e);
                        }
                    });
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) if is_transient_accept_error(&e) => {
                    log::warn!("Accept error, retrying: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    log::error!("Accept error: {}", e);
                    return Err(e).context("Failed to accept connection");
                }
            }
        }
        log::debug!("Server accept loop terminated");
        Ok(())
    }

    fn handle_connection<S: FileSource>(
        mut stream: TcpStream,
        handler: &RequestHandler<S>,
    ) -> Result<()> {
        // Accepted sockets inherit the listener's non-blocking mode on some platforms
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(REQUEST_READ_TIMEOUT))?;

        let mut buffer = [0u8; REQUEST_READ_LIMIT];
        let n = stream.read(&mut buffer).context("Failed to read request")?;
        if n == 0 {
            log::debug!("Connection closed before a request arrived");
            return Ok(());
        }

        let response = handler.handle(&buffer[..n]);
        stream
            .write_all(&response)
            .context("Failed to write response")?;
        stream.flush()?;
        // The peer may already be gone; dropping the stream closes it either way
        let _ = stream.shutdown(Shutdown::Write);
        Ok(())
    }
}

/// Accept failures that concern one connection or a momentary resource
/// shortage rather than the listener itself.
fn is_transient_accept_error(e: &io::Error) -> bool {
    // ENFILE and EMFILE share these numbers on Linux and the BSDs
    const TOO_MANY_OPEN_FILES: [i32; 2] = [23, 24];

    match e.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::Interrupted
        | io::ErrorKind::TimedOut
        | io::ErrorKind::OutOfMemory => true,
        _ => e
            .raw_os_error()
            .map_or(false, |code| TOO_MANY_OPEN_FILES.contains(&code)),
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.shutdown();
    }
}
