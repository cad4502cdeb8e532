use anyhow::{Context, Result};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crate::api::Geocoder;
use crate::query::QueryService;

/// Request line plus headers; anything longer is rejected.
const MAX_HEAD_BYTES: u64 = 8 * 1024;

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    fn json(status: u16, body: String) -> Self {
        Self { status, body }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }).to_string())
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        write!(
            out,
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n",
            self.status,
            self.reason(),
            self.body.len()
        )?;
        if self.status == 405 {
            out.write_all(b"Allow: GET\r\n")?;
        }
        out.write_all(b"Connection: close\r\n\r\n")?;
        out.write_all(self.body.as_bytes())?;
        out.flush()
    }
}

/// Blocking JSON server for the hikes listing.
///
/// Connections are handled one at a time, each closed after its response.
pub struct Server<G> {
    listener: TcpListener,
    service: QueryService<G>,
    read_timeout: Duration,
}

impl<G: Geocoder> Server<G> {
    pub fn bind(addr: &str, service: QueryService<G>, read_timeout: Duration) -> Result<Self> {
        let listener =
            TcpListener::bind(addr).with_context(|| format!("Failed to bind {}", addr))?;
        Ok(Self {
            listener,
            service,
            read_timeout,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the process is killed.
    pub fn run(&self) -> Result<()> {
        let addr = self.local_addr().context("Failed to read listener address")?;
        tracing::info!(%addr, "listening");

        loop {
            if let Err(e) = self.handle_next() {
                accept_failed(&e);
            }
        }
    }

    /// Accept and answer a single connection.
    pub fn handle_next(&self) -> io::Result<()> {
        let (stream, peer) = self.listener.accept()?;
        tracing::debug!(%peer, "accepted connection");

        if let Err(e) = self.handle_connection(stream) {
            tracing::warn!(%peer, error = %e, "connection error");
        }
        Ok(())
    }

    fn handle_connection(&self, mut stream: TcpStream) -> io::Result<()> {
        stream.set_read_timeout(Some(self.read_timeout))?;

        let response = {
            let mut reader = BufReader::new((&stream).take(MAX_HEAD_BYTES));
            match read_request(&mut reader)? {
                Some((method, target)) => {
                    let response = self.route(&method, &target);
                    tracing::info!(%method, %target, status = response.status, "request");
                    response
                }
                None => Response::error(400, "malformed request"),
            }
        };

        response.write_to(&mut stream)
    }

    /// Map a request to its response.
    pub fn route(&self, method: &str, target: &str) -> Response {
        let path = target.split(['?', '#']).next().unwrap_or_default();

        if !matches!(path, "/" | "/hikes" | "/hikes/") {
            return Response::error(404, "not found");
        }
        if method != "GET" {
            return Response::error(405, "method not allowed");
        }

        let hikes = match self.service.hikes() {
            Ok(hikes) => hikes,
            Err(e) => {
                tracing::error!(error = %e, "failed to load trails");
                return Response::error(500, &e.to_string());
            }
        };

        match serde_json::to_string(&hikes) {
            Ok(body) => Response::json(200, body),
            Err(e) => Response::error(500, &e.to_string()),
        }
    }
}

fn accept_failed(error: &io::Error) {
    tracing::warn!(%error, "accept failed");
    thread::sleep(ACCEPT_BACKOFF);
}

/// Parse the request line and skip the headers.
///
/// `None` means the request was not HTTP we understand.
fn read_request(reader: &mut impl BufRead) -> io::Result<Option<(String, String)>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Ok(None);
    };
    if !version.starts_with("HTTP/") || parts.next().is_some() {
        return Ok(None);
    }
    let request = (method.to_string(), target.to_string());

    // Headers are not needed: no body, no auth, no content negotiation.
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 || header.trim_end().is_empty() {
            break;
        }
    }

    Ok(Some(request))
}
