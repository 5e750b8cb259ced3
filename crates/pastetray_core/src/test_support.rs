//! Shared test-only helpers for pastetray_core.

use crate::backend::{BackendDescriptor, Expiry, SocketTransport, Transport};
use crate::invoker::InvokerSettings;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings with short timeouts suitable for loopback servers.
pub(crate) fn test_settings() -> InvokerSettings {
    InvokerSettings {
        connect_timeout: Duration::from_secs(2),
        read_timeout: Duration::from_secs(2),
        user_agent: "PasteTray/test".to_string(),
    }
}

/// A loopback port with nothing listening on it.
///
/// # Panics
/// Panics if an ephemeral port cannot be bound.
pub(crate) fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral listener");
    listener.local_addr().expect("ephemeral addr").port()
}

/// termbin-shaped backend pointed at `port` on loopback.
pub(crate) fn loopback_socket_backend(port: u16) -> BackendDescriptor {
    BackendDescriptor::builder(
        "termbin",
        "http://termbin.com/",
        Transport::Socket(SocketTransport {
            host: "127.0.0.1".to_string(),
            port,
        }),
    )
    .expiry(Expiry::Never)
    .build()
    .expect("loopback socket backend")
}

/// One-shot raw TCP server: reads until EOF (or `hold_open` for silent
/// clients), answers `reply`, then keeps the socket open for `hold_open`.
pub(crate) struct MockSocketServer {
    addr: SocketAddr,
    received_rx: mpsc::Receiver<Vec<u8>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl MockSocketServer {
    pub(crate) fn replying(reply: &'static str) -> Self {
        Self::spawn(reply, Duration::ZERO)
    }

    pub(crate) fn spawn(reply: &'static str, hold_open: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock socket server");
        let addr = listener.local_addr().expect("mock socket addr");
        let (received_tx, received_rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            if !hold_open.is_zero() {
                let _ = stream.set_read_timeout(Some(hold_open));
            }
            let mut received = Vec::new();
            let _ = stream.read_to_end(&mut received);
            let _ = received_tx.send(received);
            let _ = stream.write_all(reply.as_bytes());
            let _ = stream.flush();
            if !hold_open.is_zero() {
                thread::sleep(hold_open);
            }
        });
        Self {
            addr,
            received_rx,
            worker: Some(worker),
        }
    }

    pub(crate) fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Bytes the client sent before half-closing.
    pub(crate) fn received(&self) -> Vec<u8> {
        self.received_rx
            .recv_timeout(RECEIVE_TIMEOUT)
            .expect("mock socket server received payload")
    }
}

impl Drop for MockSocketServer {
    fn drop(&mut self) {
        // Unblock a pending accept so the worker can exit.
        let _ = TcpStream::connect_timeout(&self.addr, Duration::from_millis(100));
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Request as seen by [`MockHttpServer`].
#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    /// Request line and headers, header names lowercased.
    pub(crate) head: String,
    pub(crate) body: String,
}

impl CapturedRequest {
    pub(crate) fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }
}

fn read_http_request(stream: &mut TcpStream) -> Option<CapturedRequest> {
    let mut data = Vec::new();
    let mut buf = [0_u8; 1024];
    let head_end = loop {
        if let Some(pos) = data.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
    };

    let head_raw = String::from_utf8_lossy(&data[..head_end]).to_string();
    let mut head_lines = head_raw.lines();
    let mut head = head_lines.next().unwrap_or_default().to_string();
    let mut content_length = 0_usize;
    for line in head_lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        if name == "content-length" {
            content_length = value.trim().parse().unwrap_or(0);
        }
        head.push('\n');
        head.push_str(&format!("{}: {}", name, value.trim()));
    }

    let mut body = data[head_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    Some(CapturedRequest {
        head,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

/// One-shot HTTP/1.1 server with a canned response.
pub(crate) struct MockHttpServer {
    addr: SocketAddr,
    captured_rx: mpsc::Receiver<CapturedRequest>,
    worker: Option<thread::JoinHandle<()>>,
}

impl MockHttpServer {
    /// Serve one request with `status` (e.g. `"200 OK"`) and `body`.
    pub(crate) fn respond(status: &'static str, body: &'static str) -> Self {
        Self::respond_after(Duration::ZERO, status, body)
    }

    /// Like [`Self::respond`], but stalls for `delay` before answering.
    pub(crate) fn respond_after(
        delay: Duration,
        status: &'static str,
        body: &'static str,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock http server");
        let addr = listener.local_addr().expect("mock http addr");
        let (captured_tx, captured_rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let _ = stream.set_read_timeout(Some(RECEIVE_TIMEOUT));
            let Some(captured) = read_http_request(&mut stream) else {
                return;
            };
            let _ = captured_tx.send(captured);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        });
        Self {
            addr,
            captured_rx,
            worker: Some(worker),
        }
    }

    /// `http://127.0.0.1:<port><path>`.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub(crate) fn captured(&self) -> CapturedRequest {
        self.captured_rx
            .recv_timeout(RECEIVE_TIMEOUT)
            .expect("mock http server captured request")
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        let _ = TcpStream::connect_timeout(&self.addr, Duration::from_millis(100));
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
