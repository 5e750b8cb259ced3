//! Raw TCP strategy: send everything, read until the peer hangs up.

use super::InvokerSettings;
use crate::backend::SocketTransport;
use crate::models::{FailureKind, PasteRequest, PasteResult};
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::debug;

fn connect(target: &SocketTransport, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (target.host.as_str(), target.port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                debug!("connect to {} failed: {}", addr, err);
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
    }))
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Read until EOF. A timeout after some bytes arrived ends the reply.
fn read_reply(stream: &mut impl Read) -> io::Result<Vec<u8>> {
    let mut reply = Vec::new();
    let mut buf = [0_u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => reply.extend_from_slice(&buf[..n]),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if is_timeout(&err) && !reply.is_empty() => break,
            Err(err) => return Err(err),
        }
    }
    Ok(reply)
}

fn exchange(
    target: &SocketTransport,
    payload: &[u8],
    settings: &InvokerSettings,
) -> io::Result<Vec<u8>> {
    let mut stream = connect(target, settings.connect_timeout)?;
    stream.set_read_timeout(Some(settings.read_timeout))?;
    stream.set_write_timeout(Some(settings.read_timeout))?;
    stream.write_all(payload)?;
    stream.flush()?;
    // The peer may already have answered and closed.
    if let Err(err) = stream.shutdown(Shutdown::Write) {
        if err.kind() != io::ErrorKind::NotConnected {
            return Err(err);
        }
    }
    read_reply(&mut stream)
}

/// Extract the paste URL from a raw reply.
///
/// Surrounding whitespace and control bytes (termbin ends with `\n\0`) are
/// stripped. What remains must be a single line.
fn reply_url(reply: &[u8]) -> Result<String, &'static str> {
    let text = String::from_utf8_lossy(reply);
    let url = text.trim_matches(|ch: char| ch.is_whitespace() || ch.is_control());
    if url.is_empty() {
        return Err("closed the connection without a reply");
    }
    if url.chars().any(char::is_control) {
        return Err("replied with more than one line");
    }
    Ok(url.to_string())
}

pub(super) fn submit(
    target: &SocketTransport,
    request: &PasteRequest,
    settings: &InvokerSettings,
) -> PasteResult {
    match exchange(target, request.content().as_bytes(), settings) {
        Ok(reply) => match reply_url(&reply) {
            Ok(url) => PasteResult::success(url),
            Err(reason) => PasteResult::failure(
                FailureKind::Transport,
                format!("{}:{} {}", target.host, target.port, reason),
            ),
        },
        Err(err) => PasteResult::failure(
            FailureKind::Transport,
            format!("{}:{}: {}", target.host, target.port, err),
        ),
    }
}
