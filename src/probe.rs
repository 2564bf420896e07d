use log::debug;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;

use crate::services::{find_ignore_ascii_case, identify_service};
use crate::types::{PortStatus, ScanResult};

/// Read budget for a banner; one read call, no draining.
pub const BANNER_READ_LIMIT: usize = 1024;
/// Cleaned banners longer than this are cut and suffixed with [`TRUNCATION_MARKER`].
pub const BANNER_MAX_CHARS: usize = 200;
pub const TRUNCATION_MARKER: &str = "...";

const HTTP_PROBE: &[u8] = b"GET / HTTP/1.0\r\n\r\n";

/// Outcome of a single timed connect.
#[derive(Debug)]
pub enum Connect {
    Open(TcpStream),
    Closed,
    Filtered,
}

/// Attempt one TCP connect to `host:port` within `timeout`.
///
/// Expiry of the timeout is read as a silent drop (`Filtered`); every other
/// failure, including refusal and resolution errors, is `Closed`. This split is
/// a heuristic: a slow but live host can look filtered.
pub async fn connect(host: &str, port: u16, timeout: Duration) -> Connect {
    match time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => Connect::Open(stream),
        Ok(Err(e)) => {
            debug!("{host}:{port} connect failed: {e}");
            Connect::Closed
        }
        Err(_) => Connect::Filtered,
    }
}

/// Probe one port and, if it is open, grab and interpret its banner.
pub async fn probe_port(host: &str, port: u16, timeout: Duration) -> ScanResult {
    debug!("start scanning {host}:{port}");
    let mut stream = match connect(host, port, timeout).await {
        Connect::Open(stream) => stream,
        Connect::Closed => return ScanResult::unanswered(host, port, PortStatus::Closed),
        Connect::Filtered => return ScanResult::unanswered(host, port, PortStatus::Filtered),
    };

    let raw = read_banner(&mut stream, port, timeout).await.unwrap_or_default();
    let banner = clean_banner(&raw);
    let body = extract_body(&banner);
    let service = identify_service(port, &raw);
    let _ = stream.shutdown().await;
    debug!("end scanning {host}:{port}: open ({service})");

    ScanResult {
        host: host.to_string(),
        port,
        status: PortStatus::Open,
        service,
        banner,
        body,
    }
}

/// Web ports whose services wait for the client to speak first.
pub fn needs_http_probe(port: u16) -> bool {
    matches!(port, 80 | 443 | 8080 | 8443)
}

/// Read whatever the peer sends within `timeout`, priming web ports with a
/// minimal HTTP/1.0 request first.
///
/// Returns `None` when the write or read fails, times out, or yields no bytes.
pub async fn read_banner(stream: &mut TcpStream, port: u16, timeout: Duration) -> Option<Vec<u8>> {
    let deadline = time::Instant::now() + timeout;

    if needs_http_probe(port) {
        match time::timeout_at(deadline, stream.write_all(HTTP_PROBE)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!("port {port}: request write failed: {e}");
                return None;
            }
            Err(_) => return None,
        }
    }

    let mut buf = vec![0u8; BANNER_READ_LIMIT];
    match time::timeout_at(deadline, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            Some(buf)
        }
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            debug!("port {port}: banner read failed: {e}");
            None
        }
        Err(_) => {
            debug!("port {port}: no banner within {timeout:?}");
            None
        }
    }
}

/// Keep printable ASCII plus `\n`, `\r` and `\t`, capped at [`BANNER_MAX_CHARS`].
pub fn clean_banner(raw: &[u8]) -> String {
    let mut cleaned: String = raw
        .iter()
        .filter(|&&b| (0x20..=0x7e).contains(&b) || matches!(b, b'\n' | b'\r' | b'\t'))
        .map(|&b| b as char)
        .collect();
    if cleaned.len() > BANNER_MAX_CHARS {
        cleaned.truncate(BANNER_MAX_CHARS);
        cleaned.push_str(TRUNCATION_MARKER);
    }
    cleaned
}

/// Text between the first `<body ...>` and the first `</body>`, case-insensitive.
///
/// Best effort: nested or malformed markup is not handled. Empty when either tag
/// is missing or the closing tag comes first.
pub fn extract_body(banner: &str) -> String {
    let bytes = banner.as_bytes();
    let start = find_ignore_ascii_case(bytes, b"<body", 0)
        .and_then(|open| bytes[open..].iter().position(|&b| b == b'>').map(|gt| open + gt + 1));
    let end = find_ignore_ascii_case(bytes, b"</body>", 0);

    match (start, end) {
        // Both indices sit on ASCII bytes, so slicing is on char boundaries.
        (Some(s), Some(e)) if s < e => banner[s..e].to_string(),
        _ => String::new(),
    }
}
