//! Port- and banner-based service identification.

pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Well-known TCP ports and the service conventionally bound to them.
const PORT_SERVICES: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (110, "POP3"),
    (143, "IMAP"),
    (443, "HTTPS"),
    (445, "SMB"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5432, "PostgreSQL"),
    (5900, "VNC"),
    (6379, "Redis"),
    (8080, "HTTP-Proxy"),
    (8443, "HTTPS-Alt"),
    (9200, "Elasticsearch"),
    (27017, "MongoDB"),
];

/// Banner signatures, tried in order; the first match wins.
///
/// Product names come before protocol tokens so that an HTTP response with a
/// `Server: nginx` header is labelled `nginx` rather than `HTTP`.
/// Needles must be lowercase ASCII.
const BANNER_SIGNATURES: &[(&[u8], &str)] = &[
    (b"ssh-", "SSH"),
    (b"nginx", "nginx"),
    (b"apache", "Apache"),
    (b"microsoft", "Microsoft"),
    (b"mysql", "MySQL"),
    (b"postgresql", "PostgreSQL"),
    (b"redis", "Redis"),
    (b"mongodb", "MongoDB"),
    (b"http/", "HTTP"),
    (b"ftp", "FTP"),
    (b"smtp", "SMTP"),
    (b"pop3", "POP3"),
    (b"imap", "IMAP"),
];

pub fn service_for_port(port: u16) -> Option<&'static str> {
    PORT_SERVICES
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, name)| *name)
}

pub fn service_from_banner(banner: &[u8]) -> Option<&'static str> {
    if banner.is_empty() {
        return None;
    }
    BANNER_SIGNATURES
        .iter()
        .find(|(needle, _)| find_ignore_ascii_case(banner, needle, 0).is_some())
        .map(|(_, name)| *name)
}

/// Label the service on `port`, refining it with `banner` when one was read.
///
/// Returns `"<port label> (<banner label>)"` when both sources agree on
/// something, either label alone when only one is known, and
/// [`UNKNOWN_SERVICE`] otherwise.
pub fn identify_service(port: u16, banner: &[u8]) -> String {
    match (service_for_port(port), service_from_banner(banner)) {
        (Some(base), Some(detected)) => format!("{base} ({detected})"),
        (Some(base), None) => base.to_string(),
        (None, Some(detected)) => detected.to_string(),
        (None, None) => UNKNOWN_SERVICE.to_string(),
    }
}

/// Position of the first case-insensitive occurrence of `needle` at or after
/// `from`. `needle` must already be lowercase ASCII.
pub(crate) fn find_ignore_ascii_case(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() || haystack.len() - from < needle.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|i| i + from)
}
