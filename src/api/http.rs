//! Minimal blocking HTTP/1.1 over `TcpStream`.
//!
//! Only plain `http://` endpoints are supported. Responses are read to
//! completion (`Connection: close`) and capped at [`MAX_RESPONSE_BYTES`].

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::ApiError;

pub const MAX_RESPONSE_BYTES: u64 = 4 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path relative to the API base, e.g. `/stories/1`.
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

/// Carries a request to the backend and returns its raw response.
pub trait Transport {
    fn send(&self, request: &Request) -> Result<Response, ApiError>;
}

/// Parsed `http://host:port/prefix` base address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    pub host: String,
    pub port: u16,
    pub prefix: String,
}

impl BaseUrl {
    /// Parse `http://127.0.0.1:8000/api`, `localhost:8000`, `[::1]:8000` or `example.com`.
    /// Defaults to port 80 and an empty prefix.
    pub fn parse(url: &str) -> Result<Self, ApiError> {
        if url.starts_with("https://") {
            return Err(ApiError::Malformed("https is not supported".into()));
        }
        let rest = url.strip_prefix("http://").unwrap_or(url);
        let (authority, prefix) = match rest.find('/') {
            Some(i) => (&rest[..i], rest[i..].trim_end_matches('/')),
            None => (rest, ""),
        };
        let (host, port) = match authority.strip_prefix('[') {
            Some(bracketed) => {
                let (host, after) = bracketed
                    .split_once(']')
                    .ok_or_else(|| ApiError::Malformed(format!("unclosed IPv6 literal in {url}")))?;
                match after {
                    "" => (host, None),
                    _ => match after.strip_prefix(':') {
                        Some(p) => (host, Some(p)),
                        None => return Err(ApiError::Malformed(format!("invalid authority in {url}"))),
                    },
                }
            }
            None => match authority.split_once(':') {
                Some((h, p)) => (h, Some(p)),
                None => (authority, None),
            },
        };
        let port = match port {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| ApiError::Malformed(format!("invalid port in {url}")))?,
            None => 80,
        };
        if host.is_empty() {
            return Err(ApiError::Malformed(format!("empty host in {url}")));
        }
        Ok(BaseUrl {
            host: host.to_string(),
            port,
            prefix: prefix.to_string(),
        })
    }

    /// Host as it appears in a `Host` header; IPv6 literals get their brackets back.
    pub fn host_header(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}

#[derive(Debug, Clone)]
pub struct TcpTransport {
    base: BaseUrl,
    timeout: Duration,
}

impl TcpTransport {
    pub fn new(base: BaseUrl, timeout: Duration) -> Self {
        TcpTransport { base, timeout }
    }
}

impl Transport for TcpTransport {
    fn send(&self, request: &Request) -> Result<Response, ApiError> {
        let addr = (self.base.host.as_str(), self.base.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| ApiError::Malformed(format!("cannot resolve {}", self.base.host)))?;

        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        let raw = encode_request(&self.base, request);
        stream.write_all(raw.as_bytes())?;

        let mut buf = Vec::new();
        stream.take(MAX_RESPONSE_BYTES).read_to_end(&mut buf)?;
        parse_response(&buf)
    }
}

pub fn encode_request(base: &BaseUrl, request: &Request) -> String {
    let mut head = format!(
        "{} {}{} HTTP/1.1\r\nHost: {}\r\nAccept: application/json\r\nConnection: close\r\n",
        request.method.as_str(),
        base.prefix,
        request.path,
        base.host_header(),
    );
    if let Some(token) = &request.bearer {
        head.push_str(&format!("Authorization: Bearer {token}\r\n"));
    }
    let body = request.body.as_deref().unwrap_or("");
    if request.body.is_some() || request.method == Method::Post {
        head.push_str("Content-Type: application/json\r\n");
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("\r\n");
    head.push_str(body);
    head
}

/// Parse a status line like "HTTP/1.1 200 OK" into code and reason.
pub fn parse_status_line(line: &str) -> Result<(u16, String), ApiError> {
    let parts: Vec<&str> = line.splitn(3, ' ').collect();
    if parts.len() < 2 || !parts[0].starts_with("HTTP/") {
        return Err(ApiError::Malformed(format!("bad status line: {line}")));
    }
    let code = parts[1]
        .parse::<u16>()
        .map_err(|_| ApiError::Malformed(format!("bad status code: {}", parts[1])))?;
    let reason = parts.get(2).unwrap_or(&"").trim().to_string();
    Ok((code, reason))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Parse a raw response. Headers must be UTF-8; the body is reassembled as
/// bytes and converted once, so chunk boundaries may split characters.
pub fn parse_response(raw: &[u8]) -> Result<Response, ApiError> {
    let split = find(raw, b"\r\n\r\n")
        .ok_or_else(|| ApiError::Malformed("missing header terminator".into()))?;
    let head = std::str::from_utf8(&raw[..split])
        .map_err(|_| ApiError::Malformed("headers are not UTF-8".into()))?;
    let body = &raw[split + 4..];
    let mut lines = head.lines();
    let status_line = lines
        .next()
        .ok_or_else(|| ApiError::Malformed("empty response".into()))?;
    let (status, reason) = parse_status_line(status_line)?;

    let chunked = lines.any(|l| {
        l.split_once(':').is_some_and(|(k, v)| {
            k.trim().eq_ignore_ascii_case("transfer-encoding")
                && v.trim().eq_ignore_ascii_case("chunked")
        })
    });
    let body = if chunked {
        decode_chunked(body)?
    } else {
        body.to_vec()
    };

    Ok(Response {
        status,
        reason,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn decode_chunked(mut body: &[u8]) -> Result<Vec<u8>, ApiError> {
    let mut out = Vec::new();
    loop {
        let line_end = find(body, b"\r\n")
            .ok_or_else(|| ApiError::Malformed("truncated chunk header".into()))?;
        let size_line = std::str::from_utf8(&body[..line_end])
            .map_err(|_| ApiError::Malformed("bad chunk header".into()))?;
        let rest = &body[line_end + 2..];
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| ApiError::Malformed(format!("bad chunk size: {size_line}")))?;
        if size == 0 {
            return Ok(out);
        }
        let chunk = rest
            .get(..size)
            .ok_or_else(|| ApiError::Malformed("truncated chunk".into()))?;
        out.extend_from_slice(chunk);
        let after = &rest[size..];
        body = after.strip_prefix(b"\r\n".as_slice()).unwrap_or(after);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_url_variants() {
        let full = BaseUrl::parse("http://127.0.0.1:8000/api/").unwrap();
        assert_eq!(full.host, "127.0.0.1");
        assert_eq!(full.port, 8000);
        assert_eq!(full.prefix, "/api");

        let bare = BaseUrl::parse("example.com").unwrap();
        assert_eq!(bare.port, 80);
        assert_eq!(bare.prefix, "");

        assert!(BaseUrl::parse("http://:8000").is_err());
        assert!(BaseUrl::parse("http://host:port").is_err());
        assert!(BaseUrl::parse("https://secure.example.com").is_err());
    }

    #[test]
    fn parses_ipv6_literals() {
        let v6 = BaseUrl::parse("http://[::1]:8000/api").unwrap();
        assert_eq!(v6.host, "::1");
        assert_eq!(v6.port, 8000);
        assert_eq!(v6.prefix, "/api");
        assert_eq!(v6.host_header(), "[::1]");

        assert_eq!(BaseUrl::parse("[fe80::2]").unwrap().port, 80);
        assert!(BaseUrl::parse("http://[::1").is_err());
        assert!(BaseUrl::parse("http://[::1]8000").is_err());
    }

    #[test]
    fn encodes_post_with_bearer_and_body() {
        let base = BaseUrl::parse("http://localhost:8000/api").unwrap();
        let raw = encode_request(
            &base,
            &Request {
                method: Method::Post,
                path: "/game/invites".into(),
                bearer: Some("abc".into()),
                body: Some("{}".into()),
            },
        );
        assert!(raw.starts_with("POST /api/game/invites HTTP/1.1\r\n"));
        assert!(raw.contains("Authorization: Bearer abc\r\n"));
        assert!(raw.contains("Content-Length: 2\r\n"));
        assert!(raw.ends_with("\r\n\r\n{}"));
    }

    #[test]
    fn get_without_token_has_no_auth_header() {
        let base = BaseUrl::parse("localhost:8000").unwrap();
        let raw = encode_request(
            &base,
            &Request {
                method: Method::Get,
                path: "/leaderboard/top-scores".into(),
                bearer: None,
                body: None,
            },
        );
        assert!(!raw.contains("Authorization"));
        assert!(!raw.contains("Content-Length"));
    }

    #[test]
    fn parses_plain_response() {
        let raw = "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\n\r\n{\"detail\":\"x\"}";
        let resp = parse_response(raw.as_bytes()).unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.reason, "Not Found");
        assert_eq!(resp.body, "{\"detail\":\"x\"}");
    }

    #[test]
    fn decodes_chunked_body() {
        let raw = "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\n[1,2\r\n2\r\n,3\r\n1\r\n]\r\n0\r\n\r\n";
        let resp = parse_response(raw.as_bytes()).unwrap();
        assert_eq!(resp.body, "[1,2,3]");
    }

    #[test]
    fn chunk_boundary_may_split_a_character() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n3\r\n\"\xC3\r\n2\r\n\xA9\"\r\n0\r\n\r\n";
        let resp = parse_response(raw).unwrap();
        assert_eq!(resp.body, "\"\u{e9}\"");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_response(b"not http at all").is_err());
        assert!(parse_status_line("HTTP/1.1 abc OK").is_err());
    }
}
