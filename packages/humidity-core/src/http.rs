//! HTTP/1.1 request encoding and response parsing.
//!
//! The socket half lives in the firmware; everything here is pure so it can
//! be exercised on the host.

use alloc::{string::String, vec::Vec};
use core::fmt::Write as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportError {
    InvalidUrl,
    UnsupportedScheme,
    Dns,
    Connect,
    Timeout,
    Io,
    ResponseTooLarge,
    MalformedResponse,
}

impl TransportError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid url",
            Self::UnsupportedScheme => "unsupported scheme",
            Self::Dns => "dns lookup failed",
            Self::Connect => "connection refused",
            Self::Timeout => "timeout",
            Self::Io => "socket io",
            Self::ResponseTooLarge => "response too large",
            Self::MalformedResponse => "malformed response",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// A parsed base URL: `scheme://host[:port][/prefix][?query]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub prefix: String,
    pub query: Option<String>,
}

impl Endpoint {
    pub fn parse(url: &str) -> Result<Self, TransportError> {
        let (scheme, rest) = if let Some(rest) = url.strip_prefix("http://") {
            (Scheme::Http, rest)
        } else if let Some(rest) = url.strip_prefix("https://") {
            (Scheme::Https, rest)
        } else {
            return Err(TransportError::InvalidUrl);
        };

        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) if !query.is_empty() => (rest, Some(String::from(query))),
            Some((rest, _)) => (rest, None),
            None => (rest, None),
        };

        let (authority, prefix) = match rest.find('/') {
            Some(idx) => (&rest[..idx], rest[idx..].trim_end_matches('/')),
            None => (rest, ""),
        };

        let (host, port) = match authority.rsplit_once(':') {
            Some((host, port)) => (
                host,
                port.parse::<u16>().map_err(|_| TransportError::InvalidUrl)?,
            ),
            None => (authority, scheme.default_port()),
        };
        if host.is_empty() {
            return Err(TransportError::InvalidUrl);
        }

        Ok(Self {
            scheme,
            host: String::from(host),
            port,
            prefix: String::from(prefix),
            query,
        })
    }

    /// Host header value; the port is only spelled out when it is not the
    /// scheme default.
    pub fn authority(&self) -> String {
        let mut out = self.host.clone();
        if self.port != self.scheme.default_port() {
            let _ = write!(out, ":{}", self.port);
        }
        out
    }

    /// Request target for `path` below this endpoint, with the endpoint's
    /// own query first and `extra` pairs percent-encoded after it.
    pub fn target(&self, path: &str, extra: &[(&str, &str)]) -> String {
        let mut target = self.prefix.clone();
        if !path.starts_with('/') {
            target.push('/');
        }
        push_encoded_path(&mut target, path);

        let mut separator = '?';
        if let Some(query) = &self.query {
            target.push(separator);
            target.push_str(query);
            separator = '&';
        }
        for (name, value) in extra {
            target.push(separator);
            push_encoded_component(&mut target, name);
            target.push('=');
            push_encoded_component(&mut target, value);
            separator = '&';
        }
        target
    }

    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            scheme: self.scheme,
            host: self.host.clone(),
            port: self.port,
            authority: self.authority(),
            target: self.target(path, query),
            body,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub scheme: Scheme,
    pub host: String,
    pub port: u16,
    pub authority: String,
    pub target: String,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut head = String::with_capacity(192 + self.target.len());
        let _ = write!(
            head,
            "{} {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: humidity-node\r\nAccept: application/json\r\nConnection: close\r\n",
            self.method.as_str(),
            self.target,
            self.authority
        );
        match &self.body {
            Some(body) => {
                let _ = write!(
                    head,
                    "Content-Type: application/json\r\nContent-Length: {}\r\n\r\n",
                    body.len()
                );
                head.push_str(body);
            }
            None => {
                if !matches!(self.method, Method::Get) {
                    head.push_str("Content-Length: 0\r\n");
                }
                head.push_str("\r\n");
            }
        }
        head.into_bytes()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP round trip.
pub trait HttpTransport {
    async fn request(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

pub fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

pub fn parse_content_length(header: &str) -> Result<Option<usize>, TransportError> {
    let mut content_length = None;
    for line in header.lines().skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        let parsed = value
            .trim()
            .parse::<usize>()
            .map_err(|_| TransportError::MalformedResponse)?;
        if content_length.is_some() {
            return Err(TransportError::MalformedResponse);
        }
        content_length = Some(parsed);
    }
    Ok(content_length)
}

fn is_chunked(header: &str) -> bool {
    header.lines().skip(1).any(|line| {
        line.split_once(':').is_some_and(|(name, value)| {
            name.eq_ignore_ascii_case("transfer-encoding")
                && value.to_ascii_lowercase().contains("chunked")
        })
    })
}

fn parse_status_line(header: &str) -> Result<u16, TransportError> {
    let line = header.lines().next().ok_or(TransportError::MalformedResponse)?;
    let mut parts = line.split_ascii_whitespace();
    let version = parts.next().ok_or(TransportError::MalformedResponse)?;
    if !version.starts_with("HTTP/1.") {
        return Err(TransportError::MalformedResponse);
    }
    parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or(TransportError::MalformedResponse)
}

/// Total byte length of the response once headers are in, if the server
/// announced a `Content-Length`. Lets the reader stop before EOF.
pub fn expected_len(raw: &[u8]) -> Option<usize> {
    let header_end = find_header_end(raw)?;
    let header = core::str::from_utf8(&raw[..header_end]).ok()?;
    if is_chunked(header) {
        return None;
    }
    let length = parse_content_length(header).ok()??;
    Some(header_end + 4 + length)
}

pub fn parse_response(raw: &[u8]) -> Result<HttpResponse, TransportError> {
    let header_end = find_header_end(raw).ok_or(TransportError::MalformedResponse)?;
    let header =
        core::str::from_utf8(&raw[..header_end]).map_err(|_| TransportError::MalformedResponse)?;
    let status = parse_status_line(header)?;
    let payload = &raw[header_end + 4..];

    let body = if is_chunked(header) {
        decode_chunked(payload)?
    } else {
        match parse_content_length(header)? {
            Some(length) => payload
                .get(..length)
                .ok_or(TransportError::MalformedResponse)?
                .to_vec(),
            None => payload.to_vec(),
        }
    };

    Ok(HttpResponse { status, body })
}

fn decode_chunked(mut payload: &[u8]) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    loop {
        let line_end = payload
            .windows(2)
            .position(|window| window == b"\r\n")
            .ok_or(TransportError::MalformedResponse)?;
        let size_line = core::str::from_utf8(&payload[..line_end])
            .map_err(|_| TransportError::MalformedResponse)?;
        let size_hex = size_line.split(';').next().unwrap_or("").trim();
        let size =
            usize::from_str_radix(size_hex, 16).map_err(|_| TransportError::MalformedResponse)?;
        payload = &payload[line_end + 2..];
        if size == 0 {
            return Ok(body);
        }
        let chunk = payload
            .get(..size)
            .ok_or(TransportError::MalformedResponse)?;
        body.extend_from_slice(chunk);
        payload = payload
            .get(size + 2..)
            .ok_or(TransportError::MalformedResponse)?;
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

fn push_encoded_component(out: &mut String, value: &str) {
    for &byte in value.as_bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{:02X}", byte);
        }
    }
}

// Keeps '/' and ':' so database paths and MAC based ids stay readable.
fn push_encoded_path(out: &mut String, path: &str) {
    for &byte in path.as_bytes() {
        if is_unreserved(byte) || matches!(byte, b'/' | b':') {
            out.push(byte as char);
        } else {
            let _ = write!(out, "%{:02X}", byte);
        }
    }
}
