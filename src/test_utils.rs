//! Test helpers shared by the unit tests: a one-shot HTTP server that
//! records what the client sent, plus stock settings for a session.

#![cfg(test)]

use crate::config::{AgaveEnv, Credentials};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

/// Token endpoint reply that logs the client in as `tok123`.
pub const TOKEN_OK: (&str, &str) = ("200 OK", r#"{"access_token":"tok123","expires_in":14400}"#);

/// One request as the test server saw it.
pub struct Captured {
    pub head: String,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case(name)
                .then(|| v.trim().to_string())
        })
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// Serve one canned reply per connection, in order, and hand back what
/// was received. Bodies may be sized by `Content-Length` or chunked.
pub fn serve(replies: Vec<(&'static str, &'static str)>) -> (String, JoinHandle<Vec<Captured>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let (mut stream, _) = listener.accept().unwrap();
            let captured = read_request(&mut stream);
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
            stream.flush().unwrap();
            seen.push(captured);
        }
        seen
    });
    (format!("http://{}", addr), handle)
}

fn read_request(stream: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        fill(stream, &mut buf);
    };
    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let header = |name: &str| {
        head.lines().skip(1).find_map(|l| {
            let (k, v) = l.split_once(':')?;
            k.trim()
                .eq_ignore_ascii_case(name)
                .then(|| v.trim().to_ascii_lowercase())
        })
    };

    let body = if header("transfer-encoding").is_some_and(|v| v.contains("chunked")) {
        loop {
            if let Some(body) = decode_chunked(&buf[header_end..]) {
                break body;
            }
            fill(stream, &mut buf);
        }
    } else {
        let length = header("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < header_end + length {
            fill(stream, &mut buf);
        }
        buf[header_end..header_end + length].to_vec()
    };
    Captured { head, body }
}

fn fill(stream: &mut TcpStream, buf: &mut Vec<u8>) {
    let mut chunk = [0u8; 8192];
    let n = stream.read(&mut chunk).unwrap();
    assert!(n > 0, "client closed early");
    buf.extend_from_slice(&chunk[..n]);
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Decoded body once the terminating zero-size chunk has arrived, `None`
/// while more bytes are needed.
fn decode_chunked(mut data: &[u8]) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let line_end = find(data, b"\r\n")?;
        let size_field = std::str::from_utf8(&data[..line_end]).ok()?;
        let size_hex = size_field.split(';').next()?.trim();
        let size = usize::from_str_radix(size_hex, 16).ok()?;
        data = &data[line_end + 2..];
        if size == 0 {
            // No trailers are sent; wait for the final CRLF.
            return data.starts_with(b"\r\n").then_some(body);
        }
        if data.len() < size + 2 {
            return None;
        }
        body.extend_from_slice(&data[..size]);
        data = &data[size + 2..];
    }
}

pub fn env_for(server: String) -> AgaveEnv {
    AgaveEnv {
        server,
        client_name: "copier".into(),
        api_key: "key".into(),
        api_secret: "secret".into(),
    }
}

pub fn alice() -> Credentials {
    Credentials {
        username: "alice".into(),
        password: "hunter2".into(),
    }
}

#[test]
fn chunked_bodies_are_reassembled() {
    let raw = b"5\r\nhello\r\n7;ext=1\r\n, agave\r\n0\r\n\r\n";
    assert_eq!(decode_chunked(raw), Some(b"hello, agave".to_vec()));
    assert_eq!(decode_chunked(&raw[..raw.len() - 2]), None);
    assert_eq!(decode_chunked(b"5\r\nhel"), None);
}
