//! Minimal HTTP/1.1 object server for integration tests.
//!
//! Serves a fixed map of request paths to bodies. Unknown paths get 404;
//! paths registered with [`ObjectServer::fail`] get the given status.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

#[derive(Default)]
pub struct ObjectServer {
    objects: HashMap<String, Vec<u8>>,
    failures: HashMap<String, u16>,
}

impl ObjectServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` at `/{path}`.
    pub fn object(mut self, path: &str, body: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(format!("/{}", path), body.into());
        self
    }

    /// Answers `/{path}` with `status` and a short error body.
    pub fn fail(mut self, path: &str, status: u16) -> Self {
        self.failures.insert(format!("/{}", path), status);
        self
    }

    /// Starts the server in a background thread and returns its base URL
    /// (e.g. "http://127.0.0.1:12345/"). Runs until the process exits.
    pub fn start(self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let server = Arc::new(self);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let server = Arc::clone(&server);
                thread::spawn(move || server.handle(stream));
            }
        });
        format!("http://127.0.0.1:{}/", port)
    }

    fn handle(&self, mut stream: std::net::TcpStream) {
        let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
        let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
        let mut buf = [0u8; 8192];
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        let Ok(request) = std::str::from_utf8(&buf[..n]) else {
            return;
        };
        let mut first = request.lines().next().unwrap_or("").split_whitespace();
        let method = first.next().unwrap_or("");
        let path = first.next().unwrap_or("/");

        if !method.eq_ignore_ascii_case("GET") {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
            return;
        }
        if let Some(status) = self.failures.get(path) {
            respond(&mut stream, &format!("{} Error", status), b"server error");
            return;
        }
        match self.objects.get(path) {
            Some(body) => respond(&mut stream, "200 OK", body),
            None => respond(&mut stream, "404 Not Found", b"no such key"),
        }
    }
}

fn respond(stream: &mut std::net::TcpStream, status: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
