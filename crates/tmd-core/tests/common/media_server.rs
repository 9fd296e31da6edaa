//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes are keyed by request target (path plus query). A route can fail a
//! fixed number of times with 503 before serving its body. Every request is
//! counted per target; unknown targets get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

struct Route {
    body: Vec<u8>,
    failures_left: usize,
}

#[derive(Default)]
struct State {
    routes: Mutex<HashMap<String, Route>>,
    hits: Mutex<HashMap<String, usize>>,
}

#[derive(Clone)]
pub struct MediaServer {
    base: String,
    state: Arc<State>,
}

impl MediaServer {
    /// Starts the server in a background thread. Runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(State::default());
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// `http://127.0.0.1:<port>`, no trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, target: &str) -> String {
        format!("{}{}", self.base, target)
    }

    pub fn serve(&self, target: &str, body: impl Into<Vec<u8>>) {
        self.serve_flaky(target, body, 0);
    }

    /// Answer 503 to the first `failures` requests, then serve `body`.
    pub fn serve_flaky(&self, target: &str, body: impl Into<Vec<u8>>, failures: usize) {
        self.state.routes.lock().unwrap().insert(
            target.to_string(),
            Route {
                body: body.into(),
                failures_left: failures,
            },
        );
    }

    pub fn hits(&self, target: &str) -> usize {
        self.state.hits.lock().unwrap().get(target).copied().unwrap_or(0)
    }

    /// Requests for targets starting with `prefix`.
    pub fn hits_under(&self, prefix: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(_, n)| n)
            .sum()
    }
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("").to_string();

    *state.hits.lock().unwrap().entry(target.clone()).or_insert(0) += 1;

    if !method.eq_ignore_ascii_case("GET") {
        respond(&mut stream, "405 Method Not Allowed", b"");
        return;
    }
    let reply = {
        let mut routes = state.routes.lock().unwrap();
        match routes.get_mut(&target) {
            Some(route) if route.failures_left > 0 => {
                route.failures_left -= 1;
                Err("503 Service Unavailable")
            }
            Some(route) => Ok(route.body.clone()),
            None => Err("404 Not Found"),
        }
    };
    match reply {
        Ok(body) => respond(&mut stream, "200 OK", &body),
        Err(status) => respond(&mut stream, status, status.as_bytes()),
    }
}

fn respond(stream: &mut TcpStream, status: &str, body: &[u8]) {
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}
