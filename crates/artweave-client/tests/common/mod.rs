// Minimal HTTP/1.1 mock of the ArtWeave API for integration tests. Also
// mounted by artweave-app's tests.
//
// Every response closes its connection, so one recorded request equals one
// network round trip.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// A canned reply for requests whose request line starts with `route`
/// (e.g. `"GET /api/sets"`).
#[derive(Clone)]
pub struct Route {
    pub route: String,
    pub status_line: String,
    pub body: String,
    pub delay: Duration,
}

impl Route {
    pub fn json(route: &str, body: &str) -> Self {
        Self::status(route, "200 OK", body)
    }

    pub fn status(route: &str, status_line: &str, body: &str) -> Self {
        Self {
            route: route.to_string(),
            status_line: status_line.to_string(),
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A recorded request: the request line and the body.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub line: String,
    pub body: String,
}

pub struct MockApi {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockApi {
    pub async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let log = log.clone();
                let routes = routes.clone();
                tokio::spawn(async move {
                    handle(socket, &routes, &log).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose request line starts with `route`.
    pub fn count(&self, route: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.line.starts_with(route))
            .count()
    }
}

async fn handle(mut socket: TcpStream, routes: &[Route], log: &Mutex<Vec<Recorded>>) {
    let Some((line, body)) = read_request(&mut socket).await else {
        return;
    };
    log.lock().unwrap().push(Recorded {
        line: line.clone(),
        body,
    });

    let route = routes
        .iter()
        .find(|r| line.starts_with(&format!("{} ", r.route)));
    let (status_line, body, delay) = match route {
        Some(r) => (r.status_line.as_str(), r.body.as_str(), r.delay),
        None => ("404 Not Found", "Not Found", Duration::ZERO),
    };

    tokio::time::sleep(delay).await;
    let response = if status_line.starts_with("204") {
        "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
    } else {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    };
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.flush().await;
}

/// Read headers plus a `Content-Length` body. Returns the request line and body.
async fn read_request(socket: &mut TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let line = head.lines().next().unwrap_or_default().to_string();
    let body = String::from_utf8_lossy(&buf[header_end..]).into_owned();
    Some((line, body))
}
