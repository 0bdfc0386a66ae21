//! `GithubClient::list_check_runs` against a local HTTP server.

use checkwait_core::{CheckStatus, Conclusion};
use checkwait_github::{GithubClient, GithubConfig, GithubError};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const FIRST_PAGE: &str = r#"{
  "total_count": 3,
  "check_runs": [
    { "id": 1, "name": "build", "status": "completed", "conclusion": "success" },
    { "id": 2, "name": "lint", "status": "completed", "conclusion": "skipped" }
  ]
}"#;

const SECOND_PAGE: &str = r#"{
  "total_count": 3,
  "check_runs": [
    { "id": 3, "name": "test", "status": "in_progress", "conclusion": null }
  ]
}"#;

/// Request heads seen by the server, in arrival order.
type Requests = Arc<Mutex<Vec<String>>>;

/// Serve canned GitHub responses on an ephemeral port.
async fn spawn_server() -> (SocketAddr, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));

    let seen = requests.clone();
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            tokio::spawn(respond(stream, addr, seen.clone()));
        }
    });

    (addr, requests)
}

async fn respond(mut stream: TcpStream, addr: SocketAddr, seen: Requests) {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            return;
        }
        head.extend_from_slice(&buf[..n]);
    }
    let head = String::from_utf8_lossy(&head).to_string();
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    seen.lock().unwrap().push(head);

    let (status, link, body) = if path.starts_with("/page2") {
        ("200 OK", None, SECOND_PAGE.to_string())
    } else if path.contains("/commits/abc123/check-runs") {
        (
            "200 OK",
            Some(format!("<http://{addr}/page2>; rel=\"next\"")),
            FIRST_PAGE.to_string(),
        )
    } else {
        (
            "401 Unauthorized",
            None,
            r#"{"message":"Bad credentials"}"#.to_string(),
        )
    };

    let mut response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
        body.len()
    );
    if let Some(link) = link {
        response.push_str(&format!("link: {link}\r\n"));
    }
    response.push_str("\r\n");
    response.push_str(&body);

    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.ok();
}

fn client(addr: SocketAddr) -> GithubClient {
    GithubClient::new(
        GithubConfig::new("octo/widgets")
            .with_endpoint(&format!("http://{addr}"))
            .with_token("t0ken"),
    )
    .expect("valid config")
}

/// Test: pages chained through `Link: rel="next"` are concatenated in order
#[tokio::test]
async fn test_follows_link_header_across_pages() {
    let (addr, requests) = spawn_server().await;

    let checks = client(addr).list_check_runs("abc123").await.expect("list failed");

    let names: Vec<&str> = checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["build", "lint", "test"]);
    assert_eq!(checks[1].conclusion, Some(Conclusion::Skipped));
    assert_eq!(checks[2].status, CheckStatus::InProgress);

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]
        .starts_with("GET /repos/octo/widgets/commits/abc123/check-runs?per_page=100 "));
    assert!(requests[1].starts_with("GET /page2 "));

    let first = requests[0].to_ascii_lowercase();
    assert!(first.contains("authorization: bearer t0ken"));
    assert!(first.contains("accept: application/vnd.github+json"));
    assert!(first.contains("x-github-api-version:"));
}

/// Test: a non-2xx response surfaces the API's JSON message
#[tokio::test]
async fn test_unauthorized_response_is_api_error() {
    let (addr, requests) = spawn_server().await;

    let err = client(addr).list_check_runs("denied").await.unwrap_err();
    match err {
        GithubError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Bad credentials");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(requests.lock().unwrap().len(), 1, "errors are not retried");
}
