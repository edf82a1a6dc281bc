//! Serves descriptor documents over a real TCP socket.

use std::sync::Arc;
use std::time::Duration;

use lectern_docs::{
    default_formatters, DocsError, DocsResult, Document, DocumentGenerator, DocumentPipeline,
    JsonFormatting, Schema,
};
use lectern_server::{DocsResponder, ResponderOptions, Server, ServerConfig, ShutdownSignal};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

struct ShopGenerator;

impl DocumentGenerator for ShopGenerator {
    fn generate(&self, root_url: &str, api_version: &str) -> DocsResult<Document> {
        match api_version {
            "V1" | "V2" => Ok(Document::new("Shop", api_version)
                .with_host(root_url.trim_start_matches("http://"))
                .definition("Widget", Schema::object().property("name", Schema::string()))),
            other => Err(DocsError::unknown_api_version(
                other,
                vec!["V1".into(), "V2".into()],
            )),
        }
    }
}

async fn start() -> (std::net::SocketAddr, ShutdownSignal, tokio::task::JoinHandle<()>) {
    let pipeline = Arc::new(DocumentPipeline::new(Arc::new(ShopGenerator)));
    let responder = DocsResponder::new(pipeline, default_formatters(JsonFormatting::Compact))
        .with_options(ResponderOptions {
            no_caching: false,
            cors_allow_origin: Some("*".to_string()),
        });
    let server = Server::builder(responder)
        .config(
            ServerConfig::builder()
                .shutdown_timeout(Duration::from_secs(1))
                .build(),
        )
        .build()
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let signal = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.serve(listener, signal).await.unwrap();
    });

    (addr, shutdown, handle)
}

async fn send(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

fn get(path: &str, extra: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: docs.example.com\r\n{extra}Connection: close\r\n\r\n")
}

#[tokio::test]
async fn serves_document_over_tcp() {
    let (addr, shutdown, handle) = start().await;

    let response = send(addr, &get("/swagger/docs/v2", "")).await;
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    let lower = response.to_ascii_lowercase();
    assert!(lower.contains("content-type: application/json; charset=utf-8"));
    assert!(lower.contains("access-control-allow-origin: *"));
    assert!(lower.contains("last-modified: "));
    assert!(lower.contains("x-request-id: "));
    assert!(response.contains(r#""host":"docs.example.com""#));
    assert!(response.contains(r#""version":"V2""#));

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn echoed_last_modified_is_not_modified() {
    let (addr, shutdown, handle) = start().await;

    let first = send(addr, &get("/swagger/docs/V1", "")).await;
    let stamp = first
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(": ")?;
            name.eq_ignore_ascii_case("last-modified").then(|| value.to_string())
        })
        .unwrap();

    let second = send(
        addr,
        &get("/swagger/docs/V1", &format!("If-Modified-Since: {stamp}\r\n")),
    )
    .await;
    assert!(second.starts_with("HTTP/1.1 304"), "{second}");

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn unknown_version_lists_known_versions() {
    let (addr, shutdown, handle) = start().await;

    let response = send(addr, &get("/swagger/docs/v9", "")).await;
    assert!(response.starts_with("HTTP/1.1 404"), "{response}");
    assert!(response.contains("UNKNOWN_API_VERSION"));
    assert!(response.contains(r#""known_versions":["V1","V2"]"#));

    shutdown.trigger();
    handle.await.unwrap();
}

#[tokio::test]
async fn probes_and_unmatched_routes() {
    let (addr, shutdown, handle) = start().await;

    let health = send(addr, &get("/health", "")).await;
    assert!(health.starts_with("HTTP/1.1 200"), "{health}");

    let ready = send(addr, &get("/ready", "")).await;
    assert!(ready.starts_with("HTTP/1.1 200"), "{ready}");

    let missing = send(addr, &get("/swagger/ui/index.html", "")).await;
    assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

    let delete = send(
        addr,
        "DELETE /swagger/docs/V1 HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(delete.starts_with("HTTP/1.1 405"), "{delete}");
    assert!(delete.to_ascii_lowercase().contains("allow: get"));

    shutdown.trigger();
    handle.await.unwrap();
}
