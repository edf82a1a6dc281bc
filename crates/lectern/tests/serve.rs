//! Configuration file to served document, end to end.

use std::io::Write;
use std::time::Duration;

use lectern::config::ConfigLoader;
use lectern::server::ShutdownSignal;
use lectern::Application;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const DESCRIPTORS: &str = r#"
title = "Shop API"

[[types]]
schema = "Widget"
type_name = "Shop.Catalog.Widget"

[[types.properties]]
name = "name"
member = "Name"
type = "string"

[[types.properties]]
name = "_links"
member = ""
type = "object"

[[versions]]
version = "V1"
"#;

const XML_DOCS: &str = r#"<?xml version="1.0"?>
<doc>
  <members>
    <member name="T:Shop.Catalog.Widget"><summary>A widget.</summary></member>
    <member name="P:Shop.Catalog.Widget.Name">
      <summary>Display name.</summary>
      <example>Sprocket</example>
    </member>
  </members>
</doc>"#;

fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn configured_instance_serves_enriched_document() {
    let descriptors = temp_file(".toml", DESCRIPTORS);
    let docs = temp_file(".xml", XML_DOCS);
    let config_toml = format!(
        r#"
[server]
http_addr = "127.0.0.1:0"
shutdown_timeout_secs = 1

[docs]
route = "/docs/{{apiVersion}}"
cors_allow_origin = "https://ui.example.com"
root_url = "https://shop.example.com/"
descriptor_path = '{}'
documentation_paths = ['{}']

[telemetry.metrics]
enabled = false
"#,
        descriptors.path().display(),
        docs.path().display()
    );

    let config = ConfigLoader::new()
        .with_string(&config_toml, "toml")
        .unwrap()
        .load()
        .unwrap();
    let app = Application::from_config(config).unwrap();
    assert_eq!(app.summary().documented_members, 2);

    let server = app.into_server().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let handle = tokio::spawn(server.serve(listener, shutdown.clone()));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /docs/v1 HTTP/1.1\r\nHost: internal:8080\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let response = String::from_utf8(raw).unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response
        .to_ascii_lowercase()
        .contains("access-control-allow-origin: https://ui.example.com"));
    assert!(response.contains(r#""host":"shop.example.com""#));
    assert!(response.contains(r#""description":"A widget.""#));
    assert!(response.contains(r#""example":"Sprocket""#));
    assert!(response.contains(r#""_links":{"type":"object"}"#));

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
