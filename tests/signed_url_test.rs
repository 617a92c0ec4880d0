use blobgate::{BlobStorage, GatewayStorage, StorageConfig};
use httpmock::prelude::*;
use std::collections::HashMap;
use url::Url;

fn gateway(server: &MockServer) -> GatewayStorage {
    let config = StorageConfig::new(server.base_url(), "uploads", None).unwrap();
    GatewayStorage::new(config).unwrap()
}

/// The adapter passes the gateway's signed URL through untouched; this
/// verifies the structure callers rely on: `signature`, `path` and a
/// future `expires` timestamp in the query string.
#[tokio::test]
async fn test_signed_url_structure() {
    let server = MockServer::start();
    let expires = chrono::Utc::now().timestamp() + 3600;

    server.mock(|when, then| {
        when.method(GET).path("/download/uploads%2Freport.txt");
        then.status(200).json_body(serde_json::json!({
            "url": format!(
                "https://blobs.example.com/uploads/report.txt?signature=0a1b2c3d&expires={}&path=uploads%2Freport.txt",
                expires
            )
        }));
    });

    let storage = gateway(&server);
    let signed = storage.url("uploads/report.txt").await.unwrap();

    let parsed = Url::parse(&signed).unwrap();
    let query: HashMap<String, String> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    assert!(query.contains_key("signature"), "URL should carry a signature");
    assert_eq!(query.get("path").map(String::as_str), Some("uploads/report.txt"));

    let parsed_expires: i64 = query.get("expires").unwrap().parse().unwrap();
    assert!(
        parsed_expires > chrono::Utc::now().timestamp(),
        "expiration should be in the future"
    );
}

#[tokio::test]
async fn test_missing_url_field_yields_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/download/report.txt");
        then.status(200).json_body(serde_json::json!({}));
    });

    let storage = gateway(&server);
    assert_eq!(storage.url("report.txt").await, None);
}

#[tokio::test]
async fn test_url_never_fails_on_gateway_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/download/broken.txt");
        then.status(500).body("internal error");
    });
    server.mock(|when, then| {
        when.method(GET).path("/download/garbage.txt");
        then.status(200).body("not json at all");
    });

    let storage = gateway(&server);
    assert_eq!(storage.url("broken.txt").await, None);
    assert_eq!(storage.url("garbage.txt").await, None);
}
