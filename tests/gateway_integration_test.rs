use blobgate::{BlobContent, BlobStorage, GatewayStorage, StorageConfig};
use httpmock::prelude::*;

fn gateway(server: &MockServer, token: Option<&str>) -> GatewayStorage {
    let config = StorageConfig::new(
        server.base_url(),
        "uploads",
        token.map(|t| t.to_string()),
    )
    .unwrap();
    GatewayStorage::new(config).unwrap()
}

/// The full lifecycle of one blob against a scripted gateway: upload
/// "report.txt" with b"hello", then exists / size / open / url / delete,
/// finishing with exists == false once the gateway stops knowing the
/// blob.
#[tokio::test]
async fn test_blob_lifecycle_end_to_end() {
    let server = MockServer::start();
    let expires = chrono::Utc::now().timestamp() + 900;

    let upload_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/upload")
            .body_contains("filename=\"report.txt\"")
            .body_contains("hello");
        then.status(200).json_body(serde_json::json!({
            "status": "success",
            "blob_path": "uploads/report.txt"
        }));
    });
    let mut exists_mock = server.mock(|when, then| {
        when.method(GET).path("/exists/uploads%2Freport.txt");
        then.status(200)
            .json_body(serde_json::json!({ "exists": true }));
    });
    let mut info_mock = server.mock(|when, then| {
        when.method(GET).path("/info/uploads%2Freport.txt");
        then.status(200).json_body(serde_json::json!({
            "size": 5,
            "last_modified": "Wed, 21 Oct 2015 07:28:00 GMT"
        }));
    });
    let download_mock = server.mock(|when, then| {
        when.method(GET).path("/download-stream/uploads%2Freport.txt");
        then.status(200).body("hello");
    });
    let url_mock = server.mock(|when, then| {
        when.method(GET).path("/download/uploads%2Freport.txt");
        then.status(200).json_body(serde_json::json!({
            "url": format!(
                "https://blobs.example.com/uploads/report.txt?signature=deadbeef&expires={}&path=uploads%2Freport.txt",
                expires
            )
        }));
    });
    let mut delete_mock = server.mock(|when, then| {
        when.method(DELETE).path("/delete/uploads%2Freport.txt");
        then.status(200)
            .json_body(serde_json::json!({ "status": "success" }));
    });

    let storage = gateway(&server, None);

    // Upload: the gateway-assigned blob_path becomes the canonical name.
    let saved = storage
        .save("report.txt", BlobContent::new(b"hello".to_vec()))
        .await
        .unwrap();
    assert!(saved.starts_with("uploads/report"));
    upload_mock.assert();

    assert!(storage.exists(&saved).await);
    assert_eq!(storage.size(&saved).await, 5);

    let blob = storage.open(&saved).await.unwrap();
    assert_eq!(blob.bytes.as_ref(), b"hello");
    download_mock.assert();

    let signed = storage.url(&saved).await.unwrap();
    assert!(signed.contains("signature="));
    assert!(signed.contains(&format!("expires={}", expires)));
    url_mock.assert();

    let modified = storage.modified_time(&saved).await.unwrap();
    assert_eq!(modified, storage.created_time(&saved).await.unwrap());
    assert_eq!(storage.accessed_time(&saved).await, None);

    storage.delete(&saved).await;
    delete_mock.assert();

    // The gateway no longer knows the blob; unmatched requests now come
    // back 404 and exists degrades to false.
    exists_mock.delete();
    info_mock.delete();
    assert!(!storage.exists(&saved).await);
    assert_eq!(storage.size(&saved).await, 0);

    // Deleting again is not an error.
    delete_mock.delete();
    storage.delete(&saved).await;
}

#[tokio::test]
async fn test_listing_three_blobs_under_a_prefix() {
    let server = MockServer::start();
    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/list")
            .query_param("folder", "uploads/batch");
        then.status(200).json_body(serde_json::json!({
            "folders": [],
            "files": [
                "uploads/batch/one.txt",
                "uploads/batch/two.txt",
                "uploads/batch/three.txt"
            ]
        }));
    });

    let storage = gateway(&server, None);
    let listing = storage.list_dir("uploads/batch").await;

    list_mock.assert();
    assert!(listing.folders.is_empty());
    assert_eq!(listing.files, vec!["one.txt", "two.txt", "three.txt"]);
}

#[tokio::test]
async fn test_bearer_token_reaches_every_endpoint() {
    let server = MockServer::start();
    let auth = "Bearer integration-secret";

    let upload_mock = server.mock(|when, then| {
        when.method(POST).path("/upload").header("authorization", auth);
        then.status(200).json_body(serde_json::json!({
            "status": "success",
            "blob_path": "uploads/a.txt"
        }));
    });
    let download_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/download-stream/uploads%2Fa.txt")
            .header("authorization", auth);
        then.status(200).body("payload");
    });

    let storage = gateway(&server, Some("integration-secret"));
    let saved = storage
        .save("a.txt", BlobContent::new(b"payload".to_vec()))
        .await
        .unwrap();
    storage.open(&saved).await.unwrap();

    upload_mock.assert();
    download_mock.assert();
}

/// Upload a real file from disk, download it back to disk, compare.
#[tokio::test]
async fn test_disk_file_survives_upload_and_download() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let source_path = temp_dir.path().join("source.bin");
    let content: Vec<u8> = (0u16..2048).map(|i| (i % 251) as u8).collect();
    std::fs::write(&source_path, &content).unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/upload");
        then.status(200).json_body(serde_json::json!({
            "status": "success",
            "blob_path": "uploads/source.bin"
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/download-stream/uploads%2Fsource.bin");
        then.status(200).body(content.clone());
    });

    let storage = gateway(&server, None);
    let uploaded = std::fs::read(&source_path).unwrap();
    let saved = storage
        .save("source.bin", BlobContent::new(uploaded))
        .await
        .unwrap();

    let blob = storage.open(&saved).await.unwrap();
    let download_path = temp_dir.path().join("download.bin");
    std::fs::write(&download_path, &blob.bytes).unwrap();

    assert_eq!(std::fs::read(&download_path).unwrap(), content);
}

#[tokio::test]
async fn test_unavailable_gateway_only_fails_transfers() {
    // Nothing listens here; every request is a connection error.
    let config = StorageConfig::new("http://127.0.0.1:9/api", "uploads", None).unwrap();
    let storage = GatewayStorage::new(config).unwrap();

    assert!(storage
        .save("a.txt", BlobContent::new(b"x".to_vec()))
        .await
        .is_err());
    assert!(storage.open("a.txt").await.is_err());

    // Everything else degrades to its benign default.
    storage.delete("a.txt").await;
    assert!(!storage.exists("a.txt").await);
    assert_eq!(storage.url("a.txt").await, None);
    assert_eq!(storage.size("a.txt").await, 0);
    assert_eq!(storage.created_time("a.txt").await, None);
    assert_eq!(storage.modified_time("a.txt").await, None);
    assert!(storage.list_dir("uploads").await.is_empty());
}
