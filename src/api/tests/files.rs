use super::*;
use crate::preview::FileFetcher;
use wiremock::matchers::body_string_contains;

#[tokio::test]
async fn upload_sends_multipart_files_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header("authorization", "Bearer t"))
        .and(body_string_contains("name=\"files\"; filename=\"notes.pdf\""))
        .and(body_string_contains("name=\"files\"; filename=\"graph.png\""))
        .and(body_string_contains("application/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": ["1700000000-notes.pdf", "1700000000-graph.png"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    let stored = client
        .upload_files(vec![
            UploadFile::new("notes.pdf", b"%PDF-1.4".to_vec()).unwrap(),
            UploadFile::new("graph.png", b"PNGDATA".to_vec()).unwrap(),
        ])
        .await
        .unwrap();
    assert_eq!(stored, vec!["1700000000-notes.pdf", "1700000000-graph.png"]);
}

#[tokio::test]
async fn empty_upload_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    assert!(client.upload_files(Vec::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn oversized_upload_reports_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(413).set_body_string("Payload Too Large"))
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    let err = client
        .upload_files(vec![UploadFile::new("big.pdf", vec![0; 64]).unwrap()])
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(413));
    assert_eq!(err.user_message("Upload failed"), "File too large (max 10MB)");
}

#[tokio::test]
async fn list_uploads_reads_files_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/upload/uploads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": ["a.pdf"] })))
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    assert_eq!(client.list_uploads().await.unwrap(), vec!["a.pdf"]);
}

#[tokio::test]
async fn list_uploads_tolerates_missing_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/upload/uploads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    assert!(client.list_uploads().await.unwrap().is_empty());
}

#[tokio::test]
async fn fetch_file_returns_raw_bytes() {
    let server = MockServer::start().await;
    // JSON-looking content must come back untouched
    let payload = br#"{"not":"parsed"}"#.to_vec();
    Mock::given(method("GET"))
        .and(path("/api/upload/file/my%20notes.pdf"))
        .and(header("authorization", "Bearer t"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/json")
                .set_body_bytes(payload.clone()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    let bytes = client.fetch("my notes.pdf").await.unwrap();
    assert_eq!(bytes, payload);
}

#[tokio::test]
async fn delete_file_encodes_name() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/upload/file/a%2Bb%23.png"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    client.delete_file("a+b#.png").await.unwrap();
}

#[tokio::test]
async fn missing_file_is_http_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/upload/file/gone.png"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "File not found" })))
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    let err = client.fetch_file("gone.png").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.user_message("Failed to load file"), "File not found");
}
