use super::*;
use crate::session::MemorySessionStore;
use crate::test_helpers::{api_client, article_json};
use crate::types::{ArticleId, ArticleUpdate, NewArticle, Session};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

mod files;

fn no_auth_header(req: &Request) -> bool {
    !req.headers.contains_key("authorization")
}

#[tokio::test]
async fn attaches_bearer_token_from_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("tok-123"));
    let articles = client.list_articles().await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn no_session_sends_no_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(no_auth_header)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), None);
    client.list_articles().await.unwrap();
}

#[tokio::test]
async fn blank_token_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(no_auth_header)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("   "));
    client.list_articles().await.unwrap();
}

#[tokio::test]
async fn token_is_read_per_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::with_session(Session::with_token("first")));
    let config = ApiConfig {
        base_url: format!("{}/api", server.uri()),
        ..Default::default()
    };
    let client = ApiClient::new(&config, store.clone()).unwrap();

    store.save(&Session::with_token("second")).unwrap();
    client.list_articles().await.unwrap();
}

#[tokio::test]
async fn list_articles_decodes_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            article_json("a1", "Big O", "DSA"),
            article_json("a2", "Paging", "os"),
        ])))
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    let articles = client.list_articles().await.unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].id, "a1");
    assert_eq!(articles[1].normalized_subject(), "os");
}

#[tokio::test]
async fn create_article_posts_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/articles"))
        .and(body_json(json!({
            "title": "Heaps",
            "content": "# Heaps",
            "subject": "dsa",
            "files": ["heap.png"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(article_json("n1", "Heaps", "dsa")))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    let created = client
        .create_article(&NewArticle {
            title: "Heaps".into(),
            content: Some("# Heaps".into()),
            subject: "dsa".into(),
            files: vec!["heap.png".into()],
        })
        .await
        .unwrap();
    assert_eq!(created.id, "n1");
}

#[tokio::test]
async fn update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    let mut body = article_json("a1", "Big O", "dsa");
    body["pinned"] = json!(true);
    Mock::given(method("PUT"))
        .and(path("/api/articles/a1"))
        .and(body_json(json!({ "pinned": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    let updated = client
        .update_article(&ArticleId::new("a1"), &ArticleUpdate::pinned(true))
        .await
        .unwrap();
    assert!(updated.pinned);
}

#[tokio::test]
async fn delete_accepts_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/articles/a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    client.delete_article(&ArticleId::new("a1")).await.unwrap();
}

#[tokio::test]
async fn unauthorized_surfaces_as_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("expired"));
    let err = client.list_articles().await.unwrap_err();
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.user_message("Failed to load articles"), "Please log in again");
}

#[tokio::test]
async fn server_message_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/articles"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Title is required" })),
        )
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), Some("t"));
    let err = client
        .create_article(&NewArticle::default())
        .await
        .unwrap_err();
    match err {
        Error::Http {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Title is required");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    // port 1 is never listening
    let client = api_client("http://127.0.0.1:1", None);
    let err = client.list_articles().await.unwrap_err();
    assert!(matches!(err, Error::Network(_)), "got {err:?}");
    assert_eq!(err.user_message("Failed to load articles"), "Failed to load articles");
}

#[tokio::test]
async fn malformed_json_is_serialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = api_client(&server.uri(), None);
    let err = client.list_articles().await.unwrap_err();
    assert!(matches!(err, Error::Serialization(_)), "got {err:?}");
}

#[test]
fn endpoint_keeps_base_path() {
    let client = api_client("http://localhost:5000", None);
    assert_eq!(
        client.endpoint("/articles").unwrap().as_str(),
        "http://localhost:5000/api/articles"
    );
    assert_eq!(
        client.endpoint("upload/file/a%20b.pdf").unwrap().as_str(),
        "http://localhost:5000/api/upload/file/a%20b.pdf"
    );
}
