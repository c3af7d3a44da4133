//! GitHub client unit tests

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skydock::github::client::GitHubClient;
use skydock::github::RepositoryHost;
use skydock::settings::GitHubSettings;

fn client_for(server: &MockServer) -> GitHubClient {
    GitHubClient::new(&GitHubSettings {
        api_base: server.uri(),
        owner: "octo".to_string(),
        token: SecretString::from("test-token".to_string()),
    })
    .unwrap()
}

#[tokio::test]
async fn test_commit_creates_missing_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/index.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/index.html"))
        .and(body_partial_json(json!({"message": "Deploy index.html"})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .commit_text("demo", "index.html", "<html></html>", "Deploy index.html")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_commit_updates_existing_path_with_sha() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/index.html"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"sha": "blob-sha", "content": ""})),
        )
        .mount(&server)
        .await;
    // The prior blob SHA must ride along for an update
    Mock::given(method("PUT"))
        .and(path("/repos/octo/demo/contents/index.html"))
        .and(body_partial_json(json!({"sha": "blob-sha"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .commit_text("demo", "index.html", "<html>v2</html>", "Deploy index.html")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_ensure_repo_short_circuits_on_existing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "octo/demo",
            "html_url": "https://github.com/octo/demo",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let repo = client.ensure_repo("demo", "desc").await.unwrap();
    assert_eq!(repo.full_name, "octo/demo");
    assert_eq!(repo.html_url, "https://github.com/octo/demo");
}

#[tokio::test]
async fn test_ensure_repo_creates_on_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_partial_json(json!({
            "name": "demo",
            "private": false,
            "auto_init": false,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "full_name": "octo/demo",
            "html_url": "https://github.com/octo/demo",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let repo = client.ensure_repo("demo", "desc").await.unwrap();
    assert_eq!(repo.html_url, "https://github.com/octo/demo");
}

#[tokio::test]
async fn test_fetch_text_decodes_wrapped_base64() {
    let server = MockServer::start().await;

    // The contents API wraps base64 at 60 columns
    let mut encoded = BASE64_STANDARD.encode("# Prior Docs");
    encoded.insert(8, '\n');
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/README.md"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"sha": "abc", "content": encoded})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let docs = client.fetch_text("demo", "README.md").await.unwrap();
    assert_eq!(docs, "# Prior Docs");
}

#[tokio::test]
async fn test_fetch_text_missing_path_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/contents/README.md"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.fetch_text("demo", "README.md").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_activate_pages_accepts_201_and_204() {
    for status in [201, 204] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/demo/pages"))
            .and(body_partial_json(json!({"source": {"branch": "main", "path": "/"}})))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.activate_pages("demo").await.unwrap();
    }
}

#[tokio::test]
async fn test_activate_pages_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/demo/pages"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.activate_pages("demo").await.is_err());
}

#[tokio::test]
async fn test_latest_commit_sha() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits"))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"sha": "deadbeef"}])),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.latest_commit_sha("demo").await.unwrap(), "deadbeef");
}

#[tokio::test]
async fn test_latest_commit_sha_empty_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/demo/commits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.latest_commit_sha("demo").await.unwrap_err().is_not_found());
}
