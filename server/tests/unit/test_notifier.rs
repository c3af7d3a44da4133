//! Notifier unit tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skydock::notifier::{deliver, MAX_ATTEMPTS};
use skydock::utils::CooldownOptions;

use crate::common::sample_payload;

fn recording_sleeper() -> (Arc<Mutex<Vec<Duration>>>, impl Fn(Duration) -> std::future::Ready<()>) {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let recorded = delays.clone();
    let sleep_fn = move |wait: Duration| {
        recorded.lock().unwrap().push(wait);
        std::future::ready(())
    };
    (delays, sleep_fn)
}

#[tokio::test]
async fn test_empty_endpoint_succeeds_without_network() {
    let (delays, sleep_fn) = recording_sleeper();
    let client = reqwest::Client::new();

    let ok = deliver(&client, "", &sample_payload(1), &CooldownOptions::default(), sleep_fn).await;

    assert!(ok);
    assert!(delays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_succeeds_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (delays, sleep_fn) = recording_sleeper();
    let client = reqwest::Client::new();
    let endpoint = format!("{}/callback", server.uri());

    let ok = deliver(&client, &endpoint, &sample_payload(1), &CooldownOptions::default(), sleep_fn)
        .await;

    assert!(ok);
    assert!(delays.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_exhausted_retries_with_doubling_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(500))
        .expect(u64::from(MAX_ATTEMPTS))
        .mount(&server)
        .await;

    let (delays, sleep_fn) = recording_sleeper();
    let client = reqwest::Client::new();
    let endpoint = format!("{}/callback", server.uri());

    let ok = deliver(&client, &endpoint, &sample_payload(1), &CooldownOptions::default(), sleep_fn)
        .await;

    assert!(!ok);
    // The delay doubles after every failed attempt, including the last one
    assert_eq!(
        *delays.lock().unwrap(),
        vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(4),
            Duration::from_secs(8),
            Duration::from_secs(16),
        ]
    );
}

#[tokio::test]
async fn test_non_200_success_status_is_retried() {
    // The original treats exactly 200 as success, not the 2xx class
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(ResponseTemplate::new(204))
        .expect(u64::from(MAX_ATTEMPTS))
        .mount(&server)
        .await;

    let (_delays, sleep_fn) = recording_sleeper();
    let client = reqwest::Client::new();
    let endpoint = format!("{}/callback", server.uri());

    let ok = deliver(&client, &endpoint, &sample_payload(1), &CooldownOptions::default(), sleep_fn)
        .await;

    assert!(!ok);
}
