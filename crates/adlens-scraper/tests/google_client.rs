//! Integration tests for `GoogleAdsClient` using wiremock HTTP mocks.

use adlens_core::Platform;
use adlens_scraper::{AdSource, GoogleAdsClient, HttpSettings, ScraperError};
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(max_retries: u32) -> HttpSettings {
    HttpSettings {
        timeout_secs: 5,
        user_agent: "adlens-test/0.1".to_owned(),
        max_retries,
        backoff_base_ms: 0,
    }
}

fn test_client(server: &MockServer, max_retries: u32) -> GoogleAdsClient {
    GoogleAdsClient::new(
        "serp-key",
        "2840",
        &format!("{}/search", server.uri()),
        settings(max_retries),
    )
    .expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_batch_sends_expected_query_and_normalizes() {
    let server = MockServer::start().await;
    let now = Utc::now();
    let ts = now.timestamp();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("engine", "google_ads_transparency_center"))
        .and(query_param("advertiser_id", "AR123"))
        .and(query_param("region", "2840"))
        .and(query_param("api_key", "serp-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ad_creatives": [{
                "advertiser_id": "AR123",
                "advertiser": "Tesla Inc.",
                "ad_creative_id": "C1",
                "format": "image",
                "image": "https://tpc.googlesyndication.com/c1.png",
                "width": 380,
                "height": 214,
                "first_shown": ts - 100,
                "last_shown": ts - 50,
                "details_link": "https://adstransparency.google.com/advertiser/AR123/creative/C1"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, 0);
    assert_eq!(client.platform(), Platform::Google);

    let batch = client.fetch_batch("AR123", now).await.expect("batch");
    assert_eq!(batch.target_id, "AR123");
    assert_eq!(batch.advertiser.as_ref().map(|a| a.name.as_str()), Some("Tesla Inc."));
    assert_eq!(batch.ads.len(), 1);
    assert!(batch.ads[0].is_active);
    assert_eq!(batch.ads[0].total_active_time, 50);
    assert_eq!(batch.image_count(), 1);
}

#[tokio::test]
async fn error_field_becomes_upstream_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "error": "Google hasn't returned any results." })),
        )
        .mount(&server)
        .await;

    let result = test_client(&server, 0).fetch_batch("AR404", Utc::now()).await;
    match result {
        Err(ScraperError::Upstream { target_id, message }) => {
            assert_eq!(target_id, "AR404");
            assert!(message.contains("any results"));
        }
        other => panic!("expected Upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_body_on_unauthorized_is_upstream_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid API key." })))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server, 3).fetch_advertiser("AR1").await;
    assert!(matches!(result, Err(ScraperError::Upstream { .. })));
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ad_creatives": [] })))
        .mount(&server)
        .await;

    let response = test_client(&server, 1)
        .fetch_advertiser("AR1")
        .await
        .expect("should succeed after retry");
    assert!(response.ad_creatives.is_empty());
}

#[tokio::test]
async fn rate_limit_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server, 3).fetch_advertiser("AR1").await;
    match result {
        Err(ScraperError::UnexpectedStatus { status, url }) => {
            assert_eq!(status, 429);
            assert!(!url.contains("serp-key"), "api key must not leak into errors");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server, 0).fetch_advertiser("AR1").await;
    assert!(matches!(result, Err(ScraperError::Deserialize { .. })));
}

#[tokio::test]
async fn missing_creative_list_is_an_empty_batch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "search_metadata": {} })))
        .mount(&server)
        .await;

    let batch = test_client(&server, 0)
        .fetch_batch("AR1", Utc::now())
        .await
        .expect("batch");
    assert!(batch.ads.is_empty());
    assert_eq!(batch.advertiser.map(|a| a.name), Some("Unknown".to_owned()));
}

#[tokio::test]
async fn timed_out_fetch_is_http_error_without_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ad_creatives": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GoogleAdsClient::new(
        "SUPERSECRET",
        "2840",
        &format!("{}/search", server.uri()),
        HttpSettings {
            timeout_secs: 1,
            ..settings(0)
        },
    )
    .expect("client construction should not fail");

    let err = client
        .fetch_batch("AR1", Utc::now())
        .await
        .expect_err("slow upstream should time out");
    match &err {
        ScraperError::Http(e) => assert!(e.is_timeout(), "expected timeout, got {e:?}"),
        other => panic!("expected Http error, got {other:?}"),
    }
    assert!(!err.to_string().contains("SUPERSECRET"));
    assert!(!format!("{err:?}").contains("SUPERSECRET"));
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = GoogleAdsClient::new("k", "2840", "::not a url::", settings(0));
    assert!(matches!(result, Err(ScraperError::InvalidBaseUrl { .. })));
}
