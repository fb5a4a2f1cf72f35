//! Reqwest transport against a local HTTP server.

use gh_oss_stats::mocks::fixtures;
use gh_oss_stats::{
    CollectOptions, GitHubConfig, GitHubErrorKind, OssStatsClient, RateLimitConfig, StatsError,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> OssStatsClient {
    let config = GitHubConfig::builder()
        .base_url(server.uri())
        .token("ghp_wire")
        .rate_limit(RateLimitConfig::immediate())
        .build()
        .unwrap();
    OssStatsClient::new(config).unwrap()
}

fn search_only() -> CollectOptions {
    CollectOptions::builder()
        .include_pr_details(false)
        .include_repo_details(false)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_requests_carry_github_headers() {
    let server = MockServer::start().await;
    let page = fixtures::search_page(
        1,
        vec![fixtures::hit("acme", "widgets", 1, Some("2024-01-01T00:00:00Z"))],
    );

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param("q", "author:octocat is:pr is:merged archived:false"))
        .and(query_param("sort", "updated"))
        .and(query_param("order", "desc"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .and(header("authorization", "Bearer ghp_wire"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page))
        .expect(1)
        .mount(&server)
        .await;

    let stats = client(&server).collect("octocat", &search_only()).await.unwrap();

    assert_eq!(stats.summary.total_prs_merged, 1);
}

#[tokio::test]
async fn test_error_body_text_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_string(r#"{"message":"Validation Failed","errors":[{"code":"invalid"}]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .collect("octocat", &search_only())
        .await
        .unwrap_err();

    let StatsError::Api(error) = err else {
        panic!("expected an API error");
    };
    assert_eq!(error.kind(), GitHubErrorKind::ValidationFailed);
    assert_eq!(error.status_code(), Some(422));
    assert!(error.message().contains("Validation Failed"));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": {
                "core": {"limit": 5000, "remaining": 4999, "reset": 1_900_000_000, "used": 1},
                "search": {"limit": 30, "remaining": 30, "reset": 1_900_000_000, "used": 0}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server).rate_limit_status().await.unwrap();

    assert_eq!(status.resources.core.remaining, 4999);
}

#[tokio::test]
async fn test_malformed_json_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let err = client(&server)
        .collect("octocat", &search_only())
        .await
        .unwrap_err();

    assert!(matches!(err, StatsError::Api(ref e) if e.kind() == GitHubErrorKind::DeserializationError));
}
