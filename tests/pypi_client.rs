// SPDX-License-Identifier: MPL-2.0

use pypubgrub::cache::Cache;
use pypubgrub::config::{CacheConfig, FetcherConfig, PyPIClientConfig};
use pypubgrub::http::Fetcher;
use pypubgrub::pypi::PyPIClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_cache() -> Cache {
    Cache::new(&CacheConfig {
        disk_dir: None,
        ..Default::default()
    })
}

fn test_fetcher() -> Fetcher {
    Fetcher::new(&FetcherConfig::default())
}

#[tokio::test]
async fn fast_path_fetches_metadata_for_the_best_wheel_per_version() {
    let server = MockServer::start().await;

    let simple_page = format!(
        r#"<!DOCTYPE html><html><body>
        <a href="{base}/foo-1.0.0-py3-none-any.whl#sha256=abc" data-dist-info-metadata="true">foo-1.0.0-py3-none-any.whl</a>
        <a href="{base}/foo-1.0.0.tar.gz">foo-1.0.0.tar.gz</a>
        </body></html>"#,
        base = server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/simple/foo/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(simple_page))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/foo-1.0.0-py3-none-any.whl.metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "Metadata-Version: 2.1\nName: foo\nVersion: 1.0.0\nRequires-Dist: bar>=1.0\n\n",
        ))
        .mount(&server)
        .await;

    let client = PyPIClient::new(
        &PyPIClientConfig {
            json_api_url: format!("{}/pypi", server.uri()),
            simple_api_url: format!("{}/simple", server.uri()),
        },
        test_fetcher(),
        test_cache(),
    );

    let versions = client.get_package("foo").await.unwrap();
    let metadata = versions.versions.get("1.0.0").expect("version 1.0.0 present");
    assert_eq!(metadata.requires_dist, vec!["bar>=1.0"]);
}

#[tokio::test]
async fn falls_back_to_json_api_when_simple_page_has_no_wheels() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/simple/foo/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pypi/foo/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"info": {"name": "foo", "version": "2.0.0", "requires_dist": ["baz"]}, "releases": {"2.0.0": []}}"#,
        ))
        .mount(&server)
        .await;

    let client = PyPIClient::new(
        &PyPIClientConfig {
            json_api_url: format!("{}/pypi", server.uri()),
            simple_api_url: format!("{}/simple", server.uri()),
        },
        test_fetcher(),
        test_cache(),
    );

    let versions = client.get_package("foo").await.unwrap();
    let metadata = versions.versions.get("2.0.0").expect("version 2.0.0 present");
    assert_eq!(metadata.requires_dist, vec!["baz"]);
}

#[tokio::test]
async fn json_fallback_with_multiple_releases_surfaces_every_version() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/simple/foo/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pypi/foo/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"info": {"name": "foo", "version": "2.0.0", "requires_dist": ["baz"]}, "releases": {"1.0.0": [], "1.5.0": [], "2.0.0": []}}"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pypi/foo/1.0.0/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"info": {"name": "foo", "version": "1.0.0", "requires_dist": ["bar==1.0"]}, "releases": {}}"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pypi/foo/1.5.0/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"info": {"name": "foo", "version": "1.5.0", "requires_dist": ["bar>=1.5"]}, "releases": {}}"#,
        ))
        .mount(&server)
        .await;

    let client = PyPIClient::new(
        &PyPIClientConfig {
            json_api_url: format!("{}/pypi", server.uri()),
            simple_api_url: format!("{}/simple", server.uri()),
        },
        test_fetcher(),
        test_cache(),
    );

    let versions = client.get_package("foo").await.unwrap();
    assert_eq!(versions.versions.len(), 3);
    assert_eq!(
        versions.versions.get("1.0.0").unwrap().requires_dist,
        vec!["bar==1.0"]
    );
    assert_eq!(
        versions.versions.get("1.5.0").unwrap().requires_dist,
        vec!["bar>=1.5"]
    );
    assert_eq!(
        versions.versions.get("2.0.0").unwrap().requires_dist,
        vec!["baz"]
    );
}

#[tokio::test]
async fn package_not_found_on_both_apis_surfaces_as_package_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/simple/missing/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = PyPIClient::new(
        &PyPIClientConfig {
            json_api_url: format!("{}/pypi", server.uri()),
            simple_api_url: format!("{}/simple", server.uri()),
        },
        test_fetcher(),
        test_cache(),
    );

    let err = client.get_package("missing").await.unwrap_err();
    assert!(matches!(err, pypubgrub::PyPIError::PackageNotFound(_)));
}
