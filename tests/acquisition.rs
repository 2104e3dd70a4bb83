//! Integration tests for chart acquisition
//!
//! Drives `ChartService` with the real API and chart page sources against
//! wiremock servers, persisting to a JSON cache file in a temp directory.

use std::fs;

use chartcache::cache::{Cache, CacheStore, JsonFileStore};
use chartcache::data::{ApiSource, ChartResult, ChartSource, ScrapeSource, SourceConfig};
use chartcache::service::ChartService;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_body(year: i32, count: usize) -> serde_json::Value {
    let entries: Vec<_> = (1..=count)
        .map(|i| serde_json::json!({ "title": format!("{year} Song {i}"), "artist": format!("Artist {i}") }))
        .collect();
    serde_json::json!({ "entries": entries })
}

fn chart_page(count: usize) -> String {
    (1..=count)
        .map(|i| {
            format!(
                r#"<div class="o-chart-results-list-row"><h3>Page Song {i}</h3><span class="c-label">Page Artist {i}</span></div>"#
            )
        })
        .collect()
}

async fn mount_api(server: &MockServer, year: i32, count: usize, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/charts/hot-100/year-end/{year}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_body(year, count)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, year: i32, count: usize, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/charts/year-end/{year}/hot-100-songs/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(chart_page(count)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn sources(api: &MockServer, pages: &MockServer) -> Vec<Box<dyn ChartSource>> {
    let config = SourceConfig {
        chart_host: pages.uri(),
        ..SourceConfig::default()
    };
    let sources: Vec<Box<dyn ChartSource>> = vec![
        Box::new(ApiSource::with_base_url(api.uri())),
        Box::new(ScrapeSource::new(&config).unwrap()),
    ];
    sources
}

fn store_in(temp_dir: &TempDir) -> JsonFileStore {
    JsonFileStore::open(temp_dir.path().join("billboard_cache.json"))
}

fn assert_ranked(chart: &ChartResult) {
    assert!(chart.len() <= 20);
    for (i, entry) in chart.iter().enumerate() {
        assert_eq!(entry.rank as usize, i + 1);
    }
}

#[tokio::test]
async fn test_primary_chart_is_cached_and_served_offline() {
    let temp_dir = TempDir::new().unwrap();
    let api = MockServer::start().await;
    let pages = MockServer::start().await;
    mount_api(&api, 1999, 20, 1).await;
    mount_page(&pages, 1999, 20, 0).await;

    let service = ChartService::new(store_in(&temp_dir), sources(&api, &pages));
    let chart = service.get_top(1999, false).await.unwrap();

    assert_eq!(chart.len(), 20);
    assert_ranked(&chart);
    assert_eq!(chart.entries()[0].title, "1999 Song 1");

    // A second service with no sources at all must answer from the cache file.
    let offline = ChartService::new(store_in(&temp_dir), Vec::new());
    let cached = offline.get_top(1999, false).await.unwrap();
    assert_eq!(cached, chart);
}

#[tokio::test]
async fn test_fallback_page_used_when_api_fails() {
    let temp_dir = TempDir::new().unwrap();
    let api = MockServer::start().await;
    let pages = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&api)
        .await;
    mount_page(&pages, 1998, 30, 1).await;

    let service = ChartService::new(store_in(&temp_dir), sources(&api, &pages));
    let chart = service.get_top(1998, false).await.unwrap();

    assert_eq!(chart.len(), 20);
    assert_ranked(&chart);
    assert_eq!(chart.entries()[0].title, "Page Song 1");
    assert!(service.store().load().unwrap().contains(1998));
}

#[tokio::test]
async fn test_fallback_used_when_api_has_no_entries() {
    let temp_dir = TempDir::new().unwrap();
    let api = MockServer::start().await;
    let pages = MockServer::start().await;
    mount_api(&api, 1987, 0, 1).await;
    mount_page(&pages, 1987, 5, 1).await;

    let service = ChartService::new(store_in(&temp_dir), sources(&api, &pages));
    let chart = service.get_top(1987, false).await.unwrap();

    assert_eq!(chart.len(), 5);
    assert_ranked(&chart);
}

#[tokio::test]
async fn test_force_refresh_hits_api_and_overwrites_entry() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);
    let mut cache = Cache::new();
    cache.insert(2004, ChartResult::from_ranked([("Stale", "Old")]));
    store.save(&cache).unwrap();

    let api = MockServer::start().await;
    let pages = MockServer::start().await;
    mount_api(&api, 2004, 3, 1).await;

    let service = ChartService::new(store, sources(&api, &pages));
    let chart = service.get_top(2004, true).await.unwrap();

    assert_eq!(chart.entries()[0].title, "2004 Song 1");
    let stored = service.store().load().unwrap();
    assert_eq!(stored.get(2004), Some(&chart));
}

#[tokio::test]
async fn test_cache_hit_makes_no_requests() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);
    let mut cache = Cache::new();
    cache.insert(1985, ChartResult::from_ranked([("Careless Whisper", "Wham!")]));
    store.save(&cache).unwrap();

    let api = MockServer::start().await;
    let pages = MockServer::start().await;
    mount_api(&api, 1985, 20, 0).await;
    mount_page(&pages, 1985, 20, 0).await;

    let service = ChartService::new(store, sources(&api, &pages));
    let chart = service.get_top(1985, false).await.unwrap();

    assert_eq!(chart.len(), 1);
    assert_eq!(chart.entries()[0].title, "Careless Whisper");
}

#[tokio::test]
async fn test_year_without_chart_leaves_cache_file_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);
    let mut cache = Cache::new();
    cache.insert(1999, ChartResult::from_ranked([("Smooth", "Santana")]));
    store.save(&cache).unwrap();
    let before = fs::read(store.path()).unwrap();

    let api = MockServer::start().await;
    let pages = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&api)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>No chart</body></html>"))
        .mount(&pages)
        .await;

    let service = ChartService::new(store, sources(&api, &pages));
    let chart = service.get_top(1942, false).await.unwrap();

    assert!(chart.is_empty());
    let after = fs::read(service.store().path()).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_corrupt_cache_propagates_before_any_request() {
    let temp_dir = TempDir::new().unwrap();
    let store = store_in(&temp_dir);
    fs::write(store.path(), "[1, 2, 3]").unwrap();

    let api = MockServer::start().await;
    let pages = MockServer::start().await;
    mount_api(&api, 1999, 20, 0).await;

    let service = ChartService::new(store, sources(&api, &pages));

    assert!(service.get_top(1999, false).await.is_err());
}

#[test]
fn test_cache_roundtrip_across_store_handles() {
    let temp_dir = TempDir::new().unwrap();
    let mut cache = Cache::new();
    cache.insert(1999, ChartResult::from_ranked([("Smooth", "Santana"), ("Believe", "Cher")]));
    cache.insert(2004, ChartResult::from_ranked([("Yeah!", "Usher")]));

    store_in(&temp_dir).save(&cache).unwrap();
    let reloaded = store_in(&temp_dir).load().unwrap();

    assert_eq!(reloaded, cache);
}
