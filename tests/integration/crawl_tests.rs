//! Integration tests for the exporter
//!
//! These tests use wiremock to serve profile, listing and detail pages and
//! run the full export cycle end-to-end.

use filmow_exporter::config::Config;
use filmow_exporter::crawler::{
    check_user, discover_page_count, export_user, CrawlSession, Orchestrator,
};
use filmow_exporter::output::{read_csv, CsvSink, MemorySink};
use filmow_exporter::{CrawlStatus, ExporterError};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NOT_FOUND: &str = "Vixi! - Página não encontrada";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, output_dir: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.crawler.max_concurrent_fetches = 8;
    config.crawler.request_timeout = 20;
    config.crawler.connect_timeout = 5;
    config.output.directory = output_dir.to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn not_found_page() -> ResponseTemplate {
    html(&format!("<h1>{}</h1>", NOT_FOUND))
}

fn status_page(status: u16, heading: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_string(format!(
        "<html><body><h1>{}</h1></body></html>",
        heading
    ))
}

fn pagination(user: &str, last_page: u32) -> String {
    format!(
        r#"<div class="pagination"><ul>
            <li><a href="/usuario/{user}/filmes/ja-vi/?pagina=1">1</a></li>
            <li><a href="/usuario/{user}/filmes/ja-vi/?pagina={last}">{last}</a></li>
            <li><a href="/usuario/{user}/filmes/ja-vi/?pagina=2">próxima</a></li>
        </ul></div>"#,
        user = user,
        last = last_page
    )
}

fn entry(slug: &str, rating: Option<&str>) -> String {
    let stars = rating
        .map(|r| format!(r#"<span class="star-rating" title="Nota {} estrelas"></span>"#, r))
        .unwrap_or_default();
    format!(
        r#"<li class="movie_list_item">{}<a class="tip-movie" href="/filme/{}/">{}</a></li>"#,
        stars, slug, slug
    )
}

fn detail(title: &str, director: &str, year: &str) -> String {
    format!(
        r#"<h1>{title} (nome nacional)</h1>
        <h2 class="movie-original-title">{title}</h2>
        <small class="release">{year}</small>
        <span itemprop="director">Direção: <strong>{director}</strong></span>"#,
        title = title,
        director = director,
        year = year
    )
}

async fn mount_profile(server: &MockServer, user: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/usuario/{}", user)))
        .respond_with(html(&format!("<h1>{}</h1>", user)))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, user: &str, page: u32, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/usuario/{}/filmes/ja-vi/", user)))
        .and(query_param("pagina", page.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/filme/{}/", slug)))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_export_preserves_page_and_document_order() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    mount_profile(&mock_server, "imp2").await;

    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!(
            "{}<ul>{}{}</ul>",
            pagination("imp2", 2),
            entry("p1-m1", Some("4.5")),
            entry("p1-m2", Some("3"))
        )),
    )
    .await;
    mount_listing(
        &mock_server,
        "imp2",
        2,
        html(&format!(
            "{}<ul>{}{}</ul>",
            pagination("imp2", 2),
            entry("p2-m1", None),
            entry("p2-m2", Some("5"))
        )),
    )
    .await;

    // The first movie of each page answers last
    mount_detail(
        &mock_server,
        "p1-m1",
        html(&detail("First", "Dir A", "2001")).set_delay(Duration::from_millis(400)),
    )
    .await;
    mount_detail(&mock_server, "p1-m2", html(&detail("Second", "Dir B", "2002"))).await;
    mount_detail(
        &mock_server,
        "p2-m1",
        html(&detail("Third", "Dir C", "2003")).set_delay(Duration::from_millis(200)),
    )
    .await;
    mount_detail(&mock_server, "p2-m2", html(&detail("Fourth", "Dir D", "2004"))).await;

    let config = create_test_config(&mock_server.uri(), output.path().to_str().unwrap());
    let mut sink = CsvSink::new(output.path());
    let stats = export_user(config, "imp2", &mut sink)
        .await
        .expect("Export failed");

    assert_eq!(stats.pages, 2);
    assert_eq!(stats.movies, 4);
    assert_eq!(stats.missing_rating, 1);

    let content = std::fs::read_to_string(output.path().join("imp2.csv")).unwrap();
    assert_eq!(
        content,
        "Title,Directors,Year,Rating\n\
         First,Dir A,2001,4.5\n\
         Second,Dir B,2002,3\n\
         Third,Dir C,2003,\n\
         Fourth,Dir D,2004,5\n"
    );

    let records = read_csv(content.as_bytes()).unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third", "Fourth"]);
}

#[tokio::test]
async fn test_invalid_user_issues_no_listing_or_detail_fetches() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/usuario/ghost"))
        .respond_with(not_found_page())
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usuario/ghost/filmes/ja-vi/"))
        .respond_with(html(""))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/filme/anything/"))
        .respond_with(html(""))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), output.path().to_str().unwrap());
    let mut sink = CsvSink::new(output.path());
    let err = export_user(config, "ghost", &mut sink).await.unwrap_err();

    assert!(matches!(err, ExporterError::InvalidUser { .. }));
    assert!(!output.path().join("ghost.csv").exists());
}

#[tokio::test]
async fn test_check_user() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, "imp2").await;
    Mock::given(method("GET"))
        .and(path("/usuario/ghost"))
        .respond_with(status_page(404, NOT_FOUND))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/usuario/broken"))
        .respond_with(status_page(404, "Error"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), ".");
    assert!(check_user(&config, "imp2").await.unwrap());
    assert!(!check_user(&config, "ghost").await.unwrap());

    let err = check_user(&config, "broken").await.unwrap_err();
    assert!(matches!(err, ExporterError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_listing_404_without_heading_fails_crawl() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    mount_profile(&mock_server, "imp2").await;

    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!("{}<ul>{}</ul>", pagination("imp2", 2), entry("a", Some("4")))),
    )
    .await;
    mount_listing(&mock_server, "imp2", 2, status_page(404, "Error")).await;
    mount_detail(&mock_server, "a", html(&detail("A", "Dir", "2000"))).await;

    let config = create_test_config(&mock_server.uri(), output.path().to_str().unwrap());
    let mut sink = CsvSink::new(output.path());
    let err = export_user(config, "imp2", &mut sink).await.unwrap_err();

    assert!(matches!(err, ExporterError::Status { status: 404, .. }));
    assert!(err.is_network_error());
    assert!(err.url().unwrap().ends_with("/usuario/imp2/filmes/ja-vi/?pagina=2"));
    assert!(!output.path().join("imp2.csv").exists());
}

#[tokio::test]
async fn test_listing_404_with_heading_is_vanished_page() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, "imp2").await;

    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!("{}<ul>{}</ul>", pagination("imp2", 2), entry("a", None))),
    )
    .await;
    mount_listing(&mock_server, "imp2", 2, status_page(404, NOT_FOUND)).await;
    mount_detail(&mock_server, "a", html(&detail("A", "Dir", "2000"))).await;

    let config = create_test_config(&mock_server.uri(), ".");
    let mut sink = MemorySink::default();
    let err = export_user(config, "imp2", &mut sink).await.unwrap_err();

    assert!(matches!(err, ExporterError::PageVanished { page: 2, .. }));
    assert!(sink.records.is_empty());
}

#[tokio::test]
async fn test_detail_404_fails_crawl() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, "imp2").await;
    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!("<ul>{}{}</ul>", entry("ok", None), entry("gone", Some("4")))),
    )
    .await;
    mount_detail(&mock_server, "ok", html(&detail("Ok", "Dir", "2010"))).await;
    mount_detail(&mock_server, "gone", status_page(404, NOT_FOUND)).await;

    let config = create_test_config(&mock_server.uri(), ".");
    let mut orchestrator = Orchestrator::new(config, "imp2");
    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(err, ExporterError::Status { status: 404, .. }));
    assert!(err.url().unwrap().ends_with("/filme/gone/"));
    assert_eq!(orchestrator.state().failed_phase(), Some(CrawlStatus::Crawling));
}

#[tokio::test]
async fn test_vanished_page_fails_crawl_without_output() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    mount_profile(&mock_server, "imp2").await;

    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!("{}<ul>{}</ul>", pagination("imp2", 3), entry("a", Some("4")))),
    )
    .await;
    mount_listing(&mock_server, "imp2", 2, not_found_page()).await;
    mount_listing(
        &mock_server,
        "imp2",
        3,
        html(&format!("{}<ul>{}</ul>", pagination("imp2", 3), entry("c", None))),
    )
    .await;
    mount_detail(&mock_server, "a", html(&detail("A", "Dir", "2000"))).await;
    mount_detail(&mock_server, "c", html(&detail("C", "Dir", "2000"))).await;

    let config = create_test_config(&mock_server.uri(), output.path().to_str().unwrap());
    let mut orchestrator = Orchestrator::new(config, "imp2");
    let err = orchestrator.run().await.unwrap_err();

    match err {
        ExporterError::PageVanished { page, ref url } => {
            assert_eq!(page, 2);
            assert!(url.ends_with("/usuario/imp2/filmes/ja-vi/?pagina=2"));
        }
        other => panic!("expected PageVanished, got {:?}", other),
    }
    assert_eq!(orchestrator.state().status(), CrawlStatus::Failed);
    assert_eq!(orchestrator.state().failed_phase(), Some(CrawlStatus::Crawling));
    assert_eq!(orchestrator.state().total_pages(), Some(3));

    let mut sink = CsvSink::new(output.path());
    let config = create_test_config(&mock_server.uri(), output.path().to_str().unwrap());
    assert!(export_user(config, "imp2", &mut sink).await.is_err());
    assert!(!output.path().join("imp2.csv").exists());
    assert!(sink.last_path().is_none());
}

#[tokio::test]
async fn test_failure_cancels_slow_siblings() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, "imp2").await;

    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!("{}<ul>{}</ul>", pagination("imp2", 2), entry("slow", None))),
    )
    .await;
    mount_listing(
        &mock_server,
        "imp2",
        2,
        not_found_page().set_delay(Duration::from_millis(100)),
    )
    .await;
    mount_detail(
        &mock_server,
        "slow",
        html(&detail("Slow", "Dir", "1990")).set_delay(Duration::from_secs(10)),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), ".");
    let mut sink = MemorySink::default();
    let started = Instant::now();
    let err = export_user(config, "imp2", &mut sink).await.unwrap_err();

    assert!(matches!(err, ExporterError::PageVanished { page: 2, .. }));
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "crawl waited for a cancelled fetch: {:?}",
        started.elapsed()
    );
    assert!(sink.records.is_empty());
    assert!(sink.user.is_none());
}

#[tokio::test]
async fn test_network_error_on_detail_page_fails_crawl() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, "imp2").await;
    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!("<ul>{}{}</ul>", entry("ok", None), entry("broken", None))),
    )
    .await;
    mount_detail(&mock_server, "ok", html(&detail("Ok", "Dir", "2010"))).await;
    mount_detail(&mock_server, "broken", ResponseTemplate::new(502)).await;

    let config = create_test_config(&mock_server.uri(), ".");
    let mut sink = MemorySink::default();
    let err = export_user(config, "imp2", &mut sink).await.unwrap_err();

    assert!(err.is_network_error());
    assert!(err.url().unwrap().ends_with("/filme/broken/"));
    assert!(sink.records.is_empty());
}

#[tokio::test]
async fn test_inconsistent_markup_falls_back_per_field() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, "imp2").await;
    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!(
            "<ul>{}{}{}</ul>",
            entry("no-director", Some("2")),
            entry("plural-directors", None),
            entry("bare", Some("1.5"))
        )),
    )
    .await;
    mount_detail(
        &mock_server,
        "no-director",
        html(r#"<h2 class="movie-original-title">Baraka</h2><small class="release">1992</small>"#),
    )
    .await;
    mount_detail(
        &mock_server,
        "plural-directors",
        html(r#"<h1> Fargo </h1><span itemprop="directors"> Joel Coen, Ethan Coen </span>"#),
    )
    .await;
    mount_detail(&mock_server, "bare", html("<p>nothing useful</p>")).await;

    let config = create_test_config(&mock_server.uri(), ".");
    let mut sink = MemorySink::default();
    export_user(config, "imp2", &mut sink).await.unwrap();

    let records = &sink.records;
    assert_eq!(sink.user.as_deref(), Some("imp2"));
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].title, "Baraka");
    assert_eq!(records[0].director, None);
    assert_eq!(records[0].year.as_deref(), Some("1992"));
    assert_eq!(records[0].rating.as_deref(), Some("2"));

    assert_eq!(records[1].title, "Fargo");
    assert_eq!(records[1].director.as_deref(), Some("Joel Coen, Ethan Coen"));
    assert_eq!(records[1].year, None);
    assert_eq!(records[1].rating, None);

    assert_eq!(records[2].title, "bare");
    assert_eq!(records[2].director, None);
    assert_eq!(records[2].rating.as_deref(), Some("1.5"));
}

#[tokio::test]
async fn test_discovery_defaults_to_one_page() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, "solo", 1, html("<ul></ul>")).await;
    mount_listing(
        &mock_server,
        "many",
        1,
        html(&pagination("many", 12)),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), ".");
    let session = CrawlSession::open(&config).unwrap();

    assert_eq!(discover_page_count(&session, "solo").await.unwrap(), 1);
    assert_eq!(discover_page_count(&session, "many").await.unwrap(), 12);
}

#[tokio::test]
async fn test_empty_profile_exports_header_only() {
    let mock_server = MockServer::start().await;
    let output = TempDir::new().unwrap();
    mount_profile(&mock_server, "newbie").await;
    mount_listing(&mock_server, "newbie", 1, html("<p>Nenhum filme</p>")).await;

    let config = create_test_config(&mock_server.uri(), output.path().to_str().unwrap());
    let mut sink = CsvSink::new(output.path());
    let stats = export_user(config, "newbie", &mut sink).await.unwrap();

    assert_eq!(stats.movies, 0);
    let content = std::fs::read_to_string(output.path().join("newbie.csv")).unwrap();
    assert_eq!(content, "Title,Directors,Year,Rating\n");
}

#[tokio::test]
async fn test_concurrency_gate_of_one_still_completes() {
    let mock_server = MockServer::start().await;
    mount_profile(&mock_server, "imp2").await;
    mount_listing(
        &mock_server,
        "imp2",
        1,
        html(&format!(
            "{}<ul>{}{}</ul>",
            pagination("imp2", 2),
            entry("m1", None),
            entry("m2", None)
        )),
    )
    .await;
    mount_listing(
        &mock_server,
        "imp2",
        2,
        html(&format!("{}<ul>{}</ul>", pagination("imp2", 2), entry("m3", None))),
    )
    .await;
    for (slug, title) in [("m1", "One"), ("m2", "Two"), ("m3", "Three")] {
        mount_detail(&mock_server, slug, html(&detail(title, "Dir", "2000"))).await;
    }

    let mut config = create_test_config(&mock_server.uri(), ".");
    config.crawler.max_concurrent_fetches = 1;
    let mut sink = MemorySink::default();
    export_user(config, "imp2", &mut sink).await.unwrap();

    let titles: Vec<&str> = sink.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
}
