// tests/crawl_test.rs
// =============================================================================
// End-to-end crawl tests against a local mock HTTP server (wiremock).
//
// Every crawl runs under a timeout so a counting bug in the worklist engine
// fails the test instead of hanging it.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use sitemap_seo::crawl::{PageScraper, SitemapResolver};
use sitemap_seo::{
    resolve_sitemap, scrape_sitemap, CrawlConfig, CrawlError, DedupPolicy, DefaultExtractor,
    FetchClient, FetchConfig, SeoRecord,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn urlset(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

fn sitemap_index(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!("<sitemapindex>{}</sitemapindex>", entries)
}

fn page_html(title: &str) -> String {
    format!(
        r#"<html><head><title>{0}</title><meta name="description" content="About {0}"></head><body><h1>{0} heading</h1></body></html>"#,
        title
    )
}

async fn serve(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn config(concurrency: usize) -> CrawlConfig {
    CrawlConfig {
        concurrency,
        fetch: FetchConfig {
            timeout: Duration::from_secs(5),
            ..FetchConfig::default()
        },
        ..CrawlConfig::default()
    }
}

async fn scrape(root: &str, config: &CrawlConfig) -> Vec<SeoRecord> {
    tokio::time::timeout(TEST_TIMEOUT, scrape_sitemap(root, Arc::new(DefaultExtractor), config))
        .await
        .expect("crawl did not terminate")
        .expect("crawl setup failed")
}

// Root index -> two child sitemaps -> two pages each
async fn mount_two_level_site(server: &MockServer) {
    let base = server.uri();
    serve(
        server,
        "/sitemap.xml",
        200,
        sitemap_index(&[format!("{}/sitemap-a.xml", base), format!("{}/sitemap-b.xml", base)]),
    )
    .await;
    serve(
        server,
        "/sitemap-a.xml",
        200,
        urlset(&[format!("{}/a1", base), format!("{}/a2", base)]),
    )
    .await;
    serve(
        server,
        "/sitemap-b.xml",
        200,
        urlset(&[format!("{}/b1", base), format!("{}/b2", base)]),
    )
    .await;
    for page in ["a1", "a2", "b1", "b2"] {
        serve(server, &format!("/{}", page), 200, page_html(page)).await;
    }
}

#[tokio::test]
async fn test_resolver_flattens_nested_sitemaps() {
    let server = MockServer::start().await;
    mount_two_level_site(&server).await;
    let base = server.uri();

    let mut pages = tokio::time::timeout(
        TEST_TIMEOUT,
        resolve_sitemap(&format!("{}/sitemap.xml", base), &config(2)),
    )
    .await
    .unwrap()
    .unwrap();
    pages.sort();

    assert_eq!(
        pages,
        vec![
            format!("{}/a1", base),
            format!("{}/a2", base),
            format!("{}/b1", base),
            format!("{}/b2", base),
        ]
    );
}

#[tokio::test]
async fn test_end_to_end_scrape() {
    let server = MockServer::start().await;
    mount_two_level_site(&server).await;
    let base = server.uri();

    let mut records = scrape(&format!("{}/sitemap.xml", base), &config(2)).await;
    records.sort_by(|a, b| a.url.cmp(&b.url));

    assert_eq!(records.len(), 4);
    for (record, name) in records.iter().zip(["a1", "a2", "b1", "b2"]) {
        assert_eq!(record.url, format!("{}/{}", base, name));
        assert_eq!(record.status_code, 200);
        assert_eq!(record.title, name);
        assert_eq!(record.h1, format!("{} heading", name));
        assert_eq!(record.meta_description, format!("About {}", name));
    }
}

#[tokio::test]
async fn test_one_failing_page_does_not_stop_the_batch() {
    let server = MockServer::start().await;
    let base = server.uri();
    let pages: Vec<String> = (1..=5).map(|i| format!("{}/p{}", base, i)).collect();

    serve(&server, "/sitemap.xml", 200, urlset(&pages)).await;
    for i in 1..=5 {
        let status = if i == 3 { 500 } else { 200 };
        serve(&server, &format!("/p{}", i), status, page_html(&format!("p{}", i))).await;
    }

    let records = scrape(&format!("{}/sitemap.xml", base), &config(2)).await;
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.status_code == 200));
    assert!(!records.iter().any(|r| r.url.ends_with("/p3")));
}

#[tokio::test]
async fn test_keep_error_pages_reports_status() {
    let server = MockServer::start().await;
    let base = server.uri();
    let pages = vec![format!("{}/ok", base), format!("{}/gone", base)];

    serve(&server, "/sitemap.xml", 200, urlset(&pages)).await;
    serve(&server, "/ok", 200, page_html("ok")).await;
    serve(&server, "/gone", 404, page_html("Not found")).await;

    let config = CrawlConfig {
        keep_error_pages: true,
        ..config(2)
    };
    let records = scrape(&format!("{}/sitemap.xml", base), &config).await;

    assert_eq!(records.len(), 2);
    let gone = records.iter().find(|r| r.url.ends_with("/gone")).unwrap();
    assert_eq!(gone.status_code, 404);
    assert_eq!(gone.title, "Not found");
}

#[tokio::test]
async fn test_missing_root_sitemap_yields_nothing() {
    let server = MockServer::start().await;
    // Nothing mounted: every request gets a 404

    let records = scrape(&format!("{}/sitemap.xml", server.uri()), &config(2)).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_malformed_child_sitemap_is_isolated() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/sitemap.xml",
        200,
        sitemap_index(&[format!("{}/good.xml", base), format!("{}/broken.xml", base)]),
    )
    .await;
    serve(&server, "/good.xml", 200, urlset(&[format!("{}/page", base)])).await;
    serve(&server, "/broken.xml", 200, "<urlset><url><loc>x</url>".to_string()).await;
    serve(&server, "/page", 200, page_html("page")).await;

    let records = scrape(&format!("{}/sitemap.xml", base), &config(2)).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "page");
}

#[tokio::test]
async fn test_concurrency_never_exceeds_limit() {
    let server = MockServer::start().await;
    let base = server.uri();
    let limit = 2;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_html("slow"))
                .set_delay(Duration::from_millis(30)),
        )
        .mount(&server)
        .await;

    // At least 10x the limit queued at once
    let urls: Vec<String> = (0..10 * limit + 5).map(|i| format!("{}/page/{}", base, i)).collect();

    let config = config(limit);
    let client = Arc::new(FetchClient::new(&config.fetch).unwrap());
    let scraper = PageScraper::new(client, Arc::new(DefaultExtractor), &config).unwrap();

    let records = tokio::time::timeout(TEST_TIMEOUT, scraper.scrape(urls))
        .await
        .expect("scrape did not terminate");

    assert_eq!(records.len(), 10 * limit + 5);
    assert_eq!(scraper.gate().capacity(), limit);
    assert!(scraper.gate().peak() <= scraper.gate().capacity());
    // With this many slow pages queued the gate must have been saturated
    assert_eq!(scraper.gate().peak(), limit);
    assert_eq!(scraper.gate().in_use(), 0);
}

#[tokio::test]
async fn test_redirect_keeps_requested_url() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", format!("{}/new", base).as_str()))
        .mount(&server)
        .await;
    serve(&server, "/new", 200, page_html("moved")).await;

    let client = FetchClient::new(&FetchConfig::default()).unwrap();
    let document = client.fetch(&format!("{}/old", base)).await.unwrap();
    assert_eq!(document.url, format!("{}/old", base));
    assert_eq!(document.final_url, format!("{}/new", base));
    assert!(document.redirected());
    assert_eq!(document.status_code, 200);

    let client = Arc::new(client);
    let scraper = PageScraper::new(client, Arc::new(DefaultExtractor), &config(1)).unwrap();
    let records = scraper.scrape(vec![format!("{}/old", base)]).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, format!("{}/old", base));
    assert_eq!(records[0].title, "moved");
}

#[tokio::test]
async fn test_user_agent_from_pool_is_sent() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .and(header("user-agent", "seo-test-agent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[format!("{}/p", base)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p"))
        .and(header("user-agent", "seo-test-agent/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_html("p")))
        .mount(&server)
        .await;

    let config = CrawlConfig {
        fetch: FetchConfig {
            timeout: Duration::from_secs(5),
            user_agents: vec!["seo-test-agent/1.0".to_string()],
        },
        ..CrawlConfig::default()
    };

    let records = scrape(&format!("{}/sitemap.xml", base), &config).await;
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_duplicate_pages_follow_dedup_policy() {
    let server = MockServer::start().await;
    let base = server.uri();
    let shared = format!("{}/shared", base);

    serve(
        &server,
        "/sitemap.xml",
        200,
        sitemap_index(&[format!("{}/one.xml", base), format!("{}/two.xml", base)]),
    )
    .await;
    serve(&server, "/one.xml", 200, urlset(&[shared.clone()])).await;
    serve(&server, "/two.xml", 200, urlset(&[shared.clone()])).await;
    serve(&server, "/shared", 200, page_html("shared")).await;

    let root = format!("{}/sitemap.xml", base);

    let records = scrape(&root, &config(2)).await;
    assert_eq!(records.len(), 2);

    let deduped = CrawlConfig {
        dedup: DedupPolicy::PerEngine,
        ..config(2)
    };
    let records = scrape(&root, &deduped).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, shared);
}

#[tokio::test]
async fn test_custom_extractor_is_used() {
    let server = MockServer::start().await;
    mount_two_level_site(&server).await;

    let word_count = |html: &str, url: &str, status: u16| -> Result<SeoRecord, CrawlError> {
        Ok(SeoRecord {
            url: url.to_string(),
            title: format!("{} bytes", html.len()),
            h1: String::new(),
            meta_description: String::new(),
            status_code: status,
        })
    };

    let records = tokio::time::timeout(
        TEST_TIMEOUT,
        scrape_sitemap(&format!("{}/sitemap.xml", server.uri()), Arc::new(word_count), &config(3)),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.title.ends_with(" bytes")));
}

#[tokio::test]
async fn test_resolver_with_shared_client() {
    let server = MockServer::start().await;
    mount_two_level_site(&server).await;

    let client = Arc::new(FetchClient::new(&FetchConfig::default()).unwrap());
    let resolver = SitemapResolver::new(client);
    let pages = tokio::time::timeout(TEST_TIMEOUT, resolver.resolve(&format!("{}/sitemap.xml", server.uri())))
        .await
        .unwrap();
    assert_eq!(pages.len(), 4);
}

#[tokio::test]
async fn test_invalid_root_url_rejected() {
    let result = scrape_sitemap("not a url", Arc::new(DefaultExtractor), &config(2)).await;
    assert!(matches!(result, Err(CrawlError::InvalidUrl { .. })));
}
