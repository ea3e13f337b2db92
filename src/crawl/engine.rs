// src/crawl/engine.rs
// =============================================================================
// This module runs one crawl: the base page, then every link on it.
//
// How it works:
// 1. GET the base URL (any failure here aborts the whole crawl)
// 2. Test the base page's headers against the rule catalogue
// 3. Extract every <a href> from the base page
// 4. For each link: resolve it, GET it, test its headers
// 5. Collect everything into a Report
//
// Links are checked one at a time with a single shared client, so the
// connection pool is reused and the target server only ever sees one
// request from us at a time. We never follow links found on linked pages.
//
// A link that cannot be fetched does not stop the crawl. It is recorded as
// "Could not be checked: <reason>" under the link exactly as written in the
// page, while a fetched-but-vulnerable link is recorded under its resolved
// URL. Existing report consumers rely on that difference.
//
// Rust concepts:
// - tokio::select!: Race a request against the cancellation token
// - map_err: Wrap a library error in our own error type
// =============================================================================

use crate::checker::{evaluate_headers, extract_links, header_test_results, is_safe, HeaderMapping};
use crate::error::CrawlError;
use crate::report::{Report, Vulnerabilities};
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Per-request timeout used unless the caller picks another one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// Settings for the HTTP client shared by every request of a crawl
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Upper bound for each request (connect + headers + body)
    pub timeout: Duration,
    /// Sent as the User-Agent header
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// Crawls a base page and audits it plus every link it contains
pub struct Crawler {
    client: Client,
    cancel: CancellationToken,
}

impl Crawler {
    // Builds the HTTP client once; it is reused for every request
    pub fn new(config: &CrawlConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(CrawlError::Client)?;

        Ok(Self {
            client,
            cancel: CancellationToken::new(),
        })
    }

    // Lets the caller stop a running crawl (e.g. on Ctrl-C)
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    // Runs the whole crawl
    //
    // Parameters:
    //   base_url: the page to start from, used as-is
    //
    // Returns: the Report, or an error if the base page could not be
    //          fetched or the crawl was cancelled
    pub async fn crawl(&self, base_url: &str) -> Result<Report, CrawlError> {
        info!(url = base_url, "Fetching base page");
        let (headers, html) = self.fetch_base(base_url).await?;

        info!("Testing headers for security vulnerabilities...");
        let header_results = header_test_results(&headers);

        info!("Fetching all links from the page...");
        let links = extract_links(&html);
        for link in &links {
            info!("{}", link);
        }

        let mut vulnerabilities = Vulnerabilities::new();

        for link in &links {
            let url = resolve_link(base_url, link);

            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!(url = %url, "Crawl cancelled");
                    return Err(CrawlError::Cancelled);
                }
                fetched = self.fetch_headers(&url) => fetched,
            };

            match fetched {
                Ok(headers) if is_safe(&headers) => {
                    debug!(url = %url, "All headers are safe");
                }
                Ok(headers) => {
                    let issues = evaluate_headers(&headers);
                    debug!(url = %url, issues = issues.len(), "Link is vulnerable");
                    vulnerabilities.insert(url, issues);
                }
                Err(e) => {
                    warn!(link = %link, error = %e, "Link could not be checked");
                    vulnerabilities.insert(link.clone(), vec![format!("Could not be checked: {}", e)]);
                }
            }
        }

        info!(
            links = links.len(),
            vulnerable = vulnerabilities.len(),
            "Crawl finished"
        );

        Ok(Report {
            base_url: base_url.to_string(),
            links,
            header_test_results: header_results,
            vulnerabilities,
        })
    }

    // Fetches the base page: headers and HTML body
    //
    // Unlike link fetches, a 4xx/5xx status is fatal here.
    async fn fetch_base(&self, url: &str) -> Result<(HeaderMapping, String), CrawlError> {
        let fetch_error = |source| CrawlError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(CrawlError::Cancelled),
            response = self.client.get(url).send() => response.map_err(fetch_error)?,
        };

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status,
            });
        }

        let headers = HeaderMapping::from(response.headers());
        debug!(url, status = %status, headers = headers.len(), "Base page received");

        let html = response.text().await.map_err(fetch_error)?;
        Ok((headers, html))
    }

    // Fetches a link and returns only its headers
    //
    // The status code is not checked (a 404 page is audited like any other).
    // The body is read to the end and thrown away: an unread body keeps the
    // connection out of the pool, and a broken body is a failed fetch.
    async fn fetch_headers(&self, url: &str) -> Result<HeaderMapping, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        let headers = HeaderMapping::from(response.headers());

        if headers.is_empty() {
            debug!(url, "Response carried no headers");
        }
        for (name, value) in headers.iter() {
            debug!(url, header = name, value, "Response header");
        }

        let body = response.bytes().await?;
        debug!(url, bytes = body.len(), "Link body drained");

        Ok(headers)
    }
}

// Turns a raw href into something we can fetch
//
// This is a simple string join, not browser-style URL resolution:
// - anything starting with "http" is used as-is
// - otherwise: base (minus one trailing "/") + "/" + link (minus one leading "/")
//
// Examples:
//   ("http://x.com",  "/a/b")           -> "http://x.com/a/b"
//   ("http://x.com/", "a/b")            -> "http://x.com/a/b"
//   ("http://x.com",  "http://y.com/z") -> "http://y.com/z"
pub fn resolve_link(base_url: &str, link: &str) -> String {
    if link.starts_with("http") {
        return link.to_string();
    }

    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    let path = link.strip_prefix('/').unwrap_or(link);
    format!("{}/{}", base, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{ALL_HEADERS_SAFE, HEADER_RULES};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn safe_response(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
            .insert_header("X-Frame-Options", "DENY")
            .insert_header("Strict-Transport-Security", "max-age=100")
            .insert_header("X-Content-Type-Options", "nosniff")
            .insert_header("Content-Security-Policy", "default-src 'self'")
            .insert_header("Referrer-Policy", "strict-origin-when-cross-origin")
            .insert_header("Permissions-Policy", "geolocation=()")
            .insert_header("Cache-Control", "no-store")
            .insert_header("Expires", "0")
            .insert_header("Access-Control-Allow-Origin", "*")
            .insert_header("Cross-Origin-Opener-Policy", "same-origin")
    }

    async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn crawler_with_timeout(timeout: Duration) -> Crawler {
        let config = CrawlConfig {
            timeout,
            ..CrawlConfig::default()
        };
        Crawler::new(&config).unwrap()
    }

    fn all_issues() -> Vec<String> {
        HEADER_RULES.iter().map(|r| r.issue.to_string()).collect()
    }

    #[test]
    fn test_resolve_relative_link() {
        assert_eq!(resolve_link("http://x.com", "/a/b"), "http://x.com/a/b");
        assert_eq!(resolve_link("http://x.com/", "a/b"), "http://x.com/a/b");
        assert_eq!(resolve_link("http://x.com/", "/a/b"), "http://x.com/a/b");
        assert_eq!(resolve_link("http://x.com", "a/b"), "http://x.com/a/b");
    }

    #[test]
    fn test_resolve_absolute_link() {
        assert_eq!(resolve_link("http://x.com", "http://y.com/z"), "http://y.com/z");
        assert_eq!(resolve_link("http://x.com", "https://y.com/z"), "https://y.com/z");
    }

    #[test]
    fn test_resolve_strips_only_one_slash() {
        assert_eq!(resolve_link("http://x.com//", "//a"), "http://x.com///a");
    }

    #[test]
    fn test_resolve_does_not_filter_schemes() {
        assert_eq!(
            resolve_link("http://x.com", "mailto:a@x.com"),
            "http://x.com/mailto:a@x.com"
        );
        assert_eq!(resolve_link("http://x.com/page", "#top"), "http://x.com/page/#top");
    }

    #[test]
    fn test_default_config() {
        let config = CrawlConfig::default();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.user_agent.starts_with("header-crawler/"));
    }

    #[tokio::test]
    async fn test_safe_base_with_unreachable_link() {
        let server = MockServer::start().await;
        mount(&server, "/", safe_response(r#"<a href="/slow">slow</a>"#)).await;
        mount(
            &server,
            "/slow",
            safe_response("").set_delay(Duration::from_secs(2)),
        )
        .await;

        let crawler = crawler_with_timeout(Duration::from_millis(300));
        let report = crawler.crawl(&server.uri()).await.unwrap();

        assert_eq!(report.base_url, server.uri());
        assert_eq!(report.header_test_results, vec![ALL_HEADERS_SAFE]);
        assert_eq!(report.links, vec!["/slow"]);
        assert_eq!(report.vulnerabilities.len(), 1);

        // Failed fetches are keyed by the link as written in the page
        let issues = &report.vulnerabilities["/slow"];
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Could not be checked: "), "{}", issues[0]);
    }

    #[tokio::test]
    async fn test_vulnerable_link_keyed_by_resolved_url() {
        let server = MockServer::start().await;
        let html = r#"<a href="/plain">plain</a><a href="/safe">safe</a>"#;
        mount(&server, "/", safe_response(html)).await;
        mount(&server, "/plain", ResponseTemplate::new(200)).await;
        mount(&server, "/safe", safe_response("")).await;

        let report = crawler_with_timeout(DEFAULT_TIMEOUT)
            .crawl(&server.uri())
            .await
            .unwrap();

        let resolved = format!("{}/plain", server.uri());
        let keys: Vec<_> = report.vulnerabilities.keys().cloned().collect();
        assert_eq!(keys, vec![resolved.clone()]);
        assert_eq!(report.vulnerabilities[&resolved], all_issues());
    }

    #[tokio::test]
    async fn test_link_error_status_is_still_audited() {
        let server = MockServer::start().await;
        mount(&server, "/", safe_response(r#"<a href="missing">gone</a>"#)).await;
        mount(&server, "/missing", ResponseTemplate::new(500)).await;

        let report = crawler_with_timeout(DEFAULT_TIMEOUT)
            .crawl(&server.uri())
            .await
            .unwrap();

        let resolved = format!("{}/missing", server.uri());
        assert_eq!(report.vulnerabilities[&resolved], all_issues());
    }

    #[tokio::test]
    async fn test_vulnerable_base_page() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/",
            ResponseTemplate::new(200).set_body_raw("<p>no links</p>", "text/html"),
        )
        .await;

        let report = crawler_with_timeout(DEFAULT_TIMEOUT)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(report.header_test_results, all_issues());
        assert!(report.links.is_empty());
        assert!(report.vulnerabilities.is_empty());
    }

    #[tokio::test]
    async fn test_links_keep_order_and_duplicates() {
        let server = MockServer::start().await;
        let html = r#"<a href="/b">b</a><a href="/a">a</a><a href="/b">b again</a>"#;
        mount(&server, "/", safe_response(html)).await;
        mount(&server, "/a", ResponseTemplate::new(200)).await;
        mount(&server, "/b", ResponseTemplate::new(200)).await;

        let report = crawler_with_timeout(DEFAULT_TIMEOUT)
            .crawl(&server.uri())
            .await
            .unwrap();

        assert_eq!(report.links, vec!["/b", "/a", "/b"]);
        let keys: Vec<_> = report.vulnerabilities.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![format!("{}/b", server.uri()), format!("{}/a", server.uri())]
        );
    }

    #[tokio::test]
    async fn test_base_error_status_is_fatal() {
        let server = MockServer::start().await;
        mount(&server, "/", ResponseTemplate::new(404)).await;

        let err = crawler_with_timeout(DEFAULT_TIMEOUT)
            .crawl(&server.uri())
            .await
            .unwrap_err();

        match err {
            CrawlError::Status { url, status } => {
                assert_eq!(url, server.uri());
                assert_eq!(status.as_u16(), 404);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_base_is_fatal() {
        let err = crawler_with_timeout(Duration::from_secs(2))
            .crawl("http://127.0.0.1:1")
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Fetch { .. }));
        assert!(err.to_string().contains("http://127.0.0.1:1"));
    }

    #[tokio::test]
    async fn test_cancelled_crawl_returns_no_report() {
        let server = MockServer::start().await;
        mount(&server, "/", safe_response(r#"<a href="/a">a</a>"#)).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let crawler = crawler_with_timeout(DEFAULT_TIMEOUT).with_cancellation(cancel);

        let err = crawler.crawl(&server.uri()).await.unwrap_err();
        assert!(matches!(err, CrawlError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_between_links_stops_crawl() {
        let server = MockServer::start().await;
        let html = r#"<a href="/a">a</a><a href="/b">b</a>"#;
        mount(&server, "/", safe_response(html)).await;
        mount(
            &server,
            "/a",
            ResponseTemplate::new(200).set_delay(Duration::from_secs(2)),
        )
        .await;

        // /b must never be requested once the crawl is cancelled
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let crawler = crawler_with_timeout(DEFAULT_TIMEOUT).with_cancellation(cancel.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            cancel.cancel();
        });

        let err = crawler.crawl(&server.uri()).await.unwrap_err();
        assert!(matches!(err, CrawlError::Cancelled));
        server.verify().await;
    }

    // A bare HTTP/1.1 server: lets tests count TCP connections and send
    // responses wiremock can't produce (e.g. a body cut short).
    //
    // `respond` gets the request path and returns the raw response bytes
    // plus whether to close the connection afterwards.
    async fn start_raw_server(respond: fn(&str) -> (Vec<u8>, bool)) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = connections.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 4096];
                    loop {
                        let n = match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        buf.extend_from_slice(&chunk[..n]);

                        while let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                            let request: Vec<u8> = buf.drain(..end + 4).collect();
                            let request = String::from_utf8_lossy(&request);
                            let path = request.split_whitespace().nth(1).unwrap_or("/");

                            let (response, close) = respond(path);
                            if socket.write_all(&response).await.is_err() || close {
                                return;
                            }
                        }
                    }
                });
            }
        });

        (format!("http://{}", addr), connections)
    }

    fn raw_response(body: &[u8]) -> Vec<u8> {
        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);
        response
    }

    #[tokio::test]
    async fn test_link_fetches_reuse_one_connection() {
        let (base_url, connections) = start_raw_server(|path| {
            let body = if path == "/" {
                br#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a>"#.to_vec()
            } else {
                vec![b'x'; 200 * 1024]
            };
            (raw_response(&body), false)
        })
        .await;

        let report = crawler_with_timeout(DEFAULT_TIMEOUT)
            .crawl(&base_url)
            .await
            .unwrap();

        assert_eq!(report.links, vec!["/a", "/b", "/c"]);
        assert_eq!(report.vulnerabilities.len(), 3);
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_truncated_link_body_could_not_be_checked() {
        let (base_url, _) = start_raw_server(|path| {
            if path == "/" {
                (raw_response(br#"<a href="/short">s</a>"#), false)
            } else {
                // Promises 100 bytes, sends 5, hangs up
                let head = b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nhello".to_vec();
                (head, true)
            }
        })
        .await;

        let report = crawler_with_timeout(Duration::from_secs(5))
            .crawl(&base_url)
            .await
            .unwrap();

        let keys: Vec<_> = report.vulnerabilities.keys().cloned().collect();
        assert_eq!(keys, vec!["/short"]);
        let issues = &report.vulnerabilities["/short"];
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Could not be checked: "), "{}", issues[0]);
    }

    #[tokio::test]
    async fn test_crawl_is_repeatable() {
        let server = MockServer::start().await;
        let html = r#"<a href="/plain">p</a><a href="http://127.0.0.1:1/down">d</a>"#;
        mount(&server, "/", safe_response(html)).await;
        mount(&server, "/plain", ResponseTemplate::new(200)).await;

        let crawler = crawler_with_timeout(Duration::from_secs(2));
        let first = crawler.crawl(&server.uri()).await.unwrap();
        let second = crawler.crawl(&server.uri()).await.unwrap();

        assert_eq!(first.links, second.links);
        assert_eq!(first.vulnerabilities.len(), 2);

        // Error text may differ between runs, the keys and audits may not
        let first_keys: Vec<_> = first.vulnerabilities.keys().collect();
        let second_keys: Vec<_> = second.vulnerabilities.keys().collect();
        assert_eq!(first_keys, second_keys);

        let plain = format!("{}/plain", server.uri());
        assert_eq!(first.vulnerabilities[&plain], second.vulnerabilities[&plain]);
    }
}
