//! End-to-end tests for `InsightsAggregator::analyze` against mock storefronts.

use std::time::Duration;

use serde_json::json;
use shopinsight_core::{FailureReason, InsightsRecord, InsightsRequest, SocialPlatform};
use shopinsight_scraper::{
    FetchSettings, InsightsAggregator, InsightsError, InsightsSettings, TextApiSettings,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOMEPAGE: &str = r#"<!doctype html>
<html>
<head>
  <title>Acme Goods | Handmade ceramics</title>
  <meta property="og:site_name" content="Acme Goods">
  <link rel="stylesheet" href="//cdn.shopify.com/s/files/1/theme.css">
  <script>Shopify.currency = {"active":"USD","rate":"1.0"};</script>
</head>
<body>
  <header><nav>
    <a href="/collections/all">Shop</a>
    <a href="/pages/contact">Contact</a>
    <a href="/blogs/journal">Journal</a>
  </nav></header>
  <div class="featured-product">
    <a href="/products/mug"><img src="/mug.jpg" alt="Mug"></a>
    <h2 class="product-title">Stoneware Mug</h2>
    <span class="price">$24.00</span>
  </div>
  <footer>
    <p>hello@acme.example</p>
    <p>Write to hello@acme.example or HELLO@acme.example</p>
    <a href="https://www.instagram.com/acmegoods">Instagram</a>
    <a href="/policies/refund-policy">Refunds</a>
  </footer>
</body>
</html>"#;

const PRIVACY: &str = r#"<html><body>
  <div class="shopify-policy__title"><h1>Privacy policy</h1></div>
  <div class="shopify-policy__body"><div class="rte">
    <p>We collect only the information needed to process your order and keep it no longer
    than required. We never sell personal data to third parties.</p>
  </div></div>
</body></html>"#;

const ABOUT: &str = r#"<html><body><main>
  <p>Acme Goods was founded in 2014 in a small Portland garage by two potters.
  Our mission is to make durable kitchenware that lasts a lifetime.</p>
</main></body></html>"#;

fn settings(aggregate_timeout: Duration) -> InsightsSettings {
    InsightsSettings {
        fetch: FetchSettings {
            request_timeout: Duration::from_secs(5),
            max_retries: 0,
            backoff_base_ms: 1,
            user_agent: "shopinsight-test/0.1".to_owned(),
        },
        aggregate_timeout,
        ..InsightsSettings::default()
    }
}

fn aggregator() -> InsightsAggregator {
    InsightsAggregator::new(settings(Duration::from_secs(10))).expect("aggregator builds")
}

fn request(url: &str) -> InsightsRequest {
    InsightsRequest {
        website_url: url.to_owned(),
        include_competitors: false,
    }
}

fn three_products() -> serde_json::Value {
    json!({"products": [
        {"id": 1, "title": "Mug", "handle": "mug", "variants": [{"price": "24.00"}]},
        {"id": 2, "title": "Bowl", "handle": "bowl", "variants": [{"price": "32.00"}]},
        {"id": 3, "title": "Plate", "handle": "plate", "variants": [{"price": "28.00"}]}
    ]})
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_store(server: &MockServer) {
    mount_page(server, "/", HOMEPAGE).await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_products()))
        .mount(server)
        .await;
    mount_page(server, "/policies/privacy-policy", PRIVACY).await;
}

#[tokio::test]
async fn analyze_assembles_record_from_available_pages() {
    let server = MockServer::start().await;
    mount_store(&server).await;

    let record = aggregator()
        .analyze(&request(&server.uri()))
        .await
        .expect("analysis succeeds");

    assert!(record.success);
    assert!(record.is_shopify_store);
    assert_eq!(record.store_url, server.uri());
    assert_eq!(record.store_name.as_deref(), Some("Acme Goods"));
    assert_eq!(record.product_catalog.total_products, 3);
    assert_eq!(
        record.product_catalog.products[0].currency.as_deref(),
        Some("USD")
    );

    let privacy = record.privacy_policy.as_ref().expect("privacy policy found");
    assert_eq!(privacy.title, "Privacy policy");
    assert_eq!(
        privacy.source_url,
        format!("{}/policies/privacy-policy", server.uri())
    );
    assert!(record.return_refund_policy.is_none());

    // Every FAQ candidate 404s.
    assert!(record.faqs.is_empty());
    assert!(record.warnings.is_empty(), "{:?}", record.warnings);

    assert_eq!(record.hero_products.len(), 1);
    assert_eq!(record.hero_products[0].title, "Stoneware Mug");
    assert_eq!(record.contact_info.emails.len(), 1);
    assert!(record.contact_info.emails.contains("hello@acme.example"));
    assert_eq!(
        record.social_handles.get(&SocialPlatform::Instagram).map(String::as_str),
        Some("https://instagram.com/acmegoods")
    );
    assert!(record.important_links.len() >= 3);
    assert!(record.processing_time_seconds > 0.0);
}

#[tokio::test]
async fn analyze_uses_first_policy_candidate_when_several_exist() {
    let server = MockServer::start().await;
    mount_store(&server).await;
    Mock::given(method("GET"))
        .and(path("/pages/privacy-policy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PRIVACY))
        .expect(0)
        .mount(&server)
        .await;

    let record = aggregator()
        .analyze(&request(&server.uri()))
        .await
        .expect("analysis succeeds");

    let privacy = record.privacy_policy.expect("privacy policy found");
    assert_eq!(
        privacy.source_url,
        format!("{}/policies/privacy-policy", server.uri())
    );
}

#[tokio::test]
async fn analyze_is_repeatable_for_the_same_store() {
    let server = MockServer::start().await;
    mount_store(&server).await;
    mount_page(&server, "/pages/about", ABOUT).await;

    let aggregator = aggregator();
    let first = aggregator
        .analyze(&request(&server.uri()))
        .await
        .expect("first analysis succeeds");
    let second = aggregator
        .analyze(&request(&server.uri()))
        .await
        .expect("second analysis succeeds");

    let strip_timing = |record: &InsightsRecord| {
        let mut value = serde_json::to_value(record).expect("record serializes");
        let fields = value.as_object_mut().expect("record is an object");
        fields.remove("scraped_at");
        fields.remove("processing_time_seconds");
        serde_json::to_string(&value).expect("value serializes")
    };
    assert_eq!(strip_timing(&first), strip_timing(&second));
}

#[tokio::test]
async fn analyze_merges_contact_page_and_about_page() {
    let server = MockServer::start().await;
    mount_store(&server).await;
    mount_page(
        &server,
        "/pages/contact",
        "<main><p>Email hello@acme.example or call (503) 555-0142.</p></main>",
    )
    .await;
    mount_page(&server, "/pages/about", ABOUT).await;

    let record = aggregator().analyze(&request(&server.uri())).await.unwrap();

    assert_eq!(record.contact_info.emails.len(), 1);
    assert!(record.contact_info.phone_numbers.contains("5035550142"));
    assert_eq!(
        record.contact_info.contact_page_url,
        Some(format!("{}/pages/contact", server.uri()))
    );
    assert!(record
        .brand_context
        .about_text
        .as_deref()
        .unwrap()
        .contains("founded in 2014"));
    assert_eq!(
        record.brand_context.mission.as_deref(),
        Some("Our mission is to make durable kitchenware that lasts a lifetime.")
    );
    assert!(record.brand_context.summary.is_none());
}

#[tokio::test]
async fn analyze_keeps_partial_results_when_a_branch_misses_the_deadline() {
    let server = MockServer::start().await;
    mount_store(&server).await;
    Mock::given(method("GET"))
        .and(path("/pages/faq"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<details><summary>Slow?</summary><p>Yes.</p></details>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let aggregator = InsightsAggregator::new(settings(Duration::from_secs(1))).unwrap();
    let started = std::time::Instant::now();
    let record = aggregator.analyze(&request(&server.uri())).await.unwrap();

    assert!(started.elapsed() < Duration::from_millis(2_500));
    assert!(record.success);
    assert!(record.faqs.is_empty());
    assert_eq!(record.product_catalog.total_products, 3);
    assert!(record.privacy_policy.is_some());
    assert!(
        record.warnings.iter().any(|w| w.starts_with("FAQ")),
        "{:?}",
        record.warnings
    );
}

#[tokio::test]
async fn analyze_rejects_unreachable_store() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = aggregator()
        .analyze(&request(&format!("http://127.0.0.1:{port}")))
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::Unreachable { .. }), "{err:?}");
    assert_eq!(err.failure_reason(), Some(FailureReason::Unreachable));
}

#[tokio::test]
async fn analyze_rejects_store_whose_homepage_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = aggregator().analyze(&request(&server.uri())).await.unwrap_err();

    assert!(matches!(err, InsightsError::Unreachable { .. }));
}

#[tokio::test]
async fn analyze_rejects_non_shopify_site() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body><p>A WordPress blog</p></body></html>").await;

    let err = aggregator().analyze(&request(&server.uri())).await.unwrap_err();

    assert!(matches!(err, InsightsError::NotShopify { .. }), "{err:?}");
    assert_eq!(err.failure_reason(), Some(FailureReason::NotShopify));
}

#[tokio::test]
async fn analyze_accepts_headless_store_serving_products_json() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><body><p>Custom storefront</p></body></html>").await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_products()))
        .mount(&server)
        .await;

    let record = aggregator().analyze(&request(&server.uri())).await.unwrap();

    assert!(record.is_shopify_store);
    assert_eq!(record.product_catalog.total_products, 3);
}

#[tokio::test]
async fn analyze_rejects_invalid_url_before_fetching() {
    let err = aggregator()
        .analyze(&request("ftp://files.example"))
        .await
        .unwrap_err();

    assert!(matches!(err, InsightsError::InvalidTarget { .. }));
    assert!(err.failure_reason().is_none());
}

#[tokio::test]
async fn analyze_summarizes_configured_competitors() {
    let store = MockServer::start().await;
    mount_store(&store).await;

    let rival = MockServer::start().await;
    mount_page(
        &rival,
        "/",
        r#"<head><title>Rival Pottery</title><meta name="description" content="Bowls and more"></head>
           <body><a href="https://www.tiktok.com/@rivalpottery">TikTok</a></body>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_products()))
        .mount(&rival)
        .await;

    let aggregator = InsightsAggregator::new(InsightsSettings {
        competitor_urls: vec![rival.uri(), store.uri(), "http://127.0.0.1:9".to_owned()],
        ..settings(Duration::from_secs(10))
    })
    .unwrap();
    let record = aggregator
        .analyze(&InsightsRequest {
            website_url: store.uri(),
            include_competitors: true,
        })
        .await
        .unwrap();

    assert_eq!(record.competitors.len(), 1);
    let rival_summary = &record.competitors[0];
    assert_eq!(rival_summary.name.as_deref(), Some("Rival Pottery"));
    assert_eq!(rival_summary.description.as_deref(), Some("Bowls and more"));
    assert_eq!(rival_summary.estimated_products, 3);
    assert_eq!(rival_summary.price_range.as_deref(), Some("24.00 - 32.00"));
    assert!(rival_summary
        .social_handles
        .contains_key(&SocialPlatform::Tiktok));
    assert_eq!(record.warnings.len(), 1, "{:?}", record.warnings);
}

#[tokio::test]
async fn analyze_skips_competitors_unless_requested() {
    let store = MockServer::start().await;
    mount_store(&store).await;

    let aggregator = InsightsAggregator::new(InsightsSettings {
        competitor_urls: vec!["http://127.0.0.1:9".to_owned()],
        ..settings(Duration::from_secs(10))
    })
    .unwrap();
    let record = aggregator.analyze(&request(&store.uri())).await.unwrap();

    assert!(record.competitors.is_empty());
    assert!(record.warnings.is_empty());
}

#[tokio::test]
async fn analyze_adds_text_api_summary_when_configured() {
    let server = MockServer::start().await;
    mount_store(&server).await;
    mount_page(&server, "/pages/about", ABOUT).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Acme Goods makes durable handmade kitchenware for home cooks."}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let aggregator = InsightsAggregator::new(InsightsSettings {
        text_api: Some(TextApiSettings {
            api_key: "sk-test".to_owned(),
            base_url: server.uri(),
            model: "gpt-4o-mini".to_owned(),
            timeout: Duration::from_secs(5),
        }),
        ..settings(Duration::from_secs(10))
    })
    .unwrap();
    let record = aggregator.analyze(&request(&server.uri())).await.unwrap();

    assert_eq!(
        record.brand_context.summary.as_deref(),
        Some("Acme Goods makes durable handmade kitchenware for home cooks.")
    );
}
