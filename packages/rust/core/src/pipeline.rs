//! End-to-end search pipeline: term → crawl → extract → verify → sort.

use tracing::{info, instrument};

use garimpo_categories::CategoryDirectory;
use garimpo_crawler::{PageCrawler, ReputationVerifier};
use garimpo_shared::{CrawlerConfig, ProductRecord, Result, SearchParams, load_config};

use crate::assembler;

/// Run one marketplace search end to end.
///
/// 1. Normalize: short terms yield nothing without any I/O, inverted price
///    bounds are swapped, bounds beyond the marketplace cap are an error
/// 2. Resolve the category to URL parts (an unknown code fails here,
///    before any request)
/// 3. Crawl every result page
/// 4. Assemble records, verifying each seller against the reputation bar
/// 5. Sort by the requested ordering
#[instrument(skip_all, fields(term = %params.term, category = %params.category))]
pub async fn query(params: &SearchParams, config: &CrawlerConfig) -> Result<Vec<ProductRecord>> {
    if params.term.trim().chars().count() < 2 {
        info!("term shorter than two characters, returning nothing");
        return Ok(Vec::new());
    }

    let params = params.normalize()?;
    let parts = CategoryDirectory::load().url_parts(params.category)?;

    let crawler = PageCrawler::new(config.clone())?;
    let pages = crawler.fetch_all_pages(&parts, &params).await?;

    let verifier = ReputationVerifier::new(config, params.aggressiveness)?;
    let mut records = assembler::assemble(&pages, &verifier, params.min_reputation).await;
    info!(records = records.len(), "assembly finished");

    assembler::sort_records(&mut records, params.ordering);
    Ok(records)
}

/// Run a search for `term` with every other knob taken from the user's
/// config file (or its defaults when no file exists).
pub async fn query_with_defaults(term: &str) -> Result<Vec<ProductRecord>> {
    let config = load_config()?;
    let params = config.search_params(term);
    query(&params, &CrawlerConfig::from(&config)).await
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use garimpo_shared::{Aggressiveness, CategoryCode, GarimpoError, Price};

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn local_config(server: &wiremock::MockServer) -> CrawlerConfig {
        CrawlerConfig {
            base_origin: Some(server.uri()),
            ..CrawlerConfig::default()
        }
    }

    fn fast_params(term: &str) -> SearchParams {
        let mut params = SearchParams::new(term);
        params.aggressiveness = Aggressiveness::new(10).unwrap();
        params
    }

    fn listing(link: &str, title: &str, fraction: &str) -> String {
        format!(
            r#"<li class="results-item highlighted article stack product">
  <div class="item__image item__image--stack">
    <a href="{link}"><img src="https://http2.mlstatic.com/{title}.webp"></a>
  </div>
  <div class="item__info-container">
    <a class="item__info-title" href="{link}">
      <span class="main-title">{title}</span>
    </a>
    <div class="price__container">
      <span class="price__fraction">{fraction}</span>
    </div>
  </div>
</li>"#
        )
    }

    fn result_page(listings: &[String]) -> String {
        format!(
            "<html><body><section id=\"results\"><ol class=\"results-list\">{}</ol></section></body></html>",
            listings.join("\n")
        )
    }

    async fn mount(server: &wiremock::MockServer, path: &str, status: u16, body: &str) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(path))
            .respond_with(wiremock::ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn mount_end_of_results(server: &wiremock::MockServer) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn short_term_returns_nothing_without_requests() {
        let server = wiremock::MockServer::start().await;

        let records = query(&fast_params("    a  "), &local_config(&server))
            .await
            .expect("query");

        assert!(records.is_empty());
        let requests = server.received_requests().await.expect("recording on");
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn unknown_category_fails_before_any_request() {
        let server = wiremock::MockServer::start().await;
        let mut params = fast_params("furadeira");
        params.category = CategoryCode::new(42, 1);

        let err = query(&params, &local_config(&server))
            .await
            .expect_err("unknown category");

        assert!(matches!(
            err,
            GarimpoError::UnknownCategory { code } if code == CategoryCode::new(42, 1)
        ));
        let requests = server.received_requests().await.expect("recording on");
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn inverted_price_bounds_are_swapped_into_the_url() {
        let server = wiremock::MockServer::start().await;
        mount(
            &server,
            "/lista/furadeira_Desde_1_PriceRange_100-500",
            200,
            "<html><body></body></html>",
        )
        .await;
        mount_end_of_results(&server).await;

        let mut params = fast_params("furadeira");
        params.price_min = 500;
        params.price_max = 100;

        query(&params, &local_config(&server)).await.expect("query");

        let requests = server.received_requests().await.expect("recording on");
        assert!(
            requests
                .iter()
                .any(|r| r.url.path().contains("_PriceRange_100-500"))
        );
    }

    #[tokio::test]
    async fn price_bound_beyond_the_cap_fails_before_any_request() {
        let server = wiremock::MockServer::start().await;
        let mut params = fast_params("furadeira");
        params.price_max = garimpo_shared::PRICE_UNBOUNDED + 1;

        let err = query(&params, &local_config(&server))
            .await
            .expect_err("over-cap bound");

        assert!(matches!(err, GarimpoError::Validation { .. }));
        let requests = server.received_requests().await.expect("recording on");
        assert!(requests.is_empty());
    }

    #[tokio::test]
    async fn full_search_crawls_verifies_and_sorts() {
        let server = wiremock::MockServer::start().await;
        let caro = format!("{}/produto-caro-_JM", server.uri());
        let barato = format!("{}/produto-barato-_JM", server.uri());

        let page = result_page(&[
            listing(&caro, "Furadeira Industrial", "250"),
            listing(&barato, "Furadeira Domestica", "120"),
        ]);
        mount(
            &server,
            "/lista/furadeira_Desde_1_PriceRange_0-2147483647",
            200,
            &page,
        )
        .await;
        mount(
            &server,
            "/produto-caro-_JM",
            200,
            &load_fixture("seller_green.html"),
        )
        .await;
        mount(
            &server,
            "/produto-barato-_JM",
            200,
            &load_fixture("seller_green.html"),
        )
        .await;
        mount_end_of_results(&server).await;

        let records = query(&fast_params("furadeira"), &local_config(&server))
            .await
            .expect("query");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Furadeira Domestica");
        assert_eq!(records[0].price, Some(Price::new(120, 0)));
        assert_eq!(records[0].link, barato);
        assert_eq!(records[1].title, "Furadeira Industrial");
        assert!(records.iter().all(|r| r.reputable));
    }

    #[tokio::test]
    async fn low_reputation_sellers_are_flagged_not_dropped() {
        let server = wiremock::MockServer::start().await;
        let bom = format!("{}/produto-bom-_JM", server.uri());
        let novato = format!("{}/produto-novato-_JM", server.uri());

        let page = result_page(&[
            listing(&bom, "Vendedor Bom", "100"),
            listing(&novato, "Vendedor Novato", "90"),
        ]);
        mount(
            &server,
            "/lista/furadeira_Desde_1_PriceRange_0-2147483647",
            200,
            &page,
        )
        .await;
        mount(
            &server,
            "/produto-bom-_JM",
            200,
            &load_fixture("seller_green.html"),
        )
        .await;
        mount(
            &server,
            "/produto-novato-_JM",
            200,
            &load_fixture("seller_newbie.html"),
        )
        .await;
        mount_end_of_results(&server).await;

        let records = query(&fast_params("furadeira"), &local_config(&server))
            .await
            .expect("query");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Vendedor Novato");
        assert!(!records[0].reputable);
        assert!(records[1].reputable);
    }

    #[tokio::test]
    async fn reputation_off_skips_detail_pages() {
        let server = wiremock::MockServer::start().await;
        let link = format!("{}/produto-qualquer-_JM", server.uri());

        let page = result_page(&[listing(&link, "Qualquer Produto", "75")]);
        mount(
            &server,
            "/lista/furadeira_Desde_1_PriceRange_0-2147483647",
            200,
            &page,
        )
        .await;
        mount_end_of_results(&server).await;

        let mut params = fast_params("furadeira");
        params.min_reputation = garimpo_shared::MinReputation::OFF;

        let records = query(&params, &local_config(&server))
            .await
            .expect("query");

        assert_eq!(records.len(), 1);
        assert!(records[0].reputable);

        let requests = server.received_requests().await.expect("recording on");
        assert!(
            requests
                .iter()
                .all(|r| !r.url.path().starts_with("/produto"))
        );
    }

    #[tokio::test]
    async fn multi_page_results_are_concatenated_in_order() {
        let server = wiremock::MockServer::start().await;
        let link_a = format!("{}/produto-a-_JM", server.uri());
        let link_b = format!("{}/produto-b-_JM", server.uri());

        mount(
            &server,
            "/lista/furadeira_Desde_1_PriceRange_0-2147483647",
            200,
            &result_page(&[listing(&link_a, "Pagina Um", "50")]),
        )
        .await;
        mount(
            &server,
            "/lista/furadeira_Desde_51_PriceRange_0-2147483647",
            200,
            &result_page(&[listing(&link_b, "Pagina Dois", "50")]),
        )
        .await;
        mount_end_of_results(&server).await;

        let mut params = fast_params("furadeira");
        params.min_reputation = garimpo_shared::MinReputation::OFF;
        params.ordering = garimpo_shared::SortOrder::Relevance;

        let records = query(&params, &local_config(&server))
            .await
            .expect("query");

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Pagina Um", "Pagina Dois"]);
    }
}
