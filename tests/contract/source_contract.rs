use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ferroscreen_core::{
    DataSource, FixtureSource, HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse,
    SourceErrorKind, SourceId, Symbol, TickerInfo, YahooAdapter,
};

const INFY_SUMMARY: &str = r#"{
    "quoteSummary": {
        "result": [{
            "price": {"shortName": "Infosys Limited", "marketCap": {"raw": 6.1e12}},
            "summaryDetail": {"trailingPE": {"raw": 24.1}},
            "defaultKeyStatistics": {"earningsQuarterlyGrowth": {"raw": 0.12}},
            "financialData": {"returnOnEquity": {"raw": 0.31}, "currentPrice": {"raw": 1480.0}},
            "assetProfile": {"sector": "Technology"}
        }],
        "error": null
    }
}"#;

const NOT_FOUND_SUMMARY: &str = r#"{
    "quoteSummary": {
        "result": null,
        "error": {"code": "Not Found", "description": "Quote not found for symbol: NOPE.NS"}
    }
}"#;

/// Serves Yahoo-shaped responses for INFY.NS and a not-found body for anything else.
struct OfflineYahoo;

impl HttpClient for OfflineYahoo {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = if request.url.contains("getcrumb") {
            HttpResponse::ok_json("contract-crumb")
        } else if request.url.contains("quoteSummary/INFY.NS") {
            HttpResponse::ok_json(INFY_SUMMARY)
        } else if request.url.contains("quoteSummary/") {
            HttpResponse::ok_json(NOT_FOUND_SUMMARY)
        } else {
            HttpResponse::new(200, "")
        };
        Box::pin(async move { Ok(response) })
    }
}

struct SourceCase {
    id: SourceId,
    source: Arc<dyn DataSource>,
}

fn source_cases() -> Vec<SourceCase> {
    let fixture = FixtureSource::new().with_entry(
        symbol("INFY.NS"),
        TickerInfo {
            short_name: Some(String::from("Infosys Limited")),
            sector: Some(String::from("Technology")),
            trailing_pe: Some(24.1),
            return_on_equity: Some(0.31),
            earnings_quarterly_growth: Some(0.12),
            market_cap: Some(6.1e12),
            current_price: Some(1480.0),
        },
    );

    vec![
        SourceCase {
            id: SourceId::Fixture,
            source: Arc::new(fixture),
        },
        SourceCase {
            id: SourceId::Yahoo,
            source: Arc::new(YahooAdapter::with_http_client(
                Arc::new(OfflineYahoo),
                HttpAuth::None,
            )),
        },
    ]
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

#[tokio::test]
async fn every_source_reports_its_identity() {
    for case in source_cases() {
        assert_eq!(case.source.id(), case.id);
    }
}

#[tokio::test]
async fn known_ticker_resolves_to_the_same_fundamentals_for_all_sources() {
    for case in source_cases() {
        let info = case
            .source
            .lookup(&symbol("INFY.NS"))
            .await
            .unwrap_or_else(|error| panic!("source '{}' lookup failed: {error}", case.id));

        assert_eq!(info.short_name.as_deref(), Some("Infosys Limited"), "source '{}'", case.id);
        assert_eq!(info.sector.as_deref(), Some("Technology"), "source '{}'", case.id);
        assert_eq!(info.trailing_pe, Some(24.1), "source '{}'", case.id);
        assert_eq!(info.return_on_equity, Some(0.31), "source '{}'", case.id);
        assert_eq!(info.earnings_quarterly_growth, Some(0.12), "source '{}'", case.id);
        assert_eq!(info.market_cap, Some(6.1e12), "source '{}'", case.id);
    }
}

#[tokio::test]
async fn unknown_ticker_is_not_found_for_all_sources() {
    for case in source_cases() {
        let error = case
            .source
            .lookup(&symbol("NOPE.NS"))
            .await
            .expect_err("unknown ticker must fail");

        assert_eq!(error.kind(), SourceErrorKind::NotFound, "source '{}'", case.id);
        assert_eq!(error.code(), "source.not_found", "source '{}'", case.id);
    }
}
