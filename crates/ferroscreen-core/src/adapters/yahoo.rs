use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

use crate::data_source::{DataSource, LookupFuture, SourceError, SourceId};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{Symbol, TickerInfo};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const QUOTE_SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const MODULES: &str = "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile";
const REFERER: &str = "https://finance.yahoo.com/";

// ============================================================================
// Yahoo Auth Manager - cookie/crumb handshake
// ============================================================================

#[derive(Debug, Default)]
struct AuthState {
    crumb: Option<String>,
    refreshed_at: Option<Instant>,
}

/// Manages the Yahoo Finance cookie/crumb handshake.
///
/// Yahoo's unofficial API requires:
/// 1. Session cookie from fc.yahoo.com (kept by the client's cookie jar)
/// 2. Crumb token from `/v1/test/getcrumb`, passed as a query parameter
#[derive(Debug)]
pub struct YahooAuthManager {
    state: Mutex<AuthState>,
    ttl: Duration,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl YahooAuthManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(AuthState::default()),
            ttl,
        }
    }

    /// Current crumb, refreshing it when missing or older than the TTL.
    pub async fn crumb(
        &self,
        http_client: &Arc<dyn HttpClient>,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        let mut state = self.state.lock().await;
        if let (Some(crumb), Some(refreshed_at)) = (&state.crumb, state.refreshed_at) {
            if refreshed_at.elapsed() < self.ttl {
                return Ok(crumb.clone());
            }
        }

        let crumb = fetch_crumb(http_client, timeout_ms).await?;
        state.crumb = Some(crumb.clone());
        state.refreshed_at = Some(Instant::now());
        Ok(crumb)
    }

    /// Drop the cached crumb so the next lookup performs a new handshake.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        *state = AuthState::default();
    }
}

async fn fetch_crumb(
    http_client: &Arc<dyn HttpClient>,
    timeout_ms: u64,
) -> Result<String, SourceError> {
    // The cookie response is usually a 404 page; only the Set-Cookie matters.
    let cookie_request = HttpRequest::get(COOKIE_URL)
        .with_header("referer", REFERER)
        .with_timeout_ms(timeout_ms);
    http_client.execute(cookie_request).await.map_err(|e| {
        SourceError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
    })?;

    for endpoint in CRUMB_URLS {
        let crumb_request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);

        match http_client.execute(crumb_request).await {
            Ok(response) if response.status == 429 => {
                return Err(SourceError::rate_limited(
                    "Yahoo rate limited while fetching crumb",
                ));
            }
            Ok(response) if response.is_success() => {
                let body = response.body.trim();
                if body.contains("<html") || body.contains("<!DOCTYPE") {
                    continue;
                }
                if body.to_ascii_lowercase().contains("too many requests") {
                    return Err(SourceError::rate_limited(
                        "Yahoo rate limited while fetching crumb",
                    ));
                }
                if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                    tracing::debug!(endpoint, "obtained yahoo crumb");
                    return Ok(body.to_owned());
                }
            }
            Ok(response) => {
                tracing::debug!(endpoint, status = response.status, "crumb endpoint refused");
            }
            Err(error) => {
                tracing::debug!(endpoint, error = %error, "crumb endpoint unreachable");
            }
        }
    }

    Err(SourceError::unavailable(
        "failed to fetch Yahoo crumb from all endpoints",
    ))
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance `quoteSummary` adapter.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    auth_manager: Arc<YahooAuthManager>,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), env_auth())
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        Self {
            http_client,
            auth,
            auth_manager: Arc::new(YahooAuthManager::default()),
            timeout_ms: 10_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn fetch_summary(&self, symbol: &Symbol) -> Result<TickerInfo, SourceError> {
        let crumb = self
            .auth_manager
            .crumb(&self.http_client, self.timeout_ms)
            .await?;

        let endpoint = format!(
            "{QUOTE_SUMMARY_URL}/{}?modules={MODULES}&crumb={}",
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&crumb)
        );
        let request = HttpRequest::get(endpoint)
            .with_header("referer", REFERER)
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|e| {
            SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        match response.status {
            401 | 403 => {
                self.auth_manager.invalidate().await;
                Err(SourceError::unavailable(format!(
                    "yahoo rejected the session (status {})",
                    response.status
                )))
            }
            404 => Err(SourceError::not_found(symbol)),
            429 => Err(SourceError::rate_limited("yahoo returned status 429")),
            _ if !response.is_success() => Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            ))),
            _ => parse_quote_summary(symbol, &response.body),
        }
    }
}

impl DataSource for YahooAdapter {
    fn id(&self) -> SourceId {
        SourceId::Yahoo
    }

    fn lookup<'a>(&'a self, symbol: &'a Symbol) -> LookupFuture<'a> {
        Box::pin(self.fetch_summary(symbol))
    }
}

/// Pre-seeded session cookie for environments where the handshake is blocked.
fn env_auth() -> HttpAuth {
    std::env::var("YAHOO_COOKIE")
        .ok()
        .filter(|cookie| !cookie.trim().is_empty())
        .map_or(HttpAuth::None, HttpAuth::Cookie)
}

/// Map a `quoteSummary` payload onto the lookup contract.
pub fn parse_quote_summary(symbol: &Symbol, body: &str) -> Result<TickerInfo, SourceError> {
    let response: QuoteSummaryResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::invalid_response(format!("failed to parse yahoo quoteSummary: {e}"))
    })?;

    if let Some(error) = response.quote_summary.error {
        let code = error.code.unwrap_or_default();
        if code.eq_ignore_ascii_case("not found") {
            return Err(SourceError::not_found(symbol));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo quoteSummary error: {code}: {}",
            error.description.unwrap_or_default()
        )));
    }

    let Some(result) = response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
    else {
        return Err(SourceError::not_found(symbol));
    };

    let price = result.price.unwrap_or_default();
    let summary_detail = result.summary_detail.unwrap_or_default();
    let key_statistics = result.default_key_statistics.unwrap_or_default();
    let financial_data = result.financial_data.unwrap_or_default();

    Ok(TickerInfo {
        short_name: price.short_name,
        sector: result.asset_profile.and_then(|profile| profile.sector),
        trailing_pe: raw(summary_detail.trailing_pe.as_ref()),
        return_on_equity: raw(financial_data.return_on_equity.as_ref()),
        earnings_quarterly_growth: raw(key_statistics.earnings_quarterly_growth.as_ref()),
        market_cap: raw(price.market_cap.as_ref())
            .or_else(|| raw(summary_detail.market_cap.as_ref())),
        current_price: raw(financial_data.current_price.as_ref())
            .or_else(|| raw(price.regular_market_price.as_ref())),
    })
}

fn raw(value: Option<&YahooRawValue>) -> Option<f64> {
    value.and_then(|v| v.raw).filter(|v| !v.is_nan())
}

// ============================================================================
// Yahoo quoteSummary response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<QuoteSummaryError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<KeyStatisticsModule>,
    #[serde(rename = "financialData", default)]
    financial_data: Option<FinancialDataModule>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceModule {
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<YahooRawValue>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<YahooRawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooRawValue>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<YahooRawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyStatisticsModule {
    #[serde(rename = "earningsQuarterlyGrowth", default)]
    earnings_quarterly_growth: Option<YahooRawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct FinancialDataModule {
    #[serde(rename = "returnOnEquity", default)]
    return_on_equity: Option<YahooRawValue>,
    #[serde(rename = "currentPrice", default)]
    current_price: Option<YahooRawValue>,
}

#[derive(Debug, Deserialize)]
struct AssetProfileModule {
    #[serde(default)]
    sector: Option<String>,
}

/// Yahoo wraps numbers as `{"raw": 1.23, "fmt": "1.23"}`; empty objects mean
/// the value is unknown.
#[derive(Debug, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<f64>,
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};

    const TCS_SUMMARY: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "shortName": "Tata Consultancy Services",
                    "marketCap": {"raw": 12500000000000.0, "fmt": "12.5T"},
                    "regularMarketPrice": {"raw": 3455.5}
                },
                "summaryDetail": {"trailingPE": {"raw": 29.8}, "marketCap": {}},
                "defaultKeyStatistics": {"earningsQuarterlyGrowth": {"raw": 0.09}},
                "financialData": {"returnOnEquity": {"raw": 0.5123}, "currentPrice": {"raw": 3456.0}},
                "assetProfile": {"sector": "Technology"}
            }],
            "error": null
        }
    }"#;

    struct ScriptedHttpClient {
        routes: Vec<(&'static str, Result<HttpResponse, HttpError>)>,
        requests: std::sync::Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(routes: Vec<(&'static str, Result<HttpResponse, HttpError>)>) -> Self {
            Self {
                routes,
                requests: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self
                .routes
                .iter()
                .find(|(pattern, _)| request.url.contains(pattern))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| Ok(HttpResponse::new(404, "")));
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            Box::pin(async move { response })
        }
    }

    fn adapter_with(client: Arc<ScriptedHttpClient>) -> YahooAdapter {
        YahooAdapter::with_http_client(client, HttpAuth::None)
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[tokio::test]
    async fn lookup_maps_quote_summary_modules() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("getcrumb", Ok(HttpResponse::ok_json("crumb123"))),
            ("quoteSummary", Ok(HttpResponse::ok_json(TCS_SUMMARY))),
        ]));
        let adapter = adapter_with(Arc::clone(&client));

        let info = adapter.lookup(&symbol("TCS.NS")).await.expect("lookup");
        assert_eq!(info.short_name.as_deref(), Some("Tata Consultancy Services"));
        assert_eq!(info.sector.as_deref(), Some("Technology"));
        assert_eq!(info.trailing_pe, Some(29.8));
        assert_eq!(info.return_on_equity, Some(0.5123));
        assert_eq!(info.earnings_quarterly_growth, Some(0.09));
        assert_eq!(info.market_cap, Some(12_500_000_000_000.0));
        assert_eq!(info.current_price, Some(3456.0));

        let urls = client.recorded_urls();
        assert!(urls
            .iter()
            .any(|url| url.contains("quoteSummary/TCS.NS?modules=") && url.contains("crumb=crumb123")));
    }

    #[tokio::test]
    async fn crumb_is_reused_between_lookups() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("getcrumb", Ok(HttpResponse::ok_json("crumb123"))),
            ("quoteSummary", Ok(HttpResponse::ok_json(TCS_SUMMARY))),
        ]));
        let adapter = adapter_with(Arc::clone(&client));

        adapter.lookup(&symbol("TCS.NS")).await.expect("first lookup");
        adapter.lookup(&symbol("TCS.NS")).await.expect("second lookup");

        let crumb_calls = client
            .recorded_urls()
            .iter()
            .filter(|url| url.contains("getcrumb"))
            .count();
        assert_eq!(crumb_calls, 1);
    }

    #[tokio::test]
    async fn unknown_ticker_maps_to_not_found() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("getcrumb", Ok(HttpResponse::ok_json("crumb123"))),
            (
                "quoteSummary",
                Ok(HttpResponse::new(
                    404,
                    r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for symbol: NOPE.NS"}}}"#,
                )),
            ),
        ]));
        let adapter = adapter_with(client);

        let error = adapter.lookup(&symbol("NOPE.NS")).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::NotFound);
    }

    #[tokio::test]
    async fn transport_failure_is_unavailable() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            ("getcrumb", Ok(HttpResponse::ok_json("crumb123"))),
            ("quoteSummary", Err(HttpError::new("connection reset"))),
        ]));
        let adapter = adapter_with(client);

        let error = adapter.lookup(&symbol("TCS.NS")).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
        assert!(error.message().contains("connection reset"));
    }

    #[tokio::test]
    async fn missing_crumb_fails_lookup() {
        let client = Arc::new(ScriptedHttpClient::new(vec![(
            "getcrumb",
            Ok(HttpResponse::ok_json("<html>blocked</html>")),
        )]));
        let adapter = adapter_with(client);

        let error = adapter.lookup(&symbol("TCS.NS")).await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    }

    #[test]
    fn empty_modules_leave_fields_absent() {
        let body = r#"{"quoteSummary":{"result":[{"price":{"shortName":"Thin Co"}}],"error":null}}"#;
        let info = parse_quote_summary(&symbol("THIN.NS"), body).expect("parse");
        assert_eq!(info.short_name.as_deref(), Some("Thin Co"));
        assert_eq!(info.trailing_pe, None);
        assert_eq!(info.sector, None);
    }

    #[test]
    fn garbage_body_is_invalid_response() {
        let error = parse_quote_summary(&symbol("TCS.NS"), "not json").expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidResponse);
    }
}
