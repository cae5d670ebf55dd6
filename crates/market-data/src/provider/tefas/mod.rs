//! TEFAS fund data provider.
//!
//! Posts a date range to the two public history endpoints of the Turkish
//! fund distribution platform and joins their answers:
//! - `/api/DB/BindHistoryInfo` - price, market cap, share and investor counts
//! - `/api/DB/BindHistoryAllocation` - asset allocation percentages
//!
//! Dates in the payload are epoch milliseconds at local midnight in
//! `Europe/Istanbul`.

mod models;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Europe::Istanbul;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{FundRecord, WideRow};
use crate::provider::{FundDataProvider, RateLimit};

use models::*;

pub const DEFAULT_BASE_URL: &str = "https://www.tefas.gov.tr";
pub const DEFAULT_FUND_KIND: &str = "YAT";
const PROVIDER_ID: &str = "TEFAS";
const INFO_ENDPOINT: &str = "/api/DB/BindHistoryInfo";
const ALLOCATION_ENDPOINT: &str = "/api/DB/BindHistoryAllocation";

/// TEFAS provider.
///
/// `fund_kind` selects the fund family: `YAT` (securities mutual funds),
/// `EMK` (pension funds) or `BYF` (exchange traded funds).
pub struct TefasProvider {
    client: Client,
    base_url: String,
    fund_kind: String,
}

impl TefasProvider {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_BASE_URL, DEFAULT_FUND_KIND)
    }

    pub fn with_options(base_url: impl Into<String>, fund_kind: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fund_kind: fund_kind.into(),
        }
    }

    /// POST the range to one history endpoint and return its rows.
    async fn post(
        &self,
        endpoint: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WideRow>, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let form = form_fields(&self.fund_kind, start, end);

        debug!("TEFAS request: {} {} - {}", endpoint, start, end);

        let response = self
            .client
            .post(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Origin", &self.base_url)
            .header("Referer", format!("{}/TarihselVeriler.aspx", self.base_url))
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })?;

        parse_history(&body)
    }
}

impl Default for TefasProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FundDataProvider for TefasProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 30,
            max_concurrency: 1,
            min_delay: Duration::from_millis(1000),
        }
    }

    async fn fetch(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FundRecord>, MarketDataError> {
        if start > end {
            return Err(MarketDataError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }

        let info = self.post(INFO_ENDPOINT, start, end).await?;
        let allocation = self.post(ALLOCATION_ENDPOINT, start, end).await?;

        Ok(merge_payloads(info, allocation))
    }
}

fn form_fields(fund_kind: &str, start: NaiveDate, end: NaiveDate) -> [(&'static str, String); 4] {
    [
        ("fontip", fund_kind.to_string()),
        ("bastarih", start.format("%d.%m.%Y").to_string()),
        ("bittarih", end.format("%d.%m.%Y").to_string()),
        ("fonkod", String::new()),
    ]
}

fn parse_history(body: &str) -> Result<Vec<WideRow>, MarketDataError> {
    // An empty body is what the endpoint returns for ranges without data.
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<HistoryResponse>(body)
        .map(|r| r.data)
        .map_err(|e| MarketDataError::Parse {
            provider: PROVIDER_ID.to_string(),
            message: format!("Invalid history payload: {}", e),
        })
}

/// Convert a `TARIH` cell (epoch millis, as string or number) to a local date.
fn epoch_millis_to_date(value: &Value) -> Option<NaiveDate> {
    let millis = match value {
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        Value::Number(n) => n.as_i64()?,
        _ => return None,
    };
    DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&Istanbul).date_naive())
}

fn row_key(row: &WideRow) -> Option<(NaiveDate, String)> {
    let date = row.get(COL_DATE).and_then(epoch_millis_to_date)?;
    let code = row.get(COL_CODE).and_then(Value::as_str)?.trim().to_string();
    if code.is_empty() {
        return None;
    }
    Some((date, code))
}

/// Join info rows with allocation rows on (date, code) into fund records.
///
/// Info rows drive the join; allocation rows without a matching info row
/// are dropped. Rows that cannot be keyed are logged and skipped.
fn merge_payloads(info: Vec<WideRow>, allocation: Vec<WideRow>) -> Vec<FundRecord> {
    let mut wide: BTreeMap<(NaiveDate, String), WideRow> = BTreeMap::new();

    for row in &info {
        let Some((date, code)) = row_key(row) else {
            warn!("TEFAS: skipping info row without date or code");
            continue;
        };
        let mut out = WideRow::new();
        out.insert("date".into(), Value::String(date.format("%Y-%m-%d").to_string()));
        out.insert("code".into(), Value::String(code.clone()));
        for (source, target) in [
            (COL_TITLE, "title"),
            (COL_PRICE, "price"),
            (COL_MARKET_CAP, "market_cap"),
            (COL_SHARES, "number_of_shares"),
            (COL_INVESTORS, "number_of_investors"),
        ] {
            if let Some(value) = row.get(source) {
                out.insert(target.into(), value.clone());
            }
        }
        wide.insert((date, code), out);
    }

    for row in allocation {
        let Some(key) = row_key(&row) else {
            continue;
        };
        let Some(out) = wide.get_mut(&key) else {
            continue;
        };
        for (column, value) in row {
            if !ALLOCATION_KEY_COLUMNS.contains(&column.as_str()) {
                out.insert(column, value);
            }
        }
    }

    wide.values()
        .filter_map(|row| match FundRecord::from_wide_row(row, PROVIDER_ID) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("TEFAS: skipping row: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<WideRow> {
        serde_json::from_value(value).unwrap()
    }

    // 2024-01-10 00:00 in Europe/Istanbul (UTC+3).
    const JAN_10_MS: &str = "1704834000000";

    #[test]
    fn test_provider_id() {
        let provider = TefasProvider::new();
        assert_eq!(provider.id(), "TEFAS");
    }

    #[test]
    fn test_rate_limit() {
        let provider = TefasProvider::new();
        let limit = provider.rate_limit();
        assert_eq!(limit.requests_per_minute, 30);
        assert_eq!(limit.max_concurrency, 1);
        assert_eq!(limit.min_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider = TefasProvider::with_options("http://localhost:9000/", "EMK");
        assert_eq!(provider.base_url, "http://localhost:9000");
        assert_eq!(provider.fund_kind, "EMK");
    }

    #[test]
    fn test_form_fields_use_dotted_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        let form = form_fields("YAT", start, end);
        assert_eq!(form[0], ("fontip", "YAT".to_string()));
        assert_eq!(form[1], ("bastarih", "05.01.2024".to_string()));
        assert_eq!(form[2], ("bittarih", "11.01.2024".to_string()));
        assert_eq!(form[3], ("fonkod", String::new()));
    }

    #[test]
    fn test_epoch_millis_to_local_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(epoch_millis_to_date(&json!(JAN_10_MS)), Some(expected));
        assert_eq!(
            epoch_millis_to_date(&json!(1704834000000_i64)),
            Some(expected)
        );
        assert_eq!(epoch_millis_to_date(&json!("yesterday")), None);
    }

    #[test]
    fn test_parse_history_handles_empty_body() {
        assert!(parse_history("").unwrap().is_empty());
        assert!(parse_history("{\"data\": []}").unwrap().is_empty());
        assert!(parse_history("<html>").is_err());
    }

    #[test]
    fn test_merge_payloads_joins_on_code_and_date() {
        let info = rows(json!([
            {
                "TARIH": JAN_10_MS, "FONKODU": "AAK", "FONUNVAN": "Fund A",
                "FIYAT": 1.25, "TEDPAYSAYISI": 1000.0, "KISISAYISI": 50,
                "PORTFOYBUYUKLUK": 1250.0, "BORSABULTENFIYAT": "-"
            },
            {
                "TARIH": JAN_10_MS, "FONKODU": "BBK", "FONUNVAN": "Fund B",
                "FIYAT": 3.5, "TEDPAYSAYISI": null, "KISISAYISI": 7,
                "PORTFOYBUYUKLUK": 900.0
            }
        ]));
        let allocation = rows(json!([
            {
                "TARIH": JAN_10_MS, "FONKODU": "AAK", "FONUNVAN": "Fund A",
                "BORSABULTENFIYAT": "-", "HS": 80.0, "R": 20.0, "DT": null
            },
            { "TARIH": JAN_10_MS, "FONKODU": "ZZZ", "HS": 100.0 }
        ]));

        let records = merge_payloads(info, allocation);
        assert_eq!(records.len(), 2);

        let a = &records[0];
        assert_eq!(a.code, "AAK");
        assert_eq!(a.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(a.price, Some(1.25));
        assert_eq!(a.market_cap, Some(1250.0));
        assert_eq!(a.number_of_investors, Some(50.0));
        assert_eq!(a.allocations.len(), 3);
        assert_eq!(a.allocations["HS"], Some(80.0));
        assert_eq!(a.allocations["DT"], None);

        let b = &records[1];
        assert_eq!(b.code, "BBK");
        assert_eq!(b.number_of_shares, None);
        assert!(b.allocations.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_rejects_inverted_range() {
        let provider = TefasProvider::with_options("http://127.0.0.1:9", "YAT");
        let start = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let err = provider.fetch(start, end).await.unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidRange(_)));
    }
}
