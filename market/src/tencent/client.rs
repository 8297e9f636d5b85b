use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::errors::QuoteError;
use crate::source::{QuoteMap, QuoteSource};
use crate::tencent::parser::parse_response;
use crate::types::Market;

pub const DEFAULT_ENDPOINT: &str = "https://qt.gtimg.cn";

#[derive(Clone)]
pub struct TencentQuoteSource {
    http: Client,
    url: String,
}

impl TencentQuoteSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self, QuoteError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url })
    }
}

#[async_trait]
impl QuoteSource for TencentQuoteSource {
    fn name(&self) -> &'static str {
        "tencent"
    }

    #[instrument(skip(self, codes), fields(count = codes.len()), level = "debug")]
    async fn fetch(&self, codes: &[String]) -> Result<QuoteMap, QuoteError> {
        let wanted: Vec<&str> = codes
            .iter()
            .map(String::as_str)
            .filter(|c| Market::from_code(c).is_some())
            .collect();

        if codes.is_empty() {
            return Ok(QuoteMap::new());
        }
        if wanted.is_empty() {
            return Err(QuoteError::UnsupportedCodes {
                source_name: "tencent",
                requested: codes.len(),
            });
        }

        let url = format!("{}/q={}", self.url.trim_end_matches('/'), wanted.join(","));

        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let body = resp.text_with_charset("gbk").await?;

        let batch = parse_response(&body);

        for (record, reason) in &batch.rejected {
            warn!(source = "tencent", record = %record, reason = %reason, "skipping quote record");
        }

        if batch.quotes.is_empty() {
            return Err(QuoteError::InvalidResponse {
                source_name: "tencent",
                reason: format!("no parsable records for {} codes", wanted.len()),
            });
        }

        debug!(
            parsed = batch.quotes.len(),
            rejected = batch.rejected.len(),
            "tencent batch fetched"
        );

        Ok(batch.quotes)
    }
}
