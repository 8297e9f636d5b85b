use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::REFERER;
use tracing::{debug, instrument, warn};

use crate::errors::QuoteError;
use crate::sina::parser::parse_response;
use crate::source::{QuoteMap, QuoteSource};
use crate::types::Market;

pub const DEFAULT_ENDPOINT: &str = "https://hq.sinajs.cn";

/// The feed refuses requests without a finance.sina.com.cn referer.
const REFERER_VALUE: &str = "https://finance.sina.com.cn";

#[derive(Clone)]
pub struct SinaQuoteSource {
    http: Client,
    url: String,
}

impl SinaQuoteSource {
    pub fn new(url: String, timeout: Duration) -> Result<Self, QuoteError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url })
    }
}

#[async_trait]
impl QuoteSource for SinaQuoteSource {
    fn name(&self) -> &'static str {
        "sina"
    }

    #[instrument(skip(self, codes), fields(count = codes.len()), level = "debug")]
    async fn fetch(&self, codes: &[String]) -> Result<QuoteMap, QuoteError> {
        let wanted: Vec<&str> = codes
            .iter()
            .map(String::as_str)
            .filter(|c| Market::from_code(c) == Some(Market::AShare))
            .collect();

        if codes.is_empty() {
            return Ok(QuoteMap::new());
        }
        if wanted.is_empty() {
            return Err(QuoteError::UnsupportedCodes {
                source_name: "sina",
                requested: codes.len(),
            });
        }

        let url = format!("{}/list={}", self.url.trim_end_matches('/'), wanted.join(","));

        let resp = self
            .http
            .get(&url)
            .header(REFERER, REFERER_VALUE)
            .send()
            .await?
            .error_for_status()?;
        let body = resp.text_with_charset("gbk").await?;

        let batch = parse_response(&body);

        for (record, reason) in &batch.rejected {
            warn!(source = "sina", record = %record, reason = %reason, "skipping quote record");
        }

        if batch.quotes.is_empty() {
            return Err(QuoteError::InvalidResponse {
                source_name: "sina",
                reason: format!("no parsable records for {} codes", wanted.len()),
            });
        }

        debug!(
            parsed = batch.quotes.len(),
            rejected = batch.rejected.len(),
            "sina batch fetched"
        );

        Ok(batch.quotes)
    }
}
