//! Up Bank API client.
//!
//! Listings are cursor-paginated: each page carries a `links.next` URL which
//! already embeds the query string. Any transport or HTTP error aborts the
//! whole fetch; there is no retry and no partial result.

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Australia::Sydney;
use chrono_tz::Tz;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::{Page, Transaction, TransactionStatus};

pub const BASE_URL: &str = "https://api.up.com.au/api/v1";

/// Maximum number of records the API returns per page.
pub const PAGE_SIZE: usize = 100;

pub struct UpClient {
    http: Client,
    token: String,
    base_url: String,
}

impl UpClient {
    /// `token` is an Up "personal access token",
    /// see <https://api.up.com.au/getting_started>.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        UpClient {
            http: Client::new(),
            token: token.into(),
            base_url: base_url.into(),
        }
    }

    /// Verify the token and the API are both alive.
    pub async fn ping(&self) -> Result<String> {
        let response = self
            .http
            .get(format!("{}/util/ping", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .context("GET /util/ping")?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    /// Settled transactions for one calendar month, in the bank's local time.
    pub async fn get_month(&self, year: i32, month: u32) -> Result<Vec<Transaction>> {
        let (since, until) = month_range(year, month)?;
        self.transactions(since, Some(until), Some(TransactionStatus::Settled))
            .await
    }

    pub async fn transactions(
        &self,
        since: DateTime<Tz>,
        until: Option<DateTime<Tz>>,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>> {
        let mut params = vec![
            ("page[size]".to_string(), PAGE_SIZE.to_string()),
            ("filter[since]".to_string(), since.to_rfc3339()),
        ];
        if let Some(until) = until {
            params.push(("filter[until]".to_string(), until.to_rfc3339()));
        }
        if let Some(status) = status {
            params.push(("filter[status]".to_string(), status.as_str().to_string()));
        }
        self.get_paginated("/transactions", &params).await
    }

    pub async fn accounts(&self) -> Result<Vec<Value>> {
        self.get_paginated("/accounts", &[]).await
    }

    pub async fn categories(&self) -> Result<Vec<Value>> {
        self.get_paginated("/categories", &[]).await
    }

    async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<Vec<T>> {
        let mut out = Vec::new();
        let mut next: Option<String> = None;

        loop {
            let request = match &next {
                // the cursor URL already carries the query string
                Some(url) => self.http.get(url),
                None => self
                    .http
                    .get(format!("{}{}", self.base_url, path))
                    .query(params),
            };
            let page: Page<T> = request
                .bearer_auth(&self.token)
                .send()
                .await
                .with_context(|| format!("GET {path}"))?
                .error_for_status()?
                .json()
                .await
                .with_context(|| format!("decoding {path} response"))?;

            out.extend(page.data);
            match page.links.next {
                Some(url) => next = Some(url),
                None => break,
            }
        }

        Ok(out)
    }
}

/// Local-midnight bounds of a calendar month in the bank's timezone.
/// December rolls over to January of the next year.
pub fn month_range(year: i32, month: u32) -> Result<(DateTime<Tz>, DateTime<Tz>)> {
    use chrono::TimeZone;

    let since = Sydney
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .with_context(|| format!("invalid month {year}-{month:02}"))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let until = Sydney
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .with_context(|| format!("invalid month {next_year}-{next_month:02}"))?;
    Ok((since, until))
}
