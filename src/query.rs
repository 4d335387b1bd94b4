//! Historical-quote queries against the finance CSV endpoint.
//!
//! A [`Query`] is either a single date or a date range, plus the symbol key
//! (usually `<exchange>:<symbol>`, e.g. `NASDAQ:GOOG`). [`Query::get`] fetches
//! the CSV export and decodes it with a fresh [`Decoder`].

use chrono::NaiveDate;
use log::debug;
use reqwest::blocking::{Client, Response};
use thiserror::Error;
use url::Url;

use crate::{decoder::Decoder, error::DecodeError, record::Record};

pub const DEFAULT_BASE_URL: &str = "http://www.google.com/finance/historical";

const QUERY_DATE_FORMAT: &str = "%b %-d, %Y";

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query has no symbol key")]
    MissingKey,
    #[error("invalid base url '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("requesting {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching csv from {url} failed with status {status}\n{body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Date(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
}

impl Span {
    fn bounds(&self) -> (NaiveDate, NaiveDate) {
        match *self {
            Span::Date(date) => (date, date),
            Span::Range { start, end } => (start, end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    span: Span,
    key: Option<String>,
    base_url: String,
}

impl Query {
    pub fn date(date: NaiveDate) -> Self {
        Self::with_span(Span::Date(date))
    }

    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self::with_span(Span::Range { start, end })
    }

    fn with_span(span: Span) -> Self {
        Self {
            span,
            key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Returns a copy of this query for the symbol `key`.
    pub fn key(&self, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..self.clone()
        }
    }

    pub fn base_url(&self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self.clone()
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn url(&self) -> Result<Url, QueryError> {
        let key = self.key.as_deref().ok_or(QueryError::MissingKey)?;
        let (start, end) = self.span.bounds();
        let start = start.format(QUERY_DATE_FORMAT).to_string();
        let end = end.format(QUERY_DATE_FORMAT).to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("q", key),
                ("startdate", start.as_str()),
                ("enddate", end.as_str()),
                ("output", "csv"),
            ],
        )
        .map_err(|source| QueryError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })
    }

    /// Issues the request; any non-success status is an error carrying the
    /// response body.
    pub fn fetch(&self, client: &Client) -> Result<Response, QueryError> {
        let url = self.url()?;
        debug!("Fetching {url}");
        let response = client
            .get(url.clone())
            .send()
            .map_err(|source| QueryError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
            return Err(QueryError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }
        Ok(response)
    }

    /// Fetches the CSV export and appends the decoded records to `output`.
    pub fn get<T: Record>(&self, client: &Client, output: &mut Vec<T>) -> Result<(), QueryError> {
        let response = self.fetch(client)?;
        Decoder::new(response).decode(output)?;
        Ok(())
    }
}
