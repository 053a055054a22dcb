//! Fetches per-location weather attributes from the Open-Meteo API.

use std::future::Future;

use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    config::{FetchConfig, Provider, TrackedAttribute},
    table::{AttributeValues, Location},
};

const CURRENT_URL: &str = "https://api.open-meteo.com/v1/forecast";
const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Errors a single location fetch can signal. None of them are fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),
    #[error("Invalid value for attribute: {0}")]
    InvalidValue(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Http(status.as_u16()),
            None => FetchError::Request(e.to_string()),
        }
    }
}

/// Supplies the raw attribute values for one location.
pub trait Fetch {
    fn fetch(
        &self,
        location: &Location,
        attributes: &[TrackedAttribute],
    ) -> impl Future<Output = Result<AttributeValues, FetchError>> + Send;
}

pub struct OpenMeteoClient {
    client: reqwest::Client,
    provider: Provider,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl OpenMeteoClient {
    pub fn new(config: &FetchConfig) -> Self {
        OpenMeteoClient {
            client: reqwest::Client::new(),
            provider: config.provider,
            start_date: config.start_date,
            end_date: config.end_date,
        }
    }

    fn base_url(&self) -> &'static str {
        match self.provider {
            Provider::Current => CURRENT_URL,
            Provider::Archive => ARCHIVE_URL,
        }
    }

    fn query_params(
        &self,
        location: &Location,
        attributes: &[TrackedAttribute],
    ) -> Vec<(&'static str, String)> {
        let variables = attributes
            .iter()
            .map(|a| a.variable.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let mut params = vec![
            ("latitude", location.lat.to_string()),
            ("longitude", location.lon.to_string()),
        ];

        match self.provider {
            Provider::Current => params.push(("current", variables)),
            Provider::Archive => {
                params.push(("daily", variables));
                if let Some(start) = self.start_date {
                    params.push(("start_date", start.format("%Y-%m-%d").to_string()));
                }
                if let Some(end) = self.end_date {
                    params.push(("end_date", end.format("%Y-%m-%d").to_string()));
                }
                params.push(("timezone", "auto".to_string()));
            }
        }

        params
    }
}

impl Fetch for OpenMeteoClient {
    async fn fetch(
        &self,
        location: &Location,
        attributes: &[TrackedAttribute],
    ) -> Result<AttributeValues, FetchError> {
        let response = self
            .client
            .get(self.base_url())
            .query(&self.query_params(location, attributes))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Http(response.status().as_u16()));
        }

        let body: Value = response.json().await?;

        match self.provider {
            Provider::Current => extract_current(&body, attributes),
            Provider::Archive => extract_daily_means(&body, attributes),
        }
    }
}

/// Reads `current.<variable>` for every tracked attribute.
pub fn extract_current(
    body: &Value,
    attributes: &[TrackedAttribute],
) -> Result<AttributeValues, FetchError> {
    let mut values = AttributeValues::new();

    for attribute in attributes {
        let value = body
            .get("current")
            .and_then(|c| c.get(&attribute.variable))
            .and_then(Value::as_f64)
            .ok_or_else(|| FetchError::MissingAttribute(attribute.name.clone()))?;
        if !value.is_finite() {
            return Err(FetchError::InvalidValue(attribute.name.clone()));
        }
        values.insert(attribute.name.clone(), value);
    }

    Ok(values)
}

/// Reduces each `daily.<variable>` series to the mean of its non-null
/// values, rounded to two decimals.
pub fn extract_daily_means(
    body: &Value,
    attributes: &[TrackedAttribute],
) -> Result<AttributeValues, FetchError> {
    let mut values = AttributeValues::new();

    for attribute in attributes {
        let series: Vec<f64> = body
            .get("daily")
            .and_then(|d| d.get(&attribute.variable))
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::MissingAttribute(attribute.name.clone()))?
            .iter()
            .filter_map(Value::as_f64)
            .collect();

        if series.is_empty() {
            return Err(FetchError::MissingAttribute(attribute.name.clone()));
        }

        let mean = series.iter().sum::<f64>() / series.len() as f64;
        if !mean.is_finite() {
            return Err(FetchError::InvalidValue(attribute.name.clone()));
        }
        values.insert(attribute.name.clone(), (mean * 100.0).round() / 100.0);
    }

    Ok(values)
}

// -- Tests -------------------------------------------------------------------
