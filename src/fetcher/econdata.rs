use async_trait::async_trait;
use super::IndicatorSource;
use super::transform_keys::{TransformKeys, DEFAULT_FREQUENCY};
use crate::config::Settings;
use crate::error::{FetchError, FetchResult};
use crate::models::{ObservationPoint, SeriesBundle, SeriesMeta, Timestamp};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::{json, Map, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the indicator backend's `POST /econdata` endpoint.
pub struct EconDataClient {
    url: String,
    client: Client,
    timeout: Option<Duration>,
}

impl EconDataClient {
    pub fn new(settings: &Settings) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(agent) = HeaderValue::from_str(&settings.user_agent) {
            headers.insert(USER_AGENT, agent);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            url: settings.econdata_url(),
            client,
            timeout: settings.fetch_timeout(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One request for several codes; each entry is decoded independently.
    /// Only transport failures fail the whole batch.
    pub async fn fetch_many(&self, codes: &[String]) -> FetchResult<Vec<(String, FetchResult<SeriesBundle>)>> {
        let codes: Vec<String> = codes
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();

        let json = self.post(&codes).await?;
        Ok(codes
            .into_iter()
            .map(|code| {
                let decoded = decode_series(&json, &code);
                (code, decoded)
            })
            .collect())
    }

    async fn post(&self, codes: &[String]) -> FetchResult<Value> {
        let label = codes.join(",");
        bounded(self.timeout, &label, self.send(codes, &label)).await
    }

    async fn send(&self, codes: &[String], label: &str) -> FetchResult<Value> {
        debug!("POST {} series_ids={:?}", self.url, codes);

        let resp = self
            .client
            .post(&self.url)
            .json(&json!({ "series_ids": codes }))
            .send()
            .await
            .map_err(|source| FetchError::Network { code: label.to_string(), source })?;

        if !resp.status().is_success() {
            return Err(FetchError::Transport { code: label.to_string(), status: resp.status().as_u16() });
        }

        resp.json::<Value>()
            .await
            .map_err(|source| FetchError::Network { code: label.to_string(), source })
    }
}

#[async_trait]
impl IndicatorSource for EconDataClient {
    fn name(&self) -> &str {
        "econdata"
    }

    async fn fetch_series(&self, code: &str) -> FetchResult<SeriesBundle> {
        let code = code.trim().to_uppercase();
        info!("Fetching {} from {}", code, self.url);

        let json = self.post(std::slice::from_ref(&code)).await?;
        let bundle = decode_series(&json, &code)?;

        info!("Fetched {} ({} points, {})", code, bundle.observation_count(), bundle.frequency);
        Ok(bundle)
    }
}

async fn bounded<F>(limit: Option<Duration>, label: &str, request: F) -> FetchResult<Value>
where
    F: Future<Output = FetchResult<Value>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, request)
            .await
            .map_err(|_| FetchError::Timeout { code: label.to_string(), seconds: limit.as_secs() })?,
        None => request.await,
    }
}

/// Decode one code's entry of an `/econdata` response into a bundle.
///
/// The period-change field is chosen here, once, from the response's frequency.
pub fn decode_series(json: &Value, code: &str) -> FetchResult<SeriesBundle> {
    let empty = || FetchError::EmptyResult { code: code.to_string() };

    let payload = json.get(code).filter(|p| !p.is_null()).ok_or_else(empty)?;
    let data = payload.get("data").and_then(Value::as_object).ok_or_else(empty)?;

    let meta = payload
        .get("meta")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .map(parse_meta)
        .unwrap_or_default();

    let frequency = meta
        .frequency
        .clone()
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string());
    let keys = TransformKeys::select(code, Some(frequency.as_str()));

    let mut malformed_timestamps = Vec::new();
    let dates: Vec<Timestamp> = data
        .get("date")
        .and_then(Value::as_array)
        .map(|arr| arr.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|raw| {
            let ts = parse_timestamp_value(raw);
            if let Timestamp::Raw(text) = &ts {
                warn!("{}", FetchError::MalformedTimestamp { code: code.to_string(), raw: text.clone() });
                malformed_timestamps.push(text.clone());
            }
            ts
        })
        .collect();

    Ok(SeriesBundle {
        code: code.to_string(),
        level: to_points(&dates, data, &keys.level),
        period_change: to_points(&dates, data, &keys.period),
        yoy_change: to_points(&dates, data, &keys.yoy),
        frequency,
        period_kind: keys.period_kind,
        meta,
        malformed_timestamps,
    })
}

/// Zip the shared date axis with one field; short or missing fields pad with gaps.
fn to_points(dates: &[Timestamp], data: &Map<String, Value>, field: &str) -> Vec<ObservationPoint> {
    let values = data.get(field).and_then(Value::as_array);

    dates
        .iter()
        .enumerate()
        .map(|(i, ts)| ObservationPoint {
            timestamp: ts.clone(),
            value: values.and_then(|arr| arr.get(i)).and_then(parse_value),
        })
        .collect()
}

fn parse_meta(record: &Value) -> SeriesMeta {
    let field = |name: &str| record.get(name).and_then(Value::as_str).map(str::to_string);
    SeriesMeta {
        frequency: field("frequency"),
        title: field("title"),
        units: field("units"),
        seasonal_adjustment: field("seasonal_adjustment"),
    }
}

fn parse_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        // FRED marks missing observations with "."
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn parse_timestamp_value(raw: &Value) -> Timestamp {
    match raw {
        Value::String(s) => match parse_timestamp(s) {
            Some(ts) => Timestamp::Instant(ts),
            None => Timestamp::Raw(s.clone()),
        },
        other => Timestamp::Raw(other.to_string()),
    }
}

/// Parse a backend date to the canonical instant: midnight UTC of its calendar day.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()?;

    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}
