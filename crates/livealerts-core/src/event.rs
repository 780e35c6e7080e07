use anyhow::Context;
use chrono::{
  DateTime,
  Utc
};
use serde::Deserialize;

use crate::datetime::parse_event_date;

#[derive(Debug, Clone, PartialEq)]
pub enum EventDate {
  EpochMillis(i64),
  Text(String)
}

#[derive(
  Debug, Clone, Default, PartialEq, Deserialize,
)]
pub struct EventRecord {
  #[serde(
    default,
    deserialize_with = "lenient_serde::text"
  )]
  pub id:        Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::text"
  )]
  pub title:     Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::text"
  )]
  pub category:  Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::text"
  )]
  pub source:    Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::date"
  )]
  pub date:      Option<EventDate>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::text"
  )]
  pub url:       Option<String>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::number"
  )]
  pub latitude:  Option<f64>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::number"
  )]
  pub lat:       Option<f64>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::number"
  )]
  pub longitude: Option<f64>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::number"
  )]
  pub lon:       Option<f64>,
  #[serde(
    default,
    deserialize_with = "lenient_serde::number"
  )]
  pub magnitude: Option<f64>
}

impl EventRecord {
  pub fn category_str(&self) -> &str {
    self.category.as_deref().unwrap_or("")
  }

  pub fn source_str(&self) -> &str {
    self.source.as_deref().unwrap_or("")
  }

  pub fn latitude(&self) -> Option<f64> {
    self.latitude.or(self.lat)
  }

  pub fn longitude(&self) -> Option<f64> {
    self.longitude.or(self.lon)
  }

  #[must_use]
  pub fn timestamp(
    &self
  ) -> Option<DateTime<Utc>> {
    self
      .date
      .as_ref()
      .and_then(parse_event_date)
  }

  /// Milliseconds used for ordering; unparseable dates count as the
  /// epoch.
  #[must_use]
  pub fn sort_key(&self) -> i64 {
    self
      .timestamp()
      .map(|ts| ts.timestamp_millis())
      .unwrap_or(0)
  }
}

#[tracing::instrument(skip(body), fields(bytes = body.len()))]
pub fn decode_events(
  body: &str
) -> anyhow::Result<Vec<EventRecord>> {
  let events: Vec<EventRecord> =
    serde_json::from_str(body).context(
      "events payload is not a JSON \
       array of event objects"
    )?;
  tracing::debug!(
    count = events.len(),
    "decoded events payload"
  );
  Ok(events)
}

pub mod lenient_serde {
  use serde::{
    Deserialize,
    Deserializer
  };
  use serde_json::Value;

  use super::EventDate;

  pub fn text<'de, D>(
    deserializer: D
  ) -> Result<Option<String>, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      Value::deserialize(deserializer)?;
    Ok(match raw {
      | Value::String(s)
        if !s.is_empty() =>
      {
        Some(s)
      }
      | Value::Number(n) => {
        Some(n.to_string())
      }
      | _ => None
    })
  }

  pub fn number<'de, D>(
    deserializer: D
  ) -> Result<Option<f64>, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      Value::deserialize(deserializer)?;
    let parsed = match raw {
      | Value::Number(n) => n.as_f64(),
      | Value::String(s) => {
        s.trim().parse::<f64>().ok()
      }
      | _ => None
    };
    Ok(parsed.filter(|v| v.is_finite()))
  }

  pub fn date<'de, D>(
    deserializer: D
  ) -> Result<Option<EventDate>, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      Value::deserialize(deserializer)?;
    Ok(match raw {
      | Value::Number(n) => n
        .as_i64()
        .or_else(|| {
          n.as_f64()
            .filter(|v| v.is_finite())
            .map(|v| v.round() as i64)
        })
        .map(EventDate::EpochMillis),
      | Value::String(s)
        if !s.trim().is_empty() =>
      {
        Some(EventDate::Text(s))
      }
      | _ => None
    })
  }
}
