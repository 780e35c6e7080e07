use chrono::{
  DateTime,
  NaiveDate,
  NaiveDateTime,
  Utc
};
use chrono_tz::Tz;

use crate::event::EventDate;

/// Shortest all-digit string treated as epoch milliseconds.
const NUMERIC_DATE_MIN_LEN: usize = 10;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M"
];

const DISPLAY_FORMAT: &str =
  "%Y-%m-%d %H:%M:%S %Z";

#[must_use]
pub fn parse_event_date(
  raw: &EventDate
) -> Option<DateTime<Utc>> {
  match raw {
    | EventDate::EpochMillis(ms) => {
      DateTime::from_timestamp_millis(*ms)
    }
    | EventDate::Text(text) => {
      parse_date_text(text)
    }
  }
}

fn parse_date_text(
  text: &str
) -> Option<DateTime<Utc>> {
  let text = text.trim();
  if text.is_empty() {
    return None;
  }

  if text.len() >= NUMERIC_DATE_MIN_LEN
    && text
      .bytes()
      .all(|b| b.is_ascii_digit())
  {
    return text
      .parse::<i64>()
      .ok()
      .and_then(
        DateTime::from_timestamp_millis
      );
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(text)
  {
    return Some(dt.with_timezone(&Utc));
  }

  if let Ok(dt) =
    DateTime::parse_from_rfc2822(text)
  {
    return Some(dt.with_timezone(&Utc));
  }

  for format in NAIVE_DATETIME_FORMATS {
    if let Ok(ndt) =
      NaiveDateTime::parse_from_str(
        text, format
      )
    {
      return Some(ndt.and_utc());
    }
  }

  if let Ok(date) =
    NaiveDate::parse_from_str(
      text, "%Y-%m-%d"
    )
  {
    return date
      .and_hms_opt(0, 0, 0)
      .map(|ndt| ndt.and_utc());
  }

  if text.len() == 4
    && let Ok(year) = text.parse::<i32>()
  {
    return NaiveDate::from_ymd_opt(
      year, 1, 1
    )
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|ndt| ndt.and_utc());
  }

  tracing::trace!(
    raw = text,
    "unparseable event date"
  );
  None
}

#[must_use]
pub fn format_event_date(
  ts: Option<DateTime<Utc>>,
  tz: &Tz
) -> String {
  match ts {
    | Some(ts) if ts.timestamp_millis() != 0 => {
      ts.with_timezone(tz)
        .format(DISPLAY_FORMAT)
        .to_string()
    }
    | _ => "-".to_string()
  }
}

#[must_use]
pub fn format_refresh_time(
  ts: DateTime<Utc>,
  tz: &Tz
) -> String {
  ts.with_timezone(tz)
    .format(DISPLAY_FORMAT)
    .to_string()
}

pub fn parse_timezone(
  raw: &str
) -> Option<Tz> {
  match raw.trim().parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(error) => {
      tracing::warn!(
        timezone = raw,
        %error,
        "invalid display timezone"
      );
      None
    }
  }
}
