use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  error,
  info
};

use crate::datetime::parse_timezone;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
  pub events_endpoint:         String,
  pub send_email_endpoint:     String,
  pub page_size:               usize,
  pub poll_interval_secs:      u64,
  pub display_timezone:        String,
  pub discard_stale_responses: bool,
  pub email_feedback_ms:       u32,
  pub dropdown:                DropdownConfig
}

impl Default for BoardConfig {
  fn default() -> Self {
    Self {
      events_endpoint:         "/events"
        .to_string(),
      send_email_endpoint:     "/send-email"
        .to_string(),
      page_size:               20,
      poll_interval_secs:      15,
      display_timezone:        "UTC"
        .to_string(),
      discard_stale_responses: false,
      email_feedback_ms:       2_000,
      dropdown:                DropdownConfig::default()
    }
  }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DropdownConfig {
  pub init_attempts:       u32,
  pub init_retry_ms:       u32,
  pub flip_threshold_px:   f64,
  pub edge_margin_px:      f64,
  pub gap_px:              f64,
  pub min_width_px:        f64,
  pub default_placeholder: String
}

impl Default for DropdownConfig {
  fn default() -> Self {
    Self {
      init_attempts:       8,
      init_retry_ms:       150,
      flip_threshold_px:   200.0,
      edge_margin_px:      8.0,
      gap_px:              6.0,
      min_width_px:        160.0,
      default_placeholder: "Select"
        .to_string()
    }
  }
}

impl BoardConfig {
  #[tracing::instrument(skip(raw))]
  pub fn from_toml_str(
    raw: &str
  ) -> anyhow::Result<Self> {
    let cfg: BoardConfig =
      toml::from_str(raw).context(
        "failed to parse board config"
      )?;
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn load_or_default(raw: &str) -> Self {
    match Self::from_toml_str(raw) {
      | Ok(cfg) => {
        info!(
          events_endpoint = %cfg.events_endpoint,
          page_size = cfg.page_size,
          poll_interval_secs = cfg.poll_interval_secs,
          "loaded board config"
        );
        cfg
      }
      | Err(err) => {
        error!(
          error = %format!("{err:#}"),
          "invalid board config; using defaults"
        );
        Self::default()
      }
    }
  }

  pub fn validate(
    &self
  ) -> anyhow::Result<()> {
    if self.page_size == 0 {
      return Err(anyhow!(
        "page_size must be at least 1"
      ));
    }
    if self.poll_interval_secs == 0 {
      return Err(anyhow!(
        "poll_interval_secs must be at \
         least 1"
      ));
    }
    if self.dropdown.init_attempts == 0 {
      return Err(anyhow!(
        "dropdown.init_attempts must be \
         at least 1"
      ));
    }
    if self.display_timezone.parse::<Tz>().is_err() {
      return Err(anyhow!(
        "unknown display_timezone: {}",
        self.display_timezone
      ));
    }
    Ok(())
  }

  pub fn timezone(&self) -> Tz {
    parse_timezone(&self.display_timezone)
      .unwrap_or(chrono_tz::UTC)
  }

  pub fn poll_interval_ms(&self) -> u64 {
    self.poll_interval_secs.saturating_mul(1_000)
  }
}

#[cfg(test)]
mod tests {
  use super::BoardConfig;

  #[test]
  fn empty_document_yields_defaults() {
    let cfg = BoardConfig::from_toml_str("")
      .expect("empty config");
    assert_eq!(cfg, BoardConfig::default());
    assert_eq!(cfg.page_size, 20);
    assert_eq!(cfg.poll_interval_ms(), 15_000);
    assert_eq!(cfg.dropdown.init_attempts, 8);
    assert_eq!(cfg.dropdown.init_retry_ms, 150);
  }

  #[test]
  fn partial_overrides_keep_other_defaults() {
    let cfg = BoardConfig::from_toml_str(
      r#"
page_size = 50
display_timezone = "Europe/Berlin"

[dropdown]
flip_threshold_px = 120.0
"#
    )
    .expect("partial config");

    assert_eq!(cfg.page_size, 50);
    assert_eq!(cfg.events_endpoint, "/events");
    assert_eq!(
      cfg.timezone(),
      chrono_tz::Europe::Berlin
    );
    assert_eq!(
      cfg.dropdown.flip_threshold_px,
      120.0
    );
    assert_eq!(cfg.dropdown.edge_margin_px, 8.0);
  }

  #[test]
  fn invalid_values_fall_back() {
    assert!(
      BoardConfig::from_toml_str("page_size = 0")
        .is_err()
    );
    assert!(
      BoardConfig::from_toml_str(
        "display_timezone = \"Nowhere/Land\""
      )
      .is_err()
    );
    assert_eq!(
      BoardConfig::load_or_default(
        "poll_interval_secs = \"soon\""
      ),
      BoardConfig::default()
    );
  }
}
