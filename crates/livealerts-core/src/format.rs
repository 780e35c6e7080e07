const MISSING: &str = "-";

#[must_use]
pub fn format_coordinates(
  latitude: Option<f64>,
  longitude: Option<f64>
) -> String {
  match (latitude, longitude) {
    | (Some(lat), Some(lon))
      if lat.is_finite()
        && lon.is_finite() =>
    {
      format!(
        "{}, {}",
        hemisphere(lat, 'N', 'S'),
        hemisphere(lon, 'E', 'W')
      )
    }
    | _ => MISSING.to_string()
  }
}

fn hemisphere(
  value: f64,
  positive: char,
  negative: char
) -> String {
  let suffix =
    if value >= 0.0 { positive } else { negative };
  format!("{:.3}°{suffix}", value.abs())
}

#[must_use]
pub fn format_magnitude(
  magnitude: Option<f64>
) -> Option<String> {
  magnitude
    .filter(|m| m.is_finite() && *m != 0.0)
    .map(|m| format!("Mag {m:.1}"))
}

#[must_use]
pub fn safe_link(
  url: Option<&str>
) -> Option<String> {
  let url = url?.trim();
  let lower = url.to_ascii_lowercase();
  if lower.starts_with("https://")
    || lower.starts_with("http://")
  {
    Some(url.to_string())
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::{
    format_coordinates,
    format_magnitude,
    safe_link
  };

  #[test]
  fn formats_signed_hemispheres() {
    assert_eq!(
      format_coordinates(
        Some(-12.3456),
        Some(45.6789)
      ),
      "12.346°S, 45.679°E"
    );
    assert_eq!(
      format_coordinates(
        Some(0.0),
        Some(-0.0005)
      ),
      "0.000°N, 0.001°W"
    );
  }

  #[test]
  fn missing_coordinate_renders_dash() {
    assert_eq!(
      format_coordinates(Some(1.0), None),
      "-"
    );
    assert_eq!(
      format_coordinates(None, None),
      "-"
    );
    assert_eq!(
      format_coordinates(
        Some(f64::NAN),
        Some(1.0)
      ),
      "-"
    );
  }

  #[test]
  fn magnitude_has_one_decimal() {
    assert_eq!(
      format_magnitude(Some(4.46)),
      Some("Mag 4.5".to_string())
    );
    assert_eq!(format_magnitude(Some(0.0)), None);
    assert_eq!(format_magnitude(None), None);
  }

  #[test]
  fn only_http_links_survive() {
    assert_eq!(
      safe_link(Some(" https://usgs.gov/e/1 ")),
      Some("https://usgs.gov/e/1".to_string())
    );
    assert_eq!(
      safe_link(Some("javascript:alert(1)")),
      None
    );
    assert_eq!(safe_link(None), None);
  }
}
