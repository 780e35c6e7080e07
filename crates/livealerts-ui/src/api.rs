use gloo::net::http::Request;
use livealerts_core::board::EmailTarget;
use livealerts_core::event::{
  EventRecord,
  decode_events
};

pub async fn fetch_events(
  endpoint: &str,
  query: &[(&'static str, String)]
) -> Result<Vec<EventRecord>, String> {
  let response = Request::get(endpoint)
    .query(
      query
        .iter()
        .map(|(key, value)| (*key, value.as_str()))
    )
    .send()
    .await
    .map_err(|e| format!("request failed: {e}"))?;

  if !response.ok() {
    return Err(format!(
      "HTTP {}",
      response.status()
    ));
  }

  let body = response
    .text()
    .await
    .map_err(|e| {
      format!("failed to read body: {e}")
    })?;

  decode_events(&body)
    .map_err(|e| format!("{e:#}"))
}

/// Server reply to a send-email request; both outcomes carry text.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailReply {
  pub ok:   bool,
  pub text: String
}

pub async fn send_email(
  endpoint: &str,
  target: &EmailTarget
) -> Result<EmailReply, String> {
  let response = Request::get(endpoint)
    .query([
      ("id", target.id.as_str()),
      ("source", target.source.as_str())
    ])
    .send()
    .await
    .map_err(|e| format!("request failed: {e}"))?;

  let ok = response.ok();
  let text = response
    .text()
    .await
    .map_err(|e| {
      format!("failed to read body: {e}")
    })?;

  Ok(EmailReply { ok, text })
}
