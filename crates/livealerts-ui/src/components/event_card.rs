use livealerts_core::board::CardView;
use yew::{
  AttrValue,
  Html,
  Properties,
  function_component,
  html
};

use super::SendEmailButton;

#[derive(Properties, PartialEq)]
pub struct EventCardProps {
  pub card:           CardView,
  pub email_endpoint: AttrValue,
  pub feedback_ms:    u32
}

/// One event. Text goes through the virtual DOM as text nodes, so
/// markup in server data is shown literally.
#[function_component(EventCard)]
pub fn event_card(
  props: &EventCardProps
) -> Html {
  let card = &props.card;

  html! {
    <div class="card">
      <strong>{ card.title.clone() }</strong>
      <div class="meta">
        <span class="badge">
          { card.category.clone() }
        </span>
        <span class="badge source">
          { card.source.clone() }
        </span>
        <span>{ format!("📅 {}", card.date) }</span>
      </div>
      <div class="event-details">
        if let Some(link) = card.link.clone() {
          <div class="detail-item">
            <span>{ "🔗" }</span>
            <a
              class="link"
              href={link}
              target="_blank"
              rel="noopener"
            >
              { "View Source" }
            </a>
          </div>
        }
        <div class="detail-item">
          <span>{ "📍" }</span>
          <strong>{ card.coordinates.clone() }</strong>
        </div>
        if let Some(magnitude) = card.magnitude.clone() {
          <div class="detail-item">
            <span>{ "📊" }</span>
            <strong>{ magnitude }</strong>
          </div>
        }
        <div class="detail-item">
          <SendEmailButton
            target={card.email.clone()}
            endpoint={props.email_endpoint.clone()}
            feedback_ms={props.feedback_ms}
          />
        </div>
      </div>
    </div>
  }
}
