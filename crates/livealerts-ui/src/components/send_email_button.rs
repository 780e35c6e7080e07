use gloo::timers::future::TimeoutFuture;
use livealerts_core::board::EmailTarget;
use web_sys::MouseEvent;
use yew::{
  AttrValue,
  Callback,
  Html,
  Properties,
  function_component,
  html,
  use_state
};

use crate::api;

const TRANSPORT_FAILURE: &str =
  "Failed to send email.";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
  Idle,
  Sending,
  Sent,
  Failed
}

impl Phase {
  fn label(self) -> &'static str {
    match self {
      | Phase::Idle => "✉️ Send Email",
      | Phase::Sending => "Sending...",
      | Phase::Sent => "Sent!",
      | Phase::Failed => "Error"
    }
  }
}

#[derive(Properties, PartialEq)]
pub struct SendEmailButtonProps {
  pub target:      Option<EmailTarget>,
  pub endpoint:    AttrValue,
  pub feedback_ms: u32
}

/// Per-card notify action. Disabled while a request is in flight and
/// for `feedback_ms` after the outcome is shown.
#[function_component(SendEmailButton)]
pub fn send_email_button(
  props: &SendEmailButtonProps
) -> Html {
  let phase = use_state(|| Phase::Idle);

  let onclick = {
    let phase = phase.clone();
    let target = props.target.clone();
    let endpoint = props.endpoint.clone();
    let feedback_ms = props.feedback_ms;
    Callback::from(move |_: MouseEvent| {
      let Some(target) = target.clone() else {
        return;
      };
      if *phase != Phase::Idle {
        return;
      }
      phase.set(Phase::Sending);

      let phase = phase.clone();
      let endpoint = endpoint.clone();
      wasm_bindgen_futures::spawn_local(
        async move {
          let (outcome, message) = match api::send_email(
            &endpoint, &target
          )
          .await
          {
            | Ok(reply) => {
              tracing::info!(
                id = %target.id,
                source = %target.source,
                ok = reply.ok,
                "send-email answered"
              );
              let outcome = if reply.ok {
                Phase::Sent
              } else {
                Phase::Failed
              };
              (outcome, reply.text)
            }
            | Err(err) => {
              tracing::error!(
                id = %target.id,
                source = %target.source,
                error = %err,
                "send-email request failed"
              );
              (
                Phase::Failed,
                TRANSPORT_FAILURE.to_string()
              )
            }
          };

          phase.set(outcome);
          // Let the outcome label paint before the blocking alert.
          TimeoutFuture::new(0).await;
          gloo::dialogs::alert(&message);
          TimeoutFuture::new(feedback_ms).await;
          phase.set(Phase::Idle);
        }
      );
    })
  };

  html! {
    <button
      class="send-email-btn"
      disabled={props.target.is_none() || *phase != Phase::Idle}
      onclick={onclick}
    >
      { phase.label() }
    </button>
  }
}
