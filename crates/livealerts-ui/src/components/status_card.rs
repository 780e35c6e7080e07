use yew::{
  AttrValue,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct StatusCardProps {
  pub message: AttrValue
}

/// Full-width notice used for the empty and error states.
#[function_component(StatusCard)]
pub fn status_card(
  props: &StatusCardProps
) -> Html {
  html! {
    <div class="card empty">
      { props.message.clone() }
    </div>
  }
}
