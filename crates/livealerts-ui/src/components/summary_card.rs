use yew::{
  AttrValue,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct SummaryCardProps {
  pub heading: AttrValue,
  pub summary: AttrValue
}

#[function_component(SummaryCard)]
pub fn summary_card(
  props: &SummaryCardProps
) -> Html {
  html! {
    <div class="card summary-card">
      <strong>{ props.heading.clone() }</strong>
      <div class="meta">
        { props.summary.clone() }
      </div>
    </div>
  }
}
