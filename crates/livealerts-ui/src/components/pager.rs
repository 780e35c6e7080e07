use livealerts_core::board::PagerView;
use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct PagerProps {
  pub pager:   PagerView,
  pub on_page: Callback<usize>
}

#[function_component(Pager)]
pub fn pager(props: &PagerProps) -> Html {
  let jump = |target: Option<usize>| {
    let on_page = props.on_page.clone();
    Callback::from(move |_: MouseEvent| {
      if let Some(page) = target {
        on_page.emit(page);
      }
    })
  };

  html! {
    <div class="pagination-wrap card">
      <div class="pager-row">
        <button
          class="page-btn"
          disabled={props.pager.prev.is_none()}
          onclick={jump(props.pager.prev)}
        >
          { "« Prev" }
        </button>
        <span class="page-label">
          { props.pager.label() }
        </span>
        <button
          class="page-btn"
          disabled={props.pager.next.is_none()}
          onclick={jump(props.pager.next)}
        >
          { "Next »" }
        </button>
      </div>
    </div>
  }
}
