use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::future::TimeoutFuture;
use livealerts_core::dropdown::RetryBudget;
use livealerts_core::filter::FilterField;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::JsValue;
use web_sys::{
  HtmlOptionElement,
  HtmlSelectElement
};
use yew::Callback;

use super::session::Session;
use crate::dropdown::Dropdown;

/// Filter selects and the widgets layered over them.
#[derive(Default)]
pub struct FilterControls {
  widgets:   Vec<(FilterField, Rc<Dropdown>)>,
  native:    Vec<FilterField>,
  listeners: Vec<EventListener>,
  closed:    bool
}

impl FilterControls {
  fn widget(
    &self,
    field: FilterField
  ) -> Option<Rc<Dropdown>> {
    self
      .widgets
      .iter()
      .find(|(f, _)| *f == field)
      .map(|(_, widget)| widget.clone())
  }

  pub fn close(&mut self) {
    self.closed = true;
    for (_, widget) in self.widgets.drain(..) {
      widget.destroy();
    }
    self.native.clear();
    self.listeners.clear();
  }
}

fn find_select(
  field: FilterField
) -> Option<HtmlSelectElement> {
  gloo::utils::document()
    .get_element_by_id(field.element_id())
    .and_then(|el| el.dyn_into().ok())
}

/// Rewrites both selects from the board's current option sets.
pub fn sync_options(session: &Session) {
  for field in FilterField::ALL {
    let (choices, current) = {
      let board = session.board.borrow();
      (
        board.options().choices(field),
        board.filters().get(field).to_string()
      )
    };
    let Some(select) = find_select(field) else {
      continue;
    };
    if let Err(error) =
      populate(&select, &choices, &current)
    {
      tracing::error!(
        select = field.element_id(),
        ?error,
        "failed to populate filter options"
      );
      continue;
    }

    let widget =
      session.controls.borrow().widget(field);
    if let Some(widget) = widget {
      widget.rebuild();
    }
  }
}

fn populate(
  select: &HtmlSelectElement,
  choices: &[(String, String)],
  current: &str
) -> Result<(), JsValue> {
  select.set_inner_html("");
  for (value, label) in choices {
    let option =
      HtmlOptionElement::new_with_text_and_value(
        label, value
      )?;
    option.set_selected(value == current);
    select.append_child(&option)?;
  }
  select.set_value(current);
  Ok(())
}

/// Wraps the filter selects, retrying on a short timer while they are
/// missing or a widget fails to set up.
pub fn spawn_init(session: Session) {
  wasm_bindgen_futures::spawn_local(async move {
    let mut budget =
      RetryBudget::from(&session.config.dropdown);

    while let Some(attempt) = budget.next_attempt() {
      if session.controls.borrow().closed {
        return;
      }
      if install(&session) {
        tracing::info!(
          attempt,
          "filter controls ready"
        );
        return;
      }
      tracing::debug!(
        attempt,
        "filter controls not ready"
      );
      if !budget.is_exhausted() {
        TimeoutFuture::new(budget.delay_ms()).await;
      }
    }

    tracing::warn!(
      attempts = budget.attempts(),
      "custom dropdowns unavailable; using native selects"
    );
  });
}

/// One setup pass. Returns whether every filter has its widget.
fn install(session: &Session) -> bool {
  let mut controls = session.controls.borrow_mut();
  let mut complete = true;

  for field in FilterField::ALL {
    if controls.widget(field).is_some() {
      continue;
    }
    let Some(select) = find_select(field) else {
      complete = false;
      continue;
    };

    if !controls.native.contains(&field) {
      let session = session.clone();
      let target = select.clone();
      controls.listeners.push(EventListener::new(
        &select,
        "change",
        move |_| {
          session.set_filter(field, target.value());
        }
      ));
      controls.native.push(field);
    }

    match Dropdown::wrap(
      &select,
      Some(field.all_label()),
      &session.config.dropdown
    ) {
      | Ok(widget) => {
        let session = session.clone();
        widget.on_select(Callback::from(
          move |value: String| {
            session.set_filter(field, value);
          }
        ));
        controls.widgets.push((field, widget));
      }
      | Err(error) => {
        tracing::error!(
          select = field.element_id(),
          ?error,
          "custom dropdown setup failed"
        );
        complete = false;
      }
    }
  }

  complete
}
