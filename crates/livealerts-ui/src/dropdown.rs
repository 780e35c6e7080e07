//! Custom dropdown layered over a native `<select>`.
//!
//! The native control stays in the document (hidden) and keeps owning
//! the value. The widget renders a button after it and a floating menu
//! appended to `<body>`, and reports picks through `on_select`
//! subscribers.

use std::cell::{
  Cell,
  RefCell
};
use std::rc::{
  Rc,
  Weak
};

use gloo::events::{
  EventListener,
  EventListenerOptions,
  EventListenerPhase
};
use livealerts_core::config::DropdownConfig;
use livealerts_core::dropdown::{
  KeyAction,
  OptionSnapshot,
  PlacementRules,
  Rect,
  Size,
  WidgetRegistry,
  button_label,
  key_action,
  menu_items,
  place_menu,
  resolve_placeholder
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::JsValue;
use web_sys::{
  Element,
  Event,
  HtmlElement,
  HtmlOptionElement,
  HtmlSelectElement,
  KeyboardEvent,
  MutationObserver,
  MutationObserverInit,
  MutationRecord,
  Node
};
use yew::Callback;

const MARKER_ATTR: &str =
  "data-dropdown-id";
const HIDDEN_CLASS: &str =
  "_native-hidden";
const ITEM_CLASS: &str =
  "custom-dropdown-item";
const ITEM_SELECTOR: &str =
  ".custom-dropdown-item";
const NO_OPTIONS: &str = "No options";

thread_local! {
  static REGISTRY: RefCell<WidgetRegistry<Dropdown>> =
    RefCell::new(WidgetRegistry::default());
}

type ObserverCallback =
  Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

pub struct Dropdown {
  id:             String,
  select:         HtmlSelectElement,
  button:         HtmlElement,
  menu:           HtmlElement,
  placeholder:    String,
  rules:          PlacementRules,
  open:           Cell<bool>,
  rebuilding:     Cell<bool>,
  subscribers:    RefCell<Vec<Callback<String>>>,
  listeners:      RefCell<Vec<EventListener>>,
  open_listeners: RefCell<Vec<EventListener>>,
  observer:
    RefCell<Option<(MutationObserver, ObserverCallback)>>,
  destroyed:      Cell<bool>
}

impl Dropdown {
  /// Wraps `select`, or returns the widget already wrapping it.
  pub fn wrap(
    select: &HtmlSelectElement,
    placeholder: Option<&str>,
    cfg: &DropdownConfig
  ) -> Result<Rc<Dropdown>, JsValue> {
    if let Some(existing) = Self::existing(select) {
      tracing::debug!(
        id = %existing.id,
        "select already wrapped"
      );
      return Ok(existing);
    }

    let document = gloo::utils::document();
    let id = REGISTRY.with(|registry| {
      registry.borrow_mut().allocate_id()
    });

    let button: HtmlElement = document
      .create_element("button")?
      .dyn_into()
      .map_err(JsValue::from)?;
    button.set_attribute("type", "button")?;
    button.set_class_name("custom-dropdown-btn");
    button.set_attribute("aria-haspopup", "listbox")?;
    button.set_attribute("aria-expanded", "false")?;
    button.set_attribute("data-dropdown-for", &id)?;

    let menu: HtmlElement = document
      .create_element("div")?
      .dyn_into()
      .map_err(JsValue::from)?;
    menu.set_class_name("custom-dropdown-menu");
    menu.set_attribute("role", "listbox")?;
    let style = menu.style();
    style.set_property("display", "none")?;
    style.set_property("position", "fixed")?;
    style.set_property("z-index", "2147483647")?;
    style.set_property("box-sizing", "border-box")?;

    let placeholder = resolve_placeholder(
      select
        .get_attribute("data-placeholder")
        .as_deref(),
      placeholder,
      &cfg.default_placeholder
    );

    let widget = Rc::new(Dropdown {
      id: id.clone(),
      select: select.clone(),
      button,
      menu,
      placeholder,
      rules: PlacementRules::from(cfg),
      open: Cell::new(false),
      rebuilding: Cell::new(false),
      subscribers: RefCell::new(Vec::new()),
      listeners: RefCell::new(Vec::new()),
      open_listeners: RefCell::new(Vec::new()),
      observer: RefCell::new(None),
      destroyed: Cell::new(false)
    });

    document
      .body()
      .ok_or_else(|| {
        JsValue::from_str("document has no body")
      })?
      .append_child(&widget.menu)?;
    select.insert_adjacent_element(
      "afterend",
      &widget.button
    )?;

    widget.hide_native();
    widget.refresh_label();
    widget.attach_listeners();
    if let Err(error) = widget
      .observe_options()
      .and_then(|()| select.set_attribute(MARKER_ATTR, &id))
    {
      widget.destroy();
      return Err(error);
    }

    let live = REGISTRY.with(|registry| {
      let mut registry = registry.borrow_mut();
      registry.register(&id, &widget);
      registry.live()
    });

    tracing::info!(
      id = %id,
      select = %select.id(),
      live,
      "custom dropdown created"
    );
    Ok(widget)
  }

  fn existing(
    select: &HtmlSelectElement
  ) -> Option<Rc<Dropdown>> {
    let marker = select.get_attribute(MARKER_ATTR);
    REGISTRY.with(|registry| {
      registry
        .borrow_mut()
        .lookup(marker.as_deref())
    })
  }

  pub fn is_open(&self) -> bool {
    self.open.get()
  }

  pub fn on_select(
    &self,
    callback: Callback<String>
  ) {
    self.subscribers.borrow_mut().push(callback);
  }

  fn snapshot(&self) -> Vec<OptionSnapshot> {
    (0..self.select.length())
      .filter_map(|idx| self.select.item(idx))
      .filter_map(|el| {
        el.dyn_into::<HtmlOptionElement>().ok()
      })
      .map(|opt| OptionSnapshot {
        value:    opt.value(),
        label:    opt.text(),
        disabled: opt.disabled(),
        selected: opt.selected()
      })
      .collect()
  }

  pub fn refresh_label(&self) {
    let label = button_label(
      &self.snapshot(),
      &self.placeholder
    );
    self.button.set_text_content(Some(label.as_str()));
  }

  /// Regenerates the menu rows from the native options.
  pub fn rebuild(&self) {
    if self.rebuilding.replace(true) {
      return;
    }
    if let Err(error) = self.render_items() {
      tracing::error!(
        id = %self.id,
        ?error,
        "failed to rebuild dropdown menu"
      );
    }
    self.refresh_label();
    self.rebuilding.set(false);
  }

  fn render_items(&self) -> Result<(), JsValue> {
    let document = gloo::utils::document();
    self.menu.set_inner_html("");

    let items = menu_items(
      &self.snapshot(),
      &self.select.value()
    );
    if items.is_empty() {
      let row = document.create_element("div")?;
      row.set_class_name("custom-dropdown-empty");
      row.set_text_content(Some(NO_OPTIONS));
      self.menu.append_child(&row)?;
      return Ok(());
    }

    for item in items {
      let row: HtmlElement = document
        .create_element("div")?
        .dyn_into()
        .map_err(JsValue::from)?;
      row.set_class_name(ITEM_CLASS);
      row.set_attribute("role", "option")?;
      row.set_attribute("data-value", &item.value)?;
      row.set_text_content(Some(item.label.as_str()));
      if item.disabled {
        row.set_attribute("aria-disabled", "true")?;
        row.style().set_property("opacity", "0.5")?;
        row
          .style()
          .set_property("pointer-events", "none")?;
      }
      if item.selected {
        row.set_attribute("aria-selected", "true")?;
      }
      self.menu.append_child(&row)?;
    }
    Ok(())
  }

  /// Hides the native control while keeping it in the document.
  fn hide_native(&self) {
    let _ = self.select.class_list().add_1(HIDDEN_CLASS);
    let style = self.select.style();
    for (name, value) in [
      ("position", "absolute"),
      ("left", "-99999px"),
      ("top", "-99999px"),
      ("width", "0px"),
      ("height", "0px"),
      ("opacity", "0"),
      ("pointer-events", "none"),
      ("z-index", "-1")
    ] {
      let _ = style.set_property(name, value);
    }
    self.select.set_tab_index(-1);
    let _ = self
      .select
      .set_attribute("aria-hidden", "true");
  }

  fn show_native(&self) {
    let _ = self.select.class_list().remove_1(HIDDEN_CLASS);
    let style = self.select.style();
    for name in [
      "position",
      "left",
      "top",
      "width",
      "height",
      "opacity",
      "pointer-events",
      "z-index"
    ] {
      let _ = style.remove_property(name);
    }
    let _ = self.select.remove_attribute("tabindex");
    let _ = self.select.remove_attribute("aria-hidden");
  }

  fn attach_listeners(self: &Rc<Self>) {
    let mut listeners = self.listeners.borrow_mut();

    let weak = Rc::downgrade(self);
    listeners.push(EventListener::new(
      &self.button,
      "click",
      move |event| {
        event.stop_propagation();
        if let Some(widget) = weak.upgrade() {
          widget.toggle();
        }
      }
    ));

    let weak = Rc::downgrade(self);
    listeners.push(EventListener::new_with_options(
      &self.button,
      "keydown",
      EventListenerOptions::enable_prevent_default(),
      move |event| {
        let Some(widget) = weak.upgrade() else {
          return;
        };
        let Some(key) = event
          .dyn_ref::<KeyboardEvent>()
          .map(KeyboardEvent::key)
        else {
          return;
        };
        if key_action(&key, widget.is_open())
          == KeyAction::Open
        {
          event.prevent_default();
          widget.open();
        }
      }
    ));

    let weak = Rc::downgrade(self);
    listeners.push(EventListener::new(
      &self.menu,
      "click",
      move |event| {
        let Some(widget) = weak.upgrade() else {
          return;
        };
        if let Some(row) = closest_item(event)
          && row.get_attribute("aria-disabled").is_none()
        {
          let value = row
            .get_attribute("data-value")
            .unwrap_or_default();
          widget.choose(value);
        }
      }
    ));

    let weak = Rc::downgrade(self);
    listeners.push(EventListener::new(
      &self.select,
      "change",
      move |_| {
        if let Some(widget) = weak.upgrade() {
          widget.refresh_label();
        }
      }
    ));

    let weak = Rc::downgrade(self);
    listeners.push(EventListener::new_with_options(
      &self.select,
      "focus",
      EventListenerOptions::run_in_capture_phase(),
      move |_| {
        if let Some(widget) = weak.upgrade() {
          tracing::warn!(
            select = %widget.select.id(),
            "native select focused unexpectedly"
          );
          widget.hide_native();
        }
      }
    ));
  }

  fn observe_options(
    self: &Rc<Self>
  ) -> Result<(), JsValue> {
    let weak: Weak<Dropdown> = Rc::downgrade(self);
    let callback: ObserverCallback = Closure::new(
      move |records: js_sys::Array, _: MutationObserver| {
        let Some(widget) = weak.upgrade() else {
          return;
        };
        let options_changed = records.iter().any(|record| {
          record
            .dyn_into::<MutationRecord>()
            .map(|record| record.type_() == "childList")
            .unwrap_or(false)
        });
        if options_changed {
          widget.rebuild();
          tracing::debug!(
            id = %widget.id,
            "rebuilt menu after option mutation"
          );
        }
      }
    );

    let observer = MutationObserver::new(
      callback.as_ref().unchecked_ref()
    )?;
    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    observer.observe_with_options(&self.select, &init)?;

    *self.observer.borrow_mut() = Some((observer, callback));
    Ok(())
  }

  pub fn toggle(self: &Rc<Self>) {
    if self.is_open() {
      self.close();
    } else {
      self.open();
    }
  }

  pub fn open(self: &Rc<Self>) {
    if self.open.replace(true) {
      return;
    }
    self.rebuild();
    let _ = self.menu.style().set_property("display", "block");
    let _ = self.button.set_attribute("aria-expanded", "true");
    self.position();
    self.attach_open_listeners();
    tracing::debug!(id = %self.id, "dropdown opened");
  }

  pub fn close(&self) {
    if !self.open.replace(false) {
      return;
    }
    let _ = self.menu.style().set_property("display", "none");
    let _ = self.button.set_attribute("aria-expanded", "false");
    self.open_listeners.borrow_mut().clear();
    tracing::debug!(id = %self.id, "dropdown closed");
  }

  fn attach_open_listeners(self: &Rc<Self>) {
    let window = gloo::utils::window();
    let mut listeners = Vec::with_capacity(4);

    let weak = Rc::downgrade(self);
    listeners.push(EventListener::new_with_options(
      &window,
      "click",
      EventListenerOptions::run_in_capture_phase(),
      move |event| {
        let Some(widget) = weak.upgrade() else {
          return;
        };
        let target = event
          .target()
          .and_then(|t| t.dyn_into::<Node>().ok());
        let inside = target.as_ref().is_some_and(|node| {
          widget.button.contains(Some(node))
            || widget.menu.contains(Some(node))
        });
        if !inside {
          widget.close();
        }
      }
    ));

    let weak = Rc::downgrade(self);
    listeners.push(EventListener::new(
      &window,
      "keydown",
      move |event| {
        let Some(widget) = weak.upgrade() else {
          return;
        };
        let Some(key) = event
          .dyn_ref::<KeyboardEvent>()
          .map(KeyboardEvent::key)
        else {
          return;
        };
        if key_action(&key, widget.is_open())
          == KeyAction::CloseAndRefocus
        {
          widget.close();
          let _ = widget.button.focus();
        }
      }
    ));

    for (kind, phase) in [
      ("resize", EventListenerPhase::Bubble),
      ("scroll", EventListenerPhase::Capture)
    ] {
      let weak = Rc::downgrade(self);
      listeners.push(EventListener::new_with_options(
        &window,
        kind,
        EventListenerOptions {
          phase,
          passive: true
        },
        move |_| {
          if let Some(widget) = weak.upgrade() {
            widget.position();
          }
        }
      ));
    }

    *self.open_listeners.borrow_mut() = listeners;
  }

  fn position(&self) {
    let rect = self.button.get_bounding_client_rect();
    let button = Rect {
      left:   rect.left(),
      top:    rect.top(),
      width:  rect.width(),
      height: rect.height()
    };
    let style = self.menu.style();
    let _ = style.set_property(
      "min-width",
      &format!("{}px", self.rules.menu_min_width(button))
    );

    let window = gloo::utils::window();
    let viewport = Size {
      width:  number(window.inner_width()),
      height: number(window.inner_height())
    };
    let menu = Size {
      width:  f64::from(self.menu.offset_width()),
      height: f64::from(self.menu.offset_height())
    };

    let placed = place_menu(button, menu, viewport, &self.rules);
    let _ = style.set_property("top", &format!("{}px", placed.top));
    let _ = style.set_property("left", &format!("{}px", placed.left));
    let _ = self.menu.set_attribute(
      "data-placement",
      if placed.above { "above" } else { "below" }
    );
  }

  fn choose(&self, value: String) {
    self.select.set_value(&value);
    self.close();
    self.refresh_label();

    let subscribers = self.subscribers.borrow().clone();
    for subscriber in subscribers {
      subscriber.emit(value.clone());
    }
  }
}

impl Dropdown {
  /// Removes the widget's UI and listeners and hands the native control
  /// back, unmarked. Safe to call repeatedly.
  pub fn destroy(&self) {
    if self.destroyed.replace(true) {
      return;
    }
    self.close();
    if let Some((observer, _)) = self.observer.borrow_mut().take() {
      observer.disconnect();
    }
    self.listeners.borrow_mut().clear();
    self.subscribers.borrow_mut().clear();
    self.button.remove();
    self.menu.remove();
    self.show_native();
    let _ = self.select.remove_attribute(MARKER_ATTR);
    REGISTRY.with(|registry| {
      registry.borrow_mut().release(&self.id);
    });
    tracing::debug!(id = %self.id, "custom dropdown destroyed");
  }
}

impl Drop for Dropdown {
  fn drop(&mut self) {
    self.destroy();
  }
}

fn closest_item(event: &Event) -> Option<Element> {
  event
    .target()
    .and_then(|t| t.dyn_into::<Element>().ok())
    .and_then(|el| el.closest(ITEM_SELECTOR).ok().flatten())
}

fn number(value: Result<JsValue, JsValue>) -> f64 {
  value
    .ok()
    .and_then(|v| v.as_f64())
    .unwrap_or(0.0)
}
