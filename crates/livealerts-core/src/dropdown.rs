use std::collections::HashMap;
use std::rc::{
  Rc,
  Weak
};

use crate::config::DropdownConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSnapshot {
  pub value:    String,
  pub label:    String,
  pub disabled: bool,
  pub selected: bool
}

impl OptionSnapshot {
  fn display_label(&self) -> &str {
    if self.label.trim().is_empty() {
      &self.value
    } else {
      &self.label
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
  pub value:    String,
  pub label:    String,
  pub disabled: bool,
  pub selected: bool
}

pub fn resolve_placeholder(
  data_attribute: Option<&str>,
  caller: Option<&str>,
  default: &str
) -> String {
  data_attribute
    .filter(|s| !s.trim().is_empty())
    .or(caller.filter(|s| !s.trim().is_empty()))
    .unwrap_or(default)
    .to_string()
}

pub fn button_label(
  options: &[OptionSnapshot],
  placeholder: &str
) -> String {
  options
    .iter()
    .find(|opt| opt.selected)
    .map(|opt| opt.display_label())
    .filter(|label| !label.trim().is_empty())
    .unwrap_or(placeholder)
    .to_string()
}

pub fn menu_items(
  options: &[OptionSnapshot],
  current_value: &str
) -> Vec<MenuItem> {
  options
    .iter()
    .map(|opt| MenuItem {
      value:    opt.value.clone(),
      label:    opt.display_label().to_string(),
      disabled: opt.disabled,
      selected: opt.value == current_value
    })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
  pub left:   f64,
  pub top:    f64,
  pub width:  f64,
  pub height: f64
}

impl Rect {
  pub fn bottom(&self) -> f64 {
    self.top + self.height
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
  pub width:  f64,
  pub height: f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRules {
  pub flip_threshold: f64,
  pub edge_margin:    f64,
  pub gap:            f64,
  pub min_width:      f64
}

impl From<&DropdownConfig> for PlacementRules {
  fn from(cfg: &DropdownConfig) -> Self {
    Self {
      flip_threshold: cfg.flip_threshold_px,
      edge_margin:    cfg.edge_margin_px,
      gap:            cfg.gap_px,
      min_width:      cfg.min_width_px
    }
  }
}

impl Default for PlacementRules {
  fn default() -> Self {
    Self::from(&DropdownConfig::default())
  }
}

impl PlacementRules {
  pub fn menu_min_width(
    &self,
    button: Rect
  ) -> f64 {
    button.width.max(self.min_width)
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
  pub left:  f64,
  pub top:   f64,
  pub above: bool
}

/// Positions the floating menu next to its button.
pub fn place_menu(
  button: Rect,
  menu: Size,
  viewport: Size,
  rules: &PlacementRules
) -> Placement {
  let margin = rules.edge_margin;
  let below_top = button.bottom() + rules.gap;
  let above_top =
    button.top - rules.gap - menu.height;
  let space_below =
    viewport.height - button.bottom();

  let above = space_below < rules.flip_threshold
    && above_top > 0.0;
  let top = if above {
    above_top.max(margin)
  } else {
    below_top.max(margin)
  };

  let max_left =
    viewport.width - menu.width - margin;
  let mut left = button.left;
  if left > max_left {
    left = max_left.max(margin);
  }

  Placement {
    left: left.max(margin),
    top,
    above
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
  Open,
  CloseAndRefocus,
  Ignore
}

pub fn key_action(
  key: &str,
  open: bool
) -> KeyAction {
  match (key, open) {
    | ("Escape" | "Esc", true) => {
      KeyAction::CloseAndRefocus
    }
    | ("ArrowDown" | "Enter" | " ", false) => {
      KeyAction::Open
    }
    | _ => KeyAction::Ignore
  }
}

/// Widgets keyed by the marker written onto their native control.
#[derive(Debug)]
pub struct WidgetRegistry<T> {
  next_id: u32,
  entries: HashMap<String, Weak<T>>
}

impl<T> Default for WidgetRegistry<T> {
  fn default() -> Self {
    Self {
      next_id: 1,
      entries: HashMap::new()
    }
  }
}

impl<T> WidgetRegistry<T> {
  pub fn allocate_id(&mut self) -> String {
    let id = format!("dd-{}", self.next_id);
    self.next_id += 1;
    id
  }

  pub fn lookup(
    &mut self,
    marker: Option<&str>
  ) -> Option<Rc<T>> {
    let marker = marker?;
    let widget = self
      .entries
      .get(marker)
      .and_then(Weak::upgrade);
    if widget.is_none() {
      self.entries.remove(marker);
    }
    widget
  }

  pub fn register(
    &mut self,
    id: &str,
    widget: &Rc<T>
  ) {
    self.entries.insert(
      id.to_string(),
      Rc::downgrade(widget)
    );
  }

  pub fn release(&mut self, id: &str) -> bool {
    self.entries.remove(id).is_some()
  }

  pub fn live(&self) -> usize {
    self
      .entries
      .values()
      .filter(|w| w.strong_count() > 0)
      .count()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
  attempts: u32,
  delay_ms: u32,
  used:     u32
}

impl RetryBudget {
  pub fn new(
    attempts: u32,
    delay_ms: u32
  ) -> Self {
    Self {
      attempts,
      delay_ms,
      used: 0
    }
  }

  pub fn next_attempt(&mut self) -> Option<u32> {
    if self.is_exhausted() {
      return None;
    }
    self.used += 1;
    Some(self.used)
  }

  pub fn is_exhausted(&self) -> bool {
    self.used >= self.attempts
  }

  pub fn delay_ms(&self) -> u32 {
    self.delay_ms
  }

  pub fn attempts(&self) -> u32 {
    self.attempts
  }
}

impl From<&DropdownConfig> for RetryBudget {
  fn from(cfg: &DropdownConfig) -> Self {
    Self::new(
      cfg.init_attempts,
      cfg.init_retry_ms
    )
  }
}
