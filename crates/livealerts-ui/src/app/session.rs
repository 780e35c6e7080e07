use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use livealerts_core::filter::FilterField;
use livealerts_core::{
  Board,
  BoardConfig,
  FetchTrigger
};
use yew::functional::UseForceUpdateHandle;

use super::filters::{
  self,
  FilterControls
};
use crate::api;

const STATUS_ID: &str = "status";
const LAST_REFRESH_ID: &str = "last";

/// Everything timers, listeners and fetch tasks need to reach the
/// board. Cheap to clone.
#[derive(Clone)]
pub struct Session {
  pub config:   Rc<BoardConfig>,
  pub board:    Rc<RefCell<Board>>,
  pub controls: Rc<RefCell<FilterControls>>,
  redraw:       UseForceUpdateHandle
}

impl Session {
  pub fn new(
    config: Rc<BoardConfig>,
    board: Rc<RefCell<Board>>,
    controls: Rc<RefCell<FilterControls>>,
    redraw: UseForceUpdateHandle
  ) -> Self {
    Self {
      config,
      board,
      controls,
      redraw
    }
  }

  pub fn redraw(&self) {
    self.redraw.force_update();
  }

  pub fn fetch(
    &self,
    trigger: FetchTrigger
  ) {
    let ticket = self
      .board
      .borrow_mut()
      .begin_fetch(trigger);
    self.paint_header();

    let session = self.clone();
    wasm_bindgen_futures::spawn_local(
      async move {
        let result = api::fetch_events(
          &session.config.events_endpoint,
          &ticket.query
        )
        .await;

        let applied = {
          let mut board =
            session.board.borrow_mut();
          match result {
            | Ok(events) => {
              board.apply_events(
                &ticket,
                events,
                Utc::now()
              )
            }
            | Err(err) => {
              tracing::error!(
                seq = ticket.seq,
                error = %err,
                "failed to load events"
              );
              board.apply_failure(
                &ticket, &err
              )
            }
          }
        };

        if applied {
          filters::sync_options(&session);
          session.redraw();
        } else {
          tracing::debug!(
            seq = ticket.seq,
            "discarded stale events response"
          );
        }
      }
    );
  }

  pub fn set_filter(
    &self,
    field: FilterField,
    value: String
  ) {
    self
      .board
      .borrow_mut()
      .set_filter(field, value);
    self.redraw();
  }

  pub fn goto_page(&self, page: usize) {
    let moved = self
      .board
      .borrow_mut()
      .goto_page(page);
    tracing::debug!(page, moved, "page requested");
    self.redraw();
  }

  /// Writes the status glyph and last-refresh line outside the mount.
  pub fn paint_header(&self) {
    let (glyph, last) = {
      let board = self.board.borrow();
      (
        board.status().glyph(),
        board.last_refresh_label()
      )
    };
    let document = gloo::utils::document();
    if let Some(status) =
      document.get_element_by_id(STATUS_ID)
    {
      status.set_text_content(Some(glyph));
    }
    if let Some(last) = last
      && let Some(el) = document
        .get_element_by_id(LAST_REFRESH_ID)
    {
      el.set_text_content(Some(last.as_str()));
    }
  }
}
