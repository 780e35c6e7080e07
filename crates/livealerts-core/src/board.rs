use std::collections::HashSet;

use chrono::{
  DateTime,
  Utc
};
use chrono_tz::Tz;
use tracing::{
  debug,
  info,
  warn
};

use crate::config::BoardConfig;
use crate::datetime::{
  format_event_date,
  format_refresh_time
};
use crate::event::EventRecord;
use crate::filter::{
  FilterField,
  FilterOptions,
  Filters,
  filter_events
};
use crate::format::{
  format_coordinates,
  format_magnitude,
  safe_link
};
use crate::page::PageWindow;
use crate::sequence::ResponseSequence;

pub const SUMMARY_HEADING: &str =
  "📊 Current Alerts";
pub const NO_EVENTS: &str =
  "📭 No events right now.";
pub const NO_EVENTS_ON_PAGE: &str =
  "📭 No events on this page.";
pub const LOAD_ERROR: &str =
  "⚠️ Error loading events. Check server \
   console.";
pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_CATEGORY: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTrigger {
  Initial,
  Manual,
  Poll
}

impl FetchTrigger {
  pub fn resets_page(self) -> bool {
    !matches!(self, FetchTrigger::Poll)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
  pub seq:     u64,
  pub trigger: FetchTrigger,
  pub query:   Vec<(&'static str, String)>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
  Idle,
  Loading,
  Ready,
  Failed
}

impl LoadStatus {
  pub fn glyph(self) -> &'static str {
    match self {
      | LoadStatus::Idle => "",
      | LoadStatus::Loading => "⏳",
      | LoadStatus::Ready => "✅",
      | LoadStatus::Failed => "❌"
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTarget {
  pub id:     String,
  pub source: String
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
  pub key:         String,
  pub title:       String,
  pub category:    String,
  pub source:      String,
  pub date:        String,
  pub link:        Option<String>,
  pub coordinates: String,
  pub magnitude:   Option<String>,
  pub email:       Option<EmailTarget>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerView {
  pub page:        usize,
  pub total_pages: usize,
  pub prev:        Option<usize>,
  pub next:        Option<usize>
}

impl PagerView {
  pub fn label(&self) -> String {
    format!(
      "Page {} of {}",
      self.page, self.total_pages
    )
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingView {
  pub heading: &'static str,
  pub summary: String,
  pub cards:   Vec<CardView>,
  pub pager:   PagerView
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardView {
  Failed,
  Empty,
  Listing(ListingView)
}

#[derive(Debug, Clone)]
pub struct Board {
  events:       Vec<EventRecord>,
  options:      FilterOptions,
  filters:      Filters,
  page:         usize,
  page_size:    usize,
  timezone:     Tz,
  status:       LoadStatus,
  failed:       bool,
  last_refresh: Option<DateTime<Utc>>,
  sequence:     ResponseSequence
}

impl Board {
  pub fn new(cfg: &BoardConfig) -> Self {
    Self {
      events:       Vec::new(),
      options:      FilterOptions::default(),
      filters:      Filters::default(),
      page:         1,
      page_size:    cfg.page_size.max(1),
      timezone:     cfg.timezone(),
      status:       LoadStatus::Idle,
      failed:       false,
      last_refresh: None,
      sequence:     ResponseSequence::new(
        cfg.discard_stale_responses
      )
    }
  }

  pub fn options(&self) -> &FilterOptions {
    &self.options
  }

  pub fn filters(&self) -> &Filters {
    &self.filters
  }

  pub fn page(&self) -> usize {
    self.page
  }

  pub fn status(&self) -> LoadStatus {
    self.status
  }

  pub fn last_refresh_label(
    &self
  ) -> Option<String> {
    self.last_refresh.map(|ts| {
      format!(
        "🕐 Last refresh: {}",
        format_refresh_time(
          ts,
          &self.timezone
        )
      )
    })
  }

  pub fn begin_fetch(
    &mut self,
    trigger: FetchTrigger
  ) -> FetchTicket {
    let seq = self.sequence.issue();
    self.status = LoadStatus::Loading;
    let ticket = FetchTicket {
      seq,
      trigger,
      query: self.filters.query_pairs()
    };
    debug!(seq, ?trigger, query = ?ticket.query, "fetch started");
    ticket
  }

  #[tracing::instrument(skip(self, events, now), fields(seq = ticket.seq, count = events.len()))]
  pub fn apply_events(
    &mut self,
    ticket: &FetchTicket,
    events: Vec<EventRecord>,
    now: DateTime<Utc>
  ) -> bool {
    if !self.sequence.accept(ticket.seq) {
      return false;
    }

    self.options =
      FilterOptions::from_events(&events);
    self.events = events;

    for field in FilterField::ALL {
      let current =
        self.filters.get(field).to_string();
      let kept =
        self.options.reconcile(field, &current);
      if kept != current {
        info!(
          field = field.query_key(),
          dropped = %current,
          "filter value no longer offered"
        );
      }
      self.filters.set(field, kept);
    }

    if ticket.trigger.resets_page() {
      self.page = 1;
    }
    self.clamp_page();

    self.status = LoadStatus::Ready;
    self.failed = false;
    self.last_refresh = Some(now);
    info!(
      total = self.events.len(),
      categories = self.options.categories.len(),
      sources = self.options.sources.len(),
      page = self.page,
      "applied events"
    );
    true
  }

  pub fn apply_failure(
    &mut self,
    ticket: &FetchTicket,
    message: &str
  ) -> bool {
    if !self.sequence.accept(ticket.seq) {
      return false;
    }
    warn!(
      seq = ticket.seq,
      error = message,
      "fetch failed"
    );
    self.status = LoadStatus::Failed;
    self.failed = true;
    true
  }

  pub fn set_filter(
    &mut self,
    field: FilterField,
    value: impl Into<String>
  ) {
    let value = value.into();
    debug!(
      field = field.query_key(),
      value = %value,
      "filter changed"
    );
    self.filters.set(field, value);
    self.page = 1;
    self.failed = false;
  }

  pub fn goto_page(
    &mut self,
    page: usize
  ) -> bool {
    let window = self.window(page);
    self.failed = false;
    if window.page == self.page {
      return false;
    }
    self.page = window.page;
    true
  }

  fn window(
    &self,
    page: usize
  ) -> PageWindow {
    let total = self
      .events
      .iter()
      .filter(|e| self.filters.matches(e))
      .count();
    PageWindow::compute(
      total,
      self.page_size,
      page
    )
  }

  fn clamp_page(&mut self) {
    self.page = self.window(self.page).page;
  }

  pub fn sorted_events(
    &self
  ) -> Vec<&EventRecord> {
    let mut list =
      filter_events(&self.events, &self.filters);
    list.sort_by_key(|e| {
      std::cmp::Reverse(e.sort_key())
    });
    list
  }

  pub fn view(&self) -> BoardView {
    if self.failed {
      return BoardView::Failed;
    }
    if self.events.is_empty() {
      return BoardView::Empty;
    }

    let window = self.window(self.page);
    let sorted = self.sorted_events();

    let mut seen = HashSet::new();
    let cards = sorted[window.range()]
      .iter()
      .enumerate()
      .map(|(offset, event)| {
        let key = card_key(
          &mut seen,
          window.start + offset,
          event
        );
        self.card(key, event)
      })
      .collect();

    BoardView::Listing(ListingView {
      heading: SUMMARY_HEADING,
      summary: format!(
        "{}{}",
        window.describe(),
        self.filters.describe()
      ),
      cards,
      pager: PagerView {
        page:        window.page,
        total_pages: window.total_pages,
        prev:        window
          .has_prev()
          .then(|| window.page - 1),
        next:        window
          .has_next()
          .then(|| window.page + 1)
      }
    })
  }

  fn card(
    &self,
    key: String,
    event: &EventRecord
  ) -> CardView {
    let email = match (
      event.id.as_ref(),
      event.source.as_ref()
    ) {
      | (Some(id), Some(source)) => {
        Some(EmailTarget {
          id:     id.clone(),
          source: source.clone()
        })
      }
      | _ => None
    };

    CardView {
      key,
      title: event
        .title
        .clone()
        .unwrap_or_else(|| UNTITLED.to_string()),
      category: event
        .category
        .clone()
        .unwrap_or_else(|| {
          UNKNOWN_CATEGORY.to_string()
        }),
      source: event.source_str().to_string(),
      date: format_event_date(
        event.timestamp(),
        &self.timezone
      ),
      link: safe_link(event.url.as_deref()),
      coordinates: format_coordinates(
        event.latitude(),
        event.longitude()
      ),
      magnitude: format_magnitude(
        event.magnitude
      ),
      email
    }
  }
}

fn card_key(
  seen: &mut HashSet<String>,
  index: usize,
  event: &EventRecord
) -> String {
  match event.id.as_ref() {
    | Some(id) if seen.insert(id.clone()) => {
      format!("id:{id}")
    }
    | _ => format!("row:{index}")
  }
}

#[cfg(test)]
mod tests {
  use chrono::{
    TimeZone,
    Utc
  };

  use super::{
    Board,
    BoardView,
    FetchTrigger,
    LoadStatus
  };
  use crate::config::BoardConfig;
  use crate::event::{
    EventDate,
    EventRecord
  };
  use crate::filter::FilterField;

  fn event(
    id: usize,
    date: &str,
    category: &str,
    source: &str
  ) -> EventRecord {
    EventRecord {
      id: Some(id.to_string()),
      date: Some(EventDate::Text(
        date.to_string()
      )),
      category: Some(category.to_string()),
      source: Some(source.to_string()),
      ..EventRecord::default()
    }
  }

  fn now() -> chrono::DateTime<Utc> {
    Utc
      .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
      .single()
      .expect("valid now")
  }

  fn loaded(
    events: Vec<EventRecord>
  ) -> Board {
    let mut board =
      Board::new(&BoardConfig::default());
    let ticket =
      board.begin_fetch(FetchTrigger::Initial);
    assert!(board.apply_events(
      &ticket,
      events,
      now()
    ));
    board
  }

  fn listing(
    board: &mut Board
  ) -> super::ListingView {
    match board.view() {
      | BoardView::Listing(listing) => listing,
      | other => panic!("expected listing, got {other:?}")
    }
  }

  #[test]
  fn newest_first_with_summary() {
    let mut board = loaded(vec![
      event(1, "2023-01-01", "A", "X"),
      event(2, "2023-06-01", "B", "Y"),
    ]);
    let view = listing(&mut board);

    assert_eq!(view.summary, "Showing 1-2 of 2 events");
    assert_eq!(view.cards[0].category, "B");
    assert_eq!(view.cards[1].category, "A");
    assert_eq!(view.pager.label(), "Page 1 of 1");
  }

  #[test]
  fn sorting_is_stable_descending() {
    let mut board = loaded(vec![
      event(1, "garbage", "A", "X"),
      event(2, "2023-01-01", "A", "X"),
      event(3, "2023-01-01", "A", "X"),
      event(4, "2024-01-01", "A", "X"),
    ]);

    let keys: Vec<i64> = board
      .sorted_events()
      .iter()
      .map(|e| e.sort_key())
      .collect();
    assert!(keys.windows(2).all(|w| w[0] >= w[1]));

    let ids: Vec<String> = listing(&mut board)
      .cards
      .iter()
      .map(|c| c.key.clone())
      .collect();
    assert_eq!(ids, vec!["id:4", "id:2", "id:3", "id:1"]);
  }

  #[test]
  fn pager_bounds_on_twenty_five_events() {
    let events = (0..25)
      .map(|i| {
        event(
          i,
          &format!("2023-01-{:02}", i + 1),
          "A",
          "X"
        )
      })
      .collect();
    let mut board = loaded(events);

    let first = listing(&mut board);
    assert_eq!(first.cards.len(), 20);
    assert_eq!(first.pager.prev, None);
    assert_eq!(first.pager.next, Some(2));

    assert!(board.goto_page(2));
    let second = listing(&mut board);
    assert_eq!(second.cards.len(), 5);
    assert_eq!(second.pager.prev, Some(1));
    assert_eq!(second.pager.next, None);
    assert_eq!(second.summary, "Showing 21-25 of 25 events");

    assert!(!board.goto_page(99));
    assert_eq!(board.page(), 2);
    assert!(board.goto_page(0));
    assert_eq!(board.page(), 1);
  }

  #[test]
  fn filter_change_resets_page_and_describes() {
    let mut events: Vec<EventRecord> = (0..30)
      .map(|i| event(i, "2023-01-01", "quake", "USGS"))
      .collect();
    events.push(event(99, "2023-02-01", "fire", "EONET"));
    let mut board = loaded(events);
    board.goto_page(2);

    board.set_filter(FilterField::Category, "fire");
    assert_eq!(board.page(), 1);
    let view = listing(&mut board);
    assert_eq!(view.cards.len(), 1);
    assert_eq!(
      view.summary,
      "Showing 1-1 of 1 event in category \"fire\""
    );

    board.set_filter(FilterField::Source, "USGS");
    let view = listing(&mut board);
    assert!(view.cards.is_empty());
    assert_eq!(
      view.summary,
      "Showing 0 of 0 events in category \"fire\" from USGS"
    );
  }

  #[test]
  fn empty_list_and_failure_views() {
    let mut board = loaded(Vec::new());
    assert_eq!(board.view(), BoardView::Empty);

    let mut board =
      loaded(vec![event(1, "2023-01-01", "A", "X")]);
    let ticket =
      board.begin_fetch(FetchTrigger::Manual);
    assert_eq!(board.status(), LoadStatus::Loading);
    assert!(board.apply_failure(&ticket, "HTTP 500"));

    assert_eq!(board.view(), BoardView::Failed);
    assert_eq!(board.status().glyph(), "❌");

    board.set_filter(FilterField::Category, "");
    assert_eq!(listing(&mut board).cards.len(), 1);
  }

  #[test]
  fn refresh_replaces_options_and_drops_vanished_filter()
   {
    let mut board = loaded(vec![
      event(1, "2023-01-01", "fire", "EONET"),
      event(2, "2023-01-02", "quake", "USGS"),
    ]);
    board.set_filter(FilterField::Category, "fire");
    board.set_filter(FilterField::Source, "USGS");

    let ticket = board.begin_fetch(FetchTrigger::Poll);
    assert_eq!(
      ticket.query,
      vec![
        ("category", "fire".to_string()),
        ("source", "USGS".to_string())
      ]
    );
    board.apply_events(
      &ticket,
      vec![event(3, "2023-01-03", "storm", "USGS")],
      now()
    );

    assert_eq!(board.filters().category, "");
    assert_eq!(board.filters().source, "USGS");
    assert_eq!(
      board
        .options()
        .categories
        .iter()
        .collect::<Vec<_>>(),
      vec!["storm"]
    );
    assert_eq!(
      board.last_refresh_label().as_deref(),
      Some("🕐 Last refresh: 2024-01-01 00:00:00 UTC")
    );
  }

  #[test]
  fn poll_keeps_page_manual_resets() {
    let events: Vec<EventRecord> = (0..45)
      .map(|i| event(i, "2023-01-01", "A", "X"))
      .collect();
    let mut board = loaded(events.clone());
    board.goto_page(3);

    let poll = board.begin_fetch(FetchTrigger::Poll);
    board.apply_events(&poll, events.clone(), now());
    assert_eq!(board.page(), 3);

    let poll = board.begin_fetch(FetchTrigger::Poll);
    board.apply_events(&poll, events[..25].to_vec(), now());
    assert_eq!(board.page(), 2);

    let manual = board.begin_fetch(FetchTrigger::Manual);
    board.apply_events(&manual, events, now());
    assert_eq!(board.page(), 1);
  }

  #[test]
  fn stale_response_is_discarded_when_configured() {
    let cfg = BoardConfig {
      discard_stale_responses: true,
      ..BoardConfig::default()
    };
    let mut board = Board::new(&cfg);
    let older = board.begin_fetch(FetchTrigger::Initial);
    let newer = board.begin_fetch(FetchTrigger::Manual);

    assert!(board.apply_events(
      &newer,
      vec![event(2, "2023-01-02", "new", "X")],
      now()
    ));
    assert!(!board.apply_events(
      &older,
      vec![event(1, "2023-01-01", "old", "X")],
      now()
    ));
    assert_eq!(board.sorted_events()[0].category_str(), "new");
  }

  #[test]
  fn card_keys_survive_a_newer_event_arriving() {
    let mut board = loaded(vec![
      event(1, "2023-01-01", "A", "X"),
      event(2, "2023-01-02", "A", "X"),
    ]);
    let before: Vec<String> = listing(&mut board)
      .cards
      .iter()
      .map(|c| c.key.clone())
      .collect();

    let poll = board.begin_fetch(FetchTrigger::Poll);
    board.apply_events(
      &poll,
      vec![
        event(1, "2023-01-01", "A", "X"),
        event(2, "2023-01-02", "A", "X"),
        event(3, "2023-01-03", "A", "X"),
      ],
      now()
    );
    let after: Vec<String> = listing(&mut board)
      .cards
      .iter()
      .map(|c| c.key.clone())
      .collect();

    assert_eq!(before, vec!["id:2", "id:1"]);
    assert_eq!(after, vec!["id:3", "id:2", "id:1"]);
  }

  #[test]
  fn missing_and_repeated_ids_fall_back_to_row() {
    let bare = EventRecord {
      date: Some(EventDate::Text("2023-01-01".to_string())),
      ..EventRecord::default()
    };
    let mut board = loaded(vec![
      event(5, "2023-01-03", "A", "X"),
      event(5, "2023-01-02", "A", "X"),
      bare,
    ]);

    let keys: Vec<String> = listing(&mut board)
      .cards
      .iter()
      .map(|c| c.key.clone())
      .collect();
    assert_eq!(keys, vec!["id:5", "row:1", "row:2"]);
  }

  #[test]
  fn card_fields_and_defaults() {
    let mut record = event(7, "2023-06-01T10:00:00Z", "quake", "USGS");
    record.latitude = Some(-12.3456);
    record.lon = Some(45.6789);
    record.magnitude = Some(5.26);
    record.url = Some("https://usgs.gov/7".to_string());
    record.title = Some("<b>\"Big\" & 'loud'</b>".to_string());

    let bare = EventRecord {
      date: Some(EventDate::Text("2022-01-01".to_string())),
      ..EventRecord::default()
    };

    let mut board = loaded(vec![record, bare]);
    let view = listing(&mut board);

    let card = &view.cards[0];
    assert_eq!(card.title, "<b>\"Big\" & 'loud'</b>");
    assert_eq!(card.coordinates, "12.346°S, 45.679°E");
    assert_eq!(card.magnitude.as_deref(), Some("Mag 5.3"));
    assert_eq!(card.date, "2023-06-01 10:00:00 UTC");
    assert_eq!(card.link.as_deref(), Some("https://usgs.gov/7"));
    let email = card.email.as_ref().expect("email target");
    assert_eq!(email.id, "7");
    assert_eq!(email.source, "USGS");

    let bare = &view.cards[1];
    assert_eq!(bare.title, "Untitled");
    assert_eq!(bare.category, "unknown");
    assert_eq!(bare.coordinates, "-");
    assert_eq!(bare.magnitude, None);
    assert_eq!(bare.email, None);
    assert_eq!(bare.link, None);
  }
}
