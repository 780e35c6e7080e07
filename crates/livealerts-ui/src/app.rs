mod filters;
mod session;

use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use livealerts_core::board::{
  LOAD_ERROR,
  NO_EVENTS,
  NO_EVENTS_ON_PAGE
};
use livealerts_core::poll::PollSchedule;
use livealerts_core::{
  Board,
  BoardConfig,
  BoardView,
  FetchTrigger
};
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html,
  use_effect,
  use_effect_with,
  use_force_update,
  use_mut_ref
};

use self::filters::FilterControls;
use self::session::Session;
use crate::components::{
  EventCard,
  Pager,
  StatusCard,
  SummaryCard
};

const HEARTBEAT_MS: u32 = 1_000;
const REFRESH_BUTTON_ID: &str = "refreshBtn";

#[derive(Properties, PartialEq)]
pub struct AppProps {
  pub config: Rc<BoardConfig>
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
  let board = {
    let config = props.config.clone();
    use_mut_ref(move || Board::new(&config))
  };
  let controls =
    use_mut_ref(FilterControls::default);
  let redraw = use_force_update();
  let session = Session::new(
    props.config.clone(),
    board,
    controls,
    redraw
  );

  {
    let session = session.clone();
    use_effect_with((), move |_| {
      session.fetch(FetchTrigger::Initial);
      let polling = Polling::start(&session);
      let refresh = bind_refresh_button(&session);
      filters::spawn_init(session.clone());

      move || {
        polling.stop();
        drop(refresh);
        session.controls.borrow_mut().close();
        tracing::debug!("board unmounted");
      }
    });
  }

  {
    let session = session.clone();
    use_effect(move || {
      session.paint_header();
      || ()
    });
  }

  let view = session.board.borrow().view();
  match view {
    | BoardView::Failed => html! {
      <StatusCard message={LOAD_ERROR} />
    },
    | BoardView::Empty => html! {
      <StatusCard message={NO_EVENTS} />
    },
    | BoardView::Listing(listing) => {
      let on_page = {
        let session = session.clone();
        Callback::from(move |page: usize| {
          session.goto_page(page);
        })
      };
      let endpoint = session
        .config
        .send_email_endpoint
        .clone();
      let feedback_ms =
        session.config.email_feedback_ms;

      html! {
        <>
          <SummaryCard
            heading={listing.heading}
            summary={listing.summary}
          />
          if listing.cards.is_empty() {
            <StatusCard message={NO_EVENTS_ON_PAGE} />
          } else {
            { for listing.cards.into_iter().map(|card| {
              let key = card.key.clone();
              html! {
                <EventCard
                  key={key}
                  card={card}
                  email_endpoint={endpoint.clone()}
                  feedback_ms={feedback_ms}
                />
              }
            }) }
          }
          <Pager pager={listing.pager} on_page={on_page} />
        </>
      }
    }
  }
}

fn now_ms() -> u64 {
  js_sys::Date::now().max(0.0) as u64
}

/// The poll schedule plus the heartbeat that ticks it.
struct Polling {
  schedule:  Rc<RefCell<PollSchedule>>,
  heartbeat: Interval
}

impl Polling {
  fn start(session: &Session) -> Self {
    let schedule = Rc::new(RefCell::new(
      PollSchedule::new(
        session.config.poll_interval_ms()
      )
    ));
    schedule.borrow_mut().start(now_ms());
    tracing::info!(
      period_ms = schedule.borrow().period_ms(),
      "polling for events"
    );

    let heartbeat = {
      let schedule = schedule.clone();
      let session = session.clone();
      Interval::new(HEARTBEAT_MS, move || {
        let due =
          schedule.borrow_mut().poll(now_ms());
        if due {
          session.fetch(FetchTrigger::Poll);
        }
      })
    };

    Self {
      schedule,
      heartbeat
    }
  }

  fn stop(self) {
    self.schedule.borrow_mut().cancel();
    drop(self.heartbeat);
  }
}

fn bind_refresh_button(
  session: &Session
) -> Option<EventListener> {
  let Some(button) = gloo::utils::document()
    .get_element_by_id(REFRESH_BUTTON_ID)
  else {
    tracing::warn!(
      "missing #refreshBtn; manual refresh disabled"
    );
    return None;
  };

  let session = session.clone();
  Some(EventListener::new(
    &button,
    "click",
    move |_| {
      session.fetch(FetchTrigger::Manual);
    }
  ))
}
