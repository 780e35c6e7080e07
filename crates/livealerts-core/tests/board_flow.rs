use chrono::{TimeZone, Utc};
use livealerts_core::board::{Board, BoardView, FetchTrigger, LoadStatus};
use livealerts_core::config::BoardConfig;
use livealerts_core::event::decode_events;
use livealerts_core::filter::FilterField;
use livealerts_core::poll::PollSchedule;

fn fixture(count: usize) -> String {
    let events: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            serde_json::json!({
                "id": format!("ev-{i}"),
                "title": format!("Event {i}"),
                "category": if i % 2 == 0 { "earthquake" } else { "wildfire" },
                "source": if i % 3 == 0 { "USGS" } else { "EONET" },
                "date": 1_700_000_000_000_i64 + (i as i64) * 60_000,
                "latitude": -12.3456,
                "longitude": 45.6789,
                "url": format!("https://example.org/{i}"),
            })
        })
        .collect();
    serde_json::to_string(&events).expect("serialize fixture")
}

#[test]
fn fetch_filter_page_and_refresh_flow() {
    let cfg = BoardConfig::default();
    let mut board = Board::new(&cfg);
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().expect("valid now");

    let ticket = board.begin_fetch(FetchTrigger::Initial);
    assert!(ticket.query.is_empty());
    let events = decode_events(&fixture(25)).expect("decode fixture");
    assert!(board.apply_events(&ticket, events, now));
    assert_eq!(board.status(), LoadStatus::Ready);

    let BoardView::Listing(first) = board.view() else {
        panic!("expected listing");
    };
    assert_eq!(first.cards.len(), 20);
    assert_eq!(first.cards[0].title, "Event 24");
    assert_eq!(first.cards[0].coordinates, "12.346°S, 45.679°E");
    assert_eq!(first.summary, "Showing 1-20 of 25 events");
    assert_eq!(first.pager.prev, None);

    assert!(board.goto_page(2));
    let BoardView::Listing(second) = board.view() else {
        panic!("expected listing");
    };
    assert_eq!(second.cards.len(), 5);
    assert_eq!(second.pager.next, None);
    assert_eq!(second.pager.label(), "Page 2 of 2");

    board.set_filter(FilterField::Category, "wildfire");
    board.set_filter(FilterField::Source, "USGS");
    let BoardView::Listing(filtered) = board.view() else {
        panic!("expected listing");
    };
    assert!(filtered
        .cards
        .iter()
        .all(|card| card.category == "wildfire" && card.source == "USGS"));
    assert_eq!(filtered.cards.len(), 4);

    let poll = board.begin_fetch(FetchTrigger::Poll);
    assert_eq!(poll.query.len(), 2);
    let failed = board.apply_failure(&poll, "transport error");
    assert!(failed);
    assert_eq!(board.view(), BoardView::Failed);
    assert_eq!(board.sorted_events().len(), 4);

    let retry = board.begin_fetch(FetchTrigger::Poll);
    let only_eonet = decode_events(
        r#"[{"id": 1, "category": "wildfire", "source": "EONET", "date": "2024-01-01"}]"#,
    )
    .expect("decode");
    board.apply_events(&retry, only_eonet, now);
    assert_eq!(board.filters().category, "wildfire");
    assert_eq!(board.filters().source, "");
    assert!(matches!(board.view(), BoardView::Listing(_)));
}

#[test]
fn polling_refetches_on_virtual_clock() {
    let cfg = BoardConfig::default();
    let mut board = Board::new(&cfg);
    let mut schedule = PollSchedule::new(cfg.poll_interval_ms());
    schedule.start(0);

    let mut fetches = 0;
    for now_ms in (0..=46_000).step_by(500) {
        if schedule.poll(now_ms) {
            let ticket = board.begin_fetch(FetchTrigger::Poll);
            assert_eq!(ticket.trigger, FetchTrigger::Poll);
            fetches += 1;
        }
    }
    assert_eq!(fetches, 3);

    schedule.cancel();
    assert!(!schedule.poll(1_000_000));
}
