pub mod board;
pub mod config;
pub mod datetime;
pub mod dropdown;
pub mod event;
pub mod filter;
pub mod format;
pub mod page;
pub mod poll;
pub mod sequence;

pub use board::{
  Board,
  BoardView,
  FetchTicket,
  FetchTrigger
};
pub use config::BoardConfig;
pub use event::EventRecord;
pub use filter::FilterField;
