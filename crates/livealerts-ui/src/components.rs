mod event_card;
mod pager;
mod send_email_button;
mod status_card;
mod summary_card;

pub use event_card::EventCard;
pub use pager::Pager;
pub use send_email_button::SendEmailButton;
pub use status_card::StatusCard;
pub use summary_card::SummaryCard;
