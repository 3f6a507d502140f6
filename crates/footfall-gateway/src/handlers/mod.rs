mod card;
mod health;
mod visitors;

pub use card::{card_handler, social_card_handler};
pub use health::health_handler;
pub use visitors::{list_visitors_handler, track_visit_handler};
