mod card;
mod health;
mod visitors;

pub use card::CardQuery;
pub use health::HealthResponse;
pub use visitors::VisitorListResponse;
