pub mod handlers;
pub mod routes;
mod services;

pub use services::ensure_not_archived;
