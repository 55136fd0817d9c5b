pub mod handlers;
pub mod routes;
mod services;

pub use services::{create_athlete, editable_team};
