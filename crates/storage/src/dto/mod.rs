pub mod athlete;
pub mod classification;
pub mod common;
pub mod competition;
pub mod event;
pub mod result;
pub mod start_list;
pub mod team;
