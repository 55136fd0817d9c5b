pub mod classification;
pub mod lifecycle;
pub mod recorder;
pub mod registration;
