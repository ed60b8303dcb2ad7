pub mod common;
pub mod marathon;
pub mod standings;
