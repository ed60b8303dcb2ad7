pub mod entry;
pub mod marathon;
pub mod position;
