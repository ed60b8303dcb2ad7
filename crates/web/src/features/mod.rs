pub mod entries;
pub mod marathons;
pub mod standings;
