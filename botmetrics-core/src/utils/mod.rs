pub mod stats;
pub mod time;
pub mod timeout;
