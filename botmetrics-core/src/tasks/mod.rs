pub mod retention_sweeper;
pub mod daily_rollup;
