pub mod config;
pub mod duration;
pub mod emissions;
pub mod jobs;
pub mod loader;
pub mod model;
pub mod output;
pub mod ranges;
pub mod report;
pub mod savings;
pub mod stats;
