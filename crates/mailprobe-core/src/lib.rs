pub mod config;
pub mod logging;

pub mod archive;
pub mod control;
pub mod engine;
pub mod input;
pub mod orchestrator;
pub mod outcome;
pub mod probe;
pub mod queue;
pub mod retry;
pub mod stats;
pub mod store;
