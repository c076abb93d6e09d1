// src/core/mod.rs
mod aggregator;
mod classifier;
pub(crate) mod engine;
mod filter;
pub(crate) mod locator;
mod validation;
mod workers;

pub mod contexts;
pub mod design_system;
pub mod scanner;

pub use aggregator::FileReport;
pub use contexts::{Context, EnabledContexts};
pub use workers::default_concurrency;

// Export the main engine
pub use engine::{CountOutcome, Engine, ScanOutcome};
