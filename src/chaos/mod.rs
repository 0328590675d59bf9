//! Litmus chaos experiment runner
//!
//! Experiments are ChaosEngine manifests under the experiments directory,
//! one file per experiment. The runner patches in a ramp delay, submits the
//! engine, waits for the operator to finish it and collects the verdict.

mod batch;
mod poll;
mod runner;
mod summary;
mod types;

pub use batch::{discover_experiments, run_tests, TestReport};
pub use poll::{poll_until, Clock, PollOutcome, PollSettings, SystemClock};
pub use runner::{ExperimentRunner, TIMED_OUT};
pub use summary::{banner, format_timestamp, render_summary};
pub use types::*;
