//! # boundq-test-support
//!
//! Testing infrastructure for boundq.
//!
//! ## Components
//!
//! - **StressRunner** - N producers / M consumers moving tagged values through
//!   one shared policy, with a bounded wait for completion
//! - **AlternatingWorkload** - a pool of one-shot producer and consumer threads
//!   started together, each sleeping before its single operation
//! - **SequenceChecker** / **MultisetChecker** - ordering and exactly-once
//!   delivery checks over what the workers observed

pub mod stress;
pub mod verify;
pub mod workload;

pub use stress::{ StressConfig, StressError, StressReport, StressRunner };
pub use verify::{ MultisetChecker, SequenceChecker };
pub use workload::{ AlternatingWorkload, WorkloadConfig, WorkloadReport };

/// Route boundq trace events to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .with_test_writer()
        .try_init();
}
