//! Simulation engine: FIFO event queue, dispatch loop, and event sinks.
//!
//! The engine owns every run component (feed, strategy, sizer, execution
//! simulator, ledger) and is the ledger's only writer.

pub mod loop_runner;
pub mod queue;
pub mod sink;
pub mod state;

pub use loop_runner::SimulationEngine;
pub use queue::EventQueue;
pub use sink::{EventSink, NullSink, RecordingSink, TracingSink};
pub use state::{EngineConfig, EquityPoint, RunResult, DEFAULT_WINDOW_BARS};
