//! Order execution: slippage models and the fill simulator.

pub mod simulator;
pub mod slippage;

pub use simulator::ExecutionSimulator;
pub use slippage::{AsymmetricSlippage, SlippageModel};
