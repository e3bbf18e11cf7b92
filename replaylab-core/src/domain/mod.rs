//! Domain types for ReplayLab

pub mod bar;
pub mod event;
pub mod holding;
pub mod trade;

pub use bar::Bar;
pub use event::{
    Direction, Event, EventKind, FillEvent, OrderEvent, OrderSide, OrderType, SignalEvent,
    BACKTEST_EXCHANGE, MAX_QUANTITY,
};
pub use holding::Holding;
pub use trade::TradeRecord;

/// Symbol type alias
pub type Symbol = String;
