//! Event model: the four message kinds flowing through the engine queue.
//!
//! Market → Signal → Order → Fill. Every event is created through a
//! validating constructor, enqueued once, consumed once, then dropped.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::bar::Bar;
use crate::error::ExecutionError;

/// Exchange tag stamped on every simulated fill.
pub const BACKTEST_EXCHANGE: &str = "BACKTEST";

/// Largest order or fill quantity; keeps every quantity representable as a
/// signed position delta.
pub const MAX_QUANTITY: u64 = i64::MAX as u64;

fn check_quantity(symbol: String, quantity: u64) -> Result<String, ExecutionError> {
    if quantity == 0 {
        return Err(ExecutionError::NonPositiveQuantity { symbol });
    }
    if quantity > MAX_QUANTITY {
        return Err(ExecutionError::QuantityTooLarge { symbol, quantity });
    }
    Ok(symbol)
}

/// Directional trade intent produced by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Order side that expresses this direction.
    pub fn side(self) -> OrderSide {
        match self {
            Direction::Long => OrderSide::Buy,
            Direction::Short => OrderSide::Sell,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// +1 for buys, -1 for sells.
    pub fn sign(self) -> i64 {
        match self {
            OrderSide::Buy => 1,
            OrderSide::Sell => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Only market orders are simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
}

/// A strategy signal, stamped with the bar that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    symbol: String,
    timestamp: NaiveDateTime,
    direction: Direction,
    strength: f64,
}

impl SignalEvent {
    /// Strength must be a finite value in [0.0, 1.0].
    pub fn new(
        symbol: impl Into<String>,
        timestamp: NaiveDateTime,
        direction: Direction,
        strength: f64,
    ) -> Result<Self, ExecutionError> {
        let symbol = symbol.into();
        if !strength.is_finite() || !(0.0..=1.0).contains(&strength) {
            return Err(ExecutionError::InvalidStrength { symbol, strength });
        }
        Ok(Self {
            symbol,
            timestamp,
            direction,
            strength,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn strength(&self) -> f64 {
        self.strength
    }
}

/// A sized order awaiting execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    symbol: String,
    timestamp: NaiveDateTime,
    order_type: OrderType,
    quantity: u64,
    side: OrderSide,
}

impl OrderEvent {
    /// Build a market order. A zero or oversized quantity is a sizing defect
    /// and is rejected.
    pub fn market(
        symbol: impl Into<String>,
        timestamp: NaiveDateTime,
        quantity: u64,
        side: OrderSide,
    ) -> Result<Self, ExecutionError> {
        let symbol = check_quantity(symbol.into(), quantity)?;
        Ok(Self {
            symbol,
            timestamp,
            order_type: OrderType::Market,
            quantity,
            side,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }
}

/// The simulated execution of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    symbol: String,
    timestamp: NaiveDateTime,
    exchange: String,
    quantity: u64,
    side: OrderSide,
    fill_price: f64,
    commission: f64,
}

impl FillEvent {
    pub fn new(
        symbol: impl Into<String>,
        timestamp: NaiveDateTime,
        quantity: u64,
        side: OrderSide,
        fill_price: f64,
        commission: f64,
    ) -> Result<Self, ExecutionError> {
        let symbol = check_quantity(symbol.into(), quantity)?;
        if !fill_price.is_finite() || fill_price <= 0.0 {
            return Err(ExecutionError::InvalidPrice {
                symbol,
                price: fill_price,
            });
        }
        if !commission.is_finite() || commission < 0.0 {
            return Err(ExecutionError::InvalidCommission { symbol, commission });
        }
        Ok(Self {
            symbol,
            timestamp,
            exchange: BACKTEST_EXCHANGE.to_string(),
            quantity,
            side,
            fill_price,
            commission,
        })
    }

    /// Fill an order completely at `fill_price`.
    pub fn from_order(
        order: &OrderEvent,
        fill_price: f64,
        commission: f64,
    ) -> Result<Self, ExecutionError> {
        Self::new(
            order.symbol.clone(),
            order.timestamp,
            order.quantity,
            order.side,
            fill_price,
            commission,
        )
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn fill_price(&self) -> f64 {
        self.fill_price
    }

    pub fn commission(&self) -> f64 {
        self.commission
    }

    /// Signed quantity change this fill applies to a holding.
    pub fn signed_quantity(&self) -> i64 {
        self.side.sign() * i64::try_from(self.quantity).unwrap_or(i64::MAX)
    }
}

/// Tagged union over everything that travels through the event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Market(Bar),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Market(_) => EventKind::Market,
            Event::Signal(_) => EventKind::Signal,
            Event::Order(_) => EventKind::Order,
            Event::Fill(_) => EventKind::Fill,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Event::Market(bar) => &bar.symbol,
            Event::Signal(s) => s.symbol(),
            Event::Order(o) => o.symbol(),
            Event::Fill(f) => f.symbol(),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Event::Market(bar) => bar.timestamp,
            Event::Signal(s) => s.timestamp(),
            Event::Order(o) => o.timestamp(),
            Event::Fill(f) => f.timestamp(),
        }
    }
}

/// Discriminant of [`Event`], used for logging and ordering checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Market,
    Signal,
    Order,
    Fill,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Market => "MARKET",
            EventKind::Signal => "SIGNAL",
            EventKind::Order => "ORDER",
            EventKind::Fill => "FILL",
        };
        write!(f, "{s}")
    }
}
