//! Event sinks: observers handed every event the engine dispatches.

use tracing::{debug, info};

use crate::domain::{Event, EventKind};

pub trait EventSink {
    fn on_event(&mut self, event: &Event);
}

/// Logs each event through `tracing`. Market ticks go to DEBUG, the rest to INFO.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::Market(bar) => debug!(
                symbol = %bar.symbol,
                timestamp = %bar.timestamp,
                close = bar.close,
                volume = bar.volume,
                "market"
            ),
            Event::Signal(signal) => info!(
                symbol = signal.symbol(),
                timestamp = %signal.timestamp(),
                direction = %signal.direction(),
                strength = signal.strength(),
                "signal"
            ),
            Event::Order(order) => info!(
                symbol = order.symbol(),
                timestamp = %order.timestamp(),
                side = %order.side(),
                quantity = order.quantity(),
                "order"
            ),
            Event::Fill(fill) => info!(
                symbol = fill.symbol(),
                timestamp = %fill.timestamp(),
                side = %fill.side(),
                quantity = fill.quantity(),
                price = fill.fill_price(),
                commission = fill.commission(),
                "fill"
            ),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &Event) {}
}

/// Keeps a copy of every event, in dispatch order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<Event>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.iter().map(Event::kind).collect()
    }
}

impl EventSink for RecordingSink {
    fn on_event(&mut self, event: &Event) {
        self.events.push(event.clone());
    }
}
