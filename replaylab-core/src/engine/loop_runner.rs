//! Event-driven simulation loop.
//!
//! Per bar:
//! 1. Seed one Market event from the feed
//! 2. Drain the queue FIFO: Market marks the ledger and asks the strategy for
//!    signals, each Signal becomes one Order, each Order becomes one Fill,
//!    each Fill is applied to the ledger
//! 3. Sample account value into the equity curve
//!
//! The loop ends when the feed is exhausted and the queue is empty. Any
//! per-event error aborts the run.

use tracing::{info, warn};

use crate::data::MarketDataFeed;
use crate::domain::{Bar, Event, FillEvent, OrderEvent, SignalEvent};
use crate::error::ExecutionError;
use crate::execution::ExecutionSimulator;
use crate::portfolio::PortfolioLedger;
use crate::sizers::OrderSizer;
use crate::strategy::Strategy;

use super::queue::EventQueue;
use super::sink::{EventSink, TracingSink};
use super::state::{EngineConfig, EquityPoint, RunResult};

pub struct SimulationEngine {
    feed: Box<dyn MarketDataFeed>,
    strategy: Box<dyn Strategy>,
    sizer: Box<dyn OrderSizer>,
    execution: ExecutionSimulator,
    ledger: PortfolioLedger,
    queue: EventQueue,
    window_bars: usize,
    signals: Vec<SignalEvent>,
    fills: Vec<FillEvent>,
    equity_curve: Vec<EquityPoint>,
}

impl SimulationEngine {
    pub fn new(
        config: &EngineConfig,
        feed: Box<dyn MarketDataFeed>,
        strategy: Box<dyn Strategy>,
        sizer: Box<dyn OrderSizer>,
        execution: ExecutionSimulator,
    ) -> Self {
        let window_bars = config.window_bars.max(strategy.lookback());
        let capacity = feed.len();
        Self {
            feed,
            strategy,
            sizer,
            execution,
            ledger: PortfolioLedger::new(config.initial_capital, config.cash_policy),
            queue: EventQueue::new(),
            window_bars,
            signals: Vec::new(),
            fills: Vec::new(),
            equity_curve: Vec::with_capacity(capacity),
        }
    }

    /// Run to completion, logging every event through `tracing`.
    pub fn run(self) -> Result<RunResult, ExecutionError> {
        self.run_with_sink(&mut TracingSink)
    }

    /// Run to completion, reporting every dispatched event to `sink`.
    pub fn run_with_sink(mut self, sink: &mut dyn EventSink) -> Result<RunResult, ExecutionError> {
        info!(
            strategy = self.strategy.name(),
            symbol = self.feed.symbol(),
            bars = self.feed.len(),
            window_bars = self.window_bars,
            initial_capital = self.ledger.initial_capital(),
            "simulation started"
        );

        let mut bar_count = 0;
        loop {
            let Some(bar) = self.feed.advance().cloned() else {
                break;
            };
            if bar.is_void() {
                warn!(symbol = %bar.symbol, timestamp = %bar.timestamp, "void bar in feed");
            }
            bar_count += 1;
            let (timestamp, close) = (bar.timestamp, bar.close);

            self.queue.push(Event::Market(bar));
            while let Some(event) = self.queue.pop() {
                sink.on_event(&event);
                self.dispatch(event)?;
            }

            let equity = self.ledger.calculate_performance(close).total_value;
            self.equity_curve.push(EquityPoint { timestamp, equity });
        }

        let stats = self.ledger.stats();
        info!(
            strategy = self.strategy.name(),
            bars = bar_count,
            signals = self.signals.len(),
            fills = self.fills.len(),
            total_trades = stats.total_trades,
            total_fees = stats.total_fees,
            final_equity = self.equity_curve.last().map(|p| p.equity),
            "simulation finished"
        );

        Ok(RunResult {
            strategy: self.strategy.name().to_string(),
            trades: self.ledger.trades().to_vec(),
            final_snapshot: self.ledger.snapshot(),
            signals: self.signals,
            fills: self.fills,
            stats,
            equity_curve: self.equity_curve,
            bar_count,
        })
    }

    fn dispatch(&mut self, event: Event) -> Result<(), ExecutionError> {
        match event {
            Event::Market(bar) => self.on_market(&bar),
            Event::Signal(signal) => self.on_signal(signal),
            Event::Order(order) => self.on_order(&order),
            Event::Fill(fill) => {
                self.ledger.execute_fill(&fill)?;
                self.fills.push(fill);
                Ok(())
            }
        }
    }

    fn on_market(&mut self, bar: &Bar) -> Result<(), ExecutionError> {
        self.ledger.mark_to_market(bar);
        let snapshot = self.ledger.snapshot();
        let window = self.feed.window(self.window_bars);
        let intents = self
            .strategy
            .generate_signals(window, &self.signals, &snapshot);

        for intent in intents {
            let signal = SignalEvent::new(
                bar.symbol.clone(),
                bar.timestamp,
                intent.direction,
                intent.strength,
            )?;
            self.queue.push(Event::Signal(signal));
        }
        Ok(())
    }

    fn on_signal(&mut self, signal: SignalEvent) -> Result<(), ExecutionError> {
        let order: OrderEvent = self.sizer.size_order(self.ledger.cash(), &signal)?;
        self.signals.push(signal);
        self.queue.push(Event::Order(order));
        Ok(())
    }

    /// Orders fill at the close the ledger marked for the bar being processed.
    fn on_order(&mut self, order: &OrderEvent) -> Result<(), ExecutionError> {
        let market_price = self.ledger.last_price(order.symbol()).ok_or_else(|| {
            ExecutionError::NoMarketData {
                symbol: order.symbol().to_string(),
            }
        })?;
        let fill = self.execution.execute(order, market_price)?;
        self.queue.push(Event::Fill(fill));
        Ok(())
    }
}
