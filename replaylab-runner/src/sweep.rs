//! Parameter sweeps over the active strategy.
//!
//! A grid is a list of axes (`name=v1,v2,...`); every combination is run as an
//! independent backtest against the same read-only bar series. Runs are
//! spread over the rayon pool and ranked by Sharpe ratio.

use rayon::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use replaylab_core::domain::Bar;
use replaylab_core::strategy::{create_strategy, FactoryError, StrategyConfig};

use crate::config::BacktestConfig;
use crate::runner::{run_with_bars, BacktestResult, RunError};

#[derive(Debug, Error, PartialEq)]
pub enum ParamGridError {
    #[error("expected name=v1,v2,... but got '{0}'")]
    Malformed(String),
    #[error("parameter '{0}' given more than once")]
    Duplicate(String),
    #[error("invalid value '{value}' for parameter '{param}'")]
    InvalidValue { param: String, value: String },
}

/// One swept parameter and its candidate values.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamAxis {
    pub name: String,
    pub values: Vec<f64>,
}

/// Cartesian grid of strategy parameter overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    axes: Vec<ParamAxis>,
}

impl ParamGrid {
    /// Parse `--param` arguments of the form `name=v1,v2,...`.
    pub fn parse<S: AsRef<str>>(specs: &[S]) -> Result<Self, ParamGridError> {
        let mut grid = Self::default();
        for spec in specs {
            grid.push(parse_axis(spec.as_ref())?)?;
        }
        Ok(grid)
    }

    pub fn push(&mut self, axis: ParamAxis) -> Result<(), ParamGridError> {
        if self.axes.iter().any(|a| a.name == axis.name) {
            return Err(ParamGridError::Duplicate(axis.name));
        }
        self.axes.push(axis);
        Ok(())
    }

    pub fn axes(&self) -> &[ParamAxis] {
        &self.axes
    }

    /// Number of combinations, before invalid ones are dropped.
    pub fn size(&self) -> usize {
        self.axes.iter().map(|a| a.values.len()).product()
    }

    /// All combinations in row-major order (last axis varies fastest).
    pub fn combinations(&self) -> Vec<Vec<(&str, f64)>> {
        let mut combos: Vec<Vec<(&str, f64)>> = vec![Vec::new()];
        for axis in &self.axes {
            combos = combos
                .into_iter()
                .flat_map(|prefix| {
                    axis.values.iter().map(move |&v| {
                        let mut combo = prefix.clone();
                        combo.push((axis.name.as_str(), v));
                        combo
                    })
                })
                .collect();
        }
        combos
    }

    /// Strategy configs for every combination applied to `base`.
    ///
    /// Unknown parameter names are an error. Combinations the strategy
    /// factory rejects (e.g. short window not below long window) are skipped.
    pub fn generate_configs(
        &self,
        base: &StrategyConfig,
    ) -> Result<Vec<StrategyConfig>, FactoryError> {
        let mut configs = Vec::with_capacity(self.size());
        for combo in self.combinations() {
            let mut config = base.clone();
            for (name, value) in &combo {
                config = config.with_param(name, *value)?;
            }
            match create_strategy(&config) {
                Ok(_) => configs.push(config),
                Err(FactoryError::Rejected { message, .. }) => {
                    warn!(?combo, reason = %message, "skipping invalid parameter combination");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(configs)
    }
}

fn parse_axis(spec: &str) -> Result<ParamAxis, ParamGridError> {
    let (name, values) = spec
        .split_once('=')
        .ok_or_else(|| ParamGridError::Malformed(spec.to_string()))?;
    let name = name.trim();
    if name.is_empty() || values.trim().is_empty() {
        return Err(ParamGridError::Malformed(spec.to_string()));
    }
    let values = values
        .split(',')
        .map(|raw| {
            let raw = raw.trim();
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ParamGridError::InvalidValue {
                    param: name.to_string(),
                    value: raw.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParamAxis {
        name: name.to_string(),
        values,
    })
}

/// Parameter sweep executor.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every valid grid combination of the config's active strategy.
    pub fn sweep(
        &self,
        config: &BacktestConfig,
        grid: &ParamGrid,
        bars: &[Bar],
    ) -> Result<SweepResults, RunError> {
        let base = config.strategy_config()?;
        let configs = grid.generate_configs(&base)?;
        info!(
            strategy = base.name(),
            combinations = grid.size(),
            runs = configs.len(),
            parallel = self.parallel,
            "starting parameter sweep"
        );

        let run_one = |strategy: &StrategyConfig| run_with_bars(config, strategy, bars.to_vec());
        let results = if self.parallel {
            configs
                .par_iter()
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs.iter().map(run_one).collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(results))
    }
}

/// Sweep results ranked best-first by Sharpe ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResults {
    ranked: Vec<BacktestResult>,
}

impl SweepResults {
    fn new(mut results: Vec<BacktestResult>) -> Self {
        results.sort_by(|a, b| {
            b.tearsheet
                .sharpe
                .total_cmp(&a.tearsheet.sharpe)
                .then_with(|| a.run_id.cmp(&b.run_id))
        });
        Self { ranked: results }
    }

    pub fn ranked(&self) -> &[BacktestResult] {
        &self.ranked
    }

    pub fn best(&self) -> Option<&BacktestResult> {
        self.ranked.first()
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_axis() {
        let grid = ParamGrid::parse(&["short_window=5,10, 20"]).unwrap();
        assert_eq!(grid.axes().len(), 1);
        assert_eq!(grid.axes()[0].name, "short_window");
        assert_eq!(grid.axes()[0].values, vec![5.0, 10.0, 20.0]);
        assert_eq!(grid.size(), 3);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            ParamGrid::parse(&["short_window"]),
            Err(ParamGridError::Malformed("short_window".into()))
        );
        assert!(matches!(
            ParamGrid::parse(&["window=5,x"]),
            Err(ParamGridError::InvalidValue { .. })
        ));
        assert_eq!(
            ParamGrid::parse(&["window=5", "window=6"]),
            Err(ParamGridError::Duplicate("window".into()))
        );
    }

    #[test]
    fn combinations_are_cartesian() {
        let grid = ParamGrid::parse(&["a=1,2", "b=10,20,30"]).unwrap();
        let combos = grid.combinations();
        assert_eq!(combos.len(), 6);
        assert_eq!(combos[0], vec![("a", 1.0), ("b", 10.0)]);
        assert_eq!(combos[5], vec![("a", 2.0), ("b", 30.0)]);
    }

    #[test]
    fn empty_grid_is_the_base_config() {
        let base = StrategyConfig::MaCrossover {
            short_window: 5,
            long_window: 20,
        };
        let configs = ParamGrid::default().generate_configs(&base).unwrap();
        assert_eq!(configs, vec![base]);
    }

    #[test]
    fn invalid_combinations_are_skipped() {
        let base = StrategyConfig::MaCrossover {
            short_window: 5,
            long_window: 20,
        };
        let grid = ParamGrid::parse(&["short_window=5,30", "long_window=10,40"]).unwrap();
        let configs = grid.generate_configs(&base).unwrap();
        // (5,10) (5,40) (30,40) valid; (30,10) rejected
        assert_eq!(configs.len(), 3);
    }

    #[test]
    fn unknown_param_is_an_error() {
        let base = StrategyConfig::MaCrossover {
            short_window: 5,
            long_window: 20,
        };
        let grid = ParamGrid::parse(&["window=5"]).unwrap();
        assert!(matches!(
            grid.generate_configs(&base),
            Err(FactoryError::UnknownParam { .. })
        ));
    }
}
