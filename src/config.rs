use itertools::Itertools;
use log::LevelFilter;
use rand::{ SeedableRng, rngs::StdRng };
use serde::{ Serialize, Deserialize };

use crate::scalar::Real;


/// Run-wide settings, fixed once at startup and handed to whatever needs
/// them. Nothing in this crate reads process-global state instead.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Seed for parameter initialisation and sampling.
  pub seed: u64,
  /// Verbosity handed to the logger by binaries.
  pub log_level: LevelFilter,
  /// Decimal places when printing vectors.
  pub precision: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      seed: 1234,
      log_level: LevelFilter::Error,
      precision: 2,
    }
  }
}

impl Config {
  pub fn with_seed(mut self, seed: u64) -> Self {
    self.seed = seed;
    self
  }

  pub fn with_log_level(mut self, log_level: LevelFilter) -> Self {
    self.log_level = log_level;
    self
  }

  pub fn with_precision(mut self, precision: usize) -> Self {
    self.precision = precision;
    self
  }

  /// A fresh generator seeded from [seed](Config::seed). Every call
  /// starts the same sequence.

  pub fn rng(&self) -> StdRng {
    StdRng::seed_from_u64(self.seed)
  }

  /// Numpy-style rendering, e.g. `[0.03 0.09 0.24 0.64]`.

  pub fn format<R: Real + std::fmt::Display>(&self, values: &[R]) -> String {
    let precision = self.precision;
    format!("[{}]", values.iter().map(|v| format!("{v:.precision$}") ).join(" "))
  }
}
