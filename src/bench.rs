//! Benchmarking utilities for comparing rank strategies.
//!
//! This module exposes the lookup loop per popcount strategy so benches and
//! the CLI can compare them directly:
//! - Hardware: the loop compiled with the CPU popcount instruction
//! - Portable: the SWAR bit-counting fallback
//!
//! # Example
//!
//! ```
//! use utf8_lookup::OwnedTable;
//! use utf8_lookup::bench::{available_strategies, lookup_with_strategy};
//! use utf8_lookup::LookupResult;
//!
//! let owned = OwnedTable::from_chars("abc".chars()).unwrap();
//! let mut results = [LookupResult::default(); 8];
//!
//! for strategy in available_strategies() {
//!     let progress = lookup_with_strategy(strategy, &owned.table(), b"cab", &mut results).unwrap();
//!     assert_eq!(progress.written, 3);
//! }
//! ```

use crate::lookup::{self, LookupProgress, LookupResult};
use crate::popcount::{RankStrategy, has_popcnt};
use crate::table::LookupTable;

/// Platform capabilities for popcount.
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub arch: &'static str,
    pub popcount_features: Vec<&'static str>,
    pub strategy: RankStrategy,
}

impl PlatformInfo {
    /// Detect current platform capabilities.
    pub fn detect() -> Self {
        let arch = std::env::consts::ARCH;
        let mut popcount_features = Vec::new();

        #[cfg(target_arch = "x86_64")]
        {
            if has_popcnt() {
                popcount_features.push("POPCNT");
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            // CNT is always available on aarch64
            if has_popcnt() {
                popcount_features.push("NEON CNT");
            }
        }

        PlatformInfo {
            arch,
            popcount_features,
            strategy: RankStrategy::active(),
        }
    }

    /// Format as display string.
    pub fn display(&self) -> String {
        if self.popcount_features.is_empty() {
            self.arch.to_string()
        } else {
            format!("{} ({})", self.arch, self.popcount_features.join(", "))
        }
    }
}

/// Strategies that can run on this CPU.
pub fn available_strategies() -> Vec<RankStrategy> {
    let mut strategies = vec![RankStrategy::Portable]; // Portable always available
    if has_popcnt() {
        strategies.push(RankStrategy::Hardware);
    }
    strategies
}

/// Run the lookup loop with a specific strategy.
///
/// Returns `None` if the strategy is unavailable on this CPU.
pub fn lookup_with_strategy(
    strategy: RankStrategy,
    table: &LookupTable<'_>,
    input: &[u8],
    results: &mut [LookupResult],
) -> Option<LookupProgress> {
    if !strategy.is_available() {
        return None;
    }
    Some(lookup::lookup_with_strategy(strategy, table, input, results))
}
