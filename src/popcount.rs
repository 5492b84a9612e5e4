//! Population count with runtime CPU dispatch
//!
//! The rank query at the heart of a lookup is one popcount per input byte.
//! A hardware instruction is much faster than the portable bit trick, but
//! only exists on some CPUs, so the choice is made once at runtime and
//! cached. Both strategies are pure and return identical results, so a
//! racing first use on several threads is harmless.

use std::sync::OnceLock;

// CPU feature detection cache
static HAS_POPCNT: OnceLock<bool> = OnceLock::new();

static ACTIVE: OnceLock<RankStrategy> = OnceLock::new();

/// Check if a hardware popcount instruction is available (cached after first call)
#[cfg(target_arch = "x86_64")]
pub fn has_popcnt() -> bool {
    *HAS_POPCNT.get_or_init(|| is_x86_feature_detected!("popcnt"))
}

/// CNT is part of the mandatory NEON set on aarch64
#[cfg(target_arch = "aarch64")]
pub fn has_popcnt() -> bool {
    *HAS_POPCNT.get_or_init(|| true)
}

#[cfg(all(not(target_arch = "x86_64"), not(target_arch = "aarch64")))]
pub fn has_popcnt() -> bool {
    *HAS_POPCNT.get_or_init(|| false)
}

/// Which popcount implementation drives the rank queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankStrategy {
    /// CPU popcount instruction
    Hardware,
    /// Portable SWAR bit counting
    Portable,
}

impl RankStrategy {
    /// Strategy selected for this process (detected once, then cached).
    pub fn active() -> Self {
        *ACTIVE.get_or_init(|| {
            let strategy = Self::detect();
            tracing::debug!(?strategy, "selected popcount strategy");
            strategy
        })
    }

    fn detect() -> Self {
        if cfg!(feature = "popcnt") && has_popcnt() {
            RankStrategy::Hardware
        } else {
            RankStrategy::Portable
        }
    }

    /// Whether this strategy can run on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            RankStrategy::Hardware => has_popcnt(),
            RankStrategy::Portable => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RankStrategy::Hardware => "hardware",
            RankStrategy::Portable => "portable",
        }
    }
}

impl std::fmt::Display for RankStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bit counting primitive used by the lookup loop.
///
/// Implementations are zero-sized markers so the loop can be monomorphised
/// per strategy.
pub(crate) trait Rank {
    fn popcount(value: u64) -> u64;

    /// Number of set bits in `bits` strictly below `check_bit`.
    #[inline(always)]
    fn rank(bits: u64, check_bit: u64) -> u64 {
        Self::popcount(bits & check_bit.wrapping_sub(1))
    }
}

/// `count_ones`, which lowers to the popcount instruction inside functions
/// compiled with that target feature.
pub(crate) struct Native;

impl Rank for Native {
    #[inline(always)]
    fn popcount(value: u64) -> u64 {
        value.count_ones() as u64
    }
}

pub(crate) struct Portable;

impl Rank for Portable {
    #[inline(always)]
    fn popcount(value: u64) -> u64 {
        portable_popcount(value)
    }
}

/// Count set bits without any CPU support (SWAR, Hacker's Delight 5-2).
#[inline]
pub const fn portable_popcount(value: u64) -> u64 {
    let mut v = value;
    v = (v & 0x5555_5555_5555_5555) + ((v >> 1) & 0x5555_5555_5555_5555);
    v = (v & 0x3333_3333_3333_3333) + ((v >> 2) & 0x3333_3333_3333_3333);
    v = (v & 0x0F0F_0F0F_0F0F_0F0F) + ((v >> 4) & 0x0F0F_0F0F_0F0F_0F0F);
    v.wrapping_mul(0x0101_0101_0101_0101) >> 56
}
