use crate::cli::global::GlobalArgs;
use utf8_lookup::RankStrategy;
use utf8_lookup::bench::{PlatformInfo, available_strategies};

pub fn handle(_global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let platform = PlatformInfo::detect();
    let available: Vec<&str> = available_strategies().into_iter().map(RankStrategy::as_str).collect();

    println!("utf8-lookup {}", env!("CARGO_PKG_VERSION"));
    println!("  Platform: {}", platform.display());
    println!("  Popcount strategy: {}", platform.strategy);
    println!("  Available strategies: {}", available.join(", "));
    println!(
        "  Hardware popcount feature: {}",
        if cfg!(feature = "popcnt") { "enabled" } else { "disabled" }
    );

    Ok(())
}
