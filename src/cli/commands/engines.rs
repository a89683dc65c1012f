//! Engine status command.

use console::style;

use crate::config::Config;
use crate::ocr::{EngineRegistry, OcrBackendType};

/// Print every configured engine and whether it can run.
pub fn cmd_engines(config: &Config) -> anyhow::Result<()> {
    let registry = EngineRegistry::from_names(
        config.engines.as_slice(),
        &config.ocr_config(),
        config.engine_timeout(),
    );

    println!("\n{}", style("OCR Engines").bold());
    println!("{}", "-".repeat(50));

    if registry.is_empty() {
        println!("  {}", style("No usable engines configured").yellow());
        println!(
            "  {}",
            style("Check `engines` in the config and the enabled cargo features").dim()
        );
        return Ok(());
    }

    for status in registry.statuses() {
        let label = if status.available {
            style("✓ available").green()
        } else {
            style("✗ not available").red()
        };
        println!("  {:<15} {}", status.name, label);
        println!("                  {}", style(status.hint).dim());
    }

    let registered = registry.names();
    let skipped: Vec<&String> = config
        .engines
        .iter()
        .filter(|name| {
            OcrBackendType::from_str(name).map_or(true, |t| !registered.contains(&t.as_str()))
        })
        .collect();
    if !skipped.is_empty() {
        println!(
            "\n  {} skipped (unknown or not compiled in): {}",
            style("!").yellow(),
            skipped
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    println!(
        "\n  Language: {}  Charset: {}",
        config.language,
        config.charset.as_str()
    );

    Ok(())
}
