//! Provider listing command.

use console::style;

use crate::config::Config;
use crate::providers::{availability_hint, ProviderKind};

use super::build_analyzer;

/// List configured backends, in preference order, and how to enable the rest.
pub fn cmd_providers(config: &Config) -> anyhow::Result<()> {
    let analyzer = build_analyzer(config)?;
    let registry = analyzer.registry();

    println!("\n{}", style("AI Providers").bold());
    println!("{}", "-".repeat(50));

    for kind in config.ai.preference_order() {
        match registry.get(kind.as_str()) {
            Some(backend) => {
                let preferred = registry
                    .preferred()
                    .is_some_and(|p| p.id() == backend.id());
                println!(
                    "  {:<10} {} {}{}",
                    kind.as_str(),
                    style("✓ configured").green(),
                    style(backend.model()).dim(),
                    if preferred {
                        format!(" {}", style("(preferred)").cyan())
                    } else {
                        String::new()
                    }
                );
            }
            None => {
                println!("  {:<10} {}", kind.as_str(), style("✗ not configured").red());
                println!("             {}", style(availability_hint(kind)).dim());
            }
        }
    }

    let unordered: Vec<ProviderKind> = ProviderKind::DEFAULT_ORDER
        .iter()
        .copied()
        .filter(|k| !config.ai.preference_order().contains(k))
        .collect();
    if !unordered.is_empty() {
        println!(
            "\n  {} excluded by [ai].order: {}",
            style("○").yellow(),
            unordered
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if registry.is_empty() {
        println!(
            "\n{} No providers configured; analysis uses keyword rules only.",
            style("!").yellow()
        );
    }

    Ok(())
}
