//! Local report analysis command.

use std::path::Path;

use console::style;

use crate::analysis::ProviderSelection;
use crate::config::Config;
use crate::models::{AnalysisResult, Severity};

use super::build_analyzer;
use super::helpers::{severity_label, truncate};

/// Analyze a report on disk and print the result.
pub async fn cmd_analyze(
    config: &Config,
    file: &Path,
    provider: &str,
    json: bool,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    let filename = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let analyzer = build_analyzer(config)?;
    let selection = ProviderSelection::parse(Some(provider));

    if !json {
        println!(
            "{} Analyzing {} (provider: {})",
            style("→").cyan(),
            style(&filename).bold(),
            selection
        );
    }

    let result = analyzer
        .analyze(&filename, &bytes, Some(&filename), &selection)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    let results = &result.analysis_results;

    println!("\n{}", style("Report").bold());
    println!("{}", "-".repeat(60));
    println!("  {:<16} {}", "VPAT version:", results.vpat_version);
    println!("  {:<16} {}", "Product:", results.product_version);
    println!("  {:<16} {}", "Report age:", results.report_age);

    let summary = &results.summary;
    println!("\n{}", style("Conformance").bold());
    println!("{}", "-".repeat(60));
    println!("  {:<20} {}", "Supports", style(summary.supports).green());
    println!(
        "  {:<20} {}",
        "Partially Supports",
        style(summary.partially_supports).yellow()
    );
    println!(
        "  {:<20} {}",
        "Does Not Support",
        style(summary.does_not_support).red()
    );
    println!("  {:<20} {}", "Not Applicable", style(summary.not_applicable).dim());
    println!("  {:<20} {}", "Total", summary.total());

    let findings = &results.detailed_findings;
    println!(
        "\n{} ({})",
        style("Findings").bold(),
        findings.len()
    );
    println!("{}", "-".repeat(60));

    if findings.is_empty() {
        println!("  {}", style("No gaps reported").green());
    }

    for finding in findings {
        println!(
            "  {} {} {}",
            severity_label(finding.severity),
            finding.criterion,
            style(format!("[{}]", finding.level)).dim()
        );
        if !finding.remarks.is_empty() {
            println!("           {}", truncate(&finding.remarks, 100));
        }
        if finding.ai_corrected {
            let original = finding.original_severity.map(|s| s.as_str()).unwrap_or("?");
            println!(
                "           {} {} → {} by {}: {}",
                style("↻").cyan(),
                original,
                finding.severity,
                finding.provider_used,
                style(truncate(&finding.correction_reason, 80)).dim()
            );
        }
    }

    let critical = findings
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .count();
    if critical > 0 {
        println!(
            "\n{} {} critical finding(s)",
            style("!").red().bold(),
            critical
        );
    }

    let ai = &results.ai_analysis_summary;
    println!("\n{}", style("AI analysis").bold());
    println!("{}", "-".repeat(60));
    println!(
        "  {:<16} {}",
        "Configured:",
        join_or_none(&ai.providers_configured)
    );
    println!("  {:<16} {}", "Used:", join_or_none(&ai.providers_used));
}

fn join_or_none(ids: &[String]) -> String {
    if ids.is_empty() {
        "none".to_string()
    } else {
        ids.join(", ")
    }
}
