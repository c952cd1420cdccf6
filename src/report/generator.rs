//! Summary report generation.
//!
//! This module renders the run summary as Markdown or JSON.

use crate::analysis::{percentages, top_n};
use crate::models::{RankedTable, RunMetadata, RunSummary, UnresolvedGroup};
use anyhow::Result;

/// Generate a complete Markdown summary.
pub fn generate_markdown_report(summary: &RunSummary, top: usize) -> String {
    let mut output = String::new();

    output.push_str("# Subcellular Location Survey\n\n");
    output.push_str(&generate_metadata_section(&summary.metadata));

    for table in &summary.tables {
        output.push_str(&generate_table_section(table, top));
    }

    output.push_str(&generate_unresolved_section(&summary.unresolved));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Run\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.input));
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Genes:** {}\n", metadata.groups_total));
    section.push_str(&format!(
        "- **Fetched this run:** {}\n",
        metadata.groups_fetched
    ));
    if metadata.groups_resumed > 0 {
        section.push_str(&format!(
            "- **Reused from snapshot:** {}\n",
            metadata.groups_resumed
        ));
    }
    section.push_str(&format!(
        "- **Without location:** {}\n",
        metadata.groups_unresolved
    ));
    section.push_str(&format!(
        "- **Distinct locations:** {}\n",
        metadata.distinct_locations
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the section for one ranked table.
fn generate_table_section(table: &RankedTable, top: usize) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", table.mode));

    if table.entries.is_empty() {
        section.push_str("No locations counted.\n\n");
        return section;
    }

    section.push_str(&format!(
        "{} locations, {} counts in total.\n\n",
        table.entries.len(),
        table.total
    ));

    let shown = top_n(&table.entries, top);
    let shares = percentages(shown);

    section.push_str("| # | Location | Genes | Share of top |\n");
    section.push_str("|---:|:---|---:|---:|\n");
    for (rank, (entry, share)) in shown.iter().zip(shares).enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {:.1}% |\n",
            rank + 1,
            entry.location.replace('|', "\\|"),
            entry.count,
            share
        ));
    }
    section.push('\n');

    section
}

/// Generate the unresolved genes section.
fn generate_unresolved_section(unresolved: &[UnresolvedGroup]) -> String {
    let mut section = String::new();

    section.push_str("## Genes Without Location\n\n");

    if unresolved.is_empty() {
        section.push_str("Every gene has at least one location.\n\n");
        return section;
    }

    for group in unresolved {
        let members = if group.members.is_empty() {
            "no accessions".to_string()
        } else {
            group.members.join(", ")
        };
        section.push_str(&format!("- **{}**: {}\n", group.gene, members));
    }
    section.push('\n');

    section
}

fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by locscout {}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON summary.
pub fn generate_json_report(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}
