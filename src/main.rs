//! LocScout - subcellular location survey of UniProt records
//!
//! A CLI tool that fetches UniProt entries for a table of genes,
//! collects the subcellular locations of each gene and reports how
//! often every location occurs.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (input, network, snapshot, report writing, etc.)
//!   2 - Genes without location found and --fail-on-empty set

mod analysis;
mod cli;
mod config;
mod extract;
mod fetch;
mod input;
mod models;
mod report;
mod store;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use fetch::{RecordSource, UniProtClient};
use models::{CountMode, GeneGroup, GroupRecord, RunMetadata, RunSummary};
use std::path::Path;
use std::time::Instant;
use store::JsonSnapshot;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("LocScout v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_survey(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Survey failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .locscout.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", config::CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to set the gene table layout, output directory and source URL.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete survey. Returns exit code (0 or 2).
async fn run_survey(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let layout = config.table_layout()?;
    let out_dir = config.output.directory.clone();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;
    let snapshot_path = config.snapshot_path();

    // Step 1: Read the gene table
    let groups: Vec<GeneGroup> = if args.report_only && !config.input.path.is_file() {
        warn!(
            "Gene table {} not found; accessions of empty genes will not be listed",
            config.input.path.display()
        );
        Vec::new()
    } else {
        println!("📄 Reading genes: {}", config.input.path.display());
        input::read_gene_groups(&config.input.path, &layout)?
    };
    info!("{} genes in input", groups.len());

    // Step 2: Start from the snapshot or from scratch
    let mut record = if args.resume || args.report_only {
        match store::load_snapshot(&snapshot_path)? {
            Some(record) => {
                println!(
                    "📂 Loaded snapshot with {} genes: {}",
                    record.len(),
                    snapshot_path.display()
                );
                record
            }
            None if args.report_only => {
                anyhow::bail!("No snapshot to report from at {}", snapshot_path.display());
            }
            None => {
                info!("No snapshot at {}, starting fresh", snapshot_path.display());
                GroupRecord::new()
            }
        }
    } else {
        if snapshot_path.exists() {
            warn!(
                "Overwriting existing snapshot {} (use --resume to continue it)",
                snapshot_path.display()
            );
        }
        GroupRecord::new()
    };

    // Step 3: Fetch and aggregate
    let (source, fetched, resumed) = if args.report_only {
        (config.source.url_template.clone(), 0, record.len())
    } else {
        let client = UniProtClient::new(config.client_config())?;
        println!("\n🔬 Fetching records from {}", client.describe());
        let mut sink = JsonSnapshot::new(&snapshot_path);
        let options = analysis::AggregateOptions {
            skip_recorded: args.resume,
            show_progress: !args.quiet,
        };
        let outcome =
            analysis::aggregate_groups(&groups, &client, &mut record, &mut sink, &options).await?;
        if sink.writes() > 0 {
            println!("💾 Snapshot saved to: {}", snapshot_path.display());
        }
        if !outcome.unresolved.is_empty() {
            println!(
                "⚠️  {} genes fetched in this pass have no location",
                outcome.unresolved.len()
            );
        }
        (client.describe(), outcome.fetched_groups, outcome.skipped_groups)
    };

    if record.is_empty() {
        warn!("No genes recorded; reports will be empty");
    }

    // Step 4: Unresolved genes
    let unresolved = analysis::unresolved_groups(&record, &groups);
    let unresolved_path = out_dir.join("empty_groups.txt");
    report::write_unresolved(&unresolved, &unresolved_path)?;
    if !unresolved.is_empty() {
        warn!("{} genes without any subcellular location", unresolved.len());
    }
    println!("📝 Genes without location written to: {}", unresolved_path.display());

    // Step 5: Ranked tables and charts
    let top = config.report.top_n;
    let mut tables = Vec::with_capacity(CountMode::ALL.len());
    for mode in CountMode::ALL {
        let table = analysis::ranked_table(&record, mode);

        let csv_path = out_dir.join(format!("ranked_{}.csv", mode.file_suffix()));
        report::write_ranked_csv(&table.entries, &csv_path)?;
        println!("📊 {} table written to: {}", mode, csv_path.display());

        let chart_path = out_dir.join(format!("top{}_{}.svg", top, mode.file_suffix()));
        let title = format!("Top {} locations ({})", top, mode.to_string().to_lowercase());
        report::render_pie_chart(analysis::top_n(&table.entries, top), &title, &chart_path)
            .with_context(|| format!("Failed to render chart {}", chart_path.display()))?;
        println!("🥧 Chart written to: {}", chart_path.display());

        tables.push(table);
    }

    // Step 6: Summary
    let duration = start_time.elapsed().as_secs_f64();
    let summary = RunSummary {
        metadata: RunMetadata {
            input: config.input.path.display().to_string(),
            generated_at: Utc::now(),
            source,
            groups_total: record.len(),
            groups_fetched: fetched,
            groups_resumed: resumed,
            groups_unresolved: unresolved.len(),
            distinct_locations: record.distinct_locations(),
            duration_seconds: duration,
        },
        tables,
        unresolved,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&summary)?,
        OutputFormat::Markdown => report::generate_markdown_report(&summary, top),
    };
    let summary_path = out_dir.join(format!("summary.{}", args.format.extension()));
    std::fs::write(&summary_path, &output)
        .with_context(|| format!("Failed to write summary to {}", summary_path.display()))?;

    println!("\n📋 Survey Summary:");
    println!("   Genes: {}", summary.metadata.groups_total);
    println!(
        "   Fetched: {} | Reused: {} | Without location: {}",
        fetched, resumed, summary.metadata.groups_unresolved
    );
    println!("   Distinct locations: {}", summary.metadata.distinct_locations);
    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Survey complete! Summary saved to: {}", summary_path.display());

    if args.fail_on_empty && !summary.unresolved.is_empty() {
        eprintln!(
            "\n⛔ {} genes have no location. Failing (exit code 2).",
            summary.unresolved.len()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_report_only_does_not_build_client() {
        let temp_dir = TempDir::new().unwrap();
        let out_dir = temp_dir.path().join("out");
        let mut record = GroupRecord::new();
        record.merge("GENE1", ["Membrane"]);
        record.touch("GENE2");
        store::snapshot::write_snapshot(&out_dir.join("locations.json"), &record).unwrap();

        // A template without the placeholder would be rejected by the client.
        let args = Args::parse_from([
            "locscout",
            "--report-only",
            "--quiet",
            "--format",
            "json",
            "--input",
            temp_dir.path().join("absent.csv").to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
            "--url-template",
            "https://example.org/records",
        ]);

        let exit_code = run_survey(args).await.unwrap();
        assert_eq!(exit_code, 0);

        let summary: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(out_dir.join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary.metadata.source, "https://example.org/records");
        assert_eq!(summary.metadata.groups_fetched, 0);
        assert_eq!(summary.metadata.groups_resumed, 2);
        assert_eq!(summary.unresolved.len(), 1);
    }
}
