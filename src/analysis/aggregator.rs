//! Per-gene location aggregation.
//!
//! This module fetches every accession of every gene, extracts its
//! subcellular locations and folds them into a [`GroupRecord`], handing
//! the record to a [`SnapshotSink`] after each gene.

use crate::extract::extract_subcellular_locations;
use crate::fetch::RecordSource;
use crate::models::{GeneGroup, GroupRecord, UnresolvedGroup};
use crate::store::SnapshotSink;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Options for an aggregation pass.
#[derive(Debug, Clone)]
pub struct AggregateOptions {
    /// Skip genes already present in the record (resume mode).
    pub skip_recorded: bool,
    /// Whether to show a progress bar.
    pub show_progress: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            skip_recorded: true,
            show_progress: false,
        }
    }
}

/// What an aggregation pass did.
#[derive(Debug, Clone, Default)]
pub struct AggregationOutcome {
    /// Genes fetched in this pass.
    pub fetched_groups: usize,
    /// Genes skipped because the record already had them.
    pub skipped_groups: usize,
    /// Accessions fetched in this pass.
    pub fetched_records: usize,
    /// Genes fetched in this pass that ended up with no location.
    pub unresolved: Vec<UnresolvedGroup>,
}

/// Fetch and fold every group into `record`, persisting after each group.
///
/// Fetches are strictly sequential. The first fetch or extraction error
/// aborts the pass; everything persisted up to that point stays on disk.
pub async fn aggregate_groups<S, P>(
    groups: &[GeneGroup],
    source: &S,
    record: &mut GroupRecord,
    sink: &mut P,
    options: &AggregateOptions,
) -> Result<AggregationOutcome>
where
    S: RecordSource,
    P: SnapshotSink,
{
    let mut outcome = AggregationOutcome::default();
    let progress = progress_bar(groups.len(), options.show_progress);

    for group in groups {
        progress.set_message(group.gene.clone());

        if options.skip_recorded && record.contains(&group.gene) {
            debug!("Skipping {} (already recorded)", group.gene);
            outcome.skipped_groups += 1;
            progress.inc(1);
            continue;
        }

        let locations = collect_group_locations(group, source).await?;
        outcome.fetched_records += group.members.len();
        outcome.fetched_groups += 1;

        record.merge(&group.gene, locations);

        if record.get(&group.gene).map_or(true, BTreeSet::is_empty) {
            progress.suspend(|| {
                warn!(
                    "No subcellular location found for {} (accessions: {})",
                    group.gene,
                    display_members(&group.members)
                )
            });
            outcome.unresolved.push(UnresolvedGroup {
                gene: group.gene.clone(),
                members: group.members.clone(),
            });
        }

        sink.persist(record)
            .with_context(|| format!("Failed to persist record after {}", group.gene))?;
        progress.inc(1);
    }

    progress.finish_and_clear();
    info!(
        "Aggregated {} genes ({} accessions), skipped {} already recorded",
        outcome.fetched_groups, outcome.fetched_records, outcome.skipped_groups
    );

    Ok(outcome)
}

/// Union of the locations of every member of a group.
pub async fn collect_group_locations<S>(group: &GeneGroup, source: &S) -> Result<BTreeSet<String>>
where
    S: RecordSource,
{
    let mut locations = BTreeSet::new();

    for accession in &group.members {
        let document = source
            .fetch(accession)
            .await
            .with_context(|| format!("Failed to fetch {} for gene {}", accession, group.gene))?;

        let found = extract_subcellular_locations(&document)
            .with_context(|| format!("Failed to read record {}", accession))?;
        debug!("{}: {} locations", accession, found.len());

        locations.extend(found);
    }

    Ok(locations)
}

/// Genes in the record with an empty location set, with their accessions
/// taken from `groups` where known.
pub fn unresolved_groups(record: &GroupRecord, groups: &[GeneGroup]) -> Vec<UnresolvedGroup> {
    record
        .empty_genes()
        .into_iter()
        .map(|gene| UnresolvedGroup {
            gene: gene.to_string(),
            members: groups
                .iter()
                .find(|g| g.gene == gene)
                .map(|g| g.members.clone())
                .unwrap_or_default(),
        })
        .collect()
}

fn display_members(members: &[String]) -> String {
    if members.is_empty() {
        "none".to_string()
    } else {
        members.join(", ")
    }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
