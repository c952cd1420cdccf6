//! Gene table reader.
//!
//! Reads the delimited table that maps each gene to its protein
//! accessions, applies the configured row slice and merges repeated
//! genes into a single group.

use crate::models::GeneGroup;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while reading the gene table.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open gene table {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("gene table has no column named '{0}'")]
    MissingColumn(String),

    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: missing value for column '{column}'")]
    MissingCell { row: usize, column: String },
}

/// Layout of the gene table.
#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Field delimiter.
    pub delimiter: u8,
    /// Header of the gene column.
    pub gene_column: String,
    /// Header of the accession list column.
    pub members_column: String,
    /// Separator between accessions inside one cell.
    pub member_separator: char,
    /// First data row to read (1-based, header excluded).
    pub first_row: usize,
    /// Maximum number of data rows to read.
    pub max_rows: Option<usize>,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            delimiter: b',',
            gene_column: "gene".to_string(),
            members_column: "accessions".to_string(),
            member_separator: ';',
            first_row: 1,
            max_rows: None,
        }
    }
}

/// Read gene groups from a file.
pub fn read_gene_groups(path: &Path, layout: &TableLayout) -> Result<Vec<GeneGroup>, InputError> {
    debug!("Reading gene table: {}", path.display());
    let file = std::fs::File::open(path).map_err(|e| InputError::Open {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    parse_gene_groups(file, layout)
}

/// Parse gene groups from any reader.
///
/// Repeated genes are merged (accessions unioned, first-seen order kept)
/// and appear at the position of their first row. Rows with a blank gene
/// are skipped.
pub fn parse_gene_groups<R: Read>(
    reader: R,
    layout: &TableLayout,
) -> Result<Vec<GeneGroup>, InputError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(layout.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| InputError::Row { row: 0, source })?
        .clone();
    let gene_idx = column_index(&headers, &layout.gene_column)?;
    let members_idx = column_index(&headers, &layout.members_column)?;

    let mut groups: Vec<GeneGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    let skip = layout.first_row.saturating_sub(1);
    let take = layout.max_rows.unwrap_or(usize::MAX);

    for (idx, record) in csv_reader.records().enumerate().skip(skip).take(take) {
        let row = idx + 1;
        let record = record.map_err(|source| InputError::Row { row, source })?;

        let gene = record.get(gene_idx).ok_or_else(|| InputError::MissingCell {
            row,
            column: layout.gene_column.clone(),
        })?;
        if gene.is_empty() {
            warn!("Row {} has no gene, skipping", row);
            continue;
        }

        let members_cell = record
            .get(members_idx)
            .ok_or_else(|| InputError::MissingCell {
                row,
                column: layout.members_column.clone(),
            })?;
        let members = split_members(members_cell, layout.member_separator);

        match positions.get(gene) {
            Some(&pos) => {
                debug!("Gene {} repeated at row {}, merging", gene, row);
                groups[pos].add_members(members);
            }
            None => {
                positions.insert(gene.to_string(), groups.len());
                groups.push(GeneGroup::new(gene, members));
            }
        }
    }

    debug!("Read {} gene groups", groups.len());
    Ok(groups)
}

/// Split an accession cell into trimmed, non-empty accessions.
pub fn split_members(cell: &str, separator: char) -> Vec<String> {
    cell.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| InputError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = include_str!("../../fixtures/genes.csv");

    #[test]
    fn test_parse_fixture() {
        let groups = parse_gene_groups(TABLE.as_bytes(), &TableLayout::default()).unwrap();

        let genes: Vec<_> = groups.iter().map(|g| g.gene.as_str()).collect();
        assert_eq!(genes, vec!["NCL", "TP53", "EGFR", "ORPHAN1"]);
        assert_eq!(groups[1].members, vec!["P04637", "Q53GA5"]);
        assert!(groups[3].members.is_empty());
    }

    #[test]
    fn test_repeated_gene_is_merged() {
        let table = "gene,accessions\nA,P1;P2\nB,P3\nA,P2;P4\n";
        let groups = parse_gene_groups(table.as_bytes(), &TableLayout::default()).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].gene, "A");
        assert_eq!(groups[0].members, vec!["P1", "P2", "P4"]);
    }

    #[test]
    fn test_row_slice() {
        let table = "gene,accessions\nA,P1\nB,P2\nC,P3\nD,P4\n";
        let layout = TableLayout {
            first_row: 2,
            max_rows: Some(2),
            ..TableLayout::default()
        };
        let groups = parse_gene_groups(table.as_bytes(), &layout).unwrap();

        let genes: Vec<_> = groups.iter().map(|g| g.gene.as_str()).collect();
        assert_eq!(genes, vec!["B", "C"]);
    }

    #[test]
    fn test_custom_layout() {
        let table = "Accession list\tGene Name\nQ1 ; Q2;\tXYZ\n";
        let layout = TableLayout {
            delimiter: b'\t',
            gene_column: "gene name".to_string(),
            members_column: "Accession list".to_string(),
            ..TableLayout::default()
        };
        let groups = parse_gene_groups(table.as_bytes(), &layout).unwrap();
        assert_eq!(groups, vec![GeneGroup::new("XYZ", ["Q1", "Q2"])]);
    }

    #[test]
    fn test_missing_column() {
        let table = "symbol,accessions\nA,P1\n";
        let err = parse_gene_groups(table.as_bytes(), &TableLayout::default()).unwrap_err();
        assert!(matches!(err, InputError::MissingColumn(ref c) if c == "gene"));
    }

    #[test]
    fn test_short_row_reports_row_number() {
        let table = "gene,accessions\nA,P1\nB\n";
        let err = parse_gene_groups(table.as_bytes(), &TableLayout::default()).unwrap_err();
        assert!(matches!(err, InputError::MissingCell { row: 2, .. }));
    }

    #[test]
    fn test_blank_gene_skipped() {
        let table = "gene,accessions\n,P1\nB,P2\n";
        let groups = parse_gene_groups(table.as_bytes(), &TableLayout::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].gene, "B");
    }
}
