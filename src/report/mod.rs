//! Report outputs: ranked CSV tables, pie charts and the run summary.

pub mod chart;
pub mod export;
pub mod generator;

pub use chart::render_pie_chart;
pub use export::{write_ranked_csv, write_unresolved};
pub use generator::{generate_json_report, generate_markdown_report};
