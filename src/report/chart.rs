//! Pie charts of the most frequent locations.

use crate::analysis::percentages;
use crate::models::RankedEntry;
use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::path::Path;
use tracing::debug;

const WIDTH: u32 = 900;
const HEIGHT: u32 = 600;
const RADIUS: f64 = 220.0;
const CENTER: (f64, f64) = (300.0, 320.0);

const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Render `entries` as an SVG pie chart with percentage labels.
///
/// Percentages are relative to the sum of the plotted entries.
pub fn render_pie_chart(entries: &[RankedEntry], title: &str, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;

    root.draw(&Text::new(
        title.to_string(),
        (WIDTH as i32 / 2, 30),
        ("sans-serif", 24)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))?;

    let shares = percentages(entries);
    if shares.iter().all(|s| *s == 0.0) {
        root.draw(&Text::new(
            "No data",
            (CENTER.0 as i32, CENTER.1 as i32),
            ("sans-serif", 20)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;
        root.present()?;
        return Ok(());
    }

    let mut start = -PI / 2.0;
    for (idx, (entry, share)) in entries.iter().zip(&shares).enumerate() {
        let sweep = share / 100.0 * 2.0 * PI;
        let color = PALETTE[idx % PALETTE.len()];

        root.draw(&Polygon::new(sector(start, sweep), color.filled()))?;

        let mid = start + sweep / 2.0;
        root.draw(&Text::new(
            format!("{:.1}%", share),
            point_at(mid, RADIUS * 0.65),
            ("sans-serif", 16)
                .into_font()
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))?;

        let legend_y = 120 + idx as i32 * 32;
        root.draw(&Rectangle::new(
            [(580, legend_y - 9), (598, legend_y + 9)],
            color.filled(),
        ))?;
        root.draw(&Text::new(
            format!("{} ({})", entry.location, entry.count),
            (610, legend_y),
            ("sans-serif", 15)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;

        start += sweep;
    }

    root.present()?;
    debug!("Chart written to {}", path.display());
    Ok(())
}

/// Polygon approximating the sector from `start` spanning `sweep` radians.
fn sector(start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep.to_degrees()).ceil() as usize).max(2);
    let mut points = Vec::with_capacity(steps + 2);
    points.push((CENTER.0 as i32, CENTER.1 as i32));
    for step in 0..=steps {
        let angle = start + sweep * step as f64 / steps as f64;
        points.push(point_at(angle, RADIUS));
    }
    points
}

fn point_at(angle: f64, radius: f64) -> (i32, i32) {
    (
        (CENTER.0 + radius * angle.cos()).round() as i32,
        (CENTER.1 + radius * angle.sin()).round() as i32,
    )
}
