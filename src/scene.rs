use std::collections::HashMap;

use crate::error::Result;
use crate::layout::ChromosomeExtent;
use crate::table::WideTable;

/// Significance cutoff in -log10(p) units used when the caller gives none.
pub const DEFAULT_THRESHOLD: f64 = 5.0;

/// One plotted marker. `color_group` is the chromosome's rank in natural
/// chromosome order; the renderer maps it through an alternating two-color
/// palette (`rank % 2`), so chromosomes 1 and 3 share a color, 2 and 4 the
/// other. Keying by rank, not by label value, is what produces the banding.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMark {
    pub x: u32,
    pub y: f64,
    pub color_group: usize,
}

/// Text anchored at a highlighted point. The renderer may displace the
/// label to avoid overlap as long as a connector still indicates the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMark {
    pub x: u32,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// Declarative, renderer-agnostic description of one Manhattan plot.
/// Built fresh per trait, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotScene {
    pub title: String,
    pub points: Vec<PointMark>,
    /// Subset of `points` with score > threshold, drawn on top in the
    /// highlight color (overriding the chromosome color).
    pub highlights: Vec<PointMark>,
    pub labels: Vec<LabelMark>,
    pub threshold: f64,
    pub ticks: Vec<AxisTick>,
    pub x_min: u32,
    pub x_max: u32,
    pub y_max: f64,
}

/// Build the scene for one trait column.
///
/// Absent scores are excluded, not plotted as zero. A trait with nothing
/// above the threshold still yields a valid scene with empty highlight and
/// label sets. Fails with `UnknownTraitName` if `trait_name` is not a
/// column of the table.
pub fn build_scene(
    table: &WideTable,
    layout: &[ChromosomeExtent],
    trait_name: &str,
    threshold: f64,
    highlight_labels: bool,
) -> Result<PlotScene> {
    let trait_col = table.trait_index(trait_name)?;

    let rank: HashMap<&str, usize> = layout
        .iter()
        .enumerate()
        .map(|(i, e)| (e.chromosome.as_str(), i))
        .collect();

    let mut points = Vec::new();
    let mut highlights = Vec::new();
    let mut labels = Vec::new();
    let mut y_max = threshold;
    for (marker, score) in table.trait_scores(trait_col) {
        let mark = PointMark {
            x: marker.index,
            y: score,
            color_group: rank.get(marker.chromosome.as_str()).copied().unwrap_or(0),
        };
        if score > y_max {
            y_max = score;
        }
        if score > threshold {
            highlights.push(mark.clone());
            if highlight_labels {
                labels.push(LabelMark {
                    x: marker.index,
                    y: score,
                    text: marker.index.to_string(),
                });
            }
        }
        points.push(mark);
    }

    let ticks = layout
        .iter()
        .map(|e| AxisTick {
            position: e.tick_position(),
            label: e.chromosome.clone(),
        })
        .collect();

    // Flush at the first chromosome, no leading padding.
    let x_min = layout.iter().map(|e| e.min_index).min().unwrap_or(0);
    let x_max = layout.iter().map(|e| e.max_index).max().unwrap_or(0);

    Ok(PlotScene {
        title: trait_name.to_string(),
        points,
        highlights,
        labels,
        threshold,
        ticks,
        x_min,
        x_max,
        y_max,
    })
}
