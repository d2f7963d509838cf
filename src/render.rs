use std::path::{Path, PathBuf};

use anyhow::Result;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::{RangedCoordf64, RangedCoordu32};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::RGBColor;
use rayon::prelude::*;

use crate::layout::ChromosomeExtent;
use crate::scene::{self, PlotScene};
use crate::table::WideTable;

/// Alternating band palette, indexed by chromosome rank modulo 2.
const BAND_COLORS: [RGBColor; 2] = [RGBColor(86, 112, 171), RGBColor(133, 133, 133)];
/// Points above the threshold override their chromosome color with this.
const HIGHLIGHT_COLOR: RGBColor = RGBColor(214, 69, 65);
const LABEL_COLOR: RGBColor = RGBColor(64, 64, 64);

/// Build one scene per selected trait, in selection order. Scene
/// construction is pure and per-trait independent, so it runs on the rayon
/// pool; `collect` restores selection order regardless of completion order.
/// An unknown trait name fails the whole batch.
pub fn build_scenes(
    table: &WideTable,
    layout: &[ChromosomeExtent],
    traits: &[String],
    threshold: f64,
    highlight_labels: bool,
) -> crate::error::Result<Vec<PlotScene>> {
    traits
        .par_iter()
        .map(|t| scene::build_scene(table, layout, t, threshold, highlight_labels))
        .collect()
}

/// Export one PNG per scene into `out_dir`, named after the trait.
/// Artifacts come back in scene order.
pub fn render_separate(
    scenes: &[PlotScene],
    out_dir: &Path,
    width: u32,
    height: u32,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(scenes.len());
    for scene in scenes {
        let path = out_dir.join(format!("{}.png", sanitize_file_name(&scene.title)));
        render_scene(scene, &path, width, height)?;
        written.push(path);
    }
    Ok(written)
}

pub fn render_scene(scene: &PlotScene, output: &Path, width: u32, height: u32) -> Result<PathBuf> {
    let root = BitMapBackend::new(output, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_scene(&root, scene, scene.y_max)?;
    root.present()?;
    println!("[OK] Wrote {}", output.display());
    Ok(output.to_path_buf())
}

/// Export all scenes as one PNG split into a grid of sub-plots with a fixed
/// row count, filled row-major in scene order. Each facet is captioned with
/// its trait name; there is no overall title. Facets share the y bound so
/// panels are comparable.
pub fn render_faceted(
    scenes: &[PlotScene],
    output: &Path,
    width: u32,
    height: u32,
    facet_rows: usize,
) -> Result<PathBuf> {
    if scenes.is_empty() {
        anyhow::bail!("faceted export needs at least one scene");
    }
    let rows = facet_rows.max(1).min(scenes.len());
    let cols = scenes.len().div_ceil(rows);
    let shared_y = scenes.iter().map(|s| s.y_max).fold(f64::MIN, f64::max);

    let root = BitMapBackend::new(output, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((rows, cols));
    for (area, scene) in areas.iter().zip(scenes.iter()) {
        draw_scene(area, scene, shared_y)?;
    }
    root.present()?;
    println!("[OK] Wrote {}", output.display());
    Ok(output.to_path_buf())
}

fn draw_scene(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    scene: &PlotScene,
    y_roof: f64,
) -> Result<()> {
    // No leading x padding: the range starts flush at the first index.
    let x_min = scene.x_min;
    let x_max = scene.x_max.max(x_min + 1);
    let y_max = (y_roof * 1.08).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(&scene.title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Linkage Group")
        .y_desc("-log10(p)")
        .disable_x_mesh()
        .disable_y_mesh()
        .x_label_formatter(&|_| String::new())
        .draw()?;

    // Threshold line first (lowest layer), thin and dashed
    let thr = scene.threshold;
    if thr <= y_max {
        let seg = ((x_max - x_min) / 80).max(2);
        let mut x = x_min;
        while x < x_max {
            let x2 = x.saturating_add(seg).min(x_max);
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(x, thr), (x2, thr)],
                RED.stroke_width(1),
            )))?;
            x = x2 + seg;
        }
    }

    chart.draw_series(scene.points.iter().map(|p| {
        let color = BAND_COLORS[p.color_group % BAND_COLORS.len()];
        Circle::new((p.x, p.y.min(y_max)), 2, color.filled())
    }))?;

    chart.draw_series(
        scene
            .highlights
            .iter()
            .map(|p| Circle::new((p.x, p.y.min(y_max)), 3, HIGHLIGHT_COLOR.filled())),
    )?;

    // Chromosome tick labels drawn as in-plot text at the layout positions
    let label_y = (y_max * 0.03).min(y_max);
    for tick in &scene.ticks {
        let tx = (tick.position.round() as u32).clamp(x_min, x_max);
        chart.draw_series(std::iter::once(Text::new(
            tick.label.clone(),
            (tx, label_y),
            ("sans-serif", 24)
                .into_font()
                .color(&LABEL_COLOR)
                .pos(Pos::new(HPos::Center, VPos::Center)),
        )))?;
    }

    draw_repelled_labels(&mut chart, scene, x_min, x_max, y_max)?;

    Ok(())
}

/// Greedy deterministic label repel: each label starts one step above its
/// anchor and is pushed further up while it would sit on an already placed
/// label in the same x window. A connector segment keeps the true anchor
/// visible.
fn draw_repelled_labels(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordu32, RangedCoordf64>>,
    scene: &PlotScene,
    x_min: u32,
    x_max: u32,
    y_max: f64,
) -> Result<()> {
    if scene.labels.is_empty() {
        return Ok(());
    }
    let step = y_max * 0.04;
    let window = ((x_max - x_min) as f64 / 25.0).max(1.0);

    let mut ordered = scene.labels.clone();
    ordered.sort_by_key(|l| l.x);

    let mut placed: Vec<(f64, f64)> = Vec::with_capacity(ordered.len());
    for label in &ordered {
        let mut ly = (label.y + step).min(y_max * 0.97);
        for _ in 0..=placed.len() {
            let collides = placed
                .iter()
                .any(|(px, py)| (label.x as f64 - px).abs() < window && (ly - py).abs() < step);
            if !collides {
                break;
            }
            ly += step;
        }
        if ly > label.y + step * 0.5 {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(label.x, label.y), (label.x, ly - step * 0.3)],
                LABEL_COLOR.stroke_width(1),
            )))?;
        }
        chart.draw_series(std::iter::once(Text::new(
            label.text.clone(),
            (label.x, ly),
            ("sans-serif", 18)
                .into_font()
                .color(&LABEL_COLOR)
                .pos(Pos::new(HPos::Center, VPos::Bottom)),
        )))?;
        placed.push((label.x as f64, ly));
    }
    Ok(())
}

/// Trait names become file names in separate mode; strip path-hostile chars
fn sanitize_file_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '/' | '\\' | ' ' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => out.push('_'),
            _ => out.push(ch),
        }
    }
    if out.is_empty() {
        "trait".to_string()
    } else {
        out
    }
}
