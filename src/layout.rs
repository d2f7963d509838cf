use std::cmp::Ordering;
use std::collections::HashMap;

use crate::table::Marker;

/// Derived index span of one chromosome along the shared x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ChromosomeExtent {
    pub chromosome: String,
    pub min_index: u32,
    pub max_index: u32,
}

impl ChromosomeExtent {
    /// Half-span of the extent, `(max - min) / 2`.
    pub fn center(&self) -> f64 {
        (self.max_index - self.min_index) as f64 / 2.0
    }

    /// Axis tick for the chromosome label: `center + min`. The rightward
    /// offset by the group minimum is the convention the alternating color
    /// bands are aligned against, so it must not be "simplified".
    pub fn tick_position(&self) -> f64 {
        self.min_index as f64 + self.center()
    }
}

/// Order chromosome labels the way the input means them: numeric labels
/// numerically ("2" before "10"), everything else lexically after the
/// numeric block.
pub fn chromosome_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Group markers by chromosome and compute per-chromosome index extents,
/// returned in natural chromosome order. Pure function of the input.
///
/// Markers sharing a chromosome are expected to occupy a contiguous index
/// range (input pre-sorted by chromosome then position). Interleaved input
/// is not detected; it yields misleading tick placement, not an error.
pub fn build_layout(markers: &[Marker]) -> Vec<ChromosomeExtent> {
    let mut spans: HashMap<&str, (u32, u32)> = HashMap::new();
    for m in markers {
        spans
            .entry(m.chromosome.as_str())
            .and_modify(|(lo, hi)| {
                if m.index < *lo {
                    *lo = m.index;
                }
                if m.index > *hi {
                    *hi = m.index;
                }
            })
            .or_insert((m.index, m.index));
    }

    let mut extents: Vec<ChromosomeExtent> = spans
        .into_iter()
        .map(|(chromosome, (min_index, max_index))| ChromosomeExtent {
            chromosome: chromosome.to_string(),
            min_index,
            max_index,
        })
        .collect();
    extents.sort_by(|a, b| chromosome_cmp(&a.chromosome, &b.chromosome));
    extents
}
