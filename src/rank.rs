use std::collections::HashSet;

use crate::error::{PlotError, Result};
use crate::table::LongObservation;

/// Pick the top `n` *distinct* traits by best single score.
///
/// Observations are ranked by descending score with a stable sort, so ties
/// fall back to the original row-then-column order of the table. The sorted
/// sequence is then scanned and deduplicated by trait name until `n`
/// distinct names are collected; a run of top rows sharing one trait never
/// shortens the selection, regardless of the run length. Returned traits
/// are ordered by their best (first-encountered) score.
pub fn select_top_traits(observations: &[LongObservation], n: usize) -> Result<Vec<String>> {
    let distinct: HashSet<&str> = observations.iter().map(|o| o.trait_name.as_str()).collect();
    if n == 0 || n > distinct.len() {
        return Err(PlotError::InvalidSelectionSize {
            requested: n,
            available: distinct.len(),
        });
    }

    let mut ranked: Vec<&LongObservation> = observations.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut selected: Vec<String> = Vec::with_capacity(n);
    let mut seen: HashSet<&str> = HashSet::with_capacity(n);
    for obs in ranked {
        if seen.insert(obs.trait_name.as_str()) {
            selected.push(obs.trait_name.clone());
            if selected.len() == n {
                break;
            }
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(marker_index: u32, trait_name: &str, score: f64) -> LongObservation {
        LongObservation {
            marker_index,
            chromosome: "1".to_string(),
            genetic_distance: marker_index as f64,
            trait_name: trait_name.to_string(),
            score,
        }
    }

    #[test]
    fn top_one_is_best_scoring_trait() {
        let data = vec![obs(1, "A", 3.0), obs(1, "B", 9.0), obs(2, "A", 8.0)];
        assert_eq!(select_top_traits(&data, 1).unwrap(), vec!["B"]);
    }

    #[test]
    fn two_distinct_traits_in_top_rows_need_no_extension() {
        let data = vec![
            obs(1, "A", 3.0),
            obs(1, "B", 9.0),
            obs(2, "A", 8.0),
            obs(2, "B", 2.0),
        ];
        assert_eq!(select_top_traits(&data, 2).unwrap(), vec!["B", "A"]);
    }

    #[test]
    fn same_trait_on_adjacent_markers_extends_the_cut() {
        // Raw top-2 rows are both trait B; the scan keeps going until a
        // second distinct trait surfaces.
        let data = vec![
            obs(1, "B", 9.0),
            obs(1, "A", 3.0),
            obs(2, "B", 8.5),
            obs(2, "A", 2.0),
        ];
        assert_eq!(select_top_traits(&data, 2).unwrap(), vec!["B", "A"]);
    }

    #[test]
    fn long_same_trait_runs_are_skipped_entirely() {
        let mut data: Vec<LongObservation> =
            (0..5).map(|i| obs(i, "B", 9.0 - i as f64 * 0.1)).collect();
        data.push(obs(10, "A", 4.0));
        data.push(obs(11, "C", 3.0));
        assert_eq!(select_top_traits(&data, 3).unwrap(), vec!["B", "A", "C"]);
    }

    #[test]
    fn best_scores_are_non_increasing() {
        let data = vec![
            obs(1, "A", 5.0),
            obs(2, "B", 7.0),
            obs(3, "C", 6.0),
            obs(4, "A", 6.5),
        ];
        let picked = select_top_traits(&data, 3).unwrap();
        let best = |t: &str| {
            data.iter()
                .filter(|o| o.trait_name == t)
                .map(|o| o.score)
                .fold(f64::MIN, f64::max)
        };
        let scores: Vec<f64> = picked.iter().map(|t| best(t)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(picked, vec!["B", "A", "C"]);
    }

    #[test]
    fn ties_break_by_original_order() {
        let data = vec![obs(1, "A", 5.0), obs(1, "B", 5.0)];
        assert_eq!(select_top_traits(&data, 2).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn rejects_zero_and_oversized_requests() {
        let data = vec![obs(1, "A", 1.0), obs(2, "B", 2.0)];
        assert!(matches!(
            select_top_traits(&data, 0),
            Err(PlotError::InvalidSelectionSize { requested: 0, available: 2 })
        ));
        assert!(matches!(
            select_top_traits(&data, 3),
            Err(PlotError::InvalidSelectionSize { requested: 3, available: 2 })
        ));
    }
}
