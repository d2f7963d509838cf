use std::io::Read;
use std::path::Path;

use crate::error::{PlotError, Result};

/// Required metadata columns, in order, at the front of the wide table.
/// Everything after them is a trait score column.
pub const META_COLUMNS: [&str; 3] = ["Index", "Linkage_Group", "Genetic_Distance"];

/// One genetic marker: the metadata slice of a wide-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Unique ordinal identifier, assigned in input row order. Doubles as
    /// the raw x coordinate before chromosome layout.
    pub index: u32,
    /// Linkage group / chromosome label (categorical, e.g. "1".."20").
    pub chromosome: String,
    /// Position within the chromosome, in map units.
    pub genetic_distance: f64,
}

/// Wide GWAS result table: one row per marker, one score column per trait.
/// An absent cell is `None`, which is distinct from a score of 0.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    pub markers: Vec<Marker>,
    pub trait_names: Vec<String>,
    scores: Vec<Vec<Option<f64>>>,
}

/// One (marker, trait) pair with a recorded score; the long form of the
/// table. Regenerated on every reshape, no persistent identity.
#[derive(Debug, Clone, PartialEq)]
pub struct LongObservation {
    pub marker_index: u32,
    pub chromosome: String,
    pub genetic_distance: f64,
    pub trait_name: String,
    pub score: f64,
}

fn is_absent(cell: &str) -> bool {
    let t = cell.trim();
    t.is_empty() || t.eq_ignore_ascii_case("na")
}

impl WideTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let rdr = csv::Reader::from_path(path)?;
        Self::from_csv(rdr)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut rdr: csv::Reader<R>) -> Result<Self> {
        let headers = rdr.headers()?.clone();
        if headers.len() < META_COLUMNS.len() {
            return Err(PlotError::MalformedInput {
                reason: format!(
                    "expected at least {} columns ({}), found {}",
                    META_COLUMNS.len(),
                    META_COLUMNS.join(", "),
                    headers.len()
                ),
                row: 1,
                column: String::new(),
            });
        }
        for (i, want) in META_COLUMNS.iter().enumerate() {
            let got = headers.get(i).unwrap_or("").trim();
            if got != *want {
                return Err(PlotError::MalformedInput {
                    reason: format!("metadata column {} must be '{}', found '{}'", i + 1, want, got),
                    row: 1,
                    column: got.to_string(),
                });
            }
        }
        let trait_names: Vec<String> = headers
            .iter()
            .skip(META_COLUMNS.len())
            .map(|h| h.trim().to_string())
            .collect();

        let mut markers = Vec::new();
        let mut scores = Vec::new();
        for (row_no, record) in rdr.records().enumerate() {
            let record = record?;
            // 1-based data row for error context, header excluded
            let row = row_no + 1;
            let index = parse_cell::<u32>(&record, 0, row, META_COLUMNS[0])?;
            let chromosome = record.get(1).unwrap_or("").trim().to_string();
            if chromosome.is_empty() {
                return Err(PlotError::MalformedInput {
                    reason: "empty chromosome label".to_string(),
                    row,
                    column: META_COLUMNS[1].to_string(),
                });
            }
            let genetic_distance = parse_cell::<f64>(&record, 2, row, META_COLUMNS[2])?;
            markers.push(Marker {
                index,
                chromosome,
                genetic_distance,
            });

            let mut row_scores = Vec::with_capacity(trait_names.len());
            for (col, name) in trait_names.iter().enumerate() {
                let cell = record.get(META_COLUMNS.len() + col).unwrap_or("");
                if is_absent(cell) {
                    row_scores.push(None);
                } else {
                    let score: f64 = cell.trim().parse().map_err(|_| PlotError::MalformedInput {
                        reason: format!("non-numeric score '{}'", cell.trim()),
                        row,
                        column: name.clone(),
                    })?;
                    row_scores.push(Some(score));
                }
            }
            scores.push(row_scores);
        }

        Ok(WideTable {
            markers,
            trait_names,
            scores,
        })
    }

    /// Column accessor lookup against the validated schema. The trait column
    /// to plot is chosen by name at call time; a name that is not a column
    /// fails here instead of producing an empty series downstream.
    pub fn trait_index(&self, name: &str) -> Result<usize> {
        self.trait_names
            .iter()
            .position(|t| t == name)
            .ok_or_else(|| PlotError::UnknownTraitName(name.to_string()))
    }

    pub fn score(&self, row: usize, trait_col: usize) -> Option<f64> {
        self.scores[row][trait_col]
    }

    /// All recorded (marker, score) pairs for one trait column, in row order.
    /// Absent cells are skipped, not reported as zero.
    pub fn trait_scores(&self, trait_col: usize) -> impl Iterator<Item = (&Marker, f64)> {
        self.markers
            .iter()
            .zip(self.scores.iter())
            .filter_map(move |(m, row)| row[trait_col].map(|s| (m, s)))
    }

    /// Flatten to long form. Row order is preserved, and within a row the
    /// observations follow the original column order; the ranker relies on
    /// this for deterministic tie-breaking.
    pub fn to_long(&self) -> Vec<LongObservation> {
        let mut out = Vec::new();
        for (marker, row) in self.markers.iter().zip(self.scores.iter()) {
            for (col, cell) in row.iter().enumerate() {
                if let Some(score) = *cell {
                    out.push(LongObservation {
                        marker_index: marker.index,
                        chromosome: marker.chromosome.clone(),
                        genetic_distance: marker.genetic_distance,
                        trait_name: self.trait_names[col].clone(),
                        score,
                    });
                }
            }
        }
        out
    }
}

/// Structural inverse of `to_long`: rebuild a wide table from observations.
/// Markers and traits are laid out in first-appearance order; cells with no
/// observation stay absent.
pub fn to_wide(observations: &[LongObservation]) -> WideTable {
    let mut markers: Vec<Marker> = Vec::new();
    let mut marker_rows: std::collections::HashMap<u32, usize> = std::collections::HashMap::new();
    let mut trait_names: Vec<String> = Vec::new();
    let mut trait_cols: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for obs in observations {
        if !marker_rows.contains_key(&obs.marker_index) {
            marker_rows.insert(obs.marker_index, markers.len());
            markers.push(Marker {
                index: obs.marker_index,
                chromosome: obs.chromosome.clone(),
                genetic_distance: obs.genetic_distance,
            });
        }
        if !trait_cols.contains_key(&obs.trait_name) {
            trait_cols.insert(obs.trait_name.clone(), trait_names.len());
            trait_names.push(obs.trait_name.clone());
        }
    }

    let mut scores = vec![vec![None; trait_names.len()]; markers.len()];
    for obs in observations {
        let row = marker_rows[&obs.marker_index];
        let col = trait_cols[&obs.trait_name];
        scores[row][col] = Some(obs.score);
    }

    WideTable {
        markers,
        trait_names,
        scores,
    }
}

fn parse_cell<T: std::str::FromStr>(
    record: &csv::StringRecord,
    col: usize,
    row: usize,
    column: &str,
) -> Result<T> {
    let cell = record.get(col).unwrap_or("").trim();
    cell.parse().map_err(|_| PlotError::MalformedInput {
        reason: format!("cannot parse '{}'", cell),
        row,
        column: column.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Index,Linkage_Group,Genetic_Distance,A,B
1,1,0.0,3,9
2,1,5.5,8,8.5
3,2,1.0,,2.5
";

    fn sample_table() -> WideTable {
        WideTable::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn parses_markers_and_traits() {
        let t = sample_table();
        assert_eq!(t.trait_names, vec!["A", "B"]);
        assert_eq!(t.markers.len(), 3);
        assert_eq!(t.markers[1].index, 2);
        assert_eq!(t.markers[2].chromosome, "2");
        assert_eq!(t.score(1, 1), Some(8.5));
    }

    #[test]
    fn absent_cells_are_none_not_zero() {
        let t = sample_table();
        assert_eq!(t.score(2, 0), None);
        let a = t.trait_index("A").unwrap();
        let recorded: Vec<f64> = t.trait_scores(a).map(|(_, s)| s).collect();
        assert_eq!(recorded, vec![3.0, 8.0]);
    }

    #[test]
    fn rejects_misnamed_metadata_column() {
        let bad = "Idx,Linkage_Group,Genetic_Distance,A\n1,1,0.0,3\n";
        match WideTable::from_reader(bad.as_bytes()) {
            Err(PlotError::MalformedInput { row, .. }) => assert_eq!(row, 1),
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn rejects_non_numeric_score() {
        let bad = "Index,Linkage_Group,Genetic_Distance,A\n1,1,0.0,oops\n";
        match WideTable::from_reader(bad.as_bytes()) {
            Err(PlotError::MalformedInput { row, column, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "A");
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn unknown_trait_name_is_an_error() {
        let t = sample_table();
        assert!(matches!(
            t.trait_index("Z"),
            Err(PlotError::UnknownTraitName(_))
        ));
    }

    #[test]
    fn to_long_preserves_row_then_column_order() {
        let t = sample_table();
        let long = t.to_long();
        let keys: Vec<(u32, &str)> = long
            .iter()
            .map(|o| (o.marker_index, o.trait_name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![(1, "A"), (1, "B"), (2, "A"), (2, "B"), (3, "B")]
        );
    }

    #[test]
    fn reshape_round_trip() {
        let t = sample_table();
        let back = to_wide(&t.to_long());
        assert_eq!(back, t);
    }
}
