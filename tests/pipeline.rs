//! End-to-end tests over the wrangling pipeline: CSV file -> wide table ->
//! layout + long form -> trait selection -> batch of plot scenes.

use std::io::Write;

use tempfile::NamedTempFile;

use mgwas_plotter::error::PlotError;
use mgwas_plotter::layout::build_layout;
use mgwas_plotter::rank::select_top_traits;
use mgwas_plotter::render::build_scenes;
use mgwas_plotter::table::{to_wide, WideTable};

/// Two chromosomes, four traits. Citrate peaks twice above 5 on adjacent
/// markers, so a naive raw top-2 cut would return a single distinct trait.
const TABLE: &str = "\
Index,Linkage_Group,Genetic_Distance,Citrate,Malate,Sucrose,Fumarate
1,1,0.0,9.0,1.2,0.4,2.0
2,1,3.5,8.5,1.0,,1.5
3,1,7.0,2.1,7.8,0.9,1.1
4,2,0.0,1.0,2.2,6.4,NA
5,2,2.5,0.5,1.9,1.3,3.3
6,2,5.0,1.8,,2.0,4.5
";

fn load() -> WideTable {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(TABLE.as_bytes()).unwrap();
    WideTable::from_path(f.path()).unwrap()
}

#[test]
fn table_loads_with_absent_cells() {
    let table = load();
    assert_eq!(table.markers.len(), 6);
    assert_eq!(
        table.trait_names,
        vec!["Citrate", "Malate", "Sucrose", "Fumarate"]
    );
    // Empty cell and NA both mean absent
    assert_eq!(table.score(1, 2), None);
    assert_eq!(table.score(3, 3), None);
}

#[test]
fn layout_partitions_the_index_range() {
    let table = load();
    let layout = build_layout(&table.markers);
    assert_eq!(layout.len(), 2);
    assert_eq!((layout[0].min_index, layout[0].max_index), (1, 3));
    assert_eq!((layout[1].min_index, layout[1].max_index), (4, 6));
    assert_eq!(layout[0].tick_position(), 2.0);
    assert_eq!(layout[1].tick_position(), 5.0);
}

#[test]
fn round_trip_recovers_the_table() {
    let table = load();
    assert_eq!(to_wide(&table.to_long()), table);
}

#[test]
fn selection_surfaces_distinct_traits_past_a_same_trait_run() {
    let table = load();
    let long = table.to_long();
    // Raw ranking starts Citrate(9.0), Citrate(8.5), Malate(7.8), ...
    let picked = select_top_traits(&long, 3).unwrap();
    assert_eq!(picked, vec!["Citrate", "Malate", "Sucrose"]);
}

#[test]
fn batch_scenes_are_total_and_ordered() {
    let table = load();
    let layout = build_layout(&table.markers);
    let picked = select_top_traits(&table.to_long(), 4).unwrap();
    let scenes = build_scenes(&table, &layout, &picked, 5.0, true).unwrap();
    assert_eq!(scenes.len(), picked.len());
    for (scene, name) in scenes.iter().zip(picked.iter()) {
        assert_eq!(&scene.title, name);
    }
    // Fumarate never crosses the threshold but still gets a full base scene
    let fumarate = scenes.iter().find(|s| s.title == "Fumarate").unwrap();
    assert_eq!(fumarate.points.len(), 5);
    assert!(fumarate.highlights.is_empty());
    assert!(fumarate.labels.is_empty());
    // Citrate is labeled at both peaks
    let citrate = scenes.iter().find(|s| s.title == "Citrate").unwrap();
    assert_eq!(citrate.highlights.len(), 2);
    assert_eq!(citrate.labels.len(), 2);
}

#[test]
fn oversized_selection_fails_before_any_scene_is_built() {
    let table = load();
    let err = select_top_traits(&table.to_long(), 5).unwrap_err();
    assert!(matches!(
        err,
        PlotError::InvalidSelectionSize {
            requested: 5,
            available: 4
        }
    ));
}
