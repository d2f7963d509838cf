use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Arg, Command, value_parser};

use mgwas_plotter::layout::build_layout;
use mgwas_plotter::rank::select_top_traits;
use mgwas_plotter::render;
use mgwas_plotter::scene::{self, DEFAULT_THRESHOLD};
use mgwas_plotter::table::WideTable;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("[ERROR] {e:?}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let app = Command::new("mgwas-plotter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manhattan plots from wide mGWAS result tables")
        .subcommand(
            Command::new("man")
                .about("Manhattan plot for a single trait column")
                .alias("manhattan")
                .arg(
                    Arg::new("input")
                        .help("Wide GWAS CSV (Index, Linkage_Group, Genetic_Distance, traits...)")
                        .short('i')
                        .long("input")
                        .required(true)
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("trait")
                        .help("Trait column to plot")
                        .short('t')
                        .long("trait")
                        .required(true)
                        .value_name("NAME"),
                )
                .arg(
                    Arg::new("output")
                        .help("Output PNG path. If omitted, <input_dir>/<stem>_<trait>.png")
                        .short('o')
                        .long("output")
                        .required(false)
                        .value_name("PNG"),
                )
                .arg(
                    Arg::new("thresh")
                        .help("Significance threshold in -log10(p) units (default 5)")
                        .long("thresh")
                        .required(false)
                        .value_parser(value_parser!(f64))
                        .value_name("FLOAT"),
                )
                .arg(
                    Arg::new("labels")
                        .help("Label points above the threshold with their marker index")
                        .long("labels")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("width")
                        .help("Output width in pixels")
                        .long("width")
                        .required(false)
                        .value_parser(value_parser!(u32))
                        .default_value("1920"),
                )
                .arg(
                    Arg::new("height")
                        .help("Output height in pixels")
                        .long("height")
                        .required(false)
                        .value_parser(value_parser!(u32))
                        .default_value("1080"),
                ),
        )
        .subcommand(
            Command::new("batch")
                .about("Plot the top-N distinct traits by best score")
                .arg(
                    Arg::new("input")
                        .help("Wide GWAS CSV (Index, Linkage_Group, Genetic_Distance, traits...)")
                        .short('i')
                        .long("input")
                        .required(true)
                        .value_name("FILE"),
                )
                .arg(
                    Arg::new("top")
                        .help("Number of distinct traits to select")
                        .short('n')
                        .long("top")
                        .required(false)
                        .value_parser(value_parser!(usize))
                        .default_value("10")
                        .value_name("N"),
                )
                .arg(
                    Arg::new("mode")
                        .help("'sep' writes one PNG per trait into a directory; 'facet' writes a single grid PNG")
                        .long("mode")
                        .required(false)
                        .value_parser(["sep", "facet"])
                        .default_value("sep")
                        .value_name("MODE"),
                )
                .arg(
                    Arg::new("output")
                        .help("Output directory (sep) or PNG path (facet). Derived from the input path if omitted")
                        .short('o')
                        .long("output")
                        .required(false)
                        .value_name("PATH"),
                )
                .arg(
                    Arg::new("rows")
                        .help("Facet grid row count (facet mode)")
                        .long("rows")
                        .required(false)
                        .value_parser(value_parser!(usize))
                        .default_value("5")
                        .value_name("ROWS"),
                )
                .arg(
                    Arg::new("thresh")
                        .help("Significance threshold in -log10(p) units (default 5)")
                        .long("thresh")
                        .required(false)
                        .value_parser(value_parser!(f64))
                        .value_name("FLOAT"),
                )
                .arg(
                    Arg::new("labels")
                        .help("Label points above the threshold with their marker index")
                        .long("labels")
                        .required(false)
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("width")
                        .help("Output width in pixels")
                        .long("width")
                        .required(false)
                        .value_parser(value_parser!(u32))
                        .default_value("1920"),
                )
                .arg(
                    Arg::new("height")
                        .help("Output height in pixels")
                        .long("height")
                        .required(false)
                        .value_parser(value_parser!(u32))
                        .default_value("1080"),
                )
                .arg(
                    Arg::new("threads")
                        .help("Rayon worker threads (optional)")
                        .long("threads")
                        .short('T')
                        .required(false)
                        .value_parser(value_parser!(usize)),
                ),
        );

    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("man", sub)) => {
            let input: &String = sub.get_one::<String>("input").expect("required by clap");
            let trait_name: &String = sub.get_one::<String>("trait").expect("required by clap");
            let width = *sub.get_one::<u32>("width").expect("default provided by clap");
            let height = *sub
                .get_one::<u32>("height")
                .expect("default provided by clap");
            let thresh = sub
                .get_one::<f64>("thresh")
                .copied()
                .unwrap_or(DEFAULT_THRESHOLD);
            let labels = sub.get_flag("labels");

            let output: PathBuf = match sub.get_one::<String>("output") {
                Some(o) => PathBuf::from(o),
                _none => derive_trait_png_path(input, trait_name),
            };

            println!("[INFO] Input : {}", input);
            println!("[INFO] Trait : {}", trait_name);
            println!("[INFO] Thresh: {}", thresh);
            println!("[INFO] Size  : {}x{}", width, height);
            println!("[INFO] Output: {}", output.display());

            let table = WideTable::from_path(input)?;
            println!(
                "[INFO] Loaded {} markers, {} trait columns",
                table.markers.len(),
                table.trait_names.len()
            );
            let layout = build_layout(&table.markers);
            let scene = scene::build_scene(&table, &layout, trait_name, thresh, labels)?;
            println!(
                "[INFO] Scene : {} points, {} above threshold",
                scene.points.len(),
                scene.highlights.len()
            );
            render::render_scene(&scene, &output, width, height)?;
            Ok(())
        }
        Some(("batch", sub)) => {
            let input: &String = sub.get_one::<String>("input").expect("required by clap");
            let top = *sub.get_one::<usize>("top").expect("default provided by clap");
            let mode: &String = sub.get_one::<String>("mode").expect("default provided by clap");
            let rows = *sub.get_one::<usize>("rows").expect("default provided by clap");
            let width = *sub.get_one::<u32>("width").expect("default provided by clap");
            let height = *sub
                .get_one::<u32>("height")
                .expect("default provided by clap");
            let thresh = sub
                .get_one::<f64>("thresh")
                .copied()
                .unwrap_or(DEFAULT_THRESHOLD);
            let labels = sub.get_flag("labels");
            let threads = sub.get_one::<usize>("threads").copied();

            if let Some(n) = threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build_global()
                    .ok();
                println!("[INFO] rayon threads = {}", n);
            }

            println!("[INFO] Input : {}", input);
            println!("[INFO] Top   : {}", top);
            println!("[INFO] Mode  : {}", mode);
            println!("[INFO] Thresh: {}", thresh);
            println!("[INFO] Size  : {}x{}", width, height);

            let table = WideTable::from_path(input)?;
            println!(
                "[INFO] Loaded {} markers, {} trait columns",
                table.markers.len(),
                table.trait_names.len()
            );
            let layout = build_layout(&table.markers);
            let long = table.to_long();
            println!("[INFO] {} recorded observations", long.len());
            let selection = select_top_traits(&long, top)?;
            println!("[INFO] Selected traits: {}", selection.join(", "));

            let scenes = render::build_scenes(&table, &layout, &selection, thresh, labels)?;

            match mode.as_str() {
                "sep" => {
                    let out_dir: PathBuf = match sub.get_one::<String>("output") {
                        Some(o) => PathBuf::from(o),
                        _none => derive_batch_outdir(input),
                    };
                    println!("[INFO] OutDir: {}", out_dir.display());
                    let written = render::render_separate(&scenes, &out_dir, width, height)?;
                    println!("[INFO] Batch complete: {} plots written", written.len());
                }
                "facet" => {
                    let output: PathBuf = match sub.get_one::<String>("output") {
                        Some(o) => PathBuf::from(o),
                        _none => derive_facet_png_path(input, top),
                    };
                    println!("[INFO] Output: {}", output.display());
                    render::render_faceted(&scenes, &output, width, height, rows)?;
                }
                other => anyhow::bail!("Unknown mode: {}", other),
            }
            Ok(())
        }
        _ => {
            let _ = Command::new("mgwas-plotter").print_help();
            println!();
            Ok(())
        }
    }
}

fn derive_trait_png_path(input: &str, trait_name: &str) -> PathBuf {
    let p = Path::new(input);
    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    let stem = p
        .file_stem()
        .unwrap_or_else(|| std::ffi::OsStr::new("output"));
    parent.join(format!("{}_{}.png", stem.to_string_lossy(), trait_name))
}

fn derive_batch_outdir(input: &str) -> PathBuf {
    let p = Path::new(input);
    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    parent.join("manout")
}

fn derive_facet_png_path(input: &str, top: usize) -> PathBuf {
    let p = Path::new(input);
    let parent = p.parent().unwrap_or_else(|| Path::new("."));
    let stem = p
        .file_stem()
        .unwrap_or_else(|| std::ffi::OsStr::new("output"));
    parent.join(format!("{}_top{}.png", stem.to_string_lossy(), top))
}
