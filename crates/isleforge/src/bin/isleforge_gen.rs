//! # Isleforge Generator
//!
//! Generates one island and prints a summary and an ASCII biome map.
//!
//! Run with:
//! ```text
//! cargo run -p isleforge --bin isleforge_gen -- --config configs/island.toml
//! RUST_LOG=debug cargo run -p isleforge --bin isleforge_gen -- --seed 7
//! ```

use std::collections::BTreeMap;
use std::process::ExitCode;

use isleforge_procgen::{
    Biome, Bounds, EntitySpawner, GenerationConfig, GenerationReport, IslandGenerator, MeshData,
    NeighborStrategy, Point2,
};
use tracing_subscriber::EnvFilter;

/// Default preview width in characters.
const DEFAULT_MAP_COLUMNS: usize = 64;

/// Entities created during a run, kept in memory.
#[derive(Default)]
struct EntityLog {
    /// Kind and position, indexed by handle.
    entities: Vec<(String, Point2)>,
}

impl EntitySpawner for EntityLog {
    type Handle = usize;

    fn create_entity_at(&mut self, kind: &str, position: Point2) -> Option<usize> {
        self.entities.push((kind.to_string(), position));
        Some(self.entities.len() - 1)
    }
}

/// Command line options.
struct Options {
    config: GenerationConfig,
    map_columns: usize,
}

fn print_usage() {
    println!("Usage: isleforge_gen [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>        TOML config file (default: built-in defaults)");
    println!("  -s, --seed <SEED>          World seed");
    println!("      --size <W>x<H>         World size, e.g. 200x120");
    println!("  -d, --min-distance <DIST>  Poisson spacing between sites");
    println!("      --ring <SPACING>       Add a ring of sites along the edges");
    println!("      --adjacency            Route rivers along mesh edges");
    println!("  -m, --map-columns <COLS>   Width of the ASCII map (0 disables it)");
    println!("  -h, --help                 Show this help");
}

/// Advances past a flag and returns its value.
fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} needs a value"))
}

/// Parses arguments. `Ok(None)` means help was printed.
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut config_path = None;
    let mut overrides: Vec<(&str, &str)> = Vec::new();
    let mut adjacency = false;
    let mut map_columns = DEFAULT_MAP_COLUMNS;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || take_value(args, &mut i, flag);
        match flag {
            "-c" | "--config" => config_path = Some(value()?.to_string()),
            "-s" | "--seed" => overrides.push(("seed", value()?)),
            "--size" => overrides.push(("size", value()?)),
            "-d" | "--min-distance" => overrides.push(("min_distance", value()?)),
            "--ring" => overrides.push(("ring", value()?)),
            "--adjacency" => adjacency = true,
            "-m" | "--map-columns" => {
                let raw = value()?;
                map_columns = raw
                    .parse()
                    .map_err(|_| format!("invalid map width: {raw}"))?;
            }
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            other => return Err(format!("unknown option: {other}")),
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => GenerationConfig::load(&path).map_err(|e| e.to_string())?,
        None => GenerationConfig::default(),
    };

    for (key, raw) in overrides {
        match key {
            "seed" => config.seed = raw.parse().map_err(|_| format!("invalid seed: {raw}"))?,
            "min_distance" => {
                config.min_distance = raw.parse().map_err(|_| format!("invalid distance: {raw}"))?;
            }
            "ring" => {
                config.boundary_spacing =
                    Some(raw.parse().map_err(|_| format!("invalid ring spacing: {raw}"))?);
            }
            _ => {
                let (w, h) = raw
                    .split_once('x')
                    .and_then(|(w, h)| Some((w.parse::<f64>().ok()?, h.parse::<f64>().ok()?)))
                    .ok_or_else(|| format!("invalid size: {raw}"))?;
                config.bounds = Bounds::new(0.0, 0.0, w, h);
            }
        }
    }
    if adjacency {
        config.neighbor_strategy = NeighborStrategy::MeshAdjacency;
    }

    Ok(Some(Options { config, map_columns }))
}

fn print_summary(report: &GenerationReport, log: &EntityLog) {
    let mesh = &report.mesh;

    let mut biomes: BTreeMap<u8, usize> = BTreeMap::new();
    for site in &mesh.sites {
        *biomes.entry(site.biome as u8).or_default() += 1;
    }
    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for (kind, _) in &log.entities {
        *kinds.entry(kind.as_str()).or_default() += 1;
    }

    println!("┌─ ISLAND ─────────────────────────────────────────────────────────┐");
    println!("│ Seed:               {}", mesh.seed.value());
    println!(
        "│ Bounds:             ({}, {}) - ({}, {})",
        mesh.bounds.min_x, mesh.bounds.min_y, mesh.bounds.max_x, mesh.bounds.max_y
    );
    println!("│ Sites:              {} ({} land)", mesh.sites.len(), mesh.land_count());
    println!("│ Triangles:          {}", mesh.triangles.len());
    println!("│ Edges:              {}", mesh.edges.len());
    if let Some(err) = &report.triangulation_error {
        println!("│ Triangulation:      FAILED ({err})");
    }
    println!("│ River segments:     {}", report.hydrology.segments);
    println!("│ Peak flow:          {:.3}", report.hydrology.max_flow);
    println!("├─ BIOMES ─────────────────────────────────────────────────────────┤");
    for (&biome, count) in &biomes {
        let biome = Biome::from_u8(biome);
        println!("│ {} {:<17} {count}", biome.glyph(), format!("{biome:?}"));
    }
    println!("├─ ENTITIES ───────────────────────────────────────────────────────┤");
    for (kind, count) in &kinds {
        println!("│ {kind:<19} {count}");
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
}

/// Rasterizes the mesh: each cell shows the biome of the nearest site.
fn render_map(mesh: &MeshData, columns: usize) -> Vec<String> {
    let bounds = mesh.bounds;
    if columns == 0 || !bounds.has_area() || mesh.sites.is_empty() {
        return Vec::new();
    }

    // Terminal cells are about twice as tall as wide.
    let cell = bounds.width() / columns as f64;
    let rows = ((bounds.height() / (cell * 2.0)).round() as usize).max(1);
    let cell_h = bounds.height() / rows as f64;

    (0..rows)
        .rev()
        .map(|row| {
            (0..columns)
                .map(|col| {
                    let p = Point2::new(
                        bounds.min_x + (col as f64 + 0.5) * cell,
                        bounds.min_y + (row as f64 + 0.5) * cell_h,
                    );
                    mesh.nearest_site(p)
                        .map_or(' ', |id| mesh.sites[id].biome.glyph())
                })
                .collect()
        })
        .collect()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let generator = match IslandGenerator::new(options.config) {
        Ok(generator) => generator,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let config = generator.config();
    tracing::info!(
        seed = config.seed,
        min_distance = config.min_distance,
        strategy = ?config.neighbor_strategy,
        "generating island"
    );

    let mut log = EntityLog::default();
    let report = generator.generate(&mut log);
    tracing::info!(entities = log.entities.len(), "entities spawned");

    print_summary(&report, &log);
    for line in render_map(&report.mesh, options.map_columns) {
        println!("{line}");
    }

    ExitCode::SUCCESS
}
