//! World preview renderer
//!
//! Builds a world for a seed, plants a row of trees, weeds and flower
//! bushes along the ground, and rasterizes one frame to a PNG.
//!
//! Usage:
//!     render_preview [OPTIONS] <OUTPUT_PNG>
//!
//! Options:
//!     --seed <SEED>           Number or text seed (default: 42)
//!     --camera-x <X>          World x at the left screen edge (default: 0)
//!     --width <PX>            Image width (default: 1280)
//!     --height <PX>           Image height (default: 720)
//!     --plants <N>            Plants in the row (default: 8)
//!     --config <FILE>         World config JSON (seed and size flags still apply)
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use tendril::core::logging;
use tendril::math::{Rng, Seed};
use tendril::procgen::{PlantKind, PlantParams, PlantSpec};
use tendril::render::Raster;
use tendril::world::{World, WorldConfig};

fn print_help() {
    eprintln!("render_preview - Render one frame of a generated world");
    eprintln!();
    eprintln!("Usage: render_preview [OPTIONS] <OUTPUT_PNG>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --seed <SEED>           Number or text seed (default: 42)");
    eprintln!("    --camera-x <X>          World x at the left screen edge (default: 0)");
    eprintln!("    --width <PX>            Image width (default: 1280)");
    eprintln!("    --height <PX>           Image height (default: 720)");
    eprintln!("    --plants <N>            Plants in the row (default: 8)");
    eprintln!("    --config <FILE>         World config JSON (seed and size flags still apply)");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    render_preview --seed meadow --camera-x 2000 preview.png");
}

#[derive(Debug)]
struct Args {
    output: PathBuf,
    seed: Option<Seed>,
    camera_x: f64,
    width: u32,
    height: u32,
    plants: u32,
    config: Option<PathBuf>,
}

fn parse_seed(text: &str) -> Seed {
    text.parse::<u32>().map(Seed).unwrap_or_else(|_| Seed::from(text))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() {
        return Err("Missing output path".to_string());
    }

    let mut seed: Option<Seed> = None;
    let mut camera_x: f64 = 0.0;
    let mut width: u32 = 1280;
    let mut height: u32 = 720;
    let mut plants: u32 = 8;
    let mut config: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --seed".to_string());
                }
                seed = Some(parse_seed(&args[i]));
            }
            "--camera-x" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --camera-x".to_string());
                }
                camera_x = args[i].parse().map_err(|_| format!("Invalid camera-x: {}", args[i]))?;
            }
            "--width" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --width".to_string());
                }
                width = args[i].parse().map_err(|_| format!("Invalid width: {}", args[i]))?;
            }
            "--height" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --height".to_string());
                }
                height = args[i].parse().map_err(|_| format!("Invalid height: {}", args[i]))?;
            }
            "--plants" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --plants".to_string());
                }
                plants = args[i].parse().map_err(|_| format!("Invalid plants: {}", args[i]))?;
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                config = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => {
                if output.is_some() {
                    return Err("Multiple output paths specified".to_string());
                }
                output = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    let output = output.ok_or("Missing output path")?;
    if width == 0 || height == 0 {
        return Err("Image size must be non-zero".to_string());
    }

    Ok(Args {
        output,
        seed,
        camera_x,
        width,
        height,
        plants,
        config,
    })
}

fn run(args: &Args) -> tendril::core::Result<()> {
    let mut config = match &args.config {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
        config.terrain.seed = seed;
    }
    config.viewport_width = args.width as f64;
    config.viewport_height = args.height as f64;

    let start = Instant::now();
    let mut world = World::new(config)?;
    world.update(args.camera_x, 0.0);

    // A row of plants across the visible ground, kinds picked from the world seed
    let mut rng = Rng::new(world.config().seed.derive(0x9A4D));
    let kinds = [PlantKind::Tree, PlantKind::Weed, PlantKind::FlowerBush];
    let spacing = args.width as f64 / (args.plants as f64 + 1.0);
    for i in 0..args.plants {
        let kind = kinds[rng.index(kinds.len())];
        let spec = PlantSpec::new(rng.next_u32(), PlantParams::for_kind(kind));
        let x = args.camera_x + spacing * (i as f64 + 1.0) + rng.signed(spacing * 0.25);
        world.plant(spec, x)?;
    }
    log::info!(
        "Generated world in {:.1}ms: {} chunks, {} plants, {} scene nodes",
        start.elapsed().as_secs_f64() * 1000.0,
        world.chunks().len(),
        world.planted().len(),
        world.scene().node_count()
    );

    let render_start = Instant::now();
    let mut raster = Raster::new(args.width, args.height);
    raster.clear(world.sky_color());
    let entries = world.scene_mut().flatten();
    raster.draw_scene(&entries);
    raster.save(&args.output)?;
    log::info!(
        "Rendered {} drawings in {:.1}ms",
        entries.len(),
        render_start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    println!("World Preview");
    println!("=============");
    println!("Output: {}", args.output.display());
    println!("Camera x: {}", args.camera_x);
    println!("Size: {}x{}", args.width, args.height);
    println!();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    println!("Saved {}", args.output.display());
}
