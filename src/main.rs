use std::process;

use clap::Parser;

use terrain_bridges::ascii::{self, AsciiMode};
use terrain_bridges::bridges::VerticalProbe;
use terrain_bridges::export;
use terrain_bridges::{generate_map, MapConfig};

#[derive(Parser, Debug)]
#[command(name = "terrain_bridges")]
#[command(about = "Generate noise terrain maps with bridges between mountain ranges")]
struct Args {
    /// JSON config file (command-line values override it)
    #[arg(short, long)]
    config: Option<String>,

    /// Width of the map in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the map in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (random when no config file is given)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Noise scale (higher = larger features)
    #[arg(long)]
    scale: Option<f32>,

    /// Number of noise octaves
    #[arg(long)]
    octaves: Option<u32>,

    /// Amplitude decay per octave (0.0-1.0)
    #[arg(long)]
    persistence: Option<f32>,

    /// Frequency multiplier per octave (>= 1)
    #[arg(long)]
    lacunarity: Option<f32>,

    /// Horizontal noise offset
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f32>,

    /// Vertical noise offset
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f32>,

    /// How far a bridge search reaches past the valley
    #[arg(short = 'b', long)]
    max_bridge_length: Option<usize>,

    /// Use the legacy vertical bridge check
    #[arg(long)]
    legacy_vertical: bool,

    /// Re-classify cells after bridging so bridges get the top region
    #[arg(long)]
    reclassify: bool,

    /// Export region colours to PNG
    #[arg(short, long)]
    output: Option<String>,

    /// Export final heights to grayscale PNG
    #[arg(long)]
    heightmap: Option<String>,

    /// Export region colours with bridges highlighted to PNG
    #[arg(long)]
    bridges: Option<String>,

    /// Print the map as ASCII region letters
    #[arg(long)]
    ascii: bool,

    /// Print the map as an ASCII elevation ramp
    #[arg(long)]
    ascii_heights: bool,

    /// Write the effective config as JSON
    #[arg(long)]
    dump_config: Option<String>,
}

impl Args {
    fn to_config(&self) -> Result<MapConfig, terrain_bridges::ConfigError> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_json_file(path)?,
            None => MapConfig {
                noise: terrain_bridges::noise_field::NoiseParams {
                    seed: rand::random(),
                    ..Default::default()
                },
                ..MapConfig::default()
            },
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(seed) = self.seed {
            config.noise.seed = seed;
        }
        if let Some(scale) = self.scale {
            config.noise.scale = scale;
        }
        if let Some(octaves) = self.octaves {
            config.noise.octaves = octaves;
        }
        if let Some(persistence) = self.persistence {
            config.noise.persistence = persistence;
        }
        if let Some(lacunarity) = self.lacunarity {
            config.noise.lacunarity = lacunarity;
        }
        if let Some(x) = self.offset_x {
            config.noise.offset[0] = x;
        }
        if let Some(y) = self.offset_y {
            config.noise.offset[1] = y;
        }
        if let Some(length) = self.max_bridge_length {
            config.max_bridge_length = length;
        }
        if self.legacy_vertical {
            config.vertical_probe = VerticalProbe::Legacy;
        }
        if self.reclassify {
            config.reclassify_bridges = true;
        }

        // Clamp user input into range before generation
        Ok(config.clamped())
    }
}

fn main() {
    let args = Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    println!("Generating map with seed: {}", config.noise.seed);
    println!("Map size: {}x{}", config.width, config.height);
    println!(
        "Noise: scale {}, {} octaves, persistence {}, lacunarity {}",
        config.noise.scale, config.noise.octaves, config.noise.persistence, config.noise.lacunarity
    );

    if let Some(ref path) = args.dump_config {
        match config.to_json().map(|json| std::fs::write(path, json)) {
            Ok(Ok(())) => println!("Wrote config to: {}", path),
            Ok(Err(e)) => eprintln!("Failed to write config: {}", e),
            Err(e) => eprintln!("Failed to serialize config: {}", e),
        }
    }

    println!("Generating noise field and bridges...");
    let map = match generate_map(&config) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Map generation failed: {}", e);
            process::exit(1);
        }
    };

    map.print_summary();

    if args.ascii {
        print!("{}", ascii::render(&map, AsciiMode::Region));
    }
    if args.ascii_heights {
        print!("{}", ascii::render(&map, AsciiMode::Height));
    }

    let mut failed = false;

    if let Some(ref path) = args.output {
        match export::export_region_map(&map, path) {
            Ok(()) => println!("Exported region map to: {}", path),
            Err(e) => {
                eprintln!("Failed to export region map: {}", e);
                failed = true;
            }
        }
    }

    if let Some(ref path) = args.heightmap {
        match export::export_heightmap(&map, path) {
            Ok(()) => println!("Exported heightmap to: {}", path),
            Err(e) => {
                eprintln!("Failed to export heightmap: {}", e);
                failed = true;
            }
        }
    }

    if let Some(ref path) = args.bridges {
        match export::export_bridge_overlay(&map, [255, 0, 0], path) {
            Ok(()) => println!("Exported bridge overlay to: {}", path),
            Err(e) => {
                eprintln!("Failed to export bridge overlay: {}", e);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
