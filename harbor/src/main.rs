use std::path::PathBuf;

use clap::Parser;
use harbor::init::{self, HarborSettings};
use harbor::loader::load_ocean_config;
use ocean::WavePreset;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Frames to simulate before exiting
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Floating bodies to spawn
    #[arg(short, long, default_value_t = 16)]
    bodies: usize,

    /// Sample points per body
    #[arg(short, long, default_value_t = 64)]
    points: usize,

    /// RON file with an ocean configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wave preset used when no configuration file is given
    #[arg(short, long, default_value = "ocean")]
    waves: WavePreset,

    /// Horizontal drift of every body, in units per second
    #[arg(short, long, default_value_t = 0.5)]
    drift: f32,
}

fn main() {
    let args = Args::parse();

    if args.points == 0 {
        eprintln!("Error: points must be at least 1.");
        std::process::exit(1);
    }

    if args.frames == 0 {
        eprintln!("Error: frames must be at least 1.");
        std::process::exit(1);
    }

    let config = match load_ocean_config(args.config.as_deref(), args.waves) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: could not load ocean configuration: {err}");
            std::process::exit(1);
        }
    };

    init::init(
        config,
        HarborSettings {
            frames: args.frames,
            bodies: args.bodies,
            points_per_body: args.points,
            drift: args.drift,
        },
    );
}
