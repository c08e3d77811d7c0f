//! world-prep: offline map authoring CLI.
//!
//! Generates and inspects the three map-directory entries the simulation
//! core reads at load time (`heightfield`, `collision_data`, and a
//! `<mapname>.mapdesc`); anything else already present in a map directory
//! (splat textures, minimap, screenshot) is left untouched.
//!
//! Usage:
//!   world-prep new --output maps/island2 --name island2 --width 256 --length 256 --players 4
//!   world-prep inspect maps/island2

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rp_world::heightfield::{read_collision_data, read_heightfield, save_terrain};
use rp_world::mapdesc::{self, MapDesc, MapSize, PlayerStart, PlayerStarts};
use rp_world::terrain::Terrain;

#[derive(Parser)]
#[command(name = "world-prep", about = "Ravaged Planets map authoring tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new synthetic map directory.
    New {
        /// Directory to write heightfield/collision_data/mapdesc into.
        #[arg(long)]
        output: PathBuf,
        /// Map name, used for the `<name>.mapdesc` file and embedded in it.
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 256)]
        width: u32,
        #[arg(long, default_value_t = 256)]
        length: u32,
        /// Number of player start positions to place, evenly spaced around
        /// the map's perimeter.
        #[arg(long, default_value_t = 2)]
        players: u8,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "world-prep")]
        author: String,
    },
    /// Print a summary of an existing map directory, validating that its
    /// files round-trip through the on-disk formats `rp-world` reads.
    Inspect {
        /// Map directory to inspect.
        map_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::New {
            output,
            name,
            width,
            length,
            players,
            seed,
            description,
            author,
        } => cmd_new(&output, &name, width, length, players, seed, &description, &author),
        Command::Inspect { map_dir } => cmd_inspect(&map_dir),
    }
}

fn cmd_new(
    output: &Path,
    name: &str,
    width: u32,
    length: u32,
    players: u8,
    seed: u64,
    description: &str,
    author: &str,
) -> Result<()> {
    if width == 0 || length == 0 {
        anyhow::bail!("width and length must both be nonzero");
    }

    eprintln!("Generating {width}x{length} synthetic terrain (seed {seed})...");
    let heights = generate_synthetic_heights(width, length, seed);
    let terrain = Terrain::new(width, length, heights).context("building terrain from generated heights")?;

    eprintln!("Writing heightfield and collision_data to {}...", output.display());
    save_terrain(output, &terrain).context("saving terrain")?;

    let desc = MapDesc {
        version: 1,
        description: description.to_string(),
        author: author.to_string(),
        size: MapSize { width, height: length },
        players: PlayerStarts {
            player: player_starts(players, width, length),
        },
    };
    let xml = mapdesc::serialize(&desc).context("serializing mapdesc")?;
    let mapdesc_path = output.join(format!("{name}.mapdesc"));
    std::fs::write(&mapdesc_path, xml).context("writing mapdesc")?;

    eprintln!(
        "Done. {} player start(s) written to {}",
        desc.players.player.len(),
        mapdesc_path.display()
    );
    Ok(())
}

/// Evenly spaces `count` start positions around the map's perimeter, well
/// clear of the edges so a spawned base isn't split by the toroidal wrap.
fn player_starts(count: u8, width: u32, length: u32) -> Vec<PlayerStart> {
    let margin = 0.15;
    let cx = width as f32 / 2.0;
    let cz = length as f32 / 2.0;
    let rx = width as f32 * (0.5 - margin);
    let rz = length as f32 * (0.5 - margin);

    (0..count)
        .map(|i| {
            let angle = std::f32::consts::TAU * (i as f32) / (count.max(1) as f32);
            let x = cx + rx * angle.cos();
            let z = cz + rz * angle.sin();
            PlayerStart {
                no: i + 1,
                start: format!("{x:.1} {z:.1}"),
            }
        })
        .collect()
}

/// Toroidally seamless synthetic heightfield: a handful of sine terms whose
/// periods are whole map dimensions (so height at column `width` equals
/// height at column `0` exactly), perturbed per-seed.
fn generate_synthetic_heights(width: u32, length: u32, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let terms: Vec<(f32, f32, f32, f32)> = (0..4)
        .map(|_| {
            let freq_x = rng.gen_range(1..=4) as f32;
            let freq_z = rng.gen_range(1..=4) as f32;
            let phase = rng.gen_range(0.0..std::f32::consts::TAU);
            let amplitude = rng.gen_range(2.0..10.0);
            (freq_x, freq_z, phase, amplitude)
        })
        .collect();

    let mut heights = Vec::with_capacity((width * length) as usize);
    for z in 0..length {
        for x in 0..width {
            let nx = x as f32 / width as f32;
            let nz = z as f32 / length as f32;
            let mut h = 0.0f32;
            for &(fx, fz, phase, amp) in &terms {
                h += amp
                    * (std::f32::consts::TAU * fx * nx + std::f32::consts::TAU * fz * nz + phase).sin();
            }
            heights.push(h);
        }
    }
    heights
}

fn cmd_inspect(map_dir: &Path) -> Result<()> {
    let heightfield_path = map_dir.join("heightfield");
    let file = std::fs::File::open(&heightfield_path)
        .with_context(|| format!("opening {}", heightfield_path.display()))?;
    let (width, length, heights) = read_heightfield(file).context("parsing heightfield")?;
    let min = heights.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = heights.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    println!("heightfield: {width}x{length}, height range {min:.2}..{max:.2}");

    let collision_path = map_dir.join("collision_data");
    if collision_path.exists() {
        let file = std::fs::File::open(&collision_path)?;
        let bitmap = read_collision_data(file).context("parsing collision_data")?;
        let passable = bitmap.as_bits().iter().filter(|&&p| p).count();
        println!(
            "collision_data: {}x{}, {passable}/{} cells passable",
            bitmap.width,
            bitmap.length,
            bitmap.width as usize * bitmap.length as usize
        );
    } else {
        println!("collision_data: not present");
    }

    match std::fs::read_dir(map_dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("mapdesc") {
                    let xml = std::fs::read_to_string(&path)?;
                    let desc = mapdesc::parse(&xml).context("parsing mapdesc")?;
                    println!(
                        "mapdesc: \"{}\" by {}, {}x{}, {} player start(s)",
                        desc.description,
                        desc.author,
                        desc.size.width,
                        desc.size.height,
                        desc.players.player.len()
                    );
                }
            }
        }
        Err(e) => eprintln!("warning: could not list {}: {e}", map_dir.display()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_heights_fill_the_whole_grid() {
        let heights = generate_synthetic_heights(32, 24, 7);
        assert_eq!(heights.len(), 32 * 24);
        assert!(heights.iter().all(|h| h.is_finite()));
    }

    #[test]
    fn built_terrain_accepts_the_generated_heights() {
        // Every term's period is a whole map dimension, so Terrain::new's own
        // toroidal assumption (vertex `width` == vertex `0`) holds exactly;
        // this just confirms the generator's output satisfies Terrain::new's
        // length invariant, not a property of the heights themselves.
        let heights = generate_synthetic_heights(16, 16, 1);
        assert!(Terrain::new(16, 16, heights).is_ok());
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = generate_synthetic_heights(16, 16, 42);
        let b = generate_synthetic_heights(16, 16, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn player_starts_are_evenly_spaced_and_numbered_from_one() {
        let starts = player_starts(4, 256, 256);
        assert_eq!(starts.len(), 4);
        assert_eq!(starts[0].no, 1);
        assert_eq!(starts[3].no, 4);
        for start in &starts {
            let (x, z) = start.position().unwrap();
            assert!(x >= 0.0 && x <= 256.0);
            assert!(z >= 0.0 && z <= 256.0);
        }
    }

    #[test]
    fn new_then_inspect_round_trips_a_map_directory() {
        let dir = tempfile::tempdir().unwrap();
        cmd_new(dir.path(), "demo", 32, 32, 3, 1, "a test map", "tester").unwrap();

        assert!(dir.path().join("heightfield").exists());
        assert!(dir.path().join("collision_data").exists());
        assert!(dir.path().join("demo.mapdesc").exists());

        cmd_inspect(dir.path()).unwrap();
    }
}
