#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the block escape puzzle.

mod console;
mod level_code;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use block_escape_core::{LevelData, LevelId};
use block_escape_levels::{generate, solve, GeneratorConfig, LevelParser, LevelRegistry};
use block_escape_manager::ManagerConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Remove every block from a 3D structure, one clear path at a time.
#[derive(Debug, Parser)]
#[command(name = "block-escape", version, about)]
struct Cli {
    /// Level file (TOML or JSON) merged over the built-in levels.
    #[arg(long, global = true, value_name = "FILE")]
    levels: Option<PathBuf>,
    /// Manager configuration file (TOML).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the available levels.
    List,
    /// Play a level interactively.
    Play(PlayArgs),
    /// Print the removal order that clears a level.
    Solve(LevelArgs),
    /// Print the world-space layout of a level.
    Layout(LevelArgs),
    /// Print a share code for a level.
    Share(LevelArgs),
    /// Generate a solvable level.
    Generate(GenerateArgs),
}

#[derive(Debug, Args)]
struct LevelArgs {
    /// Level number; missing levels fall back to level 1.
    #[arg(short, long, default_value_t = 1)]
    level: u32,
    /// Share code to use instead of a level number.
    #[arg(long, conflicts_with = "level")]
    code: Option<String>,
}

#[derive(Debug, Args)]
struct PlayArgs {
    #[command(flatten)]
    source: LevelArgs,
    /// Restrict input to the hinted block.
    #[arg(long)]
    guided: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Toml,
    Json,
    Code,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Seed for the level generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Identifier given to the generated level.
    #[arg(long, default_value_t = 100)]
    id: u32,
    /// Edge length of the cube blocks are placed in.
    #[arg(long, default_value_t = 4)]
    extent: u32,
    /// Number of blocks to aim for.
    #[arg(long, default_value_t = 16)]
    blocks: usize,
    /// Longest block along its long axis.
    #[arg(long, default_value_t = 3)]
    max_length: u32,
    /// Add a key block and a locked block.
    #[arg(long)]
    lock_pair: bool,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Toml)]
    format: Format,
}

/// Entry point for the block escape command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let registry = load_registry(cli.levels.as_deref())?;

    match cli.command {
        Commands::List => list(&registry),
        Commands::Play(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            config.guided |= args.guided;
            let level = select_level(&registry, &args.source)?;
            console::play(registry, config, level)
        }
        Commands::Solve(args) => {
            let level = select_level(&registry, &args)?;
            let solution = solve(&level).context("level cannot be played")?;
            let order: Vec<String> = solution
                .order()
                .iter()
                .map(|index| format!("#{index}"))
                .collect();
            println!("{}", order.join(" "));
            if !solution.is_solved() {
                bail!("level {} cannot be cleared", level.id().get());
            }
            Ok(())
        }
        Commands::Layout(args) => {
            let level = select_level(&registry, &args)?;
            let parsed = LevelParser::default().parse(&level);
            println!("bounds {} .. {}", parsed.bounds_min, parsed.bounds_max);
            for (index, placement) in parsed.placements.iter().enumerate() {
                println!(
                    "#{index:<3} center {:>24} extent {}",
                    placement.center.to_string(),
                    placement.extent
                );
            }
            Ok(())
        }
        Commands::Share(args) => {
            let level = select_level(&registry, &args)?;
            println!("{}", level_code::encode(&level)?);
            Ok(())
        }
        Commands::Generate(args) => generate_level(&args),
    }
}

fn load_registry(path: Option<&Path>) -> Result<LevelRegistry> {
    let mut registry = LevelRegistry::builtin();
    if let Some(path) = path {
        let extra = LevelRegistry::load_file(path)
            .with_context(|| format!("failed to load levels from {}", path.display()))?;
        registry.merge(extra);
    }
    Ok(registry)
}

fn load_config(path: Option<&Path>) -> Result<ManagerConfig> {
    let Some(path) = path else {
        return Ok(ManagerConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    ManagerConfig::from_toml_str(&source)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn select_level(registry: &LevelRegistry, args: &LevelArgs) -> Result<LevelData> {
    if let Some(code) = &args.code {
        return Ok(level_code::decode(code)?);
    }
    registry
        .resolve(LevelId::new(args.level))
        .cloned()
        .ok_or_else(|| anyhow!("no levels are available"))
}

fn list(registry: &LevelRegistry) -> Result<()> {
    for level in registry.iter() {
        let solvable = solve(level).is_ok_and(|solution| solution.is_solved());
        println!(
            "{:>3}  {:<16} {:>3} blocks{}",
            level.id().get(),
            level.name().unwrap_or("-"),
            level.blocks().len(),
            if solvable { "" } else { "  (unsolvable)" }
        );
    }
    Ok(())
}

fn generate_level(args: &GenerateArgs) -> Result<()> {
    let mut config = GeneratorConfig::new(args.extent, args.blocks, args.max_length);
    if args.lock_pair {
        config = config.with_lock_pair();
    }
    let level = generate(LevelId::new(args.id), args.seed, &config);

    match args.format {
        Format::Toml => {
            let mut registry = LevelRegistry::new();
            let _ = registry.register(level);
            print!("{}", registry.to_toml_string()?);
        }
        Format::Json => {
            let document = serde_json::json!({ "levels": [level] });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Format::Code => println!("{}", level_code::encode(&level)?),
    }
    Ok(())
}
