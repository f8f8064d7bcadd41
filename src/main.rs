//! abikit command-line entry point.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;

use abikit::artifacts::{ArtifactCacheManager, ArtifactLoader};
use abikit::config::follows_interface_convention;
use abikit::cache::{BuildInputs, CacheManager, RegenerationCheck, CACHE_FILE};
use abikit::{create_generator, init_logging, load_config, GeneratorContext, ModelBuilder, Result};

#[derive(Parser)]
#[command(
    name = "abikit",
    version,
    about = "Multi-language SDK generator for smart contracts"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize contracts.yaml from existing artifacts
    Init {
        /// Foundry out directory
        #[arg(long, default_value = "./out")]
        foundry_out: PathBuf,
        /// Hardhat artifacts directory
        #[arg(long)]
        hardhat_out: Option<PathBuf>,
        /// Output config file path
        #[arg(short, long, default_value = "./contracts.yaml")]
        output: PathBuf,
    },
    /// Validate contracts.yaml configuration
    Validate {
        #[arg(default_value = "./contracts.yaml")]
        config: PathBuf,
    },
    /// Generate SDKs from contracts
    Build {
        #[arg(default_value = "./contracts.yaml")]
        config: PathBuf,
        /// Force rebuild, bypassing the cache
        #[arg(short, long)]
        force: bool,
    },
    /// List available contracts from artifacts
    List {
        /// Foundry out directory
        #[arg(long, default_value = "./out")]
        foundry_out: PathBuf,
        /// Hardhat artifacts directory
        #[arg(long)]
        hardhat_out: Option<PathBuf>,
    },
    /// Remove generated SDK files
    Clean {
        #[arg(default_value = "./contracts.yaml")]
        config: PathBuf,
    },
    /// Manage the build and artifact caches
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
    /// Inspect contract artifacts
    Artifacts {
        #[command(subcommand)]
        command: ArtifactsCommand,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Clear the build cache and any cached artifacts
    Clear {
        #[arg(default_value = "./contracts.yaml")]
        config: PathBuf,
    },
    /// Show cache statistics
    Stats {
        #[arg(default_value = "./contracts.yaml")]
        config: PathBuf,
    },
}

#[derive(Subcommand)]
enum ArtifactsCommand {
    /// List resolved artifact paths for all configured contracts
    List {
        #[arg(default_value = "./contracts.yaml")]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Init {
            foundry_out,
            hardhat_out,
            output,
        } => cmd_init(foundry_out, hardhat_out, output),
        Command::Validate { config } => cmd_validate(&config),
        Command::Build { config, force } => cmd_build(&config, force),
        Command::List {
            foundry_out,
            hardhat_out,
        } => cmd_list(foundry_out, hardhat_out),
        Command::Clean { config } => cmd_clean(&config),
        Command::Cache { command } => match command {
            CacheCommand::Clear { config } => cmd_cache_clear(&config),
            CacheCommand::Stats { config } => cmd_cache_stats(&config),
        },
        Command::Artifacts { command } => match command {
            ArtifactsCommand::List { config } => cmd_artifacts_list(&config),
        },
    }
}

/// Scaffold a starter `contracts.yaml` from whatever artifacts exist.
fn cmd_init(foundry_out: PathBuf, hardhat_out: Option<PathBuf>, output: PathBuf) -> Result<()> {
    println!("Scanning artifacts...");
    let loader = ArtifactLoader::new(foundry_out.clone(), hardhat_out.clone());
    let contracts = loader.list_available_contracts();
    println!("Found {} contracts", contracts.len());

    let (interfaces, implementations): (Vec<_>, Vec<_>) = contracts
        .into_iter()
        .partition(|name| follows_interface_convention(name));

    let mut contracts_map = serde_json::Map::new();
    for name in implementations {
        contracts_map.insert(name, json!({}));
    }

    let mut artifact_paths = serde_json::Map::new();
    artifact_paths.insert("foundryOut".into(), json!(foundry_out));
    if let Some(hardhat_out) = &hardhat_out {
        artifact_paths.insert("hardhatOut".into(), json!(hardhat_out));
    }

    let scaffold = json!({
        "contracts": contracts_map,
        "interfaces": interfaces,
        "generation": {
            "targets": [{
                "language": "ts",
                "outDir": "./sdk/typescript",
                "options": {
                    "transport": "viem",
                    "emitHooks": false,
                    "packageName": "my-contract-sdk",
                },
            }],
            "artifactPaths": artifact_paths,
        },
    });

    let yaml = serde_yaml::to_string(&scaffold).map_err(|err| {
        abikit::ConfigError::Invalid(format!("failed to render scaffold: {err}"))
    })?;
    fs::write(&output, yaml)?;
    println!("Created {}", output.display());
    println!("  Edit the file to configure targets and options");
    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<()> {
    println!("Validating configuration...");
    let config = load_config(&resolve_path(config_path))?;
    let targets: Vec<_> = config
        .generation
        .targets
        .iter()
        .map(|t| t.language.as_str())
        .collect();
    println!("Configuration is valid");
    println!("  Targets: {}", targets.join(", "));
    Ok(())
}

fn cmd_build(config_path: &Path, force: bool) -> Result<()> {
    let config_path = resolve_path(config_path);
    let config_dir = config_dir_of(&config_path);
    println!("Building SDKs (abikit v{})...", env!("CARGO_PKG_VERSION"));
    println!("  Config: {}", config_path.display());

    let config = load_config(&config_path)?;
    let mut cache_manager = CacheManager::new(CACHE_FILE);

    let foundry_out = resolve_against(&config_dir, &config.foundry_out());
    let hardhat_out = config
        .hardhat_out()
        .map(|dir| resolve_against(&config_dir, &dir));

    let mut artifact_paths = vec![foundry_out.clone()];
    if let Some(hardhat_out) = &hardhat_out {
        artifact_paths.push(hardhat_out.clone());
    }
    let target_dirs: Vec<PathBuf> = config
        .generation
        .targets
        .iter()
        .map(|t| resolve_against(&config_dir, Path::new(&t.out_dir)))
        .collect();

    // Copy-cache runs before the regeneration check so the cache dir
    // itself is up to date even when generation is skipped.
    if config.artifact_cache_enabled() {
        println!("Caching artifacts...");
        let loader = ArtifactLoader::with_config(foundry_out.clone(), hardhat_out.clone(), &config);
        let mut artifact_cache = ArtifactCacheManager::from_config(&config, &config_dir);
        artifact_cache.copy_artifacts(
            &loader,
            &config.all_contract_names(),
            &foundry_out,
            force,
        )?;
        let stats = artifact_cache.stats();
        println!(
            "Cached {} artifacts to {}",
            stats.cached_count,
            stats.cache_dir.display()
        );
    }

    let inputs = BuildInputs {
        config_path: config_path.clone(),
        artifact_paths,
        target_dirs,
    };
    if force {
        println!("Force rebuild requested, bypassing cache");
    } else {
        match cache_manager.needs_regeneration(&inputs) {
            RegenerationCheck::Clean => {
                println!("Artifacts unchanged, skipping generation (use --force to rebuild)");
                return Ok(());
            }
            RegenerationCheck::Needed(reason) => println!("Rebuilding: {reason}"),
        }
    }

    let builder = ModelBuilder::new();
    let mut graph = builder.build_graph(&config, &config_dir);
    builder.apply_ignore_rules(&mut graph, &config.generation.ignore_functions);
    println!("Built model with {} contracts", graph.contracts.len());

    let context = GeneratorContext {
        networks: graph.networks.clone(),
        signatures: config.signatures.clone(),
    };
    for target in &config.generation.targets {
        println!("Generating {} SDK to {}...", target.language, target.out_dir);
        let out_dir = resolve_against(&config_dir, Path::new(&target.out_dir));
        let generator = create_generator(target, out_dir);
        generator.validate_options(&target.options)?;
        generator.generate(&graph, &context)?;
    }

    cache_manager.record_build(&inputs);
    println!("Build complete");
    Ok(())
}

fn cmd_list(foundry_out: PathBuf, hardhat_out: Option<PathBuf>) -> Result<()> {
    let loader = ArtifactLoader::new(foundry_out, hardhat_out);
    let contracts = loader.list_available_contracts();
    println!("Available contracts ({}):", contracts.len());
    for name in contracts {
        println!("  - {name}");
    }
    Ok(())
}

fn cmd_clean(config_path: &Path) -> Result<()> {
    println!("Cleaning generated files...");
    let config_path = resolve_path(config_path);
    let config_dir = config_dir_of(&config_path);
    let config = load_config(&config_path)?;

    for target in &config.generation.targets {
        let out_dir = resolve_against(&config_dir, Path::new(&target.out_dir));
        if out_dir.exists() {
            fs::remove_dir_all(&out_dir)?;
            println!("Removed {}", target.out_dir);
        }
    }
    println!("Clean complete");
    Ok(())
}

fn cmd_cache_clear(config_path: &Path) -> Result<()> {
    println!("Clearing caches...");
    let config_path = resolve_path(config_path);
    let config = load_config(&config_path)?;

    let mut cache_manager = CacheManager::new(CACHE_FILE);
    cache_manager.clear()?;
    println!("Build cache cleared");

    if config.artifact_cache_enabled() {
        let config_dir = config_dir_of(&config_path);
        let mut artifact_cache = ArtifactCacheManager::from_config(&config, &config_dir);
        artifact_cache.clear()?;
        println!("Artifact cache cleared");
    } else {
        debug!("artifact caching not enabled, nothing to clear");
    }
    Ok(())
}

fn cmd_cache_stats(config_path: &Path) -> Result<()> {
    let config_path = resolve_path(config_path);
    let config = load_config(&config_path)?;

    if !config.artifact_cache_enabled() {
        println!("Artifact caching is not enabled");
        return Ok(());
    }

    let config_dir = config_dir_of(&config_path);
    let artifact_cache = ArtifactCacheManager::from_config(&config, &config_dir);
    let stats = artifact_cache.stats();
    println!("Cache directory: {}", stats.cache_dir.display());
    println!("Cached artifacts: {}", stats.cached_count);
    if let Some(time) = stats.last_cache_time {
        println!("Last cache time: {}", time.to_rfc3339());
    }
    Ok(())
}

fn cmd_artifacts_list(config_path: &Path) -> Result<()> {
    println!("Resolving artifact paths...\n");
    let config_path = resolve_path(config_path);
    let config_dir = config_dir_of(&config_path);
    let config = load_config(&config_path)?;

    let foundry_out = resolve_against(&config_dir, &config.foundry_out());
    let hardhat_out = config
        .hardhat_out()
        .map(|dir| resolve_against(&config_dir, &dir));
    let loader = ArtifactLoader::with_config(foundry_out, hardhat_out, &config);

    let contract_names = config.all_contract_names();
    let resolved = loader.list_resolved_artifacts(&contract_names);
    println!(
        "Found {} of {} contracts:\n",
        resolved.len(),
        contract_names.len()
    );
    for (name, path) in &resolved {
        println!("  {name:<30} -> {}", path.display());
    }

    let missing: Vec<_> = contract_names
        .iter()
        .filter(|name| !resolved.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        println!("\nMissing artifacts for {} contracts:", missing.len());
        for name in missing {
            println!("  - {name}");
        }
    }
    Ok(())
}

fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

fn config_dir_of(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
