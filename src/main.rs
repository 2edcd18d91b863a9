use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use vton::{config, store, GarmentCategory, OnnxPoseEstimator, TryOn, TryOnPipeline};

#[derive(Parser)]
#[command(name = "vton")]
#[command(version, about = "Virtual try-on - fit garment images onto person photos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a person image in the catalog
    AddPerson {
        /// Display name for the person
        name: String,
        /// Path to the person's photo
        image: PathBuf,
    },
    /// Register a garment image in the catalog
    AddGarment {
        /// Display name for the garment
        name: String,
        /// Garment category: top, bottom or full
        category: GarmentCategory,
        /// Path to the garment image (PNG with transparency preferred)
        image: PathBuf,
    },
    /// List catalog contents
    List,
    /// Fit a garment onto a person and write the composite
    TryOn {
        /// Person name as registered in the catalog
        #[arg(short, long)]
        person: String,
        /// Garment name as registered in the catalog
        #[arg(short, long)]
        garment: String,
        /// Destination path for the result image
        #[arg(short, long, default_value = "try_on_result.jpg")]
        output: PathBuf,
        /// Override the configured pose model path
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Open config file in editor
    Config,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::AddPerson { name, image } => add_person(&name, &image),
        Commands::AddGarment {
            name,
            category,
            image,
        } => add_garment(&name, category, &image),
        Commands::List => list(),
        Commands::TryOn {
            person,
            garment,
            output,
            model,
        } => try_on(&person, &garment, &output, model),
        Commands::Config => open_config(),
    }
}

fn add_person(name: &str, image: &PathBuf) -> Result<()> {
    image::image_dimensions(image)
        .with_context(|| format!("not a readable image: {}", image.display()))?;
    store::add_person(name, &image.to_string_lossy()).context("Failed to save person record")?;
    info!("✓ Person registered: {}", name);
    Ok(())
}

fn add_garment(name: &str, category: GarmentCategory, image: &PathBuf) -> Result<()> {
    image::image_dimensions(image)
        .with_context(|| format!("not a readable image: {}", image.display()))?;
    store::add_garment(name, category, &image.to_string_lossy())
        .context("Failed to save garment record")?;
    info!("✓ Garment registered: {} ({})", name, category);
    Ok(())
}

fn list() -> Result<()> {
    let catalog = store::load_catalog().context("Failed to load catalog")?;

    info!("People ({}):", catalog.people.len());
    for p in &catalog.people {
        info!("  {} -> {}", p.name, p.image_path);
    }
    info!("Garments ({}):", catalog.garments.len());
    for g in &catalog.garments {
        info!("  {} [{}] -> {}", g.name, g.category, g.image_path);
    }
    Ok(())
}

fn try_on(person: &str, garment: &str, output: &PathBuf, model: Option<PathBuf>) -> Result<()> {
    let cfg = config::load_config(None)?;
    let catalog = store::load_catalog().context("Failed to load catalog")?;

    let person_rec = catalog
        .find_person(person)
        .with_context(|| format!("person not found in catalog: {person}"))?;
    let garment_rec = catalog
        .find_garment(garment)
        .with_context(|| format!("garment not found in catalog: {garment}"))?;

    let model_path = model
        .or(cfg.pose_model)
        .context("no pose model configured; set pose_model in config or pass --model")?;

    info!("Loading pose model: {}", model_path.display());
    let estimator =
        OnnxPoseEstimator::from_file(&model_path, cfg.pose_input_size, cfg.score_threshold)
            .context("Failed to initialize pose estimator")?;

    let mut pipeline = TryOnPipeline::new(Box::new(estimator));

    info!(
        "Fitting '{}' onto '{}'",
        garment_rec.name, person_rec.name
    );
    let outcome = pipeline.try_on_paths(
        std::path::Path::new(&person_rec.image_path),
        std::path::Path::new(&garment_rec.image_path),
        garment_rec.category,
    )?;

    match &outcome {
        TryOn::Fitted(_) => info!("✓ Garment fitted"),
        TryOn::PoseNotDetected(_) => {
            warn!("No pose detected; writing the original image unchanged")
        }
    }

    let image = outcome.into_image();
    image
        .save(output)
        .with_context(|| format!("writing result to {}", output.display()))?;
    info!("Result saved to {}", output.display());
    Ok(())
}

fn open_config() -> Result<()> {
    let config_path = config::CONFIG_PATH.as_os_str();
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    info!("Opening config file: {:?}", config_path);

    let status = std::process::Command::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        anyhow::bail!("Editor exited with non-zero status");
    }

    Ok(())
}
