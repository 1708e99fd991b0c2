//! season-scan - personal color season from a portrait
//!
//! Runs the analysis pipeline on one photo and prints the season with its
//! styling recommendations.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use season_scan::detection::{precomputed, PrecomputedLocator};
use season_scan::season::{OccasionCategory, StyleGuide, WARDROBE_TIPS};
use season_scan::{
    image_loader, AnalysisError, FaceLocator, KnowledgeBase, PipelineConfig, Presentation, Season,
    SeasonAnalysis, SeasonAnalyzer,
};

#[derive(Parser)]
#[command(name = "season-scan")]
#[command(author, version, about = "Personal color season analysis from a portrait photo")]
#[command(long_about = "
Estimates a personal color season from the skin tone of a front-facing
portrait and prints matching styling recommendations.

Examples:
  season-scan analyze photo.jpg --landmarks photo.json
  season-scan analyze photo.jpg --cascade haarcascade_frontalface_default.xml --landmark-model lbfmodel.yaml
  season-scan analyze photo.jpg --landmarks photo.json --gender male --occasion \"Cocktail Party\"
  season-scan analyze photo.jpg --landmarks photo.json --json
  season-scan config > pipeline.json
  season-scan seasons
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a portrait and print its season
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Detect faces and print their landmarks as JSON
    Detect(DetectArgs),

    /// Print the default pipeline configuration as JSON
    Config,

    /// List season labels; reachable ones are marked with *
    Seasons,
}

#[derive(Args)]
struct LocatorArgs {
    /// Landmark JSON produced by an external detector
    #[arg(short, long)]
    landmarks: Option<PathBuf>,

    /// Haar cascade XML (requires the opencv feature)
    #[arg(long)]
    cascade: Option<PathBuf>,

    /// LBF facemark model (requires the opencv feature)
    #[arg(long)]
    landmark_model: Option<PathBuf>,

    /// Pipeline configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Input photo
    image: PathBuf,

    #[command(flatten)]
    locator: LocatorArgs,

    /// Which recommendations to show
    #[arg(short, long, value_enum, default_value = "female")]
    gender: Gender,

    /// Occasion for an outfit suggestion, e.g. "Business Formal"
    #[arg(short, long)]
    occasion: Option<String>,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,

    /// Write the sampled skin mask as a grayscale PNG
    #[arg(long)]
    save_mask: Option<PathBuf>,
}

#[derive(Args)]
struct DetectArgs {
    /// Input photo
    image: PathBuf,

    #[command(flatten)]
    locator: LocatorArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum Gender {
    Female,
    Male,
}

impl From<Gender> for Presentation {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Female => Presentation::Female,
            Gender::Male => Presentation::Male,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Detect(args) => run_detect(args),
        Commands::Config => run_config(),
        Commands::Seasons => run_seasons(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AnalysisError>() {
                Some(analysis) => {
                    eprintln!("{}", analysis.user_message());
                    if cli.verbose {
                        eprintln!("Details: {:#}", err);
                    }
                }
                None => eprintln!("Error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &LocatorArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    if args.cascade.is_some() {
        config.face_detection.cascade_path = args.cascade.clone();
    }
    if args.landmark_model.is_some() {
        config.face_detection.landmark_model_path = args.landmark_model.clone();
    }
    Ok(config)
}

fn build_locator(args: &LocatorArgs, config: &PipelineConfig) -> Result<Arc<dyn FaceLocator>> {
    if let Some(path) = &args.landmarks {
        let locator = PrecomputedLocator::from_json_file(path)
            .with_context(|| format!("Failed to load landmarks from {}", path.display()))?;
        return Ok(Arc::new(locator));
    }
    opencv_locator(config)
}

#[cfg(feature = "opencv")]
fn opencv_locator(config: &PipelineConfig) -> Result<Arc<dyn FaceLocator>> {
    let locator = season_scan::detection::CascadeLandmarkLocator::from_config(&config.face_detection)?;
    Ok(Arc::new(locator))
}

#[cfg(not(feature = "opencv"))]
fn opencv_locator(config: &PipelineConfig) -> Result<Arc<dyn FaceLocator>> {
    let detection = &config.face_detection;
    if detection.cascade_path.is_some() || detection.landmark_model_path.is_some() {
        anyhow::bail!("OpenCV face detection is not available; rebuild with `--features opencv`");
    }
    anyhow::bail!("No face locator configured; pass --landmarks FILE");
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = load_config(&args.locator)?;
    let locator = build_locator(&args.locator, &config)?;
    let analyzer = SeasonAnalyzer::new(locator, config)?;

    let image = image_loader::load_image(&args.image)?;
    let (analysis, mask) = analyzer.analyze_with_mask(&image)?;

    if let Some(path) = &args.save_mask {
        mask.to_gray_image()
            .save(path)
            .with_context(|| format!("Failed to write mask {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    let knowledge = KnowledgeBase::builtin()?;
    print_report(&args.image, &analysis, knowledge, args.gender.into(), args.occasion.as_deref())
}

fn print_report(
    image: &Path,
    analysis: &SeasonAnalysis,
    knowledge: &KnowledgeBase,
    presentation: Presentation,
    occasion: Option<&str>,
) -> Result<()> {
    let profile = knowledge.profile(analysis.season)?;
    let selected = &analysis.selected;

    println!("Image:  {}", image.display());
    println!("Season: {}", analysis.season);
    println!(
        "Skin:   {} (H {} S {} V {}) from {} pixels",
        selected.hex, selected.color.hue, selected.color.saturation, selected.color.value, analysis.skin_pixels
    );
    println!();
    println!("{}", profile.description);

    println!();
    println!("Palette:");
    for swatch in &profile.palette {
        println!("  {:<20} {}  {}", swatch.name, swatch.hex, swatch.reason);
    }

    println!();
    println!("Hair:");
    for hair in &profile.hair {
        println!("  {:<20} {}", hair.name, hair.reason);
    }

    let heading = match presentation {
        Presentation::Female => "Makeup",
        Presentation::Male => "Grooming",
    };
    println!();
    println!("{}:", heading);
    for (item, reason) in profile.makeup_for(presentation) {
        println!("  {:<28} {}", item, reason);
    }

    println!();
    println!("Jewelry & accessories:");
    for (item, reason) in profile.jewelry_for(presentation) {
        println!("  {:<28} {}", item, reason);
    }

    println!();
    println!("Avoid:");
    for avoid in &profile.avoid {
        println!("  {:<20} {}", avoid.name, avoid.reason);
    }

    if let Some(occasion) = occasion {
        println!();
        println!("{}:", occasion);
        match profile.occasion_look(occasion, presentation) {
            Some(look) => {
                println!("  Outfit:      {}", look.outfit);
                println!("  Shoes:       {}", look.shoes);
                println!("  Accessories: {}", look.accessories);
                println!("  {:<12} {}", format!("{}:", heading), look.finishing);
            }
            None => println!("  No specific recommendations for this occasion."),
        }
        if let Some(category) = OccasionCategory::of(occasion) {
            for tip in category.tips() {
                println!("  - {}", tip);
            }
        }
    }

    let guide = StyleGuide::new(analysis.season, profile, presentation);
    println!();
    println!("Style guide:");
    println!("  Power colors: {}", guide.power_colors.join(", "));
    println!("  Best metals:  {}", guide.best_metals.join(", "));
    println!("  Avoid:        {}", guide.avoid.join(", "));
    for (word, target) in &guide.focus {
        println!("  Focus on {} for {}", word, target);
    }
    for tip in WARDROBE_TIPS {
        println!("  - {}", tip);
    }
    Ok(())
}

fn run_detect(args: DetectArgs) -> Result<()> {
    let config = load_config(&args.locator)?;
    let locator = build_locator(&args.locator, &config)?;
    let image = image_loader::load_image(&args.image)?;
    let faces = locator.detect(&image)?;
    if faces.is_empty() {
        return Err(AnalysisError::NoFaceDetected.into());
    }
    println!("{}", precomputed::faces_to_json(&faces)?);
    Ok(())
}

fn run_config() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&PipelineConfig::default())?);
    Ok(())
}

fn run_seasons() -> Result<()> {
    let knowledge = KnowledgeBase::builtin()?;
    for season in Season::ALL {
        let marker = if season.is_reachable() { "*" } else { " " };
        let colors = knowledge
            .profile(season)
            .map(|profile| profile.palette.len())
            .unwrap_or(0);
        println!("{} {:<14} {:?}  {} colors", marker, season, season.family(), colors);
    }
    Ok(())
}
