//! cardset CLI: extract rectified playing cards from frame sequences.

use cardset::debug::save_overlay;
use cardset::hulls::{category_for_dir, hulls_in_dir};
use cardset::{
    BoxCorner, CardExtractor, CardGeometry, CardLabel, CardStore, DatasetBuilder, ExtractConfig,
    ImageSequenceSource, Rank, RankCategory, Suit, SymbolHullExtractor,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::DynamicImage;
use nalgebra::Point2;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "cardset")]
#[command(about = "Extract rectified, alpha-masked playing cards from video frames")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Args)]
struct GlobalArgs {
    /// JSON extraction config (see `init-config`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Zoom factor from millimetres to canonical pixels; overrides the config.
    #[arg(long, global = true)]
    zoom: Option<u32>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract cards from one directory of frames.
    Extract {
        /// Directory of sequential frame images.
        frames: PathBuf,
        /// Output directory; cleared before writing.
        out: PathBuf,
        /// Write identifier-box overlays of the extracted cards here.
        #[arg(long)]
        debug_dir: Option<PathBuf>,
    },

    /// Extract every `{rank}{suit}` label of a frames tree.
    Dataset(DatasetArgs),

    /// Find glyph hulls in a directory of extracted cards.
    Hulls(HullArgs),

    /// Write a config file with every default spelled out.
    InitConfig {
        /// Destination JSON path.
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct DatasetArgs {
    /// Root holding one frame directory per label (`As`, `10h`, ...).
    input: PathBuf,
    /// Dataset root; cleared before writing.
    output: PathBuf,
    /// Comma-separated suit tokens.
    #[arg(long, default_value = "s,h,d,c")]
    suits: String,
    /// Comma-separated rank tokens.
    #[arg(long, default_value = "A,K,Q,J,10,9,8,7,6")]
    ranks: String,
    /// Write the per-label summary as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct HullArgs {
    /// Directory of extracted card PNGs.
    cards: PathBuf,
    /// Identifier box family; inferred from a `{rank}{suit}` directory name when omitted.
    #[arg(long, value_enum)]
    category: Option<CategoryArg>,
    /// Which corner box to search.
    #[arg(long, value_enum, default_value_t = CornerArg::TopLeft)]
    corner: CornerArg,
    /// Write the hull records as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// Write hull overlays here.
    #[arg(long)]
    debug_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CategoryArg {
    Face,
    Ace,
    Numeral,
}

impl From<CategoryArg> for RankCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Face => RankCategory::Face,
            CategoryArg::Ace => RankCategory::Ace,
            CategoryArg::Numeral => RankCategory::Numeral,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CornerArg {
    TopLeft,
    BottomRight,
}

impl From<CornerArg> for BoxCorner {
    fn from(value: CornerArg) -> Self {
        match value {
            CornerArg::TopLeft => BoxCorner::TopLeft,
            CornerArg::BottomRight => BoxCorner::BottomRight,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    if let Err(e) = run(cli) {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = cardset_core::level_from_verbosity(verbose);
    #[cfg(feature = "tracing")]
    {
        // RUST_LOG, when set, wins over -v
        cardset_core::init_tracing(false, level);
        let _ = tracing_log::LogTracer::init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = cardset_core::init_with_level(level);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(&cli.global)?;
    match cli.command {
        Commands::Extract {
            frames,
            out,
            debug_dir,
        } => run_extract(&config, &frames, &out, debug_dir.as_deref()),
        Commands::Dataset(args) => run_dataset(&config, &args),
        Commands::Hulls(args) => run_hulls(&config, &args),
        Commands::InitConfig { path } => {
            config.resolved().write_json(&path)?;
            println!("wrote {}", path.display());
            Ok(())
        }
    }
}

fn load_config(global: &GlobalArgs) -> CliResult<ExtractConfig> {
    let mut config = match &global.config {
        Some(path) => ExtractConfig::load_json(path)?,
        None => ExtractConfig::default(),
    };
    if let Some(zoom) = global.zoom {
        config.zoom = zoom;
    }
    Ok(config)
}

fn build_extractor(config: &ExtractConfig) -> CliResult<CardExtractor> {
    let geometry = config.build_geometry()?;
    Ok(CardExtractor::new(geometry, &config.params()))
}

fn run_extract(
    config: &ExtractConfig,
    frames: &Path,
    out: &Path,
    debug_dir: Option<&Path>,
) -> CliResult<()> {
    let extractor = build_extractor(config)?;
    let mut source = ImageSequenceSource::open(frames)?;
    let store = CardStore::prepare(out)?;

    let outcome = cardset::FrameSampler::new(&extractor, config.params().sampler)
        .with_store(store)
        .run(&mut source);

    if let Some(dir) = debug_dir {
        std::fs::create_dir_all(dir)?;
        let geometry = extractor.geometry();
        let boxes = identifier_boxes(geometry);
        for (card, path) in outcome.cards.iter().zip(&outcome.paths) {
            let name = overlay_name(path);
            let img = DynamicImage::ImageRgba8(card.image.clone());
            save_overlay(dir.join(name), &img, &boxes)?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(())
}

fn run_dataset(config: &ExtractConfig, args: &DatasetArgs) -> CliResult<()> {
    let suits = parse_tokens::<Suit>(&args.suits)?;
    let ranks = parse_tokens::<Rank>(&args.ranks)?;
    let labels = CardLabel::product(&suits, &ranks);

    let extractor = build_extractor(config)?;
    let summary = DatasetBuilder::new(&extractor, config.params().sampler).run(
        &args.input,
        &args.output,
        &labels,
    )?;

    log::info!(
        "{} cards over {} labels ({} unavailable)",
        summary.total_cards(),
        summary.labels.len(),
        summary.failed().count()
    );
    if let Some(path) = &args.json {
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
    }
    Ok(())
}

fn run_hulls(config: &ExtractConfig, args: &HullArgs) -> CliResult<()> {
    let geometry = config.build_geometry()?;
    let category = args
        .category
        .map(RankCategory::from)
        .or_else(|| category_for_dir(&args.cards))
        .unwrap_or(RankCategory::Numeral);
    let corner = BoxCorner::from(args.corner);

    let extractor = SymbolHullExtractor::new(geometry, config.params().hull);
    let records = hulls_in_dir(&args.cards, &extractor, category, corner)?;

    if let Some(dir) = &args.debug_dir {
        std::fs::create_dir_all(dir)?;
        for record in &records {
            let Some(hull) = &record.hull else {
                continue;
            };
            let img = image::open(&record.file)?;
            save_overlay(dir.join(overlay_name(&record.file)), &img, &[hull.points.clone()])?;
        }
    }

    let json = serde_json::to_string_pretty(&records)?;
    match &args.json {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn parse_tokens<T>(list: &str) -> CliResult<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + 'static,
{
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<T>().map_err(|e| Box::new(e) as CliError))
        .collect()
}

fn identifier_boxes(geometry: &CardGeometry) -> Vec<Vec<Point2<f32>>> {
    [RankCategory::Face, RankCategory::Ace, RankCategory::Numeral]
        .into_iter()
        .flat_map(|category| {
            let b = geometry.identifier_box_for(category);
            [BoxCorner::TopLeft, BoxCorner::BottomRight]
                .map(|corner| geometry.box_corners(b, corner).to_vec())
        })
        .collect()
}

fn overlay_name(card: &Path) -> String {
    let stem = card
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "card".to_string());
    format!("{stem}_overlay.png")
}
