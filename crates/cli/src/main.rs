//! burnmap CLI - wildfire and drought mapping from Sentinel-2 scenes

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use burnmap_algorithms::imagery::{
    assess, build_exclusion_mask, classify, dnbr, dnbr_masked, masked_fraction, ndvi,
    scene_class_counts, true_color, vci, AssessmentInput, ClassRaster, ClassSummary, CompositeParams, Observation, ThresholdTable,
    DNBR_CLASSES, NDVI_CLASSES, VCI_CLASSES,
};
use burnmap_colormap::{
    auto_params, classes_to_rgba, codes_to_rgba, composite_to_rgba, raster_to_rgba,
    ColorScheme, ColormapParams, Palette,
};
use burnmap_core::io::{read_raster, read_scene, write_raster, write_rgba};
use burnmap_core::{Raster, RasterElement, Scene};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "burnmap")]
#[command(author, version, about = "Wildfire and drought mapping from Sentinel-2 scenes", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dimensions and per-band statistics of a scene
    Info {
        /// Input scene (multi-page or multi-sample TIFF)
        input: PathBuf,
    },
    /// Build the cloud/shadow/snow exclusion mask from an SCL raster
    Mask {
        /// Scene Classification Layer raster
        scl: PathBuf,
        /// Output mask (1 = excluded, 0 = usable)
        output: PathBuf,
        /// Write a colour preview of the SCL classes
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Masked NDVI of one scene
    Ndvi {
        /// Input scene
        #[arg(long)]
        scene: PathBuf,
        /// SCL raster of the scene
        #[arg(long)]
        scl: PathBuf,
        /// Output NDVI raster
        output: PathBuf,
        /// Also write NDVI classes
        #[arg(long)]
        classes: Option<PathBuf>,
        /// Write an RGBA preview of the classes
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Vegetation Condition Index against an NDVI history
    Vci {
        /// NDVI raster to evaluate
        #[arg(long)]
        target: PathBuf,
        /// Historical NDVI rasters of the same area
        #[arg(long, num_args = 1..)]
        history: Vec<PathBuf>,
        /// Output VCI raster
        #[arg(short, long)]
        output: PathBuf,
        /// Also write drought classes
        #[arg(long)]
        classes: Option<PathBuf>,
        /// Write an RGBA preview of the classes
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Burn severity (dNBR) between a pre- and a post-fire scene
    Dnbr {
        /// Pre-fire scene
        #[arg(long)]
        pre: PathBuf,
        /// Post-fire scene
        #[arg(long)]
        post: PathBuf,
        /// Output dNBR raster
        output: PathBuf,
        /// SCL of the pre-fire scene (masks dNBR, requires --post-scl)
        #[arg(long, requires = "post_scl")]
        pre_scl: Option<PathBuf>,
        /// SCL of the post-fire scene (masks dNBR, requires --pre-scl)
        #[arg(long, requires = "pre_scl")]
        post_scl: Option<PathBuf>,
        /// Also write severity classes
        #[arg(long)]
        classes: Option<PathBuf>,
        /// Write an RGBA preview of the classes
        #[arg(long)]
        preview: Option<PathBuf>,
    },
    /// Classify an index raster with its threshold table
    Classify {
        /// Which table to apply
        #[arg(long, value_enum)]
        index: IndexKind,
        /// Input index raster
        input: PathBuf,
        /// Output class raster
        output: PathBuf,
        /// Write an RGBA preview of the classes
        #[arg(long)]
        preview: Option<PathBuf>,
        /// Print the class summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a true-colour RGBA preview of a scene
    TrueColor {
        /// Input scene
        scene: PathBuf,
        /// Output RGBA TIFF
        output: PathBuf,
        /// Brightness gain
        #[arg(short, long, default_value = "3.5")]
        gain: f64,
        /// Digital-number to reflectance divisor
        #[arg(short, long, default_value = "10000")]
        scale: f64,
    },
    /// Full wildfire assessment: NDVI, VCI and dNBR with classes and previews
    Assess {
        /// Pre-fire observations as SCENE:SCL
        #[arg(long, num_args = 1.., required = true)]
        pre: Vec<String>,
        /// Position in --pre of the observation closest to the fire
        #[arg(long)]
        latest: Option<usize>,
        /// Post-fire observation as SCENE:SCL
        #[arg(long)]
        post: String,
        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,
        /// Apply SCL masks to dNBR
        #[arg(long)]
        mask_burn_ratio: bool,
        /// Color scheme of the NDVI preview (grayscale, viridis, ndvi, divergent)
        #[arg(long, default_value = "ndvi", value_parser = parse_scheme)]
        scheme: ColorScheme,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IndexKind {
    Ndvi,
    Vci,
    Dnbr,
}

impl IndexKind {
    fn table(self) -> &'static ThresholdTable {
        match self {
            Self::Ndvi => &NDVI_CLASSES,
            Self::Vci => &VCI_CLASSES,
            Self::Dnbr => &DNBR_CLASSES,
        }
    }

    fn palette(self) -> Palette {
        match self {
            Self::Ndvi => Palette::NDVI_CLASSES,
            Self::Vci => Palette::VCI_CLASSES,
            Self::Dnbr => Palette::DNBR_CLASSES,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn load_scene(path: &Path) -> Result<Scene<f64>> {
    let pb = spinner("Reading scene...");
    let scene =
        read_scene(path).with_context(|| format!("Failed to read scene: {}", path.display()))?;
    pb.finish_and_clear();
    debug!(path = %path.display(), shape = ?scene.shape(), bands = scene.band_count(), "scene loaded");
    Ok(scene)
}

fn load_raster<T: RasterElement>(path: &Path) -> Result<Raster<T>> {
    let pb = spinner("Reading raster...");
    let raster =
        read_raster(path).with_context(|| format!("Failed to read raster: {}", path.display()))?;
    pb.finish_and_clear();
    debug!(path = %path.display(), shape = ?raster.shape(), "raster loaded");
    Ok(raster)
}

fn save_raster<T: RasterElement>(raster: &Raster<T>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_raster(raster, path).with_context(|| format!("Failed to write: {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn save_rgba(rgba: &[u8], (rows, cols): (usize, usize), path: &Path) -> Result<()> {
    write_rgba(rgba, rows, cols, path)
        .with_context(|| format!("Failed to write preview: {}", path.display()))?;
    info!("Preview saved to: {}", path.display());
    Ok(())
}

/// Write a class raster and, optionally, its palette preview.
fn save_classes(
    classes: &ClassRaster,
    palette: &Palette,
    output: Option<&Path>,
    preview: Option<&Path>,
) -> Result<()> {
    if let Some(path) = output {
        save_raster(classes.raster(), path)?;
        info!("{} classes saved to: {}", classes.table().name, path.display());
    }
    if let Some(path) = preview {
        save_rgba(&classes_to_rgba(classes, palette), classes.shape(), path)?;
    }
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: Duration) {
    info!("{} saved to: {}", name, path.display());
    info!("  Processing time: {:.2?}", elapsed);
}

fn print_summary(summary: &ClassSummary) {
    println!(
        "{} classes ({} pixels, {} unclassified):",
        summary.index, summary.total_pixels, summary.unclassified
    );
    for c in &summary.classes {
        println!(
            "  {:>2}  {:<24} {:>10}  {:>6.2}%",
            c.class,
            c.label,
            c.count,
            100.0 * c.fraction
        );
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", text);
    Ok(())
}

/// Split `SCENE:SCL` on the last colon.
fn parse_observation(arg: &str) -> Result<(PathBuf, PathBuf)> {
    match arg.rsplit_once(':') {
        Some((scene, scl)) if !scene.is_empty() && !scl.is_empty() => {
            Ok((PathBuf::from(scene), PathBuf::from(scl)))
        }
        _ => bail!("Expected SCENE:SCL, got '{}'", arg),
    }
}

fn parse_scheme(name: &str) -> Result<ColorScheme> {
    match ColorScheme::from_name(name) {
        Some(scheme) => Ok(scheme),
        None => bail!("Unknown color scheme '{}'", name),
    }
}

fn load_observation(arg: &str) -> Result<Observation> {
    let (scene, scl) = parse_observation(arg)?;
    Ok(Observation::new(load_scene(&scene)?, load_raster(&scl)?))
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Info { input } => {
            let scene = load_scene(&input)?;
            let (rows, cols) = scene.shape();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, rows * cols);
            println!("Bands: {}", scene.band_count());
            println!("\nStatistics:");
            for band in 0..scene.band_count() {
                let stats = scene.band(band)?.statistics();
                println!(
                    "  Band {:>2}: min {:>10.4}  max {:>10.4}  mean {:>10.4}  valid {}",
                    band,
                    stats.min.unwrap_or(f64::NAN),
                    stats.max.unwrap_or(f64::NAN),
                    stats.mean.unwrap_or(f64::NAN),
                    stats.valid_count
                );
            }
        }

        Commands::Mask { scl, output, preview } => {
            let scl_raster: Raster<u8> = load_raster(&scl)?;
            let start = Instant::now();
            let mask = build_exclusion_mask(&scl_raster);
            let elapsed = start.elapsed();

            for (class, count) in scene_class_counts(&scl_raster) {
                info!(code = class.code(), "{:<38} {:>10}", class.name(), count);
            }
            info!("Masked fraction: {:.1}%", 100.0 * masked_fraction(&mask));
            save_raster(&mask, &output)?;
            if let Some(path) = preview {
                let rgba = codes_to_rgba(&scl_raster, &Palette::SCL);
                save_rgba(&rgba, scl_raster.shape(), &path)?;
            }
            done("Exclusion mask", &output, elapsed);
        }

        Commands::Ndvi { scene, scl, output, classes, preview } => {
            let scene = load_scene(&scene)?;
            let scl_raster: Raster<u8> = load_raster(&scl)?;
            let start = Instant::now();
            let mask = build_exclusion_mask(&scl_raster);
            let result = ndvi(&scene, &mask)?;
            let elapsed = start.elapsed();

            save_raster(&result, &output)?;
            if classes.is_some() || preview.is_some() {
                let class_raster = classify(&result, IndexKind::Ndvi.table())?;
                save_classes(
                    &class_raster,
                    &IndexKind::Ndvi.palette(),
                    classes.as_deref(),
                    preview.as_deref(),
                )?;
            }
            done("NDVI", &output, elapsed);
        }

        Commands::Vci { target, history, output, classes, preview } => {
            let target: Raster<f64> = load_raster(&target)?;
            let history = history
                .iter()
                .map(|p| load_raster(p))
                .collect::<Result<Vec<Raster<f64>>>>()?;
            info!("VCI over {} historical rasters", history.len());

            let start = Instant::now();
            let result = vci(&target, &history)?;
            let elapsed = start.elapsed();

            save_raster(&result, &output)?;
            if classes.is_some() || preview.is_some() {
                let class_raster = classify(&result, IndexKind::Vci.table())?;
                save_classes(
                    &class_raster,
                    &IndexKind::Vci.palette(),
                    classes.as_deref(),
                    preview.as_deref(),
                )?;
            }
            done("VCI", &output, elapsed);
        }

        Commands::Dnbr { pre, post, output, pre_scl, post_scl, classes, preview } => {
            let pre = load_scene(&pre)?;
            let post = load_scene(&post)?;
            let masks = match (pre_scl, post_scl) {
                (Some(a), Some(b)) => Some((
                    build_exclusion_mask(&load_raster(&a)?),
                    build_exclusion_mask(&load_raster(&b)?),
                )),
                _ => None,
            };

            let start = Instant::now();
            let result = match &masks {
                Some((pre_mask, post_mask)) => dnbr_masked(&pre, &post, pre_mask, post_mask)?,
                None => dnbr(&pre, &post)?,
            };
            let elapsed = start.elapsed();

            save_raster(&result, &output)?;
            if classes.is_some() || preview.is_some() {
                let class_raster = classify(&result, IndexKind::Dnbr.table())?;
                save_classes(
                    &class_raster,
                    &IndexKind::Dnbr.palette(),
                    classes.as_deref(),
                    preview.as_deref(),
                )?;
            }
            done("dNBR", &output, elapsed);
        }

        Commands::Classify { index, input, output, preview, json } => {
            let raster: Raster<f64> = load_raster(&input)?;
            let start = Instant::now();
            let class_raster = classify(&raster, index.table())?;
            let elapsed = start.elapsed();

            save_classes(
                &class_raster,
                &index.palette(),
                Some(output.as_path()),
                preview.as_deref(),
            )?;
            let summary = class_raster.summary();
            if json {
                print_json(&summary)?;
            } else {
                print_summary(&summary);
            }
            done("Classes", &output, elapsed);
        }

        Commands::TrueColor { scene, output, gain, scale } => {
            let scene = load_scene(&scene)?;
            let start = Instant::now();
            let rgb = true_color(&scene, CompositeParams { scale, gain })?;
            let rgba = composite_to_rgba(&rgb)?;
            let elapsed = start.elapsed();

            save_rgba(&rgba, rgb.shape(), &output)?;
            done("True colour", &output, elapsed);
        }

        Commands::Assess { pre, latest, post, out_dir, mask_burn_ratio, scheme, json } => {
            let latest = latest.unwrap_or(pre.len().saturating_sub(1));
            let pre_fire = pre
                .iter()
                .map(|arg| load_observation(arg))
                .collect::<Result<Vec<_>>>()?;
            let post_fire = load_observation(&post)?;

            let input = AssessmentInput {
                pre_fire,
                latest_pre_fire: latest,
                post_fire,
                mask_burn_ratio,
            };

            let pb = spinner("Running assessment...");
            let start = Instant::now();
            let result = assess(&input)?;
            let elapsed = start.elapsed();
            pb.finish_and_clear();

            for failure in &result.skipped {
                warn!(
                    index = failure.index,
                    "Skipped pre-fire scene {}: {}", pre[failure.index], failure.error
                );
            }
            info!(
                "VCI history: {} of {} pre-fire scenes",
                result.history_used,
                input.pre_fire.len().saturating_sub(1)
            );

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let path = |name: &str| out_dir.join(name);

            save_raster(&result.ndvi, &path("ndvi.tif"))?;
            save_raster(&result.vci, &path("vci.tif"))?;
            save_raster(&result.dnbr, &path("dnbr.tif"))?;
            let ndvi_preview = path("ndvi_preview.tif");
            save_rgba(
                &raster_to_rgba(&result.ndvi, &auto_params(&result.ndvi, scheme)),
                result.ndvi.shape(),
                &ndvi_preview,
            )?;
            save_rgba(
                &raster_to_rgba(
                    &result.dnbr,
                    &ColormapParams::symmetric(ColorScheme::Divergent, 1.0),
                ),
                result.dnbr.shape(),
                &path("dnbr_preview.tif"),
            )?;
            for (classes, kind) in [
                (&result.ndvi_classes, IndexKind::Ndvi),
                (&result.vci_classes, IndexKind::Vci),
                (&result.dnbr_classes, IndexKind::Dnbr),
            ] {
                let name = classes.table().name;
                save_classes(
                    classes,
                    &kind.palette(),
                    Some(path(&format!("{}_classes.tif", name)).as_path()),
                    Some(path(&format!("{}_classes_preview.tif", name)).as_path()),
                )?;
            }

            let report = result.report();
            let report_path = path("assessment.json");
            let file = File::create(&report_path)
                .with_context(|| format!("Failed to create {}", report_path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), &report)
                .context("Failed to write assessment report")?;

            if json {
                print_json(&report)?;
            } else {
                print_summary(&report.ndvi);
                print_summary(&report.vci);
                print_summary(&report.dnbr);
            }
            done("Assessment", &out_dir, elapsed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_observation_pairs() {
        let (scene, scl) = parse_observation("data/pre_1.tif:data/pre_1_scl.tif").unwrap();
        assert_eq!(scene, PathBuf::from("data/pre_1.tif"));
        assert_eq!(scl, PathBuf::from("data/pre_1_scl.tif"));

        // Only the last colon separates
        let (scene, scl) = parse_observation("C:/scenes/a.tif:C:/scenes/a_scl.tif").unwrap();
        assert_eq!(scene, PathBuf::from("C:/scenes/a.tif:C"));
        assert_eq!(scl, PathBuf::from("/scenes/a_scl.tif"));
    }

    #[test]
    fn parse_observation_rejects_bad_input() {
        assert!(parse_observation("scene.tif").is_err());
        assert!(parse_observation("scene.tif:").is_err());
        assert!(parse_observation(":scl.tif").is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn assess_arguments() {
        let cli = Cli::try_parse_from([
            "burnmap", "assess", "--pre", "a.tif:a_scl.tif", "b.tif:b_scl.tif", "--latest", "1",
            "--post", "c.tif:c_scl.tif", "--out-dir", "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Assess { pre, latest, mask_burn_ratio, scheme, .. } => {
                assert_eq!(pre.len(), 2);
                assert_eq!(latest, Some(1));
                assert!(!mask_burn_ratio);
                assert_eq!(scheme, ColorScheme::Ndvi);
            }
            _ => panic!("expected assess"),
        }
    }

    #[test]
    fn assess_scheme_option() {
        let args = |scheme: &'static str| {
            [
                "burnmap", "assess", "--pre", "a.tif:a_scl.tif", "--post", "c.tif:c_scl.tif",
                "--out-dir", "out", "--scheme", scheme,
            ]
        };
        match Cli::try_parse_from(args("Viridis")).unwrap().command {
            Commands::Assess { scheme, .. } => assert_eq!(scheme, ColorScheme::Viridis),
            _ => panic!("expected assess"),
        }
        assert!(Cli::try_parse_from(args("terrain")).is_err());
    }

    #[test]
    fn vci_arguments() {
        let cli = Cli::try_parse_from([
            "burnmap", "vci", "--target", "t.tif", "--history", "a.tif", "b.tif", "-o", "out.tif",
            "--classes", "classes.tif",
        ])
        .unwrap();
        match cli.command {
            Commands::Vci { target, history, output, classes, preview } => {
                assert_eq!(target, PathBuf::from("t.tif"));
                assert_eq!(history, vec![PathBuf::from("a.tif"), PathBuf::from("b.tif")]);
                assert_eq!(output, PathBuf::from("out.tif"));
                assert_eq!(classes, Some(PathBuf::from("classes.tif")));
                assert_eq!(preview, None);
            }
            _ => panic!("expected vci"),
        }

        // Output may come before the history list too
        let cli = Cli::try_parse_from([
            "burnmap", "vci", "--output", "out.tif", "--target", "t.tif", "--history", "a.tif",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Vci { ref history, .. } if history.len() == 1));
    }

    #[test]
    fn index_tables_and_palettes_agree() {
        for kind in [IndexKind::Ndvi, IndexKind::Vci, IndexKind::Dnbr] {
            assert_eq!(Palette::for_index(kind.table().name), Some(kind.palette()));
        }
    }
}
