use clap::{ArgGroup, Parser};
use std::error::Error;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use spot_group_reader::config::SpotConfig;
use spot_group_reader::detect::COMPONENT_THRESHOLD;
use spot_group_reader::geom::{convex_hull, select_baseline};
use spot_group_reader::pipeline::{self, GroupSummary};
use spot_group_reader::plot::render_geometry_rgba;
use spot_group_reader::synth;

#[derive(Parser, Debug)]
#[command(
    name = "grouper",
    about = "Detect spot groups in images: annotated overview, per-group crops, canonical rotations",
    version,
    group(
        ArgGroup::new("action")
            .required(true)
            .multiple(true)
            .args(["annotate", "crops", "canonical", "plot", "summary"])
    )
)]
struct Cli {
    /// Directory containing input images
    #[arg(short = 'd', long = "dir")]
    dir: PathBuf,

    /// Optional JSON config file (defaults apply for missing fields)
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Save the full image with ellipses around retained groups
    #[arg(long = "annotate", short = 'a')]
    annotate: bool,

    /// Save one cropped PNG per retained group
    #[arg(long = "crops", short = 'c')]
    crops: bool,

    /// Also save each crop rotated into canonical orientation
    #[arg(long = "canonical", short = 'r')]
    canonical: bool,

    /// Save a centroid/hull/baseline plot per retained group
    #[arg(long = "plot", short = 'p')]
    plot: bool,

    /// Write a JSON summary of group geometry per image
    #[arg(long = "summary", short = 's')]
    summary: bool,

    /// Generate a synthetic demo pattern into the directory before processing
    #[arg(long = "demo")]
    demo: bool,
}

fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        return false;
    };
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "bmp" | "gif" | "tif" | "tiff" | "webp"
    )
}

fn load_config(path: Option<&Path>) -> Result<SpotConfig, Box<dyn Error>> {
    let config = match path {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => SpotConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn write_demo_pattern(dir: &Path) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    let mut centers = synth::dot_grid((120.0, 120.0), 6, 6, 14.0);
    centers.extend(synth::dot_grid((520.0, 340.0), 5, 8, 14.0));
    let img = synth::spot_pattern(800, 600, &centers, 3.0);
    let path = dir.join("demo_spots.png");
    img.save(&path)?;
    Ok(path)
}

fn process_image(image_path: &Path, cli: &Cli, config: &SpotConfig) {
    let stem = image_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("image")
        .to_string();

    let img = match image::open(image_path) {
        Ok(v) => v.to_rgba8(),
        Err(e) => {
            eprintln!("Failed to open {}: {e}", image_path.display());
            return;
        }
    };

    let outcome = match pipeline::group_spots(&img, config) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Grouping failed for {}: {e}", image_path.display());
            return;
        }
    };

    if cli.annotate {
        let out = PathBuf::from(format!("{stem}_all_groups.png"));
        if let Err(e) = outcome.annotated.save(&out) {
            eprintln!("Failed to save {} for {}: {e}", out.display(), image_path.display());
        }
    }

    if cli.summary {
        let summary = GroupSummary::new(&img, &outcome);
        let out = PathBuf::from(format!("{stem}_groups.json"));
        match serde_json::to_string_pretty(&summary) {
            Ok(s) => {
                if let Err(e) = fs::write(&out, s) {
                    eprintln!("Failed to write {} for {}: {e}", out.display(), image_path.display());
                }
            }
            Err(e) => eprintln!("Failed to serialize summary for {}: {e}", image_path.display()),
        }
    }

    for group in &outcome.groups {
        let idx = group.index;

        if cli.crops {
            let out = PathBuf::from(format!("{stem}_group_{idx}.png"));
            if let Err(e) = group.image.save(&out) {
                eprintln!("Failed to save {} for {}: {e}", out.display(), image_path.display());
            }
        }

        if !cli.canonical && !cli.plot {
            continue;
        }

        // Both the canonical rotation and the plot work on the crop's bright
        // component centroids, not the raw spot pixels.
        let centroids = match spot_group_reader::detect::component_centroids(
            &group.image,
            COMPONENT_THRESHOLD,
        ) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Centroid detection failed for {stem} group {idx}: {e}");
                continue;
            }
        };

        if cli.canonical {
            match pipeline::canonicalize_group(&group.image, &centroids) {
                Ok(canonical) => {
                    let out = PathBuf::from(format!("{stem}_group_{idx}_canonical.png"));
                    if let Err(e) = canonical.image.save(&out) {
                        eprintln!(
                            "Failed to save {} for {}: {e}",
                            out.display(),
                            image_path.display()
                        );
                    }
                }
                Err(e) => {
                    eprintln!("Skipping canonical rotation for {stem} group {idx}: {e}");
                }
            }
        }

        if cli.plot {
            let (w, h) = group.image.dimensions();
            let hull = convex_hull(&centroids).ok();
            let baseline = select_baseline(&centroids).ok();
            match render_geometry_rgba(w, h, &centroids, hull.as_ref(), baseline.as_ref()) {
                Ok(pixels) if !pixels.is_empty() => {
                    let out = PathBuf::from(format!("{stem}_group_{idx}_plot.png"));
                    if let Some(rgba) = image::RgbaImage::from_raw(w, h, pixels) {
                        if let Err(e) = rgba.save(&out) {
                            eprintln!(
                                "Failed to save plot {} for {}: {e}",
                                out.display(),
                                image_path.display()
                            );
                        }
                    } else {
                        eprintln!("Failed to build RGBA image for plot ({w}x{h})");
                    }
                }
                Ok(_) => eprintln!("Plot skipped (empty crop) for {stem} group {idx}"),
                Err(e) => eprintln!("Failed to render plot for {stem} group {idx}: {e}"),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.demo {
        let path = write_demo_pattern(&cli.dir)?;
        eprintln!("Wrote demo pattern to {}", path.display());
    }

    if !cli.dir.is_dir() {
        return Err(format!("Not a directory: {}", cli.dir.display()).into());
    }

    let mut images: Vec<PathBuf> = fs::read_dir(&cli.dir)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();

    images.sort();

    if images.is_empty() {
        eprintln!("No images found in {}", cli.dir.display());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;

    // Images are independent; fan each one out to a blocking worker.
    let cli = Arc::new(cli);
    let config = Arc::new(config);
    let tasks: Vec<_> = images
        .into_iter()
        .map(|image_path| {
            let cli = Arc::clone(&cli);
            let config = Arc::clone(&config);
            tokio::task::spawn_blocking(move || process_image(&image_path, &cli, &config))
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        if let Err(e) = result {
            eprintln!("Worker task failed: {e}");
        }
    }

    Ok(())
}
