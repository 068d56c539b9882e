use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use chrono::Local;
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;
use serde::Serialize;

use pcd_core::pointcloud::point::Point;
use pcd_projector::{CameraProjection, FrameProjection};
use rigcal::{
    config::load_config,
    dataset::Dataset,
    service::{CalibrationService, DEFAULT_MAX_POINTS},
    AppError,
};

#[derive(Parser, Debug)]
#[command(
    name = "rigcal",
    about = "Inspect LiDAR frames and project them onto a calibrated camera rig",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List frame ids of a dataset and the missing runs between them
    Frames {
        #[arg(short, long, value_name = "DIR")]
        dataset: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Dump the capped points of one frame
    Points {
        #[arg(short, long, value_name = "DIR")]
        dataset: PathBuf,

        #[arg(short, long)]
        frame: String,

        #[arg(long, default_value_t = DEFAULT_MAX_POINTS)]
        max_points: usize,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Project one frame onto every configured camera
    Project {
        #[arg(short, long, value_name = "DIR")]
        dataset: PathBuf,

        #[arg(short, long)]
        frame: String,

        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,

        #[arg(long, default_value_t = DEFAULT_MAX_POINTS)]
        max_points: usize,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Rig configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show {
        #[arg(short, long, value_name = "FILE", default_value = "config.json")]
        config: PathBuf,
    },
}

#[derive(Serialize)]
struct FramesOutput {
    frames: Vec<String>,
    gaps: Vec<(u64, u64)>,
}

#[derive(Serialize)]
struct PointsOutput<'a> {
    points: &'a [Point],
}

#[derive(Serialize)]
#[serde(untagged)]
enum CameraOverlay {
    Projected(FrameProjection),
    Failed { error: String },
}

impl From<CameraProjection> for CameraOverlay {
    fn from(projection: CameraProjection) -> Self {
        match projection.result {
            Ok(frame) => Self::Projected(frame),
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
struct OverlayOutput {
    frame: String,
    cameras: BTreeMap<String, CameraOverlay>,
}

fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<(), AppError> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer(&mut writer, value)?;
            writer.flush()?;
            log::info!("wrote {:?}", path);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer(&mut writer, value)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Frames { dataset, output } => {
            let dataset = Dataset::open(dataset)?;
            let frames = dataset.frames()?;
            let gaps = dataset.gaps()?;
            log::info!("{} frames, {} gaps", frames.len(), gaps.len());
            write_json(output.as_deref(), &FramesOutput { frames, gaps })
        }
        Command::Points {
            dataset,
            frame,
            max_points,
            output,
        } => {
            let service =
                CalibrationService::new(Dataset::open(dataset)?, Default::default(), max_points);
            let start = std::time::Instant::now();
            let cloud = service.points(&frame)?;
            log::info!(
                "frame {}: {} points (budget {}) in {:?}",
                frame,
                cloud.len(),
                service.cache().max_points(),
                start.elapsed()
            );
            write_json(
                output.as_deref(),
                &PointsOutput {
                    points: &cloud.points,
                },
            )
        }
        Command::Project {
            dataset,
            frame,
            config,
            max_points,
            output,
        } => {
            let rig = load_config(&config)?;
            let service = CalibrationService::new(Dataset::open(dataset)?, rig, max_points);
            log::info!("{} cameras configured", service.rig().cameras.len());

            let start = std::time::Instant::now();
            let cameras: BTreeMap<String, CameraOverlay> = service
                .overlay(&frame)?
                .into_iter()
                .map(|projection| (projection.camera.clone(), projection.into()))
                .collect();
            log::info!("projected frame {} in {:?}", frame, start.elapsed());

            write_json(output.as_deref(), &OverlayOutput { frame, cameras })
        }
        Command::Config {
            action: ConfigAction::Show { config },
        } => {
            let rig = load_config(&config)?;
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &rig)?;
            writeln!(writer)?;
            Ok(())
        }
    }
}

fn main() {
    let args = Cli::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(args.command) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
