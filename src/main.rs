//! Adaptive Binarize CLI
//!
//! Renders the filter over two seeded noise clips and prints a digest of
//! the output, so runs can be compared bit for bit.

use std::path::PathBuf;
use std::process::ExitCode;

use adaptive_binarize::{
    config::{ConfigError, FileConfig},
    filter::{self, FILTER_NAME},
    format::VideoInfo,
    host::{ArgMap, Core, FrameRef, MemoryClip},
    metrics::{MetricsRegistry, MetricsSnapshot},
};
use clap::Parser;
use tracing::{debug, info};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "abrz")]
#[command(about = "Binarize where one clip is darker than another by at least c")]
#[command(version)]
struct Cli {
    /// TOML configuration file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Threshold: output is set where clip - clip2 <= -c.
    #[arg(short = 'c', allow_negative_numbers = true)]
    c: Option<i32>,

    /// Frame width in pixels.
    #[arg(long)]
    width: Option<usize>,

    /// Frame height in pixels.
    #[arg(long)]
    height: Option<usize>,

    /// Number of frames to render.
    #[arg(long)]
    frames: Option<usize>,

    /// Source format, e.g. gray8, gray16, yuv420p8.
    #[arg(long)]
    format: Option<String>,

    /// Noise seed of the first clip; the second uses seed + 1.
    #[arg(long)]
    seed: Option<u64>,

    /// Print Prometheus metrics after rendering.
    #[arg(long)]
    metrics: bool,

    /// Render frames one at a time on the calling thread.
    #[arg(long)]
    serial: bool,
}

impl Cli {
    fn resolve(self) -> Result<FileConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        if let Some(c) = self.c {
            config.filter.c = c;
        }
        if let Some(width) = self.width {
            config.source.width = width;
        }
        if let Some(height) = self.height {
            config.source.height = height;
        }
        if let Some(frames) = self.frames {
            config.source.frames = frames;
        }
        if let Some(format) = self.format {
            config.source.format = format;
        }
        if let Some(seed) = self.seed {
            config.source.seed = seed;
        }
        config.output.metrics |= self.metrics;
        if self.serial {
            config.output.parallel = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    info!("Adaptive Binarize v{}", adaptive_binarize::VERSION);

    let config = cli.resolve()?;
    let source = &config.source;
    let format = source.video_format()?;
    let info = VideoInfo::new(format, source.width, source.height, source.frames);

    info!(
        format = %format,
        width = source.width,
        height = source.height,
        frames = source.frames,
        seed = source.seed,
        "Building noise sources"
    );

    let plugin = filter::plugin()?;
    let mut args = ArgMap::new();
    args.set_node("clip", MemoryClip::noise(info, source.seed).into_node())
        .set_node(
            "clip2",
            MemoryClip::noise(info, source.seed.wrapping_add(1)).into_node(),
        )
        .set_int("c", i64::from(config.filter.c));

    let node = plugin.invoke(FILTER_NAME, &args)?;
    drop(args);

    let core = Core::new();
    let frames: Vec<FrameRef> = if config.output.parallel {
        core.render(&node)?
    } else {
        (0..info.num_frames)
            .map(|n| core.get_frame(&node, n))
            .collect::<Result<_, _>>()?
    };

    let mut combined = blake3::Hasher::new();
    for (n, frame) in frames.iter().enumerate() {
        let digest = frame.digest();
        debug!(n, digest = %digest, "Frame rendered");
        combined.update(digest.as_bytes());
    }

    let stats = core.stats();
    info!(
        requested = stats.requested,
        produced = stats.produced,
        failed = stats.failed,
        "Render complete"
    );

    println!("{}", combined.finalize());

    if config.output.metrics {
        let registry = MetricsRegistry::new()?;
        registry.update(&MetricsSnapshot {
            frames_requested: stats.requested,
            frames_produced: stats.produced,
            frame_failures: stats.failed,
            threshold_c: config.filter.c,
            sample_bytes: format.bytes_per_sample(),
        });
        print!("{}", registry.encode()?);
    }

    Ok(())
}
