use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use framewarp::{
    recorder::Recorder,
    sink::{PixelflutConfig, PixelflutSink, PngSequenceSink},
    source::{FrameSource, VideoSource, VideoSourceOptions, DEFAULT_LOOP_LIMIT},
    transform::{TransformRecipe, TransformerChain},
    Pipeline, Tick,
};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Warp video frames through a chain of pixel transforms")]
struct Args {
    /// The file, URL or capture device to read frames from
    #[arg(short = 'f', long)]
    file: String,

    /// ffmpeg input format, e.g. `v4l2` for a webcam
    #[arg(long, value_name = "FORMAT")]
    input_format: Option<String>,

    /// Resize input frames to this width
    #[arg(long, value_name = "PX", requires = "height")]
    width: Option<u32>,

    /// Resize input frames to this height
    #[arg(long, value_name = "PX", requires = "width")]
    height: Option<u32>,

    /// Adds a transform to the chain, applied in the order given
    /// (e.g. `bulge:160,120,2,80`, `swirl:50,50,1.9,50`, `vflip`)
    #[arg(short = 't', long = "transform", value_name = "RECIPE")]
    transforms: Vec<TransformRecipe>,

    /// The targeted output fps
    #[arg(long, value_name = "FPS", default_value_t = 30)]
    target_fps: u32,

    /// Replays the input once it ends
    #[arg(long = "loop")]
    looped: bool,

    /// How many of the most recent frames `--loop` replays
    #[arg(long, value_name = "N", default_value_t = DEFAULT_LOOP_LIMIT)]
    loop_frames: usize,

    /// Stops after this many frames
    #[arg(long, value_name = "N")]
    max_frames: Option<u64>,

    /// Paints onto the pixelflut server at this address
    #[arg(short = 's', long, value_name = "ADDRESS")]
    server: Option<String>,

    /// The pixelflut server's port
    #[arg(short = 'p', long, default_value_t = 1337)]
    port: u16,

    /// The amount of concurrent pixelflut connections
    #[arg(long, value_name = "NUM", default_value_t = 12)]
    threads: usize,

    /// Offset of the frame on the pixelflut canvas x axis
    #[arg(short = 'x', value_name = "PX")]
    offset_x: Option<u32>,

    /// Offset of the frame on the pixelflut canvas y axis
    #[arg(short = 'y', value_name = "PX")]
    offset_y: Option<u32>,

    /// Writes every frame as a numbered PNG into this directory
    #[arg(long, value_name = "DIR")]
    png_dir: Option<PathBuf>,

    /// Records the output into this video file
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.server.is_none() && args.png_dir.is_none() && args.record.is_none() {
        bail!("no output given, pass --server, --png-dir or --record");
    }
    if args.target_fps == 0 {
        bail!("--target-fps must be positive");
    }

    // fail on bad parameters before ffmpeg starts
    let stages = args
        .transforms
        .iter()
        .map(|recipe| recipe.build().with_context(|| format!("building `{recipe}`")))
        .collect::<Result<Vec<_>>>()?;

    let mut source = VideoSource::spawn(VideoSourceOptions {
        format: args.input_format.clone(),
        size: args.width.zip(args.height),
        looped: args.looped,
        loop_limit: args.loop_frames,
        ..VideoSourceOptions::new(args.file.as_str())
    })?;

    let mut ticker = interval(Duration::from_secs_f64(1.0 / f64::from(args.target_fps)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let first = loop {
        ticker.tick().await;
        if let Some(frame) = source.current_frame() {
            break frame;
        }
        if !source.is_active() {
            bail!("{} produced no frames", args.file);
        }
    };

    let (width, height) = first.dimensions();
    let mut chain = TransformerChain::with_dimensions(width, height);
    chain.extend(stages);
    info!(
        "warping {width}x{height} frames through [{}]",
        chain.names().collect::<Vec<_>>().join(", ")
    );

    let mut pipeline = Pipeline::new(source, chain);

    if let Some(server) = &args.server {
        let config = PixelflutConfig {
            server: format!("{server}:{port}", port = args.port),
            threads: args.threads,
            offset: (
                args.offset_x.unwrap_or_default(),
                args.offset_y.unwrap_or_default(),
            ),
        };
        pipeline.add_sink(PixelflutSink::connect(config).await?);
    }

    if let Some(dir) = &args.png_dir {
        pipeline.add_sink(PngSequenceSink::new(dir)?);
    }

    if let Some(path) = &args.record {
        let mut recorder = Recorder::new(path, args.target_fps);
        recorder.start();
        pipeline.add_sink(recorder);
    }

    pipeline.process(&first)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        if args.max_frames.is_some_and(|max| pipeline.presented() >= max) {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }

        if pipeline.tick()? == Tick::Finished {
            break;
        }
    }

    let presented = pipeline.presented();
    pipeline.finish()?;
    info!(frames = presented, "done");

    Ok(())
}
