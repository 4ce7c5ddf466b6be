use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use shapecam::video::{DirectorySink, FrameSink, ImageSequence, NullSink, watch_stdin};
use shapecam::{
    DetectorConfig, FrameProcessor, QuitSignal, ShapeDetector, ShapeLabel, build_standard_pipeline,
    run_loop,
};

#[derive(Parser)]
#[command(name = "shapecam")]
#[command(about = "Detect and label geometric shapes in a stream of frames")]
struct Cli {
    /// Image files or directories of images, processed in order
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Write annotated frames to directory (must be empty)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Also write the unmodified input frames next to the annotated ones
    #[arg(long, requires = "output_dir")]
    save_source: bool,

    /// Save every pipeline stage per frame to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long, value_name = "N")]
    max_frames: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut source = ImageSequence::from_inputs(&args.inputs)?;
    info!(frames = source.remaining(), "input ready");

    let config = DetectorConfig::default();
    let processor: Box<dyn FrameProcessor> = match args.debug_out {
        Some(debug_dir) => {
            info!("saving pipeline stages to {}", debug_dir.display());
            Box::new(build_standard_pipeline(&config).with_debug(debug_dir)?)
        }
        None => Box::new(ShapeDetector::new(config)),
    };

    let mut sink: Box<dyn FrameSink> = match args.output_dir {
        Some(dir) => Box::new(DirectorySink::new(dir)?.with_sources(args.save_source)),
        None => Box::new(NullSink),
    };

    let quit = QuitSignal::new();
    // Detached: a blocked stdin read must not keep the process alive
    let _watcher = watch_stdin(quit.clone());
    info!("enter 'q' to stop");

    let summary = run_loop(
        &mut source,
        processor.as_ref(),
        sink.as_mut(),
        &quit,
        args.max_frames,
    )?;

    println!("\n=== Shape Detection Results ===");
    println!("Frames processed: {}", summary.frames);
    for label in ShapeLabel::ALL {
        println!("  {:<13} {}", label.to_string(), summary.count(label));
    }
    if summary.quit_requested {
        println!("Stopped on request.");
    }

    Ok(())
}
