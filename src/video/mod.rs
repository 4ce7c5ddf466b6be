//! The frame loop: acquire, process, show, repeat until the source closes
//! or a quit is requested.

pub mod sink;
pub mod source;

pub use sink::{DirectorySink, FrameSink, NullSink};
pub use source::{FrameQueue, FrameSource, ImageSequence};

use anyhow::Result;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

use crate::models::ShapeLabel;
use crate::pipeline::FrameProcessor;

/// Cloneable "quit requested" flag, checked once per frame
#[derive(Debug, Clone, Default)]
pub struct QuitSignal {
    flag: Arc<AtomicBool>,
}

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Request quit when a line reading `q` arrives on `input`
///
/// Blocks until then or until `input` ends. Returns whether quit was
/// requested.
pub fn watch_for_quit<R: BufRead>(input: R, quit: &QuitSignal) -> bool {
    for line in input.lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("q") {
            quit.request();
            return true;
        }
    }
    false
}

/// Watch stdin for `q` on a background thread
pub fn watch_stdin(quit: QuitSignal) -> std::thread::JoinHandle<bool> {
    std::thread::spawn(move || watch_for_quit(std::io::stdin().lock(), &quit))
}

/// What a finished loop saw
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub detections: BTreeMap<ShapeLabel, usize>,
    pub quit_requested: bool,
}

impl RunSummary {
    pub fn count(&self, label: ShapeLabel) -> usize {
        self.detections.get(&label).copied().unwrap_or(0)
    }

    pub fn total_detections(&self) -> usize {
        self.detections.values().sum()
    }
}

/// Process frames one at a time until the source closes, `max_frames` is
/// reached or `quit` is requested.
///
/// An input fault from the source or a failing sink stops the loop and is
/// returned.
pub fn run_loop<S, P, K>(
    source: &mut S,
    processor: &P,
    sink: &mut K,
    quit: &QuitSignal,
    max_frames: Option<u64>,
) -> Result<RunSummary>
where
    S: FrameSource + ?Sized,
    P: FrameProcessor + ?Sized,
    K: FrameSink + ?Sized,
{
    let mut summary = RunSummary::default();
    info!("processing frames");

    loop {
        if quit.is_requested() {
            summary.quit_requested = true;
            info!(frames = summary.frames, "quit requested");
            break;
        }
        if max_frames.is_some_and(|max| summary.frames >= max) {
            break;
        }

        let Some(frame) = source.next_frame()? else {
            debug!("frame source closed");
            break;
        };

        let index = summary.frames;
        let annotated = processor.process(&frame, index)?;
        for detection in &annotated.detections {
            *summary.detections.entry(detection.label).or_insert(0) += 1;
        }
        debug!(
            frame = index,
            detections = annotated.detections.len(),
            "frame done"
        );

        sink.show(index, &frame, &annotated)?;
        summary.frames += 1;
    }

    info!(
        frames = summary.frames,
        detections = summary.total_detections(),
        "finished"
    );
    Ok(summary)
}
