use anyhow::Result;
use image::DynamicImage;
use std::path::PathBuf;

use crate::models::AnnotatedFrame;
use crate::pipeline::ensure_empty_dir;

/// Consumer of processed frames
pub trait FrameSink {
    fn show(&mut self, index: u64, source: &DynamicImage, annotated: &AnnotatedFrame) -> Result<()>;
}

/// Writes every annotated frame as `frame_NNNNN.png`
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    with_sources: bool,
    written: u64,
}

impl DirectorySink {
    /// The directory must be empty or non-existent
    pub fn new(dir: PathBuf) -> Result<Self> {
        ensure_empty_dir(&dir)?;
        Ok(Self {
            dir,
            with_sources: false,
            written: 0,
        })
    }

    /// Also write the unmodified input as `source_NNNNN.png`
    pub fn with_sources(mut self, enabled: bool) -> Self {
        self.with_sources = enabled;
        self
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for DirectorySink {
    fn show(&mut self, index: u64, source: &DynamicImage, annotated: &AnnotatedFrame) -> Result<()> {
        let path = self.dir.join(format!("frame_{:05}.png", index));
        annotated
            .image
            .save(&path)
            .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;

        if self.with_sources {
            let path = self.dir.join(format!("source_{:05}.png", index));
            source
                .save(&path)
                .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.display(), e))?;
        }

        self.written += 1;
        Ok(())
    }
}

/// Discards frames
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn show(&mut self, _index: u64, _source: &DynamicImage, _annotated: &AnnotatedFrame) -> Result<()> {
        Ok(())
    }
}
