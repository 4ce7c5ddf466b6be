use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// File extensions picked up when a directory is used as input
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Producer of sequential frames
pub trait FrameSource {
    /// Next frame, `Ok(None)` once the source is closed.
    ///
    /// An `Err` is an input fault and ends the processing loop.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>>;
}

/// Frames read from image files, in order
#[derive(Debug, Clone, Default)]
pub struct ImageSequence {
    paths: VecDeque<PathBuf>,
}

impl ImageSequence {
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// All images directly inside `dir`, sorted by file name
    pub fn from_dir(dir: &Path) -> Result<Self> {
        Ok(Self::from_paths(list_images(dir)?))
    }

    /// Files are taken as given, directories are expanded to their images
    pub fn from_inputs(inputs: &[PathBuf]) -> Result<Self> {
        let mut paths = Vec::new();
        for input in inputs {
            if input.is_dir() {
                paths.extend(list_images(input)?);
            } else {
                paths.push(input.clone());
            }
        }
        Ok(Self::from_paths(paths))
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };
        let frame = ImageReader::open(&path)
            .with_context(|| format!("Failed to open frame {}", path.display()))?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode frame {}: {}", path.display(), e))?;
        Ok(Some(frame))
    }
}

/// Frames held in memory
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    frames: VecDeque<DynamicImage>,
}

impl FrameQueue {
    pub fn new(frames: impl IntoIterator<Item = DynamicImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for FrameQueue {
    fn next_frame(&mut self) -> Result<Option<DynamicImage>> {
        Ok(self.frames.pop_front())
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read input directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_image_extension(path))
        .collect();
    paths.sort();
    Ok(paths)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
