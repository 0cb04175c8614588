//! Image files standing in for a camera.
//!
//! [`DirectoryCamera`] points at a directory of PNG/JPEG files.  Starting it
//! lists the files once, in lexical order, and returns a [`DirectoryFrames`]
//! stream that cycles through them like a live feed.  Each frame is loaded
//! and converted to 8-bit greyscale on demand.

use std::path::{Path, PathBuf};

use image::GrayImage;
use tracing::debug;

use crate::application::devices::{Camera, FrameError, FrameSource};

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A camera backed by a directory of image files.
#[derive(Debug, Clone)]
pub struct DirectoryCamera {
    dir: PathBuf,
}

impl DirectoryCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Camera for DirectoryCamera {
    type Stream = DirectoryFrames;

    fn start(&self) -> Result<DirectoryFrames, FrameError> {
        DirectoryFrames::open(&self.dir)
    }
}

/// An open frame stream over a fixed list of files.
#[derive(Debug)]
pub struct DirectoryFrames {
    paths: Vec<PathBuf>,
    next: usize,
}

impl DirectoryFrames {
    /// Lists the supported image files in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Io`] if the directory cannot be read and
    /// [`FrameError::NoFrames`] if it holds no PNG or JPEG file.
    pub fn open(dir: &Path) -> Result<Self, FrameError> {
        let io_err = |source| FrameError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && has_image_extension(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(FrameError::NoFrames(dir.to_path_buf()));
        }
        paths.sort();

        debug!("{} frame files in {}", paths.len(), dir.display());
        Ok(Self { paths, next: 0 })
    }

    /// Number of files in the cycle.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always `false`: opening fails on an empty directory.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for DirectoryFrames {
    fn next_frame(&mut self) -> Result<GrayImage, FrameError> {
        let path = &self.paths[self.next];
        self.next = (self.next + 1) % self.paths.len();

        let image = image::open(path).map_err(|source| FrameError::Image {
            path: path.clone(),
            source,
        })?;
        Ok(image.to_luma8())
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn write_png(dir: &Path, name: &str, shade: u8) {
        GrayImage::from_pixel(4, 4, Luma([shade]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_frames_cycle_in_lexical_order() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", 200);
        write_png(dir.path(), "a.png", 100);
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        // Act
        let mut frames = DirectoryCamera::new(dir.path()).start().unwrap();
        let shades: Vec<u8> = (0..3)
            .map(|_| frames.next_frame().unwrap().get_pixel(0, 0).0[0])
            .collect();

        // Assert
        assert_eq!(frames.len(), 2);
        assert_eq!(shades, vec![100, 200, 100]);
    }

    #[test]
    fn test_empty_directory_has_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let result = DirectoryFrames::open(dir.path());
        assert!(matches!(result, Err(FrameError::NoFrames(_))));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DirectoryFrames::open(&dir.path().join("absent"));
        assert!(matches!(result, Err(FrameError::Io { .. })));
    }

    #[test]
    fn test_corrupt_file_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not really a png").unwrap();
        let mut frames = DirectoryFrames::open(dir.path()).unwrap();

        let result = frames.next_frame();

        assert!(matches!(result, Err(FrameError::Image { .. })));
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert!(has_image_extension(Path::new("frame.JPG")));
        assert!(has_image_extension(Path::new("frame.jpeg")));
        assert!(!has_image_extension(Path::new("frame.gif")));
        assert!(!has_image_extension(Path::new("frame")));
    }
}
