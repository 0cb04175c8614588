//! Device seams of the scanner.
//!
//! A [`Camera`] is something that can be started; starting it yields a
//! [`FrameSource`] that owns the device until it is dropped.  The controller
//! keeps the source only while scanning, so leaving the scanning screen
//! releases the camera.

use std::path::PathBuf;

use image::GrayImage;
use kiosk_core::DecodeError;
use thiserror::Error;
use url::Url;

/// Why a frame could not be produced.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame directory or a frame file could not be read.
    #[error("I/O error reading frames at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The frame directory contains no supported image files.
    #[error("no PNG or JPEG frames in {0}")]
    NoFrames(PathBuf),

    /// A frame file is not a decodable image.
    #[error("failed to decode frame {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// An active stream of greyscale frames.
pub trait FrameSource {
    /// Returns the next frame.
    fn next_frame(&mut self) -> Result<GrayImage, FrameError>;
}

/// A frame device that can be started on demand.
pub trait Camera {
    type Stream: FrameSource;

    /// Acquires the device.  Dropping the returned stream releases it.
    fn start(&self) -> Result<Self::Stream, FrameError>;
}

/// Finds and reads a QR code in a frame.
pub trait QrDecoder {
    fn decode(&self, frame: &GrayImage) -> Result<String, DecodeError>;
}

/// Where the scanner sends the user after a successful scan.
#[cfg_attr(test, mockall::automock)]
pub trait Navigator {
    /// Full navigation to an absolute URL, leaving the app.
    fn redirect(&mut self, url: &Url);

    /// In-app transition to a route such as `/connect?kioskId=K1`.
    fn route(&mut self, route: &str);
}
