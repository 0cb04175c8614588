//! QR decoding with `rqrr`.
//!
//! rqrr works on its own prepared image, built here pixel by pixel from the
//! greyscale frame so the decoder does not depend on rqrr's `image`
//! integration.

use image::GrayImage;
use kiosk_core::DecodeError;
use rqrr::PreparedImage;
use tracing::debug;

use crate::application::devices::QrDecoder;

/// [`QrDecoder`] backed by `rqrr`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    /// Returns the content of the first readable grid in the frame.
    fn decode(&self, frame: &GrayImage) -> Result<String, DecodeError> {
        let (width, height) = frame.dimensions();
        let mut prepared =
            PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                frame.get_pixel(x as u32, y as u32).0[0]
            });

        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return Err(DecodeError::NoCode);
        }

        let mut last_error = None;
        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => return Ok(content),
                Err(e) => {
                    debug!("grid found but not readable: {e}");
                    last_error = Some(e.to_string());
                }
            }
        }
        Err(DecodeError::Unreadable(last_error.unwrap_or_default()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
