// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: decode raw page bytes, rotate by quarter turns, and encode
// into a container format. Operates on in-memory images using the `image`
// crate.

use image::{DynamicImage, ImageFormat};
use scanwerk_core::error::ScanError;
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return the transformed processor, so
/// calls chain:
///
/// ```ignore
/// let png = ImageProcessor::from_bytes(&jpeg)?
///     .rotate_quarter_turns_ccw(1)
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, ScanError> {
        let img = image::load_from_memory(data)
            .map_err(|err| ScanError::Image(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    #[cfg(test)]
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    #[cfg(test)]
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Rotate counter-clockwise by `turns` quarter turns. Lossless.
    pub fn rotate_quarter_turns_ccw(self, turns: u32) -> Self {
        // `image` rotates clockwise, so one CCW quarter is rotate270.
        let image = match turns % 4 {
            1 => self.image.rotate270(),
            2 => self.image.rotate180(),
            3 => self.image.rotate90(),
            _ => self.image,
        };
        Self { image }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ScanError> {
        self.encode(ImageFormat::Png)
    }

    /// Encode the current image into the given container format.
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>, ScanError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, format)
            .map_err(|err| ScanError::Image(format!("image encoding failed: {}", err)))?;
        Ok(buffer)
    }
}
