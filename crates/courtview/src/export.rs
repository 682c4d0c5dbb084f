//! Conversions between [`RgbCanvas`] and `image::RgbImage`, plus PNG export.

use std::path::Path;

use crate::core::RgbCanvas;

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("invalid RGB buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid canvas dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Copy a canvas into an `image::RgbImage`.
pub fn to_rgb_image(canvas: &RgbCanvas) -> Result<::image::RgbImage, ExportError> {
    let (Ok(w), Ok(h)) = (u32::try_from(canvas.width), u32::try_from(canvas.height)) else {
        return Err(ExportError::InvalidDimensions {
            width: canvas.width,
            height: canvas.height,
        });
    };
    let expected = canvas.width.saturating_mul(canvas.height).saturating_mul(3);
    ::image::RgbImage::from_raw(w, h, canvas.data.clone()).ok_or(ExportError::InvalidBuffer {
        expected,
        got: canvas.data.len(),
    })
}

/// Copy an `image::RgbImage` (for example a decoded video frame) into a canvas.
pub fn from_rgb_image(img: &::image::RgbImage) -> Result<RgbCanvas, ExportError> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let raw = img.as_raw();
    RgbCanvas::from_raw(w, h, raw.clone()).ok_or(ExportError::InvalidBuffer {
        expected: w.saturating_mul(h).saturating_mul(3),
        got: raw.len(),
    })
}

/// Write `canvas` as a PNG, creating parent directories as needed.
pub fn save_png(canvas: &RgbCanvas, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    to_rgb_image(canvas)?.save_with_format(path, ::image::ImageFormat::Png)?;
    log::debug!("wrote {}x{} png to {}", canvas.width, canvas.height, path.display());
    Ok(())
}
