//! PNG output of a rendered [`PixelSurface`].

use glyph_swarm_core::{PixelSurface, Surface, SwarmError};
use std::path::Path;

/// Writes the surface as an RGBA PNG.
///
/// Returns `SwarmError::InvalidDimensions` for an empty surface or one over
/// the canvas size limit, and `SwarmError::Io` on write failure.
pub fn write_png(surface: &PixelSurface, path: &Path) -> Result<(), SwarmError> {
    let size = surface.size().within_limit()?;
    if size.is_empty() {
        return Err(SwarmError::InvalidDimensions);
    }
    let w = u32::try_from(size.width).map_err(|_| SwarmError::InvalidDimensions)?;
    let h = u32::try_from(size.height).map_err(|_| SwarmError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.rgba().to_vec())
        .ok_or_else(|| SwarmError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| SwarmError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_swarm_core::CanvasSize;

    #[test]
    fn write_png_round_trip() {
        let mut surface = PixelSurface::new(CanvasSize::new(16, 12));
        surface.put_rgba(&[255; 16 * 12 * 4]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");

        write_png(&surface, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 16);
        assert_eq!(img.height(), 12);
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }

    #[test]
    fn empty_surface_is_rejected() {
        let surface = PixelSurface::new(CanvasSize::new(0, 10));
        let dir = tempfile::tempdir().unwrap();
        let result = write_png(&surface, &dir.path().join("empty.png"));
        assert!(matches!(result, Err(SwarmError::InvalidDimensions)));
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let surface = PixelSurface::new(CanvasSize::new(2, 2));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("frame.png");
        assert!(matches!(write_png(&surface, &path), Err(SwarmError::Io(_))));
    }
}
