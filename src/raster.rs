use std::path::Path;

use image::imageops::FilterType;
use image::{ImageReader, RgbaImage};

use crate::error::LassoError;

/// A decoded source image, reduced to working resolution.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Working raster after downsampling.
    pub raster: RgbaImage,
    /// Size of the file as decoded, before downsampling.
    pub raw_size: (u32, u32),
}

/// Decode an image and downsample it by `factor` (>= 1) in both axes.
pub fn load(path: &Path, factor: f64) -> Result<LoadedImage, LassoError> {
    let img = ImageReader::open(path)
        .map_err(|e| LassoError::ImageLoad(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| LassoError::ImageLoad(e.to_string()))?
        .decode()
        .map_err(|e| LassoError::ImageLoad(e.to_string()))?
        .into_rgba8();

    let raw_size = img.dimensions();
    let raster = downsample(&img, factor)?;
    log::info!(
        "loaded {} ({}x{} px, working {}x{})",
        path.display(),
        raw_size.0,
        raw_size.1,
        raster.width(),
        raster.height(),
    );
    Ok(LoadedImage { raster, raw_size })
}

/// Resize by `1 / factor`, rounding each dimension.
pub fn downsample(img: &RgbaImage, factor: f64) -> Result<RgbaImage, LassoError> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(LassoError::EmptyImage);
    }
    if !(factor.is_finite() && factor >= 1.0) {
        return Err(LassoError::InvalidDownsample(factor.to_string()));
    }
    if factor == 1.0 {
        return Ok(img.clone());
    }
    let new_w = ((w as f64 / factor).round() as u32).max(1);
    let new_h = ((h as f64 / factor).round() as u32).max(1);
    Ok(image::imageops::resize(img, new_w, new_h, FilterType::Triangle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsample_by_two_halves_each_axis() {
        let img = RgbaImage::new(1000, 800);
        let small = downsample(&img, 2.0).unwrap();
        assert_eq!(small.dimensions(), (500, 400));
    }

    #[test]
    fn downsample_one_keeps_size() {
        let img = RgbaImage::new(31, 17);
        assert_eq!(downsample(&img, 1.0).unwrap().dimensions(), (31, 17));
    }

    #[test]
    fn empty_image_is_rejected() {
        let img = RgbaImage::new(0, 10);
        assert!(matches!(downsample(&img, 1.0), Err(LassoError::EmptyImage)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load(Path::new("does/not/exist.png"), 1.0).unwrap_err();
        assert!(matches!(err, LassoError::ImageLoad(_)));
    }

    #[test]
    fn load_reads_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.png");
        RgbaImage::from_pixel(40, 20, image::Rgba([9, 9, 9, 255]))
            .save(&path)
            .unwrap();
        let loaded = load(&path, 2.0).unwrap();
        assert_eq!(loaded.raw_size, (40, 20));
        assert_eq!(loaded.raster.dimensions(), (20, 10));
    }
}
