//! Local edge search around the cursor.
//!
//! The low-level work (gradient filter, border following) is delegated to
//! `imageproc`. This module only crops the search region, runs it at
//! display resolution, and maps the loops back into image space.

use image::imageops::FilterType;
use image::RgbaImage;
use imageproc::contours::find_contours;
use kurbo::{Point, Rect};

use crate::config::EdgeConfig;
use crate::geom::Contour;

/// Finds closed intensity-edge loops inside a region of a raster.
pub trait EdgeService {
    /// Loops found inside `region` (image pixels), returned in full-image
    /// coordinates. `scale` is the number of image pixels per display pixel;
    /// the region is searched at display resolution. Every returned loop
    /// is non-empty.
    fn find_edges(&self, raster: &RgbaImage, region: Rect, scale: f64) -> Vec<Contour>;
}

/// Canny edge filter followed by Suzuki-Abe border following.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CannyEdges {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl From<EdgeConfig> for CannyEdges {
    fn from(config: EdgeConfig) -> Self {
        Self {
            low_threshold: config.low_threshold,
            high_threshold: config.high_threshold,
        }
    }
}

impl Default for CannyEdges {
    fn default() -> Self {
        EdgeConfig::default().into()
    }
}

impl EdgeService for CannyEdges {
    fn find_edges(&self, raster: &RgbaImage, region: Rect, scale: f64) -> Vec<Contour> {
        let bounds = Rect::new(0.0, 0.0, raster.width() as f64, raster.height() as f64);
        let region = region.intersect(bounds);
        let x0 = region.x0.max(0.0) as u32;
        let y0 = region.y0.max(0.0) as u32;
        let w = region.width() as u32;
        let h = region.height() as u32;
        if w == 0 || h == 0 || !(scale.is_finite() && scale > 0.0) {
            return Vec::new();
        }

        let roi = image::imageops::crop_imm(raster, x0, y0, w, h).to_image();
        let dw = ((w as f64 / scale).round() as u32).max(1);
        let dh = ((h as f64 / scale).round() as u32).max(1);
        let roi = if (dw, dh) == (w, h) {
            roi
        } else {
            image::imageops::resize(&roi, dw, dh, FilterType::Triangle)
        };
        let gray = image::imageops::grayscale(&roi);
        let edges = imageproc::edges::canny(&gray, self.low_threshold, self.high_threshold);

        let loops: Vec<Contour> = find_contours::<i32>(&edges)
            .into_iter()
            .filter(|c| !c.points.is_empty())
            .map(|c| {
                let points = c
                    .points
                    .iter()
                    .map(|p| {
                        Point::new(
                            (p.x as f64 * scale).round() + x0 as f64,
                            (p.y as f64 * scale).round() + y0 as f64,
                        )
                    })
                    .collect();
                Contour::new(points)
            })
            .collect();

        log::debug!(
            "edge search {}x{} at ({}, {}), scale {:.3}: {} loops",
            w,
            h,
            x0,
            y0,
            scale,
            loops.len()
        );
        loops
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::boundary_distance;
    use image::Rgba;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect as PixelRect;

    fn part_image() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(120, 100, Rgba([255, 255, 255, 255]));
        draw_filled_rect_mut(
            &mut img,
            PixelRect::at(40, 30).of_size(40, 30),
            Rgba([0, 0, 0, 255]),
        );
        img
    }

    #[test]
    fn finds_loop_around_dark_block() {
        let img = part_image();
        let region = Rect::new(20.0, 10.0, 100.0, 90.0);
        let loops = CannyEdges::default().find_edges(&img, region, 1.0);
        assert!(!loops.is_empty());

        let edge_point = Point::new(40.0, 45.0);
        let nearest = loops
            .iter()
            .map(|c| boundary_distance(edge_point, &c.points))
            .fold(f64::INFINITY, f64::min);
        assert!(nearest < 3.0, "closest loop {nearest} px away");

        for c in &loops {
            assert!(!c.is_empty());
            for p in &c.points {
                assert!(p.x >= 20.0 && p.x <= 100.0 && p.y >= 10.0 && p.y <= 90.0);
            }
        }
    }

    #[test]
    fn coarse_scale_maps_back_to_image_space() {
        let img = part_image();
        let region = Rect::new(20.0, 10.0, 100.0, 90.0);
        let loops = CannyEdges::default().find_edges(&img, region, 2.0);
        assert!(!loops.is_empty());
        let edge_point = Point::new(80.0, 45.0);
        let nearest = loops
            .iter()
            .map(|c| boundary_distance(edge_point, &c.points))
            .fold(f64::INFINITY, f64::min);
        assert!(nearest < 5.0, "closest loop {nearest} px away");
    }

    #[test]
    fn flat_region_has_no_edges() {
        let img = RgbaImage::from_pixel(50, 50, Rgba([128, 128, 128, 255]));
        let loops = CannyEdges::default().find_edges(&img, Rect::new(5.0, 5.0, 45.0, 45.0), 1.0);
        assert!(loops.is_empty());
    }

    #[test]
    fn empty_region_is_skipped() {
        let img = part_image();
        let loops = CannyEdges::default().find_edges(&img, Rect::new(30.0, 30.0, 30.0, 60.0), 1.0);
        assert!(loops.is_empty());
    }
}
