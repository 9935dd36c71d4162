//! Overlay drawing and preview encoding.
//!
//! Lasso routes and calibration marks are stroked onto a copy of the
//! working raster with tiny-skia, then the frame is cropped and zoomed by
//! the viewport. Confirm-time previews are written as PNG.

use std::path::Path;

use image::RgbaImage;
use kurbo::Point;

use crate::error::LassoError;
use crate::viewport::Viewport;

/// Committed lasso routes and finished calibration spans.
pub const COMMITTED_COLOR: [u8; 3] = [0, 0, 255];
/// Preview route and calibration rubber band.
pub const PREVIEW_COLOR: [u8; 3] = [0, 255, 0];

/// A raster being drawn on.
pub struct Canvas {
    pixmap: tiny_skia::Pixmap,
}

impl Canvas {
    /// Copy `image` into a drawable surface. The copy is made opaque.
    pub fn from_image(image: &RgbaImage) -> Result<Self, LassoError> {
        let (w, h) = image.dimensions();
        let size = tiny_skia::IntSize::from_wh(w, h).ok_or(LassoError::EmptyImage)?;
        let mut data = image.as_raw().clone();
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        let pixmap = tiny_skia::Pixmap::from_vec(data, size)
            .ok_or_else(|| LassoError::Render("pixmap size mismatch".into()))?;
        Ok(Self { pixmap })
    }

    /// Stroke an open polyline through pixel centres.
    ///
    /// A single point is drawn as a dot of the same width.
    pub fn polyline(&mut self, points: &[Point], color: [u8; 3], width: f32) {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        paint.anti_alias = true;

        let path = match points {
            [] => return,
            [p] => {
                let (x, y) = pixel_center(*p);
                tiny_skia::PathBuilder::from_circle(x, y, (width / 2.0).max(0.5))
            }
            [first, rest @ ..] => {
                let mut pb = tiny_skia::PathBuilder::new();
                let (x, y) = pixel_center(*first);
                pb.move_to(x, y);
                for p in rest {
                    let (x, y) = pixel_center(*p);
                    pb.line_to(x, y);
                }
                pb.finish()
            }
        };
        let Some(path) = path else {
            return;
        };

        if points.len() == 1 {
            self.pixmap.fill_path(
                &path,
                &paint,
                tiny_skia::FillRule::Winding,
                tiny_skia::Transform::identity(),
                None,
            );
        } else {
            let stroke = tiny_skia::Stroke {
                width,
                line_cap: tiny_skia::LineCap::Round,
                line_join: tiny_skia::LineJoin::Round,
                ..tiny_skia::Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint, &stroke, tiny_skia::Transform::identity(), None);
        }
    }

    /// Back to an image buffer.
    pub fn into_image(self) -> Result<RgbaImage, LassoError> {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        RgbaImage::from_raw(w, h, self.pixmap.take())
            .ok_or_else(|| LassoError::Render("pixmap size mismatch".into()))
    }
}

/// Overlay line width in image pixels: about three window pixels at the
/// current zoom, times `multiplier`.
pub fn line_width(viewport: &Viewport, multiplier: f32) -> f32 {
    let base = (3.0 * viewport.image_size().width
        / viewport.window_size().width
        / viewport.zoom_factor())
    .ceil();
    base.max(1.0) as f32 * multiplier
}

fn pixel_center(p: Point) -> (f32, f32) {
    (p.x as f32 + 0.5, p.y as f32 + 0.5)
}

/// Encode an image to PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, LassoError> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width(), image.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| LassoError::Render(e.to_string()))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| LassoError::Render(e.to_string()))?;
    }
    Ok(buf)
}

/// Write `image` to `path` as PNG.
pub fn save_png(path: &Path, image: &RgbaImage) -> Result<(), LassoError> {
    std::fs::write(path, encode_png(image)?)?;
    log::info!("preview saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn polyline_colours_its_pixels() {
        let img = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let mut canvas = Canvas::from_image(&img).unwrap();
        canvas.polyline(
            &[Point::new(2.0, 10.0), Point::new(17.0, 10.0)],
            COMMITTED_COLOR,
            3.0,
        );
        let out = canvas.into_image().unwrap();
        let px = out.get_pixel(10, 10);
        assert!(px[2] > 200 && px[0] < 60, "{px:?}");
        assert_eq!(out.get_pixel(10, 2), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn single_point_draws_a_dot() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let mut canvas = Canvas::from_image(&img).unwrap();
        canvas.polyline(&[Point::new(5.0, 5.0)], PREVIEW_COLOR, 4.0);
        let out = canvas.into_image().unwrap();
        assert!(out.get_pixel(5, 5)[1] > 200);
    }

    #[test]
    fn canvas_round_trip_keeps_size_and_pixels() {
        let mut img = RgbaImage::from_pixel(7, 3, Rgba([1, 2, 3, 255]));
        img.put_pixel(6, 2, Rgba([200, 100, 50, 255]));
        let out = Canvas::from_image(&img).unwrap().into_image().unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn line_width_shrinks_with_zoom() {
        let mut vp = Viewport::new((1920, 1080), (4000, 3000));
        let wide = line_width(&vp, 1.0);
        vp.zoom(20);
        let narrow = line_width(&vp, 1.0);
        assert!(narrow < wide);
        assert_eq!(line_width(&vp, 2.0), narrow * 2.0);
    }

    #[test]
    fn png_round_trips_through_image_decoder() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().into_rgba8();
        assert_eq!(decoded, img);
    }
}
