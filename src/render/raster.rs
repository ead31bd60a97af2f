//! CPU scanline rasterizer implementing [`RenderSink`] over an RGBA image.
//!
//! Used by the preview binary and tests. Fills use the even-odd rule across
//! all contours of one fill; ellipses are flattened to polygons and filled
//! individually. Blending is straight-alpha source-over.

use std::path::Path;

use image::{Rgba, RgbaImage};

use super::{Color, RenderSink};
use crate::core::types::{DAffine2, DVec2};
use crate::core::Result;
use crate::scene::FlatDrawEntry;

/// Segments used to flatten one ellipse
const ELLIPSE_SEGMENTS: usize = 32;

/// Pixel-buffer render target
pub struct Raster {
    image: RgbaImage,
    transform: DAffine2,
    fill: Option<(Color, f64)>,
    contours: Vec<Vec<DVec2>>,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            transform: DAffine2::IDENTITY,
            fill: None,
            contours: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Transform applied to every incoming point.
    pub fn set_transform(&mut self, transform: DAffine2) {
        self.transform = transform;
    }

    /// Fill the whole image with an opaque color.
    pub fn clear(&mut self, color: Color) {
        for px in self.image.pixels_mut() {
            *px = Rgba([color.r, color.g, color.b, 255]);
        }
    }

    /// Replay flattened scene entries, each under its world transform.
    pub fn draw_scene(&mut self, entries: &[FlatDrawEntry<'_>]) {
        for entry in entries {
            self.set_transform(entry.transform);
            entry.drawing.replay(self);
        }
        self.set_transform(DAffine2::IDENTITY);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Write the image; format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f64) {
        let a = alpha.clamp(0.0, 1.0);
        let px = self.image.get_pixel_mut(x, y);
        let [r, g, b, dst_a] = px.0;
        let mix = |src: u8, dst: u8| (src as f64 * a + dst as f64 * (1.0 - a)).round() as u8;
        let out_a = (a * 255.0 + dst_a as f64 * (1.0 - a)).round().min(255.0) as u8;
        *px = Rgba([mix(color.r, r), mix(color.g, g), mix(color.b, b), out_a]);
    }

    /// Even-odd scanline fill of a set of contours, sampling pixel centers.
    fn fill_contours(&mut self, contours: &[Vec<DVec2>], color: Color, alpha: f64) {
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for p in contours.iter().flatten() {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        if !min_y.is_finite() || !max_y.is_finite() {
            return;
        }

        let height = self.image.height() as i64;
        let width = self.image.width() as i64;
        let row_start = (min_y.floor() as i64).max(0);
        let row_end = (max_y.ceil() as i64).min(height);

        let mut crossings = Vec::new();
        for row in row_start..row_end {
            let sy = row as f64 + 0.5;
            crossings.clear();
            for contour in contours {
                let n = contour.len();
                if n < 3 {
                    continue;
                }
                for i in 0..n {
                    let a = contour[i];
                    let b = contour[(i + 1) % n];
                    if (a.y > sy) != (b.y > sy) {
                        crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                    }
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for pair in crossings.chunks_exact(2) {
                let x0 = ((pair[0] - 0.5).ceil() as i64).max(0);
                let x1 = ((pair[1] - 0.5).ceil() as i64).min(width);
                for col in x0..x1 {
                    self.blend(col as u32, row as u32, color, alpha);
                }
            }
        }
    }
}

impl RenderSink for Raster {
    fn begin_fill(&mut self, color: Color, alpha: f64) {
        self.fill = Some((color, alpha));
        self.contours.clear();
    }

    fn move_to(&mut self, p: DVec2) {
        self.contours.push(vec![self.transform.transform_point2(p)]);
    }

    fn line_to(&mut self, p: DVec2) {
        let p = self.transform.transform_point2(p);
        match self.contours.last_mut() {
            Some(contour) => contour.push(p),
            None => self.contours.push(vec![p]),
        }
    }

    fn ellipse(&mut self, center: DVec2, radii: DVec2, rotation: f64) {
        let Some((color, alpha)) = self.fill else {
            return;
        };
        let rot = DVec2::from_angle(rotation);
        let outline: Vec<DVec2> = (0..ELLIPSE_SEGMENTS)
            .map(|i| {
                let t = i as f64 / ELLIPSE_SEGMENTS as f64 * std::f64::consts::TAU;
                let local = DVec2::new(t.cos() * radii.x, t.sin() * radii.y);
                self.transform.transform_point2(center + rot.rotate(local))
            })
            .collect();
        self.fill_contours(&[outline], color, alpha);
    }

    fn end_fill(&mut self) {
        if let Some((color, alpha)) = self.fill.take() {
            let contours = std::mem::take(&mut self.contours);
            self.fill_contours(&contours, color, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Polygon;

    #[test]
    fn test_fill_square() {
        let mut raster = Raster::new(10, 10);
        let square = Polygon::new(vec![
            DVec2::new(2.0, 2.0),
            DVec2::new(6.0, 2.0),
            DVec2::new(6.0, 6.0),
            DVec2::new(2.0, 6.0),
        ]);
        raster.fill_polygon(&square, Color::WHITE, 1.0);
        assert_eq!(raster.pixel(3, 3), [255, 255, 255, 255]);
        assert_eq!(raster.pixel(5, 5), [255, 255, 255, 255]);
        assert_eq!(raster.pixel(6, 6), [0, 0, 0, 0]);
        assert_eq!(raster.pixel(1, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn test_transform_applies() {
        let mut raster = Raster::new(10, 10);
        raster.set_transform(DAffine2::from_translation(DVec2::new(5.0, 0.0)));
        raster.begin_fill(Color::WHITE, 1.0);
        raster.circle(DVec2::new(0.0, 5.0), 2.0);
        raster.end_fill();
        assert_eq!(raster.pixel(5, 5)[3], 255);
        assert_eq!(raster.pixel(0, 5)[3], 0);
    }

    #[test]
    fn test_alpha_blend() {
        let mut raster = Raster::new(4, 4);
        raster.clear(Color::BLACK);
        let all = Polygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(4.0, 4.0),
            DVec2::new(0.0, 4.0),
        ]);
        raster.fill_polygon(&all, Color::WHITE, 0.5);
        let px = raster.pixel(1, 1);
        assert!(px[0] >= 127 && px[0] <= 128);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_offscreen_fill_is_clipped() {
        let mut raster = Raster::new(4, 4);
        let far = Polygon::new(vec![
            DVec2::new(-100.0, -100.0),
            DVec2::new(100.0, -100.0),
            DVec2::new(100.0, 100.0),
        ]);
        raster.fill_polygon(&far, Color::WHITE, 1.0);
        assert_eq!(raster.pixel(3, 0)[3], 255);
    }
}
