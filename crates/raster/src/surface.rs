//! Raster surface: an RGBA pixel buffer plus text labels.
//!
//! Text is not rasterized. Labels are carried alongside the pixels and
//! composited by whatever presents the surface, so restoring a clean copy of
//! the surface removes them along with every other overlay.

use image::{imageops, Rgba, RgbaImage};

pub type Color = Rgba<u8>;

/// Opaque colour from components.
pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Rgba([r, g, b, 255])
}

/// A line of text anchored at its top-left corner, in surface pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub x: i32,
    pub y: i32,
    pub text: String,
    pub fg: Color,
    pub bg: Option<Color>,
    pub font_px: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    image: RgbaImage,
    labels: Vec<Label>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
            labels: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Resize, discarding contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width() == width && self.height() == height {
            return;
        }
        self.image = RgbaImage::new(width, height);
        self.labels.clear();
    }

    /// Overwrite this surface with another of the same size.
    ///
    /// A size mismatch replaces the buffer outright.
    pub fn copy_from(&mut self, other: &Surface) {
        if self.image.dimensions() == other.image.dimensions() {
            self.image.copy_from_slice(other.image.as_raw());
        } else {
            self.image = other.image.clone();
        }
        self.labels.clone_from(&other.labels);
    }

    /// Clip a rect against the surface. Returns `(x0, y0, x1, y1)` exclusive.
    fn clip(&self, x: i32, y: i32, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = (x as i64).max(0);
        let y0 = (y as i64).max(0);
        let x1 = (x as i64 + w as i64).min(self.width() as i64);
        let y1 = (y as i64 + h as i64).min(self.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, color);
            }
        }
    }

    pub fn fill(&mut self, color: Color) {
        for p in self.image.pixels_mut() {
            *p = color;
        }
        self.labels.clear();
    }

    /// Outline a rect with a border `line` pixels thick, drawn inside it.
    pub fn stroke_rect(&mut self, x: i32, y: i32, w: u32, h: u32, line: u32, color: Color) {
        let line = line.min(w).min(h);
        if line == 0 {
            return;
        }
        self.fill_rect(x, y, w, line, color);
        self.fill_rect(x, y + (h - line) as i32, w, line, color);
        self.fill_rect(x, y, line, h, color);
        self.fill_rect(x + (w - line) as i32, y, line, h, color);
    }

    /// Alpha-composite an image with its top-left at `(x, y)`.
    pub fn draw_image(&mut self, img: &RgbaImage, x: i32, y: i32) {
        imageops::overlay(&mut self.image, img, x as i64, y as i64);
    }

    /// Copy a `width() x height()` window of `src` starting at `(sx, sy)`
    /// onto this surface. Labels inside the window come along, translated.
    pub fn blit_window(&mut self, src: &Surface, sx: u32, sy: u32) {
        let w = self.width().min(src.width().saturating_sub(sx));
        let h = self.height().min(src.height().saturating_sub(sy));
        let view = imageops::crop_imm(&src.image, sx, sy, w, h).to_image();
        imageops::replace(&mut self.image, &view, 0, 0);

        self.labels.clear();
        let (sw, sh) = (self.width() as i32, self.height() as i32);
        for label in &src.labels {
            let x = label.x - sx as i32;
            let y = label.y - sy as i32;
            if x < sw && y < sh && y >= 0 {
                self.labels.push(Label { x, y, ..label.clone() });
            }
        }
    }

    pub fn push_label(&mut self, label: Label) {
        self.labels.push(label);
    }

    pub fn clear_labels(&mut self) {
        self.labels.clear();
    }
}
