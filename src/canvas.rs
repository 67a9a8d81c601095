//! In-memory framebuffer for the dial.
//!
//! [`PixelCanvas`] stores pixels as `0x00RRGGBB` words, the layout softbuffer
//! presents directly, and implements embedded-graphics' [`DrawTarget`] so
//! frames can be rasterised into it without a window. The widget is clipped to
//! the ellipse inscribed in its bounds; [`PixelCanvas::apply_mask`] paints
//! everything outside that ellipse with a single color.

use core::convert::Infallible;
use embedded_graphics::{pixelcolor::Rgb888, prelude::*};

/// Pack an [`Rgb888`] into a `0x00RRGGBB` word.
pub fn pack(color: Rgb888) -> u32 {
    (u32::from(color.r()) << 16) | (u32::from(color.g()) << 8) | u32::from(color.b())
}

/// Software framebuffer implementing [`DrawTarget`].
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelCanvas {
    /// Create a canvas with every pixel set to `fill`.
    pub fn new(width: u32, height: u32, fill: Rgb888) -> Self {
        Self {
            width,
            height,
            pixels: vec![pack(fill); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Whether the center of pixel `(x, y)` lies inside the ellipse inscribed
    /// in the canvas bounds.
    pub fn is_inside_face(&self, x: u32, y: u32) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        let rx = self.width as f64 / 2.0;
        let ry = self.height as f64 / 2.0;
        let dx = (x as f64 + 0.5 - rx) / rx;
        let dy = (y as f64 + 0.5 - ry) / ry;
        dx * dx + dy * dy <= 1.0
    }

    /// Paint every pixel outside the inscribed ellipse with `color`.
    pub fn apply_mask(&mut self, color: Rgb888) {
        let packed = pack(color);
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.is_inside_face(x, y) {
                    self.pixels[(y * self.width + x) as usize] = packed;
                }
            }
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        let (x, y) = (point.x, point.y);
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl OriginDimensions for PixelCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for PixelCanvas {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(index) = self.index(point) {
                self.pixels[index] = pack(color);
            }
        }
        Ok(())
    }
}
