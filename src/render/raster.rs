use bytemuck::{Pod, Zeroable};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::{GraphEncoder, Segment};
use crate::color::Color;
use crate::error::Result;
use crate::style::RenderStyle;

/// One RGBA8 pixel, laid out exactly as the encoders expect.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Color> for Rgba8 {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Row-major pixel buffer, top row first.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba8::from(fill); width as usize * height as usize],
        }
    }

    /// Paints the segments of a laid-out graph onto a fresh canvas.
    pub fn draw(segments: &[Segment], style: &RenderStyle) -> Self {
        let fill = if style.transparent {
            Color::TRANSPARENT
        } else {
            style.background
        };
        let mut canvas = Canvas::new(style.width, style.height, fill);
        for seg in segments {
            canvas.vline(seg.column, seg.row_top, seg.row_bottom, style.color);
        }
        canvas
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Fills rows `top..=bottom` of column `x`, clipped to the canvas.
    pub fn vline(&mut self, x: u32, top: u32, bottom: u32, color: Color) {
        if x >= self.width || self.height == 0 {
            return;
        }
        let px: Rgba8 = color.into();
        let bottom = bottom.min(self.height - 1);
        for y in top..=bottom {
            self.pixels[(y * self.width + x) as usize] = px;
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

pub struct PngWriter;

impl GraphEncoder for PngWriter {
    fn encode(&self, segments: &[Segment], style: &RenderStyle) -> Result<Vec<u8>> {
        let canvas = Canvas::draw(segments, style);
        let mut out = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut out, CompressionType::Default, FilterType::Adaptive);
        encoder.write_image(
            canvas.as_bytes(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(out)
    }
}

/// Uncompressed RGBA8 bytes, `width * height * 4` long.
pub struct RawWriter;

impl GraphEncoder for RawWriter {
    fn encode(&self, segments: &[Segment], style: &RenderStyle) -> Result<Vec<u8>> {
        Ok(Canvas::draw(segments, style).as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vline_clips_and_paints() {
        let mut canvas = Canvas::new(3, 4, Color::WHITE);
        canvas.vline(1, 2, 10, Color::BLACK);
        canvas.vline(7, 0, 3, Color::BLACK);
        assert_eq!(canvas.pixel(1, 1), Some(Rgba8::from(Color::WHITE)));
        assert_eq!(canvas.pixel(1, 2), Some(Rgba8::from(Color::BLACK)));
        assert_eq!(canvas.pixel(1, 3), Some(Rgba8::from(Color::BLACK)));
        assert_eq!(canvas.pixel(0, 3), Some(Rgba8::from(Color::WHITE)));
        assert_eq!(canvas.as_bytes().len(), 3 * 4 * 4);
    }

    #[test]
    fn test_transparent_background() {
        let style = RenderStyle::default().with_size(2, 2).transparent(true);
        let canvas = Canvas::draw(&[], &style);
        assert!(canvas.as_bytes().chunks(4).all(|px| px[3] == 0));
    }
}
