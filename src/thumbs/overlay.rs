//! Play-icon overlay for video posters.
//!
//! The glyph is a 50×50 RGBA tile drawn from three layers, bottom to top:
//!
//! | Layer | Geometry | Colour |
//! |---|---|---|
//! | disc | centre (24, 24), r = 24 | black, 35% |
//! | ring | centre (24, 24), r = 23, stroke 2 | white, 60% |
//! | triangle | (16, 12) (16, 36) (36, 24) | white, 90% |
//!
//! Edges are anti-aliased with 4×4 supersampling. The tile is rasterized once
//! per process and alpha-blended onto the centre of each extracted frame.

use super::calculations::centered_offset;
use image::{DynamicImage, Rgba, RgbaImage, imageops};
use std::sync::LazyLock;

/// Edge length of the glyph tile in pixels.
pub const GLYPH_SIZE: u32 = 50;

const SUBSAMPLES: u32 = 4;

enum Shape {
    Disc { cx: f32, cy: f32, r: f32 },
    Ring { cx: f32, cy: f32, r: f32, width: f32 },
    Triangle([(f32, f32); 3]),
}

impl Shape {
    fn contains(&self, x: f32, y: f32) -> bool {
        match *self {
            Shape::Disc { cx, cy, r } => (x - cx).hypot(y - cy) <= r,
            Shape::Ring { cx, cy, r, width } => {
                let d = (x - cx).hypot(y - cy);
                (d - r).abs() <= width / 2.0
            }
            Shape::Triangle([a, b, c]) => {
                let edge = |p: (f32, f32), q: (f32, f32)| (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0);
                let (d1, d2, d3) = (edge(a, b), edge(b, c), edge(c, a));
                let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
                let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
                !(has_neg && has_pos)
            }
        }
    }

    /// Fraction of the pixel at `(px, py)` covered by the shape.
    fn coverage(&self, px: u32, py: u32) -> f32 {
        let step = 1.0 / SUBSAMPLES as f32;
        let mut hits = 0;
        for sy in 0..SUBSAMPLES {
            for sx in 0..SUBSAMPLES {
                let x = px as f32 + (sx as f32 + 0.5) * step;
                let y = py as f32 + (sy as f32 + 0.5) * step;
                if self.contains(x, y) {
                    hits += 1;
                }
            }
        }
        hits as f32 / (SUBSAMPLES * SUBSAMPLES) as f32
    }
}

struct Layer {
    shape: Shape,
    rgb: [f32; 3],
    opacity: f32,
}

fn layers() -> [Layer; 3] {
    [
        Layer {
            shape: Shape::Disc {
                cx: 24.0,
                cy: 24.0,
                r: 24.0,
            },
            rgb: [0.0, 0.0, 0.0],
            opacity: 0.35,
        },
        Layer {
            shape: Shape::Ring {
                cx: 24.0,
                cy: 24.0,
                r: 23.0,
                width: 2.0,
            },
            rgb: [1.0, 1.0, 1.0],
            opacity: 0.6,
        },
        Layer {
            shape: Shape::Triangle([(16.0, 12.0), (16.0, 36.0), (36.0, 24.0)]),
            rgb: [1.0, 1.0, 1.0],
            opacity: 0.9,
        },
    ]
}

static GLYPH: LazyLock<RgbaImage> = LazyLock::new(rasterize_glyph);

fn rasterize_glyph() -> RgbaImage {
    let layers = layers();
    RgbaImage::from_fn(GLYPH_SIZE, GLYPH_SIZE, |px, py| {
        // Premultiplied source-over accumulation.
        let mut color = [0.0f32; 3];
        let mut alpha = 0.0f32;
        for layer in &layers {
            let a = layer.opacity * layer.shape.coverage(px, py);
            if a == 0.0 {
                continue;
            }
            for (c, src) in color.iter_mut().zip(layer.rgb) {
                *c = src * a + *c * (1.0 - a);
            }
            alpha = a + alpha * (1.0 - a);
        }
        if alpha == 0.0 {
            return Rgba([0, 0, 0, 0]);
        }
        let to_u8 = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgba([
            to_u8(color[0] / alpha),
            to_u8(color[1] / alpha),
            to_u8(color[2] / alpha),
            to_u8(alpha),
        ])
    })
}

/// The play glyph tile.
pub fn play_glyph() -> &'static RgbaImage {
    &GLYPH
}

/// Blend the play glyph onto the centre of `frame`.
pub fn composite_play_glyph(frame: &DynamicImage) -> DynamicImage {
    let mut base = frame.to_rgba8();
    let (x, y) = centered_offset(base.dimensions(), (GLYPH_SIZE, GLYPH_SIZE));
    imageops::overlay(&mut base, play_glyph(), x, y);
    DynamicImage::ImageRgba8(base)
}
