//! Label measurement, placement and painting.
//!
//! Labels are painted the way a 2D canvas paints `strokeText` followed by
//! `fillText` under a soft black shadow: glyph coverage is rasterized into an
//! alpha mask, the stroke is the mask dilated by half the stroke width, and
//! each layer is composited source-over with its own blurred
//! shadow beneath it.

use image::{imageops, GrayImage, Luma, Pixel, RgbaImage};
use imageproc::{
    distance_transform::Norm,
    drawing::{draw_text_mut, text_size},
    morphology::dilate,
};
use rusttype::{point, Font, Scale};
use serde::{Deserialize, Serialize};

use crate::{Color, MapError, Point, TextStyle};

const REGULAR_FACE: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
const OBLIQUE_FACE: &[u8] = include_bytes!("../assets/DejaVuSans-Oblique.ttf");

/// Horizontal gap between the anchor and a left/right label.
pub const SIDE_GAP: f32 = 16.0;
/// Extra drop applied to labels placed below the anchor.
pub const DOWN_SHIFT: f32 = 28.0;
/// Lift applied to labels placed above the anchor.
pub const UP_SHIFT: f32 = 38.0;

const SHADOW_BLUR: f32 = 1.0;
const SHADOW_COLOR: Color = Color::BLACK;

/// Where a label sits relative to its anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Center = 0,
    Left = 1,
    Right = 2,
    Down = 3,
    Up = 4,
}

impl From<u8> for Orientation {
    /// Unknown values fall back to [`Orientation::Center`].
    fn from(value: u8) -> Self {
        match value {
            1 => Orientation::Left,
            2 => Orientation::Right,
            3 => Orientation::Down,
            4 => Orientation::Up,
            _ => Orientation::Center,
        }
    }
}

impl Orientation {
    /// Offset from the anchor to the start of the label's baseline.
    pub fn offset(self, metrics: TextMetrics) -> (f32, f32) {
        let centered = (-metrics.width / 2.0, metrics.ascent);
        match self {
            Orientation::Center => centered,
            Orientation::Left => (-metrics.width - SIDE_GAP, metrics.ascent / 2.0),
            Orientation::Right => (SIDE_GAP, metrics.ascent / 2.0),
            Orientation::Down => (centered.0, centered.1 + DOWN_SHIFT),
            Orientation::Up => (centered.0, centered.1 - UP_SHIFT),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextMetrics {
    /// Advance width of the whole run.
    pub width: f32,
    /// Distance from the baseline to the top of the em box.
    pub ascent: f32,
}

/// The fixed label font family, upright and oblique.
pub struct Fonts {
    regular: Font<'static>,
    oblique: Font<'static>,
}

impl Fonts {
    pub fn load() -> Result<Self, MapError> {
        Ok(Self {
            regular: Font::try_from_bytes(REGULAR_FACE).ok_or(MapError::Font("DejaVuSans"))?,
            oblique: Font::try_from_bytes(OBLIQUE_FACE)
                .ok_or(MapError::Font("DejaVuSans-Oblique"))?,
        })
    }

    pub fn face(&self, italic: bool) -> &Font<'static> {
        if italic {
            &self.oblique
        } else {
            &self.regular
        }
    }

    pub fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        measure(self.face(style.italic), text, style.size)
    }
}

/// rusttype scales by ascent-to-descent height; CSS sizes are em sizes.
fn em_scale(font: &Font<'_>, size: f32) -> Scale {
    let units = font.v_metrics_unscaled();
    let height = size * (units.ascent - units.descent) / f32::from(font.units_per_em());
    Scale::uniform(height)
}

pub fn measure(font: &Font<'_>, text: &str, size: f32) -> TextMetrics {
    let scale = em_scale(font, size);
    let width = font
        .layout(text, scale, point(0.0, 0.0))
        .last()
        .map_or(0.0, |glyph| {
            glyph.position().x + glyph.unpositioned().h_metrics().advance_width
        });
    let ascent = font.v_metrics(scale).ascent;
    log::trace!("measured {text:?} at {size}px: width {width}, ascent {ascent}");
    TextMetrics { width, ascent }
}

/// Stroke radius in whole pixels, or 0 when there is no stroke.
fn stroke_reach(width: f32) -> u8 {
    if width > 0.0 {
        (width / 2.0).round().clamp(1.0, 255.0) as u8
    } else {
        0
    }
}

fn composite(surface: &mut RgbaImage, mask: &GrayImage, origin: (i64, i64), color: Color) {
    let (width, height) = (i64::from(surface.width()), i64::from(surface.height()));
    for (mx, my, coverage) in mask.enumerate_pixels() {
        let (x, y) = (origin.0 + i64::from(mx), origin.1 + i64::from(my));
        if x < 0 || y < 0 || x >= width || y >= height {
            continue;
        }
        let paint = color.to_rgba(f32::from(coverage[0]) / 255.0);
        if paint[3] == 0 {
            continue;
        }
        surface.get_pixel_mut(x as u32, y as u32).blend(&paint);
    }
}

fn composite_with_shadow(
    surface: &mut RgbaImage,
    mask: &GrayImage,
    origin: (i64, i64),
    color: Color,
) {
    // canvas shadow blur maps to a gaussian sigma of half the blur radius
    let shadow = imageops::blur(mask, SHADOW_BLUR / 2.0);
    let shadow_color = Color {
        a: (u16::from(SHADOW_COLOR.a) * u16::from(color.a) / 255) as u8,
        ..SHADOW_COLOR
    };
    composite(surface, &shadow, origin, shadow_color);
    composite(surface, mask, origin, color);
}

/// Paints `text` with its baseline starting at `baseline`: stroke first,
/// fill on top, each over its own shadow. Text that cannot reach the surface
/// is skipped.
pub fn paint(
    surface: &mut RgbaImage,
    font: &Font<'_>,
    text: &str,
    baseline: Point,
    style: &TextStyle,
) {
    let scale = em_scale(font, style.size);
    let (width, height) = text_size(scale, font, text);
    if width <= 0 || height <= 0 {
        return;
    }

    let pad = i32::from(stroke_reach(style.stroke_width)) + 2;
    let ascent = font.v_metrics(scale).ascent;
    let reach = f64::from(width.max(height) + 2 * pad) + f64::from(style.size);
    let off_surface = !(baseline.x.is_finite() && baseline.y.is_finite())
        || baseline.x + reach < 0.0
        || baseline.y + reach < 0.0
        || baseline.x - reach > f64::from(surface.width())
        || baseline.y - reach > f64::from(surface.height());
    if off_surface {
        log::trace!("skipping {text:?}, baseline ({}, {}) is off the surface", baseline.x, baseline.y);
        return;
    }

    let origin = (
        baseline.x.round() as i64 - i64::from(pad),
        (baseline.y - f64::from(ascent)).round() as i64 - i64::from(pad),
    );
    let mut fill = GrayImage::new((width + 2 * pad) as u32, (height + 2 * pad) as u32);
    draw_text_mut(&mut fill, Luma([255]), pad, pad, scale, font, text);

    if style.stroke_width > 0.0 {
        let stroke = dilate(&fill, Norm::L1, stroke_reach(style.stroke_width));
        composite_with_shadow(surface, &stroke, origin, style.stroke_style);
    }
    composite_with_shadow(surface, &fill, origin, style.fill_style);
}
