//! Operation parameters and fixed transform settings

use crate::{Result, ToolError};
use pdf_core::{Color, Font, FontData, StandardFont};
use serde::{Deserialize, Serialize};

/// Render scale for high compression (one pixel per point)
pub const COMPRESS_RENDER_SCALE: f32 = 1.0;
/// JPEG quality for high compression
pub const COMPRESS_JPEG_QUALITY: u8 = 50;
/// Render scale for PDF to images (two pixels per point)
pub const EXPORT_RENDER_SCALE: f32 = 2.0;
/// JPEG quality for PDF to images
pub const EXPORT_JPEG_QUALITY: u8 = 80;
/// Savings at or below this many bytes count as "already optimized"
pub const MIN_EFFECTIVE_SAVINGS: u64 = 1024;

/// RGB colour with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb` (the `#` is optional)
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || ToolError::InvalidParameter(format!("invalid colour {hex:?}"));
        if !digits.is_ascii() {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        let (r, g, b) = match digits.len() {
            6 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ),
            3 => (
                channel(&digits[0..1])? * 17,
                channel(&digits[1..2])? * 17,
                channel(&digits[2..3])? * 17,
            ),
            _ => return Err(invalid()),
        };

        Ok(Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        ))
    }

    fn is_valid(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::new(0.75, 0.2, 0.2)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::rgb(rgb.r, rgb.g, rgb.b)
    }
}

/// Font used to draw watermark text
#[derive(Debug, Clone, Default)]
pub enum WatermarkFont {
    /// Helvetica-Bold; Latin-1 text only
    #[default]
    Standard,
    /// Embedded TrueType font, for text outside Latin-1
    TrueType(FontData),
}

impl From<WatermarkFont> for Font {
    fn from(font: WatermarkFont) -> Self {
        match font {
            WatermarkFont::Standard => Font::Standard(StandardFont::HelveticaBold),
            WatermarkFont::TrueType(data) => Font::TrueType(data),
        }
    }
}

/// Watermark text and placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatermarkSpec {
    pub text: String,
    pub font_size_pt: f32,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f32,
    pub color: Rgb,
    /// Counter-clockwise from horizontal, -90..=90
    pub rotation_deg: i32,
    /// Repeat across the page instead of a single centered stamp
    pub tiled: bool,
    #[serde(skip)]
    pub font: WatermarkFont,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size_pt: 50.0,
            opacity: 0.5,
            color: Rgb::default(),
            rotation_deg: -45,
            tiled: false,
            font: WatermarkFont::Standard,
        }
    }
}

impl WatermarkSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| Err(ToolError::InvalidParameter(message.to_string()));

        if self.text.trim().is_empty() {
            return invalid("watermark text is empty");
        }
        if !(self.font_size_pt.is_finite() && self.font_size_pt > 0.0) {
            return invalid("font size must be positive");
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return invalid("opacity must be between 0 and 1");
        }
        if !self.color.is_valid() {
            return invalid("colour components must be between 0 and 1");
        }
        if !(-90..=90).contains(&self.rotation_deg) {
            return invalid("rotation must be between -90 and 90 degrees");
        }
        Ok(())
    }
}

/// Compression strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressLevel {
    /// Strip metadata only
    Low,
    /// Strip metadata and merge duplicate objects
    #[default]
    Medium,
    /// Rasterize every page to a low quality JPEG
    High,
}

impl CompressLevel {
    /// Rough output size shown before compressing
    pub fn estimated_size(self, input_len: u64) -> u64 {
        let ratio = match self {
            CompressLevel::Low => 0.95,
            CompressLevel::Medium => 0.85,
            CompressLevel::High => 0.40,
        };
        (input_len as f64 * ratio).round() as u64
    }
}
