//! Text overlay operators

/// RGB color with components in 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create color from float components, clamped to 0.0..=1.0
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// A single line of text to stamp onto a page
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    pub text: &'a str,
    /// Font size in points
    pub font_size: f32,
    /// Baseline origin X in points (from left)
    pub x: f64,
    /// Baseline origin Y in points (from bottom)
    pub y: f64,
    /// Counter-clockwise rotation around the origin, in degrees
    pub rotation_deg: f64,
    pub color: Color,
    /// Fill opacity in 0.0..=1.0
    pub opacity: f32,
}

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text color (RGB)
    pub color: Color,
    /// Rotation in degrees, counter-clockwise
    pub rotation_deg: f64,
    /// ExtGState resource carrying the opacity (e.g., "GS1")
    pub graphics_state: Option<String>,
}

/// Format a number for a content stream, without exponent or trailing zeros
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    // Avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}")
}

/// Generate PDF operators for a rotated text run
///
/// The run is wrapped in `q`/`Q` so that the graphics state and opacity do
/// not leak into content appended later. Placement uses a full text matrix
/// (`Tm`) so rotation happens around the baseline origin.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<48656C6C6F>")
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();
    let radians = ctx.rotation_deg.to_radians();
    let (sin, cos) = radians.sin_cos();

    ops.push_str("q\n");

    if let Some(gs) = &ctx.graphics_state {
        ops.push_str(&format!("/{gs} gs\n"));
    }

    ops.push_str("BT\n");

    // Non-stroking color
    ops.push_str(&format!(
        "{} {} {} rg\n",
        format_number(ctx.color.r as f64),
        format_number(ctx.color.g as f64),
        format_number(ctx.color.b as f64)
    ));

    ops.push_str(&format!(
        "/{} {} Tf\n",
        ctx.font_name,
        format_number(ctx.font_size as f64)
    ));

    // Text matrix: [cos sin -sin cos x y]
    ops.push_str(&format!(
        "{} {} {} {} {} {} Tm\n",
        format_number(cos),
        format_number(sin),
        format_number(-sin),
        format_number(cos),
        format_number(x),
        format_number(y)
    ));

    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");
    ops.push_str("Q\n");

    ops.into_bytes()
}
