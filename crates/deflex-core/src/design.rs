//! Input model: the design document as exported by the design tool.
//!
//! Coordinates are float pixels with a top-left origin. Every optional
//! section defaults to empty so sparse exports deserialize cleanly.

use crate::id::DesignId;
use serde::Deserialize;

/// The exported document.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignDocument {
    pub size: CanvasSize,
    pub layers: DesignNode,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

// ─── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct DesignNode {
    pub basic: Basic,
    pub bounds: RawBounds,
    #[serde(default)]
    pub fill: Fill,
    #[serde(default)]
    pub stroke: Stroke,
    #[serde(default)]
    pub effect: Effect,
    #[serde(default)]
    pub text: Option<TextInfo>,
    #[serde(default)]
    pub slice: Option<Slice>,
    #[serde(default)]
    pub children: Vec<DesignNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basic {
    pub id: DesignId,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub real_type: Option<String>,
    #[serde(default = "full_opacity")]
    pub opacity: f32,
}

fn full_opacity() -> f32 {
    1.0
}

/// The design tool's layer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    #[serde(alias = "page")]
    Artboard,
    Group,
    Shape,
    Mask,
    Symbol,
    Text,
    Image,
    Slice,
    #[serde(other)]
    Unknown,
}

impl NodeType {
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeType::Artboard => "artboard",
            NodeType::Group => "group",
            NodeType::Shape => "shape",
            NodeType::Mask => "mask",
            NodeType::Symbol => "symbol",
            NodeType::Text => "text",
            NodeType::Image => "image",
            NodeType::Slice => "slice",
            NodeType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

// ─── Paint ───────────────────────────────────────────────────────────────

/// RGBA with 0–255 channels and alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "full_opacity")]
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ColorStop {
    pub color: Rgba,
    pub position: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearGradient {
    pub from_x: f32,
    pub from_y: f32,
    pub to_x: f32,
    pub to_y: f32,
    pub color_stops: Vec<ColorStop>,
}

/// A solid color or a linear gradient.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Color {
    #[serde(rename = "normal")]
    Normal(Rgba),
    #[serde(rename = "linearGradient")]
    LinearGradient(LinearGradient),
}

impl Color {
    /// The color itself, or a gradient's first stop.
    pub fn first_solid(&self) -> Option<Rgba> {
        match self {
            Color::Normal(c) => Some(*c),
            Color::LinearGradient(g) => g.color_stops.first().map(|s| s.color),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fill {
    #[serde(default)]
    pub colors: Vec<Color>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Stroke {
    #[serde(default)]
    pub borders: Vec<Border>,
    /// Corner radii: top-left, top-right, bottom-right, bottom-left.
    #[serde(default)]
    pub radius: Option<[f32; 4]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Border {
    pub color: Color,
    #[serde(default = "full_opacity")]
    pub width: f32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Effect {
    #[serde(default)]
    pub shadows: Vec<Shadow>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub color: Color,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,
    #[serde(default)]
    pub blur: f32,
    #[serde(default)]
    pub spread: f32,
    #[serde(default)]
    pub inset: bool,
}

// ─── Text ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextInfo {
    #[serde(default)]
    pub styles: Vec<TextStyle>,
}

/// One style run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub value: String,
    pub font: Font,
    pub color: Color,
    #[serde(default)]
    pub align: Option<TextAlign>,
    #[serde(default)]
    pub decoration: Option<TextDecoration>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub size: f32,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub weight: Option<u16>,
    #[serde(default)]
    pub line_height: Option<f32>,
    #[serde(default)]
    pub letter_spacing: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    Underline,
    LineThrough,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slice {
    #[serde(rename = "bitmapURL")]
    pub bitmap_url: String,
}
