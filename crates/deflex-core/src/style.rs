//! Visual style → utility tokens.
//!
//! Colors become bracketed `hsla(...)` tokens, gradients snap to the eight
//! compass directions, and every alpha is multiplied by the node's effective
//! opacity exactly once. Lossy substitutions report a warning through the
//! build context and never fail.

use crate::context::BuildContext;
use crate::design::{
    Color, Fill, LinearGradient, Rgba, Shadow, Stroke, TextAlign, TextDecoration, TextStyle,
};
use crate::id::DesignId;

// ─── Number formatting ───────────────────────────────────────────────────

/// Format with at most two decimals and no trailing zeros.
pub fn fmt_num(v: f32) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{rounded:.2}");
        s.trim_end_matches('0').to_string()
    }
}

/// Arbitrary pixel value token: `[12px]`.
pub fn px(v: i32) -> String {
    format!("[{v}px]")
}

fn px_f(v: f32) -> String {
    format!("[{}px]", fmt_num(v))
}

// ─── Colors ──────────────────────────────────────────────────────────────

/// HSL of an RGBA color: hue in whole degrees, saturation and lightness in
/// whole percent.
pub fn hsl(c: &Rgba) -> (i32, i32, i32) {
    let r = (c.r / 255.0).clamp(0.0, 1.0);
    let g = (c.g / 255.0).clamp(0.0, 1.0);
    let b = (c.b / 255.0).clamp(0.0, 1.0);

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let (h, s) = if (max - min).abs() < f32::EPSILON {
        (0.0, 0.0)
    } else {
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h * 60.0, s)
    };

    let hue = (h.round() as i32).rem_euclid(360);
    (hue, (s * 100.0).round() as i32, (l * 100.0).round() as i32)
}

/// Effective alpha after opacity baking, rounded to two decimals.
fn baked_alpha(c: &Rgba, opacity: f32) -> f32 {
    ((c.a * opacity).clamp(0.0, 1.0) * 100.0).round() / 100.0
}

/// CSS color function, for inline style values: `hsla(0,0%,0%,1)`.
pub fn hsla_css(c: &Rgba, opacity: f32) -> String {
    let (h, s, l) = hsl(c);
    format!("hsla({h},{s}%,{l}%,{})", fmt_num(baked_alpha(c, opacity)))
}

/// Color token: `[hsla(h,s%,l%,a)]`, or `transparent` when fully clear.
pub fn color_token(c: &Rgba, opacity: f32) -> String {
    if baked_alpha(c, opacity) <= 0.0 {
        "transparent".to_string()
    } else {
        format!("[{}]", hsla_css(c, opacity))
    }
}

// ─── Gradients ───────────────────────────────────────────────────────────

const COMPASS: [&str; 8] = ["t", "tr", "r", "br", "b", "bl", "l", "tl"];

/// CSS gradient angle in degrees, `[0, 360)`. Screen y grows downward, so
/// the vector is flipped before `atan2`.
pub fn gradient_angle(g: &LinearGradient) -> f32 {
    let dx = g.to_x - g.from_x;
    let dy = g.from_y - g.to_y;
    if dx == 0.0 && dy == 0.0 {
        return 180.0;
    }
    (90.0 - dy.atan2(dx).to_degrees()).rem_euclid(360.0)
}

/// Nearest 45° compass direction and whether the angle was already on it.
pub fn snap_direction(angle: f32) -> (&'static str, bool) {
    let steps = (angle / 45.0).round();
    let exact = (angle - steps * 45.0).abs() < 1e-3;
    (COMPASS[(steps as i32).rem_euclid(8) as usize], exact)
}

/// Tokens for a linear gradient background.
pub fn gradient_classes(
    g: &LinearGradient,
    opacity: f32,
    node: Option<&DesignId>,
    ctx: &mut BuildContext,
) -> Vec<String> {
    let stops = &g.color_stops;
    match stops.len() {
        0 => return Vec::new(),
        1 => return vec![format!("bg-{}", color_token(&stops[0].color, opacity))],
        _ => {}
    }

    let angle = gradient_angle(g);
    let (dir, exact) = snap_direction(angle);
    if !exact {
        ctx.warn(
            node,
            "gradient-angle",
            format!("gradient angle {}deg snapped to `to-{dir}`", fmt_num(angle)),
        );
    }

    let mut picked = vec![&stops[0]];
    if stops.len() > 2 {
        picked.push(&stops[1]);
    }
    picked.push(&stops[stops.len() - 1]);
    if stops.len() > 3 {
        ctx.warn(
            node,
            "gradient-stops",
            format!("{} gradient stops reduced to 3", stops.len()),
        );
    }

    let mut classes = vec![format!("bg-gradient-to-{dir}")];
    let last = picked.len() - 1;
    for (i, stop) in picked.into_iter().enumerate() {
        let (prefix, canonical) = match i {
            0 => ("from", 0.0),
            i if i == last => ("to", 1.0),
            _ => ("via", 0.5),
        };
        classes.push(format!("{prefix}-{}", color_token(&stop.color, opacity)));
        if (stop.position - canonical).abs() > 1e-3 {
            classes.push(format!("{prefix}-{}%", fmt_num(stop.position * 100.0)));
        }
    }
    classes
}

/// Solid color for places gradients can't go (text, borders).
fn solid_or_degrade(
    color: &Color,
    node: Option<&DesignId>,
    rule: &'static str,
    what: &str,
    ctx: &mut BuildContext,
) -> Option<Rgba> {
    if let Color::LinearGradient(_) = color {
        ctx.warn(
            node,
            rule,
            format!("gradient {what} unsupported, using first stop"),
        );
    }
    color.first_solid()
}

// ─── Fill / stroke / effect ──────────────────────────────────────────────

pub fn fill_classes(
    fill: &Fill,
    opacity: f32,
    node: Option<&DesignId>,
    ctx: &mut BuildContext,
) -> Vec<String> {
    let Some(first) = fill.colors.first() else {
        return Vec::new();
    };
    if fill.colors.len() > 1 {
        ctx.warn(
            node,
            "multi-fill",
            format!("{} fills, only the first is kept", fill.colors.len()),
        );
    }
    match first {
        Color::Normal(c) => vec![format!("bg-{}", color_token(c, opacity))],
        Color::LinearGradient(g) => gradient_classes(g, opacity, node, ctx),
    }
}

pub fn border_classes(
    stroke: &Stroke,
    opacity: f32,
    node: Option<&DesignId>,
    ctx: &mut BuildContext,
) -> Vec<String> {
    let mut classes = Vec::new();
    if let Some(border) = stroke.borders.first() {
        if stroke.borders.len() > 1 {
            ctx.warn(
                node,
                "multi-border",
                format!("{} borders, only the first is kept", stroke.borders.len()),
            );
        }
        if border.width > 0.0
            && let Some(c) = solid_or_degrade(&border.color, node, "gradient-border", "border", ctx)
        {
            classes.push(format!("border-{}", px_f(border.width)));
            classes.push(format!("border-{}", color_token(&c, opacity)));
        }
    }
    if let Some(radius) = stroke.radius {
        classes.extend(radius_classes(radius));
    }
    classes
}

/// Corner radii `[tl, tr, br, bl]`.
pub fn radius_classes(radius: [f32; 4]) -> Vec<String> {
    let [tl, tr, br, bl] = radius;
    if radius.iter().all(|r| (r - tl).abs() < 0.5) {
        return if tl >= 0.5 {
            vec![format!("rounded-{}", px_f(tl))]
        } else {
            Vec::new()
        };
    }
    [("tl", tl), ("tr", tr), ("br", br), ("bl", bl)]
        .into_iter()
        .filter(|(_, r)| *r >= 0.5)
        .map(|(corner, r)| format!("rounded-{corner}-{}", px_f(r)))
        .collect()
}

/// `box-shadow` value, or `None` without shadows.
pub fn shadow_style(shadows: &[Shadow], opacity: f32) -> Option<String> {
    let parts: Vec<String> = shadows
        .iter()
        .filter_map(|s| {
            let c = s.color.first_solid()?;
            Some(format!(
                "{}{}px {}px {}px {}px {}",
                if s.inset { "inset " } else { "" },
                fmt_num(s.offset_x),
                fmt_num(s.offset_y),
                fmt_num(s.blur),
                fmt_num(s.spread),
                hsla_css(&c, opacity)
            ))
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

// ─── Text ────────────────────────────────────────────────────────────────

/// Line height of a run in whole pixels.
pub fn line_height(run: &TextStyle, default_ratio: f32) -> i32 {
    run.font
        .line_height
        .unwrap_or(run.font.size * default_ratio)
        .round() as i32
}

/// Tokens for one text style run, plus its font family.
pub fn text_run_classes(
    run: &TextStyle,
    opacity: f32,
    node: Option<&DesignId>,
    ctx: &mut BuildContext,
) -> (Vec<String>, Option<String>) {
    let mut classes = vec![format!("text-{}", px_f(run.font.size))];
    if let Some(lh) = run.font.line_height {
        classes.push(format!("leading-{}", px_f(lh)));
    }
    if let Some(weight) = run.font.weight
        && weight != 400
    {
        classes.push(format!("font-[{weight}]"));
    }
    if let Some(spacing) = run.font.letter_spacing
        && spacing.abs() >= 0.01
    {
        classes.push(format!("tracking-{}", px_f(spacing)));
    }
    if let Some(c) = solid_or_degrade(&run.color, node, "gradient-text", "text color", ctx) {
        classes.push(format!("text-{}", color_token(&c, opacity)));
    }
    match run.decoration {
        Some(TextDecoration::Underline) => classes.push("underline".into()),
        Some(TextDecoration::LineThrough) => classes.push("line-through".into()),
        None => {}
    }
    (classes, run.font.family.clone())
}

pub fn text_align_class(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "text-left",
        TextAlign::Center => "text-center",
        TextAlign::Right => "text-right",
        TextAlign::Justify => "text-justify",
    }
}
