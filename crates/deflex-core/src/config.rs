//! Conversion configuration and the named tunables used by every pass.
//!
//! `BuildConfig` is borrowed immutably for a whole conversion. The constants
//! below replace the pixel fudge factors scattered through the heuristics;
//! they are calibrated for integer-pixel input after rounding.

use serde::Deserialize;

// ─── Tunables ────────────────────────────────────────────────────────────

/// Two pixel values closer than this are considered equal.
pub const TOLERANCE: i32 = 1;

/// A smaller box overlapping a larger one becomes its attach node when the
/// overlap covers more than this share of the smaller box on both axes.
pub const ATTACH_INTRUSION_RATIO: f32 = 0.5;

/// Text is multi-line when `max(line_height) * MULTI_LINE_FACTOR < height`.
pub const MULTI_LINE_FACTOR: f32 = 1.5;

/// Line height assumed for runs that don't declare one, as a font-size ratio.
pub const DEFAULT_LINE_HEIGHT_RATIO: f32 = 1.4;

/// Leaves no thicker than this (and elongated) are dividers.
pub const DIVIDER_THICKNESS: i32 = 2;

/// Overlapping strips no thicker than this that touch an owner edge are borders.
pub const BORDER_STRIP_THICKNESS: i32 = 2;

/// Largest repetition period considered by list detection.
pub const MAX_LIST_PERIOD: usize = 3;

/// Repeating groups a single, unwrapped line needs before it becomes a list.
pub const MIN_LIST_GROUPS: usize = 3;

/// Children sharing a margin before it is hoisted into parent padding.
pub const MIN_SHARED_PADDING_GROUP: usize = 3;

/// z-index given to text children by the z-index pass.
pub const Z_INDEX_TEXT: i32 = 99;

/// Largest canvas edge accepted, in pixels.
pub const MAX_CANVAS_EXTENT: f32 = 16_384.0;

// ─── Config ──────────────────────────────────────────────────────────────

/// How far the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStage {
    /// Ingestion only: raw tree with absolute bounds.
    Pre,
    /// Ingestion + tree builder.
    Tree,
    /// Full pipeline.
    #[default]
    Measure,
}

/// Options for one conversion.
///
/// All optional passes default to off. Hosts usually load this from JSON;
/// field names are camelCase on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    pub build_stage: BuildStage,

    /// Keep the children of header / safe-area symbols instead of discarding them.
    pub build_all_nodes: bool,

    /// Unwrap style-less group containers before tree building.
    pub remove_ghost_nodes: bool,

    /// Design IDs dropped during ingestion, with their subtrees.
    pub black_list_nodes: Vec<String>,

    /// Design IDs never dropped for opacity / unknown type and never unwrapped as ghosts.
    pub white_list_nodes: Vec<String>,

    /// Design IDs forced out of flow as attach nodes of their parent.
    pub attach_nodes: Vec<String>,

    /// Give list items a fixed size instead of content-driven sizing.
    pub list_item_size_fixed: bool,

    /// Clamp multi-line text to its designed line count.
    pub text_clamp: bool,

    /// Let overflowing lists scroll.
    pub list_overflow_auto: bool,

    /// Bound overflowing content by the space left before its neighbour.
    pub overflow_margin: bool,

    /// Emit z-index classes from paint order.
    pub experimental_z_index: bool,

    /// Drop nodes of unrecognized type instead of treating them as containers.
    pub strict: bool,
}

impl BuildConfig {
    pub fn is_black_listed(&self, id: &str) -> bool {
        self.black_list_nodes.iter().any(|b| b == id)
    }

    pub fn is_white_listed(&self, id: &str) -> bool {
        self.white_list_nodes.iter().any(|w| w == id)
    }

    pub fn is_forced_attach(&self, id: &str) -> bool {
        self.attach_nodes.iter().any(|a| a == id)
    }

    /// Whether the pipeline runs through `stage`.
    pub fn reaches(&self, stage: BuildStage) -> bool {
        self.build_stage >= stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_full_pipeline() {
        let config = BuildConfig::default();
        assert!(config.reaches(BuildStage::Tree));
        assert!(config.reaches(BuildStage::Measure));
        assert!(!config.remove_ghost_nodes);
    }

    #[test]
    fn deserializes_camel_case() {
        let config: BuildConfig = serde_json::from_str(
            r#"{ "buildStage": "tree", "blackListNodes": ["a"], "textClamp": true }"#,
        )
        .unwrap();
        assert_eq!(config.build_stage, BuildStage::Tree);
        assert!(config.is_black_listed("a"));
        assert!(!config.is_black_listed("b"));
        assert!(config.text_clamp);
        assert!(!config.reaches(BuildStage::Measure));
    }
}
