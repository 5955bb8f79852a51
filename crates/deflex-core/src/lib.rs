//! Deflex: design document → semantic flex layout tree.
//!
//! The pipeline runs in three stages over one [`VTree`]:
//!
//! 1. [`ingest`]: the design document becomes a raw tree of absolutely
//!    positioned nodes with resolved style tokens;
//! 2. [`tree`]: sibling sets are regrouped by geometry into flex containers,
//!    lists and tables, with overlapping strays as attach nodes;
//! 3. [`measure`]: every node gets size modes, alignment, justification
//!    and position tokens.
//!
//! [`BuildConfig::build_stage`] stops the pipeline early. Each stage is
//! followed by fatal internal-consistency checks from [`validate`].

pub mod config;
pub mod context;
pub mod design;
pub mod emitter;
pub mod error;
pub mod geometry;
pub mod id;
pub mod ingest;
pub mod measure;
pub mod model;
pub mod style;
pub mod transform;
pub mod tree;
pub mod validate;

pub use config::{BuildConfig, BuildStage};
pub use context::{BuildContext, Diagnostic, Severity};
pub use design::DesignDocument;
pub use emitter::{OutputNode, OutputText, emit_outline, emit_tree};
pub use error::{ConvertError, Result};
pub use id::DesignId;
pub use model::*;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;

/// The result of one conversion.
#[derive(Debug)]
pub struct Conversion {
    pub tree: VTree,
    /// Degradations and notable decisions, in the order they were made.
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    /// Renderer-facing output tree.
    #[must_use]
    pub fn output(&self) -> OutputNode {
        emit_tree(&self.tree)
    }

    #[must_use]
    pub fn outline(&self) -> String {
        emit_outline(&self.tree)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }
}

/// Run the pipeline on a parsed document, up to `config.build_stage`.
pub fn convert(doc: &DesignDocument, config: &BuildConfig) -> Result<Conversion> {
    let mut ctx = BuildContext::new(config);
    let mut vtree = ingest::ingest(doc, &mut ctx)?;
    log::debug!("ingest: {} nodes", vtree.node_count());

    if config.remove_ghost_nodes {
        let removed = transform::remove_ghost_nodes(&mut vtree, config);
        log::debug!("transform: removed {removed} ghost nodes");
    }
    if config.experimental_z_index {
        transform::assign_z_index(&mut vtree);
    }

    if config.reaches(BuildStage::Tree) {
        tree::build_tree(&mut vtree, &mut ctx);
        validate::validate_structure(&vtree)?;
    }
    if config.reaches(BuildStage::Measure) {
        measure::measure_tree(&mut vtree, &mut ctx);
        validate::validate_structure(&vtree)?;
        validate::validate_specs(&vtree)?;
    }

    Ok(Conversion {
        tree: vtree,
        diagnostics: ctx.into_diagnostics(),
    })
}

/// Parse a JSON design document and convert it.
pub fn convert_json(input: &str, config: &BuildConfig) -> Result<Conversion> {
    let doc: DesignDocument = serde_json::from_str(input)?;
    convert(&doc, config)
}
