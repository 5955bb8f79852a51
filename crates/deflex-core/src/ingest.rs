//! Preprocessor: design document → raw layout tree.
//!
//! Walks the design tree once, top-down. Every eligible design node becomes
//! exactly one `VNode` with absolute integer bounds and resolved style
//! tokens; the result is an unstructured tree mirroring the design's
//! grouping, which the tree builder then normalizes.

use crate::config::{DEFAULT_LINE_HEIGHT_RATIO, DIVIDER_THICKNESS, MAX_CANVAS_EXTENT, MULTI_LINE_FACTOR};
use crate::context::BuildContext;
use crate::design::{DesignDocument, DesignNode, NodeType, TextInfo};
use crate::error::{ConvertError, Result};
use crate::geometry::{approx_eq, intersection};
use crate::model::{Bounds, Role, SizeSpec, Tag, TextContent, VNode, VTree};
use crate::style;
use petgraph::graph::NodeIndex;

/// Build the raw tree from a parsed document.
pub fn ingest(doc: &DesignDocument, ctx: &mut BuildContext) -> Result<VTree> {
    let root = &doc.layers;
    if root.basic.kind != NodeType::Artboard {
        return Err(ConvertError::InvalidRoot {
            found: root.basic.kind.as_str().to_string(),
        });
    }
    let (width, height) = (doc.size.width, doc.size.height);
    if !(width > 0.0 && width <= MAX_CANVAS_EXTENT && height > 0.0 && height <= MAX_CANVAS_EXTENT) {
        return Err(ConvertError::UnsupportedCanvas { width, height });
    }

    // Child coordinates are made relative to the artboard's own origin.
    let origin = (root.bounds.left, root.bounds.top);
    let page = Bounds::new(0, 0, width.round() as i32, height.round() as i32);
    ctx.page = page;

    let opacity = root.basic.opacity.clamp(0.0, 1.0);
    let mut page_node = VNode::new(Some(root.basic.id.clone()), ctx.next_index(), Tag::View, page);
    page_node.role.insert(Role::Page);
    page_node.width_spec = Some(SizeSpec::Constrained);
    page_node.height_spec = Some(SizeSpec::Auto);
    page_node.class_list.extend(["flex", "w-full", "min-h-screen"]);
    page_node
        .class_list
        .extend(style::fill_classes(&root.fill, opacity, Some(&root.basic.id), ctx));

    let mut walker = Walker {
        ctx,
        tree: VTree::new(page_node),
        origin,
    };
    let page_idx = walker.tree.root;
    for child in &root.children {
        walker.visit(child, page_idx, page, 1, opacity);
    }

    let tree = walker.tree;
    log::debug!("ingest: {} nodes", tree.node_count());
    Ok(tree)
}

struct Walker<'c, 'a> {
    ctx: &'c mut BuildContext<'a>,
    tree: VTree,
    origin: (f32, f32),
}

impl Walker<'_, '_> {
    fn visit(
        &mut self,
        node: &DesignNode,
        owner: NodeIndex,
        owner_bounds: Bounds,
        depth: u32,
        inherited_opacity: f32,
    ) {
        let id = &node.basic.id;
        let config = self.ctx.config;
        if config.is_black_listed(id.as_str()) {
            log::trace!("ingest: #{id} black-listed");
            return;
        }
        let white_listed = config.is_white_listed(id.as_str());
        if node.basic.kind == NodeType::Unknown && config.strict && !white_listed {
            self.ctx.warn(Some(id), "unknown-type", "node of unknown type dropped".into());
            return;
        }
        let opacity = inherited_opacity * node.basic.opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 && !white_listed {
            log::trace!("ingest: #{id} is fully transparent");
            return;
        }

        let mut raw = node.bounds;
        raw.left -= self.origin.0;
        raw.top -= self.origin.1;
        let Some(on_page) = intersection(&Bounds::from_raw(&raw), &self.ctx.page) else {
            log::trace!("ingest: #{id} has no area on the page");
            return;
        };
        let (owner, bounds) = match intersection(&on_page, &owner_bounds) {
            Some(clipped) => (owner, clipped),
            None if owner == self.tree.root => (owner, on_page),
            None => {
                self.ctx.warn(
                    Some(id),
                    "out-of-parent",
                    "outside its parent, promoted to the page".into(),
                );
                (self.tree.root, on_page)
            }
        };

        let is_chrome = depth == 1 && node.basic.kind == NodeType::Symbol;
        let vnode = match node.basic.kind {
            _ if is_chrome => self.chrome(node, bounds, opacity),
            NodeType::Text => match &node.text {
                Some(text) => self.text(node, text, bounds, opacity),
                None => self.container(node, bounds, opacity),
            },
            NodeType::Image => {
                let mut v = self.styled(node, Tag::Image, bounds, opacity);
                v.src = node.slice.as_ref().map(|s| s.bitmap_url.clone());
                v.width_spec = Some(SizeSpec::Fixed);
                v.height_spec = Some(SizeSpec::Fixed);
                v
            }
            NodeType::Slice => {
                let mut v = self.styled(node, Tag::View, bounds, opacity);
                match &node.slice {
                    Some(slice) => {
                        v.style
                            .insert("background-image".into(), format!("url({})", slice.bitmap_url));
                        v.class_list.extend(["bg-cover", "bg-no-repeat"]);
                    }
                    None => self.ctx.warn(Some(id), "slice-source", "slice without a bitmap".into()),
                }
                v.width_spec = Some(SizeSpec::Fixed);
                v.height_spec = Some(SizeSpec::Fixed);
                v
            }
            _ => self.container(node, bounds, opacity),
        };
        let is_content = vnode.is_content_leaf();

        let idx = if is_chrome || config.is_forced_attach(id.as_str()) {
            self.tree.add_attach(owner, vnode)
        } else {
            self.tree.add_child(owner, vnode)
        };

        let descend = !is_content
            && node.basic.kind != NodeType::Slice
            && (!is_chrome || config.build_all_nodes);
        if descend {
            for child in &node.children {
                self.visit(child, idx, bounds, depth + 1, opacity);
            }
        }

        if self.tree.is_leaf(idx) {
            mark_divider(&mut self.tree[idx]);
        }
    }

    /// A node with the common box styling: fill, border, radius and shadow.
    fn styled(&mut self, node: &DesignNode, tag: Tag, bounds: Bounds, opacity: f32) -> VNode {
        let id = &node.basic.id;
        let mut v = VNode::new(Some(id.clone()), self.ctx.next_index(), tag, bounds);
        v.class_list
            .extend(style::fill_classes(&node.fill, opacity, Some(id), self.ctx));
        v.class_list
            .extend(style::border_classes(&node.stroke, opacity, Some(id), self.ctx));
        if let Some(shadow) = style::shadow_style(&node.effect.shadows, opacity) {
            v.style.insert("box-shadow".into(), shadow);
        }
        if matches!(node.basic.real_type.as_deref(), Some("oval" | "ellipse")) {
            v.class_list.remove_prefix("rounded");
            v.class_list.push("rounded-full");
        }
        v
    }

    fn container(&mut self, node: &DesignNode, bounds: Bounds, opacity: f32) -> VNode {
        self.styled(node, Tag::View, bounds, opacity)
    }

    /// Header or bottom safe-area symbol, fixed to the viewport.
    fn chrome(&mut self, node: &DesignNode, bounds: Bounds, opacity: f32) -> VNode {
        let page = self.ctx.page;
        let is_header = approx_eq(bounds.left(), page.left()) && approx_eq(bounds.top(), page.top());
        let mut v = self.styled(node, Tag::View, bounds, opacity);
        let (role, edge) = if is_header {
            (Role::Header, "top-0")
        } else {
            (Role::SafeArea, "bottom-0")
        };
        v.role.insert(role);
        v.class_list.extend([
            "fixed".to_string(),
            edge.to_string(),
            "left-0".to_string(),
            "w-full".to_string(),
            format!("h-{}", style::px(bounds.height())),
            "z-50".to_string(),
        ]);
        v.width_spec = Some(SizeSpec::Fixed);
        v.height_spec = Some(SizeSpec::Fixed);
        log::trace!("ingest: #{} is {}", node.basic.id, role.as_str());
        v
    }

    fn text(&mut self, node: &DesignNode, text: &TextInfo, bounds: Bounds, opacity: f32) -> VNode {
        let id = &node.basic.id;
        let mut v = self.styled(node, Tag::Text, bounds, opacity);

        let line_height = text
            .styles
            .iter()
            .map(|run| style::line_height(run, DEFAULT_LINE_HEIGHT_RATIO))
            .max()
            .unwrap_or(bounds.height());
        let multi_line = (line_height as f32) * MULTI_LINE_FACTOR < bounds.height() as f32;
        v.line_height = Some(line_height);
        v.text_multi_line = multi_line;

        if let Some(align) = text.styles.iter().find_map(|run| run.align) {
            v.class_list.push(style::text_align_class(align));
        }

        let content = match text.styles.as_slice() {
            [] => TextContent::Literal(String::new()),
            [run] => {
                let (classes, family) = style::text_run_classes(run, opacity, Some(id), self.ctx);
                v.class_list.extend(classes);
                if let Some(family) = family {
                    v.style.insert("font-family".into(), family);
                }
                TextContent::Literal(run.value.clone())
            }
            runs => TextContent::Spans(
                runs.iter()
                    .map(|run| {
                        let mut span = VNode::new(None, self.ctx.next_index(), Tag::Span, bounds);
                        let (classes, family) =
                            style::text_run_classes(run, opacity, Some(id), self.ctx);
                        span.class_list.extend(classes);
                        if let Some(family) = family {
                            span.style.insert("font-family".into(), family);
                        }
                        span.text = Some(TextContent::Literal(run.value.clone()));
                        span
                    })
                    .collect(),
            ),
        };
        v.text = Some(content);

        if multi_line {
            v.width_spec = Some(SizeSpec::Auto);
            v.height_spec = Some(SizeSpec::Auto);
        } else {
            v.height_spec = Some(SizeSpec::Fixed);
            v.class_list.push("whitespace-nowrap");
        }
        v
    }
}

/// Thin, elongated, painted leaves are separators.
fn mark_divider(v: &mut VNode) {
    if v.tag != Tag::View || !v.has_visual_style() || v.role.is_chrome() {
        return;
    }
    let short = v.bounds.width().min(v.bounds.height());
    let long = v.bounds.width().max(v.bounds.height());
    if short <= DIVIDER_THICKNESS && long >= short * 4 {
        v.role.insert(Role::Divider);
        v.width_spec = Some(SizeSpec::Fixed);
        v.height_spec = Some(SizeSpec::Fixed);
    }
}
