//! The layout tree shared by every pass.
//!
//! A conversion produces one `VTree`: `VNode` values stored in a stable
//! graph, with owner → member edges that are either flow children or attach
//! nodes. Handles (`NodeIndex`) stay valid across restructuring, so passes
//! move nodes between owners instead of re-creating them.

use crate::id::DesignId;
use petgraph::Direction as EdgeDirection;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use crate::design::RawBounds;

// ─── Geometry ────────────────────────────────────────────────────────────

/// Integer-pixel box. `right` and `bottom` are derived and re-derived by
/// every constructor and setter, so they can never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Bounds {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    right: i32,
    bottom: i32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        let width = if width < 0 { 0 } else { width };
        let height = if height < 0 { 0 } else { height };
        Self {
            left,
            top,
            width,
            height,
            right: left + width,
            bottom: top + height,
        }
    }

    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Round float design coordinates by edge, so adjacent boxes stay adjacent.
    pub fn from_raw(raw: &RawBounds) -> Self {
        let left = raw.left.round() as i32;
        let top = raw.top.round() as i32;
        let right = (raw.left + raw.width).round() as i32;
        let bottom = (raw.top + raw.height).round() as i32;
        Self::from_edges(left, top, right, bottom)
    }

    pub const fn left(&self) -> i32 {
        self.left
    }

    pub const fn top(&self) -> i32 {
        self.top
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn right(&self) -> i32 {
        self.right
    }

    pub const fn bottom(&self) -> i32 {
        self.bottom
    }

    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Leading edge along `dir` (left for rows, top for columns).
    pub const fn start(&self, dir: Direction) -> i32 {
        match dir {
            Direction::Row => self.left,
            Direction::Column => self.top,
        }
    }

    /// Trailing edge along `dir`.
    pub const fn end(&self, dir: Direction) -> i32 {
        match dir {
            Direction::Row => self.right,
            Direction::Column => self.bottom,
        }
    }

    pub const fn extent(&self, dir: Direction) -> i32 {
        match dir {
            Direction::Row => self.width,
            Direction::Column => self.height,
        }
    }

    /// Replace the span along `dir`, keeping the other axis.
    #[must_use]
    pub const fn with_span(self, dir: Direction, start: i32, end: i32) -> Self {
        match dir {
            Direction::Row => Self::from_edges(start, self.top, end, self.bottom),
            Direction::Column => Self::from_edges(self.left, start, self.right, end),
        }
    }
}

// ─── Layout vocabulary ───────────────────────────────────────────────────

/// Per-axis sizing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeSpec {
    /// Pixel-exact.
    Fixed,
    /// Content-driven.
    Auto,
    /// Stretched by the parent.
    Constrained,
}

/// Flex axis a container lays its children along. Doubles as an axis
/// selector for geometry helpers: `Row` is horizontal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Row,
    Column,
}

impl Direction {
    pub const fn cross(self) -> Self {
        match self {
            Direction::Row => Direction::Column,
            Direction::Column => Direction::Row,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Row => "row",
            Direction::Column => "column",
        }
    }
}

/// Cross-axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Align {
    Start,
    Center,
    End,
    Stretch,
}

/// Semantic tag driving special-case layout behavior and exposed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Page,
    Header,
    SafeArea,
    Divider,
    Border,
    ListX,
    ListY,
    ListWrap,
    ListItem,
    Btn,
    TableRow,
    TableBody,
    Spacer,
    Overflow,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Page => "page",
            Role::Header => "header",
            Role::SafeArea => "safe-area",
            Role::Divider => "divider",
            Role::Border => "border",
            Role::ListX => "list-x",
            Role::ListY => "list-y",
            Role::ListWrap => "list-wrap",
            Role::ListItem => "list-item",
            Role::Btn => "btn",
            Role::TableRow => "table-row",
            Role::TableBody => "table-body",
            Role::Spacer => "spacer",
            Role::Overflow => "overflow",
        }
    }
}

/// Small de-duplicated set of roles, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(SmallVec<[Role; 2]>);

impl RoleSet {
    pub fn insert(&mut self, role: Role) {
        if !self.0.contains(&role) {
            self.0.push(role);
        }
    }

    pub fn remove(&mut self, role: Role) {
        self.0.retain(|r| *r != role);
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn extend(&mut self, other: &RoleSet) {
        for role in other.iter() {
            self.insert(role);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Any list container role (not `ListItem`).
    pub fn is_list(&self) -> bool {
        self.0.iter().any(|r| {
            matches!(
                r,
                Role::ListX | Role::ListY | Role::ListWrap | Role::TableBody
            )
        })
    }

    /// Fixed-position chrome placed by ingestion, never repositioned.
    pub fn is_chrome(&self) -> bool {
        self.contains(Role::Header) || self.contains(Role::SafeArea)
    }
}

/// Element kind, substituted per platform by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    View,
    Text,
    Span,
    Image,
}

impl Tag {
    pub const fn tag_name(self) -> &'static str {
        match self {
            Tag::View => "div",
            Tag::Text => "p",
            Tag::Span => "span",
            Tag::Image => "img",
        }
    }
}

// ─── Class list ──────────────────────────────────────────────────────────

/// Ordered, de-duplicated utility tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn push(&mut self, token: impl Into<String>) {
        let token = token.into();
        if !token.is_empty() && !self.0.contains(&token) {
            self.0.push(token);
        }
    }

    pub fn extend<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for t in tokens {
            self.push(t);
        }
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.iter().any(|t| t.starts_with(prefix))
    }

    pub fn remove(&mut self, token: &str) {
        self.0.retain(|t| t != token);
    }

    pub fn remove_prefix(&mut self, prefix: &str) {
        self.0.retain(|t| !t.starts_with(prefix));
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// Literal text or one inline span per style run.
#[derive(Debug, Clone, PartialEq)]
pub enum TextContent {
    Literal(String),
    Spans(Vec<VNode>),
}

impl TextContent {
    pub fn plain(&self) -> String {
        match self {
            TextContent::Literal(s) => s.clone(),
            TextContent::Spans(spans) => spans
                .iter()
                .filter_map(|s| s.text.as_ref().map(TextContent::plain))
                .collect(),
        }
    }
}

/// One node of the layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VNode {
    /// Design node this came from; `None` for generated containers.
    pub id: Option<DesignId>,
    /// Creation order within the conversion.
    pub index: u32,
    pub tag: Tag,
    pub bounds: Bounds,
    pub width_spec: Option<SizeSpec>,
    pub height_spec: Option<SizeSpec>,
    pub direction: Option<Direction>,
    /// Cross-axis alignment; list detection may preset it.
    pub align: Option<Align>,
    pub class_list: ClassList,
    pub style: BTreeMap<String, String>,
    pub role: RoleSet,
    pub text: Option<TextContent>,
    pub text_multi_line: bool,
    /// Largest line height over the text runs.
    pub line_height: Option<i32>,
    /// Image source for image leaves.
    pub src: Option<String>,
}

impl VNode {
    pub fn new(id: Option<DesignId>, index: u32, tag: Tag, bounds: Bounds) -> Self {
        Self {
            id,
            index,
            tag,
            bounds,
            width_spec: None,
            height_spec: None,
            direction: None,
            align: None,
            class_list: ClassList::default(),
            style: BTreeMap::new(),
            role: RoleSet::default(),
            text: None,
            text_multi_line: false,
            line_height: None,
            src: None,
        }
    }

    /// A synthesized container with no design counterpart.
    pub fn generated(index: u32, bounds: Bounds, direction: Direction) -> Self {
        let mut node = Self::new(None, index, Tag::View, bounds);
        node.direction = Some(direction);
        node
    }

    pub fn is_generated(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_text(&self) -> bool {
        self.tag == Tag::Text
    }

    pub fn is_image(&self) -> bool {
        self.tag == Tag::Image
    }

    /// Text and image leaves carry content and can't host children.
    pub fn is_content_leaf(&self) -> bool {
        matches!(self.tag, Tag::Text | Tag::Image | Tag::Span)
    }

    /// Text with no box styling of its own.
    pub fn is_bare_text(&self) -> bool {
        self.is_text() && !self.has_visual_style()
    }

    /// Paints something besides its content: background, border or shadow.
    pub fn has_visual_style(&self) -> bool {
        self.class_list
            .iter()
            .any(|t| t.starts_with("bg-") || t.starts_with("border") || t.starts_with("from-"))
            || self.style.contains_key("box-shadow")
            || self.style.contains_key("background-image")
    }

    /// Size spec along `axis` (`Row` is width).
    pub fn spec(&self, axis: Direction) -> Option<SizeSpec> {
        match axis {
            Direction::Row => self.width_spec,
            Direction::Column => self.height_spec,
        }
    }

    pub fn set_spec(&mut self, axis: Direction, spec: SizeSpec) {
        match axis {
            Direction::Row => self.width_spec = Some(spec),
            Direction::Column => self.height_spec = Some(spec),
        }
    }

    /// Content that wraps: it needs a definite width to lay out.
    pub fn is_wrap_like(&self) -> bool {
        (self.is_text() && self.text_multi_line) || self.role.contains(Role::ListWrap)
    }

    /// Short label for logs and errors.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("#{id}"),
            None => format!("<generated {}>", self.index),
        }
    }
}

// ─── Tree ────────────────────────────────────────────────────────────────

/// Edge payload: flow child or attach node, with its position among siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    Child(u32),
    Attach(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Child,
    Attach,
}

impl Link {
    const fn kind(self) -> LinkKind {
        match self {
            Link::Child(_) => LinkKind::Child,
            Link::Attach(_) => LinkKind::Attach,
        }
    }

    const fn rank(self) -> u32 {
        match self {
            Link::Child(r) | Link::Attach(r) => r,
        }
    }

    const fn with(kind: LinkKind, rank: u32) -> Self {
        match kind {
            LinkKind::Child => Link::Child(rank),
            LinkKind::Attach => Link::Attach(rank),
        }
    }
}

/// The layout tree. Each node has at most one owner; every structural
/// operation detaches a node from its previous owner before linking it.
#[derive(Debug, Clone)]
pub struct VTree {
    pub graph: StableDiGraph<VNode, Link>,
    pub root: NodeIndex,
}

impl VTree {
    pub fn new(root: VNode) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(root);
        Self { graph, root }
    }

    /// Insert a node with no owner yet.
    pub fn insert(&mut self, node: VNode) -> NodeIndex {
        self.graph.add_node(node)
    }

    /// Insert `node` as the last flow child of `parent`.
    pub fn add_child(&mut self, parent: NodeIndex, node: VNode) -> NodeIndex {
        let idx = self.insert(node);
        self.push(parent, idx, LinkKind::Child);
        idx
    }

    /// Insert `node` as the last attach node of `owner`.
    pub fn add_attach(&mut self, owner: NodeIndex, node: VNode) -> NodeIndex {
        let idx = self.insert(node);
        self.push(owner, idx, LinkKind::Attach);
        idx
    }

    /// Move an existing node to the end of `parent`'s flow children.
    pub fn push_child(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.push(parent, child, LinkKind::Child);
    }

    /// Move an existing node to the end of `owner`'s attach nodes.
    pub fn push_attach(&mut self, owner: NodeIndex, node: NodeIndex) {
        self.push(owner, node, LinkKind::Attach);
    }

    fn push(&mut self, owner: NodeIndex, member: NodeIndex, kind: LinkKind) {
        self.detach(member);
        let rank = self
            .graph
            .edges_directed(owner, EdgeDirection::Outgoing)
            .filter(|e| e.weight().kind() == kind)
            .map(|e| e.weight().rank() + 1)
            .max()
            .unwrap_or(0);
        self.graph.add_edge(owner, member, Link::with(kind, rank));
    }

    /// Flow children in order.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.members(idx, LinkKind::Child)
    }

    /// Attach nodes in order.
    pub fn attach_nodes(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.members(idx, LinkKind::Attach)
    }

    fn members(&self, idx: NodeIndex, kind: LinkKind) -> Vec<NodeIndex> {
        let mut members: Vec<(u32, NodeIndex)> = self
            .graph
            .edges_directed(idx, EdgeDirection::Outgoing)
            .filter(|e| e.weight().kind() == kind)
            .map(|e| (e.weight().rank(), e.target()))
            .collect();
        members.sort_unstable_by_key(|(rank, _)| *rank);
        members.into_iter().map(|(_, n)| n).collect()
    }

    /// Owner of a node and how it is linked.
    pub fn owner(&self, idx: NodeIndex) -> Option<(NodeIndex, LinkKind)> {
        self.graph
            .edges_directed(idx, EdgeDirection::Incoming)
            .next()
            .map(|e| (e.source(), e.weight().kind()))
    }

    /// Flow parent (`None` for the root and for attach nodes).
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        match self.owner(idx) {
            Some((owner, LinkKind::Child)) => Some(owner),
            _ => None,
        }
    }

    /// Unlink a node from its owner. The node and its subtree stay alive.
    pub fn detach(&mut self, idx: NodeIndex) {
        let incoming: Vec<_> = self
            .graph
            .edges_directed(idx, EdgeDirection::Incoming)
            .map(|e| e.id())
            .collect();
        for edge in incoming {
            self.graph.remove_edge(edge);
        }
    }

    /// Replace `parent`'s flow children with `order`, taking ownership of each.
    pub fn set_children(&mut self, parent: NodeIndex, order: &[NodeIndex]) {
        self.replace_members(parent, order, LinkKind::Child);
    }

    fn replace_members(&mut self, owner: NodeIndex, order: &[NodeIndex], kind: LinkKind) {
        let old: Vec<_> = self
            .graph
            .edges_directed(owner, EdgeDirection::Outgoing)
            .filter(|e| e.weight().kind() == kind)
            .map(|e| e.id())
            .collect();
        for edge in old {
            self.graph.remove_edge(edge);
        }
        for (rank, &member) in order.iter().enumerate() {
            self.detach(member);
            self.graph
                .add_edge(owner, member, Link::with(kind, rank as u32));
        }
    }

    /// Remove a node together with everything it owns.
    pub fn remove_subtree(&mut self, idx: NodeIndex) -> Option<VNode> {
        let mut owned = self.children(idx);
        owned.extend(self.attach_nodes(idx));
        for member in owned {
            self.remove_subtree(member);
        }
        self.graph.remove_node(idx)
    }

    /// Remove a single node; its members must have been moved away first.
    pub fn remove(&mut self, idx: NodeIndex) -> Option<VNode> {
        self.graph.remove_node(idx)
    }

    pub fn is_leaf(&self, idx: NodeIndex) -> bool {
        self.children(idx).is_empty()
    }

    /// Pre-order walk over flow children and attach nodes.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(n) = stack.pop() {
            out.push(n);
            let mut next = self.children(n);
            next.extend(self.attach_nodes(n));
            stack.extend(next.into_iter().rev());
        }
        out
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn get(&self, idx: NodeIndex) -> Option<&VNode> {
        self.graph.node_weight(idx)
    }

    /// Find an original node by design ID.
    pub fn find(&self, id: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&i| self.graph[i].id.as_ref().is_some_and(|d| d.matches(id)))
    }
}

impl Index<NodeIndex> for VTree {
    type Output = VNode;

    fn index(&self, idx: NodeIndex) -> &VNode {
        &self.graph[idx]
    }
}

impl IndexMut<NodeIndex> for VTree {
    fn index_mut(&mut self, idx: NodeIndex) -> &mut VNode {
        &mut self.graph[idx]
    }
}
