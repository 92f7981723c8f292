use indextree::{Arena, NodeId};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element { tag: String },
    Text { text: String },
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
}

impl DomNode {
    #[inline]
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Document | NodeKind::Text { .. } => None,
        }
    }

    #[inline]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A parsed markup document stored as an arena of nodes. Every node keeps
/// its parent's id, so ancestor walks are plain id lookups.
#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena<DomNode>,
    root: NodeId,
}

impl Default for Document {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only the document node.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        Self {
            root: arena.new_node(DomNode::default()),
            arena,
        }
    }

    /// The document node. It is not an element.
    #[inline]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Append a new element named `tag` (stored lowercased) as the last child of `parent`.
    pub fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.append(
            parent,
            DomNode {
                kind: NodeKind::Element {
                    tag: tag.to_ascii_lowercase(),
                },
                attrs: SmallVec::new(),
            },
        )
    }

    /// Append a text node as the last child of `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(
            parent,
            DomNode {
                kind: NodeKind::Text {
                    text: text.to_owned(),
                },
                attrs: SmallVec::new(),
            },
        )
    }

    fn append(&mut self, parent: NodeId, node: DomNode) -> NodeId {
        let child = self.arena.new_node(node);
        parent.append(child, &mut self.arena);
        child
    }

    /// Set an attribute, replacing any previous value. Names are case-insensitive.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(entry) = self.arena.get_mut(node) else {
            return;
        };
        let attrs = &mut entry.get_mut().attrs;
        if let Some(existing) = attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            existing.1 = value.to_owned();
        } else {
            attrs.push((name.to_ascii_lowercase(), value.to_owned()));
        }
    }

    #[inline]
    pub fn node(&self, node: NodeId) -> Option<&DomNode> {
        self.arena.get(node).map(|entry| entry.get())
    }

    /// Lowercased tag name, `None` for text and document nodes.
    #[inline]
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.node(node).and_then(DomNode::tag)
    }

    #[inline]
    pub fn is_element(&self, node: NodeId) -> bool {
        self.tag_name(node).is_some()
    }

    #[inline]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node).and_then(|entry| entry.attr(name))
    }

    /// The parent if it is an element; the document node is not returned.
    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        node.ancestors(&self.arena)
            .nth(1)
            .filter(|parent| self.is_element(*parent))
    }

    /// Every element in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root
            .descendants(&self.arena)
            .filter(|node| self.is_element(*node))
    }

    pub fn previous_sibling_element(&self, node: NodeId) -> Option<NodeId> {
        node.preceding_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    pub fn next_sibling_element(&self, node: NodeId) -> Option<NodeId> {
        node.following_siblings(&self.arena)
            .skip(1)
            .find(|sibling| self.is_element(*sibling))
    }

    /// True when the node has no children at all, text included.
    #[inline]
    pub fn has_no_children(&self, node: NodeId) -> bool {
        node.children(&self.arena).next().is_none()
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, node: NodeId) -> String {
        node.descendants(&self.arena)
            .filter_map(|descendant| match &self.node(descendant)?.kind {
                NodeKind::Text { text } => Some(text.as_str()),
                NodeKind::Document | NodeKind::Element { .. } => None,
            })
            .collect()
    }
}
