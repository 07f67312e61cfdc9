//! Ordered, arena-backed element tree.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeId`]. Nodes
//! are never removed, so an id stays valid for the lifetime of its document.

/// Handle to a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Payload of a single node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Element with its tag and attributes in source order
    Element {
        /// Tag name
        tag: String,
        /// Attribute key/value pairs, unescaped
        attributes: Vec<(String, String)>,
    },
    /// Character data, unescaped
    Text(String),
    /// Comment body, verbatim
    Comment(String),
}

/// Arena slot
#[derive(Debug, Clone)]
struct Node {
    /// What the node holds
    data: NodeData,
    /// Owning element (`None` only for the root)
    parent: Option<NodeId>,
    /// Children in document order
    children: Vec<NodeId>,
}

/// Hierarchical document with a single root element
#[derive(Debug, Clone)]
pub struct Document {
    /// All nodes ever created
    nodes: Vec<Node>,
}

impl Document {
    /// Create a document holding only an empty root element
    #[must_use]
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Element {
                    tag: root_tag.to_string(),
                    attributes: Vec::new(),
                },
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root element
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, including text and comments
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A document always has its root, so it is never empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Payload of `id`
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Tag of `id` if it is an element
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attributes of `id`, empty for non-elements
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id.0].data {
            NodeData::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Parent of `id`
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children of `id` in document order
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children of `id` carrying `tag`
    pub fn child_elements<'a>(
        &'a self,
        id: NodeId,
        tag: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.tag(child) == Some(tag))
    }

    /// Concatenated text of the direct text children of `id`
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|&child| match &self.nodes[child.0].data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All nodes below `id` in document (pre-)order, `id` excluded
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Append a new element as the last child of `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        self.push(
            parent,
            NodeData::Element {
                tag: tag.to_string(),
                attributes: Vec::new(),
            },
        )
    }

    /// Append a text node as the last child of `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeData::Text(text.to_string()))
    }

    /// Append a comment as the last child of `parent`
    pub fn append_comment(&mut self, parent: NodeId, body: &str) -> NodeId {
        self.push(parent, NodeData::Comment(body.to_string()))
    }

    /// Set (or replace) an attribute on an element; ignored for other nodes
    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[id.0].data {
            if let Some(slot) = attributes.iter_mut().find(|(k, _)| k == key) {
                slot.1 = value.to_string();
            } else {
                attributes.push((key.to_string(), value.to_string()));
            }
        }
    }

    /// Slash-separated tag path from the root to `id`, for diagnostics
    #[must_use]
    pub fn location(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            parts.push(self.tag(node).unwrap_or("#text").to_string());
            current = self.parent(node);
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    /// Link a new node under `parent`
    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

/// Pre-order iterator returned by [`Document::descendants`]
pub struct Descendants<'a> {
    /// Tree being walked
    doc: &'a Document,
    /// Pending nodes, next one on top
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
