//! Read-only traversal of a parsed document
//!
//! [`Document::visit`] walks the tree depth-first. A block tag's body is
//! visited before the block's own callback fires, so analyses see the
//! innermost tags first. Documents have no callback of their own.

use crate::parser::ast::{BlockTag, Document, Node, Tag, Text};

/// Callbacks invoked for each node kind during a traversal
pub trait Visitor {
    fn visit_text(&mut self, _text: &Text) {}

    fn visit_tag(&mut self, _tag: &Tag) {}

    fn visit_block_tag(&mut self, _block: &BlockTag) {}
}

impl Document {
    /// Visit every node of the document in depth-first order
    pub fn visit<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        for node in &self.nodes {
            node.visit(visitor);
        }
    }
}

impl Node {
    pub fn visit<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        // Block callbacks are queued behind their bodies
        enum Step<'n> {
            Enter(&'n Node),
            Leave(&'n BlockTag),
        }

        let mut stack = vec![Step::Enter(self)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(Node::Text(text)) => visitor.visit_text(text),
                Step::Enter(Node::Tag(tag)) => visitor.visit_tag(tag),
                Step::Enter(Node::Block(block)) => {
                    stack.push(Step::Leave(block));
                    stack.extend(block.body.nodes.iter().rev().map(Step::Enter));
                }
                Step::Leave(block) => visitor.visit_block_tag(block),
            }
        }
    }
}

/// Fans a single traversal out to any number of visitors, invoking them in
/// the order they were added
#[derive(Default)]
pub struct CompositeVisitor<'v> {
    visitors: Vec<&'v mut dyn Visitor>,
}

impl<'v> CompositeVisitor<'v> {
    pub fn new(visitors: Vec<&'v mut dyn Visitor>) -> Self {
        Self { visitors }
    }

    pub fn push(&mut self, visitor: &'v mut dyn Visitor) {
        self.visitors.push(visitor);
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }
}

impl Visitor for CompositeVisitor<'_> {
    fn visit_text(&mut self, text: &Text) {
        for visitor in self.visitors.iter_mut() {
            visitor.visit_text(text);
        }
    }

    fn visit_tag(&mut self, tag: &Tag) {
        for visitor in self.visitors.iter_mut() {
            visitor.visit_tag(tag);
        }
    }

    fn visit_block_tag(&mut self, block: &BlockTag) {
        for visitor in self.visitors.iter_mut() {
            visitor.visit_block_tag(block);
        }
    }
}

/// Records tag and block names in traversal order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCollector {
    pub tags: Vec<String>,
    pub blocks: Vec<String>,
}

impl TagCollector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Visitor for TagCollector {
    fn visit_tag(&mut self, tag: &Tag) {
        self.tags.push(tag.name.clone());
    }

    fn visit_block_tag(&mut self, block: &BlockTag) {
        self.blocks.push(block.name.clone());
    }
}

/// Extracts the values of one attribute from every tag that carries it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeCollector {
    key: String,
    pub values: Vec<String>,
}

impl AttributeCollector {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Visitor for AttributeCollector {
    fn visit_tag(&mut self, tag: &Tag) {
        if let Some(value) = tag.attribute(&self.key) {
            self.values.push(value.to_string());
        }
    }
}
