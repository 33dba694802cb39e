//! Recursive, dispatch-table driven walk over a markup tree.
//!
//! One algorithm serves every dialect. A [`DispatchTable`] maps qualified tag
//! names to a [`Dispatch`] rule:
//!
//! - [`Dispatch::Handle`] runs a handler, which may re-enter the walker on
//!   sub-trees and merge the nested items
//! - [`Dispatch::Ignore`] drops the element and its whole sub-tree
//! - [`Dispatch::Transparent`] recurses into the children with the same table,
//!   which is also what happens for tags the table does not name
//!
//! Text nodes become trimmed [`ContentKind::Text`] items. The walker keeps the
//! stack of open ancestor tags so handlers can ask "am I inside X" without
//! climbing parent links.

use crate::error::{AnyExtractError, Result};
use crate::extraction::markup::{Element, MarkupNode};
use crate::types::ContentItem;
use std::collections::HashMap;

/// Handler for one tag. Receives the element and the walker positioned at it
/// (the element itself is not yet on the ancestor stack).
pub type TagHandler<C> = for<'a> fn(&'a Element, &mut Walker<'a, C>) -> Result<Vec<ContentItem>>;

pub enum Dispatch<C> {
    Transparent,
    Ignore,
    Handle(TagHandler<C>),
}

// Manual impls: `C` is only a marker for the handler signature and needs no bounds.
impl<C> Clone for Dispatch<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Dispatch<C> {}

impl<C> std::fmt::Debug for Dispatch<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dispatch::Transparent => f.write_str("Transparent"),
            Dispatch::Ignore => f.write_str("Ignore"),
            Dispatch::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

/// Tag name to rule mapping for one markup dialect.
pub struct DispatchTable<C> {
    rules: HashMap<&'static str, Dispatch<C>>,
    emit_text: bool,
}

impl<C> Default for DispatchTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DispatchTable<C> {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            emit_text: true,
        }
    }

    pub fn handle(mut self, tag: &'static str, handler: TagHandler<C>) -> Self {
        self.rules.insert(tag, Dispatch::Handle(handler));
        self
    }

    pub fn ignore(mut self, tag: &'static str) -> Self {
        self.rules.insert(tag, Dispatch::Ignore);
        self
    }

    pub fn transparent(mut self, tag: &'static str) -> Self {
        self.rules.insert(tag, Dispatch::Transparent);
        self
    }

    /// Drop text nodes that no handler claims instead of emitting them.
    pub fn without_loose_text(mut self) -> Self {
        self.emit_text = false;
        self
    }

    /// Rule for `tag`; unnamed tags are transparent.
    pub fn rule(&self, tag: &str) -> Dispatch<C> {
        self.rules.get(tag).copied().unwrap_or(Dispatch::Transparent)
    }
}

/// Walk state: dispatch table, ignore set, ancestor stack and dialect context.
pub struct Walker<'a, C> {
    table: &'a DispatchTable<C>,
    ignored: Vec<&'a str>,
    ancestors: Vec<&'a str>,
    max_depth: usize,
    context: C,
}

impl<'a, C> Walker<'a, C> {
    pub fn new(table: &'a DispatchTable<C>, context: C, max_depth: usize) -> Self {
        Self {
            table,
            ignored: Vec::new(),
            ancestors: Vec::new(),
            max_depth,
            context,
        }
    }

    /// Add tags that are skipped without recursing, for the whole walk.
    pub fn with_ignored(mut self, tags: &[&'a str]) -> Self {
        self.ignored.extend_from_slice(tags);
        self
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    /// Tags of the open ancestors, outermost first.
    pub fn ancestors(&self) -> &[&'a str] {
        &self.ancestors
    }

    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestors.iter().any(|ancestor| *ancestor == tag)
    }

    pub fn has_any_ancestor(&self, tags: &[&str]) -> bool {
        self.ancestors.iter().any(|ancestor| tags.contains(ancestor))
    }

    /// Walk `root` itself, then its sub-tree.
    pub fn walk(&mut self, root: &'a Element) -> Result<Vec<ContentItem>> {
        self.walk_element(root)
    }

    /// Visit one node according to the dispatch table.
    pub fn walk_node(&mut self, node: &'a MarkupNode) -> Result<Vec<ContentItem>> {
        match node {
            MarkupNode::Text(text) => {
                if self.table.emit_text {
                    Ok(vec![ContentItem::text(text.trim())])
                } else {
                    Ok(Vec::new())
                }
            }
            MarkupNode::Element(element) => self.walk_element(element),
        }
    }

    fn walk_element(&mut self, element: &'a Element) -> Result<Vec<ContentItem>> {
        if self.ignored.contains(&element.name.as_str()) {
            return Ok(Vec::new());
        }

        match self.table.rule(&element.name) {
            Dispatch::Ignore => Ok(Vec::new()),
            Dispatch::Handle(handler) => handler(element, self),
            Dispatch::Transparent => self.walk_children(element),
        }
    }

    /// Visit the children of `element` in document order, with `element` on
    /// the ancestor stack.
    pub fn walk_children(&mut self, element: &'a Element) -> Result<Vec<ContentItem>> {
        if self.ancestors.len() >= self.max_depth {
            return Err(AnyExtractError::malformed_document(format!(
                "Markup nesting exceeds {} levels inside <{}>",
                self.max_depth, element.name
            )));
        }

        self.ancestors.push(element.name.as_str());
        let mut items = Vec::new();
        let mut outcome = Ok(());
        for child in &element.children {
            match self.walk_node(child) {
                Ok(mut nested) => items.append(&mut nested),
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }
        self.ancestors.pop();

        outcome.map(|_| items)
    }

    /// Like [`walk_children`](Self::walk_children), additionally skipping
    /// `tags` inside this sub-tree only.
    pub fn walk_children_ignoring(&mut self, element: &'a Element, tags: &[&'a str]) -> Result<Vec<ContentItem>> {
        let restore = self.ignored.len();
        self.ignored.extend_from_slice(tags);
        let result = self.walk_children(element);
        self.ignored.truncate(restore);
        result
    }
}
