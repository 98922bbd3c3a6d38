//! Definition tree of one entry.

use std::collections::HashMap;

use crate::furigana::escape_html;
use crate::models::{Definition, DefinitionId};

/// Receives definitions in pre-order.
pub trait DefinitionVisitor {
  /// Called once per definition; roots have depth 0.
  fn visit(&mut self, definition: &Definition, depth: usize);
}

/// Parent → children view over a flat list of definitions.
///
/// Children keep the order of the input list. A definition whose parent is not in the
/// list is treated as a root.
#[derive(Debug, Clone)]
pub struct DefinitionTree {
  definitions: Vec<Definition>,
  children: HashMap<Option<DefinitionId>, Vec<usize>>,
  index: HashMap<DefinitionId, usize>,
}

impl DefinitionTree {
  /// Builds the tree.
  pub fn new(definitions: Vec<Definition>) -> Self {
    let index: HashMap<DefinitionId, usize> =
      definitions.iter().enumerate().map(|(idx, d)| (d.id, idx)).collect();

    let mut children: HashMap<Option<DefinitionId>, Vec<usize>> = HashMap::new();
    for (idx, definition) in definitions.iter().enumerate() {
      let parent = definition.parent_id.filter(|id| index.contains_key(id) && *id != definition.id);
      children.entry(parent).or_default().push(idx);
    }

    Self {
      definitions,
      children,
      index,
    }
  }

  /// Number of definitions.
  pub fn len(&self) -> usize {
    self.definitions.len()
  }

  /// Whether the tree is empty.
  pub fn is_empty(&self) -> bool {
    self.definitions.is_empty()
  }

  /// Root definitions in input order.
  pub fn roots(&self) -> impl Iterator<Item = &Definition> {
    self.child_indices(None).iter().map(|&idx| &self.definitions[idx])
  }

  /// Direct children of `id` in input order.
  pub fn children(&self, id: DefinitionId) -> impl Iterator<Item = &Definition> {
    self.child_indices(Some(id)).iter().map(|&idx| &self.definitions[idx])
  }

  fn child_indices(&self, parent: Option<DefinitionId>) -> &[usize] {
    self.children.get(&parent).map(Vec::as_slice).unwrap_or_default()
  }

  /// Pre-order walk without recursion.
  pub fn accept(&self, visitor: &mut dyn DefinitionVisitor) {
    let mut stack: Vec<(usize, usize)> = self.child_indices(None).iter().rev().map(|&idx| (idx, 0)).collect();
    while let Some((idx, depth)) = stack.pop() {
      let definition = &self.definitions[idx];
      visitor.visit(definition, depth);
      stack.extend(self.child_indices(Some(definition.id)).iter().rev().map(|&child| (child, depth + 1)));
    }
  }

  /// Chain from the root down to `id`; empty when `id` is not in the tree.
  pub fn ancestry(&self, id: DefinitionId) -> Vec<&Definition> {
    let mut chain = Vec::new();
    let mut current = self.index.get(&id).copied();
    while let Some(idx) = current {
      let definition = &self.definitions[idx];
      if chain.len() > self.definitions.len() {
        break;
      }
      chain.push(definition);
      current = definition
        .parent_id
        .filter(|parent| *parent != definition.id)
        .and_then(|parent| self.index.get(&parent).copied());
    }
    chain.reverse();
    chain
  }
}

/// Renders a tree as indented HTML lines.
#[derive(Debug, Default)]
pub struct HtmlTreeRenderer {
  lines: Vec<String>,
}

impl HtmlTreeRenderer {
  /// Renders `tree` in one call.
  pub fn render(tree: &DefinitionTree) -> String {
    let mut renderer = Self::default();
    tree.accept(&mut renderer);
    renderer.into_html()
  }

  /// Lines joined with `<br/>`.
  pub fn into_html(self) -> String {
    self.lines.join("<br/>")
  }
}

impl DefinitionVisitor for HtmlTreeRenderer {
  fn visit(&mut self, definition: &Definition, depth: usize) {
    let text = definition
      .text
      .as_deref()
      .map(|t| t.trim().replace(['\r', '\n'], " "))
      .filter(|t| !t.is_empty())
      .unwrap_or_else(|| "(No definition)".to_string());

    let mut line = "&nbsp;".repeat(depth * 4);
    line.push_str(r#"<span class="entry_definition">"#);
    if let Some(number) = definition.number {
      line.push_str(&format!(r#"(<span class="entry_definition_number">{number}</span>) "#));
    }
    line.push_str(&escape_html(&text));
    line.push_str("</span>");
    self.lines.push(line);
  }
}
