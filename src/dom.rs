//! A minimal owned markup tree.
//!
//! The engine works on a deliberately small model: elements with a tag,
//! ordered attributes and children, and text leaves. Hosts build it directly
//! or via [`crate::markup::parse_fragment`].
//!
//! Descendant elements are addressed with a [`NodePath`]: the child indices
//! walked from the root, counting every child node (text and element).
//!
//! ```text
//! <div>                 path []
//!   "音楽を"            (text, index 0)
//!   <ruby>              path [1]
//!     "聞"              (text)
//!     <rt>              path [1, 1]
//! ```

/// Tag of ruby reading annotations. Never scanned or mutated.
pub const RUBY_ANNOTATION_TAG: &str = "rt";

/// Child-index path from a root element to one of its descendant elements.
pub type NodePath = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element { tag: tag.into().to_ascii_lowercase(), attrs: Vec::new(), children: Vec::new() }
    }

    /// Builder: set (or replace) an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a child node.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: append a text child.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class").is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn is_ruby_annotation(&self) -> bool {
        self.tag == RUBY_ANNOTATION_TAG
    }

    /// Concatenated text of the subtree, skipping ruby annotations.
    ///
    /// For `<ruby>課長<rt>かちょう</rt></ruby>に` this is `課長に`.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    pub fn at_path(&self, path: &[usize]) -> Option<&Element> {
        let mut cur = self;
        for &idx in path {
            cur = match cur.children.get(idx)? {
                Node::Element(el) => el,
                Node::Text(_) => return None,
            };
        }
        Some(cur)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut cur = self;
        for &idx in path {
            cur = match cur.children.get_mut(idx)? {
                Node::Element(el) => el,
                Node::Text(_) => return None,
            };
        }
        Some(cur)
    }

    /// Paths of every descendant element (not `self`) in document order.
    ///
    /// Ruby annotations and everything under them are left out: nothing in
    /// an `rt` may become a scope.
    pub fn descendant_paths(&self) -> Vec<NodePath> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        collect_paths(self, &mut prefix, &mut out);
        out
    }

    /// True if any element in the subtree (including `self`) satisfies `pred`.
    pub fn any_element(&self, pred: &impl Fn(&Element) -> bool) -> bool {
        pred(self) || self.children.iter().any(|c| matches!(c, Node::Element(el) if el.any_element(pred)))
    }

    /// Like [`Element::any_element`], but never looks inside ruby annotations.
    pub fn any_visible_element(&self, pred: &impl Fn(&Element) -> bool) -> bool {
        !self.is_ruby_annotation()
            && (pred(self)
                || self.children.iter().any(|c| matches!(c, Node::Element(el) if el.any_visible_element(pred))))
    }

    /// Count elements outside ruby annotations (including `self`) that satisfy `pred`.
    pub fn count_visible_elements(&self, pred: &impl Fn(&Element) -> bool) -> usize {
        if self.is_ruby_annotation() {
            return 0;
        }
        let own = usize::from(pred(self));
        own + self
            .children
            .iter()
            .map(|c| match c {
                Node::Element(el) => el.count_visible_elements(pred),
                Node::Text(_) => 0,
            })
            .sum::<usize>()
    }

    /// Count elements in the subtree (including `self`) that satisfy `pred`.
    pub fn count_elements(&self, pred: &impl Fn(&Element) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + self
            .children
            .iter()
            .map(|c| match c {
                Node::Element(el) => el.count_elements(pred),
                Node::Text(_) => 0,
            })
            .sum::<usize>()
    }
}

fn collect_text(el: &Element, out: &mut String) {
    if el.is_ruby_annotation() {
        return;
    }
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

fn collect_paths(el: &Element, prefix: &mut NodePath, out: &mut Vec<NodePath>) {
    for (idx, child) in el.children.iter().enumerate() {
        if let Node::Element(e) = child {
            if e.is_ruby_annotation() {
                continue;
            }
            prefix.push(idx);
            out.push(prefix.clone());
            collect_paths(e, prefix, out);
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("div").with_attr("class", "full-sentence  jp").with_text("音楽を").with_child(
            Element::new("ruby").with_text("聞").with_child(Element::new("rt").with_text("き")),
        )
    }

    #[test]
    fn visible_text_skips_ruby_annotations() {
        assert_eq!(sample().visible_text(), "音楽を聞");
    }

    #[test]
    fn paths_follow_document_order() {
        let root = Element::new("body").with_child(sample());
        assert_eq!(root.descendant_paths(), vec![vec![0], vec![0, 1]]);
        assert_eq!(root.at_path(&[0, 1, 1]).map(|e| e.tag.as_str()), Some("rt"));
        assert!(root.at_path(&[0, 0]).is_none());
        assert!(root.at_path(&[7]).is_none());
    }

    #[test]
    fn class_and_attr_helpers() {
        let mut el = sample();
        assert!(el.has_class("full-sentence"));
        assert!(el.has_class("jp"));
        assert!(!el.has_class("full"));
        el.set_attr("ID", "main");
        assert_eq!(el.id(), Some("main"));
        el.set_attr("id", "other");
        assert_eq!(el.attrs.iter().filter(|(k, _)| k == "id").count(), 1);
    }

    #[test]
    fn counts_elements() {
        let root = sample();
        assert_eq!(root.count_elements(&|e| e.tag == "rt"), 1);
        assert!(root.any_element(&|e| e.tag == "ruby"));
        assert!(!root.any_element(&|e| e.tag == "b"));
    }

    #[test]
    fn visible_predicates_skip_ruby_annotations() {
        let root = Element::new("p")
            .with_child(Element::new("ruby").with_text("課長").with_child(Element::new("rt").with_child(Element::new("b"))))
            .with_child(Element::new("b"));
        assert_eq!(root.count_elements(&|e| e.tag == "b"), 2);
        assert_eq!(root.count_visible_elements(&|e| e.tag == "b"), 1);

        let only_in_rt = Element::new("ruby").with_child(Element::new("rt").with_child(Element::new("b")));
        assert!(only_in_rt.any_element(&|e| e.tag == "b"));
        assert!(!only_in_rt.any_visible_element(&|e| e.tag == "b"));
    }

    #[test]
    fn descendant_paths_stop_at_ruby_annotations() {
        let root = Element::new("div").with_child(
            Element::new("ruby")
                .with_text("課長")
                .with_child(Element::new("rt").with_child(Element::new("span").with_attr("class", "sentence"))),
        );
        assert_eq!(root.descendant_paths(), vec![vec![0]]);
    }
}
