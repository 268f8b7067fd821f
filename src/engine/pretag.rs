//! Pre-tag conversion.
//!
//! Some card generators already mark the target span with an inline tag
//! (`<t>会った</t>`). That is more reliable than any pattern, so those tags are
//! turned into bold markers before the cascade gets a chance to run.

use crate::dom::{Element, Node};

/// The bold marker element wrapping highlighted text.
pub(crate) fn bold_marker(class: &str, children: Vec<Node>) -> Element {
    let mut b = Element::new("b");
    if !class.is_empty() {
        b.set_attr("class", class);
    }
    b.children = children;
    b
}

/// Replace every `pretag` element in `scope` (outside ruby annotations) with a
/// bold marker carrying the same children. Returns how many were converted.
pub fn convert_pretags(scope: &mut Element, pretag: &str, marker_class: &str) -> usize {
    if scope.is_ruby_annotation() {
        return 0;
    }
    let mut converted = 0;
    for child in &mut scope.children {
        let Node::Element(el) = child else { continue };
        if el.is_ruby_annotation() {
            continue;
        }
        if el.tag.eq_ignore_ascii_case(pretag) {
            let children = std::mem::take(&mut el.children);
            *el = bold_marker(marker_class, children);
            converted += 1;
        }
        // Pre-tags nested inside a converted one are converted too.
        converted += convert_pretags(el, pretag, marker_class);
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{parse_fragment, to_html};

    #[test]
    fn converts_and_preserves_children() {
        let mut root = parse_fragment("<p>課長に<t>会<i>っ</i>た</t>。</p>").unwrap();
        assert_eq!(convert_pretags(&mut root, "t", "auto-bold"), 1);
        assert_eq!(to_html(&root), r#"<p>課長に<b class="auto-bold">会<i>っ</i>た</b>。</p>"#);
    }

    #[test]
    fn second_run_converts_nothing() {
        let mut root = parse_fragment("<t>a</t><t>b<t>c</t></t>").unwrap();
        assert_eq!(convert_pretags(&mut root, "t", "auto-bold"), 3);
        assert_eq!(convert_pretags(&mut root, "t", "auto-bold"), 0);
    }

    #[test]
    fn leaves_ruby_annotations_alone() {
        let mut root = parse_fragment("<ruby>漢<rt><t>かん</t></rt></ruby>").unwrap();
        let before = root.clone();
        assert_eq!(convert_pretags(&mut root, "t", "auto-bold"), 0);
        assert_eq!(root, before);
    }

    #[test]
    fn pretag_name_is_case_insensitive() {
        let mut root = parse_fragment("<p><t>会った</t></p>").unwrap();
        assert_eq!(convert_pretags(&mut root, "T", "auto-bold"), 1);
        assert_eq!(to_html(&root), r#"<p><b class="auto-bold">会った</b></p>"#);
    }

    #[test]
    fn empty_class_means_plain_bold() {
        let mut root = parse_fragment("<t>x</t>").unwrap();
        convert_pretags(&mut root, "t", "");
        assert_eq!(to_html(&root), "<b>x</b>");
    }
}
