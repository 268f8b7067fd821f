//! Lenient HTML fragment reader/writer for the markup tree.
//!
//! This is not an HTML5 parser. It understands what card templates actually
//! contain: nested elements with quoted/unquoted/bare attributes, void
//! elements, comments, doctype-like declarations and character references.
//!
//! Recovery rules for unbalanced markup:
//!
//! - a closing tag closes up to the nearest open element with that name;
//! - a closing tag with no matching open element is dropped;
//! - elements still open at end of input are closed there.
//!
//! Comments and declarations are dropped from the tree.

use crate::dom::{Element, Node};
use thiserror::Error;

/// Tag of the synthetic root returned by [`parse_fragment`].
pub const FRAGMENT_TAG: &str = "#fragment";

const VOID_ELEMENTS: &[&str] =
    &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unterminated tag starting at byte {0}")]
    UnterminatedTag(usize),
    #[error("unterminated comment starting at byte {0}")]
    UnterminatedComment(usize),
    #[error("invalid tag name at byte {0}")]
    InvalidTagName(usize),
}

/// Parse `input` into a synthetic [`FRAGMENT_TAG`] element whose children are
/// the top-level nodes.
pub fn parse_fragment(input: &str) -> Result<Element, MarkupError> {
    let mut stack: Vec<Element> = vec![Element::new(FRAGMENT_TAG)];
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        let Some(lt) = rest.find('<') else {
            push_text(&mut stack, rest);
            break;
        };
        if lt > 0 {
            push_text(&mut stack, &rest[..lt]);
        }
        let start = pos + lt;
        let tail = &input[start..];

        if tail.starts_with("<!--") {
            let end = tail[4..].find("-->").ok_or(MarkupError::UnterminatedComment(start))?;
            pos = start + 4 + end + 3;
            continue;
        }
        if tail.starts_with("<!") || tail.starts_with("<?") {
            let end = tail.find('>').ok_or(MarkupError::UnterminatedTag(start))?;
            pos = start + end + 1;
            continue;
        }

        let next = tail[1..].chars().next();
        let is_close = next == Some('/');
        let opens_tag = next.is_some_and(|c| c.is_ascii_alphabetic());
        if !is_close && !opens_tag {
            // A bare '<' in text.
            push_text(&mut stack, "<");
            pos = start + 1;
            continue;
        }

        let end = find_tag_end(tail).ok_or(MarkupError::UnterminatedTag(start))?;
        let inner = &tail[1..end];
        pos = start + end + 1;

        if is_close {
            let name = inner[1..].trim().to_ascii_lowercase();
            if name.is_empty() || !name.chars().all(is_name_char) {
                return Err(MarkupError::InvalidTagName(start));
            }
            close_element(&mut stack, &name);
            continue;
        }

        let (el, self_closing) = parse_open_tag(inner).ok_or(MarkupError::InvalidTagName(start))?;
        if self_closing || VOID_ELEMENTS.contains(&el.tag.as_str()) {
            append_node(&mut stack, Node::Element(el));
        } else {
            stack.push(el);
        }
    }

    while stack.len() > 1 {
        let el = stack.pop().unwrap_or_else(|| Element::new(FRAGMENT_TAG));
        append_node(&mut stack, Node::Element(el));
    }
    Ok(stack.pop().unwrap_or_else(|| Element::new(FRAGMENT_TAG)))
}

/// Serialize an element. A [`FRAGMENT_TAG`] root serializes as its children only.
pub fn to_html(el: &Element) -> String {
    let mut out = String::new();
    if el.tag == FRAGMENT_TAG {
        write_children(el, &mut out);
    } else {
        write_element(el, &mut out);
    }
    out
}

fn write_children(el: &Element, out: &mut String) {
    for child in &el.children {
        write_node(child, out);
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => escape_into(t, false, out),
        Node::Element(e) => write_element(e, out),
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        escape_into(value, true, out);
        out.push('"');
    }
    out.push('>');
    if VOID_ELEMENTS.contains(&el.tag.as_str()) && el.children.is_empty() {
        return;
    }
    write_children(el, out);
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn escape_into(s: &str, attr: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Decode named and numeric character references. Unknown ones are kept verbatim.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    regex!(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z]{2,8});")
        .replace_all(s, |caps: &regex::Captures| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{A0}'),
                    _ => None,
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'
}

/// Byte index of the `>` closing the tag that starts at `tail[0]`, honouring quotes.
fn find_tag_end(tail: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in tail.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            None => {}
        }
    }
    None
}

/// Parse `name attr="v" attr2=v bare /` (the text between `<` and `>`).
fn parse_open_tag(inner: &str) -> Option<(Element, bool)> {
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (inner, false),
    };
    let name_end = inner.find(|c: char| !is_name_char(c)).unwrap_or(inner.len());
    let name = &inner[..name_end];
    if name.is_empty() {
        return None;
    }
    let mut el = Element::new(name);

    let attrs = regex!(r#"([^\s"'=<>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#);
    for caps in attrs.captures_iter(&inner[name_end..]) {
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4)).map(|m| m.as_str()).unwrap_or("");
        // First occurrence wins, as in browsers.
        if el.attr(&caps[1].to_ascii_lowercase()).is_none() {
            el.set_attr(&caps[1], decode_entities(value));
        }
    }
    Some((el, self_closing))
}

fn push_text(stack: &mut [Element], raw: &str) {
    let text = decode_entities(raw);
    if text.is_empty() {
        return;
    }
    let Some(top) = stack.last_mut() else { return };
    match top.children.last_mut() {
        Some(Node::Text(prev)) => prev.push_str(&text),
        _ => top.children.push(Node::Text(text)),
    }
}

fn append_node(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

fn close_element(stack: &mut Vec<Element>, name: &str) {
    // Never close the synthetic root.
    let Some(depth) = stack.iter().skip(1).rposition(|el| el.tag == name) else {
        return;
    };
    let target = depth + 1;
    while stack.len() > target {
        let Some(el) = stack.pop() else { break };
        append_node(stack, Node::Element(el));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ruby_sentence() {
        let root = parse_fragment(
            r#"<div class="full-sentence"><ruby>課長<rt>かちょう</rt></ruby>に<t>会った</t>。</div>"#,
        )
        .unwrap();
        assert_eq!(root.tag, FRAGMENT_TAG);
        let div = root.at_path(&[0]).unwrap();
        assert!(div.has_class("full-sentence"));
        assert_eq!(div.visible_text(), "課長に会った。");
        assert_eq!(div.at_path(&[0, 1]).map(|e| e.tag.as_str()), Some("rt"));
        assert_eq!(div.at_path(&[2]).map(|e| e.tag.as_str()), Some("t"));
    }

    #[test]
    fn serializes_back() {
        let src = r#"<div id="qa"><span class="a b">x &amp; y</span><br>z</div>"#;
        let root = parse_fragment(src).unwrap();
        assert_eq!(to_html(&root), src);
    }

    #[test]
    fn attribute_forms() {
        let root = parse_fragment(r#"<p data-x=1 hidden title='a "q"' class="c">t</p>"#).unwrap();
        let p = root.at_path(&[0]).unwrap();
        assert_eq!(p.attr("data-x"), Some("1"));
        assert_eq!(p.attr("hidden"), Some(""));
        assert_eq!(p.attr("title"), Some("a \"q\""));
        assert_eq!(p.attr("class"), Some("c"));
    }

    #[test]
    fn recovers_unbalanced_markup() {
        let root = parse_fragment("<div><b>強調</div></span>後<i>open").unwrap();
        assert_eq!(to_html(&root), "<div><b>強調</b></div>後<i>open</i>");
    }

    #[test]
    fn drops_comments_and_decodes_entities() {
        let root = parse_fragment("<!doctype html><!-- note -->a&lt;b&#x3042;&#12354;&bogus;").unwrap();
        assert_eq!(root.children, vec![Node::text("a<bああ&bogus;")]);
    }

    #[test]
    fn bare_less_than_is_text() {
        let root = parse_fragment("1 < 2").unwrap();
        assert_eq!(root.children, vec![Node::text("1 < 2")]);
    }

    #[test]
    fn reports_unterminated_markup() {
        assert_eq!(parse_fragment("ok<div class=\"x"), Err(MarkupError::UnterminatedTag(2)));
        assert_eq!(parse_fragment("<!-- never"), Err(MarkupError::UnterminatedComment(0)));
        assert_eq!(parse_fragment("</ >"), Err(MarkupError::InvalidTagName(0)));
    }

    #[test]
    fn self_closing_and_void_elements() {
        let root = parse_fragment("<span/>a<img src=x>b").unwrap();
        assert_eq!(to_html(&root), "<span></span>a<img src=\"x\">b");
    }
}
