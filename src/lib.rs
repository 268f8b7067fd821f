//! Bold the target word of a Japanese example sentence.
//!
//! Given a markup tree, a headword and an optional reading, `autobold` finds
//! the sentence container, locates the headword (including conjugated forms)
//! and wraps it in `<b class="auto-bold">`, leaving furigana (`<rt>`) alone.
//!
//! ```
//! use autobold::{DEFAULT_SENTENCE_SELECTORS, Options, Outcome, highlight, markup};
//!
//! let mut card = markup::parse_fragment(
//!     r#"<div class="sentence"><ruby>課長<rt>かちょう</rt></ruby>に会った。</div>"#,
//! ).unwrap();
//! let out = highlight(&mut card, DEFAULT_SENTENCE_SELECTORS, "会う", Some("あう"), &Options::default());
//! assert_eq!(out.label(), "applied-via-pattern");
//! ```

extern crate self as autobold;

#[macro_use]
mod macros;
mod api;
pub mod dom;
pub mod engine;
pub mod markup;
pub mod script;
pub mod selector;

pub use api::{
    BoldSummary, DEFAULT_SENTENCE_SELECTORS, HighlightDetails, HighlightReport, Options, Outcome, PatternTrace,
    highlight, highlight_verbose, inspect,
};
pub use dom::{Element, Node, NodePath};
pub use engine::{PatternSource, ScopeOrigin};
