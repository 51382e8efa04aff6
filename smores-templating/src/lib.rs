//! Tag grammar and Liquid integration for smores
//!
//! Authors write compact tags such as `{user.dogs:1.name}`. This crate parses
//! them, rewrites them into Liquid expressions and renders the result against a
//! lenient data tree in which unresolved paths fall back to a default instead of
//! failing.
//!
//! # Features
//!
//! - Tag parsing with 1-based indices stored 0-based
//! - Expansion to `{{path | fallback: '...'}}` with literal or computed fallbacks
//! - Finalization of records and lists through their default-display field, for
//!   tags and for raw `{{ ... }}` outputs alike
//! - Named sub-template substitution

pub mod engine;
pub mod error;
pub mod expand;
pub mod filters;
pub mod subtemplates;
pub mod tag;
pub mod view;

pub use engine::TemplateEngine;
pub use error::{Result, SyntaxError, TemplatingError};
pub use expand::{
    expand, expand_with, finalize_outputs, quote_literal, scan, Expansion, Fallback, Segment,
};
pub use filters::{finalize, FallbackFilterParser};
pub use subtemplates::{json_type, SubTemplates};
pub use tag::{join_steps, parse_partial, parse_path, parse_tag, PathStep, TagPath};
pub use view::{DataNode, Record};
