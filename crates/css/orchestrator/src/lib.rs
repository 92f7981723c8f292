//! Core module of the CSS engine, containing the cascade orchestration.
//!
//! Flattens the stylesheets that reach a document, matches their selectors
//! against the document tree and resolves one winning value per element and
//! property. Resources are reached through a [`Container`].

pub mod container;
pub mod rules;
pub mod selectors;
mod style;
pub mod types;

pub use container::{Container, MemoryContainer, href_to_name};
pub use rules::{FlatRule, RuleIndexCounter, RuleIter};
pub use selectors::{DocumentAdapter, Select, Selection};
pub use style::ua_stylesheet::{USER_AGENT_CSS, user_agent_stylesheet};
pub use style::{ResolvedStyles, resolve_styles};
pub use types::{CascadeOptions, INAPPROPRIATE_PSEUDO_CLASSES, Parsed, STYLESHEET_MIME_TYPES};
