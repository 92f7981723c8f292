//! Cascade resolution for whole documents.
//!
//! Applies the user-agent stylesheet and every author stylesheet that reaches
//! a document according to the cascade rules, and answers effective-value
//! queries on the result.

mod cascade;
pub mod ua_stylesheet;

pub use cascade::{ResolvedStyles, resolve_styles};
