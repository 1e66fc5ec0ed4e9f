//! Statement construction scopes.
//!
//! Every statement under construction owns a [`CriteriaContext`] holding its
//! table aliases and CTE names. The contexts of nested statements form a
//! chain through their outer links, and a [`ContextStack`] records which
//! statements are currently open so that an error raised deep inside a
//! nested builder unwinds exactly the statements it aborted.

mod criteria;
mod stack;

pub use criteria::{CriteriaContext, SourceRef};
pub use stack::ContextStack;
