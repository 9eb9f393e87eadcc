// CIT data model - element trees, scope references, per-element caches

pub mod cache;
pub mod element;
pub mod scoperef;

// Re-export main types for easy access
pub use cache::{ChildKind, ElementCache, ShortNameIndex, make_short_name_index};
pub use element::{Attribute, Element, Ilk, Tag};
pub use scoperef::{Hit, ScopeRef};
