//! Grain extraction for saltgen.
//!
//! A minion reports its facts ("grains") as a nested tree of scalars,
//! sequences and mappings. This crate resolves delimited paths against
//! that tree and coerces the value found there into one of two shapes:
//!
//! - an **attribute**: a single scalar. Sequences contribute their first
//!   element, recursively.
//! - a **tag set**: zero or more strings. Sequences are flattened exactly
//!   one level; nested sequences and mappings inside them are dropped.
//!
//! The two policies differ and live in separate
//! functions ([`to_attribute_value`] and [`to_tag_set`]).

pub mod coerce;
pub mod error;
pub mod lookup;
pub mod value;

pub use coerce::{to_attribute_value, to_tag_set, AttributeValue, Scalar};
pub use error::{GrainError, Result};
pub use lookup::{lookup, lookup_or, DEFAULT_DELIMITER};
pub use value::{FactTree, Grain};
