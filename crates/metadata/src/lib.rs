//! Field type registry and metadata parsing for shelf libraries.
//!
//! Each book's metadata is a JSON object. [`parse_book`] checks it against a
//! [`Schema`](shelf_schema::Schema) and reduces every field to its canonical
//! [`FieldValue`](models::FieldValue), using the per-kind rules of
//! [`FieldType`].

mod consts;
pub mod error;
pub mod models;
mod parse;
mod registry;
pub mod violation;

pub use crate::parse::{FromFn, TextResolver, from_fn, parse_book};
pub use crate::registry::FieldType;
