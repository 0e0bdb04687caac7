//! Declarative field-type schemas for shelf libraries.
//!
//! A [`Schema`] is an ordered list of [`FieldDeclaration`]s, each with a
//! [`FieldKind`] from a closed set (`date`, `file`, `keyvalue`, `sortdisplay`,
//! `string`, `title`). Schemas are parsed from JSON once per run and are
//! read-only afterwards. When a library spans several roots, each root's
//! schema must [match](Schema::matches) the others; see [`Schema::reconcile`].

pub mod error;
mod format;
pub mod json;
mod kind;
mod schema;

pub use crate::format::DateFormat;
pub use crate::kind::{DateFormats, FieldDeclaration, FieldKind};
pub use crate::schema::{RESERVED_NAMES, Schema};
