//! Library-wide validation and the canonical book collection.
//!
//! [`load`] turns every book's raw metadata into a validated [`Library`]: books
//! are parsed independently, then checked together for title uniqueness,
//! sortdisplay consistency and dir var completeness. Every problem found is
//! reported at once as [`ErrorKind::Invalid`](error::ErrorKind::Invalid).

mod collection;
mod dirvars;
pub mod error;
mod keys;
mod load;
mod validate;

pub use crate::collection::{CrossReferences, Library};
pub use crate::dirvars::{DirVar, DirVars};
pub use crate::keys::{KeyType, Keys};
pub use crate::load::{BookSource, load};
pub use crate::validate::validate;
