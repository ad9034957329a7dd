//! Filter and sort translation.
//!
//! Each node of a [`Filter`](crate::expr::Filter) or [`Sort`](crate::expr::Sort)
//! tree maps to one SQL fragment. Operands are resolved through the
//! context's registry, so paths become qualified columns and literals become
//! named placeholders in the shared accumulator.

mod filter;
mod sort;

pub use filter::{escape_like, translate_filter, LIKE_ESCAPE};
pub use sort::translate_sort;
