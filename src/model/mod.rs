//! # Value Model
//!
//! Runtime data handed to the engine by a data source.
//! Every object carries an explicit shape tag set at construction time;
//! the union resolver matches on that tag, never on anything else.
//!
//! Design rule: this module is pure data: no schema, no I/O, no state.

pub mod object;
pub mod value;

pub use object::{FieldMap, Object};
pub use value::Value;
