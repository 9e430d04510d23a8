//! JSON encoding for files written by the storage adapters.
//!
//! Output is stable across writes: keys come out in `BTreeMap` order,
//! indented by two spaces, with a trailing newline.

mod json;

pub use json::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
