//! Nested field lookup for JSON records.
//!
//! A [`FieldPath`] is a dot-separated address (`"address.city"`) into a
//! `serde_json::Value`. Lookups never fail: any missing or non-indexable
//! segment yields the caller's default instead.
//!
//! # Example
//!
//! ```
//! use record_path_rs::{path_or, FieldPath};
//! use serde_json::{json, Value};
//!
//! let record = json!({ "address": { "city": "Portland" } });
//! let missing = Value::Null;
//!
//! let city = FieldPath::parse("address.city");
//! assert_eq!(city.resolve_or(&record, &missing), &json!("Portland"));
//!
//! assert_eq!(path_or(&missing, &["address", "zip"], &record), &Value::Null);
//! ```

mod path;
mod resolve;

pub use path::FieldPath;
pub use resolve::path_or;
