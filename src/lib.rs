//! Parse, merge and serialize struct tag strings.
//!
//! A tag string is a sequence of space separated `key:"value"` pairs, the
//! kind of metadata attached to record fields:
//!
//! ```
//! let tag = structtag::parse(r#"json:"host" env:"SERVER_HOST" default:"localhost""#).unwrap();
//! assert_eq!(tag.get("env"), Some("SERVER_HOST"));
//!
//! let overrides = structtag::Tag::from([("default", "0.0.0.0")]);
//! let merged = structtag::merge([&tag, &overrides]);
//! assert_eq!(
//!     merged.to_string(),
//!     r#"default:"0.0.0.0" env:"SERVER_HOST" json:"host""#
//! );
//! ```

pub mod error;
pub mod parser;
pub mod quote;
pub mod tag;

pub use error::{ErrorKind, ParseError};
pub use parser::parse;
pub use tag::{is_valid_key, merge, Tag};
