// #![include_doc("../README.md", start)]
//! # uri-template-re
//!
//! URI templates with simple `{var}` placeholders: expansion into URIs and
//! regex-based extraction of variable values.
//!
//! ## Overview
//!
//! A template such as `http://example.com/hotels/{hotel}/bookings/{booking}` is
//! parsed once into a list of variable names and a regular expression. The parsed
//! template can then
//!
//! - expand variable values, given by name or by position, into a `Uri`,
//! - test whether a URI matches the template,
//! - extract the variable values from a URI.
//!
//! Placeholders are plain names between braces; a name may contain any character
//! except `/`. There are no operators, defaults or modifiers.
//!
//! ## Install
//!
//! Add the following to Cargo.toml:
//!
//! ```toml
//! [dependencies]
//! uri-template-re = "0.1.0"
//! ```
//!
//! ## Usage
//!
//! ### Expansion
//!
//! ```rust
//! use std::collections::HashMap;
//! use uri_template_re::UriTemplate;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = UriTemplate::new("http://example.com/hotels/{hotel}/bookings/{booking}")?;
//!     let vars = HashMap::from([("hotel", "1"), ("booking", "42")]);
//!
//!     let uri = template.expand(&vars)?;
//!     assert_eq!(uri.to_string(), "http://example.com/hotels/1/bookings/42");
//!
//!     let uri = template.expand(["1", "42"])?;
//!     assert_eq!(uri.path(), Some("/hotels/1/bookings/42"));
//!     Ok(())
//! }
//! ```
//!
//! Values are inserted as they are; the expanded string is then percent-encoded
//! once, component by component (`%` always becomes `%25`).
//!
//! ### Matching and extraction
//!
//! ```rust
//! use uri_template_re::UriTemplate;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = UriTemplate::new("http://example.com/hotels/{hotel}/bookings/{booking}")?;
//!     let uri = "http://example.com/hotels/1/bookings/42";
//!
//!     assert!(template.matches(uri));
//!     let captures = template.captures(uri);
//!     assert_eq!(captures.name("hotel").map(|m| m.value()), Some("1"));
//!     assert_eq!(captures.name("booking").map(|m| m.value()), Some("42"));
//!     Ok(())
//! }
//! ```
//!
//! `matches` requires the whole input to match, while `captures` extracts from the
//! first match found anywhere in the input. A trailing `/` is dropped from the
//! match pattern, so `/hotels/{hotel}/` also matches `/hotels/1`.
//!
//! ## License
//!
//! This project is dual licensed under Apache-2.0/MIT. See the two LICENSE-\* files for details.
//!
//! ## Contribution
//!
//! Unless you explicitly state otherwise, any contribution intentionally submitted for inclusion in the work by you, as defined in the Apache-2.0 license, shall be dual licensed as above, without any additional terms or conditions.
// #![include_doc("../README.md", end)]
