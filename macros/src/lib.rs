//! Proc macros for linkicon.
//!
//! # Config derive macro
//!
//! Generates field path accessors and a commented TOML template.
//!
//! ```ignore
//! #[derive(Config)]
//! #[config(section = "resolver")]
//! /// Icon resolution settings.
//! pub struct ResolverConfig {
//!     /// Timeout for each well-known favicon path (ms).
//!     #[config(inline_doc)]
//!     pub favicon_timeout_ms: u64,
//!
//!     /// Aggregator URL template.
//!     #[config(default = "https://www.google.com/s2/favicons?domain={host}&sz=64")]
//!     pub aggregator_url: String,
//!
//!     /// Internal field.
//!     #[config(skip)]
//!     pub internal: String,
//! }
//!
//! // Generates:
//! // - ResolverConfig::FIELDS.favicon_timeout_ms -> FieldPath("resolver.favicon_timeout_ms")
//! // - ResolverConfig::template() -> TOML string with comments
//! // - ResolverConfig::template_with_header() -> with [resolver] header
//! ```
//!
//! # Attributes
//!
//! Struct-level:
//! - `#[config(section = "path")]` - TOML section path
//!
//! Field-level:
//! - `#[config(skip)]` - Skip from FIELDS and template
//! - `#[config(name = "x")]` - Custom TOML field name
//! - `#[config(default = "x")]` - Default value in template
//! - `#[config(inline_doc)]` - Render a single-line doc as trailing comment
//!
//! # Section inference
//!
//! Without `section` attribute, inferred from struct name:
//! - `ProbeConfig` → `probe`
//! - `LinkStoreConfig` → `link_store`

mod config;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derive macro that generates FIELDS and template().
#[proc_macro_derive(Config, attributes(config))]
pub fn derive_config(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    config::derive(&input).into()
}
