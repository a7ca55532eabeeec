//! Configuration section definitions.
//!
//! Each module corresponds to a section in `linkicon.toml`:
//!
//! | Module     | TOML Section   | Purpose                               |
//! |------------|----------------|---------------------------------------|
//! | `serve`    | `[serve]`      | HTTP service bind address             |
//! | `resolver` | `[resolver]`   | Strategy timeouts, aggregator, cache  |
//! | `probe`    | `[probe]`      | Reachability probing                  |
//! | `store`    | `[store]`      | JSON link store location              |

mod probe;
mod resolver;
mod serve;
mod store;

pub use probe::ProbeConfig;
pub use resolver::{HOST_PLACEHOLDER, ResolverConfig};
pub use serve::ServeConfig;
pub use store::StoreConfig;
