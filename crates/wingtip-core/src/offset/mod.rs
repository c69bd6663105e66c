//! Offset resolution: sources, fetching, class layout walking and the
//! resolved map shared with the features.

mod fetch;
#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(feature = "http")]
mod http;
mod layout;
mod resolve;
mod shared;
mod source;

pub use fetch::*;
#[cfg(feature = "http")]
pub use http::*;
pub use layout::*;
pub use resolve::*;
pub use shared::*;
pub use source::*;
