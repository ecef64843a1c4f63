//! Historical rate data: provider contract, ECB client, response cache.

pub mod cache;
pub mod ecb;
pub mod provider;

pub use cache::CachedProvider;
pub use ecb::EcbClient;
pub use provider::{RateProvider, identity_series};
