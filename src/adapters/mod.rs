// Adapters layer: concrete implementations of the domain ports.

pub mod hh;
pub mod json_store;

pub use hh::HhFetcher;
pub use json_store::JsonStore;
