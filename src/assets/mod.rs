// Asset module - symbolic names for screen rectangles, fingerprints and template images

pub mod catalogue;
pub mod error;

#[cfg(test)]
mod tests;

pub use catalogue::{AssetCatalogue, AssetResolver};
pub use error::{AssetError, AssetKind, AssetResult};
