//! Core library for incremental texture-atlas packing.
//!
//! - Algorithm: MaxRects free-list packing (BSSF/BLSF/BAF/BL/CP heuristics)
//! - Pages: `AtlasPage` pairs a packer with placed-element metadata and can
//!   rebuild its free-space state from a persisted record
//! - Pipeline: `pack_textures` classifies images (opaque vs. alpha-blended),
//!   reconciles against previously saved pages, and writes only dirty pages
//!
//! Quick example:
//! ```ignore
//! use image::RgbaImage;
//! use texatlas_core::{pack_textures, AtlasConfig, MemoryPageStore, SourceTexture};
//! # fn main() -> texatlas_core::Result<()> {
//! let inputs = vec![
//!     SourceTexture::new("grass", RgbaImage::new(64, 64)),
//!     SourceTexture::new("stone", RgbaImage::new(128, 32)),
//! ];
//! let cfg = AtlasConfig::builder().with_page_dimensions(512, 512).build();
//! let mut store = MemoryPageStore::new();
//! let report = pack_textures(&inputs, "terrain", &cfg, &mut store, false)?;
//! println!("{}", report.summary());
//! # Ok(()) }
//! ```

pub mod atlas;
pub mod compositing;
pub mod config;
pub mod error;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod store;

pub use atlas::*;
pub use config::*;
pub use error::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;
pub use store::*;

/// Convenience prelude for common types and functions.
pub mod prelude {
    pub use crate::atlas::AtlasPage;
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder, FreeRectHeuristic};
    pub use crate::model::{
        AtlasElement, ClassReport, PackReport, PageRecord, Rect, TextureClass, Vec2u,
    };
    pub use crate::packer::MaxRectsBinPack;
    pub use crate::pipeline::{pack_textures, SourceTexture};
    pub use crate::store::{FsPageStore, MemoryPageStore, PageStore};
}
