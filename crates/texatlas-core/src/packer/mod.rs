//! Free-space packing for a single fixed-size bin.

pub mod maxrects;

pub use maxrects::MaxRectsBinPack;
