use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// MaxRects free-rectangle choice heuristics.
///
/// The heuristic is a per-page configuration decision: the packer stores it
/// at construction and every placement on that page uses the same scorer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FreeRectHeuristic {
    /// BSSF: place against the short side of the free rect it fits best.
    BestShortSideFit,
    /// BLSF: place against the long side of the free rect it fits best.
    BestLongSideFit,
    /// BAF: place into the smallest free rect it fits.
    BestAreaFit,
    /// BL: Tetris-style bottom-left placement.
    BottomLeft,
    /// CP: maximize touching-edge length against the bin border and used rects.
    ContactPoint,
}

impl FromStr for FreeRectHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bl" | "bottomleft" => Ok(Self::BottomLeft),
            "cp" | "contactpoint" => Ok(Self::ContactPoint),
            _ => Err(()),
        }
    }
}

/// Packing configuration passed into the orchestrator at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Page width in pixels.
    pub max_width: u32,
    /// Page height in pixels.
    pub max_height: u32,
    /// Allow 90° rotation of placements where beneficial.
    pub allow_flip: bool,
    /// Free-rect choice heuristic, held for the lifetime of each page.
    #[serde(default = "default_heuristic")]
    pub heuristic: FreeRectHeuristic,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            max_width: 1024,
            max_height: 1024,
            allow_flip: false,
            heuristic: default_heuristic(),
        }
    }
}

fn default_heuristic() -> FreeRectHeuristic {
    FreeRectHeuristic::ContactPoint
}

impl AtlasConfig {
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }

    /// Returns an error if the page dimensions cannot hold any placement.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;
        if self.max_width == 0 || self.max_height == 0 {
            return Err(AtlasError::InvalidConfig(format!(
                "page dimensions must be non-zero, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        Ok(())
    }
}

/// Fluent builder for `AtlasConfig`.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn with_page_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn allow_flip(mut self, v: bool) -> Self {
        self.cfg.allow_flip = v;
        self
    }
    pub fn heuristic(mut self, v: FreeRectHeuristic) -> Self {
        self.cfg.heuristic = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}
