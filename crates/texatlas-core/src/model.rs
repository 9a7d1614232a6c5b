use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    /// Sentinel for "no placement".
    pub const ZERO: Rect = Rect {
        x: 0,
        y: 0,
        w: 0,
        h: 0,
    };

    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_zero(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }

    /// Exclusive right edge coordinate (`x + w`).
    pub fn right(&self) -> u32 {
        self.x + self.w
    }
    /// Exclusive bottom edge coordinate (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// Returns true if `r` is fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }

    /// Returns true if the two rectangles share interior area (touching
    /// edges do not count).
    pub fn intersects(&self, r: &Rect) -> bool {
        !(self.x >= r.right() || r.x >= self.right() || self.y >= r.bottom() || r.y >= self.bottom())
    }
}

/// Integer pair used for element offsets and sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vec2u {
    pub x: u32,
    pub y: u32,
}

impl Vec2u {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A placed image within a page.
///
/// `offset` is the placement top-left in page coordinates, `size` the source
/// image's pixel dimensions. `scale` is the exact `placed_size / size` ratio
/// per axis; it stays `[1.0, 1.0]` unless the packer rotated the rectangle,
/// in which case `flipped` is set and `scale` carries the swap ratio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasElement {
    /// User-specified key (e.g. filename or asset path). Identity within a page.
    pub key: String,
    pub offset: Vec2u,
    pub size: Vec2u,
    pub scale: [f32; 2],
    #[serde(default)]
    pub flipped: bool,
}

impl AtlasElement {
    /// Footprint actually occupied in the page (post-rotation dimensions).
    pub fn placed_rect(&self) -> Rect {
        let (w, h) = if self.flipped {
            (self.size.y, self.size.x)
        } else {
            (self.size.x, self.size.y)
        };
        Rect::new(self.offset.x, self.offset.y, w, h)
    }
}

/// Class a source texture belongs to. Classes never share a page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TextureClass {
    Opaque,
    Transparent,
}

impl TextureClass {
    /// Deterministic file prefix for page artifacts of this class.
    pub fn prefix(&self) -> &'static str {
        match self {
            TextureClass::Opaque => "op",
            TextureClass::Transparent => "tp",
        }
    }

    /// Store subdirectory name.
    pub fn dir_name(&self) -> &'static str {
        match self {
            TextureClass::Opaque => "opaque",
            TextureClass::Transparent => "transparent",
        }
    }
}

/// Persisted projection of an atlas page. Free-space bookkeeping is never
/// persisted; it is rebuilt from the elements by `AtlasPage::layout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub allow_flip: bool,
    pub transparent: bool,
    pub elements: Vec<AtlasElement>,
}

impl PageRecord {
    /// Checks that every element footprint is non-degenerate and lies inside
    /// the page bounds. Persisted records are untrusted input; replaying an
    /// out-of-bounds footprint would corrupt free-space bookkeeping.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for element in &self.elements {
            let (w, h) = if element.flipped {
                (element.size.y, element.size.x)
            } else {
                (element.size.x, element.size.y)
            };
            if w == 0 || h == 0 {
                return Err(format!("element '{}' has a zero-sized footprint", element.key));
            }
            if element.offset.x as u64 + w as u64 > self.width as u64
                || element.offset.y as u64 + h as u64 > self.height as u64
            {
                return Err(format!(
                    "element '{}' at ({}, {}) with footprint {}x{} exceeds the {}x{} page",
                    element.key, element.offset.x, element.offset.y, w, h, self.width, self.height
                ));
            }
        }
        Ok(())
    }
}

/// Per-class outcome of a packing run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ClassReport {
    /// Pages alive for this class after the run.
    pub pages: usize,
    /// Textures newly placed this run.
    pub placed: usize,
    /// Elements dropped because their source image disappeared.
    pub stale_dropped: usize,
    /// Pages whose output was rewritten (dirty at the end of the run).
    pub pages_written: usize,
}

/// Outcome of a full packing run across classes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PackReport {
    pub opaque: ClassReport,
    pub transparent: ClassReport,
    /// Inputs skipped because they exceed the page dimensions.
    pub skipped_oversized: usize,
}

impl PackReport {
    pub fn class(&self, class: TextureClass) -> &ClassReport {
        match class {
            TextureClass::Opaque => &self.opaque,
            TextureClass::Transparent => &self.transparent,
        }
    }

    pub fn class_mut(&mut self, class: TextureClass) -> &mut ClassReport {
        match class {
            TextureClass::Opaque => &mut self.opaque,
            TextureClass::Transparent => &mut self.transparent,
        }
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "opaque: {} pages ({} placed, {} written), transparent: {} pages ({} placed, {} written), oversized skipped: {}",
            self.opaque.pages,
            self.opaque.placed,
            self.opaque.pages_written,
            self.transparent.pages,
            self.transparent.placed,
            self.transparent.pages_written,
            self.skipped_oversized,
        )
    }
}
