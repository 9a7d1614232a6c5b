use std::collections::HashMap;

use image::RgbaImage;
use tracing::{debug, warn};

use crate::compositing::blit_rgba;
use crate::config::FreeRectHeuristic;
use crate::error::Result;
use crate::model::{AtlasElement, PageRecord, TextureClass, Vec2u};
use crate::packer::MaxRectsBinPack;
use crate::store::PageStore;

/// One packed atlas page: a MaxRects packer plus the ordered list of placed
/// elements and their placement metadata.
///
/// The element list is the persisted truth; the packer's free-space state is
/// transient and rebuilt by [`AtlasPage::layout`] after loading a page from
/// a store.
pub struct AtlasPage {
    name: String,
    width: u32,
    height: u32,
    allow_flip: bool,
    transparent: bool,
    heuristic: FreeRectHeuristic,
    elements: Vec<AtlasElement>,
    packer: MaxRectsBinPack,
    dirty: bool,
}

impl AtlasPage {
    pub fn new(
        name: impl Into<String>,
        width: u32,
        height: u32,
        allow_flip: bool,
        transparent: bool,
        heuristic: FreeRectHeuristic,
    ) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            allow_flip,
            transparent,
            heuristic,
            elements: Vec::new(),
            packer: MaxRectsBinPack::new(width, height, allow_flip, heuristic),
            dirty: false,
        }
    }

    /// Reconstructs a page from its persisted record. The caller must invoke
    /// [`AtlasPage::layout`] afterwards to rebuild free-space bookkeeping.
    pub fn from_record(record: PageRecord, heuristic: FreeRectHeuristic) -> Self {
        Self {
            packer: MaxRectsBinPack::new(record.width, record.height, record.allow_flip, heuristic),
            name: record.name,
            width: record.width,
            height: record.height,
            allow_flip: record.allow_flip,
            transparent: record.transparent,
            heuristic,
            elements: record.elements,
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }
    pub fn class(&self) -> TextureClass {
        if self.transparent {
            TextureClass::Transparent
        } else {
            TextureClass::Opaque
        }
    }
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
    pub fn elements(&self) -> &[AtlasElement] {
        &self.elements
    }
    pub fn occupancy(&self) -> f32 {
        self.packer.occupancy()
    }

    /// Narrow lookup interface for consumers of a finished layout.
    pub fn element(&self, key: &str) -> Option<&AtlasElement> {
        self.elements.iter().find(|e| e.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.element(key).is_some()
    }

    /// Attempts to place an image on this page.
    ///
    /// Returns false when the page is full (normal control flow: the caller
    /// tries the next page or creates one). A duplicate key is reported and
    /// treated as a harmless no-op; the existing placement stands.
    pub fn add_texture(&mut self, key: &str, width: u32, height: u32) -> bool {
        if self.contains(key) {
            warn!(page = %self.name, key, "texture already present in page, keeping existing placement");
            return true;
        }

        let Some(rect) = self.packer.insert(width, height) else {
            return false;
        };

        let flipped = rect.w != width;
        self.elements.push(AtlasElement {
            key: key.to_string(),
            offset: Vec2u::new(rect.x, rect.y),
            size: Vec2u::new(width, height),
            scale: [
                rect.w as f32 / width as f32,
                rect.h as f32 / height as f32,
            ],
            flipped,
        });
        self.dirty = true;
        true
    }

    /// Rebuilds the packer from scratch and replays every recorded element
    /// in reverse insertion order. Elements whose source image no longer
    /// resolves are dropped during the pass; that is expected steady-state
    /// behavior after images disappear from the source set.
    pub fn layout<F: Fn(&str) -> bool>(&mut self, exists: F) -> usize {
        self.packer =
            MaxRectsBinPack::new(self.width, self.height, self.allow_flip, self.heuristic);

        let mut dropped = 0usize;
        let mut i = self.elements.len();
        while i > 0 {
            i -= 1;
            let element = &self.elements[i];
            if exists(&element.key) {
                let placed = element.placed_rect();
                self.packer.layout(placed.x, placed.y, placed.w, placed.h);
            } else {
                debug!(page = %self.name, key = %element.key, "dropping stale element");
                self.elements.remove(i);
                dropped += 1;
            }
        }

        if dropped > 0 {
            self.dirty = true;
        }
        dropped
    }

    /// Removes the element at `index` and returns its footprint to the
    /// packer's free list, so the space is reusable without a full relayout.
    pub fn remove_element_at(&mut self, index: usize) -> bool {
        if index >= self.elements.len() {
            warn!(page = %self.name, index, "invalid element index");
            return false;
        }
        let element = self.elements.remove(index);
        let placed = element.placed_rect();
        self.packer.remove_rect(placed.x, placed.y, placed.w, placed.h);
        self.dirty = true;
        true
    }

    /// Composes the page's pixel buffer: exactly `width x height`, fully
    /// transparent except for each element's pixels copied verbatim at its
    /// offset (rotated 90° clockwise when flipped).
    pub fn compose(&self, images: &HashMap<String, RgbaImage>) -> RgbaImage {
        let mut canvas = RgbaImage::new(self.width, self.height);
        for element in &self.elements {
            match images.get(&element.key) {
                Some(src) => {
                    blit_rgba(src, &mut canvas, element.offset.x, element.offset.y, element.flipped);
                }
                None => {
                    warn!(page = %self.name, key = %element.key, "no pixel data for element, leaving hole");
                }
            }
        }
        canvas
    }

    pub fn to_record(&self) -> PageRecord {
        PageRecord {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            allow_flip: self.allow_flip,
            transparent: self.transparent,
            elements: self.elements.clone(),
        }
    }

    /// Materializes the page if dirty: composes the pixel buffer, saves it
    /// with the metadata record through `store`, clears the dirty flag.
    /// Returns whether a write happened.
    pub fn pack(
        &mut self,
        index: usize,
        images: &HashMap<String, RgbaImage>,
        store: &mut dyn PageStore,
    ) -> Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        let rgba = self.compose(images);
        store.save(self.class(), index, &self.to_record(), &rgba)?;
        self.dirty = false;
        Ok(true)
    }
}
