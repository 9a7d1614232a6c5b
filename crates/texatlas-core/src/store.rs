use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::info;

use crate::error::{AtlasError, Result};
use crate::model::{PageRecord, TextureClass};

/// Persistence boundary for packed pages, keyed by `(class, page index)`.
///
/// `load` failure is a hard error for that page's class run; a missing entry
/// is "page does not exist yet" and is reported through `exists`.
pub trait PageStore {
    fn exists(&self, class: TextureClass, index: usize) -> bool;
    fn load(&self, class: TextureClass, index: usize) -> Result<PageRecord>;
    fn save(
        &mut self,
        class: TextureClass,
        index: usize,
        record: &PageRecord,
        rgba: &RgbaImage,
    ) -> Result<()>;
    /// Deletes a persisted page. Removing a missing entry is a no-op, so
    /// callers can truncate a page sequence by walking indices upward.
    fn remove(&mut self, class: TextureClass, index: usize) -> Result<()>;
}

/// Filesystem store: `<root>/{opaque,transparent}/{prefix}_{name}.{json,png}`.
///
/// Page file names come from the record's `{atlas_name}_{index}` naming, so
/// existing pages can be enumerated by probing sequential indices.
pub struct FsPageStore {
    root: PathBuf,
    atlas_name: String,
}

impl FsPageStore {
    pub fn new(root: impl Into<PathBuf>, atlas_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            atlas_name: atlas_name.into(),
        }
    }

    fn record_path(&self, class: TextureClass, index: usize) -> PathBuf {
        self.class_dir(class)
            .join(format!("{}_{}_{}.json", class.prefix(), self.atlas_name, index))
    }

    fn image_path(&self, class: TextureClass, index: usize) -> PathBuf {
        self.class_dir(class)
            .join(format!("{}_{}_{}.png", class.prefix(), self.atlas_name, index))
    }

    fn class_dir(&self, class: TextureClass) -> PathBuf {
        self.root.join(class.dir_name())
    }
}

impl PageStore for FsPageStore {
    fn exists(&self, class: TextureClass, index: usize) -> bool {
        self.record_path(class, index).is_file()
    }

    fn load(&self, class: TextureClass, index: usize) -> Result<PageRecord> {
        let path = self.record_path(class, index);
        let data = fs::read_to_string(&path).map_err(|e| AtlasError::PageLoad {
            class: class.dir_name(),
            index,
            reason: format!("{}: {e}", path.display()),
        })?;
        serde_json::from_str(&data).map_err(|e| AtlasError::PageLoad {
            class: class.dir_name(),
            index,
            reason: format!("{}: {e}", path.display()),
        })
    }

    fn save(
        &mut self,
        class: TextureClass,
        index: usize,
        record: &PageRecord,
        rgba: &RgbaImage,
    ) -> Result<()> {
        let dir = self.class_dir(class);
        ensure_dir(&dir)?;

        let image_path = self.image_path(class, index);
        rgba.save(&image_path)?;

        let record_path = self.record_path(class, index);
        fs::write(&record_path, serde_json::to_string_pretty(record)?)?;

        info!(page = %record.name, path = %image_path.display(), "wrote atlas page");
        Ok(())
    }

    fn remove(&mut self, class: TextureClass, index: usize) -> Result<()> {
        for path in [self.record_path(class, index), self.image_path(class, index)] {
            if path.is_file() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryPageStore {
    pages: HashMap<(TextureClass, usize), (PageRecord, RgbaImage)>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, class: TextureClass, index: usize) -> Option<&(PageRecord, RgbaImage)> {
        self.pages.get(&(class, index))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl PageStore for MemoryPageStore {
    fn exists(&self, class: TextureClass, index: usize) -> bool {
        self.pages.contains_key(&(class, index))
    }

    fn load(&self, class: TextureClass, index: usize) -> Result<PageRecord> {
        self.pages
            .get(&(class, index))
            .map(|(record, _)| record.clone())
            .ok_or_else(|| AtlasError::PageLoad {
                class: class.dir_name(),
                index,
                reason: "page not present in store".into(),
            })
    }

    fn save(
        &mut self,
        class: TextureClass,
        index: usize,
        record: &PageRecord,
        rgba: &RgbaImage,
    ) -> Result<()> {
        self.pages
            .insert((class, index), (record.clone(), rgba.clone()));
        Ok(())
    }

    fn remove(&mut self, class: TextureClass, index: usize) -> Result<()> {
        self.pages.remove(&(class, index));
        Ok(())
    }
}
