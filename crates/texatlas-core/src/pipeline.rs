use std::collections::{HashMap, HashSet};

use image::RgbaImage;
use tracing::{debug, error, info, instrument, warn};

use crate::atlas::AtlasPage;
use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::model::{ClassReport, PackReport, TextureClass};
use crate::store::PageStore;

/// In-memory source image to pack. Identity is the key; the core never
/// opens files itself.
pub struct SourceTexture {
    pub key: String,
    pub image: RgbaImage,
    /// Textures with blending and opaque textures go to separate page
    /// sequences; the classes never share a page.
    pub alpha_blended: bool,
}

impl SourceTexture {
    /// Builds a source texture, classifying it by scanning the alpha channel.
    pub fn new(key: impl Into<String>, image: RgbaImage) -> Self {
        let alpha_blended = has_alpha(&image);
        Self {
            key: key.into(),
            image,
            alpha_blended,
        }
    }

    pub fn class(&self) -> TextureClass {
        if self.alpha_blended {
            TextureClass::Transparent
        } else {
            TextureClass::Opaque
        }
    }
}

/// True if any pixel is not fully opaque.
pub fn has_alpha(image: &RgbaImage) -> bool {
    image.pixels().any(|p| p[3] < 255)
}

/// Packs `textures` into per-class atlas page sequences, reconciling against
/// pages already present in `store`.
///
/// Incremental by default: previously persisted pages are reloaded, their
/// free-space state rebuilt, stale elements dropped, and only new images are
/// placed, so existing placements keep their positions across runs. With
/// `reflow_all` the prior layout is discarded and every image is re-placed
/// from an empty page set, trading layout stability for tighter packing.
///
/// A failing class run is reported after the other class has been attempted;
/// pages already saved by other classes are unaffected.
#[instrument(skip_all, fields(atlas = atlas_name))]
pub fn pack_textures(
    textures: &[SourceTexture],
    atlas_name: &str,
    cfg: &AtlasConfig,
    store: &mut dyn PageStore,
    reflow_all: bool,
) -> Result<PackReport> {
    cfg.validate()?;

    let mut report = PackReport::default();

    // Oversized images can never fit a page; skip them with a warning.
    let mut eligible: Vec<&SourceTexture> = Vec::with_capacity(textures.len());
    for tex in textures {
        let (w, h) = tex.image.dimensions();
        if w > cfg.max_width || h > cfg.max_height {
            warn!(key = %tex.key, w, h, "image exceeds page dimensions, skipping");
            report.skipped_oversized += 1;
        } else {
            eligible.push(tex);
        }
    }

    let mut first_err = None;
    for class in [TextureClass::Transparent, TextureClass::Opaque] {
        let class_textures: Vec<&SourceTexture> =
            eligible.iter().copied().filter(|t| t.class() == class).collect();

        match pack_class(&class_textures, class, atlas_name, cfg, store, reflow_all) {
            Ok(class_report) => *report.class_mut(class) = class_report,
            Err(e) => {
                error!(class = class.dir_name(), error = %e, "class run failed");
                first_err.get_or_insert(e);
            }
        }
    }

    match first_err {
        Some(e) => Err(e),
        None => {
            info!("{}", report.summary());
            Ok(report)
        }
    }
}

/// Packs one class's textures into its own page sequence.
fn pack_class(
    textures: &[&SourceTexture],
    class: TextureClass,
    atlas_name: &str,
    cfg: &AtlasConfig,
    store: &mut dyn PageStore,
    reflow_all: bool,
) -> Result<ClassReport> {
    let mut report = ClassReport::default();

    // Larger images first: placing big items early reduces fragmentation.
    // Key tie-break keeps the order stable and the run deterministic.
    let mut sorted: Vec<&SourceTexture> = textures.to_vec();
    sorted.sort_by(|a, b| {
        let area = |t: &SourceTexture| {
            let (w, h) = t.image.dimensions();
            (w as u64) * (h as u64)
        };
        area(b).cmp(&area(a)).then_with(|| a.key.cmp(&b.key))
    });

    let keys: HashSet<&str> = sorted.iter().map(|t| t.key.as_str()).collect();
    let images: HashMap<String, RgbaImage> = sorted
        .iter()
        .map(|t| (t.key.clone(), t.image.clone()))
        .collect();

    // Reload persisted pages (sequential indices until a gap) and rebuild
    // their free-space bookkeeping from the recorded placements.
    let mut pages: Vec<AtlasPage> = Vec::new();
    if !reflow_all {
        let mut index = 0usize;
        while store.exists(class, index) {
            let record = store.load(class, index)?;
            record.validate().map_err(|reason| AtlasError::PageLoad {
                class: class.dir_name(),
                index,
                reason,
            })?;
            let mut page = AtlasPage::from_record(record, cfg.heuristic);
            report.stale_dropped += page.layout(|key| keys.contains(key));
            pages.push(page);
            index += 1;
        }
    }

    // Place every texture not already present in some loaded page: existing
    // pages in order first, then a fresh page.
    for tex in &sorted {
        if pages.iter().any(|p| p.contains(&tex.key)) {
            continue;
        }
        let (w, h) = tex.image.dimensions();
        let mut added = false;
        for page in pages.iter_mut() {
            if page.add_texture(&tex.key, w, h) {
                added = true;
                break;
            }
        }
        if !added {
            let name = format!("{}_{}", atlas_name, pages.len());
            let mut page = AtlasPage::new(
                &name,
                cfg.max_width,
                cfg.max_height,
                cfg.allow_flip,
                class == TextureClass::Transparent,
                cfg.heuristic,
            );
            if page.add_texture(&tex.key, w, h) {
                pages.push(page);
            } else {
                // Cannot happen after the oversize filter, but a placement
                // failure is never fatal for the batch.
                warn!(key = %tex.key, w, h, "image does not fit an empty page, skipping");
                continue;
            }
        }
        report.placed += 1;
    }

    // Flush every touched page. Clean pages are a no-op.
    for (index, page) in pages.iter_mut().enumerate() {
        if page.pack(index, &images, store)? {
            report.pages_written += 1;
        }
    }
    report.pages = pages.len();

    // Drop persisted pages beyond the surviving count. A reflow that shrinks
    // the sequence would otherwise leave records behind that the next
    // incremental run's sequential probing resurrects.
    let mut index = pages.len();
    while store.exists(class, index) {
        debug!(class = class.dir_name(), index, "removing stale page");
        store.remove(class, index)?;
        index += 1;
    }

    Ok(report)
}
