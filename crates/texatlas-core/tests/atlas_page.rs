use std::collections::HashMap;

use image::{Rgba, RgbaImage};
use texatlas_core::atlas::AtlasPage;
use texatlas_core::compositing::blit_rgba;
use texatlas_core::config::FreeRectHeuristic;
use texatlas_core::model::{Rect, TextureClass, Vec2u};
use texatlas_core::store::MemoryPageStore;

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(rgba))
}

#[test]
fn add_and_lookup() {
    let mut page = AtlasPage::new("p_0", 64, 64, false, false, FreeRectHeuristic::BestAreaFit);
    assert!(page.add_texture("a", 32, 32));

    let element = page.element("a").unwrap();
    assert_eq!(element.offset, Vec2u::new(0, 0));
    assert_eq!(element.size, Vec2u::new(32, 32));
    assert_eq!(element.scale, [1.0, 1.0]);
    assert!(!element.flipped);

    assert!(page.contains("a"));
    assert!(!page.contains("b"));
    assert!((page.occupancy() - 0.25).abs() < 1e-6);
    assert_eq!(page.class(), TextureClass::Opaque);
}

#[test]
fn duplicate_add_keeps_existing_placement() {
    let mut page = AtlasPage::new("p_0", 64, 64, false, false, FreeRectHeuristic::BestAreaFit);
    assert!(page.add_texture("a", 32, 32));
    let before = page.element("a").unwrap().clone();

    assert!(page.add_texture("a", 16, 16));
    assert_eq!(page.elements().len(), 1);
    assert_eq!(page.element("a").unwrap(), &before);
}

#[test]
fn flipped_add_records_rotation_and_scale() {
    let mut page = AtlasPage::new("p_0", 100, 50, true, false, FreeRectHeuristic::BestShortSideFit);
    assert!(page.add_texture("tall", 40, 80));

    let element = page.element("tall").unwrap();
    assert!(element.flipped);
    assert_eq!(element.size, Vec2u::new(40, 80));
    assert_eq!(element.placed_rect(), Rect::new(0, 0, 80, 40));
    assert_eq!(element.scale, [2.0, 0.5]);
}

#[test]
fn full_page_rejects_further_adds() {
    let mut page = AtlasPage::new("p_0", 64, 64, false, false, FreeRectHeuristic::BestAreaFit);
    assert!(page.add_texture("a", 64, 64));
    assert!(!page.add_texture("b", 1, 1));
    assert_eq!(page.elements().len(), 1);
}

#[test]
fn dirty_lifecycle_through_pack() {
    let mut store = MemoryPageStore::new();
    let mut page = AtlasPage::new("p_0", 8, 8, false, true, FreeRectHeuristic::BestAreaFit);
    assert!(!page.is_dirty());

    assert!(page.add_texture("a", 4, 4));
    assert!(page.is_dirty());

    let mut images = HashMap::new();
    images.insert("a".to_string(), solid(4, 4, [255, 0, 0, 128]));

    assert!(page.pack(0, &images, &mut store).unwrap());
    assert!(!page.is_dirty());
    assert_eq!(store.len(), 1);

    // Clean page: nothing to write.
    assert!(!page.pack(0, &images, &mut store).unwrap());

    let (record, rgba) = store.page(TextureClass::Transparent, 0).unwrap();
    assert_eq!(record.elements.len(), 1);
    assert_eq!(rgba.dimensions(), (8, 8));
    assert_eq!(rgba.get_pixel(0, 0), &Rgba([255, 0, 0, 128]));
}

#[test]
fn compose_places_each_element_at_its_offset() {
    let mut page = AtlasPage::new("p_0", 4, 4, false, false, FreeRectHeuristic::BestAreaFit);
    assert!(page.add_texture("red", 2, 2));
    assert!(page.add_texture("blue", 2, 2));

    let mut images = HashMap::new();
    images.insert("red".to_string(), solid(2, 2, [255, 0, 0, 255]));
    images.insert("blue".to_string(), solid(2, 2, [0, 0, 255, 255]));

    let canvas = page.compose(&images);
    let red_at = page.element("red").unwrap().offset;
    let blue_at = page.element("blue").unwrap().offset;
    assert_eq!(canvas.get_pixel(red_at.x, red_at.y), &Rgba([255, 0, 0, 255]));
    assert_eq!(canvas.get_pixel(blue_at.x, blue_at.y), &Rgba([0, 0, 255, 255]));
    // Unoccupied cells stay fully transparent.
    assert_eq!(canvas.get_pixel(2, 2), &Rgba([0, 0, 0, 0]));
}

#[test]
fn compose_leaves_hole_for_missing_image() {
    let mut page = AtlasPage::new("p_0", 4, 4, false, false, FreeRectHeuristic::BestAreaFit);
    assert!(page.add_texture("ghost", 2, 2));

    let canvas = page.compose(&HashMap::new());
    assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
}

#[test]
fn blit_rotates_quarter_turn_clockwise() {
    let mut src = RgbaImage::new(1, 2);
    src.put_pixel(0, 0, Rgba([10, 0, 0, 255]));
    src.put_pixel(0, 1, Rgba([20, 0, 0, 255]));

    let mut canvas = RgbaImage::new(2, 2);
    blit_rgba(&src, &mut canvas, 0, 0, true);

    // The source column reads bottom-to-top across the destination row.
    assert_eq!(canvas.get_pixel(0, 0), &Rgba([20, 0, 0, 255]));
    assert_eq!(canvas.get_pixel(1, 0), &Rgba([10, 0, 0, 255]));
    assert_eq!(canvas.get_pixel(0, 1), &Rgba([0, 0, 0, 0]));
}

#[test]
fn removed_element_slot_is_reusable() {
    let mut page = AtlasPage::new("p_0", 100, 100, false, false, FreeRectHeuristic::BestAreaFit);
    assert!(page.add_texture("a", 100, 50));
    assert!(page.add_texture("b", 100, 50));
    assert!(!page.add_texture("c", 100, 50));

    let a_offset = page.element("a").unwrap().offset;
    assert!(page.remove_element_at(0));
    assert!(!page.contains("a"));

    assert!(page.add_texture("c", 100, 50));
    assert_eq!(page.element("c").unwrap().offset, a_offset);

    assert!(!page.remove_element_at(9));
}
