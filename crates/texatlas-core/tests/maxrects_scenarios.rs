use texatlas_core::config::FreeRectHeuristic;
use texatlas_core::model::Rect;
use texatlas_core::packer::MaxRectsBinPack;

#[test]
fn best_area_fit_basic_sequence() {
    let mut packer = MaxRectsBinPack::new(100, 100, false, FreeRectHeuristic::BestAreaFit);

    let first = packer.insert(40, 40).expect("first insert fits");
    assert_eq!(first, Rect::new(0, 0, 40, 40));

    // 70x70 cannot fit contiguously in either remaining free rect.
    assert!(packer.insert(70, 70).is_none());
    // Wider than the bin itself.
    assert!(packer.insert(101, 50).is_none());

    let second = packer.insert(60, 60).expect("second insert fits");
    assert!(!second.intersects(&first));
    assert!(second.right() <= 100 && second.bottom() <= 100);
}

#[test]
fn right_column_accepts_exact_fit() {
    // After a 40x40 corner placement the right column (40,0,60,100) remains
    // a single maximal free rect, so a 60x100 request lands there exactly.
    let mut packer = MaxRectsBinPack::new(100, 100, false, FreeRectHeuristic::BestAreaFit);
    packer.insert(40, 40).unwrap();
    let placed = packer.insert(60, 100).expect("exact column fit");
    assert_eq!(placed, Rect::new(40, 0, 60, 100));
}

#[test]
fn failed_insert_leaves_state_unchanged() {
    let mut packer = MaxRectsBinPack::new(100, 100, false, FreeRectHeuristic::BestShortSideFit);
    packer.insert(60, 60).unwrap();

    let used_before = packer.used_rects().to_vec();
    let free_before = packer.free_rects().to_vec();

    assert!(packer.insert(90, 90).is_none());

    assert_eq!(packer.used_rects(), used_before.as_slice());
    assert_eq!(packer.free_rects(), free_before.as_slice());
}

#[test]
fn bottom_left_prefers_lowest_then_leftmost() {
    let mut packer = MaxRectsBinPack::new(100, 100, false, FreeRectHeuristic::BottomLeft);
    assert_eq!(packer.insert(30, 10).unwrap(), Rect::new(0, 0, 30, 10));
    // Same top edge is available at x=30; gravity placement keeps y minimal.
    assert_eq!(packer.insert(30, 10).unwrap(), Rect::new(30, 0, 30, 10));
    assert_eq!(packer.insert(40, 10).unwrap(), Rect::new(60, 0, 40, 10));
    // Row exhausted, next placement starts the second row at the left.
    assert_eq!(packer.insert(30, 10).unwrap(), Rect::new(0, 10, 30, 10));
}

#[test]
fn contact_point_hugs_existing_content() {
    let mut packer = MaxRectsBinPack::new(100, 100, false, FreeRectHeuristic::ContactPoint);
    let a = packer.insert(50, 50).unwrap();
    assert_eq!(a, Rect::new(0, 0, 50, 50));

    // The best contact for a second 50x50 is flush against both the first
    // rect and the bin border.
    let b = packer.insert(50, 50).unwrap();
    assert!(!b.intersects(&a));
    let touches_a = b.x == a.right() || b.y == a.bottom();
    assert!(touches_a, "expected placement flush with existing rect, got {b:?}");
}

#[test]
fn flip_allows_rotated_fit() {
    let mut upright = MaxRectsBinPack::new(100, 50, false, FreeRectHeuristic::BestShortSideFit);
    assert!(upright.insert(40, 80).is_none());

    let mut flipping = MaxRectsBinPack::new(100, 50, true, FreeRectHeuristic::BestShortSideFit);
    let placed = flipping.insert(40, 80).expect("rotated placement fits");
    assert_eq!((placed.w, placed.h), (80, 40));
}

#[test]
fn zero_sized_requests_are_rejected() {
    let mut packer = MaxRectsBinPack::new(64, 64, true, FreeRectHeuristic::BestAreaFit);
    assert!(packer.insert(0, 10).is_none());
    assert!(packer.insert(10, 0).is_none());
    assert!(packer.used_rects().is_empty());
}
