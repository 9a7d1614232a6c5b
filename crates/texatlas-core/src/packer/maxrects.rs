use crate::config::FreeRectHeuristic;
use crate::model::Rect;

/// MaxRects bin packer for one page.
///
/// Keeps two rectangle lists: `used` (placed, pairwise disjoint) and `free`
/// (candidate regions; individually maximal-ish, may overlap each other).
/// The union of `free` always covers exactly the bin area not covered by
/// `used`; redundant free rects are removed by pruning after every
/// placement.
pub struct MaxRectsBinPack {
    width: u32,
    height: u32,
    allow_flip: bool,
    heuristic: FreeRectHeuristic,
    used: Vec<Rect>,
    free: Vec<Rect>,
}

impl MaxRectsBinPack {
    pub fn new(width: u32, height: u32, allow_flip: bool, heuristic: FreeRectHeuristic) -> Self {
        Self {
            width,
            height,
            allow_flip,
            heuristic,
            used: Vec::new(),
            free: vec![Rect::new(0, 0, width, height)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn allow_flip(&self) -> bool {
        self.allow_flip
    }
    pub fn used_rects(&self) -> &[Rect] {
        &self.used
    }
    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    /// Fraction of the bin area covered by placed rectangles.
    pub fn occupancy(&self) -> f32 {
        let bin = (self.width as u64) * (self.height as u64);
        if bin == 0 {
            return 0.0;
        }
        let used: u64 = self.used.iter().map(Rect::area).sum();
        used as f32 / bin as f32
    }

    /// Places a `w x h` rectangle using the configured heuristic.
    ///
    /// Returns `None` when no free rectangle can hold the request (even
    /// rotated, when flipping is allowed); the packer state is unchanged in
    /// that case. A returned rect has the requested dimensions, possibly
    /// swapped when the placement was flipped.
    pub fn insert(&mut self, w: u32, h: u32) -> Option<Rect> {
        if w == 0 || h == 0 {
            return None;
        }
        let (node, _s1, _s2) = self.find_position(w, h)?;
        self.place(node);
        Some(node)
    }

    /// Re-registers a rectangle at an already known position without running
    /// placement search. Used when rebuilding a page from persisted
    /// elements. Fails only on degenerate dimensions.
    pub fn layout(&mut self, x: u32, y: u32, w: u32, h: u32) -> bool {
        if w == 0 || h == 0 {
            return false;
        }
        self.place(Rect::new(x, y, w, h));
        true
    }

    /// Removes the exact-match used rectangle and returns its area to the
    /// free list verbatim. The freed rect is deliberately not merged with
    /// adjacent free space; the free list only coalesces through pruning
    /// after later placements. Returns false if no exact match exists.
    pub fn remove_rect(&mut self, x: u32, y: u32, w: u32, h: u32) -> bool {
        let node = Rect::new(x, y, w, h);
        match self.used.iter().position(|r| *r == node) {
            Some(i) => {
                self.used.remove(i);
                self.free.push(node);
                true
            }
            None => false,
        }
    }

    /// Places each of `sizes` greedily: every round scores all remaining
    /// sizes and commits the globally best placement, until nothing fits.
    /// Returns `(input_index, placement)` pairs in placement order.
    pub fn insert_batch(&mut self, sizes: &[(u32, u32)]) -> Vec<(usize, Rect)> {
        let mut remaining: Vec<usize> = (0..sizes.len()).collect();
        let mut out = Vec::new();
        while !remaining.is_empty() {
            let mut best: Option<(usize, Rect, i64, i64)> = None;
            for (slot, &idx) in remaining.iter().enumerate() {
                let (w, h) = sizes[idx];
                if w == 0 || h == 0 {
                    continue;
                }
                if let Some((node, s1, s2)) = self.find_position(w, h) {
                    let better = match &best {
                        None => true,
                        Some((_, _, b1, b2)) => s1 < *b1 || (s1 == *b1 && s2 < *b2),
                    };
                    if better {
                        best = Some((slot, node, s1, s2));
                    }
                }
            }
            match best {
                Some((slot, node, _, _)) => {
                    let idx = remaining.remove(slot);
                    self.place(node);
                    out.push((idx, node));
                }
                None => break,
            }
        }
        out
    }

    /// Scans the free list for the best-scoring placement of `w x h`,
    /// considering the flipped orientation when allowed. Lower scores win;
    /// ties keep the earlier candidate, so results are deterministic for a
    /// given free-list state.
    fn find_position(&self, w: u32, h: u32) -> Option<(Rect, i64, i64)> {
        let mut best_node = Rect::ZERO;
        let mut best_s1 = i64::MAX;
        let mut best_s2 = i64::MAX;

        for fr in &self.free {
            if fr.w >= w && fr.h >= h {
                let (s1, s2) = self.score(fr, w, h);
                if s1 < best_s1 || (s1 == best_s1 && s2 < best_s2) {
                    best_node = Rect::new(fr.x, fr.y, w, h);
                    best_s1 = s1;
                    best_s2 = s2;
                }
            }
            if self.allow_flip && fr.w >= h && fr.h >= w {
                let (s1, s2) = self.score(fr, h, w);
                if s1 < best_s1 || (s1 == best_s1 && s2 < best_s2) {
                    best_node = Rect::new(fr.x, fr.y, h, w);
                    best_s1 = s1;
                    best_s2 = s2;
                }
            }
        }

        if best_node.is_zero() {
            None
        } else {
            Some((best_node, best_s1, best_s2))
        }
    }

    /// Scores placing a `w x h` rect at the top-left of free rect `fr`.
    /// All heuristics are expressed in a uniform minimizing comparator;
    /// ContactPoint is higher-better and therefore negated.
    fn score(&self, fr: &Rect, w: u32, h: u32) -> (i64, i64) {
        let leftover_h = fr.w as i64 - w as i64;
        let leftover_v = fr.h as i64 - h as i64;
        let short_fit = leftover_h.min(leftover_v);
        let long_fit = leftover_h.max(leftover_v);
        match self.heuristic {
            FreeRectHeuristic::BestShortSideFit => (short_fit, long_fit),
            FreeRectHeuristic::BestLongSideFit => (long_fit, short_fit),
            FreeRectHeuristic::BestAreaFit => {
                let area_fit = fr.area() as i64 - (w as i64) * (h as i64);
                (area_fit, short_fit)
            }
            FreeRectHeuristic::BottomLeft => ((fr.y + h) as i64, fr.x as i64),
            FreeRectHeuristic::ContactPoint => {
                let contact = self.contact_point_score(fr.x, fr.y, w, h);
                let area_fit = fr.area() as i64 - (w as i64) * (h as i64);
                (-(contact as i64), area_fit)
            }
        }
    }

    /// Total touching-edge length of a candidate against the bin border and
    /// every used rectangle whose edge is flush with the candidate's edge.
    fn contact_point_score(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let mut score = 0u64;

        if x == 0 || x + w == self.width {
            score += h as u64;
        }
        if y == 0 || y + h == self.height {
            score += w as u64;
        }

        for u in &self.used {
            if u.x == x + w || u.right() == x {
                score += common_interval_length(u.y, u.bottom(), y, y + h) as u64;
            }
            if u.y == y + h || u.bottom() == y {
                score += common_interval_length(u.x, u.right(), x, x + w) as u64;
            }
        }
        score
    }

    /// Commits a placement: splits every intersecting free rect into its
    /// remaining margins, prunes redundant free rects, registers the node.
    fn place(&mut self, node: Rect) {
        let mut new_free: Vec<Rect> = Vec::with_capacity(self.free.len() + 4);
        for fr in self.free.drain(..) {
            if !split_free_node(fr, &node, &mut new_free) {
                new_free.push(fr);
            }
        }
        self.free = new_free;
        self.prune_free_list();
        self.used.push(node);
    }

    /// Removes every free rect fully contained in another free rect.
    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let a = self.free[i];
            let mut remove_i = false;
            let mut j = i + 1;
            while j < self.free.len() {
                let b = self.free[j];
                if b.contains(&a) {
                    remove_i = true;
                    break;
                }
                if a.contains(&b) {
                    self.free.remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

/// Splits `fr` around `used`, pushing the up-to-four margin rectangles that
/// `used` leaves uncovered. Returns false (pushing nothing) when the rects
/// do not overlap. Pure function of the two rects' geometry: the emitted
/// margins do not depend on any surrounding list state.
fn split_free_node(fr: Rect, used: &Rect, out: &mut Vec<Rect>) -> bool {
    if !fr.intersects(used) {
        return false;
    }

    // Top and bottom strips span the full free-rect width.
    if used.y > fr.y && used.y < fr.bottom() {
        out.push(Rect::new(fr.x, fr.y, fr.w, used.y - fr.y));
    }
    if used.bottom() < fr.bottom() {
        out.push(Rect::new(fr.x, used.bottom(), fr.w, fr.bottom() - used.bottom()));
    }
    // Left and right strips span the full free-rect height.
    if used.x > fr.x && used.x < fr.right() {
        out.push(Rect::new(fr.x, fr.y, used.x - fr.x, fr.h));
    }
    if used.right() < fr.right() {
        out.push(Rect::new(used.right(), fr.y, fr.right() - used.right(), fr.h));
    }

    true
}

fn common_interval_length(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    let start = a1.max(b1);
    let end = a2.min(b2);
    end.saturating_sub(start)
}
