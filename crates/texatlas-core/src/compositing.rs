use image::RgbaImage;

/// Blit a whole source image into `canvas` at `(dx, dy)`, rotated 90°
/// clockwise when `flipped`. Pixels falling outside the canvas are dropped;
/// placements produced by the packer never clip, so the guard only matters
/// for hand-built records.
pub fn blit_rgba(src: &RgbaImage, canvas: &mut RgbaImage, dx: u32, dy: u32, flipped: bool) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = src.dimensions();
    // destination size differs when rotated
    let (rw, rh) = if flipped { (sh, sw) } else { (sw, sh) };

    for yy in 0..rh {
        for xx in 0..rw {
            let (ix, iy) = if flipped {
                (yy, sh - 1 - xx)
            } else {
                (xx, yy)
            };
            if dx + xx < cw && dy + yy < ch {
                canvas.put_pixel(dx + xx, dy + yy, *src.get_pixel(ix, iy));
            }
        }
    }
}
