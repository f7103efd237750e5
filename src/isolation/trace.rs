use image::GrayImage;

/// Chebyshev radius searched when the walk stalls on a broken edge.
pub const RECOVERY_RADIUS: i64 = 2;

/// 8-connected neighbors in clockwise order, starting east (y grows down).
const NEIGHBORS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Dense working set of boundary pixels. O(1) membership, pixels are
/// consumed as the trace visits them.
struct PixelSet {
    width: u32,
    height: u32,
    on: Vec<bool>,
    remaining: usize,
}

impl PixelSet {
    fn from_edges(edges: &GrayImage, threshold: u8) -> Self {
        let (width, height) = edges.dimensions();
        let mut on = vec![false; (width as usize) * (height as usize)];
        let mut remaining = 0;
        for (x, y, pixel) in edges.enumerate_pixels() {
            if pixel[0] > threshold {
                on[(y as usize) * (width as usize) + (x as usize)] = true;
                remaining += 1;
            }
        }
        Self { width, height, on, remaining }
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.on[(y as usize) * (self.width as usize) + (x as usize)]
    }

    fn remove(&mut self, x: i64, y: i64) {
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        if self.on[idx] {
            self.on[idx] = false;
            self.remaining -= 1;
        }
    }

    /// Top-most pixel of the left-most occupied column.
    fn start_pixel(&self) -> Option<(i64, i64)> {
        for x in 0..self.width as i64 {
            for y in 0..self.height as i64 {
                if self.contains(x, y) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// Nearest remaining pixel within the recovery radius of (x, y),
    /// by squared Euclidean distance.
    fn nearest_within_recovery(&self, x: i64, y: i64) -> Option<(i64, i64)> {
        let mut best: Option<((i64, i64), i64)> = None;
        for dy in -RECOVERY_RADIUS..=RECOVERY_RADIUS {
            for dx in -RECOVERY_RADIUS..=RECOVERY_RADIUS {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x + dx, y + dy);
                if !self.contains(nx, ny) {
                    continue;
                }
                let dist_sq = dx * dx + dy * dy;
                match best {
                    Some((_, best_dist)) if dist_sq >= best_dist => {}
                    _ => best = Some(((nx, ny), dist_sq)),
                }
            }
        }
        best.map(|(p, _)| p)
    }
}

/// Walk the edge buffer's on-pixels into a single ordered, near-closed
/// contour.
///
/// The walk starts at the top-most pixel of the left-most occupied column
/// (deterministic for a given buffer) and repeatedly takes the first
/// 8-neighbor still in the working set, scanning clockwise from just behind
/// the last movement direction so the trace keeps its heading. When no
/// neighbor is left, the nearest remaining pixel within
/// [`RECOVERY_RADIUS`] is jumped to; this rides over one- or two-pixel
/// breaks left by anti-aliasing. The walk ends when it reaches the start
/// again with more than `min_loop` points, when recovery finds nothing, or
/// at the `max_points` hard cap.
///
/// Returns `None` when the buffer has no on-pixels at all. The output is
/// not guaranteed simple; the smoothing stage tolerates self-intersections.
pub fn trace_boundary(
    edges: &GrayImage,
    threshold: u8,
    max_points: usize,
    min_loop: usize,
) -> Option<Vec<(u32, u32)>> {
    let mut set = PixelSet::from_edges(edges, threshold);
    let start = set.start_pixel()?;

    let mut contour: Vec<(u32, u32)> = Vec::new();
    let (mut cx, mut cy) = start;
    let mut last_dir = 0usize;

    loop {
        contour.push((cx as u32, cy as u32));
        set.remove(cx, cy);
        if contour.len() >= max_points {
            break;
        }

        let mut next: Option<(i64, i64)> = None;
        let mut closed = false;
        let scan_from = (last_dir + 6) % 8;
        for i in 0..8 {
            let dir = (scan_from + i) % 8;
            let (dx, dy) = NEIGHBORS[dir];
            let (nx, ny) = (cx + dx, cy + dy);
            if (nx, ny) == start && contour.len() > min_loop {
                closed = true;
                break;
            }
            if set.contains(nx, ny) {
                next = Some((nx, ny));
                last_dir = dir;
                break;
            }
        }
        if closed {
            break;
        }

        match next.or_else(|| set.nearest_within_recovery(cx, cy)) {
            Some((nx, ny)) => {
                cx = nx;
                cy = ny;
            }
            // Nothing reachable, even through recovery
            None => break,
        }
    }

    Some(contour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn edge_image(size: u32, pixels: &[(u32, u32)]) -> GrayImage {
        let mut img = GrayImage::new(size, size);
        for &(x, y) in pixels {
            img.put_pixel(x, y, Luma([255u8]));
        }
        img
    }

    fn square_ring(size: u32, x0: u32, y0: u32, side: u32) -> GrayImage {
        let mut pixels = Vec::new();
        for i in 0..side {
            pixels.push((x0 + i, y0));
            pixels.push((x0 + i, y0 + side - 1));
            pixels.push((x0, y0 + i));
            pixels.push((x0 + side - 1, y0 + i));
        }
        edge_image(size, &pixels)
    }

    #[test]
    fn empty_buffer_yields_none() {
        let img = GrayImage::new(10, 10);
        assert!(trace_boundary(&img, 30, 10_000, 10).is_none());
    }

    #[test]
    fn starts_at_leftmost_topmost_pixel() {
        let img = edge_image(10, &[(5, 5), (3, 7), (3, 2), (8, 1)]);
        let contour = trace_boundary(&img, 30, 10_000, 10).unwrap();
        assert_eq!(contour[0], (3, 2));
    }

    #[test]
    fn ring_traces_into_closed_loop() {
        let img = square_ring(30, 5, 5, 12);
        let contour = trace_boundary(&img, 30, 10_000, 10).unwrap();

        // Every ring pixel visited exactly once: perimeter of a 12x12 ring
        assert_eq!(contour.len(), 44);

        // Consecutive points stay 8-connected
        for pair in contour.windows(2) {
            let (ax, ay) = pair[0];
            let (bx, by) = pair[1];
            let gap = (ax as i64 - bx as i64).abs().max((ay as i64 - by as i64).abs());
            assert!(gap <= 1, "gap {gap} between {pair:?}");
        }

        // And the loop closes back near the start
        let (sx, sy) = contour[0];
        let (ex, ey) = *contour.last().unwrap();
        let closing_gap = (sx as i64 - ex as i64).abs().max((sy as i64 - ey as i64).abs());
        assert!(closing_gap <= 1);
    }

    #[test]
    fn recovery_jumps_a_broken_edge() {
        // Ring with a one-pixel hole punched in the bottom edge; the next
        // pixel past the hole sits at Chebyshev distance 2
        let mut img = square_ring(30, 5, 5, 12);
        img.put_pixel(10, 16, Luma([0u8]));

        let contour = trace_boundary(&img, 30, 10_000, 10).unwrap();
        // All remaining ring pixels are still collected into one trace
        assert_eq!(contour.len(), 43);

        // No gap exceeds the recovery radius
        for pair in contour.windows(2) {
            let (ax, ay) = pair[0];
            let (bx, by) = pair[1];
            let gap = (ax as i64 - bx as i64).abs().max((ay as i64 - by as i64).abs());
            assert!(gap <= RECOVERY_RADIUS);
        }
    }

    #[test]
    fn point_cap_bounds_pathological_input() {
        // Fully lit buffer; trace must stop at the cap
        let img = GrayImage::from_pixel(200, 200, Luma([255u8]));
        let contour = trace_boundary(&img, 30, 500, 10).unwrap();
        assert_eq!(contour.len(), 500);
    }

    #[test]
    fn isolated_pixel_is_its_own_contour() {
        let img = edge_image(10, &[(4, 4)]);
        let contour = trace_boundary(&img, 30, 10_000, 10).unwrap();
        assert_eq!(contour, vec![(4, 4)]);
    }
}
