use crate::models::{BezierSegment, OutlinePath, PathPoint};

/// Fit a closed, unit-square-normalized cubic path through an ordered
/// contour.
///
/// The contour is down-sampled to at most `target_points` points with a
/// uniform stride, preserving traversal order, then every cyclic triple
/// (P0, P1, P2) of samples emits a cubic from P0 to P1 whose control points
/// sit at the midpoints of (P0, P1) and (P1, P2). This local smoothing
/// hides polygon facets without a global spline solve. All coordinates are
/// divided by (width, height) first, so the result is
/// resolution-independent, and the path is always closed.
///
/// With fewer than 3 samples there is nothing to fit and the unit-square
/// rectangle fallback is returned.
pub fn smooth_contour(
    contour: &[(u32, u32)],
    width: u32,
    height: u32,
    target_points: usize,
) -> OutlinePath {
    if width == 0 || height == 0 {
        return OutlinePath::unit_rect();
    }

    let target = target_points.max(1);
    let stride = (contour.len() / target).max(1);
    let samples: Vec<PathPoint> = contour
        .iter()
        .step_by(stride)
        .map(|&(x, y)| PathPoint::new(x as f32 / width as f32, y as f32 / height as f32))
        .collect();

    if samples.len() < 3 {
        return OutlinePath::unit_rect();
    }

    let n = samples.len();
    let segments = (0..n)
        .map(|i| {
            let p0 = samples[i];
            let p1 = samples[(i + 1) % n];
            let p2 = samples[(i + 2) % n];
            BezierSegment {
                from: p0,
                ctrl1: PathPoint::midpoint(p0, p1),
                ctrl2: PathPoint::midpoint(p1, p2),
                to: p1,
            }
        })
        .collect();

    OutlinePath { segments }
}
