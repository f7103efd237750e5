use image::RgbaImage;

/// Identifier for one detected foreground instance (0 means background).
pub type InstanceId = u8;

/// Per-pixel instance labeling produced by an external segmentation model.
///
/// Row-major buffer of instance ids; 0 is background, 1..=255 identify
/// detected foreground instances. Read-only to the pipeline.
#[derive(Debug, Clone)]
pub struct InstanceMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl InstanceMask {
    /// Create a mask from a row-major id buffer.
    ///
    /// Returns `None` if the buffer length does not match the dimensions.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, data })
    }

    /// Create an all-background mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Instance id at (x, y). Out-of-bounds reads return background.
    pub fn get(&self, x: u32, y: u32) -> InstanceId {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[(y as usize) * (self.width as usize) + (x as usize)]
    }

    pub fn set(&mut self, x: u32, y: u32, id: InstanceId) {
        if x < self.width && y < self.height {
            self.data[(y as usize) * (self.width as usize) + (x as usize)] = id;
        }
    }

    /// Distinct non-zero ids present in the mask, ascending.
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        let mut seen = [false; 256];
        for &id in &self.data {
            seen[id as usize] = true;
        }
        (1..=255u8).filter(|&id| seen[id as usize]).collect()
    }
}

/// Axis-aligned bounding box in source-image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Center coordinates of the box.
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

/// A point on the outline path, in unit-square coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
}

impl PathPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two path points.
    pub fn midpoint(a: PathPoint, b: PathPoint) -> PathPoint {
        PathPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

/// One cubic Bezier segment of the outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierSegment {
    pub from: PathPoint,
    pub ctrl1: PathPoint,
    pub ctrl2: PathPoint,
    pub to: PathPoint,
}

/// Closed outline of the subject as a sequence of cubic Bezier segments.
///
/// Coordinates live in the unit square [0,1]x[0,1]; consumers rescale to
/// their display size (see [`OutlinePath::scaled`]) and stroke the result
/// for a glow/outline effect.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlinePath {
    pub segments: Vec<BezierSegment>,
}

impl OutlinePath {
    /// Degenerate fallback outline: the full unit-square rectangle.
    ///
    /// Used whenever no usable boundary could be traced, so downstream
    /// rendering always has geometry to stroke.
    pub fn unit_rect() -> Self {
        let corners = [
            PathPoint::new(0.0, 0.0),
            PathPoint::new(1.0, 0.0),
            PathPoint::new(1.0, 1.0),
            PathPoint::new(0.0, 1.0),
        ];
        let segments = (0..4)
            .map(|i| {
                let from = corners[i];
                let to = corners[(i + 1) % 4];
                // Straight edge expressed as a cubic with on-line controls
                BezierSegment {
                    from,
                    ctrl1: PathPoint::new(
                        from.x + (to.x - from.x) / 3.0,
                        from.y + (to.y - from.y) / 3.0,
                    ),
                    ctrl2: PathPoint::new(
                        from.x + (to.x - from.x) * 2.0 / 3.0,
                        from.y + (to.y - from.y) * 2.0 / 3.0,
                    ),
                    to,
                }
            })
            .collect();
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Rescale the unit-square path back to pixel coordinates.
    pub fn scaled(&self, width: f32, height: f32) -> Vec<BezierSegment> {
        let scale = |p: PathPoint| PathPoint::new(p.x * width, p.y * height);
        self.segments
            .iter()
            .map(|s| BezierSegment {
                from: scale(s.from),
                ctrl1: scale(s.ctrl1),
                ctrl2: scale(s.ctrl2),
                to: scale(s.to),
            })
            .collect()
    }

    /// SVG path data for the outline, rescaled to the given size.
    pub fn to_svg_path(&self, width: f32, height: f32) -> String {
        let segments = self.scaled(width, height);
        let mut d = String::new();
        if let Some(first) = segments.first() {
            d.push_str(&format!("M {:.2} {:.2}", first.from.x, first.from.y));
            for seg in &segments {
                d.push_str(&format!(
                    " C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
                    seg.ctrl1.x, seg.ctrl1.y, seg.ctrl2.x, seg.ctrl2.y, seg.to.x, seg.to.y
                ));
            }
            d.push_str(" Z");
        }
        d
    }
}

/// Everything the pipeline returns for one isolated subject.
#[derive(Debug, Clone)]
pub struct IsolationResult {
    /// Cropped RGBA cut-out of the subject, transparent background.
    pub cutout: RgbaImage,
    /// Bounding box of the cut-out in the source image.
    pub bbox: BoundingBox,
    /// Closed, unit-square-normalized outline of the subject.
    pub outline: OutlinePath,
    /// Fixed-size thumbnail with the subject centered on a transparent canvas.
    pub thumbnail: RgbaImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_rejects_mismatched_buffer() {
        assert!(InstanceMask::from_vec(3, 3, vec![0; 8]).is_none());
        assert!(InstanceMask::from_vec(3, 3, vec![0; 9]).is_some());
    }

    #[test]
    fn mask_reads_background_out_of_bounds() {
        let mut mask = InstanceMask::empty(4, 4);
        mask.set(1, 2, 7);
        assert_eq!(mask.get(1, 2), 7);
        assert_eq!(mask.get(4, 0), 0);
        assert_eq!(mask.get(0, 100), 0);
    }

    #[test]
    fn mask_enumerates_ids_ascending() {
        let mut mask = InstanceMask::empty(4, 4);
        mask.set(0, 0, 9);
        mask.set(1, 0, 2);
        mask.set(2, 0, 9);
        assert_eq!(mask.instance_ids(), vec![2, 9]);
    }

    #[test]
    fn unit_rect_is_closed() {
        let rect = OutlinePath::unit_rect();
        assert_eq!(rect.segments.len(), 4);
        let first = rect.segments.first().unwrap();
        let last = rect.segments.last().unwrap();
        assert_eq!(last.to, first.from);
    }

    #[test]
    fn scaled_path_restores_pixel_coordinates() {
        let rect = OutlinePath::unit_rect();
        let scaled = rect.scaled(100.0, 50.0);
        assert_eq!(scaled[1].from, PathPoint::new(100.0, 0.0));
        assert_eq!(scaled[2].from, PathPoint::new(100.0, 50.0));
    }

    #[test]
    fn svg_path_closes() {
        let d = OutlinePath::unit_rect().to_svg_path(10.0, 10.0);
        assert!(d.starts_with("M 0.00 0.00"));
        assert!(d.ends_with(" Z"));
    }
}
