pub mod canvas;
pub mod edges;
pub mod mask;
pub mod smoothing;
pub mod subject;
pub mod trace;

use anyhow::Result;
use image::RgbaImage;

use crate::models::{InstanceId, InstanceMask, IsolationResult, OutlinePath};

/// Foreground-object isolation pipeline.
///
/// Given a photographed image and the per-pixel instance mask produced by an
/// external segmentation model, picks the intended subject, cuts it out,
/// traces its outline into a smooth closed vector path, and renders a
/// fixed-size thumbnail. Invocations share no mutable state, so one
/// pipeline value can serve many images concurrently.
pub struct IsolationPipeline {
    /// Morphological gradient radius for edge extraction
    pub edge_radius: u8,
    /// Mask sub-sampling stride for subject selection
    pub sample_stride: u32,
    /// Point budget for contour smoothing
    pub target_points: usize,
    /// Side length of the thumbnail canvas
    pub canvas_size: u32,
    /// Fraction of the canvas the subject's long side occupies
    pub fill_fraction: f32,
    /// Hard cap on traced contour points
    pub max_trace_points: usize,
    /// Minimum points before a trace may close on its start
    pub min_loop: usize,
    pub verbose: bool,
}

impl IsolationPipeline {
    pub fn new() -> Self {
        Self {
            edge_radius: 2,
            sample_stride: 5,
            target_points: 120,
            canvas_size: 512,
            fill_fraction: 0.8,
            max_trace_points: 10_000,
            min_loop: 10,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_edge_radius(mut self, radius: u8) -> Self {
        self.edge_radius = radius;
        self
    }

    pub fn with_target_points(mut self, points: usize) -> Self {
        self.target_points = points;
        self
    }

    pub fn with_canvas(mut self, size: u32, fill_fraction: f32) -> Self {
        self.canvas_size = size;
        self.fill_fraction = fill_fraction;
        self
    }

    /// Run the full isolation pipeline on one image.
    ///
    /// Returns `Ok(None)` when there is no subject to isolate (no
    /// candidates, or the chosen subject has zero visible pixels). Every
    /// other degraded input produces a lower-fidelity result instead of an
    /// error: an untraceable boundary falls back to the rectangular
    /// outline, never a failure.
    pub fn isolate(
        &self,
        image: &RgbaImage,
        mask: &InstanceMask,
        candidates: &[InstanceId],
    ) -> Result<Option<IsolationResult>> {
        if candidates.is_empty() {
            if self.verbose {
                println!("No foreground instances detected");
            }
            return Ok(None);
        }

        // Step 1: Pick the subject among the candidates
        let subject = subject::select_subject(mask, candidates, self.sample_stride);
        if self.verbose {
            println!("Selected subject instance(s): {:?}", subject);
        }

        // Step 2: Render the subject into a cropped cut-out
        let Some((cutout, bbox)) = mask::render_masked(image, mask, &subject)? else {
            if self.verbose {
                println!("Subject has no visible pixels");
            }
            return Ok(None);
        };
        if self.verbose {
            println!(
                "Cut-out: {}x{} at ({}, {})",
                bbox.width, bbox.height, bbox.x, bbox.y
            );
        }

        // Step 3: Extract the boundary band from the alpha channel
        let edge_buffer = edges::alpha_edges(&cutout, self.edge_radius);

        // Step 4: Trace the band into an ordered contour
        let contour = trace::trace_boundary(
            &edge_buffer,
            edges::EDGE_ON_THRESHOLD,
            self.max_trace_points,
            self.min_loop,
        );

        // Step 5: Smooth into a closed normalized path; degenerate traces
        // fall back to the full-rectangle outline
        let outline = match &contour {
            Some(points) if points.len() >= 3 => {
                if self.verbose {
                    println!("Traced {} boundary points", points.len());
                }
                smoothing::smooth_contour(points, bbox.width, bbox.height, self.target_points)
            }
            _ => {
                if self.verbose {
                    println!("No usable boundary, using rectangular outline");
                }
                OutlinePath::unit_rect()
            }
        };

        // Step 6: Normalize the cut-out onto the thumbnail canvas
        let thumbnail = canvas::normalize_canvas(&cutout, self.canvas_size, self.fill_fraction);

        Ok(Some(IsolationResult {
            cutout,
            bbox,
            outline,
            thumbnail,
        }))
    }
}

impl Default for IsolationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn image_with_instance(size: u32, x0: u32, y0: u32, side: u32) -> (RgbaImage, InstanceMask) {
        let image = RgbaImage::from_pixel(size, size, Rgba([90, 90, 90, 255]));
        let mut mask = InstanceMask::empty(size, size);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.set(x, y, 1);
            }
        }
        (image, mask)
    }

    #[test]
    fn no_candidates_means_no_subject() -> Result<()> {
        let (image, mask) = image_with_instance(50, 10, 10, 20);
        let pipeline = IsolationPipeline::new();
        assert!(pipeline.isolate(&image, &mask, &[])?.is_none());
        Ok(())
    }

    #[test]
    fn empty_mask_means_no_subject() -> Result<()> {
        let image = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
        let mask = InstanceMask::empty(50, 50);
        let pipeline = IsolationPipeline::new();
        assert!(pipeline.isolate(&image, &mask, &[1])?.is_none());
        Ok(())
    }

    #[test]
    fn single_instance_produces_all_artifacts() -> Result<()> {
        let (image, mask) = image_with_instance(100, 30, 30, 40);
        let pipeline = IsolationPipeline::new();

        let result = pipeline.isolate(&image, &mask, &[1])?.expect("subject");
        assert_eq!(result.cutout.dimensions(), (40, 40));
        assert_eq!(result.bbox.x, 30);
        assert_eq!(result.thumbnail.dimensions(), (512, 512));
        assert!(!result.outline.is_empty());
        // A real trace, not the rectangle fallback
        assert_ne!(result.outline, OutlinePath::unit_rect());
        Ok(())
    }

    #[test]
    fn centered_instance_beats_corner_instance() -> Result<()> {
        let (image, mut mask) = image_with_instance(100, 40, 40, 20);
        for y in 0..10 {
            for x in 0..10 {
                mask.set(x, y, 2);
            }
        }
        let pipeline = IsolationPipeline::new();

        let result = pipeline.isolate(&image, &mask, &[1, 2])?.expect("subject");
        // The cut-out is the centered instance, not the corner one
        assert_eq!(result.bbox.x, 40);
        assert_eq!(result.bbox.y, 40);
        assert_eq!(result.cutout.dimensions(), (20, 20));
        Ok(())
    }
}
