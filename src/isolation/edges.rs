use image::{GrayImage, Luma, RgbaImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

/// Intensity above which an edge-buffer pixel counts as "on".
///
/// Empirical default tuned against reference captures; callers pass it to
/// the tracer explicitly so it stays a configuration value.
pub const EDGE_ON_THRESHOLD: u8 = 30;

/// Extract a thin boundary band from the alpha channel of a masked image.
///
/// The alpha channel is binarized (non-zero alpha means "solid") and a
/// morphological gradient is applied: dilation minus erosion over a
/// Chebyshev neighborhood of the given radius. The result is a 0/255 ring
/// along the alpha boundary, robust to small mask noise.
///
/// The buffer is padded with background before the morphology so that a
/// subject cropped flush to the image border still produces a ring there,
/// then cropped back to the input dimensions.
pub fn alpha_edges(image: &RgbaImage, radius: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    let radius = radius.max(1);
    let pad = radius as u32;

    let mut solid = GrayImage::new(width + 2 * pad, height + 2 * pad);
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] != 0 {
            solid.put_pixel(x + pad, y + pad, Luma([255u8]));
        }
    }

    let grown = dilate(&solid, Norm::LInf, radius);
    let shrunk = erode(&solid, Norm::LInf, radius);

    let mut gradient = GrayImage::new(width, height);
    for (x, y, pixel) in gradient.enumerate_pixels_mut() {
        let hi = grown.get_pixel(x + pad, y + pad)[0];
        let lo = shrunk.get_pixel(x + pad, y + pad)[0];
        *pixel = Luma([hi.saturating_sub(lo)]);
    }
    gradient
}

/// Whether a pixel of the edge buffer is a boundary pixel.
pub fn is_on(edges: &GrayImage, x: u32, y: u32, threshold: u8) -> bool {
    edges.get_pixel(x, y)[0] > threshold
}
