use anyhow::Result;
use image::{Rgba, RgbaImage, imageops};

use crate::models::{BoundingBox, InstanceId, InstanceMask};

/// Render the chosen instance(s) into a cropped, transparent-background
/// cut-out.
///
/// Pixels whose mask id belongs to `subject` keep their RGBA values,
/// everything else becomes fully transparent, and the result is cropped to
/// the subject's exact bounding box. Returns `Ok(None)` when the subject
/// has no visible pixels.
pub fn render_masked(
    image: &RgbaImage,
    mask: &InstanceMask,
    subject: &[InstanceId],
) -> Result<Option<(RgbaImage, BoundingBox)>> {
    let (width, height) = image.dimensions();
    if (width, height) != (mask.width(), mask.height()) {
        anyhow::bail!(
            "instance mask is {}x{} but image is {}x{}",
            mask.width(),
            mask.height(),
            width,
            height
        );
    }
    if subject.is_empty() {
        return Ok(None);
    }

    let mut wanted = [false; 256];
    for &id in subject {
        wanted[id as usize] = true;
    }

    let mut masked = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    // Find bounding box of subject pixels while masking
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut has_content = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        let id = mask.get(x, y);
        if id != 0 && wanted[id as usize] {
            masked.put_pixel(x, y, *pixel);
            has_content = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !has_content {
        return Ok(None);
    }

    let bbox = BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    };
    let cropped = imageops::crop_imm(&masked, bbox.x, bbox.y, bbox.width, bbox.height).to_image();

    Ok(Some((cropped, bbox)))
}
