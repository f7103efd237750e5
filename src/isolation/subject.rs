use std::collections::HashMap;

use crate::models::{InstanceId, InstanceMask};

/// Pick the instance(s) judged to be the photographed subject.
///
/// With zero or one candidates there is nothing to disambiguate and the
/// slice is returned unchanged. Otherwise the mask is sub-sampled on a
/// fixed stride to bound cost on large images, per-instance bounding boxes
/// are accumulated, and the candidate whose box center lies closest to the
/// image center wins. Ties go to the lowest instance id. Candidates that
/// never show up in the sample (too small to survive sub-sampling) are
/// excluded; if nothing is observed at all, the full candidate list is
/// returned so the caller treats every instance as the subject.
pub fn select_subject(
    mask: &InstanceMask,
    candidates: &[InstanceId],
    stride: u32,
) -> Vec<InstanceId> {
    if candidates.len() <= 1 {
        return candidates.to_vec();
    }

    let stride = stride.max(1);

    // Running (min_x, min_y, max_x, max_y) per observed id
    let mut boxes: HashMap<InstanceId, (u32, u32, u32, u32)> = HashMap::new();

    let mut y = 0;
    while y < mask.height() {
        let mut x = 0;
        while x < mask.width() {
            let id = mask.get(x, y);
            if id != 0 {
                boxes
                    .entry(id)
                    .and_modify(|(min_x, min_y, max_x, max_y)| {
                        *min_x = (*min_x).min(x);
                        *min_y = (*min_y).min(y);
                        *max_x = (*max_x).max(x);
                        *max_y = (*max_y).max(y);
                    })
                    .or_insert((x, y, x, y));
            }
            x += stride;
        }
        y += stride;
    }

    let center_x = mask.width() as f32 / 2.0;
    let center_y = mask.height() as f32 / 2.0;

    // Ascending ids sorted up front make the strict `<` below a
    // lowest-id tie-break.
    let mut ordered: Vec<InstanceId> = candidates.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let mut best: Option<(InstanceId, f32)> = None;
    for &id in &ordered {
        let Some(&(min_x, min_y, max_x, max_y)) = boxes.get(&id) else {
            continue;
        };
        let box_cx = (min_x + max_x) as f32 / 2.0;
        let box_cy = (min_y + max_y) as f32 / 2.0;
        let dx = box_cx - center_x;
        let dy = box_cy - center_y;
        let dist_sq = dx * dx + dy * dy;

        match best {
            Some((_, best_dist)) if dist_sq >= best_dist => {}
            _ => best = Some((id, dist_sq)),
        }
    }

    match best {
        Some((id, _)) => vec![id],
        // No candidate survived sub-sampling: treat all of them as the subject
        None => candidates.to_vec(),
    }
}
