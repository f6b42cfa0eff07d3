//! Overlay rendering for BlazePose-topology results.

use std::collections::HashMap;

use betagen_common::{PoseResult, VISIBILITY_THRESHOLD};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Limb segments drawn on the overlay, as pairs of landmark indices
/// (shoulders, arms, torso, legs).
pub const SKELETON_EDGES: [(usize, usize); 12] = [
    (11, 13),
    (13, 15),
    (12, 14),
    (14, 16),
    (11, 12),
    (11, 23),
    (12, 24),
    (23, 24),
    (23, 25),
    (25, 27),
    (24, 26),
    (26, 28),
];

const KEYPOINT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LIMB_COLOR: Rgb<u8> = Rgb([0, 140, 255]);
const BBOX_COLOR: Rgb<u8> = Rgb([255, 220, 50]);
const KEYPOINT_RADIUS: i32 = 3;

/// Draw keypoints, limbs and the bounding box of `result` onto a copy of `frame`.
///
/// Keypoints are drawn when above [`VISIBILITY_THRESHOLD`]; a limb is drawn
/// when both endpoints reach it. Keypoints whose name is not a landmark index
/// are drawn but never joined.
pub fn render_pose(frame: &RgbImage, result: &PoseResult) -> RgbImage {
    let mut rendered = frame.clone();
    if result.keypoints.is_empty() {
        return rendered;
    }
    let (width, height) = (frame.width() as f32, frame.height() as f32);

    let mut points: HashMap<usize, (f32, f32, f32)> = HashMap::new();
    for kp in &result.keypoints {
        if let Ok(idx) = kp.name.parse::<usize>() {
            points.insert(idx, (kp.x, kp.y, kp.confidence));
        }
        if kp.is_visible() && touches_frame(kp.x, kp.y, width, height) {
            draw_filled_circle_mut(
                &mut rendered,
                (kp.x as i32, kp.y as i32),
                KEYPOINT_RADIUS,
                KEYPOINT_COLOR,
            );
        }
    }

    for (start, end) in SKELETON_EDGES {
        let (Some(&(sx, sy, sc)), Some(&(ex, ey, ec))) = (points.get(&start), points.get(&end))
        else {
            continue;
        };
        if sc.min(ec) < VISIBILITY_THRESHOLD {
            continue;
        }
        // Two parallel one-pixel lines give a 2px stroke.
        for offset in [0.0, 1.0] {
            let start = (sx + offset, sy);
            let end = (ex + offset, ey);
            if let Some((start, end)) = clip_segment(start, end, width, height) {
                draw_line_segment_mut(&mut rendered, start, end, LIMB_COLOR);
            }
        }
    }

    if let Some(rect) = result.bbox.and_then(|bbox| clamp_bbox(bbox, width, height)) {
        draw_hollow_rect_mut(&mut rendered, rect, BBOX_COLOR);
        if rect.width() > 2 && rect.height() > 2 {
            draw_hollow_rect_mut(
                &mut rendered,
                Rect::at(rect.left() + 1, rect.top() + 1)
                    .of_size(rect.width() - 2, rect.height() - 2),
                BBOX_COLOR,
            );
        }
    }

    rendered
}

/// Whether a keypoint marker centred at `(x, y)` overlaps the frame.
fn touches_frame(x: f32, y: f32, width: f32, height: f32) -> bool {
    let r = KEYPOINT_RADIUS as f32;
    x.is_finite() && y.is_finite() && x >= -r && y >= -r && x <= width + r && y <= height + r
}

/// Clip the segment to the pixel area of a `width` x `height` frame
/// (Liang-Barsky). Returns `None` when no part of it is inside.
fn clip_segment(
    start: (f32, f32),
    end: (f32, f32),
    width: f32,
    height: f32,
) -> Option<((f32, f32), (f32, f32))> {
    let (x0, y0) = start;
    let (dx, dy) = (end.0 - x0, end.1 - y0);
    if ![x0, y0, dx, dy].iter().all(|v| v.is_finite()) {
        return None;
    }

    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let bounds = [
        (-dx, x0),
        (dx, width - 1.0 - x0),
        (-dy, y0),
        (dy, height - 1.0 - y0),
    ];
    for (p, q) in bounds {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (x0 + t0 * dx, y0 + t0 * dy),
        (x0 + t1 * dx, y0 + t1 * dy),
    ))
}

/// Clamp `[x1, y1, x2, y2]` to one pixel beyond each frame edge so sides
/// outside the frame stay undrawn. `None` when the box misses the frame.
fn clamp_bbox(bbox: [f32; 4], width: f32, height: f32) -> Option<Rect> {
    let [x0, y0, x1, y1] = bbox;
    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
        return None;
    }
    if x1 < 0.0 || y1 < 0.0 || x0 > width || y0 > height {
        return None;
    }

    let x0 = x0.clamp(-1.0, width) as i32;
    let y0 = y0.clamp(-1.0, height) as i32;
    let x1 = x1.clamp(-1.0, width) as i32;
    let y1 = y1.clamp(-1.0, height) as i32;
    let w = (x1 - x0).max(1) as u32;
    let h = (y1 - y0).max(1) as u32;
    Some(Rect::at(x0, y0).of_size(w, h))
}
