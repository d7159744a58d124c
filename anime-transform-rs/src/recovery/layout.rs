/// Longest-to-shortest side ratio the processor handles best
const TARGET_RATIO: f64 = 1.5;

/// Axis along which the image and its two markers are stacked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Marker above, image, marker below
    Vertical,
    /// Marker left, image, marker right
    Horizontal,
}

/// Top-left corner of an element on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Position of every element of a recovery frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub orientation: Orientation,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Size the source is cropped to before placement
    pub image_width: u32,
    pub image_height: u32,
    pub image: Placement,
    pub markers: [Placement; 2],
}

/// Target size of the source image before framing.
///
/// When the long side exceeds 1.5 times the short one it is cut to
/// `short * 1.5`. Otherwise the short side is cut to `long / 1.5`.
/// Each side is then raised to at least `min_side`.
pub fn normalized_dimensions(width: u32, height: u32, min_side: u32) -> (u32, u32) {
    let (w, h) = (width as f64, height as f64);

    let (mut out_w, mut out_h) = (width, height);
    if height > width {
        if h / w > TARGET_RATIO {
            out_h = (w * TARGET_RATIO).floor() as u32;
        } else {
            out_w = (h / TARGET_RATIO).floor() as u32;
        }
    } else if w / h > TARGET_RATIO {
        out_w = (h * TARGET_RATIO).floor() as u32;
    } else {
        out_h = (w / TARGET_RATIO).floor() as u32;
    }

    (out_w.max(min_side), out_h.max(min_side))
}

/// Offset that centers `inner` on an axis of length `outer`, rounding half up
fn centered(outer: u32, inner: u32) -> u32 {
    let offset = (outer as f64 / 2.0 - inner as f64 / 2.0).round();
    offset.max(0.0) as u32
}

impl FrameLayout {
    /// Lay out a source of the given size between two square markers
    pub fn compute(source_width: u32, source_height: u32, marker_size: u32, gap: u32) -> Self {
        let (image_width, image_height) = normalized_dimensions(source_width, source_height, marker_size);
        let border = marker_size + gap;

        if image_height > image_width {
            let marker_x = centered(image_width, marker_size);
            FrameLayout {
                orientation: Orientation::Vertical,
                canvas_width: image_width.max(marker_size),
                canvas_height: image_height + 2 * border,
                image_width,
                image_height,
                image: Placement { x: 0, y: border },
                markers: [
                    Placement { x: marker_x, y: 0 },
                    Placement { x: marker_x, y: border + image_height + gap },
                ],
            }
        } else {
            let marker_y = centered(image_height, marker_size);
            FrameLayout {
                orientation: Orientation::Horizontal,
                canvas_width: image_width + 2 * border,
                canvas_height: image_height.max(marker_size),
                image_width,
                image_height,
                image: Placement { x: border, y: 0 },
                markers: [
                    Placement { x: 0, y: marker_y },
                    Placement { x: border + image_width + gap, y: marker_y },
                ],
            }
        }
    }
}
