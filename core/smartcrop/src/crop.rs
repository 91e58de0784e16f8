use crate::config::AnalysisConfig;

/// Rectangle in pixel units of the working image.
///
/// Fields are fractional because candidate sizes are multiplied by the scale
/// factor; results mapped back to the source image are whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `(x, y)` lies inside. The right and bottom edges are exclusive.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Divide every field by `factor` and truncate toward zero.
    pub(crate) fn unscaled(&self, factor: f64) -> Self {
        Self {
            x: (self.x / factor).trunc(),
            y: (self.y / factor).trunc(),
            width: (self.width / factor).trunc(),
            height: (self.height / factor).trunc(),
        }
    }

    /// Whole-pixel region clamped to a `width` x `height` image.
    pub fn to_region(&self, width: u32, height: u32) -> CropRegion {
        let x = (self.x.max(0.0) as u32).min(width.saturating_sub(1));
        let y = (self.y.max(0.0) as u32).min(height.saturating_sub(1));
        let w = (self.width.max(1.0) as u32).min(width - x).max(1);
        let h = (self.height.max(1.0) as u32).min(height - y).max(1);
        CropRegion {
            x,
            y,
            width: w,
            height: h,
        }
    }
}

/// Crop region within the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Per-channel importance-weighted sums of a candidate and their weighted,
/// area-normalized total.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Score {
    pub detail: f64,
    pub saturation: f64,
    pub skin: f64,
    pub boost: f64,
    pub total: f64,
}

/// A candidate rectangle with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropCandidate {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub rect: Rect,
    pub score: Score,
}

/// Enumerate candidate rectangles for an image of `width` x `height`.
///
/// The base crop size is `crop_width`/`crop_height` when set and the shorter
/// image side otherwise. Scales run from `max_scale` down to `min_scale`;
/// for each, positions advance by `step` rows first, then columns. The order
/// is stable and decides ties during selection.
pub fn generate_candidates(config: &AnalysisConfig, width: u32, height: u32) -> Vec<Rect> {
    let min_dimension = width.min(height);
    let crop_width = config.crop_width.unwrap_or(min_dimension) as f64;
    let crop_height = config.crop_height.unwrap_or(min_dimension) as f64;
    let (width, height) = (width as f64, height as f64);
    let step = config.step.max(1) as usize;

    let mut candidates = Vec::new();
    let mut scale = config.max_scale;
    while scale >= config.min_scale {
        let scaled_width = crop_width * scale;
        let scaled_height = crop_height * scale;
        for y in (0u32..).step_by(step) {
            if y as f64 + scaled_height > height {
                break;
            }
            for x in (0u32..).step_by(step) {
                if x as f64 + scaled_width > width {
                    break;
                }
                candidates.push(Rect::new(x as f64, y as f64, scaled_width, scaled_height));
            }
        }
        if config.scale_step <= 0.0 {
            break;
        }
        scale -= config.scale_step;
    }
    candidates
}
