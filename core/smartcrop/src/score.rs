use crate::config::AnalysisConfig;
use crate::crop::{Rect, Score};
use crate::features::FeatureMap;

/// Periodic bump peaking where `v` sits on a thirds line of a centred axis.
#[inline]
pub fn thirds(v: f64) -> f64 {
    let x = (((v - 1.0 / 3.0 + 1.0) % 2.0) * 0.5 - 0.5) * 16.0;
    (1.0 - x * x).max(0.0)
}

/// Weight of the sample at `(x, y)` for `crop`.
///
/// Outside the crop this is the constant `outside_importance`. Inside, a
/// radial falloff from the centre is combined with a penalty near the border
/// (beyond `edge_radius`) and, optionally, the rule-of-thirds bonus.
pub fn importance(config: &AnalysisConfig, crop: &Rect, x: f64, y: f64) -> f64 {
    if !crop.contains(x, y) {
        return config.outside_importance;
    }
    let x = (x - crop.x) / crop.width;
    let y = (y - crop.y) / crop.height;
    let px = (0.5 - x).abs() * 2.0;
    let py = (0.5 - y).abs() * 2.0;

    let dx = (px - 1.0 + config.edge_radius).max(0.0);
    let dy = (py - 1.0 + config.edge_radius).max(0.0);
    let d = (dx * dx + dy * dy) * config.edge_weight;

    let mut s = 1.41 - (px * px + py * py).sqrt();
    if config.rule_of_thirds {
        s += (s + d + 0.5).max(0.0) * 1.2 * (thirds(px) + thirds(py));
    }
    s + d
}

/// Score `crop` against a downsampled feature map.
///
/// The map is sampled once per cell; cell `(i, j)` stands for working-image
/// position `(i * score_down_sample, j * score_down_sample)`.
pub fn score(config: &AnalysisConfig, score_map: &FeatureMap, crop: &Rect) -> Score {
    let mut result = Score::default();
    let down_sample = config.score_down_sample.max(1) as f64;

    for gy in 0..score_map.height() {
        let y = gy as f64 * down_sample;
        for gx in 0..score_map.width() {
            let x = gx as f64 * down_sample;
            let [skin, detail, saturation, boost] = score_map.get(gx, gy);
            let i = importance(config, crop, x, y);
            let detail = detail as f64 / 255.0;

            result.skin += skin as f64 / 255.0 * (detail + config.skin_bias) * i;
            result.detail += detail * i;
            result.saturation += saturation as f64 / 255.0 * (detail + config.saturation_bias) * i;
            result.boost += boost as f64 / 255.0 * i;
        }
    }

    result.total = (result.detail * config.detail_weight
        + result.skin * config.skin_weight
        + result.saturation * config.saturation_weight
        + result.boost * config.boost_weight)
        / (crop.width * crop.height);
    result
}
