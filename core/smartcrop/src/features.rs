//! Per-pixel saliency channels.
//!
//! The feature map mirrors the RGBA layout of the source raster but each
//! channel carries its own signal: skin (0), edge detail (1), saturation (2)
//! and boost weight (3).

use image::RgbaImage;

use crate::config::{AnalysisConfig, Boost};
use crate::image_buffer::ImageBuffer;

pub const SKIN: usize = 0;
pub const DETAIL: usize = 1;
pub const SATURATION: usize = 2;
pub const BOOST: usize = 3;

/// Four `f32` channels per pixel, row-major.
///
/// Skin, detail and saturation stay within `[0, 255]`. The boost channel is
/// additive and may exceed 255 where boosts overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMap {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl FeatureMap {
    /// A map with every channel zero.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// All four channels at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> [f32; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// One channel at `(x, y)`.
    pub fn channel(&self, x: u32, y: u32, channel: usize) -> f32 {
        self.data[self.index(x, y) + channel]
    }

    pub(crate) fn set(&mut self, x: u32, y: u32, value: [f32; 4]) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&value);
    }

    pub(crate) fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Render the map for inspection: skin in red, detail in green,
    /// saturation in blue, blended over a dimmed boost layer.
    pub fn to_debug_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [skin, detail, saturation, boost] = self.get(x, y);
            let boost = boost.clamp(0.0, 255.0) * 0.25;
            image::Rgba([
                (skin + boost).clamp(0.0, 255.0) as u8,
                (detail + boost).clamp(0.0, 255.0) as u8,
                (saturation + boost).clamp(0.0, 255.0) as u8,
                255,
            ])
        })
    }
}

/// Perceived brightness with tuned channel weights. Not CIE luma; the
/// weights sum to 1.3.
#[inline]
pub fn luma(r: f64, g: f64, b: f64) -> f64 {
    0.5126 * b + 0.7152 * g + 0.0722 * r
}

/// HSL saturation of an 8-bit colour.
#[inline]
pub fn saturation(r: f64, g: f64, b: f64) -> f64 {
    let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
    let maximum = r.max(g).max(b);
    let minimum = r.min(g).min(b);
    if maximum == minimum {
        return 0.0;
    }
    let lightness = (maximum + minimum) / 2.0;
    let d = maximum - minimum;
    if lightness > 0.5 {
        d / (2.0 - maximum - minimum)
    } else {
        d / (maximum + minimum)
    }
}

/// Similarity of a colour's direction to the reference skin tone, `1 - d`.
/// `None` for pure black, whose direction is undefined.
#[inline]
pub fn skin_similarity(config: &AnalysisConfig, r: f64, g: f64, b: f64) -> Option<f64> {
    let mag = (r * r + g * g + b * b).sqrt();
    if mag == 0.0 {
        return None;
    }
    let rd = r / mag - config.skin_color[0];
    let gd = g / mag - config.skin_color[1];
    let bd = b / mag - config.skin_color[2];
    Some(1.0 - (rd * rd + gd * gd + bd * bd).sqrt())
}

/// Compute skin, edge and saturation channels and stamp `config.boost`.
pub fn build_feature_map(image: &ImageBuffer, config: &AnalysisConfig) -> FeatureMap {
    let (width, height) = image.dimensions();
    let mut map = FeatureMap::new(width, height);

    let lumas: Vec<f64> = image
        .pixels()
        .chunks_exact(4)
        .map(|p| luma(p[0] as f64, p[1] as f64, p[2] as f64))
        .collect();
    let w = width as usize;

    for y in 0..height {
        for x in 0..width {
            let [r, g, b, _] = image.pixel(x, y);
            let (r, g, b) = (r as f64, g as f64, b as f64);
            let i = y as usize * w + x as usize;

            let detail = if x == 0 || x >= width - 1 || y == 0 || y >= height - 1 {
                lumas[i]
            } else {
                lumas[i] * 4.0 - lumas[i - w] - lumas[i - 1] - lumas[i + 1] - lumas[i + w]
            };

            let lightness = lumas[i] / 255.0;
            let skin = skin_energy(config, r, g, b, lightness);
            let sat = saturation_energy(config, r, g, b, lightness);

            map.set(
                x,
                y,
                [skin as f32, detail.clamp(0.0, 255.0) as f32, sat as f32, 0.0],
            );
        }
    }

    apply_boosts(&mut map, &config.boost);
    map
}

fn skin_energy(config: &AnalysisConfig, r: f64, g: f64, b: f64, lightness: f64) -> f64 {
    let Some(skin) = skin_similarity(config, r, g, b) else {
        return 0.0;
    };
    let is_skin_color = skin > config.skin_threshold;
    let is_skin_brightness =
        lightness >= config.skin_brightness_min && lightness <= config.skin_brightness_max;
    if is_skin_color && is_skin_brightness {
        (skin - config.skin_threshold) * (255.0 / (1.0 - config.skin_threshold))
    } else {
        0.0
    }
}

fn saturation_energy(config: &AnalysisConfig, r: f64, g: f64, b: f64, lightness: f64) -> f64 {
    let sat = saturation(r, g, b);
    let acceptable_saturation = sat > config.saturation_threshold;
    let acceptable_lightness = lightness >= config.saturation_brightness_min
        && lightness <= config.saturation_brightness_max;
    if acceptable_saturation && acceptable_lightness {
        (sat - config.saturation_threshold) * (255.0 / (1.0 - config.saturation_threshold))
    } else {
        0.0
    }
}

/// Zero the boost channel, then add `weight * 255` under every boost.
/// Boost edges are truncated to whole pixels and clipped to the map.
pub fn apply_boosts(map: &mut FeatureMap, boosts: &[Boost]) {
    if boosts.is_empty() {
        return;
    }
    for px in map.data.chunks_exact_mut(4) {
        px[BOOST] = 0.0;
    }

    let (width, height) = (map.width as i64, map.height as i64);
    for boost in boosts {
        let x0 = (boost.x.trunc() as i64).clamp(0, width);
        let x1 = ((boost.x + boost.width).trunc() as i64).clamp(0, width);
        let y0 = (boost.y.trunc() as i64).clamp(0, height);
        let y1 = ((boost.y + boost.height).trunc() as i64).clamp(0, height);
        let weight = (boost.weight * 255.0) as f32;

        for y in y0..y1 {
            for x in x0..x1 {
                let i = map.index(x as u32, y as u32) + BOOST;
                map.data[i] += weight;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn luma_uses_tuned_weights() {
        assert!(approx(luma(255.0, 0.0, 0.0), 0.0722 * 255.0));
        assert!(approx(luma(0.0, 255.0, 0.0), 0.7152 * 255.0));
        assert!(approx(luma(0.0, 0.0, 255.0), 0.5126 * 255.0));
        // The weights sum to 1.3, so gray 128 is brighter than 128
        assert!(approx(luma(128.0, 128.0, 128.0), 166.4));
    }

    #[test]
    fn saturation_of_gray_is_zero() {
        assert_eq!(saturation(90.0, 90.0, 90.0), 0.0);
    }

    #[test]
    fn saturation_follows_hsl() {
        assert!(approx(saturation(255.0, 0.0, 0.0), 1.0));
        // max 0.8, min 0.4, l 0.6 > 0.5 → 0.4 / (2 - 1.2)
        assert!(approx(saturation(204.0, 102.0, 153.0), 0.5));
        // max 0.4, min 0.2, l 0.3 → 0.2 / 0.6
        assert!(approx(saturation(102.0, 51.0, 76.5), 1.0 / 3.0));
    }

    #[test]
    fn black_is_never_skin() {
        let config = AnalysisConfig::default();
        assert_eq!(skin_similarity(&config, 0.0, 0.0, 0.0), None);
        let image = ImageBuffer::from_pixel(3, 3, [0, 0, 0, 255]).unwrap();
        let map = build_feature_map(&image, &config);
        assert_eq!(map.channel(1, 1, SKIN), 0.0);
    }

    #[test]
    fn reference_skin_tone_scores_full_skin() {
        let config = AnalysisConfig::default();
        // Direction (0.78, 0.57, 0.44) at a brightness inside the skin band
        let image = ImageBuffer::from_pixel(3, 3, [195, 143, 110, 255]).unwrap();
        let map = build_feature_map(&image, &config);
        let skin = map.channel(1, 1, SKIN);
        // The reference vector is not unit length, so the peak stays below 255
        assert!(skin > 150.0, "skin energy {skin}");
        assert!(skin <= 255.0);
    }

    #[test]
    fn gray_is_not_skin() {
        let config = AnalysisConfig::default();
        let skin = skin_similarity(&config, 128.0, 128.0, 128.0).unwrap();
        assert!(skin < config.skin_threshold);
    }

    #[test]
    fn uniform_interior_has_no_detail_but_border_keeps_luma() {
        let image = ImageBuffer::from_pixel(5, 4, [128, 128, 128, 255]).unwrap();
        let map = build_feature_map(&image, &AnalysisConfig::default());
        assert_eq!(map.channel(2, 2, DETAIL), 0.0);
        assert!(approx(map.channel(0, 2, DETAIL) as f64, 166.4));
        assert!(approx(map.channel(4, 1, DETAIL) as f64, 166.4));
        assert!(approx(map.channel(2, 0, DETAIL) as f64, 166.4));
        assert!(approx(map.channel(2, 3, DETAIL) as f64, 166.4));
    }

    #[test]
    fn laplacian_highlights_isolated_bright_pixel() {
        let mut pixels = ImageBuffer::from_pixel(5, 5, [0, 0, 0, 255])
            .unwrap()
            .pixels()
            .to_vec();
        let centre = (2 * 5 + 2) * 4;
        pixels[centre..centre + 3].copy_from_slice(&[40, 40, 40]);
        let image = ImageBuffer::new(5, 5, pixels).unwrap();
        let map = build_feature_map(&image, &AnalysisConfig::default());
        // 4 * 52 = 208
        assert!(approx(map.channel(2, 2, DETAIL) as f64, 4.0 * 1.3 * 40.0));
        // Neighbours go negative and clamp to zero
        assert_eq!(map.channel(2, 1, DETAIL), 0.0);
    }

    #[test]
    fn saturated_colour_fills_saturation_channel() {
        let image = ImageBuffer::from_pixel(3, 3, [200, 30, 30, 255]).unwrap();
        let map = build_feature_map(&image, &AnalysisConfig::default());
        assert!(map.channel(1, 1, SATURATION) > 0.0);
    }

    #[test]
    fn too_dark_colour_is_not_saturated() {
        // Fully saturated but luma/255 < 0.05
        let image = ImageBuffer::from_pixel(3, 3, [40, 0, 0, 255]).unwrap();
        let map = build_feature_map(&image, &AnalysisConfig::default());
        assert_eq!(map.channel(1, 1, SATURATION), 0.0);
    }

    #[test]
    fn boost_channel_is_zero_without_boosts() {
        let image = ImageBuffer::from_pixel(4, 4, [10, 200, 10, 255]).unwrap();
        let map = build_feature_map(&image, &AnalysisConfig::default());
        assert!(map.data().chunks_exact(4).all(|p| p[BOOST] == 0.0));
    }

    #[test]
    fn overlapping_boosts_accumulate_without_clamping() {
        let image = ImageBuffer::from_pixel(10, 10, [50, 50, 50, 255]).unwrap();
        let config = AnalysisConfig::new()
            .boost(Boost::new(0.0, 0.0, 6.0, 6.0, 1.0))
            .boost(Boost::new(4.0, 4.0, 6.0, 6.0, 0.5));
        let map = build_feature_map(&image, &config);
        assert_eq!(map.channel(1, 1, BOOST), 255.0);
        assert_eq!(map.channel(5, 5, BOOST), 255.0 * 1.5);
        assert_eq!(map.channel(8, 8, BOOST), 127.5);
        assert_eq!(map.channel(8, 1, BOOST), 0.0);
    }

    #[test]
    fn boost_is_clipped_to_map() {
        let mut map = FeatureMap::new(4, 4);
        apply_boosts(&mut map, &[Boost::new(-2.0, 2.5, 10.0, 10.0, 1.0)]);
        assert_eq!(map.channel(0, 2, BOOST), 255.0);
        assert_eq!(map.channel(3, 3, BOOST), 255.0);
        assert_eq!(map.channel(0, 1, BOOST), 0.0);
    }

    #[test]
    fn debug_image_has_map_dimensions() {
        let image = ImageBuffer::from_pixel(7, 5, [200, 30, 30, 255]).unwrap();
        let map = build_feature_map(&image, &AnalysisConfig::default());
        let debug = map.to_debug_image();
        assert_eq!(debug.dimensions(), (7, 5));
        assert_eq!(debug.get_pixel(3, 2).0[3], 255);
    }
}
