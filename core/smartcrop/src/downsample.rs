use crate::features::FeatureMap;

#[inline]
fn dst_dims(src_w: u32, src_h: u32, factor: u32) -> (u32, u32) {
    (src_w / factor, src_h / factor)
}

/// Shrink a feature map by box-averaging `factor` x `factor` blocks.
///
/// Skin and detail blend the block mean with the block maximum (0.5/0.5 and
/// 0.7/0.3) so that small strong peaks survive. Saturation and boost are
/// plain means. Trailing rows and columns that do not fill a block are
/// dropped.
pub fn downsample(map: &FeatureMap, factor: u32) -> FeatureMap {
    let factor = factor.max(1);
    let (dst_w, dst_h) = dst_dims(map.width(), map.height(), factor);
    let mut dst = FeatureMap::new(dst_w, dst_h);
    if dst_w == 0 || dst_h == 0 {
        return dst;
    }

    let src = map.data();
    let src_w = map.width() as usize;
    let f = factor as usize;
    let ifactor2 = 1.0 / (factor as f64 * factor as f64);

    for y in 0..dst_h {
        for x in 0..dst_w {
            let (mut r, mut g, mut b, mut a) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
            let (mut mr, mut mg) = (0.0f64, 0.0f64);

            for v in 0..f {
                let row = (y as usize * f + v) * src_w;
                for u in 0..f {
                    let j = (row + x as usize * f + u) * 4;
                    let (sr, sg) = (src[j] as f64, src[j + 1] as f64);
                    r += sr;
                    g += sg;
                    b += src[j + 2] as f64;
                    a += src[j + 3] as f64;
                    mr = mr.max(sr);
                    mg = mg.max(sg);
                }
            }

            dst.set(
                x,
                y,
                [
                    (r * ifactor2 * 0.5 + mr * 0.5) as f32,
                    (g * ifactor2 * 0.7 + mg * 0.3) as f32,
                    (b * ifactor2) as f32,
                    (a * ifactor2) as f32,
                ],
            );
        }
    }

    dst
}
