//! Diverging blue-white-red colormap for the probability surface.
//!
//! Three-stop linear ramp through the matplotlib RdBu_r anchor colors:
//! class-0 certainty is blue, the decision boundary is near-white, class-1
//! certainty is red.

/// Blue anchor (probability 0.0).
const BLUE: (u8, u8, u8) = (33, 102, 172);
/// White anchor (probability 0.5).
const WHITE: (u8, u8, u8) = (247, 247, 247);
/// Red anchor (probability 1.0).
const RED: (u8, u8, u8) = (178, 24, 43);

fn lerp(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    (channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
}

/// Map a class-1 probability in [0, 1] to an RGB color.
///
/// Values outside [0, 1] are clamped.
#[must_use]
pub fn diverging_red_blue(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    if t <= 0.5 {
        lerp(BLUE, WHITE, t * 2.0)
    } else {
        lerp(WHITE, RED, (t - 0.5) * 2.0)
    }
}

/// Blend `color` over a white background at the given alpha.
///
/// The contour layer is semi-transparent on a white figure, which is
/// equivalent to pre-blending each cell color once.
#[must_use]
pub fn blend_over_white(color: (u8, u8, u8), alpha: f64) -> (u8, u8, u8) {
    let alpha = alpha.clamp(0.0, 1.0);
    let channel = |c: u8| (255.0 * (1.0 - alpha) + c as f64 * alpha).round() as u8;
    (channel(color.0), channel(color.1), channel(color.2))
}

#[cfg(test)]
mod tests {
    use super::{blend_over_white, diverging_red_blue};

    #[test]
    fn endpoints_hit_the_anchors() {
        assert_eq!(diverging_red_blue(0.0), (33, 102, 172));
        assert_eq!(diverging_red_blue(1.0), (178, 24, 43));
    }

    #[test]
    fn midpoint_is_near_white() {
        assert_eq!(diverging_red_blue(0.5), (247, 247, 247));
    }

    #[test]
    fn out_of_range_clamps() {
        assert_eq!(diverging_red_blue(-2.0), diverging_red_blue(0.0));
        assert_eq!(diverging_red_blue(3.0), diverging_red_blue(1.0));
    }

    #[test]
    fn cold_side_is_blue_hot_side_is_red() {
        let (r_low, _, b_low) = diverging_red_blue(0.1);
        let (r_high, _, b_high) = diverging_red_blue(0.9);
        assert!(b_low > r_low);
        assert!(r_high > b_high);
    }

    #[test]
    fn blend_at_zero_alpha_is_white() {
        assert_eq!(blend_over_white((0, 0, 0), 0.0), (255, 255, 255));
    }

    #[test]
    fn blend_at_full_alpha_is_the_color() {
        assert_eq!(blend_over_white((10, 20, 30), 1.0), (10, 20, 30));
    }

    #[test]
    fn blend_partial_alpha_mixes() {
        // 0.6 * 255 + 0.4 * 178 = 224.2
        assert_eq!(blend_over_white((178, 24, 43), 0.4), (224, 163, 170));
    }
}
