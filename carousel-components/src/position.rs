//! Page arithmetic over a continuous offset.
//!
//! Offsets grow negative while moving forward: page `p` rests at
//! `-p * page_width`. Pages are signed because a looping carousel keeps
//! counting past either end; [`PagePosition::normalize`] folds them back
//! into item indices.

use crate::args::CarouselArgs;

/// Over-scroll multiplier applied past a non-looping bound.
pub const RUBBER_BAND_FACTOR: f32 = 0.3;

/// Page geometry and wrap mode of a carousel.
///
/// `page_width` must be positive. It is not checked here; see
/// [`CarouselArgs::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagePosition {
    page_width: f32,
    data_length: usize,
    looping: bool,
}

impl PagePosition {
    /// Creates a position model.
    pub fn new(page_width: f32, data_length: usize, looping: bool) -> Self {
        Self {
            page_width,
            data_length,
            looping,
        }
    }

    /// Derives the position model from carousel args.
    pub fn from_args(args: &CarouselArgs) -> Self {
        Self::new(args.page_width(), args.data_length, args.looping)
    }

    /// Distance between two neighbouring pages.
    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    /// Number of logical items.
    pub fn data_length(&self) -> usize {
        self.data_length
    }

    /// Whether indices wrap around.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether there is anywhere to navigate to.
    pub fn is_navigable(&self) -> bool {
        self.data_length > 1
    }

    /// Nearest page to `offset`. Halves round toward positive infinity.
    pub fn current_page(&self, offset: f32) -> i64 {
        let pages = -offset / self.page_width;
        let floor = pages.floor();
        // `pages + 0.5` would round 0.49999997 up to 1.0.
        if pages - floor >= 0.5 {
            floor as i64 + 1
        } else {
            floor as i64
        }
    }

    /// Folds any page into `0..data_length`.
    pub fn normalize(&self, page: i64) -> usize {
        let n = self.data_length as i64;
        if n == 0 {
            return 0;
        }
        page.rem_euclid(n) as usize
    }

    /// Signed page distance from `current` to `target`.
    ///
    /// While looping the shorter way around wins. A distance of exactly half
    /// the ring is left as is, so ties keep the direction of the raw
    /// difference.
    pub fn shortest_diff(&self, current: i64, target: i64) -> i64 {
        let mut diff = target - current;
        if self.looping {
            let n = self.data_length as i64;
            if diff * 2 > n {
                diff -= n;
            } else if diff * 2 < -n {
                diff += n;
            }
        }
        diff
    }

    /// Index of the last page, or 0 for an empty carousel.
    pub fn last_page(&self) -> i64 {
        (self.data_length as i64 - 1).max(0)
    }

    /// Clamps a page into `[0, last_page]`.
    pub fn clamp_page(&self, page: i64) -> i64 {
        page.clamp(0, self.last_page())
    }

    /// Clamps when not looping, otherwise returns `page` unchanged.
    pub fn bound_page(&self, page: i64) -> i64 {
        if self.looping {
            page
        } else {
            self.clamp_page(page)
        }
    }

    /// Resting offset of `page`.
    pub fn offset_for_page(&self, page: i64) -> f32 {
        -(page as f32) * self.page_width
    }

    /// Offset range `(min, max)` of a non-looping carousel.
    pub fn bounds(&self) -> (f32, f32) {
        (self.offset_for_page(self.last_page()), 0.0)
    }

    /// Damps the part of `candidate` lying outside [`bounds`](Self::bounds).
    ///
    /// Looping carousels have no bounds and return `candidate` unchanged.
    pub fn rubber_band(&self, candidate: f32) -> f32 {
        if self.looping {
            return candidate;
        }
        let (min, max) = self.bounds();
        if candidate > max {
            max + (candidate - max) * RUBBER_BAND_FACTOR
        } else if candidate < min {
            min + (candidate - min) * RUBBER_BAND_FACTOR
        } else {
            candidate
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn looping(n: usize) -> PagePosition {
        PagePosition::new(100.0, n, true)
    }

    fn bounded(n: usize) -> PagePosition {
        PagePosition::new(100.0, n, false)
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-3,
            "expected {expected}, got {actual}"
        );
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(-149.0, 1)]
    #[case(-150.0, 2)]
    #[case(40.0, 0)]
    #[case(50.0, 0)]
    #[case(60.0, -1)]
    #[case(-1_230.0, 12)]
    fn current_page_rounds_to_nearest(#[case] offset: f32, #[case] page: i64) {
        assert_eq!(looping(5).current_page(offset), page);
    }

    #[rstest]
    #[case(-0.49999997, 0)]
    #[case(-0.5, 1)]
    #[case(0.49999997, 0)]
    #[case(0.5, 0)]
    #[case(0.50000006, -1)]
    fn current_page_just_below_half_stays(#[case] offset: f32, #[case] page: i64) {
        assert_eq!(PagePosition::new(1.0, 5, true).current_page(offset), page);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(7, 2)]
    #[case(-1, 4)]
    #[case(-11, 4)]
    #[case(1_000_003, 3)]
    fn normalize_handles_any_sign_and_magnitude(#[case] page: i64, #[case] index: usize) {
        assert_eq!(looping(5).normalize(page), index);
    }

    #[test]
    fn normalize_empty_is_zero() {
        assert_eq!(looping(0).normalize(-3), 0);
    }

    #[test]
    fn shortest_diff_wraps_forward_at_the_end() {
        let position = looping(10);
        assert_eq!(position.shortest_diff(9, 0), 1);
        assert_eq!(position.shortest_diff(0, 9), -1);
        assert_eq!(position.shortest_diff(2, 4), 2);
    }

    #[test]
    fn shortest_diff_tie_keeps_raw_direction() {
        let position = looping(4);
        assert_eq!(position.shortest_diff(0, 2), 2);
        assert_eq!(position.shortest_diff(2, 0), -2);
        assert_eq!(position.shortest_diff(0, 3), -1);
    }

    #[test]
    fn shortest_diff_is_raw_without_looping() {
        assert_eq!(bounded(10).shortest_diff(9, 0), -9);
    }

    #[test]
    fn bounds_span_all_pages() {
        assert_eq!(bounded(5).bounds(), (-400.0, 0.0));
        assert_eq!(bounded(0).bounds(), (0.0, 0.0));
        assert_eq!(bounded(5).offset_for_page(3), -300.0);
    }

    #[test]
    fn rubber_band_damps_overscroll() {
        let position = bounded(5);
        assert_close(position.rubber_band(50.0), 15.0);
        assert_close(position.rubber_band(-500.0), -430.0);
        assert_eq!(position.rubber_band(-250.0), -250.0);
        assert_eq!(looping(5).rubber_band(50.0), 50.0);
    }

    #[test]
    fn bound_page_clamps_only_without_looping() {
        assert_eq!(bounded(5).bound_page(7), 4);
        assert_eq!(bounded(5).bound_page(-2), 0);
        assert_eq!(looping(5).bound_page(-2), -2);
    }
}
