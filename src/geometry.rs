// Chart geometry, kept free of any drawing surface so the math is testable
// on its own: bar scaling, pie slice accumulation, and the cubic-Bezier
// approximations the PDF content stream needs for arcs and rounded corners.

use std::f32::consts::TAU;

/// Bezier circle constant for a 90-degree corner arc (4/3 * (sqrt(2) - 1)).
pub const CORNER_RATIO: f32 = 0.5523;

/// Width in points of a chart bar for `count` incidents, scaled against the
/// largest group so the top route spans the full track. `max_count` is
/// clamped to 1, so a dataset of all-zero counts draws empty bars instead of
/// dividing by zero.
pub fn bar_width(count: u64, max_count: u64, track_width: f32) -> f32 {
    (count as f32 / max_count.max(1) as f32) * track_width
}

/// One pie wedge: angles in radians from the slice accumulation, plus the
/// category's fraction of the whole for labelling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    pub start: f32,
    pub end: f32,
    pub fraction: f32,
}

impl Slice {
    /// Share of the total as a whole-number percentage.
    pub fn percent(&self) -> u32 {
        (self.fraction * 100.0).round() as u32
    }
}

/// Accumulate consecutive pie slices for `counts`, each spanning
/// `count / total` of a full turn starting where the previous slice ended.
/// A zero `total` yields no slices at all.
pub fn pie_slices(counts: &[u64], total: u64) -> Vec<Slice> {
    if total == 0 {
        return Vec::new();
    }
    let mut start = 0.0f32;
    counts
        .iter()
        .map(|&c| {
            let fraction = c as f32 / total as f32;
            let end = start + fraction * TAU;
            let slice = Slice {
                start,
                end,
                fraction,
            };
            start = end;
            slice
        })
        .collect()
}

/// A cubic Bezier segment: two control points and the end point. The start
/// point is the previous segment's end (or `arc_point(..)` of the start
/// angle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub x: f32,
    pub y: f32,
}

/// Point on the circle of radius `r` around `(cx, cy)` at angle `a`.
pub fn arc_point(cx: f32, cy: f32, r: f32, a: f32) -> (f32, f32) {
    (cx + r * a.cos(), cy + r * a.sin())
}

/// Approximate the circular arc from `a0` to `a1` with cubic Beziers, one
/// per quarter-turn span. Negative spans (clockwise arcs) work unchanged:
/// the tangent scale `k` flips sign with the sweep.
pub fn arc_segments(cx: f32, cy: f32, r: f32, a0: f32, a1: f32) -> Vec<ArcSegment> {
    let sweep = a1 - a0;
    if sweep == 0.0 {
        return Vec::new();
    }
    let steps = (sweep.abs() / std::f32::consts::FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / steps as f32;
    let k = 4.0 / 3.0 * (step / 4.0).tan();

    let mut out = Vec::with_capacity(steps);
    let mut a = a0;
    for _ in 0..steps {
        let b = a + step;
        let (sx, sy) = arc_point(cx, cy, r, a);
        let (ex, ey) = arc_point(cx, cy, r, b);
        out.push(ArcSegment {
            x1: sx - k * r * a.sin(),
            y1: sy + k * r * a.cos(),
            x2: ex + k * r * b.sin(),
            y2: ey - k * r * b.cos(),
            x: ex,
            y: ey,
        });
        a = b;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn bar_width_scales_linearly() {
        assert_eq!(bar_width(10, 10, 350.0), 350.0);
        assert_eq!(bar_width(5, 10, 350.0), 175.0);
        assert_eq!(bar_width(0, 10, 350.0), 0.0);
    }

    #[test]
    fn bar_width_is_monotonic_in_count() {
        let widths: Vec<f32> = (0..=10).map(|c| bar_width(c, 10, 350.0)).collect();
        for pair in widths.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn bar_width_guards_zero_max() {
        // All-zero chart data draws nothing rather than NaN.
        assert_eq!(bar_width(0, 0, 350.0), 0.0);
    }

    #[test]
    fn slices_accumulate_to_a_full_turn() {
        let counts = [3u64, 2, 1];
        let slices = pie_slices(&counts, 6);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].start, 0.0);
        for pair in slices.windows(2) {
            assert!((pair[0].end - pair[1].start).abs() < 1e-6);
        }
        assert!((slices[2].end - TAU).abs() < 1e-4);
        let total_fraction: f32 = slices.iter().map(|s| s.fraction).sum();
        assert!((total_fraction - 1.0).abs() < 1e-6);
    }

    #[test]
    fn partial_slices_never_exceed_a_turn() {
        // Top categories of a larger whole: 6 of 10 total.
        let slices = pie_slices(&[4, 2], 10);
        assert!(slices.last().unwrap().end < TAU);
    }

    #[test]
    fn zero_total_draws_no_slices() {
        assert!(pie_slices(&[0, 0], 0).is_empty());
    }

    #[test]
    fn percent_rounds_to_nearest() {
        let slices = pie_slices(&[1, 2], 3);
        assert_eq!(slices[0].percent(), 33);
        assert_eq!(slices[1].percent(), 67);
    }

    #[test]
    fn arc_segments_split_per_quarter_turn() {
        assert_eq!(arc_segments(0.0, 0.0, 100.0, 0.0, FRAC_PI_2).len(), 1);
        assert_eq!(arc_segments(0.0, 0.0, 100.0, 0.0, TAU).len(), 4);
        assert!(arc_segments(0.0, 0.0, 100.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn arc_segments_land_on_the_end_point() {
        let segs = arc_segments(200.0, 200.0, 100.0, 0.0, PI);
        let last = segs.last().unwrap();
        assert!((last.x - 100.0).abs() < 0.1);
        assert!((last.y - 200.0).abs() < 0.1);
    }

    #[test]
    fn clockwise_arcs_mirror_counterclockwise() {
        let ccw = arc_segments(0.0, 0.0, 50.0, 0.0, FRAC_PI_2);
        let cw = arc_segments(0.0, 0.0, 50.0, 0.0, -FRAC_PI_2);
        let (a, b) = (ccw.last().unwrap(), cw.last().unwrap());
        assert!((a.x - b.x).abs() < 1e-3);
        assert!((a.y + b.y).abs() < 1e-3);
    }
}
