/*
 * Line Rasterization
 *
 * Integer line walk used by `WinDrawLine`. Both endpoints are inclusive. The
 * walk steps one pixel at a time along the major axis and rounds the minor
 * coordinate toward the start point's side, which makes the pixel set
 * independent of the direction the line is drawn in.
 *
 * Endpoints come straight from user registers, so the arithmetic is done
 * in 64 bits (128 for the slope product) and the walk only covers the part
 * of the major axis inside the clip area.
 */

use super::Vector2D;

/// Half-open pixel area `min..max` a line is clipped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub min: Vector2D,
    pub max: Vector2D,
}

impl ClipRect {
    pub const fn new(min: Vector2D, max: Vector2D) -> Self {
        Self { min, max }
    }

    /// Area of a window client region of `size`.
    pub const fn of_size(size: Vector2D) -> Self {
        Self { min: Vector2D::new(0, 0), max: size }
    }
}

/// Visit every pixel of the segment `p0`..=`p1` that lies inside `clip`.
pub fn draw_line(p0: Vector2D, p1: Vector2D, clip: ClipRect, mut plot: impl FnMut(Vector2D)) {
    let inside = |x: i64, y: i64| {
        (clip.min.x as i64..clip.max.x as i64).contains(&x)
            && (clip.min.y as i64..clip.max.y as i64).contains(&y)
    };

    // deltas count pixels, endpoints included
    let (x0, y0, x1, y1) = (p0.x as i64, p0.y as i64, p1.x as i64, p1.y as i64);
    let dx = x1 - x0 + (x1 - x0).signum();
    let dy = y1 - y0 + (y1 - y0).signum();

    if dx == 0 && dy == 0 {
        if inside(x0, y0) {
            plot(p0);
        }
        return;
    }

    if dx.abs() >= dy.abs() {
        let ((sx, sy), (ex, ey)) =
            if dx < 0 { ((x1, y1), (x0, y0)) } else { ((x0, y0), (x1, y1)) };
        let (num, den) = (dy * dx.signum(), dx.abs());
        let from = sx.max(clip.min.x as i64);
        let to = ex.min(clip.max.x as i64 - 1);
        for x in from..=to {
            let y = sy + minor_offset(num, x - sx, den, ey >= sy);
            if inside(x, y) {
                // both coordinates lie between the endpoints
                plot(Vector2D::new(x as i32, y as i32));
            }
        }
    } else {
        let ((sx, sy), (ex, ey)) =
            if dy < 0 { ((x1, y1), (x0, y0)) } else { ((x0, y0), (x1, y1)) };
        let (num, den) = (dx * dy.signum(), dy.abs());
        let from = sy.max(clip.min.y as i64);
        let to = ey.min(clip.max.y as i64 - 1);
        for y in from..=to {
            let x = sx + minor_offset(num, y - sy, den, ex >= sx);
            if inside(x, y) {
                plot(Vector2D::new(x as i32, y as i32));
            }
        }
    }
}

/// `num * step / den`, floored when the minor axis grows and ceiled when it
/// shrinks. The quotient is bounded by the minor delta, so it fits in i64.
fn minor_offset(num: i64, step: i64, den: i64, floor: bool) -> i64 {
    let n = num as i128 * step as i128;
    let d = den as i128;
    let q = if floor { n.div_euclid(d) } else { -(-n).div_euclid(d) };
    q as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn points(p0: (i32, i32), p1: (i32, i32)) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        draw_line(Vector2D::new(p0.0, p0.1), Vector2D::new(p1.0, p1.1), UNBOUNDED, |p| {
            out.push((p.x, p.y))
        });
        out
    }

    const UNBOUNDED: ClipRect = ClipRect::new(
        Vector2D::new(i32::MIN, i32::MIN),
        Vector2D::new(i32::MAX, i32::MAX),
    );

    fn clipped(p0: (i32, i32), p1: (i32, i32), clip: ClipRect) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        draw_line(Vector2D::new(p0.0, p0.1), Vector2D::new(p1.0, p1.1), clip, |p| {
            out.push((p.x, p.y))
        });
        out
    }

    #[test]
    fn shallow_line_includes_both_endpoints() {
        assert_eq!(points((0, 0), (4, 2)), [(0, 0), (1, 0), (2, 1), (3, 1), (4, 2)]);
    }

    #[test]
    fn reversed_line_covers_same_pixels() {
        let mut fwd = points((0, 0), (4, 2));
        let mut rev = points((4, 2), (0, 0));
        fwd.sort();
        rev.sort();
        assert_eq!(fwd, rev);
    }

    #[test]
    fn descending_line_rounds_toward_start() {
        assert_eq!(points((0, 0), (4, -2)), [(0, 0), (1, 0), (2, -1), (3, -1), (4, -2)]);
    }

    #[test]
    fn steep_line_walks_y() {
        assert_eq!(points((0, 0), (1, 3)), [(0, 0), (0, 1), (1, 2), (1, 3)]);
    }

    #[test]
    fn axis_aligned_and_single_point() {
        assert_eq!(points((2, 5), (2, 5)), [(2, 5)]);
        assert_eq!(points((3, 1), (0, 1)), [(0, 1), (1, 1), (2, 1), (3, 1)]);
        assert_eq!(points((1, 2), (1, 4)), [(1, 2), (1, 3), (1, 4)]);
    }

    #[test]
    fn long_diagonal_stays_on_diagonal() {
        let clip = ClipRect::of_size(Vector2D::new(100_000, 100_000));
        let pts = clipped((0, 0), (60_000, 60_000), clip);
        assert_eq!(pts.len(), 60_001);
        assert!(pts.iter().all(|&(x, y)| x == y));
    }

    #[test]
    fn full_width_span_is_clipped() {
        let clip = ClipRect::of_size(Vector2D::new(200, 100));
        let pts = clipped((-1, 0), (i32::MAX, 0), clip);
        assert_eq!(pts.len(), 200);
        assert_eq!(pts.first(), Some(&(0, 0)));
        assert_eq!(pts.last(), Some(&(199, 0)));
    }

    #[test]
    fn extreme_endpoints_do_not_overflow() {
        let clip = ClipRect::of_size(Vector2D::new(64, 64));
        let pts = clipped((i32::MIN, i32::MIN), (i32::MAX, i32::MAX), clip);
        assert_eq!(pts.len(), 64);
        assert!(pts.iter().all(|&(x, y)| x == y));
        assert!(clipped((i32::MAX, i32::MIN), (i32::MIN, i32::MAX), clip).len() <= 1);
    }

    #[test]
    fn clip_drops_outside_pixels() {
        let clip = ClipRect::of_size(Vector2D::new(3, 3));
        assert_eq!(clipped((-2, 0), (0, 0), clip), [(0, 0)]);
        assert!(clipped((5, 5), (5, 5), clip).is_empty());
        assert_eq!(clipped((1, -4), (1, 8), clip), [(1, 0), (1, 1), (1, 2)]);
    }
}
