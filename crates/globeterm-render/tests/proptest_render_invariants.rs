#![forbid(unsafe_code)]

//! Property tests for rasterization and diffing.

use globeterm_globe::{ProjectedPoint, Terrain};
use globeterm_render::{Appearance, BufferDiff, RenderMode, Renderer, Theme};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn terrain() -> impl Strategy<Value = Terrain> {
    prop_oneof![
        Just(Terrain::Ocean),
        Just(Terrain::Land),
        Just(Terrain::Coastline),
        Just(Terrain::Ice),
    ]
}

fn point() -> impl Strategy<Value = ProjectedPoint> {
    (-5i32..45, -5i32..25, terrain(), 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(col, row, terrain, intensity, depth)| ProjectedPoint {
            col,
            row,
            terrain,
            intensity,
            depth,
        },
    )
}

fn frame() -> impl Strategy<Value = Vec<ProjectedPoint>> {
    proptest::collection::vec(point(), 0..200)
}

fn renderer(width: u16, height: u16) -> Renderer<Vec<u8>> {
    let look = Appearance::new(Theme::geography(), RenderMode::Block, false);
    Renderer::new(Vec::new(), look, width, height)
}

// ═════════════════════════════════════════════════════════════════════════
// Diff
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_flush_is_idle(first in frame(), second in frame()) {
        let mut r = renderer(40, 20);
        r.rasterize(first);
        r.diff_and_flush().unwrap();
        r.rasterize(second);
        r.diff_and_flush().unwrap();
        let written = r.writer().len();
        let stats = r.diff_and_flush().unwrap();
        prop_assert_eq!(stats.cells, 0);
        prop_assert_eq!(r.writer().len(), written);
    }

    #[test]
    fn flush_makes_front_match_frame(first in frame(), second in frame()) {
        let mut r = renderer(40, 20);
        r.rasterize(first);
        r.diff_and_flush().unwrap();
        r.rasterize(second.clone());
        let expected = r.back().clone();
        r.diff_and_flush().unwrap();
        prop_assert_eq!(r.front(), &expected);

        // The result equals a cold render of the same frame.
        let mut cold = renderer(40, 20);
        cold.rasterize(second);
        prop_assert_eq!(cold.back(), &expected);
    }

    #[test]
    fn resize_repaints_each_cell_once(
        pts in frame(),
        width in 1u16..60,
        height in 1u16..30,
    ) {
        let mut r = renderer(40, 20);
        r.rasterize(pts.clone());
        r.diff_and_flush().unwrap();
        r.resize(width, height);
        r.rasterize(pts);
        let stats = r.diff_and_flush().unwrap();
        prop_assert_eq!(stats.cells, usize::from(width) * usize::from(height));
        prop_assert_eq!(stats.runs, usize::from(height));
    }

    #[test]
    fn diff_positions_are_unique_and_sorted(a in frame(), b in frame()) {
        let mut ra = renderer(40, 20);
        let mut rb = renderer(40, 20);
        ra.rasterize(a);
        rb.rasterize(b);
        let diff = BufferDiff::compute(ra.back(), rb.back());
        let changes = diff.changes();
        prop_assert!(changes.windows(2).all(|w| (w[0].1, w[0].0) < (w[1].1, w[1].0)));
        let covered: usize = diff.runs().iter().map(|r| usize::from(r.len())).sum();
        prop_assert_eq!(covered, diff.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Rasterization
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn point_order_does_not_matter(mut pts in frame()) {
        // Ties in depth would make the winner order-dependent.
        pts.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        pts.dedup_by(|a, b| a.depth == b.depth);
        let mut forward = renderer(40, 20);
        forward.rasterize(pts.iter().copied());
        let mut reverse = renderer(40, 20);
        reverse.rasterize(pts.iter().rev().copied());
        prop_assert_eq!(forward.back(), reverse.back());
    }
}
