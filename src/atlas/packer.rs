use std::cmp::Ordering;

use glam::Vec2;
use tracing::debug;

use crate::error::{LumelError, Result};
use crate::types::{LightmapTriangle, TriangleFootprint, ATLAS_PALETTE};

/// Pixels of clearance between a placed triangle and the next anchor.
const PADDING: i32 = 2;

/// Outcome of a packing run over one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct PackResult {
    /// Pixel-space outlines in placement order (tallest first).
    pub footprints: Vec<TriangleFootprint>,
    /// Number of shelf rows the atlas consumed.
    pub shelf_count: usize,
}

/// Pack flattened triangles into a `width` x `height` pixel atlas and write
/// the resulting normalized coordinates into each triangle's `uvs`.
///
/// Triangles are placed tallest-first onto shelves. Within a shelf every
/// second triangle is mirrored vertically and anchored against the previous
/// triangle's base or apex corner, whichever the slope comparison picks, so
/// that slanted edges nest instead of wasting the gap between them. On
/// return the slice is restored to mesh order.
pub fn pack(
    triangles: &mut [LightmapTriangle],
    width: u32,
    height: u32,
) -> Result<PackResult> {
    triangles.sort_by(by_height_desc);

    let mut packer = Packer::new(width as i32, height as i32);
    let mut footprints = Vec::with_capacity(triangles.len());
    for tri in triangles.iter_mut() {
        footprints.push(packer.place(tri)?);
    }

    triangles.sort_by(by_source_index);

    debug!(
        triangles = triangles.len(),
        shelves = packer.shelf_count,
        "Packed triangles into atlas shelves"
    );
    Ok(PackResult {
        footprints,
        shelf_count: packer.shelf_count,
    })
}

/// Tallest first; equal heights keep mesh order.
fn by_height_desc(a: &LightmapTriangle, b: &LightmapTriangle) -> Ordering {
    b.height
        .partial_cmp(&a.height)
        .unwrap_or(Ordering::Equal)
        .then(a.source_index.cmp(&b.source_index))
}

fn by_source_index(a: &LightmapTriangle, b: &LightmapTriangle) -> Ordering {
    a.source_index.cmp(&b.source_index)
}

struct Packer {
    width: i32,
    height: i32,
    /// Top of the current shelf row, in pixels.
    v: i32,
    row_height: i32,
    /// Floored x of the previous triangle's base-end corner.
    u_bottom: i32,
    /// Floored x of the previous triangle's apex corner.
    u_top: i32,
    dp_prev: f32,
    flip: bool,
    color_index: usize,
    shelf_count: usize,
    /// Footprints placed in the current row, for the overlap guard.
    row: Vec<TriangleFootprint>,
    /// Rightmost x any corner in the current row has reached.
    frontier: f32,
}

impl Packer {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            v: 0,
            row_height: 0,
            u_bottom: -PADDING,
            u_top: -PADDING,
            dp_prev: 1.0,
            flip: false,
            color_index: 0,
            shelf_count: 0,
            row: Vec::new(),
            frontier: 0.0,
        }
    }

    fn place(&mut self, tri: &mut LightmapTriangle) -> Result<TriangleFootprint> {
        let tri_width = round_px(tri.width);
        let tri_height = round_px(tri.height);

        if self.shelf_count == 0 {
            self.shelf_count = 1;
            self.row_height = tri_height.max(1);
        }

        // Anchor selection: compare the apex direction out of the base-end
        // corner against the base direction. A steeper slope than the
        // previous triangle tucks against the base-end corner, otherwise
        // against the apex corner.
        let to_origin = (tri.local[0] - tri.local[1]).normalize_or_zero();
        let to_apex = (tri.local[2] - tri.local[1]).normalize_or_zero();
        let dp = to_apex.dot(to_origin);

        let anchor = if dp < self.dp_prev {
            self.u_bottom
        } else {
            self.u_top
        };
        let mut u = anchor + PADDING;

        if u + tri_width > self.width {
            self.advance_shelf(tri_height);
            u = 0;
        }

        let mut corners = self.place_corners(tri, u, tri_height);

        // The anchor heuristic can pull a mirrored triangle over its
        // predecessor. Retreat to the row frontier when that happens.
        if self.overlaps_row(&corners) {
            u = self.frontier.floor() as i32 + PADDING;
            if u + tri_width > self.width {
                self.advance_shelf(tri_height);
                u = 0;
            }
            corners = self.place_corners(tri, u, tri_height);
        }

        if u + tri_width > self.width {
            return Err(LumelError::AtlasOverflow {
                triangle: tri.source_index,
                needed: tri_width as u32,
                limit: self.width as u32,
                axis: "width",
            });
        }
        if self.v + tri_height > self.height {
            return Err(LumelError::AtlasOverflow {
                triangle: tri.source_index,
                needed: (self.v + tri_height) as u32,
                limit: self.height as u32,
                axis: "height",
            });
        }

        let scale = Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32);
        tri.uvs = corners.map(|c| c * scale);

        let footprint = TriangleFootprint {
            corners,
            color_index: self.color_index,
            source_index: tri.source_index,
        };
        self.row.push(footprint);

        for corner in &corners {
            self.frontier = self.frontier.max(corner.x);
        }
        self.u_bottom = corners[1].x.floor() as i32;
        self.u_top = corners[2].x.floor() as i32;
        self.dp_prev = dp;
        self.flip = !self.flip;
        self.color_index = (self.color_index + 1) % ATLAS_PALETTE.len();

        Ok(footprint)
    }

    fn advance_shelf(&mut self, tri_height: i32) {
        self.v += self.row_height;
        self.row_height = tri_height.max(1);
        self.shelf_count += 1;
        self.row.clear();
        self.frontier = 0.0;
    }

    /// Resolve the pixel-space corners for a placement at column `u`.
    /// Mirroring happens in local space so the triangle stays inside its
    /// own row band.
    fn place_corners(&self, tri: &LightmapTriangle, u: i32, tri_height: i32) -> [Vec2; 3] {
        let offset = Vec2::new(u as f32, self.v as f32);
        tri.local.map(|p| {
            let p = if self.flip {
                Vec2::new(p.x, tri_height as f32 - p.y)
            } else {
                p
            };
            p + offset
        })
    }

    fn overlaps_row(&self, corners: &[Vec2; 3]) -> bool {
        self.row
            .iter()
            .any(|placed| triangles_overlap(&placed.corners, corners))
    }
}

/// Separating-axis test for two triangles. Zero-area slivers never count as
/// overlapping; shared edges and corners do not either.
fn triangles_overlap(a: &[Vec2; 3], b: &[Vec2; 3]) -> bool {
    if twice_area(a) < f32::EPSILON || twice_area(b) < f32::EPSILON {
        return false;
    }
    !(separated_by_edges(a, b) || separated_by_edges(b, a))
}

fn twice_area(tri: &[Vec2; 3]) -> f32 {
    (tri[1] - tri[0]).perp_dot(tri[2] - tri[0]).abs()
}

fn separated_by_edges(edges_of: &[Vec2; 3], other: &[Vec2; 3]) -> bool {
    for e in 0..3 {
        let axis = (edges_of[(e + 1) % 3] - edges_of[e]).perp();
        let (a_min, a_max) = project_onto(edges_of, axis);
        let (b_min, b_max) = project_onto(other, axis);
        if a_max <= b_min || b_max <= a_min {
            return true;
        }
    }
    false
}

fn project_onto(tri: &[Vec2; 3], axis: Vec2) -> (f32, f32) {
    let first = tri[0].dot(axis);
    tri[1..].iter().fold((first, first), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Round half-up to a pixel count, matching the rasterizer's pixel centers.
fn round_px(value: f32) -> i32 {
    (value + 0.5) as i32
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::atlas::projector::project_triangle;

    fn planar(corners: [[f32; 2]; 3], source_index: usize) -> LightmapTriangle {
        project_triangle(
            [
                Vec3::new(corners[0][0], corners[0][1], 0.0),
                Vec3::new(corners[1][0], corners[1][1], 0.0),
                Vec3::new(corners[2][0], corners[2][1], 0.0),
            ],
            source_index,
        )
    }

    // Shelf bands reserve whole pixels while corners keep float precision,
    // so a corner may overhang its band by rounding noise. Shrink slightly
    // toward the centroid before the strict test.
    fn shrunk(corners: &[Vec2; 3]) -> [Vec2; 3] {
        let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
        corners.map(|p| centroid + (p - centroid) * 0.995)
    }

    fn assert_pairwise_disjoint(footprints: &[TriangleFootprint]) {
        for i in 0..footprints.len() {
            for j in (i + 1)..footprints.len() {
                assert!(
                    !triangles_overlap(&shrunk(&footprints[i].corners), &shrunk(&footprints[j].corners)),
                    "footprints {i} and {j} overlap: {:?} vs {:?}",
                    footprints[i].corners,
                    footprints[j].corners
                );
            }
        }
    }

    #[test]
    fn single_triangle_lands_at_origin() {
        let mut triangles = vec![planar([[0.0, 0.0], [10.0, 0.0], [5.0, 5.0]], 0)];
        let result = pack(&mut triangles, 64, 64).unwrap();

        assert_eq!(result.shelf_count, 1);
        assert_eq!(triangles[0].uvs[0], Vec2::ZERO);
        for uv in triangles[0].uvs {
            assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y));
        }
    }

    #[test]
    fn unit_right_triangle_packs_inside_the_atlas() {
        // Hypotenuse base: local extents sqrt(2) x sqrt(2)/2, well under a
        // single pixel cell after rounding.
        let mut triangles = vec![planar([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]], 0)];
        let result = pack(&mut triangles, 64, 64).unwrap();

        assert_eq!(result.shelf_count, 1);
        assert_eq!(triangles[0].longest_edge, 1);
        for uv in triangles[0].uvs {
            assert!((0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y));
        }
    }

    #[test]
    fn slice_is_restored_to_mesh_order() {
        let mut triangles = vec![
            planar([[0.0, 0.0], [8.0, 0.0], [4.0, 2.0]], 0),
            planar([[0.0, 0.0], [8.0, 0.0], [4.0, 6.0]], 1),
            planar([[0.0, 0.0], [8.0, 0.0], [4.0, 4.0]], 2),
        ];
        pack(&mut triangles, 128, 128).unwrap();

        for (i, tri) in triangles.iter().enumerate() {
            assert_eq!(tri.source_index, i);
            assert_ne!(tri.uvs, [Vec2::ZERO; 3], "triangle {i} was never placed");
        }
    }

    #[test]
    fn interlock_nests_mirrored_triangle_before_frontier() {
        // Identical isosceles triangles: the second is mirrored and anchored
        // at the first's apex column, left of the first's rightmost corner.
        let mut triangles = vec![
            planar([[0.0, 0.0], [10.0, 0.0], [5.0, 5.0]], 0),
            planar([[0.0, 0.0], [10.0, 0.0], [5.0, 5.0]], 1),
        ];
        let result = pack(&mut triangles, 64, 64).unwrap();

        let second = &result.footprints[1];
        assert_eq!(second.corners[0].y, 5.0, "second placement should be mirrored");
        assert!(second.corners[2].y.abs() < 1e-4, "apex should mirror to the base line");
        assert!(
            second.corners[0].x > 0.0 && second.corners[0].x < 10.0,
            "should nest before the first triangle's right edge, got {}",
            second.corners[0].x
        );
        assert_pairwise_disjoint(&result.footprints);
    }

    #[test]
    fn overlap_guard_retreats_to_frontier() {
        // Sharply obtuse twins: the apex anchor would sink the mirrored
        // second triangle into the first, so it must restart past the
        // frontier instead.
        let mut triangles = vec![
            planar([[0.0, 0.0], [14.0, 0.0], [1.0, 5.0]], 0),
            planar([[0.0, 0.0], [14.0, 0.0], [1.0, 5.0]], 1),
        ];
        let result = pack(&mut triangles, 64, 64).unwrap();

        assert!(result.footprints[1].corners.iter().all(|c| c.x >= 16.0));
        assert_pairwise_disjoint(&result.footprints);
    }

    #[test]
    fn packed_triangles_never_overlap() {
        let shapes: [[[f32; 2]; 3]; 6] = [
            [[0.0, 0.0], [9.0, 0.0], [4.5, 4.0]],
            [[0.0, 0.0], [14.0, 0.0], [1.0, 5.0]],
            [[0.0, 0.0], [7.0, 0.0], [3.5, 6.0]],
            [[0.0, 0.0], [14.0, 0.0], [1.0, 5.0]],
            [[0.0, 0.0], [11.0, 0.0], [9.0, 3.0]],
            [[0.0, 0.0], [6.0, 0.0], [3.0, 5.0]],
        ];
        let mut triangles: Vec<LightmapTriangle> = shapes
            .iter()
            .enumerate()
            .map(|(i, s)| planar(*s, i))
            .collect();

        let result = pack(&mut triangles, 64, 64).unwrap();
        assert_eq!(result.footprints.len(), 6);
        assert_pairwise_disjoint(&result.footprints);
    }

    #[test]
    fn packing_is_deterministic() {
        let shapes: [[[f32; 2]; 3]; 4] = [
            [[0.0, 0.0], [9.0, 0.0], [4.5, 4.0]],
            [[0.0, 0.0], [7.0, 0.0], [3.5, 6.0]],
            [[0.0, 0.0], [11.0, 0.0], [9.0, 3.0]],
            [[0.0, 0.0], [6.0, 0.0], [3.0, 5.0]],
        ];
        let build = || -> Vec<LightmapTriangle> {
            shapes
                .iter()
                .enumerate()
                .map(|(i, s)| planar(*s, i))
                .collect()
        };

        let mut first = build();
        let mut second = build();
        let result_a = pack(&mut first, 128, 128).unwrap();
        let result_b = pack(&mut second, 128, 128).unwrap();

        assert_eq!(first, second);
        assert_eq!(result_a, result_b);
    }

    #[test]
    fn triangle_wider_than_atlas_overflows() {
        let mut triangles = vec![planar([[0.0, 0.0], [100.0, 0.0], [50.0, 10.0]], 0)];
        let err = pack(&mut triangles, 64, 64).unwrap_err();
        assert!(matches!(
            err,
            LumelError::AtlasOverflow {
                axis: "width",
                needed: 100,
                limit: 64,
                ..
            }
        ));
    }

    #[test]
    fn triangle_taller_than_atlas_overflows() {
        // Fits the 128px width but not the 16px height.
        let mut triangles = vec![planar([[0.0, 0.0], [100.0, 0.0], [50.0, 40.0]], 0)];
        let err = pack(&mut triangles, 128, 16).unwrap_err();
        assert!(matches!(
            err,
            LumelError::AtlasOverflow {
                axis: "height",
                needed: 40,
                limit: 16,
                ..
            }
        ));
    }

    #[test]
    fn accumulated_shelves_overflow_height() {
        // Each triangle claims a fresh 8px shelf in a 24px wide atlas; the
        // third shelf would end at 24px, past the 20px height.
        let mut triangles: Vec<LightmapTriangle> = (0..3)
            .map(|i| planar([[0.0, 0.0], [20.0, 0.0], [10.0, 8.0]], i))
            .collect();
        let err = pack(&mut triangles, 24, 20).unwrap_err();
        assert!(matches!(
            err,
            LumelError::AtlasOverflow {
                axis: "height",
                needed: 24,
                limit: 20,
                ..
            }
        ));
    }

    #[test]
    fn full_rows_spill_onto_new_shelves() {
        let mut triangles: Vec<LightmapTriangle> = (0..12)
            .map(|i| planar([[0.0, 0.0], [20.0, 0.0], [10.0, 8.0]], i))
            .collect();
        let result = pack(&mut triangles, 64, 64).unwrap();

        assert!(result.shelf_count > 1);
        for footprint in &result.footprints {
            for corner in footprint.corners {
                assert!(corner.x >= -0.5 && corner.x <= 64.5, "{corner:?}");
                assert!(corner.y >= -0.5 && corner.y <= 64.5, "{corner:?}");
            }
        }
        assert_pairwise_disjoint(&result.footprints);
    }

    #[test]
    fn degenerate_slivers_pack_without_panic() {
        let mut triangles = vec![
            planar([[0.0, 0.0], [10.0, 0.0], [5.0, 5.0]], 0),
            // Collinear: zero height.
            planar([[0.0, 0.0], [4.0, 0.0], [8.0, 0.0]], 1),
            // Coincident: zero size.
            planar([[2.0, 2.0], [2.0, 2.0], [2.0, 2.0]], 2),
        ];
        let result = pack(&mut triangles, 64, 64).unwrap();

        assert_eq!(result.footprints.len(), 3);
        for tri in &triangles {
            for uv in tri.uvs {
                assert!(uv.x.is_finite() && uv.y.is_finite());
            }
        }
    }

    #[test]
    fn empty_input_uses_no_shelves() {
        let mut triangles: Vec<LightmapTriangle> = Vec::new();
        let result = pack(&mut triangles, 64, 64).unwrap();
        assert_eq!(result.shelf_count, 0);
        assert!(result.footprints.is_empty());
    }

    #[test]
    fn separating_axis_test_basics() {
        let a = [Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(2.0, 3.0)];
        let shifted = a.map(|p| p + Vec2::new(10.0, 0.0));
        let poked = a.map(|p| p + Vec2::new(1.0, 1.0));
        let touching = a.map(|p| p + Vec2::new(4.0, 0.0));

        assert!(!triangles_overlap(&a, &shifted));
        assert!(triangles_overlap(&a, &poked));
        assert!(!triangles_overlap(&a, &touching));

        let sliver = [Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(8.0, 0.0)];
        assert!(!triangles_overlap(&a, &sliver));
    }
}
