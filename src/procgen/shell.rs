//! Shell polygons from centerline paths
//!
//! Every centerline point is offset left and right by half its thickness
//! along a normal. Points of different paths that land in the same junction
//! bucket share one averaged normal, so branches meet their parent without
//! cracks or overlaps.

use std::collections::HashMap;

use super::skeleton::{BranchPath, CenterlinePoint};
use crate::core::types::DVec2;
use crate::math::Polygon;

/// Bucket size used to detect coincident junction points.
pub const JUNCTION_EPSILON: f64 = 0.5;

/// Minimum segment length treated as a usable direction.
const DEGENERATE_SEGMENT: f64 = 1e-9;

/// Quantized junction bucket for a point.
pub fn junction_key(p: DVec2) -> (i64, i64) {
    (
        (p.x / JUNCTION_EPSILON).round() as i64,
        (p.y / JUNCTION_EPSILON).round() as i64,
    )
}

/// Unit tangent at every point of a path.
///
/// Points look toward their successor; the last point, and any point whose
/// successor coincides with it, look back from their predecessor. A point
/// with no usable neighbour gets `DVec2::ZERO`.
pub fn tangents(points: &[CenterlinePoint]) -> Vec<DVec2> {
    (0..points.len())
        .map(|i| {
            let here = points[i].position;
            let forward = points.get(i + 1).map(|n| n.position - here);
            match forward {
                Some(d) if d.length() > DEGENERATE_SEGMENT => d.normalize(),
                _ => {
                    let back = i.checked_sub(1).map(|j| here - points[j].position);
                    match back {
                        Some(d) if d.length() > DEGENERATE_SEGMENT => d.normalize(),
                        _ => DVec2::ZERO,
                    }
                }
            }
        })
        .collect()
}

/// Shared normals, one per junction bucket.
#[derive(Clone, Debug, Default)]
pub struct JunctionNormals {
    normals: HashMap<(i64, i64), DVec2>,
}

impl JunctionNormals {
    /// Average the tangents of every occurrence of each bucket and take the
    /// perpendicular. Buckets whose tangents cancel out get no normal.
    pub fn build(paths: &[BranchPath]) -> Self {
        let mut sums: HashMap<(i64, i64), DVec2> = HashMap::new();
        for path in paths {
            for (point, tangent) in path.points.iter().zip(tangents(&path.points)) {
                *sums.entry(junction_key(point.position)).or_insert(DVec2::ZERO) += tangent;
            }
        }

        let normals = sums
            .into_iter()
            .filter_map(|(key, sum)| {
                let tangent = sum.normalize_or_zero();
                (tangent != DVec2::ZERO).then(|| (key, tangent.perp()))
            })
            .collect();
        Self { normals }
    }

    /// Shared unit normal at a point, if its bucket has one.
    pub fn normal_at(&self, p: DVec2) -> Option<DVec2> {
        self.normals.get(&junction_key(p)).copied()
    }

    pub fn len(&self) -> usize {
        self.normals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normals.is_empty()
    }
}

/// Offset outline of one path.
#[derive(Clone, Debug, PartialEq)]
pub struct Shell {
    /// Id of the source path
    pub path_id: usize,
    pub left: Vec<DVec2>,
    pub right: Vec<DVec2>,
}

impl Shell {
    /// Closed polygon: left side forward, right side backward.
    pub fn polygon(&self) -> Polygon {
        let mut points = Vec::with_capacity(self.left.len() + self.right.len());
        points.extend_from_slice(&self.left);
        points.extend(self.right.iter().rev());
        Polygon::new(points)
    }
}

/// Offset one path using the shared normals, falling back to the local perpendicular.
pub fn offset_path(path: &BranchPath, normals: &JunctionNormals) -> Shell {
    let local = tangents(&path.points);
    let mut left = Vec::with_capacity(path.points.len());
    let mut right = Vec::with_capacity(path.points.len());

    for (point, tangent) in path.points.iter().zip(local) {
        let normal = normals
            .normal_at(point.position)
            .or_else(|| (tangent != DVec2::ZERO).then(|| tangent.perp()))
            .unwrap_or(DVec2::X);
        let half = normal * (point.thickness * 0.5);
        left.push(point.position + half);
        right.push(point.position - half);
    }

    Shell { path_id: path.id, left, right }
}

/// Build one shell per path. Paths with fewer than two points are skipped.
pub fn extract_shells(paths: &[BranchPath]) -> Vec<Shell> {
    let normals = JunctionNormals::build(paths);
    paths
        .iter()
        .filter(|path| {
            if path.points.len() < 2 {
                log::trace!("Skipping path {} with {} points", path.id, path.points.len());
                return false;
            }
            true
        })
        .map(|path| offset_path(path, &normals))
        .collect()
}
