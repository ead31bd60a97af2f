//! Recursive branch skeleton
//!
//! Grows a plant as a set of centerline paths. Each call walks one branch
//! forward in small jittered steps, then spawns diverging children from its
//! endpoint until `max_depth` is reached. Children start exactly at the
//! parent's endpoint with the parent's end thickness; the shell extractor
//! recovers those junctions from the coincident points.
//!
//! Screen convention: y grows downward, so "up" is the angle `-PI/2`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::core::error::{ensure_in_range, ensure_non_negative, ensure_positive, ensure_range};
use crate::core::types::DVec2;
use crate::core::{Error, Result};
use crate::math::{Aabb, Rng};

/// Straight up on screen.
pub const UP: f64 = -FRAC_PI_2;

/// Deepest recursion accepted by `SkeletonParams::validate`.
pub const MAX_DEPTH_LIMIT: u32 = 10;

/// One point of a branch centerline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterlinePoint {
    pub position: DVec2,
    pub thickness: f64,
}

impl CenterlinePoint {
    pub fn new(position: DVec2, thickness: f64) -> Self {
        Self { position, thickness }
    }
}

/// One trunk, branch or twig segment.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchPath {
    /// Index into `Skeleton::paths`
    pub id: usize,
    /// Recursion depth that produced this path (trunk = 0)
    pub depth: u32,
    pub points: Vec<CenterlinePoint>,
}

impl BranchPath {
    pub fn start(&self) -> Option<DVec2> {
        self.points.first().map(|p| p.position)
    }

    pub fn end(&self) -> Option<DVec2> {
        self.points.last().map(|p| p.position)
    }

    /// Polyline length of the path.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].position.distance(w[1].position))
            .sum()
    }
}

/// Branch skeleton growth parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonParams {
    /// Length of the trunk path
    pub trunk_length: f64,
    /// Thickness at the root point
    pub trunk_thickness: f64,
    /// Random lean of the trunk away from vertical, radians
    pub trunk_lean: f64,
    pub max_depth: u32,
    /// Children per branch are `1 + floor(rnd * branch_factor)`
    pub branch_factor: u32,
    /// Probability of one extra child
    pub extra_branch_chance: f64,
    /// Child length as a fraction of the parent length
    pub length_decay: (f64, f64),
    /// Per-step thickness multiplier
    pub thickness_decay: (f64, f64),
    /// Floor for thickness after every decay step
    pub min_thickness: f64,
    /// Base divergence of children from the parent direction, radians
    pub spread: f64,
    /// Per-step random turn, radians
    pub angle_jitter: f64,
    /// A path of length L walks `max(3, floor(L / segment_length))` steps
    pub segment_length: f64,
    /// Children shorter than this are dropped
    pub min_child_length: f64,
    /// Branching stops on endpoints closer than this to the root height
    pub min_branch_height: f64,
    /// Half-width of the allowed arc around straight up, radians
    pub upward_band: f64,
    /// Fraction of an out-of-band excursion reflected back into the band
    pub band_reflect: f64,
    /// Probability of a side twig from a mid-path point
    pub twig_chance: f64,
    /// Twig length as a fraction of its parent
    pub twig_length: f64,
}

impl Default for SkeletonParams {
    fn default() -> Self {
        Self {
            trunk_length: 110.0,
            trunk_thickness: 14.0,
            trunk_lean: 0.08,
            max_depth: 4,
            branch_factor: 3,
            extra_branch_chance: 0.2,
            length_decay: (0.45, 0.97),
            thickness_decay: (0.9, 0.97),
            min_thickness: 0.8,
            spread: 0.45,
            angle_jitter: 0.06,
            segment_length: 12.0,
            min_child_length: 8.0,
            min_branch_height: 40.0,
            upward_band: 1.2,
            band_reflect: 0.5,
            twig_chance: 0.15,
            twig_length: 0.3,
        }
    }
}

impl SkeletonParams {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("skeleton.trunk_length", self.trunk_length)?;
        ensure_positive("skeleton.trunk_thickness", self.trunk_thickness)?;
        ensure_positive("skeleton.min_thickness", self.min_thickness)?;
        ensure_positive("skeleton.segment_length", self.segment_length)?;
        ensure_positive("skeleton.min_child_length", self.min_child_length)?;
        ensure_positive("skeleton.twig_length", self.twig_length)?;
        ensure_in_range("skeleton.trunk_lean", self.trunk_lean, 0.0, FRAC_PI_2)?;
        ensure_in_range("skeleton.spread", self.spread, 0.0, PI)?;
        ensure_in_range("skeleton.angle_jitter", self.angle_jitter, 0.0, FRAC_PI_2)?;
        ensure_non_negative("skeleton.min_branch_height", self.min_branch_height)?;
        ensure_in_range("skeleton.upward_band", self.upward_band, 0.0, PI)?;
        ensure_in_range("skeleton.band_reflect", self.band_reflect, 0.0, 1.0)?;
        ensure_in_range("skeleton.extra_branch_chance", self.extra_branch_chance, 0.0, 1.0)?;
        ensure_in_range("skeleton.twig_chance", self.twig_chance, 0.0, 1.0)?;
        ensure_range("skeleton.length_decay", self.length_decay)?;
        ensure_range("skeleton.thickness_decay", self.thickness_decay)?;
        if self.length_decay.0 <= 0.0 {
            return Err(Error::config("skeleton.length_decay", "lower bound must be > 0"));
        }
        if self.thickness_decay.0 <= 0.0 {
            return Err(Error::config("skeleton.thickness_decay", "lower bound must be > 0"));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(Error::config(
                "skeleton.max_depth",
                format!("must be <= {MAX_DEPTH_LIMIT}, got {}", self.max_depth),
            ));
        }
        if self.branch_factor > 8 {
            return Err(Error::config(
                "skeleton.branch_factor",
                format!("must be <= 8, got {}", self.branch_factor),
            ));
        }
        Ok(())
    }
}

/// Complete grown skeleton.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skeleton {
    /// Every path, indexed by its id
    pub paths: Vec<BranchPath>,
    /// Terminal endpoints where canopy clusters start
    pub anchors: Vec<DVec2>,
}

impl Skeleton {
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Deepest path depth.
    pub fn max_depth(&self) -> u32 {
        self.paths.iter().map(|p| p.depth).max().unwrap_or(0)
    }

    /// Highest point on screen (smallest y), or the origin for an empty skeleton.
    pub fn crown(&self) -> DVec2 {
        self.paths
            .iter()
            .flat_map(|p| p.points.iter())
            .map(|p| p.position)
            .min_by(|a, b| a.y.total_cmp(&b.y))
            .unwrap_or(DVec2::ZERO)
    }

    /// Bounds of all centerline points inflated by their half thickness.
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        for point in self.paths.iter().flat_map(|p| p.points.iter()) {
            let r = DVec2::splat(point.thickness * 0.5);
            bounds.expand(point.position - r);
            bounds.expand(point.position + r);
        }
        bounds
    }

    fn push_path(&mut self, depth: u32, points: Vec<CenterlinePoint>) -> usize {
        let id = self.paths.len();
        self.paths.push(BranchPath { id, depth, points });
        id
    }
}

/// Wrap an angle into `(-PI, PI]`.
fn wrap_angle(angle: f64) -> f64 {
    let a = (angle + PI).rem_euclid(TAU) - PI;
    if a <= -PI { a + TAU } else { a }
}

/// Keep `angle` inside the upward arc `UP +- band`.
///
/// Angles already inside are returned unchanged. An angle that overshoots the
/// band edge by `excess` is reflected back to `band - excess * reflect` on the
/// same side, never past straight up.
pub fn clamp_upward(angle: f64, band: f64, reflect: f64) -> f64 {
    let offset = wrap_angle(angle - UP);
    let magnitude = offset.abs();
    if magnitude <= band {
        return UP + offset;
    }
    let excess = magnitude - band;
    let pulled = (band - excess * reflect).max(0.0);
    UP + pulled * offset.signum()
}

/// Skeleton builder. Every random draw comes from the caller's stream so the
/// result depends only on the stream's seed and the parameters.
pub struct SkeletonBuilder<'a> {
    params: &'a SkeletonParams,
}

impl<'a> SkeletonBuilder<'a> {
    pub fn new(params: &'a SkeletonParams) -> Self {
        Self { params }
    }

    /// Grow a full skeleton rooted at the origin.
    pub fn build(&self, rng: &mut Rng) -> Skeleton {
        let mut skeleton = Skeleton::default();
        let p = self.params;
        let angle = UP + rng.signed(p.trunk_lean);
        self.grow(rng, &mut skeleton, DVec2::ZERO, angle, p.trunk_length, p.trunk_thickness, 0);
        skeleton
    }

    /// Walk one path forward from `origin`. Returns the points and the final heading.
    fn walk(
        &self,
        rng: &mut Rng,
        origin: DVec2,
        mut angle: f64,
        length: f64,
        mut thickness: f64,
    ) -> (Vec<CenterlinePoint>, f64) {
        let p = self.params;
        let segments = ((length / p.segment_length).floor() as usize).max(3);
        let step = length / segments as f64;

        let mut points = Vec::with_capacity(segments + 1);
        let mut position = origin;
        points.push(CenterlinePoint::new(position, thickness));
        for _ in 0..segments {
            angle += rng.signed(p.angle_jitter);
            position += DVec2::from_angle(angle) * step;
            thickness = (thickness * rng.range(p.thickness_decay.0, p.thickness_decay.1)).max(p.min_thickness);
            points.push(CenterlinePoint::new(position, thickness));
        }
        (points, angle)
    }

    #[allow(clippy::too_many_arguments)]
    fn grow(
        &self,
        rng: &mut Rng,
        skeleton: &mut Skeleton,
        origin: DVec2,
        angle: f64,
        length: f64,
        thickness: f64,
        depth: u32,
    ) {
        let p = self.params;
        let (points, heading) = self.walk(rng, origin, angle, length, thickness);
        let end = points[points.len() - 1];
        let id = skeleton.push_path(depth, points);

        let too_low = depth > 0 && -end.position.y < p.min_branch_height;
        if depth >= p.max_depth || too_low {
            skeleton.anchors.push(end.position);
            return;
        }

        let mut children = 1 + (rng.next_f64() * p.branch_factor as f64).floor() as u32;
        if rng.chance(p.extra_branch_chance) {
            children += 1;
        }

        let mut grew_any = false;
        for k in 0..children {
            let side = if k % 2 == 0 { -1.0 } else { 1.0 };
            let rank = (k / 2 + 1) as f64;
            let diverge = side * p.spread * rank * rng.range(0.6, 1.0);
            let child_angle = clamp_upward(heading + diverge, p.upward_band, p.band_reflect);
            let child_length = length * rng.range(p.length_decay.0, p.length_decay.1);
            if child_length < p.min_child_length {
                continue;
            }
            grew_any = true;
            self.grow(rng, skeleton, end.position, child_angle, child_length, end.thickness, depth + 1);
        }
        if !grew_any {
            skeleton.anchors.push(end.position);
        }

        if rng.chance(p.twig_chance) {
            self.twig(rng, skeleton, id, length, depth + 1);
        }
    }

    /// Short side branch from an interior point of path `parent`. Twigs never branch.
    fn twig(&self, rng: &mut Rng, skeleton: &mut Skeleton, parent: usize, parent_length: f64, depth: u32) {
        let p = self.params;
        let (base, before) = {
            let points = &skeleton.paths[parent].points;
            if points.len() < 3 {
                return;
            }
            let i = 1 + rng.index(points.len() - 2);
            (points[i], points[i - 1])
        };
        let along = (base.position - before.position).to_angle();
        let side = if rng.chance(0.5) { -1.0 } else { 1.0 };
        let angle = clamp_upward(along + side * p.spread * 1.5, p.upward_band, p.band_reflect);
        let length = parent_length * p.twig_length;
        if length < p.min_child_length * 0.5 {
            return;
        }
        let thickness = (base.thickness * 0.6).max(p.min_thickness);
        let (points, _) = self.walk(rng, base.position, angle, length, thickness);
        let end = points[points.len() - 1].position;
        skeleton.push_path(depth, points);
        skeleton.anchors.push(end);
    }
}
