//! Drawing commands and the sink every generator draws into.

use crate::core::types::DVec2;
use crate::math::{Aabb, Polygon};

use super::Color;

/// Receiver of fill-path drawing commands.
///
/// A fill opened by `begin_fill` collects every `move_to`/`line_to` contour
/// and every `ellipse` until `end_fill`.
pub trait RenderSink {
    fn begin_fill(&mut self, color: Color, alpha: f64);
    fn move_to(&mut self, p: DVec2);
    fn line_to(&mut self, p: DVec2);
    fn ellipse(&mut self, center: DVec2, radii: DVec2, rotation: f64);
    fn end_fill(&mut self);

    fn circle(&mut self, center: DVec2, radius: f64) {
        self.ellipse(center, DVec2::splat(radius), 0.0);
    }

    /// Fill one closed polygon. Degenerate polygons draw nothing.
    fn fill_polygon(&mut self, polygon: &Polygon, color: Color, alpha: f64) {
        let Some((first, rest)) = polygon.points.split_first() else {
            return;
        };
        if polygon.is_degenerate() {
            return;
        }
        self.begin_fill(color, alpha);
        self.move_to(*first);
        for p in rest {
            self.line_to(*p);
        }
        self.end_fill();
    }
}

/// One recorded drawing command.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    BeginFill { color: Color, alpha: f64 },
    MoveTo(DVec2),
    LineTo(DVec2),
    Ellipse { center: DVec2, radii: DVec2, rotation: f64 },
    EndFill,
}

/// Recorded command list; the drawing payload of a scene node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of `BeginFill` commands.
    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::BeginFill { .. }))
            .count()
    }

    /// Send every command to `sink` in order.
    pub fn replay(&self, sink: &mut dyn RenderSink) {
        for cmd in &self.commands {
            match *cmd {
                DrawCommand::BeginFill { color, alpha } => sink.begin_fill(color, alpha),
                DrawCommand::MoveTo(p) => sink.move_to(p),
                DrawCommand::LineTo(p) => sink.line_to(p),
                DrawCommand::Ellipse { center, radii, rotation } => sink.ellipse(center, radii, rotation),
                DrawCommand::EndFill => sink.end_fill(),
            }
        }
    }

    /// Local-space bounds of everything drawn. Ellipses use their
    /// unrotated extent grown to the larger radius.
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::EMPTY;
        for cmd in &self.commands {
            match *cmd {
                DrawCommand::MoveTo(p) | DrawCommand::LineTo(p) => aabb.expand(p),
                DrawCommand::Ellipse { center, radii, .. } => {
                    let r = DVec2::splat(radii.x.max(radii.y));
                    aabb.expand(center - r);
                    aabb.expand(center + r);
                }
                _ => {}
            }
        }
        aabb
    }
}

impl RenderSink for DrawList {
    fn begin_fill(&mut self, color: Color, alpha: f64) {
        self.commands.push(DrawCommand::BeginFill { color, alpha });
    }

    fn move_to(&mut self, p: DVec2) {
        self.commands.push(DrawCommand::MoveTo(p));
    }

    fn line_to(&mut self, p: DVec2) {
        self.commands.push(DrawCommand::LineTo(p));
    }

    fn ellipse(&mut self, center: DVec2, radii: DVec2, rotation: f64) {
        self.commands.push(DrawCommand::Ellipse { center, radii, rotation });
    }

    fn end_fill(&mut self) {
        self.commands.push(DrawCommand::EndFill);
    }
}
