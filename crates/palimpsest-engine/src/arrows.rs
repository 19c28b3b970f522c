//! Arrow geometry across panes.
//!
//! Each arrow endpoint is resolved to the centre of its range inside its own
//! pane, then pinned to that pane's visible viewport. A pinned endpoint means
//! the real target is scrolled out of view; the renderer shows such arrows
//! as a faint ghost (or not at all when `hide_offscreen_arrows` is set).

use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::document::PaneSurface;
use crate::model::{AnchorStatus, AnnotationId, AnnotationPosition, Arrow, ArrowStyle, LayerId};
use crate::panes::PaneArena;

pub const ARROW_OPACITY: f64 = 0.6;
pub const ARROW_OPACITY_OFFSCREEN: f64 = 0.15;
/// Distance between the two strokes of a double arrow, per side
pub const DOUBLE_LINE_OFFSET: f64 = 1.5;

/// Stroke attributes for an [`ArrowStyle`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowStyleAttrs {
    pub dash_array: Option<&'static str>,
    pub stroke_width: f64,
    pub is_double: bool,
}

impl ArrowStyle {
    pub fn attrs(self) -> ArrowStyleAttrs {
        match self {
            ArrowStyle::Dashed => ArrowStyleAttrs {
                dash_array: Some("8 4"),
                stroke_width: 2.0,
                is_double: false,
            },
            ArrowStyle::Dotted => ArrowStyleAttrs {
                dash_array: Some("2 4"),
                stroke_width: 2.0,
                is_double: false,
            },
            ArrowStyle::Double => ArrowStyleAttrs {
                dash_array: None,
                stroke_width: 1.0,
                is_double: true,
            },
            ArrowStyle::Solid => ArrowStyleAttrs {
                dash_array: None,
                stroke_width: 2.0,
                is_double: false,
            },
        }
    }
}

/// What the renderer needs to draw one arrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowRenderInput {
    pub layer_id: LayerId,
    pub arrow_id: AnnotationId,
    pub color: String,
    pub arrow_style: ArrowStyle,
    pub from: AnnotationPosition,
    pub to: AnnotationPosition,
}

/// Three-point arrow path in container coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowPath {
    pub start: Point,
    pub mid: Point,
    pub end: Point,
    pub from_clamped: bool,
    pub to_clamped: bool,
}

impl ArrowPath {
    fn new(from: ClampedPoint, to: ClampedPoint) -> Self {
        Self {
            start: from.point,
            mid: from.point.midpoint(to.point),
            end: to.point,
            from_clamped: from.clamped,
            to_clamped: to.clamped,
        }
    }

    pub fn any_endpoint_clamped(&self) -> bool {
        self.from_clamped || self.to_clamped
    }

    pub fn to_bez_path(&self) -> BezPath {
        polyline(self.start, self.mid, self.end)
    }

    /// SVG path data, `M x1 y1 L mx my L x2 y2`
    pub fn svg_d(&self) -> String {
        polyline_d(self.start, self.mid, self.end)
    }

    /// The two parallel strokes of a double arrow
    pub fn double_line_paths(&self, offset: f64) -> (BezPath, BezPath) {
        let first = segment_normal(self.start, self.mid);
        let second = segment_normal(self.mid, self.end);
        let mid_normal = normalize(first + second);

        let side = |sign: f64| {
            polyline(
                self.start + first * (offset * sign),
                self.mid + mid_normal * (offset * sign),
                self.end + second * (offset * sign),
            )
        };
        (side(1.0), side(-1.0))
    }
}

fn polyline(start: Point, mid: Point, end: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(mid);
    path.line_to(end);
    path
}

fn polyline_d(start: Point, mid: Point, end: Point) -> String {
    format!(
        "M {} {} L {} {} L {} {}",
        start.x, start.y, mid.x, mid.y, end.x, end.y
    )
}

fn normalize(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 0.0 { v / len } else { Vec2::ZERO }
}

/// Unit normal of the segment `a -> b`, zero for a degenerate segment
fn segment_normal(a: Point, b: Point) -> Vec2 {
    let d = b - a;
    normalize(Vec2::new(-d.y, d.x))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ClampedPoint {
    point: Point,
    clamped: bool,
}

/// Pin `point` to `viewport`; points on the boundary count as inside
fn clamp_to_viewport(point: Point, viewport: Rect) -> ClampedPoint {
    let inside = point.x >= viewport.x0
        && point.x <= viewport.x1
        && point.y >= viewport.y0
        && point.y <= viewport.y1;
    if inside {
        return ClampedPoint {
            point,
            clamped: false,
        };
    }
    ClampedPoint {
        point: Point::new(
            point.x.clamp(viewport.x0, viewport.x1),
            point.y.clamp(viewport.y0, viewport.y1),
        ),
        clamped: true,
    }
}

/// Centre of a range inside its pane, relative to the container origin
fn range_center<P: PaneSurface>(
    position: &AnnotationPosition,
    panes: &PaneArena<P>,
    container: Rect,
) -> Option<ClampedPoint> {
    let pane = panes.get(position.pane_index)?;
    if !position.fits(pane.len()) {
        return None;
    }
    let start = pane.coords_at(position.from)?;
    let end = pane.coords_at(position.to)?;

    let origin = container.origin().to_vec2();
    let center = Point::new((start.x0 + end.x1) / 2.0, start.center().y) - origin;
    let viewport = pane.visible_viewport() - origin;
    Some(clamp_to_viewport(center, viewport))
}

/// Resolve an arrow to a path, or `None` if either end cannot be resolved
pub fn compute_arrow_path<P: PaneSurface>(
    arrow: &Arrow,
    panes: &PaneArena<P>,
    container: Rect,
) -> Option<ArrowPath> {
    if arrow.status == AnchorStatus::Stale {
        return None;
    }
    let from = range_center(&arrow.from, panes, container)?;
    let to = range_center(&arrow.to, panes, container)?;
    Some(ArrowPath::new(from, to))
}

/// Overall arrow opacity given whether an endpoint had to be pinned
pub fn arrow_opacity(any_endpoint_clamped: bool, hide_offscreen_arrows: bool) -> f64 {
    match (any_endpoint_clamped, hide_offscreen_arrows) {
        (false, _) => ARROW_OPACITY,
        (true, false) => ARROW_OPACITY_OFFSCREEN,
        (true, true) => 0.0,
    }
}
