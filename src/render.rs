// Canvas drawing for the scene, applied once per animation frame.
use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use crate::model::{Palette, Point, Transform};
use crate::scene::{Connector, Node, NodeRole, Scene, TreeGroup};

const CHILD_FILL: &str = "#4a90e2";
const PARENT_FILL: &str = "#e94e77";
const CONNECTOR_STROKE: &str = "#888888";

/// Resting vs hovered emphasis for one group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupStyle {
    pub node_stroke: f64,
    pub connector_alpha: f64,
}

impl GroupStyle {
    pub fn for_hover(hovered: bool) -> Self {
        if hovered {
            Self {
                node_stroke: 3.0,
                connector_alpha: 1.0,
            }
        } else {
            Self {
                node_stroke: 1.0,
                connector_alpha: 0.55,
            }
        }
    }
}

/// Device pixels per CSS pixel; anything unusable falls back to 1.
pub fn pixel_ratio(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 { raw } else { 1.0 }
}

/// Canvas matrix `(a, b, c, d, e, f)` that places group-local coordinates
/// at `origin` under `view`, in device pixels.
pub fn group_matrix(view: Transform, origin: Point, ratio: f64) -> [f64; 6] {
    let at = view.apply(origin);
    let k = view.k * ratio;
    [k, 0.0, 0.0, k, at.x * ratio, at.y * ratio]
}

pub struct Frame<'a> {
    pub scene: &'a Scene,
    pub transform: Transform,
    pub hovered: Option<usize>,
    pub palette: Palette,
    pub now: f64,
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

pub fn draw(ctx: &CanvasRenderingContext2d, frame: &Frame<'_>) {
    let r = frame.pixel_ratio;
    ctx.set_transform(r, 0.0, 0.0, r, 0.0, 0.0).ok();
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(frame.palette.background);
    ctx.fill_rect(0.0, 0.0, frame.width, frame.height);

    let t = frame.transform;
    ctx.set_font("13px sans-serif");
    ctx.set_text_align("center");
    for (i, group) in frame.scene.groups.iter().enumerate() {
        let style = GroupStyle::for_hover(frame.hovered == Some(i));
        let [a, b, c, d, e, f] = group_matrix(t, group.origin, r);
        ctx.set_transform(a, b, c, d, e, f).ok();
        draw_group(ctx, frame, group, style);
    }
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    ctx.set_global_alpha(1.0);
    ctx.set_text_align("start");
}

fn draw_group(ctx: &CanvasRenderingContext2d, frame: &Frame<'_>, g: &TreeGroup, style: GroupStyle) {
    ctx.set_global_alpha(style.connector_alpha);
    ctx.set_stroke_style_str(CONNECTOR_STROKE);
    ctx.set_line_width(1.0);
    for c in &g.connectors {
        ctx.begin_path();
        ctx.move_to(c.from.x, c.from.y);
        ctx.line_to(c.to.x, c.to.y);
        ctx.stroke();
    }
    ctx.set_global_alpha(1.0);
    for c in &g.connectors {
        draw_particles(ctx, frame, c);
    }
    for node in g.parents.iter().chain(std::iter::once(&g.child)) {
        draw_node(ctx, node, style, frame.palette);
    }
}

fn draw_particles(ctx: &CanvasRenderingContext2d, frame: &Frame<'_>, c: &Connector) {
    let cfg = &frame.scene.particles;
    ctx.set_fill_style_str(frame.palette.particle);
    for p in &c.particles {
        let Some(s) = p.sample(frame.now, c.from, c.to, cfg) else {
            continue;
        };
        ctx.set_global_alpha(s.opacity);
        ctx.begin_path();
        ctx.arc(s.at.x, s.at.y, cfg.radius, 0.0, PI * 2.0).ok();
        ctx.fill();
    }
    ctx.set_global_alpha(1.0);
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &Node, style: GroupStyle, palette: Palette) {
    let fill = match node.role {
        NodeRole::Parent => PARENT_FILL,
        NodeRole::Child => CHILD_FILL,
    };
    ctx.begin_path();
    ctx.set_fill_style_str(fill);
    ctx.arc(node.center.x, node.center.y, node.radius, 0.0, PI * 2.0)
        .ok();
    ctx.fill();
    ctx.set_stroke_style_str(palette.foreground);
    ctx.set_line_width(style.node_stroke);
    ctx.stroke();
    draw_label(ctx, node.label, node.label_at, palette);
}

fn draw_label(ctx: &CanvasRenderingContext2d, text: &str, at: Point, palette: Palette) {
    ctx.set_fill_style_str(palette.foreground);
    ctx.fill_text(text, at.x, at.y).ok();
}
