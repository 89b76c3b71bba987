use crate::error::Result;
use crate::ir::{GraphSnapshot, Place, Road, RoutePath};
use crate::layout::{Layout, NodePosition, Positions};
use crate::theme::Theme;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    /// Round caps and joins.
    pub round: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Middle,
    Top,
}

/// Text is always horizontally centered on its anchor point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub color: String,
    pub font_family: String,
    pub font_size: f64,
    pub baseline: TextBaseline,
}

/// A 2D drawing target. Later calls paint over earlier ones.
pub trait Surface {
    fn size(&self) -> (f64, f64);
    fn resize(&mut self, width: f64, height: f64);
    /// Drops everything drawn so far and fills the whole surface.
    fn clear(&mut self, color: &str);
    fn line(&mut self, from: NodePosition, to: NodePosition, stroke: &Stroke);
    fn polyline(&mut self, points: &[NodePosition], stroke: &Stroke);
    fn circle(&mut self, center: NodePosition, radius: f64, fill: &str, stroke: &Stroke);
    fn text(&mut self, at: NodePosition, content: &str, style: &TextStyle);
}

/// Draws one frame: background, roads with cost labels, the highlighted
/// route, then places with their names.
pub fn render_map<S: Surface + ?Sized>(
    surface: &mut S,
    graph: &GraphSnapshot,
    positions: &Positions,
    route: &RoutePath,
    theme: &Theme,
) {
    render(surface, &graph.places, &graph.roads, positions, route, theme);
}

pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    places: &[Place],
    roads: &[Road],
    positions: &Positions,
    route: &RoutePath,
    theme: &Theme,
) {
    surface.clear(&theme.background);

    let road_stroke = Stroke {
        color: theme.road_color.clone(),
        width: theme.road_width,
        round: false,
    };
    let cost_style = TextStyle {
        color: theme.cost_label_color.clone(),
        font_family: theme.mono_font_family.clone(),
        font_size: theme.cost_font_size,
        baseline: TextBaseline::Middle,
    };
    let mut skipped_roads = 0usize;
    for road in roads {
        let (Some(a), Some(b)) = (positions.get(&road.from), positions.get(&road.to)) else {
            skipped_roads += 1;
            continue;
        };
        surface.line(*a, *b, &road_stroke);
        let mid = a.midpoint(b);
        surface.text(
            NodePosition::new(mid.x, mid.y - 2.0),
            &format_cost(road.cost),
            &cost_style,
        );
    }

    let skipped_hops = if route.len() >= 2 {
        draw_route(surface, route, positions, theme)
    } else {
        0
    };

    let node_stroke = Stroke {
        color: theme.node_stroke.clone(),
        width: theme.node_stroke_width,
        round: false,
    };
    let label_style = TextStyle {
        color: theme.node_label_color.clone(),
        font_family: theme.font_family.clone(),
        font_size: theme.node_font_size,
        baseline: TextBaseline::Top,
    };
    for place in places {
        let Some(pos) = positions.get(&place.name) else {
            continue;
        };
        surface.circle(*pos, theme.node_radius, &theme.node_fill, &node_stroke);
        surface.text(
            NodePosition::new(pos.x, pos.y + theme.node_label_offset),
            &place.name,
            &label_style,
        );
    }

    if skipped_roads > 0 || skipped_hops > 0 {
        tracing::debug!(skipped_roads, skipped_hops, "skipped elements with unknown places");
    }
}

/// Strokes each run of consecutive resolvable hops as one polyline and
/// returns the number of hops left out.
fn draw_route<S: Surface + ?Sized>(
    surface: &mut S,
    route: &RoutePath,
    positions: &Positions,
    theme: &Theme,
) -> usize {
    let stroke = Stroke {
        color: theme.route_color.clone(),
        width: theme.route_width,
        round: true,
    };
    let mut skipped = 0usize;
    let mut run: Vec<NodePosition> = Vec::new();
    for (from, to) in route.hops() {
        match (positions.get(from), positions.get(to)) {
            (Some(a), Some(b)) => {
                if run.is_empty() {
                    run.push(*a);
                }
                run.push(*b);
            }
            _ => {
                skipped += 1;
                if run.len() >= 2 {
                    surface.polyline(&run, &stroke);
                }
                run.clear();
            }
        }
    }
    if run.len() >= 2 {
        surface.polyline(&run, &stroke);
    }
    skipped
}

/// Number-to-text the way the web client labels costs: plain decimals in
/// `[1e-6, 1e21)`, exponent form with an explicit sign outside it, and no
/// negative zero.
fn format_cost(cost: f64) -> String {
    if cost == 0.0 {
        return "0".to_string();
    }
    if cost.is_nan() {
        return "NaN".to_string();
    }
    if cost.is_infinite() {
        return if cost > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = cost.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{cost}");
    }
    let exp = format!("{cost:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

/// Surface that builds an SVG document.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    pub fn to_svg(&self) -> String {
        let (width, height) = (self.width, self.height);
        let mut svg = String::with_capacity(self.body.len() + 160);
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.body.clear();
    }

    fn clear(&mut self, color: &str) {
        self.body.clear();
        let _ = write!(
            self.body,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(color)
        );
    }

    fn line(&mut self, from: NodePosition, to: NodePosition, stroke: &Stroke) {
        let _ = write!(
            self.body,
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" {}/>",
            from.x,
            from.y,
            to.x,
            to.y,
            stroke_attrs(stroke)
        );
    }

    fn polyline(&mut self, points: &[NodePosition], stroke: &Stroke) {
        if points.len() < 2 {
            return;
        }
        let coords: Vec<String> = points
            .iter()
            .map(|p| format!("{:.2},{:.2}", p.x, p.y))
            .collect();
        let _ = write!(
            self.body,
            "<polyline points=\"{}\" fill=\"none\" {}/>",
            coords.join(" "),
            stroke_attrs(stroke)
        );
    }

    fn circle(&mut self, center: NodePosition, radius: f64, fill: &str, stroke: &Stroke) {
        let _ = write!(
            self.body,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" {}/>",
            center.x,
            center.y,
            radius,
            escape_xml(fill),
            stroke_attrs(stroke)
        );
    }

    fn text(&mut self, at: NodePosition, content: &str, style: &TextStyle) {
        let baseline = match style.baseline {
            TextBaseline::Middle => "middle",
            TextBaseline::Top => "hanging",
        };
        let _ = write!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"{baseline}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            at.x,
            at.y,
            escape_xml(&style.font_family),
            style.font_size,
            escape_xml(&style.color),
            escape_xml(content)
        );
    }
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        "stroke=\"{}\" stroke-width=\"{}\"",
        escape_xml(&stroke.color),
        stroke.width
    );
    if stroke.round {
        attrs.push_str(" stroke-linecap=\"round\" stroke-linejoin=\"round\"");
    }
    attrs
}

/// A recorded drawing call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum DrawOp {
    Clear {
        color: String,
    },
    Line {
        from: NodePosition,
        to: NodePosition,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<NodePosition>,
        stroke: Stroke,
    },
    Circle {
        center: NodePosition,
        radius: f64,
        fill: String,
        stroke: Stroke,
    },
    Text {
        at: NodePosition,
        content: String,
        style: TextStyle,
    },
}

/// Surface that keeps the drawing calls instead of pixels.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }
}

impl Surface for DrawList {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.ops.clear();
    }

    fn clear(&mut self, color: &str) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear {
            color: color.to_string(),
        });
    }

    fn line(&mut self, from: NodePosition, to: NodePosition, stroke: &Stroke) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            stroke: stroke.clone(),
        });
    }

    fn polyline(&mut self, points: &[NodePosition], stroke: &Stroke) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            stroke: stroke.clone(),
        });
    }

    fn circle(&mut self, center: NodePosition, radius: f64, fill: &str, stroke: &Stroke) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            fill: fill.to_string(),
            stroke: stroke.clone(),
        });
    }

    fn text(&mut self, at: NodePosition, content: &str, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            at,
            content: content.to_string(),
            style: style.clone(),
        });
    }
}

/// Renders a computed layout into a standalone SVG document.
pub fn render_svg(graph: &GraphSnapshot, layout: &Layout, route: &RoutePath, theme: &Theme) -> String {
    let mut surface = SvgSurface::new(layout.width, layout.height);
    render_map(&mut surface, graph, &layout.positions, route, theme);
    surface.to_svg()
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
static FONT_DB: once_cell::sync::Lazy<std::sync::Arc<usvg::fontdb::Database>> =
    once_cell::sync::Lazy::new(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        std::sync::Arc::new(db)
    });

/// Rasterizes an SVG document into a pixmap of its own size.
#[cfg(feature = "png")]
pub fn rasterize(svg: &str) -> Result<resvg::tiny_skia::Pixmap> {
    use crate::error::Error;

    let opt = usvg::Options {
        fontdb: FONT_DB.clone(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| Error::Raster(e.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| Error::Raster("failed to allocate pixmap".to_string()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    Ok(pixmap)
}

#[cfg(feature = "png")]
pub fn encode_png(svg: &str) -> Result<Vec<u8>> {
    let pixmap = rasterize(svg)?;
    pixmap
        .encode_png()
        .map_err(|e| crate::error::Error::Raster(e.to_string()))
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path) -> Result<()> {
    let png = encode_png(svg)?;
    std::fs::write(output, png)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> (GraphSnapshot, Positions) {
        let graph = GraphSnapshot::new(
            vec![Place::new("A"), Place::new("B"), Place::new("C")],
            vec![Road::new("A", "B", 4.0), Road::new("B", "C", 2.0)],
        );
        let positions: Positions = [
            ("A".to_string(), NodePosition::new(100.0, 100.0)),
            ("B".to_string(), NodePosition::new(300.0, 100.0)),
            ("C".to_string(), NodePosition::new(300.0, 400.0)),
        ]
        .into_iter()
        .collect();
        (graph, positions)
    }

    #[test]
    fn empty_graph_draws_background_only() {
        let mut list = DrawList::new(400.0, 300.0);
        let graph = GraphSnapshot::default();
        render_map(&mut list, &graph, &Positions::new(), &RoutePath::default(), &Theme::dark());
        assert_eq!(
            list.ops(),
            &[DrawOp::Clear {
                color: "#0a0a0a".to_string()
            }]
        );
    }

    #[test]
    fn draws_layers_in_order() {
        let (graph, positions) = abc();
        let mut list = DrawList::new(500.0, 500.0);
        let route = RoutePath::new(["A", "B", "C"]);
        render_map(&mut list, &graph, &positions, &route, &Theme::dark());

        let kinds: Vec<&str> = list
            .ops()
            .iter()
            .map(|op| match op {
                DrawOp::Clear { .. } => "clear",
                DrawOp::Line { .. } => "line",
                DrawOp::Polyline { .. } => "route",
                DrawOp::Circle { .. } => "circle",
                DrawOp::Text { .. } => "text",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "clear", "line", "text", "line", "text", "route", "circle", "text", "circle",
                "text", "circle", "text"
            ]
        );
    }

    #[test]
    fn cost_labels_sit_above_the_midpoint() {
        let (graph, positions) = abc();
        let mut list = DrawList::new(500.0, 500.0);
        render_map(&mut list, &graph, &positions, &RoutePath::default(), &Theme::dark());
        let labels: Vec<(String, NodePosition)> = list
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { at, content, style } if style.baseline == TextBaseline::Middle => {
                    Some((content.clone(), *at))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                ("4".to_string(), NodePosition::new(200.0, 98.0)),
                ("2".to_string(), NodePosition::new(300.0, 248.0)),
            ]
        );
    }

    #[test]
    fn fractional_costs_keep_their_digits() {
        assert_eq!(format_cost(4.0), "4");
        assert_eq!(format_cost(2.5), "2.5");
    }

    #[test]
    fn cost_labels_follow_web_number_formatting() {
        assert_eq!(format_cost(-0.0), "0");
        assert_eq!(format_cost(1e21), "1e+21");
        assert_eq!(format_cost(1.5e22), "1.5e+22");
        assert_eq!(format_cost(1e-7), "1e-7");
        assert_eq!(format_cost(0.000001), "0.000001");
        assert_eq!(format_cost(123456789.0), "123456789");
        assert_eq!(format_cost(f64::NAN), "NaN");
        assert_eq!(format_cost(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn route_splits_around_unknown_names() {
        let (graph, positions) = abc();
        let mut list = DrawList::new(500.0, 500.0);
        let route = RoutePath::new(["A", "B", "Ghost", "B", "C"]);
        render_map(&mut list, &graph, &positions, &route, &Theme::dark());
        let runs: Vec<&Vec<NodePosition>> = list
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Polyline { points, .. } => Some(points),
                _ => None,
            })
            .collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0], &vec![positions["A"], positions["B"]]);
        assert_eq!(runs[1], &vec![positions["B"], positions["C"]]);
    }

    #[test]
    fn single_entry_route_draws_nothing() {
        let (graph, positions) = abc();
        let mut list = DrawList::new(500.0, 500.0);
        render_map(&mut list, &graph, &positions, &RoutePath::new(["A"]), &Theme::dark());
        assert!(!list.ops().iter().any(|op| matches!(op, DrawOp::Polyline { .. })));
    }

    #[test]
    fn roads_with_missing_endpoints_are_skipped() {
        let graph = GraphSnapshot::new(
            vec![Place::new("A"), Place::new("B")],
            vec![Road::new("A", "Z", 1.0), Road::new("A", "B", 3.0)],
        );
        let positions: Positions = [
            ("A".to_string(), NodePosition::new(50.0, 50.0)),
            ("B".to_string(), NodePosition::new(150.0, 50.0)),
        ]
        .into_iter()
        .collect();
        let mut list = DrawList::new(200.0, 200.0);
        render_map(&mut list, &graph, &positions, &RoutePath::default(), &Theme::dark());
        let lines = list
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { .. }))
            .count();
        assert_eq!(lines, 1);
    }

    #[test]
    fn svg_escapes_place_names() {
        let graph = GraphSnapshot::new(vec![Place::new("Fish & <Chips>")], vec![]);
        let positions: Positions = [("Fish & <Chips>".to_string(), NodePosition::new(50.0, 50.0))]
            .into_iter()
            .collect();
        let mut surface = SvgSurface::new(100.0, 100.0);
        render_map(&mut surface, &graph, &positions, &RoutePath::default(), &Theme::dark());
        let svg = surface.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn clear_discards_previous_frame() {
        let mut surface = SvgSurface::new(100.0, 100.0);
        surface.clear("#000");
        surface.circle(
            NodePosition::new(10.0, 10.0),
            4.0,
            "#fff",
            &Stroke {
                color: "#fff".to_string(),
                width: 1.0,
                round: false,
            },
        );
        surface.clear("#111");
        let svg = surface.to_svg();
        assert!(!svg.contains("<circle"));
        assert!(svg.contains("#111"));
    }
}
