use crate::config::LayoutConfig;
use crate::ir::{GraphSnapshot, RoutePath};
use crate::layout::{Layout, compute_layout, usable_dimension};
use crate::render::{Surface, render_map};
use crate::theme::Theme;
use rand::Rng;

/// Drives layout and rendering for a long-lived surface.
///
/// Inputs are pushed in through the setters. A setter only invalidates the
/// view when the new value differs from the one last observed, and
/// [`MapView::refresh`] performs at most one full pass per invalidation, no
/// matter how many inputs changed in between. Positions are never kept:
/// every pass lays the whole graph out from scratch.
pub struct MapView<S, R> {
    surface: S,
    rng: R,
    theme: Theme,
    layout_config: LayoutConfig,
    graph: GraphSnapshot,
    route: RoutePath,
    width: f64,
    height: f64,
    dirty: bool,
    passes: u64,
}

impl<S: Surface, R: Rng> MapView<S, R> {
    /// Starts dirty so the first [`MapView::refresh`] paints the empty map.
    pub fn new(surface: S, rng: R, theme: Theme, layout_config: LayoutConfig) -> Self {
        let (width, height) = surface.size();
        Self {
            surface,
            rng,
            theme,
            layout_config,
            graph: GraphSnapshot::default(),
            route: RoutePath::default(),
            width: usable_dimension(width),
            height: usable_dimension(height),
            dirty: true,
            passes: 0,
        }
    }

    pub fn set_graph(&mut self, graph: GraphSnapshot) -> bool {
        if self.graph == graph {
            return false;
        }
        self.graph = graph;
        self.invalidate("graph")
    }

    pub fn set_route(&mut self, route: RoutePath) -> bool {
        if self.route == route {
            return false;
        }
        self.route = route;
        self.invalidate("route")
    }

    /// Sizes are stored as the layout will use them, so a repeated
    /// non-finite size counts as unchanged.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let width = usable_dimension(width);
        let height = usable_dimension(height);
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.invalidate("viewport")
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        if self.theme == theme {
            return false;
        }
        self.theme = theme;
        self.invalidate("theme")
    }

    fn invalidate(&mut self, cause: &'static str) -> bool {
        tracing::debug!(cause, "map view invalidated");
        self.dirty = true;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Runs one layout + render pass if any input changed since the last
    /// pass. Returns the layout of the pass, or `None` when nothing changed.
    pub fn refresh(&mut self) -> Option<Layout> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        self.passes += 1;

        let layout = compute_layout(
            &self.graph,
            self.width,
            self.height,
            &self.layout_config,
            &mut self.rng,
        );
        self.surface.resize(layout.width, layout.height);
        render_map(
            &mut self.surface,
            &self.graph,
            &layout.positions,
            &self.route,
            &self.theme,
        );
        tracing::debug!(pass = self.passes, algorithm = ?layout.algorithm, "map view refreshed");
        Some(layout)
    }

    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn graph(&self) -> &GraphSnapshot {
        &self.graph
    }

    pub fn route(&self) -> &RoutePath {
        &self.route
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
