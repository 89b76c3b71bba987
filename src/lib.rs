#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use error::{Error, Result};
pub use ir::{GraphSnapshot, Place, Road, RoutePath, RouteResponse};
pub use layout::{Layout, LayoutAlgorithm, NodePosition, Positions, compute_layout, layout_places};
pub use render::{DrawList, DrawOp, Surface, SvgSurface, render, render_map, render_svg};
pub use theme::Theme;
pub use viewport::MapView;

use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    /// Fixes the force layout's initial placement. `None` draws fresh entropy.
    pub seed: Option<u64>,
}

impl RenderOptions {
    pub fn dark() -> Self {
        Self::default()
    }

    pub fn light() -> Self {
        Self {
            theme: Theme::light(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.render.width = width;
        self.render.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
            seed: None,
        }
    }
}

/// Parses graph and route JSON, lays the map out and returns it as SVG.
pub fn render_with_options(
    graph_json: &str,
    route_json: Option<&str>,
    options: &RenderOptions,
) -> Result<String> {
    let graph = GraphSnapshot::from_json(graph_json)?;
    let route = match route_json {
        Some(json) => RoutePath::from_json(json)?,
        None => RoutePath::default(),
    };
    let mut rng = layout_rng(options.seed);
    let layout = compute_layout(
        &graph,
        options.render.width,
        options.render.height,
        &options.layout,
        &mut rng,
    );
    Ok(render_svg(&graph, &layout, &route, &options.theme))
}

pub fn layout_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => entropy_rng(),
    }
}

#[cfg(feature = "entropy")]
fn entropy_rng() -> StdRng {
    StdRng::from_rng(&mut rand::rng())
}

#[cfg(not(feature = "entropy"))]
fn entropy_rng() -> StdRng {
    tracing::debug!("no entropy source compiled in, using the fixed layout seed");
    StdRng::seed_from_u64(0x5EED)
}
