use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Margin kept free on every side of the viewport.
    pub padding: f64,
    pub iterations: usize,
    pub damping: f64,
    /// Largest node count still laid out by the force simulation.
    pub force_threshold: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            iterations: 100,
            damping: 0.9,
            force_threshold: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    mono_font_family: Option<String>,
    background: Option<String>,
    road_color: Option<String>,
    cost_label_color: Option<String>,
    route_color: Option<String>,
    route_width: Option<f64>,
    node_radius: Option<f64>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    node_label_color: Option<String>,
    font_size: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    padding: Option<f64>,
    iterations: Option<usize>,
    damping: Option<f64>,
    force_threshold: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f64>,
    height: Option<f64>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document. Strict JSON is tried first; JSON5 (comments,
/// trailing commas) is accepted as a fallback.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };

    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = theme_name, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.mono_font_family {
            theme.mono_font_family = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.road_color {
            theme.road_color = v;
        }
        if let Some(v) = vars.cost_label_color {
            theme.cost_label_color = v;
        }
        if let Some(v) = vars.route_color {
            theme.route_color = v;
        }
        if let Some(v) = vars.route_width {
            theme.route_width = v;
        }
        if let Some(v) = vars.node_radius {
            theme.node_radius = v;
        }
        if let Some(v) = vars.node_fill {
            theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            theme.node_stroke = v;
        }
        if let Some(v) = vars.node_label_color {
            theme.node_label_color = v;
        }
        if let Some(v) = vars.font_size {
            theme.node_font_size = v;
            theme.cost_font_size = (v - 1.0).max(1.0);
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.padding {
            config.layout.padding = v.max(0.0);
        }
        if let Some(v) = layout.iterations {
            config.layout.iterations = v;
        }
        if let Some(v) = layout.damping {
            config.layout.damping = v;
        }
        if let Some(v) = layout.force_threshold {
            config.layout.force_threshold = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    Ok(config)
}
