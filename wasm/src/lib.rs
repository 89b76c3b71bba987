use ridemap_renderer::{RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapRenderOptions {
    theme: Option<String>,
    seed: Option<u64>,
    padding: Option<f64>,
    font_family: Option<String>,
}

fn build_render_options(options: MapRenderOptions, width: f64, height: f64) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("light") {
        RenderOptions::light()
    } else {
        RenderOptions::dark()
    }
    .with_size(width, height);

    if let Some(padding) = options.padding {
        render_options.layout.padding = padding.max(0.0);
    }
    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    render_options.seed = Some(options.seed.unwrap_or_else(browser_seed));

    render_options
}

// The library is built without an OS entropy source here, so fresh layouts
// take their seed from the host.
fn browser_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

#[wasm_bindgen]
pub fn render_map_svg(
    graph_json: &str,
    route_json: Option<String>,
    width: f64,
    height: f64,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<MapRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        MapRenderOptions::default()
    };

    let render_options = build_render_options(options, width, height);
    render_with_options(graph_json, route_json.as_deref(), &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
