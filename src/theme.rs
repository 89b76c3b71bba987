use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub mono_font_family: String,
    pub background: String,
    pub road_color: String,
    pub road_width: f64,
    pub cost_label_color: String,
    pub cost_font_size: f64,
    pub route_color: String,
    pub route_width: f64,
    pub node_radius: f64,
    pub node_fill: String,
    pub node_stroke: String,
    pub node_stroke_width: f64,
    pub node_label_color: String,
    pub node_font_size: f64,
    pub node_label_offset: f64,
}

impl Theme {
    /// Dark map palette used by the ride-sharing client.
    pub fn dark() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            mono_font_family: "monospace".to_string(),
            background: "#0a0a0a".to_string(),
            road_color: "rgba(255, 255, 255, 0.2)".to_string(),
            road_width: 2.0,
            cost_label_color: "rgba(255, 255, 255, 0.6)".to_string(),
            cost_font_size: 11.0,
            route_color: "#2F6BFF".to_string(),
            route_width: 5.0,
            node_radius: 12.0,
            node_fill: "rgba(0, 0, 0, 0.7)".to_string(),
            node_stroke: "rgba(255, 255, 255, 0.8)".to_string(),
            node_stroke_width: 2.0,
            node_label_color: "rgba(255, 255, 255, 0.9)".to_string(),
            node_font_size: 12.0,
            node_label_offset: 18.0,
        }
    }

    pub fn light() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            road_color: "rgba(28, 36, 48, 0.25)".to_string(),
            cost_label_color: "rgba(28, 36, 48, 0.7)".to_string(),
            route_color: "#2F6BFF".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_stroke: "#1C2430".to_string(),
            node_label_color: "#1C2430".to_string(),
            ..Self::dark()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "dark" | "default" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
