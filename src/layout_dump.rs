use crate::error::Result;
use crate::ir::{GraphSnapshot, RoutePath};
use crate::layout::{Layout, LayoutAlgorithm};
use crate::render::{DrawList, DrawOp, render_map};
use crate::theme::Theme;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct FrameDump {
    pub algorithm: LayoutAlgorithm,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeDump>,
    pub route: Vec<String>,
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub lat: f64,
    pub lng: f64,
}

impl FrameDump {
    /// Replays the render pass into a draw list so the dump shows exactly
    /// what would be painted.
    pub fn from_layout(graph: &GraphSnapshot, layout: &Layout, route: &RoutePath, theme: &Theme) -> Self {
        let nodes = graph
            .places
            .iter()
            .filter_map(|place| {
                let pos = layout.positions.get(&place.name)?;
                Some(NodeDump {
                    name: place.name.clone(),
                    x: pos.x,
                    y: pos.y,
                    lat: place.lat,
                    lng: place.lng,
                })
            })
            .collect();

        let mut list = DrawList::new(layout.width, layout.height);
        render_map(&mut list, graph, &layout.positions, route, theme);

        Self {
            algorithm: layout.algorithm,
            width: layout.width,
            height: layout.height,
            nodes,
            route: route.0.clone(),
            ops: list.into_ops(),
        }
    }
}

pub fn write_frame_dump(path: &Path, dump: &FrameDump) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}
