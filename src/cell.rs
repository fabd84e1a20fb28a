//! Graph cells: the node tree a diagram is made of.
//!
//! Hierarchy is expressed through `parent` ids, as in the mxGraph model, so a
//! shape's cells are a flat arena.

/// Absolute root cell.
pub const ROOT_ID: &str = "0";
/// Default layer; every table and connector hangs off it.
pub const LAYER_ID: &str = "1";

#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    Vertex,
    Edge {
        source: Option<String>,
        target: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub relative: bool,
    /// Collapsed size (`mxRectangle as="alternateBounds"`).
    pub alternate_bounds: Option<(f64, f64)>,
}

impl Geometry {
    pub fn relative() -> Self {
        Self {
            relative: true,
            ..Default::default()
        }
    }

    pub fn absolute(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: String,
    pub value: String,
    pub style: String,
    pub parent: String,
    pub kind: CellKind,
    pub geometry: Geometry,
}

impl Cell {
    pub fn is_edge(&self) -> bool {
        matches!(self.kind, CellKind::Edge { .. })
    }
}
