//! Table shapes: one container cell plus a row per field.

use crate::ast::{Endpoint, Ref, Table};
use crate::cell::{Cell, CellKind, Geometry, LAYER_ID};
use crate::field::{self, KeyKind};
use crate::id::IdAllocator;
use crate::measure::TextMetrics;
use crate::style::StyleCatalog;

/// Position and minimum size of a table before auto-widening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Field name -> row container id, for attaching connectors.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub field: String,
    pub row_id: String,
}

#[derive(Debug, Clone)]
pub struct TableShape {
    schema: String,
    name: String,
    alias: Option<String>,
    cells: Vec<Cell>,
    root: usize,
    bindings: Vec<KeyBinding>,
}

impl TableShape {
    /// True when `endpoint` points at the table this shape was built from.
    pub fn is_named(&self, endpoint: &Endpoint) -> bool {
        endpoint.names(&self.schema, &self.name, self.alias.as_deref())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The table container cell.
    pub fn root(&self) -> &Cell {
        &self.cells[self.root]
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }
}

pub struct TableShapeBuilder {
    pub styles: StyleCatalog,
    pub metrics: TextMetrics,
    pub row_height: f64,
    pub key_width: f64,
    /// Offset of every row inside the table; `tableLayout` stacks them.
    pub row_offset: f64,
}

impl Default for TableShapeBuilder {
    fn default() -> Self {
        Self {
            styles: StyleCatalog::default(),
            metrics: TextMetrics::default(),
            row_height: 30.0,
            key_width: 30.0,
            row_offset: 30.0,
        }
    }
}

struct Row {
    label: String,
    kind: KeyKind,
    name: String,
}

impl TableShapeBuilder {
    /// Builds the cells for `table`. `refs` decide which fields are foreign
    /// keys; every id is drawn from `namespace`.
    pub fn build(&self, table: &Table, refs: &[Ref], bounds: Bounds, namespace: String) -> TableShape {
        let rows: Vec<Row> = table
            .fields
            .iter()
            .map(|f| Row {
                label: field::label(f),
                kind: field::classify(f, table, refs),
                name: f.name.clone(),
            })
            .collect();

        let width = self
            .metrics
            .table_width(bounds.width, rows.iter().map(|r| r.label.as_str()));
        let bounds = Bounds { width, ..bounds };
        let title = table.qualified_name();

        tracing::debug!(table = %title, width, rows = rows.len(), "sized table");

        let mut ids = IdAllocator::new(namespace);
        let mut cells = Vec::with_capacity(2 + rows.len() * 3);
        let mut bindings = Vec::new();

        cells.push(Cell {
            id: ids.next_id(),
            value: String::new(),
            style: self.styles.shape_root.clone(),
            parent: LAYER_ID.to_string(),
            kind: CellKind::Edge {
                source: None,
                target: None,
            },
            geometry: Geometry::relative(),
        });

        let root = cells.len();
        let table_id = ids.next_id();
        cells.push(Cell {
            id: table_id.clone(),
            value: title,
            style: self.styles.table.clone(),
            parent: LAYER_ID.to_string(),
            kind: CellKind::Vertex,
            geometry: Geometry::absolute(bounds.x, bounds.y, bounds.width, bounds.height),
        });

        for row in rows {
            let row_id = self.push_row(&mut cells, &mut ids, &table_id, &row, width);
            if row.kind.is_key() {
                bindings.push(KeyBinding {
                    field: row.name,
                    row_id,
                });
            }
        }

        TableShape {
            schema: table.schema_name().to_string(),
            name: table.name.clone(),
            alias: table.alias.clone(),
            cells,
            root,
            bindings,
        }
    }

    /// Row container with a key cell and a value cell; returns the container id.
    fn push_row(
        &self,
        cells: &mut Vec<Cell>,
        ids: &mut IdAllocator,
        table_id: &str,
        row: &Row,
        width: f64,
    ) -> String {
        let is_pk = row.kind == KeyKind::PrimaryKey;
        let value_width = width - self.key_width;

        let row_id = ids.next_id();
        cells.push(Cell {
            id: row_id.clone(),
            value: String::new(),
            style: self.styles.row_style(is_pk).to_string(),
            parent: table_id.to_string(),
            kind: CellKind::Vertex,
            geometry: Geometry {
                y: Some(self.row_offset),
                ..Geometry::sized(width, self.row_height)
            },
        });

        cells.push(Cell {
            id: ids.next_id(),
            value: row.kind.marker().to_string(),
            style: self.styles.font(true, false),
            parent: row_id.clone(),
            kind: CellKind::Vertex,
            geometry: Geometry {
                alternate_bounds: Some((self.key_width, self.row_height)),
                ..Geometry::sized(self.key_width, self.row_height)
            },
        });

        cells.push(Cell {
            id: ids.next_id(),
            value: row.label.clone(),
            style: self.styles.font(is_pk, is_pk),
            parent: row_id.clone(),
            kind: CellKind::Vertex,
            geometry: Geometry {
                alternate_bounds: Some((value_width, self.row_height)),
                ..Geometry::sized(value_width, self.row_height)
            },
        });

        row_id
    }
}
