//! Stacks table shapes into one diagram and wires their connectors.

use crate::ast::{Schema, Table};
use crate::cell::Cell;
use crate::id::{IdAllocator, IdSource};
use crate::resolve::{self, ResolveError};
use crate::shape::{Bounds, TableShape, TableShapeBuilder};

pub struct DiagramOptions {
    /// X coordinate shared by every table.
    pub origin_x: f64,
    /// Vertical space between consecutive tables.
    pub gap: f64,
    /// Minimum table width before auto-widening.
    pub base_width: f64,
    pub header_height: f64,
    /// Reject references that do not resolve instead of dropping them.
    pub strict: bool,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            origin_x: 120.0,
            gap: 20.0,
            base_width: 120.0,
            header_height: 30.0,
            strict: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub diagram_id: String,
    pub etag: String,
    pub tables: Vec<TableShape>,
    pub edges: Vec<Cell>,
}

impl Document {
    /// Every generated cell: tables in schema order, then connectors.
    /// The two scaffold cells are written by the serializer.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.tables
            .iter()
            .flat_map(|t| t.cells())
            .chain(self.edges.iter())
    }
}

#[derive(Default)]
pub struct DocumentAssembler {
    pub options: DiagramOptions,
    pub builder: TableShapeBuilder,
}

impl DocumentAssembler {
    pub fn new(options: DiagramOptions) -> Self {
        Self {
            options,
            builder: TableShapeBuilder::default(),
        }
    }

    /// Top-to-bottom stack: `y[0] = 0`, each next table starts `gap` below
    /// the previous one. Height is one header plus one row per field.
    pub fn layout_tables<'a>(&self, tables: &'a [Table]) -> Vec<(&'a Table, Bounds)> {
        let mut y = 0.0;
        tables
            .iter()
            .map(|table| {
                let height =
                    self.builder.row_height * table.fields.len() as f64 + self.options.header_height;
                let bounds = Bounds {
                    x: self.options.origin_x,
                    y,
                    width: self.options.base_width,
                    height,
                };
                y += height + self.options.gap;
                (table, bounds)
            })
            .collect()
    }

    pub fn assemble(&self, schema: &Schema, ids: &mut dyn IdSource) -> Result<Document, ResolveError> {
        let diagram_id = ids.namespace();
        let etag = ids.namespace();

        let tables: Vec<TableShape> = self
            .layout_tables(&schema.tables)
            .into_iter()
            .map(|(table, bounds)| self.builder.build(table, &schema.refs, bounds, ids.namespace()))
            .collect();

        let resolution = resolve::resolve(&tables, &schema.refs);
        let connectors = if self.options.strict {
            resolution.strict()?
        } else {
            resolution.connectors
        };

        let mut edge_ids = IdAllocator::new(ids.namespace());
        let edges = connectors
            .into_iter()
            .map(|c| c.into_cell(edge_ids.next_id(), &self.builder.styles))
            .collect();

        Ok(Document {
            diagram_id,
            etag,
            tables,
            edges,
        })
    }
}
