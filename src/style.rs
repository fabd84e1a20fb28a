//! draw.io style strings for ER tables and connectors.

use crate::ast::Relation;

/// Arrowhead drawn at one end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrowhead {
    MandatoryOne,
    OneToMany,
}

impl Arrowhead {
    pub fn code(self) -> &'static str {
        match self {
            Arrowhead::MandatoryOne => "ERmandOne",
            Arrowhead::OneToMany => "ERoneToMany",
        }
    }
}

impl From<Relation> for Arrowhead {
    fn from(relation: Relation) -> Self {
        match relation {
            Relation::One => Arrowhead::MandatoryOne,
            Relation::Many => Arrowhead::OneToMany,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StyleCatalog {
    /// Non-rendering edge-style cell emitted first in every table shape.
    pub shape_root: String,
    pub table: String,
    pub pk_row: String,
    pub row: String,
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self {
            shape_root: "edgeStyle=entityRelationEdgeStyle;endFill=1;startFill=0;".to_string(),
            table: "shape=table;startSize=30;container=1;collapsible=1;childLayout=tableLayout;\
fixedRows=1;rowLines=0;fontStyle=1;align=center;resizeLast=1;"
                .to_string(),
            pk_row: "shape=partialRectangle;collapsible=0;dropTarget=0;pointerEvents=0;\
fillColor=none;points=[[0,0.5],[1,0.5]];portConstraint=eastwest;top=0;left=0;right=0;bottom=1;"
                .to_string(),
            row: "shape=partialRectangle;collapsible=0;dropTarget=0;pointerEvents=0;\
fillColor=none;points=[[0,0.5],[1,0.5]];portConstraint=eastwest;top=0;left=0;right=0;bottom=0;"
                .to_string(),
        }
    }
}

impl StyleCatalog {
    pub fn row_style(&self, primary_key: bool) -> &str {
        if primary_key { self.pk_row.as_str() } else { self.row.as_str() }
    }

    /// Non-connectable text cell; `fontStyle` is a bit set (1 = bold, 4 = underline).
    pub fn font(&self, bold: bool, underline: bool) -> String {
        let mut font_style = 0;
        if bold {
            font_style += 1;
        }
        if underline {
            font_style += 4;
        }
        format!(
            "shape=partialRectangle;overflow=hidden;connectable=0;fillColor=none;\
top=0;left=0;bottom=0;right=0;fontStyle={};",
            font_style
        )
    }

    /// Orthogonal connector leaving the right side of the source row and
    /// entering the left side of the target row.
    pub fn arrow(&self, start: Arrowhead, end: Arrowhead) -> String {
        format!(
            "edgeStyle=orthogonalEdgeStyle;rounded=0;orthogonalLoop=1;jettySize=auto;html=1;\
exitX=1;exitY=0.5;exitDx=0;exitDy=0;entryX=0;entryY=0.5;entryDx=0;entryDy=0;\
endArrow={};endFill=0;startArrow={};startFill=0;",
            end.code(),
            start.code()
        )
    }
}
