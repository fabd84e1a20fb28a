//! draw.io (`mxfile`) XML output.
//!
//! Attribute order is fixed and numbers use the shortest float form, so a
//! document built from a seeded id source serializes byte-for-byte the same.

use crate::cell::{Cell, CellKind, Geometry, LAYER_ID, ROOT_ID};
use crate::document::Document;
use std::fmt;

const HOST: &str = "app.diagrams.net";
const VERSION: &str = "15.5.2";
const PAGE_NAME: &str = "Page-1";

const GRAPH_MODEL: &[(&str, &str)] = &[
    ("dx", "1200"),
    ("dy", "1200"),
    ("grid", "1"),
    ("gridSize", "10"),
    ("guides", "1"),
    ("tooltips", "1"),
    ("connect", "1"),
    ("arrows", "1"),
    ("fold", "1"),
    ("page", "1"),
    ("pageScale", "1"),
    ("pageWidth", "900"),
    ("pageHeight", "1200"),
    ("math", "0"),
    ("shadow", "0"),
    (
        "extFonts",
        "Permanent Marker^https://fonts.googleapis.com/css?family=Permanent+Marker",
    ),
];

pub fn serialize(doc: &Document) -> String {
    Drawio(doc).to_string()
}

/// Display adapter writing a [`Document`] as pretty-printed mxfile XML.
pub struct Drawio<'a>(pub &'a Document);

impl fmt::Display for Drawio<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = self.0;
        writeln!(f, r#"<?xml version="1.0"?>"#)?;

        open(
            f,
            0,
            "mxfile",
            &[
                ("host", HOST),
                ("etag", doc.etag.as_str()),
                ("version", VERSION),
                ("type", "device"),
            ],
        )?;
        open(f, 1, "diagram", &[("id", doc.diagram_id.as_str()), ("name", PAGE_NAME)])?;
        open(f, 2, "mxGraphModel", GRAPH_MODEL)?;
        open(f, 3, "root", &[])?;

        empty(f, 4, "mxCell", &[("id", ROOT_ID)])?;
        empty(f, 4, "mxCell", &[("id", LAYER_ID), ("parent", ROOT_ID)])?;

        for cell in doc.cells() {
            write_cell(f, 4, cell)?;
        }

        close(f, 3, "root")?;
        close(f, 2, "mxGraphModel")?;
        close(f, 1, "diagram")?;
        close(f, 0, "mxfile")
    }
}

fn write_cell(f: &mut fmt::Formatter<'_>, depth: usize, cell: &Cell) -> fmt::Result {
    let mut attrs: Vec<(&str, &str)> = vec![
        ("id", cell.id.as_str()),
        ("value", cell.value.as_str()),
        ("style", cell.style.as_str()),
        ("parent", cell.parent.as_str()),
    ];
    match &cell.kind {
        CellKind::Vertex => attrs.push(("vertex", "1")),
        CellKind::Edge { source, target } => {
            attrs.push(("edge", "1"));
            if let Some(source) = source {
                attrs.push(("source", source.as_str()));
            }
            if let Some(target) = target {
                attrs.push(("target", target.as_str()));
            }
        }
    }

    open(f, depth, "mxCell", &attrs)?;
    write_geometry(f, depth + 1, &cell.geometry)?;
    close(f, depth, "mxCell")
}

fn write_geometry(f: &mut fmt::Formatter<'_>, depth: usize, geometry: &Geometry) -> fmt::Result {
    let numbers = [
        ("x", geometry.x),
        ("y", geometry.y),
        ("width", geometry.width),
        ("height", geometry.height),
    ];
    let mut owned: Vec<(&str, String)> = numbers
        .iter()
        .filter_map(|(name, value)| value.map(|v| (*name, v.to_string())))
        .collect();
    if geometry.relative {
        owned.push(("relative", "1".to_string()));
    }
    owned.push(("as", "geometry".to_string()));
    let attrs: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();

    match geometry.alternate_bounds {
        Some((width, height)) => {
            open(f, depth, "mxGeometry", &attrs)?;
            let (width, height) = (width.to_string(), height.to_string());
            empty(
                f,
                depth + 1,
                "mxRectangle",
                &[
                    ("width", width.as_str()),
                    ("height", height.as_str()),
                    ("as", "alternateBounds"),
                ],
            )?;
            close(f, depth, "mxGeometry")
        }
        None => empty(f, depth, "mxGeometry", &attrs),
    }
}

fn start_tag(f: &mut fmt::Formatter<'_>, depth: usize, name: &str, attrs: &[(&str, &str)]) -> fmt::Result {
    write!(f, "{:indent$}<{}", "", name, indent = depth * 2)?;
    for (key, value) in attrs {
        write!(f, r#" {}="{}""#, key, escape_xml(value))?;
    }
    Ok(())
}

fn open(f: &mut fmt::Formatter<'_>, depth: usize, name: &str, attrs: &[(&str, &str)]) -> fmt::Result {
    start_tag(f, depth, name, attrs)?;
    f.write_str(">\n")
}

fn empty(f: &mut fmt::Formatter<'_>, depth: usize, name: &str, attrs: &[(&str, &str)]) -> fmt::Result {
    start_tag(f, depth, name, attrs)?;
    f.write_str("/>\n")
}

fn close(f: &mut fmt::Formatter<'_>, depth: usize, name: &str) -> fmt::Result {
    writeln!(f, "{:indent$}</{}>", "", name, indent = depth * 2)
}

/// Attribute-safe text. Line breaks and tabs become character references
/// so attribute normalization does not fold them into spaces.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentAssembler;
    use crate::id::{RandomIds, SequentialIds};
    use crate::parser::Parser;

    const CATEGORY: &str = r#"
        Table Category {
            id int [pk]
            name varchar [not null]
        }
    "#;

    fn render(input: &str) -> String {
        let schema = Parser::new(input).unwrap().parse().unwrap();
        let doc = DocumentAssembler::default()
            .assemble(&schema, &mut SequentialIds::new("t"))
            .unwrap();
        serialize(&doc)
    }

    #[test]
    fn test_serialize_single_table() {
        let expected = r#"<?xml version="1.0"?>
<mxfile host="app.diagrams.net" etag="t1" version="15.5.2" type="device">
  <diagram id="t0" name="Page-1">
    <mxGraphModel dx="1200" dy="1200" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="900" pageHeight="1200" math="0" shadow="0" extFonts="Permanent Marker^https://fonts.googleapis.com/css?family=Permanent+Marker">
      <root>
        <mxCell id="0"/>
        <mxCell id="1" parent="0"/>
        <mxCell id="t2-0" value="" style="edgeStyle=entityRelationEdgeStyle;endFill=1;startFill=0;" parent="1" edge="1">
          <mxGeometry relative="1" as="geometry"/>
        </mxCell>
        <mxCell id="t2-1" value="Category" style="shape=table;startSize=30;container=1;collapsible=1;childLayout=tableLayout;fixedRows=1;rowLines=0;fontStyle=1;align=center;resizeLast=1;" parent="1" vertex="1">
          <mxGeometry x="120" y="0" width="196" height="90" as="geometry"/>
        </mxCell>
        <mxCell id="t2-2" value="" style="shape=partialRectangle;collapsible=0;dropTarget=0;pointerEvents=0;fillColor=none;points=[[0,0.5],[1,0.5]];portConstraint=eastwest;top=0;left=0;right=0;bottom=1;" parent="t2-1" vertex="1">
          <mxGeometry y="30" width="196" height="30" as="geometry"/>
        </mxCell>
        <mxCell id="t2-3" value="PK" style="shape=partialRectangle;overflow=hidden;connectable=0;fillColor=none;top=0;left=0;bottom=0;right=0;fontStyle=1;" parent="t2-2" vertex="1">
          <mxGeometry width="30" height="30" as="geometry">
            <mxRectangle width="30" height="30" as="alternateBounds"/>
          </mxGeometry>
        </mxCell>
        <mxCell id="t2-4" value="id INT [PRIMARY KEY]" style="shape=partialRectangle;overflow=hidden;connectable=0;fillColor=none;top=0;left=0;bottom=0;right=0;fontStyle=5;" parent="t2-2" vertex="1">
          <mxGeometry width="166" height="30" as="geometry">
            <mxRectangle width="166" height="30" as="alternateBounds"/>
          </mxGeometry>
        </mxCell>
        <mxCell id="t2-5" value="" style="shape=partialRectangle;collapsible=0;dropTarget=0;pointerEvents=0;fillColor=none;points=[[0,0.5],[1,0.5]];portConstraint=eastwest;top=0;left=0;right=0;bottom=0;" parent="t2-1" vertex="1">
          <mxGeometry y="30" width="196" height="30" as="geometry"/>
        </mxCell>
        <mxCell id="t2-6" value="" style="shape=partialRectangle;overflow=hidden;connectable=0;fillColor=none;top=0;left=0;bottom=0;right=0;fontStyle=1;" parent="t2-5" vertex="1">
          <mxGeometry width="30" height="30" as="geometry">
            <mxRectangle width="30" height="30" as="alternateBounds"/>
          </mxGeometry>
        </mxCell>
        <mxCell id="t2-7" value="name VARCHAR [NOT NULL]" style="shape=partialRectangle;overflow=hidden;connectable=0;fillColor=none;top=0;left=0;bottom=0;right=0;fontStyle=0;" parent="t2-5" vertex="1">
          <mxGeometry width="166" height="30" as="geometry">
            <mxRectangle width="166" height="30" as="alternateBounds"/>
          </mxGeometry>
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>
"#;
        assert_eq!(render(CATEGORY), expected);
    }

    #[test]
    fn test_serialize_edge() {
        let xml = render(
            r#"
            Table users { id int [pk] }
            Table posts { id int [pk]
              user_id int [ref: > users.id] }
            "#,
        );
        assert!(xml.contains(r#"<mxCell id="t4-0" value="" style="edgeStyle=orthogonalEdgeStyle;"#));
        assert!(xml.contains(r#"endArrow=ERmandOne;endFill=0;startArrow=ERoneToMany;startFill=0;" parent="1" edge="1" source="t3-5" target="t2-2">"#));
    }

    #[test]
    fn test_seeded_output_is_identical() {
        let schema = Parser::new(CATEGORY).unwrap().parse().unwrap();
        let assembler = DocumentAssembler::default();
        let a = assembler.assemble(&schema, &mut RandomIds::seeded(42)).unwrap();
        let b = assembler.assemble(&schema, &mut RandomIds::seeded(42)).unwrap();
        assert_eq!(serialize(&a), serialize(&b));
    }

    #[test]
    fn test_escapes_values() {
        let xml = render(r#"Table "a<b" { "x&y" int }"#);
        assert!(xml.contains(r#"value="a&lt;b""#));
        assert!(xml.contains(r#"value="x&amp;y INT""#));
    }

    #[test]
    fn test_escapes_line_breaks_in_values() {
        let xml = render("Table t { a text [default: '''x\ny\r\tz'''] }");
        assert!(xml.contains(r#"value="a TEXT [DEFAULT = x&#10;y&#13;&#9;z]""#));
    }

    #[test]
    fn test_same_table_name_in_two_schemas() {
        let xml = render(
            r#"
            Table core.users { id int [pk] }
            Table auth.users { id int [pk] }
            Table posts {
              id int [pk]
              uid int
            }
            Ref: posts.uid > core.users.id
            "#,
        );
        assert!(xml.contains(r#"value="core.users""#));
        assert!(xml.contains(r#"value="auth.users""#));
        assert!(xml.contains(r#"source="t4-5" target="t2-2">"#));
    }
}
