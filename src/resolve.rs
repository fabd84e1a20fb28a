//! Attaches references to field rows across table shapes.

use crate::ast::{Endpoint, Ref};
use crate::cell::{Cell, CellKind, Geometry, LAYER_ID};
use crate::shape::{KeyBinding, TableShape};
use crate::style::{Arrowhead, StyleCatalog};

/// A resolved reference: row id to row id with an arrowhead at each end.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub source: String,
    pub target: String,
    pub start: Arrowhead,
    pub end: Arrowhead,
}

impl Connector {
    pub fn into_cell(self, id: String, styles: &StyleCatalog) -> Cell {
        Cell {
            id,
            value: String::new(),
            style: styles.arrow(self.start, self.end),
            parent: LAYER_ID.to_string(),
            kind: CellKind::Edge {
                source: Some(self.source),
                target: Some(self.target),
            },
            geometry: Geometry::relative(),
        }
    }
}

/// A reference that did not match exactly one row per endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Unresolved {
    pub reference: String,
    pub matches: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub connectors: Vec<Connector>,
    pub unresolved: Vec<Unresolved>,
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("{} unresolved reference(s): {}", .0.len(), describe(.0))]
    Unresolved(Vec<Unresolved>),
}

fn describe(unresolved: &[Unresolved]) -> String {
    unresolved
        .iter()
        .map(|u| format!("{} ({} matches)", u.reference, u.matches))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Resolution {
    /// Fails when any reference was skipped.
    pub fn strict(self) -> Result<Vec<Connector>, ResolveError> {
        if self.unresolved.is_empty() {
            Ok(self.connectors)
        } else {
            Err(ResolveError::Unresolved(self.unresolved))
        }
    }
}

struct Match<'a> {
    endpoint: &'a Endpoint,
    binding: &'a KeyBinding,
}

/// For each endpoint, every shape named by it contributes its first binding
/// on one of the endpoint's fields. A reference becomes a connector only when
/// exactly two matches are found; anything else is skipped.
pub fn resolve(shapes: &[TableShape], refs: &[Ref]) -> Resolution {
    let mut resolution = Resolution::default();

    for r in refs {
        let matches: Vec<Match<'_>> = r
            .endpoints
            .iter()
            .flat_map(|endpoint| {
                shapes
                    .iter()
                    .filter(|shape| shape.is_named(endpoint))
                    .filter_map(move |shape| {
                        shape
                            .bindings()
                            .iter()
                            .find(|b| endpoint.includes(&b.field))
                            .map(|binding| Match { endpoint, binding })
                    })
            })
            .collect();

        match matches.as_slice() {
            [source, target] => resolution.connectors.push(Connector {
                source: source.binding.row_id.clone(),
                target: target.binding.row_id.clone(),
                start: source.endpoint.relation.into(),
                end: target.endpoint.relation.into(),
            }),
            _ => {
                tracing::debug!(reference = %r, matches = matches.len(), "skipping unresolved reference");
                resolution.unresolved.push(Unresolved {
                    reference: r.to_string(),
                    matches: matches.len(),
                });
            }
        }
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Field, Relation, Table};
    use crate::shape::{Bounds, TableShapeBuilder};

    fn field(name: &str, pk: bool) -> Field {
        Field {
            name: name.to_string(),
            typ: "int".to_string(),
            pk,
            ..Default::default()
        }
    }

    fn table(name: &str, fields: Vec<Field>) -> Table {
        Table {
            name: name.to_string(),
            fields,
            ..Default::default()
        }
    }

    fn reference(from: (&str, &str, Relation), to: (&str, &str, Relation)) -> Ref {
        let endpoint = |(table, field, relation): (&str, &str, Relation)| Endpoint {
            schema: None,
            table: table.to_string(),
            fields: vec![field.to_string()],
            relation,
        };
        Ref {
            name: None,
            endpoints: [endpoint(from), endpoint(to)],
        }
    }

    fn build(tables: &[Table], refs: &[Ref]) -> Vec<TableShape> {
        let builder = TableShapeBuilder::default();
        tables
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let bounds = Bounds {
                    x: 0.0,
                    y: 0.0,
                    width: 120.0,
                    height: 30.0,
                };
                builder.build(t, refs, bounds, format!("s{}", i))
            })
            .collect()
    }

    #[test]
    fn test_resolve_users_posts() {
        let tables = vec![
            table("Users", vec![field("id", true)]),
            table("Posts", vec![field("id", true), field("user_id", false)]),
        ];
        let refs = vec![reference(
            ("Posts", "user_id", Relation::Many),
            ("Users", "id", Relation::One),
        )];
        let shapes = build(&tables, &refs);

        let resolution = resolve(&shapes, &refs);
        assert!(resolution.unresolved.is_empty());
        assert_eq!(
            resolution.connectors,
            vec![Connector {
                source: "s1-5".to_string(),
                target: "s0-2".to_string(),
                start: Arrowhead::OneToMany,
                end: Arrowhead::MandatoryOne,
            }]
        );
    }

    #[test]
    fn test_resolve_by_alias() {
        let mut users = table("users", vec![field("id", true)]);
        users.alias = Some("U".to_string());
        let tables = vec![users, table("posts", vec![field("user_id", false)])];
        let refs = vec![reference(
            ("posts", "user_id", Relation::Many),
            ("U", "id", Relation::One),
        )];
        let shapes = build(&tables, &refs);

        assert_eq!(resolve(&shapes, &refs).connectors.len(), 1);
    }

    #[test]
    fn test_unbound_endpoint_is_skipped() {
        // one-to-one on plain fields: neither side is a key
        let tables = vec![
            table("a", vec![field("x", false)]),
            table("b", vec![field("y", false)]),
        ];
        let refs = vec![reference(("a", "x", Relation::One), ("b", "y", Relation::One))];
        let shapes = build(&tables, &refs);

        let resolution = resolve(&shapes, &refs);
        assert!(resolution.connectors.is_empty());
        assert_eq!(
            resolution.unresolved,
            vec![Unresolved {
                reference: "a.x - b.y".to_string(),
                matches: 0,
            }]
        );
    }

    #[test]
    fn test_ambiguous_table_identity_is_skipped() {
        // alias of one table equals the name of another
        let mut first = table("users", vec![field("id", true)]);
        first.alias = Some("people".to_string());
        let tables = vec![
            first,
            table("people", vec![field("id", true)]),
            table("posts", vec![field("user_id", false)]),
        ];
        let refs = vec![reference(
            ("posts", "user_id", Relation::Many),
            ("people", "id", Relation::One),
        )];
        let shapes = build(&tables, &refs);

        let resolution = resolve(&shapes, &refs);
        assert!(resolution.connectors.is_empty());
        assert_eq!(resolution.unresolved[0].matches, 3);
    }

    #[test]
    fn test_missing_table_is_skipped() {
        let tables = vec![table("users", vec![field("id", true)])];
        let refs = vec![reference(
            ("ghost", "user_id", Relation::Many),
            ("users", "id", Relation::One),
        )];
        let shapes = build(&tables, &refs);

        let resolution = resolve(&shapes, &refs);
        assert!(resolution.connectors.is_empty());
        assert_eq!(resolution.unresolved[0].matches, 1);
    }

    #[test]
    fn test_strict_reports_unresolved() {
        let tables = vec![table("users", vec![field("id", true)])];
        let refs = vec![reference(
            ("ghost", "user_id", Relation::Many),
            ("users", "id", Relation::One),
        )];
        let shapes = build(&tables, &refs);

        let err = resolve(&shapes, &refs).strict().unwrap_err();
        assert_eq!(
            err.to_string(),
            "1 unresolved reference(s): ghost.user_id > users.id (1 matches)"
        );
    }

    #[test]
    fn test_connector_cell() {
        let connector = Connector {
            source: "a-2".to_string(),
            target: "b-2".to_string(),
            start: Arrowhead::MandatoryOne,
            end: Arrowhead::OneToMany,
        };
        let cell = connector.into_cell("e-0".to_string(), &StyleCatalog::default());
        assert_eq!(cell.parent, "1");
        assert!(cell.geometry.relative);
        assert!(cell.style.contains("startArrow=ERmandOne;"));
        assert_eq!(
            cell.kind,
            CellKind::Edge {
                source: Some("a-2".to_string()),
                target: Some("b-2".to_string()),
            }
        );
    }
}
