//! PlantUML entity diagram output.

use crate::ast::{Relation, Schema, Table};

pub const DEFAULT_TITLE: &str = "Add Title Here";

/// Render a Schema as a PlantUML entity diagram.
pub fn render(schema: &Schema, title: &str) -> String {
    let mut lines: Vec<String> = vec![
        "@startuml".to_string(),
        String::new(),
        "!theme plain".to_string(),
        "hide circle".to_string(),
        "skinparam linetype ortho".to_string(),
        format!("title {}", title),
        String::new(),
    ];

    for e in &schema.enums {
        lines.push(format!("enum {} {{", e.name));
        for value in &e.values {
            lines.push(format!("  {}", value));
        }
        lines.push("}".to_string());
        lines.push(String::new());
    }

    for table in &schema.tables {
        render_entity(&mut lines, schema, table);
    }

    for r in &schema.refs {
        let [left, right] = &r.endpoints;
        let start = if right.relation == Relation::Many {
            format!("{} }}o", entity_name(&right.qualified_name()))
        } else {
            String::new()
        };
        lines.push(format!("{}--|| {}", start, entity_name(&left.qualified_name())));
    }

    lines.push(String::new());
    lines.push("@enduml".to_string());
    lines.join("\n")
}

/// Primary keys first, then a divider, then the remaining fields.
fn render_entity(lines: &mut Vec<String>, schema: &Schema, table: &Table) {
    let name = entity_name(&table.qualified_name());
    lines.push(format!("entity {} {{", name));

    let (keys, others): (Vec<_>, Vec<_>) = table.fields.iter().partition(|f| f.pk);
    let autoinc = |increment: bool| if increment { " <<autoinc>> " } else { "" };

    for field in &keys {
        lines.push(format!(" * {} : {}{}", field.name, field.typ, autoinc(field.increment)));
    }
    if !keys.is_empty() {
        lines.push(" --".to_string());
    }

    let mut enum_links = Vec::new();
    for field in &others {
        if schema.enums.iter().any(|e| e.name == field.typ) {
            enum_links.push(format!("{} -- {}", name, field.typ));
        }
        lines.push(format!(" {} : {}{}", field.name, field.typ, autoinc(field.increment)));
    }

    lines.push("}".to_string());
    lines.push(String::new());

    if !enum_links.is_empty() {
        lines.extend(enum_links);
        lines.push(String::new());
    }
}

/// PlantUML identifiers cannot hold spaces: `user types` becomes `UserTypes`.
/// Names without spaces are kept as written.
pub fn entity_name(name: &str) -> String {
    if !name.contains(' ') {
        return name.split_whitespace().collect();
    }
    name.to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect()
}
