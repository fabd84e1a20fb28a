//! Field labels and key classification.

use crate::ast::{Field, Ref, Relation, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    PrimaryKey,
    ForeignKey,
    Plain,
}

impl KeyKind {
    /// Text shown in the key-indicator cell.
    pub fn marker(self) -> &'static str {
        match self {
            KeyKind::PrimaryKey => "PK",
            KeyKind::ForeignKey => "FK",
            KeyKind::Plain => "",
        }
    }

    pub fn is_key(self) -> bool {
        self != KeyKind::Plain
    }
}

/// A field is a foreign key when some reference endpoint on its table lists
/// it on the `many` side. Primary key wins over foreign key.
pub fn classify(field: &Field, table: &Table, refs: &[Ref]) -> KeyKind {
    if field.pk {
        return KeyKind::PrimaryKey;
    }

    let many_side = refs
        .iter()
        .flat_map(|r| r.endpoints.iter())
        .any(|e| e.relation == Relation::Many && e.includes(&field.name) && table.is_named(e));

    if many_side {
        KeyKind::ForeignKey
    } else {
        KeyKind::Plain
    }
}

/// `name TYPE [PRIMARY KEY, AUTO INCREMENT, UNIQUE, NOT NULL, DEFAULT = v]`,
/// listing only the constraints that apply.
pub fn label(field: &Field) -> String {
    let mut label = format!("{} {}", field.name, field.typ.to_uppercase());

    let mut args: Vec<String> = Vec::new();
    if field.pk {
        args.push("PRIMARY KEY".to_string());
    }
    if field.increment {
        args.push("AUTO INCREMENT".to_string());
    }
    if field.unique {
        args.push("UNIQUE".to_string());
    }
    if field.not_null {
        args.push("NOT NULL".to_string());
    }
    if let Some(default) = &field.default {
        args.push(format!("DEFAULT = {}", default));
    }

    if !args.is_empty() {
        label.push_str(" [");
        label.push_str(&args.join(", "));
        label.push(']');
    }

    label
}
