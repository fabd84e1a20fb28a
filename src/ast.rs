use std::fmt;

/// Schema assumed for names written without a `schema.` prefix.
pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<Table>,
    pub refs: Vec<Ref>,
    pub enums: Vec<Enum>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// `None` for the default schema.
    pub schema: Option<String>,
    pub name: String,
    pub alias: Option<String>,
    pub fields: Vec<Field>,
    pub note: Option<String>,
}

impl Table {
    pub fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// `core.users`, or just `users` in the default schema.
    pub fn qualified_name(&self) -> String {
        qualify(self.schema_name(), &self.name)
    }

    /// True when `endpoint` points at this table by name or alias.
    pub fn is_named(&self, endpoint: &Endpoint) -> bool {
        endpoint.names(self.schema_name(), &self.name, self.alias.as_deref())
    }
}

fn qualify(schema: &str, name: &str) -> String {
    if schema == DEFAULT_SCHEMA {
        name.to_string()
    } else {
        format!("{}.{}", schema, name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Field {
    pub name: String,
    /// Type as written, arguments included (`varchar(255)`).
    pub typ: String,
    pub pk: bool,
    pub increment: bool,
    pub unique: bool,
    pub not_null: bool,
    pub default: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ref {
    pub name: Option<String>,
    pub endpoints: [Endpoint; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    /// `None` when written without a schema prefix.
    pub schema: Option<String>,
    /// Table name or alias.
    pub table: String,
    pub fields: Vec<String>,
    pub relation: Relation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    One,  // 1
    Many, // *
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: String,
    pub values: Vec<String>,
}

impl Endpoint {
    pub fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    pub fn qualified_name(&self) -> String {
        qualify(self.schema_name(), &self.table)
    }

    /// Names are matched within their schema. Aliases are global, so they
    /// only match when no schema is written.
    pub fn names(&self, schema: &str, name: &str, alias: Option<&str>) -> bool {
        (self.schema_name() == schema && self.table == name)
            || (self.schema.is_none() && alias == Some(self.table.as_str()))
    }

    pub fn includes(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fields.as_slice() {
            [single] => write!(f, "{}.{}", self.qualified_name(), single),
            fields => write!(f, "{}.({})", self.qualified_name(), fields.join(", ")),
        }
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [left, right] = &self.endpoints;
        let op = match (left.relation, right.relation) {
            (Relation::Many, Relation::One) => ">",
            (Relation::One, Relation::Many) => "<",
            (Relation::One, Relation::One) => "-",
            (Relation::Many, Relation::Many) => "<>",
        };
        write!(f, "{} {} {}", left, op, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(table: &str, fields: &[&str], relation: Relation) -> Endpoint {
        Endpoint {
            schema: None,
            table: table.to_string(),
            fields: fields.iter().map(|s| s.to_string()).collect(),
            relation,
        }
    }

    #[test]
    fn test_table_is_named_by_alias() {
        let table = Table {
            name: "users".to_string(),
            alias: Some("U".to_string()),
            ..Default::default()
        };
        let to = |name: &str| endpoint(name, &["id"], Relation::One);
        assert!(table.is_named(&to("users")));
        assert!(table.is_named(&to("U")));
        assert!(!table.is_named(&to("posts")));
    }

    #[test]
    fn test_table_is_named_within_schema() {
        let core = Table {
            schema: Some("core".to_string()),
            name: "users".to_string(),
            alias: Some("CU".to_string()),
            ..Default::default()
        };
        let public = Table {
            name: "users".to_string(),
            ..Default::default()
        };
        let qualified = |schema: &str, name: &str| Endpoint {
            schema: Some(schema.to_string()),
            ..endpoint(name, &["id"], Relation::One)
        };

        assert!(core.is_named(&qualified("core", "users")));
        assert!(!core.is_named(&qualified("auth", "users")));
        assert!(!core.is_named(&endpoint("users", &["id"], Relation::One)));
        assert!(core.is_named(&endpoint("CU", &["id"], Relation::One)));
        assert!(!core.is_named(&qualified("core", "CU")));

        assert!(public.is_named(&endpoint("users", &["id"], Relation::One)));
        assert!(public.is_named(&qualified("public", "users")));
        assert_eq!(core.qualified_name(), "core.users");
        assert_eq!(public.qualified_name(), "users");
    }

    #[test]
    fn test_endpoint_display_keeps_schema() {
        let e = Endpoint {
            schema: Some("core".to_string()),
            ..endpoint("users", &["id"], Relation::One)
        };
        assert_eq!(e.to_string(), "core.users.id");
        let e = Endpoint {
            schema: Some("public".to_string()),
            ..endpoint("users", &["id"], Relation::One)
        };
        assert_eq!(e.to_string(), "users.id");
    }

    #[test]
    fn test_ref_display() {
        let r = Ref {
            name: None,
            endpoints: [
                endpoint("posts", &["user_id"], Relation::Many),
                endpoint("users", &["id"], Relation::One),
            ],
        };
        assert_eq!(r.to_string(), "posts.user_id > users.id");
    }

    #[test]
    fn test_ref_display_composite() {
        let r = Ref {
            name: None,
            endpoints: [
                endpoint("a", &["x", "y"], Relation::One),
                endpoint("b", &["x", "y"], Relation::One),
            ],
        };
        assert_eq!(r.to_string(), "a.(x, y) - b.(x, y)");
    }
}
