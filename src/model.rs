//! Canonical entity model
//!
//! Every descriptor dialect funnels into these records. Downstream stages
//! (relation analysis, graph projection) only ever see this shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entities keyed by name, in the order they were parsed
pub type EntityMap = IndexMap<String, Entity>;

// =============================================================================
// Column / Index
// =============================================================================

/// A single column of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Type with length / precision / enum annotation, e.g. `varchar(50)`
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: bool,
    pub unique: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Synthesized from relation metadata rather than declared
    #[serde(default)]
    pub generated: bool,
}

impl Column {
    /// Foreign key column synthesized for the owning side of a relation
    pub fn join_column(name: impl Into<String>, nullable: bool, unique: bool) -> Self {
        Self {
            name: name.into(),
            column_type: "int".to_string(),
            nullable,
            unique,
            primary_key: false,
            auto_increment: false,
            default: None,
            generated: true,
        }
    }
}

/// Descriptive index record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub unique: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

// =============================================================================
// Relation
// =============================================================================

/// Owning-side relation kinds; `one-to-many` is never materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationType {
    ManyToOne,
    OneToOne,
    ManyToMany,
}

impl RelationType {
    /// Map a declared type string; anything unrecognised is many-to-one
    pub fn from_declared(value: Option<&str>) -> Self {
        match value {
            Some("one-to-one") => Self::OneToOne,
            Some("many-to-many") => Self::ManyToMany,
            _ => Self::ManyToOne,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManyToOne => "many-to-one",
            Self::OneToOne => "one-to-one",
            Self::ManyToMany => "many-to-many",
        }
    }

    /// Cardinality implied by the declared type alone
    pub fn declared_cardinality(&self) -> Cardinality {
        match self {
            Self::OneToOne => Cardinality::OneToOne,
            Self::ManyToMany => Cardinality::ManyToMany,
            Self::ManyToOne => Cardinality::OneToMany,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagram label for a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:n")]
    OneToMany,
    #[serde(rename = "n:n")]
    ManyToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "1:1",
            Self::OneToMany => "1:n",
            Self::ManyToMany => "n:n",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TypeORM `cascade` is either a flag or a list of operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cascade {
    Flag(bool),
    Operations(Vec<String>),
}

/// A foreign-key link between two entities.
///
/// Relations are value objects: identity is the derived [`Relation::id`],
/// never the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub from_entity: String,
    pub from_column: String,
    pub to_entity: String,
    pub to_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade: Option<Cascade>,
    pub name: String,
    /// Declared default until the analyzer refines it
    pub cardinality: Cardinality,
}

impl Relation {
    pub fn new(
        relation_type: RelationType,
        from_entity: impl Into<String>,
        from_column: impl Into<String>,
        to_entity: impl Into<String>,
        to_column: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let from_entity = from_entity.into();
        let from_column = from_column.into();
        let to_entity = to_entity.into();
        let to_column = to_column.into();
        Self {
            id: Self::make_id(&from_entity, &from_column, &to_entity, &to_column),
            relation_type,
            from_entity,
            from_column,
            to_entity,
            to_column,
            on_delete: None,
            on_update: None,
            cascade: None,
            name: name.into(),
            cardinality: relation_type.declared_cardinality(),
        }
    }

    /// Deduplication key: `from.col-to.col`
    pub fn make_id(from_entity: &str, from_column: &str, to_entity: &str, to_column: &str) -> String {
        format!("{}.{}-{}.{}", from_entity, from_column, to_entity, to_column)
    }

    pub fn with_actions(mut self, on_delete: Option<String>, on_update: Option<String>) -> Self {
        self.on_delete = on_delete;
        self.on_update = on_update;
        self
    }

    pub fn with_cascade(mut self, cascade: Option<Cascade>) -> Self {
        self.cascade = cascade;
        self
    }

    /// True when `entity` sits on either end
    pub fn touches(&self, entity: &str) -> bool {
        self.from_entity == entity || self.to_entity == entity
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A normalized table/entity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub table_name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    /// Relations owned by this entity (`from_entity == name`)
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_id_is_derived() {
        let rel = Relation::new(RelationType::ManyToOne, "Order", "user_id", "User", "id", "user");
        assert_eq!(rel.id, "Order.user_id-User.id");
        assert_eq!(rel.cardinality, Cardinality::OneToMany);
    }

    #[test]
    fn test_relation_type_fallback() {
        assert_eq!(RelationType::from_declared(Some("many-to-many")), RelationType::ManyToMany);
        assert_eq!(RelationType::from_declared(Some("belongs-to")), RelationType::ManyToOne);
        assert_eq!(RelationType::from_declared(None), RelationType::ManyToOne);
    }

    #[test]
    fn test_serialized_shape() {
        let rel = Relation::new(RelationType::OneToOne, "Profile", "user_id", "User", "id", "user");
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "one-to-one");
        assert_eq!(json["cardinality"], "1:1");
        assert_eq!(json["fromColumn"], "user_id");
        assert!(json.get("onDelete").is_none());
    }

    #[test]
    fn test_cascade_untagged() {
        let flag: Cascade = serde_json::from_str("true").unwrap();
        assert_eq!(flag, Cascade::Flag(true));
        let ops: Cascade = serde_json::from_str(r#"["insert","update"]"#).unwrap();
        assert_eq!(ops, Cascade::Operations(vec!["insert".into(), "update".into()]));
    }
}
