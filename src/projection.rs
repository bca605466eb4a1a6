//! Graph Projection
//!
//! Turns the analyzed entity map and relation list into positioned nodes and
//! column-anchored edges for a diagram renderer.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::model::{Cardinality, Column, EntityMap, Index, Relation};

/// Position on the diagram canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Payload rendered inside an entity node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub name: String,
    pub table_name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    /// Relations where this entity is either end
    pub relations: Vec<Relation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    pub data: NodeData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub from_column: String,
    pub to_column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_update: Option<String>,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: String,
    pub target_handle: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub data: EdgeData,
}

/// Projected diagram
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Which end of an edge a column anchor serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    Source,
    Target,
}

/// Anchor name for a column port: `<entity>-<column>-source|target`
pub fn handle_id(entity: &str, column: &str, port: Port) -> String {
    let suffix = match port {
        Port::Source => "source",
        Port::Target => "target",
    };
    format!("{}-{}-{}", entity, column, suffix)
}

/// Fixed-grid projector
#[derive(Debug, Clone)]
pub struct GraphProjector {
    columns: usize,
    spacing_x: f64,
    spacing_y: f64,
}

impl Default for GraphProjector {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl GraphProjector {
    pub fn new(layout: &LayoutConfig) -> Self {
        Self {
            columns: layout.columns.max(1),
            spacing_x: layout.spacing_x,
            spacing_y: layout.spacing_y,
        }
    }

    /// Grid cell for the `index`-th entity
    pub fn position(&self, index: usize) -> Position {
        Position {
            x: (index % self.columns) as f64 * self.spacing_x,
            y: (index / self.columns) as f64 * self.spacing_y,
        }
    }

    pub fn project(&self, entities: &EntityMap, relations: &[Relation]) -> EntityGraph {
        EntityGraph {
            nodes: self.nodes(entities, relations),
            edges: edges(relations),
        }
    }

    /// One node per entity, laid out in map order
    pub fn nodes(&self, entities: &EntityMap, relations: &[Relation]) -> Vec<GraphNode> {
        entities
            .values()
            .enumerate()
            .map(|(index, entity)| GraphNode {
                id: entity.name.clone(),
                kind: "entityNode".to_string(),
                position: self.position(index),
                data: NodeData {
                    name: entity.name.clone(),
                    table_name: entity.table_name.clone(),
                    columns: entity.columns.clone(),
                    indexes: entity.indexes.clone(),
                    relations: relations.iter().filter(|r| r.touches(&entity.name)).cloned().collect(),
                    description: entity.description.clone(),
                },
            })
            .collect()
    }
}

/// One edge per relation, anchored on the relation's columns
pub fn edges(relations: &[Relation]) -> Vec<GraphEdge> {
    relations
        .iter()
        .map(|rel| GraphEdge {
            id: rel.id.clone(),
            source: rel.from_entity.clone(),
            target: rel.to_entity.clone(),
            source_handle: handle_id(&rel.from_entity, &rel.from_column, Port::Source),
            target_handle: handle_id(&rel.to_entity, &rel.to_column, Port::Target),
            kind: "smoothstep".to_string(),
            label: rel.cardinality.to_string(),
            data: EdgeData {
                from_column: rel.from_column.clone(),
                to_column: rel.to_column.clone(),
                on_delete: rel.on_delete.clone(),
                on_update: rel.on_update.clone(),
                cardinality: rel.cardinality,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, RelationType};

    fn entity(name: &str) -> Entity {
        Entity {
            name: name.to_string(),
            table_name: name.to_lowercase(),
            columns: Vec::new(),
            indexes: Vec::new(),
            relations: Vec::new(),
            description: None,
        }
    }

    #[test]
    fn test_grid_positions() {
        let projector = GraphProjector::default();
        assert_eq!(projector.position(0), Position { x: 0.0, y: 0.0 });
        assert_eq!(projector.position(2), Position { x: 800.0, y: 0.0 });
        assert_eq!(projector.position(3), Position { x: 0.0, y: 350.0 });
        assert_eq!(projector.position(7), Position { x: 400.0, y: 700.0 });
    }

    #[test]
    fn test_node_relation_subset() {
        let map: EntityMap = ["A", "B", "C"].iter().map(|n| (n.to_string(), entity(n))).collect();
        let relations = vec![
            Relation::new(RelationType::ManyToOne, "A", "b_id", "B", "id", "b"),
            Relation::new(RelationType::ManyToOne, "C", "b_id", "B", "id", "b"),
        ];

        let graph = GraphProjector::default().project(&map, &relations);
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[0].data.relations.len(), 1);
        assert_eq!(graph.nodes[1].data.relations.len(), 2);
        assert_eq!(graph.nodes[2].position, Position { x: 800.0, y: 0.0 });
    }

    #[test]
    fn test_edges_use_column_handles() {
        let relations = vec![
            Relation::new(RelationType::ManyToOne, "Transfer", "from_account_id", "Account", "id", "from"),
            Relation::new(RelationType::ManyToOne, "Transfer", "to_account_id", "Account", "id", "to"),
        ];

        let edges = edges(&relations);
        assert_eq!(edges[0].source_handle, "Transfer-from_account_id-source");
        assert_eq!(edges[1].source_handle, "Transfer-to_account_id-source");
        assert_eq!(edges[0].target_handle, "Account-id-target");
        assert_eq!(edges[0].label, "1:n");
        assert_ne!(edges[0].id, edges[1].id);
    }
}
