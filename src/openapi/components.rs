//! Component Reference Graph
//!
//! Directed graph over a document's named schemas, one edge per `$ref`
//! found inside a schema body. Used to list the schemas other schemas depend
//! on and to find reference cycles.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::resolve::ref_name;

/// Where inside the referencing schema a `$ref` was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefSite {
    Ref,
    Property,
    Items,
    AllOf,
    AnyOf,
    OneOf,
    AdditionalProperties,
}

pub struct ComponentGraph {
    graph: DiGraph<String, RefSite>,
    indices: HashMap<String, NodeIndex>,
}

impl ComponentGraph {
    /// Build from a schema map; references to unknown names are ignored
    pub fn build(schemas: &Map<String, Value>) -> Self {
        let mut graph = DiGraph::with_capacity(schemas.len(), schemas.len() * 2);
        let mut indices = HashMap::with_capacity(schemas.len());

        for name in schemas.keys() {
            indices.insert(name.clone(), graph.add_node(name.clone()));
        }

        for (name, schema) in schemas {
            let mut refs = Vec::new();
            collect_refs(schema, RefSite::Ref, &mut refs);

            let from = indices[name];
            for (target, site) in refs {
                if let Some(&to) = indices.get(&target) {
                    graph.add_edge(from, to, site);
                }
            }
        }

        Self { graph, indices }
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Names referenced by at least one schema, in document order
    pub fn referenced_schemas(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph.edges_directed(idx, Direction::Incoming).next().is_some())
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Direct dependencies of one schema
    pub fn dependencies(&self, name: &str) -> Vec<(&str, RefSite)> {
        let Some(&idx) = self.indices.get(name) else {
            return Vec::new();
        };

        let mut deps: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()].as_str(), *e.weight()))
            .collect();
        deps.reverse();
        deps
    }

    /// Reference cycles: multi-member strongly connected groups plus
    /// self-referencing schemas
    pub fn cycles(&self) -> Vec<Vec<&str>> {
        kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1
                    || self
                        .graph
                        .edges_directed(scc[0], Direction::Outgoing)
                        .any(|e| e.target() == scc[0])
            })
            .map(|mut scc| {
                scc.sort();
                scc.into_iter().map(|idx| self.graph[idx].as_str()).collect()
            })
            .collect()
    }
}

fn collect_refs(schema: &Value, site: RefSite, refs: &mut Vec<(String, RefSite)>) {
    let Some(obj) = schema.as_object() else {
        return;
    };

    if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
        refs.push((ref_name(reference), site));
    }

    match obj.get("items") {
        Some(Value::Array(tuple)) => tuple.iter().for_each(|item| collect_refs(item, RefSite::Items, refs)),
        Some(items) => collect_refs(items, RefSite::Items, refs),
        None => {}
    }

    if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
        for prop in properties.values() {
            collect_refs(prop, RefSite::Property, refs);
        }
    }

    for (keyword, site) in [("allOf", RefSite::AllOf), ("anyOf", RefSite::AnyOf), ("oneOf", RefSite::OneOf)] {
        if let Some(branches) = obj.get(keyword).and_then(Value::as_array) {
            for branch in branches {
                collect_refs(branch, site, refs);
            }
        }
    }

    if let Some(additional @ Value::Object(_)) = obj.get("additionalProperties") {
        collect_refs(additional, RefSite::AdditionalProperties, refs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_referenced_schemas() {
        let map = schemas(json!({
            "Order": { "properties": {
                "customer": { "$ref": "#/components/schemas/Customer" },
                "lines": { "type": "array", "items": { "$ref": "#/components/schemas/OrderLine" } }
            } },
            "Customer": { "type": "object" },
            "OrderLine": { "allOf": [{ "$ref": "#/components/schemas/Product" }] },
            "Product": { "type": "object" },
            "Unused": { "type": "object" },
            "Broken": { "$ref": "#/components/schemas/Nowhere" }
        }));

        let graph = ComponentGraph::build(&map);
        assert_eq!(graph.referenced_schemas(), vec!["Customer", "OrderLine", "Product"]);
        assert_eq!(graph.dependencies("OrderLine"), vec![("Product", RefSite::AllOf)]);
        assert_eq!(
            graph.dependencies("Order"),
            vec![("Customer", RefSite::Property), ("OrderLine", RefSite::Items)]
        );
        assert!(graph.cycles().is_empty());
    }

    #[test]
    fn test_cycles() {
        let map = schemas(json!({
            "A": { "properties": { "b": { "$ref": "#/components/schemas/B" } } },
            "B": { "properties": { "a": { "$ref": "#/components/schemas/A" } } },
            "Tree": { "properties": { "children": { "type": "array", "items": { "$ref": "#/components/schemas/Tree" } } } },
            "Leaf": { "type": "string" }
        }));

        let graph = ComponentGraph::build(&map);
        let mut cycles = graph.cycles();
        cycles.sort();
        assert_eq!(cycles, vec![vec!["A", "B"], vec!["Tree"]]);
    }
}
