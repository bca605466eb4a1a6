//! Relation Analysis
//!
//! Cross-references the relations collected from a whole batch against the
//! batch's entity map: drops dangling links, settles cardinality and
//! collapses duplicates by derived id.

use std::collections::HashSet;
use tracing::debug;

use crate::model::{Cardinality, EntityMap, Relation, RelationType};

/// Analyze relations in input order.
///
/// - relations whose `from_entity` or `to_entity` is missing are dropped
/// - cardinality: `one-to-one` -> 1:1, `many-to-many` -> n:n, otherwise 1:n
///   upgraded to 1:1 when the source column is unique or a primary key
/// - first relation wins for each id; output keeps first-seen order
pub fn analyze_relations<I>(relations: I, entities: &EntityMap) -> Vec<Relation>
where
    I: IntoIterator<Item = Relation>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut analyzed = Vec::new();
    let mut dangling = 0usize;

    for mut rel in relations {
        let (Some(from), true) = (entities.get(&rel.from_entity), entities.contains_key(&rel.to_entity)) else {
            debug!(relation = %rel.id, "dropping relation to entity outside this batch");
            dangling += 1;
            continue;
        };

        rel.cardinality = match rel.relation_type {
            RelationType::OneToOne => Cardinality::OneToOne,
            RelationType::ManyToMany => Cardinality::ManyToMany,
            RelationType::ManyToOne => match from.column(&rel.from_column) {
                Some(col) if col.unique || col.primary_key => Cardinality::OneToOne,
                _ => Cardinality::OneToMany,
            },
        };

        rel.id = Relation::make_id(&rel.from_entity, &rel.from_column, &rel.to_entity, &rel.to_column);
        if !seen.insert(rel.id.clone()) {
            continue;
        }

        analyzed.push(rel);
    }

    if dangling > 0 {
        debug!(dangling, kept = analyzed.len(), "relation analysis complete");
    }

    analyzed
}
