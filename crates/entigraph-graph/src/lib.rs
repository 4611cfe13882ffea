//! entigraph-graph - Typed, deduplicated entity graph
//!
//! Consumes the uniform entity sequence and assembles a bipartite graph:
//! one type node per category seen, one instance node per distinct entity
//! text, one undirected edge from each instance to its category. Repeat
//! mentions collapse onto existing nodes through explicit insert-if-absent
//! operations on the key maps; there is no exception path around duplicate
//! insertion.

pub mod render;

pub use render::{render_entities, render_graph, RenderArtifact};

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use entigraph_core::{Entity, EntityLabel, Result};

/// Node payload: a category, or one distinct entity text.
///
/// An instance node records the category it was first seen with; that
/// category drives its rendering attributes and its single edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphNode {
    Type { label: EntityLabel },
    Instance { text: String, label: EntityLabel },
}

/// A same-text entity arriving under a second category. First-write-wins
/// on the node; the conflict is surfaced instead of silently resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelConflict {
    pub text: String,
    pub kept: EntityLabel,
    pub rejected: EntityLabel,
}

/// The assembled graph. Built fresh on every pipeline run, never merged
/// incrementally across runs.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    graph: UnGraph<GraphNode, ()>,
    type_index: HashMap<EntityLabel, NodeIndex>,
    instance_index: HashMap<String, NodeIndex>,
    conflicts: Vec<LabelConflict>,
}

impl EntityGraph {
    /// Assemble a graph from an ordered entity list.
    ///
    /// Any label outside the closed enumeration is a hard error; entities
    /// are never silently dropped.
    pub fn assemble(entities: &[Entity]) -> Result<Self> {
        let mut graph = Self::default();
        for entity in entities {
            let label = entity.category()?;
            graph.insert(&entity.text, label);
        }
        Ok(graph)
    }

    /// Record one entity mention.
    fn insert(&mut self, text: &str, label: EntityLabel) {
        // The category node exists for every label seen, even one that
        // loses a conflict below.
        let type_node = self.ensure_type(label);

        match self.instance_index.get(text) {
            Some(&node) => {
                let committed = match &self.graph[node] {
                    GraphNode::Instance { label, .. } => *label,
                    GraphNode::Type { .. } => unreachable!("instance index points at type node"),
                };
                if committed != label {
                    tracing::warn!(
                        text,
                        kept = %committed,
                        rejected = %label,
                        "conflicting label for entity text, keeping first-seen"
                    );
                    self.conflicts.push(LabelConflict {
                        text: text.to_string(),
                        kept: committed,
                        rejected: label,
                    });
                }
                // The instance keeps its single edge to the committed
                // category; a repeat mention adds nothing.
            }
            None => {
                let node = self.graph.add_node(GraphNode::Instance {
                    text: text.to_string(),
                    label,
                });
                self.instance_index.insert(text.to_string(), node);
                self.graph.update_edge(type_node, node, ());
            }
        }
    }

    /// Insert-if-absent for category nodes
    fn ensure_type(&mut self, label: EntityLabel) -> NodeIndex {
        if let Some(&node) = self.type_index.get(&label) {
            return node;
        }
        let node = self.graph.add_node(GraphNode::Type { label });
        self.type_index.insert(label, node);
        node
    }

    /// Number of category nodes
    pub fn type_count(&self) -> usize {
        self.type_index.len()
    }

    /// Number of distinct entity instances
    pub fn instance_count(&self) -> usize {
        self.instance_index.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// The committed category for an instance text, if present
    pub fn instance_label(&self, text: &str) -> Option<EntityLabel> {
        self.instance_index
            .get(text)
            .map(|&node| match &self.graph[node] {
                GraphNode::Instance { label, .. } => *label,
                GraphNode::Type { .. } => unreachable!("instance index points at type node"),
            })
    }

    /// Whether a category node exists
    pub fn has_type(&self, label: EntityLabel) -> bool {
        self.type_index.contains_key(&label)
    }

    /// Label conflicts observed during assembly, in encounter order
    pub fn conflicts(&self) -> &[LabelConflict] {
        &self.conflicts
    }

    /// Nodes in insertion order, with their stable ids
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &GraphNode)> + '_ {
        self.graph
            .node_indices()
            .map(|idx| (idx.index(), &self.graph[idx]))
    }

    /// Edges as (node id, node id) pairs, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.graph
            .edge_references()
            .map(|edge| (edge.source().index(), edge.target().index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entigraph_core::EngineError;

    fn entities(pairs: &[(&str, &str)]) -> Vec<Entity> {
        pairs.iter().map(|(t, l)| Entity::new(*t, *l)).collect()
    }

    #[test]
    fn test_basic_assembly() {
        let graph =
            EntityGraph::assemble(&entities(&[("Apple", "ORG"), ("California", "GPE")])).unwrap();

        assert_eq!(graph.type_count(), 2);
        assert_eq!(graph.instance_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_type(EntityLabel::Org));
        assert!(graph.has_type(EntityLabel::Gpe));
        assert_eq!(graph.instance_label("Apple"), Some(EntityLabel::Org));
        assert_eq!(graph.instance_label("California"), Some(EntityLabel::Gpe));
    }

    #[test]
    fn test_repeat_mentions_collapse() {
        let graph = EntityGraph::assemble(&entities(&[
            ("Apple", "ORG"),
            ("Apple", "ORG"),
            ("Apple", "ORG"),
        ]))
        .unwrap();

        assert_eq!(graph.type_count(), 1);
        assert_eq!(graph.instance_count(), 1);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.conflicts().is_empty());
    }

    #[test]
    fn test_counts_follow_distinct_texts_and_labels() {
        let graph = EntityGraph::assemble(&entities(&[
            ("Apple", "ORG"),
            ("Google", "ORG"),
            ("Apple", "ORG"),
            ("California", "GPE"),
        ]))
        .unwrap();

        assert_eq!(graph.type_count(), 2); // ORG, GPE
        assert_eq!(graph.instance_count(), 3); // Apple, Google, California
        assert_eq!(graph.edge_count(), 3); // one per instance
    }

    #[test]
    fn test_conflicting_label_keeps_first_seen() {
        let graph =
            EntityGraph::assemble(&entities(&[("Apple", "ORG"), ("Apple", "GPE")])).unwrap();

        // First-write-wins on the instance; the rejected label still gets
        // its category node, but no second edge appears.
        assert_eq!(graph.instance_label("Apple"), Some(EntityLabel::Org));
        assert_eq!(graph.type_count(), 2);
        assert_eq!(graph.instance_count(), 1);
        assert_eq!(graph.edge_count(), 1);

        assert_eq!(
            graph.conflicts(),
            &[LabelConflict {
                text: "Apple".to_string(),
                kept: EntityLabel::Org,
                rejected: EntityLabel::Gpe,
            }]
        );
    }

    #[test]
    fn test_unknown_label_is_hard_error() {
        let err = EntityGraph::assemble(&entities(&[("Apple", "BOGUS")])).unwrap_err();
        assert!(matches!(err, EngineError::UnknownLabel(ref s) if s == "BOGUS"));
    }

    #[test]
    fn test_empty_entity_list_builds_empty_graph() {
        let graph = EntityGraph::assemble(&[]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let input = entities(&[
            ("Apple", "ORG"),
            ("California", "GPE"),
            ("Apple", "ORG"),
            ("Google", "ORG"),
        ]);

        let a = EntityGraph::assemble(&input).unwrap();
        let b = EntityGraph::assemble(&input).unwrap();

        let nodes_a: Vec<_> = a.nodes().map(|(id, n)| (id, n.clone())).collect();
        let nodes_b: Vec<_> = b.nodes().map(|(id, n)| (id, n.clone())).collect();
        assert_eq!(nodes_a, nodes_b);

        let edges_a: Vec<_> = a.edges().collect();
        let edges_b: Vec<_> = b.edges().collect();
        assert_eq!(edges_a, edges_b);
    }
}
