use tracing::debug;

use super::{edge::total_weight, frontier::Frontier, Edge, Graph, Vertex};
use crate::error::{GraphError, Result};

impl<T: Vertex> Graph<T> {
    /// Compute the MST with Prim's algorithm in O(E log(E)) time.
    ///
    /// The tree is returned as a new undirected graph. `Ok(None)` means the
    /// graph is disconnected and has no spanning tree.
    pub fn minimum_spanning_tree(&self) -> Result<Option<Graph<T>>> {
        if self.is_directed() {
            return Err(GraphError::InvalidState(
                "a minimum spanning tree needs an undirected graph".into(),
            ));
        }

        let mut tree = Graph::undirected();
        // Kickstart MST with 1 vertex
        let Some(first_vertex) = self.adjacency.keys().next() else {
            return Ok(Some(tree));
        };
        tree.add_vertex(first_vertex.clone())?;

        let mut edge_priority_queue = Frontier::default();
        let mut newest = first_vertex.clone();
        for _ in 1..self.vertex_count() {
            // Claim: the source of every queued edge is already in the tree,
            // because edges are only queued outwards from its newest vertex.
            for (neighbor, weight) in self.neighbors(&newest) {
                if !tree.contains_vertex(neighbor) {
                    edge_priority_queue.push(Edge::new(newest.clone(), neighbor.clone(), weight));
                }
            }

            let Some(shortest_edge) =
                edge_priority_queue.pop_unsettled(|vertex| tree.contains_vertex(vertex))
            else {
                debug!(
                    "Graph is disconnected, tree stopped at {} of {} vertices",
                    tree.vertex_count(),
                    self.vertex_count()
                );
                return Ok(None);
            };

            newest = shortest_edge.destination().clone();
            tree.add_vertex(newest.clone())?;
            tree.add_edge_value(shortest_edge)?;
        }

        debug!(
            "Spanning tree over {} vertices weighs {}",
            tree.vertex_count(),
            total_weight(&tree.edges())
        );
        Ok(Some(tree))
    }
}
