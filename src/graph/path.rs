use rustc_hash::FxHashMap as HashMap;
use tracing::{debug, trace};

use super::{edge::total_weight, frontier::Frontier, Edge, Graph, Vertex, Weight};
use crate::error::{GraphError, Result};

impl<T: Vertex> Graph<T> {
    /// Cheapest path from `source` to `destination` by uniform-cost search,
    /// in O(E log E) time.
    ///
    /// Returns `Ok(None)` when the destination cannot be reached and an empty
    /// path when both ends are the same vertex. Each returned edge carries its
    /// own weight, not the running total.
    ///
    /// Weights are assumed to be non-negative, which [`Graph::add_edge`] enforces.
    pub fn shortest_path_between(
        &self,
        source: &T,
        destination: &T,
    ) -> Result<Option<Vec<Edge<T>>>> {
        for vertex in [source, destination] {
            if !self.contains_vertex(vertex) {
                return Err(GraphError::NotFound(format!("vertex {:?}", vertex)));
            }
        }
        if source == destination {
            return Ok(Some(vec![]));
        }

        // Settled vertex -> edge that reached it, weighted with the total
        // cost from the source. The source itself has no such edge.
        let mut connected: HashMap<T, Option<Edge<T>>> = HashMap::default();
        connected.insert(source.clone(), None);
        let mut frontier = Frontier::default();

        let mut newest = source.clone();
        let mut newest_cost: Weight = 0;
        while !connected.contains_key(destination) {
            for (neighbor, weight) in self.neighbors(&newest) {
                if !connected.contains_key(neighbor) {
                    frontier.push(Edge::new(
                        newest.clone(),
                        neighbor.clone(),
                        newest_cost.saturating_add(weight),
                    ));
                }
            }

            let Some(cheapest) = frontier.pop_unsettled(|vertex| connected.contains_key(vertex))
            else {
                debug!(
                    "No path from {:?} to {:?} after settling {} vertices",
                    source,
                    destination,
                    connected.len()
                );
                return Ok(None);
            };
            trace!(
                "Settled {:?} at cost {} ({} candidates left)",
                cheapest.destination(),
                cheapest.weight(),
                frontier.len()
            );
            newest = cheapest.destination().clone();
            newest_cost = cheapest.weight();
            connected.insert(newest.clone(), Some(cheapest));
        }

        let mut path = vec![];
        let mut vertex = destination;
        while let Some(Some(reached_by)) = connected.get(vertex) {
            let previous = reached_by.source();
            path.push(Edge::new(
                previous.clone(),
                vertex.clone(),
                self.edge_weight(previous, vertex),
            ));
            vertex = previous;
        }
        path.reverse();

        debug!(
            "Shortest path from {:?} to {:?} has {} edges and costs {}",
            source,
            destination,
            path.len(),
            newest_cost
        );
        Ok(Some(path))
    }

    /// Total weight of [`Graph::shortest_path_between`], `Ok(None)` if
    /// unreachable. Saturates at [`Weight::MAX`].
    pub fn shortest_path_weight(&self, source: &T, destination: &T) -> Result<Option<Weight>> {
        Ok(self
            .shortest_path_between(source, destination)?
            .map(|path| total_weight(&path)))
    }

}
