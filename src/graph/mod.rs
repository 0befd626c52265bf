//! Weighted graph storage and the algorithms built on it.
//!
//! A [`Graph`] maps every vertex to the weights of its outgoing edges. An
//! undirected graph stores each edge twice, once per direction, and every
//! mutation keeps both entries in lock-step.

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::{fmt::Debug, hash::Hash};
use tracing::trace;

use crate::error::{GraphError, Result};

pub mod edge;
mod frontier;
/// Find the [Minimum Spanning Tree (MST)](https://en.wikipedia.org/wiki/Minimum_spanning_tree)
pub mod mst;
/// Find the [shortest path](https://en.wikipedia.org/wiki/Shortest_path_problem) between two vertices
pub mod path;
/// Solve the [Traveling Salesman Problem (TSP)](https://en.wikipedia.org/wiki/Travelling_salesman_problem)
pub mod tsp;

pub use edge::{total_weight, Edge};
pub use tsp::TourConfig;

/// Edge weight. Stored weights are never negative.
pub type Weight = i64;

/// Returned by [`Graph::edge_weight`] when there is no such edge
pub const NO_EDGE: Weight = -1;
/// Returned by [`Graph::path_length`] when the vertices do not form a walk
pub const NO_PATH: Weight = -1;

/// Anything usable as a vertex: compared and hashed by value.
pub trait Vertex: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Vertex for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Directed,
    Undirected,
}

#[derive(Debug, Clone)]
pub struct Graph<T> {
    adjacency: HashMap<T, HashMap<T, Weight>>,
    direction: Direction,
}

impl<T: Vertex> Graph<T> {
    pub fn new(direction: Direction) -> Self {
        Self {
            adjacency: HashMap::default(),
            direction,
        }
    }

    pub fn directed() -> Self {
        Self::new(Direction::Directed)
    }

    pub fn undirected() -> Self {
        Self::new(Direction::Undirected)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_directed(&self) -> bool {
        self.direction == Direction::Directed
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of logical edges: a mirrored pair counts once
    pub fn edge_count(&self) -> usize {
        let stored = self
            .adjacency
            .values()
            .map(|destinations| destinations.len())
            .sum::<usize>();
        match self.direction {
            Direction::Directed => stored,
            Direction::Undirected => stored / 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains_vertex(&self, vertex: &T) -> bool {
        self.adjacency.contains_key(vertex)
    }

    /// Snapshot of every vertex. The order is arbitrary but identical across
    /// calls as long as the graph is not mutated in between.
    pub fn vertices(&self) -> Vec<T> {
        self.adjacency.keys().cloned().collect()
    }

    /// Outgoing edges of `vertex` as `(destination, weight)`, empty if the
    /// vertex is absent
    pub fn neighbors<'a>(&'a self, vertex: &T) -> impl Iterator<Item = (&'a T, Weight)> + 'a {
        self.adjacency
            .get(vertex)
            .into_iter()
            .flat_map(|destinations| destinations.iter().map(|(to, weight)| (to, *weight)))
    }

    /// Every logical edge once. An undirected pair is reported in only one of
    /// its two stored directions.
    pub fn edges(&self) -> Vec<Edge<T>> {
        let mut listed: HashSet<Edge<T>> = HashSet::default();
        let mut edges = Vec::with_capacity(self.edge_count());
        for (source, destinations) in &self.adjacency {
            for (destination, weight) in destinations {
                let edge = Edge::new(source.clone(), destination.clone(), *weight);
                if self.direction == Direction::Undirected
                    && listed.contains(&edge.clone().reversed())
                {
                    continue;
                }
                if listed.insert(edge.clone()) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    pub fn edge_exists(&self, source: &T, destination: &T) -> bool {
        self.adjacency
            .get(source)
            .map_or(false, |destinations| destinations.contains_key(destination))
    }

    /// Weight of the edge, or [`NO_EDGE`] if there is none
    pub fn edge_weight(&self, source: &T, destination: &T) -> Weight {
        self.adjacency
            .get(source)
            .and_then(|destinations| destinations.get(destination))
            .copied()
            .unwrap_or(NO_EDGE)
    }

    pub fn edge(&self, source: &T, destination: &T) -> Option<Edge<T>> {
        let weight = *self.adjacency.get(source)?.get(destination)?;
        Some(Edge::new(source.clone(), destination.clone(), weight))
    }

    /// Add an unconnected vertex. Adding a vertex twice is rejected.
    pub fn add_vertex(&mut self, vertex: T) -> Result<()> {
        if self.adjacency.contains_key(&vertex) {
            return Err(GraphError::InvalidArgument(format!(
                "vertex {:?} already exists",
                vertex
            )));
        }
        trace!("Adding vertex {:?}", vertex);
        self.adjacency.insert(vertex, HashMap::default());
        Ok(())
    }

    /// Remove a vertex together with every edge leading into or out of it.
    pub fn remove_vertex(&mut self, vertex: &T) -> Result<()> {
        if !self.adjacency.contains_key(vertex) {
            return Err(not_found_vertex(vertex));
        }
        // Edges into the vertex live in the other vertices' maps, for both
        // directed and undirected graphs
        for destinations in self.adjacency.values_mut() {
            destinations.remove(vertex);
        }
        self.adjacency.remove(vertex);
        trace!("Removed vertex {:?}", vertex);
        Ok(())
    }

    /// Insert the edge or overwrite the weight of an existing one. Undirected
    /// graphs get the reverse direction as well.
    pub fn add_edge(&mut self, source: T, destination: T, weight: Weight) -> Result<()> {
        if source == destination {
            return Err(GraphError::InvalidArgument(format!(
                "self-loop on {:?}",
                source
            )));
        }
        if weight < 0 {
            return Err(GraphError::InvalidArgument(format!(
                "negative weight {} from {:?} to {:?}",
                weight, source, destination
            )));
        }
        if !self.adjacency.contains_key(&destination) {
            return Err(not_found_vertex(&destination));
        }
        let destinations = self
            .adjacency
            .get_mut(&source)
            .ok_or_else(|| not_found_vertex(&source))?;

        trace!("Setting edge {:?} -> {:?} to {}", source, destination, weight);
        destinations.insert(destination.clone(), weight);
        if self.direction == Direction::Undirected {
            if let Some(sources) = self.adjacency.get_mut(&destination) {
                sources.insert(source, weight);
            }
        }
        Ok(())
    }

    pub fn add_edge_value(&mut self, edge: Edge<T>) -> Result<()> {
        let (source, destination, weight) = edge.into_parts();
        self.add_edge(source, destination, weight)
    }

    /// Remove the edge, and its mirror for undirected graphs.
    pub fn remove_edge(&mut self, source: &T, destination: &T) -> Result<()> {
        if !self.adjacency.contains_key(source) {
            return Err(not_found_vertex(source));
        }
        if !self.adjacency.contains_key(destination) {
            return Err(not_found_vertex(destination));
        }
        if !self.edge_exists(source, destination) {
            return Err(GraphError::NotFound(format!(
                "edge {:?} -> {:?}",
                source, destination
            )));
        }

        if let Some(destinations) = self.adjacency.get_mut(source) {
            destinations.remove(destination);
        }
        if self.direction == Direction::Undirected {
            if let Some(sources) = self.adjacency.get_mut(destination) {
                sources.remove(source);
            }
        }
        Ok(())
    }

    /// Total weight of walking `path` in order, or [`NO_PATH`] if it is empty,
    /// mentions an unknown vertex, steps between two unconnected vertices or
    /// sums past [`Weight::MAX`].
    ///
    /// The walk is open: no edge from the last vertex back to the first is
    /// counted.
    pub fn path_length(&self, path: &[T]) -> Weight {
        match path.first() {
            Some(first) if self.contains_vertex(first) => path
                .windows(2)
                .map(|pair| self.edge_weight(&pair[0], &pair[1]))
                .try_fold(0, |length: Weight, weight| match weight {
                    NO_EDGE => None,
                    weight => length.checked_add(weight),
                })
                .unwrap_or(NO_PATH),
            _ => NO_PATH,
        }
    }
}

impl<T: Vertex> Default for Graph<T> {
    fn default() -> Self {
        Self::undirected()
    }
}

fn not_found_vertex<T: Debug>(vertex: &T) -> GraphError {
    GraphError::NotFound(format!("vertex {:?}", vertex))
}

/// The eight vertex chain used throughout the tests
#[cfg(test)]
pub(crate) fn hello_graph(direction: Direction) -> Graph<&'static str> {
    let mut graph = Graph::new(direction);
    for vertex in [
        "Hello",
        "my",
        "old",
        "friend.",
        "Perhaps",
        "it",
        "has",
        "been too long.",
    ] {
        graph.add_vertex(vertex).unwrap();
    }
    for (source, destination, weight) in [
        ("Hello", "my", 1),
        ("Hello", "old", 4),
        ("friend.", "it", 44),
        ("been too long.", "Perhaps", 2),
        ("my", "old", 2),
        ("old", "friend.", 6),
        ("friend.", "Perhaps", 11),
        ("Perhaps", "it", 224),
        ("it", "has", 7),
        ("has", "been too long.", 8),
    ] {
        graph.add_edge(source, destination, weight).unwrap();
    }
    graph
}
