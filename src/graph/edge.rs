use serde::Serialize;
use std::{cmp::Ordering, fmt};

use super::Weight;

/// A weighted connection from `source` to `destination`.
///
/// Edges are ordered by weight alone so they can be fed to a priority queue,
/// while equality and hashing consider all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge<T> {
    source: T,
    destination: T,
    weight: Weight,
}

impl<T> Edge<T> {
    pub fn new(source: T, destination: T, weight: Weight) -> Self {
        Self {
            source,
            destination,
            weight,
        }
    }

    pub fn source(&self) -> &T {
        &self.source
    }

    pub fn destination(&self) -> &T {
        &self.destination
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    /// Same endpoints travelled the other way
    pub fn reversed(self) -> Self {
        Self {
            source: self.destination,
            destination: self.source,
            weight: self.weight,
        }
    }

    pub fn into_parts(self) -> (T, T, Weight) {
        (self.source, self.destination, self.weight)
    }
}

/// Sum of the edge weights, saturating at [`Weight::MAX`]
pub fn total_weight<T>(edges: &[Edge<T>]) -> Weight {
    edges
        .iter()
        .fold(0, |total: Weight, edge| total.saturating_add(edge.weight()))
}

impl<T: Eq> PartialOrd for Edge<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Eq> Ord for Edge<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight.cmp(&other.weight)
    }
}

impl<T: fmt::Display> fmt::Display for Edge<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}; {}>", self.source, self.destination, self.weight)
    }
}
