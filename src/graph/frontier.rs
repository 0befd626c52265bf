use std::{cmp::Ordering, cmp::Reverse, collections::BinaryHeap};

use super::Edge;

/// Heap entry ordered by edge weight, then by push order so equal weights
/// come out first-in first-out.
struct Candidate<T> {
    order: u64,
    edge: Edge<T>,
}

impl<T: Eq> PartialEq for Candidate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: Eq> Eq for Candidate<T> {}

impl<T: Eq> PartialOrd for Candidate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Eq> Ord for Candidate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.edge
            .cmp(&other.edge)
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// Candidate edges leading out of a settled region, cheapest first.
///
/// Edges are pushed speculatively and never updated in place. An edge whose
/// destination was settled after it was pushed is stale and gets dropped when
/// it reaches the top of the heap.
pub(crate) struct Frontier<T> {
    heap: BinaryHeap<Reverse<Candidate<T>>>,
    pushed: u64,
}

impl<T: Eq> Default for Frontier<T> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            pushed: 0,
        }
    }
}

impl<T: Eq> Frontier<T> {
    pub fn push(&mut self, edge: Edge<T>) {
        self.heap.push(Reverse(Candidate {
            order: self.pushed,
            edge,
        }));
        self.pushed += 1;
    }

    /// Cheapest edge whose destination is not settled yet, discarding stale
    /// edges along the way.
    pub fn pop_unsettled<F>(&mut self, mut is_settled: F) -> Option<Edge<T>>
    where
        F: FnMut(&T) -> bool,
    {
        while let Some(Reverse(candidate)) = self.heap.pop() {
            if !is_settled(candidate.edge.destination()) {
                return Some(candidate.edge);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }
}
