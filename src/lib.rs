//! Directed and undirected weighted graphs, with shortest paths, minimum
//! spanning trees and an evolutionary travelling salesman solver on top.

pub mod error;
pub mod graph;
pub mod load;

pub use error::{ErrorKind, GraphError, Result};
pub use graph::{
    total_weight, Direction, Edge, Graph, TourConfig, Vertex, Weight, NO_EDGE, NO_PATH,
};
