//! Loaders for the plain text graph format and for TSPLIB XML instances.
//!
//! ```text
//! 3
//! v1
//! v2
//! v3
//! 2
//! v1,v3,5
//! v2,v1,1
//! ```
//!
//! The first line counts the vertices that follow, one name per line. An
//! optional edge section then counts the `source,destination,weight` rows
//! that follow it. Nothing may come after the last declared row.
//!
//! TSPLIB instances list, for every vertex in document order, the cost of the
//! edges leading out of it:
//!
//! ```text
//! <graph>
//!   <vertex>
//!     <edge cost="2.000000000000000e+01">1</edge>
//!   </vertex>
//!   <vertex>
//!     <edge cost="2.000000000000000e+01">0</edge>
//!   </vertex>
//! </graph>
//! ```

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Read},
    iter::Peekable,
    path::Path,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    error::GraphError,
    graph::{Direction, Graph, Weight},
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read graph: {0}")]
    Io(#[from] io::Error),
    #[error("malformed graph record: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {reason}")]
    Format { line: u64, reason: String },
    #[error("line {line}: {source}")]
    Graph {
        line: u64,
        #[source]
        source: GraphError,
    },
    #[error("malformed TSPLIB document: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("byte {offset}: {reason}")]
    TspFormat { offset: usize, reason: String },
    #[error("byte {offset}: {source}")]
    TspGraph {
        offset: usize,
        #[source]
        source: GraphError,
    },
}

pub fn from_csv_path(
    direction: Direction,
    path: impl AsRef<Path>,
) -> Result<Graph<String>, LoadError> {
    let path = path.as_ref();
    info!("Reading graph from {}", path.display());
    from_csv_reader(direction, File::open(path)?)
}

/// Build a graph from the text format, failing on the first malformed line.
pub fn from_csv_reader<R: Read>(
    direction: Direction,
    reader: R,
) -> Result<Graph<String>, LoadError> {
    let mut records = Records {
        inner: ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader)
            .into_records()
            .peekable(),
        line: 0,
    };
    let mut graph = Graph::new(direction);

    let vertex_count = records.count("vertex count")?;
    for _ in 0..vertex_count {
        let record = records.expect("vertex name")?;
        let name = match record.get(0) {
            Some(name) if record.len() == 1 && !name.is_empty() => name.to_owned(),
            _ => return Err(records.format_error("expected a single non-empty vertex name")),
        };
        graph.add_vertex(name).map_err(|e| records.graph_error(e))?;
    }

    if records.is_done() {
        debug!("Loaded {} vertices without edges", graph.vertex_count());
        return Ok(graph);
    }

    let edge_count = records.count("edge count")?;
    for _ in 0..edge_count {
        let record = records.expect("edge")?;
        let (source, destination, weight) = match (record.get(0), record.get(1), record.get(2)) {
            (Some(source), Some(destination), Some(weight)) if record.len() == 3 => {
                (source, destination, weight)
            }
            _ => {
                return Err(records.format_error(&format!(
                    "expected source,destination,weight but found {} fields",
                    record.len()
                )))
            }
        };
        let weight: Weight = weight
            .parse()
            .map_err(|e| records.format_error(&format!("bad weight {:?}: {}", weight, e)))?;
        graph
            .add_edge(source.to_owned(), destination.to_owned(), weight)
            .map_err(|e| records.graph_error(e))?;
    }

    if !records.is_done() {
        records.expect("end of input")?;
        return Err(records.format_error("unexpected content after the declared edges"));
    }

    debug!(
        "Loaded {} vertices and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(graph)
}

pub fn from_tsp_path(path: impl AsRef<Path>) -> Result<Graph<String>, LoadError> {
    let path = path.as_ref();
    info!("Reading TSPLIB instance from {}", path.display());
    from_tsp_reader(BufReader::new(File::open(path)?))
}

/// Build an undirected graph from a TSPLIB XML instance.
///
/// A vertex is named by its `name` attribute, or else by its position among
/// the vertices. Only the first vertex introduces its destinations, later
/// vertices must refer to known ones. Costs are truncated to whole weights.
pub fn from_tsp_reader<R: BufRead>(reader: R) -> Result<Graph<String>, LoadError> {
    let mut reader = Reader::from_reader(reader);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut graph = Graph::undirected();

    let mut vertex_number = 0usize;
    let mut source: Option<String> = None;
    // Cost and destination of the edge being read
    let mut edge: Option<(Weight, Option<String>)> = None;

    loop {
        let offset = reader.buffer_position();
        let format_error = |reason: &str| LoadError::TspFormat {
            offset,
            reason: reason.to_owned(),
        };
        let graph_error = |source| LoadError::TspGraph { offset, source };

        match reader.read_event_into(&mut buf)? {
            Event::Start(element) if element.name().as_ref() == b"vertex" => {
                let name = vertex_name(&element, vertex_number)?;
                if vertex_number == 0 {
                    graph.add_vertex(name.clone()).map_err(graph_error)?;
                }
                source = Some(name);
            }
            Event::Empty(element) if element.name().as_ref() == b"vertex" => {
                let name = vertex_name(&element, vertex_number)?;
                if vertex_number == 0 {
                    graph.add_vertex(name).map_err(graph_error)?;
                }
                vertex_number += 1;
            }
            Event::End(element) if element.name().as_ref() == b"vertex" => {
                vertex_number += 1;
                source = None;
            }
            Event::Start(element) if element.name().as_ref() == b"edge" => {
                let cost = attribute(&element, "cost")?
                    .ok_or_else(|| format_error("edge without a cost"))?;
                let cost = cost
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|cost| cost.is_finite())
                    .ok_or_else(|| format_error(&format!("bad cost {:?}", cost)))?;
                edge = Some((cost.trunc() as Weight, None));
            }
            Event::Text(text) => {
                if let Some((_, destination)) = edge.as_mut() {
                    *destination = Some(text.unescape()?.trim().to_owned());
                }
            }
            Event::End(element) if element.name().as_ref() == b"edge" => {
                let (weight, destination) =
                    edge.take().ok_or_else(|| format_error("unexpected edge end"))?;
                let destination =
                    destination.ok_or_else(|| format_error("edge without a destination"))?;
                let from = source
                    .clone()
                    .ok_or_else(|| format_error("edge outside of a vertex"))?;
                if vertex_number == 0 {
                    graph.add_vertex(destination.clone()).map_err(graph_error)?;
                }
                graph
                    .add_edge(from, destination, weight)
                    .map_err(graph_error)?;
            }
            Event::Empty(element) if element.name().as_ref() == b"edge" => {
                return Err(format_error("edge without a destination"));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(
        "Loaded {} cities and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn vertex_name(element: &BytesStart<'_>, vertex_number: usize) -> Result<String, LoadError> {
    Ok(attribute(element, "name")?.unwrap_or_else(|| vertex_number.to_string()))
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, LoadError> {
    match element
        .try_get_attribute(name)
        .map_err(quick_xml::Error::from)?
    {
        Some(attribute) => Ok(Some(attribute.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

struct Records<R: Read> {
    inner: Peekable<StringRecordsIntoIter<R>>,
    /// Line of the most recently read record
    line: u64,
}

impl<R: Read> Records<R> {
    fn expect(&mut self, what: &str) -> Result<StringRecord, LoadError> {
        let record = self
            .inner
            .next()
            .ok_or_else(|| self.format_error(&format!("missing {}", what)))??;
        if let Some(position) = record.position() {
            self.line = position.line();
        }
        Ok(record)
    }

    fn count(&mut self, what: &str) -> Result<usize, LoadError> {
        let record = self.expect(what)?;
        match record.get(0).map(str::parse::<usize>) {
            Some(Ok(count)) if record.len() == 1 => Ok(count),
            _ => Err(self.format_error(&format!(
                "expected {} but found {:?}",
                what,
                record.iter().collect::<Vec<_>>().join(",")
            ))),
        }
    }

    fn is_done(&mut self) -> bool {
        self.inner.peek().is_none()
    }

    fn format_error(&self, reason: &str) -> LoadError {
        LoadError::Format {
            line: self.line,
            reason: reason.to_owned(),
        }
    }

    fn graph_error(&self, source: GraphError) -> LoadError {
        LoadError::Graph {
            line: self.line,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{from_csv_path, from_csv_reader, from_tsp_path, from_tsp_reader, LoadError};
    use crate::{
        error::ErrorKind,
        graph::{Direction, Edge, Graph},
    };
    use pretty_assertions::assert_eq;

    fn load(input: &str) -> Result<Graph<String>, LoadError> {
        from_csv_reader(Direction::Undirected, input.as_bytes())
    }

    #[test]
    fn test_rejects_malformed_input() {
        for input in [
            "",
            "foo\n",
            "foo\nbar\n",
            "3\nfoo\nbar\n",
            "3\nfoo\nbar\nsparg\nprary",
            "3\nfoo\nbar\nblarg\n5\nfoo,bar,1",
            "3\nfoo\nbar\nblarg\n1\nfoo,bar",
            "3\nfoo\nbar\nblarg\n1\nfoo,bar,heavy",
            "3\nfoo\nbar\nblarg\n1\nfoo,bar,1\nbar,blarg,2",
            "2\nfoo,bar\nblarg\n",
        ] {
            assert!(
                matches!(load(input), Err(LoadError::Format { .. })),
                "{:?} should not load",
                input
            );
        }
    }

    #[test]
    fn test_propagates_graph_errors() {
        match load("3\nfoo\nbar\nblarg\n1\nfoo,spar,1") {
            Err(LoadError::Graph { line, source }) => {
                assert_eq!(line, 6);
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            other => panic!("unexpected {:?}", other),
        }
        match load("2\nfoo\nfoo\n") {
            Err(LoadError::Graph { source, .. }) => {
                assert_eq!(source.kind(), ErrorKind::InvalidArgument)
            }
            other => panic!("unexpected {:?}", other),
        }
        match load("2\nfoo\nbar\n1\nfoo,bar,-4\n") {
            Err(LoadError::Graph { source, .. }) => {
                assert_eq!(source.kind(), ErrorKind::InvalidArgument)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_vertices_without_edges() {
        let graph = load("3\nfoo\nbar\nblarg\n").unwrap();
        let mut vertices = graph.vertices();
        vertices.sort();
        assert_eq!(vertices, ["bar", "blarg", "foo"]);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_loads_edges() {
        let graph = load("3\nfoo\nbar\nblarg\n2\nfoo,bar,1\nblarg, foo ,5").unwrap();
        assert!(!graph.is_directed());
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edge_weight(&"bar".into(), &"foo".into()), 1);
        assert_eq!(
            graph.edge(&"foo".into(), &"blarg".into()),
            Some(Edge::new("foo".into(), "blarg".into(), 5))
        );
    }

    #[test]
    fn test_respects_direction() {
        let graph =
            from_csv_reader(Direction::Directed, "2\nfoo\nbar\n1\nfoo,bar,3\n".as_bytes()).unwrap();
        assert!(graph.edge_exists(&"foo".into(), &"bar".into()));
        assert!(!graph.edge_exists(&"bar".into(), &"foo".into()));
    }

    #[test]
    fn test_vertex_names_keep_inner_spaces() {
        let graph = load("2\nbeen too long.\nPerhaps\n1\nbeen too long.,Perhaps,2\n").unwrap();
        assert_eq!(
            graph.shortest_path_weight(&"Perhaps".into(), &"been too long.".into()),
            Ok(Some(2))
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            from_csv_path(Direction::Undirected, "/nonexistent/graph.csv"),
            Err(LoadError::Io(_))
        ));
    }

    const SQUARE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<travellingSalesmanProblemInstance>
  <name>square4</name>
  <source>Four corners of a unit square</source>
  <doublePrecision>15</doublePrecision>
  <graph>
    <vertex>
      <edge cost="1.000000000000000e+00">1</edge>
      <edge cost="1.414213562373095e+00">2</edge>
      <edge cost="1.000000000000000e+00">3</edge>
    </vertex>
    <vertex>
      <edge cost="1.000000000000000e+00">0</edge>
      <edge cost="1.000000000000000e+00">2</edge>
      <edge cost="1.414213562373095e+00">3</edge>
    </vertex>
    <vertex>
      <edge cost="1.414213562373095e+00">0</edge>
      <edge cost="1.000000000000000e+00">1</edge>
      <edge cost="2.950000000000000e+01">3</edge>
    </vertex>
    <vertex>
      <edge cost="1.000000000000000e+00">0</edge>
      <edge cost="1.414213562373095e+00">1</edge>
      <edge cost="2.950000000000000e+01">2</edge>
    </vertex>
  </graph>
</travellingSalesmanProblemInstance>
"#;

    fn load_tsp(input: &str) -> Result<Graph<String>, LoadError> {
        from_tsp_reader(input.as_bytes())
    }

    #[test]
    fn test_tsp_numbered_vertices() {
        let graph = load_tsp(SQUARE).unwrap();
        assert!(!graph.is_directed());
        let mut vertices = graph.vertices();
        vertices.sort();
        assert_eq!(vertices, ["0", "1", "2", "3"]);
        assert_eq!(graph.edge_count(), 6);
        // Costs are truncated, not rounded
        assert_eq!(graph.edge_weight(&"0".into(), &"2".into()), 1);
        assert_eq!(graph.edge_weight(&"3".into(), &"2".into()), 29);
        assert_eq!(graph.edge_weight(&"2".into(), &"3".into()), 29);
    }

    #[test]
    fn test_tsp_named_vertices() {
        let graph = load_tsp(
            r#"<graph>
                <vertex name="Hello"><edge cost="3.9">my</edge><edge cost="7">old</edge></vertex>
                <vertex name="my"><edge cost="3.9">Hello</edge><edge cost="2">old</edge></vertex>
                <vertex name="old"><edge cost="7">Hello</edge><edge cost="2">my</edge></vertex>
            </graph>"#,
        )
        .unwrap();
        let mut vertices = graph.vertices();
        vertices.sort();
        assert_eq!(vertices, ["Hello", "my", "old"]);
        assert_eq!(
            graph.edge(&"my".into(), &"Hello".into()),
            Some(Edge::new("my".into(), "Hello".into(), 3))
        );
        assert_eq!(
            graph.shortest_path_weight(&"Hello".into(), &"old".into()),
            Ok(Some(5))
        );
    }

    #[test]
    fn test_tsp_rejects_bad_documents() {
        for input in [
            r#"<graph><vertex><edge>1</edge></vertex></graph>"#,
            r#"<graph><vertex><edge cost="heavy">1</edge></vertex></graph>"#,
            r#"<graph><vertex><edge cost="1.0"></edge></vertex></graph>"#,
            r#"<graph><vertex><edge cost="1.0"/></vertex></graph>"#,
            r#"<graph><edge cost="1.0">1</edge></graph>"#,
        ] {
            assert!(
                matches!(load_tsp(input), Err(LoadError::TspFormat { .. })),
                "{:?} should not load",
                input
            );
        }
        assert!(matches!(
            load_tsp(r#"<graph><vertex><edge cost="1.0">1</vertex></graph>"#),
            Err(LoadError::Xml(_))
        ));
    }

    #[test]
    fn test_tsp_propagates_graph_errors() {
        // Only the first vertex may introduce new cities
        match load_tsp(
            r#"<graph>
                <vertex><edge cost="1">1</edge></vertex>
                <vertex><edge cost="1">2</edge></vertex>
            </graph>"#,
        ) {
            Err(LoadError::TspGraph { source, .. }) => {
                assert_eq!(source.kind(), ErrorKind::NotFound)
            }
            other => panic!("unexpected {:?}", other),
        }
        match load_tsp(r#"<graph><vertex><edge cost="-2.5">1</edge></vertex></graph>"#) {
            Err(LoadError::TspGraph { source, .. }) => {
                assert_eq!(source.kind(), ErrorKind::InvalidArgument)
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tsp_graph_feeds_the_tour_solver() {
        let graph = load_tsp(SQUARE).unwrap();
        let tour = graph
            .optimal_tour_with(&crate::graph::TourConfig {
                population_size: 10,
                inversion_probability: 0.5,
                termination_iterations: 200,
                seed: Some(3),
            })
            .unwrap();
        // Only the edge between 2 and 3 weighs more than 1 once truncated
        assert_eq!(graph.path_length(&tour), 3);
    }

    #[test]
    fn test_missing_tsp_file_is_io_error() {
        assert!(matches!(
            from_tsp_path("/nonexistent/eil101.xml"),
            Err(LoadError::Io(_))
        ));
    }
}
