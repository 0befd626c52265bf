use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use std::{fs, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use weighted_graph::{load, total_weight, Direction, TourConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Opt {
    /// Graph in the vertex-count / vertex / edge-count / edge text format
    file: PathBuf,

    /// Edges only connect their source to their destination
    #[arg(long)]
    directed: bool,

    /// Read the file as a TSPLIB XML instance, which is always undirected
    #[arg(long, conflicts_with = "directed")]
    tsp: bool,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every edge of the graph
    Edges,
    /// Shortest path between two vertices
    Path { from: String, to: String },
    /// Minimum spanning tree of an undirected graph
    Mst,
    /// Approximate the shortest tour through every vertex
    Tour {
        /// JSON file with tour parameters, overridden by the flags below
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        population: Option<usize>,

        #[arg(long)]
        inversion_probability: Option<f64>,

        #[arg(long)]
        iterations: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    let default_level = match opt.verbose {
        0 => "weighted_graph=info",
        1 => "weighted_graph=debug",
        _ => "weighted_graph=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let graph = if opt.tsp {
        load::from_tsp_path(&opt.file)
    } else if opt.directed {
        load::from_csv_path(Direction::Directed, &opt.file)
    } else {
        load::from_csv_path(Direction::Undirected, &opt.file)
    }
    .with_context(|| format!("could not load {}", opt.file.display()))?;
    info!(
        "Loaded {} vertices and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    let output = match opt.command {
        Command::Edges => json!({ "edges": graph.edges() }),
        Command::Path { from, to } => match graph.shortest_path_between(&from, &to)? {
            Some(path) => json!({
                "weight": total_weight(&path),
                "path": path,
            }),
            None => {
                warn!("No path from {} to {}", from, to);
                json!({ "path": null })
            }
        },
        Command::Mst => match graph.minimum_spanning_tree()? {
            Some(tree) => {
                let edges = tree.edges();
                json!({
                    "weight": total_weight(&edges),
                    "edges": edges,
                })
            }
            None => {
                warn!("Graph is disconnected and has no spanning tree");
                json!({ "edges": null })
            }
        },
        Command::Tour {
            config,
            population,
            inversion_probability,
            iterations,
            seed,
        } => {
            let mut tour_config = match config {
                Some(path) => {
                    let text = fs::read_to_string(&path)
                        .with_context(|| format!("could not read {}", path.display()))?;
                    serde_json::from_str::<TourConfig>(&text)
                        .with_context(|| format!("invalid tour config {}", path.display()))?
                }
                None => TourConfig::default(),
            };
            if let Some(population) = population {
                tour_config.population_size = population;
            }
            if let Some(inversion_probability) = inversion_probability {
                tour_config.inversion_probability = inversion_probability;
            }
            if let Some(iterations) = iterations {
                tour_config.termination_iterations = iterations;
            }
            if seed.is_some() {
                tour_config.seed = seed;
            }
            info!("Evolving tours with {:?}", tour_config);

            let tour = graph.optimal_tour_with(&tour_config)?;
            json!({
                "length": graph.path_length(&tour),
                "tour": tour,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
