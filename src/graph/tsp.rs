use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Graph, Vertex, Weight, NO_PATH};
use crate::error::{GraphError, Result};

/// Parameters of an Inver-Over run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TourConfig {
    /// Number of tours evolved side by side
    pub population_size: usize,
    /// Chance that an inversion is guided by the tour itself rather than by a sibling
    pub inversion_probability: f64,
    /// Number of generations to run before stopping
    pub termination_iterations: usize,
    /// Fixed seed for reproducible runs, else seeded from entropy
    pub seed: Option<u64>,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            inversion_probability: 0.02,
            termination_iterations: 5000,
            seed: None,
        }
    }
}

impl TourConfig {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl<T: Vertex> Graph<T> {
    /// [`Graph::optimal_tour`] with the parameters and seed of `config`
    pub fn optimal_tour_with(&self, config: &TourConfig) -> Result<Vec<T>> {
        self.optimal_tour(
            config.population_size,
            config.inversion_probability,
            config.termination_iterations,
            &mut config.rng(),
        )
    }

    /// Approximate the shortest tour visiting every vertex with Tao and
    /// Michalewicz' Inver-Over evolutionary algorithm.
    ///
    /// <https://doi.org/10.1007/BFb0056910>
    ///
    /// The tour is an open path: its length does not include a closing edge
    /// back to the start. The graph should be fully connected; a tour that
    /// steps between unconnected vertices is treated as infinitely long.
    pub fn optimal_tour<R: Rng + ?Sized>(
        &self,
        population_size: usize,
        inversion_probability: f64,
        termination_iterations: usize,
        rng: &mut R,
    ) -> Result<Vec<T>> {
        if !(0.0..=1.0).contains(&inversion_probability) {
            return Err(GraphError::InvalidArgument(format!(
                "inversion probability {} is not within [0, 1]",
                inversion_probability
            )));
        }
        let cities = self.vertices();
        if cities.is_empty() || population_size == 0 {
            warn!(
                "Nothing to evolve with {} cities and a population of {}",
                cities.len(),
                population_size
            );
            return Ok(vec![]);
        }

        let mut population = (0..population_size)
            .map(|_| {
                let mut tour = cities.clone();
                tour.shuffle(rng);
                tour
            })
            .collect::<Vec<_>>();
        let mut lengths = population
            .iter()
            .map(|tour| self.tour_length(tour))
            .collect::<Vec<_>>();

        let (mut best, mut best_length) = lengths
            .iter()
            .enumerate()
            .min_by_key(|(_, length)| **length)
            .map(|(i, length)| (population[i].clone(), *length))
            .unwrap_or_else(|| (cities.clone(), Weight::MAX));
        debug!("Best initial tour has length {}", best_length);

        if cities.len() < 2 {
            return Ok(best);
        }

        for generation in 0..termination_iterations {
            for i in 0..population.len() {
                let child = invert_over(&population, i, inversion_probability, rng);
                let child_length = self.tour_length(&child);
                if child_length < lengths[i] {
                    if child_length < best_length {
                        debug!(
                            "Generation {}/{}: best {} -> {}",
                            generation, termination_iterations, best_length, child_length
                        );
                        best = child.clone();
                        best_length = child_length;
                    }
                    population[i] = child;
                    lengths[i] = child_length;
                }
            }
        }

        info!(
            "Best tour over {} cities after {} generations has length {}",
            cities.len(),
            termination_iterations,
            best_length
        );
        Ok(best)
    }

    /// Length of an open tour, [`Weight::MAX`] if it cannot be walked
    fn tour_length(&self, tour: &[T]) -> Weight {
        match self.path_length(tour) {
            NO_PATH => Weight::MAX,
            length => length,
        }
    }
}

/// Breed a child of `population[parent]` through a chain of inversions.
///
/// Starting from a random city, each step picks a target city, either at
/// random from the child itself or as the successor of the current city in a
/// random sibling, and reverses the stretch between them so the two become
/// neighbours. The chain ends once the target is already a neighbour.
fn invert_over<T: Vertex, R: Rng + ?Sized>(
    population: &[Vec<T>],
    parent: usize,
    inversion_probability: f64,
    rng: &mut R,
) -> Vec<T> {
    let mut child = population[parent].clone();
    let len = child.len();
    let mut anchor = rng.gen_range(0..len);

    loop {
        // A lone tour has no sibling to learn from
        let target = if population.len() == 1 || rng.gen_bool(inversion_probability) {
            let mut other = rng.gen_range(0..len - 1);
            if other >= anchor {
                other += 1;
            }
            child[other].clone()
        } else {
            let mut sibling = rng.gen_range(0..population.len() - 1);
            if sibling >= parent {
                sibling += 1;
            }
            let sibling = &population[sibling];
            let Some(position) = sibling.iter().position(|city| *city == child[anchor]) else {
                break;
            };
            // The city following the anchor, wrapping past the end
            sibling[(position + 1) % len].clone()
        };

        let Some(target_index) = child.iter().position(|city| *city == target) else {
            break;
        };
        if is_adjacent(anchor, target_index, len) {
            break;
        }

        // Either way the target lands right next to the anchor and becomes the new anchor
        if anchor < target_index {
            child[anchor + 1..=target_index].reverse();
            anchor += 1;
        } else {
            child[target_index..anchor].reverse();
            anchor -= 1;
        }
    }
    child
}

/// The first position also counts the last one as a neighbour
fn is_adjacent(anchor: usize, other: usize, len: usize) -> bool {
    anchor.abs_diff(other) == 1 || (anchor == 0 && other == len - 1)
}
