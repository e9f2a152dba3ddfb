//! Heading level assignment by one-dimensional k-means over font sizes.

use crate::model::HeadingLevel;

use super::candidates::Candidate;
use super::features::median;
use super::OutlineConfig;

/// Sizes closer than this are treated as the same value.
const SIZE_EPSILON: f32 = 1e-3;

/// A candidate with its assigned level.
#[derive(Debug, Clone)]
pub struct LeveledHeading {
    pub candidate: Candidate,
    pub level: HeadingLevel,
}

/// Outcome of the clustering step.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub headings: Vec<LeveledHeading>,
    /// Cluster centroids, largest first (one per emitted level)
    pub centroids: Vec<f32>,
    /// Number of distinct candidate sizes
    pub distinct_sizes: usize,
    /// Assign/recompute rounds until convergence
    pub iterations: usize,
}

impl Classification {
    /// Fewer distinct sizes than levels, or no candidates at all.
    pub fn is_degenerate(&self, max_levels: usize) -> bool {
        self.distinct_sizes < max_levels
    }
}

/// Maps candidate font sizes to H1..H3.
///
/// Centroids are seeded at the max, median and min of the candidate sizes,
/// so the same input always yields the same levels.
pub struct LevelClassifier<'a> {
    config: &'a OutlineConfig,
}

impl<'a> LevelClassifier<'a> {
    pub fn new(config: &'a OutlineConfig) -> Self {
        Self { config }
    }

    pub fn classify(&self, candidates: Vec<Candidate>) -> Classification {
        let sizes: Vec<f32> = candidates.iter().map(Candidate::font_size).collect();
        let distinct = distinct_sizes(&sizes);
        if distinct.is_empty() {
            return Classification::default();
        }

        let k = distinct.len().min(self.config.max_levels.clamp(1, 3));
        let seeds = seed_centroids(&sizes, k);
        let (assignments, centroids, iterations) =
            lloyd(&sizes, seeds, self.config.max_iterations);

        // Rank non-empty clusters by descending centroid
        let mut ranked: Vec<usize> = (0..centroids.len())
            .filter(|c| assignments.contains(c))
            .collect();
        ranked.sort_by(|a, b| centroids[*b].total_cmp(&centroids[*a]).then(a.cmp(b)));

        let level_of = |cluster: usize| {
            let rank = ranked.iter().position(|&c| c == cluster).unwrap_or(0);
            HeadingLevel::from_rank(rank).unwrap_or(HeadingLevel::H3)
        };

        log::debug!(
            "Clustered {} candidates ({} distinct sizes) into {} levels after {} iterations",
            sizes.len(),
            distinct.len(),
            ranked.len(),
            iterations
        );

        let headings = candidates
            .into_iter()
            .zip(assignments.iter())
            .map(|(candidate, &cluster)| LeveledHeading {
                candidate,
                level: level_of(cluster),
            })
            .collect();

        Classification {
            headings,
            centroids: ranked.iter().map(|&c| centroids[c]).collect(),
            distinct_sizes: distinct.len(),
            iterations,
        }
    }
}

/// Sorted distinct values (ascending).
fn distinct_sizes(sizes: &[f32]) -> Vec<f32> {
    let mut sorted: Vec<f32> = sizes.iter().copied().filter(|s| s.is_finite()).collect();
    sorted.sort_by(f32::total_cmp);
    sorted.dedup_by(|a, b| (*a - *b).abs() < SIZE_EPSILON);
    sorted
}

/// Initial centroids in descending order, so index 0 is the H1 cluster.
///
/// The median is taken over every candidate size, duplicates included. When
/// it coincides with the min, the lower-index tie rule leaves the last
/// cluster empty.
fn seed_centroids(sizes: &[f32], k: usize) -> Vec<f32> {
    let finite: Vec<f32> = sizes.iter().copied().filter(|s| s.is_finite()).collect();
    let min = finite.iter().copied().fold(f32::INFINITY, f32::min);
    let max = finite.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    match k {
        1 => vec![max],
        2 => vec![max, min],
        _ => vec![max, median(&finite), min],
    }
}

/// Lloyd's algorithm on one axis.
///
/// Distance ties go to the lower cluster index; empty clusters keep their
/// centroid. Returns assignments, final centroids and iteration count.
fn lloyd(values: &[f32], mut centroids: Vec<f32>, max_iterations: usize) -> (Vec<usize>, Vec<f32>, usize) {
    let mut assignments: Vec<usize> = values.iter().map(|v| nearest(&centroids, *v)).collect();
    let mut iterations = 1;

    while iterations < max_iterations {
        for (c, centroid) in centroids.iter_mut().enumerate() {
            let members: Vec<f32> = values
                .iter()
                .zip(&assignments)
                .filter(|(_, &a)| a == c)
                .map(|(v, _)| *v)
                .collect();
            if !members.is_empty() {
                *centroid = members.iter().sum::<f32>() / members.len() as f32;
            }
        }

        let next: Vec<usize> = values.iter().map(|v| nearest(&centroids, *v)).collect();
        iterations += 1;
        if next == assignments {
            break;
        }
        assignments = next;
    }

    (assignments, centroids, iterations)
}

fn nearest(centroids: &[f32], value: f32) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = (value - centroid).abs();
        if distance < best_distance {
            best = i;
            best_distance = distance;
        }
    }
    best
}
