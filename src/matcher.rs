//! Matcher
//!
//! Best partner for one genus and the top-K pairs of a sampled population.
//! Candidates are drawn with a fixed seed, so repeated calls against the
//! same snapshot return the same answer.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::error::ScoreError;
use crate::scorer::{CompatibilityResult, PairScorer};

/// Sampling and ranking constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    /// Candidates drawn for a best-match search
    pub best_match_sample: usize,
    /// Default population for top hybrids
    pub hybrid_sample: usize,
    pub seed: u64,
    /// Hybrids must score strictly above this (0-100 scale)
    pub min_hybrid_score: f64,
    pub top_k: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            best_match_sample: 60,
            hybrid_sample: 100,
            seed: 42,
            min_hybrid_score: 60.0,
            top_k: 10,
        }
    }
}

/// Outcome of a best-match search for a known genus
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Found(Box<CompatibilityResult>),
    NoMatch,
}

#[derive(Clone)]
pub struct Matcher {
    scorer: PairScorer,
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(scorer: PairScorer) -> Self {
        Self::with_config(scorer, MatcherConfig::default())
    }

    pub fn with_config(scorer: PairScorer, config: MatcherConfig) -> Self {
        Self { scorer, config }
    }

    pub fn scorer(&self) -> &PairScorer {
        &self.scorer
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Draw up to `n` distinct genera, in sample order
    ///
    /// A table smaller than `n` yields every genus, shuffled by the same seed.
    pub fn sample_genera(&self, n: usize) -> Vec<&str> {
        let genera = self.scorer.snapshot().traits.genera();
        let amount = n.min(genera.len());
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        index::sample(&mut rng, genera.len(), amount)
            .into_iter()
            .map(|i| genera[i].as_str())
            .collect()
    }

    /// Highest-scoring partner for `genus`
    ///
    /// `zone_filter` keeps only results whose zone name contains it
    /// (case-insensitive). Ties keep the first candidate in sample order.
    pub fn find_best_match(
        &self,
        genus: &str,
        zone_filter: Option<&str>,
    ) -> Result<MatchOutcome, ScoreError> {
        let row = self.scorer.resolve(genus)?;

        let candidates = self.sample_genera(self.config.best_match_sample);
        let mut best: Option<CompatibilityResult> = None;

        for partner in candidates {
            if partner == genus {
                continue;
            }

            let result = self.scorer.score_rows(row, self.scorer.resolve(partner)?)?;

            if let Some(filter) = zone_filter {
                if !result.zone.matches_filter(filter) {
                    continue;
                }
            }

            let better = best.as_ref().map_or(true, |b| result.score > b.score);
            if better {
                best = Some(result);
            }
        }

        tracing::debug!(
            "Best match for {} (filter {:?}): {:?}",
            genus,
            zone_filter,
            best.as_ref().map(|r| (&r.plant_b, r.score))
        );

        Ok(match best {
            Some(result) => MatchOutcome::Found(Box::new(result)),
            None => MatchOutcome::NoMatch,
        })
    }

    /// Best pairs among `sample_size` sampled genera
    ///
    /// Every unordered pair is scored once, ordered as first drawn. Results
    /// above the minimum score are sorted by score (stable, descending) and
    /// cut to `top_k`.
    pub fn top_hybrids(&self, sample_size: usize) -> Result<Vec<CompatibilityResult>, ScoreError> {
        let candidates = self.sample_genera(sample_size);

        let pairs: Vec<(&str, &str)> = candidates
            .iter()
            .enumerate()
            .flat_map(|(i, a)| candidates[i + 1..].iter().map(move |b| (*a, *b)))
            .collect();

        tracing::debug!(
            "Scoring {} pairs from {} sampled genera",
            pairs.len(),
            candidates.len()
        );

        let scored: Vec<CompatibilityResult> = pairs
            .par_iter()
            .map(|(a, b)| self.scorer.score_pair(a, b))
            .collect::<Result<_, _>>()?;

        let mut results: Vec<CompatibilityResult> = scored
            .into_iter()
            .filter(|r| r.score > self.config.min_hybrid_score)
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(self.config.top_k);

        Ok(results)
    }
}
