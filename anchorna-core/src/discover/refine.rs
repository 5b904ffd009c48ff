//! Round-based refinement controller
//!
//! Drives candidate generation and extension over the shrinking search
//! space. Within a round the search space is shared read-only between
//! workers; spans are consumed only between rounds.

use rayon::prelude::*;
use std::collections::BTreeMap;

use super::candidate::CandidateGenerator;
use super::extend::{Extended, Extender};
use super::kmer::KmerIndex;
use super::space::{Coverage, SearchSpace};
use super::{DiscoverParams, SearchStatus, Thresholds};
use crate::anchor::{Anchor, AnchorSet, Locus};
use crate::error::{AnchorError, AnchorResult};
use crate::types::SequenceCollection;

/// Controller states.
#[derive(Debug)]
enum State {
    Searching { quota: usize },
    Extracting { quota: usize, accepted: Vec<Extended> },
    Done(SearchStatus),
}

enum Executor {
    Sequential,
    Global,
    Pool(rayon::ThreadPool),
}

impl Executor {
    fn new(workers: usize) -> AnchorResult<Self> {
        match workers {
            0 => Ok(Executor::Global),
            1 => Ok(Executor::Sequential),
            n => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map(Executor::Pool)
                .map_err(|e| AnchorError::WorkerPool(e.to_string())),
        }
    }

    /// Apply `f` to every item, keeping input order.
    fn filter_map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Option<R> + Sync + Send,
    {
        match self {
            Executor::Sequential => items.iter().filter_map(f).collect(),
            Executor::Global => items.par_iter().filter_map(f).collect(),
            Executor::Pool(pool) => pool.install(|| items.par_iter().filter_map(f).collect()),
        }
    }
}

/// One discovery run over a collection.
pub struct Refinement<'a> {
    collection: &'a SequenceCollection,
    space: SearchSpace,
    k: usize,
    context: usize,
    max_rounds: usize,
    quota_step: usize,
    thresholds: Thresholds,
    executor: Executor,
    anchors: Vec<Anchor>,
}

impl<'a> Refinement<'a> {
    pub fn new(
        collection: &'a SequenceCollection,
        k: usize,
        params: &DiscoverParams,
        thresholds: Thresholds,
    ) -> AnchorResult<Self> {
        Ok(Self {
            collection,
            space: SearchSpace::new(collection),
            k,
            context: params.context.unwrap_or(k),
            max_rounds: params.max_rounds,
            quota_step: params.quota_step,
            thresholds,
            executor: Executor::new(params.workers)?,
            anchors: Vec::new(),
        })
    }

    /// Run rounds until the floor quota is exhausted or `max_rounds` is hit.
    pub fn run(mut self) -> (AnchorSet, usize, SearchStatus) {
        let mut rounds = 0;
        let mut state = State::Searching { quota: self.thresholds.initial };

        let status = loop {
            state = match state {
                State::Searching { quota } if rounds >= self.max_rounds => {
                    State::Done(SearchStatus::Exhausted { quota })
                }
                State::Searching { quota } => {
                    rounds += 1;
                    let accepted = self.search(quota);
                    log::debug!("Round {}: quota {} accepted {} anchors", rounds, quota, accepted.len());
                    if !accepted.is_empty() {
                        State::Extracting { quota, accepted }
                    } else if quota <= self.thresholds.floor {
                        State::Done(SearchStatus::Completed)
                    } else {
                        let lowered = quota.saturating_sub(self.quota_step).max(self.thresholds.floor);
                        State::Searching { quota: lowered }
                    }
                }
                State::Extracting { quota, accepted } => {
                    self.extract(accepted);
                    State::Searching { quota }
                }
                State::Done(status) => break status,
            };
        };

        (AnchorSet::new(self.anchors), rounds, status)
    }

    /// Candidates of one round that survive conflict resolution.
    fn search(&self, quota: usize) -> Vec<Extended> {
        let index = KmerIndex::build(&self.space, self.k);
        let words = index.shared_words(quota);
        let generator = CandidateGenerator::new(&self.space, self.context);
        let extender = Extender::new(&self.space, self.thresholds.extend_at(quota));

        let mut extended = self.executor.filter_map(&words, |(word, occurrences)| {
            generator
                .generate(word, occurrences, quota)
                .map(|candidate| extender.extend(candidate))
        });
        log::trace!("{} shared words, {} extended candidates", words.len(), extended.len());

        extended.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a.leftmost_start().cmp(&b.leftmost_start()))
                .then_with(|| a.seed_start.cmp(&b.seed_start))
                .then_with(|| a.word.cmp(&b.word))
        });
        resolve_conflicts(extended, self.space.n_sequences(), quota)
    }

    fn extract(&mut self, accepted: Vec<Extended>) {
        let total = self.collection.len();
        for candidate in accepted {
            let mut loci = BTreeMap::new();
            for &(seq, span) in &candidate.members {
                self.space.consume(seq, span);
                let sequence = &self.collection.sequences()[seq];
                loci.insert(
                    sequence.id.clone(),
                    Locus {
                        span,
                        strand: sequence.strand,
                        frame: sequence.frame,
                        offset: sequence.offset,
                    },
                );
            }
            let quota = candidate.len() as f64 / total as f64;
            let word = String::from_utf8_lossy(&candidate.word).into_owned();
            self.anchors.push(Anchor::new(word, loci, quota));
        }
    }
}

/// Greedy acceptance in the given order. Members colliding with an already
/// accepted candidate are dropped; a candidate is kept while it still has
/// `quota` members.
fn resolve_conflicts(ordered: Vec<Extended>, n_sequences: usize, quota: usize) -> Vec<Extended> {
    let mut taken = vec![Coverage::new(); n_sequences];
    let mut accepted = Vec::new();

    for mut candidate in ordered {
        candidate.members.retain(|(seq, span)| !taken[*seq].overlaps(span));
        if candidate.len() < quota {
            continue;
        }
        for &(seq, span) in &candidate.members {
            taken[seq].insert(span);
        }
        accepted.push(candidate);
    }
    accepted
}
