//! Self-play game generation on top of [`SearchEngine`].
//!
//! A game keeps one tree from the initial position to the end: every
//! `search` call starts from the child returned by the previous one, so the
//! statistics of earlier plies stay attached to the tree. Once the game is
//! over, each visited position yields a training example made of the
//! position, its visit distribution and the game outcome.
//!
//! [`WorkerPool`] runs several games in parallel. Each worker owns its
//! engine and its trees; the only thing the workers share is the evaluator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use engine_core::{GameResult, GameState};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MctsConfig;
use crate::evaluator::{Evaluator, EvaluatorError};
use crate::search::{normalize_priors, SearchEngine, SearchError, SearchStats};
use crate::tree::GameTree;

/// One position of a finished game, labelled for training.
#[derive(Debug, Clone)]
pub struct TrainingExample<S: GameState> {
    pub state: S,
    /// `actual_visit_probabilities` of the node, one entry per legal move.
    pub visit_probs: Vec<f32>,
    /// Game outcome from the perspective used by the value head.
    pub outcome: f32,
}

/// Network-ready form of a [`TrainingExample`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedExample {
    pub state: Vec<f32>,
    pub policy: Vec<f32>,
    pub value: f32,
}

impl<S: GameState> TrainingExample<S> {
    /// Encode the position and scatter the (renormalized) visit
    /// distribution into a full policy vector.
    pub fn encode(&self) -> EncodedExample {
        let probs = if self.visit_probs.is_empty() {
            Vec::new()
        } else {
            normalize_priors(self.visit_probs.clone())
        };
        EncodedExample {
            state: self.state.encode(),
            policy: self.state.encode_policy(&probs),
            value: self.outcome,
        }
    }
}

/// A complete self-play game.
#[derive(Debug, Clone)]
pub struct GameRecord<S: GameState> {
    /// One example per move played, in game order.
    pub examples: Vec<TrainingExample<S>>,
    /// Natural result, or None if the ply cap ended the game.
    pub result: Option<GameResult>,
    /// Moves played.
    pub plies: u32,
}

/// Play one game from `initial` to the end or to `config.max_plies`.
///
/// Each ply runs `config.iterations` iterations from the current node and
/// moves to the sampled child. The outcome of the last position is
/// `result * side_to_move * -1` after a natural end and `-1` after the ply
/// cap; walking backward through the game it alternates sign.
pub fn play_game<S, E>(
    engine: &mut SearchEngine<'_, E>,
    initial: S,
) -> Result<GameRecord<S>, SearchError>
where
    S: GameState,
    E: Evaluator + ?Sized,
{
    let iterations = engine.config().iterations;
    let max_plies = engine.config().max_plies;

    let mut tree = GameTree::new(initial);
    let mut node = tree.root();
    let mut path = Vec::new();

    loop {
        let current = tree.get(node);
        if current.state.is_game_over() || current.depth >= max_plies {
            break;
        }
        node = engine.search(&mut tree, node, iterations)?;
        path.push(node);
    }

    let last = tree.get(node);
    let (result, mut outcome) = if last.state.is_game_over() {
        let result = last.state.result();
        (Some(result), result.value() * last.color.sign() as f32 * -1.0)
    } else {
        (None, -1.0)
    };

    let mut examples: Vec<TrainingExample<S>> = path
        .iter()
        .map(|&id| TrainingExample {
            state: tree.get(id).state.clone(),
            visit_probs: tree.actual_visit_probabilities(id),
            outcome: 0.0,
        })
        .collect();
    for example in examples.iter_mut().rev() {
        example.outcome = outcome;
        outcome = -outcome;
    }

    debug!(
        plies = path.len(),
        result = ?result,
        tree_size = tree.len(),
        "self-play game finished"
    );

    Ok(GameRecord {
        examples,
        result,
        plies: path.len() as u32,
    })
}

/// Per-worker summary.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub games: u32,
    pub stats: SearchStats,
}

/// Everything a pool run produced.
#[derive(Debug, Clone)]
pub struct PoolReport<S: GameState> {
    /// Games in the order they finished, across all workers.
    pub games: Vec<GameRecord<S>>,
    pub workers: Vec<WorkerReport>,
}

impl<S: GameState> PoolReport<S> {
    /// All training examples, game by game.
    pub fn examples(&self) -> impl Iterator<Item = &TrainingExample<S>> {
        self.games.iter().flat_map(|g| g.examples.iter())
    }

    /// Search counters summed over all workers.
    pub fn total_stats(&self) -> SearchStats {
        let mut total = SearchStats::default();
        for worker in &self.workers {
            total.merge(&worker.stats);
        }
        total
    }
}

/// Runs self-play games on several threads.
///
/// Workers never share a tree. The evaluator is shared by reference; wrap
/// non-thread-safe models in [`crate::SharedEvaluator`].
#[derive(Debug)]
pub struct WorkerPool {
    num_workers: usize,
    config: MctsConfig,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(num_workers: usize, config: MctsConfig) -> Self {
        Self {
            num_workers,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag checked by every worker between games. Setting it stops the
    /// pool after the games in progress finish.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Play `games_per_worker` games on each worker and wait for all of them.
    ///
    /// `on_game` is called from the worker thread after every finished game.
    /// Worker `i` seeds its engine with `config.seed + i`. A failing worker
    /// raises the shutdown flag so the others stop at their next game
    /// boundary; the first error is returned once every worker has stopped.
    pub fn run<S, E, F>(
        &self,
        evaluator: &E,
        initial: &S,
        games_per_worker: u32,
        on_game: F,
    ) -> Result<PoolReport<S>, SearchError>
    where
        S: GameState,
        E: Evaluator + ?Sized,
        F: Fn(usize, &GameRecord<S>) + Sync,
    {
        if evaluator.policy_size() != S::POLICY_SIZE {
            return Err(EvaluatorError::MalformedOutput {
                expected: S::POLICY_SIZE,
                actual: evaluator.policy_size(),
            }
            .into());
        }

        info!(
            workers = self.num_workers,
            games_per_worker,
            iterations = self.config.iterations,
            max_plies = self.config.max_plies,
            "starting self-play workers"
        );

        let (tx, rx) = mpsc::channel();
        let on_game = &on_game;

        let outcomes: Vec<Result<WorkerReport, SearchError>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..self.num_workers)
                .map(|worker_id| {
                    let tx = tx.clone();
                    scope.spawn(move || {
                        self.run_worker(worker_id, evaluator, initial, games_per_worker, tx, on_game)
                    })
                })
                .collect();
            drop(tx);

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(outcome) => outcome,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        let games: Vec<GameRecord<S>> = rx.into_iter().collect();

        let mut workers = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            workers.push(outcome?);
        }

        info!(
            games = games.len(),
            examples = games.iter().map(|g| g.examples.len()).sum::<usize>(),
            "self-play workers finished"
        );

        Ok(PoolReport { games, workers })
    }

    fn run_worker<S, E, F>(
        &self,
        worker_id: usize,
        evaluator: &E,
        initial: &S,
        games_per_worker: u32,
        tx: mpsc::Sender<GameRecord<S>>,
        on_game: &F,
    ) -> Result<WorkerReport, SearchError>
    where
        S: GameState,
        E: Evaluator + ?Sized,
        F: Fn(usize, &GameRecord<S>) + Sync,
    {
        let seed = self.config.seed.wrapping_add(worker_id as u64);
        let mut engine = SearchEngine::new(evaluator, self.config.clone().with_seed(seed));
        let mut games = 0;

        for game in 0..games_per_worker {
            if self.shutdown.load(Ordering::Relaxed) {
                info!(worker_id, games, "shutdown requested, worker stopping");
                break;
            }

            let record = match play_game(&mut engine, initial.clone()) {
                Ok(record) => record,
                Err(e) => {
                    warn!(worker_id, game, error = %e, "self-play game failed, stopping pool");
                    self.shutdown.store(true, Ordering::Relaxed);
                    return Err(e);
                }
            };
            debug!(worker_id, game, plies = record.plies, "worker finished game");

            on_game(worker_id, &record);
            games += 1;
            if tx.send(record).is_err() {
                break;
            }
        }

        Ok(WorkerReport {
            worker_id,
            games,
            stats: engine.stats().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{FixedEvaluator, SharedEvaluator};
    use crate::test_support::{Broken, Countdown, Counting, FailsOnce, Finished};
    use std::sync::atomic::AtomicUsize;

    fn fixed() -> FixedEvaluator {
        FixedEvaluator::new(0.5, vec![0.9, 0.1])
    }

    #[test]
    fn test_play_game_reaches_natural_end() {
        let evaluator = fixed();
        let config = MctsConfig::for_testing().with_iterations(5).with_max_plies(50);
        let mut engine = SearchEngine::new(&evaluator, config);

        let record = play_game(&mut engine, Countdown::new(4)).unwrap();

        assert_eq!(record.plies, 4);
        assert_eq!(record.examples.len(), 4);
        assert_eq!(record.result, Some(GameResult::Draw));
        // Draws are worth zero whatever the sign.
        for example in &record.examples {
            assert_eq!(example.outcome.abs(), 0.0);
        }
        assert!(record.examples.last().unwrap().state.is_game_over());
    }

    #[test]
    fn test_play_game_ply_cap_assigns_alternating_loss() {
        let evaluator = fixed();
        let config = MctsConfig::for_testing().with_iterations(3).with_max_plies(3);
        let mut engine = SearchEngine::new(&evaluator, config);

        let record = play_game(&mut engine, Countdown::new(100)).unwrap();

        assert_eq!(record.plies, 3);
        assert_eq!(record.result, None);
        let outcomes: Vec<f32> = record.examples.iter().map(|e| e.outcome).collect();
        assert_eq!(outcomes, vec![-1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_play_game_from_finished_position() {
        let evaluator = fixed();
        let mut engine = SearchEngine::new(&evaluator, MctsConfig::for_testing());

        let record = play_game(&mut engine, Finished(GameResult::Loss)).unwrap();

        assert_eq!(record.plies, 0);
        assert!(record.examples.is_empty());
        assert_eq!(record.result, Some(GameResult::Loss));
    }

    #[test]
    fn test_examples_carry_visit_distributions() {
        let evaluator = fixed();
        let config = MctsConfig::for_testing().with_iterations(8).with_max_plies(3);
        let mut engine = SearchEngine::new(&evaluator, config);

        let record = play_game(&mut engine, Countdown::new(10)).unwrap();

        for example in &record.examples {
            assert_eq!(example.visit_probs.len(), example.state.legal_moves().len());
            let encoded = example.encode();
            assert_eq!(encoded.policy.len(), Countdown::POLICY_SIZE);
            assert!((encoded.policy.iter().sum::<f32>() - 1.0).abs() < 1e-5);
            assert_eq!(encoded.state, example.state.encode());
        }
    }

    #[test]
    fn test_pool_shares_one_locked_evaluator() {
        let evaluator = SharedEvaluator::new(fixed());
        let config = MctsConfig::for_testing().with_iterations(6).with_max_plies(8);
        let pool = WorkerPool::new(4, config);
        let finished = AtomicUsize::new(0);

        let report = pool
            .run(&evaluator, &Countdown::new(5), 3, |_, _| {
                finished.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(report.games.len(), 12);
        assert_eq!(finished.load(Ordering::SeqCst), 12);
        assert_eq!(report.workers.len(), 4);

        let total = report.total_stats();
        assert_eq!(total.evaluations, total.iterations - total.terminal_hits);
        assert_eq!(evaluator.inference_count(), total.evaluations);

        for worker in &report.workers {
            assert_eq!(worker.games, 3);
            assert_eq!(
                worker.stats.evaluations,
                worker.stats.iterations - worker.stats.terminal_hits
            );
        }
        assert_eq!(
            report.examples().count(),
            report.games.iter().map(|g| g.plies as usize).sum::<usize>()
        );
    }

    #[test]
    fn test_pool_worker_zero_replays_base_seed() {
        let evaluator = FixedEvaluator::new(0.0, vec![0.5, 0.5]);
        let config = MctsConfig::for_testing().with_iterations(3).with_max_plies(30);
        let pool = WorkerPool::new(1, config.clone());

        let report = pool.run(&evaluator, &Countdown::new(30), 1, |_, _| {}).unwrap();
        assert_eq!(report.games.len(), 1);

        let mut engine = SearchEngine::new(&evaluator, config);
        let replay = play_game(&mut engine, Countdown::new(30)).unwrap();

        let pooled: Vec<_> = report.games[0].examples.iter().map(|e| &e.visit_probs).collect();
        let direct: Vec<_> = replay.examples.iter().map(|e| &e.visit_probs).collect();
        assert_eq!(pooled, direct);
    }

    #[test]
    fn test_pool_shutdown_before_start() {
        let evaluator = fixed();
        let pool = WorkerPool::new(3, MctsConfig::for_testing());
        pool.shutdown_handle().store(true, Ordering::SeqCst);

        let report = pool.run(&evaluator, &Countdown::new(5), 10, |_, _| {}).unwrap();

        assert!(report.games.is_empty());
        assert!(report.workers.iter().all(|w| w.games == 0));
    }

    #[test]
    fn test_pool_reports_worker_failure() {
        let pool = WorkerPool::new(2, MctsConfig::for_testing());

        let err = pool
            .run(&Broken, &Countdown::new(5), 1, |_, _| {})
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::Evaluator(EvaluatorError::EvaluationFailed(_))
        ));
    }

    #[test]
    fn test_worker_failure_stops_the_other_workers() {
        let evaluator = Counting::new(FailsOnce::new(fixed()));
        let config = MctsConfig::for_testing().with_iterations(4).with_max_plies(10);
        let pool = WorkerPool::new(2, config);
        let games_per_worker = 10_000;

        let err = pool
            .run(&evaluator, &Countdown::new(3), games_per_worker, |_, _| {})
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::Evaluator(EvaluatorError::EvaluationFailed(_))
        ));
        assert!(pool.shutdown_handle().load(Ordering::SeqCst));
        // Every game needs at least one evaluation; the healthy worker
        // stopped long before finishing its share.
        assert!(evaluator.calls() < games_per_worker as usize);
    }

    #[test]
    fn test_pool_rejects_mismatched_policy_size() {
        let evaluator = FixedEvaluator::new(0.0, vec![0.2; 5]);
        let pool = WorkerPool::new(1, MctsConfig::for_testing());

        let err = pool
            .run(&evaluator, &Countdown::new(5), 1, |_, _| {})
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::Evaluator(EvaluatorError::MalformedOutput {
                expected: 2,
                actual: 5
            })
        ));
    }
}
