use anyhow::{Context, Result};
use engine_core::GameState;
use games_tictactoe::Board;
use indicatif::{ProgressBar, ProgressStyle};
use mcts::{PoolReport, SearchStats, SharedEvaluator, UniformEvaluator, WorkerPool};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::Config;
use crate::output::write_examples;

/// What a finished run produced.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub games: usize,
    pub examples: usize,
    pub decisive_games: usize,
    pub truncated_games: usize,
    pub inference_count: u64,
    pub stats: SearchStats,
}

impl RunSummary {
    fn from_report(report: &PoolReport<Board>, examples: usize, inference_count: u64) -> Self {
        let truncated_games = report.games.iter().filter(|g| g.result.is_none()).count();
        let decisive_games = report
            .games
            .iter()
            .filter(|g| g.result.is_some_and(|r| r.value() != 0.0))
            .count();
        Self {
            games: report.games.len(),
            examples,
            decisive_games,
            truncated_games,
            inference_count,
            stats: report.total_stats(),
        }
    }

    /// Log a summary of the search work behind the run.
    fn log_summary(&self, elapsed_secs: f64) {
        let total_ms = self.stats.total_time_us as f64 / 1000.0;
        let inference_pct = if self.stats.total_time_us > 0 {
            (self.stats.inference_time_us as f64 / self.stats.total_time_us as f64) * 100.0
        } else {
            0.0
        };
        let games_per_sec = if elapsed_secs > 0.0 {
            self.games as f64 / elapsed_secs
        } else {
            0.0
        };

        info!(
            games = self.games,
            examples = self.examples,
            decisive = self.decisive_games,
            truncated = self.truncated_games,
            iterations = self.stats.iterations,
            evaluations = self.stats.evaluations,
            terminal_hits = self.stats.terminal_hits,
            nodes = self.stats.nodes_created,
            search_ms = format!("{:.1}", total_ms),
            inference_pct = format!("{:.1}%", inference_pct),
            games_per_sec = format!("{:.2}", games_per_sec),
            "Self-play run stats"
        );
    }
}

/// Runs the self-play worker pool and persists its examples.
pub struct Actor {
    config: Config,
    pool: WorkerPool,
    shutdown_signal: Arc<AtomicBool>,
}

impl Actor {
    pub fn new(config: Config) -> Result<Self> {
        let mcts_config = config.mcts_config();
        mcts_config
            .validate()
            .context("invalid MCTS configuration")?;

        let pool = WorkerPool::new(config.workers, mcts_config);
        let shutdown_signal = pool.shutdown_handle();

        info!(
            workers = config.workers,
            games_per_worker = config.games_per_worker,
            iterations = config.iterations,
            max_plies = config.max_plies,
            seed = config.seed,
            output = %config.output,
            "Actor initialized"
        );

        Ok(Self {
            config,
            pool,
            shutdown_signal,
        })
    }

    /// Play every configured game, then write the examples.
    ///
    /// Search runs on a blocking thread so the runtime stays free to
    /// deliver the shutdown signal.
    pub async fn run(self: Arc<Self>) -> Result<RunSummary> {
        let actor = Arc::clone(&self);
        tokio::task::spawn_blocking(move || actor.run_blocking())
            .await
            .context("self-play task panicked")?
    }

    fn run_blocking(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let evaluator = SharedEvaluator::new(UniformEvaluator::new(Board::POLICY_SIZE));
        let progress = self.progress_bar()?;
        let finished = AtomicU32::new(0);
        let log_interval = self.config.log_interval;

        info!("Starting self-play");

        let report = self.pool.run(
            &evaluator,
            &Board::new(),
            self.config.games_per_worker,
            |worker_id, record| {
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                if log_interval > 0 && done % log_interval == 0 {
                    info!(
                        games = done,
                        worker_id,
                        plies = record.plies,
                        result = ?record.result,
                        "Self-play progress"
                    );
                }
            },
        )?;

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        let path = self.config.output_path();
        let examples = write_examples(&path, report.examples())
            .with_context(|| format!("writing examples to {}", path.display()))?;

        let summary = RunSummary::from_report(&report, examples, evaluator.inference_count());
        summary.log_summary(started.elapsed().as_secs_f64());
        info!(path = %path.display(), examples, "Training examples written");

        Ok(summary)
    }

    /// Progress bar over finished games, only when stderr is a TTY.
    fn progress_bar(&self) -> Result<Option<ProgressBar>> {
        if !std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            return Ok(None);
        }

        let pb = ProgressBar::new(self.config.total_games());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} games ({eta})")?
                .progress_chars("#>-"),
        );
        Ok(Some(pb))
    }

    pub fn shutdown(&self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        info!("Shutdown signal set");
    }
}
