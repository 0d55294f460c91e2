// src/crawl/worklist.rs
// =============================================================================
// A self-expanding work queue drained by concurrent tasks.
//
// Both crawl stages are instances of this engine:
// - the sitemap resolver, where processing a sitemap can discover more sitemaps
// - the page scraper, where processing a page never discovers anything
//
// How it works:
// 1. Every id in the seed batch is claimed: `pending` goes up by one and a
//    tokio task starts running `process(id)`
// 2. Each task sends exactly ONE message back on the channel when it is done,
//    carrying its follow-up ids. The message is sent even when there are no
//    follow-ups, when `process` fails, and when it panics
// 3. The control loop receives one message, decrements `pending` once for the
//    unit it belongs to, and claims every follow-up id in it
// 4. When `pending` reaches zero, nothing is running and nothing is queued, so
//    the loop ends
//
// `pending` is only touched by the control loop, so it needs no atomic. The
// channel is unbounded so a finishing task never waits on the loop.
//
// Rust concepts:
// - Generic async closures: `F: Fn(String) -> Fut` where Fut is a Future
// - Arc: every task needs its own handle on the shared `process` closure
// - catch_unwind: turns a panic inside a task into a normal failed unit
// =============================================================================

use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::config::DedupPolicy;
use crate::error::CrawlError;

/// What an engine run did, reported once it terminates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorklistSummary {
    /// Units that ran to completion (failed ones included)
    pub processed: usize,
    /// Units whose `process` call returned an error or panicked
    pub failed: usize,
    /// Ids not claimed because the dedup policy had already seen them
    pub skipped: usize,
}

// The single message every claimed unit sends back
struct Completed {
    follow_ups: Vec<String>,
    failed: bool,
}

#[derive(Debug, Clone)]
pub struct Worklist {
    name: &'static str,
    dedup: DedupPolicy,
}

impl Worklist {
    /// `name` only shows up in log lines.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            dedup: DedupPolicy::Off,
        }
    }

    pub fn dedup(mut self, policy: DedupPolicy) -> Self {
        self.dedup = policy;
        self
    }

    /// Drives `seed` and everything it leads to until no work remains.
    ///
    /// `process` returns the follow-up ids for one unit. An error is logged
    /// and counts as "no follow-ups"; the unit is still complete.
    pub async fn run<F, Fut>(&self, seed: Vec<String>, process: F) -> WorklistSummary
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<String>, CrawlError>> + Send + 'static,
    {
        let process = Arc::new(process);
        let (tx, mut rx) = mpsc::unbounded_channel::<Completed>();

        let mut pending: usize = 0;
        let mut seen: HashSet<String> = HashSet::new();
        let mut summary = WorklistSummary::default();

        self.claim(seed, &process, &tx, &mut pending, &mut seen, &mut summary);

        while pending > 0 {
            // `tx` lives in this scope, so recv() only yields None if every
            // sender is gone, which cannot happen while we hold one.
            let Some(done) = rx.recv().await else {
                error!(engine = self.name, pending, "worklist channel closed early");
                break;
            };

            pending -= 1;
            summary.processed += 1;
            if done.failed {
                summary.failed += 1;
            }

            debug!(
                engine = self.name,
                follow_ups = done.follow_ups.len(),
                pending,
                "unit complete"
            );

            self.claim(done.follow_ups, &process, &tx, &mut pending, &mut seen, &mut summary);
        }

        info!(
            engine = self.name,
            processed = summary.processed,
            failed = summary.failed,
            skipped = summary.skipped,
            "worklist drained"
        );

        summary
    }

    // Claims every id in `batch`: one increment of `pending`, one task each
    fn claim<F, Fut>(
        &self,
        batch: Vec<String>,
        process: &Arc<F>,
        tx: &UnboundedSender<Completed>,
        pending: &mut usize,
        seen: &mut HashSet<String>,
        summary: &mut WorklistSummary,
    ) where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<String>, CrawlError>> + Send + 'static,
    {
        for id in batch {
            if self.dedup == DedupPolicy::PerEngine && !seen.insert(id.clone()) {
                debug!(engine = self.name, id = %id, "already claimed, skipping");
                summary.skipped += 1;
                continue;
            }

            *pending += 1;
            spawn_unit(self.name, id, Arc::clone(process), tx.clone());
        }
    }
}

fn spawn_unit<F, Fut>(name: &'static str, id: String, process: Arc<F>, tx: UnboundedSender<Completed>)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<String>, CrawlError>> + Send + 'static,
{
    tokio::spawn(async move {
        // The call to `process` happens inside the guarded future so a panic
        // while building the future is caught as well.
        let unit_id = id.clone();
        let work = async move { (*process)(unit_id).await };

        let completed = match AssertUnwindSafe(work).catch_unwind().await {
            Ok(Ok(follow_ups)) => Completed {
                follow_ups,
                failed: false,
            },
            Ok(Err(e)) => {
                warn!(engine = name, id = %id, error = %e, "unit failed");
                Completed {
                    follow_ups: Vec::new(),
                    failed: true,
                }
            }
            Err(_) => {
                error!(engine = name, id = %id, "unit panicked");
                Completed {
                    follow_ups: Vec::new(),
                    failed: true,
                }
            }
        };

        // The receiver outlives every claimed unit, see Worklist::run
        let _ = tx.send(completed);
    });
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why count units instead of checking "is the channel empty"?
//    - An empty channel can just mean every task is still busy fetching
//    - Only the counter knows how many tasks are still going to report back
//
// 2. Why must a task send a message even with no follow-ups?
//    - The loop decrements `pending` only when a message arrives
//    - A silent task would leave `pending` above zero forever and the loop
//      would wait on recv() with nobody left to send
//
// 3. What is AssertUnwindSafe?
//    - catch_unwind needs the future to promise it is safe to observe after a
//      panic; we only read the result, so we assert that it is
// -----------------------------------------------------------------------------
