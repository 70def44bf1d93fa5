use std::thread;

use ahash::AHashSet;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    error::GenerateError,
    generator::{Test, TestGenerator},
};

/// A synthesis request for one string of the given target class.
#[derive(Debug, Clone, Copy)]
struct Job {
    positive: bool,
}

/// What a worker sends back for a [`Job`].
#[derive(Debug)]
struct Attempt {
    job: Job,
    test: Option<Test>,
}

/// The single owner of the accepted tests.
///
/// Quotas are indexed by class: `[negative, positive]`.
struct Collector {
    necessary: bool,
    budget: usize,
    requested: usize,
    attempts: usize,
    remaining: [usize; 2],
    in_flight: [usize; 2],
    seen: AHashSet<String>,
    tests: Vec<Test>,
}

impl Collector {
    fn new(count: usize, positives: usize, necessary: bool, budget: usize) -> Self {
        Self {
            necessary,
            budget,
            requested: count,
            attempts: 0,
            remaining: [count - positives, positives],
            in_flight: [0, 0],
            seen: AHashSet::with_capacity(count),
            tests: Vec::with_capacity(count),
        }
    }

    fn is_done(&self) -> bool {
        self.remaining == [0, 0]
    }

    /// Keep one outstanding job per missing test of each class while budget is left.
    fn top_up(&mut self, jobs: &Sender<Job>) -> Result<(), GenerateError> {
        for positive in [true, false] {
            let class = positive as usize;

            while self.in_flight[class] < self.remaining[class] && self.attempts < self.budget {
                jobs.send(Job { positive }).map_err(|_| GenerateError::WorkersDisconnected)?;
                self.in_flight[class] += 1;
                self.attempts += 1;
            }
        }

        Ok(())
    }

    fn accept(&mut self, attempt: Attempt) {
        let Some(test) = attempt.test else {
            return;
        };

        // In hard mode a result only counts for the class it was synthesized for
        if self.necessary && test.answer != attempt.job.positive {
            return;
        }

        let class = attempt.job.positive as usize;

        if self.remaining[class] == 0 || !self.seen.insert(test.question.clone()) {
            return;
        }

        self.remaining[class] -= 1;
        self.tests.push(test);
        debug!("Accepted test {}/{}", self.tests.len(), self.requested);
    }

    fn drain(&mut self, jobs: &Sender<Job>, results: &Receiver<Attempt>) -> Result<(), GenerateError> {
        loop {
            self.top_up(jobs)?;

            if self.is_done() {
                return Ok(());
            }

            if self.in_flight == [0, 0] {
                warn!(
                    "Attempt budget of {} exhausted with {}/{} tests",
                    self.budget,
                    self.tests.len(),
                    self.requested
                );
                return Err(GenerateError::AttemptsExhausted {
                    requested: self.requested,
                    accepted: self.tests.len(),
                    attempts: self.attempts,
                });
            }

            let attempt = results.recv().map_err(|_| GenerateError::WorkersDisconnected)?;
            self.in_flight[attempt.job.positive as usize] -= 1;
            self.accept(attempt);
        }
    }
}

fn worker_rng(seed: Option<u64>, idx: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(idx as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Run a worker pool until `count` unique tests with `positives` positives are collected.
pub(crate) fn collect(generator: &TestGenerator, count: usize, positives: usize) -> Result<Vec<Test>, GenerateError> {
    let config = generator.config();
    let workers = config.worker_count(count);
    let budget = count.saturating_mul(config.max_attempts_per_test.max(1));

    let (job_tx, job_rx) = crossbeam_channel::unbounded::<Job>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<Attempt>();

    debug!("Spawning {} workers with a budget of {} attempts", workers, budget);

    let outcome = thread::scope(|scope| {
        for idx in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let mut rng = worker_rng(config.seed, idx);

            scope.spawn(move || {
                for job in job_rx.iter() {
                    let test = generator.synthesize_one(job.positive, &mut rng);

                    if result_tx.send(Attempt { job, test }).is_err() {
                        break;
                    }
                }
            });
        }

        drop(result_tx);

        let mut collector = Collector::new(count, positives, config.necessary, budget);
        let outcome = collector.drain(&job_tx, &result_rx);

        // Close intake, discard queued jobs and let the workers run out
        drop(job_tx);
        while job_rx.try_recv().is_ok() {}
        drop(result_rx);

        outcome.map(|()| collector.tests)
    });

    let mut tests = outcome?;
    tests.sort_by(|a, b| a.question.cmp(&b.question));
    Ok(tests)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test(question: &str, answer: bool) -> Option<Test> {
        Some(Test {
            question: question.to_string(),
            answer,
        })
    }

    #[test]
    fn test_hard_mode_discards_wrong_class() {
        let mut collector = Collector::new(2, 1, true, 10);
        collector.accept(Attempt { job: Job { positive: true }, test: test("ba", false) });
        collector.accept(Attempt { job: Job { positive: false }, test: test("ab", true) });
        assert_eq!(collector.remaining, [1, 1]);
        assert!(collector.tests.is_empty());

        collector.accept(Attempt { job: Job { positive: true }, test: test("ab", true) });
        collector.accept(Attempt { job: Job { positive: false }, test: test("ba", false) });
        assert!(collector.is_done());

        // Both classes are full now
        collector.accept(Attempt { job: Job { positive: true }, test: test("aabb", true) });
        assert_eq!(collector.tests.len(), 2);
    }

    #[test]
    fn test_wrong_class_is_retried() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut collector = Collector::new(1, 0, true, 10);
        collector.top_up(&tx).unwrap();
        let job = rx.try_recv().unwrap();
        assert!(!job.positive);

        collector.in_flight[0] -= 1;
        collector.accept(Attempt { job, test: test("ab", true) });
        collector.top_up(&tx).unwrap();

        let retry = rx.try_recv().unwrap();
        assert!(!retry.positive);
        assert_eq!(collector.remaining, [1, 0]);
        assert_eq!(collector.attempts, 2);
    }

    #[test]
    fn test_soft_mode_uses_targets() {
        let mut collector = Collector::new(2, 1, false, 10);
        collector.accept(Attempt { job: Job { positive: true }, test: test("ba", false) });
        collector.accept(Attempt { job: Job { positive: true }, test: test("bb", false) });
        assert_eq!(collector.remaining, [1, 0]);
    }

    #[test]
    fn test_duplicates_and_empty() {
        let mut collector = Collector::new(3, 3, true, 10);
        collector.accept(Attempt { job: Job { positive: true }, test: test("ab", true) });
        collector.accept(Attempt { job: Job { positive: true }, test: test("ab", true) });
        collector.accept(Attempt { job: Job { positive: true }, test: None });
        assert_eq!(collector.remaining, [0, 2]);
    }

    #[test]
    fn test_top_up_respects_budget() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut collector = Collector::new(4, 2, true, 3);
        collector.top_up(&tx).unwrap();
        assert_eq!(collector.in_flight, [1, 2]);
        assert_eq!(rx.len(), 3);
    }
}
