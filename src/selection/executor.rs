//! Fixed worker pool that runs selection queries in parallel.
//!
//! The pool is spawned once and reused for every query. A query splits the
//! index range into one partition per worker, sends partition `i` to worker
//! `i`, and hands back a [`PendingSelection`] immediately. The caller polls
//! it once per frame (or blocks on it) and only ever sees the fully merged
//! result or a failure, never a partial one.

use std::num::NonZeroUsize;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::JoinHandle;

use glam::Mat4;
use web_time::{Duration, Instant};

use super::partition::{merge_partitions, partition_ranges, scan_partition};
use super::rect::{NormalizedBounds, SelectionRect};
use crate::error::{CloudpickError, SelectionError};
use crate::points::PointStore;

/// Worker count used when the hardware parallelism cannot be queried.
pub const FALLBACK_WORKERS: usize = 4;

/// Inputs of one selection query, copied by value into every task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionQuery {
    /// Camera projection times inverse world transform.
    pub projection_view: Mat4,
    /// Normalized selection rectangle.
    pub bounds: NormalizedBounds,
}

impl SelectionQuery {
    /// Query for a dragged rectangle under a captured camera matrix.
    #[must_use]
    pub fn from_rect(rect: &SelectionRect, projection_view: Mat4) -> Self {
        Self {
            projection_view,
            bounds: rect.bounds(),
        }
    }
}

/// Merged result of a completed query.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOutcome {
    /// Sequence number assigned when the query was issued.
    pub generation: u64,
    /// Matching point indices, strictly ascending.
    pub indices: Vec<u32>,
    /// Time from dispatch to merge.
    pub elapsed: Duration,
}

impl SelectionOutcome {
    /// Number of matched points.
    #[must_use]
    pub fn count(&self) -> usize {
        self.indices.len()
    }
}

/// Scan every point on the calling thread.
///
/// Fallback for integrations that cannot create the worker pool; yields the
/// same indices as the parallel path.
///
/// # Panics
///
/// Panics if `point_count` exceeds the number of points in `store`.
#[must_use]
pub fn select_sequential(
    store: &PointStore,
    point_count: usize,
    query: &SelectionQuery,
) -> Vec<u32> {
    scan_partition(store, query, 0..point_count)
}

/// Hardware parallelism, or [`FALLBACK_WORKERS`] when unknown.
#[must_use]
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map_or(FALLBACK_WORKERS, NonZeroUsize::get)
}

struct ScanTask {
    store: PointStore,
    query: SelectionQuery,
    partition: usize,
    range: Range<usize>,
    reply: mpsc::Sender<PartitionReply>,
}

impl ScanTask {
    fn run(self) {
        let Self {
            store,
            query,
            partition,
            range,
            reply,
        } = self;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            scan_partition(&store, &query, range)
        }))
        .map_err(|_| SelectionError::WorkerPanicked { partition });
        // The receiver is gone if the caller dropped the pending query.
        let _ = reply.send(PartitionReply { partition, result });
    }
}

struct PartitionReply {
    partition: usize,
    result: Result<Vec<u32>, SelectionError>,
}

enum WorkerRequest {
    Scan(ScanTask),
    Shutdown,
}

struct Worker {
    request_tx: mpsc::Sender<WorkerRequest>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(index: usize) -> Result<Self, std::io::Error> {
        let (request_tx, request_rx) = mpsc::channel::<WorkerRequest>();
        let thread = std::thread::Builder::new()
            .name(format!("selection-worker-{index}"))
            .spawn(move || Self::thread_loop(index, request_rx))?;
        Ok(Self {
            request_tx,
            thread: Some(thread),
        })
    }

    #[allow(clippy::needless_pass_by_value)]
    fn thread_loop(index: usize, request_rx: mpsc::Receiver<WorkerRequest>) {
        while let Ok(request) = request_rx.recv() {
            match request {
                WorkerRequest::Shutdown => break,
                WorkerRequest::Scan(task) => task.run(),
            }
        }
        log::debug!("selection worker {index} stopped");
    }

    fn stop(&mut self) {
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Fixed-size pool of scan workers bound to one [`PointStore`].
pub struct SelectionExecutor {
    store: PointStore,
    workers: Vec<Worker>,
    next_generation: u64,
}

impl SelectionExecutor {
    /// Spawn `worker_count` workers (`0` picks [`default_worker_count`]).
    ///
    /// # Errors
    ///
    /// Returns [`CloudpickError::ThreadSpawn`] if a worker thread cannot be
    /// created. Workers spawned before the failure are shut down.
    pub fn new(
        store: PointStore,
        worker_count: usize,
    ) -> Result<Self, CloudpickError> {
        let count = if worker_count == 0 {
            default_worker_count()
        } else {
            worker_count
        };

        let mut workers = Vec::with_capacity(count);
        for index in 0..count {
            match Worker::spawn(index) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    workers.iter_mut().for_each(Worker::stop);
                    return Err(CloudpickError::ThreadSpawn(e));
                }
            }
        }

        log::info!(
            "selection pool ready: {count} workers over {} points",
            store.len()
        );
        Ok(Self {
            store,
            workers,
            next_generation: 0,
        })
    }

    /// Number of workers (and partitions per query).
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// The shared point buffer the workers scan.
    #[must_use]
    pub fn store(&self) -> &PointStore {
        &self.store
    }

    /// Generation number the next query will receive.
    #[must_use]
    pub fn next_generation(&self) -> u64 {
        self.next_generation
    }

    /// Issue a query over the first `point_count` points.
    ///
    /// Returns without waiting for the workers. A zero point count
    /// completes immediately with an empty result and dispatches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::PointCountOutOfRange`] if `point_count`
    /// exceeds the store, or [`SelectionError::WorkerUnavailable`] if a
    /// worker thread has exited.
    pub fn select(
        &mut self,
        point_count: usize,
        query: SelectionQuery,
    ) -> Result<PendingSelection, SelectionError> {
        if point_count > self.store.len() {
            return Err(SelectionError::PointCountOutOfRange {
                requested: point_count,
                available: self.store.len(),
            });
        }

        if self.workers.is_empty() {
            return Err(SelectionError::WorkerUnavailable { worker: 0 });
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        let ranges = partition_ranges(point_count, self.workers.len());
        let (reply_tx, reply_rx) = mpsc::channel();
        if point_count == 0 {
            return Ok(PendingSelection::new(generation, reply_rx, 0));
        }

        for (partition, (worker, range)) in
            self.workers.iter().zip(ranges).enumerate()
        {
            let task = ScanTask {
                store: self.store.clone(),
                query,
                partition,
                range,
                reply: reply_tx.clone(),
            };
            if worker.request_tx.send(WorkerRequest::Scan(task)).is_err() {
                return Err(SelectionError::WorkerUnavailable {
                    worker: partition,
                });
            }
        }

        log::debug!(
            "query {generation} dispatched to {} workers",
            self.workers.len()
        );
        Ok(PendingSelection::new(
            generation,
            reply_rx,
            self.workers.len(),
        ))
    }

    /// Stop and join every worker. Called automatically on drop.
    pub fn shutdown(&mut self) {
        for worker in &mut self.workers {
            worker.stop();
        }
        self.workers.clear();
    }
}

impl Drop for SelectionExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Handle to a query whose partitions are still being scanned.
pub struct PendingSelection {
    generation: u64,
    started: Instant,
    replies: mpsc::Receiver<PartitionReply>,
    slots: Vec<Option<Vec<u32>>>,
    remaining: usize,
    finished: bool,
}

impl PendingSelection {
    fn new(
        generation: u64,
        replies: mpsc::Receiver<PartitionReply>,
        partitions: usize,
    ) -> Self {
        Self {
            generation,
            started: Instant::now(),
            replies,
            slots: vec![None; partitions],
            remaining: partitions,
            finished: false,
        }
    }

    /// Sequence number of this query.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the result has already been handed out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Non-blocking check for completion.
    ///
    /// Returns `None` while partitions are outstanding and after the result
    /// has been taken. Returns `Some` exactly once.
    pub fn try_recv(
        &mut self,
    ) -> Option<Result<SelectionOutcome, SelectionError>> {
        if self.finished {
            return None;
        }
        while self.remaining > 0 {
            match self.replies.try_recv() {
                Ok(reply) => {
                    if let Err(e) = self.accept(reply) {
                        return Some(self.fail(e));
                    }
                }
                Err(mpsc::TryRecvError::Empty) => return None,
                Err(mpsc::TryRecvError::Disconnected) => {
                    let e = self.lost();
                    return Some(self.fail(e));
                }
            }
        }
        Some(Ok(self.merge()))
    }

    /// Block until every partition has reported.
    ///
    /// # Errors
    ///
    /// Returns the first partition failure, or
    /// [`SelectionError::AlreadyCollected`] if [`Self::try_recv`] already
    /// returned the result.
    pub fn wait(mut self) -> Result<SelectionOutcome, SelectionError> {
        if self.finished {
            return Err(SelectionError::AlreadyCollected {
                generation: self.generation,
            });
        }
        while self.remaining > 0 {
            let Ok(reply) = self.replies.recv() else {
                let e = self.lost();
                return self.fail(e);
            };
            if let Err(e) = self.accept(reply) {
                return self.fail(e);
            }
        }
        Ok(self.merge())
    }

    fn accept(&mut self, reply: PartitionReply) -> Result<(), SelectionError> {
        let indices = reply.result?;
        if let Some(slot) = self.slots.get_mut(reply.partition) {
            if slot.replace(indices).is_none() {
                self.remaining -= 1;
            }
        }
        Ok(())
    }

    fn lost(&self) -> SelectionError {
        let partition = self.slots.iter().position(Option::is_none).unwrap_or(0);
        SelectionError::WorkerLost { partition }
    }

    fn fail(
        &mut self,
        e: SelectionError,
    ) -> Result<SelectionOutcome, SelectionError> {
        self.finished = true;
        self.slots.clear();
        log::error!("selection query {} failed: {e}", self.generation);
        Err(e)
    }

    fn merge(&mut self) -> SelectionOutcome {
        self.finished = true;
        let parts = std::mem::take(&mut self.slots)
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        let indices = merge_partitions(parts);
        let elapsed = self.started.elapsed();
        log::debug!(
            "query {} merged {} indices in {elapsed:?}",
            self.generation,
            indices.len()
        );
        SelectionOutcome {
            generation: self.generation,
            indices,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;

    fn grid_store(n: usize) -> PointStore {
        // Points spread along the screen diagonal under the identity matrix.
        let points: Vec<Vec3> = (0..n)
            .map(|i| {
                let t = (i as f32 + 0.5) / n as f32;
                let w = 2.0f32.mul_add(t, -1.0);
                Vec3::new(w, w, 0.0)
            })
            .collect();
        PointStore::from_points(&points).unwrap()
    }

    fn full_query() -> SelectionQuery {
        SelectionQuery {
            projection_view: Mat4::IDENTITY,
            bounds: NormalizedBounds::FULL,
        }
    }

    #[test]
    fn full_rect_selects_every_point_in_order() {
        let mut executor = SelectionExecutor::new(grid_store(100), 4).unwrap();
        assert_eq!(executor.worker_count(), 4);
        let outcome = executor.select(100, full_query()).unwrap().wait().unwrap();
        assert_eq!(outcome.indices, (0..100).collect::<Vec<u32>>());
        assert_eq!(outcome.count(), 100);
    }

    #[test]
    fn parallel_matches_sequential_and_is_repeatable() {
        let store = grid_store(1003);
        let query = SelectionQuery {
            projection_view: Mat4::IDENTITY,
            bounds: NormalizedBounds::from_corners(
                Vec2::splat(0.2),
                Vec2::splat(0.65),
            ),
        };
        let expected = select_sequential(&store, store.len(), &query);
        assert!(!expected.is_empty());

        let mut executor = SelectionExecutor::new(store, 3).unwrap();
        let first = executor.select(1003, query).unwrap().wait().unwrap();
        let second = executor.select(1003, query).unwrap().wait().unwrap();
        assert_eq!(first.indices, expected);
        assert_eq!(first.indices, second.indices);
        assert_eq!(second.generation, first.generation + 1);
    }

    #[test]
    fn zero_points_completes_immediately() {
        let mut executor = SelectionExecutor::new(grid_store(10), 2).unwrap();
        let mut pending = executor.select(0, full_query()).unwrap();
        let outcome = pending.try_recv().unwrap().unwrap();
        assert!(outcome.indices.is_empty());
        assert!(pending.try_recv().is_none());
    }

    #[test]
    fn prefix_query_only_scans_requested_points() {
        let mut executor = SelectionExecutor::new(grid_store(50), 4).unwrap();
        let outcome = executor.select(7, full_query()).unwrap().wait().unwrap();
        assert_eq!(outcome.indices, (0..7).collect::<Vec<u32>>());
    }

    #[test]
    fn rejects_more_points_than_stored() {
        let mut executor = SelectionExecutor::new(grid_store(10), 2).unwrap();
        let err = executor.select(11, full_query()).err().unwrap();
        assert_eq!(
            err,
            SelectionError::PointCountOutOfRange {
                requested: 11,
                available: 10
            }
        );
    }

    #[test]
    fn polling_eventually_yields_result_once() {
        let mut executor = SelectionExecutor::new(grid_store(500), 4).unwrap();
        let mut pending = executor.select(500, full_query()).unwrap();
        let outcome = loop {
            if let Some(result) = pending.try_recv() {
                break result.unwrap();
            }
            std::thread::yield_now();
        };
        assert_eq!(outcome.count(), 500);
        assert!(pending.is_finished());
        assert!(pending.try_recv().is_none());
        assert_eq!(
            pending.wait().err(),
            Some(SelectionError::AlreadyCollected { generation: 0 })
        );
    }

    #[test]
    fn partition_failure_fails_whole_query() {
        let (tx, rx) = mpsc::channel();
        let pending = PendingSelection::new(9, rx, 3);
        tx.send(PartitionReply {
            partition: 0,
            result: Ok(vec![1, 2]),
        })
        .unwrap();
        tx.send(PartitionReply {
            partition: 1,
            result: Err(SelectionError::WorkerPanicked { partition: 1 }),
        })
        .unwrap();
        tx.send(PartitionReply {
            partition: 2,
            result: Ok(vec![9]),
        })
        .unwrap();
        assert_eq!(
            pending.wait(),
            Err(SelectionError::WorkerPanicked { partition: 1 })
        );
    }

    #[test]
    fn panicking_scan_fails_whole_query_and_worker_survives() {
        let store = grid_store(4);
        let (tx, rx) = mpsc::channel();
        let pending = PendingSelection::new(3, rx, 3);
        let mut worker = Worker::spawn(0).unwrap();
        // The last range runs past the store end, so its scan panics.
        for (partition, range) in [(0, 0..2), (1, 2..4), (2, 0..10)] {
            let task = ScanTask {
                store: store.clone(),
                query: full_query(),
                partition,
                range,
                reply: tx.clone(),
            };
            worker.request_tx.send(WorkerRequest::Scan(task)).unwrap();
        }
        drop(tx);
        assert_eq!(
            pending.wait(),
            Err(SelectionError::WorkerPanicked { partition: 2 })
        );

        // The panic was contained; the same thread still serves scans.
        let (tx, rx) = mpsc::channel();
        let pending = PendingSelection::new(4, rx, 1);
        let task = ScanTask {
            store,
            query: full_query(),
            partition: 0,
            range: 0..4,
            reply: tx,
        };
        worker.request_tx.send(WorkerRequest::Scan(task)).unwrap();
        assert_eq!(pending.wait().unwrap().indices, vec![0, 1, 2, 3]);
        worker.stop();
    }

    #[test]
    fn vanished_worker_fails_instead_of_returning_partial() {
        let (tx, rx) = mpsc::channel();
        let mut pending = PendingSelection::new(0, rx, 2);
        tx.send(PartitionReply {
            partition: 1,
            result: Ok(vec![5]),
        })
        .unwrap();
        assert!(pending.try_recv().is_none());
        drop(tx);
        assert_eq!(
            pending.try_recv(),
            Some(Err(SelectionError::WorkerLost { partition: 0 }))
        );
    }

    #[test]
    fn replies_merge_in_partition_order_not_arrival_order() {
        let (tx, rx) = mpsc::channel();
        let pending = PendingSelection::new(0, rx, 3);
        for (partition, indices) in
            [(2, vec![20, 21]), (0, vec![1]), (1, vec![10])]
        {
            tx.send(PartitionReply {
                partition,
                result: Ok(indices),
            })
            .unwrap();
        }
        let outcome = pending.wait().unwrap();
        assert_eq!(outcome.indices, vec![1, 10, 20, 21]);
    }

    #[test]
    fn shutdown_joins_workers() {
        let mut executor = SelectionExecutor::new(grid_store(10), 2).unwrap();
        executor.shutdown();
        assert_eq!(executor.worker_count(), 0);
        assert_eq!(
            executor.select(10, full_query()).err(),
            Some(SelectionError::WorkerUnavailable { worker: 0 })
        );
    }
}
