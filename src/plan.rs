//! A priority queue of timed callbacks ("plans").
//!
//! The city is stepped by plans: each simulated hour is one plan that runs a full tick. Plans are
//! ordered by time, then by [`ExecutionPhase`], then by the order in which they were added, so two
//! plans at the same hour always run in a reproducible order. Adding a plan is *O*(log(*n*))
//! while cancellation and retrieval are *O*(1).

use std::{cmp::Ordering, collections::BinaryHeap};

use crate::{HashMap, HashMapExt};

/// Orders plans that are scheduled for the same time.
///
/// `Last` is used for work that must observe the complete state of an hour, such as
/// shutting the simulation down after the final tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ExecutionPhase {
    First,
    #[default]
    Normal,
    Last,
}

/// A priority queue that stores arbitrary data sorted by time.
///
/// The time, plan id, and phase are stored in a binary heap of `Entry` objects. The data
/// payload is stored in a hash map by plan id, and cancellation removes the payload only. The
/// orphaned heap entry is skipped when it reaches the front of the queue.
pub struct Queue<T> {
    queue: BinaryHeap<Entry>,
    data_map: HashMap<u64, T>,
    plan_counter: u64,
}

impl<T> Queue<T> {
    /// Create a new empty `Queue<T>`
    #[must_use]
    pub fn new() -> Queue<T> {
        Queue {
            queue: BinaryHeap::new(),
            data_map: HashMap::new(),
            plan_counter: 0,
        }
    }

    /// Add a plan to the queue at the specified time and phase.
    ///
    /// Returns a `PlanId` for the newly-added plan that can be used to cancel it.
    pub fn add_plan(&mut self, time: f64, data: T, phase: ExecutionPhase) -> PlanId {
        let id = self.plan_counter;
        self.queue.push(Entry { time, phase, id });
        self.data_map.insert(id, data);
        self.plan_counter += 1;
        PlanId(id)
    }

    /// Cancel a plan that has been added to the queue
    ///
    /// # Panics
    ///
    /// This function panics if you cancel a plan which has already
    /// been cancelled or executed.
    pub fn cancel_plan(&mut self, id: &PlanId) {
        self.data_map.remove(&id.0).expect("Plan does not exist");
    }

    /// Returns `true` if there are no plans left to run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data_map.is_empty()
    }

    /// Retrieve the earliest plan in the queue, skipping cancelled plans.
    pub fn get_next_plan(&mut self) -> Option<Plan<T>> {
        while let Some(entry) = self.queue.pop() {
            if let Some(data) = self.data_map.remove(&entry.id) {
                return Some(Plan {
                    time: entry.time,
                    data,
                });
            }
        }
        None
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(PartialEq, Debug)]
struct Entry {
    time: f64,
    phase: ExecutionPhase,
    id: u64,
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `BinaryHeap` is a max-heap, so every comparison is reversed to pop the earliest time, then
/// the earliest phase, then the lowest plan id.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.phase.cmp(&self.phase))
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// A unique identifier for a plan added to a `Queue<T>`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlanId(u64);

/// A plan that holds data of type `T` intended to be used at the specified time
pub struct Plan<T> {
    pub time: f64,
    pub data: T,
}
