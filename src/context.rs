//! The `Context` is the simulation's single owner of state.
//!
//! It keeps simulated time (in hours), a queue of timed plans, a queue of callbacks that run
//! before the next plan, and a set of type-keyed data containers ("data plugins"). Every model
//! component, including the city itself, stores its state in a data plugin and exposes its
//! operations through an extension trait on `Context`.
use std::any::{Any, TypeId};
use std::collections::VecDeque;

use crate::plan::{ExecutionPhase, PlanId, Queue};
use crate::{trace, HashMap, HashMapExt};

/// A trait for objects that can provide data containers to be held by `Context`
pub trait DataPlugin: Any {
    type DataContainer;

    fn create_data_container() -> Self::DataContainer;
}

/// Defines a new type for storing data in Context.
#[macro_export]
macro_rules! define_data_plugin {
    ($data_plugin:ident, $data_container:ty, $default: expr) => {
        struct $data_plugin;

        impl $crate::context::DataPlugin for $data_plugin {
            type DataContainer = $data_container;

            fn create_data_container() -> Self::DataContainer {
                $default
            }
        }
    };
}
pub use define_data_plugin;

type Callback = dyn FnOnce(&mut Context);

/// A manager for the state of a discrete-event simulation
pub struct Context {
    plan_queue: Queue<Box<Callback>>,
    callback_queue: VecDeque<Box<Callback>>,
    data_plugins: HashMap<TypeId, Box<dyn Any>>,
    current_time: f64,
    shutdown_requested: bool,
}

impl Context {
    /// Create a new empty `Context`
    #[must_use]
    pub fn new() -> Context {
        Context {
            plan_queue: Queue::new(),
            callback_queue: VecDeque::new(),
            data_plugins: HashMap::new(),
            current_time: 0.0,
            shutdown_requested: false,
        }
    }

    /// Add a plan to run at `time`, in the `Normal` phase.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN, infinite, or earlier than the current time.
    pub fn add_plan(&mut self, time: f64, callback: impl FnOnce(&mut Context) + 'static) -> PlanId {
        self.add_plan_with_phase(time, callback, ExecutionPhase::Normal)
    }

    /// Add a plan to run at `time` in the given phase.
    ///
    /// # Panics
    ///
    /// Panics if `time` is NaN, infinite, or earlier than the current time.
    pub fn add_plan_with_phase(
        &mut self,
        time: f64,
        callback: impl FnOnce(&mut Context) + 'static,
        phase: ExecutionPhase,
    ) -> PlanId {
        assert!(
            !time.is_nan() && !time.is_infinite() && time >= self.current_time,
            "Time {time} is invalid"
        );
        self.plan_queue.add_plan(time, Box::new(callback), phase)
    }

    /// Cancel a plan that has not run yet.
    ///
    /// # Panics
    ///
    /// Panics if the plan has already run or been cancelled.
    pub fn cancel_plan(&mut self, id: &PlanId) {
        trace!("cancelling plan {id:?}");
        self.plan_queue.cancel_plan(id);
    }

    /// Queue a callback that runs before the next plan.
    pub fn queue_callback(&mut self, callback: impl FnOnce(&mut Context) + 'static) {
        self.callback_queue.push_back(Box::new(callback));
    }

    /// Stop `execute()` once the currently running plan or callback returns.
    pub fn shutdown(&mut self) {
        trace!("shutdown requested at t={}", self.current_time);
        self.shutdown_requested = true;
    }

    /// Returns a mutable reference to the data container for `T`, creating it if it doesn't exist
    /// yet.
    #[allow(clippy::missing_panics_doc)]
    pub fn get_data_container_mut<T: DataPlugin>(&mut self, _plugin: T) -> &mut T::DataContainer {
        self.data_plugins
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(T::create_data_container()))
            .downcast_mut::<T::DataContainer>()
            // The entry is keyed by `T`, so it always holds a `T::DataContainer`.
            .unwrap()
    }

    /// Returns a reference to the data container for `T` if it exists.
    pub fn get_data_container<T: DataPlugin>(&self, _plugin: T) -> Option<&T::DataContainer> {
        self.data_plugins
            .get(&TypeId::of::<T>())
            .and_then(|data| data.downcast_ref::<T::DataContainer>())
    }

    /// The current simulated time in hours.
    #[must_use]
    pub fn get_current_time(&self) -> f64 {
        self.current_time
    }

    /// Run plans and callbacks until both queues are empty or `shutdown()` is called.
    pub fn execute(&mut self) {
        trace!("entering event loop");
        self.shutdown_requested = false;
        loop {
            if self.shutdown_requested {
                break;
            }

            // Callbacks always run before the next timed plan.
            if let Some(callback) = self.callback_queue.pop_front() {
                callback(self);
                continue;
            }

            match self.plan_queue.get_next_plan() {
                Some(plan) => {
                    self.current_time = plan.time;
                    (plan.data)(self);
                }
                None => break,
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
