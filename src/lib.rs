//! An hour-by-hour SIR simulation of a synthetic city
//!
//! The city is made of typed buildings (homes, offices, schools, restaurants, stores and
//! hospitals) and the people who live in the homes. Every simulated hour, each building applies
//! its occupancy rule, moving people in and out according to its schedule, and then its
//! transmission rule, infecting susceptible occupants in proportion to the share of infected
//! people in the room. Infected people recover after a fixed number of hours, faster if they are
//! treated in a hospital.
//!
//! The central object is the `Context`, which owns all the state of a simulation:
//! * A notion of time (in hours) and a queue of plans to execute at future times
//! * Type-keyed data containers, one of which holds the city
//! * Named, independently seeded random number streams
//! * Global properties such as the [`parameters::CityParameters`]
//!
//! The city's operations are methods of the [`ContextCityExt`] extension trait, so building and
//! running a city is:
//!
//! ```rust
//! use ixa_city::prelude::*;
//!
//! let mut context = Context::new();
//! context.init_random(7);
//! context.add_homes(50);
//! context.construct_offices(2);
//! context.construct_hospital(1, 5, 2);
//! context.assign_workplaces();
//! context.seed_infected(2).unwrap();
//! context.schedule_hourly_updates(24);
//! context.execute();
//!
//! assert_eq!(context.get_clock().current_day(), 1);
//! assert_eq!(context.get_counts().total(), 50);
//! ```
pub mod buildings;
pub mod city;
pub mod clock;
pub mod context;
pub mod disease;
pub mod error;
pub mod global_properties;
pub mod hashing;
pub mod log;
pub mod parameters;
pub mod people;
pub mod plan;
pub mod prelude;
pub mod random;
pub mod runner;

pub use buildings::{Building, BuildingId, BuildingType, HospitalCapacity};
pub use city::{BuildingCounts, ContextCityExt, DEFAULT_SEED};
pub use clock::Clock;
pub use context::Context;
pub use error::CityError;
pub use global_properties::{ContextGlobalPropertiesExt, GlobalProperty};
pub use hashing::{HashMap, HashMapExt, HashSet, HashSetExt};
pub use crate::log::{debug, error, info, trace, warn};
pub use parameters::{CityParameters, Parameters};
pub use people::{DiseaseState, Person, PersonId, SirCounts};
pub use plan::{ExecutionPhase, PlanId};
pub use random::{ContextRandomExt, RngId};

// Re-exported for use in macros
pub use paste;
pub use rand;
