//! Named, independently seeded random number streams.
//!
//! Every stochastic part of the city (transmission, infection seeding, visitor selection and
//! hiring) draws from its own stream declared with [`define_rng!`]. The
//! streams are created lazily from the base seed passed to
//! [`ContextRandomExt::init_random`], so two runs with the same seed and the same setup are
//! identical.
mod context_ext;
mod macros;

use std::any::{Any, TypeId};
use std::cell::RefCell;

pub use context_ext::ContextRandomExt;
pub use macros::define_rng;

use crate::rand::SeedableRng;
use crate::{define_data_plugin, Context, HashMap, HashMapExt};

pub trait RngId: Copy + Clone + Any {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}

// This is a wrapper that allows for future support for different types of
// random number generators (anything that implements SeedableRng is valid).
struct RngHolder {
    rng: Box<dyn Any>,
}

struct RngData {
    base_seed: u64,
    rng_holders: RefCell<HashMap<TypeId, RngHolder>>,
}

// Registers a data container which stores:
// * base_seed: A base seed for all rngs
// * rng_holders: A map of rngs, keyed by their RngId. Note that this is
//   stored in a RefCell to allow for mutable borrow without requiring a
//   mutable borrow of the Context itself.
define_data_plugin!(
    RngPlugin,
    RngData,
    RngData {
        base_seed: 0,
        rng_holders: RefCell::new(HashMap::new()),
    }
);

/// Seeds every stream from `base_seed` unless `init_random` has already been called. Returns
/// whether the seed was applied.
pub(crate) fn init_random_if_unset(context: &mut Context, base_seed: u64) -> bool {
    if context.get_data_container(RngPlugin).is_some() {
        return false;
    }
    context.init_random(base_seed);
    true
}
