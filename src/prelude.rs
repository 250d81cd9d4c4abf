pub use crate::buildings::{BuildingId, BuildingType};
pub use crate::city::ContextCityExt;
pub use crate::context::Context;
pub use crate::error::CityError;
pub use crate::global_properties::ContextGlobalPropertiesExt;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::parameters::{CityParameters, Parameters};
pub use crate::people::{DiseaseState, PersonId, SirCounts};
pub use crate::random::ContextRandomExt;
pub use crate::{define_data_plugin, define_global_property, define_rng};
