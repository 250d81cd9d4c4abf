//! Global properties are typed, simulation-wide values, usually configuration loaded once at
//! startup. A property is declared with [`define_global_property!`], optionally with a validator
//! that rejects bad values before they are stored:
//!
//! ```rust
//! use ixa_city::{define_global_property, Context, ContextGlobalPropertiesExt};
//!
//! define_global_property!(MaxHours, u32, |hours: &u32| {
//!     if *hours == 0 {
//!         return Err("a run must last at least one hour".into());
//!     }
//!     Ok(())
//! });
//!
//! let mut context = Context::new();
//! context.set_global_property_value(MaxHours, 48).unwrap();
//! assert_eq!(*context.get_global_property_value(MaxHours).unwrap(), 48);
//! assert!(context.set_global_property_value(MaxHours, 0).is_err());
//! ```
use std::any::{Any, TypeId};
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::error::CityError;
use crate::{define_data_plugin, trace, HashMap, HashMapExt};

pub trait GlobalProperty: Any {
    type Value: Any;

    /// Checks a value before it is stored.
    ///
    /// # Errors
    ///
    /// Returns the reason the value is unacceptable.
    fn validate(_value: &Self::Value) -> Result<(), CityError> {
        Ok(())
    }
}

/// Defines a global property with the given value type and an optional validator.
#[macro_export]
macro_rules! define_global_property {
    ($global_property:ident, $value:ty, $validate:expr) => {
        #[derive(Copy, Clone)]
        pub struct $global_property;

        impl $crate::global_properties::GlobalProperty for $global_property {
            type Value = $value;

            fn validate(value: &$value) -> Result<(), $crate::error::CityError> {
                $validate(value)
            }
        }
    };

    ($global_property:ident, $value:ty) => {
        $crate::define_global_property!($global_property, $value, |_: &$value| Ok(()));
    };
}
pub use define_global_property;

define_data_plugin!(
    GlobalPropertiesPlugin,
    HashMap<TypeId, Box<dyn Any>>,
    HashMap::new()
);

pub trait ContextGlobalPropertiesExt {
    /// Validates and stores the value of a global property, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns the validator's error; the previous value is kept.
    fn set_global_property_value<T: GlobalProperty>(
        &mut self,
        property: T,
        value: T::Value,
    ) -> Result<(), CityError>;

    /// Returns the value of a global property, or `None` if it was never set.
    fn get_global_property_value<T: GlobalProperty>(&self, property: T) -> Option<&T::Value>;

    /// Reads a JSON file into a value of type `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or doesn't deserialize into `T`.
    fn load_parameters_from_json<T: DeserializeOwned>(&self, file_path: &Path)
        -> Result<T, CityError>;
}

impl ContextGlobalPropertiesExt for Context {
    fn set_global_property_value<T: GlobalProperty>(
        &mut self,
        _property: T,
        value: T::Value,
    ) -> Result<(), CityError> {
        T::validate(&value)?;
        self.get_data_container_mut(GlobalPropertiesPlugin)
            .insert(TypeId::of::<T>(), Box::new(value));
        Ok(())
    }

    fn get_global_property_value<T: GlobalProperty>(&self, _property: T) -> Option<&T::Value> {
        self.get_data_container(GlobalPropertiesPlugin)?
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T::Value>())
    }

    fn load_parameters_from_json<T: DeserializeOwned>(
        &self,
        file_path: &Path,
    ) -> Result<T, CityError> {
        trace!("loading parameters from {}", file_path.display());
        let config_file = fs::read_to_string(file_path)?;
        let parameters = serde_json::from_str(&config_file)?;
        Ok(parameters)
    }
}
