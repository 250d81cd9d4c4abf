use std::fmt::{self, Debug, Display};
use std::io;

use crate::buildings::BuildingId;
use crate::people::PersonId;

/// Provides `CityError` and maps to other errors to
/// convert to a `CityError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum CityError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    /// A building type tag that does not name any `BuildingType`.
    InvalidBuildingType(String),
    UnknownBuilding(BuildingId),
    UnknownPerson(PersonId),
    /// Employment was requested at a building that has no staff (a home).
    NotAWorkplace(BuildingId),
    InsufficientSusceptible {
        requested: usize,
        available: usize,
    },
    InvalidParameter(String),
    CityError(String),
}

impl From<io::Error> for CityError {
    fn from(error: io::Error) -> Self {
        CityError::IoError(error)
    }
}

impl From<serde_json::Error> for CityError {
    fn from(error: serde_json::Error) -> Self {
        CityError::JsonError(error)
    }
}

impl From<String> for CityError {
    fn from(error: String) -> Self {
        CityError::CityError(error)
    }
}

impl From<&str> for CityError {
    fn from(error: &str) -> Self {
        CityError::CityError(error.to_string())
    }
}

impl std::error::Error for CityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CityError::IoError(error) => Some(error),
            CityError::JsonError(error) => Some(error),
            _ => None,
        }
    }
}

impl Display for CityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CityError::IoError(error) => write!(f, "Error: {error}"),
            CityError::JsonError(error) => write!(f, "Error: invalid JSON: {error}"),
            CityError::InvalidBuildingType(tag) => {
                write!(f, "Error: invalid building type {tag:?}")
            }
            CityError::UnknownBuilding(building_id) => {
                write!(f, "Error: no building with id {building_id}")
            }
            CityError::UnknownPerson(person_id) => {
                write!(f, "Error: no person with id {person_id}")
            }
            CityError::NotAWorkplace(building_id) => {
                write!(f, "Error: building {building_id} does not employ anyone")
            }
            CityError::InsufficientSusceptible {
                requested,
                available,
            } => write!(
                f,
                "Error: cannot infect {requested} people, only {available} are susceptible"
            ),
            CityError::InvalidParameter(msg) => write!(f, "Error: invalid parameter: {msg}"),
            CityError::CityError(msg) => write!(f, "Error: {msg}"),
        }
    }
}
