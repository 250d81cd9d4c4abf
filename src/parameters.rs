//! Model parameters. Every field has a default, so a configuration file only needs to name the
//! values it changes:
//!
//! ```json
//! {
//!     "infection_duration_hours": 120,
//!     "transmissibility": { "restaurant": 0.1 },
//!     "restaurant_hours": { "open": 11, "close": 22 }
//! }
//! ```
//!
//! Hours are hours of the day (0-23). Shifts are half-open `[start, end)` intervals and may end
//! at 24.
use serde::{Deserialize, Serialize};

use crate::buildings::{BuildingType, HospitalCapacity};
use crate::define_global_property;
use crate::error::CityError;

/// Per-hour transmission coefficient for each building type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Transmissibility {
    pub home: f64,
    pub office: f64,
    pub school: f64,
    pub restaurant: f64,
    pub store: f64,
    /// Kept low: patients are isolated and staff wear protection.
    pub hospital: f64,
}

impl Default for Transmissibility {
    fn default() -> Self {
        Transmissibility {
            home: 0.05,
            office: 0.03,
            school: 0.04,
            restaurant: 0.06,
            store: 0.02,
            hospital: 0.005,
        }
    }
}

impl Transmissibility {
    #[must_use]
    pub fn get(&self, building_type: BuildingType) -> f64 {
        match building_type {
            BuildingType::Home => self.home,
            BuildingType::Office => self.office,
            BuildingType::School => self.school,
            BuildingType::Restaurant => self.restaurant,
            BuildingType::Store => self.store,
            BuildingType::Hospital => self.hospital,
        }
    }

    fn values(&self) -> [f64; 6] {
        [
            self.home,
            self.office,
            self.school,
            self.restaurant,
            self.store,
            self.hospital,
        ]
    }
}

/// A half-open range of hours `[start, end)` during which employees are at work.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Shift {
    pub start: u8,
    pub end: u8,
}

impl Shift {
    #[must_use]
    pub fn contains(&self, hour: u8) -> bool {
        self.start <= hour && hour < self.end
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkShifts {
    pub office: Shift,
    pub school: Shift,
    pub restaurant: Shift,
    pub store: Shift,
    pub hospital: Shift,
}

impl Default for WorkShifts {
    fn default() -> Self {
        WorkShifts {
            office: Shift { start: 9, end: 17 },
            school: Shift { start: 8, end: 15 },
            restaurant: Shift { start: 9, end: 22 },
            store: Shift { start: 8, end: 21 },
            hospital: Shift { start: 7, end: 19 },
        }
    }
}

impl WorkShifts {
    /// The shift for a building type, or `None` for homes.
    #[must_use]
    pub fn get(&self, building_type: BuildingType) -> Option<Shift> {
        match building_type {
            BuildingType::Home => None,
            BuildingType::Office => Some(self.office),
            BuildingType::School => Some(self.school),
            BuildingType::Restaurant => Some(self.restaurant),
            BuildingType::Store => Some(self.store),
            BuildingType::Hospital => Some(self.hospital),
        }
    }
}

/// Opening hours for buildings that receive visitors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpeningHours {
    pub open: u8,
    pub close: u8,
}

impl OpeningHours {
    /// Open from `open` through `close`, inclusive. At `close` the building is still open but
    /// sends its visitors home.
    #[must_use]
    pub fn is_open(&self, hour: u8) -> bool {
        self.open <= hour && hour <= self.close
    }

    #[must_use]
    pub fn is_closing(&self, hour: u8) -> bool {
        hour >= self.close
    }
}

/// Upper bound on a visitor rate.
pub const MAX_VISITOR_RATE: f64 = 1000.0;

/// Expected number of visitors arriving per open hour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisitorRates {
    pub restaurant: f64,
    pub store: f64,
}

impl Default for VisitorRates {
    fn default() -> Self {
        VisitorRates {
            restaurant: 4.0,
            store: 6.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingSize {
    pub capacity: usize,
    pub staff_positions: usize,
}

/// Sizes used by `construct_building` for each type. Homes are unlimited and hospitals are sized
/// by `default_hospital`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildingSizes {
    pub office: BuildingSize,
    pub school: BuildingSize,
    pub restaurant: BuildingSize,
    pub store: BuildingSize,
}

impl Default for BuildingSizes {
    fn default() -> Self {
        BuildingSizes {
            office: BuildingSize {
                capacity: 50,
                staff_positions: 20,
            },
            school: BuildingSize {
                capacity: 300,
                staff_positions: 60,
            },
            restaurant: BuildingSize {
                capacity: 40,
                staff_positions: 5,
            },
            store: BuildingSize {
                capacity: 30,
                staff_positions: 4,
            },
        }
    }
}

impl BuildingSizes {
    #[must_use]
    pub fn get(&self, building_type: BuildingType) -> Option<BuildingSize> {
        match building_type {
            BuildingType::Office => Some(self.office),
            BuildingType::School => Some(self.school),
            BuildingType::Restaurant => Some(self.restaurant),
            BuildingType::Store => Some(self.store),
            BuildingType::Home | BuildingType::Hospital => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CityParameters {
    pub transmissibility: Transmissibility,
    /// Hours from infection to recovery without treatment.
    pub infection_duration_hours: u32,
    /// Chance per hour, per hospital with free beds, that an infected person at home is admitted.
    pub hospitalization_probability: f64,
    /// Extra hours of recovery progress per hour for a treated patient.
    pub treatment_speedup: u32,
    /// Patients one on-shift hospital worker can treat.
    pub patients_per_worker: usize,
    pub restaurant_hours: OpeningHours,
    pub store_hours: OpeningHours,
    pub shifts: WorkShifts,
    pub visitor_rates: VisitorRates,
    pub building_sizes: BuildingSizes,
    pub default_hospital: HospitalCapacity,
}

impl Default for CityParameters {
    fn default() -> Self {
        CityParameters {
            transmissibility: Transmissibility::default(),
            infection_duration_hours: 7 * 24,
            hospitalization_probability: 0.02,
            treatment_speedup: 1,
            patients_per_worker: 4,
            restaurant_hours: OpeningHours {
                open: 10,
                close: 20,
            },
            store_hours: OpeningHours { open: 9, close: 21 },
            shifts: WorkShifts::default(),
            visitor_rates: VisitorRates::default(),
            building_sizes: BuildingSizes::default(),
            default_hospital: HospitalCapacity {
                beds: 20,
                workers: 10,
            },
        }
    }
}

fn invalid(msg: String) -> CityError {
    CityError::InvalidParameter(msg)
}

fn validate_opening_hours(name: &str, hours: OpeningHours) -> Result<(), CityError> {
    if hours.close > 23 || hours.open >= hours.close {
        return Err(invalid(format!(
            "{name} must satisfy open < close <= 23, got {}..{}",
            hours.open, hours.close
        )));
    }
    Ok(())
}

impl CityParameters {
    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns `CityError::InvalidParameter` naming the first offending value.
    pub fn validate(&self) -> Result<(), CityError> {
        if self
            .transmissibility
            .values()
            .iter()
            .any(|beta| !beta.is_finite() || *beta < 0.0)
        {
            return Err(invalid(
                "transmissibility must be finite and non-negative".to_string(),
            ));
        }
        if self.infection_duration_hours == 0 {
            return Err(invalid(
                "infection_duration_hours must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.hospitalization_probability) {
            return Err(invalid(format!(
                "hospitalization_probability must be in [0, 1], got {}",
                self.hospitalization_probability
            )));
        }
        validate_opening_hours("restaurant_hours", self.restaurant_hours)?;
        validate_opening_hours("store_hours", self.store_hours)?;
        for shift in [
            self.shifts.office,
            self.shifts.school,
            self.shifts.restaurant,
            self.shifts.store,
            self.shifts.hospital,
        ] {
            if shift.end > 24 || shift.start >= shift.end {
                return Err(invalid(format!(
                    "shifts must satisfy start < end <= 24, got {}..{}",
                    shift.start, shift.end
                )));
            }
        }
        let rates = [self.visitor_rates.restaurant, self.visitor_rates.store];
        if rates
            .iter()
            .any(|rate| !(0.0..=MAX_VISITOR_RATE).contains(rate))
        {
            return Err(invalid(format!(
                "visitor_rates must be in [0, {MAX_VISITOR_RATE}]"
            )));
        }
        Ok(())
    }
}

define_global_property!(Parameters, CityParameters, |parameters: &CityParameters| {
    parameters.validate()
});
