//! The disease model: pure functions from the state of a building's occupants to infection
//! probabilities and recovery progress. Nothing here touches the `Context`; the transmission
//! phase of a tick (see `crate::buildings::transmission`) samples from these.
use crate::people::DiseaseState;

/// The probability that one susceptible occupant is infected during one hour in a building with
/// `infected` infectious people among `occupants` total.
///
/// Transmission is frequency dependent: the hazard is `transmissibility * infected / occupants`
/// and the probability of at least one infecting contact is `1 - exp(-hazard)`.
#[must_use]
pub fn infection_probability(infected: usize, occupants: usize, transmissibility: f64) -> f64 {
    if infected == 0 || occupants == 0 || transmissibility <= 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let hazard = transmissibility * infected as f64 / occupants as f64;
    1.0 - (-hazard).exp()
}

/// The state of a newly infected person.
#[must_use]
pub fn new_infection(infection_duration_hours: u32) -> DiseaseState {
    DiseaseState::Infected {
        hours_remaining: infection_duration_hours.max(1),
    }
}

/// Advances an infection by one hour. Treated patients progress `1 + treatment_speedup` hours.
/// Returns `Recovered` once no hours remain; other states are unchanged.
#[must_use]
pub fn progress_infection(state: DiseaseState, treated: bool, treatment_speedup: u32) -> DiseaseState {
    match state {
        DiseaseState::Infected { hours_remaining } => {
            let progress = if treated { 1 + treatment_speedup } else { 1 };
            match hours_remaining.saturating_sub(progress) {
                0 => DiseaseState::Recovered,
                hours_remaining => DiseaseState::Infected { hours_remaining },
            }
        }
        other => other,
    }
}

/// How many patients a hospital can treat this hour given the workers on site.
#[must_use]
pub fn treatment_capacity(workers_present: usize, patients_per_worker: usize) -> usize {
    workers_present.saturating_mul(patients_per_worker)
}
