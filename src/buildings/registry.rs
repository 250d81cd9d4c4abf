use indexmap::IndexMap;
use strum::IntoEnumIterator;

use crate::buildings::{Building, BuildingId, BuildingType, HospitalCapacity};

/// Every building in the city. Buildings are stored densely by `BuildingId` and grouped by type;
/// iteration visits the groups in `BuildingType` declaration order and each group in
/// construction order.
#[derive(Debug)]
pub(crate) struct BuildingRegistry {
    buildings: Vec<Building>,
    by_type: IndexMap<BuildingType, Vec<BuildingId>>,
}

impl Default for BuildingRegistry {
    fn default() -> Self {
        BuildingRegistry {
            buildings: Vec::new(),
            by_type: BuildingType::iter().map(|t| (t, Vec::new())).collect(),
        }
    }
}

impl BuildingRegistry {
    fn next_id(&self) -> BuildingId {
        BuildingId(self.buildings.len())
    }

    fn insert(&mut self, building: Building) -> BuildingId {
        let id = building.id();
        self.by_type
            .entry(building.building_type())
            .or_default()
            .push(id);
        self.buildings.push(building);
        id
    }

    /// Appends a new, empty building.
    pub(crate) fn construct(
        &mut self,
        building_type: BuildingType,
        capacity: Option<usize>,
        staff_positions: usize,
    ) -> BuildingId {
        let building = Building::new(self.next_id(), building_type, capacity, staff_positions);
        self.insert(building)
    }

    pub(crate) fn construct_hospital(&mut self, hospital: HospitalCapacity) -> BuildingId {
        let building = Building::new_hospital(self.next_id(), hospital);
        self.insert(building)
    }

    pub(crate) fn get(&self, building_id: BuildingId) -> Option<&Building> {
        self.buildings.get(building_id.0)
    }

    pub(crate) fn get_mut(&mut self, building_id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(building_id.0)
    }

    pub(crate) fn ids_of_type(&self, building_type: BuildingType) -> &[BuildingId] {
        self.by_type
            .get(&building_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All building ids, grouped by type.
    pub(crate) fn ids(&self) -> Vec<BuildingId> {
        self.by_type.values().flatten().copied().collect()
    }

    /// All buildings, grouped by type.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Building> {
        self.by_type
            .values()
            .flatten()
            .map(|building_id| &self.buildings[building_id.0])
    }

    pub(crate) fn len(&self) -> usize {
        self.buildings.len()
    }
}
