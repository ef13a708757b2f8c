use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::{DEFAULT_DRAIN_RATE, DEFAULT_FILL_RATE};
use crate::objects::ObjectKind;

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Blueprint for a placeable object: everything the placement and water
/// systems need to know about an instance before it exists.
#[derive(Debug, Clone)]
pub struct ObjectTemplate {
    pub id: String,
    pub kind: ObjectKind,
    /// Footprint in cells.
    pub size: UVec2,
    pub movement_cost: i32,
    pub blocks_people: bool,
    pub blocks_water: bool,
    /// This object can host one attachment (e.g. a wall hosting a pump).
    pub attachable: bool,
    /// This object is placed onto an attachable host rather than onto an
    /// empty cell.
    pub is_attachment: bool,
    pub fill_rate: f32,
    pub drain_rate: f32,
    pub height: f32,
    /// Construction duration in seconds; `None` means the object appears
    /// finished immediately.
    pub build_time: Option<f32>,
    /// Materials spent on placement; 0 means free.
    pub cost: i64,
    pub max_health: Option<f32>,
}

impl ObjectTemplate {
    fn new(id: &str, kind: ObjectKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            size: UVec2::ONE,
            movement_cost: 1,
            blocks_people: false,
            blocks_water: false,
            attachable: false,
            is_attachment: false,
            fill_rate: DEFAULT_FILL_RATE,
            drain_rate: DEFAULT_DRAIN_RATE,
            height: 0.0,
            build_time: None,
            cost: 0,
            max_health: None,
        }
    }
}

/// Registry of object templates plus the uid serial. Uids are
/// `"{template}_{serial}"` and never reused within a run.
#[derive(Resource)]
pub struct TemplateRegistry {
    templates: HashMap<String, ObjectTemplate>,
    serial: u64,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_stock()
    }
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
            serial: 0,
        }
    }

    /// The stock settlement set.
    pub fn with_stock() -> Self {
        let mut reg = Self::empty();

        let mut wall = ObjectTemplate::new("wall", ObjectKind::Wall);
        wall.movement_cost = 10;
        wall.blocks_people = true;
        wall.blocks_water = true;
        wall.attachable = true;
        wall.height = 2.0;
        wall.build_time = Some(8.0);
        wall.cost = 20;
        wall.max_health = Some(100.0);
        reg.register(wall);

        let mut road = ObjectTemplate::new("road", ObjectKind::Road);
        road.movement_cost = 1;
        road.cost = 2;
        reg.register(road);

        let mut house = ObjectTemplate::new("house", ObjectKind::House);
        house.movement_cost = 8;
        house.blocks_people = true;
        house.height = 1.0;
        house.build_time = Some(12.0);
        house.cost = 40;
        house.max_health = Some(60.0);
        reg.register(house);

        let mut pump = ObjectTemplate::new("pump", ObjectKind::Pump);
        pump.is_attachment = true;
        pump.drain_rate = 0.25;
        pump.build_time = Some(6.0);
        pump.cost = 30;
        pump.max_health = Some(30.0);
        reg.register(pump);

        let mut ocean = ObjectTemplate::new("ocean", ObjectKind::Ocean);
        ocean.movement_cost = 50;
        ocean.blocks_people = true;
        ocean.fill_rate = 1.0;
        ocean.drain_rate = 0.0;
        ocean.height = -1.0;
        reg.register(ocean);

        for id in ["builder", "marshal", "civilian"] {
            reg.register(ObjectTemplate::new(id, ObjectKind::Agent));
        }

        reg
    }

    pub fn register(&mut self, template: ObjectTemplate) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn get(&self, id: &str) -> Option<&ObjectTemplate> {
        self.templates.get(id)
    }

    pub fn fresh_uid(&mut self, template_id: &str) -> String {
        self.serial += 1;
        format!("{}_{}", template_id, self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_set_is_complete() {
        let reg = TemplateRegistry::with_stock();
        for id in [
            "wall", "road", "house", "pump", "ocean", "builder", "marshal", "civilian",
        ] {
            assert!(reg.get(id).is_some(), "missing stock template {id}");
        }
    }

    #[test]
    fn test_uids_are_unique_and_prefixed() {
        let mut reg = TemplateRegistry::with_stock();
        let a = reg.fresh_uid("wall");
        let b = reg.fresh_uid("wall");
        assert_ne!(a, b);
        assert!(a.starts_with("wall_"));
    }

    #[test]
    fn test_wall_blocks_water_and_people() {
        let reg = TemplateRegistry::with_stock();
        let wall = reg.get("wall").unwrap();
        assert!(wall.blocks_water);
        assert!(wall.blocks_people);
        assert!(wall.attachable);
        let pump = reg.get("pump").unwrap();
        assert!(pump.is_attachment);
    }
}
