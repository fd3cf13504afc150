pub mod growth;
pub mod placer;
pub mod png;
pub mod store;

use serde::{Deserialize, Serialize};

/// Ячейка сетки мира (в единицах ячеек, а не блоков)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub z: i32,
}

impl Coord {
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Евклидово расстояние в ячейках
    #[must_use]
    pub fn distance(&self, other: &Coord) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dz = f64::from(self.z) - f64::from(other.z);
        (dx * dx + dz * dz).sqrt()
    }

    /// Мировые координаты центра ячейки: `индекс × сторона + половина стороны`
    #[must_use]
    pub fn world_center(&self, cell_size: u32) -> (i64, i64) {
        let side = i64::from(cell_size);
        let half = side / 2;
        (
            i64::from(self.x) * side + half,
            i64::from(self.z) * side + half,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Province {
    pub id: u32,
    pub name: String,
    /// Домашняя ячейка — с неё начинается рост провинции
    pub home: Coord,
    /// Ячейки провинции; пусто, пока провинция не выращена
    #[serde(default)]
    pub cells: Vec<Coord>,
    #[serde(default)]
    pub is_sea: bool,
    /// `true`, пока классификация суша/море устарела или ещё не считалась
    #[serde(default)]
    pub land_validation_requested: bool,
}

impl Province {
    #[must_use]
    pub fn new(id: u32, home: Coord) -> Self {
        Self {
            id,
            name: format!("Prov_{id}"),
            home,
            cells: Vec::new(),
            is_sea: false,
            land_validation_requested: false,
        }
    }
}
