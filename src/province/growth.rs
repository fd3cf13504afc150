// src/province/growth.rs
use crate::config::WorldBounds;
use crate::province::Coord;
use crate::province::store::ProvinceStore;
use std::collections::VecDeque;

const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Прямоугольная сетка ячеек, покрывающая мир
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGrid {
    /// Ячейка с минимальными координатами
    pub origin: Coord,
    pub width: u32,
    pub depth: u32,
}

impl CellGrid {
    /// Все ячейки, в которые может попасть точка из `[min, max)` по каждой оси
    #[must_use]
    pub fn from_bounds(bounds: &WorldBounds, cell_size: u32) -> Self {
        let cell = f64::from(cell_size);
        let min_x = (bounds.min_x / cell).floor() as i32;
        let min_z = (bounds.min_z / cell).floor() as i32;
        let max_x = (bounds.max_x / cell).ceil() as i32;
        let max_z = (bounds.max_z / cell).ceil() as i32;
        Self {
            origin: Coord::new(min_x, min_z),
            width: (max_x - min_x).max(0) as u32,
            depth: (max_z - min_z).max(0) as u32,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.width as usize * self.depth as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn index(&self, coord: Coord) -> Option<usize> {
        let dx = coord.x - self.origin.x;
        let dz = coord.z - self.origin.z;
        if dx < 0 || dz < 0 || dx >= self.width as i32 || dz >= self.depth as i32 {
            return None;
        }
        Some(dz as usize * self.width as usize + dx as usize)
    }

    #[must_use]
    pub fn coord(&self, index: usize) -> Coord {
        let width = self.width as usize;
        Coord::new(
            self.origin.x + (index % width) as i32,
            self.origin.z + (index / width) as i32,
        )
    }
}

/// Заполняет провинции ячейками: заливка в ширину одновременно от всех домашних ячеек.
///
/// Каждая ячейка сетки достаётся провинции, чья волна дошла до неё первой. Старые ячейки
/// провинций заменяются, а классификация помечается устаревшей. Домашние ячейки вне сетки
/// в заливке не участвуют.
///
/// Возвращает карту `ячейка → id провинции` в порядке `CellGrid::index`.
pub fn grow_provinces<S: ProvinceStore + ?Sized>(store: &mut S, grid: &CellGrid) -> Vec<Option<u32>> {
    let mut owner: Vec<Option<u32>> = vec![None; grid.len()];
    let mut queue = VecDeque::new();

    // ШАГ 1: домашние ячейки
    for province in store.all_provinces() {
        if let Some(idx) = grid.index(province.home)
            && owner[idx].is_none()
        {
            owner[idx] = Some(province.id);
            queue.push_back((province.home, province.id));
        }
    }

    // ШАГ 2: заливка
    while let Some((cell, pid)) = queue.pop_front() {
        for &(dx, dz) in &DIRECTIONS {
            let next = Coord::new(cell.x + dx, cell.z + dz);
            if let Some(nidx) = grid.index(next)
                && owner[nidx].is_none()
            {
                owner[nidx] = Some(pid);
                queue.push_back((next, pid));
            }
        }
    }

    // ШАГ 3: перенос ячеек в провинции
    for province in store.provinces_mut() {
        province.cells.clear();
        province.land_validation_requested = true;
    }
    for (idx, pid) in owner.iter().enumerate() {
        if let Some(pid) = pid
            && let Some(province) = store.province_mut(*pid)
        {
            province.cells.push(grid.coord(idx));
        }
    }

    tracing::info!(
        target: "provinces::placement",
        cells = grid.len(),
        provinces = store.len(),
        "provinces filled with cells"
    );
    owner
}
