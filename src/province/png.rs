// src/province/png.rs
//! Визуализация провинций в изображение
//!
//! Один пиксель — одна ячейка сетки. Цвет зависит от классификации провинции:
//! - суша — оттенки зелёного,
//! - море — оттенки синего,
//! - ячейки без провинции — чёрные (визуальный сигнал ошибки).
//!
//! Домашние ячейки отмечаются белыми кругами.

use crate::province::Province;
use crate::province::growth::CellGrid;
use image::{ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::collections::HashMap;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

const UNASSIGNED: [u8; 4] = [0, 0, 0, 255];
const HOME_MARKER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Карта провинций — пространственное распределение провинций по сетке
#[derive(Debug, Clone)]
pub struct ProvinceMap {
    pub grid: CellGrid,
    /// `province_id` для каждой ячейки в порядке `CellGrid::index`
    pub data: Vec<Option<u32>>,
}

impl ProvinceMap {
    #[must_use]
    pub fn new(grid: CellGrid, data: Vec<Option<u32>>) -> Self {
        Self { grid, data }
    }

    /// Строит карту по ячейкам, уже записанным в провинции
    #[must_use]
    pub fn from_provinces(grid: CellGrid, provinces: &[Province]) -> Self {
        let mut data = vec![None; grid.len()];
        for province in provinces {
            for &cell in &province.cells {
                if let Some(idx) = grid.index(cell) {
                    data[idx] = Some(province.id);
                }
            }
        }
        Self { grid, data }
    }

    /// Цвет провинции: оттенок зависит от `id`, тон — от классификации
    #[must_use]
    pub fn province_color(province: &Province) -> [u8; 4] {
        let shade = (province.id.wrapping_mul(2_654_435_761) >> 24) as u8 / 3;
        if province.is_sea {
            [20, 60 + shade / 2, 140 + shade, 255]
        } else {
            [60 + shade / 2, 130 + shade, 50, 255]
        }
    }

    /// Преобразует карту в плоский вектор RGBA-байт длиной `width × depth × 4`
    #[must_use]
    pub fn to_rgba_image(&self, provinces: &[Province]) -> Vec<u8> {
        let color_map: HashMap<u32, [u8; 4]> = provinces
            .iter()
            .map(|p| (p.id, Self::province_color(p)))
            .collect();
        let color_of = |pid: &Option<u32>| {
            pid.and_then(|id| color_map.get(&id).copied())
                .unwrap_or(UNASSIGNED)
        };

        #[cfg(feature = "parallel")]
        let pixels: Vec<[u8; 4]> = self.data.par_iter().map(color_of).collect();
        #[cfg(not(feature = "parallel"))]
        let pixels: Vec<[u8; 4]> = self.data.iter().map(color_of).collect();

        pixels.into_iter().flatten().collect()
    }

    pub fn to_image(&self, provinces: &[Province]) -> Result<RgbaImage, Box<dyn std::error::Error>> {
        let mut img: RgbaImage =
            ImageBuffer::from_raw(self.grid.width, self.grid.depth, self.to_rgba_image(provinces))
                .ok_or("Failed to create image buffer")?;

        let radius = ((self.grid.width.max(self.grid.depth) / 200).max(1)) as i32;
        for province in provinces {
            if let Some(idx) = self.grid.index(province.home) {
                let x = (idx % self.grid.width as usize) as i32;
                let z = (idx / self.grid.width as usize) as i32;
                draw_filled_circle_mut(&mut img, (x, z), radius, HOME_MARKER);
            }
        }
        Ok(img)
    }

    /// Сохраняет карту провинций в PNG-файл
    pub fn save_as_png(
        &self,
        provinces: &[Province],
        path: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.to_image(provinces)?.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::province::Coord;

    fn two_cell_grid() -> CellGrid {
        CellGrid {
            origin: Coord::new(0, 0),
            width: 2,
            depth: 1,
        }
    }

    #[test]
    fn unassigned_cells_are_black() {
        let mut land = Province::new(0, Coord::new(0, 0));
        land.cells = vec![Coord::new(0, 0)];
        let map = ProvinceMap::from_provinces(two_cell_grid(), std::slice::from_ref(&land));

        let rgba = map.to_rgba_image(&[land.clone()]);
        assert_eq!(rgba.len(), 8);
        assert_eq!(&rgba[0..4], &ProvinceMap::province_color(&land));
        assert_eq!(&rgba[4..8], &UNASSIGNED);
    }

    #[test]
    fn sea_is_bluer_than_land() {
        let mut sea = Province::new(7, Coord::new(0, 0));
        sea.is_sea = true;
        let land = Province::new(7, Coord::new(0, 0));
        let [_, _, sea_blue, _] = ProvinceMap::province_color(&sea);
        let [_, land_green, land_blue, _] = ProvinceMap::province_color(&land);
        assert!(sea_blue > land_blue);
        assert!(land_green > land_blue);
    }

    #[test]
    fn image_has_grid_dimensions() {
        let province = Province::new(0, Coord::new(1, 0));
        let map = ProvinceMap::new(two_cell_grid(), vec![Some(0), Some(0)]);
        let img = map.to_image(&[province]).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(1, 0), &HOME_MARKER);
    }
}
