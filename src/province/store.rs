// src/province/store.rs
//! Хранилище провинций
//!
//! `ProvinceStore` — граница с внешним хранилищем: добавление, перечисление, изменение
//! и сохранение всех провинций. `ProvinceRegistry` — реализация в памяти с
//! необязательным JSON-файлом на диске.

use crate::error::StoreError;
use crate::province::{Coord, Province};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub trait ProvinceStore {
    /// Регистрирует провинцию; провинция с тем же `id` заменяется
    fn add_province(&mut self, province: Province);

    /// Идентификатор для следующей новой провинции
    fn next_id(&self) -> u32;

    /// Копия всех провинций на текущий момент, упорядоченная по `id`
    fn all_provinces(&self) -> Vec<Province>;

    fn province_mut(&mut self, id: u32) -> Option<&mut Province>;

    fn provinces_mut(&mut self) -> Box<dyn Iterator<Item = &mut Province> + '_>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Сохраняет состояние всех провинций
    fn persist_all(&mut self) -> Result<(), StoreError>;

    fn homes(&self) -> Vec<Coord> {
        self.all_provinces().iter().map(|p| p.home).collect()
    }

    fn any_validation_requested(&self) -> bool {
        self.all_provinces()
            .iter()
            .any(|p| p.land_validation_requested)
    }

    /// Выставляет флаг проверки у всех провинций; возвращает число изменённых
    fn set_all_validation_requested(&mut self, value: bool) -> usize {
        let mut changed = 0;
        for province in self.provinces_mut() {
            if province.land_validation_requested != value {
                province.land_validation_requested = value;
                changed += 1;
            }
        }
        changed
    }
}

#[derive(Serialize, Deserialize)]
struct ProvinceFile {
    provinces: Vec<Province>,
}

#[derive(Debug, Default)]
pub struct ProvinceRegistry {
    provinces: BTreeMap<u32, Province>,
    path: Option<PathBuf>,
    saves: usize,
}

impl ProvinceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Реестр, сохраняющийся в `path`. Файл не читается.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Загружает провинции из JSON-файла; отсутствующий файл даёт пустой реестр
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let mut registry = Self::with_path(path);
        if !path.exists() {
            return Ok(registry);
        }
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ProvinceFile = serde_json::from_str(&contents)?;
        for province in file.provinces {
            registry.provinces.insert(province.id, province);
        }
        tracing::info!(
            target: "provinces::store",
            path = %path.display(),
            count = registry.provinces.len(),
            "provinces loaded"
        );
        Ok(registry)
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Сколько раз вызывался `persist_all`
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Province> {
        self.provinces.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Province> {
        self.provinces.values()
    }

    fn write_file(&self, path: &Path) -> Result<(), StoreError> {
        let file = ProvinceFile {
            provinces: self.provinces.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        // запись через временный файл, чтобы не оставить обрезанный JSON
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}

impl ProvinceStore for ProvinceRegistry {
    fn add_province(&mut self, province: Province) {
        self.provinces.insert(province.id, province);
    }

    fn next_id(&self) -> u32 {
        self.provinces.keys().next_back().map_or(0, |id| id + 1)
    }

    fn all_provinces(&self) -> Vec<Province> {
        self.provinces.values().cloned().collect()
    }

    fn province_mut(&mut self, id: u32) -> Option<&mut Province> {
        self.provinces.get_mut(&id)
    }

    fn provinces_mut(&mut self) -> Box<dyn Iterator<Item = &mut Province> + '_> {
        Box::new(self.provinces.values_mut())
    }

    fn len(&self) -> usize {
        self.provinces.len()
    }

    fn homes(&self) -> Vec<Coord> {
        self.provinces.values().map(|p| p.home).collect()
    }

    fn any_validation_requested(&self) -> bool {
        self.provinces.values().any(|p| p.land_validation_requested)
    }

    fn persist_all(&mut self) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            self.write_file(path)?;
            tracing::debug!(
                target: "provinces::store",
                path = %path.display(),
                count = self.provinces.len(),
                "provinces saved"
            );
        }
        self.saves += 1;
        Ok(())
    }
}
