//! Record store for people and garments.
//!
//! A single postcard-encoded catalog file under the store prefix. The
//! store holds metadata only (names, categories, image paths); the core
//! pipeline consumes the resolved image path and category. Uniqueness and
//! referential integrity are not enforced here beyond name lookup taking
//! the first match.

use crate::config::STORE_PREFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vton_vision::GarmentCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    pub name: String,
    pub image_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarmentRecord {
    pub id: String,
    pub name: String,
    pub category: GarmentCategory,
    pub image_path: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub people: Vec<PersonRecord>,
    pub garments: Vec<GarmentRecord>,
}

impl Catalog {
    pub fn find_person(&self, name: &str) -> Option<&PersonRecord> {
        self.people.iter().find(|p| p.name == name)
    }

    pub fn find_garment(&self, name: &str) -> Option<&GarmentRecord> {
        self.garments.iter().find(|g| g.name == name)
    }
}

fn catalog_file() -> PathBuf {
    STORE_PREFIX.join("catalog.bin")
}

pub fn load_catalog() -> Result<Catalog> {
    load_catalog_at(&catalog_file())
}

pub fn save_catalog(catalog: &Catalog) -> Result<()> {
    save_catalog_at(catalog, &catalog_file())
}

fn load_catalog_at(file: &Path) -> Result<Catalog> {
    if !file.exists() {
        return Ok(Catalog::default());
    }
    let data =
        std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    Ok(postcard::from_bytes(&data)?)
}

fn save_catalog_at(catalog: &Catalog, file: &Path) -> Result<()> {
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = postcard::to_allocvec(catalog)?;
    std::fs::write(file, data)?;
    Ok(())
}

pub fn add_person(name: &str, image_path: &str) -> Result<()> {
    let mut catalog = load_catalog()?;
    catalog.people.push(PersonRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        image_path: image_path.to_string(),
    });
    save_catalog(&catalog)
}

pub fn add_garment(name: &str, category: GarmentCategory, image_path: &str) -> Result<()> {
    let mut catalog = load_catalog()?;
    catalog.garments.push(GarmentRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        category,
        image_path: image_path.to_string(),
    });
    save_catalog(&catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Catalog {
        Catalog {
            people: vec![PersonRecord {
                id: "p1".into(),
                name: "Model 1".into(),
                image_path: "/tmp/model1.jpg".into(),
            }],
            garments: vec![GarmentRecord {
                id: "g1".into(),
                name: "Blue Shirt".into(),
                category: GarmentCategory::Top,
                image_path: "/tmp/shirt.png".into(),
            }],
        }
    }

    #[test]
    fn test_find_by_name() {
        let catalog = sample_catalog();
        assert_eq!(catalog.find_person("Model 1").unwrap().id, "p1");
        assert_eq!(catalog.find_garment("Blue Shirt").unwrap().id, "g1");
        assert!(catalog.find_garment("Red Shirt").is_none());
    }

    #[test]
    fn test_catalog_round_trips_through_postcard() {
        let catalog = sample_catalog();
        let bytes = postcard::to_allocvec(&catalog).unwrap();
        let back: Catalog = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(back.people.len(), 1);
        assert_eq!(back.garments[0].category, GarmentCategory::Top);
    }

    #[test]
    fn test_save_and_load_catalog_file() {
        let dir = std::env::temp_dir().join("vton-store-test");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("catalog.bin");

        save_catalog_at(&sample_catalog(), &file).unwrap();
        let back = load_catalog_at(&file).unwrap();
        assert_eq!(back.garments[0].name, "Blue Shirt");
    }

    #[test]
    fn test_missing_catalog_file_is_empty() {
        let back = load_catalog_at(Path::new("/nonexistent/catalog.bin")).unwrap();
        assert!(back.people.is_empty() && back.garments.is_empty());
    }
}
