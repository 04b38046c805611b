//! The bundled site description.

use apulati_core::{CatalogError, Site};

const SITE_JSON: &str = include_str!("../assets/site.json");

pub fn load() -> Result<Site, CatalogError> {
    Site::from_json(SITE_JSON)
}
