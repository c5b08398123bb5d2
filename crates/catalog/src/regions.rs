use std::collections::BTreeSet;

use foundation::RegionId;
use serde::Deserialize;

use crate::CatalogError;

/// Region whose bounds anchor the whole-country marker.
pub const DISTINGUISHED_REGION: &str = "SANTACRUZ";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub display_name: String,
    pub description: String,
}

impl Region {
    fn new(display_name: &str, description: &str, id: &str) -> Self {
        Self {
            id: RegionId::new(id),
            display_name: display_name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Ordered, read-only set of regions. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    distinguished: Option<RegionId>,
}

impl RegionCatalog {
    pub fn new(regions: Vec<Region>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for region in &regions {
            if region.id.is_empty() {
                return Err(CatalogError::EmptyRegionId);
            }
            if !seen.insert(region.id.as_str()) {
                return Err(CatalogError::DuplicateRegion(region.id.to_string()));
            }
        }
        Ok(Self {
            regions,
            distinguished: None,
        })
    }

    /// Marks `id` as the distinguished region. Unknown ids are ignored.
    pub fn with_distinguished(mut self, id: &str) -> Self {
        self.distinguished = self.get(id).map(|r| r.id.clone());
        self
    }

    pub fn from_json_str(payload: &str) -> Result<Self, CatalogError> {
        let regions: Vec<Region> =
            serde_json::from_str(payload).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(regions)
    }

    /// The 23 provinces, keyed by the codes of the upstream GeoJSON files.
    pub fn argentina() -> Self {
        let regions = vec![
            Region::new("Buenos Aires", "La provincia más poblada de Argentina, sede de importantes centros urbanos e industriales.", "BUENOSAIRES"),
            Region::new("Córdoba", "Centro cultural y educativo, conocida por sus sierras y universidades.", "CORDOBA"),
            Region::new("Santa Fe", "Principal centro agroindustrial y puerto importante del país.", "SANTAFE"),
            Region::new("Mendoza", "Famosa por sus viñedos y el Monte Aconcagua.", "MENDOZA"),
            Region::new("Tucumán", "El jardín de la República, cuna de la independencia argentina.", "TUCUMAN"),
            Region::new("Entre Ríos", "Tierra de suaves colinas y ríos caudalosos.", "ENTRERIOS"),
            Region::new("Salta", "La Linda, conocida por su rica arquitectura colonial y paisajes.", "SALTA"),
            Region::new("Misiones", "Hogar de las Cataratas del Iguazú y selvas subtropicales.", "MISIONES"),
            Region::new("Chaco", "Región de gran diversidad cultural y natural.", "CHACO"),
            Region::new("Santiago del Estero", "La Madre de Ciudades, primera ciudad fundada en Argentina.", "SANTIAGODELESTERO"),
            Region::new("San Juan", "Tierra del sol y del buen vino.", "SANJUAN"),
            Region::new("Jujuy", "Famosa por la Quebrada de Humahuaca y sus cerros multicolores.", "JUJUY"),
            Region::new("Río Negro", "Destino turístico con hermosos lagos y montañas.", "RIONEGRO"),
            Region::new("Neuquén", "Centro de deportes de invierno y paleontología.", "NEUQUEN"),
            Region::new("Formosa", "Rica en biodiversidad y culturas originarias.", "FORMOSA"),
            Region::new("Chubut", "Hogar de la ballena franca austral y pingüinos.", "CHUBUT"),
            Region::new("San Luis", "Provincia de las sierras y los diques.", "SANLUIS"),
            Region::new("Corrientes", "Tierra del Chamamé y los Esteros del Iberá.", "CORRIENTES"),
            Region::new("La Pampa", "Corazón de la región pampeana argentina.", "LAPAMPA"),
            Region::new("Catamarca", "Tierra de antiguos pueblos y paisajes lunares.", "CATAMARCA"),
            Region::new("La Rioja", "Provincia de parques naturales y viñedos.", "LARIOJA"),
            Region::new("Santa Cruz", "Hogar del Glaciar Perito Moreno.", "SANTACRUZ"),
            Region::new("Tierra del Fuego", "El fin del mundo, punto más austral de Argentina.", "TIERRADELFUEGO"),
        ];
        Self {
            regions,
            distinguished: Some(RegionId::new(DISTINGUISHED_REGION)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id.as_str() == id)
    }

    pub fn by_display_name(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.display_name == name)
    }

    /// Display name for `id`, or the id itself when it is not catalogued.
    pub fn display_name<'a>(&'a self, id: &'a RegionId) -> &'a str {
        self.get(id.as_str())
            .map(|r| r.display_name.as_str())
            .unwrap_or(id.as_str())
    }

    pub fn distinguished(&self) -> Option<&RegionId> {
        self.distinguished.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RegionId> {
        self.regions.iter().map(|r| &r.id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
