use explore_core::{CoreError, CoreResult, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaAsset {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

impl MediaAsset {
    pub fn image(url: &str) -> Self {
        Self { url: url.to_string(), kind: MediaKind::Image }
    }
}

/// A geographic area; the organizing unit above tours.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Destination {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub image: String,
    pub services: Vec<String>,
    pub visit_places: Vec<String>,
    pub gallery: Vec<MediaAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDestination {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub visit_places: Vec<String>,
    #[serde(default)]
    pub gallery: Vec<MediaAsset>,
}

impl NewDestination {
    pub fn into_destination(self) -> CoreResult<Destination> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ValidationError("Destination name is required".to_string()));
        }
        if self.image.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Please upload a destination cover image.".to_string(),
            ));
        }
        Ok(Destination {
            id: 0,
            name: self.name,
            description: self.description,
            image: self.image,
            services: self.services,
            visit_places: self.visit_places,
            gallery: self.gallery,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DestinationPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub services: Option<Vec<String>>,
    pub visit_places: Option<Vec<String>>,
    pub gallery: Option<Vec<MediaAsset>>,
}

impl Record for Destination {
    type Patch = DestinationPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, patch: DestinationPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(services) = patch.services {
            self.services = services;
        }
        if let Some(visit_places) = patch.visit_places {
            self.visit_places = visit_places;
        }
        if let Some(gallery) = patch.gallery {
            self.gallery = gallery;
        }
    }
}
