use chrono::NaiveDate;
use explore_core::{CoreError, CoreResult, Record};
use serde::{Deserialize, Serialize};

use crate::destination::Destination;

/// Seat count used when a new tour is created without an explicit capacity.
pub const DEFAULT_CAPACITY: u32 = 20;

/// Tour package tiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TourCategory {
    #[default]
    Standard,
    Premium,
    Luxury,
}

impl std::str::FromStr for TourCategory {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(TourCategory::Standard),
            "premium" => Ok(TourCategory::Premium),
            "luxury" => Ok(TourCategory::Luxury),
            other => Err(CoreError::ValidationError(format!("Unknown tour category: {}", other))),
        }
    }
}

/// A purchasable, dated package tied to one destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tour {
    pub id: u64,
    pub destination_id: u64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub capacity: u32,
    pub available_seats: u32,
    pub duration_days: u32,
    pub location: String,
    pub start_date: NaiveDate,
    pub featured: bool,
    pub image: String,
    pub video: Option<String>,
    pub rating: f64,
    pub reviews_count: u32,
    pub category: TourCategory,
    pub services: Vec<String>,
}

/// Admin form payload for a new tour plan.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTour {
    pub destination_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub capacity: Option<u32>,
    pub duration_days: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub featured: bool,
    pub image: Option<String>,
    pub video: Option<String>,
    #[serde(default)]
    pub category: TourCategory,
    #[serde(default)]
    pub services: Vec<String>,
}

impl NewTour {
    /// Builds the stored tour. Location and a missing cover image are taken
    /// from the destination; every seat starts available.
    pub fn into_tour(self, destination: &Destination) -> CoreResult<Tour> {
        if self.title.trim().is_empty() {
            return Err(CoreError::ValidationError("Tour title is required".to_string()));
        }
        validate_price(self.price)?;

        let capacity = match self.capacity {
            Some(0) | None => DEFAULT_CAPACITY,
            Some(capacity) => capacity,
        };
        let image = self
            .image
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| destination.image.clone());

        Ok(Tour {
            id: 0,
            destination_id: destination.id,
            slug: slugify(&self.title),
            title: self.title,
            description: self.description,
            price: self.price,
            capacity,
            available_seats: capacity,
            duration_days: self.duration_days,
            location: destination.name.clone(),
            start_date: self.start_date,
            featured: self.featured,
            image,
            video: self.video,
            rating: 5.0,
            reviews_count: 0,
            category: self.category,
            services: self.services,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TourPatch {
    pub destination_id: Option<u64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub capacity: Option<u32>,
    pub available_seats: Option<u32>,
    pub duration_days: Option<u32>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub featured: Option<bool>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub category: Option<TourCategory>,
    pub services: Option<Vec<String>>,
}

impl TourPatch {
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(CoreError::ValidationError("Tour title is required".to_string()));
            }
        }
        Ok(())
    }
}

impl Record for Tour {
    type Patch = TourPatch;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    /// Shallow merge. The slug keeps its original value when the title
    /// changes so existing links stay valid.
    fn apply(&mut self, patch: TourPatch) {
        if let Some(v) = patch.destination_id {
            self.destination_id = v;
        }
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.price {
            self.price = v;
        }
        if let Some(v) = patch.capacity {
            self.capacity = v;
        }
        if let Some(v) = patch.available_seats {
            self.available_seats = v;
        }
        if let Some(v) = patch.duration_days {
            self.duration_days = v;
        }
        if let Some(v) = patch.location {
            self.location = v;
        }
        if let Some(v) = patch.start_date {
            self.start_date = v;
        }
        if let Some(v) = patch.featured {
            self.featured = v;
        }
        if let Some(v) = patch.image {
            self.image = v;
        }
        if patch.video.is_some() {
            self.video = patch.video;
        }
        if let Some(v) = patch.category {
            self.category = v;
        }
        if let Some(v) = patch.services {
            self.services = v;
        }
        self.available_seats = self.available_seats.min(self.capacity);
    }
}

fn validate_price(price: f64) -> CoreResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::ValidationError("Price must be a non-negative amount".to_string()));
    }
    Ok(())
}

/// Slug used when a title has no ASCII letters or digits to keep.
pub const FALLBACK_SLUG: &str = "tour";

/// URL slug for a title: lowercase, spaces become dashes, and anything other
/// than ASCII word characters or dashes is dropped. Titles that leave nothing
/// routable get [`FALLBACK_SLUG`]; the store suffixes it when taken.
pub fn slugify(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if slug.chars().any(|c| c.is_ascii_alphanumeric()) {
        slug
    } else {
        FALLBACK_SLUG.to_string()
    }
}
