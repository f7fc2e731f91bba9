use explore_core::Record;
use serde::{Deserialize, Serialize};

use crate::destination::MediaKind;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaSection {
    Hero,
    About,
    Gallery,
}

/// Rotating background image or video on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeroMedia {
    /// Zero on input means "assign a new id".
    #[serde(default)]
    pub id: u64,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub section: Option<MediaSection>,
}

impl HeroMedia {
    pub fn in_section(&self, section: MediaSection) -> bool {
        self.section == Some(section)
    }
}

impl Record for HeroMedia {
    // The media list is only ever replaced wholesale or pruned.
    type Patch = std::convert::Infallible;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, patch: Self::Patch) {
        match patch {}
    }
}
