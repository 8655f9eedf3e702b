//! Wish and artwork records fed to the samplers.
//!
//! A [`ContentPack`] is supplied once at startup, either parsed from a JSON
//! document or built from the crate's bundled datasets.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::wishes::Wish;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishCard {
    pub author: String,
    pub text: String,
}

impl From<&Wish> for WishCard {
    fn from(w: &Wish) -> Self {
        Self {
            author: w.author.clone(),
            text: w.text.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Image path relative to the site root.
    pub path: String,
    pub artist: String,
    pub description: String,
    /// Artist page; empty when the artist left none.
    #[serde(default)]
    pub link: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPack {
    #[serde(default)]
    pub wishes: Vec<WishCard>,
    #[serde(default)]
    pub artworks: Vec<Artwork>,
}

impl ContentPack {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Bundled wishes and sample artworks.
    pub fn builtin() -> Self {
        let wishes = crate::DEFAULT_WISHES
            .iter()
            .map(|(author, text)| WishCard {
                author: (*author).to_string(),
                text: (*text).to_string(),
            })
            .collect();
        let artworks = crate::SAMPLE_ARTWORKS
            .iter()
            .map(|(file, artist, description)| Artwork {
                path: format!("assets/artworks/{file}"),
                artist: (*artist).to_string(),
                description: (*description).to_string(),
                link: String::new(),
            })
            .collect();
        Self { wishes, artworks }
    }

    /// Fails when the pack has nothing to show on the gallery wall.
    pub fn require_artworks(&self) -> Result<(), ContentError> {
        if self.artworks.is_empty() {
            return Err(ContentError::EmptyPool { kind: "artworks" });
        }
        Ok(())
    }
}
