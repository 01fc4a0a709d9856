use serde::{Deserialize, Serialize};

use crate::vote::models::AnimeDetails;

/// Kind recorded for every anime coming out of a matchup
pub const MATCHUP_ANIME_KIND: &str = "Anime";

/// Every catalog response wraps its payload in `data`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub jpg: ImageSet,
    #[serde(default)]
    pub webp: ImageSet,
}

impl Images {
    /// Large webp first, then plain webp, then jpg
    pub fn best(&self) -> Option<&str> {
        self.webp
            .large_image_url
            .as_deref()
            .or(self.webp.image_url.as_deref())
            .or(self.jpg.large_image_url.as_deref())
            .or(self.jpg.image_url.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogAnime {
    pub mal_id: i64,
    pub title: String,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub images: Images,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub synopsis: Option<String>,
}

impl CatalogAnime {
    /// Details sent along with a vote for this anime
    pub fn vote_details(&self) -> AnimeDetails {
        AnimeDetails {
            title: self.title.clone(),
            image_url: self.images.best().unwrap_or_default().to_string(),
            kind: MATCHUP_ANIME_KIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCharacter {
    pub mal_id: i64,
    pub name: String,
    #[serde(default)]
    pub images: Images,
    #[serde(default)]
    pub about: Option<String>,
}

/// A character as listed on an anime page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRole {
    pub character: CatalogCharacter,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_top_anime_payload() {
        let json = r#"{
            "data": [{
                "mal_id": 5114,
                "title": "Fullmetal Alchemist: Brotherhood",
                "type": "TV",
                "score": 9.1,
                "images": {
                    "jpg": {"image_url": "https://cdn/fma.jpg"},
                    "webp": {"image_url": "https://cdn/fma.webp", "large_image_url": "https://cdn/fma-l.webp"}
                }
            }],
            "pagination": {"has_next_page": true}
        }"#;

        let envelope: Envelope<Vec<CatalogAnime>> = serde_json::from_str(json).unwrap();
        let anime = &envelope.data.unwrap()[0];

        assert_eq!(anime.mal_id, 5114);
        assert_eq!(anime.kind.as_deref(), Some("TV"));
        assert_eq!(anime.images.best(), Some("https://cdn/fma-l.webp"));
    }

    #[test]
    fn vote_details_fall_back_to_plain_image() {
        let anime = CatalogAnime {
            mal_id: 1,
            title: "Cowboy Bebop".to_string(),
            title_english: None,
            images: Images {
                jpg: ImageSet::default(),
                webp: ImageSet {
                    image_url: Some("https://cdn/bebop.webp".to_string()),
                    large_image_url: None,
                },
            },
            kind: Some("TV".to_string()),
            score: None,
            synopsis: None,
        };

        let details = anime.vote_details();
        assert_eq!(details.image_url, "https://cdn/bebop.webp");
        assert_eq!(details.kind, "Anime");
    }

    #[test]
    fn missing_data_is_none() {
        let envelope: Envelope<CatalogCharacter> =
            serde_json::from_str(r#"{"status": 429}"#).unwrap();
        assert!(envelope.data.is_none());
    }
}
