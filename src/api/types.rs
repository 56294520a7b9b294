use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Prefix of every URL the backend serves image bytes from.
pub const SERVE_IMAGE_PREFIX: &str = "/api/serve-image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    S,
    A,
    B,
    C,
    D,
}

impl Rating {
    pub const ALL: [Rating; 5] = [Rating::S, Rating::A, Rating::B, Rating::C, Rating::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::S => "S",
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rating {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Rating::S),
            "A" => Ok(Rating::A),
            "B" => Ok(Rating::B),
            "C" => Ok(Rating::C),
            "D" => Ok(Rating::D),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Folder an image currently lives in on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Rated(Rating),
    Unclassified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Rated(rating) => rating.as_str(),
            Category::Unclassified => "unclassified",
            Category::Deleted => "deleted",
        }
    }

    pub fn rating(&self) -> Option<Rating> {
        match self {
            Category::Rated(rating) => Some(*rating),
            _ => None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Category::Deleted)
    }

    /// Server-relative URL the backend serves `filename` from while it sits in this category.
    pub fn serve_path(&self, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            SERVE_IMAGE_PREFIX,
            self.as_str(),
            urlencoding::encode(filename)
        )
    }
}

impl From<Rating> for Category {
    fn from(rating: Rating) -> Self {
        Category::Rated(rating)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unclassified") {
            Ok(Category::Unclassified)
        } else if trimmed.eq_ignore_ascii_case("deleted") {
            Ok(Category::Deleted)
        } else {
            trimmed.parse::<Rating>().map(Category::Rated)
        }
    }
}

impl TryFrom<String> for Category {
    type Error = UnknownCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

/// Free-form metadata the backend extracted from the image file.
pub type ImageMetadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    pub path: String,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
    pub category: Category,
}

impl ImageRecord {
    pub fn has_metadata(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupStatus {
    #[serde(default)]
    pub unclassified_path_set: bool,
    #[serde(default)]
    pub unclassified_path_exists: bool,
    #[serde(default)]
    pub unclassified_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f32,
    pub sampler_name: String,
    pub seed: i64,
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub filename: String,
    pub path: String,
    #[serde(default = "unclassified")]
    pub category: Category,
}

fn unclassified() -> Category {
    Category::Unclassified
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}
