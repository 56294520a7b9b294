use crate::api::ImageMetadata;
use serde::Serialize;

/// Key diffusion front-ends store their generation settings under.
pub const PARAMETERS_KEY: &str = "parameters";

/// Marks the line holding the negative prompt inside the parameters text.
pub const NEGATIVE_PROMPT_PREFIX: &str = "Negative prompt:";

/// Generation settings recovered from an image's `parameters` text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationInfo {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    /// One row per remaining line, each split into `key: value` chips.
    pub parameters: Vec<Vec<String>>,
}

impl GenerationInfo {
    /// Returns `None` when there is nothing to show and a placeholder should be rendered.
    pub fn from_metadata(metadata: Option<&ImageMetadata>) -> Option<Self> {
        let text = metadata?
            .get(PARAMETERS_KEY)?
            .as_str()
            .filter(|text| !text.trim().is_empty())?;
        Some(Self::parse(text))
    }

    /// The prompt is always line 0. Chip rows come from the lines left after the negative
    /// prompt line is removed, minus the first of those.
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let prompt = lines.first().copied().unwrap_or_default().to_string();

        let negative_prompt = lines
            .iter()
            .find(|line| line.starts_with(NEGATIVE_PROMPT_PREFIX))
            .map(|line| line[NEGATIVE_PROMPT_PREFIX.len()..].trim().to_string());

        let parameters = lines
            .iter()
            .filter(|line| !line.starts_with(NEGATIVE_PROMPT_PREFIX))
            .skip(1)
            .map(|line| {
                line.split(", ")
                    .map(str::trim)
                    .filter(|chip| !chip.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|chips| !chips.is_empty())
            .collect();

        Self {
            prompt,
            negative_prompt,
            parameters,
        }
    }
}

/// A metadata key other than `parameters`, shown as-is below the parsed prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

/// Every metadata entry except the parameters text. Strings are shown raw, anything else as JSON.
pub fn extra_entries(metadata: Option<&ImageMetadata>) -> Vec<MetadataEntry> {
    metadata
        .into_iter()
        .flatten()
        .filter(|(key, _)| key.as_str() != PARAMETERS_KEY)
        .map(|(key, value)| MetadataEntry {
            key: key.clone(),
            value: match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
        .collect()
}
