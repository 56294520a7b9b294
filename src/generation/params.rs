use super::GenerationError;
use crate::GenerationDefaults;
use crate::api::GenerationRequest;
use serde::Serialize;
use std::ops::RangeInclusive;

/// Sampler names the form offers, in selector order.
pub const SAMPLERS: [&str; 16] = [
    "DPM++ 2M Karras",
    "Euler a",
    "Euler",
    "LMS",
    "Heun",
    "DPM2",
    "DPM++ 2S Karras",
    "DPM++ SDE Karras",
    "DPM fast",
    "DPM adaptive",
    "LMS Karras",
    "DPM2 Karras",
    "DPM++ 2M SDE Karras",
    "DDIM",
    "PLMS",
    "UniPC",
];

pub const SIZE_RANGE: RangeInclusive<u32> = 256..=2048;
pub const SIZE_STEP: u32 = 64;
pub const STEPS_RANGE: RangeInclusive<u32> = 1..=50;
pub const CFG_RANGE: RangeInclusive<f32> = 1.0..=20.0;
pub const CFG_STEP: f32 = 0.5;

/// Lets the backend pick a random seed.
pub const RANDOM_SEED: i64 = -1;

/// The form's editable values. Bounds are only enforced by [`GenerationParams::set`], the way
/// an input widget would; the fields themselves accept anything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub prompt: String,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub cfg_scale: f32,
    pub sampler_name: String,
    pub seed: i64,
}

impl GenerationParams {
    pub fn from_defaults(defaults: &GenerationDefaults) -> Self {
        Self {
            prompt: String::new(),
            negative_prompt: String::new(),
            width: defaults.width,
            height: defaults.height,
            steps: defaults.steps,
            cfg_scale: defaults.cfg_scale,
            sampler_name: defaults.sampler_name.clone(),
            seed: defaults.seed,
        }
    }

    pub fn to_request(&self, model_id: Option<String>) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt.clone(),
            negative_prompt: self.negative_prompt.clone(),
            width: self.width,
            height: self.height,
            steps: self.steps,
            cfg_scale: self.cfg_scale,
            sampler_name: self.sampler_name.clone(),
            seed: self.seed,
            model_id,
        }
    }

    /// Clears what is specific to one image and keeps the style settings.
    pub fn reset_after_generation(&mut self) {
        self.prompt.clear();
        self.negative_prompt.clear();
        self.seed = RANDOM_SEED;
    }

    /// Sets a field from user input, applying the widget bounds.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), GenerationError> {
        match field.trim().to_lowercase().as_str() {
            "prompt" => self.prompt = value.to_string(),
            "negative" | "negative_prompt" => self.negative_prompt = value.to_string(),
            "width" => self.width = parse_size("width", value)?,
            "height" => self.height = parse_size("height", value)?,
            "steps" => {
                let steps = parse_number::<u32>("steps", value)?;
                if !STEPS_RANGE.contains(&steps) {
                    return Err(out_of_range("steps", &STEPS_RANGE));
                }
                self.steps = steps;
            }
            "cfg" | "cfg_scale" => {
                let cfg = parse_number::<f32>("cfg_scale", value)?;
                if !CFG_RANGE.contains(&cfg) {
                    return Err(out_of_range("cfg_scale", &CFG_RANGE));
                }
                if (cfg / CFG_STEP).fract() != 0.0 {
                    return Err(GenerationError::InvalidValue {
                        field: "cfg_scale",
                        reason: format!("must be a multiple of {}", CFG_STEP),
                    });
                }
                self.cfg_scale = cfg;
            }
            "sampler" | "sampler_name" => {
                let sampler = SAMPLERS
                    .iter()
                    .find(|s| s.eq_ignore_ascii_case(value.trim()))
                    .ok_or_else(|| GenerationError::InvalidValue {
                        field: "sampler_name",
                        reason: format!("unknown sampler {:?}", value),
                    })?;
                self.sampler_name = sampler.to_string();
            }
            "seed" => {
                let seed = parse_number::<i64>("seed", value)?;
                if seed < RANDOM_SEED {
                    return Err(GenerationError::InvalidValue {
                        field: "seed",
                        reason: "use -1 for a random seed".to_string(),
                    });
                }
                self.seed = seed;
            }
            other => return Err(GenerationError::UnknownField(other.to_string())),
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, GenerationError> {
    value
        .trim()
        .parse()
        .map_err(|_| GenerationError::InvalidValue {
            field,
            reason: format!("{:?} is not a number", value),
        })
}

fn parse_size(field: &'static str, value: &str) -> Result<u32, GenerationError> {
    let size = parse_number::<u32>(field, value)?;
    if !SIZE_RANGE.contains(&size) {
        return Err(out_of_range(field, &SIZE_RANGE));
    }
    if size % SIZE_STEP != 0 {
        return Err(GenerationError::InvalidValue {
            field,
            reason: format!("must be a multiple of {}", SIZE_STEP),
        });
    }
    Ok(size)
}

fn out_of_range<T: std::fmt::Display>(field: &'static str, range: &RangeInclusive<T>) -> GenerationError {
    GenerationError::InvalidValue {
        field,
        reason: format!("must be between {} and {}", range.start(), range.end()),
    }
}
