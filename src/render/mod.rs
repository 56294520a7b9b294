// Text views - every screen the session prints goes through a liquid template
mod views;

pub use views::*;

use liquid::model::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

const HEADER_TEMPLATE: &str = include_str!("../../templates/_header.txt.liquid");

const TEMPLATES: [(&str, &str); 5] = [
    ("gallery", include_str!("../../templates/gallery.txt.liquid")),
    ("viewer", include_str!("../../templates/viewer.txt.liquid")),
    ("generate", include_str!("../../templates/generate.txt.liquid")),
    ("status", include_str!("../../templates/status.txt.liquid")),
    ("help", include_str!("../../templates/help.txt.liquid")),
];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to create parser: {0}")]
    Parser(liquid::Error),

    #[error("Failed to parse template {name}: {source}")]
    Parse { name: String, source: liquid::Error },

    #[error("Failed to render template {name}: {source}")]
    Render { name: String, source: liquid::Error },

    #[error("Failed to convert view for {name}: {source}")]
    Context { name: String, source: liquid::Error },

    #[error("Template not found: {0}")]
    NotFound(String),
}

pub struct TemplateEngine {
    header: liquid::Template,
    templates: HashMap<&'static str, liquid::Template>,
}

impl TemplateEngine {
    /// Parses every bundled template up front so a broken one fails at startup.
    pub fn new() -> Result<Self, RenderError> {
        let parser = liquid::ParserBuilder::with_stdlib()
            .build()
            .map_err(RenderError::Parser)?;

        let parse = |name: &str, source: &str| {
            parser.parse(source).map_err(|e| RenderError::Parse {
                name: name.to_string(),
                source: e,
            })
        };

        let header = parse("_header", HEADER_TEMPLATE)?;
        let mut templates = HashMap::new();
        for (name, source) in TEMPLATES {
            templates.insert(name, parse(name, source)?);
        }
        debug!("Parsed {} templates", templates.len());

        Ok(Self { header, templates })
    }

    pub fn render<V: View>(&self, view: &V) -> Result<String, RenderError> {
        let name = V::TEMPLATE;
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::NotFound(name.to_string()))?;

        let mut globals = liquid::to_object(view).map_err(|e| RenderError::Context {
            name: name.to_string(),
            source: e,
        })?;

        let header = self
            .header
            .render(&globals)
            .map_err(|e| RenderError::Render {
                name: "_header".to_string(),
                source: e,
            })?;
        globals.insert("header".into(), Value::scalar(header.trim_end().to_string()));

        template.render(&globals).map_err(|e| RenderError::Render {
            name: name.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests;
