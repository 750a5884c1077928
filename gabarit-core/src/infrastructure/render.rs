// gabarit-core/src/infrastructure/render.rs

// Renders the registry INSERT templates. Same bridge role as a model
// compiler: template text in, executable SQL text out. Values must be
// escaped by the caller before they reach the template.

use crate::error::GabaritError;
use crate::infrastructure::error::InfrastructureError;
use minijinja::Environment;

pub struct SqlRenderer<'a> {
    env: Environment<'a>,
}

impl<'a> SqlRenderer<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();

        // Basic filters for identifier hygiene inside templates.
        env.add_filter("upper", |value: &str| value.to_uppercase());
        env.add_filter("lower", |value: &str| value.to_lowercase());

        Self { env }
    }

    pub fn render(
        &self,
        template: &str,
        context: &serde_json::Value,
    ) -> Result<String, GabaritError> {
        self.env
            .render_str(template, context)
            .map_err(|e| GabaritError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}

impl<'a> Default for SqlRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}
