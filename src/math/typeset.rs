//! KaTeX typesetting

use thiserror::Error;

use crate::config::MathConfig;

/// Math typesetting errors
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Invalid KaTeX options: {0}")]
    Options(String),

    #[error("Failed to typeset `{tex}`: {message}")]
    Render { tex: String, message: String },
}

/// Renders a math source string to an HTML fragment
pub trait MathRenderer {
    fn render(&self, tex: &str, display: bool) -> Result<String, MathError>;
}

/// KaTeX renderer backed by the embedded JS engine
#[derive(Debug, Clone)]
pub struct KatexRenderer {
    throw_on_error: bool,
    trust: bool,
    output: String,
    macros: Vec<(String, String)>,
}

impl KatexRenderer {
    pub fn new() -> Self {
        Self::from_config(&MathConfig::default())
    }

    pub fn from_config(config: &MathConfig) -> Self {
        let mut macros: Vec<_> = config
            .macros
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        macros.sort();

        Self {
            throw_on_error: config.throw_on_error,
            trust: config.trust,
            output: config.output.clone(),
            macros,
        }
    }

    fn opts(&self, display: bool) -> Result<::katex::Opts, MathError> {
        let output = match self.output.as_str() {
            "html" => ::katex::OutputType::Html,
            "mathml" => ::katex::OutputType::Mathml,
            _ => ::katex::OutputType::HtmlAndMathml,
        };
        let mut builder = ::katex::Opts::builder();
        builder
            .display_mode(display)
            .output_type(output)
            .throw_on_error(self.throw_on_error)
            .trust(self.trust);
        for (name, expansion) in &self.macros {
            builder = builder.add_macro(name.clone(), expansion.clone());
        }
        builder.build().map_err(|e| MathError::Options(e.to_string()))
    }
}

impl Default for KatexRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MathRenderer for KatexRenderer {
    fn render(&self, tex: &str, display: bool) -> Result<String, MathError> {
        let opts = self.opts(display)?;
        ::katex::render_with_opts(tex, &opts).map_err(|e| MathError::Render {
            tex: tex.to_string(),
            message: e.to_string(),
        })
    }
}
