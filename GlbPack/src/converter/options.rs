//! Conversion options

use serde::{Deserialize, Serialize};

/// What to do when a buffer or image URI points at a file that does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingResourcePolicy {
    /// Log a warning, report it in the result and keep the reference unpatched.
    #[default]
    Warn,
    /// Fail the conversion of that file.
    Error,
}

/// Options for glTF to GLB conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    pub missing_resources: MissingResourcePolicy,
    /// Written to `asset.generator` when the document does not name one and
    /// at least one resource was embedded.
    pub generator: Option<String>,
}

impl ConvertOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that fail on any missing resource.
    pub fn strict() -> Self {
        Self {
            missing_resources: MissingResourcePolicy::Error,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_missing_resources(mut self, policy: MissingResourcePolicy) -> Self {
        self.missing_resources = policy;
        self
    }

    #[must_use]
    pub fn with_generator(mut self, generator: impl Into<String>) -> Self {
        self.generator = Some(generator.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_default() {
        let opts = ConvertOptions::new();
        assert_eq!(opts.missing_resources, MissingResourcePolicy::Warn);
        assert!(opts.generator.is_none());
    }

    #[test]
    fn test_convert_options_from_json() {
        let opts: ConvertOptions =
            serde_json::from_str(r#"{"missing_resources": "error"}"#).unwrap();
        assert_eq!(opts, ConvertOptions::strict());

        let opts: ConvertOptions = serde_json::from_str(r#"{"generator": "glbpack"}"#).unwrap();
        assert_eq!(opts, ConvertOptions::new().with_generator("glbpack"));
    }
}
