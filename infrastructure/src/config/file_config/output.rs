//! Output configuration from TOML (`[output]` section)

use conclave_domain::OutputFormat;
use serde::{Deserialize, Serialize};

pub use conclave_domain::OutputFormat as FileOutputFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Full,
            color: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_deserializes_lowercase() {
        let toml_str = r#"
[output]
format = "json"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn default_output_favors_color_and_full_format() {
        let config = FileOutputConfig::default();
        assert_eq!(config.format, OutputFormat::Full);
        assert!(config.color);
    }
}
