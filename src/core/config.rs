use crate::core::octet::MAX_CODEPOINT;
use crate::errors::CharsetNotFoundError;
use serde::Deserialize;
use std::collections::HashMap;

/// A named set of code points loaded from TOML.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CharsetConfig {
    /// Short human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit characters
    #[serde(default)]
    pub chars: String,
    /// Inclusive code point ranges as `[low, high]` pairs
    #[serde(default)]
    pub ranges: Vec<[u32; 2]>,
}

impl CharsetConfig {
    /// The charset's code points, sorted and deduplicated, ready for
    /// [`build_table`](crate::build_table).
    ///
    /// Ranges may include surrogates; the table format does not care whether a
    /// code point is a valid `char`.
    pub fn codepoints(&self) -> Result<Vec<u32>, String> {
        let mut codepoints: Vec<u32> = self.chars.chars().map(u32::from).collect();

        for &[low, high] in &self.ranges {
            if low > high {
                return Err(format!("range U+{:04X}..U+{:04X} is reversed", low, high));
            }
            if high > MAX_CODEPOINT {
                return Err(format!(
                    "range end U+{:X} exceeds maximum Unicode codepoint U+{:X}",
                    high, MAX_CODEPOINT
                ));
            }
            codepoints.extend(low..=high);
        }

        codepoints.sort_unstable();
        codepoints.dedup();
        Ok(codepoints)
    }
}

const DEFAULT_BATCH_SIZE: usize = 256;

/// Global settings.
///
/// Fields stay `None` unless a file sets them, so merging can tell an
/// explicit value from an absent one.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Charset used when a command names none
    #[serde(default)]
    pub default_charset: Option<String>,
    /// Results resolved per `lookup_into` call by the CLI
    #[serde(default)]
    pub batch_size: Option<usize>,
}

impl Settings {
    /// Configured batch size, or 256 when no file sets one.
    pub fn batch_size(&self) -> usize {
        self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }
}

/// Collection of charset configurations loaded from TOML files.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CharsetRegistry {
    /// Map of charset names to their configurations
    #[serde(default)]
    pub charsets: HashMap<String, CharsetConfig>,
    #[serde(default)]
    pub settings: Settings,
}

impl CharsetRegistry {
    /// Parses charset configurations from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the charsets bundled with the library.
    pub fn load_default() -> Result<Self, Box<dyn std::error::Error>> {
        let content = include_str!("../../charsets.toml");
        Ok(Self::from_toml(content)?)
    }

    /// Loads configuration from a custom file path.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml(&content)?)
    }

    /// Loads configuration with user overrides from standard locations.
    ///
    /// Searches in priority order:
    /// 1. Built-in charsets (from library)
    /// 2. `~/.config/utf8-lookup/charsets.toml` (user overrides)
    /// 3. `./charsets.toml` (project-local overrides)
    ///
    /// Later configurations override earlier ones for matching charset names.
    /// Files that fail to load are skipped with a warning.
    pub fn load_with_overrides() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::load_default()?;

        let user_path = dirs::config_dir().map(|dir| dir.join("utf8-lookup").join("charsets.toml"));
        let local_path = Some(std::path::PathBuf::from("charsets.toml"));

        for path in [user_path, local_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(overrides) => {
                    tracing::debug!(path = %path.display(), charsets = overrides.charsets.len(), "loaded charset overrides");
                    config.merge(overrides);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load charset config");
                }
            }
        }

        Ok(config)
    }

    /// Merges another configuration into this one.
    ///
    /// Charsets from `other` override charsets with the same name in `self`.
    /// Settings present in `other` win as well.
    pub fn merge(&mut self, other: CharsetRegistry) {
        self.charsets.extend(other.charsets);
        if other.settings.default_charset.is_some() {
            self.settings.default_charset = other.settings.default_charset;
        }
        if other.settings.batch_size.is_some() {
            self.settings.batch_size = other.settings.batch_size;
        }
    }

    /// Retrieves a charset configuration by name.
    pub fn get_charset(&self, name: &str) -> Option<&CharsetConfig> {
        self.charsets.get(name)
    }

    /// Retrieves a charset, suggesting a near match when the name is unknown.
    pub fn charset(&self, name: &str) -> Result<&CharsetConfig, CharsetNotFoundError> {
        self.get_charset(name)
            .ok_or_else(|| CharsetNotFoundError::with_candidates(name, self.charsets.keys().map(String::as_str)))
    }

    /// Charset names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.charsets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        let config = CharsetRegistry::load_default().unwrap();
        assert!(config.charsets.contains_key("ascii"));
        assert_eq!(config.settings.default_charset.as_deref(), Some("latin1"));
    }

    #[test]
    fn test_builtin_charsets_are_valid() {
        let config = CharsetRegistry::load_default().unwrap();
        for (name, charset) in &config.charsets {
            let codepoints = charset.codepoints().unwrap();
            assert!(!codepoints.is_empty(), "{} is empty", name);
            assert!(crate::compute_table_size(&codepoints).is_ok(), "{} does not fit", name);
        }
    }

    #[test]
    fn test_ascii_is_printable_range() {
        let config = CharsetRegistry::load_default().unwrap();
        let ascii = config.get_charset("ascii").unwrap().codepoints().unwrap();
        assert_eq!(ascii.len(), 95);
        assert_eq!(ascii.first(), Some(&0x20));
        assert_eq!(ascii.last(), Some(&0x7E));
    }

    #[test]
    fn test_codepoints_merge_chars_and_ranges() {
        let config = CharsetConfig {
            description: None,
            chars: "cab€".to_string(),
            ranges: vec![[0x61, 0x64]],
        };
        assert_eq!(config.codepoints().unwrap(), vec![0x61, 0x62, 0x63, 0x64, 0x20AC]);
    }

    #[test]
    fn test_codepoints_reject_bad_ranges() {
        let reversed = CharsetConfig {
            ranges: vec![[0x64, 0x61]],
            ..Default::default()
        };
        assert!(reversed.codepoints().is_err());

        let too_high = CharsetConfig {
            ranges: vec![[0x10FFF0, 0x110000]],
            ..Default::default()
        };
        assert!(too_high.codepoints().is_err());
    }

    #[test]
    fn test_merge_configs() {
        let mut config1 = CharsetRegistry::default();
        config1.charsets.insert(
            "test1".to_string(),
            CharsetConfig {
                chars: "ABC".to_string(),
                ..Default::default()
            },
        );

        let mut config2 = CharsetRegistry::default();
        config2.charsets.insert(
            "test2".to_string(),
            CharsetConfig {
                chars: "XYZ".to_string(),
                ..Default::default()
            },
        );
        config2.charsets.insert(
            "test1".to_string(),
            CharsetConfig {
                chars: "DEF".to_string(),
                ..Default::default()
            },
        );
        config2.settings.batch_size = Some(32);

        config1.merge(config2);

        assert_eq!(config1.charsets.len(), 2);
        assert_eq!(config1.get_charset("test1").unwrap().chars, "DEF");
        assert_eq!(config1.get_charset("test2").unwrap().chars, "XYZ");
        assert_eq!(config1.settings.batch_size(), 32);
        assert_eq!(config1.settings.default_charset, None);
    }

    #[test]
    fn test_merge_explicit_default_batch_size_wins() {
        let mut config = CharsetRegistry::from_toml("[settings]\nbatch_size = 32").unwrap();
        config.merge(CharsetRegistry::from_toml("[settings]\nbatch_size = 256").unwrap());
        assert_eq!(config.settings.batch_size, Some(256));
        assert_eq!(config.settings.batch_size(), 256);
    }

    #[test]
    fn test_merge_keeps_settings_absent_from_override() {
        let mut config =
            CharsetRegistry::from_toml("[settings]\nbatch_size = 32\ndefault_charset = \"greek\"").unwrap();
        config.merge(CharsetRegistry::from_toml("[charsets.extra]\nchars = \"xyz\"").unwrap());
        assert_eq!(config.settings.batch_size(), 32);
        assert_eq!(config.settings.default_charset.as_deref(), Some("greek"));
        assert!(config.get_charset("extra").is_some());
    }

    #[test]
    fn test_load_from_toml_string() {
        let toml_content = r#"
[charsets.custom]
description = "digits and a few greek letters"
chars = "0123456789"
ranges = [[0x3B1, 0x3B3]]
"#;
        let config = CharsetRegistry::from_toml(toml_content).unwrap();
        let custom = config.get_charset("custom").unwrap();
        assert_eq!(custom.codepoints().unwrap().len(), 13);
        assert_eq!(config.settings.batch_size, None);
        assert_eq!(config.settings.batch_size(), 256);
    }

    #[test]
    fn test_unknown_charset_suggests() {
        let config = CharsetRegistry::load_default().unwrap();
        let err = config.charset("latn1").unwrap_err();
        assert_eq!(err.suggestion.as_deref(), Some("latin1"));
    }

    #[test]
    fn test_names_sorted() {
        let config = CharsetRegistry::load_default().unwrap();
        let names = config.names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
