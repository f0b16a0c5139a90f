//! Generation parameters resolved from host settings.

use crate::host::SettingsSource;
use std::collections::HashMap;

pub const DEFAULT_BATCH_SIZE: u32 = 3;
pub const DEFAULT_IMAGE_SIZE: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ApiKey,
    ImageCount,
    ImageSize,
    ImageHeight,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::ApiKey,
        SettingKey::ImageCount,
        SettingKey::ImageSize,
        SettingKey::ImageHeight,
    ];

    /// Name the setting is shown under in the host.
    pub fn label(self) -> &'static str {
        match self {
            SettingKey::ApiKey => "API Key",
            SettingKey::ImageCount => {
                "Images generated per prompt (default 3, more images = longer response time)"
            }
            SettingKey::ImageSize => "Image size (default is 512, can be 256 or 1024)",
            SettingKey::ImageHeight => "Image height (defaults to image size)",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            SettingKey::ApiKey => "OPENAI_API_KEY",
            SettingKey::ImageCount => "AIMAGE_IMAGE_COUNT",
            SettingKey::ImageSize => "AIMAGE_IMAGE_SIZE",
            SettingKey::ImageHeight => "AIMAGE_IMAGE_HEIGHT",
        }
    }
}

/// User-tunable request parameters, read once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParameters {
    pub batch_size: u32,
    pub width: u32,
    pub height: u32,
    credential: String,
}

impl GenerationParameters {
    pub fn new(batch_size: u32, width: u32, height: u32, credential: impl Into<String>) -> Self {
        let credential: String = credential.into();
        Self {
            batch_size: batch_size.max(1),
            width: width.max(1),
            height: height.max(1),
            credential: credential.trim().to_string(),
        }
    }

    /// Never fails: absent, blank, or invalid values fall back to defaults.
    pub fn resolve(settings: &dyn SettingsSource) -> Self {
        let batch_size = positive_setting(settings, SettingKey::ImageCount, DEFAULT_BATCH_SIZE);
        let width = positive_setting(settings, SettingKey::ImageSize, DEFAULT_IMAGE_SIZE);
        let height = positive_setting(settings, SettingKey::ImageHeight, width);
        let credential = settings.get(SettingKey::ApiKey).unwrap_or_default();

        Self::new(batch_size, width, height, credential)
    }

    /// `None` when the API key is absent or blank.
    pub fn credential(&self) -> Option<&str> {
        if self.credential.is_empty() {
            None
        } else {
            Some(&self.credential)
        }
    }

    /// Dimensions in the `WIDTHxHEIGHT` form the service expects.
    pub fn size(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

fn positive_setting(settings: &dyn SettingsSource, key: SettingKey, default: u32) -> u32 {
    let Some(raw) = settings.get(key) else {
        return default;
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return default;
    }
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => value,
        _ => {
            tracing::warn!(
                "Ignoring invalid value {:?} for setting \"{}\", using {}",
                raw,
                key.label(),
                default
            );
            default
        }
    }
}

/// In-memory settings.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    values: HashMap<SettingKey, String>,
}

impl StaticSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: SettingKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }
}

impl SettingsSource for StaticSettings {
    fn get(&self, key: SettingKey) -> Option<String> {
        self.values.get(&key).cloned()
    }
}

/// Settings read from the process environment (and a `.env` file if present).
#[derive(Debug, Clone)]
pub struct EnvSettings {
    values: HashMap<SettingKey, String>,
}

impl EnvSettings {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let values = SettingKey::ALL
            .into_iter()
            .filter_map(|key| std::env::var(key.env_var()).ok().map(|value| (key, value)))
            .collect();

        Self { values }
    }
}

impl SettingsSource for EnvSettings {
    fn get(&self, key: SettingKey) -> Option<String> {
        self.values.get(&key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let params = GenerationParameters::resolve(&StaticSettings::new());

        assert_eq!(params.batch_size, 3);
        assert_eq!(params.width, 512);
        assert_eq!(params.height, 512);
        assert_eq!(params.credential(), None);
        assert_eq!(params.size(), "512x512");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let settings = StaticSettings::new()
            .with(SettingKey::ImageCount, "   ")
            .with(SettingKey::ImageSize, "")
            .with(SettingKey::ApiKey, "  \t ");

        let params = GenerationParameters::resolve(&settings);
        assert_eq!(params.batch_size, 3);
        assert_eq!(params.width, 512);
        assert_eq!(params.credential(), None);
    }

    #[test]
    fn test_values_are_trimmed_and_parsed() {
        let settings = StaticSettings::new()
            .with(SettingKey::ImageCount, " 5 ")
            .with(SettingKey::ImageSize, "1024")
            .with(SettingKey::ApiKey, " sk-test ");

        let params = GenerationParameters::resolve(&settings);
        assert_eq!(params.batch_size, 5);
        assert_eq!(params.size(), "1024x1024");
        assert_eq!(params.credential(), Some("sk-test"));
    }

    #[test]
    fn test_height_is_independently_configurable() {
        let settings = StaticSettings::new()
            .with(SettingKey::ImageSize, "1024")
            .with(SettingKey::ImageHeight, "256");

        let params = GenerationParameters::resolve(&settings);
        assert_eq!(params.size(), "1024x256");
    }

    #[test]
    fn test_invalid_and_zero_values_use_defaults() {
        let settings = StaticSettings::new()
            .with(SettingKey::ImageCount, "0")
            .with(SettingKey::ImageSize, "large");

        let params = GenerationParameters::resolve(&settings);
        assert_eq!(params.batch_size, 3);
        assert_eq!(params.width, 512);
    }

    #[test]
    fn test_new_clamps_to_positive() {
        let params = GenerationParameters::new(0, 0, 0, "key");
        assert_eq!(params.batch_size, 1);
        assert_eq!(params.size(), "1x1");
    }
}
