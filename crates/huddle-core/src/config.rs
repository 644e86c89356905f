use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalogue::{
    AppLocale, CustomizedLanguageType, LanguageId, RawDataMemoryMode, RenderPostProcessing,
    VideoCaptureMethod, VideoRenderMode,
};
use crate::errors::{ConfigError, SdkError, SdkResult};

pub const DEFAULT_LOG_FILE_SIZE_MB: u32 = 5;
pub const MAX_LOG_FILE_SIZE_MB: u32 = 50;

/// Custom language resource, either a file on disk or inline content.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CustomLanguage {
    pub kind: CustomizedLanguageType,
    pub value: String,
}

/// Options passed to `Sdk::initialize`.
///
/// Everything but `path` and `domain` is optional. An omitted field is
/// never sent, so the native default applies.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct InitOptions {
    /// Location of the native library.
    pub path: Option<String>,
    /// Web domain of the service, e.g. `https://zoom.us`.
    pub domain: Option<String>,
    pub language: Option<LanguageId>,
    pub custom_language: Option<CustomLanguage>,
    pub support_url: Option<String>,
    pub enable_log: Option<bool>,
    pub locale: Option<AppLocale>,
    pub log_file_size_mb: Option<u32>,
    pub enable_generate_dump: Option<bool>,
    pub per_monitor_dpi_awareness: Option<bool>,
    pub video_render_mode: Option<VideoRenderMode>,
    pub video_raw_data_memory_mode: Option<RawDataMemoryMode>,
    pub share_raw_data_memory_mode: Option<RawDataMemoryMode>,
    pub audio_raw_data_memory_mode: Option<RawDataMemoryMode>,
    pub enable_raw_data_intermediate_mode: Option<bool>,
    pub render_post_processing: Option<RenderPostProcessing>,
    pub video_capture_method: Option<VideoCaptureMethod>,
    pub team_identifier: Option<String>,
    pub custom_localization_file_path: Option<String>,
    pub use_custom_ui: Option<bool>,
    pub branding_name: Option<String>,
}

impl InitOptions {
    pub fn new(path: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            domain: Some(domain.into()),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Local checks run before the native library is touched.
    pub fn validate(&self) -> SdkResult {
        non_blank(self.path.as_deref()).ok_or(SdkError::Uninitialize)?;
        let domain = non_blank(self.domain.as_deref()).ok_or(SdkError::Uninitialize)?;

        if domain.contains("://") {
            let parsed = url::Url::parse(domain).map_err(|_| SdkError::InvalidParameter)?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(SdkError::InvalidParameter);
            }
        }

        if let Some(size) = self.log_file_size_mb {
            if !(1..=MAX_LOG_FILE_SIZE_MB).contains(&size) {
                return Err(SdkError::InvalidParameter);
            }
        }

        if let Some(custom) = &self.custom_language {
            if custom.kind != CustomizedLanguageType::None && custom.value.trim().is_empty() {
                return Err(SdkError::InvalidParameter);
            }
        }
        Ok(())
    }

    pub fn effective_log_file_size(&self) -> u32 {
        self.log_file_size_mb.unwrap_or(DEFAULT_LOG_FILE_SIZE_MB)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
