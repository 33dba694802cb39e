//! Configuration loading and management.
//!
//! Two layers of configuration exist:
//!
//! - [`ExtractorConfig`] is fixed when an [`Engine`](crate::Engine) is built: vision
//!   provider credentials, Confluence credentials, OCR, HTTP and safety limits.
//! - [`ExtractionOptions`] is passed per call and is never mutated by adapters.
//!
//! `ExtractorConfig` can be loaded from TOML, YAML or JSON files, or discovered by
//! searching for `anyextract.toml` upward from the current directory.

use crate::{AnyExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`VisionConfig::api_key`].
pub const VISION_API_KEY_ENV: &str = "ANYEXTRACT_VISION_API_KEY";
/// Environment variable overriding [`ConfluenceConfig::api_key`].
pub const CONFLUENCE_API_KEY_ENV: &str = "ANYEXTRACT_CONFLUENCE_API_KEY";

/// How embedded images become text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageExtractionMethod {
    #[default]
    Ocr,
    Llm,
}

/// Per-call extraction options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    /// Describe or OCR images. When false, images contribute nothing.
    #[serde(default)]
    pub extract_images: bool,

    #[serde(default)]
    pub image_extraction_method: ImageExtractionMethod,

    /// Tesseract three-letter language code, e.g. `eng`, `deu`, `chi_sim`.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            extract_images: false,
            image_extraction_method: ImageExtractionMethod::default(),
            language: default_language(),
        }
    }
}

impl ExtractionOptions {
    /// Options with image extraction enabled through `method`.
    pub fn with_images(method: ImageExtractionMethod) -> Self {
        Self {
            extract_images: true,
            image_extraction_method: method,
            ..Self::default()
        }
    }
}

/// Options for [`Engine::parse_wiki_page`](crate::Engine::parse_wiki_page).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WikiExtractionOptions {
    /// Image handling for `ac:image` references.
    #[serde(default)]
    pub images: ExtractionOptions,

    /// Download `view-file` attachments and extract their text in place of the
    /// download URL.
    #[serde(default)]
    pub extract_attachments: bool,
}

/// Supported vision providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionProvider {
    #[serde(alias = "open_ai")]
    OpenAi,
    Google,
    Anthropic,
}

impl std::fmt::Display for VisionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VisionProvider::OpenAi => "openai",
            VisionProvider::Google => "google",
            VisionProvider::Anthropic => "anthropic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionConfig {
    pub provider: VisionProvider,
    pub model: String,
    #[serde(default)]
    pub api_key: String,
}

/// Whether a Confluence site is Atlassian cloud or self-hosted.
///
/// Cloud sites serve the REST API and downloads under `/wiki`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WikiDeployment {
    Cloud,
    SelfHosted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfluenceConfig {
    pub base_url: String,
    pub email: String,
    #[serde(default)]
    pub api_key: String,
    /// Explicit deployment kind; inferred from the host name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<WikiDeployment>,
}

/// OCR backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrSettings {
    /// Path or name of the `tesseract` executable.
    #[serde(default = "default_tesseract_command")]
    pub tesseract_command: String,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_command: default_tesseract_command(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Timeout applied to every outbound request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Safety limits applied while reading untrusted documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum markup nesting depth before the walker gives up.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum decompressed size of a single archive part, in bytes.
    #[serde(default = "default_max_part_bytes")]
    pub max_part_bytes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_part_bytes: default_max_part_bytes(),
        }
    }
}

/// Engine-wide configuration, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<VisionConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confluence: Option<ConfluenceConfig>,

    #[serde(default)]
    pub ocr: OcrSettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub limits: Limits,
}

fn default_language() -> String {
    "eng".to_string()
}
fn default_tesseract_command() -> String {
    "tesseract".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_depth() -> usize {
    256
}
fn default_max_part_bytes() -> u64 {
    256 * 1024 * 1024
}

impl ExtractorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content).map_err(|e| {
            AnyExtractError::configuration(format!("Invalid TOML in {}: {}", path.as_ref().display(), e))
        })
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content).map_err(|e| {
            AnyExtractError::configuration(format!("Invalid YAML in {}: {}", path.as_ref().display(), e))
        })
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| {
            AnyExtractError::configuration(format!("Invalid JSON in {}: {}", path.as_ref().display(), e))
        })
    }

    /// Load configuration, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(AnyExtractError::configuration(format!(
                "Unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    /// Search for `anyextract.toml` in the current directory and its parents.
    ///
    /// Returns `Ok(None)` if no file is found.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir()?;

        loop {
            let candidate = current.join("anyextract.toml");
            if candidate.exists() {
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Fill empty API keys from the process environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(vision) = self.vision.as_mut()
            && let Ok(key) = std::env::var(VISION_API_KEY_ENV)
        {
            vision.api_key = key;
        }
        if let Some(confluence) = self.confluence.as_mut()
            && let Ok(key) = std::env::var(CONFLUENCE_API_KEY_ENV)
        {
            confluence.api_key = key;
        }
        self
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| AnyExtractError::configuration(format!("Failed to read config file {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_options() {
        let options = ExtractionOptions::default();
        assert!(!options.extract_images);
        assert_eq!(options.image_extraction_method, ImageExtractionMethod::Ocr);
        assert_eq!(options.language, "eng");
    }

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert!(config.vision.is_none());
        assert!(config.confluence.is_none());
        assert_eq!(config.limits.max_depth, 256);
        assert_eq!(config.ocr.tesseract_command, "tesseract");
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("anyextract.toml");

        fs::write(
            &config_path,
            r#"
[vision]
provider = "anthropic"
model = "claude-3-haiku"
api_key = "secret"

[confluence]
base_url = "https://acme.atlassian.net/"
email = "bot@acme.test"
api_key = "token"

[limits]
max_depth = 64
        "#,
        )
        .unwrap();

        let config = ExtractorConfig::from_toml_file(&config_path).unwrap();
        let vision = config.vision.unwrap();
        assert_eq!(vision.provider, VisionProvider::Anthropic);
        assert_eq!(vision.model, "claude-3-haiku");
        assert_eq!(config.confluence.unwrap().deployment, None);
        assert_eq!(config.limits.max_depth, 64);
        assert_eq!(config.http.timeout_secs, 60);
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("anyextract.yaml");

        fs::write(
            &config_path,
            "vision:\n  provider: openai\n  model: gpt-4o-mini\nhttp:\n  timeout_secs: 5\n",
        )
        .unwrap();

        let config = ExtractorConfig::from_file(&config_path).unwrap();
        assert_eq!(config.vision.unwrap().provider, VisionProvider::OpenAi);
        assert_eq!(config.http.timeout_secs, 5);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("anyextract.json");

        fs::write(
            &config_path,
            r#"{"confluence": {"base_url": "https://wiki.acme.test", "email": "a@b.c", "deployment": "self_hosted"}}"#,
        )
        .unwrap();

        let config = ExtractorConfig::from_file(&config_path).unwrap();
        assert_eq!(
            config.confluence.unwrap().deployment,
            Some(WikiDeployment::SelfHosted)
        );
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("anyextract.toml");
        fs::write(&config_path, "[vision\nprovider = ").unwrap();

        let err = ExtractorConfig::from_toml_file(&config_path).unwrap_err();
        assert!(matches!(err, AnyExtractError::Configuration { .. }));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = ExtractorConfig::from_file("settings.ini").unwrap_err();
        assert!(err.to_string().contains("Unsupported config file extension"));
    }

    #[test]
    #[serial]
    fn test_discover_anyextract_toml() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("anyextract.toml"), "[limits]\nmax_depth = 12\n").unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();

        let result = std::panic::catch_unwind(|| {
            let config = ExtractorConfig::discover().unwrap();
            assert_eq!(config.unwrap().limits.max_depth, 12);
        });

        std::env::set_current_dir(&original_dir).unwrap();

        if let Err(e) = result {
            std::panic::resume_unwind(e);
        }
    }

    #[test]
    #[serial]
    #[allow(unsafe_code)]
    fn test_env_overrides_fill_api_keys() {
        let config = ExtractorConfig {
            vision: Some(VisionConfig {
                provider: VisionProvider::Google,
                model: "gemini-1.5-flash".to_string(),
                api_key: String::new(),
            }),
            ..Default::default()
        };

        unsafe { std::env::set_var(VISION_API_KEY_ENV, "from-env") };
        let config = config.with_env_overrides();
        unsafe { std::env::remove_var(VISION_API_KEY_ENV) };

        assert_eq!(config.vision.unwrap().api_key, "from-env");
        assert!(config.confluence.is_none());
    }
}
