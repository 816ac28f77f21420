use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub resolver_strategy: String,
    pub corpus_source_path: Option<String>,
    pub corpus_target_path: Option<String>,
    pub provider_name: String,
    pub provider_api_key: Option<String>,
    pub provider_base_url: Option<String>,
    pub source_lang: String,
    pub target_lang: String,
    pub min_confidence: i32,
    pub cjk_min_token_length: usize,
    pub latin_min_token_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolver_strategy: "corpus".to_string(),
            corpus_source_path: None,
            corpus_target_path: None,
            provider_name: "mymemory".to_string(),
            provider_api_key: None,
            provider_base_url: None,
            source_lang: "zh".to_string(),
            target_lang: "en".to_string(),
            min_confidence: 60,
            cjk_min_token_length: 1,
            latin_min_token_length: 2,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    resolver: Option<ResolverSettings>,
    corpus: Option<CorpusSettings>,
    provider: Option<ProviderSettings>,
    #[serde(rename = "match")]
    matching: Option<MatchSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct ResolverSettings {
    strategy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CorpusSettings {
    source_path: Option<String>,
    target_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSettings {
    name: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    source_lang: Option<String>,
    target_lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MatchSettings {
    min_confidence: Option<i32>,
    cjk_min_token_length: Option<usize>,
    latin_min_token_length: Option<usize>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(resolver) = incoming.resolver {
            if let Some(strategy) = resolver.strategy {
                if !strategy.trim().is_empty() {
                    self.resolver_strategy = strategy.trim().to_lowercase();
                }
            }
        }
        if let Some(corpus) = incoming.corpus {
            if let Some(path) = corpus.source_path {
                if !path.trim().is_empty() {
                    self.corpus_source_path = Some(path);
                }
            }
            if let Some(path) = corpus.target_path {
                if !path.trim().is_empty() {
                    self.corpus_target_path = Some(path);
                }
            }
        }
        if let Some(provider) = incoming.provider {
            if let Some(name) = provider.name {
                if !name.trim().is_empty() {
                    self.provider_name = name.trim().to_lowercase();
                }
            }
            if let Some(key) = provider.api_key {
                if !key.trim().is_empty() {
                    self.provider_api_key = Some(key);
                }
            }
            if let Some(url) = provider.base_url {
                if !url.trim().is_empty() {
                    self.provider_base_url = Some(url);
                }
            }
            if let Some(lang) = provider.source_lang {
                if !lang.trim().is_empty() {
                    self.source_lang = lang;
                }
            }
            if let Some(lang) = provider.target_lang {
                if !lang.trim().is_empty() {
                    self.target_lang = lang;
                }
            }
        }
        if let Some(matching) = incoming.matching {
            if let Some(confidence) = matching.min_confidence {
                if (0..=100).contains(&confidence) {
                    self.min_confidence = confidence;
                }
            }
            if let Some(len) = matching.cjk_min_token_length {
                if len > 0 {
                    self.cjk_min_token_length = len;
                }
            }
            if let Some(len) = matching.latin_min_token_length {
                if len > 0 {
                    self.latin_min_token_length = len;
                }
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".ocr-locator-rust"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;
    use std::io::Write;

    #[test]
    fn extra_file_overrides_defaults() {
        with_temp_home(|_| {
            let mut file = tempfile::NamedTempFile::new().expect("temp settings");
            writeln!(
                file,
                "[resolver]\nstrategy = \"provider\"\n\n[provider]\nname = \"libre\"\ntarget_lang = \"fr\"\n\n[match]\nmin_confidence = 75\n"
            )
            .expect("write settings");

            let settings = load_settings(Some(file.path())).expect("load settings");
            assert_eq!(settings.resolver_strategy, "provider");
            assert_eq!(settings.provider_name, "libre");
            assert_eq!(settings.target_lang, "fr");
            assert_eq!(settings.min_confidence, 75);
            // Untouched keys keep their defaults.
            assert_eq!(settings.source_lang, "zh");
            assert_eq!(settings.cjk_min_token_length, 1);
        });
    }

    #[test]
    fn out_of_range_confidence_is_ignored() {
        with_temp_home(|_| {
            let mut file = tempfile::NamedTempFile::new().expect("temp settings");
            writeln!(file, "[match]\nmin_confidence = 250\n").expect("write settings");

            let settings = load_settings(Some(file.path())).expect("load settings");
            assert_eq!(settings.min_confidence, 60);
        });
    }

    #[test]
    fn missing_extra_file_is_an_error() {
        with_temp_home(|_| {
            let err = load_settings(Some(Path::new("/nonexistent/settings.toml")))
                .expect_err("missing file should fail");
            assert!(err.to_string().contains("settings file not found"));
        });
    }
}
