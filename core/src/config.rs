use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use color_eyre::eyre::{bail, Context, Result};
use serde::Deserialize;

use crate::{
    catalog::operation::ingest::UploadLimits,
    processing::image::{DerivationSettings, VariantParams},
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlStorage {
    path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct TomlLimits {
    image_max_size: Option<String>,
    video_max_size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct TomlDerivation {
    optimized_width: Option<u32>,
    optimized_quality: Option<u8>,
    thumbnail_width: Option<u32>,
    thumbnail_quality: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlStatic {
    path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct TomlMail {
    webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct TomlConfig {
    pub address: Option<String>,
    pub port: Option<u16>,
    #[serde(rename = "Storage")]
    pub storage: Option<TomlStorage>,
    #[serde(rename = "Limits")]
    pub limits: Option<TomlLimits>,
    #[serde(rename = "Derivation")]
    pub derivation: Option<TomlDerivation>,
    #[serde(rename = "Static")]
    pub static_dir: Option<TomlStatic>,
    #[serde(rename = "Mail")]
    pub mail: Option<TomlMail>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub address: Option<String>,
    pub port: Option<u16>,
    /// Root of the asset store
    pub storage_dir: PathBuf,
    pub limits: UploadLimits,
    pub derivation: DerivationSettings,
    /// Frontend files served for everything outside `/api` and `/uploads`
    pub static_dir: Option<PathBuf>,
    pub mail: MailConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            address: None,
            port: None,
            storage_dir: PathBuf::from("uploads"),
            limits: UploadLimits::default(),
            derivation: DerivationSettings::default(),
            static_dir: None,
            mail: MailConfig { webhook_url: None },
        }
    }
}

pub async fn read_config(path: &Path) -> Result<Config> {
    let toml_str = tokio::fs::read_to_string(path)
        .await
        .context(format!("Error reading config file {}", path))?;
    // all paths in config are relative to this
    let config_dir = path.parent().unwrap_or(Path::new("."));
    parse_config(&toml_str, config_dir)
}

pub fn parse_config(toml_str: &str, config_dir: &Path) -> Result<Config> {
    let toml_config: TomlConfig = toml::from_str(toml_str).context("Error parsing config file")?;
    let defaults = Config::default();
    let resolve = |p: &str| -> PathBuf {
        let p = PathBuf::from(p);
        if p.is_absolute() {
            p
        } else {
            config_dir.join(p)
        }
    };
    let storage_dir = match toml_config.storage {
        Some(storage) => resolve(&storage.path),
        None => resolve(defaults.storage_dir.as_str()),
    };
    let limits = {
        let toml_limits = toml_config.limits.unwrap_or_default();
        UploadLimits {
            image_max_bytes: parse_size_or(
                toml_limits.image_max_size.as_deref(),
                defaults.limits.image_max_bytes,
            )?,
            video_max_bytes: parse_size_or(
                toml_limits.video_max_size.as_deref(),
                defaults.limits.video_max_bytes,
            )?,
        }
    };
    let derivation = {
        let d = toml_config.derivation.unwrap_or_default();
        let default = defaults.derivation;
        DerivationSettings {
            optimized: variant_params(
                d.optimized_width,
                d.optimized_quality,
                default.optimized,
            )?,
            thumbnail: variant_params(
                d.thumbnail_width,
                d.thumbnail_quality,
                default.thumbnail,
            )?,
        }
    };
    Ok(Config {
        address: toml_config.address,
        port: toml_config.port,
        storage_dir,
        limits,
        derivation,
        static_dir: toml_config.static_dir.map(|s| resolve(&s.path)),
        mail: MailConfig {
            webhook_url: toml_config.mail.and_then(|m| m.webhook_url),
        },
    })
}

fn parse_size_or(value: Option<&str>, default: u64) -> Result<u64> {
    match value {
        None => Ok(default),
        Some(s) => parse_size::parse_size(s).wrap_err_with(|| format!("invalid size '{}'", s)),
    }
}

fn variant_params(
    width: Option<u32>,
    quality: Option<u8>,
    default: VariantParams,
) -> Result<VariantParams> {
    let params = VariantParams {
        max_width: width.unwrap_or(default.max_width),
        quality: quality.unwrap_or(default.quality),
    };
    if params.max_width == 0 {
        bail!("variant width must be positive");
    }
    if !(1..=100).contains(&params.quality) {
        bail!("quality must be between 1 and 100, got {}", params.quality);
    }
    Ok(params)
}
