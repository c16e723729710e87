use super::PadportConfig;
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CONFIG_DIR: &str = ".config/padport";
const CONFIG_FILE: &str = "padport.toml";

/// `~/.config/padport/padport.toml`, relative to the working directory when
/// no home directory is known.
pub fn default_config_path() -> PathBuf {
    let mut path = get_home_dir();
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}

/// Loads the config at `path`. A missing file yields the defaults.
pub async fn load_config(path: &Path) -> Result<PadportConfig> {
    if !tokio::fs::try_exists(path)
        .await
        .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
    {
        warn!("No config at {}, using defaults", path.display());
        return Ok(PadportConfig::with_defaults());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| eyre!("Failed to read config file: {}", e))?;

    let config: PadportConfig =
        toml::from_str(&content).map_err(|e| eyre!("Failed to parse config file: {}", e))?;

    info!(
        "Loaded config from {} ({} systems)",
        path.display(),
        config.systems.len()
    );
    Ok(config)
}

pub async fn save_config(path: &Path, config: &PadportConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !tokio::fs::try_exists(parent)
            .await
            .map_err(|e| eyre!("Failed to check if config directory exists: {}", e))?
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| eyre!("Failed to create config directory: {}", e))?;
        }
    }

    let content = toml::to_string_pretty(config)
        .map_err(|e| eyre!("Failed to serialize config: {}", e))?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| eyre!("Failed to write config file: {}", e))?;

    info!("Config saved to {}", path.display());
    Ok(())
}

/// Writes the default config if none exists yet, then loads it.
pub async fn ensure_default_config(path: &Path) -> Result<PadportConfig> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?;

    if !exists {
        debug!("Creating default config at {}", path.display());
        save_config(path, &PadportConfig::with_defaults()).await?;
    }

    load_config(path).await
}

fn get_home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        warn!("Could not determine home directory, using current directory");
        PathBuf::from(".")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::system::TargetSystem;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("padport-{}-{}", name, std::process::id()))
    }

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let path = scratch_dir("missing").join(CONFIG_FILE);
        let config = load_config(&path).await.unwrap();
        assert_eq!(config, PadportConfig::with_defaults());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("nested").join(CONFIG_FILE);

        let mut config = PadportConfig::with_defaults();
        config.host.frame_rate = 50;
        if let Some(lynx) = config.systems.get_mut(TargetSystem::Lynx.key()) {
            lynx.rotation = 270;
        }

        save_config(&path, &config).await.unwrap();
        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded, config);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn partial_file_fills_in_defaults() {
        let dir = scratch_dir("partial");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join(CONFIG_FILE);
        tokio::fs::write(
            &path,
            "[host]\nframe_rate = 30\n\n[systems.nes.buttons.primary]\nA = [\"MOTE_PLUS\"]\n",
        )
        .await
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.host.frame_rate, 30);
        assert_eq!(config.host.rapid_period, 2);
        assert!(config.system(TargetSystem::Nes).is_some());
        assert!(config.system(TargetSystem::Lynx).is_none());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = scratch_dir("malformed");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join(CONFIG_FILE);
        tokio::fs::write(&path, "host = 5\n[[[").await.unwrap();

        assert!(load_config(&path).await.is_err());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
