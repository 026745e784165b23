use crate::core::config::{Config, CONFIG_FILE_NAME};
use crate::error::{FetchError, Result};
use std::path::{Path, PathBuf};

/// Write `config` as TOML so it can be edited. Refuses to overwrite unless `force`.
pub fn init_config(config: &Config, path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    if path.exists() && !force {
        return Err(FetchError::config_error(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    config.save(&path)?;

    println!("✅ Wrote configuration to {}", path.display());
    println!("   {} model sets defined", config.sets.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);

        init_config(&Config::default(), Some(path.as_path()), false).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "models_root = \"keep\"\n").unwrap();

        assert!(init_config(&Config::default(), Some(path.as_path()), false).is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "models_root = \"keep\"\n"
        );

        init_config(&Config::default(), Some(path.as_path()), true).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().sets.len(), 3);
    }
}
