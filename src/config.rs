use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::cli::CliArgs;

/// Defaults for the knobs every run needs; any CLI flag overrides its
/// config value.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Config {
    pub version: u32,
    pub output: PathBuf,
    pub jobs: u32,
    pub top: u32,
    pub min_size: u32,
    pub clone_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            output: PathBuf::from("function_sizes.xlsx"),
            jobs: 4,
            top: 5,
            min_size: 1,
            clone_timeout_secs: 300,
        }
    }
}

pub fn get_default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "funcsize")
        .context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    Ok(config_dir.join("funcsize.toml"))
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p,
            None => get_default_config_path()?,
        };

        if !path.exists() {
            let default_config = Config::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
            default_config.save(&path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn from_cli_and_file(cli_args: &CliArgs, config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load(config_path)?;

        // CLI args override config file
        if let Some(output) = &cli_args.output {
            config.output = output.clone();
        }
        if let Some(jobs) = cli_args.jobs {
            config.jobs = jobs;
        }
        if let Some(top) = cli_args.top {
            config.top = top;
        }
        if let Some(min_size) = cli_args.min_size {
            config.min_size = min_size;
        }

        config.validate()?;
        Ok(config)
    }

    /// Clap bounds only cover flags; values merged from the config file go
    /// through here so bad counts are rejected before any scanning.
    pub fn validate(&self) -> Result<()> {
        if self.jobs < 1 {
            bail!("jobs must be at least 1");
        }
        if self.top < 1 {
            bail!("top must be at least 1");
        }
        if self.min_size < 1 {
            bail!("min-size must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.output, PathBuf::from("function_sizes.xlsx"));
        assert_eq!(config.jobs, 4);
        assert_eq!(config.top, 5);
        assert_eq!(config.min_size, 1);
        assert_eq!(config.clone_timeout_secs, 300);
    }

    #[test]
    fn test_config_file_with_zero_counts_is_rejected() -> Result<()> {
        use clap::Parser;
        let temp_dir = TempDir::new()?;

        let bad_configs = [
            ("zero_top.toml", Config { top: 0, ..Config::default() }),
            ("zero_jobs.toml", Config { jobs: 0, ..Config::default() }),
            ("zero_min_size.toml", Config { min_size: 0, ..Config::default() }),
        ];
        for (file_name, bad_config) in bad_configs {
            let config_path = temp_dir.path().join(file_name);
            bad_config.save(&config_path)?;

            let cli_args = CliArgs::parse_from(["funcsize", "repo"]);
            let result = Config::from_cli_and_file(&cli_args, Some(config_path));
            assert!(result.is_err(), "accepted {file_name}");
        }
        Ok(())
    }

    #[test]
    fn test_cli_flag_overrides_invalid_config_value() -> Result<()> {
        use clap::Parser;
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let mut on_disk = Config::default();
        on_disk.top = 0;
        on_disk.save(&config_path)?;

        // a valid flag repairs the bad file value; the merged result passes
        let cli_args = CliArgs::parse_from(["funcsize", "repo", "-n", "3"]);
        let config = Config::from_cli_and_file(&cli_args, Some(config_path))?;
        assert_eq!(config.top, 3);
        Ok(())
    }

    #[test]
    fn test_validate_bounds() {
        assert!(Config::default().validate().is_ok());
        assert!(Config { jobs: 0, ..Config::default() }.validate().is_err());
        assert!(Config { top: 0, ..Config::default() }.validate().is_err());
        assert!(Config { min_size: 0, ..Config::default() }.validate().is_err());
    }

    #[test]
    fn test_config_serialization_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.output = PathBuf::from("custom.json");
        config.jobs = 8;

        let toml_str = toml::to_string(&config)?;
        let parsed_config: Config = toml::from_str(&toml_str)?;

        assert_eq!(config, parsed_config);
        Ok(())
    }

    #[test]
    fn test_config_load_nonexistent_creates_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load(Some(config_path.clone()))?;

        assert_eq!(config.version, 1);
        assert_eq!(config.top, 5);
        assert!(config_path.exists());

        Ok(())
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.min_size = 10;
        config.clone_timeout_secs = 60;

        config.save(&config_path)?;
        let loaded_config = Config::load(Some(config_path))?;

        assert_eq!(config.min_size, loaded_config.min_size);
        assert_eq!(config.clone_timeout_secs, loaded_config.clone_timeout_secs);

        Ok(())
    }

    #[test]
    fn test_cli_override() -> Result<()> {
        use clap::Parser;
        let cli_args = CliArgs::parse_from(["funcsize", "repo", "-j", "16", "-o", "cli.json"]);

        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let original_config = Config { jobs: 2, ..Config::default() };
        original_config.save(&config_path)?;

        let final_config = Config::from_cli_and_file(&cli_args, Some(config_path))?;
        assert_eq!(final_config.jobs, 16);
        assert_eq!(final_config.output, PathBuf::from("cli.json"));
        // untouched values come from the file
        assert_eq!(final_config.top, 5);

        Ok(())
    }

    #[test]
    fn test_get_default_config_path() -> Result<()> {
        let path = get_default_config_path()?;
        assert!(path.ends_with("funcsize.toml"));
        Ok(())
    }
}
