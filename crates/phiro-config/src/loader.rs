// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones win:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, PhiroConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "phiro_configuration.toml";

/// Find the Phiro configuration file
///
/// Search order:
/// 1. `PHIRO_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("PHIRO_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by PHIRO_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet PHIRO_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Call [`crate::validate_config`] on the result before using it.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<PhiroConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: PhiroConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `PHIRO_SERIAL_PORT` -> `connection.serial_port`
/// - `PHIRO_RECEIVE_BUFFER_SIZE` -> `connection.receive_buffer_size`
/// - `PHIRO_PWM_MODE` -> `device.pwm_mode`
/// - `PHIRO_LOG_LEVEL` -> `logging.level`
/// - `PHIRO_LOG_DIR` -> `logging.log_dir`
pub fn apply_environment_overrides(config: &mut PhiroConfig) {
    if let Ok(value) = env::var("PHIRO_SERIAL_PORT") {
        config.connection.serial_port = value;
    }
    if let Ok(value) = env::var("PHIRO_RECEIVE_BUFFER_SIZE") {
        if let Ok(size) = value.parse::<usize>() {
            config.connection.receive_buffer_size = size;
        }
    }
    if let Ok(value) = env::var("PHIRO_PWM_MODE") {
        if let Ok(mode) = value.parse::<u8>() {
            config.device.pwm_mode = mode;
        }
    }
    if let Ok(value) = env::var("PHIRO_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("PHIRO_LOG_DIR") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Parsed arguments, e.g. `{"serial_port": "/dev/ttyACM0", "log_level": "debug"}`
pub fn apply_cli_overrides(config: &mut PhiroConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("serial_port") {
        config.connection.serial_port = value.clone();
    }
    if let Some(value) = cli_args.get("pwm_mode") {
        if let Ok(mode) = value.parse::<u8>() {
            config.device.pwm_mode = mode;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("PHIRO_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("PHIRO_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("PHIRO_CONFIG_PATH", "/definitely/not/here.toml");
        let result = find_config_file();
        env::remove_var("PHIRO_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_partial_config_keeps_defaults() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[device.pins]").unwrap();
        writeln!(file, "speaker = 13").unwrap();
        writeln!(file, "motor_right_backward = 3").unwrap();
        writeln!(file, "[connection]").unwrap();
        writeln!(file, "receive_buffer_size = 128").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.device.pins.speaker, 13);
        assert_eq!(config.device.pins.motor_right_backward, 3);
        assert_eq!(config.device.pins.rgb_red_left, 4);
        assert_eq!(config.device.pwm_mode, 3);
        assert_eq!(config.connection.receive_buffer_size, 128);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[device\npwm_mode = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = PhiroConfig::default();

        env::set_var("PHIRO_SERIAL_PORT", "/dev/ttyACM1");
        env::set_var("PHIRO_PWM_MODE", "not-a-number");
        env::set_var("PHIRO_LOG_LEVEL", "debug");

        apply_environment_overrides(&mut config);

        env::remove_var("PHIRO_SERIAL_PORT");
        env::remove_var("PHIRO_PWM_MODE");
        env::remove_var("PHIRO_LOG_LEVEL");

        assert_eq!(config.connection.serial_port, "/dev/ttyACM1");
        assert_eq!(config.device.pwm_mode, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[connection]").unwrap();
        writeln!(file, "serial_port = \"/dev/file\"").unwrap();
        writeln!(file, "[logging]").unwrap();
        writeln!(file, "level = \"warn\"").unwrap();

        env::set_var("PHIRO_SERIAL_PORT", "/dev/env");
        env::set_var("PHIRO_LOG_LEVEL", "error");

        let mut cli_args = HashMap::new();
        cli_args.insert("serial_port".to_string(), "/dev/cli".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("PHIRO_SERIAL_PORT");
        env::remove_var("PHIRO_LOG_LEVEL");

        // CLI wins for the port, env wins for the level (no CLI override)
        assert_eq!(config.connection.serial_port, "/dev/cli");
        assert_eq!(config.logging.level, "error");
    }
}
