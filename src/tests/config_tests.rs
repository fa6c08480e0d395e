#[cfg(test)]
mod tests {
    use crate::config::{
        Config, ConfigError, DEFAULT_SPEED, load_config_from_path, save_config_to_path,
    };
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.speed, DEFAULT_SPEED);
        assert!(config.show_ghost);
    }

    #[test]
    fn test_speed_multiplier_curve() {
        let mut config = Config::default();

        // Neutral setting leaves the interval untouched
        assert!((config.speed_multiplier() - 1.0).abs() < 1e-6);

        // Slowest setting doubles the interval
        config.speed = 0;
        assert!((config.speed_multiplier() - 2.0).abs() < 1e-6);

        // Fastest setting bottoms out at the 0.35 floor
        config.speed = 100;
        assert!((config.speed_multiplier() - 0.35).abs() < 1e-6);

        config.speed = 75;
        assert!((config.speed_multiplier() - 0.675).abs() < 1e-6);
    }

    #[test]
    fn test_speed_multiplier_clamps_out_of_range_values() {
        let config = Config {
            speed: 200,
            ..Config::default()
        };
        assert!((config.speed_multiplier() - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_load_nonexistent_config_creates_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");

        let config = load_config_from_path(&config_path).expect("Failed to load default config");

        assert!(config_path.exists(), "Config file should have been created");
        assert_eq!(config.speed, DEFAULT_SPEED);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");

        let config = Config {
            speed: 80,
            show_ghost: false,
        };
        save_config_to_path(&config, &config_path).expect("Failed to save config");

        let loaded = load_config_from_path(&config_path).expect("Failed to load config");
        assert_eq!(loaded.speed, 80);
        assert!(!loaded.show_ghost);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");

        // A non-numeric speed must not parse; the caller falls back to
        // the documented default instead
        fs::write(&config_path, "speed = \"fast\"").expect("Failed to write invalid config");

        match load_config_from_path(&config_path) {
            Err(ConfigError::Parse(_)) => {}
            Ok(_) => panic!("Expected error when loading invalid config"),
            Err(e) => panic!("Unexpected error type: {e:?}"),
        }
    }

    #[test]
    fn test_partial_config_fills_in_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");

        fs::write(&config_path, "speed = 65\n").expect("Failed to write partial config");

        let loaded = load_config_from_path(&config_path).expect("Failed to load partial config");
        assert_eq!(loaded.speed, 65);
        assert!(loaded.show_ghost);
    }

    #[test]
    fn test_env_var_override_and_speed_adjustment() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("override.toml");

        unsafe {
            std::env::set_var("BLOCKFALL_CONFIG", config_path.to_str().unwrap());
        }

        let saved = crate::config::adjust_speed(2);
        let loaded = load_config_from_path(&config_path).expect("Failed to load config");
        assert_eq!(loaded.speed, saved);

        // Clamped at the bottom of the range
        for _ in 0..30 {
            crate::config::adjust_speed(-2);
        }
        assert_eq!(crate::config::CONFIG.read().unwrap().speed, 0);

        unsafe {
            std::env::remove_var("BLOCKFALL_CONFIG");
        }
    }
}
