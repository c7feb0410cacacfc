use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Thumbnail dimension is not 0
/// - Audio format is not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.thumbnail.max_dimension == 0 {
        return Err(ConfigError::ValidationError(
            "thumbnail.max_dimension cannot be 0".to_string(),
        ));
    }

    if config.ytdlp.audio_format.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "ytdlp.audio_format cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_dimension_fails() {
        let mut config = Config::default();
        config.thumbnail.max_dimension = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_audio_format_fails() {
        let mut config = Config::default();
        config.ytdlp.audio_format = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
