// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Startup configuration loading.

use std::path::Path;

use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::Result;
use tracing::info;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "SCANWERK_CONFIG";

/// Load the config named by `SCANWERK_CONFIG`, or defaults when unset.
///
/// A file that is named but unreadable or malformed is an error rather than
/// a silent fallback.
pub fn load_config() -> Result<ScanConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_config_from(Path::new(&path)),
        None => Ok(ScanConfig::default()),
    }
}

pub fn load_config_from(path: &Path) -> Result<ScanConfig> {
    let data = std::fs::read_to_string(path)?;
    let config: ScanConfig = serde_json::from_str(&data)?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::error::ScanError;
    use std::io::Write;

    #[test]
    fn file_overrides_selected_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"discovery_window_ms": 2000, "max_polls": 10}}"#).unwrap();

        let cfg = load_config_from(file.path()).unwrap();
        assert_eq!(cfg.discovery_window_ms, 2_000);
        assert_eq!(cfg.max_polls, 10);
        assert_eq!(cfg.read_timeout_ms, ScanConfig::default().read_timeout_ms);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ScanError::Io(_)));
    }

    #[test]
    fn malformed_file_is_serialization_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_config_from(file.path()).unwrap_err();
        assert!(matches!(err, ScanError::Serialization(_)));
    }
}
