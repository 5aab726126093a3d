//! Asset configuration loader.
//!
//! Loads physical properties from YAML files, so balls, court layouts, and
//! response tuning can be changed without recompiling.
//!
//! ## Directory Structure
//!
//! ```text
//! assets/
//! ├── balls/
//! │   └── streetball.yaml
//! ├── courts/
//! │   └── scale_model.yaml
//! └── tunings/
//!     └── default.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{BallProperties, CourtLayout, Tuning};

/// Error type for asset loading operations.
#[derive(Debug)]
pub enum AssetError {
    IoError(std::io::Error),
    ParseError(serde_yaml::Error),
    NotFound(String),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::IoError(e) => write!(f, "IO error: {}", e),
            AssetError::ParseError(e) => write!(f, "YAML parse error: {}", e),
            AssetError::NotFound(name) => write!(f, "asset not found: {}", name),
        }
    }
}

impl std::error::Error for AssetError {}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        AssetError::IoError(err)
    }
}

impl From<serde_yaml::Error> for AssetError {
    fn from(err: serde_yaml::Error) -> Self {
        AssetError::ParseError(err)
    }
}

/// Asset loader with a configurable base directory.
pub struct AssetLoader {
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new loader with the given base path.
    ///
    /// The base path should contain `balls/`, `courts/`, and `tunings/`
    /// subdirectories.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a ball by name (without .yaml extension).
    pub fn load_ball(&self, name: &str) -> Result<BallProperties, AssetError> {
        self.load(name, "balls")
    }

    /// Load a court layout by name.
    pub fn load_court(&self, name: &str) -> Result<CourtLayout, AssetError> {
        self.load(name, "courts")
    }

    /// Load a tuning profile by name.
    pub fn load_tuning(&self, name: &str) -> Result<Tuning, AssetError> {
        self.load(name, "tunings")
    }

    /// List all available balls.
    pub fn list_balls(&self) -> Result<Vec<String>, AssetError> {
        self.list("balls")
    }

    /// List all available courts.
    pub fn list_courts(&self) -> Result<Vec<String>, AssetError> {
        self.list("courts")
    }

    /// List all available tuning profiles.
    pub fn list_tunings(&self) -> Result<Vec<String>, AssetError> {
        self.list("tunings")
    }

    fn load<T: serde::de::DeserializeOwned>(
        &self,
        name: &str,
        subdir: &str,
    ) -> Result<T, AssetError> {
        let path = self.base_path.join(subdir).join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(AssetError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    fn list(&self, subdir: &str) -> Result<Vec<String>, AssetError> {
        let path = self.base_path.join(subdir);
        if !path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if name.ends_with(".yaml") {
                names.push(name.trim_end_matches(".yaml").to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn get_assets_path() -> PathBuf {
        // Find the assets directory relative to the manifest.
        let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(manifest_dir).join("..").join("assets")
    }

    #[test]
    fn test_load_existing_ball() {
        let loader = AssetLoader::new(get_assets_path());
        let result = loader.load_ball("streetball");

        assert!(result.is_ok(), "should load streetball: {:?}", result.err());
        let ball = result.unwrap();
        assert!(ball.radius > 0.0);
        assert!(ball.mass > 0.0);
        assert!(ball.gravity.y < 0.0, "gravity should pull downward");
    }

    #[test]
    fn test_load_nonexistent_ball() {
        let loader = AssetLoader::new(get_assets_path());
        let result = loader.load_ball("nonexistent_ball_xyz");

        assert!(result.is_err());
        match result {
            Err(AssetError::NotFound(name)) => {
                assert_eq!(name, "nonexistent_ball_xyz");
            }
            _ => panic!("expected NotFound error"),
        }
    }

    #[test]
    fn test_load_court() {
        let loader = AssetLoader::new(get_assets_path());
        let result = loader.load_court("scale_model");

        assert!(result.is_ok(), "should load scale_model: {:?}", result.err());
        let court = result.unwrap();
        assert!(court.rim_radius > 0.0);
        assert!(court.half_length > court.rim_inset);
    }

    #[test]
    fn test_load_tuning() {
        let loader = AssetLoader::new(get_assets_path());
        let result = loader.load_tuning("default");

        assert!(result.is_ok(), "should load default: {:?}", result.err());
        let tuning = result.unwrap();
        assert!(tuning.damping > 0.0 && tuning.damping <= 1.0);
    }

    #[test]
    fn test_list_balls() {
        let loader = AssetLoader::new(get_assets_path());
        let result = loader.list_balls();

        assert!(result.is_ok());
        assert!(result.unwrap().contains(&"streetball".to_string()));
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let loader = AssetLoader::new("/nonexistent/base/path");
        assert!(loader.list_courts().unwrap().is_empty());
    }
}
