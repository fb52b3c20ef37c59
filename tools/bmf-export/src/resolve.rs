//! Texture resolution strategies
//!
//! When a material references a texture that is not on disk (or has no
//! reference but the map is required), the material resolver asks a
//! [`TextureResolver`] for a substitute. That call is the only place a
//! conversion can wait on outside input, such as a user picking a file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Supplies a substitute for a texture that could not be found
///
/// Called synchronously, at most once per missing map per material.
/// Returning `None` stores the map as absent.
pub trait TextureResolver {
    fn resolve(&mut self, missing_reference: &str, search_dir: &Path) -> Option<PathBuf>;
}

impl<F> TextureResolver for F
where
    F: FnMut(&str, &Path) -> Option<PathBuf>,
{
    fn resolve(&mut self, missing_reference: &str, search_dir: &Path) -> Option<PathBuf> {
        self(missing_reference, search_dir)
    }
}

/// Leaves every missing map absent
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipMissing;

impl TextureResolver for SkipMissing {
    fn resolve(&mut self, missing_reference: &str, _search_dir: &Path) -> Option<PathBuf> {
        tracing::debug!("Skipping missing texture {:?}", missing_reference);
        None
    }
}

/// Stores the original reference unchanged, even though the file is missing
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepReference;

impl TextureResolver for KeepReference {
    fn resolve(&mut self, missing_reference: &str, _search_dir: &Path) -> Option<PathBuf> {
        Some(PathBuf::from(missing_reference))
    }
}

/// Asks the user to locate the file with a native open dialog
///
/// Cancelling the dialog keeps the original reference.
#[cfg(feature = "dialog")]
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDialog;

#[cfg(feature = "dialog")]
impl TextureResolver for FileDialog {
    fn resolve(&mut self, missing_reference: &str, search_dir: &Path) -> Option<PathBuf> {
        tracing::info!("Waiting for a replacement for {:?}", missing_reference);
        let picked = rfd::FileDialog::new()
            .set_title(format!("Locate texture: {}", missing_reference))
            .set_directory(search_dir)
            .add_filter("Images", &["png", "jpg", "jpeg", "tga", "bmp", "dds"])
            .pick_file();

        match picked {
            Some(path) => Some(path),
            None => {
                tracing::warn!("Dialog cancelled, keeping {:?}", missing_reference);
                Some(PathBuf::from(missing_reference))
            }
        }
    }
}

/// Which strategy to use, as named on the command line and in manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTexturePolicy {
    /// Ask with a file dialog
    Dialog,
    /// Store the map as absent
    Skip,
    /// Store the original reference
    Keep,
}

impl Default for MissingTexturePolicy {
    fn default() -> Self {
        if cfg!(feature = "dialog") {
            MissingTexturePolicy::Dialog
        } else {
            MissingTexturePolicy::Skip
        }
    }
}

impl FromStr for MissingTexturePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dialog" => Ok(MissingTexturePolicy::Dialog),
            "skip" => Ok(MissingTexturePolicy::Skip),
            "keep" => Ok(MissingTexturePolicy::Keep),
            other => Err(format!(
                "unknown missing-texture policy '{}' (use dialog, skip or keep)",
                other
            )),
        }
    }
}

impl MissingTexturePolicy {
    pub fn resolver(self) -> anyhow::Result<Box<dyn TextureResolver>> {
        Ok(match self {
            MissingTexturePolicy::Skip => Box::new(SkipMissing),
            MissingTexturePolicy::Keep => Box::new(KeepReference),
            #[cfg(feature = "dialog")]
            MissingTexturePolicy::Dialog => Box::new(FileDialog),
            #[cfg(not(feature = "dialog"))]
            MissingTexturePolicy::Dialog => {
                anyhow::bail!("The file dialog is not available: build with the `dialog` feature")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_resolver() {
        let mut calls = Vec::new();
        let mut resolver = |reference: &str, dir: &Path| {
            calls.push((reference.to_string(), dir.to_path_buf()));
            Some(dir.join("found.png"))
        };

        let out = resolver.resolve("lost.png", Path::new("/models"));
        assert_eq!(out, Some(PathBuf::from("/models/found.png")));
        assert_eq!(calls, vec![("lost.png".to_string(), PathBuf::from("/models"))]);
    }

    #[test]
    fn test_builtin_strategies() {
        assert_eq!(SkipMissing.resolve("a.png", Path::new(".")), None);
        assert_eq!(
            KeepReference.resolve("a.png", Path::new(".")),
            Some(PathBuf::from("a.png"))
        );
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("Skip".parse(), Ok(MissingTexturePolicy::Skip));
        assert_eq!("dialog".parse(), Ok(MissingTexturePolicy::Dialog));
        assert!("ask".parse::<MissingTexturePolicy>().is_err());
    }

    #[test]
    fn test_policy_from_toml() {
        #[derive(Deserialize)]
        struct Options {
            missing_texture: MissingTexturePolicy,
        }
        let options: Options = toml::from_str(r#"missing_texture = "keep""#).unwrap();
        assert_eq!(options.missing_texture, MissingTexturePolicy::Keep);
        assert!(options.missing_texture.resolver().is_ok());
    }
}
