//! Manifest parsing and batch build
//!
//! Parses scenes.toml and converts every listed scene:
//!
//! ```toml
//! [output]
//! dir = "assets/"
//!
//! [options]
//! missing_texture = "skip"
//! force_normal_map = false
//!
//! [scenes]
//! ship = "models/ship.fbx"
//! tower = { path = "models/tower.glb", scale = 0.5 }
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::convert::{ConvertOptions, convert_scene};
use crate::formats::BMF_EXT;
use crate::import::is_supported;
use crate::material::ResolveOptions;
use crate::resolve::MissingTexturePolicy;

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub scenes: BTreeMap<String, SceneEntry>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("assets/")
}

/// Defaults applied to every scene
#[derive(Debug, Deserialize)]
pub struct OptionsConfig {
    #[serde(default)]
    pub missing_texture: MissingTexturePolicy,
    #[serde(default = "default_true")]
    pub force_diffuse_map: bool,
    #[serde(default = "default_true")]
    pub force_normal_map: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            missing_texture: MissingTexturePolicy::default(),
            force_diffuse_map: true,
            force_normal_map: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SceneEntry {
    Simple(PathBuf),
    Detailed {
        path: PathBuf,
        #[serde(default)]
        scale: Option<f32>,
        #[serde(default)]
        force_diffuse_map: Option<bool>,
        #[serde(default)]
        force_normal_map: Option<bool>,
    },
}

impl SceneEntry {
    pub fn path(&self) -> &Path {
        match self {
            SceneEntry::Simple(p) => p,
            SceneEntry::Detailed { path, .. } => path,
        }
    }

    pub fn scale(&self) -> Option<f32> {
        match self {
            SceneEntry::Simple(_) => None,
            SceneEntry::Detailed { scale, .. } => *scale,
        }
    }

    /// Per-scene options, falling back to the manifest defaults
    pub fn convert_options(&self, defaults: &OptionsConfig) -> ConvertOptions {
        let (force_diffuse, force_normal) = match self {
            SceneEntry::Simple(_) => (None, None),
            SceneEntry::Detailed {
                force_diffuse_map,
                force_normal_map,
                ..
            } => (*force_diffuse_map, *force_normal_map),
        };
        ConvertOptions {
            resolve: ResolveOptions {
                force_diffuse_map: force_diffuse.unwrap_or(defaults.force_diffuse_map),
                force_normal_map: force_normal.unwrap_or(defaults.force_normal_map),
            },
            scale: self.scale(),
            ..Default::default()
        }
    }
}

impl Manifest {
    /// Source path of an entry, resolved against the manifest directory
    pub fn source_path(&self, entry: &SceneEntry) -> PathBuf {
        self.base_dir.join(entry.path())
    }

    /// Output directory, resolved against the manifest directory
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output.dir)
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    for (name, entry) in &manifest.scenes {
        let source = manifest.source_path(entry);
        if !source.exists() {
            anyhow::bail!("Scene '{}' source not found: {:?}", name, source);
        }
        if !is_supported(&source) {
            anyhow::bail!("Unsupported scene format for '{}': {:?}", name, source);
        }
        if let Some(scale) = entry.scale() {
            if !(scale.is_finite() && scale > 0.0) {
                anyhow::bail!("Scene '{}' has invalid scale {}", name, scale);
            }
        }
    }
    Ok(())
}

/// Build all scenes from a manifest
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<()> {
    validate(manifest)?;

    let output_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => manifest.output_dir(),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut resolver = manifest.options.missing_texture.resolver()?;

    for (name, entry) in &manifest.scenes {
        let source = manifest.source_path(entry);
        let output = output_dir.join(format!("{}.{}", name, BMF_EXT));
        tracing::info!("Converting scene: {} -> {:?}", name, output);

        let options = entry.convert_options(&manifest.options);
        convert_scene(&source, &output, resolver.as_mut(), &options)
            .with_context(|| format!("Failed to convert scene '{}'", name))?;
    }

    tracing::info!("Built {} scenes", manifest.scenes.len());
    Ok(())
}
