//! Material resolution
//!
//! Turns source materials into [`Material`]s, one per source material and in
//! source order, since that order is the material-index space of every mesh.
//! Texture references are checked against the model directory; the
//! [`TextureResolver`] is consulted only for maps that could not be found.

use bmf_common::Material;
use std::path::Path;

use crate::import::ImportMaterial;
use crate::resolve::TextureResolver;

/// Reference passed to the resolver for a required diffuse map with no source
pub const DIFFUSE_PLACEHOLDER: &str = "diffuse_map";
/// Reference passed to the resolver for a required normal map with no source
pub const NORMAL_PLACEHOLDER: &str = "normal_map";

/// Whether a material without a map of a kind still asks the resolver for one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    pub force_diffuse_map: bool,
    pub force_normal_map: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            force_diffuse_map: true,
            force_normal_map: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MapKind {
    Diffuse,
    Normal,
}

impl MapKind {
    fn placeholder(self) -> &'static str {
        match self {
            MapKind::Diffuse => DIFFUSE_PLACEHOLDER,
            MapKind::Normal => NORMAL_PLACEHOLDER,
        }
    }

    fn label(self) -> &'static str {
        match self {
            MapKind::Diffuse => "diffuse",
            MapKind::Normal => "normal",
        }
    }
}

/// Resolve every source material, preserving order
pub fn resolve_materials(
    materials: &[ImportMaterial],
    base_dir: &Path,
    resolver: &mut dyn TextureResolver,
    options: &ResolveOptions,
) -> Vec<Material> {
    materials
        .iter()
        .enumerate()
        .map(|(index, material)| resolve_material(index, material, base_dir, resolver, options))
        .collect()
}

/// Resolve one source material
///
/// Specular is scaled by the shininess strength; the strength itself is not
/// kept. Colors are stored with alpha 1.0.
pub fn resolve_material(
    index: usize,
    material: &ImportMaterial,
    base_dir: &Path,
    resolver: &mut dyn TextureResolver,
    options: &ResolveOptions,
) -> Material {
    let strength = material.shininess_strength;
    let [sr, sg, sb, _] = material.specular;
    let specular = [sr * strength, sg * strength, sb * strength, 1.0];

    let diffuse_map = resolve_map(
        index,
        MapKind::Diffuse,
        material.diffuse_texture.as_deref(),
        options.force_diffuse_map,
        base_dir,
        resolver,
    );
    let normal_map = resolve_map(
        index,
        MapKind::Normal,
        material.normal_texture.as_deref(),
        options.force_normal_map,
        base_dir,
        resolver,
    );

    Material::new(
        material.diffuse,
        specular,
        material.emissive,
        material.shininess,
        diffuse_map,
        normal_map,
    )
}

fn resolve_map(
    material: usize,
    kind: MapKind,
    reference: Option<&str>,
    force: bool,
    base_dir: &Path,
    resolver: &mut dyn TextureResolver,
) -> Option<String> {
    let resolved = match reference.filter(|r| !r.is_empty()) {
        Some(reference) => {
            let reference = reference.replace('\\', "/");
            if base_dir.join(&reference).exists() {
                return Some(reference);
            }
            tracing::warn!(
                "Material {}: {} texture {:?} not found in {:?}",
                material,
                kind.label(),
                reference,
                base_dir
            );
            resolver.resolve(&reference, base_dir)
        }
        None if force => {
            tracing::info!(
                "Material {}: no {} map, asking for one",
                material,
                kind.label()
            );
            // the placeholder names no file; echoing it back means no map
            resolver
                .resolve(kind.placeholder(), base_dir)
                .filter(|path| path != Path::new(kind.placeholder()))
        }
        None => None,
    };

    let stored = resolved.map(|path| match path.strip_prefix(base_dir) {
        Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
        Err(_) => {
            if path.is_absolute() {
                tracing::warn!(
                    "Material {}: {} map {:?} is outside {:?}, storing the absolute path",
                    material,
                    kind.label(),
                    path,
                    base_dir
                );
            }
            path.to_string_lossy().replace('\\', "/")
        }
    });
    match &stored {
        Some(path) if !path.is_empty() => {
            tracing::debug!("Material {}: {} map -> {:?}", material, kind.label(), path)
        }
        _ => tracing::debug!("Material {}: no {} map", material, kind.label()),
    }
    stored.filter(|p| !p.is_empty())
}
