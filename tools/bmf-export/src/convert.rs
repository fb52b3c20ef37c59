//! Scene conversion pipeline
//!
//! import -> flatten -> resolve materials -> assemble -> write. Each step
//! runs to completion before the next; a precondition violation anywhere
//! aborts the run before the output file is touched.

use anyhow::{Context, Result};
use bmf_common::SceneData;
use std::path::Path;

use crate::assemble::{ScalePolicy, assemble_scene};
use crate::flatten::flatten_scene;
use crate::formats::write_scene_file;
use crate::import::{ImportScene, load_scene};
use crate::material::{ResolveOptions, resolve_materials};
use crate::resolve::TextureResolver;

/// Settings for one conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub resolve: ResolveOptions,
    /// Overrides the scale policy when set
    pub scale: Option<f32>,
    pub scale_policy: ScalePolicy,
}

/// Convert an already imported scene
///
/// `source` is the file the scene came from: its directory is where texture
/// references are looked up, and its extension picks the scale correction.
pub fn convert_import_scene(
    import: &ImportScene,
    source: &Path,
    resolver: &mut dyn TextureResolver,
    options: &ConvertOptions,
) -> Result<SceneData> {
    // Structural problems are fatal, so find them before any resolver prompt
    let raw_meshes = flatten_scene(import)
        .with_context(|| format!("Invalid scene structure in {:?}", source))?;

    let base_dir = match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let materials = resolve_materials(&import.materials, base_dir, resolver, &options.resolve);

    let transform = options.scale_policy.scene_transform(source, options.scale);
    let scene = assemble_scene(raw_meshes, materials, transform)
        .with_context(|| format!("Failed to assemble {:?}", source))?;
    Ok(scene)
}

/// Import and convert a scene file to in-memory scene data
pub fn convert_scene_to_memory(
    input: &Path,
    resolver: &mut dyn TextureResolver,
    options: &ConvertOptions,
) -> Result<SceneData> {
    let import = load_scene(input)?;
    tracing::debug!(
        "Imported {:?}: {} meshes, {} materials",
        input,
        import.meshes.len(),
        import.materials.len()
    );
    convert_import_scene(&import, input, resolver, options)
}

/// Convert a scene file to a `.bmf` file
pub fn convert_scene(
    input: &Path,
    output: &Path,
    resolver: &mut dyn TextureResolver,
    options: &ConvertOptions,
) -> Result<SceneData> {
    let scene = convert_scene_to_memory(input, resolver, options)?;
    write_scene_file(output, &scene)?;

    tracing::info!(
        "Converted scene: {} meshes, {} vertices, {} triangles, {} materials",
        scene.meshes.len(),
        scene.vertex_count(),
        scene.triangle_count(),
        scene.materials.len()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::import::{Face, ImportMaterial, ImportMesh, ImportNode};
    use crate::resolve::SkipMissing;

    #[test]
    fn test_precondition_checked_before_resolver() {
        let mut mesh = ImportMesh::triangles(vec![[0.0; 3]; 4], &[0, 1, 2], 0);
        mesh.faces.push(Face(vec![0, 1, 2, 3]));
        let import = ImportScene {
            root: ImportNode::new("root").with_meshes([0]),
            meshes: vec![mesh],
            materials: vec![ImportMaterial {
                diffuse_texture: Some("missing.png".into()),
                ..Default::default()
            }],
        };

        let mut calls = 0;
        let mut resolver = |_: &str, _: &Path| {
            calls += 1;
            None
        };
        let err = convert_import_scene(
            &import,
            Path::new("scene.gltf"),
            &mut resolver,
            &ConvertOptions::default(),
        )
        .unwrap_err();
        assert_eq!(calls, 0);
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::NonTriangleFace { face: 1, .. })
        ));
    }

    #[test]
    fn test_scale_follows_source_extension() {
        let import = ImportScene {
            root: ImportNode::new("root").with_meshes([0]),
            meshes: vec![ImportMesh::triangles(vec![[0.0; 3]; 3], &[0, 1, 2], 0)],
            materials: vec![ImportMaterial::default()],
        };
        let options = ConvertOptions {
            resolve: ResolveOptions {
                force_diffuse_map: false,
                force_normal_map: false,
            },
            ..Default::default()
        };

        let fbx = convert_import_scene(&import, Path::new("a.fbx"), &mut SkipMissing, &options)
            .unwrap();
        assert_eq!(fbx.transform, glam::Mat4::from_scale(glam::Vec3::splat(0.1)));

        let gltf = convert_import_scene(&import, Path::new("a.glb"), &mut SkipMissing, &options)
            .unwrap();
        assert_eq!(gltf.transform, glam::Mat4::IDENTITY);
    }
}
