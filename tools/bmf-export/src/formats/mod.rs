//! `.bmf` output
//!
//! Re-exports the format from bmf-common and adds the atomic file write used
//! by every conversion path.

pub use bmf_common::formats::*;

use anyhow::{Context, Result};
use bmf_common::SceneData;
use std::io::BufWriter;
use std::path::Path;

/// Write a complete `.bmf` file, replacing `output` only on success
///
/// The scene is encoded into a temporary file next to `output`, which is
/// renamed over it once everything is flushed. On failure the temporary
/// file is removed and `output` is left as it was.
pub fn write_scene_file(output: &Path, scene: &SceneData) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;

    let mut writer = BufWriter::new(tmp);
    write_scene(&mut writer, scene).with_context(|| format!("Failed to encode {:?}", output))?;
    let tmp = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .with_context(|| format!("Failed to flush {:?}", output))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync {:?}", output))?;

    tmp.persist(output)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write output: {:?}", output))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmf_common::{Material, MeshBuffer, Vertex, read_scene_file};
    use tempfile::tempdir;

    fn scene() -> SceneData {
        let black = [0.0, 0.0, 0.0, 1.0];
        let mut scene = SceneData::new();
        scene
            .materials
            .push(Material::new([1.0; 4], black, black, 1.0, None, None));
        scene.meshes.push(MeshBuffer::new(
            vec![
                Vertex::default(),
                Vertex::new(1.0, 0.0, 0.0, 1.0, 0.0),
                Vertex::new(0.0, 1.0, 0.0, 0.0, 1.0),
            ],
            vec![0, 1, 2],
            0,
        ));
        scene
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/scene.bmf");
        write_scene_file(&path, &scene()).unwrap();
        assert_eq!(read_scene_file(&path).unwrap(), scene());
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.bmf");
        std::fs::write(&path, b"previous").unwrap();

        let mut bad = scene();
        bad.meshes[0].material_index = 4;
        assert!(write_scene_file(&path, &bad).is_err());

        assert_eq!(std::fs::read(&path).unwrap(), b"previous");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary file should be cleaned up");
    }
}
