//! glTF fixtures written programmatically for integration tests
//!
//! Vertex data goes into a `.bin` buffer next to the `.gltf` file; the test
//! supplies the meshes/nodes/materials part of the JSON.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;

#[derive(Default)]
pub struct GltfFixture {
    bin: Vec<u8>,
    views: Vec<String>,
    accessors: Vec<String>,
}

impl GltfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_view(&mut self, bytes: &[u8], target: u32) -> usize {
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        self.views.push(format!(
            r#"{{"buffer":0,"byteOffset":{},"byteLength":{},"target":{}}}"#,
            offset,
            bytes.len(),
            target
        ));
        self.views.len() - 1
    }

    /// POSITION accessor, with the min/max glTF requires
    pub fn positions(&mut self, positions: &[[f32; 3]]) -> usize {
        let bytes: Vec<u8> = positions
            .iter()
            .flatten()
            .flat_map(|f| f.to_le_bytes())
            .collect();
        let view = self.push_view(&bytes, ARRAY_BUFFER);

        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in positions {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        self.accessors.push(format!(
            r#"{{"bufferView":{},"componentType":{},"count":{},"type":"VEC3","min":{:?},"max":{:?}}}"#,
            view,
            FLOAT,
            positions.len(),
            min,
            max
        ));
        self.accessors.len() - 1
    }

    pub fn uvs(&mut self, uvs: &[[f32; 2]]) -> usize {
        let bytes: Vec<u8> = uvs.iter().flatten().flat_map(|f| f.to_le_bytes()).collect();
        let view = self.push_view(&bytes, ARRAY_BUFFER);
        self.accessors.push(format!(
            r#"{{"bufferView":{},"componentType":{},"count":{},"type":"VEC2"}}"#,
            view,
            FLOAT,
            uvs.len()
        ));
        self.accessors.len() - 1
    }

    pub fn indices(&mut self, indices: &[u32]) -> usize {
        let bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        let view = self.push_view(&bytes, ELEMENT_ARRAY_BUFFER);
        self.accessors.push(format!(
            r#"{{"bufferView":{},"componentType":{},"count":{},"type":"SCALAR"}}"#,
            view,
            UNSIGNED_INT,
            indices.len()
        ));
        self.accessors.len() - 1
    }

    /// Write `<name>.gltf` and `<name>.bin` into `dir`
    ///
    /// `body` is the rest of the top-level JSON object (meshes, nodes, ...),
    /// without surrounding braces.
    pub fn write(&self, dir: &Path, name: &str, body: &str) -> PathBuf {
        let bin_name = format!("{}.bin", name);
        std::fs::write(dir.join(&bin_name), &self.bin).expect("Failed to write .bin");

        let json = format!(
            r#"{{"asset":{{"version":"2.0"}},"buffers":[{{"uri":"{}","byteLength":{}}}],"bufferViews":[{}],"accessors":[{}],{}}}"#,
            bin_name,
            self.bin.len(),
            self.views.join(","),
            self.accessors.join(","),
            body
        );
        let path = dir.join(format!("{}.gltf", name));
        std::fs::write(&path, json).expect("Failed to write .gltf");
        path
    }
}

pub const QUAD: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];
pub const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
pub const TRIANGLE: [[f32; 3]; 3] = [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]];
pub const TRIANGLE_UVS: [[f32; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

/// Parent node with two primitives (a 4-vertex quad, and a 3-vertex triangle
/// using a material whose only map is `brick.png`), plus a child node holding
/// one triangle without UVs, translated by (0, 0, 5)
pub fn write_parent_child_scene(dir: &Path) -> PathBuf {
    let mut f = GltfFixture::new();
    let a_pos = f.positions(&QUAD);
    let a_uv = f.uvs(&QUAD_UVS);
    let a_idx = f.indices(&[0, 1, 2, 2, 3, 0]);
    let b_pos = f.positions(&TRIANGLE);
    let b_uv = f.uvs(&TRIANGLE_UVS);
    let b_idx = f.indices(&[0, 1, 2]);
    let c_pos = f.positions(&TRIANGLE);
    let c_idx = f.indices(&[0, 1, 2]);

    let body = format!(
        r#""materials":[
            {{"name":"plain","pbrMetallicRoughness":{{"baseColorFactor":[0.5,0.5,0.5,1.0]}}}},
            {{"name":"brick","pbrMetallicRoughness":{{"baseColorTexture":{{"index":0}}}}}}
        ],
        "images":[{{"uri":"brick.png"}}],
        "textures":[{{"source":0}}],
        "meshes":[
            {{"primitives":[
                {{"attributes":{{"POSITION":{a_pos},"TEXCOORD_0":{a_uv}}},"indices":{a_idx},"material":0}},
                {{"attributes":{{"POSITION":{b_pos},"TEXCOORD_0":{b_uv}}},"indices":{b_idx},"material":1}}
            ]}},
            {{"primitives":[
                {{"attributes":{{"POSITION":{c_pos}}},"indices":{c_idx},"material":0}}
            ]}}
        ],
        "nodes":[
            {{"name":"parent","mesh":0,"children":[1]}},
            {{"name":"child","mesh":1,"translation":[0.0,0.0,5.0]}}
        ],
        "scenes":[{{"nodes":[0]}}],
        "scene":0"#
    );
    f.write(dir, "scene", &body)
}
