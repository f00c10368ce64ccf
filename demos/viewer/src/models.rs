// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Procedural demo models.
//!
//! A real viewer feeds the store from subdivision tables built by an
//! external library; this demo generates a spherified cube and a torus
//! at a few refinement depths so every renderer path has geometry to
//! draw.

use glam::Vec3;
use std::collections::HashMap;
use tessella_core::model::{GpuModel, LineMesh, ModelStore, PtexBindings, RefinedMesh};
use tessella_core::pipeline::IndexFormat;
use tessella_infra::WgpuSurfaceDevice;

/// Refinement depths generated per model.
const LEVELS: u32 = 4;

pub struct ViewerStore {
    models: HashMap<String, GpuModel>,
}

impl ViewerStore {
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.keys().cloned().collect();
        names.sort();
        names
    }
}

impl ModelStore for ViewerStore {
    fn model(&self, name: &str) -> Option<&GpuModel> {
        self.models.get(name)
    }
}

/// Uploads the demo models and returns the backing store.
pub fn build_store(device: &WgpuSurfaceDevice) -> ViewerStore {
    let mut models = HashMap::new();
    models.insert("cube".to_string(), build_cube(device));
    models.insert("torus".to_string(), build_torus(device));
    ViewerStore { models }
}

struct LevelMesh {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

fn build_cube(device: &WgpuSurfaceDevice) -> GpuModel {
    let mut level = cube_cage();
    let mut levels = Vec::new();
    for depth in 0..LEVELS {
        let mesh = if depth == 0 {
            LevelMesh {
                positions: level.positions.clone(),
                triangles: level.triangles.clone(),
            }
        } else {
            level = subdivide(&level);
            // Each refinement rounds the cage toward its limit sphere.
            LevelMesh {
                positions: level.positions.iter().map(|p| p.normalize() * 1.3).collect(),
                triangles: level.triangles.clone(),
            }
        };
        levels.push(mesh);
    }
    upload_model(device, "cube", &levels)
}

fn build_torus(device: &WgpuSurfaceDevice) -> GpuModel {
    let levels: Vec<LevelMesh> = (0..LEVELS)
        .map(|depth| torus(12 << depth.min(2), 8 << depth.min(2)))
        .collect();
    upload_model(device, "torus", &levels)
}

fn upload_model(device: &WgpuSurfaceDevice, name: &str, levels: &[LevelMesh]) -> GpuModel {
    let refined: Vec<RefinedMesh> = levels
        .iter()
        .enumerate()
        .map(|(depth, mesh)| {
            let vertices = interleave_with_normals(&mesh.positions);
            let indices: Vec<u32> = mesh.triangles.iter().flatten().copied().collect();
            RefinedMesh {
                vertex_buffer: device.create_vertex_buffer(
                    &format!("{name}.vertices.l{depth}"),
                    bytemuck::cast_slice(&vertices),
                ),
                index_buffer: device.create_index_buffer(
                    &format!("{name}.indices.l{depth}"),
                    bytemuck::cast_slice(&indices),
                ),
                index_count: indices.len() as u32,
                index_format: IndexFormat::Uint32,
            }
        })
        .collect();

    // Line work reuses the refined vertex buffers: the control cage from
    // level 0, approximate Bezier edges from level 1, and the dense
    // wireframe from the deepest level.
    let edge_mesh = |depth: usize| {
        let edges = edge_indices(&levels[depth].triangles);
        LineMesh {
            vertex_buffer: refined[depth].vertex_buffer,
            index_buffer: device.create_index_buffer(
                &format!("{name}.edges.l{depth}"),
                bytemuck::cast_slice(&edges),
            ),
            index_count: edges.len() as u32,
            index_format: IndexFormat::Uint32,
        }
    };
    let deepest = levels.len() - 1;

    GpuModel {
        name: name.to_string(),
        control_vertex_buffer: refined[0].vertex_buffer,
        patch_batches: Vec::new(),
        wireframe_edges: Some(edge_mesh(deepest)),
        control_edges: Some(edge_mesh(0)),
        bezier_edges: Some(edge_mesh(1.min(deepest))),
        refined,
        ptex: PtexBindings::default(),
    }
}

fn cube_cage() -> LevelMesh {
    let positions = vec![
        Vec3::new(-1.0, -1.0, -1.0),
        Vec3::new(1.0, -1.0, -1.0),
        Vec3::new(1.0, 1.0, -1.0),
        Vec3::new(-1.0, 1.0, -1.0),
        Vec3::new(-1.0, -1.0, 1.0),
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        Vec3::new(-1.0, 1.0, 1.0),
    ];
    let quads: [[u32; 4]; 6] = [
        [0, 1, 2, 3],
        [5, 4, 7, 6],
        [4, 0, 3, 7],
        [1, 5, 6, 2],
        [3, 2, 6, 7],
        [4, 5, 1, 0],
    ];
    let triangles = quads
        .iter()
        .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
        .collect();
    LevelMesh {
        positions,
        triangles,
    }
}

fn torus(segments_u: u32, segments_v: u32) -> LevelMesh {
    let major = 1.1;
    let minor = 0.45;
    let mut positions = Vec::new();
    for u in 0..segments_u {
        let theta = u as f32 / segments_u as f32 * std::f32::consts::TAU;
        for v in 0..segments_v {
            let phi = v as f32 / segments_v as f32 * std::f32::consts::TAU;
            let ring = major + minor * phi.cos();
            positions.push(Vec3::new(
                ring * theta.cos(),
                minor * phi.sin(),
                ring * theta.sin(),
            ));
        }
    }
    let mut triangles = Vec::new();
    for u in 0..segments_u {
        for v in 0..segments_v {
            let a = u * segments_v + v;
            let b = ((u + 1) % segments_u) * segments_v + v;
            let c = ((u + 1) % segments_u) * segments_v + (v + 1) % segments_v;
            let d = u * segments_v + (v + 1) % segments_v;
            triangles.push([a, b, c]);
            triangles.push([a, c, d]);
        }
    }
    LevelMesh {
        positions,
        triangles,
    }
}

/// Midpoint subdivision: each triangle splits into four, midpoints
/// de-duplicated per edge.
fn subdivide(mesh: &LevelMesh) -> LevelMesh {
    let mut positions = mesh.positions.clone();
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            let index = positions.len() as u32;
            let mid = (positions[a as usize] + positions[b as usize]) * 0.5;
            positions.push(mid);
            index
        })
    };
    let mut triangles = Vec::with_capacity(mesh.triangles.len() * 4);
    for [a, b, c] in &mesh.triangles {
        let ab = midpoint(*a, *b, &mut positions);
        let bc = midpoint(*b, *c, &mut positions);
        let ca = midpoint(*c, *a, &mut positions);
        triangles.push([*a, ab, ca]);
        triangles.push([ab, *b, bc]);
        triangles.push([ca, bc, *c]);
        triangles.push([ab, bc, ca]);
    }
    LevelMesh {
        positions,
        triangles,
    }
}

/// Interleaves positions with radial normals into the layout the
/// surface pipelines consume.
fn interleave_with_normals(positions: &[Vec3]) -> Vec<f32> {
    let mut vertices = Vec::with_capacity(positions.len() * 6);
    for position in positions {
        let normal = position.normalize_or_zero();
        vertices.extend_from_slice(&[
            position.x, position.y, position.z, normal.x, normal.y, normal.z,
        ]);
    }
    vertices
}

/// Unique undirected edges of a triangle list, as a line list.
fn edge_indices(triangles: &[[u32; 3]]) -> Vec<u32> {
    let mut seen = HashMap::new();
    let mut edges = Vec::new();
    for [a, b, c] in triangles {
        for (x, y) in [(*a, *b), (*b, *c), (*c, *a)] {
            let key = (x.min(y), x.max(y));
            if seen.insert(key, ()).is_none() {
                edges.push(key.0);
                edges.push(key.1);
            }
        }
    }
    edges
}
