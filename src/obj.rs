use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use glam::{Vec2, Vec3};

use crate::mesh::{MeshData, Vertex};

/// Reads and parses a Wavefront OBJ file from disk.
pub fn load_obj(path: &Path) -> Result<MeshData> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("unable to read {}", path.display()))?;
    load_obj_from_str(&contents).with_context(|| format!("failed to parse OBJ mesh {}", path.display()))
}

/// Parses an OBJ file from memory into an indexed triangle list.
///
/// Polygons are fan-triangulated, negative (relative) indices are resolved,
/// and every distinct position/uv/normal triple becomes one vertex. Normals
/// are generated from the faces when the file does not provide them.
pub fn load_obj_from_str(data: &str) -> Result<MeshData> {
    let mut positions = Vec::new();
    let mut tex_coords = Vec::new();
    let mut normals = Vec::new();
    let mut faces: Vec<[Key; 3]> = Vec::new();

    for (line_no, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "v" => positions.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid vertex on line {}", line_no + 1))?,
            ),
            "vt" => tex_coords.push(
                parse_vec2(parts)
                    .with_context(|| format!("invalid texture coordinate on line {}", line_no + 1))?,
            ),
            "vn" => normals.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid normal on line {}", line_no + 1))?,
            ),
            "f" => {
                let polygon = parse_face(parts)
                    .and_then(|polygon| {
                        polygon
                            .into_iter()
                            .map(|idx| idx.resolve(positions.len(), tex_coords.len(), normals.len()))
                            .collect::<Result<Vec<_>>>()
                    })
                    .with_context(|| format!("invalid face on line {}", line_no + 1))?;
                for i in 1..(polygon.len() - 1) {
                    faces.push([polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(anyhow!("OBJ file does not define any vertices"));
    }

    let mut generate_normals = false;
    let mut lookup: HashMap<Key, u32> = HashMap::new();
    let mut mesh = MeshData::default();

    for face in &faces {
        for &key in face {
            generate_normals |= key.normal.is_none();
            let next_index = mesh.vertices.len() as u32;
            let entry = lookup.entry(key).or_insert_with(|| {
                mesh.vertices.push(Vertex::new(
                    positions[key.position],
                    key.normal.map(|i| normals[i]).unwrap_or(Vec3::ZERO),
                    key.tex_coord
                        .map(|i| flip_v(tex_coords[i]))
                        .unwrap_or(Vec2::ZERO),
                ));
                next_index
            });
            mesh.indices.push(*entry);
        }
    }

    if generate_normals {
        compute_normals(&mut mesh);
    }
    Ok(mesh)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    position: usize,
    tex_coord: Option<usize>,
    normal: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct FaceIndex {
    position: i32,
    tex_coord: i32,
    normal: i32,
}

impl FaceIndex {
    /// Relative indices refer to the elements declared before the face.
    fn resolve(self, positions: usize, tex_coords: usize, normals: usize) -> Result<Key> {
        Ok(Key {
            position: resolve_index(self.position, positions)
                .ok_or_else(|| anyhow!("vertex index {} out of range", self.position))?,
            tex_coord: resolve_index(self.tex_coord, tex_coords),
            normal: resolve_index(self.normal, normals),
        })
    }
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec3> {
    let mut next = || -> Result<f32> {
        Ok(parts
            .next()
            .ok_or_else(|| anyhow!("missing vector component"))?
            .parse::<f32>()?)
    };
    Ok(Vec3::new(next()?, next()?, next()?))
}

fn parse_vec2<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec2> {
    let u = parts
        .next()
        .ok_or_else(|| anyhow!("missing texture coordinate"))?
        .parse::<f32>()?;
    let v = match parts.next() {
        Some(v) => v.parse::<f32>()?,
        None => 0.0,
    };
    Ok(Vec2::new(u, v))
}

fn parse_face<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Vec<FaceIndex>> {
    let mut indices = Vec::new();
    for part in parts {
        let mut segments = part.split('/');
        let position = segments
            .next()
            .ok_or_else(|| anyhow!("missing vertex index"))?
            .parse::<i32>()
            .with_context(|| format!("bad vertex reference `{part}`"))?;
        let mut optional = || -> Result<i32> {
            match segments.next() {
                Some("") | None => Ok(0),
                Some(s) => s
                    .parse::<i32>()
                    .with_context(|| format!("bad vertex reference `{part}`")),
            }
        };
        let tex_coord = optional()?;
        let normal = optional()?;
        indices.push(FaceIndex {
            position,
            tex_coord,
            normal,
        });
    }
    if indices.len() < 3 {
        return Err(anyhow!("faces must reference at least 3 vertices"));
    }
    Ok(indices)
}

/// OBJ indices are 1-based; negative values count back from `len`.
fn resolve_index(index: i32, len: usize) -> Option<usize> {
    if index > 0 {
        let zero_based = index as usize - 1;
        (zero_based < len).then_some(zero_based)
    } else if index < 0 {
        let back = index.unsigned_abs() as usize;
        (back <= len).then(|| len - back)
    } else {
        None
    }
}

// OBJ puts v=0 at the bottom of the image, wgpu samples v=0 at the top.
fn flip_v(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x, 1.0 - uv.y)
}

fn compute_normals(mesh: &mut MeshData) {
    let mut accum = vec![Vec3::ZERO; mesh.vertices.len()];

    for triangle in mesh.indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let p0 = mesh.vertices[i0].position();
        let p1 = mesh.vertices[i1].position();
        let p2 = mesh.vertices[i2].position();
        if let Some(normal) = (p1 - p0).cross(p2 - p0).try_normalize() {
            accum[i0] += normal;
            accum[i1] += normal;
            accum[i2] += normal;
        }
    }

    for (vertex, normal) in mesh.vertices.iter_mut().zip(accum) {
        if vertex.normal() == Vec3::ZERO {
            vertex.normal = normal.normalize_or_zero().to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_triangle() {
        let obj = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices.len(), 3);
    }

    #[test]
    fn computes_missing_normals() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = load_obj_from_str(obj).unwrap();
        for vertex in &mesh.vertices {
            assert!((vertex.normal() - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn quads_are_fan_triangulated_with_uvs() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
        assert_eq!(mesh.vertices[2].uv, [1.0, 0.0]);
    }

    #[test]
    fn negative_indices_count_from_end() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(mesh.vertices[2].position, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn negative_indices_use_vertices_declared_so_far() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
v 5 5 5
v 6 5 5
v 5 6 5
f -3 -2 -1
";
        let mesh = load_obj_from_str(obj).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        let first: Vec<_> = mesh.indices[..3]
            .iter()
            .map(|&i| mesh.vertices[i as usize].position)
            .collect();
        assert_eq!(first, vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let second: Vec<_> = mesh.indices[3..]
            .iter()
            .map(|&i| mesh.vertices[i as usize].position)
            .collect();
        assert_eq!(second, vec![[5.0, 5.0, 5.0], [6.0, 5.0, 5.0], [5.0, 6.0, 5.0]]);
    }

    #[test]
    fn negative_index_before_any_vertex_is_an_error() {
        let obj = "f -1 -2 -3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n";
        assert!(load_obj_from_str(obj).is_err());
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let obj = "v 0 0 0\nv 1 0 0\nf 1 2 7\n";
        assert!(load_obj_from_str(obj).is_err());
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(load_obj_from_str("# nothing\n").is_err());
    }
}
