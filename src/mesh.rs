use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// Interleaved vertex consumed by the lit and light-marker pipelines.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// Coloured vertex for the grid and the axis gizmo.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl LineVertex {
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

/// Indexed triangle list ready for upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Unit cube centred on the origin, one quad per face so that normals
    /// and texture coordinates stay per-face.
    pub fn cube() -> Self {
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        ];
        let mut mesh = Self::default();
        for (normal, tangent, bitangent) in FACES {
            mesh.push_quad(normal * 0.5, normal, tangent * 0.5, bitangent * 0.5);
        }
        mesh
    }

    /// Unit quad in the XY plane facing +Z.
    pub fn quad() -> Self {
        let mut mesh = Self::default();
        mesh.push_quad(Vec3::ZERO, Vec3::Z, Vec3::X * 0.5, Vec3::Y * 0.5);
        mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_quad(&mut self, center: Vec3, normal: Vec3, half_u: Vec3, half_v: Vec3) {
        let base = self.vertices.len() as u32;
        let corners = [
            (-1.0, -1.0, Vec2::new(0.0, 1.0)),
            (1.0, -1.0, Vec2::new(1.0, 1.0)),
            (1.0, 1.0, Vec2::new(1.0, 0.0)),
            (-1.0, 1.0, Vec2::new(0.0, 0.0)),
        ];
        for (u, v, uv) in corners {
            self.vertices
                .push(Vertex::new(center + half_u * u + half_v * v, normal, uv));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

pub const GRID_COLOR: Vec3 = Vec3::splat(0.35);
pub const AXIS_X_COLOR: Vec3 = Vec3::new(0.9, 0.2, 0.2);
pub const AXIS_Y_COLOR: Vec3 = Vec3::new(0.2, 0.9, 0.2);
pub const AXIS_Z_COLOR: Vec3 = Vec3::new(0.2, 0.4, 0.9);

/// Line list for a square grid on the XZ plane. The two centre lines are
/// tinted with the X and Z axis colours.
pub fn grid_lines(half_extent: u32, spacing: f32) -> Vec<LineVertex> {
    let extent = half_extent as f32 * spacing;
    let mut lines = Vec::with_capacity((half_extent as usize * 2 + 1) * 4);
    for step in -(half_extent as i32)..=half_extent as i32 {
        let offset = step as f32 * spacing;
        let (along_x, along_z) = if step == 0 {
            (AXIS_X_COLOR, AXIS_Z_COLOR)
        } else {
            (GRID_COLOR, GRID_COLOR)
        };
        lines.push(LineVertex::new(Vec3::new(-extent, 0.0, offset), along_x));
        lines.push(LineVertex::new(Vec3::new(extent, 0.0, offset), along_x));
        lines.push(LineVertex::new(Vec3::new(offset, 0.0, -extent), along_z));
        lines.push(LineVertex::new(Vec3::new(offset, 0.0, extent), along_z));
    }
    lines
}

/// Three unit axes from the origin, coloured X red, Y green, Z blue.
pub fn axis_gizmo_lines() -> Vec<LineVertex> {
    [(Vec3::X, AXIS_X_COLOR), (Vec3::Y, AXIS_Y_COLOR), (Vec3::Z, AXIS_Z_COLOR)]
        .into_iter()
        .flat_map(|(axis, color)| [LineVertex::new(Vec3::ZERO, color), LineVertex::new(axis, color)])
        .collect()
}
