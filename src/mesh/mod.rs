pub mod flat;
pub mod loader;
pub mod obj;
pub mod wireframe;

use std::path::Path;

use crate::error::{ViewerError, ViewerResult};

pub use loader::{LoadedMesh, MeshLoader};
pub use wireframe::derive_wireframe;

/// Normal emitted for OBJ corners that carry no usable normal reference.
pub const FALLBACK_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Triangle soup shared by every input format.
///
/// Vertices are emitted once per face corner and never deduplicated, so
/// `positions`, `normals` and `indices` always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl UnifiedMesh {
    pub fn with_capacity(corners: usize) -> Self {
        Self {
            positions: Vec::with_capacity(corners),
            normals: Vec::with_capacity(corners),
            indices: Vec::with_capacity(corners),
        }
    }

    /// Appends one corner and gives it the next index in emission order.
    pub fn push_corner(&mut self, position: [f32; 3], normal: [f32; 3]) {
        self.indices.push(corner_index(self.positions.len()));
        self.positions.push(position);
        self.normals.push(normal);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.normals)
    }
}

/// Index buffers are `u32`; corners past `u32::MAX` all share the last index
/// instead of wrapping around to the start of the mesh.
fn corner_index(corner: usize) -> u32 {
    u32::try_from(corner).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// `.obj`: `v`/`vn`/`f` records, polygons fan-triangulated.
    Obj,
    /// `.norm`: triangle count, then point/normal lines interleaved per corner.
    PointNormalPairs,
    /// `.tris`: triangle count, then three points followed by three normals.
    PointsThenNormals,
}

impl MeshFormat {
    pub fn from_extension(extension: &str) -> ViewerResult<Self> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "obj" => Ok(Self::Obj),
            "norm" => Ok(Self::PointNormalPairs),
            "tris" => Ok(Self::PointsThenNormals),
            _ => Err(ViewerError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn from_path(path: &Path) -> ViewerResult<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::from_extension(&extension)
    }

    /// Never fails: malformed content degrades to `NaN` components or
    /// fallback normals. Only choosing the format can be rejected.
    pub fn parse(self, text: &str) -> UnifiedMesh {
        match self {
            Self::Obj => obj::parse_obj(text),
            Self::PointNormalPairs => flat::parse_point_normal_pairs(text),
            Self::PointsThenNormals => flat::parse_points_then_normals(text),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Obj => "OBJ",
            Self::PointNormalPairs => "point/normal pairs",
            Self::PointsThenNormals => "points then normals",
        }
    }
}

/// Reads the first three whitespace-separated numbers of `tokens`.
/// Missing or unparseable components become `NaN`.
pub(crate) fn parse_triple<'a>(mut tokens: impl Iterator<Item = &'a str>) -> [f32; 3] {
    let mut component = || {
        tokens
            .next()
            .and_then(|t| t.parse::<f32>().ok())
            .unwrap_or(f32::NAN)
    };
    [component(), component(), component()]
}
