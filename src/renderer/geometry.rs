use wgpu::util::DeviceExt;

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::UnifiedMesh;
use crate::renderer::gpu::{DriverError, GpuState};

/// Shader location of `aPosition`.
pub const POSITION_LOCATION: u32 = 0;
/// Shader location of `aNormal`.
pub const NORMAL_LOCATION: u32 = 1;

/// Immutable GPU copies of the mesh. Uploaded once; there is no re-upload path.
pub struct GeometryBuffers {
    pub position_buffer: wgpu::Buffer,
    pub normal_buffer: wgpu::Buffer,
    pub triangle_index_buffer: wgpu::Buffer,
    pub line_index_buffer: wgpu::Buffer,
    pub triangle_index_count: u32,
    pub line_index_count: u32,
}

fn create_static(
    gpu: &GpuState,
    label: &'static str,
    contents: &[u8],
    usage: wgpu::BufferUsages,
) -> ViewerResult<wgpu::Buffer> {
    gpu.scoped(|device| {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        })
    })
    .map_err(|err| {
        let message = match err {
            DriverError::Validation(m) | DriverError::OutOfMemory(m) => m,
        };
        ViewerError::BufferCreation { label, message }
    })
}

impl GeometryBuffers {
    pub fn upload(gpu: &GpuState, mesh: &UnifiedMesh, edges: &[u32]) -> ViewerResult<Self> {
        let position_buffer = create_static(
            gpu,
            "Position Buffer",
            bytemuck::cast_slice(mesh.position_floats()),
            wgpu::BufferUsages::VERTEX,
        )?;
        let normal_buffer = create_static(
            gpu,
            "Normal Buffer",
            bytemuck::cast_slice(mesh.normal_floats()),
            wgpu::BufferUsages::VERTEX,
        )?;
        let triangle_index_buffer = create_static(
            gpu,
            "Triangle Index Buffer",
            bytemuck::cast_slice(&mesh.indices),
            wgpu::BufferUsages::INDEX,
        )?;
        let line_index_buffer = create_static(
            gpu,
            "Line Index Buffer",
            bytemuck::cast_slice(edges),
            wgpu::BufferUsages::INDEX,
        )?;

        tracing::debug!(
            vertex_bytes = position_buffer.size() + normal_buffer.size(),
            index_bytes = triangle_index_buffer.size() + line_index_buffer.size(),
            "geometry uploaded"
        );

        Ok(Self {
            position_buffer,
            normal_buffer,
            triangle_index_buffer,
            line_index_buffer,
            triangle_index_count: mesh.indices.len() as u32,
            line_index_count: edges.len() as u32,
        })
    }

    pub fn bind_attributes(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(POSITION_LOCATION, self.position_buffer.slice(..));
        render_pass.set_vertex_buffer(NORMAL_LOCATION, self.normal_buffer.slice(..));
    }
}
