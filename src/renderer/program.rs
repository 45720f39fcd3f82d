//! Shader programs.
//!
//! A program is one shared vertex stage plus a fragment stage, linked into a
//! render pipeline per face-culling mode so the mode can be switched between
//! frames without relinking.

use crate::error::{ViewerError, ViewerResult};
use crate::renderer::camera::{LightingUniform, TransformUniform};
use crate::renderer::geometry::{NORMAL_LOCATION, POSITION_LOCATION};
use crate::renderer::gpu::{DEPTH_FORMAT, DriverError, GpuState};

pub const MESH_VERTEX_SOURCE: &str = include_str!("shaders/mesh.vert.wgsl");
pub const SOLID_FRAGMENT_SOURCE: &str = include_str!("shaders/solid.frag.wgsl");
pub const WIREFRAME_FRAGMENT_SOURCE: &str = include_str!("shaders/wireframe.frag.wgsl");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullState {
    #[default]
    Disabled,
    /// Front faces discarded, exposing the inside of closed meshes.
    Front,
}

impl CullState {
    pub const ALL: [CullState; 2] = [CullState::Disabled, CullState::Front];

    fn face(self) -> Option<wgpu::Face> {
        match self {
            CullState::Disabled => None,
            CullState::Front => Some(wgpu::Face::Front),
        }
    }

    fn slot(self) -> usize {
        match self {
            CullState::Disabled => 0,
            CullState::Front => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    /// Lit triangle list; also binds the lighting uniform.
    Solid,
    /// Unlit line list.
    Wireframe,
}

impl ProgramKind {
    pub fn label(self) -> &'static str {
        match self {
            ProgramKind::Solid => "solid program",
            ProgramKind::Wireframe => "wireframe program",
        }
    }

    fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            ProgramKind::Solid => wgpu::PrimitiveTopology::TriangleList,
            ProgramKind::Wireframe => wgpu::PrimitiveTopology::LineList,
        }
    }

    // edges coincide with the faces they outline
    fn depth_compare(self) -> wgpu::CompareFunction {
        match self {
            ProgramKind::Solid => wgpu::CompareFunction::Less,
            ProgramKind::Wireframe => wgpu::CompareFunction::LessEqual,
        }
    }
}

pub struct Program {
    pipelines: [wgpu::RenderPipeline; 2],
    bind_group: wgpu::BindGroup,
    transform_buffer: wgpu::Buffer,
    lighting_buffer: Option<wgpu::Buffer>,
}

fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    const POSITION: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![POSITION_LOCATION => Float32x3];
    const NORMAL: [wgpu::VertexAttribute; 1] =
        wgpu::vertex_attr_array![NORMAL_LOCATION => Float32x3];

    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &NORMAL,
        },
    ]
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Compiles `vertex_src` + `fragment_src` into one module and links it into
/// a pipeline for every [`CullState`].
///
/// Driver diagnostics are carried in the returned error.
pub fn compile_and_link(
    gpu: &GpuState,
    kind: ProgramKind,
    vertex_src: &str,
    fragment_src: &str,
) -> ViewerResult<Program> {
    let program = kind.label();
    let source = format!("{vertex_src}\n{fragment_src}");

    let module = gpu
        .scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(program),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })
        .map_err(|err| match err {
            DriverError::Validation(message) => ViewerError::ShaderCompile { program, message },
            DriverError::OutOfMemory(message) => ViewerError::ShaderAllocation { program, message },
        })?;

    let (transform_buffer, lighting_buffer) = gpu
        .scoped(|device| {
            let transforms = uniform_buffer(
                device,
                "Transform Uniform Buffer",
                std::mem::size_of::<TransformUniform>(),
            );
            let lighting = (kind == ProgramKind::Solid).then(|| {
                uniform_buffer(
                    device,
                    "Lighting Uniform Buffer",
                    std::mem::size_of::<LightingUniform>(),
                )
            });
            (transforms, lighting)
        })
        .map_err(|err| {
            let message = match err {
                DriverError::Validation(m) | DriverError::OutOfMemory(m) => m,
            };
            ViewerError::BufferCreation { label: program, message }
        })?;

    let (pipelines, bind_group) = gpu
        .scoped(|device| {
            let mut entries = vec![uniform_entry(0, wgpu::ShaderStages::VERTEX)];
            if lighting_buffer.is_some() {
                entries.push(uniform_entry(1, wgpu::ShaderStages::FRAGMENT));
            }
            let bind_group_layout =
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(program),
                    entries: &entries,
                });

            let mut bindings = vec![wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }];
            if let Some(lighting) = &lighting_buffer {
                bindings.push(wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting.as_entire_binding(),
                });
            }
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(program),
                layout: &bind_group_layout,
                entries: &bindings,
            });

            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(program),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

            let buffers = vertex_layouts();
            let pipelines = CullState::ALL.map(|cull| {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(program),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &module,
                        entry_point: Some("vs_main"),
                        buffers: &buffers,
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &module,
                        entry_point: Some("fs_main"),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: gpu.config.format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: kind.topology(),
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: cull.face(),
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: DEPTH_FORMAT,
                        depth_write_enabled: true,
                        depth_compare: kind.depth_compare(),
                        stencil: wgpu::StencilState::default(),
                        bias: wgpu::DepthBiasState::default(),
                    }),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
            });
            (pipelines, bind_group)
        })
        .map_err(|err| match err {
            DriverError::Validation(message) => ViewerError::ProgramLink { program, message },
            DriverError::OutOfMemory(message) => ViewerError::ShaderAllocation { program, message },
        })?;

    tracing::debug!(program, "program linked");

    Ok(Program {
        pipelines,
        bind_group,
        transform_buffer,
        lighting_buffer,
    })
}

impl Program {
    pub fn pipeline(&self, cull: CullState) -> &wgpu::RenderPipeline {
        &self.pipelines[cull.slot()]
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn write_transforms(&self, queue: &wgpu::Queue, uniform: &TransformUniform) {
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// No-op for programs without a lighting stage.
    pub fn write_lighting(&self, queue: &wgpu::Queue, uniform: &LightingUniform) {
        if let Some(buffer) = &self.lighting_buffer {
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(uniform));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cull_state_slots_are_distinct() {
        let slots: Vec<usize> = CullState::ALL.iter().map(|c| c.slot()).collect();
        assert_eq!(slots, vec![0, 1]);
        assert_eq!(CullState::Disabled.face(), None);
        assert_eq!(CullState::Front.face(), Some(wgpu::Face::Front));
    }

    #[test]
    fn test_shader_sources_share_vertex_stage() {
        assert!(MESH_VERTEX_SOURCE.contains("fn vs_main"));
        for fragment in [SOLID_FRAGMENT_SOURCE, WIREFRAME_FRAGMENT_SOURCE] {
            assert!(fragment.contains("fn fs_main"));
            assert!(!fragment.contains("fn vs_main"));
        }
        assert!(SOLID_FRAGMENT_SOURCE.contains("@binding(1)"));
        assert!(!WIREFRAME_FRAGMENT_SOURCE.contains("@binding"));
    }

    #[test]
    fn test_program_kinds() {
        assert_eq!(ProgramKind::Solid.topology(), wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(ProgramKind::Wireframe.topology(), wgpu::PrimitiveTopology::LineList);
    }
}
