use crate::error::ViewerResult;
use crate::mesh::LoadedMesh;
use crate::renderer::camera::{
    LIGHT_DIRECTION, LightingUniform, TransformUniform, normal_matrix,
};
use crate::renderer::controller::TransformController;
use crate::renderer::geometry::GeometryBuffers;
use crate::renderer::gpu::GpuState;
use crate::renderer::program::{
    CullState, MESH_VERTEX_SOURCE, Program, ProgramKind, SOLID_FRAGMENT_SOURCE,
    WIREFRAME_FRAGMENT_SOURCE, compile_and_link,
};

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.9,
    g: 0.9,
    b: 0.9,
    a: 1.0,
};

/// Rasterizer state shared by both passes.
///
/// Updated at the end of a frame, so a toggle is first visible in the frame
/// after the one that observed it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RasterState {
    cull: CullState,
}

impl RasterState {
    pub fn cull(&self) -> CullState {
        self.cull
    }

    pub fn apply(&mut self, show_only_interior: bool) {
        self.cull = if show_only_interior {
            CullState::Front
        } else {
            CullState::Disabled
        };
    }
}

/// Uniform values for one frame, computed from a single read of the
/// interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub transforms: TransformUniform,
    pub lighting: LightingUniform,
}

impl FrameUniforms {
    pub fn from_controller(controller: &TransformController) -> Self {
        let model_view = controller.model_view();
        Self {
            transforms: TransformUniform::new(&model_view, &controller.projection_matrix()),
            lighting: LightingUniform::new(&normal_matrix(&model_view), LIGHT_DIRECTION),
        }
    }
}

/// Everything drawn each frame, built once after the mesh has loaded.
pub struct Scene {
    pub geometry: GeometryBuffers,
    pub solid: Program,
    pub wireframe: Program,
    pub raster: RasterState,
}

impl Scene {
    pub fn new(gpu: &GpuState, loaded: &LoadedMesh) -> ViewerResult<Self> {
        let solid = compile_and_link(
            gpu,
            ProgramKind::Solid,
            MESH_VERTEX_SOURCE,
            SOLID_FRAGMENT_SOURCE,
        )?;
        let wireframe = compile_and_link(
            gpu,
            ProgramKind::Wireframe,
            MESH_VERTEX_SOURCE,
            WIREFRAME_FRAGMENT_SOURCE,
        )?;
        let geometry = GeometryBuffers::upload(gpu, &loaded.mesh, &loaded.edges)?;

        Ok(Self {
            geometry,
            solid,
            wireframe,
            raster: RasterState::default(),
        })
    }

    /// Records the solid pass followed by the wireframe overlay, then latches
    /// the culling mode for the next frame.
    pub fn render_frame(
        &mut self,
        gpu: &GpuState,
        controller: &TransformController,
        show_only_interior: bool,
        view: &wgpu::TextureView,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        let uniforms = FrameUniforms::from_controller(controller);
        let cull = self.raster.cull();

        self.solid.write_transforms(&gpu.queue, &uniforms.transforms);
        self.solid.write_lighting(&gpu.queue, &uniforms.lighting);
        self.wireframe.write_transforms(&gpu.queue, &uniforms.transforms);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &gpu.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let geometry = &self.geometry;
            if geometry.triangle_index_count > 0 {
                geometry.bind_attributes(&mut render_pass);

                render_pass.set_pipeline(self.solid.pipeline(cull));
                render_pass.set_bind_group(0, self.solid.bind_group(), &[]);
                render_pass.set_index_buffer(
                    geometry.triangle_index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                render_pass.draw_indexed(0..geometry.triangle_index_count, 0, 0..1);

                render_pass.set_pipeline(self.wireframe.pipeline(cull));
                render_pass.set_bind_group(0, self.wireframe.bind_group(), &[]);
                render_pass.set_index_buffer(
                    geometry.line_index_buffer.slice(..),
                    wgpu::IndexFormat::Uint32,
                );
                render_pass.draw_indexed(0..geometry.line_index_count, 0, 0..1);
            }
        }

        self.raster.apply(show_only_interior);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::UiState;
    use crate::renderer::camera::model_view;
    use glam::{Mat4, Vec2};

    #[test]
    fn test_double_toggle_restores_culling() {
        let mut ui = UiState::default();
        let mut raster = RasterState::default();
        assert_eq!(raster.cull(), CullState::Disabled);

        ui.toggle_interior();
        raster.apply(ui.show_only_interior);
        assert_eq!(raster.cull(), CullState::Front);

        ui.toggle_interior();
        raster.apply(ui.show_only_interior);
        assert_eq!(raster.cull(), CullState::Disabled);
    }

    #[test]
    fn test_frame_uniforms_snapshot_rotation() {
        let mut controller = TransformController::new(800, 600);
        controller.interaction.pointer_down(Vec2::ZERO);
        controller.interaction.pointer_move(Vec2::new(20.0, -40.0));

        let uniforms = FrameUniforms::from_controller(&controller);
        let expected = model_view(-0.4, 0.2);
        let actual = Mat4::from_cols_array_2d(&uniforms.transforms.model_view);
        assert!(actual.abs_diff_eq(expected, 1e-5));
        assert_eq!(uniforms.lighting.light_direction, LIGHT_DIRECTION.to_array());
        assert_eq!(
            uniforms.transforms.projection,
            controller.projection_matrix().to_cols_array_2d()
        );
    }
}
