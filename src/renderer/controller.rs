use glam::Mat4;

use crate::renderer::camera::{Projection, model_view};
use crate::renderer::interaction::{InteractionState, RotationState};

/// Camera and orbit state. Event handlers write to it; the frame loop reads
/// a snapshot of it once per frame.
pub struct TransformController {
    projection_matrix: Mat4,
    pub interaction: InteractionState,
}

impl TransformController {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            projection_matrix: Projection::new(width, height).matrix(),
            interaction: InteractionState::default(),
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn rotation(&self) -> RotationState {
        self.interaction.rotation()
    }

    pub fn model_view(&self) -> Mat4 {
        let rotation = self.rotation();
        model_view(rotation.x, rotation.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_model_view_follows_drag() {
        let mut controller = TransformController::new(1600, 900);
        let before = controller.model_view();

        controller.interaction.pointer_down(Vec2::ZERO);
        controller.interaction.pointer_move(Vec2::new(157.0, 0.0));
        let after = controller.model_view();

        assert!(!before.abs_diff_eq(after, 1e-3));
        assert!((controller.rotation().y - 1.57).abs() < 1e-5);
        assert!(after.abs_diff_eq(model_view(0.0, 1.57), 1e-5));
    }

    #[test]
    fn test_projection_is_fixed_at_creation() {
        let controller = TransformController::new(1000, 500);
        let expected = Projection::new(1000, 500);
        assert!((expected.aspect - 2.0).abs() < 1e-6);
        assert_eq!(controller.projection_matrix(), expected.matrix());
    }
}
