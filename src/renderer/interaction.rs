//! Pointer-driven orbit rotation.
//!
//! Mouse and single-finger touch share one drag state machine:
//! `Idle --down--> Dragging --move--> Dragging --up/leave/cancel--> Idle`.
//! Accumulated angles are never clamped or damped.

use glam::Vec2;
use winit::dpi::PhysicalPosition;

/// Screen pixels to radians.
pub const RADIANS_PER_PIXEL: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
}

impl RotationState {
    /// Horizontal motion turns about Y, vertical motion about X.
    pub fn apply_drag(&mut self, delta: Vec2) {
        self.y += delta.x * RADIANS_PER_PIXEL;
        self.x += delta.y * RADIANS_PER_PIXEL;
    }
}

/// Converts a window position to logical pixels so the drag rate does not
/// depend on the display scale factor.
pub fn screen_point(position: PhysicalPosition<f64>, scale_factor: f64) -> Vec2 {
    let logical = position.to_logical::<f32>(scale_factor);
    Vec2::new(logical.x, logical.y)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging { last: Vec2 },
}

#[derive(Debug, Default)]
pub struct InteractionState {
    drag: DragState,
    rotation: RotationState,
    /// Touch contacts currently down, in arrival order.
    touches: Vec<u64>,
}

impl InteractionState {
    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    #[cfg(test)]
    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn pointer_down(&mut self, position: Vec2) {
        self.drag = DragState::Dragging { last: position };
    }

    pub fn pointer_move(&mut self, position: Vec2) {
        if let DragState::Dragging { last } = self.drag {
            self.rotation.apply_drag(position - last);
            self.drag = DragState::Dragging { last: position };
        }
    }

    /// Button release and the cursor leaving the window both end the drag.
    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Only a touch that lands alone starts a drag.
    pub fn touch_start(&mut self, id: u64, position: Vec2) {
        if !self.touches.contains(&id) {
            self.touches.push(id);
        }
        if self.touches.len() == 1 {
            self.pointer_down(position);
        }
    }

    /// Ignored whenever more than one contact is down.
    pub fn touch_move(&mut self, id: u64, position: Vec2) {
        if self.touches.len() == 1 && self.touches[0] == id {
            self.pointer_move(position);
        }
    }

    /// Lifting or cancelling any contact ends the drag.
    pub fn touch_end(&mut self, id: u64) {
        self.touches.retain(|&t| t != id);
        self.pointer_up();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn test_drag_rate_is_scale_independent() {
        let mut low_dpi = InteractionState::default();
        low_dpi.pointer_down(screen_point(PhysicalPosition::new(0.0, 0.0), 1.0));
        low_dpi.pointer_move(screen_point(PhysicalPosition::new(100.0, 50.0), 1.0));

        let mut high_dpi = InteractionState::default();
        high_dpi.pointer_down(screen_point(PhysicalPosition::new(0.0, 0.0), 2.0));
        high_dpi.pointer_move(screen_point(PhysicalPosition::new(200.0, 100.0), 2.0));

        assert_eq!(low_dpi.rotation(), high_dpi.rotation());
        assert!((high_dpi.rotation().y - 1.0).abs() < 1e-6);
        assert!((high_dpi.rotation().x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_idle_moves_do_nothing() {
        let mut state = InteractionState::default();
        state.pointer_move(v(50.0, 50.0));
        assert_eq!(state.rotation(), RotationState::default());
        assert_eq!(state.drag(), DragState::Idle);
    }

    #[test]
    fn test_drag_accumulates() {
        let mut state = InteractionState::default();
        state.pointer_down(v(10.0, 20.0));
        state.pointer_move(v(110.0, 20.0));
        state.pointer_move(v(110.0, 70.0));
        let r = state.rotation();
        assert!((r.y - 1.0).abs() < 1e-6);
        assert!((r.x - 0.5).abs() < 1e-6);
        assert_eq!(state.drag(), DragState::Dragging { last: v(110.0, 70.0) });

        state.pointer_up();
        assert!(!state.is_dragging());
        state.pointer_move(v(500.0, 500.0));
        assert_eq!(state.rotation(), r);
    }

    #[test]
    fn test_rotation_is_unbounded() {
        let mut state = InteractionState::default();
        state.pointer_down(v(0.0, 0.0));
        state.pointer_move(v(10_000.0, -10_000.0));
        let r = state.rotation();
        assert!((r.y - 100.0).abs() < 1e-3);
        assert!((r.x + 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_second_touch_is_ignored() {
        let mut single = InteractionState::default();
        single.touch_start(1, v(0.0, 0.0));
        single.touch_move(1, v(30.0, 10.0));

        let mut multi = InteractionState::default();
        multi.touch_start(1, v(0.0, 0.0));
        multi.touch_move(1, v(30.0, 10.0));
        multi.touch_start(2, v(200.0, 200.0));
        multi.touch_move(1, v(90.0, 90.0));
        multi.touch_move(2, v(250.0, 260.0));

        assert_eq!(multi.rotation(), single.rotation());
    }

    #[test]
    fn test_remaining_finger_does_not_resume_drag() {
        let mut state = InteractionState::default();
        state.touch_start(2, v(0.0, 0.0));
        state.touch_start(3, v(5.0, 5.0));
        state.touch_end(2);
        assert!(!state.is_dragging());
        state.touch_move(3, v(40.0, 40.0));
        assert_eq!(state.rotation(), RotationState::default());
    }

    #[test]
    fn test_touch_cancel_ends_drag() {
        let mut state = InteractionState::default();
        state.touch_start(7, v(1.0, 1.0));
        assert!(state.is_dragging());
        state.touch_end(7);
        assert!(!state.is_dragging());
    }

    #[quickcheck]
    fn prop_chunking_does_not_change_rotation(steps: Vec<(i16, i16)>) -> bool {
        let mut path = vec![v(0.0, 0.0)];
        for (dx, dy) in steps.iter().take(32) {
            let last = path[path.len() - 1];
            path.push(last + v(*dx as f32 / 256.0, *dy as f32 / 256.0));
        }
        let end = path[path.len() - 1];

        let mut chunked = InteractionState::default();
        chunked.pointer_down(path[0]);
        for p in &path[1..] {
            chunked.pointer_move(*p);
        }

        let mut direct = InteractionState::default();
        direct.pointer_down(path[0]);
        direct.pointer_move(end);

        let (a, b) = (chunked.rotation(), direct.rotation());
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }
}
