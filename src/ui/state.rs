/// View options changed from the control panel.
pub struct UiState {
    /// Cull front faces so only the inside of the mesh is drawn.
    pub show_only_interior: bool,
    pub show_stats: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_only_interior: false,
            show_stats: true,
        }
    }
}

impl UiState {
    pub fn toggle_interior(&mut self) {
        self.show_only_interior = !self.show_only_interior;
    }

    /// The toggle names the mode it switches to.
    pub fn interior_toggle_label(&self) -> &'static str {
        if self.show_only_interior {
            "Show everything"
        } else {
            "Show interior only"
        }
    }
}
