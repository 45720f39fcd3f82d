use egui::{Color32, Context, RichText, Ui};

use crate::mesh::LoadedMesh;
use crate::renderer::interaction::RotationState;
use crate::ui::state::UiState;
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub toggle_interior: bool,
}

/// Summary of the loaded mesh shown in the side panel.
pub struct MeshInfo {
    pub path: String,
    pub format: &'static str,
    pub vertices: usize,
    pub triangles: usize,
    pub edges: usize,
}

impl MeshInfo {
    pub fn from_loaded(loaded: &LoadedMesh) -> Self {
        Self {
            path: loaded.path.display().to_string(),
            format: loaded.format.name(),
            vertices: loaded.mesh.vertex_count(),
            triangles: loaded.mesh.triangle_count(),
            edges: loaded.edge_count(),
        }
    }
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    info: &MeshInfo,
    fps: f32,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(240.0)
        .default_width(260.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ui.heading(RichText::new("meshview").strong());
            ui.add_space(12.0);

            section_header(ui, "VIEW");
            let toggle = egui::Button::new(
                RichText::new(state.interior_toggle_label()).color(if state.show_only_interior {
                    Color32::WHITE
                } else {
                    TEXT_PRIMARY
                }),
            )
            .fill(if state.show_only_interior { ACCENT_ORANGE } else { BG_WIDGET })
            .min_size(egui::vec2(ui.available_width(), 32.0));
            if ui.add(toggle).clicked() {
                actions.toggle_interior = true;
            }
            ui.add_space(16.0);

            ui.checkbox(&mut state.show_stats, "Show statistics");
            if state.show_stats {
                ui.add_space(8.0);
                section_header(ui, "MESH");
                mesh_stats(ui, info);
                ui.add_space(8.0);
                stat_row(ui, "FPS", format!("{fps:.0}"));
            }
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn mesh_stats(ui: &mut Ui, info: &MeshInfo) {
    ui.label(RichText::new(&info.path).monospace().size(11.0));
    stat_row(ui, "Format", info.format.to_string());
    stat_row(ui, "Vertices", fmt_num(info.vertices));
    stat_row(ui, "Triangles", fmt_num(info.triangles));
    stat_row(ui, "Edges", fmt_num(info.edges));
}

fn stat_row(ui: &mut Ui, label: &str, value: String) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(label).color(TEXT_MUTED));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(value).monospace());
        });
    });
}

pub fn draw_help_overlay(ctx: &Context, rotation: RotationState, dragging: bool) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_white_alpha(200))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id =
                        Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new("LMB / one finger drag - Rotate").color(TEXT_MUTED));
                    let color = if dragging { ACCENT_ORANGE } else { TEXT_MUTED };
                    ui.label(
                        RichText::new(format!(
                            "Rotation: x {:.2} rad | y {:.2} rad",
                            rotation.x, rotation.y
                        ))
                        .color(color),
                    );
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(12), "12");
        assert_eq!(fmt_num(1_530), "1.5K");
        assert_eq!(fmt_num(2_500_000), "2.50M");
    }
}
