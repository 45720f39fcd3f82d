use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

pub const BG_PANEL: Color32 = Color32::from_rgb(242, 242, 245);
pub const BG_WIDGET: Color32 = Color32::from_rgb(225, 226, 232);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(210, 212, 224);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(40, 40, 48);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(110, 110, 120);

pub const ACCENT_BLUE: Color32 = Color32::from_rgb(84, 102, 206);
pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(200, 130, 40);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(200, 200, 210);

/// Light style so the panel sits comfortably next to the gray viewport.
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = Style::default();

    let mut visuals = Visuals::light();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.window_rounding = Rounding::same(6.0);
    visuals.selection.bg_fill = ACCENT_BLUE.gamma_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_BLUE);

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.open,
    ] {
        widget.bg_fill = BG_WIDGET;
        widget.weak_bg_fill = BG_WIDGET;
        widget.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
        widget.rounding = Rounding::same(4.0);
    }
    visuals.widgets.hovered.bg_fill = BG_WIDGET_HOVER;
    visuals.widgets.hovered.weak_bg_fill = BG_WIDGET_HOVER;
    visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT_BLUE);
    visuals.widgets.hovered.rounding = Rounding::same(4.0);
    visuals.widgets.active.bg_stroke = Stroke::new(2.0, ACCENT_BLUE);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(13.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
