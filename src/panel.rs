//! On-screen UI: control panel, tracker status banner and the drawing
//! overlay.

use crate::config::{ShapeConfig, DENSITY_RANGE, DIFFUSION_RANGE, SIZE_RANGE};
use crate::gesture::HandState;
use crate::shape::ShapeKind;
use crate::tracking::TrackerStatus;
use egui::{Align2, Color32, Context, RichText, Stroke};
use glam::Vec2;

/// Something the user asked for through the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    SelectPreset(ShapeKind),
    OpenDrawing,
    CancelDrawing,
}

/// Everything the UI shows or edits in one frame.
pub struct UiState<'a> {
    /// Edited in place by the sliders and color picker.
    pub shape: &'a mut ShapeConfig,
    pub active: ShapeKind,
    pub drawing: bool,
    /// Stroke captured so far, in physical pixels.
    pub stroke: &'a [Vec2],
    pub status: &'a TrackerStatus,
    pub hand: HandState,
    pub simulated_hand: bool,
    pub fps: f32,
    pub particle_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Active,
    Error,
}

/// Text of the status banner.
pub fn status_line(status: &TrackerStatus, hand: &HandState) -> (String, Severity) {
    match status {
        TrackerStatus::Starting => ("Starting hand tracker...".into(), Severity::Info),
        TrackerStatus::Failed(message) => (message.clone(), Severity::Error),
        TrackerStatus::Running if hand.is_exploding() => {
            ("Pinch detected: exploding".into(), Severity::Active)
        }
        TrackerStatus::Running if hand.detected => (
            format!("Hand detected (pinch {:.2})", hand.pinch_distance),
            Severity::Info,
        ),
        TrackerStatus::Running => ("No hand detected".into(), Severity::Info),
    }
}

/// Build the UI for this frame and return the requested actions.
pub fn show(ctx: &Context, state: &mut UiState<'_>) -> Vec<PanelAction> {
    let mut actions = Vec::new();

    status_banner(ctx, state);

    if state.drawing {
        drawing_overlay(ctx, state, &mut actions);
    } else {
        control_panel(ctx, state, &mut actions);
    }

    actions
}

fn status_banner(ctx: &Context, state: &UiState<'_>) {
    let (text, severity) = status_line(state.status, &state.hand);
    let color = match severity {
        Severity::Info => Color32::from_gray(200),
        Severity::Active => Color32::from_rgb(255, 190, 90),
        Severity::Error => Color32::from_rgb(255, 90, 90),
    };

    egui::Area::new(egui::Id::new("status_banner"))
        .anchor(Align2::CENTER_TOP, [0.0, 10.0])
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.label(RichText::new(text).color(color).strong());
                if state.simulated_hand && severity != Severity::Error {
                    ui.label(
                        RichText::new("H: show/hide hand   hold Space: pinch")
                            .small()
                            .weak(),
                    );
                }
            });
        });
}

fn control_panel(ctx: &Context, state: &mut UiState<'_>, actions: &mut Vec<PanelAction>) {
    egui::Window::new("Particles")
        .anchor(Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.heading("Shape");
            ui.horizontal_wrapped(|ui| {
                for (i, kind) in ShapeKind::PRESETS.iter().enumerate() {
                    let label = format!("{} {}", i + 1, kind.label());
                    if ui.selectable_label(state.active == *kind, label).clicked() {
                        actions.push(PanelAction::SelectPreset(*kind));
                    }
                }
            });
            let draw_label = if state.active == ShapeKind::Custom {
                "Redraw (C)"
            } else {
                "Draw (C)"
            };
            if ui
                .selectable_label(state.active == ShapeKind::Custom, draw_label)
                .clicked()
            {
                actions.push(PanelAction::OpenDrawing);
            }

            ui.separator();
            ui.heading("Look");

            let mut density_pct = state.shape.density * 100.0;
            let pct_range = (DENSITY_RANGE.start() * 100.0)..=(DENSITY_RANGE.end() * 100.0);
            if ui
                .add(
                    egui::Slider::new(&mut density_pct, pct_range)
                        .text("Density")
                        .suffix("%")
                        .fixed_decimals(0),
                )
                .changed()
            {
                state.shape.density = density_pct / 100.0;
            }
            ui.add(
                egui::Slider::new(&mut state.shape.diffusion, DIFFUSION_RANGE)
                    .text("Diffusion")
                    .suffix("×"),
            );
            ui.add(egui::Slider::new(&mut state.shape.particle_size, SIZE_RANGE).text("Size"));
            ui.horizontal(|ui| {
                ui.label("Color");
                ui.color_edit_button_rgb(&mut state.shape.color);
            });

            ui.separator();
            ui.label(
                RichText::new(format!(
                    "{} particles   {:.0} fps",
                    state.particle_count, state.fps
                ))
                .small()
                .weak(),
            );
        });
}

fn drawing_overlay(ctx: &Context, state: &UiState<'_>, actions: &mut Vec<PanelAction>) {
    let pixels_per_point = ctx.pixels_per_point();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("stroke"),
    ));

    let points: Vec<egui::Pos2> = state
        .stroke
        .iter()
        .map(|p| egui::pos2(p.x / pixels_per_point, p.y / pixels_per_point))
        .collect();
    if points.len() > 1 {
        painter.add(egui::Shape::line(
            points,
            Stroke::new(2.0, Color32::from_rgb(120, 220, 255)),
        ));
    }

    egui::Area::new(egui::Id::new("drawing_hint"))
        .anchor(Align2::CENTER_BOTTOM, [0.0, -20.0])
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Drag to draw a shape, release to apply. Esc cancels.");
                    if ui.button("Cancel").clicked() {
                        actions.push(PanelAction::CancelDrawing);
                    }
                });
            });
        });
}
