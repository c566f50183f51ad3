use crate::PaintApp;
use crate::session::Session;
use crate::tools::ToolMode;

/// Families offered in the font picker; all resolve through the font registry
const FONT_FAMILIES: &[&str] = &["Arial", "Helvetica", "Courier New", "monospace"];

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.heading("Tools");

            let current_mode = app.session().settings().mode;
            for mode in ToolMode::ALL {
                if ui.selectable_label(current_mode == mode, mode.name()).clicked() {
                    log::info!("Tool selected from UI: {}", mode.name());
                    app.apply(|session| session.set_mode(mode));
                }
            }
            ui.label(format!("Mode: {}", app.session().mode_label()));
            ui.separator();

            let config = app.session().config().clone();
            let mut settings = app.session().settings().clone();

            if settings.mode == ToolMode::Draw {
                if ui.checkbox(&mut settings.is_eraser, "Eraser").changed() {
                    app.update_session(|session| session.set_eraser(settings.is_eraser));
                }
                if ui
                    .add(
                        egui::Slider::new(&mut settings.brush_size, config.min_tool_size..=config.max_tool_size)
                            .text("Brush size"),
                    )
                    .changed()
                {
                    app.update_session(|session| session.set_brush_size(settings.brush_size));
                }
                if ui
                    .add(
                        egui::Slider::new(&mut settings.eraser_size, config.min_tool_size..=config.max_tool_size)
                            .text("Eraser size"),
                    )
                    .changed()
                {
                    app.update_session(|session| session.set_eraser_size(settings.eraser_size));
                }
            }

            ui.horizontal(|ui| {
                ui.label("Color");
                if egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut settings.color,
                    egui::color_picker::Alpha::Opaque,
                )
                .changed()
                {
                    app.update_session(|session| session.set_color(settings.color));
                }
            });

            if settings.mode == ToolMode::Text {
                if ui
                    .add(
                        egui::Slider::new(&mut settings.font_size, config.min_font_size..=config.max_font_size)
                            .text("Font size"),
                    )
                    .changed()
                {
                    app.update_session(|session| session.set_font_size(settings.font_size));
                }
                egui::ComboBox::from_label("Font")
                    .selected_text(settings.font_family.as_str())
                    .show_ui(ui, |ui| {
                        for family in FONT_FAMILIES {
                            if ui
                                .selectable_label(settings.font_family == *family, *family)
                                .clicked()
                            {
                                app.update_session(|session| session.set_font_family(*family));
                            }
                        }
                    });
            }
            ui.separator();

            ui.horizontal(|ui| {
                let can_undo = app.session().can_undo();
                let can_redo = app.session().can_redo();

                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.apply(Session::undo);
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.apply(Session::redo);
                }
            });
            let history = app.session().history();
            ui.label(format!(
                "History: {} of {}",
                history.index().map_or(0, |index| index + 1),
                history.len()
            ));
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("−").clicked() {
                    app.update_session(Session::zoom_out);
                }
                ui.label(format!("{}%", app.session().zoom_percent()));
                if ui.button("+").clicked() {
                    app.update_session(Session::zoom_in);
                }
            });
            let pan = app.session().pan();
            ui.label(format!("Pan: ({:.0}, {:.0})", pan.x, pan.y));
            if ui.button("Reset Position").clicked() {
                app.update_session(Session::reset_transform);
            }
            ui.separator();

            if ui.button("Clear All").clicked() {
                app.apply(Session::clear);
            }
            if ui.button("Export PNG").clicked() {
                app.export();
            }
            ui.label("Drop an image file onto the window to insert it.");

            if let Some(status) = app.status() {
                ui.separator();
                ui.colored_label(ui.visuals().warn_fg_color, status);
            }
        });
}
