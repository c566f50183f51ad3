use egui::{Color32, Pos2, Rect, Sense};

use crate::PaintApp;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());

        // The canvas element keeps its configured size, centred in the panel
        let container_size = app.session().config().container_size;
        let container = Rect::from_center_size(response.rect.center(), container_size);

        app.handle_canvas_input(ctx, container);

        let display_rect = app.session().transform().display_rect(container);
        let texture = app.canvas_texture(ctx).id();
        let painter = painter.with_clip_rect(container);
        painter.rect_filled(container, 0.0, Color32::from_gray(48));
        painter.image(
            texture,
            display_rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );
    });
}
