use egui::{Color32, ColorImage, Rect, TextureHandle, TextureOptions};

use crate::config::CanvasConfig;
use crate::decode::ThreadDecoder;
use crate::element::ObjectId;
use crate::error::CanvasResult;
use crate::input::InputHandler;
use crate::panels::{central_panel, tools_panel};
use crate::session::Session;
use crate::tools::ToolSettings;

/// Storage key for the user's tool settings
const SETTINGS_KEY: &str = "tool_settings";

/// The desktop shell around a canvas [`Session`]
pub struct PaintApp {
    session: Session,
    input: InputHandler,
    texture: Option<TextureHandle>,
    needs_upload: bool,
    /// Text typed into the open text box
    text_draft: String,
    /// Box the draft belongs to, to notice when another box opens
    draft_owner: Option<ObjectId>,
    status: Option<String>,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: CanvasConfig) -> CanvasResult<Self> {
        let container = Rect::from_min_size(egui::Pos2::ZERO, config.container_size);
        let mut session = Session::new(
            config,
            container,
            cc.egui_ctx.pixels_per_point(),
            Box::new(ThreadDecoder),
        )?;

        if let Some(settings) = cc
            .storage
            .and_then(|storage| eframe::get_value::<ToolSettings>(storage, SETTINGS_KEY))
        {
            log::info!("Restored tool settings ({})", settings.mode_label());
            session.apply_settings(settings)?;
        }

        Ok(Self {
            session,
            input: InputHandler::new(container),
            texture: None,
            needs_upload: true,
            text_draft: String::new(),
            draft_owner: None,
            status: None,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Run a session action, surfacing any failure in the status line
    pub(crate) fn apply<T>(&mut self, action: impl FnOnce(&mut Session) -> CanvasResult<T>) -> Option<T> {
        self.needs_upload = true;
        match action(&mut self.session) {
            Ok(value) => {
                self.status = None;
                Some(value)
            }
            Err(err) => {
                log::warn!("{err}");
                self.status = Some(err.to_string());
                None
            }
        }
    }

    /// Infallible session mutation that changes what is displayed
    pub(crate) fn update_session(&mut self, action: impl FnOnce(&mut Session)) {
        action(&mut self.session);
        self.needs_upload = true;
    }

    pub(crate) fn export(&mut self) {
        let Some(bytes) = self.apply(Session::export_png) else {
            return;
        };
        let file_name = self.session.export_file_name().to_owned();
        match std::fs::write(&file_name, bytes) {
            Ok(()) => self.status = Some(format!("Saved {file_name}")),
            Err(err) => {
                log::error!("Failed to write {file_name}: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Resize the session to the on-screen canvas and feed it this frame's input
    pub(crate) fn handle_canvas_input(&mut self, ctx: &egui::Context, container: Rect) {
        let pixels_per_point = ctx.pixels_per_point();
        if container != self.session.container()
            || pixels_per_point != self.session.device_pixel_ratio()
        {
            self.apply(|session| session.resize(container, pixels_per_point));
        }
        self.input.set_canvas_rect(container);

        for event in self.input.process_input(ctx) {
            self.apply(|session| session.handle_event(&event));
        }
    }

    /// Insert any image files dropped onto the window
    pub(crate) fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let bytes = match (&file.bytes, &file.path) {
                (Some(bytes), _) => bytes.to_vec(),
                (None, Some(path)) => match std::fs::read(path) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        log::error!("Failed to read {}: {err}", path.display());
                        continue;
                    }
                },
                (None, None) => continue,
            };
            log::info!("Dropped file {:?} ({} bytes)", file.name, bytes.len());
            self.apply(|session| session.insert_image_file(bytes));
        }
    }

    /// Texture of the display raster, re-uploaded after any change
    pub(crate) fn canvas_texture(&mut self, ctx: &egui::Context) -> &TextureHandle {
        let upload = self.needs_upload || self.texture.is_none();
        if upload {
            let display = self.session.render_display();
            let [width, height] = display.size();
            let image = ColorImage::from_rgba_unmultiplied(
                [width as usize, height as usize],
                display.pixels().as_raw(),
            );
            self.needs_upload = false;
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::LINEAR),
                None => {
                    self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::LINEAR));
                }
            }
        }
        self.texture.get_or_insert_with(|| {
            ctx.load_texture("canvas", ColorImage::new([1, 1], Color32::WHITE), TextureOptions::LINEAR)
        })
    }

    /// Floating editor over the open text box
    pub(crate) fn show_text_editor(&mut self, ctx: &egui::Context) {
        let Some(text) = self.session.editing_text().cloned() else {
            self.draft_owner = None;
            return;
        };
        let opened = self.draft_owner != Some(text.id());
        if opened {
            self.text_draft = text.content().to_owned();
            self.draft_owner = Some(text.id());
        }

        let mapper = self.session.mapper();
        let anchor = mapper.to_client(text.position());
        let font_size = text.font_size() * mapper.client_per_surface();

        egui::Area::new(egui::Id::new("text_editor"))
            .fixed_pos(anchor)
            .show(ctx, |ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.text_draft)
                        .font(egui::FontId::proportional(font_size.max(4.0)))
                        .text_color(text.color())
                        .desired_width(f32::INFINITY)
                        .hint_text("Type here"),
                );
                if opened {
                    response.request_focus();
                }
                if response.changed() {
                    let draft = self.text_draft.clone();
                    self.apply(|session| session.update_text(&draft));
                }
                let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
                match EditorExit::from_focus(response.lost_focus(), opened, escape) {
                    Some(EditorExit::Commit) => {
                        let draft = std::mem::take(&mut self.text_draft);
                        self.apply(|session| session.commit_text(&draft));
                    }
                    Some(EditorExit::Cancel) => {
                        self.update_session(Session::cancel_text);
                        self.text_draft.clear();
                    }
                    None => {}
                }
            });
    }
}

/// How the floating text editor was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorExit {
    Commit,
    Cancel,
}

impl EditorExit {
    /// Enter or blur confirms and Escape abandons. A box opened this frame
    /// may still report the previous box's lost focus, so it is ignored.
    fn from_focus(lost_focus: bool, opened: bool, escape: bool) -> Option<Self> {
        if !lost_focus || opened {
            None
        } else if escape {
            Some(Self::Cancel)
        } else {
            Some(Self::Commit)
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, SETTINGS_KEY, self.session.settings());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        tools_panel(self, ctx);
        central_panel(self, ctx);
        self.show_text_editor(ctx);

        if self.session.is_restoring() {
            if self.apply(Session::poll_restore) != Some(false) {
                self.needs_upload = true;
            }
            ctx.request_repaint();
        }
    }
}
