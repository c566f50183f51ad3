use std::sync::Arc;
use std::task::Poll;

use egui::{Color32, Pos2, Rect, Vec2};
use image::RgbaImage;

use crate::config::{CancelPolicy, CanvasConfig};
use crate::decode::{InlineDecoder, PendingRestore, SnapshotDecoder};
use crate::element::{InsertedImage, ObjectId, ObjectLayer, TextBox, TextCommit};
use crate::error::CanvasResult;
use crate::geometry::hit_testing::rect_from_corners;
use crate::geometry::{CoordinateMapper, buffer_size_for};
use crate::history::{HistoryEntry, HistoryList};
use crate::input::{InputEvent, PointerSample};
use crate::stroke::{StrokeEngine, StrokeStyle};
use crate::surface::{Placement, Surface, decode_raster, encode_png};
use crate::text::FontRegistry;
use crate::tools::{ToolMode, ToolSettings};
use crate::transform::TransformController;

const SELECTION_COLOR: Color32 = Color32::from_rgb(0x00, 0xff, 0x00);
const SELECTION_WIDTH: f32 = 2.0;
const SELECTION_DASH: f32 = 5.0;

/// The pointer interaction currently in progress
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Stroke,
    Pan,
    Drag {
        id: ObjectId,
        grab_offset: Vec2,
        moved: bool,
    },
    Marquee {
        start: Pos2,
        end: Pos2,
    },
}

/// How a gesture ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerEnd {
    Up,
    Cancel,
    Leave,
}

/// One open canvas document and everything needed to edit it.
///
/// The shell feeds pointer events and tool changes in, and reads the
/// composited raster and display state out. Only stroke end, text commit,
/// image insert and drag end create history entries; selection feedback is
/// painted on a copy and never committed.
pub struct Session {
    config: CanvasConfig,
    settings: ToolSettings,
    surface: Surface,
    layer: ObjectLayer,
    history: HistoryList,
    transform: TransformController,
    fonts: FontRegistry,
    stroke: StrokeEngine,
    gesture: Gesture,
    selection: Option<ObjectId>,
    selection_area: Option<Rect>,
    /// Logical on-screen rectangle of the canvas element, before zoom and pan
    container: Rect,
    device_pixel_ratio: f32,
    decoder: Box<dyn SnapshotDecoder>,
    /// Bumped by every edit and restore request; decodes from older generations are dropped
    generation: u64,
    pending: Option<PendingRestore>,
    /// History entry the live raster was last rebuilt from or committed as
    raster_sequence: Option<u64>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("surface", &self.surface)
            .field("objects", &self.layer.len())
            .field("history", &self.history.len())
            .field("history_index", &self.history.index())
            .field("mode", &self.settings.mode)
            .field("zoom", &self.transform.zoom())
            .field("generation", &self.generation)
            .field("pending", &self.pending)
            .field("raster_sequence", &self.raster_sequence)
            .finish()
    }
}

impl Session {
    /// Create a blank document filling `container` and record it as the baseline entry
    pub fn new(
        config: CanvasConfig,
        container: Rect,
        device_pixel_ratio: f32,
        decoder: Box<dyn SnapshotDecoder>,
    ) -> CanvasResult<Self> {
        let config = config.normalized();
        let [width, height] = buffer_size_for(container.size(), device_pixel_ratio);
        let surface = Surface::new(width, height, config.background)?;
        let fonts = FontRegistry::with_default_fonts()?;

        let mut session = Self {
            settings: ToolSettings::from_config(&config),
            history: HistoryList::new(config.history_capacity),
            transform: TransformController::new(&config),
            surface,
            layer: ObjectLayer::new(),
            fonts,
            stroke: StrokeEngine::new(),
            gesture: Gesture::Idle,
            selection: None,
            selection_area: None,
            container,
            device_pixel_ratio,
            decoder,
            generation: 0,
            pending: None,
            raster_sequence: None,
            config,
        };
        session.commit_history("Baseline")?;
        log::info!("🎨 Canvas ready at {width}x{height}");
        Ok(session)
    }

    /// A session at the configured container size with inline decoding
    pub fn headless(config: CanvasConfig) -> CanvasResult<Self> {
        let container = Rect::from_min_size(Pos2::ZERO, config.container_size);
        Self::new(config, container, 1.0, Box::new(InlineDecoder))
    }

    // ---- read-only state ----

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn layer(&self) -> &ObjectLayer {
        &self.layer
    }

    pub fn history(&self) -> &HistoryList {
        &self.history
    }

    pub fn transform(&self) -> &TransformController {
        &self.transform
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    pub fn zoom_percent(&self) -> u32 {
        self.transform.zoom_percent()
    }

    pub fn pan(&self) -> Vec2 {
        self.transform.pan()
    }

    pub fn mode_label(&self) -> &'static str {
        self.settings.mode_label()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    /// Rubber-band rectangle in surface space, while dragging or after release
    pub fn selection_area(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Marquee { start, end } => Some(rect_from_corners(start, end)),
            _ => self.selection_area,
        }
    }

    /// The text box open in the editor, if any
    pub fn editing_text(&self) -> Option<&TextBox> {
        self.layer.editing().and_then(|id| self.layer.text_box(id))
    }

    pub fn is_restoring(&self) -> bool {
        self.pending.is_some()
    }

    pub fn stroke_state_name(&self) -> &'static str {
        self.stroke.current_state_name()
    }

    /// Mapper for the canvas as currently displayed (zoom and pan included)
    pub fn mapper(&self) -> CoordinateMapper {
        CoordinateMapper::new(self.transform.display_rect(self.container), self.surface.size())
    }

    // ---- tool configuration ----

    pub fn set_mode(&mut self, mode: ToolMode) -> CanvasResult<()> {
        if mode == self.settings.mode {
            return Ok(());
        }
        self.interrupt_gesture()?;
        self.commit_open_text()?;
        if mode != ToolMode::Select {
            self.selection = None;
            self.selection_area = None;
        }
        self.settings.mode = mode;
        log::info!("Tool mode: {}", mode.name());
        Ok(())
    }

    pub fn set_eraser(&mut self, is_eraser: bool) {
        self.settings.is_eraser = is_eraser;
    }

    pub fn set_color(&mut self, color: Color32) {
        self.settings.set_color(color);
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.settings.set_brush_size(size, &self.config);
    }

    pub fn set_eraser_size(&mut self, size: f32) {
        self.settings.set_eraser_size(size, &self.config);
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.settings.set_font_size(size, &self.config);
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) {
        let family = family.into();
        if !self.fonts.has_family(&family) {
            log::warn!("Font family {family:?} is not registered, text will use the fallback");
        }
        self.settings.font_family = family;
    }

    /// Replace all tool settings at once (e.g. restored from storage), clamped to range
    pub fn apply_settings(&mut self, settings: ToolSettings) -> CanvasResult<()> {
        let settings = settings.clamped(&self.config);
        self.set_mode(settings.mode)?;
        self.settings = settings;
        Ok(())
    }

    // ---- transform ----

    pub fn zoom_in(&mut self) {
        self.transform.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.transform.zoom_out();
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.transform.set_zoom(zoom);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.transform.pan_by(delta);
    }

    pub fn reset_transform(&mut self) {
        self.transform.reset_transform();
    }

    // ---- pointer input ----

    pub fn handle_event(&mut self, event: &InputEvent) -> CanvasResult<()> {
        match event {
            InputEvent::PointerDown(sample) => self.on_pointer_down(sample),
            InputEvent::PointerMove(sample) => self.on_pointer_move(sample),
            InputEvent::PointerUp => self.on_pointer_up(),
            InputEvent::PointerCancel => self.on_pointer_cancel(),
            InputEvent::PointerLeave => self.on_pointer_leave(),
            InputEvent::DoubleClick(sample) => self.on_double_click(sample).map(|_| ()),
            InputEvent::Undo => self.undo().map(|_| ()),
            InputEvent::Redo => self.redo().map(|_| ()),
            InputEvent::CancelText => {
                self.cancel_text();
                Ok(())
            }
        }
    }

    pub fn on_pointer_down(&mut self, sample: &PointerSample) -> CanvasResult<()> {
        let client = sample.position()?;
        if self.gesture != Gesture::Idle {
            return Ok(());
        }
        let pos = self.mapper().to_surface(client)?;
        self.commit_open_text()?;

        match self.settings.mode {
            ToolMode::Draw => {
                self.begin_edit()?;
                let style = StrokeStyle::from_settings(&self.settings);
                self.stroke.begin(pos, style, &mut self.surface);
                self.gesture = Gesture::Stroke;
            }
            ToolMode::Text => {
                self.begin_edit()?;
                self.layer.place_text_box(pos, &self.settings);
            }
            ToolMode::Translate => {
                self.transform.begin_pan(client);
                self.gesture = Gesture::Pan;
            }
            ToolMode::Select => {
                self.selection_area = None;
                match self.layer.hit_test(pos, &self.fonts) {
                    Some(id) => {
                        self.begin_edit()?;
                        let origin = self.layer.get(id).map_or(pos, |object| object.position());
                        self.selection = Some(id);
                        self.gesture = Gesture::Drag {
                            id,
                            grab_offset: pos - origin,
                            moved: false,
                        };
                    }
                    None => {
                        self.selection = None;
                        self.gesture = Gesture::Marquee { start: pos, end: pos };
                    }
                }
            }
        }
        Ok(())
    }

    pub fn on_pointer_move(&mut self, sample: &PointerSample) -> CanvasResult<()> {
        let client = sample.position()?;
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Stroke => {
                let pos = self.mapper().to_surface(client)?;
                self.stroke.extend(pos, &mut self.surface);
            }
            Gesture::Pan => self.transform.update_pan(client),
            Gesture::Drag { id, grab_offset, .. } => {
                let pos = self.mapper().to_surface(client)?;
                self.layer.move_object(id, pos - grab_offset)?;
                self.gesture = Gesture::Drag {
                    id,
                    grab_offset,
                    moved: true,
                };
            }
            Gesture::Marquee { start, .. } => {
                let end = self.mapper().to_surface(client)?;
                self.gesture = Gesture::Marquee { start, end };
            }
        }
        Ok(())
    }

    pub fn on_pointer_up(&mut self) -> CanvasResult<()> {
        self.end_gesture(PointerEnd::Up)
    }

    pub fn on_pointer_cancel(&mut self) -> CanvasResult<()> {
        self.end_gesture(PointerEnd::Cancel)
    }

    pub fn on_pointer_leave(&mut self) -> CanvasResult<()> {
        self.end_gesture(PointerEnd::Leave)
    }

    /// Re-open the text box under the pointer, in any mode
    pub fn on_double_click(&mut self, sample: &PointerSample) -> CanvasResult<Option<TextBox>> {
        let pos = self.mapper().to_surface(sample.position()?)?;
        // An empty box placed by the first click of this double-click is dropped here
        self.commit_open_text()?;
        let Some(id) = self.layer.hit_test_text(pos, &self.fonts) else {
            return Ok(None);
        };
        if self.gesture == Gesture::Stroke {
            // The second press of a double-click on text is not a stroke
            self.gesture = Gesture::Idle;
            self.stroke.finish();
            self.revert_raster()?;
        } else {
            self.interrupt_gesture()?;
        }
        let text = self.layer.edit_text_box(id)?;
        log::info!("✏️ Editing text box {id}");
        Ok(Some(text))
    }

    fn end_gesture(&mut self, reason: PointerEnd) -> CanvasResult<()> {
        let discard = reason != PointerEnd::Up && self.config.cancel_policy == CancelPolicy::Discard;
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Stroke => {
                let Some(stroke) = self.stroke.finish() else {
                    return Ok(());
                };
                if discard {
                    log::debug!("Stroke discarded on {reason:?}");
                    self.revert_raster()?;
                } else if stroke.style.erase {
                    self.commit_history("Erase")?;
                } else {
                    self.commit_history("Stroke")?;
                }
            }
            Gesture::Pan => self.transform.end_pan(),
            Gesture::Drag { moved: false, .. } => {}
            Gesture::Drag { id, .. } => {
                if discard {
                    log::debug!("Move of {id} discarded on {reason:?}");
                    self.revert_objects();
                } else {
                    self.commit_history("Move")?;
                }
            }
            Gesture::Marquee { start, end } => {
                let area = rect_from_corners(start, end);
                self.selection_area = (area.area() > 0.0).then_some(area);
            }
        }
        Ok(())
    }

    /// End whatever the pointer is doing as if it had been cancelled
    fn interrupt_gesture(&mut self) -> CanvasResult<()> {
        if self.gesture == Gesture::Idle {
            return Ok(());
        }
        self.end_gesture(PointerEnd::Cancel)
    }

    // ---- text ----

    /// Live content of the open text box while the user types
    pub fn update_text(&mut self, content: &str) -> CanvasResult<()> {
        match self.layer.editing() {
            Some(id) => self.layer.update_text_content(id, content),
            None => Ok(()),
        }
    }

    /// Confirm the open text box with `content`
    pub fn commit_text(&mut self, content: &str) -> CanvasResult<TextCommit> {
        let Some(id) = self.layer.editing() else {
            return Ok(TextCommit::Discarded);
        };
        self.begin_edit()?;
        let outcome = self.layer.commit_text_box(id, content)?;
        if outcome == TextCommit::Committed {
            self.commit_history("Text")?;
        }
        Ok(outcome)
    }

    /// Abandon the open text box without recording anything
    pub fn cancel_text(&mut self) {
        if let Some(id) = self.layer.editing() {
            log::debug!("Text edit of {id} cancelled");
            self.layer.cancel_text_edit();
        }
    }

    fn commit_open_text(&mut self) -> CanvasResult<TextCommit> {
        let content = match self.editing_text() {
            Some(text) => text.content().to_owned(),
            None => return Ok(TextCommit::Discarded),
        };
        self.commit_text(&content)
    }

    // ---- actions ----

    /// Decode an image file and centre it on the canvas.
    ///
    /// A file that fails to decode leaves the document untouched.
    pub fn insert_image_file(&mut self, bytes: impl Into<Arc<[u8]>>) -> CanvasResult<InsertedImage> {
        self.interrupt_gesture()?;
        self.commit_open_text()?;
        self.begin_edit()?;
        let [width, height] = self.surface.size();
        let image = self.layer.insert_image(
            bytes.into(),
            Vec2::new(width as f32, height as f32),
            self.config.insert_margin,
        )?;
        self.commit_history("Insert image")?;
        Ok(image)
    }

    /// Step back one entry. Returns false at the oldest entry.
    pub fn undo(&mut self) -> CanvasResult<bool> {
        self.interrupt_gesture()?;
        self.layer.cancel_text_edit();
        let Some(entry) = self.history.undo().cloned() else {
            return Ok(false);
        };
        log::info!("↩️ Undo to #{}", entry.sequence());
        self.restore_entry(&entry)?;
        Ok(true)
    }

    /// Step forward one entry. Returns false at the newest entry.
    pub fn redo(&mut self) -> CanvasResult<bool> {
        self.interrupt_gesture()?;
        self.layer.cancel_text_edit();
        let Some(entry) = self.history.redo().cloned() else {
            return Ok(false);
        };
        log::info!("↪️ Redo to #{}", entry.sequence());
        self.restore_entry(&entry)?;
        Ok(true)
    }

    /// Wipe the document and tool state back to a fresh canvas
    pub fn clear(&mut self) -> CanvasResult<()> {
        self.stroke.finish();
        self.transform.end_pan();
        self.gesture = Gesture::Idle;
        self.pending = None;
        self.generation += 1;

        self.settings = ToolSettings::from_config(&self.config);
        self.transform.reset();
        self.layer.clear();
        self.selection = None;
        self.selection_area = None;
        self.surface.clear();
        self.history.clear();
        self.commit_history("Baseline")?;
        log::info!("🧹 Canvas cleared");
        Ok(())
    }

    /// Follow a change of container size or device pixel ratio.
    ///
    /// The current history entry is letterboxed into the new buffer and its
    /// objects follow it; a text box still open in the editor is kept. No
    /// history entry is recorded; older entries are letterboxed the same way
    /// when restored.
    pub fn resize(&mut self, container: Rect, device_pixel_ratio: f32) -> CanvasResult<Placement> {
        let [width, height] = buffer_size_for(container.size(), device_pixel_ratio);
        if [width, height] == self.surface.size() {
            self.container = container;
            self.device_pixel_ratio = device_pixel_ratio;
            return Ok(Placement::IDENTITY);
        }

        self.interrupt_gesture()?;
        // Rebuild from the committed entry so repeated resizes never compound resampling
        let committed = match self.history.current().cloned() {
            Some(entry) => Some((decode_raster(entry.raster())?, entry)),
            None => None,
        };
        self.pending = None;
        self.generation += 1;

        let placement = self.surface.resize(width, height)?;
        match committed {
            Some((pixels, entry)) => {
                let entry_placement = self.surface.replace_raster(pixels);
                self.layer.rebase(entry.objects().to_vec(), &entry_placement, &placement);
                self.raster_sequence = Some(entry.sequence());
            }
            None => self.layer.rescale(&placement),
        }
        self.selection_area = None;
        self.container = container;
        self.device_pixel_ratio = device_pixel_ratio;
        log::info!("📐 Canvas resized to {width}x{height}");
        Ok(placement)
    }

    /// The composited document as PNG at the container's logical size
    pub fn export_png(&mut self) -> CanvasResult<Vec<u8>> {
        self.sync_raster()?;
        let [width, height] = buffer_size_for(self.container.size(), 1.0);
        let pixels = self.composite().scaled_to(width, height);
        let bytes = encode_png(&pixels)?;
        log::info!("📤 Exported {width}x{height} PNG ({} bytes)", bytes.len());
        Ok(bytes)
    }

    pub fn export_file_name(&self) -> &str {
        &self.config.export_file_name
    }

    // ---- rendering ----

    /// Raster with every committed object drawn over it
    pub fn composite(&self) -> Surface {
        let mut out = self.surface.clone();
        self.layer.draw_all(&mut out, &self.fonts);
        out
    }

    /// What the canvas element shows: the composite plus selection feedback
    pub fn render_display(&self) -> Surface {
        let mut out = self.composite();
        let selected = self
            .selection
            .and_then(|id| self.layer.get(id))
            .map(|object| object.rect(&self.fonts));
        for rect in selected.into_iter().chain(self.selection_area()) {
            out.stroke_dashed_rect(rect, SELECTION_COLOR, SELECTION_WIDTH, SELECTION_DASH, SELECTION_DASH);
        }
        out
    }

    // ---- history plumbing ----

    fn commit_history(&mut self, label: &str) -> CanvasResult<()> {
        let raster: Arc<[u8]> = self.surface.export_encoded()?.into();
        let entry = self.history.commit(raster, self.surface.size(), self.layer.snapshot());
        let sequence = entry.sequence();
        log::info!("💾 {label} committed as #{sequence}");
        self.raster_sequence = Some(sequence);
        Ok(())
    }

    /// Settle any restore in flight, then invalidate decodes handed out earlier
    fn begin_edit(&mut self) -> CanvasResult<()> {
        self.sync_raster()?;
        self.generation += 1;
        Ok(())
    }

    /// Make the live raster match the current history entry.
    ///
    /// A restore that failed, or whose decode was handed out and dropped as
    /// stale, leaves the raster behind the index; it is decoded here instead.
    fn sync_raster(&mut self) -> CanvasResult<()> {
        if let Err(err) = self.settle_blocking() {
            log::error!("Snapshot restore failed before edit: {err}");
        }
        let current = self.history.current().map(HistoryEntry::sequence);
        if current.is_some() && current != self.raster_sequence {
            log::warn!(
                "Raster out of step with history (#{:?} vs #{:?}), restoring synchronously",
                self.raster_sequence,
                current
            );
            self.revert_raster()?;
        }
        Ok(())
    }

    /// Whether the live raster is built on the current history entry
    pub fn is_raster_synced(&self) -> bool {
        self.pending.is_none()
            && self.history.current().map(HistoryEntry::sequence) == self.raster_sequence
    }

    /// Objects are restored at once; the raster follows when its decode lands
    fn restore_entry(&mut self, entry: &HistoryEntry) -> CanvasResult<()> {
        self.selection = None;
        self.selection_area = None;
        self.restore_objects(entry);

        self.generation += 1;
        let future = self.decoder.decode(Arc::clone(entry.raster()));
        self.pending = Some(PendingRestore::new(self.generation, entry.sequence(), future));
        self.poll_restore().map(|_| ())
    }

    fn restore_objects(&mut self, entry: &HistoryEntry) {
        self.layer.restore(entry.objects().to_vec());
        let (placement, _) = Placement::letterbox(entry.size(), self.surface.size());
        self.layer.rescale(&placement);
    }

    fn revert_raster(&mut self) -> CanvasResult<()> {
        let Some(entry) = self.history.current() else {
            return Ok(());
        };
        let sequence = entry.sequence();
        let pixels = decode_raster(entry.raster())?;
        self.surface.replace_raster(pixels);
        self.raster_sequence = Some(sequence);
        Ok(())
    }

    fn revert_objects(&mut self) {
        if let Some(entry) = self.history.current().cloned() {
            self.restore_objects(&entry);
        }
    }

    /// Apply a finished restore without blocking. Returns true when the raster changed.
    pub fn poll_restore(&mut self) -> CanvasResult<bool> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(false);
        };
        let Poll::Ready(result) = pending.poll_now() else {
            return Ok(false);
        };
        let generation = pending.generation();
        self.pending = None;
        self.complete_restore(generation, result)
    }

    /// Wait for the restore in flight, if any, and apply it
    pub async fn settle(&mut self) -> CanvasResult<bool> {
        let Some(pending) = self.pending.take() else {
            return Ok(false);
        };
        let generation = pending.generation();
        let result = pending.finish().await;
        self.complete_restore(generation, result)
    }

    pub fn settle_blocking(&mut self) -> CanvasResult<bool> {
        futures::executor::block_on(self.settle())
    }

    /// Hand the restore in flight to the caller, who reports back through
    /// [`Self::complete_restore`]
    pub fn take_pending_restore(&mut self) -> Option<PendingRestore> {
        self.pending.take()
    }

    /// Apply decoded pixels for a restore requested at `generation`.
    ///
    /// Anything that happened since (a new edit, another undo) makes the
    /// result stale; it is dropped and `Ok(false)` returned.
    pub fn complete_restore(&mut self, generation: u64, result: CanvasResult<RgbaImage>) -> CanvasResult<bool> {
        if generation != self.generation {
            log::debug!(
                "Dropping stale snapshot decode (generation {generation}, now {})",
                self.generation
            );
            return Ok(false);
        }
        let pixels = match result {
            Ok(pixels) => pixels,
            Err(err) => {
                log::error!("Snapshot restore failed: {err}");
                self.roll_back_to_raster();
                return Err(err);
            }
        };
        self.surface.replace_raster(pixels);
        // Same generation means no undo, redo or edit since the request
        self.raster_sequence = self.history.current().map(HistoryEntry::sequence);
        log::debug!("Raster restored");
        Ok(true)
    }

    /// After a failed restore, point the index and objects back at the
    /// entry the raster still shows
    fn roll_back_to_raster(&mut self) {
        let Some(sequence) = self.raster_sequence else {
            return;
        };
        match self.history.seek(sequence).cloned() {
            Some(entry) => {
                log::warn!("History rolled back to #{sequence}");
                self.restore_objects(&entry);
            }
            None => log::warn!("Entry #{sequence} is gone, raster will resync on the next edit"),
        }
    }
}
