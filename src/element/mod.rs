use std::fmt;
use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod image;
mod text;

pub use image::InsertedImage;
pub use text::TextBox;

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::hit_testing;
use crate::surface::{Placement, Surface};
use crate::text::FontRegistry;
use crate::tools::ToolSettings;

/// Stable identity of a placed object. Time-ordered, so ids sort by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything that lives above the raster
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Text(TextBox),
    Image(InsertedImage),
}

impl Object {
    pub fn id(&self) -> ObjectId {
        match self {
            Object::Text(text) => text.id(),
            Object::Image(image) => image.id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Object::Text(_) => "text",
            Object::Image(_) => "image",
        }
    }

    pub fn position(&self) -> Pos2 {
        match self {
            Object::Text(text) => text.position(),
            Object::Image(image) => image.position(),
        }
    }

    pub fn rect(&self, fonts: &FontRegistry) -> Rect {
        match self {
            Object::Text(text) => text.rect(fonts),
            Object::Image(image) => image.rect(),
        }
    }

    fn set_position(&mut self, position: Pos2) {
        match self {
            Object::Text(text) => text.set_position(position),
            Object::Image(image) => image.set_position(position),
        }
    }

    fn rescale(&mut self, placement: &Placement) {
        match self {
            Object::Text(text) => text.rescale(placement),
            Object::Image(image) => image.rescale(placement),
        }
    }

    fn draw(&self, surface: &mut Surface, fonts: &FontRegistry) {
        match self {
            Object::Text(text) => text.draw(surface, fonts),
            Object::Image(image) => image.draw(surface),
        }
    }
}

/// A text box currently open in the editor
#[derive(Debug, Clone, PartialEq)]
struct TextEdit {
    id: ObjectId,
    /// `None` while the box was never committed
    committed_content: Option<String>,
}

/// What committing a text edit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCommit {
    /// Content changed; the caller should record history
    Committed,
    /// Nothing to record (empty box discarded or edit abandoned)
    Discarded,
}

/// Ordered collection of objects drawn over the raster in insertion order
#[derive(Debug, Clone, Default)]
pub struct ObjectLayer {
    objects: Vec<Object>,
    editing: Option<TextEdit>,
}

impl ObjectLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.iter().find(|object| object.id() == id)
    }

    fn get_mut(&mut self, id: ObjectId) -> CanvasResult<&mut Object> {
        self.objects
            .iter_mut()
            .find(|object| object.id() == id)
            .ok_or(CanvasError::UnknownObject(id))
    }

    pub fn text_box(&self, id: ObjectId) -> Option<&TextBox> {
        match self.get(id) {
            Some(Object::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn editing(&self) -> Option<ObjectId> {
        self.editing.as_ref().map(|edit| edit.id)
    }

    /// Start a new empty text box in edit state
    pub fn place_text_box(&mut self, position: Pos2, settings: &ToolSettings) -> TextBox {
        self.cancel_text_edit();
        let text = TextBox::new(
            position,
            settings.font_size,
            settings.font_family.clone(),
            settings.color,
        );
        log::debug!("Placed text box {} at {:?}", text.id(), position);
        self.editing = Some(TextEdit {
            id: text.id(),
            committed_content: None,
        });
        self.objects.push(Object::Text(text.clone()));
        text
    }

    /// Reopen an existing text box with its content pre-filled
    pub fn edit_text_box(&mut self, id: ObjectId) -> CanvasResult<TextBox> {
        let text = self
            .text_box(id)
            .cloned()
            .ok_or(CanvasError::UnknownObject(id))?;
        if self.editing() != Some(id) {
            self.cancel_text_edit();
            self.editing = Some(TextEdit {
                id,
                committed_content: Some(text.content().to_owned()),
            });
        }
        Ok(text)
    }

    /// Finish editing `id`.
    ///
    /// An empty new box is removed; an existing box left empty keeps its
    /// previous content. Neither produces history.
    pub fn commit_text_box(&mut self, id: ObjectId, content: &str) -> CanvasResult<TextCommit> {
        let edit = self.editing.take_if(|edit| edit.id == id);
        let content = content.trim_end_matches(['\r', '\n']);

        if content.trim().is_empty() {
            match edit {
                Some(TextEdit { committed_content: None, .. }) => {
                    self.remove(id);
                }
                Some(TextEdit { committed_content: Some(previous), .. }) => {
                    if let Object::Text(text) = self.get_mut(id)? {
                        text.set_content(previous);
                    }
                }
                None => {}
            }
            return Ok(TextCommit::Discarded);
        }

        let Object::Text(text) = self.get_mut(id)? else {
            return Err(CanvasError::UnknownObject(id));
        };
        if edit.as_ref().and_then(|edit| edit.committed_content.as_deref()) == Some(content) {
            return Ok(TextCommit::Discarded);
        }
        text.set_content(content.to_owned());
        log::info!("✏️ Committed text box {id}");
        Ok(TextCommit::Committed)
    }

    /// Live update while typing, so the box measures correctly
    pub fn update_text_content(&mut self, id: ObjectId, content: &str) -> CanvasResult<()> {
        match self.get_mut(id)? {
            Object::Text(text) => {
                text.set_content(content.to_owned());
                Ok(())
            }
            Object::Image(_) => Err(CanvasError::UnknownObject(id)),
        }
    }

    /// Abandon the open edit, restoring or dropping the box
    pub fn cancel_text_edit(&mut self) {
        let Some(edit) = self.editing.take() else {
            return;
        };
        match edit.committed_content {
            None => self.remove(edit.id),
            Some(previous) => {
                if let Ok(Object::Text(text)) = self.get_mut(edit.id) {
                    text.set_content(previous);
                }
            }
        }
    }

    /// Decode and centre an image inside `container`
    pub fn insert_image(&mut self, source: Arc<[u8]>, container: Vec2, margin: f32) -> CanvasResult<InsertedImage> {
        let image = InsertedImage::decode_and_fit(source, container, margin)?;
        self.objects.push(Object::Image(image.clone()));
        Ok(image)
    }

    pub fn move_object(&mut self, id: ObjectId, position: Pos2) -> CanvasResult<()> {
        self.get_mut(id)?.set_position(position);
        Ok(())
    }

    fn remove(&mut self, id: ObjectId) {
        self.objects.retain(|object| object.id() != id);
    }

    /// Topmost object under `pos`
    pub fn hit_test(&self, pos: Pos2, fonts: &FontRegistry) -> Option<ObjectId> {
        hit_testing::topmost(
            self.objects.iter().map(|object| (object.id(), object.rect(fonts))),
            pos,
        )
    }

    /// Topmost text box under `pos`
    pub fn hit_test_text(&self, pos: Pos2, fonts: &FontRegistry) -> Option<ObjectId> {
        hit_testing::topmost(
            self.objects.iter().filter_map(|object| match object {
                Object::Text(text) => Some((text.id(), text.rect(fonts))),
                Object::Image(_) => None,
            }),
            pos,
        )
    }

    /// Follow the raster through a resize or size-changing restore
    pub fn rescale(&mut self, placement: &Placement) {
        if placement.is_identity() {
            return;
        }
        for object in &mut self.objects {
            object.rescale(placement);
        }
    }

    /// Replace the committed objects with `objects` placed by `placement`,
    /// keeping the box open in the editor, which moves by `open_placement`
    pub fn rebase(&mut self, mut objects: Vec<Object>, placement: &Placement, open_placement: &Placement) {
        let open = self.editing().and_then(|id| self.get(id)).cloned();
        if !placement.is_identity() {
            for object in &mut objects {
                object.rescale(placement);
            }
        }
        if let Some(mut open) = open {
            if !open_placement.is_identity() {
                open.rescale(open_placement);
            }
            match objects.iter_mut().find(|object| object.id() == open.id()) {
                Some(slot) => *slot = open,
                None => objects.push(open),
            }
        }
        self.objects = objects;
    }

    /// Paint every object in insertion order. The box open in the editor is
    /// skipped; the shell draws it as an input field.
    pub fn draw_all(&self, surface: &mut Surface, fonts: &FontRegistry) {
        let editing = self.editing();
        for object in &self.objects {
            if Some(object.id()) == editing {
                continue;
            }
            object.draw(surface, fonts);
        }
    }

    /// Committed objects, for a history snapshot.
    ///
    /// A box still in its first edit is left out; one being re-edited is
    /// recorded with its last committed content.
    pub fn snapshot(&self) -> Vec<Object> {
        let mut objects = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            match (&self.editing, object) {
                (Some(edit), Object::Text(text)) if edit.id == text.id() => {
                    if let Some(previous) = &edit.committed_content {
                        let mut text = text.clone();
                        text.set_content(previous.clone());
                        objects.push(Object::Text(text));
                    }
                }
                _ => objects.push(object.clone()),
            }
        }
        objects
    }

    /// Replace the objects with a snapshot, closing any open edit
    pub fn restore(&mut self, objects: Vec<Object>) {
        self.editing = None;
        self.objects = objects;
    }

    pub fn clear(&mut self) {
        self.editing = None;
        self.objects.clear();
    }
}
