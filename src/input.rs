use egui::{Context, Key, PointerButton, Pos2, Rect};

use crate::error::{CanvasError, CanvasResult};

/// Raw coordinates of one pointer event: a mouse position, touch points, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerSample {
    pub client: Option<Pos2>,
    pub touches: Vec<Pos2>,
}

impl PointerSample {
    pub fn mouse(client: Pos2) -> Self {
        Self {
            client: Some(client),
            touches: Vec::new(),
        }
    }

    pub fn touch(points: impl IntoIterator<Item = Pos2>) -> Self {
        Self {
            client: None,
            touches: points.into_iter().collect(),
        }
    }

    /// The mouse position, else the first touch point.
    ///
    /// Never defaults to the origin: a sample without usable coordinates is an error.
    pub fn position(&self) -> CanvasResult<Pos2> {
        let pos = self
            .client
            .or_else(|| self.touches.first().copied())
            .ok_or(CanvasError::MissingCoordinates)?;
        if pos.x.is_finite() && pos.y.is_finite() {
            Ok(pos)
        } else {
            Err(CanvasError::MissingCoordinates)
        }
    }
}

/// Input the canvas session reacts to, in the order the shell saw it
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerSample),
    PointerMove(PointerSample),
    PointerUp,
    /// The platform took the pointer away (e.g. a cancelled touch)
    PointerCancel,
    /// The pointer left the canvas while pressed
    PointerLeave,
    DoubleClick(PointerSample),
    Undo,
    Redo,
    CancelText,
}

/// Converts raw egui input over the canvas into [`InputEvent`]s
#[derive(Debug)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
    pressed: bool,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
            pressed: false,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();
        // Shortcuts must not steal keys from an open text box
        let keyboard_free = !ctx.wants_keyboard_input();
        // Presses on floating UI (e.g. the text editor) are not canvas presses
        let over_ui = ctx.is_pointer_over_area();

        ctx.input(|input| {
            let hover = input.pointer.hover_pos();
            let primary = PointerButton::Primary;

            if input.pointer.button_pressed(primary) && !over_ui {
                if let Some(pos) = hover.filter(|pos| self.canvas_rect.contains(*pos)) {
                    events.push(InputEvent::PointerDown(PointerSample::mouse(pos)));
                    self.pressed = true;
                    if input.pointer.button_double_clicked(primary) {
                        events.push(InputEvent::DoubleClick(PointerSample::mouse(pos)));
                    }
                }
            }

            match hover {
                Some(pos) if Some(pos) != self.last_pointer_pos => {
                    if self.pressed {
                        if self.canvas_rect.contains(pos) {
                            events.push(InputEvent::PointerMove(PointerSample::mouse(pos)));
                        } else {
                            events.push(InputEvent::PointerLeave);
                            self.pressed = false;
                        }
                    }
                }
                None if self.pressed => {
                    events.push(InputEvent::PointerLeave);
                    self.pressed = false;
                }
                _ => {}
            }
            self.last_pointer_pos = hover;

            if self.pressed && input.pointer.button_released(primary) {
                events.push(InputEvent::PointerUp);
                self.pressed = false;
            }

            for event in &input.raw.events {
                if let egui::Event::Touch {
                    phase: egui::TouchPhase::Cancel,
                    ..
                } = event
                {
                    if self.pressed {
                        events.push(InputEvent::PointerCancel);
                        self.pressed = false;
                    }
                }
            }

            if keyboard_free && input.modifiers.command {
                if input.key_pressed(Key::Z) {
                    events.push(if input.modifiers.shift {
                        InputEvent::Redo
                    } else {
                        InputEvent::Undo
                    });
                } else if input.key_pressed(Key::Y) {
                    events.push(InputEvent::Redo);
                }
            }
            if input.key_pressed(Key::Escape) {
                events.push(InputEvent::CancelText);
            }
        });

        events
    }
}
