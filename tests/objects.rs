use brush_lite::surface::encode_png;
use brush_lite::{CanvasConfig, CanvasError, Object, PointerSample, Session, TextCommit, ToolMode};
use egui::{Color32, Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage};

const RED: Color32 = Color32::from_rgb(255, 0, 0);
const GREEN: Color32 = Color32::from_rgb(0, 255, 0);

fn create_session() -> Session {
    Session::headless(CanvasConfig {
        container_size: Vec2::new(100.0, 80.0),
        ..CanvasConfig::default()
    })
    .unwrap()
}

fn at(x: f32, y: f32) -> PointerSample {
    PointerSample::mouse(Pos2::new(x, y))
}

fn red_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]))).unwrap()
}

fn non_white_pixels(session: &Session, rect: Rect) -> usize {
    let composite = session.composite();
    let mut count = 0;
    for y in rect.min.y as u32..rect.max.y as u32 {
        for x in rect.min.x as u32..rect.max.x as u32 {
            if composite.pixel(x, y).is_some_and(|pixel| pixel != Color32::WHITE) {
                count += 1;
            }
        }
    }
    count
}

#[test]
fn test_text_box_commit_records_history() {
    let mut session = create_session();
    session.set_mode(ToolMode::Text).unwrap();
    session.on_pointer_down(&at(20.0, 20.0)).unwrap();
    session.on_pointer_up().unwrap();

    let editing = session.editing_text().unwrap();
    assert_eq!(editing.content(), "");
    assert_eq!(editing.position(), Pos2::new(20.0, 20.0));
    assert_eq!(session.history().len(), 1);

    assert_eq!(session.commit_text("Hello").unwrap(), TextCommit::Committed);
    assert_eq!(session.history().len(), 2);
    assert!(session.editing_text().is_none());

    let text_rect = session.layer().objects()[0].rect(session.fonts());
    assert!(non_white_pixels(&session, text_rect) > 0);
    // text lives above the raster, not in it
    assert_eq!(session.surface().pixel(22, 30), Some(Color32::WHITE));
}

#[test]
fn test_empty_text_box_is_discarded_without_history() {
    let mut session = create_session();
    session.set_mode(ToolMode::Text).unwrap();
    session.on_pointer_down(&at(20.0, 20.0)).unwrap();
    assert_eq!(session.commit_text("   ").unwrap(), TextCommit::Discarded);
    assert!(session.layer().is_empty());
    assert_eq!(session.history().len(), 1);

    session.on_pointer_down(&at(20.0, 20.0)).unwrap();
    session.update_text("abc").unwrap();
    session.cancel_text();
    assert!(session.layer().is_empty());
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_clicking_elsewhere_commits_the_open_box() {
    let mut session = create_session();
    session.set_mode(ToolMode::Text).unwrap();
    session.on_pointer_down(&at(10.0, 10.0)).unwrap();
    session.update_text("First").unwrap();
    session.on_pointer_down(&at(10.0, 50.0)).unwrap();

    assert_eq!(session.history().len(), 2);
    assert_eq!(session.layer().len(), 2);
    assert_eq!(session.editing_text().unwrap().position(), Pos2::new(10.0, 50.0));
    // the committed entry holds only the finished box
    assert_eq!(session.history().current().unwrap().objects().len(), 1);
}

#[test]
fn test_double_click_re_edits_in_place() {
    let mut session = create_session();
    session.set_mode(ToolMode::Text).unwrap();
    session.on_pointer_down(&at(20.0, 20.0)).unwrap();
    session.commit_text("Hello").unwrap();
    let id = session.layer().objects()[0].id();

    // the first click of the double-click opens a fresh box, which gets dropped
    session.on_pointer_down(&at(25.0, 30.0)).unwrap();
    let reopened = session.on_double_click(&at(25.0, 30.0)).unwrap().unwrap();
    assert_eq!(reopened.id(), id);
    assert_eq!(reopened.content(), "Hello");
    assert_eq!(session.layer().len(), 1);

    assert_eq!(session.commit_text("Hello").unwrap(), TextCommit::Discarded);
    session.on_double_click(&at(25.0, 30.0)).unwrap().unwrap();
    assert_eq!(session.commit_text("World").unwrap(), TextCommit::Committed);
    assert_eq!(session.history().len(), 3);
    assert_eq!(session.layer().text_box(id).unwrap().content(), "World");

    session.undo().unwrap();
    assert_eq!(session.layer().text_box(id).unwrap().content(), "Hello");
}

#[test]
fn test_double_click_on_empty_space_does_nothing() {
    let mut session = create_session();
    assert!(session.on_double_click(&at(50.0, 50.0)).unwrap().is_none());
    assert!(session.editing_text().is_none());
}

#[test]
fn test_inserted_image_is_centred_and_committed() {
    let mut session = create_session();
    let image = session.insert_image_file(red_png(10, 10)).unwrap();

    // ratio = min(100/10, 80/10) * 0.8 = 6.4
    assert_eq!(image.size(), Vec2::new(64.0, 64.0));
    assert_eq!(image.position(), Pos2::new(18.0, 8.0));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.composite().pixel(50, 40), Some(RED));
    assert_eq!(session.surface().pixel(50, 40), Some(Color32::WHITE));
}

#[test]
fn test_corrupt_image_leaves_document_untouched() {
    let mut session = create_session();
    let before = session.surface().export_encoded().unwrap();
    let result = session.insert_image_file(b"definitely not a png".to_vec());
    assert!(matches!(result, Err(CanvasError::Decode(_))));
    assert!(session.layer().is_empty());
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.surface().export_encoded().unwrap(), before);
}

#[test]
fn test_eraser_cannot_erase_objects() {
    let mut session = create_session();
    session.insert_image_file(red_png(10, 10)).unwrap();
    session.set_eraser(true);
    session.on_pointer_down(&at(30.0, 40.0)).unwrap();
    session.on_pointer_move(&at(70.0, 40.0)).unwrap();
    session.on_pointer_up().unwrap();
    assert_eq!(session.composite().pixel(50, 40), Some(RED));
}

#[test]
fn test_drag_in_select_mode_moves_image_and_commits_on_release() {
    let mut session = create_session();
    let image = session.insert_image_file(red_png(10, 10)).unwrap();
    session.set_mode(ToolMode::Select).unwrap();

    session.on_pointer_down(&at(50.0, 40.0)).unwrap();
    assert_eq!(session.selection(), Some(image.id()));
    session.on_pointer_move(&at(60.0, 40.0)).unwrap();
    assert_eq!(session.history().len(), 2, "dragging is preview only");
    session.on_pointer_up().unwrap();

    let moved = session.layer().get(image.id()).unwrap();
    assert_eq!(moved.position(), Pos2::new(28.0, 8.0));
    assert_eq!(session.history().len(), 3);

    // selection outline shows on the display but is never part of the document
    assert_eq!(session.render_display().pixel(29, 8), Some(GREEN));
    assert_eq!(session.composite().pixel(29, 8), Some(RED));
    let exported = brush_lite::surface::decode_raster(&session.export_png().unwrap()).unwrap();
    assert_eq!(exported.get_pixel(29, 8).0, [255, 0, 0, 255]);

    session.undo().unwrap();
    assert_eq!(session.selection(), None);
    assert_eq!(
        session.layer().get(image.id()).unwrap().position(),
        Pos2::new(18.0, 8.0)
    );
}

#[test]
fn test_click_without_drag_commits_nothing() {
    let mut session = create_session();
    session.insert_image_file(red_png(10, 10)).unwrap();
    session.set_mode(ToolMode::Select).unwrap();
    session.on_pointer_down(&at(50.0, 40.0)).unwrap();
    session.on_pointer_up().unwrap();
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_marquee_is_transient() {
    let mut session = create_session();
    session.insert_image_file(red_png(10, 10)).unwrap();
    session.set_mode(ToolMode::Select).unwrap();

    session.on_pointer_down(&at(5.0, 5.0)).unwrap();
    assert_eq!(session.selection(), None);
    session.on_pointer_move(&at(15.0, 15.0)).unwrap();
    session.on_pointer_up().unwrap();

    let area = session.selection_area().unwrap();
    assert_eq!(area, Rect::from_min_max(Pos2::new(5.0, 5.0), Pos2::new(15.0, 15.0)));
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.render_display().pixel(6, 5), Some(GREEN));
    assert_eq!(session.composite().pixel(6, 5), Some(Color32::WHITE));

    session.set_mode(ToolMode::Draw).unwrap();
    assert!(session.selection_area().is_none());
}

#[test]
fn test_objects_follow_resize() {
    let mut session = create_session();
    let image = session.insert_image_file(red_png(10, 10)).unwrap();
    session
        .resize(Rect::from_min_size(Pos2::ZERO, Vec2::new(50.0, 40.0)), 1.0)
        .unwrap();

    let Some(Object::Image(resized)) = session.layer().get(image.id()) else {
        panic!("image missing after resize");
    };
    assert_eq!(resized.position(), Pos2::new(9.0, 4.0));
    assert_eq!(resized.size(), Vec2::new(32.0, 32.0));
    assert_eq!(session.composite().pixel(25, 20), Some(RED));

    session
        .resize(Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 80.0)), 1.0)
        .unwrap();
    let restored = session.layer().get(image.id()).unwrap();
    assert_eq!(restored.position(), Pos2::new(18.0, 8.0));
    assert_eq!(session.layer().objects(), session.history().current().unwrap().objects());
}

#[test]
fn test_open_text_box_survives_resize() {
    let mut session = create_session();
    session.set_mode(ToolMode::Text).unwrap();
    session.on_pointer_down(&at(20.0, 20.0)).unwrap();
    session.update_text("draft").unwrap();

    session
        .resize(Rect::from_min_size(Pos2::ZERO, Vec2::new(50.0, 40.0)), 1.0)
        .unwrap();

    let open = session.editing_text().unwrap();
    assert_eq!(open.position(), Pos2::new(10.0, 10.0));
    assert_eq!(open.content(), "draft");
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_double_click_on_text_in_draw_mode_paints_once() {
    let mut session = create_session();
    session.set_mode(ToolMode::Text).unwrap();
    session.on_pointer_down(&at(20.0, 20.0)).unwrap();
    session.commit_text("Hello").unwrap();
    session.set_mode(ToolMode::Draw).unwrap();
    assert_eq!(session.history().len(), 2);

    // first click of the double-click is an ordinary dot
    session.on_pointer_down(&at(25.0, 30.0)).unwrap();
    session.on_pointer_up().unwrap();
    session.on_pointer_down(&at(25.0, 30.0)).unwrap();
    assert!(session.on_double_click(&at(25.0, 30.0)).unwrap().is_some());
    session.on_pointer_up().unwrap();

    assert_eq!(session.history().len(), 3);
    assert_eq!(session.stroke_state_name(), "Idle");
    assert!(session.is_raster_synced());
    assert!(session.editing_text().is_some());
}
