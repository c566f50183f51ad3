use std::sync::{Arc, Mutex};

use brush_lite::decode::DecodeFuture;
use brush_lite::surface::decode_raster;
use brush_lite::{CanvasConfig, CanvasError, PointerSample, Session, SnapshotDecoder, ThreadDecoder};
use egui::{Color32, Pos2, Rect, Vec2};
use futures::FutureExt;
use futures::channel::oneshot;

/// Decoder whose results are held back until the test opens the gates
#[derive(Clone, Default)]
struct GatedDecoder {
    gates: Arc<Mutex<Vec<oneshot::Sender<()>>>>,
}

impl GatedDecoder {
    fn open_all(&self) {
        for gate in self.gates.lock().unwrap().drain(..) {
            let _ = gate.send(());
        }
    }
}

impl SnapshotDecoder for GatedDecoder {
    fn decode(&self, bytes: Arc<[u8]>) -> DecodeFuture {
        let (gate, opened) = oneshot::channel();
        self.gates.lock().unwrap().push(gate);
        async move {
            let _ = opened.await;
            decode_raster(&bytes)
        }
        .boxed()
    }
}

/// Decoder that never produces pixels
struct FailingDecoder;

impl SnapshotDecoder for FailingDecoder {
    fn decode(&self, _bytes: Arc<[u8]>) -> DecodeFuture {
        futures::future::ready(Err(CanvasError::DecodeCancelled)).boxed()
    }
}

fn create_session(decoder: Box<dyn SnapshotDecoder>) -> Session {
    let config = CanvasConfig {
        container_size: Vec2::new(100.0, 80.0),
        ..CanvasConfig::default()
    };
    let container = Rect::from_min_size(Pos2::ZERO, config.container_size);
    Session::new(config, container, 1.0, decoder).unwrap()
}

fn draw_line(session: &mut Session, y: f32) {
    session
        .on_pointer_down(&PointerSample::mouse(Pos2::new(10.0, y)))
        .unwrap();
    session
        .on_pointer_move(&PointerSample::mouse(Pos2::new(90.0, y)))
        .unwrap();
    session.on_pointer_up().unwrap();
}

fn painted(session: &Session, y: u32) -> bool {
    session.surface().pixel(50, y) != Some(Color32::WHITE)
}

#[test]
fn test_thread_decoder_restores_after_settle() {
    let mut session = create_session(Box::new(ThreadDecoder));
    let baseline = session.surface().export_encoded().unwrap();
    draw_line(&mut session, 40.0);

    session.undo().unwrap();
    assert_eq!(session.history().index(), Some(0));
    futures::executor::block_on(session.settle()).unwrap();

    assert!(!session.is_restoring());
    assert_eq!(session.surface().export_encoded().unwrap(), baseline);
}

#[test]
fn test_index_moves_synchronously_while_raster_lags() {
    let decoder = GatedDecoder::default();
    let mut session = create_session(Box::new(decoder.clone()));
    let baseline = session.surface().export_encoded().unwrap();
    for y in [10.0, 30.0, 50.0] {
        draw_line(&mut session, y);
    }

    for _ in 0..3 {
        assert!(session.undo().unwrap());
    }
    assert_eq!(session.history().index(), Some(0));
    assert!(session.is_restoring());
    assert!(!session.poll_restore().unwrap());
    // the raster has not caught up yet
    assert!(painted(&session, 50));

    decoder.open_all();
    assert!(session.settle_blocking().unwrap());
    assert_eq!(session.surface().export_encoded().unwrap(), baseline);
}

#[test]
fn test_new_edit_waits_for_pending_restore() {
    let decoder = GatedDecoder::default();
    let mut session = create_session(Box::new(decoder.clone()));
    draw_line(&mut session, 20.0);
    session.undo().unwrap();
    assert!(session.is_restoring());

    decoder.open_all();
    draw_line(&mut session, 60.0);

    assert!(!session.is_restoring());
    assert!(!painted(&session, 20), "undone stroke must not survive");
    assert!(painted(&session, 60));
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_stale_decode_does_not_overwrite_newer_state() {
    let decoder = GatedDecoder::default();
    let mut session = create_session(Box::new(decoder.clone()));
    draw_line(&mut session, 20.0);
    session.undo().unwrap();

    // a shell that drives decodes itself holds the restore while the user keeps drawing
    let pending = session.take_pending_restore().unwrap();
    draw_line(&mut session, 60.0);

    decoder.open_all();
    let generation = pending.generation();
    let result = futures::executor::block_on(pending.finish());
    assert!(result.is_ok());
    assert!(!session.complete_restore(generation, result).unwrap());

    assert!(painted(&session, 60));
    assert!(!painted(&session, 20), "undone stroke must not come back");
    assert!(session.is_raster_synced());
    assert_eq!(session.history().len(), 2);
}

#[test]
fn test_failed_restore_rolls_back_to_the_shown_entry() {
    let mut session = create_session(Box::new(FailingDecoder));
    draw_line(&mut session, 20.0);

    assert!(matches!(session.undo(), Err(CanvasError::DecodeCancelled)));
    // index and raster agree again: both still show the stroke
    assert_eq!(session.history().index(), Some(1));
    assert!(painted(&session, 20));
    assert!(session.is_raster_synced());

    draw_line(&mut session, 60.0);
    assert_eq!(session.history().len(), 3);
    assert_eq!(
        session.history().current().unwrap().raster().as_ref(),
        session.surface().export_encoded().unwrap().as_slice()
    );
}

#[test]
fn test_superseded_restore_is_dropped() {
    let decoder = GatedDecoder::default();
    let mut session = create_session(Box::new(decoder.clone()));
    draw_line(&mut session, 20.0);
    draw_line(&mut session, 60.0);

    session.undo().unwrap();
    let first = session.take_pending_restore().unwrap();
    session.undo().unwrap();

    decoder.open_all();
    let generation = first.generation();
    let result = futures::executor::block_on(first.finish());
    assert!(!session.complete_restore(generation, result).unwrap());

    assert!(session.settle_blocking().unwrap());
    assert!(!painted(&session, 20));
    assert!(!painted(&session, 60));
}
