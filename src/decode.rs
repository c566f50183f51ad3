use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, BoxFuture, FutureExt};
use image::RgbaImage;

use crate::error::{CanvasError, CanvasResult};
use crate::surface::decode_raster;

pub type DecodeFuture = BoxFuture<'static, CanvasResult<RgbaImage>>;

/// Turns encoded snapshot bytes into pixels, possibly off the UI thread
pub trait SnapshotDecoder: Send + Sync {
    fn decode(&self, bytes: Arc<[u8]>) -> DecodeFuture;
}

/// Decodes immediately; the returned future is already resolved
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDecoder;

impl SnapshotDecoder for InlineDecoder {
    fn decode(&self, bytes: Arc<[u8]>) -> DecodeFuture {
        future::ready(decode_raster(&bytes)).boxed()
    }
}

/// Decodes on a short-lived worker thread and answers over a oneshot channel
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDecoder;

impl SnapshotDecoder for ThreadDecoder {
    fn decode(&self, bytes: Arc<[u8]>) -> DecodeFuture {
        let (sender, receiver) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("snapshot-decode".to_owned())
            .spawn(move || {
                // The receiver may already be gone if the restore went stale
                let _ = sender.send(decode_raster(&bytes));
            });
        if let Err(err) = spawned {
            log::error!("Failed to spawn decode worker: {err}");
            return future::ready(Err(CanvasError::Io(err))).boxed();
        }
        receiver
            .map(|received| received.unwrap_or(Err(CanvasError::DecodeCancelled)))
            .boxed()
    }
}

/// A raster restore in flight, tagged with the session generation that asked for it
pub struct PendingRestore {
    generation: u64,
    sequence: u64,
    future: DecodeFuture,
}

impl std::fmt::Debug for PendingRestore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRestore")
            .field("generation", &self.generation)
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl PendingRestore {
    pub fn new(generation: u64, sequence: u64, future: DecodeFuture) -> Self {
        Self {
            generation,
            sequence,
            future,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// History entry being restored
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Check for completion without blocking
    pub fn poll_now(&mut self) -> Poll<CanvasResult<RgbaImage>> {
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        self.future.poll_unpin(&mut cx)
    }

    /// Wait for the decode to finish
    pub async fn finish(self) -> CanvasResult<RgbaImage> {
        self.future.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::encode_png;
    use image::Rgba;

    fn encoded() -> Arc<[u8]> {
        let pixels = RgbaImage::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        encode_png(&pixels).unwrap().into()
    }

    #[test]
    fn inline_decoder_is_ready_immediately() {
        let mut pending = PendingRestore::new(1, 0, InlineDecoder.decode(encoded()));
        match pending.poll_now() {
            Poll::Ready(Ok(pixels)) => assert_eq!(pixels.dimensions(), (3, 2)),
            other => panic!("expected decoded pixels, got {:?}", other.map(|r| r.is_ok())),
        }
    }

    #[test]
    fn thread_decoder_resolves() {
        let pending = PendingRestore::new(1, 0, ThreadDecoder.decode(encoded()));
        let pixels = futures::executor::block_on(pending.finish()).unwrap();
        assert_eq!(pixels.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn decode_errors_surface() {
        let bytes: Arc<[u8]> = Arc::from(&b"nope"[..]);
        let result = futures::executor::block_on(ThreadDecoder.decode(bytes));
        assert!(matches!(result, Err(CanvasError::Decode(_))));
    }
}
