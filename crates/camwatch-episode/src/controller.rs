//! The episode controller (C7): the `Idle` / `Recording` / `Classifying`
//! state machine, the shared resource mutex, and the classifier worker's
//! scheduling loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use camwatch_models::{BoundingBox, ClassificationFrame, EpisodeFrame, MotionEvent, MotionFlags, Nv12Frame, Payload};
use tracing::{debug, info, warn};

use crate::assembler;
use crate::error::EpisodeResult;
use crate::source::FrameSource;

#[cfg(feature = "classification")]
use camwatch_inference::{ModelRunner, TopKBuffer};

struct SharedState {
    last_frame: Option<Nv12Frame>,
    captured: bool,
    episode_frame: Option<EpisodeFrame>,
    classification_frame: Option<ClassificationFrame>,
    classify_now: bool,
    recording: bool,
    payload: Payload,
    cached_frame_count: u64,
    processed_frame_count: u64,
}

impl SharedState {
    fn new() -> Self {
        Self {
            last_frame: None,
            captured: false,
            episode_frame: None,
            classification_frame: None,
            classify_now: false,
            recording: false,
            payload: Payload::idle(),
            cached_frame_count: 0,
            processed_frame_count: 0,
        }
    }
}

/// Owns the frame source, the shared resource mutex/condvar, and the clip
/// lifecycle. One instance per process.
type DebugDumpFn = dyn Fn(&str, &[u8], u32, u32) + Send + Sync;

pub struct EpisodeController<F: FrameSource> {
    // Wrapped in a `Mutex` (rather than held bare) purely so this struct is
    // `Sync` even when `F` is not — `FrameSource` only requires `Send`, and
    // the controller is shared via `Arc` with the classifier worker and
    // shutdown-handler threads, which never touch `source` themselves.
    source: Mutex<F>,
    state: Mutex<SharedState>,
    condvar: Condvar,
    quiet_interval: Duration,
    thumbnail_quality: u8,
    shutdown: Arc<AtomicBool>,
    last_delivery: Mutex<Option<Instant>>,
    debug_dump: Option<Arc<DebugDumpFn>>,
}

impl<F: FrameSource> EpisodeController<F> {
    pub fn new(source: F, quiet_interval: Duration, thumbnail_quality: u8, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            source: Mutex::new(source),
            state: Mutex::new(SharedState::new()),
            condvar: Condvar::new(),
            quiet_interval,
            thumbnail_quality,
            shutdown,
            last_delivery: Mutex::new(None),
            debug_dump: None,
        }
    }

    /// Wires the `/tmp/.store` debug dump sink (§6): invoked with
    /// `("raw"|"transformed", rgb, w, h)` during payload assembly. Absent
    /// by default; process bootstrap attaches one that checks the debug
    /// switch and writes `/opt/image_{epoch_ms}.jpg`.
    pub fn with_debug_dump(mut self, f: impl Fn(&str, &[u8], u32, u32) + Send + Sync + 'static) -> Self {
        self.debug_dump = Some(Arc::new(f));
        self
    }

    /// `clip_start`: `Idle -> Recording`. Resets the payload.
    pub fn clip_start(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.payload = Payload::started(format!("/tmp/{name}.jpeg"));
        state.recording = true;
        state.episode_frame = None;
        state.captured = false;
        info!(clip = name, "clip started");
    }

    /// `capture(pts)`: blocks on the frame source, then stores the frame
    /// under the resource mutex. Called only from the main dispatch thread.
    pub fn capture(&self) -> EpisodeResult<()> {
        let frame = self.source.lock().unwrap().capture()?;
        let mut state = self.state.lock().unwrap();
        state.last_frame = Some(frame);
        state.captured = true;
        Ok(())
    }

    /// `motion_event`: applies the update predicate and, on acceptance,
    /// replaces the current [`EpisodeFrame`] and (if classification is
    /// enabled) the [`ClassificationFrame`], waking the worker.
    ///
    /// Returns whether the event was accepted.
    pub fn motion_event(&self, event: MotionEvent, flags: MotionFlags) -> bool {
        let mut state = self.state.lock().unwrap();

        if !state.captured || !event.is_motion_detected() {
            return false;
        }
        let current_area = state.episode_frame.as_ref().map(EpisodeFrame::union_area).unwrap_or(0);
        if event.union_box.area() <= current_area {
            return false;
        }
        if !flags.passes_spatial_gate() {
            return false;
        }

        let nv12 = match &state.last_frame {
            Some(f) => f.clone(),
            None => return false,
        };

        state.cached_frame_count += 1;
        state.episode_frame = Some(EpisodeFrame {
            nv12: nv12.clone(),
            event: event.clone(),
            captured: true,
            cached: true,
        });

        #[cfg(feature = "classification")]
        {
            state.classification_frame = Some(ClassificationFrame {
                nv12,
                delivery_union_box: event.delivery_union_box,
                object_boxes: event
                    .object_boxes
                    .iter()
                    .map(|b| self.normalize_box(b, &state))
                    .collect(),
                cached: true,
            });
            state.classify_now = true;
            drop(state);
            self.condvar.notify_all();
            return true;
        }

        #[cfg(not(feature = "classification"))]
        {
            true
        }
    }

    #[cfg(feature = "classification")]
    fn normalize_box(&self, b: &BoundingBox, state: &SharedState) -> camwatch_models::NormalizedBox {
        let (w, h) = state
            .last_frame
            .as_ref()
            .map(|f| (f.w as f32, f.h as f32))
            .unwrap_or((1.0, 1.0));
        camwatch_models::NormalizedBox::new(
            b.x as f32 / w,
            b.y as f32 / h,
            (b.x + b.w) as f32 / w,
            (b.y + b.h) as f32 / h,
        )
    }

    /// `clip_end`: `Recording -> Idle`. Finalizes the payload if one was
    /// accumulated and the quiet interval has elapsed since the last
    /// delivered payload; otherwise drops it.
    pub fn clip_end(&self, name: &str) -> Option<Payload> {
        #[cfg(feature = "classification")]
        {
            let mut state = self.state.lock().unwrap();
            state.classify_now = false;
            drop(state);
            self.condvar.notify_all();
        }

        let (payload, episode_frame, initiated) = {
            let mut state = self.state.lock().unwrap();
            let initiated = state.payload.initiated;
            let payload = std::mem::replace(&mut state.payload, Payload::idle());
            let episode_frame = state.episode_frame.take();
            state.recording = false;
            (payload, episode_frame, initiated)
        };

        if !initiated {
            debug!(clip = name, "clip_end with no prior clip_start, ignoring");
            return None;
        }
        let frame = match episode_frame {
            Some(f) => f,
            None => {
                debug!(clip = name, "clip_end with no accepted motion, no payload emitted");
                return None;
            }
        };

        let mut last_delivery = self.last_delivery.lock().unwrap();
        if let Some(last) = *last_delivery {
            if last.elapsed() < self.quiet_interval {
                debug!(clip = name, "payload dropped, within quiet interval");
                return None;
            }
        }

        let dump_ref = self.debug_dump.as_deref();
        let finalized = match assembler::finalize_with_debug_dump(payload, &frame, self.thumbnail_quality, dump_ref) {
            Ok(p) => p,
            Err(e) => {
                warn!(clip = name, error = %e, "payload assembly failed");
                return None;
            }
        };
        *last_delivery = Some(Instant::now());
        Some(finalized)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    /// The classifier worker loop (§4.3 "Classification scheduling",
    /// §4.4-4.5). Blocks for the process lifetime; intended to run on its
    /// own thread, spawned by process bootstrap.
    #[cfg(feature = "classification")]
    pub fn run_classifier_worker(&self, person: &dyn ModelRunner, delivery: &dyn ModelRunner) {
        let mut guard = self.state.lock().unwrap();
        loop {
            while !guard.classify_now && !self.is_shutting_down() {
                guard = self.condvar.wait(guard).unwrap();
            }
            if self.is_shutting_down() {
                return;
            }

            let mut top_k = TopKBuffer::new();
            while guard.classify_now && !self.is_shutting_down() {
                let iteration_start = Instant::now();
                if let Some(frame) = guard.classification_frame.clone().filter(|f| f.cached) {
                    drop(guard);
                    crate::inference_step::run_person_inference(person, &frame, &mut top_k);
                    guard = self.state.lock().unwrap();
                    guard.processed_frame_count += 1;
                }
                let elapsed = iteration_start.elapsed();
                let sleep_for = Duration::from_millis(1000).saturating_sub(elapsed);
                if sleep_for > Duration::ZERO {
                    guard = self
                        .condvar
                        .wait_timeout(guard, sleep_for)
                        .unwrap()
                        .0;
                }
            }

            let delivery_detected = crate::inference_step::run_delivery_cascade(delivery, &mut top_k);
            if delivery_detected {
                guard.payload.delivery_detected = true;
            }
            top_k.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fixture::FixtureFrameSource;
    use camwatch_models::MOTION_DETECTED_KIND;

    fn flat_frame(w: u32, h: u32, pts: i64) -> Nv12Frame {
        Nv12Frame::new(vec![128u8; (w * h) as usize], vec![128u8; (w * h / 2) as usize], w, h, pts)
    }

    fn controller(frames: Vec<Nv12Frame>) -> EpisodeController<FixtureFrameSource> {
        let source = FixtureFrameSource::new(frames);
        EpisodeController::new(source, Duration::from_secs(0), 90, Arc::new(AtomicBool::new(false)))
    }

    fn motion_event(union_box: BoundingBox) -> MotionEvent {
        MotionEvent {
            pts: 100,
            kind: MOTION_DETECTED_KIND,
            score: 0.8,
            event_time: 95,
            union_box,
            delivery_union_box: BoundingBox::new(0, 0, 0, 0),
            object_boxes: vec![union_box],
        }
    }

    #[test]
    fn motion_event_is_rejected_before_any_capture() {
        let c = controller(vec![flat_frame(640, 480, 100)]);
        c.clip_start("c1");
        let accepted = c.motion_event(motion_event(BoundingBox::new(10, 10, 40, 40)), MotionFlags::new(0));
        assert!(!accepted);
    }

    #[test]
    fn motion_event_with_smaller_or_equal_union_box_is_rejected() {
        let c = controller(vec![flat_frame(640, 480, 100), flat_frame(640, 480, 101)]);
        c.clip_start("c1");
        c.capture().unwrap();
        assert!(c.motion_event(motion_event(BoundingBox::new(10, 10, 40, 40)), MotionFlags::new(0)));

        c.capture().unwrap();
        let accepted = c.motion_event(motion_event(BoundingBox::new(10, 10, 40, 40)), MotionFlags::new(0));
        assert!(!accepted, "equal-area event must not replace the current episode frame");
    }

    #[test]
    fn motion_event_failing_the_spatial_gate_is_rejected() {
        let c = controller(vec![flat_frame(640, 480, 100)]);
        c.clip_start("c1");
        c.capture().unwrap();
        // hasROI (b3) set, insideROI (b2) clear: gated out per `passes_spatial_gate`.
        let flags = MotionFlags::new(0b1000);
        let accepted = c.motion_event(motion_event(BoundingBox::new(10, 10, 40, 40)), flags);
        assert!(!accepted);
    }

    #[test]
    fn clip_end_drops_second_payload_within_quiet_interval() {
        let c = EpisodeController::new(
            FixtureFrameSource::new(vec![flat_frame(640, 480, 100), flat_frame(640, 480, 200)]),
            Duration::from_secs(120),
            90,
            Arc::new(AtomicBool::new(false)),
        );

        c.clip_start("c1");
        c.capture().unwrap();
        assert!(c.motion_event(motion_event(BoundingBox::new(10, 10, 40, 40)), MotionFlags::new(0)));
        assert!(c.clip_end("c1").is_some());

        c.clip_start("c2");
        c.capture().unwrap();
        assert!(c.motion_event(motion_event(BoundingBox::new(10, 10, 40, 40)), MotionFlags::new(0)));
        assert!(c.clip_end("c2").is_none(), "second payload inside the quiet interval must be dropped");
    }

    #[test]
    fn clip_end_with_no_prior_clip_start_emits_nothing() {
        let c = controller(vec![flat_frame(640, 480, 100)]);
        assert!(c.clip_end("never-started").is_none());
    }
}
