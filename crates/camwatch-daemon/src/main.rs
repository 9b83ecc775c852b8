//! Process bootstrap (C11): structured logging, configuration, the frame
//! source and bus transport, the episode controller, the classifier worker
//! thread, the SIGINT handler, and the main dispatch loop. Wires C1-C10
//! into one executable; see §4.13.

mod config;
mod debug_dump;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use camwatch_bus::{BusTransport, StdioBusTransport};
use camwatch_episode::{ChannelFrameSource, EpisodeController};

use config::AppConfig;

#[cfg(feature = "classification")]
use camwatch_inference::{ModelRunner, OrtModelRunner};

fn init_tracing() {
    let compact = std::env::var("CAMWATCH_LOG_FORMAT").is_ok_and(|v| v == "compact");
    let filter = EnvFilter::from_default_env().add_directive("camwatch=info".parse().unwrap());
    if compact {
        tracing_subscriber::registry().with(fmt::layer()).with(filter).init();
    } else {
        tracing_subscriber::registry().with(fmt::layer().json()).with(filter).init();
    }
}

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();
    info!("starting camwatchd");

    let config_path = std::env::var("CAMWATCH_CONFIG").unwrap_or_else(|_| "/etc/camwatch/config.conf".to_string());
    let cfg = AppConfig::load(&config_path);
    info!(config = ?cfg, "loaded configuration");

    // The camera driver and the real broker client are external
    // collaborators (§1, out of scope). A production deployment feeds
    // `frame_tx` from its own capture callback/thread and swaps
    // `transport` for its broker client; `frame_tx` is kept alive here
    // only so `ChannelFrameSource::capture` reports `SourceUnavailable`
    // (a transient, per-event failure) rather than a channel already
    // hung up at construction time.
    let (frame_tx, frame_rx) = std::sync::mpsc::channel();
    let source = ChannelFrameSource::new(frame_rx);
    let transport = StdioBusTransport::new();

    let shutdown = Arc::new(AtomicBool::new(false));
    let controller = Arc::new(
        EpisodeController::new(
            source,
            Duration::from_secs(cfg.quiet_interval_secs),
            cfg.quality,
            shutdown.clone(),
        )
        .with_debug_dump(debug_dump::build(&cfg)),
    );

    install_signal_handler(shutdown.clone(), controller.clone());

    #[cfg(feature = "classification")]
    let worker_handle = if cfg.enabled {
        match spawn_classifier_worker(&cfg, controller.clone()) {
            Some(handle) => Some(handle),
            None => {
                error!("a detector model failed to load, aborting startup");
                std::process::exit(1);
            }
        }
    } else {
        None
    };

    if let Err(e) = transport.send("STATUS", &camwatch_bus::encode_status("start")) {
        warn!(error = %e, "failed to emit boot STATUS message");
    }

    run_dispatch_loop(&controller, &transport, &shutdown);

    if let Err(e) = transport.send("STATUS", &camwatch_bus::encode_status("stop")) {
        warn!(error = %e, "failed to emit shutdown STATUS message");
    }

    controller.request_shutdown();
    #[cfg(feature = "classification")]
    if let Some(handle) = worker_handle {
        let _ = handle.join();
    }

    drop(frame_tx);
    info!("camwatchd shutdown complete");
}

fn install_signal_handler(shutdown: Arc<AtomicBool>, controller: Arc<EpisodeController<ChannelFrameSource>>) {
    if let Err(e) = ctrlc::set_handler(move || {
        info!("SIGINT received, shutting down");
        shutdown.store(true, Ordering::SeqCst);
        controller.request_shutdown();
    }) {
        warn!(error = %e, "failed to install SIGINT handler, shutdown will only trigger on the next dispatch-loop retry");
    }
}

#[cfg(feature = "classification")]
fn spawn_classifier_worker(
    cfg: &AppConfig,
    controller: Arc<EpisodeController<ChannelFrameSource>>,
) -> Option<std::thread::JoinHandle<()>> {
    let mut person = OrtModelRunner::new(cfg.model_dir.join("person.onnx"));
    let mut delivery = OrtModelRunner::new(cfg.model_dir.join("delivery.onnx"));
    if let Err(e) = person.init() {
        error!(error = %e, "person model failed to load");
        return None;
    }
    if let Err(e) = delivery.init() {
        error!(error = %e, "delivery model failed to load");
        return None;
    }
    info!("classifier worker starting");
    Some(std::thread::spawn(move || {
        controller.run_classifier_worker(&person, &delivery);
    }))
}

/// The main dispatch loop (§4.13, §7): read one raw message, fold it onto
/// the episode controller, and on any bus-level failure (decode or
/// transport) sleep 1s before retrying rather than crashing the process.
fn run_dispatch_loop<F: camwatch_episode::FrameSource>(
    controller: &EpisodeController<F>,
    transport: &impl BusTransport,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::SeqCst) {
        let bytes = match transport.recv() {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "bus transport recv failed, retrying in 1s");
                std::thread::sleep(Duration::from_secs(1));
                continue;
            }
        };
        match camwatch_bus::dispatch(controller, &bytes) {
            Ok(Some(payload)) => {
                info!(
                    file = %payload.file_name,
                    delivery_detected = payload.delivery_detected,
                    "clip payload finalized"
                );
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "malformed bus message, retrying in 1s");
                std::thread::sleep(Duration::from_secs(1));
            }
        }
    }
}
