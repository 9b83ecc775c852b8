//! The `/tmp/.store` debug switch (§6): when that path exists, the payload
//! assembler's raw and transformed buffers are additionally written to
//! `/opt/image_{epoch_ms}.jpg` for offline inspection.

use tracing::warn;

use crate::config::AppConfig;

/// Build the closure [`camwatch_episode::EpisodeController::with_debug_dump`]
/// takes. The switch is re-checked on every call (not just at startup) so
/// toggling `/tmp/.store` at runtime takes effect on the next clip.
pub fn build(cfg: &AppConfig) -> impl Fn(&str, &[u8], u32, u32) + Send + Sync {
    let cfg = cfg.clone();
    move |label, rgb, w, h| {
        if !cfg.debug_dump_enabled() {
            return;
        }
        let epoch_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        // The spec names a single `/opt/image_{epoch_ms}.jpg`; this dumps
        // two buffers (raw + transformed) per clip, so the label is folded
        // into the name to avoid one overwriting the other at the same ms.
        let path = format!("/opt/image_{epoch_ms}_{label}.jpg");
        if let Err(e) = camwatch_vision::write_jpeg(&path, rgb, w, h, 90) {
            warn!(path, error = %e, "debug dump write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_when_switch_path_is_absent() {
        let mut cfg = AppConfig::default();
        cfg.debug_store_path = std::path::PathBuf::from("/tmp/nonexistent-camwatch-store-switch-xyz");
        let sink = build(&cfg);
        // Should not panic and should not attempt any filesystem write.
        sink("raw", &[0u8; 12], 2, 2);
    }
}
