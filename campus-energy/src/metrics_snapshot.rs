use std::{fs, path::Path};

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static PROM_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the Prometheus recorder. No listener is started; counters are
/// rendered to a file at the end of the run.
pub fn init() -> anyhow::Result<()> {
    if PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|_| anyhow::anyhow!("failed to install Prometheus metrics recorder: one is already set"))?;

    // Only the first caller gets here.
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub fn render() -> Option<String> {
    PROM_HANDLE.get().map(PrometheusHandle::render)
}

pub fn write_snapshot(path: &Path) -> anyhow::Result<()> {
    let Some(text) = render() else {
        tracing::warn!("metrics recorder not installed, no snapshot written");
        return Ok(());
    };
    fs::write(path, text).with_context(|| format!("failed to write metrics snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote metrics snapshot");
    Ok(())
}
