//! In-process stand-ins for ffprobe and ffmpeg used by the engine tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cs_av::{Prober, Transcoder};
use cs_core::config::LimitsConfig;
use cs_core::{Error, ProbeInfo, Result};

use crate::context::PipelineContext;

pub(crate) fn ctx_with(dir: &Path, prober: FakeProber, transcoder: FakeTranscoder) -> PipelineContext {
    PipelineContext::new(
        LimitsConfig::default(),
        dir,
        Arc::new(prober),
        Arc::new(transcoder),
    )
}

/// Reports a fixed duration and the file's real size.
#[derive(Clone)]
pub(crate) struct FakeProber {
    duration: Option<f64>,
    calls: Arc<AtomicUsize>,
}

impl FakeProber {
    pub fn fixed(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            calls: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            duration: None,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for FakeProber {
    fn name(&self) -> &'static str {
        "fake-probe"
    }

    async fn probe(&self, path: &Path) -> Result<ProbeInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let size_bytes = std::fs::metadata(path)
            .map_err(|e| Error::Probe(e.to_string()))?
            .len();
        match self.duration {
            Some(duration_secs) => Ok(ProbeInfo {
                duration_secs,
                size_bytes,
            }),
            None => Err(Error::Probe("not a media file".into())),
        }
    }
}

/// Writes a small output file, or a partial one and then fails.
#[derive(Clone)]
pub(crate) struct FakeTranscoder {
    fail: bool,
    calls: Arc<AtomicUsize>,
    /// Manifest path and its contents as seen during the last concat.
    pub last_manifest: Arc<Mutex<Option<(PathBuf, String)>>>,
    /// Arguments of the last extract call.
    pub last_extract: Arc<Mutex<Option<(f64, Option<f64>)>>>,
}

impl FakeTranscoder {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: Arc::default(),
            last_manifest: Arc::default(),
            last_extract: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ok()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn finish(&self, output: &Path) -> Result<()> {
        std::fs::write(output, b"transcoded")?;
        if self.fail {
            Err(Error::tool("ffmpeg", "exited with status 1: broken input"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    fn name(&self) -> &'static str {
        "fake-transcode"
    }

    async fn extract(&self, _input: &Path, output: &Path, start: f64, end: Option<f64>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_extract.lock().unwrap() = Some((start, end));
        self.finish(output)
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = std::fs::read_to_string(manifest)?;
        *self.last_manifest.lock().unwrap() = Some((manifest.to_path_buf(), body));
        self.finish(output)
    }
}
