use std::sync::Arc;

use crate::adapters::{FFmpegAdapter, FFprobeAdapter};
use crate::app::{inspect_interactor::InspectInteractor, transcode_interactor::TranscodeInteractor};
use crate::domain::model::FfwrapSettings;
use crate::ports::{ProbePort, ProcessRunner};

pub trait AppContainer: Send + Sync {
    fn transcode_interactor(&self) -> Arc<TranscodeInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
}

pub struct DefaultAppContainer {
    transcode_interactor: Arc<TranscodeInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg and ffprobe adapters named in the settings
    pub fn new(settings: &FfwrapSettings) -> Self {
        let runner = Arc::new(FFmpegAdapter::new(&settings.ffmpeg_path));
        let probe = Arc::new(FFprobeAdapter::new(&settings.ffprobe_path));
        Self::with_ports(runner, probe)
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(runner: Arc<dyn ProcessRunner>, probe: Arc<dyn ProbePort>) -> Self {
        Self {
            transcode_interactor: Arc::new(TranscodeInteractor::new(runner)),
            inspect_interactor: Arc::new(InspectInteractor::new(probe)),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn transcode_interactor(&self) -> Arc<TranscodeInteractor> {
        Arc::clone(&self.transcode_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }
}
