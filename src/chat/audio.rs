use crate::api::AudioUpload;
use crate::error::AudioError;

/// Everything a finished recording produced, in capture order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    pub chunks: Vec<Vec<u8>>,
    pub file_name: String,
    pub mime_type: String,
}

impl Recording {
    /// Join the buffered chunks into one upload. `None` if nothing was captured.
    pub fn assemble(self) -> Option<AudioUpload> {
        let bytes = self.chunks.concat();
        if bytes.is_empty() {
            return None;
        }
        Some(AudioUpload {
            bytes,
            file_name: self.file_name,
            mime_type: self.mime_type,
        })
    }
}

/// Platform capture device. `start` asks for access and begins buffering.
pub trait Microphone: Send + Sync {
    fn start(&mut self) -> Result<Box<dyn ActiveRecording>, AudioError>;
}

pub trait ActiveRecording: Send + Sync {
    fn finish(self: Box<Self>) -> Result<Recording, AudioError>;
}

/// Stand-in used when the binary is built without microphone support.
#[derive(Debug, Default)]
pub struct NoMicrophone;

impl Microphone for NoMicrophone {
    fn start(&mut self) -> Result<Box<dyn ActiveRecording>, AudioError> {
        Err(AudioError::Unavailable(
            "built without the `microphone` feature".into(),
        ))
    }
}

#[cfg(feature = "microphone")]
pub fn default_microphone() -> Box<dyn Microphone> {
    Box::new(super::microphone::CpalMicrophone::new())
}

#[cfg(not(feature = "microphone"))]
pub fn default_microphone() -> Box<dyn Microphone> {
    Box::new(NoMicrophone)
}

/// Idempotent start/stop over a [`Microphone`]. Failures are logged and never
/// surfaced to the user.
pub struct AudioCapture {
    microphone: Box<dyn Microphone>,
    active: Option<Box<dyn ActiveRecording>>,
}

impl AudioCapture {
    pub fn new(microphone: Box<dyn Microphone>) -> Self {
        Self {
            microphone,
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self) {
        if self.active.is_some() {
            return;
        }
        match self.microphone.start() {
            Ok(recording) => {
                tracing::debug!("audio capture started");
                self.active = Some(recording);
            }
            Err(e) => tracing::warn!("audio capture could not start: {e}"),
        }
    }

    /// Finalize the active recording. `None` when nothing was recording or the
    /// recording came back empty or broken.
    pub fn stop(&mut self) -> Option<AudioUpload> {
        let recording = self.active.take()?;
        match recording.finish() {
            Ok(recording) => {
                let upload = recording.assemble();
                if upload.is_none() {
                    tracing::warn!("audio capture: {}", AudioError::Empty);
                }
                upload
            }
            Err(e) => {
                tracing::warn!("audio capture failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Microphone whose recordings yield pre-set chunks.
    #[derive(Clone, Default)]
    pub struct FakeMicrophone {
        pub chunks: Arc<Mutex<Vec<Vec<u8>>>>,
        pub starts: Arc<AtomicUsize>,
        pub deny: bool,
    }

    impl FakeMicrophone {
        pub fn with_chunks(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: Arc::new(Mutex::new(chunks.iter().map(|c| c.to_vec()).collect())),
                ..Self::default()
            }
        }

        pub fn denied() -> Self {
            Self {
                deny: true,
                ..Self::default()
            }
        }
    }

    impl Microphone for FakeMicrophone {
        fn start(&mut self) -> Result<Box<dyn ActiveRecording>, AudioError> {
            if self.deny {
                return Err(AudioError::Denied("permission dismissed".into()));
            }
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeRecording {
                chunks: self.chunks.lock().unwrap().clone(),
            }))
        }
    }

    struct FakeRecording {
        chunks: Vec<Vec<u8>>,
    }

    impl ActiveRecording for FakeRecording {
        fn finish(self: Box<Self>) -> Result<Recording, AudioError> {
            Ok(Recording {
                chunks: self.chunks,
                file_name: "recording.webm".into(),
                mime_type: "audio/webm".into(),
            })
        }
    }
}
