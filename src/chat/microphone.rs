//! Default input device capture via `cpal`, encoded to WAV in memory.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use hound::{SampleFormat, WavSpec, WavWriter};

use super::audio::{ActiveRecording, Microphone, Recording};
use crate::error::AudioError;

#[derive(Debug, Default)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    pub fn new() -> Self {
        Self
    }
}

impl Microphone for CpalMicrophone {
    fn start(&mut self) -> Result<Box<dyn ActiveRecording>, AudioError> {
        let stop = Arc::new(AtomicBool::new(false));
        let chunks: Arc<Mutex<Vec<Vec<f32>>>> = Arc::new(Mutex::new(Vec::new()));
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        // cpal streams are not Send; the stream lives on its own thread.
        let thread = {
            let stop = stop.clone();
            let chunks = chunks.clone();
            std::thread::spawn(move || capture_thread(&stop, &chunks, &ready_tx))
        };

        match ready_rx.recv() {
            Ok(Ok(spec)) => Ok(Box::new(CpalRecording {
                stop,
                chunks,
                spec,
                thread,
            })),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => Err(AudioError::Recording("capture thread exited".into())),
        }
    }
}

fn capture_thread(
    stop: &AtomicBool,
    chunks: &Arc<Mutex<Vec<Vec<f32>>>>,
    ready: &mpsc::SyncSender<Result<WavSpec, AudioError>>,
) {
    let host = cpal::default_host();
    let Some(device) = host.default_input_device() else {
        let _ = ready.send(Err(AudioError::Unavailable("no default input device".into())));
        return;
    };
    let config = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready.send(Err(AudioError::Denied(e.to_string())));
            return;
        }
    };

    let spec = WavSpec {
        channels: config.channels(),
        sample_rate: config.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let sink = chunks.clone();
    let stream = match device.build_input_stream(
        &config.into(),
        move |data: &[f32], _: &_| {
            if let Ok(mut guard) = sink.lock() {
                guard.push(data.to_vec());
            }
        },
        |err| tracing::warn!("microphone stream error: {err}"),
        None,
    ) {
        Ok(s) => s,
        Err(e) => {
            let _ = ready.send(Err(AudioError::Denied(e.to_string())));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready.send(Err(AudioError::Recording(e.to_string())));
        return;
    }
    let _ = ready.send(Ok(spec));

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }
    drop(stream);
}

struct CpalRecording {
    stop: Arc<AtomicBool>,
    chunks: Arc<Mutex<Vec<Vec<f32>>>>,
    spec: WavSpec,
    thread: JoinHandle<()>,
}

impl ActiveRecording for CpalRecording {
    fn finish(self: Box<Self>) -> Result<Recording, AudioError> {
        self.stop.store(true, Ordering::SeqCst);
        self.thread
            .join()
            .map_err(|_| AudioError::Recording("capture thread panicked".into()))?;

        let samples = std::mem::take(
            &mut *self
                .chunks
                .lock()
                .map_err(|_| AudioError::Recording("sample buffer poisoned".into()))?,
        );

        Ok(Recording {
            chunks: vec![encode_wav(self.spec, &samples)?],
            file_name: "recording.wav".into(),
            mime_type: "audio/wav".into(),
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn encode_wav(spec: WavSpec, chunks: &[Vec<f32>]) -> Result<Vec<u8>, AudioError> {
    if chunks.iter().all(Vec::is_empty) {
        return Ok(Vec::new());
    }
    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        WavWriter::new(&mut cursor, spec).map_err(|e| AudioError::Recording(e.to_string()))?;
    for sample in chunks.iter().flatten() {
        let pcm = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(pcm)
            .map_err(|e| AudioError::Recording(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| AudioError::Recording(e.to_string()))?;
    Ok(cursor.into_inner())
}
