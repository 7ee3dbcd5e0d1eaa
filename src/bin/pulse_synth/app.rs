//! Audio side: the cpal stream and the rings connecting it to the UI.

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, PushError, RingBuffer};

use pulse_synth::{
    synth::message::SynthMessage, EngineConfig, PolySynth, SharedParams, MAX_BLOCK_SIZE,
};

/// Scope/analyser window length
pub const VIS_BLOCK_LEN: usize = 1024;
/// Capacity in blocks for the audio→UI ring
const AUDIO_RING_BLOCKS: usize = 16;
const MESSAGE_RING_LEN: usize = 256;

/// Everything the UI thread needs to drive and watch the engine.
pub struct AudioHandle {
    /// Keeps the device running; dropped on quit.
    _stream: cpal::Stream,
    pub msg_tx: Producer<SynthMessage>,
    pub audio_rx: Consumer<f32>,
    pub params: Arc<SharedParams>,
    pub sample_rate: f32,
    pub channels: usize,
}

impl AudioHandle {
    /// Open the default output device and start rendering.
    pub fn start() -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let params = Arc::new(SharedParams::new());
        let (msg_tx, mut msg_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_RING_LEN);
        let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(VIS_BLOCK_LEN * AUDIO_RING_BLOCKS);

        let mut synth = PolySynth::with_params(EngineConfig::default(), Arc::clone(&params));
        synth.prepare(sample_rate as f64, MAX_BLOCK_SIZE);

        // Reused by the callback; never reallocated
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let total_frames = data.len() / channels.max(1);
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames_to_render];

                        synth.process_block(&mut [&mut *block], &mut msg_rx);

                        // Mono engine output duplicated to every device channel
                        let out_off = frames_written * channels;
                        for (i, &s) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = s;
                            }
                        }

                        for &s in block.iter() {
                            if let Err(PushError::Full(_)) = audio_tx.push(s) {
                                break; // UI is behind; drop the rest
                            }
                        }

                        frames_written += frames_to_render;
                    }
                },
                move |err| log::error!("stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;

        Ok(Self {
            _stream: stream,
            msg_tx,
            audio_rx,
            params,
            sample_rate,
            channels,
        })
    }

    /// Queue a message for the next block. Returns false if the ring is full.
    pub fn send(&mut self, message: SynthMessage) -> bool {
        self.msg_tx.push(message).is_ok()
    }
}
