// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;

/// Planar multi-channel output buffer.
#[derive(Debug, Default, Clone)]
pub struct AudioOutput {
    pub buffers: Vec<Vec<f32>>,
}

impl AudioOutput {
    pub fn new(channels: usize, num_samples: usize) -> Self {
        Self {
            buffers: vec![vec![0.0; num_samples]; channels],
        }
    }

    pub fn num_channels(&self) -> usize {
        self.buffers.len()
    }

    /// Length of the shortest channel.
    pub fn num_samples(&self) -> usize {
        self.buffers.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        for channel in &mut self.buffers {
            channel.fill(0.0);
        }
    }

    /// Samples of one channel, or `None` past the last channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.buffers.get(index).map(Vec::as_slice)
    }

    pub fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.buffers
    }

    /// Write frames interleaved (`L R L R ...`) into `out`.
    pub fn interleave_into(&self, out: &mut [f32]) {
        let channels = self.num_channels();
        if channels == 0 {
            return;
        }
        for (frame, chunk) in out.chunks_mut(channels).enumerate() {
            for (ch, slot) in chunk.iter_mut().enumerate() {
                *slot = self.buffers[ch].get(frame).copied().unwrap_or(0.0);
            }
        }
    }
}
