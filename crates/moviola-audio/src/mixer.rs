//! Audio mixer: sums playing voices into a stereo output block.

/// Per-voice mixer settings.
#[derive(Debug, Clone, Copy)]
pub struct MixerChannel {
    /// Volume (0.0 to 1.0).
    pub volume: f32,
    /// Pan (-1.0 = full left, 0.0 = center, 1.0 = full right).
    pub pan: f32,
}

impl Default for MixerChannel {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pan: 0.0,
        }
    }
}

impl MixerChannel {
    /// Left/right gain from volume and pan (constant-power panning).
    pub fn stereo_gain(&self) -> (f32, f32) {
        let angle = (self.pan + 1.0) * 0.25 * std::f32::consts::PI;
        // Normalised so a centered channel passes through at unity
        let norm = std::f32::consts::SQRT_2;
        (
            self.volume * angle.cos() * norm,
            self.volume * angle.sin() * norm,
        )
    }
}

/// One input to a mix: interleaved stereo samples plus channel settings.
#[derive(Debug, Clone, Copy)]
pub struct MixSource<'a> {
    pub samples: &'a [f32],
    pub channel: MixerChannel,
}

/// Mixer combining voices into interleaved stereo.
pub struct Mixer {
    /// Master volume.
    pub master_volume: f32,
    /// Master limiter enabled.
    pub limiter_enabled: bool,
    /// Limiter threshold in linear amplitude.
    pub limiter_threshold: f32,
    scratch: Vec<f32>,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            master_volume: 1.0,
            limiter_enabled: true,
            limiter_threshold: 1.0,
            scratch: vec![0.0; 4096],
        }
    }

    /// Mix `frame_count` stereo frames from `sources`.
    ///
    /// Sources shorter than `frame_count` contribute silence for the
    /// missing frames. Returns the mixed block.
    pub fn mix(&mut self, sources: &[MixSource<'_>], frame_count: usize) -> &[f32] {
        let output_len = frame_count * 2;
        if self.scratch.len() < output_len {
            self.scratch.resize(output_len, 0.0);
        }
        let out = &mut self.scratch[..output_len];
        out.fill(0.0);

        for source in sources {
            let (gain_l, gain_r) = source.channel.stereo_gain();
            for (dst, src) in out.chunks_exact_mut(2).zip(source.samples.chunks_exact(2)) {
                dst[0] += src[0] * gain_l;
                dst[1] += src[1] * gain_r;
            }
        }

        for s in out.iter_mut() {
            *s *= self.master_volume;
        }

        if self.limiter_enabled {
            let threshold = self.limiter_threshold;
            for s in out.iter_mut() {
                *s = s.clamp(-threshold, threshold);
            }
        }

        &self.scratch[..output_len]
    }
}
