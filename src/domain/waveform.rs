/// Mono PCM samples at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Largest absolute amplitude, zero for an empty waveform.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    /// Right-pads with zeros up to `min_len` samples. Longer waveforms are kept as is.
    pub fn pad_to(mut self, min_len: usize) -> Self {
        if self.samples.len() < min_len {
            self.samples.resize(min_len, 0.0);
        }
        self
    }

    /// Scales so that the peak amplitude is exactly 1.0. Silence is returned untouched.
    pub fn peak_normalize(mut self) -> Self {
        let peak = self.peak();
        if peak > f32::MIN_POSITIVE && peak.is_finite() {
            self.samples.iter_mut().for_each(|s| *s /= peak);
        }
        self
    }
}
