/// Keeps only the bins that got louder since the previous frame.
pub struct BeatDetector {
    previous: Vec<f32>,
    min_delta: f32,
}

impl BeatDetector {
    pub fn new(spectrum_len: usize, min_delta: f32) -> Self {
        Self {
            previous: vec![0.0; spectrum_len],
            min_delta,
        }
    }

    /// `max(0, spectrum[i] - previous[i])`, with rises below `min_delta` dropped.
    /// The first frame is compared against silence.
    pub fn apply(&mut self, spectrum: &[f32]) -> Vec<f32> {
        self.previous.resize(spectrum.len(), 0.0);
        let beat = spectrum
            .iter()
            .zip(&self.previous)
            .map(|(now, before)| {
                let rise = (now - before).max(0.0);
                if rise < self.min_delta { 0.0 } else { rise }
            })
            .collect();
        self.previous.copy_from_slice(spectrum);
        beat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rises_survive() {
        let mut beat = BeatDetector::new(4, 2.0);
        assert_eq!(beat.apply(&[1.0, 5.0, 0.0, 3.0]), vec![0.0, 5.0, 0.0, 3.0]);
        assert_eq!(beat.apply(&[2.0, 1.0, 4.0, 4.0]), vec![0.0, 0.0, 4.0, 0.0]);
        // steady signal: nothing
        assert_eq!(beat.apply(&[2.0, 1.0, 4.0, 4.0]), vec![0.0; 4]);
    }
}
