use std::io::Cursor;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Already recording")]
    AlreadyCapturing,
    #[error("Not recording")]
    NotCapturing,
    #[error("Previous recording is still being finalized")]
    StillFinalizing,
    #[error("No recording is being finalized")]
    NotFinalizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    Capturing,
    Finalizing,
}

enum CaptureState {
    Idle,
    Capturing {
        samples: Vec<f32>,
        sample_rate: u32,
        started_at: DateTime<Utc>,
    },
    Finalizing,
}

/// A finished mono recording handed off for upload
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub captured_at: DateTime<Utc>,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Encodes the clip as 16-bit PCM WAV
    pub fn to_wav(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(value)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

/// Microphone capture as an explicit state machine:
/// Idle → Capturing → Finalizing → Idle.
pub struct AudioCapture {
    state: CaptureState,
}

impl Default for AudioCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCapture {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        match self.state {
            CaptureState::Idle => CapturePhase::Idle,
            CaptureState::Capturing { .. } => CapturePhase::Capturing,
            CaptureState::Finalizing => CapturePhase::Finalizing,
        }
    }

    pub fn start(&mut self, sample_rate: u32) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::Idle => {
                self.state = CaptureState::Capturing {
                    samples: Vec::new(),
                    sample_rate,
                    started_at: Utc::now(),
                };
                Ok(())
            }
            CaptureState::Capturing { .. } => Err(CaptureError::AlreadyCapturing),
            CaptureState::Finalizing => Err(CaptureError::StillFinalizing),
        }
    }

    pub fn push(&mut self, chunk: &[f32]) -> Result<(), CaptureError> {
        match &mut self.state {
            CaptureState::Capturing { samples, .. } => {
                samples.extend_from_slice(chunk);
                Ok(())
            }
            _ => Err(CaptureError::NotCapturing),
        }
    }

    /// Ends capturing and yields the recorded buffer; the capture stays in
    /// `Finalizing` until [`AudioCapture::finish`] is called.
    pub fn stop(&mut self) -> Result<AudioClip, CaptureError> {
        match std::mem::replace(&mut self.state, CaptureState::Finalizing) {
            CaptureState::Capturing {
                samples,
                sample_rate,
                started_at,
            } => Ok(AudioClip {
                samples,
                sample_rate,
                captured_at: started_at,
            }),
            CaptureState::Idle => {
                self.state = CaptureState::Idle;
                Err(CaptureError::NotCapturing)
            }
            CaptureState::Finalizing => Err(CaptureError::NotCapturing),
        }
    }

    pub fn finish(&mut self) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::Finalizing => {
                self.state = CaptureState::Idle;
                Ok(())
            }
            _ => Err(CaptureError::NotFinalizing),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_through_every_phase() {
        let mut capture = AudioCapture::new();
        assert_eq!(capture.phase(), CapturePhase::Idle);

        capture.start(16_000).unwrap();
        assert_eq!(capture.phase(), CapturePhase::Capturing);

        capture.push(&[0.1, 0.2]).unwrap();
        capture.push(&[0.3]).unwrap();

        let clip = capture.stop().unwrap();
        assert_eq!(capture.phase(), CapturePhase::Finalizing);
        assert_eq!(clip.samples, vec![0.1, 0.2, 0.3]);
        assert_eq!(clip.sample_rate, 16_000);

        capture.finish().unwrap();
        assert_eq!(capture.phase(), CapturePhase::Idle);
    }

    #[test]
    fn rejects_out_of_order_transitions() {
        let mut capture = AudioCapture::new();
        assert_eq!(capture.push(&[0.0]), Err(CaptureError::NotCapturing));
        assert_eq!(capture.stop().unwrap_err(), CaptureError::NotCapturing);
        assert_eq!(capture.finish(), Err(CaptureError::NotFinalizing));
        assert_eq!(capture.phase(), CapturePhase::Idle);

        capture.start(8_000).unwrap();
        assert_eq!(capture.start(8_000), Err(CaptureError::AlreadyCapturing));

        capture.stop().unwrap();
        assert_eq!(capture.start(8_000), Err(CaptureError::StillFinalizing));
        assert_eq!(capture.push(&[0.0]), Err(CaptureError::NotCapturing));
        assert_eq!(capture.phase(), CapturePhase::Finalizing);
    }

    #[test]
    fn wav_encoding_preserves_length_and_rate() {
        let clip = AudioClip {
            samples: vec![0.0, 0.5, -0.5, 1.5],
            sample_rate: 22_050,
            captured_at: Utc::now(),
        };

        let bytes = clip.to_wav().unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().sample_rate, 22_050);
        assert_eq!(reader.spec().channels, 1);

        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[3], i16::MAX);
    }

    #[test]
    fn duration_follows_sample_rate() {
        let clip = AudioClip {
            samples: vec![0.0; 8_000],
            sample_rate: 16_000,
            captured_at: Utc::now(),
        };
        assert!((clip.duration_secs() - 0.5).abs() < f32::EPSILON);
    }
}
