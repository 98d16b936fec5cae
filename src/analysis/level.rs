//! RMS loudness of unsigned 8-bit time-domain windows.

use crate::MonoFixError;

/// The byte value of a zero-amplitude sample.
const CENTER: f64 = 128.0;

/// Computes the RMS of a window of unsigned 8-bit samples centered at 128.
///
/// Silence (every byte at 128) yields 0.0 and a window at full negative
/// deflection (every byte at 0) yields 1.0.
///
/// # Errors
///
/// Returns [`MonoFixError::InvalidInput`] for an empty window.
///
/// # Example
///
/// ```
/// use mono_fix::analysis::rms;
///
/// assert_eq!(rms(&[128; 32]).unwrap(), 0.0);
/// assert_eq!(rms(&[0; 32]).unwrap(), 1.0);
/// ```
pub fn rms(window: &[u8]) -> Result<f32, MonoFixError> {
    if window.is_empty() {
        return Err(MonoFixError::invalid_input("empty sample window"));
    }

    let sum_squares: f64 = window
        .iter()
        .map(|&s| {
            let v = (f64::from(s) - CENTER) / CENTER;
            v * v
        })
        .sum();

    Ok((sum_squares / window.len() as f64).sqrt() as f32)
}

/// RMS levels of both channels for one analysis window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelLevels {
    /// Left channel RMS in [0, 1].
    pub left: f32,
    /// Right channel RMS in [0, 1].
    pub right: f32,
}

impl ChannelLevels {
    /// Computes both channel levels from their windows.
    ///
    /// # Errors
    ///
    /// Returns [`MonoFixError::InvalidInput`] if either window is empty.
    pub fn from_windows(left: &[u8], right: &[u8]) -> Result<Self, MonoFixError> {
        Ok(Self {
            left: rms(left)?,
            right: rms(right)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_silence_is_zero() {
        assert_eq!(rms(&[128; 32]).unwrap(), 0.0);
    }

    #[test]
    fn test_rms_full_deflection_is_one() {
        assert_eq!(rms(&[0; 32]).unwrap(), 1.0);
    }

    #[test]
    fn test_rms_alternating_extremes_is_near_one() {
        // 255 is one step short of full positive deflection
        let window: Vec<u8> = (0..32).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect();
        let level = rms(&window).unwrap();
        assert!((level - 1.0).abs() < 0.005, "got {level}");
    }

    #[test]
    fn test_rms_half_amplitude_square() {
        let window: Vec<u8> = (0..32).map(|i| if i % 2 == 0 { 64 } else { 192 }).collect();
        assert_eq!(rms(&window).unwrap(), 0.5);
    }

    #[test]
    fn test_rms_empty_is_invalid() {
        assert!(matches!(rms(&[]), Err(MonoFixError::InvalidInput { .. })));
    }

    #[test]
    fn test_channel_levels_from_windows() {
        let levels = ChannelLevels::from_windows(&[0; 8], &[128; 8]).unwrap();
        assert_eq!(levels.left, 1.0);
        assert_eq!(levels.right, 0.0);
    }

    #[test]
    fn test_channel_levels_rejects_empty_side() {
        assert!(ChannelLevels::from_windows(&[128; 8], &[]).is_err());
    }
}
