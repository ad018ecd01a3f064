//! Bit-plane and LSB extraction.
//!
//! A bit plane isolates one binary digit of every sample in a channel.
//! Plane 0 is the least significant bit, where LSB steganography hides
//! its payload.

use super::{Channel, ChannelSet, Matrix};
use serde::{Deserialize, Serialize};

/// Number of bit planes in an 8-bit sample.
pub const PLANE_COUNT: u8 = 8;

/// Returns bit `position` of `value` as 0 or 1.
///
/// Positions above 7 always yield 0.
#[inline]
pub fn extract_bit(value: u8, position: u8) -> u8 {
    value.checked_shr(u32::from(position)).unwrap_or(0) & 1
}

/// Returns the least significant bit of `value`.
#[inline]
pub fn extract_lsb(value: u8) -> u8 {
    value & 1
}

/// Extracts bit `position` of every cell.
pub fn extract_plane(matrix: &Matrix, position: u8) -> Matrix {
    matrix.map(|v| extract_bit(v, position))
}

/// One bit position across all three channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitPlane {
    /// Bit position, 0 (LSB) through 7 (MSB).
    pub plane: u8,
    #[serde(flatten)]
    pub channels: ChannelSet,
}

impl BitPlane {
    /// Returns the binary matrix for `channel`.
    pub fn get(&self, channel: Channel) -> &Matrix {
        self.channels.get(channel)
    }
}

/// Extracts all eight bit planes, ordered from plane 0 to plane 7.
pub fn extract_bit_planes(channels: &ChannelSet) -> Vec<BitPlane> {
    (0..PLANE_COUNT)
        .map(|plane| BitPlane {
            plane,
            channels: channels.map(|v| extract_bit(v, plane)),
        })
        .collect()
}

/// Extracts the least significant bit of every channel.
pub fn extract_lsb_planes(channels: &ChannelSet) -> ChannelSet {
    channels.map(extract_lsb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two(red: [u8; 4]) -> ChannelSet {
        let m = |d: [u8; 4]| Matrix::from_vec(d.to_vec(), 2, 2).unwrap();
        ChannelSet {
            red: m(red),
            green: m([0; 4]),
            blue: m([255; 4]),
        }
    }

    #[test]
    fn test_extract_bit() {
        assert_eq!(extract_bit(0b1010_0101, 0), 1);
        assert_eq!(extract_bit(0b1010_0101, 1), 0);
        assert_eq!(extract_bit(0b1010_0101, 7), 1);
        assert_eq!(extract_bit(0xFF, 8), 0);
    }

    #[test]
    fn test_byte_reconstructs_from_planes() {
        for v in 0..=255u8 {
            let rebuilt: u32 = (0..PLANE_COUNT)
                .map(|p| u32::from(extract_bit(v, p)) << p)
                .sum();
            assert_eq!(rebuilt, u32::from(v));
        }
    }

    #[test]
    fn test_lsb_matches_plane_zero() {
        for v in 0..=255u8 {
            assert_eq!(extract_lsb(v), extract_bit(v, 0));
        }
    }

    #[test]
    fn test_two_by_two_red_planes() {
        let channels = two_by_two([0, 1, 2, 3]);
        let planes = extract_bit_planes(&channels);

        assert_eq!(planes.len(), 8);
        assert_eq!(planes[0].get(Channel::Red).to_rows(), vec![vec![0, 1], vec![0, 1]]);
        assert_eq!(planes[1].get(Channel::Red).to_rows(), vec![vec![0, 0], vec![1, 1]]);
        assert!(planes[7].get(Channel::Blue).as_slice().iter().all(|&b| b == 1));
    }

    #[test]
    fn test_lsb_planes_equal_bit_plane_zero() {
        let channels = two_by_two([7, 8, 9, 10]);
        let planes = extract_bit_planes(&channels);
        let lsb = extract_lsb_planes(&channels);

        assert_eq!(planes[0].channels, lsb);
    }
}
