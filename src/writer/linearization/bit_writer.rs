//! Bit-level writer for hint table columns.
//!
//! Fields are packed most-significant-bit first. Partial bytes are carried
//! across calls until [`BitWriter::flush`] pads them out with zeros.

use crate::error::LinearizationError;

/// Widest field a hint table may declare.
pub const MAX_FIELD_BITS: u32 = 32;

/// Bit writer for encoding hint table entries.
#[derive(Debug, Default)]
pub struct BitWriter {
    buffer: Vec<u8>,
    current_byte: u8,
    bit_position: u8,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the low `num_bits` bits of `value`.
    ///
    /// Higher bits of `value` are discarded. Writing zero bits is a no-op.
    pub fn write_bits(&mut self, value: u64, num_bits: u32) -> Result<(), LinearizationError> {
        if num_bits > MAX_FIELD_BITS {
            return Err(LinearizationError::BitWidthOverflow(num_bits));
        }

        for i in (0..num_bits).rev() {
            let bit = ((value >> i) & 1) as u8;
            self.current_byte = (self.current_byte << 1) | bit;
            self.bit_position += 1;

            if self.bit_position == 8 {
                self.buffer.push(self.current_byte);
                self.current_byte = 0;
                self.bit_position = 0;
            }
        }
        Ok(())
    }

    /// Append a signed value in `num_bits`-wide two's complement.
    pub fn write_signed(&mut self, value: i64, num_bits: u32) -> Result<(), LinearizationError> {
        if num_bits > MAX_FIELD_BITS {
            return Err(LinearizationError::BitWidthOverflow(num_bits));
        }
        let encoded = if value < 0 {
            ((1i64 << num_bits) + value) as u64
        } else {
            value as u64
        };
        self.write_bits(encoded, num_bits)
    }

    /// Pad the current partial byte with zeros.
    pub fn flush(&mut self) {
        if self.bit_position > 0 {
            self.current_byte <<= 8 - self.bit_position;
            self.buffer.push(self.current_byte);
            self.current_byte = 0;
            self.bit_position = 0;
        }
    }

    /// Number of complete bytes written so far.
    pub fn count(&self) -> usize {
        self.buffer.len()
    }

    /// Flush and return the written bytes.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush();
        self.buffer
    }
}

/// Calculate the number of bits needed to represent a value.
pub fn bits_needed(value: u64) -> u32 {
    64 - value.leading_zeros()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Read `num_bits` MSB-first starting at bit `pos`.
    fn read_bits(data: &[u8], pos: usize, num_bits: u32) -> u64 {
        let mut value = 0u64;
        for i in 0..num_bits as usize {
            let bit_index = pos + i;
            let bit = (data[bit_index / 8] >> (7 - bit_index % 8)) & 1;
            value = (value << 1) | bit as u64;
        }
        value
    }

    #[test]
    fn test_bit_writer() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b1100, 4).unwrap();
        writer.write_bits(0b1, 1).unwrap();

        assert_eq!(writer.count(), 1);
        assert_eq!(writer.finish(), vec![0b10111001]);
    }

    #[test]
    fn test_flush_pads_with_zeros() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b11, 2).unwrap();
        assert_eq!(writer.count(), 0);
        writer.flush();
        assert_eq!(writer.count(), 1);
        writer.flush();
        assert_eq!(writer.count(), 1);
        assert_eq!(writer.finish(), vec![0b1100_0000]);
    }

    #[test]
    fn test_high_bits_are_discarded() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFFFF_FF0F, 4).unwrap();
        assert_eq!(writer.finish(), vec![0b1111_0000]);
    }

    #[test]
    fn test_zero_width_writes_nothing() {
        let mut writer = BitWriter::new();
        writer.write_bits(12345, 0).unwrap();
        assert!(writer.finish().is_empty());
    }

    #[test]
    fn test_width_overflow() {
        let mut writer = BitWriter::new();
        assert_eq!(
            writer.write_bits(1, 33),
            Err(LinearizationError::BitWidthOverflow(33))
        );
    }

    #[test]
    fn test_full_width_field() {
        let mut writer = BitWriter::new();
        writer.write_bits(u32::MAX as u64, 32).unwrap();
        assert_eq!(writer.finish(), vec![0xFF; 4]);
    }

    #[test]
    fn test_write_signed() {
        let mut writer = BitWriter::new();
        writer.write_signed(-1, 4).unwrap();
        writer.write_signed(3, 4).unwrap();
        assert_eq!(writer.finish(), vec![0b1111_0011]);
        assert_eq!(
            BitWriter::new().write_signed(-1, 40),
            Err(LinearizationError::BitWidthOverflow(40))
        );
    }

    #[test]
    fn test_bits_needed() {
        assert_eq!(bits_needed(0), 0);
        assert_eq!(bits_needed(1), 1);
        assert_eq!(bits_needed(2), 2);
        assert_eq!(bits_needed(3), 2);
        assert_eq!(bits_needed(4), 3);
        assert_eq!(bits_needed(255), 8);
        assert_eq!(bits_needed(256), 9);
        assert_eq!(bits_needed(u32::MAX as u64), 32);
        assert_eq!(bits_needed(1 << 32), 33);
    }

    proptest! {
        #[test]
        fn prop_max_delta_round_trips(values in prop::collection::vec(0u64..=u32::MAX as u64, 1..40)) {
            let min = *values.iter().min().unwrap();
            let max = *values.iter().max().unwrap();
            let width = bits_needed(max - min);

            let mut writer = BitWriter::new();
            for &v in &values {
                writer.write_bits(v - min, width).unwrap();
            }
            let data = writer.finish();
            prop_assert_eq!(data.len(), (values.len() * width as usize + 7) / 8);

            for (i, &v) in values.iter().enumerate() {
                prop_assert_eq!(read_bits(&data, i * width as usize, width), v - min);
            }
        }

        #[test]
        fn prop_columns_are_byte_aligned(a in 0u64..8, b in 0u64..1024) {
            let mut writer = BitWriter::new();
            writer.write_bits(a, 3).unwrap();
            writer.flush();
            let first = writer.count();
            writer.write_bits(b, 10).unwrap();
            writer.flush();
            let data = writer.finish();
            prop_assert_eq!(first, 1);
            prop_assert_eq!(read_bits(&data, 0, 3), a);
            prop_assert_eq!(read_bits(&data, 8, 10), b);
        }
    }
}
