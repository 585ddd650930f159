//! Fixed-width binary-coded-decimal encoding for IRIG-B fields.
//!
//! Every time field of the frame is carried as BCD: each decimal digit becomes an
//! independent 4-bit group, most-significant digit first and most-significant bit first
//! within each group.
//!
//! ## Field Width
//!
//! A field of `width` bits is encoded as `ceil(width / 4)` zero-padded digits
//! (`4 * ceil(width / 4)` bits), and then only the trailing `width` bits are kept. For
//! widths that are a multiple of 4 nothing is dropped. For other widths the dropped bits
//! are the high-order bits of the leading digit: the 17-bit day-of-year field is five
//! digits wide and keeps only the lowest bit of its ten-thousands digit.
//!
//! ## Functions
//!
//! - [`encode_bcd`]: Converts a value into a field of `width` bits
//! - [`decode_bcd`]: Recovers a value from a field of any width up to 32 bits
//!
//! ## Limitations
//!
//! - Values are rejected instead of being silently truncated: a value that needs more
//!   digits than the field holds fails with [`EncodingError::TooManyDigits`], and a value
//!   whose leading digit would lose set bits fails with [`EncodingError::Truncated`]
//! - Widths above [`MAX_BCD_WIDTH`] (8 digits) are not supported

use core::iter::repeat_n;

use heapless::Vec;

use crate::consts::MAX_BCD_WIDTH;
use crate::error::EncodingError;

/// A BCD field as produced by [`encode_bcd`], most-significant bit first.
pub type BcdField = Vec<bool, MAX_BCD_WIDTH>;

/// Encodes `value` into a BCD field of exactly `width` bits.
///
/// # Errors
/// - [`EncodingError::InvalidWidth`] if `width` is zero or above 32
/// - [`EncodingError::TooManyDigits`] if `value` has more than `ceil(width / 4)` digits
/// - [`EncodingError::Truncated`] if dropping the leading bits would discard a `1`
///
/// # Example
/// ```rust
/// use irigb::encoding::encode_bcd;
///
/// let bits = encode_bcd(59, 8).unwrap();
/// assert_eq!(bits.as_slice(), &[false, true, false, true, true, false, false, true]);
/// ```
pub fn encode_bcd(value: u32, width: u8) -> Result<BcdField, EncodingError> {
    let field_width = usize::from(width);
    if field_width == 0 || field_width > MAX_BCD_WIDTH {
        return Err(EncodingError::InvalidWidth { width: field_width });
    }

    let digits = field_width.div_ceil(4);
    let padded_width = digits * 4;
    if u64::from(value) >= 10u64.pow(digits as u32) {
        return Err(EncodingError::TooManyDigits { value, width });
    }

    // Lay out every digit, most-significant first, then keep the trailing bits.
    let mut bits = [false; MAX_BCD_WIDTH];
    let mut rest = value;
    for digit in (0..digits).rev() {
        let nibble = rest % 10;
        rest /= 10;
        for bit in 0..4 {
            bits[digit * 4 + bit] = nibble & (0b1000 >> bit) != 0;
        }
    }

    let dropped = padded_width - field_width;
    if bits[..dropped].iter().any(|&b| b) {
        return Err(EncodingError::Truncated { value, width });
    }

    Vec::from_slice(&bits[dropped..padded_width])
        .map_err(|_| EncodingError::InvalidWidth { width: field_width })
}

/// Decodes a BCD field, most-significant bit first, back into its value.
///
/// Fields whose length is not a multiple of 4 are treated as if they were left-padded
/// with zero bits, which inverts the truncation done by [`encode_bcd`].
///
/// # Errors
/// - [`EncodingError::InvalidWidth`] if `bits` is longer than 32
/// - [`EncodingError::InvalidDigit`] if any 4-bit group is above 9
pub fn decode_bcd(bits: &[bool]) -> Result<u32, EncodingError> {
    if bits.len() > MAX_BCD_WIDTH {
        return Err(EncodingError::InvalidWidth { width: bits.len() });
    }

    let pad = (4 - bits.len() % 4) % 4;
    let mut value = 0u32;
    let mut nibble = 0u8;
    let padded = repeat_n(false, pad).chain(bits.iter().copied());
    for (i, bit) in padded.enumerate() {
        nibble = (nibble << 1) | u8::from(bit);
        if i % 4 == 3 {
            if nibble > 9 {
                return Err(EncodingError::InvalidDigit { nibble });
            }
            value = value * 10 + u32::from(nibble);
            nibble = 0;
        }
    }
    Ok(value)
}
