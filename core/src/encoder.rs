#![deny(unsafe_code)]
//! Decimal token encoder
//!
//! Renders one integer as ASCII digits followed by [`TOKEN_SEPARATOR`] into a
//! bounded buffer. Capacity is checked against the worst-case token width of
//! the integer type *before* anything is written, so a rejected token leaves
//! the buffer untouched.

use core::fmt::Write;

use heapless::String;

use crate::error::SamplerError;

/// Separator written after every token
pub const TOKEN_SEPARATOR: char = ',';

/// Integer types that can be rendered as a token
pub trait Token: Copy + core::fmt::Display {
    /// Longest decimal rendering of any value of this type, sign included
    const MAX_LEN: usize;

    /// Worst-case bytes one token of this type occupies, separator included
    const MAX_TOKEN_LEN: usize = Self::MAX_LEN + 1;
}

macro_rules! impl_token {
    ($($ty:ty => $len:expr),* $(,)?) => {
        $(
            impl Token for $ty {
                const MAX_LEN: usize = $len;
            }
        )*
    };
}

impl_token! {
    u16 => 5,   // 65535
    i16 => 6,   // -32768
    u32 => 10,  // 4294967295
    i32 => 11,  // -2147483648
    u64 => 20,  // 18446744073709551615
    i64 => 20,  // -9223372036854775808
}

/// Append `value` and a separator to `dst`
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns `SamplerError::CapacityExceeded` if the current length plus the
/// worst-case token width of `T` would exceed `CAP`.
pub fn encode<T: Token, const CAP: usize>(
    dst: &mut String<CAP>,
    value: T,
) -> Result<usize, SamplerError> {
    let start = dst.len();
    let needed = start + T::MAX_TOKEN_LEN;
    if needed > CAP {
        return Err(SamplerError::CapacityExceeded {
            needed,
            capacity: CAP,
        });
    }

    write!(dst, "{}{}", value, TOKEN_SEPARATOR).map_err(|_| SamplerError::CapacityExceeded {
        needed,
        capacity: CAP,
    })?;

    Ok(dst.len() - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_len_matches_extremes() {
        assert_eq!(i32::MIN.to_string().len(), <i32 as Token>::MAX_LEN);
        assert_eq!(u32::MAX.to_string().len(), <u32 as Token>::MAX_LEN);
        assert_eq!(i64::MIN.to_string().len(), <i64 as Token>::MAX_LEN);
        assert_eq!(u64::MAX.to_string().len(), <u64 as Token>::MAX_LEN);
        assert_eq!(i16::MIN.to_string().len(), <i16 as Token>::MAX_LEN);
        assert_eq!(u16::MAX.to_string().len(), <u16 as Token>::MAX_LEN);
    }

    #[test]
    fn test_encode_appends_separator() {
        let mut buf: String<32> = String::new();
        assert_eq!(encode(&mut buf, 123_i32), Ok(4));
        assert_eq!(encode(&mut buf, -7_i32), Ok(3));
        assert_eq!(encode(&mut buf, 0_u32), Ok(2));
        assert_eq!(buf.as_str(), "123,-7,0,");
    }

    #[test]
    fn test_encode_extremes() {
        let mut buf: String<32> = String::new();
        assert_eq!(encode(&mut buf, i32::MAX), Ok(11));
        assert_eq!(encode(&mut buf, i32::MIN), Ok(12));
        assert_eq!(buf.as_str(), "2147483647,-2147483648,");
    }

    #[test]
    fn test_encode_rejects_without_writing() {
        // 11 bytes free but an i32 token may need 12
        let mut buf: String<12> = String::new();
        buf.push('[').ok();
        let err = encode(&mut buf, 5_i32).unwrap_err();
        assert_eq!(
            err,
            SamplerError::CapacityExceeded {
                needed: 13,
                capacity: 12
            }
        );
        assert_eq!(buf.as_str(), "[");
    }

    #[test]
    fn test_encode_exact_fit() {
        let mut buf: String<12> = String::new();
        assert_eq!(encode(&mut buf, i32::MIN), Ok(12));
        assert_eq!(buf.len(), buf.capacity());
    }
}
