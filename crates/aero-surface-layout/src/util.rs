use crate::{LayoutError, Result};

/// Round `value` up to a multiple of `alignment`. Alignment need not be a power of two.
pub(crate) fn align_up_u32(value: u32, alignment: u32) -> Result<u32> {
    if alignment <= 1 {
        return Ok(value);
    }
    let rem = value % alignment;
    if rem == 0 {
        return Ok(value);
    }
    value
        .checked_add(alignment - rem)
        .ok_or(LayoutError::SizeOverflow("aligned dimension"))
}

pub(crate) fn align_up_u64(value: u64, alignment: u64) -> Result<u64> {
    if alignment <= 1 {
        return Ok(value);
    }
    let rem = value % alignment;
    if rem == 0 {
        return Ok(value);
    }
    value
        .checked_add(alignment - rem)
        .ok_or(LayoutError::SizeOverflow("aligned size"))
}

pub(crate) fn div_ceil_u32(value: u32, divisor: u32) -> u32 {
    value.div_ceil(divisor.max(1))
}

/// Extent of `base` at `level`, floored at one texel.
pub(crate) fn mip_extent(base: u32, level: u32) -> u32 {
    base.checked_shr(level).unwrap_or(0).max(1)
}

pub(crate) fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

pub(crate) fn lcm_u64(a: u64, b: u64) -> Result<u64> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd_u64(a, b))
        .checked_mul(b)
        .ok_or(LayoutError::SizeOverflow("alignment lcm"))
}

pub(crate) fn mul_u64(a: u64, b: u64, what: &'static str) -> Result<u64> {
    a.checked_mul(b).ok_or(LayoutError::SizeOverflow(what))
}

pub(crate) fn add_u64(a: u64, b: u64, what: &'static str) -> Result<u64> {
    a.checked_add(b).ok_or(LayoutError::SizeOverflow(what))
}

pub(crate) fn add_u32(a: u32, b: u32, what: &'static str) -> Result<u32> {
    a.checked_add(b).ok_or(LayoutError::SizeOverflow(what))
}
