//! The 256-bit word and its EVM arithmetic.
//!
//! `Word` is `ethereum_types::U256`: four `u64` limbs in little-endian limb
//! order, with `to_big_endian`/`from_big_endian` giving the canonical
//! 32-byte external form already.

use ethereum_types::{U256, U512};
use i256::I256;

pub type Word = U256;

#[inline]
pub fn wrapping_add(a: Word, b: Word) -> Word {
    a.overflowing_add(b).0
}

#[inline]
pub fn wrapping_sub(a: Word, b: Word) -> Word {
    a.overflowing_sub(b).0
}

#[inline]
pub fn wrapping_mul(a: Word, b: Word) -> Word {
    a.overflowing_mul(b).0
}

#[inline]
pub fn div(a: Word, b: Word) -> Word {
    if b.is_zero() {
        Word::zero()
    } else {
        a / b
    }
}

#[inline]
pub fn sdiv(a: Word, b: Word) -> Word {
    (I256::from(a) / I256::from(b)).into()
}

#[inline]
pub fn modulo(a: Word, b: Word) -> Word {
    if b.is_zero() {
        Word::zero()
    } else {
        a % b
    }
}

#[inline]
pub fn smod(a: Word, b: Word) -> Word {
    if b.is_zero() {
        Word::zero()
    } else {
        (I256::from(a) % I256::from(b)).into()
    }
}

#[inline]
pub fn addmod(a: Word, b: Word, m: Word) -> Word {
    if m.is_zero() {
        return Word::zero();
    }
    let v = (U512::from(a) + U512::from(b)) % U512::from(m);
    v.try_into().expect("result reduced modulo a U256 modulus")
}

#[inline]
pub fn mulmod(a: Word, b: Word, m: Word) -> Word {
    if m.is_zero() {
        return Word::zero();
    }
    let v = (U512::from(a) * U512::from(b)) % U512::from(m);
    v.try_into().expect("result reduced modulo a U256 modulus")
}

/// `floor(log2(value))`, used by [`exp_dynamic_gas`]. Panics on zero, as the
/// caller only invokes it when the exponent is nonzero.
fn log2floor(value: Word) -> u64 {
    assert!(!value.is_zero());
    let mut l: u64 = 256;
    for i in (0..4).rev() {
        if value.0[i] == 0 {
            l -= 64;
        } else {
            return l - 1 - value.0[i].leading_zeros() as u64;
        }
    }
    l
}

/// Additional (dynamic) gas for `EXP`: `gas_expbyte *
/// (bytes needed to hold `power`)`. Zero when the exponent is zero.
pub fn exp_dynamic_gas(power: Word, gas_per_byte: u64) -> u64 {
    if power.is_zero() {
        0
    } else {
        gas_per_byte * (log2floor(power) / 8 + 1)
    }
}

pub fn exp(mut base: Word, mut power: Word) -> Word {
    let mut v = Word::one();
    while !power.is_zero() {
        if !(power & Word::one()).is_zero() {
            v = wrapping_mul(v, base);
        }
        power >>= 1;
        base = wrapping_mul(base, base);
    }
    v
}

pub fn signextend(num_bytes: Word, value: Word) -> Word {
    if num_bytes > Word::from(32) {
        return value;
    }
    let len = num_bytes.as_usize();
    let t = 8 * (len + 1) - 1;
    let sign_bit = (value >> t) & Word::one();

    if sign_bit.is_zero() {
        let mask = (Word::one() << (t + 1)) - Word::one();
        value & mask
    } else {
        let mask = !((Word::one() << (t + 1)) - Word::one());
        value | mask
    }
}

pub fn byte(index: Word, value: Word) -> Word {
    if index >= Word::from(32) {
        return Word::zero();
    }
    let index = index.as_usize();
    // Byte 0 is the most significant byte of the big-endian representation.
    let shift = 8 * (31 - index);
    (value >> shift) & Word::from(0xffu64)
}

pub fn shl(shift: Word, value: Word) -> Word {
    if value.is_zero() || shift >= Word::from(256) {
        Word::zero()
    } else {
        value << shift.as_usize()
    }
}

pub fn shr(shift: Word, value: Word) -> Word {
    if value.is_zero() || shift >= Word::from(256) {
        Word::zero()
    } else {
        value >> shift.as_usize()
    }
}

pub fn sar(shift: Word, value: Word) -> Word {
    use i256::Sign;

    let value = I256::from(value);
    if value == I256::zero() || shift >= Word::from(256) {
        return match value.0 {
            Sign::Plus | Sign::NoSign => Word::zero(),
            Sign::Minus => I256(Sign::Minus, Word::one()).into(),
        };
    }

    let shift = shift.as_usize();
    match value.0 {
        Sign::Plus | Sign::NoSign => value.1 >> shift,
        Sign::Minus => {
            let shifted = (wrapping_sub(value.1, Word::one()) >> shift).overflowing_add(Word::one()).0;
            I256(Sign::Minus, shifted).into()
        }
    }
}

/// Number of bits needed to represent `value`, 0 for zero. Used by the
/// translator's gas-uint-overflow guard and by tests.
pub fn bit_length(value: Word) -> u32 {
    256 - value.leading_zeros()
}
