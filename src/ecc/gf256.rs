//! GF(256) arithmetic over the QR Code field.
//!
//! The field is generated by the primitive polynomial
//! x^8 + x^4 + x^3 + x^2 + 1 (0x11D). Exponent and logarithm tables are
//! built once per process and shared.

use std::sync::OnceLock;

use crate::error::GfError;

const PRIMITIVE: u16 = 0x11D;

struct Tables {
    exp: [u8; 255],
    log: [u8; 256],
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| {
        let mut exp = [0u8; 255];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        for (i, slot) in exp.iter_mut().enumerate() {
            *slot = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x >= 0x100 {
                x ^= PRIMITIVE;
            }
        }
        Tables { exp, log }
    })
}

/// GF(256) arithmetic entry points. Stateless; all methods hit the shared
/// process-wide tables.
pub struct Gf256;

impl Gf256 {
    /// alpha^power, with the exponent reduced mod 255.
    pub fn exp(power: usize) -> u8 {
        tables().exp[power % 255]
    }

    /// Discrete logarithm base alpha.
    pub fn log(value: u8) -> Result<u8, GfError> {
        if value == 0 {
            return Err(GfError::LogOfZero);
        }
        Ok(tables().log[value as usize])
    }

    /// Field multiplication.
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let t = tables();
        let sum = t.log[a as usize] as usize + t.log[b as usize] as usize;
        t.exp[sum % 255]
    }

    /// Field division. Division by zero is a caller bug and is reported
    /// rather than panicking.
    pub fn div(a: u8, b: u8) -> Result<u8, GfError> {
        if b == 0 {
            return Err(GfError::DivisionByZero);
        }
        if a == 0 {
            return Ok(0);
        }
        let t = tables();
        let diff = 255 + t.log[a as usize] as usize - t.log[b as usize] as usize;
        Ok(t.exp[diff % 255])
    }

    /// Multiplicative inverse.
    pub fn inverse(a: u8) -> Result<u8, GfError> {
        if a == 0 {
            return Err(GfError::DivisionByZero);
        }
        let t = tables();
        Ok(t.exp[(255 - t.log[a as usize] as usize) % 255])
    }

    /// a raised to an integer power.
    pub fn pow(a: u8, n: usize) -> u8 {
        if a == 0 {
            return if n == 0 { 1 } else { 0 };
        }
        let t = tables();
        let e = t.log[a as usize] as usize * n;
        t.exp[e % 255]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exp_log_inverse_of_each_other() {
        for i in 1..=255u16 {
            let v = i as u8;
            let l = Gf256::log(v).unwrap();
            assert_eq!(Gf256::exp(l as usize), v);
        }
    }

    #[test]
    fn test_known_powers() {
        assert_eq!(Gf256::exp(0), 1);
        assert_eq!(Gf256::exp(1), 2);
        assert_eq!(Gf256::exp(7), 128);
        // First wrap past x^8 reduces by 0x11D.
        assert_eq!(Gf256::exp(8), 29);
        // alpha^255 == alpha^0.
        assert_eq!(Gf256::exp(255), 1);
    }

    #[test]
    fn test_mul_and_div_are_inverse() {
        for a in [1u8, 2, 17, 100, 255] {
            for b in [1u8, 3, 29, 142, 254] {
                let p = Gf256::mul(a, b);
                assert_eq!(Gf256::div(p, b).unwrap(), a);
            }
        }
    }

    #[test]
    fn test_mul_by_zero() {
        assert_eq!(Gf256::mul(0, 123), 0);
        assert_eq!(Gf256::mul(123, 0), 0);
    }

    #[test]
    fn test_div_by_zero_is_error() {
        assert_eq!(Gf256::div(5, 0), Err(GfError::DivisionByZero));
        assert_eq!(Gf256::log(0), Err(GfError::LogOfZero));
    }

    #[test]
    fn test_inverse() {
        for a in 1..=255u16 {
            let a = a as u8;
            let inv = Gf256::inverse(a).unwrap();
            assert_eq!(Gf256::mul(a, inv), 1);
        }
    }

    #[test]
    fn test_pow() {
        assert_eq!(Gf256::pow(2, 8), 29);
        assert_eq!(Gf256::pow(7, 0), 1);
        assert_eq!(Gf256::pow(0, 5), 0);
        assert_eq!(Gf256::pow(0, 0), 1);
    }
}
