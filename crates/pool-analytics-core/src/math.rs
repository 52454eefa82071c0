//! Decimal math helpers shared by the analytics modules.
//!
//! Integer powers use iterative multiplication and roots use Newton's method
//! so that every computation stays in `rust_decimal::Decimal` (no f64, no powd).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const ROOT_TOLERANCE: Decimal = dec!(0.000000000000000000000001);
const ROOT_MAX_ITERATIONS: u32 = 200;
const RESCALE_BELOW: Decimal = dec!(0.0001);
const MAX_RESCALE_DEGREE: u32 = 24;

/// base^n by iterative multiplication; `None` once the product leaves
/// Decimal's range.
pub fn checked_iterative_pow(base: Decimal, n: u32) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(base)?;
    }
    Some(result)
}

/// Compute base^n for a non-negative integer exponent via iterative
/// multiplication, saturating at `Decimal::MAX` / `Decimal::MIN`.
pub fn iterative_pow(base: Decimal, n: u32) -> Decimal {
    checked_iterative_pow(base, n).unwrap_or(if base.is_sign_negative() && n % 2 == 1 {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

/// Compute 1 / base^n. Returns zero when base^n underflows to zero or
/// overflows Decimal.
pub fn iterative_pow_recip(base: Decimal, n: u32) -> Decimal {
    match checked_iterative_pow(base, n) {
        Some(pow) if !pow.is_zero() => Decimal::ONE / pow,
        _ => Decimal::ZERO,
    }
}

/// Compute the nth root of a non-negative x using Newton's method.
///
/// The first guess is the smallest power of two at or above the root, so the
/// iteration approaches from above and never overshoots.
pub fn nth_root(x: Decimal, n: u32) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if x == Decimal::ONE || n == 0 {
        return Decimal::ONE;
    }
    if n == 1 {
        return x;
    }

    // Decimal keeps at most 28 fractional digits, so tiny arguments lose
    // significant digits. Rescale by 10^n (which shifts the root by 10).
    let mut x = x;
    let mut shift = Decimal::ONE;
    if n <= MAX_RESCALE_DEGREE {
        let scale = iterative_pow(dec!(10), n);
        while x < RESCALE_BELOW {
            x *= scale;
            shift *= dec!(10);
        }
    }

    let n_dec = Decimal::from(n);
    let mut guess = Decimal::ONE;
    while iterative_pow(guess, n) < x {
        guess *= dec!(2);
    }

    for _ in 0..ROOT_MAX_ITERATIONS {
        let g_n_minus_1 = iterative_pow(guess, n - 1);
        if g_n_minus_1.is_zero() {
            break;
        }
        let (Some(g_n), Some(slope)) = (
            g_n_minus_1.checked_mul(guess),
            n_dec.checked_mul(g_n_minus_1),
        ) else {
            break;
        };

        let delta = (g_n - x) / slope;
        guess -= delta;

        if delta.abs() < ROOT_TOLERANCE {
            break;
        }
    }

    guess / shift
}

/// Square root via Newton's method.
pub fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let mut guess = if val > Decimal::ONE { val / dec!(2) } else { Decimal::ONE };
    for _ in 0..ROOT_MAX_ITERATIONS {
        let next = (guess + val / guess) / dec!(2);
        if (next - guess).abs() < ROOT_TOLERANCE {
            return next;
        }
        guess = next;
    }
    guess
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().sum();
    sum / Decimal::from(values.len() as u64)
}

/// Sample standard deviation (n - 1 denominator); zero below two values.
pub fn sample_std_dev(values: &[Decimal]) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    let avg = mean(values);
    let variance: Decimal = values
        .iter()
        .map(|v| {
            let diff = *v - avg;
            diff * diff
        })
        .sum::<Decimal>()
        / Decimal::from((values.len() - 1) as u64);
    sqrt_decimal(variance)
}

/// Clamp a rate into [0, 1].
pub fn clamp_unit(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    #[test]
    fn test_iterative_pow() {
        assert_eq!(iterative_pow(dec!(2), 10), dec!(1024));
        assert_eq!(iterative_pow(dec!(0.5), 0), Decimal::ONE);
    }

    #[test]
    fn test_iterative_pow_recip() {
        assert_eq!(iterative_pow_recip(dec!(2), 3), dec!(0.125));
    }

    #[test]
    fn test_pow_overflow_saturates() {
        // 1.25^360 is far beyond Decimal::MAX (~7.9e28)
        assert_eq!(checked_iterative_pow(dec!(1.25), 360), None);
        assert_eq!(iterative_pow(dec!(1.25), 360), Decimal::MAX);
        assert_eq!(iterative_pow(dec!(-10), 31), Decimal::MIN);
        assert_eq!(iterative_pow_recip(dec!(1.25), 360), Decimal::ZERO);
        assert_eq!(iterative_pow_recip(dec!(1.005), 15000), Decimal::ZERO);
    }

    #[test]
    fn test_nth_root_twelfth() {
        let root = nth_root(dec!(0.94), 12);
        assert_close(
            iterative_pow(root, 12),
            dec!(0.94),
            dec!(0.000000000001),
            "root^12",
        );
    }

    #[test]
    fn test_nth_root_small_argument() {
        // 1e-12 ^ (1/12) = 0.1
        let root = nth_root(dec!(0.000000000001), 12);
        assert_close(root, dec!(0.1), dec!(0.000000001), "12th root of 1e-12");
    }

    #[test]
    fn test_nth_root_above_one() {
        assert_close(nth_root(dec!(27), 3), dec!(3), dec!(0.000000001), "cube root");
    }

    #[test]
    fn test_sqrt_decimal() {
        assert_close(sqrt_decimal(dec!(2)), dec!(1.414213562373), dec!(0.000000001), "sqrt 2");
        assert_close(sqrt_decimal(dec!(0.0001)), dec!(0.01), dec!(0.000000001), "sqrt 1e-4");
        assert_eq!(sqrt_decimal(dec!(-4)), Decimal::ZERO);
    }

    #[test]
    fn test_sample_std_dev() {
        // values 2,4,4,4,5,5,7,9: sample variance = 32/7
        let values = [
            dec!(2),
            dec!(4),
            dec!(4),
            dec!(4),
            dec!(5),
            dec!(5),
            dec!(7),
            dec!(9),
        ];
        assert_eq!(mean(&values), dec!(5));
        assert_close(
            sample_std_dev(&values),
            dec!(2.138089935),
            dec!(0.000001),
            "sample std dev",
        );
        assert_eq!(sample_std_dev(&[dec!(3)]), Decimal::ZERO);
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(dec!(-0.2)), Decimal::ZERO);
        assert_eq!(clamp_unit(dec!(1.3)), Decimal::ONE);
        assert_eq!(clamp_unit(dec!(0.4)), dec!(0.4));
    }
}
