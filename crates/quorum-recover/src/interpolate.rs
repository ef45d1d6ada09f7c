//! exact lagrange interpolation over the integers
//!
//! for points (x_i, y_i), i in 0..k, the interpolating polynomial is
//!
//! f(x) = Σ_i y_i · N_i(x) / d_i
//!
//! where
//! - N_i(x) = Π_{j ≠ i} (x - x_j)   (basis numerator, degree k-1)
//! - d_i    = Π_{j ≠ i} (x_i - x_j) (basis denominator)
//!
//! individual terms y_i · N_i[m] / d_i are generally *not* integers even when
//! the sum is, so nothing is divided until the very end. every term is lifted
//! to the common denominator D = lcm(|d_i|), accumulated exactly, and each
//! coefficient is divided by D once. a nonzero remainder means the points do
//! not lie on an integer polynomial.

use std::borrow::Borrow;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::share::Point;
use crate::{Error, Result};

/// integer polynomial, coefficient i is the coefficient of x^i
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polynomial(Vec<BigInt>);

impl Polynomial {
    pub fn new(coefficients: Vec<BigInt>) -> Self {
        Self(coefficients)
    }

    /// f(0), the secret
    pub fn constant_term(&self) -> BigInt {
        self.0.first().cloned().unwrap_or_default()
    }

    pub fn coefficients(&self) -> &[BigInt] {
        &self.0
    }

    pub fn into_coefficients(self) -> Vec<BigInt> {
        self.0
    }

    /// evaluate at `x` (horner)
    pub fn evaluate(&self, x: &BigInt) -> BigInt {
        self.0
            .iter()
            .rev()
            .fold(BigInt::zero(), |acc, c| acc * x + c)
    }
}

/// interpolation result before the final division
///
/// `numerators[m] / denominator` is the exact rational coefficient of x^m.
/// `denominator` is always positive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaledPolynomial {
    pub numerators: Vec<BigInt>,
    pub denominator: BigInt,
}

impl ScaledPolynomial {
    /// divide every coefficient by the common denominator, exactly
    pub fn into_polynomial(self) -> Result<Polynomial> {
        let denominator = self.denominator;
        self.numerators
            .into_iter()
            .enumerate()
            .map(|(coefficient, numerator)| {
                let (quotient, remainder) = numerator.div_rem(&denominator);
                if remainder.is_zero() {
                    Ok(quotient)
                } else {
                    Err(Error::InterpolationInconsistent { coefficient })
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Polynomial)
    }

    /// f(0) as a reduced fraction (numerator, positive denominator)
    pub fn constant_fraction(&self) -> (BigInt, BigInt) {
        let numerator = self.numerators.first().cloned().unwrap_or_default();
        let gcd = numerator.gcd(&self.denominator);
        if gcd.is_zero() {
            return (numerator, BigInt::one());
        }
        (numerator / &gcd, &self.denominator / &gcd)
    }
}

/// accumulate the interpolating polynomial over one common denominator
pub fn interpolate_scaled<P: Borrow<Point>>(points: &[P]) -> Result<ScaledPolynomial> {
    let k = points.len();
    if k == 0 {
        return Err(Error::InsufficientPoints { have: 0, need: 1 });
    }

    // sorted by x so the accumulation order never depends on input order
    let mut sorted: Vec<&Point> = points.iter().map(Borrow::borrow).collect();
    sorted.sort_by_key(|p| p.x);
    if let Some(pair) = sorted.windows(2).find(|w| w[0].x == w[1].x) {
        return Err(Error::DuplicateAbscissa(pair[0].x));
    }

    let xs: Vec<BigInt> = sorted.iter().map(|p| BigInt::from(p.x)).collect();

    let mut bases: Vec<(Vec<BigInt>, BigInt)> = Vec::with_capacity(k);
    for i in 0..k {
        let mut numerator = vec![BigInt::one()];
        let mut denominator = BigInt::one();
        for (j, xj) in xs.iter().enumerate() {
            if i != j {
                numerator = mul_linear(&numerator, xj);
                denominator *= &xs[i] - xj;
            }
        }
        bases.push((numerator, denominator));
    }

    let common = bases
        .iter()
        .fold(BigInt::one(), |acc, (_, d)| acc.lcm(d));

    let mut numerators = vec![BigInt::zero(); k];
    for ((basis, d), point) in bases.iter().zip(&sorted) {
        // D / d_i is exact since D is a multiple of every d_i
        let weight = &point.y * (&common / d);
        for (acc, c) in numerators.iter_mut().zip(basis) {
            *acc += &weight * c;
        }
    }

    debug_assert!(common.is_positive());
    Ok(ScaledPolynomial {
        numerators,
        denominator: common,
    })
}

/// the unique degree-(k-1) integer polynomial through `points`
///
/// fails with [`Error::DuplicateAbscissa`] if two points share an x, and
/// with [`Error::InterpolationInconsistent`] if the interpolant has a
/// non-integer coefficient.
pub fn interpolate<P: Borrow<Point>>(points: &[P]) -> Result<Polynomial> {
    interpolate_scaled(points)?.into_polynomial()
}

/// p(x) · (x - root)
fn mul_linear(poly: &[BigInt], root: &BigInt) -> Vec<BigInt> {
    let mut out = vec![BigInt::zero(); poly.len() + 1];
    for (i, c) in poly.iter().enumerate() {
        out[i + 1] += c;
        out[i] -= c * root;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: i64) -> BigInt {
        BigInt::from(v)
    }

    fn poly(coeffs: &[i64]) -> Polynomial {
        Polynomial::new(coeffs.iter().map(|&c| big(c)).collect())
    }

    fn sample(f: &Polynomial, xs: &[i64]) -> Vec<Point> {
        xs.iter().map(|&x| Point::new(x, f.evaluate(&big(x)))).collect()
    }

    #[test]
    fn test_mul_linear() {
        // (x - 3)(x - 5) = x^2 - 8x + 15
        let p = mul_linear(&mul_linear(&[big(1)], &big(3)), &big(5));
        assert_eq!(p, vec![big(15), big(-8), big(1)]);
    }

    #[test]
    fn test_interpolate_quadratic() {
        // f(x) = 1 + 2x + 3x^2: f(1) = 6, f(3) = 34, f(5) = 86
        let points = vec![Point::new(1, 6), Point::new(3, 34), Point::new(5, 86)];
        let f = interpolate(&points).unwrap();
        assert_eq!(f, poly(&[1, 2, 3]));
        assert_eq!(f.constant_term(), big(1));
    }

    #[test]
    fn test_no_per_term_truncation() {
        // the x=1 term alone contributes 6 · 15 / 8 to the constant, which is
        // not an integer; only the full sum is
        let points = vec![Point::new(1, 6), Point::new(3, 34), Point::new(5, 86)];
        let scaled = interpolate_scaled(&points).unwrap();
        assert_eq!(scaled.denominator, big(8));
        assert_eq!(scaled.numerators[0], big(8));
        assert_eq!(scaled.constant_fraction(), (big(1), big(1)));
    }

    #[test]
    fn test_interpolate_single_point() {
        let f = interpolate(&[Point::new(4, 99)]).unwrap();
        assert_eq!(f, poly(&[99]));
    }

    #[test]
    fn test_interpolate_negative_coefficients() {
        let f = poly(&[-10, 18]);
        let points = sample(&f, &[2, 3]);
        assert_eq!(interpolate(&points).unwrap(), f);
    }

    #[test]
    fn test_interpolate_order_independent() {
        let f = poly(&[42, -7, 0, 5]);
        let mut points = sample(&f, &[2, 9, 4, 7]);
        let a = interpolate(&points).unwrap();
        points.reverse();
        let b = interpolate(&points).unwrap();
        points.swap(0, 2);
        let c = interpolate(&points).unwrap();
        assert_eq!(a, f);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_interpolate_large_values() {
        let secret: BigInt = BigInt::from(2u32).pow(200) + 12345;
        let f = Polynomial::new(vec![secret.clone(), BigInt::from(3u32).pow(90), big(-1)]);
        let points = sample(&f, &[11, 22, 33]);
        let g = interpolate(&points).unwrap();
        assert_eq!(g.constant_term(), secret);
        assert_eq!(g, f);
    }

    #[test]
    fn test_interpolate_borrowed_points() {
        let points = vec![Point::new(1, 5), Point::new(2, 7)];
        let refs: Vec<&Point> = points.iter().collect();
        assert_eq!(interpolate(&refs).unwrap(), poly(&[3, 2]));
    }

    #[test]
    fn test_non_integer_interpolant() {
        // through (1, 171) and (3, 44): y = 469/2 - 127/2 x
        let points = vec![Point::new(1, 171), Point::new(3, 44)];
        let scaled = interpolate_scaled(&points).unwrap();
        assert_eq!(scaled.constant_fraction(), (big(469), big(2)));
        assert_eq!(
            interpolate(&points),
            Err(Error::InterpolationInconsistent { coefficient: 0 })
        );
    }

    #[test]
    fn test_duplicate_abscissa() {
        let points = vec![Point::new(1, 1), Point::new(2, 2), Point::new(2, 3)];
        assert_eq!(interpolate(&points), Err(Error::DuplicateAbscissa(2)));
    }

    #[test]
    fn test_empty_points() {
        let points: Vec<Point> = Vec::new();
        assert!(matches!(
            interpolate(&points),
            Err(Error::InsufficientPoints { have: 0, need: 1 })
        ));
    }
}
