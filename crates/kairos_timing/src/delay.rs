//! Fixed-point delay values.
//!
//! A [`Delay`] is a signed picosecond count. Arithmetic saturates instead of
//! wrapping, so an unconstrained budget ([`Delay::MAX`]) stays unconstrained.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Neg, Sub, SubAssign};

/// A signed time value with picosecond resolution.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Delay(i64);

impl Delay {
    /// Zero delay.
    pub const ZERO: Self = Self(0);
    /// The largest representable delay; used as the "unconstrained" budget.
    pub const MAX: Self = Self(i64::MAX);

    /// Creates a delay from picoseconds.
    pub const fn from_ps(ps: i64) -> Self {
        Self(ps)
    }

    /// Creates a delay from nanoseconds, rounded to the nearest picosecond.
    pub fn from_ns(ns: f64) -> Self {
        Self((ns * 1000.0).round() as i64)
    }

    /// Returns the delay in picoseconds.
    pub const fn as_ps(self) -> i64 {
        self.0
    }

    /// Returns the delay in nanoseconds.
    pub fn as_ns(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Returns `true` for delays below zero (a violated constraint).
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Delay {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Delay {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Delay {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Delay {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Delay {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

/// Division by a hop count, truncating toward zero.
impl Div<i64> for Delay {
    type Output = Self;

    fn div(self, rhs: i64) -> Self {
        Self(self.0 / rhs)
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ps", self.0)
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ps", self.0)
    }
}

/// The delay of one timing arc through a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayInfo {
    /// Fast-corner delay.
    pub min: Delay,
    /// Slow-corner delay; the one propagated by the budget engine.
    pub max: Delay,
}

impl DelayInfo {
    /// Creates an arc delay with separate min/max corners.
    pub fn new(min: Delay, max: Delay) -> Self {
        Self { min, max }
    }

    /// Creates an arc delay with identical corners.
    pub fn fixed(delay: Delay) -> Self {
        Self {
            min: delay,
            max: delay,
        }
    }

    /// Returns the fast-corner delay.
    pub fn min_delay(&self) -> Delay {
        self.min
    }

    /// Returns the slow-corner delay.
    pub fn max_delay(&self) -> Delay {
        self.max
    }
}
