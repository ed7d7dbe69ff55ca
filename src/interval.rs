/*

    Responsible for creating a struct that represents
    ranges from a to b. Bounding volumes use it to
    accumulate the extent of a point set projected
    onto a direction.

    See also associated constant of Interval class:
    - EMPTY: (inf, -inf), expands to the first value seen

    @author: Bartu
    @date: Sept 2025

*/

use crate::numeric::{Float};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: Float,
    pub max: Float,
}

impl Interval {

    pub const EMPTY: Self = Self {
        min: Float::INFINITY,
        max: Float::NEG_INFINITY,
    };

    pub fn new(min: Float, max: Float) -> Self {
        Self { 
            min,
            max,
        }
    }

    /// Interval spanning both values regardless of their order
    pub fn ordered(a: Float, b: Float) -> Self {
        if a <= b { Self::new(a, b) } else { Self::new(b, a) }
    }

    /// Tight interval of the values yielded by `iter`, EMPTY if there are none
    pub fn from_values<I: IntoIterator<Item = Float>>(iter: I) -> Self {
        let mut out = Self::EMPTY;
        for x in iter {
            out.expand(x);
        }
        out
    }

    pub fn validate(&self) -> bool {
        self.max >= self.min
    }
   
    pub fn size(&self) -> Float {
        self.max - self.min
    }

    pub fn center(&self) -> Float {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, x: Float) -> bool {
        self.min <= x && x <= self.max
    }

    pub fn expand(&mut self, x: Float) {
        if x < self.min { self.min = x; }
        if x > self.max { self.max = x; }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_invalid_until_expanded() {
        let mut int = Interval::EMPTY;
        assert!(!int.validate());
        int.expand(2.0);
        assert!(int.validate());
        assert_eq!(int.size(), 0.0);
        int.expand(-1.0);
        assert_eq!(int, Interval::new(-1.0, 2.0));
        assert_eq!(int.center(), 0.5);
        assert!(int.contains(0.0) && !int.contains(2.5));
    }

    #[test]
    fn from_values_and_ordered() {
        let int = Interval::from_values([3.0, -4.0, 1.0]);
        assert_eq!(int, Interval::new(-4.0, 3.0));
        assert_eq!(Interval::ordered(5.0, 1.0), Interval::new(1.0, 5.0));
        assert!(!Interval::from_values(std::iter::empty()).validate());
    }
}
