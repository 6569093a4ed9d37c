use thiserror::Error;

use crate::model::Nargs;

/// The arity of a parameter, normalized from [`Nargs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Bound {
    Range(usize, usize),
    Lower(usize),
}

impl From<Nargs> for Bound {
    fn from(value: Nargs) -> Self {
        match value {
            Nargs::Precisely(n) => Bound::Range(n, n),
            Nargs::Any => Bound::Lower(0),
            Nargs::AtLeastOne => Bound::Lower(1),
            Nargs::AtLeast(n) => Bound::Lower(n),
            Nargs::Range(i, j) => Bound::Range(i, j),
        }
    }
}

impl Bound {
    pub(crate) fn min(&self) -> usize {
        match self {
            Bound::Range(n, _) | Bound::Lower(n) => *n,
        }
    }

    pub(crate) fn max(&self) -> Option<usize> {
        match self {
            Bound::Range(_, m) => Some(*m),
            Bound::Lower(_) => None,
        }
    }

    pub(crate) fn accepts(&self, received: usize) -> bool {
        match self {
            Bound::Range(_, m) => received < *m,
            Bound::Lower(_) => true,
        }
    }
}

#[cfg(test)]
impl rand::distributions::Distribution<Bound> for rand::distributions::Standard {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Bound {
        match rng.gen_range(0..2) {
            0 => {
                let upper: usize = rng.gen_range(0..64);

                if upper == 0 {
                    Bound::Range(0, upper)
                } else {
                    Bound::Range(rng.gen_range(0..upper), upper)
                }
            }
            1 => Bound::Lower(rng.gen_range(0..64)),
            _ => unreachable!("internal error - impossible gen_range()"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CloseError {
    #[error("Expected at least {expected} value(s), received {provided}.")]
    TooFewValues { provided: usize, expected: usize },
}

/// Tracks the values received by one activation of a parameter.
#[derive(Debug)]
pub(crate) struct MatchBuffer {
    bound: Bound,
    received: usize,
}

impl MatchBuffer {
    pub(crate) fn new(bound: Bound) -> Self {
        Self { bound, received: 0 }
    }

    pub(crate) fn push(&mut self) {
        self.received += 1;
    }

    pub(crate) fn is_open(&self) -> bool {
        self.bound.accepts(self.received)
    }

    pub(crate) fn can_close(&self) -> bool {
        self.received >= self.bound.min()
    }

    /// Close the activation, yielding the number of values received.
    pub(crate) fn close(self) -> Result<usize, CloseError> {
        if self.can_close() {
            Ok(self.received)
        } else {
            Err(CloseError::TooFewValues {
                provided: self.received,
                expected: self.bound.min(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use rstest::rstest;

    #[rstest]
    #[case(Nargs::Precisely(0), Bound::Range(0, 0))]
    #[case(Nargs::Precisely(2), Bound::Range(2, 2))]
    #[case(Nargs::Any, Bound::Lower(0))]
    #[case(Nargs::AtLeastOne, Bound::Lower(1))]
    #[case(Nargs::AtLeast(3), Bound::Lower(3))]
    #[case(Nargs::Range(1, 4), Bound::Range(1, 4))]
    fn bound_from(#[case] nargs: Nargs, #[case] expected: Bound) {
        let bound = Bound::from(nargs);
        assert_eq!(bound, expected);
        assert_eq!(bound.min(), nargs.min());
        assert_eq!(bound.max(), nargs.max());
    }

    #[test]
    fn match_buffer_fresh() {
        for _ in 0..100 {
            let bound: Bound = thread_rng().gen();
            let buffer = MatchBuffer::new(bound);
            assert_eq!(buffer.is_open(), bound.max() != Some(0));
            assert_eq!(buffer.can_close(), bound.min() == 0);
        }
    }

    #[rstest]
    #[case(Bound::Lower(0), 0, true)]
    #[case(Bound::Lower(0), 1, true)]
    #[case(Bound::Lower(1), 0, false)]
    #[case(Bound::Lower(1), 1, true)]
    #[case(Bound::Lower(1), 2, true)]
    #[case(Bound::Lower(10), 2, false)]
    #[case(Bound::Range(0, 2), 0, true)]
    #[case(Bound::Range(0, 2), 1, true)]
    #[case(Bound::Range(1, 2), 0, false)]
    #[case(Bound::Range(1, 2), 1, true)]
    #[case(Bound::Range(1, 2), 2, true)]
    #[case(Bound::Range(10, 20), 2, false)]
    fn match_buffer_lower(#[case] bound: Bound, #[case] feed: usize, #[case] expected_ok: bool) {
        let remains_open = match bound.max() {
            Some(upper) => upper > feed,
            None => true,
        };
        let mut buffer = MatchBuffer::new(bound);
        assert!(buffer.is_open());

        for _ in 0..feed {
            buffer.push();
        }

        assert_eq!(buffer.is_open(), remains_open);

        if expected_ok {
            assert!(buffer.can_close());
            assert_eq!(buffer.close().unwrap(), feed);
        } else {
            assert!(!buffer.can_close());
            assert_eq!(
                buffer.close().unwrap_err(),
                CloseError::TooFewValues {
                    provided: feed,
                    expected: bound.min(),
                }
            );
        }
    }

    #[rstest]
    #[case(Bound::Range(0, 0), 0, false)]
    #[case(Bound::Range(0, 1), 0, true)]
    #[case(Bound::Range(0, 1), 1, false)]
    #[case(Bound::Range(3, 3), 2, true)]
    #[case(Bound::Range(3, 3), 3, false)]
    fn match_buffer_upper(#[case] bound: Bound, #[case] feed: usize, #[case] remains_open: bool) {
        let mut buffer = MatchBuffer::new(bound);

        for _ in 0..feed {
            buffer.push();
        }

        assert_eq!(buffer.is_open(), remains_open);
    }
}
