//! Simple values

use core::fmt;

/// Boolean `false`
pub(crate) const SIMPLE_VALUE_FALSE: u8 = 20;
/// Boolean `true`
pub(crate) const SIMPLE_VALUE_TRUE: u8 = 21;
/// `null` value
pub(crate) const SIMPLE_VALUE_NULL: u8 = 22;
/// `undefined` value
pub(crate) const SIMPLE_VALUE_UNDEFINED: u8 = 23;

/// The simple values (major type 7) which have a meaning in the value model.
///
/// Any other simple value is rejected by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Simple {
    False,
    True,
    Null,
    Undefined,
}

impl Simple {
    /// Numerical value of the simple value.
    #[must_use]
    pub(crate) const fn code(self) -> u8 {
        match self {
            Simple::False => SIMPLE_VALUE_FALSE,
            Simple::True => SIMPLE_VALUE_TRUE,
            Simple::Null => SIMPLE_VALUE_NULL,
            Simple::Undefined => SIMPLE_VALUE_UNDEFINED,
        }
    }

    #[must_use]
    pub(crate) const fn from_bool(v: bool) -> Self {
        if v {
            Simple::True
        } else {
            Simple::False
        }
    }
}

impl TryFrom<u8> for Simple {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            SIMPLE_VALUE_FALSE => Ok(Simple::False),
            SIMPLE_VALUE_TRUE => Ok(Simple::True),
            SIMPLE_VALUE_NULL => Ok(Simple::Null),
            SIMPLE_VALUE_UNDEFINED => Ok(Simple::Undefined),
            other => Err(other),
        }
    }
}

impl fmt::Display for Simple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("simple({})", self.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        for simple in [Simple::False, Simple::True, Simple::Null, Simple::Undefined] {
            assert_eq!(Simple::try_from(simple.code()), Ok(simple));
        }
        assert_eq!(Simple::from_bool(true), Simple::True);
        assert_eq!(Simple::from_bool(false).code(), 20);
    }

    #[test]
    fn test_unassigned() {
        assert_eq!(Simple::try_from(0), Err(0));
        assert_eq!(Simple::try_from(19), Err(19));
        assert_eq!(Simple::try_from(24), Err(24));
        assert_eq!(Simple::try_from(255), Err(255));
    }
}
