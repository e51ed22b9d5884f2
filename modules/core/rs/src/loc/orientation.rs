use std::fmt::Display;

/// Orientation of a read or a region in the genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i8)]
pub enum Orientation {
    /// Forward (positive, `+`) strand.
    Forward,
    /// Reverse (negative, `-`) strand.
    Reverse,
    /// Unspecified strand (`.` in BED files).
    #[default]
    Dual,
}

impl Orientation {
    /// BED-style symbol of the orientation.
    pub fn symbol(&self) -> char {
        match self {
            Orientation::Forward => '+',
            Orientation::Reverse => '-',
            Orientation::Dual => '.',
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Orientation {
    type Error = ();

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Orientation::Forward),
            '-' => Ok(Orientation::Reverse),
            '.' | '=' => Ok(Orientation::Dual),
            _ => Err(()),
        }
    }
}

impl TryFrom<&str> for Orientation {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(symbol), None) => Orientation::try_from(symbol),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_symbol() {
        assert_eq!(Orientation::Forward.symbol(), '+');
        assert_eq!(Orientation::Reverse.symbol(), '-');
        assert_eq!(Orientation::Dual.symbol(), '.');
        assert_eq!(format!("{}", Orientation::Reverse), "-");
    }

    #[test]
    fn test_orientation_try_from() {
        for (symbol, expected) in [
            ("+", Ok(Orientation::Forward)),
            ("-", Ok(Orientation::Reverse)),
            (".", Ok(Orientation::Dual)),
            ("=", Ok(Orientation::Dual)),
            ("", Err(())),
            ("++", Err(())),
            ("x", Err(())),
        ] {
            assert_eq!(Orientation::try_from(symbol), expected);
        }
    }

    #[test]
    fn test_orientation_default() {
        assert_eq!(Orientation::default(), Orientation::Dual);
    }
}
