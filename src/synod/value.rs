use crate::colored::Colorize;

use rand::Rng;

/// A binary consensus value.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Value {
    Zero,
    One,
}

impl Value {
    /// Draws `0` or `1` with equal probability.
    pub fn random<R: Rng>(rng: &mut R) -> Value {
        Value::from(rng.gen::<bool>())
    }
}

impl From<bool> for Value {
    fn from(bit: bool) -> Self {
        if bit {
            Value::One
        } else {
            Value::Zero
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Zero => write!(fmt, "{}", "0".yellow()),
            Value::One => write!(fmt, "{}", "1".green()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_covers_both_values() {
        let mut rng = StdRng::seed_from_u64(7);
        let draws: Vec<Value> = (0..64).map(|_| Value::random(&mut rng)).collect();
        assert!(draws.contains(&Value::Zero));
        assert!(draws.contains(&Value::One));
    }
}
