//! Number and boolean value generators.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BuddyError;

pub const MAX_NUMBER_COUNT: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum NumberSpec {
    Integer { min: i64, max: i64 },
    Float { min: f64, max: f64, decimals: u32 },
    Boolean { true_probability: f64 },
    /// Boundary values for edge-case testing, cycled in order.
    Special,
}

/// Boundary values emitted by [`NumberSpec::Special`].
pub fn special_values() -> Vec<Value> {
    vec![
        Value::from(0),
        Value::from(-1),
        Value::from(1),
        Value::from(i32::MIN),
        Value::from(i32::MAX),
        Value::from(i64::MIN),
        Value::from(i64::MAX),
        Value::from("NaN"),
        Value::from("Infinity"),
        Value::from("-Infinity"),
        Value::from(""),
    ]
}

pub fn generate_numbers<R: Rng>(
    rng: &mut R,
    spec: &NumberSpec,
    count: usize,
) -> Result<Vec<Value>, BuddyError> {
    if count == 0 || count > MAX_NUMBER_COUNT {
        return Err(BuddyError::InvalidInput(format!(
            "count must be between 1 and {MAX_NUMBER_COUNT}"
        )));
    }

    match *spec {
        NumberSpec::Integer { min, max } => {
            if min > max {
                return Err(BuddyError::InvalidInput("min must not exceed max".into()));
            }
            Ok((0..count)
                .map(|_| Value::from(rng.random_range(min..=max)))
                .collect())
        }
        NumberSpec::Float { min, max, decimals } => {
            if !(min.is_finite() && max.is_finite()) || min > max {
                return Err(BuddyError::InvalidInput(
                    "min and max must be finite with min <= max".into(),
                ));
            }
            if decimals > 10 {
                return Err(BuddyError::InvalidInput("decimals must be <= 10".into()));
            }
            let scale = 10f64.powi(decimals as i32);
            Ok((0..count)
                .map(|_| {
                    // Convex mix of the bounds; `max - min` may overflow for huge ranges.
                    let t: f64 = rng.random();
                    let raw = min * (1.0 - t) + max * t;
                    let scaled = raw * scale;
                    let rounded = if scaled.is_finite() {
                        scaled.round() / scale
                    } else {
                        raw
                    };
                    Value::from(rounded.clamp(min, max))
                })
                .collect())
        }
        NumberSpec::Boolean { true_probability } => {
            if !(0.0..=1.0).contains(&true_probability) {
                return Err(BuddyError::InvalidInput(
                    "trueProbability must be within 0..=1".into(),
                ));
            }
            Ok((0..count)
                .map(|_| Value::from(rng.random_bool(true_probability)))
                .collect())
        }
        NumberSpec::Special => {
            let pool = special_values();
            Ok(pool.iter().cycle().take(count).cloned().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn integers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let values =
            generate_numbers(&mut rng, &NumberSpec::Integer { min: -5, max: 5 }, 500).unwrap();
        assert!(values.iter().all(|v| (-5..=5).contains(&v.as_i64().unwrap())));
    }

    #[test]
    fn floats_are_rounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let spec = NumberSpec::Float {
            min: 0.0,
            max: 1.0,
            decimals: 2,
        };
        for v in generate_numbers(&mut rng, &spec, 200).unwrap() {
            let f = v.as_f64().unwrap();
            assert!((0.0..=1.0).contains(&f));
            assert!(((f * 100.0).round() - f * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn float_range_spanning_the_whole_f64_domain() {
        let mut rng = StdRng::seed_from_u64(7);
        let spec = NumberSpec::Float {
            min: -1e308,
            max: 1e308,
            decimals: 2,
        };
        for v in generate_numbers(&mut rng, &spec, 100).unwrap() {
            let f = v.as_f64().unwrap();
            assert!(f.is_finite());
            assert!((-1e308..=1e308).contains(&f));
        }

        let extreme = NumberSpec::Float {
            min: f64::MIN,
            max: f64::MAX,
            decimals: 0,
        };
        assert_eq!(generate_numbers(&mut rng, &extreme, 50).unwrap().len(), 50);
    }

    #[test]
    fn degenerate_float_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let spec = NumberSpec::Float {
            min: 2.5,
            max: 2.5,
            decimals: 1,
        };
        let values = generate_numbers(&mut rng, &spec, 5).unwrap();
        assert!(values.iter().all(|v| v.as_f64() == Some(2.5)));
    }

    #[test]
    fn boolean_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let all_true = generate_numbers(
            &mut rng,
            &NumberSpec::Boolean {
                true_probability: 1.0,
            },
            20,
        )
        .unwrap();
        assert!(all_true.iter().all(|v| v == &Value::Bool(true)));
        assert!(
            generate_numbers(
                &mut rng,
                &NumberSpec::Boolean {
                    true_probability: 1.5
                },
                1
            )
            .is_err()
        );
    }

    #[test]
    fn special_values_cycle() {
        let mut rng = StdRng::seed_from_u64(1);
        let values = generate_numbers(&mut rng, &NumberSpec::Special, 13).unwrap();
        assert_eq!(values[0], Value::from(0));
        assert_eq!(values[11], Value::from(0));
        assert_eq!(values.len(), 13);
    }

    #[test]
    fn inverted_range_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_numbers(&mut rng, &NumberSpec::Integer { min: 2, max: 1 }, 1).is_err());
    }
}
