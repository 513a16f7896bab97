//! Rule-based precedence between two trains contending for a station.
//!
//! The cascade is strict: each tier is only consulted when the previous one
//! ties.
//! 1. Priority class (lower number goes first)
//! 2. Maximum speed (faster goes first, within an epsilon)
//! 3. Arrival minute (earlier or equal goes first)

use std::cmp::Ordering;

use crate::domain::TrainType;

/// Priority class used for trains of unknown or unrecognised type.
pub const DEFAULT_PRIORITY: u8 = 3;

/// Priority class of a train type. Lower numbers take precedence.
pub fn priority_class(train_type: Option<&TrainType>) -> u8 {
    match train_type {
        Some(TrainType::Express) => 1,
        Some(TrainType::Mail) => 2,
        Some(TrainType::Passenger) => 3,
        Some(TrainType::Freight) => 4,
        Some(TrainType::Other(_)) | None => DEFAULT_PRIORITY,
    }
}

/// One side of a potential conflict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contender {
    pub priority: u8,
    pub speed_kmph: f64,
    /// Arrival as minutes since midnight.
    pub arrival_minute: u32,
}

impl Contender {
    pub fn new(train_type: Option<&TrainType>, speed_kmph: f64, arrival_minute: u32) -> Self {
        Self {
            priority: priority_class(train_type),
            speed_kmph,
            arrival_minute,
        }
    }
}

/// Order two contenders: `Less` means `a` proceeds first.
///
/// Returns `Equal` only when every tier ties.
pub fn compare(a: &Contender, b: &Contender, speed_epsilon: f64) -> Ordering {
    // Primary: priority class
    let priority = a.priority.cmp(&b.priority);
    if priority != Ordering::Equal {
        return priority;
    }

    // Secondary: higher speed, outside the epsilon band
    if a.speed_kmph > b.speed_kmph + speed_epsilon {
        return Ordering::Less;
    }
    if a.speed_kmph < b.speed_kmph - speed_epsilon {
        return Ordering::Greater;
    }

    // Tertiary: earlier arrival
    a.arrival_minute.cmp(&b.arrival_minute)
}

/// 1 if `a` should proceed before `b`, else 0.
///
/// A full tie labels 1 in both directions.
pub fn label(a: &Contender, b: &Contender, speed_epsilon: f64) -> u8 {
    match compare(a, b, speed_epsilon) {
        Ordering::Less | Ordering::Equal => 1,
        Ordering::Greater => 0,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn contender() -> impl Strategy<Value = Contender> {
        (1u8..=4, 0u32..=4, 0u32..1440).prop_map(|(priority, speed_step, arrival_minute)| Contender {
            priority,
            // Coarse steps keep speeds either equal or well outside the epsilon
            speed_kmph: 40.0 + speed_step as f64 * 20.0,
            arrival_minute,
        })
    }

    proptest! {
        /// Exactly one direction wins whenever some tier differs
        #[test]
        fn antisymmetric(a in contender(), b in contender()) {
            prop_assume!(a != b);
            prop_assert_eq!(label(&a, &b, 1e-6) + label(&b, &a, 1e-6), 1);
        }

        /// compare is the reverse of itself with arguments swapped
        #[test]
        fn compare_reverses(a in contender(), b in contender()) {
            prop_assert_eq!(compare(&a, &b, 1e-6), compare(&b, &a, 1e-6).reverse());
        }

        /// The cascade is transitive
        #[test]
        fn transitive(a in contender(), b in contender(), c in contender()) {
            if compare(&a, &b, 1e-6) != Ordering::Greater && compare(&b, &c, 1e-6) != Ordering::Greater {
                prop_assert_ne!(compare(&a, &c, 1e-6), Ordering::Greater);
            }
        }
    }
}
