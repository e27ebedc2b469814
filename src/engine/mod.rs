//! Core situation logic: signature resolution, goal aggregation, streaks,
//! gamification, smart defaults.

pub mod defaults;
pub mod gamification;
pub mod goals;
pub mod signature;
pub mod streaks;

pub use gamification::{profile, Badge, Profile};
pub use goals::relevant_goals;
pub use signature::{resolve, signature_for, ResolvedContext};
pub use streaks::{streaks_for, Streak};

/// Points awarded when a goal of the given importance is completed.
/// Non-linear on purpose: critical goals dominate the total.
pub fn points_for_importance(importance: i64) -> i64 {
    match importance {
        1 => 5,
        2 => 15,
        3 => 35,
        4 => 100,
        _ => 0,
    }
}

pub fn importance_label(importance: i64) -> &'static str {
    match importance {
        1 => "Low",
        2 => "Medium",
        3 => "High",
        4 => "Critical",
        _ => "Unknown",
    }
}

pub fn priority_label(priority: i64) -> &'static str {
    match priority {
        1 => "Low",
        2 => "Medium",
        3 => "High",
        _ => "Unknown",
    }
}
