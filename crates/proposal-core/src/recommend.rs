//! Two-question configuration recommender

use serde::{Deserialize, Serialize};

use crate::model::Variant;

/// Monthly document volume above which the optimal variant is recommended
pub const HIGH_VOLUME_THRESHOLD: u32 = 2000;

/// Answers to the recommender's questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Requirements {
    pub monthly_documents: u32,
    pub high_availability: bool,
}

/// High volume or a high-availability requirement calls for the optimal
/// variant; everything else fits the basic one.
pub fn recommend(requirements: &Requirements) -> Variant {
    if requirements.monthly_documents > HIGH_VOLUME_THRESHOLD || requirements.high_availability {
        Variant::Optimal
    } else {
        Variant::Basic
    }
}
