//! Recommendation Generator
//!
//! Derives advice from an assessment. Rules are evaluated in order and every
//! rule that applies contributes one recommendation.

use crate::models::types::{
    ActionHint, FactorCategory, Impact, Priority, Recommendation, RiskAssessment,
};
use crate::utils::constants::{is_night_band, PLAN_ROUTE_SCORE, SHARE_LOCATION_SCORE};

fn recommendation(
    title: &str,
    description: &str,
    priority: Priority,
    action_hint: Option<ActionHint>,
) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        description: description.to_string(),
        priority,
        action_hint,
    }
}

/// Build the ordered recommendation list for an assessment
pub fn recommend(assessment: &RiskAssessment) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if is_night_band(assessment.hour()) {
        recommendations.push(recommendation(
            "Late Night Safety",
            "Consider using ride-share services or public transportation instead of walking alone.",
            Priority::High,
            Some(ActionHint::OpenRideShare),
        ));
    }

    if assessment.score > SHARE_LOCATION_SCORE {
        recommendations.push(recommendation(
            "High Risk Alert",
            "Current conditions indicate elevated risk. Share your location with trusted contacts.",
            Priority::High,
            Some(ActionHint::ShareLocation),
        ));
    }

    let risky_area = assessment
        .factors_in(FactorCategory::Location)
        .any(|f| f.impact == Impact::Negative);
    if risky_area {
        recommendations.push(recommendation(
            "Area Awareness",
            "Stay alert in this area. Keep to well-lit, populated streets and trust your instincts.",
            Priority::Medium,
            None,
        ));
    }

    recommendations.push(recommendation(
        "Emergency Preparedness",
        "Ensure your emergency contacts are up to date and your phone is charged.",
        Priority::Low,
        Some(ActionHint::CheckEmergencyContacts),
    ));

    if assessment.score > PLAN_ROUTE_SCORE {
        recommendations.push(recommendation(
            "Route Planning",
            "Plan your route in advance using safe route navigation.",
            Priority::Medium,
            Some(ActionHint::PlanRoute),
        ));
    }

    recommendations
}
