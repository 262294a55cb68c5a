//! Recommended-action generation
//!
//! A deterministic function of (risk level, impact areas). Risk-driven
//! actions come first, then per-area actions in impact-area order, then the
//! closing actions; the list is capped and truncation drops from the end.

use crate::domain::RiskLevel;

/// Hard cap on the generated list
const MAX_ACTIONS: usize = 6;

const URGENT_ACTIONS: [&str; 2] = [
    "IMMEDIATE: Convene emergency compliance review within 24 hours",
    "URGENT: Notify stakeholders and halt affected processes if necessary",
];

const CLOSING_ACTIONS: [&str; 2] = [
    "Document compliance assessment in regulatory files",
    "Set timeline for implementation based on regulatory deadlines",
];

/// Fixed per-area action table
fn area_actions(area: &str) -> Option<[&'static str; 2]> {
    match area {
        "Labeling" => Some([
            "Review and update all product labeling materials",
            "Audit current package inserts for compliance gaps",
        ]),
        "Clinical Trials" => Some([
            "Assess impact on ongoing clinical studies",
            "Update study protocols if required",
        ]),
        "Manufacturing" => Some([
            "Inspect manufacturing processes for compliance",
            "Update quality control procedures",
        ]),
        "Pharmacovigilance" => Some([
            "Review safety monitoring procedures",
            "Update risk evaluation protocols",
        ]),
        "Marketing" => Some([
            "Review all promotional materials for compliance",
            "Update marketing approval processes",
        ]),
        _ => None,
    }
}

/// Generate the ordered list of recommended actions for a change
pub fn action_items(risk_level: RiskLevel, impact_areas: &[String]) -> Vec<String> {
    let mut actions: Vec<String> = Vec::new();

    if risk_level == RiskLevel::High {
        actions.extend(URGENT_ACTIONS.iter().map(|a| a.to_string()));
    }

    for area in impact_areas {
        if let Some(pair) = area_actions(area) {
            actions.extend(pair.iter().map(|a| a.to_string()));
        }
    }

    actions.extend(CLOSING_ACTIONS.iter().map(|a| a.to_string()));

    actions.truncate(MAX_ACTIONS);
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn areas(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_high_risk_actions_come_first() {
        let actions = action_items(
            RiskLevel::High,
            &areas(&["Labeling", "Clinical Trials", "Manufacturing"]),
        );
        assert_eq!(actions.len(), MAX_ACTIONS);
        assert!(actions[0].starts_with("IMMEDIATE:"));
        assert!(actions[1].starts_with("URGENT:"));
        // Area actions fill the rest; closing actions fell off the end.
        assert_eq!(actions[2], "Review and update all product labeling materials");
        assert!(!actions.contains(&CLOSING_ACTIONS[0].to_string()));
    }

    #[test]
    fn test_low_risk_skips_urgent_actions() {
        let actions = action_items(RiskLevel::Low, &areas(&["Marketing"]));
        assert_eq!(
            actions,
            vec![
                "Review all promotional materials for compliance",
                "Update marketing approval processes",
                CLOSING_ACTIONS[0],
                CLOSING_ACTIONS[1],
            ]
        );
    }

    #[test]
    fn test_unknown_area_contributes_nothing() {
        let actions = action_items(RiskLevel::Low, &areas(&["General"]));
        assert_eq!(actions, vec![CLOSING_ACTIONS[0], CLOSING_ACTIONS[1]]);
    }

    #[test]
    fn test_cap_never_exceeded() {
        let all = areas(&[
            "Labeling",
            "Clinical Trials",
            "Manufacturing",
            "Pharmacovigilance",
            "Marketing",
        ]);
        for risk in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert!(action_items(risk, &all).len() <= MAX_ACTIONS);
        }
    }

    #[test]
    fn test_deterministic() {
        let input = areas(&["Pharmacovigilance", "Labeling"]);
        assert_eq!(
            action_items(RiskLevel::Medium, &input),
            action_items(RiskLevel::Medium, &input)
        );
    }
}
