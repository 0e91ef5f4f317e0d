//! Versioned prompt library.
//!
//! Prompts are data, not code: markdown templates compiled in via
//! `include_str!`, bound with `{{placeholder}}` substitution, and read-only
//! after process start. Bump [`PROMPT_VERSION`] when any template changes
//! meaningfully.

pub const PROMPT_VERSION: &str = "2025.11-r3";

pub const GENERATE_SYSTEM: &str = include_str!("templates/generate_system.md");
pub const GENERATE_RECIPE: &str = include_str!("templates/generate_recipe.md");
pub const FIX_RETRY: &str = include_str!("templates/fix_retry.md");
pub const SCORE_SYSTEM: &str = include_str!("templates/score_system.md");
pub const SCORE_USER: &str = include_str!("templates/score_user.md");
pub const SELECT_SYSTEM: &str = include_str!("templates/select_system.md");
pub const SELECT_USER: &str = include_str!("templates/select_user.md");
pub const CHARTER_SYSTEM: &str = include_str!("templates/charter_system.md");
pub const CHARTER_USER: &str = include_str!("templates/charter_user.md");
pub const DEPLOY_CONFIRM_SYSTEM: &str = include_str!("templates/deploy_confirm_system.md");
pub const DEPLOY_CONFIRM_USER: &str = include_str!("templates/deploy_confirm_user.md");

/// The five persona recipes driving candidate diversity, in fan-out order.
pub const PERSONAS: [(&str, &str); 5] = [
    ("macro_regime", include_str!("templates/persona_macro_regime.md")),
    ("factor", include_str!("templates/persona_factor.md")),
    ("tail_risk", include_str!("templates/persona_tail_risk.md")),
    (
        "sector_rotation",
        include_str!("templates/persona_sector_rotation.md"),
    ),
    (
        "trend_following",
        include_str!("templates/persona_trend_following.md"),
    ),
];

/// Bind `{{key}}` placeholders. Unmatched placeholders are left in place so
/// they surface visibly in prompts during development.
pub fn render(template: &str, bindings: &[(&str, &str)]) -> String {
    let mut output = template.to_string();
    for (key, value) in bindings {
        output = output.replace(&format!("{{{{{key}}}}}"), value);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_all_occurrences() {
        let out = render("{{a}} and {{b}} and {{a}}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y and x");
    }

    #[test]
    fn unmatched_placeholders_stay_visible() {
        let out = render("{{present}} {{missing}}", &[("present", "ok")]);
        assert_eq!(out, "ok {{missing}}");
    }

    #[test]
    fn personas_are_distinct_and_ordered() {
        let names: Vec<&str> = PERSONAS.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "macro_regime",
                "factor",
                "tail_risk",
                "sector_rotation",
                "trend_following"
            ]
        );
        for (name, text) in PERSONAS {
            assert!(!text.trim().is_empty(), "persona {name} is empty");
        }
    }

    #[test]
    fn recipe_exposes_expected_placeholders() {
        assert!(GENERATE_RECIPE.contains("{{persona}}"));
        assert!(GENERATE_RECIPE.contains("{{context_pack}}"));
        assert!(FIX_RETRY.contains("{{strategy_json}}"));
        assert!(FIX_RETRY.contains("{{errors}}"));
        assert!(FIX_RETRY.contains("{{immutable_fields}}"));
    }
}
