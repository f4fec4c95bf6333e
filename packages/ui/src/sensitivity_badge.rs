use dioxus::prelude::*;
use notes::{NoteSensitivity, SensitivityLevel};

/// Score badge with the service's explanation as a tooltip.
#[component]
pub fn SensitivityBadge(sensitivity: NoteSensitivity) -> Element {
    let level = sensitivity.level();
    let label = level.label();
    let score = sensitivity.sensitivity_score;
    let explanation = sensitivity.explanation.clone();
    let class = match level {
        SensitivityLevel::Low => "badge badge-low",
        SensitivityLevel::Medium => "badge badge-medium",
        SensitivityLevel::High => "badge badge-high",
    };

    rsx! {
        span {
            class: "{class}",
            title: "{explanation}",
            "{label} sensitivity ({score})"
        }
    }
}
