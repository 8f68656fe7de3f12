//! The YAML scenarios shipped at the workspace root must stay loadable.

use std::path::PathBuf;

use tlverify_e2e::{InteractionScript, InteractionStep, Locator};

fn scenario(name: &str) -> InteractionScript {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(name);
    InteractionScript::from_file(&path)
        .unwrap_or_else(|e| panic!("failed to load {}: {}", path.display(), e))
}

#[test]
fn highlighter_scenario_uses_condition_waits() {
    let script = scenario("highlighter.yaml");
    assert_eq!(script.name, "glossary-highlighter");

    let clicks: Vec<&Locator> = script
        .steps
        .iter()
        .filter_map(|s| match s {
            InteractionStep::Click { target } => Some(target),
            _ => None,
        })
        .collect();
    assert_eq!(
        clicks,
        vec![
            &Locator::selector("h3").with_text("Mauryan Empire"),
            &Locator::text("Ashoka the Great"),
        ]
    );

    // Every click target has been waited for earlier in the script.
    for (i, step) in script.steps.iter().enumerate() {
        if let InteractionStep::Click { target } = step {
            let waited = script.steps[..i].iter().any(|earlier| {
                matches!(earlier, InteractionStep::Wait { until: Some(t), .. } if t == target)
            });
            assert!(waited, "click on {} is not preceded by a wait for it", target);
        }
    }
}

#[test]
fn era_card_scenario_captures_dashboard_and_detail() {
    let script = scenario("era-card.yaml");
    let shots: Vec<String> = script
        .steps
        .iter()
        .filter_map(|s| match s {
            InteractionStep::Screenshot { path, .. } => Some(path.display().to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(shots, vec!["dashboard_debug.png", "era_detail.png"]);
}
