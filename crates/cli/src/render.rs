// FILE: crates/cli/src/render.rs

//! Plain-text slide renderers for the terminal player

use lesson_engine::{RendererRegistry, SlideKind, SlideView};
use serde_json::Value;

/// Lines of text for one slide body
pub type SlideText = Vec<String>;

/// Registry with a renderer for every built-in slide kind
pub fn text_renderers() -> RendererRegistry<SlideText> {
    RendererRegistry::new(render_unknown)
        .with(SlideKind::Intro, render_intro)
        .with(SlideKind::Concept, render_concept)
        .with(SlideKind::Importance, render_importance)
        .with(SlideKind::Content, render_content)
        .with(SlideKind::Conclusion, render_content)
}

fn render_intro(view: &SlideView<'_>) -> SlideText {
    let content = &view.slide.content;
    let mut lines = heading(view);

    let objectives = strings(&content["objectives"]);
    if !objectives.is_empty() {
        lines.push("Learning objectives:".to_string());
        lines.extend(
            objectives
                .iter()
                .enumerate()
                .map(|(i, objective)| format!("  {}. {}", i + 1, objective)),
        );
        lines.push(String::new());
    }

    push_warning(&mut lines, content);
    lines
}

fn render_concept(view: &SlideView<'_>) -> SlideText {
    let content = &view.slide.content;
    let mut lines = heading(view);
    push_text(&mut lines, &content["explanation"]);

    let examples = &content["examples"];
    let without = &examples["withoutChart"];
    if !without.is_null() {
        push_text(&mut lines, &without["title"]);
        lines.extend(strings(&without["data"]).iter().map(|d| format!("  {}", d)));
        push_text(&mut lines, &without["question"]);
    }
    let with = &examples["withChart"];
    if !with.is_null() {
        push_text(&mut lines, &with["title"]);
        push_text(&mut lines, &with["conclusion"]);
    }

    if let Some(key_point) = content["keyPoint"].as_str() {
        lines.push(format!("Key point: {}", key_point));
    }
    lines
}

fn render_importance(view: &SlideView<'_>) -> SlideText {
    let content = &view.slide.content;
    let mut lines = heading(view);
    push_text(&mut lines, &content["explanation"]);

    if let Some(comparisons) = content["comparisons"].as_array() {
        for comparison in comparisons {
            let marker = if comparison["status"].as_str() == Some("dangerous") {
                "✗"
            } else {
                "✓"
            };
            lines.push(format!(
                "{} {}",
                marker,
                comparison["scenario"].as_str().unwrap_or_default()
            ));
            if let Some(description) = comparison["description"].as_str() {
                lines.push(format!("    {}", description));
            }
        }
        lines.push(String::new());
    }

    push_warning(&mut lines, content);
    lines
}

fn render_content(view: &SlideView<'_>) -> SlideText {
    let content = &view.slide.content;
    let mut lines = heading(view);
    push_text(&mut lines, &content["headline"]);
    push_text(&mut lines, &content["text"]);

    let bullets = strings(&content["bulletPoints"]);
    if !bullets.is_empty() {
        lines.extend(bullets.iter().map(|b| format!("  • {}", b)));
        lines.push(String::new());
    }

    if let Some(action) = content["callToAction"].as_str() {
        lines.push(format!("→ {}", action));
    }
    lines
}

fn render_unknown(view: &SlideView<'_>) -> SlideText {
    vec![
        format!("Unknown slide type: {}", view.slide.kind),
        view.slide.title.clone(),
    ]
}

fn heading(view: &SlideView<'_>) -> SlideText {
    let mut lines = vec![view.slide.title.clone()];
    if let Some(subtitle) = &view.slide.subtitle {
        lines.push(subtitle.clone());
    }
    lines.push(String::new());
    lines
}

fn push_text(lines: &mut SlideText, value: &Value) {
    if let Some(text) = value.as_str() {
        lines.push(text.to_string());
        lines.push(String::new());
    }
}

fn push_warning(lines: &mut SlideText, content: &Value) {
    if let Some(warning) = content["warning"].as_str() {
        lines.push(format!("⚠ {}", warning));
    }
}

fn strings(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_engine::Slide;
    use serde_json::json;

    fn render(slide: &Slide) -> SlideText {
        text_renderers().render(&SlideView {
            slide,
            index: 0,
            total: 1,
        })
    }

    #[test]
    fn test_intro_lists_objectives() {
        let slide = Slide::new("Charts", SlideKind::Intro).with_content(json!({
            "objectives": ["Read axes", "Spot trends"],
            "warning": "Not financial advice"
        }));
        let lines = render(&slide);

        assert_eq!(lines[0], "Charts");
        assert!(lines.contains(&"  1. Read axes".to_string()));
        assert!(lines.contains(&"  2. Spot trends".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("⚠ Not financial advice"));
    }

    #[test]
    fn test_importance_marks_dangerous_comparisons() {
        let slide = Slide::new("Why", SlideKind::Importance).with_content(json!({
            "comparisons": [
                { "scenario": "Guessing", "description": "No data", "status": "dangerous" },
                { "scenario": "Measuring", "description": "Data", "status": "professional" }
            ]
        }));
        let lines = render(&slide);

        assert!(lines.contains(&"✗ Guessing".to_string()));
        assert!(lines.contains(&"✓ Measuring".to_string()));
    }

    #[test]
    fn test_content_without_payload() {
        let slide = Slide::new("Plain", SlideKind::Content);
        assert_eq!(render(&slide), vec!["Plain".to_string(), String::new()]);
    }

    #[test]
    fn test_unknown_kind_falls_back() {
        let slide = Slide::new("Mystery", SlideKind::from("hologram"));
        assert_eq!(
            render(&slide),
            vec!["Unknown slide type: hologram".to_string(), "Mystery".to_string()]
        );
    }
}
