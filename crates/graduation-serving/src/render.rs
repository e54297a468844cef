//! HTML and terminal rendering of the prediction form.

use crate::features::{FieldSpec, FormSubmission, FIELD_GROUPS};
use crate::form::{PredictionForm, PredictionOutcome};

/// Page title.
pub const PAGE_TITLE: &str = "Graduation Timing Prediction";

const DESCRIPTION: &str = "This application predicts whether a student will graduate on time \
or late based on a few academic and family background factors.";

const RESULT_NOTE: &str = "This prediction is based on a previously trained model.";

const STYLE: &str = "body{font-family:sans-serif;max-width:760px;margin:2rem auto;padding:0 1rem}\
.columns{display:flex;gap:2rem}.column{flex:1}\
label{display:block;margin-top:.75rem}input{width:100%;padding:.3rem}\
button{margin-top:1.25rem;padding:.5rem 1rem}\
.result{margin-top:1.5rem;padding:.75rem 1rem;border-radius:.4rem}\
.success{background:#e6f4ea;color:#1e4620}.warning{background:#fff4e5;color:#663c00}\
.error{background:#fdecea;color:#611a15}.caption{color:#777;font-size:.85rem}";

/// Escape text for inclusion in HTML content or double-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Sentence shown for an outcome.
pub fn outcome_message(outcome: &PredictionOutcome) -> String {
    match outcome {
        PredictionOutcome::Predicted { label, .. } => {
            format!("This student is predicted to graduate: {}", label.text)
        }
        PredictionOutcome::Failed { reason } => {
            format!("An error occurred while processing the prediction: {reason}")
        }
    }
}

/// One-line terminal rendering, prefixed by the outcome's tone.
pub fn render_line(outcome: &PredictionOutcome) -> String {
    format!("[{}] {}", outcome.tone().as_str(), outcome_message(outcome))
}

/// Value of the HTML `step` attribute.
///
/// Whole-number fields keep a step of one; every other field accepts any
/// value inside its bounds.
fn step_attr(field: &FieldSpec) -> String {
    if field.integer {
        field.step.to_string()
    } else {
        "any".to_string()
    }
}

fn render_field(out: &mut String, field: &FieldSpec, values: &FormSubmission) {
    let value = values.value(field.key).unwrap_or_default();
    out.push_str(&format!(
        "<label for=\"{key}\">{caption}</label>\
<input type=\"number\" id=\"{key}\" name=\"{key}\" min=\"{min}\"",
        key = field.key,
        caption = escape_html(field.caption),
        min = field.min,
    ));
    if let Some(max) = field.max {
        out.push_str(&format!(" max=\"{max}\""));
    }
    out.push_str(&format!(
        " step=\"{step}\" value=\"{value}\" required>",
        step = step_attr(field),
        value = escape_html(value),
    ));
}

fn render_result(out: &mut String, outcome: &PredictionOutcome) {
    out.push_str(&format!(
        "<section class=\"result {tone}\" id=\"result\">",
        tone = outcome.tone().as_str()
    ));
    match outcome {
        PredictionOutcome::Predicted { label, .. } => {
            out.push_str(&format!(
                "<h2>Prediction Result</h2><p>This student is predicted to graduate: \
<strong>{}</strong></p><p class=\"caption\">{}</p>",
                escape_html(&label.text),
                RESULT_NOTE
            ));
        }
        PredictionOutcome::Failed { .. } => {
            out.push_str(&format!("<p>{}</p>", escape_html(&outcome_message(outcome))));
        }
    }
    out.push_str("</section>");
}

/// Render the full form page for the current form state.
pub fn render_page(form: &PredictionForm) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(&format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>{title}</title><style>{style}</style></head><body>\
<h1>&#127891; {title}</h1><p>{description}</p><hr>\
<h2>Enter New Student Data</h2><form method=\"post\" action=\"/\"><div class=\"columns\">",
        title = PAGE_TITLE,
        style = STYLE,
        description = DESCRIPTION,
    ));
    for group in FIELD_GROUPS {
        out.push_str("<div class=\"column\">");
        for field in group {
            render_field(&mut out, field, form.values());
        }
        out.push_str("</div>");
    }
    out.push_str(
        "</div><hr><button type=\"submit\">Predict Graduation Timing</button></form>",
    );
    if let Some(outcome) = form.outcome() {
        render_result(&mut out, outcome);
    }
    out.push_str(
        "<hr><p class=\"caption\">Predictions are produced by a pre-trained classifier.</p>\
</body></html>",
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{LabelMapping, ResolvedLabel, Tone};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_idle_page_has_inputs_but_no_result() {
        let page = render_page(&PredictionForm::new(LabelMapping::default()));
        assert!(page.contains(PAGE_TITLE));
        assert!(page.contains(
            "name=\"act_score\" min=\"1\" max=\"36\" step=\"any\" value=\"25\""
        ));
        assert!(page.contains("name=\"parental_income\" min=\"0\" step=\"any\""));
        assert!(page.contains("name=\"parent_education_level\" min=\"0\" max=\"20\" step=\"1\""));
        assert_eq!(page.matches("<input").count(), 5);
        assert_eq!(page.matches("<button").count(), 1);
        assert!(!page.contains("id=\"result\""));
    }

    #[test]
    fn test_income_input_accepts_any_amount() {
        let page = render_page(&PredictionForm::new(LabelMapping::default()));
        let start = page.find("name=\"parental_income\"").unwrap();
        let input = &page[start..start + page[start..].find('>').unwrap()];
        assert!(input.contains("step=\"any\""), "{input}");
        assert!(!input.contains("step=\"100000\""));
        assert!(!input.contains("max="));
        assert!(page.contains("name=\"gpa\" min=\"0\" max=\"4\" step=\"any\""));
    }

    #[test]
    fn test_render_line() {
        let outcome = PredictionOutcome::Predicted {
            code: 1,
            label: ResolvedLabel {
                text: "On-time".to_string(),
                tone: Tone::Success,
            },
        };
        assert_eq!(
            render_line(&outcome),
            "[success] This student is predicted to graduate: On-time"
        );

        let outcome = PredictionOutcome::Failed {
            reason: "boom".to_string(),
        };
        assert_eq!(
            render_line(&outcome),
            "[error] An error occurred while processing the prediction: boom"
        );
    }
}
