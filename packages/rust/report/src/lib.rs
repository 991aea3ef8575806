//! Aggregated HTML report rendering.
//!
//! Pure, stateless templating: the filtered provider results go in, a
//! complete HTML document comes out. Rendering never reorders or drops
//! results — that already happened upstream — it only iterates.
//!
//! All interpolated text is HTML-escaped. Provider answers are remote
//! content; rendering them unescaped would let a compromised provider
//! inject markup into the report.

use serde_json::Value;
use tracing::{debug, instrument};

use pagelens_shared::{AnswerEntry, NamedResult};

/// Render the aggregated analysis report for `url`.
///
/// Always produces a complete document; with no results the body holds just
/// the top-level heading.
#[instrument(skip_all, fields(sections = results.len()))]
pub fn render(url: &str, results: &[NamedResult]) -> String {
    let mut html = String::new();

    html.push_str(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>Website Analysis</title>\n\
         </head>\n\
         <body>\n",
    );

    html.push_str(&format!("<h1>Analysis of {}</h1>\n", escape_html(url)));

    for result in results {
        render_section(&mut html, result);
    }

    html.push_str("</body>\n</html>\n");

    debug!(bytes = html.len(), "report rendered");
    html
}

/// Render one provider's section: heading, answer list, optional sources.
fn render_section(html: &mut String, result: &NamedResult) {
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(result.label.as_str())));

    html.push_str("<ul>\n");
    for entry in &result.data.answer {
        match entry {
            AnswerEntry::Text(text) => {
                html.push_str(&format!("<li>{}</li>\n", escape_html(text)));
            }
            AnswerEntry::Fields(map) => {
                // One list item per key, in the mapping's insertion order
                for (key, value) in map {
                    html.push_str(&format!(
                        "<li><strong>{}:</strong> {}</li>\n",
                        escape_html(key),
                        escape_html(&value_text(value)),
                    ));
                }
            }
        }
    }
    html.push_str("</ul>\n");

    if let Some(sources) = &result.data.sources {
        html.push_str("<h3>Sources:</h3>\n<ul>\n");
        for source in sources {
            html.push_str(&format!("<li>{}</li>\n", escape_html(source)));
        }
        html.push_str("</ul>\n");
    }
}

/// Text rendering of a mapping value: strings verbatim, everything else via
/// its JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape text for interpolation into HTML element content or attributes.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagelens_shared::{EnrichmentAnswer, ServiceLabel};

    fn named(label: ServiceLabel, json: serde_json::Value) -> NamedResult {
        NamedResult {
            label,
            data: serde_json::from_value::<EnrichmentAnswer>(json).unwrap(),
        }
    }

    #[test]
    fn empty_results_render_heading_only_document() {
        let html = render("https://example.com/article", &[]);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Analysis of https://example.com/article</h1>"));
        assert!(html.ends_with("</body>\n</html>\n"));
        assert!(!html.contains("<h2>"));
        assert!(!html.contains("<ul>"));
    }

    #[test]
    fn string_entries_render_as_list_items() {
        let results = vec![named(
            ServiceLabel::Architecture,
            serde_json::json!({"Answer": ["first", "second"]}),
        )];
        let html = render("https://example.com", &results);

        assert!(html.contains("<h2>C++ Architecture and Design</h2>"));
        assert!(html.contains("<li>first</li>"));
        assert!(html.contains("<li>second</li>"));
    }

    #[test]
    fn mapping_entries_render_one_item_per_key_in_insertion_order() {
        let results = vec![named(
            ServiceLabel::Performance,
            serde_json::json!({"Answer": [
                "intro",
                {"Chapter 2": "Locks", "Chapter 1": "Atomics"}
            ]}),
        )];
        let html = render("https://example.com", &results);

        assert!(html.contains("<li>intro</li>"));
        let ch2 = html.find("<li><strong>Chapter 2:</strong> Locks</li>").unwrap();
        let ch1 = html.find("<li><strong>Chapter 1:</strong> Atomics</li>").unwrap();
        // Insertion order, not alphabetical
        assert!(ch2 < ch1);
    }

    #[test]
    fn non_string_mapping_values_render_as_json() {
        let results = vec![named(
            ServiceLabel::MlResources,
            serde_json::json!({"Answer": [{"Chapters": 12}]}),
        )];
        let html = render("https://example.com", &results);
        assert!(html.contains("<li><strong>Chapters:</strong> 12</li>"));
    }

    #[test]
    fn sources_render_as_subsection() {
        let results = vec![named(
            ServiceLabel::MlResources,
            serde_json::json!({
                "Answer": ["x"],
                "Sources": ["https://a.example", "https://b.example"]
            }),
        )];
        let html = render("https://example.com", &results);

        assert!(html.contains("<h3>Sources:</h3>"));
        assert!(html.contains("<li>https://a.example</li>"));
        assert!(html.contains("<li>https://b.example</li>"));
    }

    #[test]
    fn sections_render_in_result_order() {
        let results = vec![
            named(ServiceLabel::Architecture, serde_json::json!({"Answer": ["a"]})),
            named(ServiceLabel::MlResources, serde_json::json!({"Answer": ["m"]})),
        ];
        let html = render("https://example.com", &results);

        let arch = html.find("C++ Architecture and Design").unwrap();
        let ml = html.find("Machine Learning Resources").unwrap();
        assert!(arch < ml);
        assert!(!html.contains("C++ Performance and Concurrency"));
    }

    #[test]
    fn provider_markup_is_escaped() {
        let results = vec![named(
            ServiceLabel::Architecture,
            serde_json::json!({"Answer": ["<script>alert(1)</script>"]}),
        )];
        let html = render("https://example.com/?q=<b>", &results);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("Analysis of https://example.com/?q=&lt;b&gt;"));
    }

    #[test]
    fn escape_html_covers_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }
}
