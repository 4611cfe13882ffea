//! Rendering artifacts: annotated text and the interactive graph document.
//!
//! Both outputs draw colors from the fixed category palette. Artifacts are
//! regenerated in full on every call and fully replace their predecessors;
//! nothing is patched incrementally.

use serde_json::json;

use entigraph_core::{Entity, EntityLabel, RenderOptions, Result};

use crate::{EntityGraph, GraphNode};

/// Derived, read-only rendering output for one pipeline run.
#[derive(Debug, Clone)]
pub struct RenderArtifact {
    /// Annotated-text markup with per-category highlighting
    pub entity_html: String,
    /// Self-contained interactive graph document
    pub graph_html: String,
}

/// Assemble the graph and both rendering artifacts in one pass.
pub fn build(
    text: &str,
    entities: &[Entity],
    options: &RenderOptions,
) -> Result<(EntityGraph, RenderArtifact)> {
    let graph = EntityGraph::assemble(entities)?;
    let artifact = RenderArtifact {
        entity_html: render_entities(text, entities)?,
        graph_html: render_graph(&graph, options),
    };
    Ok((graph, artifact))
}

/// Render the graph as a self-contained interactive HTML document sized by
/// the caller-supplied height/width strings.
pub fn render_graph(graph: &EntityGraph, options: &RenderOptions) -> String {
    let mut nodes = Vec::new();
    for (id, node) in graph.nodes() {
        let value = match node {
            GraphNode::Instance { text, label } => json!({
                "id": id,
                "label": text,
                "shape": "box",
                "title": label.as_str(),
                "color": label.color(),
            }),
            GraphNode::Type { label } => json!({
                "id": id,
                "label": label.as_str(),
                "shape": "ellipse",
                "color": label.color(),
            }),
        };
        nodes.push(value);
    }

    let edges: Vec<_> = graph
        .edges()
        .map(|(from, to)| json!({ "from": from, "to": to }))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<script src="https://unpkg.com/vis-network/standalone/umd/vis-network.min.js"></script>
<style type="text/css">
#entity-graph {{
    height: {height};
    width: {width};
    border: 1px solid #e0e0e0;
}}
</style>
</head>
<body>
<div id="entity-graph"></div>
<script type="text/javascript">
var nodes = new vis.DataSet({nodes});
var edges = new vis.DataSet({edges});
var container = document.getElementById("entity-graph");
var network = new vis.Network(container, {{nodes: nodes, edges: edges}}, {{physics: {{stabilization: true}}}});
</script>
</body>
</html>
"#,
        height = options.height,
        width = options.width,
        nodes = serde_json::Value::Array(nodes),
        edges = serde_json::Value::Array(edges),
    )
}

/// Render annotated-text markup, wrapping each entity occurrence in a
/// palette-colored highlight.
///
/// When the same text was seen under conflicting labels, the first-seen
/// label drives the highlight, matching the graph's classification.
pub fn render_entities(text: &str, entities: &[Entity]) -> Result<String> {
    // First-seen label per distinct text
    let mut labels: Vec<(String, EntityLabel)> = Vec::new();
    for entity in entities {
        if !labels.iter().any(|(t, _)| t == &entity.text) {
            labels.push((entity.text.clone(), entity.category()?));
        }
    }
    // Longer phrases claim their range first
    labels.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut spans: Vec<(usize, usize, EntityLabel)> = Vec::new();
    for (phrase, label) in &labels {
        if phrase.is_empty() {
            continue;
        }
        for (start, m) in text.match_indices(phrase.as_str()) {
            let end = start + m.len();
            if spans.iter().any(|(s, e, _)| start < *e && *s < end) {
                continue;
            }
            spans.push((start, end, *label));
        }
    }
    spans.sort_by_key(|span| span.0);

    let mut html = String::from(r#"<div class="entities" style="line-height: 2.5">"#);
    let mut cursor = 0;
    for (start, end, label) in spans {
        html.push_str(&escape(&text[cursor..start]));
        html.push_str(&format!(
            r#"<mark style="background: {color}; padding: 0.2em 0.3em; border-radius: 0.25em;">{text} <span style="font-size: 0.7em; font-weight: bold; vertical-align: middle;">{label}</span></mark>"#,
            color = label.color(),
            text = escape(&text[start..end]),
            label = label.as_str(),
        ));
        cursor = end;
    }
    html.push_str(&escape(&text[cursor..]));
    html.push_str("</div>");
    Ok(html)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
    use entigraph_core::Entity;

    fn entities(pairs: &[(&str, &str)]) -> Vec<Entity> {
        pairs.iter().map(|(t, l)| Entity::new(*t, *l)).collect()
    }

    #[test]
    fn test_graph_document_embeds_dimensions_and_palette() {
        let graph =
            EntityGraph::assemble(&entities(&[("Apple", "ORG"), ("California", "GPE")])).unwrap();
        let options = RenderOptions {
            height: "600px".to_string(),
            width: "80%".to_string(),
        };
        let html = render_graph(&graph, &options);

        assert!(html.contains("height: 600px"));
        assert!(html.contains("width: 80%"));
        assert!(html.contains("#008080")); // ORG
        assert!(html.contains("#FFA500")); // GPE
        assert!(html.contains("\"shape\":\"box\""));
        assert!(html.contains("\"shape\":\"ellipse\""));
    }

    #[test]
    fn test_empty_graph_renders() {
        let graph = EntityGraph::assemble(&[]).unwrap();
        let html = render_graph(&graph, &RenderOptions::default());
        assert!(html.contains("new vis.DataSet([])"));
    }

    #[test]
    fn test_annotated_text_highlights_entities() {
        let html = render_entities(
            "Apple California",
            &entities(&[("Apple", "ORG"), ("California", "GPE")]),
        )
        .unwrap();

        assert!(html.contains("background: #008080"));
        assert!(html.contains("background: #FFA500"));
        assert!(html.contains(">Apple <"));
        assert!(html.contains("ORG"));
    }

    #[test]
    fn test_annotated_text_escapes_content() {
        let html = render_entities("a <tag> b", &[]).unwrap();
        assert!(html.contains("a &lt;tag&gt; b"));
    }

    #[test]
    fn test_annotated_text_uses_first_seen_label_on_conflict() {
        let html = render_entities(
            "Apple",
            &entities(&[("Apple", "ORG"), ("Apple", "GPE")]),
        )
        .unwrap();
        assert!(html.contains("background: #008080"));
        assert!(!html.contains("background: #FFA500"));
    }

    #[test]
    fn test_annotated_text_rejects_unknown_label() {
        assert!(render_entities("Apple", &entities(&[("Apple", "BOGUS")])).is_err());
    }

    #[test]
    fn test_longer_phrase_claims_range() {
        let html = render_entities(
            "New York City",
            &entities(&[("New York City", "GPE"), ("New York", "GPE")]),
        )
        .unwrap();
        // One highlight covering the whole phrase
        assert_eq!(html.matches("<mark").count(), 1);
    }

    #[test]
    fn test_artifact_build() {
        let (graph, artifact) = build(
            "Apple California",
            &entities(&[("Apple", "ORG"), ("California", "GPE")]),
            &RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(graph.instance_count(), 2);
        assert!(artifact.entity_html.contains("mark"));
        assert!(artifact.graph_html.contains("vis.Network"));
    }
}
