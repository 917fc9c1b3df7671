//! Standalone HTML page with an embedded Mermaid ERD and a color legend.

use super::escape_html;
use crate::graph::format::mermaid;
use crate::graph::view::ErdView;
use crate::style::contrasting_text_color;

/// Generate a self-contained HTML page for the view.
///
/// The page loads Mermaid from a CDN and renders the same diagram as
/// [`mermaid::to_mermaid`]. Entity colors are listed in a legend below it,
/// since erDiagram has no per-entity fill.
pub fn to_html(view: &ErdView, title: &str) -> String {
    let mermaid_code = mermaid::to_mermaid(view);

    let stats = format!(
        "{} entities · {} attributes · {} relationships",
        view.entity_count(),
        view.attribute_count(),
        view.edge_count()
    );

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js"></script>
  <style>
    :root {{
      --color-bg: #ffffff;
      --color-surface: #f6f8fa;
      --color-text: #1f2328;
      --color-text-muted: #656d76;
      --color-border: #d0d7de;
    }}

    * {{ box-sizing: border-box; margin: 0; padding: 0; }}

    body {{
      font-family: -apple-system, BlinkMacSystemFont, sans-serif;
      background: var(--color-bg);
      color: var(--color-text);
    }}

    header {{
      padding: 12px 20px;
      border-bottom: 1px solid var(--color-border);
      background: var(--color-surface);
    }}

    header .stats {{
      color: var(--color-text-muted);
      font-size: 13px;
    }}

    .diagram-container {{
      padding: 20px;
      overflow: auto;
    }}

    .legend {{
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      padding: 12px 20px;
      border-top: 1px solid var(--color-border);
    }}

    .legend span {{
      padding: 2px 8px;
      border-radius: 4px;
      font-size: 12px;
      border: 1px solid var(--color-border);
    }}
  </style>
</head>
<body>
  <header>
    <h1>{title}</h1>
    <div class="stats">{stats}</div>
  </header>
  <div class="diagram-container">
    <div class="mermaid" id="diagram">
{mermaid_code}
    </div>
  </div>
  <div class="legend">
{legend}
  </div>
  <script>
    mermaid.initialize({{ startOnLoad: true, theme: 'default', securityLevel: 'loose' }});
  </script>
</body>
</html>
"##,
        title = escape_html(title),
        stats = stats,
        mermaid_code = indent_mermaid(&mermaid_code),
        legend = legend_items(view),
    )
}

fn legend_items(view: &ErdView) -> String {
    view.sorted_entities()
        .iter()
        .map(|entity| {
            format!(
                "    <span style=\"background:{};color:{}\">{}</span>",
                escape_html(&entity.color),
                contrasting_text_color(&entity.color),
                escape_html(&entity.display_name)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent_mermaid(code: &str) -> String {
    code.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("      {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::view::test_support::sample_view;

    #[test]
    fn test_html_contains_mermaid() {
        let html = to_html(&sample_view(), "CRM <model>");

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("<title>CRM &lt;model&gt;</title>"));
        assert!(html.contains("erDiagram"));
        assert!(html.contains("mermaid.min.js"));
    }

    #[test]
    fn test_html_stats_and_legend() {
        let html = to_html(&sample_view(), "ERD");

        assert!(html.contains("4 entities · 7 attributes · 4 relationships"));
        assert!(html.contains("background:#000080;color:white\">Account</span>"));
        assert!(html.contains("background:#ffff00;color:black\">Contact</span>"));
    }
}
