//! HTML rendering of results and status messages.
//!
//! Every interpolated string goes through [`escape_html`]; nothing in this
//! module can fail.

use crate::models::SearchResult;

/// Rendering knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Snippets longer than this many characters are cut and get `…`.
    pub snippet_chars: usize,
    /// Append `— score: N.NN` to the location line.
    pub show_score: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            snippet_chars: 400,
            show_score: false,
        }
    }
}

/// Escape `& < > " '` for safe interpolation into HTML text and attributes.
pub fn escape_html(s: &str) -> String {
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

/// Cut `text` to `max_chars` characters, appending `…` if anything was cut.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut s = text[..byte_idx].to_string();
            s.push('…');
            s
        }
        None => text.to_string(),
    }
}

/// A single status line.
pub fn render_message(message: &str) -> String {
    format!(r#"<div class="result">{}</div>"#, escape_html(message))
}

/// Render a result list for `query`.
pub fn render_results(results: &[SearchResult], query: &str, opts: &RenderOptions) -> String {
    if results.is_empty() {
        return format!(
            r#"<div class="result">No results for <strong>{}</strong>.</div>"#,
            escape_html(query)
        );
    }

    results
        .iter()
        .map(|r| render_result(r, opts))
        .collect::<Vec<_>>()
        .join("")
}

fn render_result(result: &SearchResult, opts: &RenderOptions) -> String {
    let link = escape_html(&result.link);
    let meta = if opts.show_score {
        format!("{} — score: {:.2}", link, result.score)
    } else {
        link.clone()
    };
    let snippet = truncate_snippet(&result.snippet, opts.snippet_chars);

    format!(
        r#"
      <div class="result">
        <div><a href="{link}" target="_blank" rel="noreferrer noopener">{title}</a></div>
        <div class="meta">{meta}</div>
        <p>{snippet}</p>
      </div>
    "#,
        link = link,
        title = escape_html(&result.title),
        meta = meta,
        snippet = escape_html(&snippet),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, link: &str, snippet: &str) -> SearchResult {
        SearchResult {
            reference: "0".to_string(),
            title: title.to_string(),
            link: link.to_string(),
            snippet: snippet.to_string(),
            score: 1.234,
        }
    }

    #[test]
    fn test_escape_all_five() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn test_no_results_escapes_query() {
        let html = render_results(&[], "<script>", &RenderOptions::default());
        assert_eq!(
            html,
            r#"<div class="result">No results for <strong>&lt;script&gt;</strong>.</div>"#
        );
    }

    #[test]
    fn test_every_field_is_escaped() {
        let r = result("<b>\"T\"</b>", "/a?x=1&y='2'", "<i>snip</i>");
        let html = render_results(&[r], "q", &RenderOptions::default());
        assert!(!html.contains("<b>"));
        assert!(!html.contains("<i>"));
        assert!(html.contains("&lt;b&gt;&quot;T&quot;&lt;/b&gt;"));
        assert!(html.contains(r#"href="/a?x=1&amp;y=&#39;2&#39;""#));
        assert!(html.contains("&lt;i&gt;snip&lt;/i&gt;"));
    }

    #[test]
    fn test_snippet_truncation() {
        let long = "x".repeat(401);
        assert_eq!(truncate_snippet(&long, 400), format!("{}…", "x".repeat(400)));
        let exact = "y".repeat(400);
        assert_eq!(truncate_snippet(&exact, 400), exact);
        assert_eq!(truncate_snippet("héllo wörld", 5), "héllo…");
    }

    #[test]
    fn test_score_shown_on_request() {
        let opts = RenderOptions {
            show_score: true,
            ..Default::default()
        };
        let html = render_results(&[result("t", "p", "s")], "q", &opts);
        assert!(html.contains("p — score: 1.23"));
        let html = render_results(&[result("t", "p", "s")], "q", &RenderOptions::default());
        assert!(!html.contains("score"));
    }

    #[test]
    fn test_render_message_escapes() {
        assert_eq!(
            render_message("Search error: bad <input>"),
            r#"<div class="result">Search error: bad &lt;input&gt;</div>"#
        );
    }
}
