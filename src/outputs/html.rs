//! Static HTML page generation.
//!
//! The final Markdown is converted with a small line-based pass (headings,
//! lists, bold, links, horizontal rule — the only constructs the renderer
//! emits) and wrapped in a fixed page template. Text is HTML-escaped before
//! any markup is injected.

use once_cell::sync::Lazy;
use regex::Regex;

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="cs">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>%TITLE%</title>
<style>
body { font-family: Georgia, 'Times New Roman', serif; max-width: 44rem; margin: 2rem auto; padding: 0 1rem; line-height: 1.55; color: #1c1c1c; }
h1 { font-size: 1.6rem; border-bottom: 2px solid #1c1c1c; padding-bottom: .3rem; }
h2 { font-size: 1.25rem; margin-top: 2rem; }
h3 { font-size: 1.05rem; margin-top: 1.4rem; }
a { color: #0b5394; }
hr { border: 0; border-top: 1px solid #bbb; margin: 2rem 0; }
ol { font-size: .85rem; color: #444; word-break: break-all; }
</style>
</head>
<body>
<main>
%CONTENT%
</main>
</body>
</html>
"#;

static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static RE_MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\((https?://[^\s)]+)\)").unwrap());
static RE_BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[\s(])(https?://[^\s<]+)").unwrap());
static RE_OL_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.*)$").unwrap());

fn inline(text: &str) -> String {
    let escaped = html_escape::encode_text(text).to_string();
    let bolded = RE_BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let linked = RE_MD_LINK.replace_all(&bolded, r#"<a href="$2">$1</a>"#);
    RE_BARE_URL
        .replace_all(&linked, r#"$1<a href="$2">$2</a>"#)
        .to_string()
}

fn markdown_to_html(md: &str) -> String {
    let mut out = String::new();
    let mut in_ul = false;
    let mut in_ol = false;

    fn close_lists(out: &mut String, in_ul: &mut bool, in_ol: &mut bool) {
        if *in_ul {
            out.push_str("</ul>\n");
            *in_ul = false;
        }
        if *in_ol {
            out.push_str("</ol>\n");
            *in_ol = false;
        }
    }

    for line in md.lines() {
        let line = line.trim_end();
        if let Some(rest) = line.strip_prefix("### ") {
            close_lists(&mut out, &mut in_ul, &mut in_ol);
            out.push_str(&format!("<h3>{}</h3>\n", inline(rest)));
        } else if let Some(rest) = line.strip_prefix("## ") {
            close_lists(&mut out, &mut in_ul, &mut in_ol);
            out.push_str(&format!("<h2>{}</h2>\n", inline(rest)));
        } else if let Some(rest) = line.strip_prefix("# ") {
            close_lists(&mut out, &mut in_ul, &mut in_ol);
            out.push_str(&format!("<h1>{}</h1>\n", inline(rest)));
        } else if let Some(rest) = line.strip_prefix("- ") {
            if in_ol {
                out.push_str("</ol>\n");
                in_ol = false;
            }
            if !in_ul {
                out.push_str("<ul>\n");
                in_ul = true;
            }
            out.push_str(&format!("<li>{}</li>\n", inline(rest)));
        } else if let Some(caps) = RE_OL_LINE.captures(line) {
            if in_ul {
                out.push_str("</ul>\n");
                in_ul = false;
            }
            if !in_ol {
                out.push_str("<ol>\n");
                in_ol = true;
            }
            out.push_str(&format!("<li>{}</li>\n", inline(&caps[2])));
        } else if line == "---" {
            close_lists(&mut out, &mut in_ul, &mut in_ol);
            out.push_str("<hr>\n");
        } else if line.is_empty() {
            close_lists(&mut out, &mut in_ul, &mut in_ol);
        } else {
            close_lists(&mut out, &mut in_ul, &mut in_ol);
            out.push_str(&format!("<p>{}</p>\n", inline(line)));
        }
    }
    close_lists(&mut out, &mut in_ul, &mut in_ol);
    out
}

/// Render the full static page for a briefing document.
pub fn render_page(markdown: &str, title: &str) -> String {
    PAGE_TEMPLATE
        .replace("%TITLE%", &html_escape::encode_text(title))
        .replace("%CONTENT%", &markdown_to_html(markdown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_lists() {
        let md = "# Titul\n\n## Sekce\n- **Tučné** — text [1]\n- druhá\n\n### Zdroje\n1. https://example.com/a\n";
        let html = markdown_to_html(md);
        assert!(html.contains("<h1>Titul</h1>"));
        assert!(html.contains("<h2>Sekce</h2>"));
        assert!(html.contains("<ul>\n<li><strong>Tučné</strong> — text [1]</li>"));
        assert!(html.contains("</ul>"));
        assert!(html.contains("<ol>\n<li><a href=\"https://example.com/a\">https://example.com/a</a></li>"));
    }

    #[test]
    fn test_inline_escapes_html() {
        assert_eq!(inline("a <script> b"), "a &lt;script&gt; b");
    }

    #[test]
    fn test_inline_markdown_link() {
        let html = inline("[zdroj](https://rave.cz/a)");
        assert_eq!(html, r#"<a href="https://rave.cz/a">zdroj</a>"#);
    }

    #[test]
    fn test_hr_and_paragraph() {
        let html = markdown_to_html("---\nplain text\n");
        assert!(html.contains("<hr>"));
        assert!(html.contains("<p>plain text</p>"));
    }

    #[test]
    fn test_render_page_wraps_template() {
        let page = render_page("# Hello", "2026-W32");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>2026-W32</title>"));
        assert!(page.contains("<h1>Hello</h1>"));
    }
}
