//! Markdown rendering
//!
//! A single-pass regex pipeline over the subset of markdown the site content
//! uses. Stage order matters: every stage works on the output of the previous
//! one, so patterns that are textually contained in others run later.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::config::MarkdownConfig;
use crate::helpers::escape_text;

/// Opens and closes a stashed block region (fenced code)
const BLOCK_GUARD: char = '\u{E000}';
/// Opens and closes a stashed inline region (code span)
const INLINE_GUARD: char = '\u{E001}';

lazy_static! {
    static ref FENCED_CODE: Regex =
        Regex::new(r"(?ms)^```([\w+#.-]*)[ \t]*\n(.*?)^```[ \t]*$").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`\n]+)`").unwrap();

    // Most specific first
    static ref HEADINGS: Vec<(usize, Regex)> = (1..=4)
        .rev()
        .map(|level| {
            let pattern = format!(r"(?m)^#{{{}}} +(.*?)[ \t]*$", level);
            (level, Regex::new(&pattern).unwrap())
        })
        .collect();

    static ref STRONG_EMPHASIS: Regex =
        Regex::new(r"\*\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*\*").unwrap();
    static ref STRONG: Regex = Regex::new(r"\*\*([^\s*](?:[^\n]*?[^\s*])?)\*\*").unwrap();
    static ref EMPHASIS: Regex = Regex::new(r"\*([^\s*](?:[^*\n]*[^\s*])?)\*").unwrap();

    static ref BLOCKQUOTE: Regex = Regex::new(r"(?m)^&gt; ?(.*)$").unwrap();

    static ref UNORDERED_RUN: Regex = Regex::new(r"(?m)(?:^- .*(?:\n|$))+").unwrap();
    static ref UNORDERED_ITEM: Regex = Regex::new(r"^- (.*)$").unwrap();
    static ref ORDERED_RUN: Regex = Regex::new(r"(?m)(?:^\d+\. .*(?:\n|$))+").unwrap();
    static ref ORDERED_ITEM: Regex = Regex::new(r"^\d+\. (.*)$").unwrap();

    // Attribute values never contain quotes or markup from earlier stages
    static ref IMAGE: Regex = Regex::new(r#"!\[([^\]\n"]*)\]\(([^)\s"<]+)\)"#).unwrap();
    static ref LINK: Regex = Regex::new(r#"\[([^\]\n]+)\]\(([^)\s"<]+)\)"#).unwrap();

    static ref RULE: Regex = Regex::new(r"(?m)^---$").unwrap();

    static ref STASHED: Regex = Regex::new("[\u{E000}\u{E001}](\\d+)[\u{E000}\u{E001}]").unwrap();
    static ref EMPTY_PARAGRAPH: Regex = Regex::new(r"<p>\s*</p>\n?").unwrap();
    static ref WRAPPED_BLOCK_OPEN: Regex =
        Regex::new(r"<p>(\s*<(?:h[1-4]|ul|ol|blockquote|pre|hr)\b)").unwrap();
    static ref WRAPPED_BLOCK_CLOSE: Regex =
        Regex::new(r"(</(?:h[1-4]|ul|ol|blockquote|pre)>|<hr>)\s*</p>").unwrap();
}

/// Line prefixes produced by block-level stages
const BLOCK_PREFIXES: &[&str] = &[
    "<h1>",
    "<h2>",
    "<h3>",
    "<h4>",
    "<ul>",
    "</ul>",
    "<ol>",
    "</ol>",
    "<li>",
    "<blockquote>",
    "<hr>",
];

/// Markdown to HTML renderer
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: MarkdownConfig,
}

impl MarkdownRenderer {
    /// Create a renderer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom settings
    pub fn with_options(options: MarkdownConfig) -> Self {
        Self { options }
    }

    /// Render markdown to HTML.
    ///
    /// Total: malformed or unbalanced markers produce best-effort output,
    /// never an error.
    pub fn render(&self, markdown: &str) -> String {
        let mut stash = Stash::default();

        let html = escape_source(markdown);
        let html = fenced_code(&html, &mut stash);
        let html = inline_code(&html, &mut stash);
        let html = headings(&html);
        let html = emphasis(&html);
        let html = blockquotes(&html);
        let html = group_list(&html, &UNORDERED_RUN, &UNORDERED_ITEM, "ul");
        let html = group_list(&html, &ORDERED_RUN, &ORDERED_ITEM, "ol");
        let html = self.images_and_links(&html);
        let html = RULE.replace_all(&html, "<hr>");
        let html = self.paragraphs(&html);
        let html = stash.restore(&html);

        cleanup(&html)
    }

    fn images_and_links(&self, text: &str) -> String {
        let text = IMAGE.replace_all(text, r#"<img src="${2}" alt="${1}">"#);
        let link = if self.options.external_links_new_tab {
            r#"<a href="${2}" target="_blank" rel="noopener">${1}</a>"#
        } else {
            r#"<a href="${2}">${1}</a>"#
        };
        LINK.replace_all(&text, link).into_owned()
    }

    /// Wrap runs of non-block lines in paragraphs. Blank lines end a run.
    fn paragraphs(&self, text: &str) -> String {
        let separator = if self.options.hard_breaks {
            "<br>\n"
        } else {
            "\n"
        };

        let mut blocks: Vec<String> = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        let flush = |pending: &mut Vec<&str>, blocks: &mut Vec<String>| {
            if !pending.is_empty() {
                blocks.push(format!("<p>{}</p>", pending.join(separator).trim()));
                pending.clear();
            }
        };

        for line in text.lines() {
            if line.trim().is_empty() {
                flush(&mut pending, &mut blocks);
            } else if is_block_line(line) {
                flush(&mut pending, &mut blocks);
                blocks.push(line.trim().to_string());
            } else {
                pending.push(line.trim_end());
            }
        }
        flush(&mut pending, &mut blocks);

        blocks.join("\n")
    }
}

/// Normalize line endings, drop stash guard characters, escape `&`, `<`, `>`
fn escape_source(markdown: &str) -> String {
    let normalized: String = markdown
        .replace("\r\n", "\n")
        .chars()
        .filter(|&c| c != BLOCK_GUARD && c != INLINE_GUARD)
        .collect();
    escape_text(&normalized)
}

fn fenced_code(text: &str, stash: &mut Stash) -> String {
    FENCED_CODE
        .replace_all(text, |caps: &Captures| {
            let lang = &caps[1];
            let body = caps[2].strip_suffix('\n').unwrap_or(&caps[2]);
            let html = if lang.is_empty() {
                format!("<pre><code>{}</code></pre>", body)
            } else {
                format!(r#"<pre><code class="language-{}">{}</code></pre>"#, lang, body)
            };
            stash.put(BLOCK_GUARD, html)
        })
        .into_owned()
}

fn inline_code(text: &str, stash: &mut Stash) -> String {
    INLINE_CODE
        .replace_all(text, |caps: &Captures| {
            stash.put(INLINE_GUARD, format!("<code>{}</code>", &caps[1]))
        })
        .into_owned()
}

fn headings(text: &str) -> String {
    HEADINGS
        .iter()
        .fold(text.to_string(), |acc, (level, re)| {
            re.replace_all(&acc, format!("<h{0}>${{1}}</h{0}>", level).as_str())
                .into_owned()
        })
}

fn emphasis(text: &str) -> String {
    let text = STRONG_EMPHASIS.replace_all(text, "<strong><em>${1}</em></strong>");
    let text = STRONG.replace_all(&text, "<strong>${1}</strong>");
    EMPHASIS.replace_all(&text, "<em>${1}</em>").into_owned()
}

fn blockquotes(text: &str) -> String {
    BLOCKQUOTE
        .replace_all(text, "<blockquote>${1}</blockquote>")
        .into_owned()
}

/// Turn each run of consecutive item lines into one list container
fn group_list(text: &str, run: &Regex, item: &Regex, tag: &str) -> String {
    run.replace_all(text, |caps: &Captures| {
        let block = &caps[0];
        let mut html = format!("<{}>\n", tag);
        for line in block.lines() {
            html.push_str(&item.replace(line, "<li>${1}</li>"));
            html.push('\n');
        }
        html.push_str(&format!("</{}>", tag));
        if block.ends_with('\n') {
            html.push('\n');
        }
        html
    })
    .into_owned()
}

fn is_block_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with(BLOCK_GUARD) || BLOCK_PREFIXES.iter().any(|p| line.starts_with(p))
}

/// Strip empty paragraphs and paragraph wrapping around block elements
fn cleanup(html: &str) -> String {
    let html = EMPTY_PARAGRAPH.replace_all(html, "");
    let html = WRAPPED_BLOCK_OPEN.replace_all(&html, "${1}");
    let html = WRAPPED_BLOCK_CLOSE.replace_all(&html, "${1}");
    html.trim().to_string()
}

/// Rendered regions hidden from later stages
#[derive(Default)]
struct Stash {
    regions: Vec<String>,
}

impl Stash {
    fn put(&mut self, guard: char, html: String) -> String {
        self.regions.push(html);
        format!("{0}{1}{0}", guard, self.regions.len() - 1)
    }

    fn restore(&self, text: &str) -> String {
        if self.regions.is_empty() {
            return text.to_string();
        }
        STASHED
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.regions.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> String {
        MarkdownRenderer::new().render(markdown)
    }

    #[test]
    fn test_render_basic_markdown() {
        let html = render("# Title\n\nSome **bold** text.");
        assert_eq!(
            html,
            "<h1>Title</h1>\n<p>Some <strong>bold</strong> text.</p>"
        );
    }

    #[test]
    fn test_plain_text_single_paragraph() {
        assert_eq!(render("just some words"), "<p>just some words</p>");
        assert_eq!(
            render("two lines\nof plain text"),
            "<p>two lines\nof plain text</p>"
        );
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert_eq!(render(""), "");
        assert_eq!(render("   \n\n \t\n"), "");
        assert!(!render("\n\n\n").contains("<p>"));
    }

    #[test]
    fn test_escapes_html() {
        let html = render("a < b && c > d");
        assert_eq!(html, "<p>a &lt; b &amp;&amp; c &gt; d</p>");

        let html = render("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_blockquote_from_escaped_marker() {
        assert_eq!(render("> quoted"), "<blockquote>quoted</blockquote>");
        // Not at line start: stays escaped
        assert_eq!(render("x > y"), "<p>x &gt; y</p>");
    }

    #[test]
    fn test_headings_most_specific_first() {
        assert_eq!(render("#### Four"), "<h4>Four</h4>");
        assert_eq!(render("### Three"), "<h3>Three</h3>");
        assert_eq!(render("## Two"), "<h2>Two</h2>");
        assert_eq!(render("# One"), "<h1>One</h1>");
        // Five marks is not a heading
        assert_eq!(render("##### Five"), "<p>##### Five</p>");
        // Missing space is not a heading
        assert_eq!(render("#tag"), "<p>#tag</p>");
    }

    #[test]
    fn test_emphasis_order() {
        assert_eq!(
            render("***both***"),
            "<p><strong><em>both</em></strong></p>"
        );
        assert_eq!(render("**bold**"), "<p><strong>bold</strong></p>");
        assert_eq!(render("*it*"), "<p><em>it</em></p>");
        assert_eq!(
            render("**a *b* c**"),
            "<p><strong>a <em>b</em> c</strong></p>"
        );
        // Arithmetic is left alone
        assert_eq!(render("2 * 3 * 4"), "<p>2 * 3 * 4</p>");
    }

    #[test]
    fn test_unordered_list_grouped() {
        let html = render("- a\n- b");
        assert_eq!(html, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>");
        assert_eq!(html.matches("<ul>").count(), 1);
        assert!(html.find("<li>a</li>").unwrap() < html.find("<li>b</li>").unwrap());
    }

    #[test]
    fn test_separate_lists_stay_separate() {
        let html = render("- a\n\ntext\n\n- b");
        assert_eq!(html.matches("<ul>").count(), 2);
        assert!(html.contains("<p>text</p>"));
    }

    #[test]
    fn test_ordered_list_grouped() {
        let html = render("1. one\n2. two\n10. ten");
        assert_eq!(
            html,
            "<ol>\n<li>one</li>\n<li>two</li>\n<li>ten</li>\n</ol>"
        );
    }

    #[test]
    fn test_list_followed_by_text() {
        let html = render("- item\nafter");
        assert_eq!(html, "<ul>\n<li>item</li>\n</ul>\n<p>after</p>");
    }

    #[test]
    fn test_image_before_link() {
        let html = render("![cat](img/cat.png)");
        assert_eq!(html, r#"<p><img src="img/cat.png" alt="cat"></p>"#);

        let html = render("see [docs](https://example.com/a?b=1&c=2)");
        assert_eq!(
            html,
            r#"<p>see <a href="https://example.com/a?b=1&amp;c=2" target="_blank" rel="noopener">docs</a></p>"#
        );
    }

    #[test]
    fn test_links_without_new_tab() {
        let renderer = MarkdownRenderer::with_options(MarkdownConfig {
            external_links_new_tab: false,
            ..MarkdownConfig::default()
        });
        assert_eq!(
            renderer.render("[home](/)"),
            r#"<p><a href="/">home</a></p>"#
        );
    }

    #[test]
    fn test_link_rejects_quote_in_url() {
        let html = render(r#"[x](a"onclick=b)"#);
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_image_rejects_quote_in_alt() {
        assert_eq!(
            render(r#"![x" onerror="alert(1)](a.png)"#),
            r#"<p>!<a href="a.png" target="_blank" rel="noopener">x" onerror="alert(1)</a></p>"#
        );
    }

    #[test]
    fn test_emphasis_never_lands_in_href() {
        let html = render("[a](http://x.com/*a*b)");
        assert!(!html.contains("href="));
        assert_eq!(
            render("[a](http://x.com/a*b)"),
            r#"<p><a href="http://x.com/a*b" target="_blank" rel="noopener">a</a></p>"#
        );
    }

    #[test]
    fn test_heading_extra_spaces() {
        assert_eq!(render("#  Title"), "<h1>Title</h1>");
        assert_eq!(render("###   Deep  "), "<h3>Deep</h3>");
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(render("above\n\n---\n\nbelow"), "<p>above</p>\n<hr>\n<p>below</p>");
        assert_eq!(render("----"), "<p>----</p>");
    }

    #[test]
    fn test_fenced_code_block() {
        let html = render("```rust\nfn main() {}\n```");
        assert_eq!(
            html,
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#
        );
    }

    #[test]
    fn test_fenced_code_protected_from_later_stages() {
        let html = render("```\n# not a heading\n**not bold** <tag>\n- not a list\n\n[x](y)\n```");
        assert_eq!(
            html,
            "<pre><code># not a heading\n**not bold** &lt;tag&gt;\n- not a list\n\n[x](y)</code></pre>"
        );
    }

    #[test]
    fn test_fenced_code_between_paragraphs() {
        let html = render("before\n```\ncode\n```\nafter");
        assert_eq!(html, "<p>before</p>\n<pre><code>code</code></pre>\n<p>after</p>");
    }

    #[test]
    fn test_unterminated_fence_is_text() {
        let html = render("```\nopen");
        assert!(html.starts_with("<p>"));
        assert!(!html.contains("<pre>"));
    }

    #[test]
    fn test_inline_code_protected() {
        assert_eq!(
            render("use `*ptr` and `a < b`"),
            "<p>use <code>*ptr</code> and <code>a &lt; b</code></p>"
        );
    }

    #[test]
    fn test_forged_guard_characters_are_dropped() {
        let html = render("x\u{E000}0\u{E000}y");
        assert_eq!(html, "<p>x0y</p>");
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(
            render("# Title\r\n\r\nbody\r\n"),
            "<h1>Title</h1>\n<p>body</p>"
        );
    }

    #[test]
    fn test_hard_breaks() {
        let renderer = MarkdownRenderer::with_options(MarkdownConfig {
            hard_breaks: true,
            ..MarkdownConfig::default()
        });
        assert_eq!(renderer.render("line one\nline two"), "<p>line one<br>\nline two</p>");
    }

    #[test]
    fn test_heading_directly_above_text() {
        assert_eq!(render("## Part\nbody"), "<h2>Part</h2>\n<p>body</p>");
    }

    #[test]
    fn test_malformed_markers_do_not_panic() {
        for input in ["**", "*", "[", "](", "![", "```", "- ", "1.", "# ", ">", "&"] {
            let _ = render(input);
        }
        assert_eq!(render("**unclosed"), "<p>**unclosed</p>");
    }

    #[test]
    fn test_cleanup_strips_wrapped_blocks() {
        assert_eq!(cleanup("<p><h1>x</h1></p>"), "<h1>x</h1>");
        assert_eq!(cleanup("<p><hr></p>"), "<hr>");
        assert_eq!(cleanup("<p></p>\n<p>a</p>"), "<p>a</p>");
    }
}
