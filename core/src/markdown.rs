//! Markdown-subset to HTML fragment rendering for answers.
//!
//! Supports `**bold**`, paragraphs, line breaks, tabs, `N. item` lines and
//! `* item` lines. Rules run in a fixed order, each over the whole string.
//! The source text is not HTML-escaped: answers come from the backend and are
//! inserted as-is.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static LINE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br>|</p><p>").unwrap());
static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.*)$").unwrap());
static BULLET_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\*\s+(.*)$").unwrap());
static ADJACENT_LISTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"</ul>\s*(?:<br>\s*)?<ul>").unwrap());
static ADJACENT_ITEMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"</li>\s*<li>").unwrap());
static NESTED_LIST_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"</ul>\s*</li>").unwrap());
static PARAGRAPH_JOIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"</p>\s*<p>").unwrap());
static EMPTY_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"<p>\s*</p>").unwrap());

const TAB: &str = "&nbsp;&nbsp;&nbsp;&nbsp;";

/// Render `markdown` to an HTML fragment. Empty or absent input yields `""`.
pub fn render(markdown: Option<&str>) -> String {
    let Some(source) = markdown.filter(|s| !s.is_empty()) else {
        return String::new();
    };

    let html = BOLD.replace_all(source, "<strong>${1}</strong>");
    let html = PARAGRAPH_BREAK.replace_all(&html, "</p><p>");
    let html = html.replace('\n', "<br>").replace('\t', TAB);

    let html = map_lines(&html, |line| {
        match NUMBERED_ITEM.replace(line, "<p>${1}. ${2}</p>") {
            Cow::Borrowed(_) => BULLET_ITEM.replace(line, "<ul><li>${1}</li></ul>"),
            numbered => numbered,
        }
    });
    let html = ADJACENT_LISTS.replace_all(&html, "");
    let html = ADJACENT_ITEMS.replace_all(&html, "</li><li>");
    let html = NESTED_LIST_CLOSE.replace_all(&html, "</ul></li>");

    let wrapped = format!("<p>{html}</p>");
    let joined = PARAGRAPH_JOIN.replace_all(&wrapped, "</p><p>");
    EMPTY_PARAGRAPH.replace_all(&joined, "").into_owned()
}

/// Apply `f` to every source line. Lines are the segments between the
/// separators left by the newline rules; separators are kept as they are.
fn map_lines<'a>(html: &'a str, f: impl Fn(&'a str) -> Cow<'a, str>) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for separator in LINE_SEPARATOR.find_iter(html) {
        out.push_str(&f(&html[last..separator.start()]));
        out.push_str(separator.as_str());
        last = separator.end();
    }
    out.push_str(&f(&html[last..]));
    out
}
