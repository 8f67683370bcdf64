//! Markdown rendering with syntax highlighting

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme as HighlightTheme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::{HighlightConfig, MarkdownConfig};
use crate::theme::Theme;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    light_theme: String,
    dark_theme: String,
    line_numbers: bool,
    breaks: bool,
    header_ids: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options(&HighlightConfig::default(), &MarkdownConfig::default())
    }

    /// Create with custom settings
    pub fn with_options(highlight: &HighlightConfig, markdown: &MarkdownConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            light_theme: highlight.light_theme.clone(),
            dark_theme: highlight.dark_theme.clone(),
            line_numbers: highlight.line_number,
            breaks: markdown.breaks,
            header_ids: markdown.header_ids,
        }
    }

    /// Render markdown to HTML, highlighting code for the given colour scheme
    pub fn render(&self, markdown: &str, theme: Theme) -> String {
        // Front-matter is split off beforehand, so no metadata block options here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        let mut heading: Option<(Tag, Vec<Event>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            lang.split_whitespace().next().and_then(language_token)
                        }
                        _ => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref(), theme);
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::Start(tag @ Tag::Heading { .. }) if self.header_ids => {
                    heading = Some((tag, Vec::new(), String::new()));
                }
                Event::End(TagEnd::Heading(level)) if heading.is_some() => {
                    if let Some((tag, inner, text)) = heading.take() {
                        events.push(Event::Start(with_heading_id(tag, &text)));
                        events.extend(inner);
                        events.push(Event::End(TagEnd::Heading(level)));
                    }
                }
                Event::SoftBreak if self.breaks => {
                    push_event(&mut events, &mut heading, Event::HardBreak)
                }
                event => {
                    if let (Some((_, _, text)), Event::Text(t) | Event::Code(t)) =
                        (heading.as_mut(), &event)
                    {
                        text.push_str(t);
                    }
                    push_event(&mut events, &mut heading, event);
                }
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    fn theme(&self, theme: Theme) -> Option<&HighlightTheme> {
        let name = match theme {
            Theme::Light => &self.light_theme,
            Theme::Dark => &self.dark_theme,
        };
        self.theme_set.themes.get(name).or_else(|| {
            tracing::warn!("Unknown highlight theme {:?}, using a default", name);
            self.theme_set.themes.values().next()
        })
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>, theme: Theme) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let highlighted = self.theme(theme).and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Some(highlighted) => format!(
                r#"<div class="highlight language-{}">{}</div>"#,
                lang, highlighted
            ),
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            lang,
            gutter,
            lines.join("\n")
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Route an event into the heading being buffered, if any
fn push_event<'a>(
    events: &mut Vec<Event<'a>>,
    heading: &mut Option<(Tag<'a>, Vec<Event<'a>>, String)>,
    event: Event<'a>,
) {
    match heading.as_mut() {
        Some((_, inner, _)) => inner.push(event),
        None => events.push(event),
    }
}

/// Give a heading a slug id unless it already has an explicit one
fn with_heading_id<'a>(tag: Tag<'a>, text: &str) -> Tag<'a> {
    match tag {
        Tag::Heading {
            level,
            id: None,
            classes,
            attrs,
        } => {
            let slug = slug::slugify(text);
            Tag::Heading {
                level,
                id: (!slug.is_empty()).then(|| CowStr::from(slug)),
                classes,
                attrs,
            }
        }
        other => other,
    }
}

/// Keep only the characters a fence language name may use in a class attribute
fn language_token(lang: &str) -> Option<String> {
    let token: String = lang
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '#' | '-'))
        .collect();
    (!token.is_empty()).then_some(token)
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.", Theme::Light);
        assert!(html.contains(r#"<h1 id="hello-world">Hello World</h1>"#));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_explicit_heading_id_is_kept() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("## Setup {#install}", Theme::Light);
        assert!(html.contains(r#"<h2 id="install">Setup</h2>"#));
    }

    #[test]
    fn test_heading_ids_can_be_disabled() {
        let markdown = MarkdownConfig {
            header_ids: false,
            ..Default::default()
        };
        let renderer = MarkdownRenderer::with_options(&HighlightConfig::default(), &markdown);
        let html = renderer.render("# Plain", Theme::Light);
        assert!(html.contains("<h1>Plain</h1>"));
    }

    #[test]
    fn test_soft_breaks_become_line_breaks() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("first line\nsecond line", Theme::Light);
        assert!(html.contains("first line<br />"));

        let markdown = MarkdownConfig {
            breaks: false,
            ..Default::default()
        };
        let renderer = MarkdownRenderer::with_options(&HighlightConfig::default(), &markdown);
        let html = renderer.render("first line\nsecond line", Theme::Light);
        assert!(!html.contains("<br />"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```", Theme::Dark);
        assert!(html.contains("highlight"));
        assert!(html.contains("main"));
        assert!(!html.contains("<code class=\"language-rust\">fn main"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```nosuchlang\n<b>x</b>\n```", Theme::Light);
        assert!(html.contains("&lt;b&gt;"));
    }

    #[test]
    fn test_fence_language_cannot_break_out_of_class() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```x\"onmouseover=\"alert(1)\ncode\n```", Theme::Light);
        assert!(!html.contains("onmouseover=\""));
        assert!(html.contains(r#"class="highlight language-xonmouseoveralert1""#));

        let highlight = HighlightConfig {
            line_number: true,
            ..Default::default()
        };
        let renderer = MarkdownRenderer::with_options(&highlight, &MarkdownConfig::default());
        let html = renderer.render("```c++\"><script>\nint x;\n```", Theme::Light);
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"<figure class="highlight c++script">"#));
    }

    #[test]
    fn test_line_numbers() {
        let highlight = HighlightConfig {
            line_number: true,
            ..Default::default()
        };
        let renderer = MarkdownRenderer::with_options(&highlight, &MarkdownConfig::default());
        let html = renderer.render("```\na\nb\n```", Theme::Light);
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
    }

    #[test]
    fn test_gfm_table() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |", Theme::Light);
        assert!(html.contains("<table>"));
    }
}
