use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// The parts of a parsed page the extractor cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParts {
    pub title: Option<String>,
    /// `h1`..`h4` in document order.
    pub headings: Vec<(u8, String)>,
    /// Visible text, one block element per line.
    pub text: String,
}

pub fn page_parts(html: &str) -> PageParts {
    let document = Html::parse_document(html);
    PageParts {
        title: title(&document),
        headings: headings(&document),
        text: visible_text(&document),
    }
}

fn title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|t| collapse_whitespace(&t.text().collect::<String>()))
        .filter(|t| !t.is_empty())
}

fn headings(document: &Html) -> Vec<(u8, String)> {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|heading| {
            let level = heading.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
            let text = collapse_whitespace(&heading.text().collect::<String>());
            Some((level, text))
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whole-document text with scripts and styles left out.
pub fn visible_text(document: &Html) -> String {
    let mut ctx = TextContext::default();
    for child in document.root_element().children() {
        visit_node(child, &mut ctx);
    }
    ctx.builder.trim().to_string()
}

fn visit_node(node: NodeRef<'_, Node>, ctx: &mut TextContext) {
    match node.value() {
        Node::Text(text) => ctx.append_text(text),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, ctx);
            }
        }
        _ => {
            for child in node.children() {
                visit_node(child, ctx);
            }
        }
    }
}

fn visit_element(element: ElementRef, ctx: &mut TextContext) {
    let tag = element.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "script" | "style" | "noscript" | "template" | "iframe" | "svg" => {}
        "br" | "hr" => ctx.ensure_newline(),
        "p" | "div" | "section" | "article" | "header" | "footer" | "nav" | "main" | "aside"
        | "figure" | "figcaption" | "table" | "tr" | "td" | "th" | "blockquote" | "address"
        | "ul" | "ol" | "li" | "dl" | "dt" | "dd" | "pre" | "form" | "title" | "h1" | "h2"
        | "h3" | "h4" | "h5" | "h6" => {
            ctx.ensure_newline();
            visit_children(element, ctx);
            ctx.ensure_newline();
        }
        _ => visit_children(element, ctx),
    }
}

fn visit_children(element: ElementRef, ctx: &mut TextContext) {
    for child in element.children() {
        visit_node(child, ctx);
    }
}

#[derive(Default)]
struct TextContext {
    builder: String,
    last_char: Option<char>,
}

impl TextContext {
    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.last_char.is_none()
                    || self.last_char == Some(' ')
                    || self.last_char == Some('\n')
                {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn ensure_newline(&mut self) {
        if self.last_char == Some('\n') || self.builder.is_empty() {
            return;
        }
        self.push_char('\n');
    }

    fn push_char(&mut self, ch: char) {
        self.builder.push(ch);
        self.last_char = Some(ch);
    }
}
