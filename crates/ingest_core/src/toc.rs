//! Table-of-contents numbering from a heading outline.
//!
//! Each heading bumps the counter at its level and clears the deeper ones, so a
//! new `h2` restarts the `h3`/`h4` numbering underneath it. The index shown for
//! a heading is the list of non-zero counters down to its own level, which keeps
//! the numbering readable when a document skips a level.

/// Deepest heading level that takes part in the outline.
pub const MAX_HEADING_LEVEL: u8 = 4;

pub const TOC_BANNER: &str = "Table of Contents";

/// Appended after the last entry so the outline ends as its own sentence
/// once the text is split for embedding.
pub const TOC_TERMINATOR: &str = ". ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingNode {
    pub level: u8,
    pub text: String,
    pub index: String,
}

/// Assign outline indices (`1`, `1-2`, `1-2-1`, ...) to headings in document order.
///
/// Levels outside `1..=4` are skipped.
pub fn number_headings<I, S>(headings: I) -> Vec<HeadingNode>
where
    I: IntoIterator<Item = (u8, S)>,
    S: Into<String>,
{
    let mut counters = [0u32; MAX_HEADING_LEVEL as usize];
    let mut nodes = Vec::new();

    for (level, text) in headings {
        if level == 0 || level > MAX_HEADING_LEVEL {
            continue;
        }
        let depth = level as usize;
        counters[depth - 1] += 1;
        for counter in counters.iter_mut().skip(depth) {
            *counter = 0;
        }
        let index = counters[..depth]
            .iter()
            .filter(|count| **count > 0)
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("-");
        nodes.push(HeadingNode {
            level,
            text: text.into(),
            index,
        });
    }

    nodes
}

/// Render the outline as a text block starting with [`TOC_BANNER`].
pub fn build_toc<I, S>(headings: I) -> String
where
    I: IntoIterator<Item = (u8, S)>,
    S: Into<String>,
{
    let mut toc = String::from(TOC_BANNER);
    toc.push('\n');
    for node in number_headings(headings) {
        // First dot only: "1.2 Setup" reads as "1 2 Setup" next to our own index.
        let text = node.text.replacen('.', " ", 1);
        toc.push_str(&node.index);
        toc.push(' ');
        toc.push_str(&text);
        toc.push('\n');
    }
    toc.push_str(TOC_TERMINATOR);
    toc
}
