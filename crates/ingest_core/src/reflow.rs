/// A run of glyphs drawn with one text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRun {
    /// Vertical position in user space.
    pub y: f32,
    pub text: String,
}

impl GlyphRun {
    pub fn new(y: f32, text: impl Into<String>) -> Self {
        Self {
            y,
            text: text.into(),
        }
    }
}

/// Rebuild visual lines from runs in content-stream order.
///
/// Runs on the same baseline are joined as they are; a change of baseline
/// starts a new line. Every rebuilt line ends with a single space.
pub fn reflow_runs(runs: &[GlyphRun]) -> String {
    let mut text = String::new();
    let mut last_y: Option<f32> = None;

    for run in runs {
        match last_y {
            Some(y) if y != run.y => {
                text.push(' ');
                text.push('\n');
            }
            _ => {}
        }
        text.push_str(&run.text);
        last_y = Some(run.y);
    }
    if last_y.is_some() {
        text.push(' ');
    }
    text
}
