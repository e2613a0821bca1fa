use crate::interpreter::plan::Navigation;
use crate::runtime::handlers::BodyLine;
use crate::script::command::SLIDE_BREAK;
use crate::script::tokenizer::{is_skippable, tokenize_line};

fn is_slide_break(line: &str) -> bool {
    tokenize_line(line)
        .first()
        .is_some_and(|t| !t.quoted && t.as_str() == SLIDE_BREAK)
}

/// Whether `script` contains at least one slide-break line.
pub fn has_slide_breaks(script: &str) -> bool {
    script.lines().any(is_slide_break)
}

/// Split a script into slide bodies at slide-break lines.
///
/// Markers are removed, lines keep their numbers in the full script, and segments holding
/// nothing but blanks or comments are dropped.
pub fn split_slides(script: &str) -> Vec<Vec<BodyLine>> {
    let mut slides = Vec::new();
    let mut current: Vec<BodyLine> = Vec::new();
    for (i, text) in script.lines().enumerate() {
        if is_slide_break(text) {
            slides.push(std::mem::take(&mut current));
            continue;
        }
        current.push(BodyLine {
            line: i + 1,
            text: text.to_owned(),
        });
    }
    slides.push(current);
    slides.retain(|s| s.iter().any(|l| !is_skippable(&l.text)));
    slides
}

/// Slide sequencing state of a presentation script.
#[derive(Clone, Debug)]
pub struct Presentation {
    source: String,
    slides: Vec<Vec<BodyLine>>,
    current: usize,
    active: bool,
    suppress_auto_next: bool,
    auto_next_pending: bool,
}

impl Presentation {
    /// `None` when the script has no slides after splitting.
    pub fn new(script: &str) -> Option<Self> {
        let slides = split_slides(script);
        if slides.is_empty() {
            return None;
        }
        Some(Self {
            source: script.to_owned(),
            slides,
            current: 0,
            active: true,
            suppress_auto_next: false,
            auto_next_pending: false,
        })
    }

    /// The full original script.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn slide(&self, index: usize) -> Option<&[BodyLine]> {
        self.slides.get(index).map(Vec::as_slice)
    }

    /// Index a navigation would move to, or the notice to show when it would leave the deck.
    pub fn target(&self, nav: Navigation) -> Result<usize, &'static str> {
        match nav {
            Navigation::Next if self.current + 1 < self.slides.len() => Ok(self.current + 1),
            Navigation::Next => Err("Already at the last slide"),
            Navigation::Prev if self.current > 0 => Ok(self.current - 1),
            Navigation::Prev => Err("Already at the first slide"),
        }
    }

    pub(crate) fn set_current(&mut self, index: usize) {
        self.current = index.min(self.slides.len().saturating_sub(1));
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.auto_next_pending = false;
    }

    pub fn auto_next_suppressed(&self) -> bool {
        self.suppress_auto_next
    }

    pub(crate) fn set_suppressed(&mut self, suppressed: bool) {
        self.suppress_auto_next = suppressed;
    }

    pub fn auto_next_pending(&self) -> bool {
        self.auto_next_pending
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.auto_next_pending = pending;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/presentation/controller.rs"]
mod tests;
