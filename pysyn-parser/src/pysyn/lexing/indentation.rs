//! Indentation tracking for the logical lexing pass.
//!
//!     Python blocks are delimited by indentation. The tracker keeps the stack of open
//!     indentation widths and tells the lexer, for the first token of each logical line,
//!     which layout tokens to emit before it.
//!
//! Algorithm
//!
//!     1. Measure the indentation of the line (tabs advance to the next multiple of 8)
//!     2. Compare it with the innermost open level:
//!        - If greater: open a level, emit one Indent
//!        - If less: close levels until one is not wider, emit a Dedent per closed level
//!        - If equal: nothing to emit
//!     3. A dedent landing between two levels is inconsistent: it is reported once and the
//!        width is recorded as a silent level so the following lines stay consistent.
//!     4. At end of input every open level is closed.

const TAB_SIZE: usize = 8;

/// What the lexer must emit before the first token of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentChange {
    None,
    Indent,
    Dedent { count: usize, inconsistent: bool },
}

#[derive(Debug, Clone, Copy)]
struct Level {
    width: usize,
    /// Silent levels come from inconsistent dedents and never emitted an Indent.
    emitted: bool,
}

#[derive(Debug, Clone)]
pub struct IndentTracker {
    levels: Vec<Level>,
}

/// Column width of an indentation string.
pub fn measure(indentation: &str) -> usize {
    indentation.chars().fold(0, |width, ch| match ch {
        '\t' => (width / TAB_SIZE + 1) * TAB_SIZE,
        '\x0C' => 0,
        _ => width + 1,
    })
}

impl IndentTracker {
    pub fn new() -> Self {
        Self {
            levels: vec![Level {
                width: 0,
                emitted: false,
            }],
        }
    }

    fn top(&self) -> usize {
        self.levels.last().map_or(0, |level| level.width)
    }

    pub fn change(&mut self, indentation: &str) -> IndentChange {
        let width = measure(indentation);
        let top = self.top();

        if width > top {
            self.levels.push(Level {
                width,
                emitted: true,
            });
            return IndentChange::Indent;
        }
        if width == top {
            return IndentChange::None;
        }

        let mut count = 0;
        while self.levels.len() > 1 && self.top() > width {
            if let Some(level) = self.levels.pop() {
                if level.emitted {
                    count += 1;
                }
            }
        }
        let inconsistent = self.top() < width;
        if inconsistent {
            self.levels.push(Level {
                width,
                emitted: false,
            });
        }
        IndentChange::Dedent {
            count,
            inconsistent,
        }
    }

    /// Close everything still open; returns the number of Dedents to emit.
    pub fn close_all(&mut self) -> usize {
        let count = self.levels.iter().skip(1).filter(|level| level.emitted).count();
        self.levels.truncate(1);
        count
    }
}

impl Default for IndentTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_tabs() {
        assert_eq!(measure("    "), 4);
        assert_eq!(measure("\t"), 8);
        assert_eq!(measure("  \t"), 8);
        assert_eq!(measure("\t  "), 10);
    }

    #[test]
    fn test_indent_and_dedent() {
        let mut tracker = IndentTracker::new();
        assert_eq!(tracker.change(""), IndentChange::None);
        assert_eq!(tracker.change("    "), IndentChange::Indent);
        assert_eq!(tracker.change("        "), IndentChange::Indent);
        assert_eq!(
            tracker.change(""),
            IndentChange::Dedent {
                count: 2,
                inconsistent: false
            }
        );
        assert_eq!(tracker.close_all(), 0);
    }

    #[test]
    fn test_inconsistent_dedent_is_silent_level() {
        let mut tracker = IndentTracker::new();
        tracker.change("        ");
        assert_eq!(
            tracker.change("    "),
            IndentChange::Dedent {
                count: 1,
                inconsistent: true
            }
        );
        assert_eq!(tracker.change("    "), IndentChange::None);
        assert_eq!(
            tracker.change(""),
            IndentChange::Dedent {
                count: 0,
                inconsistent: false
            }
        );
    }

    #[test]
    fn test_close_all_counts_open_levels() {
        let mut tracker = IndentTracker::new();
        tracker.change("  ");
        tracker.change("    ");
        assert_eq!(tracker.close_all(), 2);
    }
}
