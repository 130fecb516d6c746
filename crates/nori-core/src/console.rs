//! Terminal output helpers with automatic color detection

use is_terminal::IsTerminal;

/// ANSI color styles used by the diagnostic renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
    Bold,
    Dim,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Blue => "\x1b[34m",
            Color::Bold => "\x1b[1m",
            Color::Dim => "\x1b[2m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// A console that knows whether it may emit ANSI escapes.
#[derive(Debug, Clone)]
pub struct Console {
    colors: bool,
}

impl Console {
    /// Detect color support from stderr and the `NO_COLOR` convention.
    pub fn new() -> Self {
        let colors = std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { colors }
    }

    pub fn no_colors() -> Self {
        Self { colors: false }
    }

    pub fn colors_enabled(&self) -> bool {
        self.colors
    }

    pub fn colorize(&self, text: &str, color: Color) -> String {
        if self.colors {
            format!("{}{}{}", color.code(), text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Width available for separators and frames.
    pub fn max_width(&self) -> usize {
        80
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_colors_passes_text_through() {
        let console = Console::no_colors();
        assert_eq!(console.colorize("hello", Color::Red), "hello");
    }

    #[test]
    fn colorize_wraps_with_reset() {
        let console = Console { colors: true };
        let out = console.colorize("x", Color::Bold);
        assert!(out.starts_with("\x1b[1m"));
        assert!(out.ends_with(RESET));
    }
}
