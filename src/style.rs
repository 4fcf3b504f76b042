//! ANSI terminal styling for error output.

/// ANSI escape code wrappers. Every helper resets at the end of the text.
pub struct Style;

impl Style {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const RED: &'static str = "\x1b[31m";
    pub const BLUE: &'static str = "\x1b[34m";

    pub fn red(text: &str) -> String {
        format!("{}{}{}", Self::RED, text, Self::RESET)
    }

    pub fn blue(text: &str) -> String {
        format!("{}{}{}", Self::BLUE, text, Self::RESET)
    }

    pub fn bold_red(text: &str) -> String {
        format!("{}{}{}{}", Self::BOLD, Self::RED, text, Self::RESET)
    }
}
