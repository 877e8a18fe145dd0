use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use appswap_installer::Notifier;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    if std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

/// Stands in for a modal dialog: prints the alert block to stderr.
#[derive(Copy, Clone, Debug)]
pub(crate) struct TerminalNotifier {
    style: OutputStyle,
}

impl TerminalNotifier {
    pub(crate) fn current() -> Self {
        Self {
            style: current_output_style(),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn alert(&self, title: &str, message: &str) {
        for line in render_alert(self.style, title, message) {
            eprintln!("{line}");
        }
    }
}

pub(crate) fn render_alert(style: OutputStyle, title: &str, message: &str) -> Vec<String> {
    let header = format!("error: {title}");
    let mut lines = vec![match style {
        OutputStyle::Plain => header,
        OutputStyle::Rich => colorize(alert_style(), &header),
    }];
    lines.extend(message.lines().map(|line| format!("  {line}")));
    lines
}

fn alert_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightRed.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_alert_indents_message_lines() {
        let lines = render_alert(
            OutputStyle::Plain,
            "Source directory not found",
            "source directory not found: /srv/staging\nCheck the configured update path.",
        );
        assert_eq!(
            lines,
            vec![
                "error: Source directory not found",
                "  source directory not found: /srv/staging",
                "  Check the configured update path.",
            ]
        );
    }

    #[test]
    fn rich_alert_styles_header_only() {
        let lines = render_alert(OutputStyle::Rich, "Fatal error", "boom");
        assert!(lines[0].contains("error: Fatal error"));
        assert!(lines[0].starts_with('\u{1b}'));
        assert_eq!(lines[1], "  boom");
    }
}
