//! `**` directive lines: per-file overrides for the binder settings.
//!
//! ```text
//! **pages=40
//! **3x3
//! **debug
//! ```

use crate::parser::{classify, strip_bom, LineType};
use crate::types::{BinderDirectives, LayoutMode};

/// Scan every directive line of a binder file. Later directives win.
pub fn scan(content: &str) -> BinderDirectives {
    let mut directives = BinderDirectives::default();

    for (idx, line) in strip_bom(content).lines().enumerate() {
        if let LineType::Directive(body) = classify(line) {
            apply(&mut directives, body, idx + 1);
        }
    }

    directives
}

fn apply(directives: &mut BinderDirectives, body: &str, line_num: usize) {
    let body = body.trim();

    if body.eq_ignore_ascii_case("debug") {
        directives.debug = true;
        return;
    }

    if let Some(value) = pages_value(body) {
        match value.trim().parse::<u32>() {
            Ok(pages) if pages > 0 => directives.pages_per_binder = Some(pages),
            _ => tracing::debug!(line = line_num, value, "ignoring invalid pages directive"),
        }
        return;
    }

    match LayoutMode::from_token(body) {
        Some(mode) => directives.layout_mode = Some(mode),
        None => tracing::debug!(line = line_num, directive = body, "unknown directive"),
    }
}

fn pages_value(body: &str) -> Option<&str> {
    let lower = body.to_ascii_lowercase();
    let rest = lower.strip_prefix("pages")?;
    if rest.starts_with('=') || rest.starts_with(':') {
        Some(&body["pages".len() + 1..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_reads_all_directive_kinds() {
        let content = "**pages=40\n**3x3\n**debug\n=NEO\n1-3";
        let directives = scan(content);
        assert_eq!(directives.pages_per_binder, Some(40));
        assert_eq!(directives.layout_mode, Some(LayoutMode::ThreeByThree));
        assert!(directives.debug);
    }

    #[test]
    fn later_directives_win() {
        let directives = scan("**4x4\n**Pages: 10\n**2x2\n**pages=12");
        assert_eq!(directives.layout_mode, Some(LayoutMode::TwoByTwo));
        assert_eq!(directives.pages_per_binder, Some(12));
        assert!(!directives.debug);
    }

    #[test]
    fn invalid_directives_are_ignored() {
        let directives = scan("**pages=zero\n**pages=0\n**sideways\n**");
        assert_eq!(directives, BinderDirectives::default());
    }

    #[test]
    fn directive_on_bom_first_line() {
        let directives = scan("\u{feff}**3x3\n=NEO\n1");
        assert_eq!(directives.layout_mode, Some(LayoutMode::ThreeByThree));
    }

    #[test]
    fn no_directives() {
        assert_eq!(scan("=NEO\n1\n# **4x4"), BinderDirectives::default());
    }
}
