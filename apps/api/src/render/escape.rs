/// Escapes LaTeX special characters in user-supplied text.
///
/// Each input character is mapped independently, so the braces introduced for
/// `\textbackslash{}` are never escaped a second time.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str(r"\textbackslash{}"),
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '$' => out.push_str(r"\$"),
            '#' => out.push_str(r"\#"),
            '_' => out.push_str(r"\_"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '^' => out.push_str(r"\textasciicircum{}"),
            other => out.push(other),
        }
    }
    out
}

/// [`escape_latex`] for optional fields; `None` renders as empty.
pub fn escape_opt(text: Option<&str>) -> String {
    text.map(escape_latex).unwrap_or_default()
}

/// Sanitizes a raw `\href` target. Hyperref accepts `\%` and `\#` in URLs; braces and
/// backslashes would break the argument and are dropped.
pub fn href_target(target: &str) -> String {
    let mut out = String::with_capacity(target.len());
    for c in target.chars() {
        match c {
            '%' => out.push_str(r"\%"),
            '#' => out.push_str(r"\#"),
            '{' | '}' | '\\' => {}
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_every_special_character() {
        assert_eq!(
            escape_latex(r"\ & % $ # _ { } ~ ^"),
            r"\textbackslash{} \& \% \$ \# \_ \{ \} \textasciitilde{} \textasciicircum{}"
        );
    }

    #[test]
    fn test_backslash_braces_are_not_reescaped() {
        assert_eq!(escape_latex(r"a\b"), r"a\textbackslash{}b");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(escape_latex("Built APIs in Rust (2023)"), "Built APIs in Rust (2023)");
        assert_eq!(escape_latex("Zürich"), "Zürich");
        assert_eq!(escape_opt(None), "");
    }

    #[test]
    fn test_realistic_bullet() {
        assert_eq!(
            escape_latex("Cut costs by 40% & saved $2M for R&D"),
            r"Cut costs by 40\% \& saved \$2M for R\&D"
        );
    }

    #[test]
    fn test_href_target() {
        assert_eq!(href_target("github.com/a_b#readme"), r"github.com/a_b\#readme");
        assert_eq!(href_target("x{y}\\z"), "xyz");
    }
}
