//! Human-facing identifiers (`nameid`): validation, allocation, and
//! propagation of renames into the dialog's script source.

use crate::model::ElementKind;
use crate::registry::Registry;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Script calls whose first argument names an element.
pub const EVENT_CALLS: [&str; 5] = ["on", "onClick", "onChange", "onInput", "trigger"];

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_nameid(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `<prefix><n>` for the lowest `n >= 1` not already in use.
pub fn next_free_name(registry: &Registry, prefix: &str) -> String {
    (1u64..)
        .map(|n| format!("{prefix}{n}"))
        .find(|candidate| !registry.is_name_taken(candidate))
        .unwrap_or_else(|| prefix.to_string())
}

/// The nameid a new element receives: the requested one when it is valid
/// and free, otherwise the next free `<prefix><n>`.
pub fn resolve_name(registry: &Registry, kind: ElementKind, requested: Option<&str>) -> String {
    match requested {
        Some(name) if is_valid_nameid(name) && !registry.is_name_taken(name) => name.to_string(),
        _ => next_free_name(registry, kind.prefix()),
    }
}

/// Replace `old` with `new` where it is the first argument of an event
/// registration or trigger call (`ui.on('old', ...)`, `onClick(old, ...)`,
/// `trigger("old", ...)`). Quote style is preserved and no other text is
/// touched. Returns the rewritten source and the number of replacements.
pub fn rewrite_references(script: &str, old: &str, new: &str) -> (String, usize) {
    if old == new || old.is_empty() {
        return (script.to_string(), 0);
    }
    let mut out = String::with_capacity(script.len());
    let mut count = 0;
    let mut rest = script;

    while !rest.is_empty() {
        let mut input = rest;
        match parse_identifier.parse_next(&mut input) {
            Ok(ident) => {
                out.push_str(ident);
                rest = input;
                if !EVENT_CALLS.contains(&ident) {
                    continue;
                }
                let mut call = rest;
                if let Ok(arg) = parse_first_argument.parse_next(&mut call)
                    && arg.name == old
                {
                    out.push_str(arg.lead);
                    if let Some(q) = arg.quote {
                        out.push(q);
                        out.push_str(new);
                        out.push(q);
                    } else {
                        out.push_str(new);
                    }
                    count += 1;
                    rest = call;
                }
            }
            Err(_) => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    out.push(c);
                }
                rest = chars.as_str();
            }
        }
    }
    if count > 0 {
        log::debug!("rewrote {count} script reference(s) from `{old}` to `{new}`");
    }
    (out, count)
}

// ─── Scanner ─────────────────────────────────────────────────────────────

struct FirstArgument<'a> {
    /// Text between the call name and the argument: `(`, plus whitespace.
    lead: &'a str,
    quote: Option<char>,
    name: &'a str,
}

fn skip_space(input: &mut &str) {
    let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(input);
}

fn parse_identifier<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn parse_first_argument<'a>(input: &mut &'a str) -> ModalResult<FirstArgument<'a>> {
    let start = *input;
    skip_space(input);
    let _ = '('.parse_next(input)?;
    skip_space(input);
    let lead = &start[..start.len() - input.len()];

    let (quote, name) = alt((
        delimited('\'', take_till(0.., '\''), '\'').map(|s| (Some('\''), s)),
        delimited('"', take_till(0.., '"'), '"').map(|s| (Some('"'), s)),
        parse_identifier.map(|s| (None, s)),
    ))
    .parse_next(input)?;

    // the argument must be complete: followed by `,` or `)`
    let after = *input;
    skip_space(input);
    if !(input.starts_with(',') || input.starts_with(')')) {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    *input = after;
    Ok(FirstArgument { lead, quote, name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nameid_syntax() {
        assert!(is_valid_nameid("title"));
        assert!(is_valid_nameid("_x9"));
        assert!(!is_valid_nameid(""));
        assert!(!is_valid_nameid("9lives"));
        assert!(!is_valid_nameid("has space"));
        assert!(!is_valid_nameid("dash-ed"));
    }

    #[test]
    fn rewrites_only_event_calls() {
        let script = "ui.on('label1', 'click', fn);\nvar s = 'label1';\nui.setValue('label1', 3);";
        let (out, n) = rewrite_references(script, "label1", "title");
        assert_eq!(n, 1);
        assert_eq!(
            out,
            "ui.on('title', 'click', fn);\nvar s = 'label1';\nui.setValue('label1', 3);"
        );
    }

    #[test]
    fn rewrites_every_quote_style_and_bare_identifiers() {
        let script = r#"onClick("ok", f); ui.trigger( ok ,'click'); ui.onChange('ok')"#;
        let (out, n) = rewrite_references(script, "ok", "accept");
        assert_eq!(n, 3);
        assert_eq!(
            out,
            r#"onClick("accept", f); ui.trigger( accept ,'click'); ui.onChange('accept')"#
        );
    }

    #[test]
    fn ignores_prefix_matches() {
        let script = "ui.on('label10', 'click', f); button(label1); upon('label1', f)";
        let (out, n) = rewrite_references(script, "label1", "title");
        assert_eq!(n, 0);
        assert_eq!(out, script);
    }

    #[test]
    fn same_name_is_untouched() {
        let script = "ui.on('a', 'click', f)";
        assert_eq!(rewrite_references(script, "a", "a"), (script.to_string(), 0));
    }

    #[test]
    fn preserves_non_ascii_text() {
        let script = "// étiquette\nui.on(\"b\", 'click', f)";
        let (out, n) = rewrite_references(script, "b", "c");
        assert_eq!(n, 1);
        assert_eq!(out, "// étiquette\nui.on(\"c\", 'click', f)");
    }
}
