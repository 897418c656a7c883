use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;
use memchr::memchr;
use thiserror::Error;

use crate::actor::{BreakKind, CommandGroup, Hyperlink, PrettyIndent, TitleKind};
use crate::color::xparse_color;
use crate::Actor;

/// Total color count of the indexed palette, for `OSC 104` without
/// arguments.
const COLOR_COUNT: usize = 256;

pub(crate) fn perform<A: Actor>(actor: &mut A, params: &[&[u8]]) {
    let Some(code) = params.first().and_then(|param| parse_number(param))
    else {
        return unspecified(params);
    };

    match code {
        // Window/icon/buffer titles.
        0 | 1 | 2 | 30 => {
            let kind = match code {
                0 => TitleKind::IconAndWindow,
                1 => TitleKind::Icon,
                2 => TitleKind::Window,
                _ => TitleKind::Buffer,
            };
            if let Ok(title) = str::from_utf8(&join(&params[1..]))
            {
                actor.set_window_title(title, kind);
            }
        },

        // Current working directory, as a file: URL.
        7 => {
            if let Some(Ok(url)) =
                params.get(1).map(|param| str::from_utf8(param))
            {
                actor.set_working_directory(url);
            }
        },

        // Hyperlink: `OSC 8 ; params ; URI`. Only the first `;` after
        // the parameter list separates it from the URI, which may
        // itself contain semicolons.
        8 => {
            let body = join(&params[1..]);
            let link = parse_hyperlink(&body);
            actor.set_hyperlink(link);
        },

        // Dynamic colors; each extra argument addresses the next code.
        10..=19 => {
            if params.len() < 2 {
                return unspecified(params);
            }

            for (offset, param) in params[1..].iter().enumerate() {
                let code = code + offset;
                if code > 19 {
                    break;
                }
                if param == b"?" {
                    actor.report_dynamic_color(code);
                } else if let Some(color) = xparse_color(param) {
                    actor.set_dynamic_color(code, color);
                } else {
                    unspecified(params);
                }
            }
        },

        // Process id of the foreground job.
        31 => {
            if let Some(Ok(pid)) =
                params.get(1).map(|param| str::from_utf8(param))
            {
                actor.set_process_id(pid);
            }
        },

        // Clipboard access.
        52 => {
            if params.len() < 3 {
                return unspecified(params);
            }

            let clipboard = params[1].first().copied().unwrap_or(b'c');
            match params[2] {
                b"?" => actor.clipboard_load(clipboard),
                base64_payload => match BASE64.decode(base64_payload) {
                    Ok(payload) => actor.clipboard_store(clipboard, &payload),
                    Err(err) => {
                        debug!("[osc 52] undecodable payload: {err}");
                    },
                },
            }
        },

        // Raw HTML insertion.
        72 => {
            if let Ok(html) = str::from_utf8(&join(&params[1..]))
            {
                actor.insert_html(html);
            }
        },

        // Reset indexed colors; no arguments resets the whole palette.
        104 => {
            if params.len() == 1 || params[1].is_empty() {
                for index in 0..COLOR_COUNT {
                    actor.reset_color(index);
                }
                return;
            }

            for param in &params[1..] {
                match parse_number(param) {
                    Some(index) => actor.reset_color(index),
                    None => unspecified(params),
                }
            }
        },

        // Pretty-printing group structure.
        110 => {
            let prefix = params
                .get(1)
                .filter(|param| !param.is_empty())
                .and_then(|param| json_string(param));
            actor.start_pretty_print_group(prefix);
        },
        111 => actor.end_pretty_print_group(),
        112 => {
            if let Some(delta) = params.get(1).and_then(|p| parse_signed(p)) {
                actor.pretty_print_indent(PrettyIndent::Relative(delta));
            }
        },
        113 => {
            if let Some(delta) = params.get(1).and_then(|p| parse_signed(p)) {
                actor.pretty_print_indent(PrettyIndent::BlockRelative(delta));
            }
        },
        114 => {
            if let Some(text) = params.get(1).and_then(|p| json_string(p)) {
                actor.pretty_print_indent(PrettyIndent::Literal(text));
            }
        },

        // Pretty-printing linebreaks, with optional JSON
        // `[pre, post, nobreak]` alternate texts.
        115..=118 => {
            let kind = match code {
                115 => BreakKind::Fill,
                116 => BreakKind::Linear,
                117 => BreakKind::Miser,
                _ => BreakKind::Required,
            };
            let (pre, post, nobreak) = match params.get(1) {
                Some(param) if !param.is_empty() => break_texts(param),
                _ => (None, None, None),
            };
            actor.pretty_print_break(kind, pre, post, nobreak);
        },

        // Command groups.
        119 | 120 | 121 => {
            let op = match code {
                119 => CommandGroup::Sibling,
                120 => CommandGroup::Child,
                _ => CommandGroup::Exit,
            };
            let body = join(&params[1..]);
            let key = str::from_utf8(&body)
                .ok()
                .filter(|key| !key.is_empty());
            actor.start_command_group(op, key);
        },

        // Continuation prompt pattern.
        122 => {
            if let Ok(pattern) =
                str::from_utf8(&join(&params[1..]))
            {
                actor.set_continuation_prompt(pattern);
            }
        },

        // Shell integration marks.
        133 => shell_integration(actor, &params[1..]),

        _ => unspecified(params),
    }
}

/// `OSC 133` prompt/command marks in the FinalTerm dialect.
fn shell_integration<A: Actor>(actor: &mut A, params: &[&[u8]]) {
    let Some(mark) = params.first().and_then(|param| param.first()) else {
        return debug!("[osc 133] missing mark");
    };

    match mark {
        b'A' => actor.start_prompt(false),
        b'N' => {
            actor.fresh_line();
            actor.start_prompt(false);
        },
        b'P' => {
            // `k=c` marks a continuation-line prompt.
            let continuation = params
                .iter()
                .any(|param| param.starts_with(b"k=c"));
            actor.start_prompt(continuation);
        },
        b'B' => {
            actor.end_prompt(false);
            actor.start_input(1);
        },
        b'I' => actor.start_input(1),
        b'C' => actor.start_command_output(),
        b'D' => {
            let exit_code = params.get(1).and_then(|p| parse_signed(p));
            actor.command_finished(exit_code);
        },
        b'L' => actor.fresh_line(),
        other => debug!("[osc 133] unknown mark {:?}", *other as char),
    }
}

/// `id=name:key=value` parameters followed by the URI. An empty URI
/// clears the active hyperlink.
fn parse_hyperlink(body: &[u8]) -> Option<Hyperlink> {
    let split = memchr(b';', body)?;
    let (link_params, uri) = (&body[..split], &body[split + 1..]);

    let uri = str::from_utf8(uri).ok()?.trim();
    if uri.is_empty() {
        return None;
    }

    let id = str::from_utf8(link_params)
        .ok()?
        .split(':')
        .find_map(|kv| kv.strip_prefix("id="))
        .map(str::to_owned);

    Some(Hyperlink { id, uri: uri.to_owned() })
}

#[derive(Debug, Error)]
enum PayloadError {
    #[error("payload is empty")]
    Empty,

    #[error("payload is not the expected JSON shape: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse the `[pre, post, nobreak]` alternate-text payload.
fn break_texts(
    param: &[u8],
) -> (Option<String>, Option<String>, Option<String>) {
    match parse_break_texts(param) {
        Ok(texts) => texts,
        Err(err) => {
            debug!("[osc break] {err}");
            (None, None, None)
        },
    }
}

fn parse_break_texts(
    param: &[u8],
) -> Result<(Option<String>, Option<String>, Option<String>), PayloadError> {
    if param.is_empty() {
        return Err(PayloadError::Empty);
    }

    let mut texts: Vec<Option<String>> = serde_json::from_slice(param)?;
    texts.resize(3, None);
    let nobreak = texts.pop().flatten();
    let post = texts.pop().flatten();
    let pre = texts.pop().flatten();

    Ok((pre, post, nobreak))
}

fn json_string(param: &[u8]) -> Option<String> {
    match serde_json::from_slice::<String>(param) {
        Ok(text) => Some(text),
        Err(err) => {
            debug!("[osc] malformed string payload: {err}");
            None
        },
    }
}

fn join(params: &[&[u8]]) -> Vec<u8> {
    params.join(&b';')
}

fn parse_number(param: &[u8]) -> Option<usize> {
    str::from_utf8(param).ok()?.parse().ok()
}

fn parse_signed(param: &[u8]) -> Option<i64> {
    str::from_utf8(param).ok()?.parse().ok()
}

fn unspecified(params: &[&[u8]]) {
    debug!("[unexpected osc]: {params:?}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyperlink_uri_keeps_embedded_semicolons() {
        let link =
            parse_hyperlink(b"id=doc:foo=bar;https://example.com/a;b=c")
                .unwrap();
        assert_eq!(link.id.as_deref(), Some("doc"));
        assert_eq!(link.uri, "https://example.com/a;b=c");
    }

    #[test]
    fn hyperlink_without_uri_clears() {
        assert_eq!(parse_hyperlink(b";"), None);
        assert_eq!(parse_hyperlink(b"id=x;"), None);
    }

    #[test]
    fn break_texts_pad_missing_entries() {
        assert_eq!(
            break_texts(br#"[" ", ""]"#),
            (Some(" ".into()), Some("".into()), None)
        );
        assert_eq!(break_texts(b"not-json"), (None, None, None));
    }
}
