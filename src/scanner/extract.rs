//! Pattern extraction of `control_message` blocks from TMD text.
//!
//! TMD is a bracketed key/value format:
//!
//! ```text
//! <[control_cylinder][MagnetoSwitch][]
//!     <[control_message][OnStep][]
//!         <[string8][Message][Controls.Magnetos1]>
//!         <[string8][Qualifiers][step]>
//!         <[float64][Value][1.0]>
//!     >
//! >
//! ```
//!
//! Only the fields needed for a [`ControlMessage`] are matched; everything
//! else is ignored. This is not a parser and makes no attempt to balance
//! brackets.

use regex::Regex;
use std::sync::LazyLock;

use super::ControlMessage;

static MESSAGE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\[control_message\]\[([^\]]+)\]\[\]").expect("valid regex")
});

/// Where a message block's body ends. The leftmost hit wins; a `>` followed
/// by another control opener ends the body before the closing bracket.
static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r">\s*<\[control_|<\[control_|<\[float64\]\[Radius\]|<\[tmvector3d\]\[Dimensions\]")
        .expect("valid regex")
});

static MESSAGE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\[string8\]\[Message\]\[([^\]]+)\]>").expect("valid regex"));

static QUALIFIERS_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\[string8\]\[Qualifiers\]\[([^\]]*)\]>").expect("valid regex"));

static VALUE_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\[float64\]\[Value\]\[([^\]]+)\]>").expect("valid regex"));

static CONTROL_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\[control_([^\]]+)\]\[([^\]]*)\]\[\]").expect("valid regex"));

/// Control types that wrap the interactive object rather than being one.
const WRAPPER_TYPES: [&str; 5] = ["message", "input", "rotation", "translation", "product"];
/// Control types a user actually clicks or drags.
const INTERACTIVE_TYPES: [&str; 3] = ["cylinder", "box", "sphere"];

/// A `<[control_TYPE][NAME][]` opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ControlOpener<'a> {
    end: usize,
    kind: &'a str,
    name: &'a str,
}

/// Extract every well-formed message block from `content`.
///
/// Blocks without a `Message` or with a missing or non-numeric `Value`
/// are skipped.
pub fn extract_control_messages(content: &str, aircraft: &str, file_path: &str) -> Vec<ControlMessage> {
    let openers: Vec<ControlOpener<'_>> = CONTROL_OPEN
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ControlOpener {
                end: whole.end(),
                kind: caps.get(1)?.as_str(),
                name: caps.get(2)?.as_str(),
            })
        })
        .collect();

    MESSAGE_OPEN
        .captures_iter(content)
        .filter_map(|caps| {
            let opener = caps.get(0)?;
            let event_type = caps.get(1)?.as_str();

            let body_start = opener.end();
            let body_end =
                BLOCK_END.find_at(content, body_start).map_or(content.len(), |m| m.start());
            let body = &content[body_start..body_end];

            let variable_name = MESSAGE_FIELD.captures(body)?.get(1)?.as_str();
            let qualifier = QUALIFIERS_FIELD
                .captures(body)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());
            let value: f64 = VALUE_FIELD.captures(body)?.get(1)?.as_str().trim().parse().ok()?;

            let (control_name, control_type) = parent_control(&openers, opener.start());

            Some(ControlMessage {
                variable_name: variable_name.to_string(),
                event_type: event_type.to_string(),
                qualifier: qualifier.to_string(),
                value,
                aircraft: aircraft.to_string(),
                control_name: control_name.to_string(),
                control_type: control_type.to_string(),
                file_path: file_path.to_string(),
            })
        })
        .collect()
}

/// Name and type of the control owning a message that starts at `position`.
///
/// Uses the last control opener before the message. Wrapper types are
/// skipped in favour of the nearest interactive control before them; when
/// there is none the wrapper itself is reported.
pub fn find_parent_control(content: &str, position: usize) -> (String, String) {
    let prefix = content.get(..position).unwrap_or(content);
    let openers: Vec<ControlOpener<'_>> = CONTROL_OPEN
        .captures_iter(prefix)
        .filter_map(|caps| {
            Some(ControlOpener {
                end: caps.get(0)?.end(),
                kind: caps.get(1)?.as_str(),
                name: caps.get(2)?.as_str(),
            })
        })
        .collect();
    let (name, kind) = parent_control(&openers, position);
    (name.to_string(), kind.to_string())
}

fn parent_control<'a>(openers: &[ControlOpener<'a>], position: usize) -> (&'a str, &'a str) {
    let before = openers.partition_point(|o| o.end <= position);
    let candidates = &openers[..before];

    let Some(last) = candidates.last() else {
        return ("unknown", "unknown");
    };

    if WRAPPER_TYPES.contains(&last.kind) {
        if let Some(interactive) = candidates[..candidates.len() - 1]
            .iter()
            .rev()
            .find(|o| INTERACTIVE_TYPES.contains(&o.kind))
        {
            return (interactive.name, interactive.kind);
        }
    }
    (last.name, last.kind)
}
