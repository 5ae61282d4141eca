//! Placeholder substitution for stored answers.
//!
//! `{key}` is replaced by the value bound to `key`, `{{` and `}}` produce
//! literal braces. Anything else inside braces is an error, so a typo in a
//! saved answer shows up in the logs instead of reaching the chat mangled.

use crate::bot::error::FormatError;

/// Substitute `{key}` placeholders in `template`.
pub fn substitute(template: &str, vars: &[(&str, &str)]) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let at = offset + pos;
        let tail = &rest[pos..];

        let consumed = if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            tail.len() - after.len()
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            tail.len() - after.len()
        } else if tail.starts_with('}') {
            return Err(FormatError::UnmatchedClose(at));
        } else {
            let close = tail.find('}').ok_or(FormatError::UnmatchedOpen(at))?;
            let key = &tail[1..close];
            if key.contains('{') {
                return Err(FormatError::UnmatchedOpen(at));
            }
            let value = vars
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| *v)
                .ok_or_else(|| FormatError::UnknownKey(key.to_string()))?;
            out.push_str(value);
            close + 1
        };

        rest = &tail[consumed..];
        offset = at + consumed;
    }

    out.push_str(rest);
    Ok(out)
}
