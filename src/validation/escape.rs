//! Markup escaping applied to form input before it is stored, and its inverse
//! applied before stored text is displayed.

/// Characters replaced on write, with their entity form.
const ENTITIES: [(char, &str); 8] = [
    ('&', "&amp;"),
    ('"', "&quot;"),
    ('\'', "&#x27;"),
    ('<', "&lt;"),
    ('>', "&gt;"),
    ('/', "&#x2F;"),
    ('\\', "&#x5C;"),
    ('`', "&#96;"),
];

/// Replace markup-significant characters with HTML entities.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match ENTITIES.iter().find(|(ch, _)| *ch == c) {
            Some((_, entity)) => out.push_str(entity),
            None => out.push(c),
        }
    }
    out
}

/// Exact inverse of [`escape`].
///
/// Works in a single left-to-right pass so that `&amp;lt;` decodes to `&lt;`
/// and not to `<`. Text without entities comes back unchanged, which makes
/// decoding plain text idempotent.
pub fn decode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(_, entity)| rest.starts_with(entity)) {
            Some((ch, entity)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
