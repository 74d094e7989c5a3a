/// Reduces user input to a bare domain.
///
/// Strips surrounding whitespace, a leading `http://` or `https://`, a leading
/// `www.`, one trailing `/`, and anything from the first remaining `/` on.
/// The rules are reapplied until the result stops changing, so
/// `normalize(normalize(x)) == normalize(x)` for every input.
pub fn normalize(raw: &str) -> &str {
    let mut domain = raw;
    loop {
        let next = strip_once(domain);
        // `next` is always a subslice of `domain`
        if next.len() == domain.len() {
            return next;
        }
        domain = next;
    }
}

fn strip_once(raw: &str) -> &str {
    let mut domain = raw.trim();
    domain = domain.strip_prefix("http://").unwrap_or(domain);
    domain = domain.strip_prefix("https://").unwrap_or(domain);
    domain = domain.strip_prefix("www.").unwrap_or(domain);
    domain = domain.strip_suffix('/').unwrap_or(domain);

    match domain.find('/') {
        Some(idx) => &domain[..idx],
        None => domain,
    }
}
