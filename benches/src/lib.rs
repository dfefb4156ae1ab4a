//! Synthetic inputs shared by the benchmarks.

const SNIPPETS: &[&str] = &[
    "const input = req.body.input;",
    "const id = encodeURIComponent(req.query.id);",
    "if (user && user.admin) { grant(user); }",
    "db.query(`SELECT * FROM users WHERE id = ${id}`);",
    "el.innerHTML = input;",
    "const total = items.reduce((a, b) => a + b, 0);",
    "console.log(total);",
    "eval(input);",
    "return fetch('http://example.com/api');",
];

/// JavaScript-like source of `lines` lines mixing sources, sinks,
/// transforms and plain code.
pub fn synthetic_source(lines: usize) -> String {
    let mut out = String::with_capacity(lines * 40);
    for i in 0..lines {
        out.push_str(SNIPPETS[i % SNIPPETS.len()]);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_line_count() {
        assert_eq!(synthetic_source(25).lines().count(), 25);
        assert!(synthetic_source(0).is_empty());
    }
}
