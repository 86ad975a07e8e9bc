//! Turns a raw model response into a single candidate command string.
//!
//! Local instruct models rarely honor "output the bare command" perfectly:
//! they wrap commands in code fences, echo role prefixes, or prepend filler
//! like "Here is the command:". This pipeline is deterministic and never
//! retries the model; whatever survives it is handed to the safety check.

/// Operators the safety layer refuses outside the allowlist. A
/// command-shaped candidate is truncated at the first of these, matching
/// how argument tails are delimited during extraction.
const CHAIN_OPERATORS: &[&str] = &["&&", "||", ";", "`"];

const ROLE_PREFIXES: &[&str] = &["user:", "assistant:"];

const FILLER_OPENERS: &[&str] = &[
    "here is the command",
    "here's the command",
    "the command is",
    "the requested command is",
    "this is the command",
    "here you go",
    "here's what you asked for",
    "as per your request",
    "this should do the trick",
    "i can only provide raw shell commands",
    "please find the command below",
];

pub fn sanitize_proposal(raw: &str) -> String {
    let mut candidate = extract_fenced_block(raw).unwrap_or_else(|| raw.trim().to_string());

    candidate = strip_role_prefixes(&candidate);
    candidate = collapse_lines(&candidate);
    candidate = strip_filler(&candidate);

    if starts_like_command(&candidate) {
        candidate = truncate_at_operator(&candidate);
    }

    candidate = trim_quotes(&candidate);

    if candidate.is_empty() {
        candidate = last_content_line(raw);
        candidate = trim_quotes(&candidate);
    }

    candidate
}

/// Body of the first ``` fence, with an optional `bash`/`sh` language tag.
fn extract_fenced_block(raw: &str) -> Option<String> {
    let open = raw.find("```")?;
    let after_tag = &raw[open + 3..];
    let body_start = match after_tag.split_once('\n') {
        Some((tag, rest)) if matches!(tag.trim(), "" | "bash" | "sh") => rest,
        _ => after_tag,
    };
    let close = body_start.find("```")?;
    Some(body_start[..close].trim().to_string())
}

fn strip_role_prefixes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        let mut rest = line.trim_start();
        loop {
            let lower = rest.to_lowercase();
            match ROLE_PREFIXES.iter().find(|p| lower.starts_with(*p)) {
                Some(prefix) => rest = rest[prefix.len()..].trim_start(),
                None => break,
            }
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(rest);
    }
    out
}

fn collapse_lines(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First token looks like a program name: alphanumerics plus `_ . / -`.
fn starts_like_command(candidate: &str) -> bool {
    match candidate.split_whitespace().next() {
        Some(token) => token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '-')),
        None => false,
    }
}

fn truncate_at_operator(candidate: &str) -> String {
    let mut cut = candidate.len();
    for op in CHAIN_OPERATORS {
        if let Some(idx) = candidate.find(op) {
            cut = cut.min(idx);
        }
    }
    candidate[..cut].trim().to_string()
}

fn strip_filler(candidate: &str) -> String {
    let lower = candidate.to_lowercase();
    // Byte offsets in the lowercased copy only line up when lowercasing
    // preserved lengths.
    if lower.len() != candidate.len() {
        return candidate.trim().to_string();
    }
    for opener in FILLER_OPENERS {
        if let Some(idx) = lower.find(opener) {
            // Drop the filler sentence; keep whatever trails the colon, if
            // anything.
            let tail = candidate.get(idx + opener.len()..).unwrap_or_default();
            let tail = tail.trim_start_matches([':', ' ']);
            return tail.trim().to_string();
        }
    }
    candidate.trim().to_string()
}

/// Strip symmetric wrapping quotes only; a quote that closes an inner
/// argument (`-name '*.txt'`) is left alone.
fn trim_quotes(candidate: &str) -> String {
    let mut trimmed = candidate.trim();
    loop {
        let bytes = trimmed.as_bytes();
        if bytes.len() >= 2
            && (bytes[0] == b'"' || bytes[0] == b'\'')
            && bytes[bytes.len() - 1] == bytes[0]
        {
            trimmed = trimmed[1..trimmed.len() - 1].trim();
        } else {
            break;
        }
    }
    trimmed.to_string()
}

/// Last line of the raw response that is neither empty nor a role echo.
fn last_content_line(raw: &str) -> String {
    raw.lines()
        .rev()
        .map(str::trim)
        .find(|line| {
            let lower = line.to_lowercase();
            !line.is_empty() && !ROLE_PREFIXES.iter().any(|p| lower.starts_with(*p))
        })
        .unwrap_or_default()
        .to_string()
}
