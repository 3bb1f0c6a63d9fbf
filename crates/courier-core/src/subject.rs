//! Hierarchical subject matching with NATS-style wildcards.
//!
//! Subjects are dot-delimited token sequences (`domain.action.verb`).
//! Patterns may use `*` (exactly one token) and `>` (one or more trailing
//! tokens; only legal as the final token). The transport's native
//! subscription matching is the dispatch mechanism at runtime; this module
//! reproduces its semantics for in-process routing and tests.

/// Match a wildcard pattern against a concrete subject.
///
/// - `*` matches exactly one token at its position.
/// - `>` matches one or more remaining tokens and ends the walk.
/// - Any other pattern token must equal the subject token exactly.
/// - Without a `>`, token counts must be equal.
pub fn match_subject(pattern: &str, subject: &str) -> bool {
    let pattern_tokens: Vec<&str> = pattern.split('.').collect();
    let subject_tokens: Vec<&str> = subject.split('.').collect();

    for (i, token) in pattern_tokens.iter().enumerate() {
        match *token {
            ">" => return i < subject_tokens.len(),
            "*" => {
                if i >= subject_tokens.len() {
                    return false;
                }
            }
            literal => {
                if subject_tokens.get(i).copied() != Some(literal) {
                    return false;
                }
            }
        }
    }

    pattern_tokens.len() == subject_tokens.len()
}

/// Validate a subject or pattern: no empty tokens, `>` only as the final
/// token.
pub fn validate(subject: &str) -> Result<(), String> {
    if subject.is_empty() {
        return Err("subject must not be empty".to_string());
    }
    let tokens: Vec<&str> = subject.split('.').collect();
    for (i, token) in tokens.iter().enumerate() {
        if token.is_empty() {
            return Err(format!("subject '{subject}' contains an empty token"));
        }
        if *token == ">" && i != tokens.len() - 1 {
            return Err(format!("'>' must be the final token in '{subject}'"));
        }
    }
    Ok(())
}

/// Join an optional prefix and a suffix with a dot.
pub fn join(prefix: Option<&str>, suffix: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}.{suffix}"),
        _ => suffix.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
