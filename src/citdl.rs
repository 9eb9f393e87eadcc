//! CITDL expression tokenization.
//!
//! CITDL expressions are dotted lookup paths such as `parent.foo` or
//! `$db.query().fetch`. A token ending in `()` splits into the bare name
//! followed by the `()` call sentinel, which the hit engine treats as a
//! return-type hop.

/// The call-site sentinel token.
pub const CALL_TOKEN: &str = "()";

/// Split a CITDL expression into tokens.
pub fn tokenize(expr: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for tok in expr.split('.') {
        if let Some(name) = tok.strip_suffix(CALL_TOKEN) {
            tokens.push(name.to_string());
            tokens.push(CALL_TOKEN.to_string());
        } else {
            tokens.push(tok.to_string());
        }
    }
    tokens
}

/// Reassemble tokens into a CITDL expression. Inverse of [`tokenize`].
pub fn join(tokens: &[String]) -> String {
    tokens.join(".").replace(".()", "()")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_plain_path() {
        assert_eq!(tokenize("parent.foo"), vec!["parent", "foo"]);
        assert_eq!(tokenize("strp"), vec!["strp"]);
    }

    #[test]
    fn test_tokenize_call_sentinel() {
        assert_eq!(tokenize("foo()"), vec!["foo", "()"]);
        assert_eq!(
            tokenize("db.query().fetch"),
            vec!["db", "query", "()", "fetch"]
        );
    }

    #[test]
    fn test_join_is_tokenize_inverse() {
        for expr in ["parent.foo", "foo()", "db.query().fetch", "a.b.c()"] {
            let tokens = tokenize(expr);
            assert_eq!(join(&tokens), expr);
            assert_eq!(tokenize(&join(&tokens)), tokens);
        }
    }
}
