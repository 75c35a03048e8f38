//! Path pattern compilation.
//!
//! # Responsibilities
//! - Parse route path patterns into segment tokens
//! - Match a concrete pathname and extract parameters
//! - Regenerate a pathname from parameters (reverse routing)
//!
//! # Syntax
//! - `users` literal segment
//! - `:id` exactly one segment
//! - `:tab?` optional segment
//! - `*rest` one or more trailing segments
//!
//! # Design Decisions
//! - No regex: patterns are matched segment by segment
//! - Literal segments are case-sensitive
//! - A trailing slash on the input is tolerated
//! - Parameter values are percent-decoded on match and encoded on compile

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Path parameters extracted from (or used to build) a pathname.
pub type Params = BTreeMap<String, String>;

/// Errors produced while parsing or compiling a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern '{pattern}': parameter without a name")]
    EmptyParam { pattern: String },

    #[error("pattern '{pattern}': duplicate parameter '{name}'")]
    DuplicateParam { pattern: String, name: String },

    #[error("pattern '{pattern}': wildcard '*{name}' must be the last segment")]
    WildcardNotLast { pattern: String, name: String },

    #[error("pattern '{pattern}': missing parameter '{name}'")]
    MissingParam { pattern: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param { name: String, optional: bool },
    Wildcard(String),
}

/// A compiled path pattern such as `/users/:id/*rest`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    tokens: Vec<Token>,
}

impl PathPattern {
    /// Parse a pattern. Empty segments are ignored, so `/a//b/` equals `/a/b`.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let mut tokens = Vec::with_capacity(segments.len());
        let mut names: Vec<String> = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            let token = if let Some(rest) = segment.strip_prefix(':') {
                let (name, optional) = match rest.strip_suffix('?') {
                    Some(name) => (name, true),
                    None => (rest, false),
                };
                Token::Param {
                    name: name.to_string(),
                    optional,
                }
            } else if let Some(name) = segment.strip_prefix('*') {
                if index + 1 != segments.len() {
                    return Err(PatternError::WildcardNotLast {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
                Token::Wildcard(name.to_string())
            } else {
                Token::Literal(segment.to_string())
            };

            if let Token::Param { name, .. } | Token::Wildcard(name) = &token {
                if name.is_empty() {
                    return Err(PatternError::EmptyParam {
                        pattern: pattern.to_string(),
                    });
                }
                if names.contains(name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
                names.push(name.clone());
            }
            tokens.push(token);
        }

        Ok(Self {
            source: pattern.to_string(),
            tokens,
        })
    }

    /// The pattern text this was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of all parameters, in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Param { name, .. } | Token::Wildcard(name) => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }

    /// Match a whole pathname. Returns the extracted parameters on success.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        match_tokens(&self.tokens, &segments, &mut params).then_some(params)
    }

    /// Build a pathname from parameters. Optional parameters may be absent.
    pub fn compile(&self, params: &Params) -> Result<String, PatternError> {
        let mut parts: Vec<String> = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            match token {
                Token::Literal(literal) => parts.push(literal.clone()),
                Token::Param { name, optional } => match params.get(name) {
                    Some(value) if !value.is_empty() => parts.push(encode_segment(value)),
                    _ if *optional => {}
                    _ => return Err(self.missing(name)),
                },
                Token::Wildcard(name) => match params.get(name) {
                    Some(value) if !value.is_empty() => parts.extend(
                        value
                            .split('/')
                            .filter(|s| !s.is_empty())
                            .map(encode_segment),
                    ),
                    _ => return Err(self.missing(name)),
                },
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }

    fn missing(&self, name: &str) -> PatternError {
        PatternError::MissingParam {
            pattern: self.source.clone(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_tokens(tokens: &[Token], segments: &[&str], params: &mut Params) -> bool {
    let Some((token, rest)) = tokens.split_first() else {
        return segments.is_empty();
    };

    match token {
        Token::Literal(literal) => match segments.split_first() {
            Some((segment, tail)) => {
                decode_segment(segment) == *literal && match_tokens(rest, tail, params)
            }
            None => false,
        },
        Token::Param { name, optional } => {
            if let Some((segment, tail)) = segments.split_first() {
                params.insert(name.clone(), decode_segment(segment));
                if match_tokens(rest, tail, params) {
                    return true;
                }
                params.remove(name);
            }
            *optional && match_tokens(rest, segments, params)
        }
        Token::Wildcard(name) => {
            if segments.is_empty() {
                return false;
            }
            let joined: Vec<String> = segments.iter().map(|s| decode_segment(s)).collect();
            params.insert(name.clone(), joined.join("/"));
            true
        }
    }
}

/// Percent-encode one path segment, keeping the characters
/// `encodeURIComponent` keeps.
pub(crate) fn encode_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'!'
            | b'\''
            | b'('
            | b')'
            | b'*' => out.push(byte as char),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// Percent-decode one path segment. Invalid UTF-8 leaves the input as-is.
pub(crate) fn decode_segment(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| raw.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_static_pattern() {
        let pattern = PathPattern::parse("/settings/profile").unwrap();
        assert_eq!(pattern.matches("/settings/profile"), Some(Params::new()));
        assert_eq!(pattern.matches("/settings/profile/"), Some(Params::new()));
        assert!(pattern.matches("/settings").is_none());
        assert!(pattern.matches("/Settings/profile").is_none()); // Case sensitive
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("").is_some());
        assert!(pattern.matches("/a").is_none());
        assert_eq!(pattern.compile(&Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_named_params() {
        let pattern = PathPattern::parse("/user/:id/posts/:post").unwrap();
        assert_eq!(
            pattern.matches("/user/42/posts/hello%20world"),
            Some(params(&[("id", "42"), ("post", "hello world")]))
        );
        assert!(pattern.matches("/user/42/posts").is_none());
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id", "post"]);
    }

    #[test]
    fn test_optional_param() {
        let pattern = PathPattern::parse("/docs/:section?/edit").unwrap();
        assert_eq!(
            pattern.matches("/docs/intro/edit"),
            Some(params(&[("section", "intro")]))
        );
        assert_eq!(pattern.matches("/docs/edit"), Some(Params::new()));
        assert_eq!(pattern.compile(&Params::new()).unwrap(), "/docs/edit");
    }

    #[test]
    fn test_wildcard() {
        let pattern = PathPattern::parse("/files/*rest").unwrap();
        assert_eq!(
            pattern.matches("/files/a/b/c.txt"),
            Some(params(&[("rest", "a/b/c.txt")]))
        );
        assert!(pattern.matches("/files").is_none());
        assert_eq!(
            pattern.compile(&params(&[("rest", "a/b c")])).unwrap(),
            "/files/a/b%20c"
        );
    }

    #[test]
    fn test_compile_regenerates_matched_params() {
        let pattern = PathPattern::parse("/user/:id/:tab").unwrap();
        let input = params(&[("id", "a/b"), ("tab", "profile")]);
        let path = pattern.compile(&input).unwrap();
        assert_eq!(path, "/user/a%2Fb/profile");
        assert_eq!(pattern.matches(&path), Some(input));
    }

    #[test]
    fn test_compile_missing_param() {
        let pattern = PathPattern::parse("/user/:id").unwrap();
        let err = pattern.compile(&Params::new()).unwrap_err();
        assert_eq!(
            err,
            PatternError::MissingParam {
                pattern: "/user/:id".into(),
                name: "id".into()
            }
        );
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::parse("/user/:"),
            Err(PatternError::EmptyParam { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/:id/:id"),
            Err(PatternError::DuplicateParam { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/*rest/tail"),
            Err(PatternError::WildcardNotLast { .. })
        ));
    }

    #[test]
    fn test_decode_keeps_invalid_escapes() {
        assert_eq!(decode_segment("100%"), "100%");
        assert_eq!(decode_segment("%zz"), "%zz");
        assert_eq!(decode_segment("%41b"), "Ab");
    }
}
