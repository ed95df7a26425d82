// Sat Oct 17 2026 - Alex

use crate::pattern::{CompileError, Pattern, PatternByte};

/// A `?` in either nibble wildcards the whole byte. In lenient mode the first
/// malformed token ends the pattern; strict mode rejects it instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternCompiler {
    strict: bool,
}

impl PatternCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn compile(&self, source: &str) -> Result<Pattern, CompileError> {
        let tokens: Vec<&str> = source.split_ascii_whitespace().collect();

        let mut elements = Vec::new();
        elements
            .try_reserve_exact(tokens.len())
            .map_err(|_| CompileError::AllocationFailed)?;

        for (index, token) in tokens.iter().enumerate() {
            match parse_token(token) {
                Some(element) => elements.push(element),
                None if self.strict => {
                    return Err(CompileError::MalformedToken {
                        index,
                        token: token.to_string(),
                    });
                }
                None => {
                    log::warn!(
                        "Malformed token {:?} at position {}, pattern truncated to {} bytes",
                        token,
                        index,
                        elements.len()
                    );
                    break;
                }
            }
        }

        Pattern::from_elements(elements)
    }
}

pub fn compile(source: &str) -> Result<Pattern, CompileError> {
    PatternCompiler::new().compile(source)
}

fn parse_token(token: &str) -> Option<PatternByte> {
    let &[hi, lo] = token.as_bytes() else {
        return None;
    };
    if !is_token_char(hi) || !is_token_char(lo) {
        return None;
    }
    if hi == b'?' || lo == b'?' {
        return Some(PatternByte::WILDCARD);
    }
    Some(PatternByte::exact((nibble(hi) << 4) | nibble(lo)))
}

fn is_token_char(c: u8) -> bool {
    c == b'?' || c.is_ascii_hexdigit()
}

fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(pattern: &Pattern) -> Vec<(u8, bool)> {
        pattern.elements().iter().map(|e| (e.value, e.wildcard)).collect()
    }

    #[test]
    fn test_compile_basic() {
        let pattern = compile("48 8B ?? 00").unwrap();
        assert_eq!(
            bytes(&pattern),
            vec![(0x48, false), (0x8B, false), (0, true), (0x00, false)]
        );
    }

    #[test]
    fn test_half_wildcards_cover_whole_byte() {
        let pattern = compile("?A B? ff").unwrap();
        assert_eq!(bytes(&pattern), vec![(0, true), (0, true), (0xFF, false)]);
    }

    #[test]
    fn test_extra_whitespace_ignored() {
        let pattern = compile("  E8\t?? \n C3  ").unwrap();
        assert_eq!(pattern.len(), 3);
    }

    #[test]
    fn test_lenient_truncates_at_malformed_token() {
        assert_eq!(compile("48 8B 5 00").unwrap().len(), 2);
        assert_eq!(compile("48 GG 00").unwrap().len(), 1);
        assert_eq!(compile("48 +1 00").unwrap().len(), 1);
        assert_eq!(compile("48 8B0 00").unwrap().len(), 1);
        assert_eq!(compile("48 8B 0").unwrap().len(), 2);
    }

    #[test]
    fn test_empty_patterns() {
        assert_eq!(compile(""), Err(CompileError::Empty));
        assert_eq!(compile("   "), Err(CompileError::Empty));
        assert_eq!(compile("ZZ 48"), Err(CompileError::Empty));
    }

    #[test]
    fn test_strict_rejects_malformed() {
        let compiler = PatternCompiler::new().strict(true);
        assert!(compiler.is_strict());
        assert_eq!(
            compiler.compile("48 8B X0 00"),
            Err(CompileError::MalformedToken {
                index: 2,
                token: "X0".to_string()
            })
        );
        assert_eq!(compiler.compile("48 8B ?? 00").unwrap().len(), 4);
        assert_eq!(compiler.compile(""), Err(CompileError::Empty));
    }
}
