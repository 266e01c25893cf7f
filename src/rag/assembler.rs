//! Token-budgeted context assembly.
//!
//! Ranked chunks are admitted best-first. Every chunk that fits is included in
//! full; the first chunk that does not fit is cut at the token boundary when
//! enough budget is left for a useful partial, and assembly stops there. No
//! lower-ranked chunk is ever considered after that point.

use super::RetrievedChunk;
use crate::error::{LoreError, Result};
use crate::tokenizer::Tokenizer;
use tracing::debug;

/// Separator appended after every admitted chunk.
pub const SEPARATOR: &str = "\n\n";

/// Smallest partial chunk worth admitting, in tokens.
pub const DEFAULT_MIN_FRAGMENT_TOKENS: usize = 20;

/// Token budget for an assembled context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    /// Maximum tokens of chunk text in the context.
    pub total: usize,
    /// A straddling chunk is cut only when strictly more tokens than this remain.
    pub min_fragment_tokens: usize,
}

impl TokenBudget {
    /// Create a budget. `total` must be greater than zero.
    pub fn new(total: usize, min_fragment_tokens: usize) -> Result<Self> {
        if total == 0 {
            return Err(LoreError::Config(
                "Token budget must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            total,
            min_fragment_tokens,
        })
    }
}

/// A bounded-length context built for one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledContext {
    /// Concatenated chunk text, each chunk followed by [`SEPARATOR`].
    pub text: String,
    /// Tokens of chunk text admitted.
    pub used_tokens: usize,
    /// Budget the context was assembled against.
    pub budget: usize,
    /// Chunks admitted, including a partial one.
    pub chunks_included: usize,
    /// Whether the last admitted chunk was cut.
    pub truncated: bool,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl std::fmt::Display for AssembledContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Fold ranked chunks into a context that fits `budget`.
///
/// Tokenizer failures propagate: skipping a chunk would break rank order.
pub fn assemble(
    chunks: &[RetrievedChunk],
    budget: &TokenBudget,
    tokenizer: &dyn Tokenizer,
) -> Result<AssembledContext> {
    let mut context = AssembledContext {
        budget: budget.total,
        ..Default::default()
    };

    for chunk in chunks {
        let tokens = tokenizer.encode(&chunk.text)?;

        if context.used_tokens + tokens.len() <= budget.total {
            context.text.push_str(&chunk.text);
            context.text.push_str(SEPARATOR);
            context.used_tokens += tokens.len();
            context.chunks_included += 1;
            continue;
        }

        let remaining = budget.total - context.used_tokens;
        if remaining > budget.min_fragment_tokens {
            let partial = tokenizer.decode(&tokens[..remaining])?;
            context.text.push_str(&partial);
            context.text.push_str(SEPARATOR);
            context.used_tokens += remaining;
            context.chunks_included += 1;
            context.truncated = true;
        }
        break;
    }

    debug!(
        "Assembled {} chunks into {}/{} tokens (truncated: {})",
        context.chunks_included, context.used_tokens, context.budget, context.truncated
    );

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{CharTokenizer, TokenId};
    use std::collections::BTreeMap;

    fn chunk(text: &str, rank: usize) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            metadata: BTreeMap::new(),
            score: 1.0 - rank as f32 * 0.1,
            rank,
        }
    }

    fn abc() -> Vec<RetrievedChunk> {
        vec![chunk("AAAAAAAAAA", 0), chunk("BBBBBBBBBB", 1), chunk("CCCCCCCCCC", 2)]
    }

    /// Fails on any text containing "boom".
    struct FailingTokenizer;

    impl Tokenizer for FailingTokenizer {
        fn encode(&self, text: &str) -> Result<Vec<TokenId>> {
            if text.contains("boom") {
                return Err(LoreError::Tokenizer("boom".to_string()));
            }
            CharTokenizer.encode(text)
        }

        fn decode(&self, tokens: &[TokenId]) -> Result<String> {
            CharTokenizer.decode(tokens)
        }
    }

    #[test]
    fn test_partial_admission_when_threshold_allows() {
        let budget = TokenBudget::new(15, 4).unwrap();
        let context = assemble(&abc(), &budget, &CharTokenizer).unwrap();

        assert_eq!(context.text, "AAAAAAAAAA\n\nBBBBB\n\n");
        assert_eq!(context.used_tokens, 15);
        assert_eq!(context.chunks_included, 2);
        assert!(context.truncated);
        assert!(!context.text.contains('C'));
    }

    #[test]
    fn test_no_partial_below_threshold() {
        let budget = TokenBudget::new(15, 5).unwrap();
        let context = assemble(&abc(), &budget, &CharTokenizer).unwrap();

        assert_eq!(context.text, "AAAAAAAAAA\n\n");
        assert_eq!(context.chunks_included, 1);
        assert!(!context.truncated);
    }

    #[test]
    fn test_everything_fits() {
        let budget = TokenBudget::new(30, DEFAULT_MIN_FRAGMENT_TOKENS).unwrap();
        let context = assemble(&abc(), &budget, &CharTokenizer).unwrap();

        assert_eq!(context.text, "AAAAAAAAAA\n\nBBBBBBBBBB\n\nCCCCCCCCCC\n\n");
        assert_eq!(context.used_tokens, 30);
        assert_eq!(context.chunks_included, 3);
        assert!(!context.truncated);
    }

    #[test]
    fn test_stops_after_first_overflow() {
        // B does not fit and is too small to cut; C would fit but is never considered.
        let chunks = vec![chunk("AAAAAAAAAA", 0), chunk(&"B".repeat(40), 1), chunk("CC", 2)];
        let budget = TokenBudget::new(20, DEFAULT_MIN_FRAGMENT_TOKENS).unwrap();
        let context = assemble(&chunks, &budget, &CharTokenizer).unwrap();

        assert_eq!(context.text, "AAAAAAAAAA\n\n");
    }

    #[test]
    fn test_first_chunk_too_large() {
        let chunks = vec![chunk(&"A".repeat(100), 0)];

        let budget = TokenBudget::new(10, DEFAULT_MIN_FRAGMENT_TOKENS).unwrap();
        let context = assemble(&chunks, &budget, &CharTokenizer).unwrap();
        assert!(context.is_empty());
        assert_eq!(context.chunks_included, 0);

        let budget = TokenBudget::new(50, DEFAULT_MIN_FRAGMENT_TOKENS).unwrap();
        let context = assemble(&chunks, &budget, &CharTokenizer).unwrap();
        assert_eq!(context.text, format!("{}\n\n", "A".repeat(50)));
        assert!(context.truncated);
    }

    #[test]
    fn test_empty_input() {
        let budget = TokenBudget::new(10, 0).unwrap();
        let context = assemble(&[], &budget, &CharTokenizer).unwrap();
        assert!(context.is_empty());
        assert_eq!(context.used_tokens, 0);
        assert_eq!(context.budget, 10);
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(TokenBudget::new(0, 0).is_err());
    }

    #[test]
    fn test_tokenizer_failure_propagates() {
        let chunks = vec![chunk("fine", 0), chunk("boom", 1), chunk("after", 2)];
        let budget = TokenBudget::new(100, 0).unwrap();

        let err = assemble(&chunks, &budget, &FailingTokenizer).unwrap_err();
        assert!(matches!(err, LoreError::Tokenizer(_)));
    }
}
