//! Out-of-domain answer detection.
//!
//! A plain substring heuristic: lower-case the answer and look for phrases
//! agents use when a question falls outside what they know. False positives
//! and negatives are expected.

const OUT_OF_DOMAIN_INDICATORS: [&str; 6] = [
    "i don't know",
    "i cannot",
    "i can't",
    "not in my knowledge",
    "outside my domain",
    "not available in my sources",
];

/// Whether the answer signals the agent had no relevant knowledge.
pub fn is_out_of_domain(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    OUT_OF_DOMAIN_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
}
