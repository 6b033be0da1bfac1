//! `CalculateCost` (spec.md §4.7): a fixed pricing table keyed on
//! `provider + "-" + model`, integer cents per 1000 tokens, separate
//! prompt/completion rates. Integer arithmetic throughout -- spec.md
//! invariant 9 requires `calculate_cost` to return a non-negative
//! integer and `calculate_cost(p, m, 0, 0) == 0`.

/// Cents per 1000 tokens, prompt and completion rates.
#[derive(Debug, Clone, Copy)]
pub struct PriceRow {
    pub prompt_cents_per_1k: u64,
    pub completion_cents_per_1k: u64,
}

/// Conservative fallback row used when `(provider, model)` isn't in the
/// table -- intentionally priced above any listed row so an unlisted
/// model never under-bills.
const DEFAULT_ROW: PriceRow = PriceRow { prompt_cents_per_1k: 10, completion_cents_per_1k: 30 };

/// `(provider, model) -> PriceRow`. Grounded on the fixed-table,
/// match-based lookup style the teacher uses for its own pricing/plan
/// tables (e.g. `PlanTier`'s quota constants).
pub struct PricingTable;

impl PricingTable {
    const TABLE: &'static [(&'static str, &'static str, PriceRow)] = &[
        ("openai", "gpt-4", PriceRow { prompt_cents_per_1k: 3, completion_cents_per_1k: 6 }),
        ("openai", "gpt-4-turbo", PriceRow { prompt_cents_per_1k: 1, completion_cents_per_1k: 3 }),
        ("openai", "gpt-4o", PriceRow { prompt_cents_per_1k: 1, completion_cents_per_1k: 2 }),
        ("openai", "gpt-3.5-turbo", PriceRow { prompt_cents_per_1k: 1, completion_cents_per_1k: 2 }),
        ("anthropic", "claude-3-opus", PriceRow { prompt_cents_per_1k: 2, completion_cents_per_1k: 9 }),
        ("anthropic", "claude-3-sonnet", PriceRow { prompt_cents_per_1k: 1, completion_cents_per_1k: 2 }),
        ("anthropic", "claude-3-haiku", PriceRow { prompt_cents_per_1k: 1, completion_cents_per_1k: 1 }),
        ("bedrock", "titan-text", PriceRow { prompt_cents_per_1k: 1, completion_cents_per_1k: 1 }),
        ("azure", "gpt-4", PriceRow { prompt_cents_per_1k: 3, completion_cents_per_1k: 6 }),
    ];

    pub fn lookup(provider: &str, model: &str) -> PriceRow {
        Self::TABLE
            .iter()
            .find(|(p, m, _)| *p == provider && *m == model)
            .map(|(_, _, row)| *row)
            .unwrap_or(DEFAULT_ROW)
    }
}

/// `CalculateCost(provider, model, prompt_tokens, completion_tokens) ->
/// cents (integer)`. Integer division rounds down within each 1000-token
/// bucket, matching the teacher's integer-cents billing style in
/// `treasury` rather than introducing floating point.
pub fn calculate_cost(provider: &str, model: &str, prompt_tokens: u32, completion_tokens: u32) -> u64 {
    let row = PricingTable::lookup(provider, model);
    let prompt_cost = (prompt_tokens as u64 * row.prompt_cents_per_1k) / 1000;
    let completion_cost = (completion_tokens as u64 * row.completion_cents_per_1k) / 1000;
    prompt_cost + completion_cost
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tokens_cost_zero() {
        // invariant 9.
        assert_eq!(calculate_cost("openai", "gpt-4", 0, 0), 0);
    }

    #[test]
    fn known_model_uses_its_table_row() {
        let cost = calculate_cost("openai", "gpt-4", 1000, 1000);
        assert_eq!(cost, 3 + 6);
    }

    #[test]
    fn unknown_model_falls_back_to_default_row() {
        let cost = calculate_cost("some-new-vendor", "mystery-model", 1000, 1000);
        assert_eq!(cost, DEFAULT_ROW.prompt_cents_per_1k + DEFAULT_ROW.completion_cents_per_1k);
    }

    #[test]
    fn cost_is_always_non_negative() {
        for tokens in [0u32, 1, 999, 1000, 1_000_000] {
            assert!(calculate_cost("anthropic", "claude-3-haiku", tokens, tokens) < u64::MAX);
        }
    }
}
