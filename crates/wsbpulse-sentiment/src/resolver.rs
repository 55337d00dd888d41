//! Ticker extraction from thread text.

use wsbpulse_core::SymbolUniverse;

/// Resolve the ticker a thread is about.
///
/// Searches the title first and falls back to the body. Within one text the
/// longest whitespace-delimited token that is an exact universe member wins;
/// among equally long matches the last one wins. Only one ticker is ever
/// returned even when several are mentioned.
#[must_use]
pub fn resolve_ticker(universe: &SymbolUniverse, title: &str, body: &str) -> Option<String> {
    ticker_from_text(universe, title)
        .or_else(|| ticker_from_text(universe, body))
        .map(str::to_string)
}

fn ticker_from_text<'a>(universe: &SymbolUniverse, text: &'a str) -> Option<&'a str> {
    let mut best: Option<&str> = None;
    for token in text.split_whitespace() {
        if !universe.contains(token) {
            continue;
        }
        if best.is_none_or(|b| token.len() >= b.len()) {
            best = Some(token);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn universe() -> SymbolUniverse {
        SymbolUniverse::from_symbols(["GME", "AMC", "A", "DD", "TSLA", "BB"])
    }

    #[test]
    fn empty_title_and_body_resolve_to_none() {
        assert_eq!(resolve_ticker(&universe(), "", ""), None);
        assert_eq!(resolve_ticker(&universe(), "   ", "\n\t"), None);
    }

    #[test]
    fn picks_the_longest_title_match() {
        let ticker = resolve_ticker(&universe(), "A TSLA and GME play", "");
        assert_eq!(ticker.as_deref(), Some("TSLA"));
    }

    #[test]
    fn equal_length_matches_keep_the_last_one() {
        let ticker = resolve_ticker(&universe(), "GME or AMC today", "");
        assert_eq!(ticker.as_deref(), Some("AMC"));
    }

    #[test]
    fn falls_back_to_body_when_title_has_no_match() {
        let ticker = resolve_ticker(&universe(), "What do you think?", "I am holding BB forever");
        assert_eq!(ticker.as_deref(), Some("BB"));
    }

    #[test]
    fn title_match_wins_over_longer_body_match() {
        let ticker = resolve_ticker(&universe(), "BB earnings", "also TSLA");
        assert_eq!(ticker.as_deref(), Some("BB"));
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        // Punctuation stays attached and lowercase does not match.
        assert_eq!(resolve_ticker(&universe(), "gme $GME GME!", ""), None);
    }

    #[test]
    fn result_is_always_a_universe_member() {
        let u = universe();
        let texts = [
            "YOLO on GME calls",
            "DD: why AMC is undervalued",
            "nothing here at all",
            "TSLA TSLA GME",
            "a A aa",
        ];
        for text in texts {
            if let Some(ticker) = resolve_ticker(&u, text, text) {
                assert!(u.contains(&ticker), "{ticker} not in universe (from {text:?})");
            }
        }
    }
}
