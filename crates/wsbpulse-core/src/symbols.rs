//! The symbol universe: every security identifier a thread may resolve to.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::ConfigError;

const SYMBOL_COLUMN: &str = "Symbol";

/// Immutable set of valid ticker symbols.
///
/// Entries are trimmed and upper-cased on the way in; blanks are dropped.
/// Lookups are exact, so `"gme"` is not a member of a universe holding `"GME"`.
#[derive(Debug, Clone, Default)]
pub struct SymbolUniverse {
    symbols: HashSet<String>,
}

impl SymbolUniverse {
    /// Build a universe from raw symbols.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols = symbols
            .into_iter()
            .filter_map(|s| normalize_symbol(s.as_ref()))
            .collect();
        Self { symbols }
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.symbols.contains(token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Load the union of the `Symbol` columns of the given exchange listing CSVs.
///
/// # Errors
///
/// Returns `ConfigError` if a file cannot be opened or parsed, lacks a `Symbol`
/// header, or if the resulting universe is empty.
pub fn load_universe<P: AsRef<Path>>(paths: &[P]) -> Result<SymbolUniverse, ConfigError> {
    let mut symbols: Vec<String> = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let before = symbols.len();
        read_listing(path, &mut symbols)?;
        tracing::debug!(
            path = %path.display(),
            symbols = symbols.len() - before,
            "loaded exchange listing"
        );
    }

    let universe = SymbolUniverse::from_symbols(symbols);
    if universe.is_empty() {
        return Err(ConfigError::EmptyUniverse(paths.len()));
    }

    tracing::info!(
        files = paths.len(),
        symbols = universe.len(),
        "symbol universe loaded"
    );
    Ok(universe)
}

fn read_listing(path: &Path, out: &mut Vec<String>) -> Result<(), ConfigError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|e| ConfigError::ListingIo {
        path: display.clone(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| ConfigError::ListingParse {
            path: display.clone(),
            source: e,
        })?
        .clone();

    let Some(column) = headers.iter().position(|h| h.trim() == SYMBOL_COLUMN) else {
        return Err(ConfigError::ListingMissingColumn {
            path: display,
            column: SYMBOL_COLUMN.to_string(),
        });
    };

    for record in reader.records() {
        let record = record.map_err(|e| ConfigError::ListingParse {
            path: display.clone(),
            source: e,
        })?;
        if let Some(symbol) = record.get(column) {
            out.push(symbol.to_string());
        }
    }

    Ok(())
}
