//! Generic renderer.

use super::DialectRenderer;
use crate::dialect::Dialect;

/// A renderer using ANSI spellings: double-quoted identifiers, doubled
/// single quotes in strings and `LIMIT n OFFSET m`.
///
/// Useful for logging and tests; database drivers should use a renderer
/// that knows the server's escaping rules.
#[derive(Debug, Clone, Copy)]
pub struct GenericRenderer {
    dialect: Dialect,
}

impl GenericRenderer {
    /// Creates a generic renderer validating against `dialect`.
    #[must_use]
    pub const fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl Default for GenericRenderer {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl DialectRenderer for GenericRenderer {
    fn dialect(&self) -> Dialect {
        self.dialect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::LiteralMode;

    #[test]
    fn test_generic_renderer() {
        let renderer = GenericRenderer::default();
        assert_eq!(renderer.dialect(), Dialect::MySQL80);
        assert_eq!(renderer.identifier_quote(), '"');
        assert!(renderer.quote_all_identifiers());
        assert_eq!(renderer.literal_mode(), LiteralMode::Parameterize);

        let mut out = String::new();
        renderer.append_limit(Some(10), Some(20), &mut out);
        assert_eq!(out, " LIMIT 10 OFFSET 20");
    }
}
