use deunicode::deunicode;

use super::value_objects::Slug;

// ============================================================================
// Slug Generation
// ============================================================================
//
// Category slugs are the storage-level uniqueness key, so the mapping from
// name to slug must be a pure function of the name.
//
// ============================================================================

/// Maps a display name to a URL-safe slug
pub trait Slugger: Send + Sync {
    fn slug(&self, name: &str) -> Slug;
}

/// Transliterates to ASCII, lowercases, and joins alphanumeric runs with `-`
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiSlugger;

impl Slugger for AsciiSlugger {
    fn slug(&self, name: &str) -> Slug {
        let ascii = deunicode(name);

        let mut out = String::with_capacity(ascii.len());
        let mut pending_dash = false;

        for c in ascii.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !out.is_empty() {
                    out.push('-');
                }
                out.push(c.to_ascii_lowercase());
                pending_dash = false;
            } else {
                pending_dash = true;
            }
        }

        Slug(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(name: &str) -> String {
        AsciiSlugger.slug(name).as_str().to_string()
    }

    #[test]
    fn test_accented_names_are_transliterated() {
        assert_eq!(slug("Écrans"), "ecrans");
        assert_eq!(slug("Périphériques"), "peripheriques");
    }

    #[test]
    fn test_plain_names_are_lowercased() {
        assert_eq!(slug("Laptops"), "laptops");
        assert_eq!(slug("Smartphones"), "smartphones");
    }

    #[test]
    fn test_separators_collapse_and_trim() {
        assert_eq!(slug("  Cartes   mères & CPU!  "), "cartes-meres-cpu");
        assert_eq!(slug("--Écrans--4K--"), "ecrans-4k");
    }

    #[test]
    fn test_slug_is_deterministic() {
        for name in ["Laptops", "Écrans", "Périphériques", "Composants", "Ça coûte €"] {
            assert_eq!(slug(name), slug(name));
        }
    }

    #[test]
    fn test_symbol_only_name_yields_empty_slug() {
        assert_eq!(slug("!!!"), "");
    }
}
