//! Property tests for anchor-slug generation.

use proptest::prelude::*;
use std::collections::HashSet;

use recopress::SlugGenerator;

proptest! {
    /// Identical heading sequences always produce identical slug sequences.
    #[test]
    fn slugs_are_deterministic(headings in proptest::collection::vec(".{0,40}", 0..20)) {
        let mut first = SlugGenerator::new();
        let mut second = SlugGenerator::new();
        let a: Vec<_> = headings.iter().map(|h| first.next(h)).collect();
        let b: Vec<_> = headings.iter().map(|h| second.next(h)).collect();
        prop_assert_eq!(a, b);
    }

    /// Slugs are unique within one generator, whatever the heading text.
    #[test]
    fn slugs_are_unique_per_page(headings in proptest::collection::vec(".{0,40}", 0..20)) {
        let mut slugs = SlugGenerator::new();
        let mut seen = HashSet::new();
        for heading in &headings {
            let slug = slugs.next(heading);
            prop_assert!(seen.insert(slug.clone()), "duplicate slug {}", slug);
        }
    }

    /// ASCII in a slug is always lowercase alphanumeric or a hyphen.
    #[test]
    fn slugs_are_url_safe(text in ".{0,80}") {
        let slug = SlugGenerator::slugify(&text);
        prop_assert!(!slug.is_empty());
        let url_safe = slug.chars().all(|c| {
            !c.is_ascii() || c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit()
        });
        prop_assert!(url_safe, "unexpected character in slug {:?}", slug);
    }
}
