use std::ops::RangeInclusive;

use crate::AssetError;

/// Code points an asset may carry: the printable ASCII range.
pub const PRINTABLE_ASCII: RangeInclusive<char> = ' '..='~';

/// Ordered, de-duplicated set of code points to put in one asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharSet {
    chars: Vec<char>,
}

impl CharSet {
    pub fn ascii_printable() -> Self {
        Self { chars: PRINTABLE_ASCII.collect() }
    }

    pub fn from_chars<I: IntoIterator<Item = char>>(chars: I) -> Result<Self, AssetError> {
        let mut chars: Vec<char> = chars.into_iter().collect();
        if let Some(&ch) = chars.iter().find(|ch| !PRINTABLE_ASCII.contains(ch)) {
            return Err(AssetError::UnsupportedCodePoint(ch));
        }

        chars.sort_unstable();
        chars.dedup();
        if chars.is_empty() {
            return Err(AssetError::EmptyCharSet);
        }

        Ok(Self { chars })
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl Default for CharSet {
    fn default() -> Self {
        Self::ascii_printable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_range_has_95_glyphs() {
        let set = CharSet::ascii_printable();
        assert_eq!(set.len(), 95);
        assert_eq!(set.chars().first(), Some(&' '));
        assert_eq!(set.chars().last(), Some(&'~'));
    }

    #[test]
    fn sorts_and_dedups() {
        let set = CharSet::from_chars("zAaA".chars()).unwrap();
        assert_eq!(set.chars(), &['A', 'a', 'z']);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            CharSet::from_chars("ab\u{e9}".chars()),
            Err(AssetError::UnsupportedCodePoint('\u{e9}'))
        ));
        assert!(matches!(
            CharSet::from_chars("\n".chars()),
            Err(AssetError::UnsupportedCodePoint('\n'))
        ));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(CharSet::from_chars("".chars()), Err(AssetError::EmptyCharSet)));
    }
}
