//! Rowan language implementation for PHP
//!
//! Connects `PhpSyntaxKind` to Rowan's generic CST infrastructure.

use rowan::Language;

use super::PhpSyntaxKind;

/// Language implementation for PHP
///
/// Zero-sized type implementing `rowan::Language` so that the red/green
/// trees are typed with our syntax kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhpLanguage;

impl Language for PhpLanguage {
    type Kind = PhpSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= PhpSyntaxKind::Tombstone as u16);
        // Safety: PhpSyntaxKind is a contiguous repr(u16) enum and the raw
        // value is bounds-checked against the last variant above.
        unsafe { std::mem::transmute::<u16, PhpSyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

/// A node in the PHP syntax tree
pub type PhpSyntaxNode = rowan::SyntaxNode<PhpLanguage>;
/// A token in the PHP syntax tree
pub type PhpSyntaxToken = rowan::SyntaxToken<PhpLanguage>;
/// Either a node or a token
pub type PhpSyntaxElement = rowan::SyntaxElement<PhpLanguage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrip() {
        let kinds = [
            PhpSyntaxKind::Whitespace,
            PhpSyntaxKind::OpenTag,
            PhpSyntaxKind::MatchKw,
            PhpSyntaxKind::Spaceship,
            PhpSyntaxKind::Program,
            PhpSyntaxKind::MatchExpr,
            PhpSyntaxKind::Tombstone,
        ];

        for &kind in &kinds {
            let raw = PhpLanguage::kind_to_raw(kind);
            let back = PhpLanguage::kind_from_raw(raw);
            assert_eq!(kind, back, "roundtrip failed for {kind:?}");
        }
    }
}
