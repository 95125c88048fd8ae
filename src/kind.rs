//! The vocabulary shared by every backend: what kind of node something
//! is, how nodes should be formatted, and what dialect a document is
//! written in.
//!
//! Each backend converts its own notion of a node type into
//! [`NodeKind`]; nothing downstream of that conversion knows which
//! backend produced the tree.

use std::convert::TryFrom;
use std::fmt;

use bitflags::bitflags;

macro_rules! vocabulary(
    ($(#[$meta:meta])* $name:ident, $what:expr, {
        $($(#[$vmeta:meta])* $variant:ident = $ordinal:literal => $text:expr),* $(,)*
    }) => (
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq,Eq,Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $ordinal),*
        }

        impl $name {
            /// Every value, in ordinal order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn ordinal(self) -> u8 { self as u8 }

            pub fn from_ordinal(ordinal: u8) -> Option<$name> {
                match ordinal {
                    $($ordinal => Some($name::$variant),)*
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $text),*
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = UnknownOrdinal;

            fn try_from(ordinal: u8) -> Result<$name, UnknownOrdinal> {
                $name::from_ordinal(ordinal).ok_or(UnknownOrdinal { vocabulary: $what, ordinal })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    )
);

/// An ordinal that does not name any value of a vocabulary.
#[derive(Debug,Copy,Clone,PartialEq,Eq,thiserror::Error)]
#[error("{ordinal} is not a valid {vocabulary}")]
pub struct UnknownOrdinal {
    pub vocabulary: &'static str,
    pub ordinal: u8,
}

vocabulary!(
    /// What a node in the tree represents.
    NodeKind, "node kind", {
        Invalid = 0 => "invalid",
        Document = 1 => "document",
        Element = 2 => "element",
        Attribute = 3 => "attribute",
        Namespace = 4 => "namespace",
        ProcessingInstruction = 5 => "processing instruction",
        Comment = 6 => "comment",
        Text = 7 => "text",
        /// A document type declaration
        Dtd = 8 => "document type declaration",
        EntityDeclaration = 9 => "entity declaration",
        AttributeDeclaration = 10 => "attribute declaration",
        ElementDeclaration = 11 => "element declaration",
        NotationDeclaration = 12 => "notation declaration",
    }
);

impl NodeKind {
    /// Markup declarations only occur inside a document type declaration.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::EntityDeclaration | NodeKind::AttributeDeclaration |
            NodeKind::ElementDeclaration | NodeKind::NotationDeclaration
        )
    }
}

vocabulary!(
    /// The dialect a document is written in. Governs the prolog, the
    /// escaping rules and how empty elements are closed.
    DocumentContentKind, "document content kind", {
        Xml = 0 => "XML",
        Xhtml = 1 => "XHTML",
        Html = 2 => "HTML",
        /// Only the string value of the document, without any markup
        Text = 3 => "text",
    }
);

impl Default for DocumentContentKind {
    fn default() -> DocumentContentKind { DocumentContentKind::Xml }
}

bitflags! {
    /// Formatting options applied while serializing.
    ///
    /// `EXPAND_EMPTY_ELEMENT` and `COMPACT_EMPTY_ELEMENT` contradict each
    /// other; when both are set, the compact form is written.
    #[derive(Debug,Copy,Clone,PartialEq,Eq,Hash,Default)]
    pub struct NodeOptions: u32 {
        const NONE = 0;
        /// Write childless elements as `<tag></tag>`
        const EXPAND_EMPTY_ELEMENT = 1 << 1;
        /// Write childless elements as `<tag/>`
        const COMPACT_EMPTY_ELEMENT = 1 << 2;
        /// Indent nested elements, one line per element
        const PRETTY_PRINT = 1 << 17;
    }
}

impl NodeOptions {
    /// The named option values, in ascending bit order.
    pub const ALL: &'static [NodeOptions] = &[
        NodeOptions::NONE,
        NodeOptions::EXPAND_EMPTY_ELEMENT,
        NodeOptions::COMPACT_EMPTY_ELEMENT,
        NodeOptions::PRETTY_PRINT,
    ];

    pub fn is_pretty(self) -> bool {
        self.contains(NodeOptions::PRETTY_PRINT)
    }

    /// The explicitly requested empty-element form, if any. Compact wins
    /// over expand.
    pub fn empty_element(self) -> Option<EmptyElement> {
        if self.contains(NodeOptions::COMPACT_EMPTY_ELEMENT) {
            Some(EmptyElement::Compact)
        } else if self.contains(NodeOptions::EXPAND_EMPTY_ELEMENT) {
            Some(EmptyElement::Expand)
        } else {
            None
        }
    }
}

/// How an element without children is closed.
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum EmptyElement {
    /// `<tag></tag>`
    Expand,
    /// `<tag/>`
    Compact,
}

#[cfg(test)]
mod test {
    use std::convert::TryFrom;

    use super::{NodeKind,DocumentContentKind,NodeOptions,EmptyElement};

    #[test]
    fn node_kinds_have_fixed_ordinals() {
        assert_eq!(13, NodeKind::ALL.len());
        assert_eq!(0, NodeKind::Invalid.ordinal());
        assert_eq!(2, NodeKind::Element.ordinal());
        assert_eq!(7, NodeKind::Text.ordinal());
        assert_eq!(12, NodeKind::NotationDeclaration.ordinal());
    }

    #[test]
    fn node_kind_ordinals_round_trip() {
        for (i, &kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(i as u8, kind.ordinal());
            assert_eq!(Some(kind), NodeKind::from_ordinal(kind.ordinal()));
        }
        assert_eq!(None, NodeKind::from_ordinal(13));
    }

    #[test]
    fn content_kind_ordinals_round_trip() {
        assert_eq!(4, DocumentContentKind::ALL.len());
        for &kind in DocumentContentKind::ALL {
            assert_eq!(Ok(kind), DocumentContentKind::try_from(kind.ordinal()));
        }
    }

    #[test]
    fn unknown_ordinal_is_reported() {
        let err = DocumentContentKind::try_from(9).unwrap_err();
        assert_eq!("9 is not a valid document content kind", err.to_string());
    }

    #[test]
    fn content_kind_defaults_to_xml() {
        assert_eq!(DocumentContentKind::Xml, DocumentContentKind::default());
    }

    #[test]
    fn option_bits_are_fixed() {
        assert_eq!(0, NodeOptions::NONE.bits());
        assert_eq!(2, NodeOptions::EXPAND_EMPTY_ELEMENT.bits());
        assert_eq!(4, NodeOptions::COMPACT_EMPTY_ELEMENT.bits());
        assert_eq!(1 << 17, NodeOptions::PRETTY_PRINT.bits());
        assert_eq!(4, NodeOptions::ALL.len());
    }

    #[test]
    fn compact_wins_over_expand() {
        let both = NodeOptions::EXPAND_EMPTY_ELEMENT | NodeOptions::COMPACT_EMPTY_ELEMENT;
        assert_eq!(Some(EmptyElement::Compact), both.empty_element());
        assert_eq!(Some(EmptyElement::Expand), NodeOptions::EXPAND_EMPTY_ELEMENT.empty_element());
        assert_eq!(None, NodeOptions::PRETTY_PRINT.empty_element());
    }

    #[test]
    fn declarations_are_recognized() {
        let declarations: Vec<_> = NodeKind::ALL.iter().filter(|k| k.is_declaration()).collect();
        assert_eq!(4, declarations.len());
        assert!(!NodeKind::Dtd.is_declaration());
    }
}
