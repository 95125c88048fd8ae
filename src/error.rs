use super::kind::NodeKind;

/// Why a tree could not be turned into text.
#[derive(Debug,Clone,PartialEq,thiserror::Error)]
pub enum Error {
    #[error("the document has no document element")]
    MissingDocumentElement,
    #[error("the document has {0} top-level elements, only one is allowed")]
    MultipleDocumentElements(usize),
    #[error("{kind} node cannot appear {context}")]
    UnexpectedNode { kind: NodeKind, context: &'static str },
    #[error("expected an element, found a {0} node")]
    NotAnElement(NodeKind),
    #[error("the character {0:?} cannot be represented in XML")]
    UnrepresentableCharacter(char),
    #[error("{value:?} cannot be written in a document type declaration: {reason}")]
    UnrepresentableDocumentType { value: String, reason: &'static str },
    #[cfg(feature = "portable")]
    #[error("the portable DOM could not build a tree: {0}")]
    Parse(#[from] roxmltree::Error),
}

impl Error {
    /// The tree does not have a shape that can be written out.
    pub fn is_structural(&self) -> bool {
        matches!(
            *self,
            Error::MissingDocumentElement | Error::MultipleDocumentElements(..) |
            Error::UnexpectedNode { .. } | Error::NotAnElement(..)
        )
    }

    /// Some content cannot be represented in the output.
    pub fn is_encoding(&self) -> bool {
        matches!(
            *self,
            Error::UnrepresentableCharacter(..) | Error::UnrepresentableDocumentType { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::Error;
    use super::super::kind::NodeKind;

    #[test]
    fn errors_are_classified() {
        assert!(Error::MissingDocumentElement.is_structural());
        assert!(Error::NotAnElement(NodeKind::Text).is_structural());
        assert!(!Error::MissingDocumentElement.is_encoding());
        assert!(Error::UnrepresentableCharacter('\u{1}').is_encoding());
        assert!(Error::UnrepresentableDocumentType { value: "\"'".into(), reason: "quotes" }.is_encoding());
    }

    #[test]
    fn unexpected_node_names_the_kind() {
        let err = Error::UnexpectedNode { kind: NodeKind::EntityDeclaration, context: "inside an element" };
        assert_eq!("entity declaration node cannot appear inside an element", err.to_string());
    }
}
