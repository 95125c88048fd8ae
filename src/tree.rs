//! The interface a backend's tree has to offer to be serialized.
//!
//! Both the native DOM and the portable adapter implement these traits;
//! the writer never sees anything else.

use std::borrow::Cow;

use super::kind::{DocumentContentKind,NodeKind};

/// A read-only handle to one node of a tree.
///
/// Attributes and namespace declarations are nodes too, reachable from
/// their element through [`attributes`](XmlNode::attributes) and
/// [`namespaces`](XmlNode::namespaces).
pub trait XmlNode: Copy {
    fn kind(&self) -> NodeKind;

    /// The qualified name of an element or attribute, the target of a
    /// processing instruction, the prefix of a namespace declaration
    /// (empty for the default namespace), the root element name of a
    /// document type declaration or the name a markup declaration
    /// declares.
    fn name(&self) -> Option<Cow<'_, str>>;

    /// Character data, comment text, processing instruction data,
    /// attribute value, namespace URI or markup declaration content.
    fn value(&self) -> Option<&str>;

    /// Attributes in insertion order. Empty for anything but elements.
    fn attributes(&self) -> Vec<Self>;

    /// Namespace declarations made on this element, in declaration order.
    fn namespaces(&self) -> Vec<Self>;

    /// Declarations in scope from ancestors and not overridden here, so
    /// an element written on its own keeps its prefixes bound.
    fn inherited_namespaces(&self) -> Vec<Self> {
        Vec::new()
    }

    /// Child nodes in document order. The markup declarations of a
    /// document type declaration are its children.
    fn children(&self) -> Vec<Self>;

    /// The public and system identifiers of a document type declaration.
    fn external_id(&self) -> (Option<&str>, Option<&str>) {
        (None, None)
    }
}

/// The XML declaration of a document.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Prolog<'a> {
    pub version: &'a str,
    pub encoding: Option<&'a str>,
    pub standalone: Option<bool>,
}

impl<'a> Default for Prolog<'a> {
    fn default() -> Prolog<'a> {
        Prolog { version: "1.0", encoding: None, standalone: None }
    }
}

/// A whole document.
pub trait XmlDocument {
    type Node<'a>: XmlNode where Self: 'a;

    fn content_kind(&self) -> DocumentContentKind;

    fn prolog(&self) -> Prolog<'_> {
        Prolog::default()
    }

    /// Everything at the top level: the document type declaration,
    /// comments, processing instructions and the document element.
    fn children(&self) -> Vec<Self::Node<'_>>;
}

/// Concatenates the character data of every text node below `node`.
pub fn string_value<N: XmlNode>(node: N, out: &mut String) {
    match node.kind() {
        NodeKind::Text => out.push_str(node.value().unwrap_or("")),
        NodeKind::Element | NodeKind::Document => {
            for child in node.children() {
                string_value(child, out);
            }
        }
        _ => {}
    }
}
