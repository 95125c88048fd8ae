//! The native backend: a mutable, arena-backed DOM owned by a
//! [`Package`].
//!
//! ```
//! use sxd_serialize::Package;
//!
//! let package = Package::new();
//! let doc = package.as_document();
//!
//! let hello = doc.create_element("hello");
//! hello.set_attribute_value("planet", "Earth");
//! let comment = doc.create_comment("What about other planets?");
//! let text = doc.create_text("Greetings, Earthlings!");
//!
//! hello.append_child(comment);
//! hello.append_child(text);
//! doc.root().append_child(hello);
//! ```

use std::borrow::Cow;
use std::fmt;

use super::kind::{DocumentContentKind,NodeKind};
use super::tree::{Prolog,XmlDocument,XmlNode};

mod raw;
mod string_pool;
pub mod dom;

pub use self::dom::{
    Attribute, ChildOfElement, ChildOfRoot, Comment, Declaration, DeclarationKind,
    Document, DocumentType, Element, Namespace, ParentOfChild, ProcessingInstruction,
    Root, Text,
};

/// Owns the storage of one document. Every node handle borrows from it.
pub struct Package {
    storage: raw::Storage,
    connections: raw::Connections,
    metadata: raw::Metadata,
}

impl Package {
    pub fn new() -> Package {
        let s = raw::Storage::new();
        let root = s.create_root();
        let metadata = s.create_metadata();
        Package {
            storage: s,
            connections: raw::Connections::new(root),
            metadata: metadata,
        }
    }

    pub fn as_document(&self) -> Document {
        Document::new(&self.storage, &self.connections, &self.metadata)
    }
}

impl Default for Package {
    fn default() -> Package { Package::new() }
}

impl PartialEq for Package {
    fn eq(&self, other: &Package) -> bool {
        self as *const Package == other as *const Package
    }
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Package")
    }
}

impl From<DeclarationKind> for NodeKind {
    fn from(kind: DeclarationKind) -> NodeKind {
        match kind {
            DeclarationKind::Entity => NodeKind::EntityDeclaration,
            DeclarationKind::AttributeList => NodeKind::AttributeDeclaration,
            DeclarationKind::Element => NodeKind::ElementDeclaration,
            DeclarationKind::Notation => NodeKind::NotationDeclaration,
        }
    }
}

/// Any node of a native document.
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum Node<'d> {
    Root(Root<'d>),
    Element(Element<'d>),
    Attribute(Attribute<'d>),
    Namespace(Namespace<'d>),
    Text(Text<'d>),
    Comment(Comment<'d>),
    ProcessingInstruction(ProcessingInstruction<'d>),
    DocumentType(DocumentType<'d>),
    Declaration(Declaration<'d>),
}

macro_rules! node_from(
    ($($leaf:ident),*) => (
        $(impl<'d> From<$leaf<'d>> for Node<'d> {
            fn from(v: $leaf<'d>) -> Node<'d> { Node::$leaf(v) }
        })*
    )
);

node_from!(
    Root, Element, Attribute, Namespace, Text, Comment,
    ProcessingInstruction, DocumentType, Declaration
);

impl<'d> From<ChildOfRoot<'d>> for Node<'d> {
    fn from(v: ChildOfRoot<'d>) -> Node<'d> {
        match v {
            ChildOfRoot::Element(n) => Node::Element(n),
            ChildOfRoot::Comment(n) => Node::Comment(n),
            ChildOfRoot::ProcessingInstruction(n) => Node::ProcessingInstruction(n),
            ChildOfRoot::DocumentType(n) => Node::DocumentType(n),
        }
    }
}

impl<'d> From<ChildOfElement<'d>> for Node<'d> {
    fn from(v: ChildOfElement<'d>) -> Node<'d> {
        match v {
            ChildOfElement::Element(n) => Node::Element(n),
            ChildOfElement::Text(n) => Node::Text(n),
            ChildOfElement::Comment(n) => Node::Comment(n),
            ChildOfElement::ProcessingInstruction(n) => Node::ProcessingInstruction(n),
        }
    }
}

impl<'d> Node<'d> {
    pub fn element(self) -> Option<Element<'d>> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl<'d> XmlNode for Node<'d> {
    fn kind(&self) -> NodeKind {
        match *self {
            Node::Root(_) => NodeKind::Document,
            Node::Element(_) => NodeKind::Element,
            Node::Attribute(_) => NodeKind::Attribute,
            Node::Namespace(_) => NodeKind::Namespace,
            Node::Text(_) => NodeKind::Text,
            Node::Comment(_) => NodeKind::Comment,
            Node::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
            Node::DocumentType(_) => NodeKind::Dtd,
            Node::Declaration(n) => n.kind().into(),
        }
    }

    fn name(&self) -> Option<Cow<'_, str>> {
        let name = match *self {
            Node::Element(n) => n.name(),
            Node::Attribute(n) => n.name(),
            Node::Namespace(n) => n.prefix().unwrap_or(""),
            Node::ProcessingInstruction(n) => n.target(),
            Node::DocumentType(n) => n.name(),
            Node::Declaration(n) => n.name(),
            Node::Root(_) | Node::Text(_) | Node::Comment(_) => return None,
        };
        Some(Cow::Borrowed(name))
    }

    fn value(&self) -> Option<&str> {
        match *self {
            Node::Attribute(n) => Some(n.value()),
            Node::Namespace(n) => Some(n.uri()),
            Node::Text(n) => Some(n.text()),
            Node::Comment(n) => Some(n.text()),
            Node::ProcessingInstruction(n) => n.value(),
            Node::Declaration(n) => Some(n.content()),
            Node::Root(_) | Node::Element(_) | Node::DocumentType(_) => None,
        }
    }

    fn attributes(&self) -> Vec<Node<'d>> {
        match *self {
            Node::Element(n) => n.attributes().into_iter().map(Node::from).collect(),
            _ => Vec::new(),
        }
    }

    fn namespaces(&self) -> Vec<Node<'d>> {
        match *self {
            Node::Element(n) => n.namespaces().into_iter().map(Node::from).collect(),
            _ => Vec::new(),
        }
    }

    fn inherited_namespaces(&self) -> Vec<Node<'d>> {
        let element = match *self {
            Node::Element(e) => e,
            _ => return Vec::new(),
        };

        let mut seen: Vec<Option<&str>> = element.namespaces().iter().map(|n| n.prefix()).collect();
        let mut inherited = Vec::new();

        let mut current = element.parent().and_then(|p| p.element());
        while let Some(ancestor) = current {
            for namespace in ancestor.namespaces() {
                if !seen.contains(&namespace.prefix()) {
                    seen.push(namespace.prefix());
                    inherited.push(Node::Namespace(namespace));
                }
            }
            current = ancestor.parent().and_then(|p| p.element());
        }

        inherited
    }

    fn children(&self) -> Vec<Node<'d>> {
        match *self {
            Node::Root(n) => n.children().into_iter().map(Node::from).collect(),
            Node::Element(n) => n.children().into_iter().map(Node::from).collect(),
            Node::DocumentType(n) => n.declarations().into_iter().map(Node::from).collect(),
            _ => Vec::new(),
        }
    }

    fn external_id(&self) -> (Option<&str>, Option<&str>) {
        match *self {
            Node::DocumentType(n) => (n.public_id(), n.system_id()),
            _ => (None, None),
        }
    }
}

impl<'d> XmlDocument for Document<'d> {
    type Node<'a> = Node<'d> where Self: 'a;

    fn content_kind(&self) -> DocumentContentKind {
        Document::content_kind(*self)
    }

    fn prolog(&self) -> Prolog<'_> {
        Prolog {
            version: self.version(),
            encoding: self.character_encoding(),
            standalone: self.standalone(),
        }
    }

    fn children(&self) -> Vec<Node<'d>> {
        self.root().children().into_iter().map(Node::from).collect()
    }
}
