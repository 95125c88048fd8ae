//! The portable backend: documents built by the `roxmltree` library.
//!
//! `roxmltree` keeps no prefixes, only resolved namespaces, so qualified
//! names are rebuilt from the namespaces in scope, and the namespace
//! declarations of an element are the ones not already in scope at its
//! parent.
//!
//! ```
//! use sxd_serialize::{Document, NodeOptions, document_to_string};
//!
//! let doc = Document::parse("<hello planet='Earth'/>").unwrap();
//! let xml = document_to_string(&doc, NodeOptions::NONE).unwrap();
//! assert_eq!(xml, r#"<?xml version="1.0"?><hello planet="Earth"/>"#);
//! ```

use std::borrow::Cow;
use std::cell::Cell;
use std::convert::TryFrom;
use std::fmt;

use super::error::{Error,Result};
use super::kind::{DocumentContentKind,NodeKind};
use super::tree::{XmlDocument,XmlNode};

type TreeNode<'d> = roxmltree::Node<'d, 'd>;

impl From<roxmltree::NodeType> for NodeKind {
    fn from(kind: roxmltree::NodeType) -> NodeKind {
        match kind {
            roxmltree::NodeType::Root => NodeKind::Document,
            roxmltree::NodeType::Element => NodeKind::Element,
            roxmltree::NodeType::PI => NodeKind::ProcessingInstruction,
            roxmltree::NodeType::Comment => NodeKind::Comment,
            roxmltree::NodeType::Text => NodeKind::Text,
        }
    }
}

/// A `roxmltree` document, with the content kind it should be written as.
pub struct Document<'input> {
    tree: roxmltree::Document<'input>,
    content_kind: Cell<DocumentContentKind>,
}

impl<'input> Document<'input> {
    pub fn from_tree(tree: roxmltree::Document<'input>) -> Document<'input> {
        Document {
            tree: tree,
            content_kind: Cell::new(DocumentContentKind::Xml),
        }
    }

    /// Builds the tree with `roxmltree`'s own parser.
    pub fn parse(text: &'input str) -> Result<Document<'input>> {
        let tree = roxmltree::Document::parse(text)?;
        Ok(Document::from_tree(tree))
    }

    pub fn tree(&self) -> &roxmltree::Document<'input> {
        &self.tree
    }

    pub fn content_kind(&self) -> DocumentContentKind {
        self.content_kind.get()
    }

    pub fn set_content_kind(&self, kind: DocumentContentKind) {
        self.content_kind.set(kind);
    }

    pub fn root(&self) -> Node<'_> {
        Node::Tree(self.tree.root())
    }

    pub fn document_element(&self) -> Option<Element<'_>> {
        self.tree.root().children().find(|n| n.is_element()).map(|n| Element(n))
    }
}

impl<'input> fmt::Debug for Document<'input> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Document {{ content_kind: {:?} }}", self.content_kind())
    }
}

/// Any node of a portable document, including attributes and namespace
/// declarations.
#[derive(Debug,Copy,Clone)]
pub enum Node<'d> {
    Tree(TreeNode<'d>),
    Attribute { owner: TreeNode<'d>, index: usize },
    Namespace(&'d roxmltree::Namespace<'d>),
}

impl<'d> Node<'d> {
    pub fn element(self) -> Option<Element<'d>> {
        Element::try_from(self).ok()
    }
}

/// An element of a portable document.
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct Element<'d>(TreeNode<'d>);

impl<'d> Element<'d> {
    pub fn node(self) -> Node<'d> {
        Node::Tree(self.0)
    }

    pub fn local_name(self) -> &'d str {
        self.0.tag_name().name()
    }

    pub fn namespace_uri(self) -> Option<&'d str> {
        self.0.tag_name().namespace()
    }

    pub fn name(self) -> Cow<'d, str> {
        qualified(self.0, self.namespace_uri(), self.local_name())
    }

    pub fn attribute_value(self, name: &str) -> Option<&'d str> {
        self.0.attribute(name)
    }

    pub fn children(self) -> Vec<Node<'d>> {
        self.0.children().map(Node::Tree).collect()
    }
}

impl<'d> From<Element<'d>> for Node<'d> {
    fn from(element: Element<'d>) -> Node<'d> {
        element.node()
    }
}

impl<'d> TryFrom<Node<'d>> for Element<'d> {
    type Error = Error;

    fn try_from(node: Node<'d>) -> Result<Element<'d>> {
        match node {
            Node::Tree(n) if n.is_element() => Ok(Element(n)),
            other => Err(Error::NotAnElement(other.kind())),
        }
    }
}

fn qualified<'d>(scope: TreeNode<'d>, namespace: Option<&str>, local: &'d str) -> Cow<'d, str> {
    match namespace.and_then(|uri| scope.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => Cow::Owned(format!("{}:{}", prefix, local)),
        _ => Cow::Borrowed(local),
    }
}

/// Attributes never take the default namespace, so only a prefixed
/// declaration of the URI will do.
fn qualified_attribute<'d>(scope: TreeNode<'d>, namespace: Option<&str>, local: &'d str) -> Cow<'d, str> {
    let prefix = namespace.and_then(|uri| {
        scope.namespaces().into_iter().find(|ns| ns.name().is_some() && ns.uri() == uri)
    }).and_then(|ns| ns.name());

    match prefix {
        Some(prefix) => Cow::Owned(format!("{}:{}", prefix, local)),
        None => Cow::Borrowed(local),
    }
}

fn declared_namespaces(node: TreeNode<'_>) -> Vec<&roxmltree::Namespace<'_>> {
    let inherited: Vec<_> = match node.parent_element() {
        Some(parent) => parent.namespaces().into_iter().collect(),
        None => Vec::new(),
    };

    node.namespaces().into_iter()
        .filter(|ns| ns.name() != Some("xml"))
        .filter(|ns| !inherited.iter().any(|p| p.name() == ns.name() && p.uri() == ns.uri()))
        .collect()
}

impl<'d> XmlNode for Node<'d> {
    fn kind(&self) -> NodeKind {
        match *self {
            Node::Tree(n) => n.node_type().into(),
            Node::Attribute { .. } => NodeKind::Attribute,
            Node::Namespace(_) => NodeKind::Namespace,
        }
    }

    fn name(&self) -> Option<Cow<'_, str>> {
        match *self {
            Node::Tree(n) if n.is_element() => Some(Element(n).name()),
            Node::Tree(n) => n.pi().map(|pi| Cow::Borrowed(pi.target)),
            Node::Attribute { owner, index } => {
                owner.attributes().nth(index).map(|a| qualified_attribute(owner, a.namespace(), a.name()))
            },
            Node::Namespace(ns) => Some(Cow::Borrowed(ns.name().unwrap_or(""))),
        }
    }

    fn value(&self) -> Option<&str> {
        match *self {
            Node::Tree(n) if n.is_text() || n.is_comment() => n.text(),
            Node::Tree(n) => n.pi().and_then(|pi| pi.value),
            Node::Attribute { owner, index } => owner.attributes().nth(index).map(|a| a.value()),
            Node::Namespace(ns) => Some(ns.uri()),
        }
    }

    fn attributes(&self) -> Vec<Node<'d>> {
        match *self {
            Node::Tree(n) if n.is_element() => {
                (0..n.attributes().count()).map(|index| Node::Attribute { owner: n, index: index }).collect()
            },
            _ => Vec::new(),
        }
    }

    fn namespaces(&self) -> Vec<Node<'d>> {
        match *self {
            Node::Tree(n) if n.is_element() => {
                declared_namespaces(n).into_iter().map(Node::Namespace).collect()
            },
            _ => Vec::new(),
        }
    }

    fn inherited_namespaces(&self) -> Vec<Node<'d>> {
        match *self {
            Node::Tree(n) if n.is_element() => {
                let declared = declared_namespaces(n);
                n.namespaces().into_iter()
                    .filter(|ns| ns.name() != Some("xml"))
                    .filter(|ns| !declared.iter().any(|d| d.name() == ns.name()))
                    .map(Node::Namespace)
                    .collect()
            },
            _ => Vec::new(),
        }
    }

    fn children(&self) -> Vec<Node<'d>> {
        match *self {
            Node::Tree(n) => n.children().map(Node::Tree).collect(),
            _ => Vec::new(),
        }
    }
}

impl<'input> XmlDocument for Document<'input> {
    type Node<'a> = Node<'a> where Self: 'a;

    fn content_kind(&self) -> DocumentContentKind {
        self.content_kind.get()
    }

    fn children(&self) -> Vec<Node<'_>> {
        self.tree.root().children().map(|n| Node::Tree(n)).collect()
    }
}

#[cfg(test)]
mod test {
    use std::convert::TryFrom;

    use super::{Document,Element};
    use super::super::error::Error;
    use super::super::kind::{DocumentContentKind,NodeKind,NodeOptions};
    use super::super::tree::XmlNode;
    use super::super::writer::Serializer;

    fn xml(text: &str, options: NodeOptions) -> String {
        let doc = Document::parse(text).unwrap();
        Serializer::new(options).document(&doc).unwrap()
    }

    #[test]
    fn node_types_map_onto_node_kinds() {
        let expected = [
            (roxmltree::NodeType::Root, 1),
            (roxmltree::NodeType::Element, 2),
            (roxmltree::NodeType::PI, 5),
            (roxmltree::NodeType::Comment, 6),
            (roxmltree::NodeType::Text, 7),
        ];
        for &(kind, ordinal) in &expected {
            assert_eq!(ordinal, NodeKind::from(kind).ordinal());
        }
    }

    #[test]
    fn attributes_are_written_in_document_order() {
        let out = xml(r#"<e id="1" class="a b"/>"#, NodeOptions::NONE);
        assert_eq!(r#"<?xml version="1.0"?><e id="1" class="a b"/>"#, out);
    }

    #[test]
    fn text_is_escaped() {
        let out = xml("<e>a &lt; b &amp; c</e>", NodeOptions::NONE);
        assert_eq!(r#"<?xml version="1.0"?><e>a &lt; b &amp; c</e>"#, out);
    }

    #[test]
    fn comments_and_processing_instructions_survive() {
        let out = xml("<?style sheet?><!--top--><e><!-- inner --><?go?></e>", NodeOptions::NONE);
        assert_eq!(r#"<?xml version="1.0"?><?style sheet?><!--top--><e><!-- inner --><?go?></e>"#, out);
    }

    #[test]
    fn namespaces_are_declared_once() {
        let out = xml(
            r#"<a xmlns:p="urn:p"><p:b p:x="1"><c xmlns="urn:d"/></p:b></a>"#,
            NodeOptions::NONE
        );
        assert_eq!(
            r#"<?xml version="1.0"?><a xmlns:p="urn:p"><p:b p:x="1"><c xmlns="urn:d"/></p:b></a>"#,
            out
        );
    }

    #[test]
    fn attributes_never_use_the_default_namespace() {
        let out = xml(r#"<a xmlns="urn:u" xmlns:p="urn:u" p:x="1"/>"#, NodeOptions::NONE);
        assert!(out.contains(r#" p:x="1""#), "{}", out);

        let reparsed = roxmltree::Document::parse(&out).unwrap();
        let a = reparsed.root_element();
        assert_eq!(Some("1"), a.attribute(("urn:u", "x")));
    }

    #[test]
    fn fragments_carry_the_namespaces_in_scope() {
        let doc = Document::parse(r#"<a xmlns:p="urn:p"><p:b p:x="1"/></a>"#).unwrap();
        let b = doc.document_element().unwrap().children()[0];

        let out = Serializer::default().element(b).unwrap();
        assert_eq!(r#"<p:b xmlns:p="urn:p" p:x="1"/>"#, out);
        assert!(roxmltree::Document::parse(&out).is_ok());
    }

    #[test]
    fn pretty_print_indents_by_depth() {
        let out = xml("<a><b><c/></b></a>", NodeOptions::PRETTY_PRINT);
        assert_eq!("<?xml version=\"1.0\"?>\n<a>\n  <b>\n    <c/>\n  </b>\n</a>\n", out);
    }

    #[test]
    fn content_kind_is_settable() {
        let doc = Document::parse("<p><br/></p>").unwrap();
        doc.set_content_kind(DocumentContentKind::Html);
        let out = Serializer::default().document(&doc).unwrap();
        assert_eq!("<!DOCTYPE html><p><br></p>", out);
    }

    #[test]
    fn elements_are_checked() {
        let doc = Document::parse("<a>text</a>").unwrap();
        let element = doc.document_element().unwrap();
        let text = element.children()[0];

        assert_eq!(NodeKind::Text, text.kind());
        assert_eq!(Err(Error::NotAnElement(NodeKind::Text)), Element::try_from(text));
        assert_eq!("a", element.name());
    }

    #[test]
    fn unparseable_text_is_reported() {
        let err = Document::parse("<a>").unwrap_err();
        assert!(matches!(err, Error::Parse(..)));
    }
}
