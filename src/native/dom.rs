//! A traditional DOM tree interface for building and navigating XML
//! documents.

use std::{fmt,hash};

use super::raw;
use super::super::kind::DocumentContentKind;

pub use super::raw::DeclarationKind;

/// An XML document
#[derive(Copy,Clone)]
pub struct Document<'d> {
    storage: &'d raw::Storage,
    connections: &'d raw::Connections,
    metadata: &'d raw::Metadata,
}

macro_rules! wrapper(
    ($name:ident, $wrapper:ident, $inner:ty) => (
        fn $name(self, node: *mut $inner) -> $wrapper<'d> {
            $wrapper {
                document: self,
                node: node,
            }
        }
    )
);

impl<'d> Document<'d> {
    wrapper!(wrap_root, Root, raw::Root);
    wrapper!(wrap_element, Element, raw::Element);
    wrapper!(wrap_attribute, Attribute, raw::Attribute);
    wrapper!(wrap_namespace, Namespace, raw::Namespace);
    wrapper!(wrap_text, Text, raw::Text);
    wrapper!(wrap_comment, Comment, raw::Comment);
    wrapper!(wrap_pi, ProcessingInstruction, raw::ProcessingInstruction);
    wrapper!(wrap_document_type, DocumentType, raw::DocumentType);
    wrapper!(wrap_declaration, Declaration, raw::Declaration);

    pub(crate) fn new(storage: &'d raw::Storage,
                      connections: &'d raw::Connections,
                      metadata: &'d raw::Metadata) -> Document<'d>
    {
        Document {
            storage: storage,
            connections: connections,
            metadata: metadata,
        }
    }

    fn wrap_parent_of_child(self, node: raw::ParentOfChild) -> ParentOfChild<'d> {
        match node {
            raw::ParentOfChild::Root(n) => ParentOfChild::Root(self.wrap_root(n)),
            raw::ParentOfChild::Element(n) => ParentOfChild::Element(self.wrap_element(n)),
        }
    }

    fn wrap_child_of_root(self, node: raw::ChildOfRoot) -> ChildOfRoot<'d> {
        match node {
            raw::ChildOfRoot::Element(n) => ChildOfRoot::Element(self.wrap_element(n)),
            raw::ChildOfRoot::Comment(n) => ChildOfRoot::Comment(self.wrap_comment(n)),
            raw::ChildOfRoot::ProcessingInstruction(n) => ChildOfRoot::ProcessingInstruction(self.wrap_pi(n)),
            raw::ChildOfRoot::DocumentType(n) => ChildOfRoot::DocumentType(self.wrap_document_type(n)),
        }
    }

    fn wrap_child_of_element(self, node: raw::ChildOfElement) -> ChildOfElement<'d> {
        match node {
            raw::ChildOfElement::Element(n) => ChildOfElement::Element(self.wrap_element(n)),
            raw::ChildOfElement::Text(n) => ChildOfElement::Text(self.wrap_text(n)),
            raw::ChildOfElement::Comment(n) => ChildOfElement::Comment(self.wrap_comment(n)),
            raw::ChildOfElement::ProcessingInstruction(n) => ChildOfElement::ProcessingInstruction(self.wrap_pi(n)),
        }
    }

    pub fn root(self) -> Root<'d> {
        self.wrap_root(self.connections.root())
    }

    /// The single element at the top level, if there is one.
    pub fn document_element(self) -> Option<Element<'d>> {
        self.root().children().into_iter().filter_map(|c| c.element()).next()
    }

    pub fn document_type(self) -> Option<DocumentType<'d>> {
        self.root().children().into_iter().filter_map(|c| c.document_type()).next()
    }

    /// Element names are stored as written, prefix included.
    pub fn create_element(self, name: &str) -> Element<'d> {
        self.wrap_element(self.storage.create_element(name))
    }

    pub fn create_text(self, text: &str) -> Text<'d> {
        self.wrap_text(self.storage.create_text(text))
    }

    pub fn create_comment(self, text: &str) -> Comment<'d> {
        self.wrap_comment(self.storage.create_comment(text))
    }

    pub fn create_processing_instruction(self, target: &str, value: Option<&str>) -> ProcessingInstruction<'d> {
        self.wrap_pi(self.storage.create_processing_instruction(target, value))
    }

    pub fn create_document_type(self, name: &str, public_id: Option<&str>, system_id: Option<&str>)
                                -> DocumentType<'d>
    {
        self.wrap_document_type(self.storage.create_document_type(name, public_id, system_id))
    }

    /// `content` is everything after the declared name, written verbatim.
    pub fn create_declaration(self, kind: DeclarationKind, name: &str, content: &str) -> Declaration<'d> {
        self.wrap_declaration(self.storage.create_declaration(kind, name, content))
    }

    pub fn content_kind(self) -> DocumentContentKind {
        self.metadata.content_kind.get()
    }

    pub fn set_content_kind(self, kind: DocumentContentKind) {
        self.metadata.content_kind.set(kind);
    }

    /// Defaults to `1.0`.
    pub fn version(self) -> &'d str {
        self.metadata.version.get().map_or("1.0", |v| v.as_slice())
    }

    pub fn set_version(self, version: &str) {
        self.metadata.version.set(self.storage.intern_optional(Some(version)));
    }

    pub fn character_encoding(self) -> Option<&'d str> {
        self.metadata.character_encoding.get().map(|v| v.as_slice())
    }

    pub fn set_character_encoding(self, encoding: Option<&str>) {
        self.metadata.character_encoding.set(self.storage.intern_optional(encoding));
    }

    pub fn standalone(self) -> Option<bool> {
        self.metadata.standalone.get()
    }

    pub fn set_standalone(self, standalone: Option<bool>) {
        self.metadata.standalone.set(standalone);
    }
}

impl<'d> PartialEq for Document<'d> {
    fn eq(&self, other: &Document<'d>) -> bool {
        (self.storage as *const raw::Storage, self.connections as *const raw::Connections)
            == (other.storage as *const raw::Storage, other.connections as *const raw::Connections)
    }
}

impl<'d> fmt::Debug for Document<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Document {{ {:?} }}", self.connections as *const raw::Connections)
    }
}

macro_rules! node(
    ($name:ident, $raw:ty, $doc:expr) => (
        #[doc = $doc]
        #[derive(Copy,Clone)]
        pub struct $name<'d> {
            document: Document<'d>,
            node: *mut $raw,
        }

        impl<'d> $name<'d> {
            #[allow(dead_code)]
            fn node(&self) -> &'d $raw { unsafe { &*self.node } }

            pub fn document(&self) -> Document<'d> { self.document }
        }

        impl<'d> PartialEq for $name<'d> {
            fn eq(&self, other: &$name<'d>) -> bool {
                self.node == other.node
            }
        }

        impl<'d> Eq for $name<'d> {}

        impl<'d> hash::Hash for $name<'d> {
            fn hash<H>(&self, state: &mut H)
                where H: hash::Hasher
            {
                self.node.hash(state)
            }
        }
    )
);

node!(
    Root, raw::Root,
    "The logical ancestor of every other node type"
);

impl<'d> Root<'d> {
    /// Appending an element or document type declaration replaces the
    /// one already present.
    pub fn append_child<C>(&self, child: C)
        where C: Into<ChildOfRoot<'d>>
    {
        let child = child.into();
        self.document.connections.append_root_child(child.as_raw());
    }

    pub fn append_children<I>(&self, children: I)
        where I: IntoIterator,
              I::Item: Into<ChildOfRoot<'d>>,
    {
        for c in children {
            self.append_child(c.into());
        }
    }

    pub fn remove_child<C>(&self, child: C)
        where C: Into<ChildOfRoot<'d>>,
    {
        let child = child.into();
        self.document.connections.remove_root_child(child.as_raw())
    }

    pub fn clear_children(&self) {
        self.document.connections.clear_root_children();
    }

    pub fn children(&self) -> Vec<ChildOfRoot<'d>> {
        // This is safe because we copy of the children, and the
        // children are never deallocated.
        unsafe {
            self.document.connections.root_children().iter().map(|n| {
                self.document.wrap_child_of_root(*n)
            }).collect()
        }
    }
}

impl<'d> fmt::Debug for Root<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Root")
    }
}

node!(
    Element, raw::Element,
    "Elements are the workhorse of a document and may contain any type of
    node, except for the Root node"
);

impl<'d> Element<'d> {
    pub fn name(&self) -> &'d str { self.node().name() }

    pub fn set_name(&self, name: &str) {
        self.document.storage.element_set_name(self.node, name)
    }

    pub fn prefix(&self) -> Option<&'d str> {
        self.name().split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn local_name(&self) -> &'d str {
        self.name().split_once(':').map_or(self.name(), |(_, local)| local)
    }

    /// Declares `prefix` (or the default namespace, for `None`) on this
    /// element. Any existing declaration of the prefix is replaced.
    pub fn declare_namespace(&self, prefix: Option<&str>, uri: &str) -> Namespace<'d> {
        let ns = self.document.storage.element_declare_namespace(self.node, prefix, uri);
        self.document.wrap_namespace(ns)
    }

    /// The namespaces declared on this element, in declaration order.
    pub fn namespaces(&self) -> Vec<Namespace<'d>> {
        // This is safe because we make a copy of the namespaces, and
        // they are never deallocated.
        unsafe {
            self.document.connections.namespaces(self.node).iter().map(|n| {
                self.document.wrap_namespace(*n)
            }).collect()
        }
    }

    /// Recursively resolve the prefix to a namespace URI.
    pub fn namespace_uri_for_prefix(&self, prefix: Option<&str>) -> Option<&'d str> {
        self.document.connections.element_namespace_uri_for_prefix(self.node, prefix).map(|n| {
            let n_r = unsafe { &*n };
            n_r.uri()
        })
    }

    /// The namespace the element's own prefix resolves to.
    pub fn namespace_uri(&self) -> Option<&'d str> {
        self.namespace_uri_for_prefix(self.prefix())
    }

    pub fn parent(&self) -> Option<ParentOfChild<'d>> {
        self.document.connections.element_parent(self.node).map(|n| {
            self.document.wrap_parent_of_child(n)
        })
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_element_from_parent(self.node);
    }

    /// Appending an ancestor of this element is ignored.
    pub fn append_child<C>(&self, child: C)
        where C: Into<ChildOfElement<'d>>
    {
        let child = child.into();
        self.document.connections.append_element_child(self.node, child.as_raw());
    }

    pub fn append_children<I>(&self, children: I)
        where I: IntoIterator,
              I::Item: Into<ChildOfElement<'d>>,
    {
        for c in children {
            self.append_child(c.into());
        }
    }

    pub fn replace_children<I>(&self, children: I)
        where I: IntoIterator,
              I::Item: Into<ChildOfElement<'d>>,
    {
        self.clear_children();
        self.append_children(children);
    }

    pub fn remove_child<C>(&self, child: C)
        where C: Into<ChildOfElement<'d>>,
    {
        let child = child.into();
        self.document.connections.remove_element_child(self.node, child.as_raw());
    }

    pub fn clear_children(&self) {
        self.document.connections.clear_element_children(self.node);
    }

    pub fn children(&self) -> Vec<ChildOfElement<'d>> {
        // This is safe because we make a copy of the children, and
        // the children are never deallocated.
        unsafe {
            self.document.connections.element_children(self.node).iter().map(|n| {
                self.document.wrap_child_of_element(*n)
            }).collect()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<Attribute<'d>> {
        self.document.connections.attribute(self.node, name).map(|n| {
            self.document.wrap_attribute(n)
        })
    }

    /// Attributes in the order they were first set.
    pub fn attributes(&self) -> Vec<Attribute<'d>> {
        // This is safe because we make a copy of the attributes, and
        // they are never deallocated.
        unsafe {
            self.document.connections.attributes(self.node).iter().map(|n| {
                self.document.wrap_attribute(*n)
            }).collect()
        }
    }

    pub fn set_attribute_value(&self, name: &str, value: &str) -> Attribute<'d> {
        let attr = self.document.storage.element_set_attribute(self.node, name, value);
        self.document.wrap_attribute(attr)
    }

    pub fn attribute_value(&self, name: &str) -> Option<&'d str> {
        self.attribute(name).map(|a| a.value())
    }

    pub fn remove_attribute(&self, name: &str) {
        self.document.connections.remove_attribute(self.node, name);
    }

    pub fn set_text(&self, text: &str) -> Text<'d> {
        let text = self.document.create_text(text);
        self.clear_children();
        self.append_child(text);
        text
    }
}

impl<'d> fmt::Debug for Element<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Element {{ name: {:?} }}", self.name())
    }
}

node!(
    Attribute, raw::Attribute,
    "Metadata about the current element"
);

impl<'d> Attribute<'d> {
    pub fn name(&self)  -> &'d str { self.node().name() }
    pub fn value(&self) -> &'d str { self.node().value() }

    pub fn parent(&self) -> Option<Element<'d>> {
        self.document.connections.attribute_parent(self.node).map(|n| {
            self.document.wrap_element(n)
        })
    }
}

impl<'d> fmt::Debug for Attribute<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Attribute {{ name: {:?}, value: {:?} }}", self.name(), self.value())
    }
}

node!(
    Namespace, raw::Namespace,
    "A mapping from a prefix to a URI, declared on an element"
);

impl<'d> Namespace<'d> {
    /// `None` for the default namespace.
    pub fn prefix(&self) -> Option<&'d str> { self.node().prefix() }
    pub fn uri(&self) -> &'d str { self.node().uri() }

    pub fn parent(&self) -> Option<Element<'d>> {
        self.document.connections.namespace_parent(self.node).map(|n| {
            self.document.wrap_element(n)
        })
    }
}

impl<'d> fmt::Debug for Namespace<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Namespace {{ prefix: {:?}, uri: {:?} }}", self.prefix(), self.uri())
    }
}

node!(
    Text, raw::Text,
    "Textual data"
);

impl<'d> Text<'d> {
    pub fn text(&self) -> &'d str { self.node().text() }

    pub fn set_text(&self, text: &str) {
        self.document.storage.text_set_text(self.node, text)
    }

    pub fn parent(&self) -> Option<Element<'d>> {
        self.document.connections.text_parent(self.node).map(|n| {
            self.document.wrap_element(n)
        })
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_text_from_parent(self.node);
    }
}

impl<'d> fmt::Debug for Text<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Text {{ text: {:?} }}", self.text())
    }
}

node!(
    Comment, raw::Comment,
    "Information only relevant to humans"
);

impl<'d> Comment<'d> {
    pub fn text(&self) -> &'d str { self.node().text() }

    pub fn set_text(&self, new_text: &str) {
        self.document.storage.comment_set_text(self.node, new_text)
    }

    pub fn parent(&self) -> Option<ParentOfChild<'d>> {
        self.document.connections.comment_parent(self.node).map(|n| {
            self.document.wrap_parent_of_child(n)
        })
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_comment_from_parent(self.node);
    }
}

impl<'d> fmt::Debug for Comment<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Comment {{ text: {:?} }}", self.text())
    }
}

node!(
    ProcessingInstruction, raw::ProcessingInstruction,
    "Metadata relevant to the application, but not the XML processor or humans"
);

impl<'d> ProcessingInstruction<'d> {
    pub fn target(&self) -> &'d str { self.node().target() }
    pub fn value(&self) -> Option<&'d str> { self.node().value() }

    pub fn set_value(&self, new_value: Option<&str>) {
        self.document.storage.processing_instruction_set_value(self.node, new_value);
    }

    pub fn parent(&self) -> Option<ParentOfChild<'d>> {
        self.document.connections.processing_instruction_parent(self.node).map(|n| {
            self.document.wrap_parent_of_child(n)
        })
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_processing_instruction_from_parent(self.node);
    }
}

impl<'d> fmt::Debug for ProcessingInstruction<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ProcessingInstruction {{ target: {:?}, value: {:?} }}", self.target(), self.value())
    }
}

node!(
    DocumentType, raw::DocumentType,
    "The document type declaration, holding the internal subset"
);

impl<'d> DocumentType<'d> {
    pub fn name(&self) -> &'d str { self.node().name() }
    pub fn public_id(&self) -> Option<&'d str> { self.node().public_id() }
    pub fn system_id(&self) -> Option<&'d str> { self.node().system_id() }

    pub fn append_declaration(&self, declaration: Declaration<'d>) {
        self.document.connections.append_declaration(self.node, declaration.node);
    }

    pub fn declarations(&self) -> Vec<Declaration<'d>> {
        // This is safe because we make a copy of the declarations, and
        // they are never deallocated.
        unsafe {
            self.document.connections.declarations(self.node).iter().map(|n| {
                self.document.wrap_declaration(*n)
            }).collect()
        }
    }

    pub fn parent(&self) -> Option<Root<'d>> {
        self.document.connections.document_type_parent(self.node).map(|n| {
            self.document.wrap_root(n)
        })
    }

    pub fn remove_from_parent(&self) {
        self.document.connections.remove_document_type_from_parent(self.node);
    }
}

impl<'d> fmt::Debug for DocumentType<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DocumentType {{ name: {:?} }}", self.name())
    }
}

node!(
    Declaration, raw::Declaration,
    "An entity, attribute list, element or notation declaration"
);

impl<'d> Declaration<'d> {
    pub fn kind(&self) -> DeclarationKind { self.node().kind() }
    pub fn name(&self) -> &'d str { self.node().name() }
    pub fn content(&self) -> &'d str { self.node().content() }

    pub fn parent(&self) -> Option<DocumentType<'d>> {
        self.document.connections.declaration_parent(self.node).map(|n| {
            self.document.wrap_document_type(n)
        })
    }
}

impl<'d> fmt::Debug for Declaration<'d> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Declaration {{ kind: {:?}, name: {:?} }}", self.kind(), self.name())
    }
}

macro_rules! unpack(
    ($enum_name:ident, $name:ident, $wrapper:ident, $inner:ident) => (
        pub fn $name(self) -> Option<$inner<'d>> {
            match self {
                $enum_name::$wrapper(n) => Some(n),
                _ => None,
            }
        }
    )
);

/// Nodes that may occur as a child of the root node
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum ChildOfRoot<'d> {
    Element(Element<'d>),
    Comment(Comment<'d>),
    ProcessingInstruction(ProcessingInstruction<'d>),
    DocumentType(DocumentType<'d>),
}

impl<'d> ChildOfRoot<'d> {
    unpack!(ChildOfRoot, element, Element, Element);
    unpack!(ChildOfRoot, comment, Comment, Comment);
    unpack!(ChildOfRoot, processing_instruction, ProcessingInstruction, ProcessingInstruction);
    unpack!(ChildOfRoot, document_type, DocumentType, DocumentType);

    fn as_raw(&self) -> raw::ChildOfRoot {
        match *self {
            ChildOfRoot::Element(n) => raw::ChildOfRoot::Element(n.node),
            ChildOfRoot::Comment(n) => raw::ChildOfRoot::Comment(n.node),
            ChildOfRoot::ProcessingInstruction(n) => raw::ChildOfRoot::ProcessingInstruction(n.node),
            ChildOfRoot::DocumentType(n) => raw::ChildOfRoot::DocumentType(n.node),
        }
    }
}

/// Nodes that may occur as a child of an element node
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum ChildOfElement<'d> {
    Element(Element<'d>),
    Text(Text<'d>),
    Comment(Comment<'d>),
    ProcessingInstruction(ProcessingInstruction<'d>),
}

impl<'d> ChildOfElement<'d> {
    unpack!(ChildOfElement, element, Element, Element);
    unpack!(ChildOfElement, text, Text, Text);
    unpack!(ChildOfElement, comment, Comment, Comment);
    unpack!(ChildOfElement, processing_instruction, ProcessingInstruction, ProcessingInstruction);

    fn as_raw(&self) -> raw::ChildOfElement {
        match *self {
            ChildOfElement::Element(n) => raw::ChildOfElement::Element(n.node),
            ChildOfElement::Text(n) => raw::ChildOfElement::Text(n.node),
            ChildOfElement::Comment(n) => raw::ChildOfElement::Comment(n.node),
            ChildOfElement::ProcessingInstruction(n) => raw::ChildOfElement::ProcessingInstruction(n.node),
        }
    }
}

/// Nodes that may occur as the parent of a child node
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum ParentOfChild<'d> {
    Root(Root<'d>),
    Element(Element<'d>),
}

impl<'d> ParentOfChild<'d> {
    unpack!(ParentOfChild, root, Root, Root);
    unpack!(ParentOfChild, element, Element, Element);
}

macro_rules! conversion_trait(
    ($res_type:ident, {
        $($leaf_type:ident => $variant:expr),*
    }) => (
        $(impl<'d> From<$leaf_type<'d>> for $res_type<'d> {
            fn from(v: $leaf_type<'d>) -> $res_type<'d> {
                $variant(v)
            }
        })*

        $(impl<'a, 'd> From<&'a $leaf_type<'d>> for $res_type<'d> {
            fn from(v: &'a $leaf_type<'d>) -> $res_type<'d> {
                $variant(*v)
            }
        })*
    )
);

conversion_trait!(
    ChildOfRoot, {
        Element               => ChildOfRoot::Element,
        Comment               => ChildOfRoot::Comment,
        ProcessingInstruction => ChildOfRoot::ProcessingInstruction,
        DocumentType          => ChildOfRoot::DocumentType
    }
);

conversion_trait!(
    ChildOfElement, {
        Element               => ChildOfElement::Element,
        Text                  => ChildOfElement::Text,
        Comment               => ChildOfElement::Comment,
        ProcessingInstruction => ChildOfElement::ProcessingInstruction
    }
);
