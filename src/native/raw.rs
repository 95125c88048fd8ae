use std::cell::Cell;

use typed_arena::Arena;

use super::string_pool::{StringPool,InternedString};
use super::super::kind::DocumentContentKind;

pub struct Root {
    children: Vec<ChildOfRoot>,
}

pub struct Element {
    name: InternedString,
    children: Vec<ChildOfElement>,
    parent: Option<ParentOfChild>,
    attributes: Vec<*mut Attribute>,
    namespaces: Vec<*mut Namespace>,
}

impl Element {
    pub fn name(&self) -> &str { self.name.as_slice() }
}

pub struct Attribute {
    name: InternedString,
    value: InternedString,
    parent: Option<*mut Element>,
}

impl Attribute {
    pub fn name(&self)  -> &str { self.name.as_slice() }
    pub fn value(&self) -> &str { self.value.as_slice() }
}

pub struct Namespace {
    prefix: Option<InternedString>,
    uri: InternedString,
    parent: Option<*mut Element>,
}

impl Namespace {
    pub fn prefix(&self) -> Option<&str> { self.prefix.as_ref().map(|p| p.as_slice()) }
    pub fn uri(&self) -> &str { self.uri.as_slice() }
}

pub struct Text {
    text: InternedString,
    parent: Option<*mut Element>,
}

impl Text {
    pub fn text(&self) -> &str { self.text.as_slice() }
}

pub struct Comment {
    text: InternedString,
    parent: Option<ParentOfChild>,
}

impl Comment {
    pub fn text(&self) -> &str { self.text.as_slice() }
}

pub struct ProcessingInstruction {
    target: InternedString,
    value: Option<InternedString>,
    parent: Option<ParentOfChild>,
}

impl ProcessingInstruction {
    pub fn target(&self) -> &str { self.target.as_slice() }
    pub fn value(&self) -> Option<&str> { self.value.as_ref().map(|v| v.as_slice()) }
}

pub struct DocumentType {
    name: InternedString,
    public_id: Option<InternedString>,
    system_id: Option<InternedString>,
    declarations: Vec<*mut Declaration>,
    parent: Option<*mut Root>,
}

impl DocumentType {
    pub fn name(&self) -> &str { self.name.as_slice() }
    pub fn public_id(&self) -> Option<&str> { self.public_id.as_ref().map(|v| v.as_slice()) }
    pub fn system_id(&self) -> Option<&str> { self.system_id.as_ref().map(|v| v.as_slice()) }
}

/// The four kinds of markup declaration an internal subset may hold.
#[derive(Debug,Copy,Clone,PartialEq,Eq,Hash)]
pub enum DeclarationKind {
    Entity,
    AttributeList,
    Element,
    Notation,
}

pub struct Declaration {
    kind: DeclarationKind,
    name: InternedString,
    content: InternedString,
    parent: Option<*mut DocumentType>,
}

impl Declaration {
    pub fn kind(&self) -> DeclarationKind { self.kind }
    pub fn name(&self) -> &str { self.name.as_slice() }
    pub fn content(&self) -> &str { self.content.as_slice() }
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub enum ChildOfRoot {
    Element(*mut Element),
    Comment(*mut Comment),
    ProcessingInstruction(*mut ProcessingInstruction),
    DocumentType(*mut DocumentType),
}

impl ChildOfRoot {
    fn is_element(&self) -> bool {
        matches!(*self, ChildOfRoot::Element(_))
    }

    fn is_document_type(&self) -> bool {
        matches!(*self, ChildOfRoot::DocumentType(_))
    }
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub enum ChildOfElement {
    Element(*mut Element),
    Text(*mut Text),
    Comment(*mut Comment),
    ProcessingInstruction(*mut ProcessingInstruction),
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub enum ParentOfChild {
    Root(*mut Root),
    Element(*mut Element),
}

/// Nodes whose parent may be either the root or an element.
#[derive(Copy,Clone,PartialEq)]
enum Movable {
    Element(*mut Element),
    Comment(*mut Comment),
    ProcessingInstruction(*mut ProcessingInstruction),
}

impl Movable {
    fn take_parent(&self) -> Option<ParentOfChild> {
        unsafe {
            match *self {
                Movable::Element(n) => (*n).parent.take(),
                Movable::Comment(n) => (*n).parent.take(),
                Movable::ProcessingInstruction(n) => (*n).parent.take(),
            }
        }
    }

    fn as_child_of_root(&self) -> ChildOfRoot {
        match *self {
            Movable::Element(n) => ChildOfRoot::Element(n),
            Movable::Comment(n) => ChildOfRoot::Comment(n),
            Movable::ProcessingInstruction(n) => ChildOfRoot::ProcessingInstruction(n),
        }
    }

    fn as_child_of_element(&self) -> ChildOfElement {
        match *self {
            Movable::Element(n) => ChildOfElement::Element(n),
            Movable::Comment(n) => ChildOfElement::Comment(n),
            Movable::ProcessingInstruction(n) => ChildOfElement::ProcessingInstruction(n),
        }
    }

    /// Detaches the node from wherever it currently lives.
    fn detach(&self) {
        match self.take_parent() {
            Some(ParentOfChild::Root(r)) => {
                let r_r = unsafe { &mut *r };
                let me = self.as_child_of_root();
                r_r.children.retain(|c| *c != me);
            },
            Some(ParentOfChild::Element(e)) => {
                let e_r = unsafe { &mut *e };
                let me = self.as_child_of_element();
                e_r.children.retain(|c| *c != me);
            },
            None => {},
        }
    }
}

fn detach_text(text: *mut Text) {
    let text_r = unsafe { &mut *text };
    if let Some(parent) = text_r.parent.take() {
        let parent_r = unsafe { &mut *parent };
        parent_r.children.retain(|c| *c != ChildOfElement::Text(text));
    }
}

fn detach_document_type(doctype: *mut DocumentType) {
    let doctype_r = unsafe { &mut *doctype };
    if let Some(parent) = doctype_r.parent.take() {
        let parent_r = unsafe { &mut *parent };
        parent_r.children.retain(|c| *c != ChildOfRoot::DocumentType(doctype));
    }
}

impl ChildOfRoot {
    fn detach(&self) {
        match *self {
            ChildOfRoot::Element(n) => Movable::Element(n).detach(),
            ChildOfRoot::Comment(n) => Movable::Comment(n).detach(),
            ChildOfRoot::ProcessingInstruction(n) => Movable::ProcessingInstruction(n).detach(),
            ChildOfRoot::DocumentType(n) => detach_document_type(n),
        }
    }

    fn set_parent(&self, root: *mut Root) {
        unsafe {
            match *self {
                ChildOfRoot::Element(n) => (*n).parent = Some(ParentOfChild::Root(root)),
                ChildOfRoot::Comment(n) => (*n).parent = Some(ParentOfChild::Root(root)),
                ChildOfRoot::ProcessingInstruction(n) => (*n).parent = Some(ParentOfChild::Root(root)),
                ChildOfRoot::DocumentType(n) => (*n).parent = Some(root),
            }
        }
    }
}

impl ChildOfElement {
    fn detach(&self) {
        match *self {
            ChildOfElement::Element(n) => Movable::Element(n).detach(),
            ChildOfElement::Text(n) => detach_text(n),
            ChildOfElement::Comment(n) => Movable::Comment(n).detach(),
            ChildOfElement::ProcessingInstruction(n) => Movable::ProcessingInstruction(n).detach(),
        }
    }

    fn set_parent(&self, element: *mut Element) {
        unsafe {
            match *self {
                ChildOfElement::Element(n) => (*n).parent = Some(ParentOfChild::Element(element)),
                ChildOfElement::Text(n) => (*n).parent = Some(element),
                ChildOfElement::Comment(n) => (*n).parent = Some(ParentOfChild::Element(element)),
                ChildOfElement::ProcessingInstruction(n) => (*n).parent = Some(ParentOfChild::Element(element)),
            }
        }
    }
}

/// Document-wide settings that are not nodes.
pub struct Metadata {
    pub content_kind: Cell<DocumentContentKind>,
    pub version: Cell<Option<InternedString>>,
    pub character_encoding: Cell<Option<InternedString>>,
    pub standalone: Cell<Option<bool>>,
}

pub struct Storage {
    strings: StringPool,
    roots: Arena<Root>,
    elements: Arena<Element>,
    attributes: Arena<Attribute>,
    namespaces: Arena<Namespace>,
    texts: Arena<Text>,
    comments: Arena<Comment>,
    processing_instructions: Arena<ProcessingInstruction>,
    document_types: Arena<DocumentType>,
    declarations: Arena<Declaration>,
}

impl Storage {
    pub fn new() -> Storage {
        Storage {
            strings: StringPool::new(),
            roots: Arena::new(),
            elements: Arena::new(),
            attributes: Arena::new(),
            namespaces: Arena::new(),
            texts: Arena::new(),
            comments: Arena::new(),
            processing_instructions: Arena::new(),
            document_types: Arena::new(),
            declarations: Arena::new(),
        }
    }

    fn intern(&self, s: &str) -> InternedString {
        let interned = self.strings.intern(s);
        InternedString::from_str(interned)
    }

    pub fn create_root(&self) -> *mut Root {
        self.roots.alloc(Root {
            children: Vec::new(),
        })
    }

    pub fn create_element(&self, name: &str) -> *mut Element {
        let name = self.intern(name);

        self.elements.alloc(Element {
            name: name,
            children: Vec::new(),
            parent: None,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        })
    }

    pub fn create_attribute(&self, name: &str, value: &str) -> *mut Attribute {
        let name = self.intern(name);
        let value = self.intern(value);

        self.attributes.alloc(Attribute {
            name: name,
            value: value,
            parent: None,
        })
    }

    pub fn create_namespace(&self, prefix: Option<&str>, uri: &str) -> *mut Namespace {
        let prefix = prefix.map(|p| self.intern(p));
        let uri = self.intern(uri);

        self.namespaces.alloc(Namespace {
            prefix: prefix,
            uri: uri,
            parent: None,
        })
    }

    pub fn create_text(&self, text: &str) -> *mut Text {
        let text = self.intern(text);

        self.texts.alloc(Text {
            text: text,
            parent: None,
        })
    }

    pub fn create_comment(&self, text: &str) -> *mut Comment {
        let text = self.intern(text);

        self.comments.alloc(Comment {
            text: text,
            parent: None,
        })
    }

    pub fn create_processing_instruction(&self, target: &str, value: Option<&str>)
                                         -> *mut ProcessingInstruction
    {
        let target = self.intern(target);
        let value = value.map(|v| self.intern(v));

        self.processing_instructions.alloc(ProcessingInstruction {
            target: target,
            value: value,
            parent: None,
        })
    }

    pub fn create_document_type(&self, name: &str, public_id: Option<&str>, system_id: Option<&str>)
                                -> *mut DocumentType
    {
        let name = self.intern(name);
        let public_id = public_id.map(|v| self.intern(v));
        let system_id = system_id.map(|v| self.intern(v));

        self.document_types.alloc(DocumentType {
            name: name,
            public_id: public_id,
            system_id: system_id,
            declarations: Vec::new(),
            parent: None,
        })
    }

    pub fn create_declaration(&self, kind: DeclarationKind, name: &str, content: &str)
                              -> *mut Declaration
    {
        let name = self.intern(name);
        let content = self.intern(content);

        self.declarations.alloc(Declaration {
            kind: kind,
            name: name,
            content: content,
            parent: None,
        })
    }

    pub fn create_metadata(&self) -> Metadata {
        Metadata {
            content_kind: Cell::new(DocumentContentKind::Xml),
            version: Cell::new(None),
            character_encoding: Cell::new(None),
            standalone: Cell::new(None),
        }
    }

    pub fn intern_optional(&self, s: Option<&str>) -> Option<InternedString> {
        s.map(|s| self.intern(s))
    }

    pub fn element_set_name(&self, element: *mut Element, name: &str) {
        let name = self.intern(name);
        let element_r = unsafe { &mut *element };
        element_r.name = name;
    }

    pub fn text_set_text(&self, text: *mut Text, new_text: &str) {
        let new_text = self.intern(new_text);
        let text_r = unsafe { &mut *text };
        text_r.text = new_text;
    }

    pub fn comment_set_text(&self, comment: *mut Comment, new_text: &str) {
        let new_text = self.intern(new_text);
        let comment_r = unsafe { &mut *comment };
        comment_r.text = new_text;
    }

    pub fn processing_instruction_set_value(&self, pi: *mut ProcessingInstruction, new_value: Option<&str>) {
        let new_value = new_value.map(|v| self.intern(v));
        let pi_r = unsafe { &mut *pi };
        pi_r.value = new_value;
    }

    /// Replaces the value in place when the element already has an
    /// attribute of that name, so attribute order is insertion order.
    pub fn element_set_attribute(&self, element: *mut Element, name: &str, value: &str) -> *mut Attribute {
        let element_r = unsafe { &mut *element };

        let existing = element_r.attributes.iter().cloned().find(|&a| {
            let a_r = unsafe { &*a };
            a_r.name() == name
        });

        match existing {
            Some(attr) => {
                let attr_r = unsafe { &mut *attr };
                attr_r.value = self.intern(value);
                attr
            },
            None => {
                let attr = self.create_attribute(name, value);
                unsafe { (*attr).parent = Some(element) };
                element_r.attributes.push(attr);
                attr
            },
        }
    }

    /// A prefix is declared at most once per element; redeclaring it
    /// changes the URI in place.
    pub fn element_declare_namespace(&self, element: *mut Element, prefix: Option<&str>, uri: &str)
                                     -> *mut Namespace
    {
        let element_r = unsafe { &mut *element };

        let existing = element_r.namespaces.iter().cloned().find(|&n| {
            let n_r = unsafe { &*n };
            n_r.prefix() == prefix
        });

        match existing {
            Some(ns) => {
                let ns_r = unsafe { &mut *ns };
                ns_r.uri = self.intern(uri);
                ns
            },
            None => {
                let ns = self.create_namespace(prefix, uri);
                unsafe { (*ns).parent = Some(element) };
                element_r.namespaces.push(ns);
                ns
            },
        }
    }
}

pub struct Connections {
    root: *mut Root,
}

impl Connections {
    pub fn new(root: *mut Root) -> Connections {
        Connections {
            root: root,
        }
    }

    pub fn root(&self) -> *mut Root {
        self.root
    }

    pub fn element_parent(&self, child: *mut Element) -> Option<ParentOfChild> {
        let child_r = unsafe { &*child };
        child_r.parent
    }

    pub fn text_parent(&self, child: *mut Text) -> Option<*mut Element> {
        let child_r = unsafe { &*child };
        child_r.parent
    }

    pub fn comment_parent(&self, child: *mut Comment) -> Option<ParentOfChild> {
        let child_r = unsafe { &*child };
        child_r.parent
    }

    pub fn processing_instruction_parent(&self, child: *mut ProcessingInstruction) -> Option<ParentOfChild> {
        let child_r = unsafe { &*child };
        child_r.parent
    }

    pub fn attribute_parent(&self, attribute: *mut Attribute) -> Option<*mut Element> {
        let attr_r = unsafe { &*attribute };
        attr_r.parent
    }

    pub fn namespace_parent(&self, namespace: *mut Namespace) -> Option<*mut Element> {
        let ns_r = unsafe { &*namespace };
        ns_r.parent
    }

    pub fn document_type_parent(&self, doctype: *mut DocumentType) -> Option<*mut Root> {
        let doctype_r = unsafe { &*doctype };
        doctype_r.parent
    }

    pub fn declaration_parent(&self, declaration: *mut Declaration) -> Option<*mut DocumentType> {
        let declaration_r = unsafe { &*declaration };
        declaration_r.parent
    }

    /// The root holds at most one element and one document type
    /// declaration; appending another replaces the current one.
    pub fn append_root_child(&self, child: ChildOfRoot) {
        child.detach();

        let current = unsafe { self.root_children() }.to_vec();
        let displaced = current.into_iter().filter(|c| {
            (child.is_element() && c.is_element()) ||
                (child.is_document_type() && c.is_document_type())
        });
        for c in displaced {
            c.detach();
        }

        child.set_parent(self.root);
        let root_r = unsafe { &mut *self.root };
        root_r.children.push(child);
    }

    pub fn remove_root_child(&self, child: ChildOfRoot) {
        let root_r = unsafe { &*self.root };
        if root_r.children.contains(&child) {
            child.detach();
        }
    }

    pub fn clear_root_children(&self) {
        let root_r = unsafe { &*self.root };
        for c in root_r.children.clone() {
            c.detach();
        }
    }

    pub fn append_element_child(&self, parent: *mut Element, child: ChildOfElement) {
        if let ChildOfElement::Element(e) = child {
            if e == parent || self.is_ancestor(e, parent) {
                // Appending an element to its own subtree would make a cycle.
                return;
            }
        }

        child.detach();
        child.set_parent(parent);

        let parent_r = unsafe { &mut *parent };
        parent_r.children.push(child);
    }

    fn is_ancestor(&self, candidate: *mut Element, element: *mut Element) -> bool {
        let mut current = self.element_parent(element);
        while let Some(ParentOfChild::Element(e)) = current {
            if e == candidate {
                return true;
            }
            current = self.element_parent(e);
        }
        false
    }

    pub fn remove_element_child(&self, parent: *mut Element, child: ChildOfElement) {
        let parent_r = unsafe { &*parent };
        if parent_r.children.contains(&child) {
            child.detach();
        }
    }

    pub fn clear_element_children(&self, parent: *mut Element) {
        let parent_r = unsafe { &*parent };
        for c in parent_r.children.clone() {
            c.detach();
        }
    }

    pub fn remove_element_from_parent(&self, child: *mut Element) {
        Movable::Element(child).detach();
    }

    pub fn remove_text_from_parent(&self, child: *mut Text) {
        detach_text(child);
    }

    pub fn remove_comment_from_parent(&self, child: *mut Comment) {
        Movable::Comment(child).detach();
    }

    pub fn remove_processing_instruction_from_parent(&self, child: *mut ProcessingInstruction) {
        Movable::ProcessingInstruction(child).detach();
    }

    pub fn remove_document_type_from_parent(&self, child: *mut DocumentType) {
        detach_document_type(child);
    }

    /// # Safety
    ///
    /// The returned slice must not be held across a mutation of the root.
    pub unsafe fn root_children(&self) -> &[ChildOfRoot] {
        let root_r = &*self.root;
        &root_r.children
    }

    /// # Safety
    ///
    /// The returned slice must not be held across a mutation of `parent`.
    pub unsafe fn element_children(&self, parent: *mut Element) -> &[ChildOfElement] {
        let parent_r = &*parent;
        &parent_r.children
    }

    /// # Safety
    ///
    /// The returned slice must not be held across a mutation of `parent`.
    pub unsafe fn attributes(&self, parent: *mut Element) -> &[*mut Attribute] {
        let parent_r = &*parent;
        &parent_r.attributes
    }

    /// # Safety
    ///
    /// The returned slice must not be held across a mutation of `parent`.
    pub unsafe fn namespaces(&self, parent: *mut Element) -> &[*mut Namespace] {
        let parent_r = &*parent;
        &parent_r.namespaces
    }

    /// # Safety
    ///
    /// The returned slice must not be held across a mutation of `doctype`.
    pub unsafe fn declarations(&self, doctype: *mut DocumentType) -> &[*mut Declaration] {
        let doctype_r = &*doctype;
        &doctype_r.declarations
    }

    pub fn attribute(&self, element: *mut Element, name: &str) -> Option<*mut Attribute> {
        let element_r = unsafe { &*element };
        element_r.attributes.iter().cloned().find(|&a| {
            let a_r = unsafe { &*a };
            a_r.name() == name
        })
    }

    pub fn remove_attribute(&self, element: *mut Element, name: &str) {
        let element_r = unsafe { &mut *element };
        element_r.attributes.retain(|&a| {
            let a_r = unsafe { &mut *a };
            if a_r.name() == name {
                a_r.parent = None;
                false
            } else {
                true
            }
        });
    }

    /// Walks up from `element` looking for a declaration of `prefix`.
    /// `None` looks for the default namespace.
    pub fn element_namespace_uri_for_prefix(&self, element: *mut Element, prefix: Option<&str>)
                                            -> Option<*mut Namespace>
    {
        let mut current = Some(element);

        while let Some(e) = current {
            let e_r = unsafe { &*e };
            let found = e_r.namespaces.iter().cloned().find(|&n| {
                let n_r = unsafe { &*n };
                n_r.prefix() == prefix
            });
            if found.is_some() {
                return found;
            }

            current = match e_r.parent {
                Some(ParentOfChild::Element(p)) => Some(p),
                _ => None,
            };
        }

        None
    }

    pub fn append_declaration(&self, doctype: *mut DocumentType, declaration: *mut Declaration) {
        let declaration_r = unsafe { &mut *declaration };
        if let Some(prev) = declaration_r.parent.take() {
            let prev_r = unsafe { &mut *prev };
            prev_r.declarations.retain(|&d| d != declaration);
        }

        declaration_r.parent = Some(doctype);
        let doctype_r = unsafe { &mut *doctype };
        doctype_r.declarations.push(declaration);
    }
}
