//! Formats a tree as text.
//!
//! ### Example
//!
//! ```
//! use sxd_serialize::{Package, NodeOptions};
//! use sxd_serialize::writer::Serializer;
//!
//! let package = Package::new();
//! let doc = package.as_document();
//!
//! let hello = doc.create_element("hello");
//! hello.set_attribute_value("planet", "Earth");
//! doc.root().append_child(hello);
//!
//! let xml = Serializer::new(NodeOptions::NONE).document(&doc).unwrap();
//! assert_eq!(xml, r#"<?xml version="1.0"?><hello planet="Earth"/>"#);
//! ```

use log::{debug,trace};

use super::error::{Error,Result};
use super::escape;
use super::kind::{DocumentContentKind,EmptyElement,NodeKind,NodeOptions};
use super::tree::{self,Prolog,XmlDocument,XmlNode};

/// Serialization settings. The same serializer may be used for any
/// number of documents and elements.
#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Serializer {
    options: NodeOptions,
    indent: String,
    content_kind: DocumentContentKind,
}

impl Default for Serializer {
    fn default() -> Serializer {
        Serializer::new(NodeOptions::NONE)
    }
}

impl Serializer {
    pub fn new(options: NodeOptions) -> Serializer {
        Serializer {
            options: options,
            indent: "  ".to_string(),
            content_kind: DocumentContentKind::Xml,
        }
    }

    /// The string written once per nesting level when pretty printing.
    pub fn with_indent(mut self, indent: &str) -> Serializer {
        self.indent = indent.to_string();
        self
    }

    /// The dialect used for elements serialized on their own. Documents
    /// always use their own content kind.
    pub fn with_content_kind(mut self, content_kind: DocumentContentKind) -> Serializer {
        self.content_kind = content_kind;
        self
    }

    pub fn options(&self) -> NodeOptions { self.options }

    /// Formats a whole document, prolog included.
    pub fn document<D>(&self, document: &D) -> Result<String>
        where D: XmlDocument
    {
        let kind = document.content_kind();
        debug!("serializing {} document with {:?}", kind, self.options);

        let result = self.format_document(document, kind);
        if let Err(ref e) = result {
            debug!("document serialization failed: {}", e);
        }
        result
    }

    /// Formats an element and everything below it, without a prolog.
    pub fn element<N>(&self, element: N) -> Result<String>
        where N: XmlNode
    {
        debug!("serializing {} element with {:?}", self.content_kind, self.options);

        let result = self.format_element(element);
        if let Err(ref e) = result {
            debug!("element serialization failed: {}", e);
        }
        result
    }

    fn format_document<D>(&self, document: &D, kind: DocumentContentKind) -> Result<String>
        where D: XmlDocument
    {
        let children = document.children();

        match children.iter().filter(|c| c.kind() == NodeKind::Element).count() {
            0 => return Err(Error::MissingDocumentElement),
            1 => {},
            n => return Err(Error::MultipleDocumentElements(n)),
        }

        let mut w = Writer::new(self, kind);

        if kind == DocumentContentKind::Text {
            for child in children {
                tree::string_value(child, &mut w.out);
            }
            return Ok(w.out);
        }

        let has_doctype = children.iter().any(|c| c.kind() == NodeKind::Dtd);
        w.prolog(&document.prolog(), has_doctype)?;

        for child in children {
            match child.kind() {
                NodeKind::Element => w.element(child, 0)?,
                NodeKind::Comment => w.comment(child)?,
                NodeKind::ProcessingInstruction => w.processing_instruction(child)?,
                NodeKind::Dtd => w.document_type(child)?,
                NodeKind::Text if is_whitespace(child) => continue,
                kind => return Err(Error::UnexpectedNode {
                    kind: kind,
                    context: "at the top level of a document",
                }),
            }
            w.end_line();
        }

        Ok(w.out)
    }

    fn format_element<N>(&self, element: N) -> Result<String>
        where N: XmlNode
    {
        match element.kind() {
            NodeKind::Element => {},
            kind => return Err(Error::NotAnElement(kind)),
        }

        let mut w = Writer::new(self, self.content_kind);

        if self.content_kind == DocumentContentKind::Text {
            tree::string_value(element, &mut w.out);
            return Ok(w.out);
        }

        w.element(element, 0)?;
        w.end_line();
        Ok(w.out)
    }
}

/// Only the four characters of the XML `S` production count.
fn is_whitespace<N: XmlNode>(node: N) -> bool {
    node.kind() == NodeKind::Text &&
        node.value().map_or(true, |v| v.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r')))
}

/// Elements whose content is only other markup may be reindented.
fn is_element_only<N: XmlNode>(children: &[N]) -> bool {
    children.iter().all(|&c| c.kind() != NodeKind::Text || is_whitespace(c)) &&
        children.iter().any(|&c| c.kind() != NodeKind::Text)
}

fn is_void_element(name: &str) -> bool {
    const VOID: &[&str] = &[
        "area", "base", "br", "col", "embed", "hr", "img", "input",
        "link", "meta", "param", "source", "track", "wbr",
    ];
    VOID.iter().any(|v| v.eq_ignore_ascii_case(name))
}

fn is_raw_text_element(name: &str) -> bool {
    name.eq_ignore_ascii_case("script") || name.eq_ignore_ascii_case("style")
}

fn declaration_keyword(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::EntityDeclaration => Some("ENTITY"),
        NodeKind::AttributeDeclaration => Some("ATTLIST"),
        NodeKind::ElementDeclaration => Some("ELEMENT"),
        NodeKind::NotationDeclaration => Some("NOTATION"),
        _ => None,
    }
}

struct Writer<'s> {
    out: String,
    options: NodeOptions,
    indent: &'s str,
    kind: DocumentContentKind,
}

impl<'s> Writer<'s> {
    fn new(serializer: &'s Serializer, kind: DocumentContentKind) -> Writer<'s> {
        Writer {
            out: String::new(),
            options: serializer.options,
            indent: &serializer.indent,
            kind: kind,
        }
    }

    fn pretty(&self) -> bool { self.options.is_pretty() }

    fn end_line(&mut self) {
        if self.pretty() {
            self.out.push('\n');
        }
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
    }

    fn prolog(&mut self, prolog: &Prolog, has_doctype: bool) -> Result<()> {
        match self.kind {
            DocumentContentKind::Xml | DocumentContentKind::Xhtml => {
                self.out.push_str("<?xml version=\"");
                escape::attribute(&mut self.out, prolog.version, self.kind)?;
                self.out.push('"');
                if let Some(encoding) = prolog.encoding {
                    self.out.push_str(" encoding=\"");
                    escape::attribute(&mut self.out, encoding, self.kind)?;
                    self.out.push('"');
                }
                if let Some(standalone) = prolog.standalone {
                    self.out.push_str(" standalone=\"");
                    self.out.push_str(if standalone { "yes" } else { "no" });
                    self.out.push('"');
                }
                self.out.push_str("?>");
                self.end_line();
            },
            DocumentContentKind::Html if !has_doctype => {
                self.out.push_str("<!DOCTYPE html>");
                self.end_line();
            },
            _ => {},
        }
        Ok(())
    }

    fn element<N: XmlNode>(&mut self, element: N, depth: usize) -> Result<()> {
        let name = element.name().unwrap_or_default();
        trace!("writing element {}", name);

        self.out.push('<');
        self.out.push_str(&name);

        let mut namespaces = element.namespaces();
        if depth == 0 {
            // A fragment has to stand on its own.
            namespaces.extend(element.inherited_namespaces());
        }
        for namespace in namespaces {
            self.namespace(namespace)?;
        }
        for attribute in element.attributes() {
            self.attribute(attribute)?;
        }

        let children = element.children();
        if children.is_empty() {
            self.close_empty(&name);
            return Ok(());
        }

        self.out.push('>');

        let raw_text = self.kind == DocumentContentKind::Html && is_raw_text_element(&name);

        if self.pretty() && is_element_only(&children) {
            self.out.push('\n');
            for child in children {
                if is_whitespace(child) { continue }
                self.indent(depth + 1);
                self.content(child, depth + 1, raw_text)?;
                self.out.push('\n');
            }
            self.indent(depth);
        } else {
            for child in children {
                self.content(child, depth + 1, raw_text)?;
            }
        }

        self.out.push_str("</");
        self.out.push_str(&name);
        self.out.push('>');
        Ok(())
    }

    fn close_empty(&mut self, name: &str) {
        if self.kind == DocumentContentKind::Html {
            self.out.push('>');
            if !is_void_element(name) {
                self.out.push_str("</");
                self.out.push_str(name);
                self.out.push('>');
            }
            return;
        }

        let form = self.options.empty_element().unwrap_or_else(|| {
            if self.kind == DocumentContentKind::Xhtml && !is_void_element(name) {
                EmptyElement::Expand
            } else {
                EmptyElement::Compact
            }
        });

        match form {
            EmptyElement::Compact => self.out.push_str("/>"),
            EmptyElement::Expand => {
                self.out.push_str("></");
                self.out.push_str(name);
                self.out.push('>');
            },
        }
    }

    fn content<N: XmlNode>(&mut self, node: N, depth: usize, raw_text: bool) -> Result<()> {
        match node.kind() {
            NodeKind::Element => self.element(node, depth),
            NodeKind::Text if raw_text => escape::verbatim(&mut self.out, node.value().unwrap_or("")),
            NodeKind::Text => self.text(node),
            NodeKind::Comment => self.comment(node),
            NodeKind::ProcessingInstruction => self.processing_instruction(node),
            kind => Err(Error::UnexpectedNode { kind: kind, context: "inside an element" }),
        }
    }

    fn namespace<N: XmlNode>(&mut self, namespace: N) -> Result<()> {
        self.out.push_str(" xmlns");
        match namespace.name() {
            Some(ref prefix) if !prefix.is_empty() => {
                self.out.push(':');
                self.out.push_str(prefix);
            },
            _ => {},
        }
        self.out.push_str("=\"");
        escape::attribute(&mut self.out, namespace.value().unwrap_or(""), self.kind)?;
        self.out.push('"');
        Ok(())
    }

    fn attribute<N: XmlNode>(&mut self, attribute: N) -> Result<()> {
        self.out.push(' ');
        self.out.push_str(&attribute.name().unwrap_or_default());
        self.out.push_str("=\"");
        escape::attribute(&mut self.out, attribute.value().unwrap_or(""), self.kind)?;
        self.out.push('"');
        Ok(())
    }

    fn text<N: XmlNode>(&mut self, text: N) -> Result<()> {
        escape::text(&mut self.out, text.value().unwrap_or(""), self.kind)
    }

    fn comment<N: XmlNode>(&mut self, comment: N) -> Result<()> {
        self.out.push_str("<!--");
        escape::verbatim(&mut self.out, comment.value().unwrap_or(""))?;
        self.out.push_str("-->");
        Ok(())
    }

    fn processing_instruction<N: XmlNode>(&mut self, pi: N) -> Result<()> {
        self.out.push_str("<?");
        self.out.push_str(&pi.name().unwrap_or_default());
        match pi.value() {
            Some(value) if !value.is_empty() => {
                self.out.push(' ');
                escape::verbatim(&mut self.out, value)?;
            },
            _ => {},
        }
        if self.kind == DocumentContentKind::Html {
            self.out.push('>');
        } else {
            self.out.push_str("?>");
        }
        Ok(())
    }

    fn document_type<N: XmlNode>(&mut self, doctype: N) -> Result<()> {
        self.out.push_str("<!DOCTYPE ");
        escape::document_type_name(&mut self.out, &doctype.name().unwrap_or_default())?;

        match doctype.external_id() {
            (Some(public_id), system_id) => {
                self.out.push_str(" PUBLIC ");
                escape::public_literal(&mut self.out, public_id)?;
                if let Some(system_id) = system_id {
                    self.out.push(' ');
                    escape::system_literal(&mut self.out, system_id)?;
                }
            },
            (None, Some(system_id)) => {
                self.out.push_str(" SYSTEM ");
                escape::system_literal(&mut self.out, system_id)?;
            },
            (None, None) => {},
        }

        let declarations = doctype.children();
        if !declarations.is_empty() {
            self.out.push_str(" [");
            for declaration in declarations {
                if self.pretty() {
                    self.out.push('\n');
                    self.out.push_str(self.indent);
                }
                self.declaration(declaration)?;
            }
            if self.pretty() {
                self.out.push('\n');
            }
            self.out.push(']');
        }

        self.out.push('>');
        Ok(())
    }

    fn declaration<N: XmlNode>(&mut self, declaration: N) -> Result<()> {
        let keyword = match declaration_keyword(declaration.kind()) {
            Some(keyword) => keyword,
            None => return Err(Error::UnexpectedNode {
                kind: declaration.kind(),
                context: "inside a document type declaration",
            }),
        };

        self.out.push_str("<!");
        self.out.push_str(keyword);
        self.out.push(' ');
        self.out.push_str(&declaration.name().unwrap_or_default());
        if let Some(content) = declaration.value() {
            if !content.is_empty() {
                self.out.push(' ');
                escape::verbatim(&mut self.out, content)?;
            }
        }
        self.out.push('>');
        Ok(())
    }
}
