//! Converts an element tree into nested JSON values, for callers that
//! want to look at a document as plain data rather than markup.
//!
//! An element becomes a one-entry object mapping its name to its body.
//! A body with nothing but text is that text. Otherwise it is an object:
//! attributes and namespace declarations under `@`-prefixed keys, child
//! elements under their names (an array once a name repeats), and the
//! element's own text under `#text`. Comments and processing
//! instructions carry no data and are skipped.

use log::debug;
use serde_json::{Map,Value};

use super::error::{Error,Result};
use super::kind::NodeKind;
use super::tree::{XmlDocument,XmlNode};

const TEXT_KEY: &str = "#text";

pub fn element_to_dictionary<N>(element: N) -> Result<Value>
    where N: XmlNode
{
    match element.kind() {
        NodeKind::Element => {},
        kind => return Err(Error::NotAnElement(kind)),
    }

    let name = element.name().unwrap_or_default().into_owned();
    let mut entry = Map::new();
    entry.insert(name, body(element)?);
    Ok(Value::Object(entry))
}

/// The dictionary of the document element.
pub fn document_to_dictionary<D>(document: &D) -> Result<Value>
    where D: XmlDocument
{
    let mut elements = document.children().into_iter().filter(|c| c.kind() == NodeKind::Element);

    let element = elements.next().ok_or(Error::MissingDocumentElement)?;
    let extra = elements.count();
    if extra > 0 {
        return Err(Error::MultipleDocumentElements(extra + 1));
    }

    debug!("converting {} document to a dictionary", document.content_kind());
    element_to_dictionary(element)
}

/// The body of every element called `name`, the document element
/// included, in document order. Matches nested in other matches are
/// found too.
pub fn document_to_dictionaries<D>(document: &D, name: &str) -> Result<Vec<Value>>
    where D: XmlDocument
{
    let mut found = Vec::new();
    for child in document.children() {
        collect_named(child, name, &mut found)?;
    }
    debug!("found {} {} elements", found.len(), name);
    Ok(found)
}

fn collect_named<N: XmlNode>(node: N, name: &str, found: &mut Vec<Value>) -> Result<()> {
    if node.kind() != NodeKind::Element { return Ok(()) }

    if node.name().as_deref() == Some(name) {
        found.push(body(node)?);
    }
    for child in node.children() {
        collect_named(child, name, found)?;
    }
    Ok(())
}

fn body<N: XmlNode>(element: N) -> Result<Value> {
    let attributes = element.attributes();
    let namespaces = element.namespaces();
    let children = element.children();

    let mut text = String::new();
    let mut has_elements = false;

    for &child in &children {
        match child.kind() {
            NodeKind::Text => text.push_str(child.value().unwrap_or("")),
            NodeKind::Element => has_elements = true,
            NodeKind::Comment | NodeKind::ProcessingInstruction => {},
            kind => return Err(Error::UnexpectedNode { kind: kind, context: "inside an element" }),
        }
    }

    if attributes.is_empty() && namespaces.is_empty() && !has_elements {
        return Ok(Value::String(text));
    }

    let mut map = Map::new();

    for namespace in namespaces {
        let key = match namespace.name() {
            Some(ref prefix) if !prefix.is_empty() => format!("@xmlns:{}", prefix),
            _ => "@xmlns".to_string(),
        };
        map.insert(key, Value::String(namespace.value().unwrap_or("").to_string()));
    }

    for attribute in attributes {
        let key = format!("@{}", attribute.name().unwrap_or_default());
        map.insert(key, Value::String(attribute.value().unwrap_or("").to_string()));
    }

    for child in children {
        if child.kind() != NodeKind::Element { continue }

        let name = child.name().unwrap_or_default().into_owned();
        let value = body(child)?;

        match map.get_mut(&name) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            },
            None => { map.insert(name, value); },
        }
    }

    if !text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r')) {
        map.insert(TEXT_KEY.to_string(), Value::String(text));
    }

    Ok(Value::Object(map))
}

#[cfg(all(test, feature = "native"))]
mod test {
    use serde_json::json;

    use super::{document_to_dictionaries,document_to_dictionary,element_to_dictionary};
    use super::super::error::Error;
    use super::super::kind::NodeKind;
    use super::super::native::{Node,Package};

    #[test]
    fn text_only_elements_become_strings() {
        let package = Package::new();
        let doc = package.as_document();
        let e = doc.create_element("title");
        e.set_text("Dune");

        assert_eq!(json!({"title": "Dune"}), element_to_dictionary(Node::from(e)).unwrap());
    }

    #[test]
    fn empty_elements_become_empty_strings() {
        let package = Package::new();
        let doc = package.as_document();
        let e = doc.create_element("nothing");

        assert_eq!(json!({"nothing": ""}), element_to_dictionary(Node::from(e)).unwrap());
    }

    #[test]
    fn attributes_and_children_become_keys() {
        let package = Package::new();
        let doc = package.as_document();

        let book = doc.create_element("book");
        book.set_attribute_value("id", "7");
        let title = doc.create_element("title");
        title.set_text("Dune");
        book.append_child(title);
        book.append_child(doc.create_comment("skipped"));
        doc.root().append_child(book);

        assert_eq!(
            json!({"book": {"@id": "7", "title": "Dune"}}),
            document_to_dictionary(&doc).unwrap()
        );
    }

    #[test]
    fn repeated_children_become_arrays() {
        let package = Package::new();
        let doc = package.as_document();

        let list = doc.create_element("list");
        for value in &["a", "b", "c"] {
            let item = doc.create_element("item");
            item.set_text(value);
            list.append_child(item);
        }

        assert_eq!(
            json!({"list": {"item": ["a", "b", "c"]}}),
            element_to_dictionary(Node::from(list)).unwrap()
        );
    }

    #[test]
    fn mixed_content_keeps_its_text() {
        let package = Package::new();
        let doc = package.as_document();

        let p = doc.create_element("p");
        p.declare_namespace(Some("x"), "urn:x");
        p.append_child(doc.create_text("one "));
        p.append_child(doc.create_element("br"));
        p.append_child(doc.create_text("two"));

        assert_eq!(
            json!({"p": {"@xmlns:x": "urn:x", "br": "", "#text": "one two"}}),
            element_to_dictionary(Node::from(p)).unwrap()
        );
    }

    #[test]
    fn only_elements_can_be_converted() {
        let package = Package::new();
        let doc = package.as_document();
        let text = doc.create_text("loose");

        assert_eq!(
            Err(Error::NotAnElement(NodeKind::Text)),
            element_to_dictionary(Node::from(text))
        );
    }

    #[test]
    fn documents_need_an_element() {
        let package = Package::new();
        let doc = package.as_document();

        assert_eq!(Err(Error::MissingDocumentElement), document_to_dictionary(&doc));
    }

    #[test]
    fn named_elements_are_collected_in_document_order() {
        let package = Package::new();
        let doc = package.as_document();

        let catalog = doc.create_element("catalog");
        let first = doc.create_element("book");
        first.set_attribute_value("id", "1");
        let part = doc.create_element("book");
        part.set_text("Part one");
        first.append_child(part);
        let second = doc.create_element("book");
        second.set_text("Dune");
        let shelf = doc.create_element("shelf");
        shelf.append_child(second);
        catalog.append_child(first);
        catalog.append_child(shelf);
        doc.root().append_child(catalog);

        assert_eq!(
            vec![
                json!({"@id": "1", "book": "Part one"}),
                json!("Part one"),
                json!("Dune"),
            ],
            document_to_dictionaries(&doc, "book").unwrap()
        );
        assert_eq!(1, document_to_dictionaries(&doc, "catalog").unwrap().len());
        assert!(document_to_dictionaries(&doc, "missing").unwrap().is_empty());
    }
}
