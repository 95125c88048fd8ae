//! Write XML documents and elements out as text, whichever DOM holds them.
//!
//! Two backends can hold the tree, chosen when the crate is built:
//!
//! - `native` (the default): a mutable, arena-backed DOM owned by a
//!   [`Package`].
//! - `portable`: documents parsed and held by `roxmltree`.
//!
//! Exactly one of them is compiled in, and its `Node`, `Element` and
//! `Document` are re-exported here, so code written against these names
//! does not change when the backend does. The node kinds, formatting
//! options and content kinds are the same for both.
//!
//! ```
//! use sxd_serialize::{Package, NodeOptions, document_to_string, element_to_string};
//!
//! let package = Package::new();
//! let doc = package.as_document();
//!
//! let greeting = doc.create_element("greeting");
//! greeting.set_attribute_value("lang", "en");
//! greeting.set_text("Hello & welcome");
//! doc.root().append_child(greeting);
//!
//! let xml = document_to_string(&doc, NodeOptions::NONE).unwrap();
//! assert_eq!(xml, r#"<?xml version="1.0"?><greeting lang="en">Hello &amp; welcome</greeting>"#);
//!
//! let fragment = element_to_string(greeting, NodeOptions::NONE).unwrap();
//! assert_eq!(fragment, r#"<greeting lang="en">Hello &amp; welcome</greeting>"#);
//! ```
//!
//! ### Design decisions
//!
//! The writer only knows the [`tree::XmlNode`] and [`tree::XmlDocument`]
//! traits. A backend is a pair of implementations of them, nothing more.

#[cfg(all(feature = "native", feature = "portable"))]
compile_error!("the `native` and `portable` features are mutually exclusive; disable default features to use `portable`");

#[cfg(not(any(feature = "native", feature = "portable")))]
compile_error!("exactly one of the `native` or `portable` features must be enabled");

pub mod kind;
pub mod tree;
pub mod error;
mod escape;
pub mod writer;
pub mod dictionary;

#[cfg(feature = "native")]
pub mod native;

#[cfg(feature = "portable")]
pub mod portable;

pub use kind::{DocumentContentKind,EmptyElement,NodeKind,NodeOptions,UnknownOrdinal};
pub use error::{Error,Result};
pub use writer::Serializer;
pub use dictionary::{document_to_dictionaries,document_to_dictionary,element_to_dictionary};

#[cfg(feature = "native")]
pub use native::{Document,Element,Node,Package};

#[cfg(feature = "portable")]
pub use portable::{Document,Element,Node};

/// Serializes a whole document of the active backend, prolog included.
pub fn document_to_string(document: &Document, options: NodeOptions) -> Result<String> {
    Serializer::new(options).document(document)
}

/// Serializes one element of the active backend and its descendants, as
/// XML and without a prolog. Namespaces declared on its ancestors are
/// declared again on it. Use a [`Serializer`] to pick another content
/// kind.
pub fn element_to_string(element: Element, options: NodeOptions) -> Result<String> {
    Serializer::new(options).element(Node::from(element))
}

#[cfg(all(test, feature = "native"))]
mod test {
    use super::{
        document_to_string, element_to_string, Document, DocumentContentKind, Element, Error,
        NodeKind, NodeOptions, Package,
    };

    fn rebuild_element<'d>(doc: Document<'d>, source: roxmltree::Node) -> Element<'d> {
        let element = doc.create_element(source.tag_name().name());
        for attribute in source.attributes() {
            element.set_attribute_value(attribute.name(), attribute.value());
        }
        for child in source.children() {
            match child.node_type() {
                roxmltree::NodeType::Element => element.append_child(rebuild_element(doc, child)),
                roxmltree::NodeType::Text => element.append_child(doc.create_text(child.text().unwrap_or(""))),
                roxmltree::NodeType::Comment => element.append_child(doc.create_comment(child.text().unwrap_or(""))),
                roxmltree::NodeType::PI => {
                    let pi = child.pi().unwrap();
                    element.append_child(doc.create_processing_instruction(pi.target, pi.value));
                },
                roxmltree::NodeType::Root => unreachable!(),
            }
        }
        element
    }

    fn reparse(xml: &str, options: NodeOptions) -> String {
        let tree = roxmltree::Document::parse(xml).unwrap();
        let package = Package::new();
        let doc = package.as_document();
        for child in tree.root().children() {
            match child.node_type() {
                roxmltree::NodeType::Element => doc.root().append_child(rebuild_element(doc, child)),
                roxmltree::NodeType::Comment => doc.root().append_child(doc.create_comment(child.text().unwrap_or(""))),
                _ => {},
            }
        }
        document_to_string(&doc, options).unwrap()
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let package = Package::new();
        let doc = package.as_document();
        let e = doc.create_element("e");
        e.set_attribute_value("id", "1");
        e.set_attribute_value("class", "a b");
        doc.root().append_child(e);

        assert_eq!(
            r#"<?xml version="1.0"?><e id="1" class="a b"/>"#,
            document_to_string(&doc, NodeOptions::NONE).unwrap()
        );
    }

    #[test]
    fn empty_element_flags() {
        let package = Package::new();
        let doc = package.as_document();
        let foo = doc.create_element("foo");

        let compact = element_to_string(foo, NodeOptions::COMPACT_EMPTY_ELEMENT).unwrap();
        let expand = element_to_string(foo, NodeOptions::EXPAND_EMPTY_ELEMENT).unwrap();
        let both = element_to_string(
            foo,
            NodeOptions::COMPACT_EMPTY_ELEMENT | NodeOptions::EXPAND_EMPTY_ELEMENT
        ).unwrap();

        assert_eq!("<foo/>", compact);
        assert_eq!("<foo></foo>", expand);
        assert_eq!("<foo/>", both);
    }

    #[test]
    fn text_is_escaped() {
        let package = Package::new();
        let doc = package.as_document();
        let e = doc.create_element("e");
        e.set_text("a < b & c");

        assert_eq!("<e>a &lt; b &amp; c</e>", element_to_string(e, NodeOptions::NONE).unwrap());
    }

    #[test]
    fn pretty_print_only_when_asked() {
        let package = Package::new();
        let doc = package.as_document();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        b.append_child(doc.create_element("c"));
        a.append_child(b);
        doc.root().append_child(a);

        assert_eq!(
            "<?xml version=\"1.0\"?>\n<a>\n  <b>\n    <c/>\n  </b>\n</a>\n",
            document_to_string(&doc, NodeOptions::PRETTY_PRINT).unwrap()
        );
        assert_eq!(
            "<?xml version=\"1.0\"?><a><b><c/></b></a>",
            document_to_string(&doc, NodeOptions::NONE).unwrap()
        );
    }

    #[test]
    fn a_document_needs_an_element() {
        let package = Package::new();
        let doc = package.as_document();
        doc.root().append_child(doc.create_comment("lonely"));

        let err = document_to_string(&doc, NodeOptions::NONE).unwrap_err();
        assert_eq!(Error::MissingDocumentElement, err);
        assert!(err.is_structural());
    }

    #[test]
    fn reserializing_is_idempotent() {
        let inputs = [
            r#"<root a="1" b="x &amp; y"><child>text &lt; more</child><!--note--><empty/><?pi data?></root>"#,
            "<a><b><c>deep</c></b><b/></a>",
        ];

        for &options in &[NodeOptions::NONE, NodeOptions::PRETTY_PRINT] {
            for input in &inputs {
                let first = reparse(input, options);
                let second = reparse(&first, options);
                assert_eq!(first, second);
            }
        }
    }

    #[test]
    fn namespace_declarations_are_written_before_attributes() {
        let package = Package::new();
        let doc = package.as_document();
        let e = doc.create_element("p:e");
        e.set_attribute_value("p:x", "1");
        e.declare_namespace(None, "urn:default");
        e.declare_namespace(Some("p"), "urn:p");

        assert_eq!(
            r#"<p:e xmlns="urn:default" xmlns:p="urn:p" p:x="1"/>"#,
            element_to_string(e, NodeOptions::NONE).unwrap()
        );
    }

    #[test]
    fn prolog_and_document_type() {
        let package = Package::new();
        let doc = package.as_document();
        doc.set_character_encoding(Some("UTF-8"));
        doc.set_standalone(Some(true));
        doc.root().append_child(doc.create_document_type("note", None, Some("note.dtd")));
        doc.root().append_child(doc.create_element("note"));

        assert_eq!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><!DOCTYPE note SYSTEM "note.dtd"><note/>"#,
            document_to_string(&doc, NodeOptions::NONE).unwrap()
        );
    }

    #[test]
    fn html_documents_have_no_xml_declaration() {
        let package = Package::new();
        let doc = package.as_document();
        doc.set_content_kind(DocumentContentKind::Html);
        let p = doc.create_element("p");
        p.append_child(doc.create_element("br"));
        doc.root().append_child(p);

        assert_eq!("<!DOCTYPE html><p><br></p>", document_to_string(&doc, NodeOptions::NONE).unwrap());
    }

    #[test]
    fn vocabularies_keep_their_ordinals() {
        assert_eq!(13, NodeKind::ALL.len());
        for (ordinal, kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(ordinal as u8, kind.ordinal());
        }
        assert_eq!(1 << 2, NodeOptions::COMPACT_EMPTY_ELEMENT.bits());
        assert_eq!(2, DocumentContentKind::Html.ordinal());
    }

    #[test]
    fn system_identifier_with_double_quote_uses_single_quotes() {
        let package = Package::new();
        let doc = package.as_document();
        doc.root().append_child(doc.create_document_type("n", None, Some("a\"b.dtd")));
        doc.root().append_child(doc.create_element("n"));

        let xml = document_to_string(&doc, NodeOptions::NONE).unwrap();
        assert_eq!(r#"<?xml version="1.0"?><!DOCTYPE n SYSTEM 'a"b.dtd'><n/>"#, xml);
        assert!(roxmltree::Document::parse(&xml).is_ok());
    }

    #[test]
    fn public_and_system_identifiers() {
        let package = Package::new();
        let doc = package.as_document();
        doc.root().append_child(doc.create_document_type(
            "html",
            Some("-//W3C//DTD XHTML 1.0 Strict//EN"),
            Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"),
        ));
        doc.root().append_child(doc.create_element("html"));

        assert_eq!(
            concat!(
                r#"<?xml version="1.0"?><!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "#,
                r#""http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd"><html/>"#
            ),
            document_to_string(&doc, NodeOptions::NONE).unwrap()
        );
    }

    #[test]
    fn unwritable_document_type_identifiers_are_errors() {
        let both_quotes = Package::new();
        let doc = both_quotes.as_document();
        doc.root().append_child(doc.create_document_type("n", None, Some("a\"b'c")));
        doc.root().append_child(doc.create_element("n"));
        let err = document_to_string(&doc, NodeOptions::NONE).unwrap_err();
        assert!(err.is_encoding());

        let bad_public = Package::new();
        let doc = bad_public.as_document();
        doc.root().append_child(doc.create_document_type("n", Some("{curly}"), Some("n.dtd")));
        doc.root().append_child(doc.create_element("n"));
        let err = document_to_string(&doc, NodeOptions::NONE).unwrap_err();
        assert_eq!(Error::UnrepresentableDocumentType {
            value: "{curly}".to_string(),
            reason: "public identifiers allow only PubidChar characters",
        }, err);
    }

    #[test]
    fn pretty_print_keeps_non_breaking_space() {
        let package = Package::new();
        let doc = package.as_document();
        let a = doc.create_element("a");
        a.append_child(doc.create_text("\u{a0}"));
        a.append_child(doc.create_element("b"));

        let out = element_to_string(a, NodeOptions::PRETTY_PRINT).unwrap();
        assert!(out.contains('\u{a0}'));
    }

    #[test]
    fn fragments_declare_prefixes_bound_by_ancestors() {
        let package = Package::new();
        let doc = package.as_document();
        let a = doc.create_element("a");
        a.declare_namespace(Some("p"), "urn:p");
        let b = doc.create_element("p:b");
        a.append_child(b);
        doc.root().append_child(a);

        let out = element_to_string(b, NodeOptions::NONE).unwrap();
        assert_eq!(r#"<p:b xmlns:p="urn:p"/>"#, out);
        assert!(roxmltree::Document::parse(&out).is_ok());
    }
}
