//! XML → nested mapping decoding.
//!
//! Converts an XML document into a `serde_json::Value` tree with the
//! following conventions:
//!
//! - element names become object keys
//! - attributes become `@name` keys
//! - text of an element that also has children or attributes goes to `#text`
//! - a text-only element becomes a string, an empty element becomes `null`
//! - repeated sibling elements become an array, in document order
//!
//! A single child element is NOT wrapped in an array. Callers must run the
//! value through [`as_list`](crate::normalize::as_list) before iterating.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] AttrError),

    #[error("unclosed element <{0}> at end of document")]
    Unclosed(String),

    #[error("document has no root element")]
    Empty,

    #[error("content outside the root element")]
    OutsideRoot,
}

/// An element still being built.
struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut children = Map::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr.unescape_value()?.into_owned();
            children.insert(key, Value::String(value));
        }
        Ok(Self {
            name,
            children,
            text: String::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let Frame {
            name,
            mut children,
            text,
        } = self;
        let value = if children.is_empty() {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text)
            }
        } else {
            if !text.is_empty() {
                children.insert("#text".to_string(), Value::String(text));
            }
            Value::Object(children)
        };
        (name, value)
    }
}

/// Parse an XML document into a nested mapping keyed by the root element.
///
/// `<A><B>1</B></A>` becomes `{"A": {"B": "1"}}`.
pub fn parse_document(text: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.is_empty() && root.is_some() {
                    return Err(XmlError::OutsideRoot);
                }
                stack.push(Frame::open(&start)?);
            }
            Event::Empty(start) => {
                let (name, value) = Frame::open(&start)?.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Event::End(_) => {
                // quick-xml already rejects mismatched end tags.
                if let Some(frame) = stack.pop() {
                    let (name, value) = frame.close();
                    attach(&mut stack, &mut root, name, value)?;
                }
            }
            Event::Text(t) => match stack.last_mut() {
                Some(frame) => frame.text.push_str(&t.unescape()?),
                None if t.iter().all(u8::is_ascii_whitespace) => {}
                None => return Err(XmlError::OutsideRoot),
            },
            Event::CData(c) => match stack.last_mut() {
                Some(frame) => frame.text.push_str(&String::from_utf8_lossy(&c.into_inner())),
                None => return Err(XmlError::OutsideRoot),
            },
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if let Some(frame) = stack.pop() {
        return Err(XmlError::Unclosed(frame.name));
    }
    let (name, value) = root.ok_or(XmlError::Empty)?;
    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

/// Hand a closed element to its parent, or make it the document root.
/// A second top-level element is an error.
fn attach(
    stack: &mut [Frame],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => insert_child(&mut parent.children, name, value),
        None if root.is_some() => return Err(XmlError::OutsideRoot),
        None => *root = Some((name, value)),
    }
    Ok(())
}

/// Insert `value` under `name`, turning repeated keys into an array.
fn insert_child(map: &mut Map<String, Value>, name: String, value: Value) {
    match map.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_text_elements() {
        let doc = parse_document("<A><B>1</B><C> x </C></A>").unwrap();
        assert_eq!(doc, json!({"A": {"B": "1", "C": "x"}}));
    }

    #[test]
    fn repeated_elements_become_array() {
        let doc = parse_document(
            "<Materias><Materia><Codigo>1</Codigo></Materia><Materia><Codigo>2</Codigo></Materia></Materias>",
        )
        .unwrap();
        assert_eq!(
            doc,
            json!({"Materias": {"Materia": [{"Codigo": "1"}, {"Codigo": "2"}]}})
        );
    }

    #[test]
    fn single_element_is_not_wrapped() {
        let doc =
            parse_document("<Materias><Materia><Codigo>1</Codigo></Materia></Materias>").unwrap();
        assert_eq!(doc, json!({"Materias": {"Materia": {"Codigo": "1"}}}));
    }

    #[test]
    fn three_repeats_stay_in_order() {
        let doc = parse_document("<L><I>a</I><I>b</I><I>c</I></L>").unwrap();
        assert_eq!(doc, json!({"L": {"I": ["a", "b", "c"]}}));
    }

    #[test]
    fn attributes_and_text() {
        let doc = parse_document(r#"<A versao="7"><B tipo="x">texto</B></A>"#).unwrap();
        assert_eq!(
            doc,
            json!({"A": {"@versao": "7", "B": {"@tipo": "x", "#text": "texto"}}})
        );
    }

    #[test]
    fn empty_elements_are_null() {
        let doc = parse_document("<A><B/><C></C></A>").unwrap();
        assert_eq!(doc, json!({"A": {"B": null, "C": null}}));
    }

    #[test]
    fn entities_and_cdata_are_decoded() {
        let doc =
            parse_document("<A><B>Saúde &amp; Educação</B><C><![CDATA[<b>x</b>]]></C></A>")
                .unwrap();
        assert_eq!(doc, json!({"A": {"B": "Saúde & Educação", "C": "<b>x</b>"}}));
    }

    #[test]
    fn declaration_and_comments_are_skipped() {
        let doc = parse_document(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- gerado -->\n<A><B>1</B></A>",
        )
        .unwrap();
        assert_eq!(doc, json!({"A": {"B": "1"}}));
    }

    #[test]
    fn mismatched_end_tag_is_an_error() {
        assert!(parse_document("<A><B>1</C></A>").is_err());
    }

    #[test]
    fn unclosed_root_is_an_error() {
        assert!(parse_document("<A><B>1</B>").is_err());
    }

    #[test]
    fn trailing_text_after_root_is_an_error() {
        let err = parse_document("<A><B>1</B></A>garbage").unwrap_err();
        assert!(matches!(err, XmlError::OutsideRoot));
    }

    #[test]
    fn leading_text_before_root_is_an_error() {
        let err = parse_document("garbage<A><B>1</B></A>").unwrap_err();
        assert!(matches!(err, XmlError::OutsideRoot));
    }

    #[test]
    fn second_root_element_is_an_error() {
        assert!(matches!(
            parse_document("<A>1</A><C>2</C>").unwrap_err(),
            XmlError::OutsideRoot
        ));
        assert!(matches!(
            parse_document("<A>1</A><C/>").unwrap_err(),
            XmlError::OutsideRoot
        ));
    }

    #[test]
    fn whitespace_around_root_is_allowed() {
        let doc = parse_document("\n  <A>1</A>\n\n").unwrap();
        assert_eq!(doc, json!({"A": "1"}));
    }

    #[test]
    fn non_xml_body_is_an_error() {
        assert!(parse_document("").is_err());
        assert!(parse_document("not xml at all").is_err());
    }
}
