//! XMP packets
//!
//! The packet is kept as text. `properties` gives a flat view of the simple
//! properties of every `rdf:Description`, which covers what most callers
//! look for (titles, ratings, keywords) without modelling full RDF.

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Serialize, Serializer};

const DESCRIPTION: &str = "rdf:Description";

/// An XMP packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmpPacket {
    text: String,
}

impl XmpPacket {
    /// Wraps raw packet bytes, decoded as UTF-8
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_start_matches('\u{feff}').trim_end_matches('\0');
        XmpPacket { text: text.to_string() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `(qualified name, value)` pairs in document order
    ///
    /// Attributes of `rdf:Description` and text content of its descendant
    /// elements are reported; array items repeat the property name. A
    /// malformed packet yields an empty list.
    pub fn properties(&self) -> Vec<(String, String)> {
        match collect_properties(&self.text) {
            Ok(properties) => properties,
            Err(e) => {
                debug!("Ignoring malformed XMP packet: {}", e);
                Vec::new()
            }
        }
    }

    /// First value of a property
    pub fn get(&self, name: &str) -> Option<String> {
        self.properties().into_iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }
}

fn qualified_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn description_attributes(element: &BytesStart<'_>, properties: &mut Vec<(String, String)>) -> Result<(), quick_xml::Error> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        if key.starts_with("xmlns") || key == "rdf:about" {
            continue;
        }
        let value = attribute.unescape_value()?.into_owned();
        properties.push((key, value));
    }
    Ok(())
}

fn collect_properties(text: &str) -> Result<Vec<(String, String)>, quick_xml::Error> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut properties = Vec::new();
    let mut stack: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(element) => {
                let name = qualified_name(&element);
                if name == DESCRIPTION {
                    description_attributes(&element, &mut properties)?;
                }
                stack.push(name);
            }
            Event::Empty(element) => {
                if qualified_name(&element) == DESCRIPTION {
                    description_attributes(&element, &mut properties)?;
                }
            }
            Event::Text(content) => {
                let value = content.unescape()?.into_owned();
                if value.is_empty() {
                    continue;
                }
                // Nearest enclosing property element inside a description
                if let Some(depth) = stack.iter().rposition(|name| name == DESCRIPTION) {
                    if let Some(name) = stack[depth + 1..].iter().rev().find(|name| !name.starts_with("rdf:")) {
                        properties.push((name.clone(), value));
                    }
                }
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(properties)
}

impl Serialize for XmpPacket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.properties())
    }
}
