//! Generic XML tree.
//!
//! AWIS has many actions and every one of them answers with a different
//! document shape. Instead of a schema per action the body is parsed into a
//! generic tree: every element becomes an entry of its parent keyed by its
//! local name, repeated names collapse into a [`XmlValue::List`], and
//! elements that carry only text become [`XmlValue::Text`].

use crate::Result;
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// One value inside an [`XmlTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum XmlValue {
    /// Leaf element holding only text.
    Text(String),
    /// Element with children or attributes.
    Tree(XmlTree),
    /// The same element name repeated under one parent, in document order.
    List(Vec<XmlValue>),
}

impl XmlValue {
    /// The first element of a list, or the value itself.
    pub fn first(&self) -> &XmlValue {
        match self {
            XmlValue::List(items) => items.first().unwrap_or(self),
            v => v,
        }
    }

    /// Text of a leaf, or of an element that has attributes but no children.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlValue::Text(s) => Some(s),
            XmlValue::Tree(t) if t.is_empty() => Some(t.text().unwrap_or_default()),
            _ => None,
        }
    }

    /// The tree of an element with children.
    pub fn as_tree(&self) -> Option<&XmlTree> {
        match self {
            XmlValue::Tree(t) => Some(t),
            _ => None,
        }
    }

    /// Items of a repeated element. A single element is not a list.
    pub fn as_list(&self) -> Option<&[XmlValue]> {
        match self {
            XmlValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Ordered map of element name to [`XmlValue`], plus the attributes and text
/// of the element it was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlTree {
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    entries: Vec<(String, XmlValue)>,
}

impl XmlTree {
    /// Parse an XML document.
    ///
    /// The returned tree is the document itself: its only entry is the root
    /// element.
    pub fn parse(input: &str) -> Result<XmlTree> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut document = XmlTree::default();
        let mut stack: Vec<(String, XmlTree)> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(open_element(&e)?),
                Event::Empty(e) => {
                    let (name, tree) = open_element(&e)?;
                    let parent = stack.last_mut().map(|(_, t)| t).unwrap_or(&mut document);
                    parent.insert(name, tree.into_value());
                }
                Event::End(_) => {
                    // quick-xml has already checked the end name matches.
                    let Some((name, tree)) = stack.pop() else {
                        continue;
                    };
                    let parent = stack.last_mut().map(|(_, t)| t).unwrap_or(&mut document);
                    parent.insert(name, tree.into_value());
                }
                Event::Text(e) => {
                    if let Some((_, tree)) = stack.last_mut() {
                        tree.push_text(&e.unescape()?);
                    }
                }
                Event::CData(e) => {
                    if let Some((_, tree)) = stack.last_mut() {
                        tree.push_text(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some((name, _)) = stack.pop() {
            return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name)).into());
        }

        Ok(document)
    }

    /// Value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&XmlValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// First value stored under `name`, unwrapping repeated elements.
    pub fn first(&self, name: &str) -> Option<&XmlValue> {
        self.get(name).map(XmlValue::first)
    }

    /// The first entry of this tree in document order.
    pub fn first_child(&self) -> Option<(&str, &XmlValue)> {
        self.entries.first().map(|(k, v)| (k.as_str(), v))
    }

    /// Consume this tree and return its first entry.
    pub fn into_first_child(self) -> Option<(String, XmlValue)> {
        self.entries.into_iter().next()
    }

    /// Follow `path`, taking the first element at every step.
    pub fn path(&self, path: &[&str]) -> Option<&XmlValue> {
        let (last, parents) = path.split_last()?;
        let mut tree = self;
        for name in parents {
            tree = tree.first(name)?.as_tree()?;
        }
        tree.first(last)
    }

    /// Text found at `path`, see [`XmlTree::path`].
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        self.path(path)?.as_text()
    }

    /// Iterate over entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &XmlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of distinct child names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this tree has no child elements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attributes of the element this tree was built from.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Text directly inside the element this tree was built from.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn insert(&mut self, name: String, value: XmlValue) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, XmlValue::List(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, XmlValue::List(Vec::with_capacity(2)));
                *existing = XmlValue::List(vec![first, value]);
            }
            None => self.entries.push((name, value)),
        }
    }

    fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(s) => s.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    fn into_value(self) -> XmlValue {
        if self.entries.is_empty() && self.attributes.is_empty() {
            XmlValue::Text(self.text.unwrap_or_default())
        } else {
            XmlValue::Tree(self)
        }
    }
}

fn open_element(e: &BytesStart<'_>) -> Result<(String, XmlTree)> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut tree = XmlTree::default();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        tree.attributes.insert(key, value);
    }
    Ok((name, tree))
}

impl Serialize for XmlTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let text = self.text.as_deref();
        let len = self.attributes.len() + self.entries.len() + usize::from(text.is_some());

        let mut map = serializer.serialize_map(Some(len))?;
        for (k, v) in &self.attributes {
            map.serialize_entry(&format!("@{k}"), v)?;
        }
        if let Some(text) = text {
            map.serialize_entry("#text", text)?;
        }
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
