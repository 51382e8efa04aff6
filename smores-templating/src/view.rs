//! The data tree handed to Liquid.
//!
//! Lookups never fail: a missing key, an out-of-range index or a step through a
//! null value all yield [`DataNode::Missing`], which the `fallback` filter
//! replaces with the tag's default. Liquid copies looked-up values into plain
//! `Value`s before printing, so containers are finalized by the `fallback`
//! filter the engine appends to every output; [`DataNode::display_text`] gives
//! the same text directly.

use indexmap::IndexMap;
use liquid::model::{
    ArrayView, DisplayCow, KString, KStringCow, Object, ObjectView, ScalarCow, State, Value,
    ValueView,
};
use std::fmt;
use std::sync::Arc;

static MISSING: DataNode = DataNode::Missing;

/// A node of serialized record data.
#[derive(Debug, Clone, PartialEq)]
pub enum DataNode {
    /// Absent or null.
    Missing,
    /// A Liquid scalar.
    Scalar(Value),
    Record(Record),
    List(Vec<DataNode>),
}

/// A record whose keys are lowercased field names.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: IndexMap<String, DataNode>,
    display_key: Arc<str>,
}

impl Record {
    /// An empty record that renders through `display_key`.
    pub fn new(display_key: impl Into<Arc<str>>) -> Self {
        Self {
            fields: IndexMap::new(),
            display_key: display_key.into(),
        }
    }

    pub fn insert(&mut self, key: &str, node: DataNode) {
        self.fields.insert(key.to_ascii_lowercase(), node);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Option<&DataNode> {
        self.fields.get(&key.to_ascii_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataNode)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn display_key(&self) -> &str {
        &self.display_key
    }

    /// The record's default display, or an empty string when it has none.
    pub fn display_text(&self) -> String {
        match self.get(&self.display_key) {
            Some(node) => node.display_text(),
            None => String::new(),
        }
    }
}

impl DataNode {
    /// A string scalar.
    pub fn text(text: impl Into<String>) -> Self {
        DataNode::Scalar(Value::scalar(text.into()))
    }

    /// Convert JSON without a schema. Objects become records using `display_key`.
    pub fn from_json(value: &serde_json::Value, display_key: &Arc<str>) -> Self {
        match value {
            serde_json::Value::Null => DataNode::Missing,
            serde_json::Value::Bool(b) => DataNode::Scalar(Value::scalar(*b)),
            serde_json::Value::Number(n) => DataNode::Scalar(number_value(n)),
            serde_json::Value::String(s) => DataNode::Scalar(Value::scalar(s.clone())),
            serde_json::Value::Array(items) => DataNode::List(
                items
                    .iter()
                    .map(|item| DataNode::from_json(item, display_key))
                    .collect(),
            ),
            serde_json::Value::Object(map) => {
                let mut record = Record::new(Arc::clone(display_key));
                for (k, v) in map {
                    record.insert(k, DataNode::from_json(v, display_key));
                }
                DataNode::Record(record)
            }
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, DataNode::Missing)
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            DataNode::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Text after finalization: records show their default display, lists
    /// concatenate their elements' displays, scalars render as themselves.
    pub fn display_text(&self) -> String {
        match self {
            DataNode::Missing => String::new(),
            DataNode::Scalar(value) => value.render().to_string(),
            DataNode::Record(record) => record.display_text(),
            DataNode::List(items) => items.iter().map(DataNode::display_text).collect(),
        }
    }

    /// Negative indices count from the end.
    fn item(&self, index: i64) -> Option<&DataNode> {
        let DataNode::List(items) = self else {
            return None;
        };
        let len = items.len() as i64;
        let index = if index < 0 { index + len } else { index };
        if (0..len).contains(&index) {
            items.as_slice().get(index as usize)
        } else {
            None
        }
    }
}

fn number_value(n: &serde_json::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::scalar(i)
    } else {
        Value::scalar(n.as_f64().unwrap_or_default())
    }
}

impl ValueView for DataNode {
    fn as_debug(&self) -> &dyn fmt::Debug {
        self
    }

    fn render(&self) -> DisplayCow<'_> {
        match self {
            DataNode::Scalar(value) => value.render(),
            DataNode::Missing => DisplayCow::Borrowed(&""),
            _ => DisplayCow::Owned(Box::new(self.display_text())),
        }
    }

    fn source(&self) -> DisplayCow<'_> {
        match self {
            DataNode::Scalar(value) => value.source(),
            _ => DisplayCow::Owned(Box::new(self.to_value().source().to_string())),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            DataNode::Missing => "nil",
            DataNode::Scalar(value) => value.type_name(),
            DataNode::Record(_) => "object",
            DataNode::List(_) => "array",
        }
    }

    fn query_state(&self, state: State) -> bool {
        match self {
            DataNode::Scalar(value) => value.query_state(state),
            DataNode::Missing => !matches!(state, State::Truthy),
            DataNode::Record(record) => match state {
                State::Truthy => true,
                _ => record.is_empty(),
            },
            DataNode::List(items) => match state {
                State::Truthy => true,
                _ => items.is_empty(),
            },
        }
    }

    fn to_kstr(&self) -> KStringCow<'_> {
        match self {
            DataNode::Scalar(value) => value.to_kstr(),
            _ => KStringCow::from_string(self.display_text()),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            DataNode::Missing => Value::Nil,
            DataNode::Scalar(value) => value.clone(),
            DataNode::Record(record) => {
                let mut object = Object::new();
                for (k, v) in &record.fields {
                    object.insert(KString::from_ref(k), v.to_value());
                }
                Value::Object(object)
            }
            DataNode::List(items) => Value::Array(items.iter().map(|v| v.to_value()).collect()),
        }
    }

    fn as_scalar(&self) -> Option<ScalarCow<'_>> {
        match self {
            DataNode::Scalar(value) => value.as_scalar(),
            _ => None,
        }
    }

    fn as_array(&self) -> Option<&dyn ArrayView> {
        match self {
            DataNode::List(_) => Some(self),
            _ => None,
        }
    }

    fn as_object(&self) -> Option<&dyn ObjectView> {
        match self {
            DataNode::Record(_) | DataNode::Missing => Some(self),
            _ => None,
        }
    }

    fn is_nil(&self) -> bool {
        self.is_missing()
    }
}

impl ObjectView for DataNode {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        self.as_record().map(|r| r.len() as i64).unwrap_or(0)
    }

    fn keys<'k>(&'k self) -> Box<dyn Iterator<Item = KStringCow<'k>> + 'k> {
        match self.as_record() {
            Some(record) => Box::new(record.keys().map(KStringCow::from_ref)),
            None => Box::new(std::iter::empty()),
        }
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        match self.as_record() {
            Some(record) => Box::new(record.fields.values().map(|v| v as &dyn ValueView)),
            None => Box::new(std::iter::empty()),
        }
    }

    fn iter<'k>(&'k self) -> Box<dyn Iterator<Item = (KStringCow<'k>, &'k dyn ValueView)> + 'k> {
        match self.as_record() {
            Some(record) => Box::new(
                record
                    .iter()
                    .map(|(k, v)| (KStringCow::from_ref(k), v as &dyn ValueView)),
            ),
            None => Box::new(std::iter::empty()),
        }
    }

    // Every name resolves; absent ones to `Missing`.
    fn contains_key(&self, _index: &str) -> bool {
        true
    }

    fn get<'s>(&'s self, index: &str) -> Option<&'s dyn ValueView> {
        let node = self
            .as_record()
            .and_then(|record| record.get(index))
            .unwrap_or(&MISSING);
        Some(node)
    }
}

impl ArrayView for DataNode {
    fn as_value(&self) -> &dyn ValueView {
        self
    }

    fn size(&self) -> i64 {
        match self {
            DataNode::List(items) => items.len() as i64,
            _ => 0,
        }
    }

    fn values<'k>(&'k self) -> Box<dyn Iterator<Item = &'k dyn ValueView> + 'k> {
        match self {
            DataNode::List(items) => Box::new(items.iter().map(|v| v as &dyn ValueView)),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn contains_key(&self, index: i64) -> bool {
        self.item(index).is_some()
    }

    fn get(&self, index: i64) -> Option<&dyn ValueView> {
        Some(self.item(index).unwrap_or(&MISSING))
    }

    fn first(&self) -> Option<&dyn ValueView> {
        Some(self.item(0).unwrap_or(&MISSING))
    }

    fn last(&self) -> Option<&dyn ValueView> {
        Some(self.item(-1).unwrap_or(&MISSING))
    }
}
