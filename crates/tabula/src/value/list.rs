//! Immutable lists and the lazily indexed keyed list.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::value::value::Value;

/// A key extracted from a list element for indexed lookup.
///
/// Keys are restricted to the hashable primitives a schema may declare
/// as a list key: booleans, integers (int32, int64, and timestamp
/// millis all widen to `Int`), and strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    Bool(bool),
    Int(i64),
    Str(Arc<str>),
}

impl From<bool> for IndexKey {
    fn from(v: bool) -> Self {
        IndexKey::Bool(v)
    }
}

impl From<i32> for IndexKey {
    fn from(v: i32) -> Self {
        IndexKey::Int(v as i64)
    }
}

impl From<i64> for IndexKey {
    fn from(v: i64) -> Self {
        IndexKey::Int(v)
    }
}

impl From<&str> for IndexKey {
    fn from(v: &str) -> Self {
        IndexKey::Str(Arc::from(v))
    }
}

impl IndexKey {
    /// Extracts a key from a leaf value, if the leaf is keyable.
    fn from_value(value: &Value) -> Option<IndexKey> {
        match value {
            Value::Bool(b) => Some(IndexKey::Bool(*b)),
            Value::Int32(v) => Some(IndexKey::Int(*v as i64)),
            Value::Int64(v) => Some(IndexKey::Int(*v)),
            Value::Timestamp(t) => Some(IndexKey::Int(t.unix_millis)),
            Value::Str(s) => Some(IndexKey::Str(s.clone())),
            _ => None,
        }
    }
}

struct ListInner {
    elements: Vec<Value>,
    /// Field-index chain projecting an element to its key leaf.
    /// `None` for unkeyed lists.
    key_path: Option<Arc<[usize]>>,
    /// Built on first lookup; never invalidated because elements never
    /// mutate after freeze.
    index: OnceLock<HashMap<IndexKey, usize>>,
}

/// An ordered, immutable sequence of values, optionally augmented with
/// a lazily built key index.
///
/// Cloning shares the frozen storage; [`ListValue::ptr_eq`] observes
/// that sharing. Freezing a caller-owned vector moves it into the
/// shared representation, the one defensive copy the deep-immutability
/// contract requires.
#[derive(Clone)]
pub struct ListValue(Arc<ListInner>);

impl ListValue {
    /// Freezes a vector into an unkeyed immutable list.
    pub fn new(elements: Vec<Value>) -> Self {
        Self(Arc::new(ListInner {
            elements,
            key_path: None,
            index: OnceLock::new(),
        }))
    }

    /// Freezes a vector into a keyed immutable list.
    ///
    /// `key_path` is the field-index chain (resolved from the schema's
    /// dotted key by the list's descriptor) leading from an element to
    /// its key leaf.
    pub fn keyed(elements: Vec<Value>, key_path: Arc<[usize]>) -> Self {
        Self(Arc::new(ListInner {
            elements,
            key_path: Some(key_path),
            index: OnceLock::new(),
        }))
    }

    /// Returns a list with the given key path, sharing storage when the
    /// path already matches and re-freezing (shallow element clones)
    /// when it does not.
    pub fn with_key_path(&self, key_path: Option<Arc<[usize]>>) -> ListValue {
        let same = match (&self.0.key_path, &key_path) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if same {
            self.clone()
        } else {
            Self(Arc::new(ListInner {
                elements: self.0.elements.clone(),
                key_path,
                index: OnceLock::new(),
            }))
        }
    }

    pub fn len(&self) -> usize {
        self.0.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.elements.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0.elements
    }

    /// Whether two lists share the same frozen storage.
    pub fn ptr_eq(&self, other: &ListValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn key_path(&self) -> Option<&Arc<[usize]>> {
        self.0.key_path.as_ref()
    }

    /// Looks up the element holding `key`.
    ///
    /// The first lookup builds the index in O(n); the build is
    /// at-most-once and race-safe, so concurrent first lookups all
    /// observe the same fully built index. When several elements share
    /// a key, the last one in iteration order wins. Unkeyed lists
    /// always return `None`.
    pub fn find_by_key(&self, key: impl Into<IndexKey>) -> Option<&Value> {
        let key_path = self.0.key_path.as_ref()?;
        let index = self.0.index.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.0.elements.len());
            for (position, element) in self.0.elements.iter().enumerate() {
                if let Some(k) = Self::project(element, key_path) {
                    // later positions overwrite earlier ones
                    map.insert(k, position);
                }
            }
            map
        });
        index.get(&key.into()).map(|&i| &self.0.elements[i])
    }

    fn project(element: &Value, key_path: &[usize]) -> Option<IndexKey> {
        let mut current = element;
        for &field_index in key_path {
            current = current.as_struct()?.field(field_index)?;
        }
        IndexKey::from_value(current)
    }
}

impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.elements == other.0.elements
    }
}

impl fmt::Debug for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.elements.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a ListValue {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
