//! Nodes of the document object graph.
//!
//! The engine walks an already parsed graph and never mutates it. Dictionary
//! keys keep their file order through [`IndexMap`], which in turn keeps the
//! order of findings deterministic from one run to the next.

use indexmap::IndexMap;

/// Order-preserving dictionary with unique keys.
pub type Dictionary = IndexMap<String, Object>;

/// One node of the object graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// The null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// String payload, kept as raw bytes
    String(Vec<u8>),
    /// Name token, without the leading slash
    Name(String),
    /// Ordered sequence of objects
    Array(Vec<Object>),
    /// Dictionary node
    Dictionary(Dictionary),
    /// Stream node, a dictionary plus an opaque payload
    Stream {
        /// Stream dictionary
        dict: Dictionary,
        /// Raw payload bytes
        data: bytes::Bytes,
    },
    /// Indirect reference, resolved through the cross-reference table
    Reference(ObjectRef),
}

/// Identity of an indirect object: object number plus generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Build a reference from its object and generation numbers.
    pub const fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl Object {
    /// Human-readable node kind, for wrong-type findings.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Integer value, or `None` for any other node kind.
    pub fn as_integer(&self) -> Option<i64> {
        if let Object::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Numeric value widened to `f64`; accepts integer and real nodes.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Name token, or `None` for any other node kind.
    pub fn as_name(&self) -> Option<&str> {
        if let Object::Name(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// String bytes, or `None` for any other node kind.
    pub fn as_string(&self) -> Option<&[u8]> {
        if let Object::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Boolean value, or `None` for any other node kind.
    pub fn as_bool(&self) -> Option<bool> {
        if let Object::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    /// Dictionary view of the node. A stream answers with its own
    /// dictionary, so checks on dictionary entries apply to both kinds.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Array contents, or `None` for any other node kind.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        if let Object::Array(arr) = self {
            Some(arr)
        } else {
            None
        }
    }

    /// Stream dictionary and payload. Unlike [`as_dict`](Self::as_dict), a
    /// plain dictionary does not qualify.
    pub fn as_stream(&self) -> Option<(&Dictionary, &bytes::Bytes)> {
        if let Object::Stream { dict, data } = self {
            Some((dict, data))
        } else {
            None
        }
    }

    /// Reference identity, or `None` for direct nodes.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        if let Object::Reference(r) = self {
            Some(*r)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_getters() {
        assert_eq!(Object::Integer(42).as_integer(), Some(42));
        assert_eq!(Object::Integer(42).as_number(), Some(42.0));
        assert_eq!(Object::Real(0.5).as_number(), Some(0.5));
        assert!(Object::Real(0.5).as_integer().is_none());
        assert!(Object::Name("42".to_string()).as_number().is_none());
    }

    #[test]
    fn test_getters_reject_other_kinds() {
        let name = Object::Name("Type".to_string());
        assert_eq!(name.as_name(), Some("Type"));
        assert!(name.as_dict().is_none());
        assert!(name.as_array().is_none());
        assert!(name.as_string().is_none());
        assert_eq!(name.type_name(), "Name");
    }

    #[test]
    fn test_stream_answers_as_dict() {
        let mut dict = Dictionary::new();
        dict.insert("Length".to_string(), Object::Integer(100));
        let stream = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"BT ET"),
        };

        let d = stream.as_dict().unwrap();
        assert_eq!(d.get("Length").unwrap().as_integer(), Some(100));
        let (_, data) = stream.as_stream().unwrap();
        assert_eq!(&data[..], b"BT ET");

        let plain = Object::Dictionary(Dictionary::new());
        assert!(plain.as_stream().is_none());
        assert!(plain.as_dict().is_some());
    }

    #[test]
    fn test_reference_display_and_identity() {
        let r = ObjectRef::new(10, 2);
        assert_eq!(format!("{}", r), "10 2 R");
        assert_eq!(Object::Reference(r).as_reference(), Some(r));

        let mut set = std::collections::HashSet::new();
        set.insert(ObjectRef::new(1, 0));
        set.insert(ObjectRef::new(1, 0));
        set.insert(ObjectRef::new(2, 0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_dictionary_preserves_insertion_order() {
        let mut dict = Dictionary::new();
        dict.insert("Zebra".to_string(), Object::Null);
        dict.insert("Alpha".to_string(), Object::Null);
        let keys: Vec<_> = dict.keys().collect();
        assert_eq!(keys, vec!["Zebra", "Alpha"]);
    }
}
