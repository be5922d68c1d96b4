use std::fmt;

/// Array keys are either integers or byte strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum SerializedKey {
    Int(i64),
    String(Vec<u8>),
}

impl fmt::Display for SerializedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(&String::from_utf8_lossy(s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SerializedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Raw bytes; the format does not guarantee UTF-8.
    String(Vec<u8>),
    /// Ordered entries. Duplicate keys are kept as written.
    Array(Vec<(SerializedKey, SerializedValue)>),
    Object {
        class: Vec<u8>,
        properties: Vec<(SerializedKey, SerializedValue)>,
    },
    /// A class with its own serializer; the payload is kept opaque.
    Custom { class: Vec<u8>, data: Vec<u8> },
    /// `Class:Case`
    Enum(Vec<u8>),
    /// Back-reference to an earlier value by position.
    Reference(usize),
}

impl SerializedValue {
    pub(crate) fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    /// Truthiness as the originating language evaluates it in a boolean context.
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => !(s.is_empty() || s.as_slice() == b"0"),
            Self::Array(entries) => !entries.is_empty(),
            Self::Object { .. } | Self::Custom { .. } | Self::Enum(_) | Self::Reference(_) => true,
        }
    }

    /// Integer value, accepting strings made only of ASCII digits.
    pub(crate) fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::String(s) if !s.is_empty() && s.iter().all(u8::is_ascii_digit) => {
                std::str::from_utf8(s).ok()?.parse().ok()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
impl SerializedValue {
    /// Encode back into the wire format. Test fixtures only.
    pub(crate) fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Self::Null => out.extend_from_slice(b"N;"),
            Self::Bool(b) => out.extend_from_slice(if *b { b"b:1;" } else { b"b:0;" }),
            Self::Int(i) => out.extend_from_slice(format!("i:{i};").as_bytes()),
            Self::Float(f) => out.extend_from_slice(format!("d:{f};").as_bytes()),
            Self::String(s) => write_string(out, b's', s, b";"),
            Self::Array(entries) => {
                out.extend_from_slice(format!("a:{}:", entries.len()).as_bytes());
                write_entries(out, entries);
            }
            Self::Object { class, properties } => {
                write_string(out, b'O', class, b":");
                out.extend_from_slice(format!("{}:", properties.len()).as_bytes());
                write_entries(out, properties);
            }
            Self::Custom { class, data } => {
                write_string(out, b'C', class, b":");
                out.extend_from_slice(format!("{}:{{", data.len()).as_bytes());
                out.extend_from_slice(data);
                out.push(b'}');
            }
            Self::Enum(s) => write_string(out, b'E', s, b";"),
            Self::Reference(n) => out.extend_from_slice(format!("r:{n};").as_bytes()),
        }
    }
}

#[cfg(test)]
fn write_string(out: &mut Vec<u8>, tag: u8, s: &[u8], terminator: &[u8]) {
    out.push(tag);
    out.extend_from_slice(format!(":{}:\"", s.len()).as_bytes());
    out.extend_from_slice(s);
    out.push(b'"');
    out.extend_from_slice(terminator);
}

#[cfg(test)]
fn write_entries(out: &mut Vec<u8>, entries: &[(SerializedKey, SerializedValue)]) {
    out.push(b'{');
    for (key, value) in entries {
        match key {
            SerializedKey::Int(i) => SerializedValue::Int(*i).write_to(out),
            SerializedKey::String(s) => SerializedValue::String(s.clone()).write_to(out),
        }
        value.write_to(out);
    }
    out.push(b'}');
}
