use super::errors::SerializedError;
use super::value::{SerializedKey, SerializedValue};

/// Arrays and objects nested deeper than this are rejected rather than
/// recursed into.
const MAX_DEPTH: usize = 64;

/// Upper bound on entries preallocated from an untrusted count.
const MAX_PREALLOCATED_ENTRIES: usize = 1024;

pub(super) struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    pub(super) fn parse_document(mut self) -> Result<SerializedValue, SerializedError> {
        let value = self.parse_value()?;
        if self.pos != self.input.len() {
            return Err(SerializedError::TrailingData(self.pos));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> Result<SerializedValue, SerializedError> {
        let tag_position = self.pos;
        let tag = self.next_byte()?;

        let value = match tag {
            b'N' => {
                self.expect(b';')?;
                SerializedValue::Null
            }
            b'b' => {
                self.expect(b':')?;
                let start = self.pos;
                match self.read_until(b';')? {
                    b"0" => SerializedValue::Bool(false),
                    b"1" => SerializedValue::Bool(true),
                    _ => return Err(SerializedError::InvalidNumber(start)),
                }
            }
            b'i' => {
                self.expect(b':')?;
                SerializedValue::Int(self.read_number(b';')?)
            }
            b'd' => {
                self.expect(b':')?;
                SerializedValue::Float(self.read_number(b';')?)
            }
            b's' => {
                self.expect(b':')?;
                let bytes = self.read_quoted()?;
                self.expect(b';')?;
                SerializedValue::String(bytes)
            }
            b'a' => {
                self.expect(b':')?;
                let count = self.read_length(b':')?;
                let entries = self.parse_entries(count)?;
                SerializedValue::Array(entries)
            }
            b'O' => {
                self.expect(b':')?;
                let class = self.read_quoted()?;
                self.expect(b':')?;
                let count = self.read_length(b':')?;
                let properties = self.parse_entries(count)?;
                SerializedValue::Object { class, properties }
            }
            b'C' => {
                self.expect(b':')?;
                let class = self.read_quoted()?;
                self.expect(b':')?;
                let len = self.read_length(b':')?;
                self.expect(b'{')?;
                let data = self.take(len)?.to_vec();
                self.expect(b'}')?;
                SerializedValue::Custom { class, data }
            }
            b'E' => {
                self.expect(b':')?;
                let case = self.read_quoted()?;
                self.expect(b';')?;
                SerializedValue::Enum(case)
            }
            b'r' | b'R' => {
                self.expect(b':')?;
                SerializedValue::Reference(self.read_length(b';')?)
            }
            found => {
                return Err(SerializedError::UnexpectedByte {
                    position: tag_position,
                    found,
                });
            }
        };

        Ok(value)
    }

    /// `{<key><value>...}` with exactly `count` pairs.
    fn parse_entries(
        &mut self,
        count: usize,
    ) -> Result<Vec<(SerializedKey, SerializedValue)>, SerializedError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(SerializedError::TooDeep(MAX_DEPTH));
        }

        self.expect(b'{')?;
        let mut entries = Vec::with_capacity(count.min(MAX_PREALLOCATED_ENTRIES));
        for _ in 0..count {
            let key_position = self.pos;
            let key = match self.parse_value()? {
                SerializedValue::Int(i) => SerializedKey::Int(i),
                SerializedValue::String(s) => SerializedKey::String(s),
                _ => return Err(SerializedError::InvalidKey(key_position)),
            };
            let value = self.parse_value()?;
            entries.push((key, value));
        }
        self.expect(b'}')?;

        self.depth -= 1;
        Ok(entries)
    }

    /// `<len>:"<len bytes>"`
    fn read_quoted(&mut self) -> Result<Vec<u8>, SerializedError> {
        let len = self.read_length(b':')?;
        self.expect(b'"')?;
        let bytes = self.take(len)?.to_vec();
        self.expect(b'"')?;
        Ok(bytes)
    }

    fn read_length(&mut self, terminator: u8) -> Result<usize, SerializedError> {
        let start = self.pos;
        let digits = self.read_until(terminator)?;
        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(SerializedError::InvalidLength(start));
        }
        std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(SerializedError::InvalidLength(start))
    }

    fn read_number<T: std::str::FromStr>(&mut self, terminator: u8) -> Result<T, SerializedError> {
        let start = self.pos;
        let digits = self.read_until(terminator)?;
        std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(SerializedError::InvalidNumber(start))
    }

    /// Bytes up to (not including) `terminator`; consumes the terminator.
    fn read_until(&mut self, terminator: u8) -> Result<&'a [u8], SerializedError> {
        let input = self.input;
        let rest = &input[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == terminator)
            .ok_or(SerializedError::UnexpectedEnd(self.input.len()))?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], SerializedError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or(SerializedError::UnexpectedEnd(self.input.len()))?;
        let input = self.input;
        let bytes = &input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn next_byte(&mut self) -> Result<u8, SerializedError> {
        let byte = *self
            .input
            .get(self.pos)
            .ok_or(SerializedError::UnexpectedEnd(self.pos))?;
        self.pos += 1;
        Ok(byte)
    }

    fn expect(&mut self, expected: u8) -> Result<(), SerializedError> {
        let position = self.pos;
        match self.next_byte()? {
            b if b == expected => Ok(()),
            found => Err(SerializedError::UnexpectedByte { position, found }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::unserialize;
    use super::*;
    use proptest::prelude::*;

    fn s(v: &str) -> SerializedValue {
        SerializedValue::String(v.as_bytes().to_vec())
    }

    fn key(v: &str) -> SerializedKey {
        SerializedKey::String(v.as_bytes().to_vec())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(unserialize(b"N;").unwrap(), SerializedValue::Null);
        assert_eq!(unserialize(b"b:1;").unwrap(), SerializedValue::Bool(true));
        assert_eq!(unserialize(b"b:0;").unwrap(), SerializedValue::Bool(false));
        assert_eq!(unserialize(b"i:-17;").unwrap(), SerializedValue::Int(-17));
        assert_eq!(unserialize(b"d:0.5;").unwrap(), SerializedValue::Float(0.5));
        assert_eq!(unserialize(b"s:3:\"abc\";").unwrap(), s("abc"));
    }

    #[test]
    fn test_float_specials() {
        assert_eq!(
            unserialize(b"d:INF;").unwrap(),
            SerializedValue::Float(f64::INFINITY)
        );
        assert_eq!(
            unserialize(b"d:-INF;").unwrap(),
            SerializedValue::Float(f64::NEG_INFINITY)
        );
        assert_eq!(
            unserialize(b"d:1.0E+25;").unwrap(),
            SerializedValue::Float(1.0e25)
        );
        match unserialize(b"d:NAN;").unwrap() {
            SerializedValue::Float(f) => assert!(f.is_nan()),
            other => panic!("Expected Float, got {other:?}"),
        }
    }

    #[test]
    fn test_string_length_is_in_bytes() {
        // "é" is two bytes in UTF-8
        assert_eq!(unserialize("s:2:\"é\";".as_bytes()).unwrap(), s("é"));
        assert!(unserialize("s:1:\"é\";".as_bytes()).is_err());
    }

    #[test]
    fn test_string_may_contain_quotes_and_semicolons() {
        assert_eq!(
            unserialize(b"s:7:\"a\";b:\"c\";").unwrap(),
            s("a\";b:\"c")
        );
    }

    #[test]
    fn test_array() {
        let value = unserialize(b"a:2:{s:6:\"_token\";s:2:\"T1\";i:5;b:1;}").unwrap();
        assert_eq!(
            value,
            SerializedValue::Array(vec![
                (key("_token"), s("T1")),
                (SerializedKey::Int(5), SerializedValue::Bool(true)),
            ])
        );
    }

    #[test]
    fn test_nested_array() {
        let value = unserialize(b"a:1:{s:6:\"_flash\";a:2:{s:3:\"old\";a:0:{}s:3:\"new\";a:0:{}}}")
            .unwrap();
        let SerializedValue::Array(entries) = value else {
            panic!("Expected array");
        };
        assert_eq!(entries.len(), 1);
        assert!(matches!(&entries[0].1, SerializedValue::Array(inner) if inner.len() == 2));
    }

    #[test]
    fn test_object_with_unknown_class() {
        let value =
            unserialize(b"O:8:\"stdClass\":1:{s:3:\"foo\";i:1;}").unwrap();
        assert_eq!(
            value,
            SerializedValue::Object {
                class: b"stdClass".to_vec(),
                properties: vec![(key("foo"), SerializedValue::Int(1))],
            }
        );
    }

    #[test]
    fn test_custom_enum_and_references() {
        assert_eq!(
            unserialize(b"C:3:\"Foo\":5:{x;y;z}").unwrap(),
            SerializedValue::Custom {
                class: b"Foo".to_vec(),
                data: b"x;y;z".to_vec(),
            }
        );
        assert_eq!(
            unserialize(b"E:10:\"Suit:Heart\";").unwrap(),
            SerializedValue::Enum(b"Suit:Heart".to_vec())
        );
        assert_eq!(
            unserialize(b"a:2:{i:0;i:1;i:1;R:2;}").unwrap(),
            SerializedValue::Array(vec![
                (SerializedKey::Int(0), SerializedValue::Int(1)),
                (SerializedKey::Int(1), SerializedValue::Reference(2)),
            ])
        );
    }

    #[test]
    fn test_rejects_truncated_input() {
        assert!(matches!(
            unserialize(b"s:10:\"abc\";"),
            Err(SerializedError::UnexpectedEnd(_))
        ));
        assert!(matches!(
            unserialize(b"a:2:{i:0;i:1;}"),
            Err(SerializedError::UnexpectedByte { .. })
        ));
        assert!(matches!(unserialize(b""), Err(SerializedError::UnexpectedEnd(0))));
    }

    #[test]
    fn test_rejects_trailing_data() {
        assert_eq!(
            unserialize(b"i:1;i:2;"),
            Err(SerializedError::TrailingData(4))
        );
    }

    #[test]
    fn test_rejects_bad_numbers_and_lengths() {
        assert_eq!(unserialize(b"i:abc;"), Err(SerializedError::InvalidNumber(2)));
        assert_eq!(unserialize(b"b:2;"), Err(SerializedError::InvalidNumber(2)));
        assert_eq!(
            unserialize(b"s:-1:\"\";"),
            Err(SerializedError::InvalidLength(2))
        );
        assert_eq!(
            unserialize(b"a:x:{}"),
            Err(SerializedError::InvalidLength(2))
        );
    }

    #[test]
    fn test_rejects_non_scalar_keys() {
        assert_eq!(
            unserialize(b"a:1:{N;i:1;}"),
            Err(SerializedError::InvalidKey(5))
        );
    }

    #[test]
    fn test_rejects_unknown_tag() {
        assert_eq!(
            unserialize(b"x:1;"),
            Err(SerializedError::UnexpectedByte {
                position: 0,
                found: b'x'
            })
        );
    }

    #[test]
    fn test_rejects_excessive_nesting() {
        let depth = MAX_DEPTH + 1;
        let mut input = Vec::new();
        for _ in 0..depth {
            input.extend_from_slice(b"a:1:{i:0;");
        }
        input.extend_from_slice(b"N;");
        for _ in 0..depth {
            input.push(b'}');
        }
        assert_eq!(
            unserialize(&input),
            Err(SerializedError::TooDeep(MAX_DEPTH))
        );
    }

    #[test]
    fn test_huge_declared_count_does_not_preallocate() {
        assert!(unserialize(b"a:18446744073709551615:{}").is_err());
    }

    proptest! {
        #[test]
        fn test_never_panics_on_arbitrary_input(input in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = unserialize(&input);
        }

        #[test]
        fn test_strings_decode_to_themselves(text in ".*") {
            let encoded = s(&text).serialize();
            prop_assert_eq!(unserialize(&encoded).unwrap(), s(&text));
        }
    }
}
