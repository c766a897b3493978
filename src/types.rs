use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One spreadsheet row: column name to cell value, in column order.
///
/// Serialized as a JSON object whose keys keep the order they were inserted in,
/// so the output follows the sheet header (or the allow-list) rather than
/// alphabetical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value. An existing column keeps its position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => *v = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `column`, or `""` when the column is absent.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }
}

impl<C: Into<String>, V: Into<String>> FromIterator<(C, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of column names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((column, value)) = access.next_entry::<String, String>()? {
                    record.insert(column, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Deduplication key: protocol and name, both trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    pub protocol: String,
    pub name: String,
}

impl RecordKey {
    /// Build the key from a record, or `None` when either part is missing.
    pub fn from_record(record: &Record, protocol_column: &str, name_column: &str) -> Option<Self> {
        let protocol = record.value(protocol_column).trim();
        let name = record.value(name_column).trim();
        if protocol.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            protocol: protocol.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.protocol, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_insertion_order() {
        let record: Record = vec![("Nome", "Ana"), ("Status", "Em análise"), ("Protocolo GS", "GS-1")]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Nome":"Ana","Status":"Em análise","Protocolo GS":"GS-1"}"#);

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new();
        record.insert("a", "1");
        record.insert("b", "2");
        record.insert("a", "3");

        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(record.value("a"), "3");
        assert_eq!(record.value("missing"), "");
    }

    #[test]
    fn test_key_requires_protocol_and_name() {
        let complete: Record = vec![("Protocolo GS", " GS-7 "), ("Nome", "Bruno ")].into_iter().collect();
        let key = RecordKey::from_record(&complete, "Protocolo GS", "Nome").unwrap();
        assert_eq!(key.protocol, "GS-7");
        assert_eq!(key.name, "Bruno");

        let no_protocol: Record = vec![("Protocolo GS", "  "), ("Nome", "Bruno")].into_iter().collect();
        assert!(RecordKey::from_record(&no_protocol, "Protocolo GS", "Nome").is_none());

        let no_name: Record = vec![("Protocolo GS", "GS-7")].into_iter().collect();
        assert!(RecordKey::from_record(&no_name, "Protocolo GS", "Nome").is_none());
    }
}
