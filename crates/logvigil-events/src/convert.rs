//! Document conversion
//!
//! [`EventDocMapper`] maps events and their nested entries to backend
//! documents and back. Fixed attributes go to named top-level fields; the
//! open field bags go to a `fields` sub-object so caller-supplied keys can
//! never collide with fixed attributes and need no pre-declared schema.
//! Bag values are encoded through a codec registry keyed by value tag, so
//! new value types plug in without touching the fixed-attribute mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use logvigil_core::{Event, EventId, FieldBag, FieldValue, LogEntry, LogPointer, SnifferId, SourceId};
use logvigil_index::Document;

use crate::error::ConvertError;

/// Fixed document field: owning sniffer id
pub const FIELD_SNIFFER_ID: &str = "snifferId";
/// Fixed document field: owning log-source id
pub const FIELD_SOURCE_ID: &str = "logSourceId";
/// Fixed document field: source log path
pub const FIELD_LOG_PATH: &str = "logPath";
/// Fixed document field: publication time, epoch milliseconds
pub const FIELD_PUBLISHED: &str = "published";
/// Fixed document field: ordered evidence entries
pub const FIELD_ENTRIES: &str = "entries";
/// Fixed document field: open field bag sub-object
pub const FIELD_FIELDS: &str = "fields";

const ENTRY_RAW_CONTENT: &str = "rawContent";
const ENTRY_START: &str = "start";
const ENTRY_END: &str = "end";

const TAG_KEY: &str = "type";
const VALUE_KEY: &str = "value";

/// Codec for one field value type.
///
/// A codec owns exactly one tag; the registry dispatches on it for both
/// directions.
pub trait FieldCodec: Send + Sync {
    /// Tag this codec handles (matches [`FieldValue::tag`])
    fn tag(&self) -> &'static str;

    /// Encode a value of this codec's type to its stored JSON form
    fn encode(&self, value: &FieldValue) -> Result<Value, ConvertError>;

    /// Decode the stored JSON form back into a value
    fn decode(&self, raw: &Value) -> Result<FieldValue, ConvertError>;
}

struct TextCodec;

impl FieldCodec for TextCodec {
    fn tag(&self) -> &'static str {
        "text"
    }

    fn encode(&self, value: &FieldValue) -> Result<Value, ConvertError> {
        match value {
            FieldValue::Text(text) => Ok(json!(text)),
            other => Err(ConvertError::invalid(self.tag(), format!("not text: {other:?}"))),
        }
    }

    fn decode(&self, raw: &Value) -> Result<FieldValue, ConvertError> {
        raw.as_str()
            .map(|s| FieldValue::Text(s.to_string()))
            .ok_or_else(|| ConvertError::invalid(self.tag(), "expected string"))
    }
}

struct IntegerCodec;

impl FieldCodec for IntegerCodec {
    fn tag(&self) -> &'static str {
        "integer"
    }

    fn encode(&self, value: &FieldValue) -> Result<Value, ConvertError> {
        match value {
            FieldValue::Integer(n) => Ok(json!(n)),
            other => Err(ConvertError::invalid(self.tag(), format!("not an integer: {other:?}"))),
        }
    }

    fn decode(&self, raw: &Value) -> Result<FieldValue, ConvertError> {
        raw.as_i64()
            .map(FieldValue::Integer)
            .ok_or_else(|| ConvertError::invalid(self.tag(), "expected integer"))
    }
}

struct FloatCodec;

impl FieldCodec for FloatCodec {
    fn tag(&self) -> &'static str {
        "float"
    }

    fn encode(&self, value: &FieldValue) -> Result<Value, ConvertError> {
        match value {
            FieldValue::Float(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .ok_or_else(|| ConvertError::invalid(self.tag(), "non-finite float")),
            other => Err(ConvertError::invalid(self.tag(), format!("not a float: {other:?}"))),
        }
    }

    fn decode(&self, raw: &Value) -> Result<FieldValue, ConvertError> {
        raw.as_f64()
            .map(FieldValue::Float)
            .ok_or_else(|| ConvertError::invalid(self.tag(), "expected number"))
    }
}

struct BooleanCodec;

impl FieldCodec for BooleanCodec {
    fn tag(&self) -> &'static str {
        "boolean"
    }

    fn encode(&self, value: &FieldValue) -> Result<Value, ConvertError> {
        match value {
            FieldValue::Boolean(b) => Ok(json!(b)),
            other => Err(ConvertError::invalid(self.tag(), format!("not a boolean: {other:?}"))),
        }
    }

    fn decode(&self, raw: &Value) -> Result<FieldValue, ConvertError> {
        raw.as_bool()
            .map(FieldValue::Boolean)
            .ok_or_else(|| ConvertError::invalid(self.tag(), "expected boolean"))
    }
}

struct TimestampCodec;

impl FieldCodec for TimestampCodec {
    fn tag(&self) -> &'static str {
        "timestamp"
    }

    fn encode(&self, value: &FieldValue) -> Result<Value, ConvertError> {
        match value {
            FieldValue::Timestamp(at) => Ok(json!(at.timestamp_millis())),
            other => Err(ConvertError::invalid(self.tag(), format!("not a timestamp: {other:?}"))),
        }
    }

    fn decode(&self, raw: &Value) -> Result<FieldValue, ConvertError> {
        let millis = raw
            .as_i64()
            .ok_or_else(|| ConvertError::invalid(self.tag(), "expected epoch millis"))?;
        decode_millis(self.tag(), millis).map(FieldValue::Timestamp)
    }
}

struct PointerCodec;

impl FieldCodec for PointerCodec {
    fn tag(&self) -> &'static str {
        "pointer"
    }

    fn encode(&self, value: &FieldValue) -> Result<Value, ConvertError> {
        match value {
            FieldValue::Pointer(pointer) => Ok(json!(pointer.to_portable())),
            other => Err(ConvertError::invalid(self.tag(), format!("not a pointer: {other:?}"))),
        }
    }

    fn decode(&self, raw: &Value) -> Result<FieldValue, ConvertError> {
        let portable = raw
            .as_str()
            .ok_or_else(|| ConvertError::invalid(self.tag(), "expected portable pointer string"))?;
        Ok(FieldValue::Pointer(LogPointer::from_portable(portable)?))
    }
}

fn decode_millis(field: &str, millis: i64) -> Result<DateTime<Utc>, ConvertError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| ConvertError::invalid(field, format!("epoch millis out of range: {millis}")))
}

/// Registry of field codecs, keyed by value tag
pub struct CodecRegistry {
    codecs: BTreeMap<&'static str, Arc<dyn FieldCodec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CodecRegistry {
    /// Registry with the built-in codecs: text, integer, float, boolean,
    /// timestamp, pointer
    pub fn with_defaults() -> Self {
        let mut registry = Self {
            codecs: BTreeMap::new(),
        };
        registry.register(Arc::new(TextCodec));
        registry.register(Arc::new(IntegerCodec));
        registry.register(Arc::new(FloatCodec));
        registry.register(Arc::new(BooleanCodec));
        registry.register(Arc::new(TimestampCodec));
        registry.register(Arc::new(PointerCodec));
        registry
    }

    /// Register a codec, replacing any previous codec for the same tag
    pub fn register(&mut self, codec: Arc<dyn FieldCodec>) {
        self.codecs.insert(codec.tag(), codec);
    }

    fn by_tag(&self, tag: &str) -> Result<&dyn FieldCodec, ConvertError> {
        self.codecs
            .get(tag)
            .map(|c| c.as_ref())
            .ok_or_else(|| ConvertError::UnknownTag(tag.to_string()))
    }

    fn encode_bag(&self, bag: &FieldBag) -> Result<Value, ConvertError> {
        let mut out = Map::new();
        for (name, value) in bag {
            let codec = self.by_tag(value.tag())?;
            out.insert(
                name.clone(),
                json!({ TAG_KEY: value.tag(), VALUE_KEY: codec.encode(value)? }),
            );
        }
        Ok(Value::Object(out))
    }

    fn decode_bag(&self, raw: &Value) -> Result<FieldBag, ConvertError> {
        let object = raw
            .as_object()
            .ok_or_else(|| ConvertError::invalid(FIELD_FIELDS, "expected object"))?;

        let mut bag = FieldBag::new();
        for (name, tagged) in object {
            let tag = tagged
                .get(TAG_KEY)
                .and_then(Value::as_str)
                .ok_or_else(|| ConvertError::invalid(name.clone(), "missing value tag"))?;
            let value = tagged
                .get(VALUE_KEY)
                .ok_or_else(|| ConvertError::invalid(name.clone(), "missing value"))?;
            bag.insert(name.clone(), self.by_tag(tag)?.decode(value)?);
        }
        Ok(bag)
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("tags", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Maps events to backend documents and back
#[derive(Debug, Default)]
pub struct EventDocMapper {
    codecs: CodecRegistry,
}

impl EventDocMapper {
    /// Mapper with the built-in codec set
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper with a custom codec registry
    pub fn with_codecs(codecs: CodecRegistry) -> Self {
        Self { codecs }
    }

    /// Convert an event to its backend document body.
    ///
    /// The event id is not part of the body; the backend carries it as the
    /// document id.
    pub fn to_document(&self, event: &Event) -> Result<Value, ConvertError> {
        let entries = event
            .entries
            .iter()
            .map(|entry| self.entry_to_value(entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(json!({
            FIELD_SNIFFER_ID: event.sniffer_id.0,
            FIELD_SOURCE_ID: event.source_id.0,
            FIELD_LOG_PATH: event.log_path,
            FIELD_PUBLISHED: event.published.timestamp_millis(),
            FIELD_ENTRIES: entries,
            FIELD_FIELDS: self.codecs.encode_bag(&event.fields)?,
        }))
    }

    /// Reconstruct an event from a stored document
    pub fn from_document(&self, document: &Document) -> Result<Event, ConvertError> {
        let body = &document.body;

        let sniffer_id = require_u64(body, FIELD_SNIFFER_ID)?;
        let source_id = require_u64(body, FIELD_SOURCE_ID)?;
        let log_path = require_str(body, FIELD_LOG_PATH)?;
        let published_millis = body
            .get(FIELD_PUBLISHED)
            .and_then(Value::as_i64)
            .ok_or_else(|| ConvertError::MissingField(FIELD_PUBLISHED.to_string()))?;

        let entries = body
            .get(FIELD_ENTRIES)
            .and_then(Value::as_array)
            .ok_or_else(|| ConvertError::MissingField(FIELD_ENTRIES.to_string()))?
            .iter()
            .map(|raw| self.entry_from_value(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let fields = match body.get(FIELD_FIELDS) {
            Some(raw) => self.codecs.decode_bag(raw)?,
            None => FieldBag::new(),
        };

        Ok(Event {
            id: Some(EventId(document.id.clone())),
            sniffer_id: SnifferId(sniffer_id),
            source_id: SourceId(source_id),
            log_path: log_path.to_string(),
            published: decode_millis(FIELD_PUBLISHED, published_millis)?,
            entries,
            fields,
        })
    }

    fn entry_to_value(&self, entry: &LogEntry) -> Result<Value, ConvertError> {
        Ok(json!({
            ENTRY_RAW_CONTENT: entry.raw_content,
            ENTRY_START: entry.start.to_portable(),
            ENTRY_END: entry.end.to_portable(),
            FIELD_FIELDS: self.codecs.encode_bag(&entry.fields)?,
        }))
    }

    fn entry_from_value(&self, raw: &Value) -> Result<LogEntry, ConvertError> {
        let raw_content = require_str(raw, ENTRY_RAW_CONTENT)?;
        let start = LogPointer::from_portable(require_str(raw, ENTRY_START)?)?;
        let end = LogPointer::from_portable(require_str(raw, ENTRY_END)?)?;

        let mut entry = LogEntry::new(raw_content, start, end);
        if let Some(fields) = raw.get(FIELD_FIELDS) {
            entry.fields = self.codecs.decode_bag(fields)?;
        }
        Ok(entry)
    }
}

fn require_str<'a>(body: &'a Value, field: &str) -> Result<&'a str, ConvertError> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ConvertError::MissingField(field.to_string()))
}

fn require_u64(body: &Value, field: &str) -> Result<u64, ConvertError> {
    body.get(field)
        .and_then(Value::as_u64)
        .ok_or_else(|| ConvertError::MissingField(field.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_event() -> Event {
        Event::new(SnifferId(7), SourceId(3), "/var/log/app.log")
            .with_published(Utc.timestamp_millis_opt(100_000).unwrap())
            .with_entry(
                LogEntry::new("1", LogPointer::new(0, 1), LogPointer::new(1, 1))
                    .with_field("f1", Utc.timestamp_millis_opt(0).unwrap()),
            )
            .with_entry(LogEntry::new("2", LogPointer::new(1, 2), LogPointer::new(2, 2)))
            .with_field("my", "value")
            .with_field("count", 42i64)
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let mapper = EventDocMapper::new();
        let event = sample_event();

        let body = mapper.to_document(&event).unwrap();
        let restored = mapper
            .from_document(&Document {
                id: "abc".to_string(),
                body,
            })
            .unwrap();

        assert_eq!(restored.id, Some(EventId::from("abc")));
        assert_eq!(restored.sniffer_id, event.sniffer_id);
        assert_eq!(restored.source_id, event.source_id);
        assert_eq!(restored.log_path, event.log_path);
        assert_eq!(restored.published, event.published);
        assert_eq!(restored.entries, event.entries);
        assert_eq!(restored.fields, event.fields);
    }

    #[test]
    fn test_timestamp_millis_precision() {
        let mapper = EventDocMapper::new();
        let at = Utc.timestamp_millis_opt(1_234_567_890_123).unwrap();
        let event = sample_event().with_field("at", at);

        let body = mapper.to_document(&event).unwrap();
        let restored = mapper
            .from_document(&Document {
                id: "x".to_string(),
                body,
            })
            .unwrap();

        assert_eq!(restored.field("at"), Some(&FieldValue::Timestamp(at)));
    }

    #[test]
    fn test_entry_order_preserved() {
        let mapper = EventDocMapper::new();
        let body = mapper.to_document(&sample_event()).unwrap();
        let restored = mapper
            .from_document(&Document {
                id: "x".to_string(),
                body,
            })
            .unwrap();

        let raw: Vec<_> = restored.entries.iter().map(|e| e.raw_content.as_str()).collect();
        assert_eq!(raw, vec!["1", "2"]);
    }

    #[test]
    fn test_pointer_portable_form_survives() {
        let mapper = EventDocMapper::new();
        let event = sample_event();
        let body = mapper.to_document(&event).unwrap();
        let restored = mapper
            .from_document(&Document {
                id: "x".to_string(),
                body,
            })
            .unwrap();

        assert_eq!(
            restored.entries[0].start.to_portable(),
            event.entries[0].start.to_portable()
        );
        assert_eq!(
            restored.entries[0].end.to_portable(),
            event.entries[0].end.to_portable()
        );
    }

    #[test]
    fn test_bag_keys_cannot_collide_with_fixed_attributes() {
        let mapper = EventDocMapper::new();
        // A bag key named like a fixed attribute lands under "fields"
        let event = sample_event().with_field("snifferId", "not an id");

        let body = mapper.to_document(&event).unwrap();
        assert_eq!(body.get(FIELD_SNIFFER_ID), Some(&json!(7)));

        let restored = mapper
            .from_document(&Document {
                id: "x".to_string(),
                body,
            })
            .unwrap();
        assert_eq!(restored.sniffer_id, SnifferId(7));
        assert_eq!(restored.field("snifferId"), Some(&FieldValue::from("not an id")));
    }

    #[test]
    fn test_corrupt_document_is_convert_error() {
        let mapper = EventDocMapper::new();

        let missing = mapper.from_document(&Document {
            id: "x".to_string(),
            body: json!({ "logPath": "p" }),
        });
        assert!(matches!(missing, Err(ConvertError::MissingField(_))));

        let bad_tag = mapper.from_document(&Document {
            id: "x".to_string(),
            body: json!({
                FIELD_SNIFFER_ID: 1,
                FIELD_SOURCE_ID: 1,
                FIELD_LOG_PATH: "p",
                FIELD_PUBLISHED: 0,
                FIELD_ENTRIES: [],
                FIELD_FIELDS: { "k": { "type": "blob", "value": 1 } },
            }),
        });
        assert!(matches!(bad_tag, Err(ConvertError::UnknownTag(_))));

        let bad_pointer = mapper.from_document(&Document {
            id: "x".to_string(),
            body: json!({
                FIELD_SNIFFER_ID: 1,
                FIELD_SOURCE_ID: 1,
                FIELD_LOG_PATH: "p",
                FIELD_PUBLISHED: 0,
                FIELD_ENTRIES: [
                    { "rawContent": "r", "start": "garbage", "end": "{\"o\":1,\"s\":1}" }
                ],
                FIELD_FIELDS: {},
            }),
        });
        assert!(matches!(bad_pointer, Err(ConvertError::Pointer(_))));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let mapper = EventDocMapper::new();
        let event = sample_event().with_field("ratio", f64::NAN);
        assert!(matches!(
            mapper.to_document(&event),
            Err(ConvertError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_custom_codec_extends_registry() {
        struct UppercaseTextCodec;

        impl FieldCodec for UppercaseTextCodec {
            fn tag(&self) -> &'static str {
                "text"
            }

            fn encode(&self, value: &FieldValue) -> Result<Value, ConvertError> {
                match value {
                    FieldValue::Text(text) => Ok(json!(text.to_uppercase())),
                    other => Err(ConvertError::invalid("text", format!("{other:?}"))),
                }
            }

            fn decode(&self, raw: &Value) -> Result<FieldValue, ConvertError> {
                raw.as_str()
                    .map(|s| FieldValue::Text(s.to_string()))
                    .ok_or_else(|| ConvertError::invalid("text", "expected string"))
            }
        }

        let mut codecs = CodecRegistry::with_defaults();
        codecs.register(Arc::new(UppercaseTextCodec));
        let mapper = EventDocMapper::with_codecs(codecs);

        let event = sample_event();
        let body = mapper.to_document(&event).unwrap();
        let stored = body
            .get(FIELD_FIELDS)
            .and_then(|f| f.get("my"))
            .and_then(|f| f.get("value"))
            .and_then(Value::as_str);
        assert_eq!(stored, Some("VALUE"));
    }
}
