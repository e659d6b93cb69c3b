use crate::error::EngineError;

use super::{Settings, StorageError};

/// Conversion between a typed setting and its string form on the wire.
pub trait AttrValue: Clone + 'static {
    fn encode(&self) -> String;
    fn decode(raw: &str) -> Option<Self>;
}

impl AttrValue for bool {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw == "true")
    }
}

impl AttrValue for f64 {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl AttrValue for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

/// Typed handle bound to `(namespace, key)`; carries only the default.
#[derive(Debug, Clone)]
pub struct Attribute<T> {
    key: String,
    default: T,
}

pub type BooleanAttribute = Attribute<bool>;
pub type NumericAttribute = Attribute<f64>;
pub type StringAttribute = Attribute<String>;

impl<T: AttrValue> Attribute<T> {
    pub fn new(namespace: &str, key: &str, default: T) -> Self {
        Self {
            key: format!("{namespace}:{key}"),
            default,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn init(&self, settings: &mut Settings) -> Result<(), StorageError> {
        settings.init(&self.key, &self.default.encode())
    }

    /// Stored string, or the encoded default when the key was never written.
    pub fn raw(&self, settings: &Settings) -> String {
        settings
            .get(&self.key)
            .unwrap_or_else(|| self.default.encode())
    }

    /// Decoded value; falls back to the default when the stored text does not decode.
    pub fn get(&self, settings: &Settings) -> T {
        T::decode(&self.raw(settings)).unwrap_or_else(|| self.default.clone())
    }

    pub fn set(&self, settings: &mut Settings, value: T) -> Result<(), StorageError> {
        settings.set(&self.key, &value.encode())
    }

    /// Watchers only see values that decode.
    pub fn watch(&self, settings: &mut Settings, mut f: impl FnMut(T) + 'static) {
        settings.watch(&self.key, move |raw| {
            if let Some(v) = T::decode(raw) {
                f(v);
            }
        });
    }
}

impl NumericAttribute {
    /// Like `get`, but reports free-text garbage instead of hiding it.
    pub fn try_get(&self, settings: &Settings) -> Result<f64, EngineError> {
        let raw = self.raw(settings);
        f64::decode(&raw).ok_or_else(|| EngineError::InvalidNumericSetting {
            key: self.key.clone(),
            value: raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn missing_key_reads_default() {
        let settings = Settings::new(MemoryStore::new());
        let sens = NumericAttribute::new("game", "sens", 5.0);
        assert_eq!(sens.key(), "game:sens");
        assert_eq!(sens.get(&settings), 5.0);
    }

    #[test]
    fn boolean_round_trips_through_strings() {
        let mut settings = Settings::new(MemoryStore::new());
        let hint = BooleanAttribute::new("game", "hint", true);
        hint.set(&mut settings, false).unwrap();
        assert_eq!(settings.get("game:hint").as_deref(), Some("false"));
        assert!(!hint.get(&settings));
    }

    #[test]
    fn non_numeric_text_is_reported() {
        let mut settings = Settings::new(MemoryStore::from_pairs([("game:sens", "fast")]));
        let sens = NumericAttribute::new("game", "sens", 5.0);
        assert_eq!(sens.get(&settings), 5.0);

        let err = sens.try_get(&settings).unwrap_err();
        assert!(matches!(err, EngineError::InvalidNumericSetting { ref value, .. } if value == "fast"));

        sens.set(&mut settings, 2.5).unwrap();
        assert_eq!(sens.try_get(&settings).unwrap(), 2.5);
    }

    #[test]
    fn typed_watch_decodes() {
        let mut settings = Settings::new(MemoryStore::new());
        let mag = NumericAttribute::new("game", "mag", 0.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        mag.watch(&mut settings, move |v| sink.borrow_mut().push(v));

        settings.set("game:mag", "2").unwrap();
        settings.set("game:mag", "x").unwrap();
        mag.set(&mut settings, 3.0).unwrap();
        assert_eq!(*seen.borrow(), vec![2.0, 3.0]);
    }
}
