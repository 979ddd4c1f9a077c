use serde_json::{Map, Value};

/// Section holding message overrides, keyed by message id (`gmfn-error-lat`).
const MESSAGES_SECTION: &str = "messages";

/// Site configuration supplied by the host wiki.
///
/// Only `messages.<id>` entries are read; anything else is carried along untouched so hosts can
/// keep one configuration object for several extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct MapfnConfig(Value);

impl Default for MapfnConfig {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl MapfnConfig {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Site text for message `id`, if the host overrides it.
    pub fn message_override(&self, id: &str) -> Option<&str> {
        self.0.get(MESSAGES_SECTION)?.get(id)?.as_str()
    }

    /// Layers `other` over this configuration. Objects merge key by key; any other value in
    /// `other` replaces the current one.
    pub fn merge(&mut self, other: &MapfnConfig) {
        merge_into(&mut self.0, &other.0);
    }
}

fn merge_into(base: &mut Value, layer: &Value) {
    let (Value::Object(base_map), Value::Object(layer_map)) = (&mut *base, layer) else {
        *base = layer.clone();
        return;
    };
    for (key, value) in layer_map {
        match base_map.get_mut(key) {
            Some(slot) => merge_into(slot, value),
            None => {
                base_map.insert(key.clone(), value.clone());
            }
        }
    }
}
