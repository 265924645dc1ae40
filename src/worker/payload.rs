use serde_json::{Map, Value};

use crate::config::{NotificationDefaults, PayloadField, WorkerConfig};
use crate::types::push::{
    NotificationData, NotificationDescriptor, NotificationOptions, PushPayload,
};

/// Outcome of reading the bytes attached to a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedPayload {
    Payload(PushPayload),
    /// No data, data that is not JSON, or JSON that is not an object.
    Empty,
}

impl DecodedPayload {
    pub fn decode(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data else {
            return DecodedPayload::Empty;
        };
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(fields)) => DecodedPayload::Payload(PushPayload {
                title: string_field(&fields, "title"),
                body: string_field(&fields, "body"),
                url: string_field(&fields, "url"),
            }),
            Ok(other) => {
                tracing::debug!(kind = json_kind(&other), "push payload is not an object");
                DecodedPayload::Empty
            }
            Err(err) => {
                tracing::debug!(%err, "push payload is not valid JSON");
                DecodedPayload::Empty
            }
        }
    }

    fn value(&self, field: PayloadField) -> Option<&str> {
        let DecodedPayload::Payload(payload) = self else {
            return None;
        };
        match field {
            PayloadField::Title => payload.title.as_deref(),
            PayloadField::Body => payload.body.as_deref(),
            PayloadField::Url => payload.url.as_deref(),
        }
    }

    /// The payload value when it is a non-empty string, the table default
    /// otherwise.
    pub fn resolve<'a>(&'a self, field: PayloadField, defaults: &'a NotificationDefaults) -> &'a str {
        self.value(field)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| defaults.get(field))
    }

    pub fn to_descriptor(&self, config: &WorkerConfig) -> NotificationDescriptor {
        let [title, body, url] =
            PayloadField::ALL.map(|field| self.resolve(field, &config.defaults).to_string());
        NotificationDescriptor {
            title,
            options: NotificationOptions {
                body,
                icon: config.icon.clone(),
                badge: config.badge.clone(),
                tag: config.tag.clone(),
                renotify: true,
                data: NotificationData { url },
            },
        }
    }
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_string)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
