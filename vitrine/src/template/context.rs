//! Variable scope a template is evaluated against.
use super::{Error, ToValue, Value};
use std::collections::HashMap;
use std::ops::Index;

#[derive(Debug, Default, Clone)]
pub struct Context {
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: impl ToValue) -> Result<&mut Self, Error> {
        self.values.insert(key.to_string(), value.to_value()?);
        Ok(self)
    }
}

impl TryFrom<HashMap<String, Value>> for Context {
    type Error = Error;

    fn try_from(values: HashMap<String, Value>) -> Result<Context, Self::Error> {
        Ok(Context { values })
    }
}

impl TryFrom<serde_json::Value> for Context {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Context, Self::Error> {
        match Value::from(value) {
            Value::Hash(values) => Ok(Context { values }),
            _ => Err(Error::Runtime(
                "a context can only be built from a JSON object".into(),
            )),
        }
    }
}

impl Index<&str> for Context {
    type Output = Value;

    fn index(&self, key: &str) -> &Self::Output {
        self.values.get(key).unwrap_or(&Value::Null)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_context_set_get() {
        let mut context = Context::default();
        context.set("test", "value").unwrap();

        assert_eq!(context["test"], Value::String("value".to_string()));
        assert_eq!(context["missing"], Value::Null);
    }

    #[test]
    fn test_context_from_json() {
        let context =
            Context::try_from(serde_json::json!({"shop": {"name": "Preview"}})).unwrap();
        assert_eq!(
            context["shop"].call("name").unwrap(),
            Value::String("Preview".into())
        );
    }
}
