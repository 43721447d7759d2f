//! The basic building block of the template language: the value.
//! All values like floats, integers, strings, lists and hashes are
//! represented using the value.
//!
//! This allows operations across data types, like comparing integers to
//! floats, or accessing hash keys dynamically.
use super::super::Error;

use std::cmp::Ordering;
use std::collections::HashMap;

/// A constant value, e.g. `5` or `"hello world"`.
#[derive(Debug, PartialEq, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    List(Vec<Value>),
    Hash(HashMap<String, Value>),
    Null,
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => i1.partial_cmp(i2),
            (Value::Integer(i1), Value::Float(f2)) => (*i1 as f64).partial_cmp(f2),
            (Value::Float(f1), Value::Integer(i2)) => f1.partial_cmp(&(*i2 as f64)),
            (Value::Float(f1), Value::Float(f2)) => f1.partial_cmp(f2),
            (Value::String(s1), Value::String(s2)) => s1.partial_cmp(s2),
            (Value::Boolean(b1), Value::Boolean(b2)) => b1.partial_cmp(b2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::List(l) => {
                for v in l.iter() {
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
            Value::Hash(h) => {
                let mut keys = h.keys().collect::<Vec<_>>();
                keys.sort();
                write!(f, "{{")?;
                for (i, k) in keys.iter().enumerate() {
                    write!(f, "{}: {}", k, h[*k])?;
                    if i < keys.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "}}")
            }
            // Null renders as nothing; templates print missing values
            // all the time.
            Value::Null => Ok(()),
        }
    }
}

impl Value {
    /// If the value, when evaluated in the context of an `if` statement,
    /// would result in the `if` branch being executed.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Null => false,
            Value::List(list) => !list.is_empty(),
            Value::Hash(hash) => !hash.is_empty(),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Value::Integer(i1 + i2),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 + f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 + *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 + f2),
            (Value::String(s1), Value::String(s2)) => Value::String(format!("{}{}", s1, s2)),
            (Value::String(s1), Value::Integer(i2)) => Value::String(format!("{}{}", s1, i2)),
            (Value::Integer(i1), Value::String(s2)) => Value::String(format!("{}{}", i1, s2)),
            (Value::List(list), other) => {
                let mut list = list.clone();
                list.push(other.clone());
                Value::List(list)
            }
            _ => Value::Null,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Value::Integer(i1 - i2),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 - f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 - *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 - f2),
            _ => Value::Null,
        }
    }

    pub fn div(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) if *i2 != 0 => Value::Integer(i1 / i2),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 / f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 / *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 / f2),
            _ => Value::Null,
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) => Value::Integer(i1 * i2),
            (Value::Integer(i1), Value::Float(f2)) => Value::Float(*i1 as f64 * f2),
            (Value::Float(f1), Value::Integer(i2)) => Value::Float(f1 * *i2 as f64),
            (Value::Float(f1), Value::Float(f2)) => Value::Float(f1 * f2),
            (Value::String(s1), Value::Integer(i1)) => Value::String(s1.repeat(*i1 as usize)),
            _ => Value::Null,
        }
    }

    pub fn rem(&self, other: &Self) -> Self {
        match (self, other) {
            (Value::Integer(i1), Value::Integer(i2)) if *i2 != 0 => Value::Integer(i1 % i2),
            _ => Value::Null,
        }
    }

    /// Dot-accessor dispatch: hash keys, list indexes and a small set of
    /// built-in methods, e.g. `{{ collection.products.size }}`.
    pub fn call(&self, method_name: &str) -> Result<Self, Error> {
        Ok(match self {
            Value::Integer(value) => match method_name {
                "abs" => Value::Integer((*value).abs()),
                "to_s" | "to_string" => Value::String(value.to_string()),
                "to_f" => Value::Float(*value as f64),
                _ => return Err(Error::UnknownMethod(method_name.into())),
            },

            Value::Float(value) => match method_name {
                "abs" => Value::Float(value.abs()),
                "ceil" => Value::Float(value.ceil()),
                "floor" => Value::Float(value.floor()),
                "round" => Value::Float(value.round()),
                "to_s" | "to_string" => Value::String(value.to_string()),
                "to_i" => Value::Integer(*value as i64),
                _ => return Err(Error::UnknownMethod(method_name.into())),
            },

            Value::String(value) => match method_name {
                "upcase" => Value::String(value.to_uppercase()),
                "downcase" => Value::String(value.to_lowercase()),
                "capitalize" => Value::String(crate::capitalize(value)),
                "strip" | "trim" => Value::String(value.trim().to_string()),
                "size" => Value::Integer(value.chars().count() as i64),
                _ => return Err(Error::UnknownMethod(method_name.into())),
            },

            Value::List(list) => match method_name.parse::<i64>() {
                Ok(index) => match list.get(index as usize) {
                    Some(value) => value.clone(),
                    None => Value::Null,
                },

                Err(_) => match method_name {
                    "first" => list.first().cloned().unwrap_or(Value::Null),
                    "last" => list.last().cloned().unwrap_or(Value::Null),
                    "size" | "len" => Value::Integer(list.len() as i64),
                    "empty" => Value::Boolean(list.is_empty()),
                    "reverse" => Value::List(list.iter().rev().cloned().collect()),
                    _ => return Err(Error::UnknownMethod(method_name.into())),
                },
            },

            Value::Hash(hash) => match method_name {
                "keys" => {
                    let mut keys = hash.keys().cloned().collect::<Vec<_>>();
                    keys.sort();
                    Value::List(keys.into_iter().map(Value::String).collect())
                }
                "size" => Value::Integer(hash.len() as i64),
                key => match hash.get(key) {
                    Some(value) => value.clone(),
                    None => Value::Null,
                },
            },

            // Anything on null is null, e.g. `{{ product.vendor }}`
            // when no product is in scope.
            Value::Null => Value::Null,

            _ => return Err(Error::UnknownMethod(method_name.into())),
        })
    }

    pub fn to_vec(self) -> Vec<Value> {
        match self {
            Value::List(list) => list,
            Value::Null => vec![],
            value => vec![value],
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Boolean(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(list) => Value::List(list.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Hash(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        Value::from(value.clone())
    }
}

/// Convert Rust types to template values.
pub trait ToValue: Clone {
    fn to_value(&self) -> Result<Value, Error>;
}

impl ToValue for String {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::String(self.clone()))
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::String(self.to_string()))
    }
}

macro_rules! impl_integer {
    ($ty:ty) => {
        impl ToValue for $ty {
            fn to_value(&self) -> Result<Value, Error> {
                Ok(Value::Integer(*self as i64))
            }
        }
    };
}

impl_integer!(i64);
impl_integer!(i32);
impl_integer!(i16);
impl_integer!(u64); // Could very much overflow
impl_integer!(u32);
impl_integer!(usize);

impl ToValue for f64 {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Float(*self))
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::Boolean(*self))
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(self.clone())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Result<Value, Error> {
        let mut list = vec![];

        for value in self.iter() {
            list.push(value.to_value()?);
        }

        Ok(Value::List(list))
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Result<Value, Error> {
        Ok(Value::from(self.clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_truthy() {
        assert!(Value::Integer(5).truthy());
        assert!(!Value::Integer(0).truthy());
        assert!(!Value::String("".into()).truthy());
        assert!(!Value::Null.truthy());
        assert!(Value::List(vec![Value::Null]).truthy());
    }

    #[test]
    fn test_hash_access() {
        let hash = Value::Hash(HashMap::from([(
            "title".to_string(),
            Value::String("Shoes".into()),
        )]));

        assert_eq!(hash.call("title").unwrap(), Value::String("Shoes".into()));
        assert_eq!(hash.call("missing").unwrap(), Value::Null);
        assert_eq!(Value::Null.call("anything").unwrap(), Value::Null);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"price": 2999, "tags": ["a", "b"], "sale": true});
        let value = Value::from(json);

        assert_eq!(value.call("price").unwrap(), Value::Integer(2999));
        assert_eq!(
            value.call("tags").unwrap().call("size").unwrap(),
            Value::Integer(2)
        );
    }

    #[test]
    fn test_null_renders_empty() {
        assert_eq!(Value::Null.to_string(), "");
    }
}
