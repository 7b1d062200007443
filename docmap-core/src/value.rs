//! Conversions between Rust values and BSON values.
//!
//! Accessors move property values around as [`Bson`]. Every field type of a mapped struct
//! implements [`BsonValue`]; numeric conversions accept any BSON number that fits the target
//! type without loss.

use std::collections::{BTreeMap, HashMap};

use bson::{Bson, DateTime, Document, oid::ObjectId};

use crate::error::{MappingError, MappingResult};

/// Converts a value to and from its BSON representation.
pub trait BsonValue: Sized {
    /// Converts this value into BSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no BSON representation.
    fn to_bson(&self) -> MappingResult<Bson>;

    /// Creates a value from BSON.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::Conversion`] if the BSON value has an incompatible type.
    fn from_bson(value: Bson) -> MappingResult<Self>;
}

/// Implements [`BsonValue`] through the type's serde implementations.
///
/// # Example
///
/// ```ignore
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// pub struct Address {
///     pub city: String,
/// }
///
/// docmap::bson_value_via_serde!(Address);
/// ```
#[macro_export]
macro_rules! bson_value_via_serde {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::value::BsonValue for $ty {
                fn to_bson(&self) -> $crate::error::MappingResult<$crate::bson::Bson> {
                    Ok($crate::bson::ser::serialize_to_bson(self)?)
                }

                fn from_bson(value: $crate::bson::Bson) -> $crate::error::MappingResult<Self> {
                    Ok($crate::bson::de::deserialize_from_bson(value)?)
                }
            }
        )*
    };
}

bson_value_via_serde!(bson::Uuid, uuid::Uuid);

/// Returns the value of a BSON number if it is integral.
pub(crate) fn integral(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
        _ => None,
    }
}

/// Returns the value of any BSON number.
pub(crate) fn floating(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

macro_rules! integral_value {
    ($($ty:ty => $variant:ident($repr:ty)),* $(,)?) => {
        $(
            impl BsonValue for $ty {
                fn to_bson(&self) -> MappingResult<Bson> {
                    Ok(Bson::$variant(<$repr>::from(*self)))
                }

                fn from_bson(value: Bson) -> MappingResult<Self> {
                    integral(&value)
                        .and_then(|v| <$ty>::try_from(v).ok())
                        .ok_or_else(|| MappingError::conversion(stringify!($ty), &value))
                }
            }
        )*
    };
}

integral_value!(
    u8 => Int32(i32),
    i16 => Int32(i32),
    i32 => Int32(i32),
    i64 => Int64(i64),
);

impl BsonValue for f64 {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::Double(*self))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        floating(&value).ok_or_else(|| MappingError::conversion("f64", &value))
    }
}

impl BsonValue for f32 {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::Double(f64::from(*self)))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        floating(&value)
            .map(|v| v as f32)
            .ok_or_else(|| MappingError::conversion("f32", &value))
    }
}

impl BsonValue for bool {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::Boolean(*self))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        match value {
            Bson::Boolean(v) => Ok(v),
            other => Err(MappingError::conversion("bool", &other)),
        }
    }
}

impl BsonValue for char {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::String(self.to_string()))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        if let Bson::String(s) = &value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(c);
            }
        }
        Err(MappingError::conversion("a single character", &value))
    }
}

impl BsonValue for String {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::String(self.clone()))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        match value {
            Bson::String(v) => Ok(v),
            other => Err(MappingError::conversion("string", &other)),
        }
    }
}

impl BsonValue for ObjectId {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::ObjectId(*self))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        match value {
            Bson::ObjectId(v) => Ok(v),
            other => Err(MappingError::conversion("object id", &other)),
        }
    }
}

impl BsonValue for DateTime {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::DateTime(*self))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        match value {
            Bson::DateTime(v) => Ok(v),
            other => Err(MappingError::conversion("datetime", &other)),
        }
    }
}

impl BsonValue for chrono::DateTime<chrono::Utc> {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::DateTime(DateTime::from_chrono(*self)))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        DateTime::from_bson(value).map(|v| v.to_chrono())
    }
}

impl BsonValue for Document {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::Document(self.clone()))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        match value {
            Bson::Document(v) => Ok(v),
            other => Err(MappingError::conversion("document", &other)),
        }
    }
}

impl BsonValue for Bson {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(self.clone())
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        Ok(value)
    }
}

impl<T: BsonValue> BsonValue for Option<T> {
    fn to_bson(&self) -> MappingResult<Bson> {
        match self {
            Some(value) => value.to_bson(),
            None => Ok(Bson::Null),
        }
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        match value {
            Bson::Null | Bson::Undefined => Ok(None),
            other => T::from_bson(other).map(Some),
        }
    }
}

impl<T: BsonValue> BsonValue for Vec<T> {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::Array(
            self.iter()
                .map(BsonValue::to_bson)
                .collect::<MappingResult<Vec<_>>>()?,
        ))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        match value {
            Bson::Array(items) => items.into_iter().map(T::from_bson).collect(),
            other => Err(MappingError::conversion("array", &other)),
        }
    }
}

impl<T: BsonValue> BsonValue for Box<[T]> {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::Array(
            self.iter()
                .map(BsonValue::to_bson)
                .collect::<MappingResult<Vec<_>>>()?,
        ))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        Vec::<T>::from_bson(value).map(Vec::into_boxed_slice)
    }
}

impl<T: BsonValue, const N: usize> BsonValue for [T; N] {
    fn to_bson(&self) -> MappingResult<Bson> {
        Ok(Bson::Array(
            self.iter()
                .map(BsonValue::to_bson)
                .collect::<MappingResult<Vec<_>>>()?,
        ))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        Vec::<T>::from_bson(value)?.try_into().map_err(|items: Vec<T>| {
            MappingError::Conversion(format!("expected {N} elements, found {}", items.len()))
        })
    }
}

impl<V: BsonValue> BsonValue for HashMap<String, V> {
    fn to_bson(&self) -> MappingResult<Bson> {
        let mut document = Document::new();
        for (key, value) in self {
            document.insert(key.clone(), value.to_bson()?);
        }
        Ok(Bson::Document(document))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        Document::from_bson(value)?
            .into_iter()
            .map(|(key, value)| V::from_bson(value).map(|value| (key, value)))
            .collect()
    }
}

impl<V: BsonValue> BsonValue for BTreeMap<String, V> {
    fn to_bson(&self) -> MappingResult<Bson> {
        let mut document = Document::new();
        for (key, value) in self {
            document.insert(key.clone(), value.to_bson()?);
        }
        Ok(Bson::Document(document))
    }

    fn from_bson(value: Bson) -> MappingResult<Self> {
        Document::from_bson(value)?
            .into_iter()
            .map(|(key, value)| V::from_bson(value).map(|value| (key, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_accept_lossless_numbers() {
        assert_eq!(i32::from_bson(Bson::Int64(7)).unwrap(), 7);
        assert_eq!(i64::from_bson(Bson::Double(3.0)).unwrap(), 3);
        assert!(i32::from_bson(Bson::Int64(i64::MAX)).is_err());
        assert!(u8::from_bson(Bson::Int32(-1)).is_err());
        assert!(i64::from_bson(Bson::Double(1.5)).is_err());
        assert!(i32::from_bson(Bson::String("1".to_string())).is_err());
    }

    #[test]
    fn test_option_maps_null() {
        assert_eq!(Option::<String>::from_bson(Bson::Null).unwrap(), None);
        assert_eq!(None::<i32>.to_bson().unwrap(), Bson::Null);
        assert_eq!(Some(4_i64).to_bson().unwrap(), Bson::Int64(4));
    }

    #[test]
    fn test_fixed_array_checks_length() {
        let value = Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)]);

        assert_eq!(<[i32; 2]>::from_bson(value.clone()).unwrap(), [1, 2]);
        assert!(matches!(
            <[i32; 3]>::from_bson(value),
            Err(MappingError::Conversion(_))
        ));
    }

    #[test]
    fn test_char_requires_single_character() {
        assert_eq!(char::from_bson(Bson::String("x".to_string())).unwrap(), 'x');
        assert!(char::from_bson(Bson::String("xy".to_string())).is_err());
        assert!(char::from_bson(Bson::String(String::new())).is_err());
    }

    #[test]
    fn test_string_maps_use_documents() {
        let mut scores = HashMap::new();
        scores.insert("math".to_string(), 90_i32);

        let value = scores.to_bson().unwrap();
        assert_eq!(value, Bson::Document(bson::doc! { "math": 90 }));
        assert!(HashMap::<String, i32>::from_bson(Bson::Int32(1)).is_err());
    }
}
