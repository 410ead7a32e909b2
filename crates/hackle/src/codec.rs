//! Bridging user types through their text or JSON codecs.
//!
//! The bridge cannot detect `FromStr`/`Display` or serde implementations
//! the way a runtime-reflective system would, so types opt in explicitly:
//!
//! ```
//! use std::fmt;
//! use std::str::FromStr;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Port(u16);
//!
//! impl FromStr for Port {
//!     type Err = std::num::ParseIntError;
//!     fn from_str(s: &str) -> Result<Self, Self::Err> {
//!         s.parse().map(Port)
//!     }
//! }
//!
//! impl fmt::Display for Port {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "{}", self.0)
//!     }
//! }
//!
//! hackle::text_codec!(Port);
//! ```
//!
//! After this, `Port` works anywhere a field type does: attribute values,
//! labels, defaults, and enums, always rendered as strings.

/// Implement the bridge for a type via its `FromStr` and `Display` impls.
///
/// The type also needs `Default`, which supplies the value of a missing
/// optional field.
#[macro_export]
macro_rules! text_codec {
    ($ty:ty) => {
        impl $crate::FromHcl for $ty {
            fn from_value(
                value: &$crate::Value,
                _cx: &$crate::UnmarshalContext,
            ) -> $crate::Result<Self> {
                let text = match value {
                    $crate::Value::Str(s) => s.value.clone(),
                    $crate::Value::Type(t) => t.name.clone(),
                    $crate::Value::Heredoc(h) => h.content(),
                    other => {
                        return Err($crate::Error::message(format!(
                            "expected a string but got {other}"
                        )))
                    }
                };
                text.parse::<$ty>().map_err(|err| {
                    $crate::Error::message(format!("invalid value: {err}"))
                        .with_pos(value.pos())
                })
            }

            fn from_missing(_cx: &$crate::UnmarshalContext) -> $crate::Result<Self> {
                Ok(<$ty as ::std::default::Default>::default())
            }

            fn parse_tag_value(raw: &str) -> $crate::Result<$crate::Value> {
                Ok($crate::Value::str(raw))
            }
        }

        impl $crate::ToHcl for $ty {
            fn to_value(&self, _cx: &$crate::MarshalContext) -> $crate::Result<$crate::Value> {
                Ok($crate::Value::str(self.to_string()))
            }

            fn is_zero(&self) -> bool {
                false
            }

            fn schema_value(_cx: &$crate::MarshalContext) -> $crate::Result<$crate::Value> {
                Ok($crate::Value::type_keyword("string"))
            }

            fn to_labels(&self) -> $crate::Result<::std::vec::Vec<::std::string::String>> {
                Ok(vec![self.to_string()])
            }
        }
    };
}

/// Implement the bridge for a type via its serde impls: values decode from
/// the attribute value's JSON rendering and encode as JSON strings.
///
/// The type also needs `Default`, which supplies the value of a missing
/// optional field.
#[macro_export]
macro_rules! json_codec {
    ($ty:ty) => {
        impl $crate::FromHcl for $ty {
            fn from_value(
                value: &$crate::Value,
                _cx: &$crate::UnmarshalContext,
            ) -> $crate::Result<Self> {
                $crate::serde_json::from_str::<$ty>(&value.to_string()).map_err(|err| {
                    $crate::Error::message(format!("invalid value: {err}"))
                        .with_pos(value.pos())
                })
            }

            fn from_missing(_cx: &$crate::UnmarshalContext) -> $crate::Result<Self> {
                Ok(<$ty as ::std::default::Default>::default())
            }

            fn parse_tag_value(raw: &str) -> $crate::Result<$crate::Value> {
                Ok($crate::Value::str(raw))
            }
        }

        impl $crate::ToHcl for $ty {
            fn to_value(&self, _cx: &$crate::MarshalContext) -> $crate::Result<$crate::Value> {
                let rendered = $crate::serde_json::to_string(self).map_err(|err| {
                    $crate::Error::message(format!("invalid value: {err}"))
                })?;
                Ok($crate::Value::str(rendered))
            }

            fn is_zero(&self) -> bool {
                false
            }

            fn schema_value(_cx: &$crate::MarshalContext) -> $crate::Result<$crate::Value> {
                Ok($crate::Value::type_keyword("string"))
            }
        }
    };
}
