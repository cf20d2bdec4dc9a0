//! Marshaling between typed operation parameters and wire values.
//!
//! Every argument and every successful result travels as one [`Value`].
//! [`Marshal`] maps a Rust type onto exactly one variant; [`Returns`] maps an
//! operation's return type onto its result shape.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ShapeError;
use crate::types::{
    Append, Attributes, BatchMutation, Cell, ColumnDescriptor, Increment, Mutation, RegionInfo,
    RowResult, Scan, Text,
};

/// Conversion between a Rust type and its single [`Value`] variant
pub trait Marshal: Sized {
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    /// Hands the value back untouched when it holds another variant
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! define_values {
    ($($variant:ident($ty:ty) => $label:literal),* $(,)?) => {
        /// A single marshaled argument or result
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum Value {
            $($variant($ty),)*
        }

        /// The variant of a [`Value`], without its payload
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ValueKind {
            $($variant,)*
        }

        impl Value {
            pub fn kind(&self) -> ValueKind {
                match self {
                    $(Value::$variant(_) => ValueKind::$variant,)*
                }
            }
        }

        impl ValueKind {
            pub fn name(self) -> &'static str {
                match self {
                    $(ValueKind::$variant => $label,)*
                }
            }
        }

        $(
            impl Marshal for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(other),
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

define_values! {
    Bool(bool) => "bool",
    I32(i32) => "i32",
    I64(i64) => "i64",
    Binary(Vec<u8>) => "binary",
    BinaryList(Vec<Vec<u8>>) => "list<binary>",
    Attributes(Attributes) => "attributes",
    Cells(Vec<Cell>) => "list<cell>",
    Rows(Vec<RowResult>) => "list<row>",
    ColumnDescriptors(Vec<ColumnDescriptor>) => "list<column descriptor>",
    ColumnFamilies(BTreeMap<Text, ColumnDescriptor>) => "map<column descriptor>",
    Region(RegionInfo) => "region",
    Regions(Vec<RegionInfo>) => "list<region>",
    Mutation(Mutation) => "mutation",
    Mutations(Vec<Mutation>) => "list<mutation>",
    BatchMutations(Vec<BatchMutation>) => "list<batch mutation>",
    Increment(Increment) => "increment",
    Increments(Vec<Increment>) => "list<increment>",
    Scan(Scan) => "scan",
    Append(Append) => "append",
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Binary(v.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(v.to_vec())
    }
}

/// Checks that `values` has exactly the given kinds, in order
pub fn check_kinds(values: &[Value], kinds: &[ValueKind]) -> Result<(), ShapeError> {
    if values.len() != kinds.len() {
        return Err(ShapeError::Count {
            expected: kinds.len(),
            got: values.len(),
        });
    }
    for (index, (value, expected)) in values.iter().zip(kinds).enumerate() {
        if value.kind() != *expected {
            return Err(ShapeError::Kind {
                index,
                expected: *expected,
                got: value.kind(),
            });
        }
    }
    Ok(())
}

/// The success side of an operation's outcome: nothing, or a single value
pub trait Returns: Sized {
    const KINDS: &'static [ValueKind];

    fn into_values(self) -> Vec<Value>;

    fn from_values(values: Vec<Value>) -> Result<Self, ShapeError>;
}

impl Returns for () {
    const KINDS: &'static [ValueKind] = &[];

    fn into_values(self) -> Vec<Value> {
        Vec::new()
    }

    fn from_values(values: Vec<Value>) -> Result<Self, ShapeError> {
        check_kinds(&values, Self::KINDS)
    }
}

impl<T: Marshal> Returns for T {
    const KINDS: &'static [ValueKind] = &[T::KIND];

    fn into_values(self) -> Vec<Value> {
        vec![self.into_value()]
    }

    fn from_values(values: Vec<Value>) -> Result<Self, ShapeError> {
        let got = values.len();
        let mut values = values.into_iter();
        match (values.next(), values.next()) {
            (Some(value), None) => T::from_value(value).map_err(|other| ShapeError::Kind {
                index: 0,
                expected: T::KIND,
                got: other.kind(),
            }),
            _ => Err(ShapeError::Count { expected: 1, got }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_result_rejects_extra_values() {
        assert_eq!(<()>::from_values(vec![]), Ok(()));
        assert_eq!(
            <()>::from_values(vec![Value::Bool(true)]),
            Err(ShapeError::Count { expected: 0, got: 1 })
        );
    }

    #[test]
    fn single_result_checks_count_and_kind() {
        assert_eq!(bool::from_values(vec![Value::Bool(true)]), Ok(true));
        assert_eq!(
            bool::from_values(vec![]),
            Err(ShapeError::Count { expected: 1, got: 0 })
        );
        assert_eq!(
            bool::from_values(vec![Value::Bool(true), Value::Bool(false)]),
            Err(ShapeError::Count { expected: 1, got: 2 })
        );
        assert_eq!(
            bool::from_values(vec![Value::I64(1)]),
            Err(ShapeError::Kind {
                index: 0,
                expected: ValueKind::Bool,
                got: ValueKind::I64
            })
        );
    }

    #[test]
    fn check_kinds_reports_first_mismatch() {
        let values = vec![Value::from("t"), Value::I32(3), Value::I64(4)];
        let kinds = [ValueKind::Binary, ValueKind::I32, ValueKind::I32];
        assert_eq!(
            check_kinds(&values, &kinds),
            Err(ShapeError::Kind {
                index: 2,
                expected: ValueKind::I32,
                got: ValueKind::I64
            })
        );
    }

    #[test]
    fn value_survives_the_wire_encoding() {
        let mut families = BTreeMap::new();
        families.insert(b"cf".to_vec(), ColumnDescriptor::default());
        let value = Value::ColumnFamilies(families);

        let bytes = bincode::serialize(&value).unwrap();
        let decoded: Value = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.kind().to_string(), "map<column descriptor>");
    }
}
