//! Catalogue of the ROS message and service types known to the compiler.
//!
//! Types may be spelled either `pkg/Name` or `pkg/msg/Name` (`pkg/srv/Name` for services).

use crate::expression::Value;

/// The primitive types of interface fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `bool`
    Boolean,
    /// Any of the ROS (unsigned) integer types.
    Integer,
    /// `float32` and `float64`.
    Float,
    /// `string`
    String,
}

impl FieldType {
    /// Expression giving the value a field of this type takes when not yet assigned.
    pub fn default_expr(&self) -> &'static str {
        match self {
            FieldType::Boolean => "false",
            FieldType::Integer => "0",
            FieldType::Float => "0.0",
            FieldType::String => "\"\"",
        }
    }

    /// The ROS name of the type, used to annotate generated data.
    pub fn ros_name(&self) -> &'static str {
        match self {
            FieldType::Boolean => "bool",
            FieldType::Integer => "int64",
            FieldType::Float => "float64",
            FieldType::String => "string",
        }
    }

    /// Whether the value belongs to this type.
    ///
    /// Integers are admitted as floats, as ECMAScript does not tell them apart.
    pub fn admits(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::Boolean, Value::Boolean(_))
                | (FieldType::Integer, Value::Integer(_))
                | (FieldType::Float, Value::Float(_) | Value::Integer(_))
                | (FieldType::String, Value::String(_))
        )
    }
}

/// A named and typed field of a message, request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Name of the field.
    pub name: &'static str,
    /// Type of the field.
    pub field_type: FieldType,
}

const fn field(name: &'static str, field_type: FieldType) -> Field {
    Field { name, field_type }
}

const NO_FIELDS: &[Field] = &[];
const DATA_BOOL: &[Field] = &[field("data", FieldType::Boolean)];
const DATA_INT: &[Field] = &[field("data", FieldType::Integer)];
const DATA_FLOAT: &[Field] = &[field("data", FieldType::Float)];
const DATA_STRING: &[Field] = &[field("data", FieldType::String)];
const SUCCESS_MESSAGE: &[Field] = &[
    field("success", FieldType::Boolean),
    field("message", FieldType::String),
];
const ADD_TWO_INTS_REQ: &[Field] = &[
    field("a", FieldType::Integer),
    field("b", FieldType::Integer),
];
const ADD_TWO_INTS_RES: &[Field] = &[field("sum", FieldType::Integer)];

/// Splits `pkg/kind/Name` and `pkg/Name` into `(pkg, Name)`.
fn split_type<'a>(interface_type: &'a str, kind: &str) -> Option<(&'a str, &'a str)> {
    let mut parts = interface_type.split('/');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(pkg), Some(name), None, None) => Some((pkg, name)),
        (Some(pkg), Some(middle), Some(name), None) if middle == kind => Some((pkg, name)),
        _ => None,
    }
}

/// The fields of a message type, or `None` if the type is unknown.
///
/// ```
/// # use rosfm_core::interfaces::*;
/// let fields = message_fields("std_msgs/msg/Int32").unwrap();
/// assert_eq!(fields[0].name, "data");
/// assert_eq!(fields[0].field_type, FieldType::Integer);
/// assert!(message_fields("std_msgs/Pose").is_none());
/// ```
pub fn message_fields(interface_type: &str) -> Option<&'static [Field]> {
    match split_type(interface_type, "msg")? {
        ("std_msgs", "Bool") => Some(DATA_BOOL),
        ("std_msgs", "Empty") => Some(NO_FIELDS),
        ("std_msgs", "String") => Some(DATA_STRING),
        (
            "std_msgs",
            "Int8" | "Int16" | "Int32" | "Int64" | "UInt8" | "UInt16" | "UInt32" | "UInt64",
        ) => Some(DATA_INT),
        ("std_msgs", "Float32" | "Float64") => Some(DATA_FLOAT),
        _ => None,
    }
}

/// The request and response fields of a service type, or `None` if the type is unknown.
pub fn service_fields(interface_type: &str) -> Option<(&'static [Field], &'static [Field])> {
    match split_type(interface_type, "srv")? {
        ("std_srvs", "Empty") => Some((NO_FIELDS, NO_FIELDS)),
        ("std_srvs" | "example_interfaces", "SetBool") => Some((DATA_BOOL, SUCCESS_MESSAGE)),
        ("std_srvs" | "example_interfaces", "Trigger") => Some((NO_FIELDS, SUCCESS_MESSAGE)),
        ("example_interfaces", "AddTwoInts") => Some((ADD_TWO_INTS_REQ, ADD_TWO_INTS_RES)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::OrderedFloat;

    #[test]
    fn service_spellings() {
        assert_eq!(
            service_fields("std_srvs/SetBool"),
            service_fields("std_srvs/srv/SetBool")
        );
        assert!(service_fields("std_srvs/msg/SetBool").is_none());
        assert!(service_fields("std_srvs/srv/SetBool/extra").is_none());
        let (req, res) = service_fields("example_interfaces/AddTwoInts").unwrap();
        assert_eq!(req.len(), 2);
        assert_eq!(res[0].name, "sum");
    }

    #[test]
    fn admitted_values() {
        assert!(FieldType::Float.admits(&Value::Integer(1)));
        assert!(FieldType::Float.admits(&Value::Float(OrderedFloat(0.5))));
        assert!(!FieldType::Integer.admits(&Value::Float(OrderedFloat(0.5))));
        assert!(!FieldType::Boolean.admits(&Value::String("false".to_owned())));
    }
}
