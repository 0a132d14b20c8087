// SPDX-License-Identifier: MIT OR Apache-2.0
//! Socket definitions and the value type lattice.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value types that can flow along an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// 4D vector / color
    Vec4,
}

impl ValueType {
    /// Number of scalar lanes in this type.
    pub fn lanes(self) -> usize {
        match self {
            Self::Bool | Self::Int | Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    /// Whether this is a vector type.
    pub fn is_vector(self) -> bool {
        matches!(self, Self::Vec2 | Self::Vec3 | Self::Vec4)
    }

    /// The vector type with the given number of lanes, if any.
    pub fn vector(lanes: usize) -> Option<Self> {
        match lanes {
            2 => Some(Self::Vec2),
            3 => Some(Self::Vec3),
            4 => Some(Self::Vec4),
            _ => None,
        }
    }

    /// Lowercase display name, as used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
        }
    }

    /// Color for sockets and edges of this type (UI palette hint).
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::Bool => [121, 85, 72],
            Self::Int => [156, 39, 176],
            Self::Float => [156, 39, 176],
            Self::Vec2 => [33, 150, 243],
            Self::Vec3 => [255, 193, 7],
            Self::Vec4 => [233, 30, 99],
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::error::Error for ValueType {}

/// How a source value type may feed a target value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Types are identical.
    Identity,
    /// Integer widened to float.
    IntToFloat,
    /// Scalar replicated into every lane of the target vector.
    Broadcast,
    /// Wider vector truncated to the target's leading lanes.
    Truncate,
}

/// Resolve the coercion from `source` into `target`, if one exists.
///
/// The lattice is deliberately small: scalars broadcast into vectors,
/// wider vectors truncate into narrower ones, and `bool` connects only
/// to `bool`. Feeding a narrow vector into a wider one is an error -
/// padding is never implicit.
pub fn coercion(source: ValueType, target: ValueType) -> Option<Coercion> {
    if source == target {
        return Some(Coercion::Identity);
    }
    match (source, target) {
        (ValueType::Int, ValueType::Float) => Some(Coercion::IntToFloat),
        (ValueType::Float | ValueType::Int, t) if t.is_vector() => Some(Coercion::Broadcast),
        (s, t) if s.is_vector() && t.is_vector() && t.lanes() < s.lanes() => {
            Some(Coercion::Truncate)
        }
        _ => None,
    }
}

/// A concrete value held in a node property or constant expression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector
    Vec3([f32; 3]),
    /// 4D vector / color
    Vec4([f32; 4]),
    /// Reference to an external asset (e.g. a texture). Not connectable;
    /// consumed directly by the node that owns the property.
    Asset(Uuid),
}

impl Value {
    /// The lattice type of this value, or `None` for asset references.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Bool(_) => Some(ValueType::Bool),
            Self::Int(_) => Some(ValueType::Int),
            Self::Float(_) => Some(ValueType::Float),
            Self::Vec2(_) => Some(ValueType::Vec2),
            Self::Vec3(_) => Some(ValueType::Vec3),
            Self::Vec4(_) => Some(ValueType::Vec4),
            Self::Asset(_) => None,
        }
    }

    /// The zero value of a lattice type.
    pub fn zero(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Bool => Self::Bool(false),
            ValueType::Int => Self::Int(0),
            ValueType::Float => Self::Float(0.0),
            ValueType::Vec2 => Self::Vec2([0.0; 2]),
            ValueType::Vec3 => Self::Vec3([0.0; 3]),
            ValueType::Vec4 => Self::Vec4([0.0; 4]),
        }
    }

    /// View the value as scalar lanes. Booleans read as 0/1.
    pub fn components(&self) -> ([f32; 4], usize) {
        match self {
            Self::Bool(b) => ([f32::from(u8::from(*b)), 0.0, 0.0, 0.0], 1),
            Self::Int(i) => ([*i as f32, 0.0, 0.0, 0.0], 1),
            Self::Float(f) => ([*f, 0.0, 0.0, 0.0], 1),
            Self::Vec2(v) => ([v[0], v[1], 0.0, 0.0], 2),
            Self::Vec3(v) => ([v[0], v[1], v[2], 0.0], 3),
            Self::Vec4(v) => (*v, 4),
            Self::Asset(_) => ([0.0; 4], 1),
        }
    }

    /// A single scalar lane, clamped to the last lane when out of range.
    pub fn component(&self, index: usize) -> f32 {
        let (lanes, count) = self.components();
        lanes[index.min(count.saturating_sub(1))]
    }

    /// Rebuild a float-laned value with the given lane count.
    pub fn from_components(lanes: [f32; 4], count: usize) -> Self {
        match count {
            2 => Self::Vec2([lanes[0], lanes[1]]),
            3 => Self::Vec3([lanes[0], lanes[1], lanes[2]]),
            4 => Self::Vec4(lanes),
            _ => Self::Float(lanes[0]),
        }
    }
}

/// Declared type of a socket: a concrete lattice type, or generic.
///
/// Generic sockets are how polymorphic math nodes (`add`, `mix`, ...)
/// accept any lane width; the compiler resolves them per instance from
/// the actual upstream types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocketType {
    /// Fixed value type.
    Concrete(ValueType),
    /// Resolved per node instance during compilation.
    Generic,
}

impl SocketType {
    /// The concrete type, if declared.
    pub fn concrete(self) -> Option<ValueType> {
        match self {
            Self::Concrete(t) => Some(t),
            Self::Generic => None,
        }
    }

    /// Whether an edge between two declared socket types is plausible.
    /// Generic sockets defer the decision to compile time.
    pub fn can_connect_to(self, target: Self) -> bool {
        match (self.concrete(), target.concrete()) {
            (Some(s), Some(t)) => coercion(s, t).is_some(),
            _ => true,
        }
    }
}

impl std::fmt::Display for SocketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for SocketType {}

/// An input socket on a node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSocket {
    /// Stable socket identifier, also the property key for the unconnected
    /// fallback value.
    pub id: String,
    /// Display label
    pub label: String,
    /// Declared type
    pub socket_type: SocketType,
}

impl InputSocket {
    /// Create an input socket with a concrete type.
    pub fn new(id: impl Into<String>, label: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            socket_type: SocketType::Concrete(value_type),
        }
    }

    /// Create a generic (polymorphic) input socket.
    pub fn generic(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            socket_type: SocketType::Generic,
        }
    }
}

/// An output socket on a node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSocket {
    /// Stable socket identifier
    pub id: String,
    /// Display label
    pub label: String,
    /// Declared type
    pub socket_type: SocketType,
    /// When set, this output extracts a single scalar lane from the node's
    /// primary output (swizzle-style `.x`/`.y`/... sockets).
    pub component: Option<usize>,
}

impl OutputSocket {
    /// Create an output socket with a concrete type.
    pub fn new(id: impl Into<String>, label: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            socket_type: SocketType::Concrete(value_type),
            component: None,
        }
    }

    /// Create a generic output socket (type follows the node's resolved type).
    pub fn generic(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            socket_type: SocketType::Generic,
            component: None,
        }
    }

    /// Create a float output that extracts one lane of the primary output.
    pub fn component(id: impl Into<String>, label: impl Into<String>, index: usize) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            socket_type: SocketType::Concrete(ValueType::Float),
            component: Some(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercion_table() {
        assert_eq!(
            coercion(ValueType::Float, ValueType::Float),
            Some(Coercion::Identity)
        );
        assert_eq!(
            coercion(ValueType::Int, ValueType::Float),
            Some(Coercion::IntToFloat)
        );
        assert_eq!(
            coercion(ValueType::Float, ValueType::Vec3),
            Some(Coercion::Broadcast)
        );
        assert_eq!(
            coercion(ValueType::Int, ValueType::Vec2),
            Some(Coercion::Broadcast)
        );
        assert_eq!(
            coercion(ValueType::Vec4, ValueType::Vec2),
            Some(Coercion::Truncate)
        );
        // Padding is never implicit
        assert_eq!(coercion(ValueType::Vec2, ValueType::Vec3), None);
        // Lossy scalar narrowing is rejected
        assert_eq!(coercion(ValueType::Float, ValueType::Int), None);
        // Bool connects only to bool
        assert_eq!(coercion(ValueType::Bool, ValueType::Float), None);
        assert_eq!(coercion(ValueType::Float, ValueType::Bool), None);
        // Vectors never collapse to scalars implicitly
        assert_eq!(coercion(ValueType::Vec3, ValueType::Float), None);
    }

    #[test]
    fn test_value_components() {
        let v = Value::Vec3([1.0, 2.0, 3.0]);
        assert_eq!(v.component(0), 1.0);
        assert_eq!(v.component(2), 3.0);
        assert_eq!(v.value_type(), Some(ValueType::Vec3));
        assert_eq!(Value::Bool(true).components().0[0], 1.0);
        assert_eq!(Value::from_components([5.0, 6.0, 0.0, 0.0], 2), Value::Vec2([5.0, 6.0]));
    }

    #[test]
    fn test_socket_type_connectivity() {
        let f = SocketType::Concrete(ValueType::Float);
        let v3 = SocketType::Concrete(ValueType::Vec3);
        let b = SocketType::Concrete(ValueType::Bool);
        assert!(f.can_connect_to(v3));
        assert!(!v3.can_connect_to(f));
        assert!(!b.can_connect_to(f));
        assert!(SocketType::Generic.can_connect_to(f));
        assert!(v3.can_connect_to(SocketType::Generic));
    }
}
