// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material archetypes and the standard node catalog.
//!
//! [`create_material_registry`] builds the full set of node types the
//! material editor offers, plus the palette categories for the UI.

use crate::expr::{GeometryInput, OpKind};
use crate::node::{NodeCategory, NodeRegistry, NodeRole, NodeType, PaletteEntry};
use crate::socket::{InputSocket, OutputSocket, Value, ValueType};
use indexmap::IndexMap;

/// One of the supported material shapes, each with a fixed channel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MaterialArchetype {
    /// PBR metallic/roughness material
    Standard,
    /// Extended PBR material (clearcoat, transmission, IOR)
    Physical,
    /// Unlit material
    Basic,
    /// Classic specular/shininess material
    Phong,
}

/// A named material channel an output node can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    /// Stable channel identifier (also the output node's socket id)
    pub id: &'static str,
    /// Display label
    pub label: &'static str,
    /// Channel value type
    pub value_type: ValueType,
}

const fn channel(id: &'static str, label: &'static str, value_type: ValueType) -> Channel {
    Channel {
        id,
        label,
        value_type,
    }
}

const STANDARD_CHANNELS: &[Channel] = &[
    channel("color", "Color", ValueType::Vec3),
    channel("roughness", "Roughness", ValueType::Float),
    channel("metalness", "Metalness", ValueType::Float),
    channel("normal", "Normal", ValueType::Vec3),
    channel("emissive", "Emissive", ValueType::Vec3),
    channel("ao", "AO", ValueType::Float),
    channel("opacity", "Opacity", ValueType::Float),
];

const PHYSICAL_CHANNELS: &[Channel] = &[
    channel("color", "Color", ValueType::Vec3),
    channel("roughness", "Roughness", ValueType::Float),
    channel("metalness", "Metalness", ValueType::Float),
    channel("normal", "Normal", ValueType::Vec3),
    channel("emissive", "Emissive", ValueType::Vec3),
    channel("ao", "AO", ValueType::Float),
    channel("opacity", "Opacity", ValueType::Float),
    channel("clearcoat", "Clearcoat", ValueType::Float),
    channel("clearcoat_roughness", "Clearcoat Roughness", ValueType::Float),
    channel("transmission", "Transmission", ValueType::Float),
    channel("thickness", "Thickness", ValueType::Float),
    channel("ior", "IOR", ValueType::Float),
];

const BASIC_CHANNELS: &[Channel] = &[
    channel("color", "Color", ValueType::Vec3),
    channel("opacity", "Opacity", ValueType::Float),
];

const PHONG_CHANNELS: &[Channel] = &[
    channel("color", "Color", ValueType::Vec3),
    channel("emissive", "Emissive", ValueType::Vec3),
    channel("specular", "Specular", ValueType::Vec3),
    channel("shininess", "Shininess", ValueType::Float),
    channel("opacity", "Opacity", ValueType::Float),
];

impl MaterialArchetype {
    /// The channels this archetype exposes, in display order.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            Self::Standard => STANDARD_CHANNELS,
            Self::Physical => PHYSICAL_CHANNELS,
            Self::Basic => BASIC_CHANNELS,
            Self::Phong => PHONG_CHANNELS,
        }
    }

    /// Node type name of this archetype's output node.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Standard => "output_standard",
            Self::Physical => "output_physical",
            Self::Basic => "output_basic",
            Self::Phong => "output_phong",
        }
    }

    /// Display name of this archetype's output node.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Standard => "Standard Material",
            Self::Physical => "Physical Material",
            Self::Basic => "Basic Material",
            Self::Phong => "Phong Material",
        }
    }

    /// All archetypes.
    pub fn all() -> [Self; 4] {
        [Self::Standard, Self::Physical, Self::Basic, Self::Phong]
    }
}

fn constant(type_name: &str, display_name: &str, value_type: ValueType, value: Value) -> NodeType {
    let socket_id = if value_type == ValueType::Vec4 && type_name == "color" {
        "color"
    } else {
        "value"
    };
    NodeType {
        type_name: type_name.to_string(),
        display_name: display_name.to_string(),
        role: NodeRole::Constant(value_type),
        inputs: vec![],
        outputs: vec![OutputSocket::new(socket_id, display_name, value_type)],
        default_properties: IndexMap::from([(socket_id.to_string(), value)]),
    }
}

fn math_constant(type_name: &str, display_name: &str, value: f32) -> NodeType {
    NodeType {
        type_name: type_name.to_string(),
        display_name: display_name.to_string(),
        role: NodeRole::Constant(ValueType::Float),
        inputs: vec![],
        outputs: vec![OutputSocket::new("out", display_name, ValueType::Float)],
        default_properties: IndexMap::from([("out".to_string(), Value::Float(value))]),
    }
}

fn unary(type_name: &str, display_name: &str, op: OpKind, default: f32) -> NodeType {
    NodeType {
        type_name: type_name.to_string(),
        display_name: display_name.to_string(),
        role: NodeRole::Op(op),
        inputs: vec![InputSocket::generic("a", "A")],
        outputs: vec![OutputSocket::generic("out", "Out")],
        default_properties: IndexMap::from([("a".to_string(), Value::Float(default))]),
    }
}

fn binary(type_name: &str, display_name: &str, op: OpKind, defaults: [f32; 2]) -> NodeType {
    NodeType {
        type_name: type_name.to_string(),
        display_name: display_name.to_string(),
        role: NodeRole::Op(op),
        inputs: vec![InputSocket::generic("a", "A"), InputSocket::generic("b", "B")],
        outputs: vec![OutputSocket::generic("out", "Out")],
        default_properties: IndexMap::from([
            ("a".to_string(), Value::Float(defaults[0])),
            ("b".to_string(), Value::Float(defaults[1])),
        ]),
    }
}

fn ternary(type_name: &str, display_name: &str, op: OpKind, defaults: [f32; 3]) -> NodeType {
    NodeType {
        type_name: type_name.to_string(),
        display_name: display_name.to_string(),
        role: NodeRole::Op(op),
        inputs: vec![
            InputSocket::generic("a", "A"),
            InputSocket::generic("b", "B"),
            InputSocket::generic("c", "C"),
        ],
        outputs: vec![OutputSocket::generic("out", "Out")],
        default_properties: IndexMap::from([
            ("a".to_string(), Value::Float(defaults[0])),
            ("b".to_string(), Value::Float(defaults[1])),
            ("c".to_string(), Value::Float(defaults[2])),
        ]),
    }
}

fn vec3_binary(type_name: &str, display_name: &str, op: OpKind, out: ValueType) -> NodeType {
    NodeType {
        type_name: type_name.to_string(),
        display_name: display_name.to_string(),
        role: NodeRole::Op(op),
        inputs: vec![
            InputSocket::new("a", "A", ValueType::Vec3),
            InputSocket::new("b", "B", ValueType::Vec3),
        ],
        outputs: vec![OutputSocket::new("out", "Out", out)],
        default_properties: IndexMap::from([
            ("a".to_string(), Value::Vec3([0.0; 3])),
            ("b".to_string(), Value::Vec3([0.0; 3])),
        ]),
    }
}

fn geometry(type_name: &str, display_name: &str, input: GeometryInput) -> NodeType {
    let value_type = input.value_type();
    let mut outputs = Vec::new();
    match value_type {
        ValueType::Vec2 => {
            outputs.push(OutputSocket::new("xy", display_name, ValueType::Vec2));
            outputs.push(OutputSocket::component("x", "X", 0));
            outputs.push(OutputSocket::component("y", "Y", 1));
        }
        ValueType::Vec3 => {
            outputs.push(OutputSocket::new("xyz", display_name, ValueType::Vec3));
            outputs.push(OutputSocket::component("x", "X", 0));
            outputs.push(OutputSocket::component("y", "Y", 1));
            outputs.push(OutputSocket::component("z", "Z", 2));
        }
        _ => outputs.push(OutputSocket::new("out", display_name, value_type)),
    }
    NodeType {
        type_name: type_name.to_string(),
        display_name: display_name.to_string(),
        role: NodeRole::Input(input),
        inputs: vec![],
        outputs,
        default_properties: IndexMap::new(),
    }
}

fn make_vector(type_name: &str, display_name: &str, lanes: usize) -> NodeType {
    let (op, value_type, primary) = match lanes {
        2 => (OpKind::MakeVec2, ValueType::Vec2, "xy"),
        3 => (OpKind::MakeVec3, ValueType::Vec3, "xyz"),
        _ => (OpKind::MakeVec4, ValueType::Vec4, "xyzw"),
    };
    let lane_ids = ["x", "y", "z", "w"];
    let lane_labels = ["X", "Y", "Z", "W"];
    let mut inputs = Vec::new();
    let mut defaults = IndexMap::new();
    let mut outputs = vec![OutputSocket::new(primary, display_name, value_type)];
    for i in 0..lanes {
        inputs.push(InputSocket::new(lane_ids[i], lane_labels[i], ValueType::Float));
        defaults.insert(lane_ids[i].to_string(), Value::Float(0.0));
        outputs.push(OutputSocket::component(lane_ids[i], lane_labels[i], i));
    }
    NodeType {
        type_name: type_name.to_string(),
        display_name: display_name.to_string(),
        role: NodeRole::Op(op),
        inputs,
        outputs,
        default_properties: defaults,
    }
}

fn output_node(archetype: MaterialArchetype) -> NodeType {
    NodeType {
        type_name: archetype.type_name().to_string(),
        display_name: archetype.display_name().to_string(),
        role: NodeRole::Output(archetype),
        inputs: archetype
            .channels()
            .iter()
            .map(|c| InputSocket::new(c.id, c.label, c.value_type))
            .collect(),
        outputs: vec![],
        default_properties: IndexMap::new(),
    }
}

/// Create the material graph node registry with all available node types
/// and palette categories.
pub fn create_material_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // ========================================================================
    // Output Nodes
    // ========================================================================

    for archetype in MaterialArchetype::all() {
        registry.register(output_node(archetype));
    }

    // ========================================================================
    // Constants
    // ========================================================================

    registry.register(constant("float", "Float", ValueType::Float, Value::Float(0.0)));
    registry.register(constant("int", "Int", ValueType::Int, Value::Int(0)));
    registry.register(constant("bool", "Bool", ValueType::Bool, Value::Bool(false)));
    registry.register({
        let mut color = constant("color", "Color", ValueType::Vec4, Value::Vec4([1.0; 4]));
        color.outputs.push(OutputSocket::component("r", "R", 0));
        color.outputs.push(OutputSocket::component("g", "G", 1));
        color.outputs.push(OutputSocket::component("b", "B", 2));
        color.outputs.push(OutputSocket::component("a", "A", 3));
        color
    });
    registry.register(make_vector("vec2", "Vector2", 2));
    registry.register(make_vector("vec3", "Vector3", 3));
    registry.register(make_vector("vec4", "Vector4", 4));

    registry.register(math_constant("pi", "Pi", std::f32::consts::PI));
    registry.register(math_constant("two_pi", "Two Pi", std::f32::consts::TAU));
    registry.register(math_constant("half_pi", "Half Pi", std::f32::consts::FRAC_PI_2));
    registry.register(math_constant("epsilon", "Epsilon", 1e-6));
    registry.register(math_constant("infinity", "Infinity", 1e30));

    // ========================================================================
    // Geometry Inputs
    // ========================================================================

    registry.register(geometry("uv", "UV", GeometryInput::Uv));
    registry.register(geometry("screen_uv", "Screen UV", GeometryInput::ScreenUv));
    registry.register(geometry("position_local", "Local Position", GeometryInput::PositionLocal));
    registry.register(geometry("position_world", "World Position", GeometryInput::PositionWorld));
    registry.register(geometry("position_view", "View Position", GeometryInput::PositionView));
    registry.register(geometry("normal_local", "Local Normal", GeometryInput::NormalLocal));
    registry.register(geometry("normal_world", "World Normal", GeometryInput::NormalWorld));
    registry.register(geometry("normal_view", "View Normal", GeometryInput::NormalView));
    registry.register(geometry("view_direction", "View Direction", GeometryInput::ViewDirection));
    registry.register(geometry("time", "Time", GeometryInput::Time));

    // ========================================================================
    // Math - Unary
    // ========================================================================

    registry.register(unary("abs", "Absolute", OpKind::Abs, 0.0));
    registry.register(unary("acos", "Arccosine", OpKind::Acos, 0.0));
    registry.register(unary("asin", "Arcsine", OpKind::Asin, 0.0));
    registry.register(unary("atan", "Arctangent", OpKind::Atan, 0.0));
    registry.register(unary("ceil", "Ceiling", OpKind::Ceil, 0.0));
    registry.register(unary("cos", "Cosine", OpKind::Cos, 0.0));
    registry.register(unary("degrees", "Degrees", OpKind::Degrees, 0.0));
    registry.register(unary("exp", "Exponential", OpKind::Exp, 0.0));
    registry.register(unary("exp2", "Exponential Base 2", OpKind::Exp2, 0.0));
    registry.register(unary("floor", "Floor", OpKind::Floor, 0.0));
    registry.register(unary("fract", "Fraction", OpKind::Fract, 0.0));
    registry.register(unary("inverse_sqrt", "Inverse Square Root", OpKind::InverseSqrt, 1.0));
    registry.register(unary("log", "Logarithm", OpKind::Log, 1.0));
    registry.register(unary("log2", "Logarithm Base 2", OpKind::Log2, 1.0));
    registry.register(unary("negate", "Negate", OpKind::Negate, 0.0));
    registry.register(unary("one_div", "One Over X", OpKind::OneDiv, 1.0));
    registry.register(unary("one_minus", "One Minus X", OpKind::OneMinus, 0.0));
    registry.register(unary("radians", "Radians", OpKind::Radians, 0.0));
    registry.register(unary("round", "Round", OpKind::Round, 0.0));
    registry.register(unary("saturate", "Saturate", OpKind::Saturate, 0.0));
    registry.register(unary("sign", "Sign", OpKind::Sign, 0.0));
    registry.register(unary("sin", "Sine", OpKind::Sin, 0.0));
    registry.register(unary("sqrt", "Square Root", OpKind::Sqrt, 0.0));
    registry.register(unary("tan", "Tangent", OpKind::Tan, 0.0));
    registry.register(unary("trunc", "Truncate", OpKind::Trunc, 0.0));
    registry.register(unary("normalize", "Normalize", OpKind::Normalize, 0.0));
    registry.register({
        let mut length = unary("length", "Length", OpKind::Length, 0.0);
        length.outputs = vec![OutputSocket::new("out", "Length", ValueType::Float)];
        length
    });

    // ========================================================================
    // Math - Binary
    // ========================================================================

    registry.register(binary("add", "Add", OpKind::Add, [0.0, 0.0]));
    registry.register(binary("subtract", "Subtract", OpKind::Subtract, [0.0, 0.0]));
    registry.register(binary("multiply", "Multiply", OpKind::Multiply, [1.0, 1.0]));
    registry.register(binary("divide", "Divide", OpKind::Divide, [1.0, 1.0]));
    registry.register(binary("min", "Minimum", OpKind::Min, [0.0, 0.0]));
    registry.register(binary("max", "Maximum", OpKind::Max, [0.0, 0.0]));
    registry.register(binary("mod", "Modulo", OpKind::Mod, [0.0, 1.0]));
    registry.register(binary("power", "Power", OpKind::Power, [1.0, 1.0]));
    registry.register(binary("step", "Step", OpKind::Step, [0.0, 0.0]));
    registry.register(binary("difference", "Difference", OpKind::Difference, [0.0, 0.0]));
    registry.register({
        let mut distance = binary("distance", "Distance", OpKind::Distance, [0.0, 0.0]);
        distance.outputs = vec![OutputSocket::new("out", "Distance", ValueType::Float)];
        distance
    });
    registry.register(vec3_binary("dot", "Dot Product", OpKind::Dot, ValueType::Float));
    registry.register(vec3_binary("cross", "Cross Product", OpKind::Cross, ValueType::Vec3));
    registry.register(vec3_binary("reflect", "Reflect", OpKind::Reflect, ValueType::Vec3));

    // ========================================================================
    // Math - Ternary & Ranges
    // ========================================================================

    registry.register(ternary("clamp", "Clamp", OpKind::Clamp, [0.0, 0.0, 1.0]));
    registry.register(ternary("mix", "Mix", OpKind::Mix, [0.0, 1.0, 0.5]));
    registry.register(ternary("smoothstep", "Smoothstep", OpKind::Smoothstep, [0.0, 1.0, 0.5]));
    registry.register(NodeType {
        type_name: "remap".to_string(),
        display_name: "Remap".to_string(),
        role: NodeRole::Op(OpKind::Remap),
        inputs: vec![
            InputSocket::new("value", "Value", ValueType::Float),
            InputSocket::new("in_min", "In Min", ValueType::Float),
            InputSocket::new("in_max", "In Max", ValueType::Float),
            InputSocket::new("out_min", "Out Min", ValueType::Float),
            InputSocket::new("out_max", "Out Max", ValueType::Float),
        ],
        outputs: vec![OutputSocket::new("out", "Result", ValueType::Float)],
        default_properties: IndexMap::from([
            ("value".to_string(), Value::Float(0.0)),
            ("in_min".to_string(), Value::Float(0.0)),
            ("in_max".to_string(), Value::Float(1.0)),
            ("out_min".to_string(), Value::Float(0.0)),
            ("out_max".to_string(), Value::Float(1.0)),
        ]),
    });

    // ========================================================================
    // Logic
    // ========================================================================

    registry.register({
        let mut equals = binary("equals", "Equals", OpKind::Equals, [0.0, 0.0]);
        equals.outputs = vec![OutputSocket::new("out", "Equal", ValueType::Bool)];
        equals
    });
    registry.register({
        let mut all = unary("all", "All", OpKind::All, 0.0);
        all.outputs = vec![OutputSocket::new("out", "All", ValueType::Bool)];
        all
    });
    registry.register({
        let mut any = unary("any", "Any", OpKind::Any, 0.0);
        any.outputs = vec![OutputSocket::new("out", "Any", ValueType::Bool)];
        any
    });

    // ========================================================================
    // Noise & Patterns
    // ========================================================================

    registry.register(NodeType {
        type_name: "tri_noise_3d".to_string(),
        display_name: "Tri Noise 3D".to_string(),
        role: NodeRole::Op(OpKind::TriNoise3d),
        inputs: vec![
            InputSocket::new("position", "Position", ValueType::Vec3),
            InputSocket::new("speed", "Speed", ValueType::Float),
            InputSocket::new("time", "Time", ValueType::Float),
        ],
        outputs: vec![OutputSocket::new("out", "Value", ValueType::Float)],
        default_properties: IndexMap::from([
            ("position".to_string(), Value::Vec3([0.0; 3])),
            ("speed".to_string(), Value::Float(1.0)),
            ("time".to_string(), Value::Float(0.0)),
        ]),
    });
    registry.register(NodeType {
        type_name: "gradient_noise".to_string(),
        display_name: "Gradient Noise".to_string(),
        role: NodeRole::Op(OpKind::GradientNoise),
        inputs: vec![InputSocket::new("uv", "UV", ValueType::Vec2)],
        outputs: vec![OutputSocket::new("out", "Value", ValueType::Float)],
        default_properties: IndexMap::from([("uv".to_string(), Value::Vec2([0.0; 2]))]),
    });
    registry.register(NodeType {
        type_name: "checkerboard".to_string(),
        display_name: "Checkerboard".to_string(),
        role: NodeRole::Op(OpKind::Checkerboard),
        inputs: vec![
            InputSocket::new("uv", "UV", ValueType::Vec2),
            InputSocket::new("scale", "Scale", ValueType::Float),
            InputSocket::new("color_a", "Color A", ValueType::Vec4),
            InputSocket::new("color_b", "Color B", ValueType::Vec4),
        ],
        outputs: vec![OutputSocket::new("out", "Color", ValueType::Vec4)],
        default_properties: IndexMap::from([
            ("uv".to_string(), Value::Vec2([0.0; 2])),
            ("scale".to_string(), Value::Float(2.0)),
            ("color_a".to_string(), Value::Vec4([0.0, 0.0, 0.0, 1.0])),
            ("color_b".to_string(), Value::Vec4([1.0; 4])),
        ]),
    });

    // ========================================================================
    // Texture
    // ========================================================================

    registry.register(NodeType {
        type_name: "texture_sample".to_string(),
        display_name: "Texture Sample".to_string(),
        role: NodeRole::Op(OpKind::TextureSample),
        inputs: vec![InputSocket::new("uv", "UV", ValueType::Vec2)],
        outputs: vec![
            OutputSocket::new("color", "Color", ValueType::Vec4),
            OutputSocket::component("r", "R", 0),
            OutputSocket::component("g", "G", 1),
            OutputSocket::component("b", "B", 2),
            OutputSocket::component("a", "A", 3),
        ],
        // The `texture` property is set by the editor when an asset is
        // assigned; absent means the neutral white sample.
        default_properties: IndexMap::new(),
    });

    register_palette(&mut registry);

    registry
}

fn register_palette(registry: &mut NodeRegistry) {
    fn entries(names: &[(&str, &str)], color: [u8; 3]) -> Vec<PaletteEntry> {
        names
            .iter()
            .map(|(display_name, type_name)| PaletteEntry {
                display_name: (*display_name).to_string(),
                type_name: (*type_name).to_string(),
                color,
            })
            .collect()
    }

    registry.add_category(NodeCategory {
        name: "Constants".to_string(),
        entries: entries(
            &[
                ("Float", "float"),
                ("Int", "int"),
                ("Bool", "bool"),
                ("Color", "color"),
                ("Vector2", "vec2"),
                ("Vector3", "vec3"),
                ("Vector4", "vec4"),
                ("Pi", "pi"),
                ("Two Pi", "two_pi"),
                ("Half Pi", "half_pi"),
                ("Epsilon", "epsilon"),
                ("Infinity", "infinity"),
            ],
            [156, 39, 176],
        ),
    });
    registry.add_category(NodeCategory {
        name: "Geometry".to_string(),
        entries: entries(
            &[
                ("UV", "uv"),
                ("Screen UV", "screen_uv"),
                ("Local Position", "position_local"),
                ("World Position", "position_world"),
                ("View Position", "position_view"),
                ("Local Normal", "normal_local"),
                ("World Normal", "normal_world"),
                ("View Normal", "normal_view"),
                ("View Direction", "view_direction"),
                ("Time", "time"),
            ],
            [76, 175, 80],
        ),
    });
    registry.add_category(NodeCategory {
        name: "Math".to_string(),
        entries: entries(
            &[
                ("Add", "add"),
                ("Subtract", "subtract"),
                ("Multiply", "multiply"),
                ("Divide", "divide"),
                ("Power", "power"),
                ("Minimum", "min"),
                ("Maximum", "max"),
                ("Modulo", "mod"),
                ("Step", "step"),
                ("Clamp", "clamp"),
                ("Mix", "mix"),
                ("Smoothstep", "smoothstep"),
                ("Remap", "remap"),
                ("Absolute", "abs"),
                ("Negate", "negate"),
                ("One Minus X", "one_minus"),
                ("Sine", "sin"),
                ("Cosine", "cos"),
                ("Tangent", "tan"),
                ("Square Root", "sqrt"),
                ("Normalize", "normalize"),
                ("Length", "length"),
                ("Distance", "distance"),
                ("Dot Product", "dot"),
                ("Cross Product", "cross"),
                ("Reflect", "reflect"),
            ],
            [33, 150, 243],
        ),
    });
    registry.add_category(NodeCategory {
        name: "Logic".to_string(),
        entries: entries(
            &[("Equals", "equals"), ("All", "all"), ("Any", "any")],
            [121, 85, 72],
        ),
    });
    registry.add_category(NodeCategory {
        name: "Noise".to_string(),
        entries: entries(
            &[
                ("Tri Noise 3D", "tri_noise_3d"),
                ("Gradient Noise", "gradient_noise"),
                ("Checkerboard", "checkerboard"),
            ],
            [255, 152, 0],
        ),
    });
    registry.add_category(NodeCategory {
        name: "Texture".to_string(),
        entries: entries(&[("Texture Sample", "texture_sample")], [0, 150, 136]),
    });
    registry.add_category(NodeCategory {
        name: "Output".to_string(),
        entries: entries(
            &[
                ("Standard Material", "output_standard"),
                ("Physical Material", "output_physical"),
                ("Basic Material", "output_basic"),
                ("Phong Material", "output_phong"),
            ],
            [233, 30, 99],
        ),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_catalog() {
        let registry = create_material_registry();
        for name in [
            "float", "color", "vec3", "uv", "time", "add", "mix", "tri_noise_3d",
            "texture_sample", "output_standard", "output_physical", "output_basic",
            "output_phong",
        ] {
            assert!(registry.lookup(name).is_some(), "missing node type {name}");
        }
        assert!(!registry.categories().is_empty());
    }

    #[test]
    fn test_palette_references_registered_types() {
        let registry = create_material_registry();
        for category in registry.categories() {
            for entry in &category.entries {
                assert!(
                    registry.lookup(&entry.type_name).is_some(),
                    "palette references unknown type {}",
                    entry.type_name
                );
            }
        }
    }

    #[test]
    fn test_archetype_channels() {
        assert_eq!(MaterialArchetype::Basic.channels().len(), 2);
        assert_eq!(MaterialArchetype::Standard.channels().len(), 7);
        assert_eq!(MaterialArchetype::Physical.channels().len(), 12);
        let physical: Vec<&str> = MaterialArchetype::Physical
            .channels()
            .iter()
            .map(|c| c.id)
            .collect();
        for extra in ["clearcoat", "clearcoat_roughness", "transmission", "thickness", "ior"] {
            assert!(physical.contains(&extra));
        }
    }

    #[test]
    fn test_output_nodes_have_no_outputs() {
        let registry = create_material_registry();
        for archetype in MaterialArchetype::all() {
            let ty = registry.lookup(archetype.type_name()).unwrap();
            assert!(ty.outputs.is_empty());
            assert_eq!(ty.inputs.len(), archetype.channels().len());
        }
    }
}
