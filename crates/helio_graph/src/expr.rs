// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expression trees: the compiled form of a material graph.
//!
//! Expressions live in an arena and reference each other by index, so a
//! compilation pass can share subtrees between programs by identity and
//! the renderer can walk them without pointer chasing.

use crate::node::NodeId;
use crate::socket::{Value, ValueType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Index of an expression within an [`ExprArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExprId(pub usize);

/// Built-in geometry/frame input streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryInput {
    /// Mesh UV coordinates
    Uv,
    /// Screen-space UV coordinates
    ScreenUv,
    /// Object-space position
    PositionLocal,
    /// World-space position
    PositionWorld,
    /// View-space position
    PositionView,
    /// Object-space normal
    NormalLocal,
    /// World-space normal
    NormalWorld,
    /// View-space normal
    NormalView,
    /// Direction from fragment to camera
    ViewDirection,
    /// Elapsed shader time in seconds
    Time,
}

impl GeometryInput {
    /// The value type this input produces.
    pub fn value_type(self) -> ValueType {
        match self {
            Self::Uv | Self::ScreenUv => ValueType::Vec2,
            Self::Time => ValueType::Float,
            _ => ValueType::Vec3,
        }
    }
}

/// Operator tags for expression nodes. Arity is fixed per operator and
/// established by the node catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum OpKind {
    // Unary, component-wise
    Abs,
    Acos,
    Asin,
    Atan,
    Ceil,
    Cos,
    Degrees,
    Exp,
    Exp2,
    Floor,
    Fract,
    InverseSqrt,
    Log,
    Log2,
    Negate,
    OneDiv,
    OneMinus,
    Radians,
    Round,
    Saturate,
    Sign,
    Sin,
    Sqrt,
    Tan,
    Trunc,
    // Unary, vector -> scalar / vector
    Length,
    Normalize,
    // Binary, component-wise
    Add,
    Subtract,
    Multiply,
    Divide,
    Min,
    Max,
    Mod,
    Power,
    Step,
    Difference,
    // Binary, vector
    Distance,
    Dot,
    Cross,
    Reflect,
    // Ternary
    Clamp,
    Mix,
    Smoothstep,
    // Five-input range remap
    Remap,
    // Logic
    Equals,
    All,
    Any,
    // Procedural noise
    TriNoise3d,
    GradientNoise,
    Checkerboard,
    // Vector constructors
    MakeVec2,
    MakeVec3,
    MakeVec4,
    // Texture sampling (lowered to [`Expr::Texture`])
    TextureSample,
}

/// A single expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Constant leaf
    Constant(Value),
    /// Property leaf: a constant that remembers which node property it
    /// was resolved from.
    Property {
        /// Owning node
        node: NodeId,
        /// Property key (the unconnected input socket's id)
        key: String,
        /// Resolved value
        value: Value,
    },
    /// Geometry/frame input stream
    Input(GeometryInput),
    /// Texture sample at a UV coordinate
    Texture {
        /// Asset reference of the sampled texture
        texture: Uuid,
        /// UV expression
        uv: ExprId,
    },
    /// Operator with ordered children
    Op {
        /// Operator tag
        op: OpKind,
        /// Child expressions, in socket order
        args: Vec<ExprId>,
    },
    /// Integer-to-float widening
    Cast {
        /// Source expression
        expr: ExprId,
    },
    /// Extract one scalar lane from a composite value
    Extract {
        /// Source expression
        expr: ExprId,
        /// Lane index
        component: usize,
    },
    /// Replicate a scalar into every lane of a vector
    Broadcast {
        /// Scalar source expression
        expr: ExprId,
        /// Target lane count
        lanes: usize,
    },
    /// Keep only the leading lanes of a wider vector
    Truncate {
        /// Vector source expression
        expr: ExprId,
        /// Target lane count
        lanes: usize,
    },
}

/// Inputs supplied to functional evaluation: the per-fragment values the
/// renderer would provide on the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalInputs {
    /// Mesh UV
    pub uv: [f32; 2],
    /// Screen-space UV
    pub screen_uv: [f32; 2],
    /// Object-space position
    pub position_local: [f32; 3],
    /// World-space position
    pub position_world: [f32; 3],
    /// View-space position
    pub position_view: [f32; 3],
    /// Object-space normal
    pub normal_local: [f32; 3],
    /// World-space normal
    pub normal_world: [f32; 3],
    /// View-space normal
    pub normal_view: [f32; 3],
    /// Fragment-to-camera direction
    pub view_direction: [f32; 3],
    /// Elapsed time in seconds
    pub time: f32,
}

impl Default for EvalInputs {
    fn default() -> Self {
        Self {
            uv: [0.0; 2],
            screen_uv: [0.0; 2],
            position_local: [0.0; 3],
            position_world: [0.0; 3],
            position_view: [0.0; 3],
            normal_local: [0.0, 0.0, 1.0],
            normal_world: [0.0, 0.0, 1.0],
            normal_view: [0.0, 0.0, 1.0],
            view_direction: [0.0, 0.0, 1.0],
            time: 0.0,
        }
    }
}

/// Arena of typed expressions shared by every program compiled in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprArena {
    exprs: Vec<(Expr, ValueType)>,
}

impl ExprArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expression with its result type
    pub fn push(&mut self, expr: Expr, value_type: ValueType) -> ExprId {
        let id = ExprId(self.exprs.len());
        self.exprs.push((expr, value_type));
        id
    }

    /// Get an expression
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0].0
    }

    /// Result type of an expression
    pub fn value_type(&self, id: ExprId) -> ValueType {
        self.exprs[id.0].1
    }

    /// Number of expressions in the arena
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Evaluate an expression on the CPU. Used for previews and tests;
    /// the renderer lowers the same tree to its shading language.
    pub fn eval(&self, id: ExprId, inputs: &EvalInputs) -> Value {
        match self.expr(id) {
            Expr::Constant(v) | Expr::Property { value: v, .. } => *v,
            Expr::Input(gi) => eval_input(*gi, inputs),
            // A texture cannot be sampled without the renderer; CPU
            // evaluation yields the neutral white sample.
            Expr::Texture { .. } => Value::Vec4([1.0; 4]),
            Expr::Op { op, args } => {
                let values: Vec<Value> = args.iter().map(|a| self.eval(*a, inputs)).collect();
                eval_op(*op, &values)
            }
            Expr::Cast { expr } => Value::Float(self.eval(*expr, inputs).component(0)),
            Expr::Extract { expr, component } => {
                Value::Float(self.eval(*expr, inputs).component(*component))
            }
            Expr::Broadcast { expr, lanes } => {
                let scalar = self.eval(*expr, inputs).component(0);
                Value::from_components([scalar; 4], *lanes)
            }
            Expr::Truncate { expr, lanes } => {
                let (components, _) = self.eval(*expr, inputs).components();
                Value::from_components(components, *lanes)
            }
        }
    }
}

fn eval_input(input: GeometryInput, inputs: &EvalInputs) -> Value {
    match input {
        GeometryInput::Uv => Value::Vec2(inputs.uv),
        GeometryInput::ScreenUv => Value::Vec2(inputs.screen_uv),
        GeometryInput::PositionLocal => Value::Vec3(inputs.position_local),
        GeometryInput::PositionWorld => Value::Vec3(inputs.position_world),
        GeometryInput::PositionView => Value::Vec3(inputs.position_view),
        GeometryInput::NormalLocal => Value::Vec3(inputs.normal_local),
        GeometryInput::NormalWorld => Value::Vec3(inputs.normal_world),
        GeometryInput::NormalView => Value::Vec3(inputs.normal_view),
        GeometryInput::ViewDirection => Value::Vec3(inputs.view_direction),
        GeometryInput::Time => Value::Float(inputs.time),
    }
}

fn map1(v: Value, f: impl Fn(f32) -> f32) -> Value {
    let (lanes, n) = v.components();
    let mut out = [0.0; 4];
    for i in 0..n {
        out[i] = f(lanes[i]);
    }
    Value::from_components(out, n)
}

fn map2(a: Value, b: Value, f: impl Fn(f32, f32) -> f32) -> Value {
    let (la, na) = a.components();
    let (lb, nb) = b.components();
    let n = na.max(nb);
    let mut out = [0.0; 4];
    for i in 0..n {
        out[i] = f(la[i.min(na - 1)], lb[i.min(nb - 1)]);
    }
    Value::from_components(out, n)
}

fn map3(a: Value, b: Value, c: Value, f: impl Fn(f32, f32, f32) -> f32) -> Value {
    let (la, na) = a.components();
    let (lb, nb) = b.components();
    let (lc, nc) = c.components();
    let n = na.max(nb).max(nc);
    let mut out = [0.0; 4];
    for i in 0..n {
        out[i] = f(la[i.min(na - 1)], lb[i.min(nb - 1)], lc[i.min(nc - 1)]);
    }
    Value::from_components(out, n)
}

fn dot(a: Value, b: Value) -> f32 {
    let (la, na) = a.components();
    let (lb, nb) = b.components();
    let n = na.max(nb);
    (0..n)
        .map(|i| la[i.min(na - 1)] * lb[i.min(nb - 1)])
        .sum()
}

fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn gl_mod(a: f32, b: f32) -> f32 {
    a - b * (a / b).floor()
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn tri(x: f32) -> f32 {
    (x.fract() - 0.5).abs()
}

// Tri-wave fractal noise, following the shape of the shading library's
// triNoise3D helper.
fn tri_noise_3d(p: [f32; 3], speed: f32, time: f32) -> f32 {
    let mut p = p;
    let mut bp = p;
    let mut z = 1.4;
    let mut rz = 0.0;
    for _ in 0..3 {
        let dg = [
            tri(bp[2] + tri(bp[1])),
            tri(bp[2] + tri(bp[0])),
            tri(bp[1] + tri(bp[0])),
        ];
        for i in 0..3 {
            p[i] += dg[i] + time * 0.1 * speed;
            bp[i] = bp[i] * 1.8 + 0.14;
        }
        z *= 1.5;
        for lane in &mut p {
            *lane *= 1.2;
        }
        rz += tri(p[0] + tri(p[1] + tri(p[2]))) / z;
    }
    rz.clamp(0.0, 1.0)
}

fn gradient_noise(uv: [f32; 2]) -> f32 {
    (52.982_918 * (0.067_110_56 * uv[0] + 0.005_837_15 * uv[1]).fract()).fract()
}

fn eval_op(op: OpKind, args: &[Value]) -> Value {
    let arg = |i: usize| args.get(i).copied().unwrap_or(Value::Float(0.0));
    match op {
        OpKind::Abs => map1(arg(0), f32::abs),
        OpKind::Acos => map1(arg(0), f32::acos),
        OpKind::Asin => map1(arg(0), f32::asin),
        OpKind::Atan => map1(arg(0), f32::atan),
        OpKind::Ceil => map1(arg(0), f32::ceil),
        OpKind::Cos => map1(arg(0), f32::cos),
        OpKind::Degrees => map1(arg(0), f32::to_degrees),
        OpKind::Exp => map1(arg(0), f32::exp),
        OpKind::Exp2 => map1(arg(0), f32::exp2),
        OpKind::Floor => map1(arg(0), f32::floor),
        OpKind::Fract => map1(arg(0), |x| x - x.floor()),
        OpKind::InverseSqrt => map1(arg(0), |x| 1.0 / x.sqrt()),
        OpKind::Log => map1(arg(0), f32::ln),
        OpKind::Log2 => map1(arg(0), f32::log2),
        OpKind::Negate => map1(arg(0), |x| -x),
        OpKind::OneDiv => map1(arg(0), |x| 1.0 / x),
        OpKind::OneMinus => map1(arg(0), |x| 1.0 - x),
        OpKind::Radians => map1(arg(0), f32::to_radians),
        OpKind::Round => map1(arg(0), f32::round),
        OpKind::Saturate => map1(arg(0), |x| x.clamp(0.0, 1.0)),
        OpKind::Sign => map1(arg(0), sign),
        OpKind::Sin => map1(arg(0), f32::sin),
        OpKind::Sqrt => map1(arg(0), f32::sqrt),
        OpKind::Tan => map1(arg(0), f32::tan),
        OpKind::Trunc => map1(arg(0), f32::trunc),
        OpKind::Length => Value::Float(dot(arg(0), arg(0)).sqrt()),
        OpKind::Normalize => {
            let len = dot(arg(0), arg(0)).sqrt();
            if len == 0.0 {
                arg(0)
            } else {
                map1(arg(0), |x| x / len)
            }
        }
        OpKind::Add => map2(arg(0), arg(1), |a, b| a + b),
        OpKind::Subtract => map2(arg(0), arg(1), |a, b| a - b),
        OpKind::Multiply => map2(arg(0), arg(1), |a, b| a * b),
        OpKind::Divide => map2(arg(0), arg(1), |a, b| a / b),
        OpKind::Min => map2(arg(0), arg(1), f32::min),
        OpKind::Max => map2(arg(0), arg(1), f32::max),
        OpKind::Mod => map2(arg(0), arg(1), gl_mod),
        OpKind::Power => map2(arg(0), arg(1), f32::powf),
        OpKind::Step => map2(arg(0), arg(1), |edge, x| if x < edge { 0.0 } else { 1.0 }),
        OpKind::Difference => map2(arg(0), arg(1), |a, b| (a - b).abs()),
        OpKind::Distance => {
            let delta = map2(arg(0), arg(1), |a, b| a - b);
            Value::Float(dot(delta, delta).sqrt())
        }
        OpKind::Dot => Value::Float(dot(arg(0), arg(1))),
        OpKind::Cross => {
            let (a, _) = arg(0).components();
            let (b, _) = arg(1).components();
            Value::Vec3([
                a[1] * b[2] - a[2] * b[1],
                a[2] * b[0] - a[0] * b[2],
                a[0] * b[1] - a[1] * b[0],
            ])
        }
        OpKind::Reflect => {
            let d = 2.0 * dot(arg(1), arg(0));
            map2(arg(0), arg(1), |i, n| i - d * n)
        }
        OpKind::Clamp => map3(arg(0), arg(1), arg(2), |v, lo, hi| v.clamp(lo, hi)),
        OpKind::Mix => map3(arg(0), arg(1), arg(2), |a, b, t| a + (b - a) * t),
        OpKind::Smoothstep => map3(arg(0), arg(1), arg(2), smoothstep),
        OpKind::Remap => {
            let v = arg(0).component(0);
            let (in_min, in_max) = (arg(1).component(0), arg(2).component(0));
            let (out_min, out_max) = (arg(3).component(0), arg(4).component(0));
            Value::Float(out_min + (v - in_min) / (in_max - in_min) * (out_max - out_min))
        }
        OpKind::Equals => {
            let (la, na) = arg(0).components();
            let (lb, nb) = arg(1).components();
            Value::Bool(na == nb && la[..na] == lb[..nb])
        }
        OpKind::All => {
            let (lanes, n) = arg(0).components();
            Value::Bool(lanes[..n].iter().all(|x| *x != 0.0))
        }
        OpKind::Any => {
            let (lanes, n) = arg(0).components();
            Value::Bool(lanes[..n].iter().any(|x| *x != 0.0))
        }
        OpKind::TriNoise3d => {
            let (p, _) = arg(0).components();
            Value::Float(tri_noise_3d(
                [p[0], p[1], p[2]],
                arg(1).component(0),
                arg(2).component(0),
            ))
        }
        OpKind::GradientNoise => {
            let (uv, _) = arg(0).components();
            Value::Float(gradient_noise([uv[0], uv[1]]))
        }
        OpKind::Checkerboard => {
            let (uv, _) = arg(0).components();
            let scale = arg(1).component(0);
            let parity =
                ((uv[0] * scale).floor() + (uv[1] * scale).floor()).rem_euclid(2.0);
            if parity < 1.0 {
                arg(2)
            } else {
                arg(3)
            }
        }
        OpKind::MakeVec2 => Value::Vec2([arg(0).component(0), arg(1).component(0)]),
        OpKind::MakeVec3 => Value::Vec3([
            arg(0).component(0),
            arg(1).component(0),
            arg(2).component(0),
        ]),
        OpKind::MakeVec4 => Value::Vec4([
            arg(0).component(0),
            arg(1).component(0),
            arg(2).component(0),
            arg(3).component(0),
        ]),
        // Lowered to Expr::Texture during compilation; evaluating the op
        // directly yields the neutral sample.
        OpKind::TextureSample => Value::Vec4([1.0; 4]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_and_op_eval() {
        let mut arena = ExprArena::new();
        let two = arena.push(Expr::Constant(Value::Float(2.0)), ValueType::Float);
        let three = arena.push(Expr::Constant(Value::Float(3.0)), ValueType::Float);
        let sum = arena.push(
            Expr::Op {
                op: OpKind::Add,
                args: vec![two, three],
            },
            ValueType::Float,
        );
        assert_eq!(arena.eval(sum, &EvalInputs::default()), Value::Float(5.0));
    }

    #[test]
    fn test_broadcast_and_truncate_eval() {
        let mut arena = ExprArena::new();
        let half = arena.push(Expr::Constant(Value::Float(0.5)), ValueType::Float);
        let splat = arena.push(Expr::Broadcast { expr: half, lanes: 3 }, ValueType::Vec3);
        assert_eq!(
            arena.eval(splat, &EvalInputs::default()),
            Value::Vec3([0.5; 3])
        );

        let v4 = arena.push(
            Expr::Constant(Value::Vec4([1.0, 2.0, 3.0, 4.0])),
            ValueType::Vec4,
        );
        let v2 = arena.push(Expr::Truncate { expr: v4, lanes: 2 }, ValueType::Vec2);
        assert_eq!(
            arena.eval(v2, &EvalInputs::default()),
            Value::Vec2([1.0, 2.0])
        );

        let y = arena.push(Expr::Extract { expr: v4, component: 1 }, ValueType::Float);
        assert_eq!(arena.eval(y, &EvalInputs::default()), Value::Float(2.0));
    }

    #[test]
    fn test_geometry_inputs_eval() {
        let mut arena = ExprArena::new();
        let uv = arena.push(Expr::Input(GeometryInput::Uv), ValueType::Vec2);
        let time = arena.push(Expr::Input(GeometryInput::Time), ValueType::Float);

        let inputs = EvalInputs {
            uv: [0.25, 0.75],
            time: 2.5,
            ..EvalInputs::default()
        };
        assert_eq!(arena.eval(uv, &inputs), Value::Vec2([0.25, 0.75]));
        assert_eq!(arena.eval(time, &inputs), Value::Float(2.5));
    }

    #[test]
    fn test_vector_ops_eval() {
        let a = Value::Vec3([1.0, 0.0, 0.0]);
        let b = Value::Vec3([0.0, 1.0, 0.0]);
        assert_eq!(eval_op(OpKind::Dot, &[a, b]), Value::Float(0.0));
        assert_eq!(
            eval_op(OpKind::Cross, &[a, b]),
            Value::Vec3([0.0, 0.0, 1.0])
        );
        assert_eq!(eval_op(OpKind::Distance, &[a, b]), Value::Float(2.0_f32.sqrt()));
        assert_eq!(
            eval_op(OpKind::Mix, &[a, b, Value::Float(0.5)]),
            Value::Vec3([0.5, 0.5, 0.0])
        );
    }

    #[test]
    fn test_logic_ops_eval() {
        let a = Value::Vec2([1.0, 2.0]);
        assert_eq!(eval_op(OpKind::Equals, &[a, a]), Value::Bool(true));
        assert_eq!(
            eval_op(OpKind::Equals, &[a, Value::Vec2([1.0, 3.0])]),
            Value::Bool(false)
        );
        assert_eq!(eval_op(OpKind::All, &[a]), Value::Bool(true));
        assert_eq!(
            eval_op(OpKind::Any, &[Value::Vec2([0.0, 0.0])]),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_noise_is_deterministic_and_bounded() {
        let p = Value::Vec3([0.3, 0.7, 1.1]);
        let n1 = eval_op(OpKind::TriNoise3d, &[p, Value::Float(1.0), Value::Float(0.5)]);
        let n2 = eval_op(OpKind::TriNoise3d, &[p, Value::Float(1.0), Value::Float(0.5)]);
        assert_eq!(n1, n2);
        if let Value::Float(n) = n1 {
            assert!((0.0..=1.0).contains(&n));
        } else {
            panic!("noise must be scalar");
        }

        let g = eval_op(OpKind::GradientNoise, &[Value::Vec2([12.5, 7.25])]);
        if let Value::Float(g) = g {
            assert!((0.0..1.0).contains(&g));
        } else {
            panic!("noise must be scalar");
        }
    }
}
