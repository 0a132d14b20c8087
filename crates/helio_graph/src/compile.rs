// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph compilation: lowering a node graph into material programs.
//!
//! One compilation pass walks backward from every output node, resolving
//! bindings (edges, then properties, then declared defaults), propagating
//! types through generic sockets and reifying coercions as explicit
//! expression nodes. All programs produced by one pass share a single
//! expression arena, and upstream nodes are compiled once per pass by
//! node identity.

use crate::expr::{Expr, ExprArena, ExprId, OpKind};
use crate::graph::Graph;
use crate::material::MaterialArchetype;
use crate::node::{Node, NodeId, NodeRegistry, NodeRole, NodeType};
use crate::socket::{coercion, Coercion, InputSocket, SocketType, Value, ValueType};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A compiled material program: channels bound to expressions for one
/// output node. Channels absent from the map keep the archetype default.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProgram {
    /// The output node this program was compiled from
    pub output_node: NodeId,
    /// Material archetype
    pub archetype: MaterialArchetype,
    /// Channel id -> compiled expression
    pub channels: IndexMap<String, ExprId>,
}

/// A failed output node with the error that blocked it.
#[derive(Debug, Clone)]
pub struct CompileFailure {
    /// The output node that failed to compile
    pub output_node: NodeId,
    /// What went wrong
    pub error: CompileError,
}

/// Result of one compilation pass. Failures are per output node: a type
/// error or cycle blocks only the outputs that reach it.
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    /// Shared expression arena for every program in this pass
    pub arena: ExprArena,
    /// Programs that compiled
    pub programs: Vec<MaterialProgram>,
    /// Output nodes that did not compile
    pub failures: Vec<CompileFailure>,
    /// Nodes skipped because their type is not registered
    pub skipped: Vec<NodeId>,
}

impl CompileReport {
    /// The program compiled for a specific output node, if it succeeded.
    pub fn program_for(&self, output_node: NodeId) -> Option<&MaterialProgram> {
        self.programs.iter().find(|p| p.output_node == output_node)
    }
}

/// Error that blocks compilation of an output node.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// A binding violates the coercion lattice
    #[error("type mismatch at {node:?}.{socket}: {source} cannot feed {target}")]
    TypeMismatch {
        /// Node whose input is mis-typed
        node: NodeId,
        /// Input socket id
        socket: String,
        /// Actual upstream type
        source: ValueType,
        /// Required type
        target: ValueType,
    },

    /// A dependency cycle was detected during the walk
    #[error("dependency cycle through {participants:?}")]
    Cycle {
        /// Nodes on the cycle, in walk order
        participants: Vec<NodeId>,
    },

    /// A property value cannot be used as a binding (e.g. an asset
    /// reference in a numeric slot)
    #[error("property {key:?} on node {node:?} is not usable as a value")]
    InvalidProperty {
        /// Owning node
        node: NodeId,
        /// Property key
        key: String,
    },
}

/// Compile every output node in the graph into a material program.
pub fn compile(graph: &Graph, registry: &NodeRegistry) -> CompileReport {
    let mut compiler = Compiler {
        graph,
        registry,
        arena: ExprArena::new(),
        memo: HashMap::new(),
        visiting: Vec::new(),
        skipped: Vec::new(),
    };

    let mut programs = Vec::new();
    let mut failures = Vec::new();

    for node in graph.nodes() {
        let Some(node_type) = registry.lookup(&node.type_name) else {
            compiler.mark_skipped(node.id, &node.type_name);
            continue;
        };
        if let NodeRole::Output(archetype) = node_type.role {
            match compiler.compile_output(node, node_type, archetype) {
                Ok(program) => programs.push(program),
                Err(error) => {
                    warn!(output = ?node.id, %error, "material output failed to compile");
                    failures.push(CompileFailure {
                        output_node: node.id,
                        error,
                    });
                }
            }
        }
    }

    debug!(
        programs = programs.len(),
        failures = failures.len(),
        exprs = compiler.arena.len(),
        "compiled material graph"
    );

    CompileReport {
        arena: compiler.arena,
        programs,
        failures,
        skipped: compiler.skipped,
    }
}

/// Per-node compilation result: one expression per output socket.
#[derive(Debug, Clone)]
struct CompiledNode {
    outputs: IndexMap<String, ExprId>,
}

struct Compiler<'a> {
    graph: &'a Graph,
    registry: &'a NodeRegistry,
    arena: ExprArena,
    /// `None` marks a node skipped for an unregistered type.
    memo: HashMap<NodeId, Option<CompiledNode>>,
    visiting: Vec<NodeId>,
    skipped: Vec<NodeId>,
}

impl Compiler<'_> {
    fn mark_skipped(&mut self, node: NodeId, type_name: &str) {
        if self.memo.insert(node, None).is_none() {
            warn!(?node, type_name, "unknown node type, skipping");
            self.skipped.push(node);
        }
    }

    fn compile_output(
        &mut self,
        node: &Node,
        node_type: &NodeType,
        archetype: MaterialArchetype,
    ) -> Result<MaterialProgram, CompileError> {
        let mut channels = IndexMap::new();
        for socket in &node_type.inputs {
            if let Some(expr) = self.channel_binding(node, socket)? {
                channels.insert(socket.id.clone(), expr);
            }
        }
        Ok(MaterialProgram {
            output_node: node.id,
            archetype,
            channels,
        })
    }

    /// Resolve one output-node channel: edge, then property, else unbound.
    fn channel_binding(
        &mut self,
        node: &Node,
        socket: &InputSocket,
    ) -> Result<Option<ExprId>, CompileError> {
        let target = socket
            .socket_type
            .concrete()
            .unwrap_or(ValueType::Float);

        if let Some(edge) = self.graph.edge_to(node.id, &socket.id) {
            let source = (edge.source_node, edge.source_socket.clone());
            if let Some(expr) = self.upstream_expr(source)? {
                return Ok(Some(self.coerce(expr, target, node.id, &socket.id)?));
            }
        }
        if let Some(value) = node.properties.get(&socket.id).copied() {
            let expr = self.property_expr(node.id, &socket.id, value, target)?;
            return Ok(Some(expr));
        }
        Ok(None)
    }

    /// Compile the node feeding an edge and return the expression for the
    /// edge's source socket. `None` when the upstream node was skipped.
    fn upstream_expr(
        &mut self,
        (source_node, source_socket): (NodeId, String),
    ) -> Result<Option<ExprId>, CompileError> {
        let Some(compiled) = self.compile_node(source_node)? else {
            return Ok(None);
        };
        Ok(compiled.outputs.get(&source_socket).copied())
    }

    fn compile_node(&mut self, id: NodeId) -> Result<Option<CompiledNode>, CompileError> {
        if let Some(hit) = self.memo.get(&id) {
            return Ok(hit.clone());
        }
        if let Some(pos) = self.visiting.iter().position(|v| *v == id) {
            return Err(CompileError::Cycle {
                participants: self.visiting[pos..].to_vec(),
            });
        }

        let Some(node) = self.graph.node(id) else {
            return Ok(None);
        };
        let Some(node_type) = self.registry.lookup(&node.type_name) else {
            self.mark_skipped(id, &node.type_name);
            return Ok(None);
        };
        // Clones keep the borrow of the graph/registry out of the
        // recursive walk.
        let node = node.clone();
        let node_type = node_type.clone();

        self.visiting.push(id);
        let result = self.compile_node_inner(&node, &node_type);
        self.visiting.pop();

        let compiled = result?;
        self.memo.insert(id, Some(compiled.clone()));
        Ok(Some(compiled))
    }

    fn compile_node_inner(
        &mut self,
        node: &Node,
        node_type: &NodeType,
    ) -> Result<CompiledNode, CompileError> {
        let primary = match node_type.role {
            NodeRole::Constant(value_type) => {
                let key = node_type
                    .primary_output()
                    .map_or_else(|| "value".to_string(), |s| s.id.clone());
                let value = node
                    .properties
                    .get(&key)
                    .copied()
                    .unwrap_or_else(|| Value::zero(value_type));
                self.property_expr(node.id, &key, value, value_type)?
            }
            NodeRole::Input(input) => self.arena.push(Expr::Input(input), input.value_type()),
            NodeRole::Op(OpKind::TextureSample) => self.compile_texture(node)?,
            NodeRole::Op(op) => self.compile_op(node, node_type, op)?,
            // Output nodes have no output sockets, so nothing can depend
            // on them; compile to nothing.
            NodeRole::Output(_) => {
                return Ok(CompiledNode {
                    outputs: IndexMap::new(),
                })
            }
        };

        let mut outputs = IndexMap::new();
        for socket in &node_type.outputs {
            let expr = match socket.component {
                Some(component) => self.arena.push(
                    Expr::Extract {
                        expr: primary,
                        component,
                    },
                    ValueType::Float,
                ),
                None => primary,
            };
            outputs.insert(socket.id.clone(), expr);
        }
        Ok(CompiledNode { outputs })
    }

    fn compile_op(
        &mut self,
        node: &Node,
        node_type: &NodeType,
        op: OpKind,
    ) -> Result<ExprId, CompileError> {
        // First resolve every input without coercion, so generic sockets
        // can be joined from the actual upstream types.
        let mut raw: Vec<(&InputSocket, Option<ExprId>)> = Vec::new();
        for socket in &node_type.inputs {
            let mut expr = None;
            if let Some(edge) = self.graph.edge_to(node.id, &socket.id) {
                let source = (edge.source_node, edge.source_socket.clone());
                expr = self.upstream_expr(source)?;
            }
            if expr.is_none() {
                if let Some(value) = node.properties.get(&socket.id).copied() {
                    let value_type = value.value_type().ok_or_else(|| {
                        CompileError::InvalidProperty {
                            node: node.id,
                            key: socket.id.clone(),
                        }
                    })?;
                    expr = Some(self.arena.push(
                        Expr::Property {
                            node: node.id,
                            key: socket.id.clone(),
                            value,
                        },
                        value_type,
                    ));
                }
            }
            raw.push((socket, expr));
        }

        // Join the actual types arriving at generic sockets.
        let mut resolved: Option<ValueType> = None;
        for (socket, expr) in &raw {
            if socket.socket_type != SocketType::Generic {
                continue;
            }
            let Some(expr) = expr else { continue };
            let arriving = self.arena.value_type(*expr);
            resolved = Some(match resolved {
                None => arriving,
                Some(acc) => join(acc, arriving).ok_or_else(|| CompileError::TypeMismatch {
                    node: node.id,
                    socket: socket.id.clone(),
                    source: arriving,
                    target: acc,
                })?,
            });
        }
        let resolved = resolved.unwrap_or(ValueType::Float);

        let mut args = Vec::with_capacity(raw.len());
        for (socket, expr) in raw {
            let target = socket.socket_type.concrete().unwrap_or(resolved);
            let expr = match expr {
                Some(expr) => self.coerce(expr, target, node.id, &socket.id)?,
                None => self.arena.push(Expr::Constant(Value::zero(target)), target),
            };
            args.push(expr);
        }

        let out_type = node_type
            .primary_output()
            .and_then(|s| s.socket_type.concrete())
            .unwrap_or_else(|| op_output_type(op, resolved));
        Ok(self.arena.push(Expr::Op { op, args }, out_type))
    }

    fn compile_texture(&mut self, node: &Node) -> Result<ExprId, CompileError> {
        let mut uv = None;
        if let Some(edge) = self.graph.edge_to(node.id, "uv") {
            let source = (edge.source_node, edge.source_socket.clone());
            if let Some(expr) = self.upstream_expr(source)? {
                uv = Some(self.coerce(expr, ValueType::Vec2, node.id, "uv")?);
            }
        }
        let uv = match uv {
            Some(uv) => uv,
            // Unconnected UV falls back to the mesh UV stream.
            None => self
                .arena
                .push(Expr::Input(crate::expr::GeometryInput::Uv), ValueType::Vec2),
        };

        match node.properties.get("texture") {
            Some(Value::Asset(texture)) => Ok(self.arena.push(
                Expr::Texture {
                    texture: *texture,
                    uv,
                },
                ValueType::Vec4,
            )),
            Some(_) => Err(CompileError::InvalidProperty {
                node: node.id,
                key: "texture".to_string(),
            }),
            // No texture assigned: the neutral white sample.
            None => Ok(self
                .arena
                .push(Expr::Constant(Value::Vec4([1.0; 4])), ValueType::Vec4)),
        }

        // The uv expression stays referenced by Expr::Texture when a
        // texture is assigned; otherwise it is dead and harmless.
    }

    fn property_expr(
        &mut self,
        node: NodeId,
        key: &str,
        value: Value,
        target: ValueType,
    ) -> Result<ExprId, CompileError> {
        let value_type = value
            .value_type()
            .ok_or_else(|| CompileError::InvalidProperty {
                node,
                key: key.to_string(),
            })?;
        let expr = self.arena.push(
            Expr::Property {
                node,
                key: key.to_string(),
                value,
            },
            value_type,
        );
        self.coerce(expr, target, node, key)
    }

    /// Apply the coercion lattice, reifying the conversion as an explicit
    /// expression node.
    fn coerce(
        &mut self,
        expr: ExprId,
        target: ValueType,
        node: NodeId,
        socket: &str,
    ) -> Result<ExprId, CompileError> {
        let source = self.arena.value_type(expr);
        match coercion(source, target) {
            Some(Coercion::Identity) => Ok(expr),
            Some(Coercion::IntToFloat) => {
                Ok(self.arena.push(Expr::Cast { expr }, ValueType::Float))
            }
            Some(Coercion::Broadcast) => {
                let scalar = if source == ValueType::Int {
                    self.arena.push(Expr::Cast { expr }, ValueType::Float)
                } else {
                    expr
                };
                Ok(self.arena.push(
                    Expr::Broadcast {
                        expr: scalar,
                        lanes: target.lanes(),
                    },
                    target,
                ))
            }
            Some(Coercion::Truncate) => Ok(self.arena.push(
                Expr::Truncate {
                    expr,
                    lanes: target.lanes(),
                },
                target,
            )),
            None => Err(CompileError::TypeMismatch {
                node,
                socket: socket.to_string(),
                source,
                target,
            }),
        }
    }
}

/// Join two types arriving at the same generic parameter. Scalars promote
/// to float; a scalar joins a vector by broadcast; two vectors join at
/// the narrower width (the wider operand truncates). Bool joins only bool.
fn join(a: ValueType, b: ValueType) -> Option<ValueType> {
    use ValueType::{Bool, Float};
    match (a, b) {
        (Bool, Bool) => Some(Bool),
        (Bool, _) | (_, Bool) => None,
        (a, b) if a.is_vector() && b.is_vector() => ValueType::vector(a.lanes().min(b.lanes())),
        (v, _) if v.is_vector() => Some(v),
        (_, v) if v.is_vector() => Some(v),
        _ => Some(Float),
    }
}

/// Result type of an operator whose output socket is generic.
fn op_output_type(op: OpKind, resolved: ValueType) -> ValueType {
    match op {
        OpKind::Length
        | OpKind::Distance
        | OpKind::Dot
        | OpKind::Remap
        | OpKind::TriNoise3d
        | OpKind::GradientNoise => ValueType::Float,
        OpKind::Equals | OpKind::All | OpKind::Any => ValueType::Bool,
        OpKind::Cross | OpKind::Reflect | OpKind::MakeVec3 => ValueType::Vec3,
        OpKind::MakeVec2 => ValueType::Vec2,
        OpKind::MakeVec4 | OpKind::Checkerboard | OpKind::TextureSample => ValueType::Vec4,
        _ => resolved,
    }
}
