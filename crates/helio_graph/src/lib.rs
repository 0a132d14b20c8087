// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material node graph framework for the Helio editor.
//!
//! This crate provides the graph model and compiler behind the visual
//! material editor:
//! - Typed input/output sockets with a small coercion lattice
//! - Connection validation (one driver per input, no self-loops)
//! - A registry of node types plus palette categories
//! - Compilation of graphs into material programs: expression trees
//!   bound to named channels on a material archetype
//! - CPU-side functional evaluation of compiled expressions
//!
//! ## Architecture
//!
//! The [`graph::Graph`] owns nodes and edges; [`node::NodeRegistry`]
//! describes every node type's shape and is passed explicitly into
//! [`compile::compile`], which produces one [`compile::MaterialProgram`]
//! per output node. Programs from one pass share a single
//! [`expr::ExprArena`], so common upstream subgraphs compile once and are
//! shared by identity.

pub mod compile;
pub mod edge;
pub mod expr;
pub mod graph;
pub mod material;
pub mod node;
pub mod socket;

pub use compile::{compile, CompileError, CompileFailure, CompileReport, MaterialProgram};
pub use edge::{Edge, EdgeId};
pub use expr::{EvalInputs, Expr, ExprArena, ExprId, GeometryInput, OpKind};
pub use graph::{CycleError, EdgeError, Graph};
pub use material::{create_material_registry, Channel, MaterialArchetype};
pub use node::{Node, NodeCategory, NodeId, NodeRegistry, NodeRole, NodeType};
pub use socket::{coercion, Coercion, InputSocket, OutputSocket, SocketType, Value, ValueType};
