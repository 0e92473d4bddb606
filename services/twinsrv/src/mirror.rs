//! Address-space mirror
//!
//! In-memory tree of named, typed variables representing the current
//! motor state: `Motor50CV/{Electrical,Environment,Vibration}/<leaves>`.
//! The tree shape is fixed at startup; only leaf values change after
//! that, so the node table itself needs no locking and values live in
//! atomics. Structured events flow through a broadcast channel; the
//! mirror keeps one subscriber of its own so emission stays decoupled
//! from whoever is (or is not) listening.

use scgdi_model::{Domain, Severity, MOTOR_NODE_NAME};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;

/// Name of the custom event schema layered over the base event
pub const EVENT_TYPE_NAME: &str = "SCGDIEventType";

/// Default capacity of the event broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

pub type MirrorResult<T> = std::result::Result<T, MirrorError>;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    #[error("Node is not writable: {0}")]
    NotWritable(String),

    #[error("Node is not an event source: {0}")]
    NotEventSource(String),

    #[error("Event emission failed: {0}")]
    EmitFailed(String),
}

/// Handle to a variable leaf, valid for the lifetime of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarHandle(usize);

/// Generic base event fields
#[derive(Debug, Clone, Serialize)]
pub struct BaseEvent {
    pub event_type: &'static str,
    pub time: String,
    pub source: String,
    pub severity: u16,
}

/// Custom event schema: Category and Message text fields over the base
#[derive(Debug, Clone, Serialize)]
pub struct MotorEvent {
    #[serde(flatten)]
    pub base: BaseEvent,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Object,
    Variable,
}

#[derive(Debug)]
struct Node {
    name: String,
    path: String,
    kind: NodeKind,
    writable: bool,
    historized: bool,
    event_source: bool,
    /// Index into `values` for variable nodes
    value_slot: Option<usize>,
}

/// Snapshot of one node for the browse surface
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub writable: bool,
    pub historized: bool,
    pub event_source: bool,
}

/// Capability interface the ingestion pipeline consumes.
///
/// `emit_event` is best-effort for callers: a failure must never abort
/// the surrounding pipeline stage. On success it returns the path of
/// the node the event was actually emitted from.
pub trait AddressSpace: Send + Sync {
    fn write(&self, handle: VarHandle, value: f64) -> MirrorResult<()>;
    fn emit_event(
        &self,
        source: &str,
        category: &str,
        message: &str,
        severity: Severity,
    ) -> MirrorResult<String>;
}

pub struct MirrorTree {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    values: Vec<AtomicU64>,
    events: broadcast::Sender<MotorEvent>,
    // Keeps the channel open so emission succeeds with no external subscriber
    _retained: broadcast::Receiver<MotorEvent>,
}

impl MirrorTree {
    fn new(event_capacity: usize) -> Self {
        let (events, retained) = broadcast::channel(event_capacity);
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            values: Vec::new(),
            events,
            _retained: retained,
        }
    }

    fn add_node(&mut self, parent: Option<&str>, name: &str, kind: NodeKind) -> usize {
        let path = match parent {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.to_string(),
        };
        let value_slot = match kind {
            NodeKind::Variable => {
                self.values.push(AtomicU64::new(0.0f64.to_bits()));
                Some(self.values.len() - 1)
            }
            NodeKind::Object => None,
        };
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            path: path.clone(),
            kind,
            writable: false,
            historized: false,
            event_source: false,
            value_slot,
        });
        self.index.insert(path, id);
        id
    }

    /// Add an object node under `parent` (or as a root), returning its path
    pub fn create_object(&mut self, parent: Option<&str>, name: &str) -> String {
        let id = self.add_node(parent, name, NodeKind::Object);
        self.nodes[id].path.clone()
    }

    /// Add a variable leaf with an initial value
    pub fn create_variable(&mut self, parent: &str, name: &str, initial: f64) -> VarHandle {
        let id = self.add_node(Some(parent), name, NodeKind::Variable);
        if let Some(slot) = self.nodes[id].value_slot {
            self.values[slot].store(initial.to_bits(), Ordering::Relaxed);
        }
        VarHandle(id)
    }

    pub fn set_writable(&mut self, handle: VarHandle) {
        self.nodes[handle.0].writable = true;
    }

    /// Mark a node as an event source (SubscribeToEvents notifier)
    pub fn set_event_source(&mut self, path: &str) -> MirrorResult<()> {
        let id = *self
            .index
            .get(path)
            .ok_or_else(|| MirrorError::UnknownNode(path.to_string()))?;
        self.nodes[id].event_source = true;
        Ok(())
    }

    /// Enable history capture on a node
    pub fn attach_history(&mut self, path: &str) -> MirrorResult<()> {
        let id = *self
            .index
            .get(path)
            .ok_or_else(|| MirrorError::UnknownNode(path.to_string()))?;
        self.nodes[id].historized = true;
        Ok(())
    }

    /// Current value of a variable leaf
    pub fn read(&self, handle: VarHandle) -> MirrorResult<f64> {
        let node = self
            .nodes
            .get(handle.0)
            .ok_or_else(|| MirrorError::UnknownNode(format!("handle {}", handle.0)))?;
        match node.value_slot {
            Some(slot) => Ok(f64::from_bits(self.values[slot].load(Ordering::Relaxed))),
            None => Err(MirrorError::NotWritable(node.path.clone())),
        }
    }

    /// Value of a variable by domain and leaf name
    pub fn value_of(&self, domain: Domain, name: &str) -> Option<f64> {
        let path = domain.qualified_path(name);
        let id = *self.index.get(&path)?;
        let slot = self.nodes[id].value_slot?;
        Some(f64::from_bits(self.values[slot].load(Ordering::Relaxed)))
    }

    /// Subscribe to the live event stream
    pub fn subscribe(&self) -> broadcast::Receiver<MotorEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the whole tree for the browse surface
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        self.nodes.iter().map(|n| self.node_snapshot(n)).collect()
    }

    /// Snapshot of one domain's leaves
    pub fn domain_snapshot(&self, domain: Domain) -> Vec<NodeSnapshot> {
        let prefix = format!("{}.{}.", MOTOR_NODE_NAME, domain.as_str());
        self.nodes
            .iter()
            .filter(|n| n.path.starts_with(&prefix))
            .map(|n| self.node_snapshot(n))
            .collect()
    }

    fn node_snapshot(&self, node: &Node) -> NodeSnapshot {
        NodeSnapshot {
            path: node.path.clone(),
            name: node.name.clone(),
            kind: node.kind,
            value: node
                .value_slot
                .map(|slot| f64::from_bits(self.values[slot].load(Ordering::Relaxed))),
            writable: node.writable,
            historized: node.historized,
            event_source: node.event_source,
        }
    }

    /// Variables have no event notifier: events sourced at a leaf are
    /// emitted from the owning domain node; anything unresolvable falls
    /// back to the device root.
    fn emitting_node(&self, source: &str) -> usize {
        let path = if let Some(domain) = Domain::of_variable(source) {
            format!("{}.{}", MOTOR_NODE_NAME, domain.as_str())
        } else if self.index.contains_key(source) {
            source.to_string()
        } else {
            MOTOR_NODE_NAME.to_string()
        };
        // The fixed tree always has the root and domain nodes
        self.index.get(&path).copied().unwrap_or(0)
    }

    /// Build the fixed Motor50CV tree: 19 writable, historized leaves
    /// across three domains, history and event sourcing enabled on the
    /// domain nodes and the device root.
    pub fn build_motor_tree() -> (MirrorTree, HashMap<&'static str, VarHandle>) {
        let mut tree = MirrorTree::new(EVENT_CHANNEL_CAPACITY);
        let mut handles = HashMap::new();

        let root = tree.create_object(None, MOTOR_NODE_NAME);
        for domain in [Domain::Electrical, Domain::Environment, Domain::Vibration] {
            let parent = tree.create_object(Some(&root), domain.as_str());
            for var in domain.variables() {
                let handle = tree.create_variable(&parent, var, 0.0);
                tree.set_writable(handle);
                // paths built from the fixed tables always resolve
                let _ = tree.attach_history(&domain.qualified_path(var));
                handles.insert(*var, handle);
            }
            let _ = tree.set_event_source(&parent);
            let _ = tree.attach_history(&parent);
        }
        let _ = tree.set_event_source(&root);
        let _ = tree.attach_history(&root);

        (tree, handles)
    }
}

impl AddressSpace for MirrorTree {
    fn write(&self, handle: VarHandle, value: f64) -> MirrorResult<()> {
        let node = self
            .nodes
            .get(handle.0)
            .ok_or_else(|| MirrorError::UnknownNode(format!("handle {}", handle.0)))?;
        if !node.writable {
            return Err(MirrorError::NotWritable(node.path.clone()));
        }
        match node.value_slot {
            Some(slot) => {
                self.values[slot].store(value.to_bits(), Ordering::Relaxed);
                Ok(())
            }
            None => Err(MirrorError::NotWritable(node.path.clone())),
        }
    }

    fn emit_event(
        &self,
        source: &str,
        category: &str,
        message: &str,
        severity: Severity,
    ) -> MirrorResult<String> {
        let emitting = &self.nodes[self.emitting_node(source)];
        if !emitting.event_source {
            return Err(MirrorError::NotEventSource(emitting.path.clone()));
        }
        let event = MotorEvent {
            base: BaseEvent {
                event_type: EVENT_TYPE_NAME,
                time: chrono::Utc::now().to_rfc3339(),
                source: emitting.path.clone(),
                severity: severity.value(),
            },
            category: category.to_string(),
            message: message.to_string(),
        };
        self.events
            .send(event)
            .map_err(|e| MirrorError::EmitFailed(e.to_string()))?;
        Ok(emitting.path.clone())
    }
}
