//! Heap accounting and cycle collection for the runtime.
//!
//! Objects are reference counted; every live `JsObject` is counted in a
//! thread-local tally so that an optional limit can be enforced when new
//! objects are requested by script code.
//!
//! Reference counting alone never frees a cycle (a function and its
//! `prototype`, a closure and its scope). Every object and environment is
//! therefore also registered weakly, and [`collect_cycles`] reclaims the
//! ones that are only referenced from each other. A node whose strong count
//! exceeds the references other heap nodes hold to it is owned from outside
//! the heap (the realm, the stacks, a host variable) and keeps everything it
//! reaches alive. The rest is garbage and has its references cleared.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::debug;

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::lex_env::{JsLexEnvironmentType, LexEnvironment};
use crate::runner::ds::object::{JsObject, JsObjectType};
use crate::runner::ds::value::JsValue;

/// Live object count at which an unlimited heap first looks for cycles.
pub const COLLECTION_THRESHOLD: usize = 10_000;

const PRUNE_FLOOR: usize = 1024;

thread_local! {
    static LIVE_OBJECTS: Cell<usize> = const { Cell::new(0) };
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

pub(crate) fn track_object() {
    LIVE_OBJECTS.with(|c| c.set(c.get() + 1));
}

pub(crate) fn untrack_object() {
    LIVE_OBJECTS.with(|c| c.set(c.get().saturating_sub(1)));
}

/// Number of objects currently alive on this thread.
pub fn live_objects() -> usize {
    LIVE_OBJECTS.with(|c| c.get())
}

pub(crate) fn register_object(o: &JsObjectType) {
    REGISTRY.with(|r| r.borrow_mut().objects.push(o));
}

pub(crate) fn register_environment(env: &JsLexEnvironmentType) {
    REGISTRY.with(|r| r.borrow_mut().environments.push(env));
}

/// Weak handles to every node of one kind. Dead entries are pruned once the
/// list doubles.
struct WeakList<T> {
    items: Vec<Weak<T>>,
    prune_at: usize,
}

impl<T> Default for WeakList<T> {
    fn default() -> Self {
        WeakList {
            items: Vec::new(),
            prune_at: PRUNE_FLOOR,
        }
    }
}

impl<T> WeakList<T> {
    fn push(&mut self, item: &Rc<T>) {
        self.items.push(Rc::downgrade(item));
        if self.items.len() >= self.prune_at {
            self.items.retain(|w| w.strong_count() > 0);
            self.prune_at = (self.items.len() * 2).max(PRUNE_FLOOR);
        }
    }

    fn upgrade_all(&mut self) -> Vec<Rc<T>> {
        self.items.retain(|w| w.strong_count() > 0);
        self.items.iter().filter_map(Weak::upgrade).collect()
    }
}

#[derive(Default)]
struct Registry {
    objects: WeakList<RefCell<JsObject>>,
    environments: WeakList<RefCell<LexEnvironment>>,
}

/// A strong reference from one heap node to another, by address.
pub(crate) struct HeapRef(usize);

impl HeapRef {
    pub(crate) fn object(o: &JsObjectType) -> Self {
        HeapRef(Rc::as_ptr(o) as usize)
    }

    pub(crate) fn environment(env: &JsLexEnvironmentType) -> Self {
        HeapRef(Rc::as_ptr(env) as usize)
    }

    pub(crate) fn value(v: &JsValue) -> Option<Self> {
        v.object_ptr().map(|p| HeapRef(p as usize))
    }
}

enum Node {
    Object(JsObjectType),
    Environment(JsLexEnvironmentType),
}

impl Node {
    fn address(&self) -> usize {
        match self {
            Node::Object(o) => Rc::as_ptr(o) as usize,
            Node::Environment(e) => Rc::as_ptr(e) as usize,
        }
    }

    fn strong_count(&self) -> usize {
        match self {
            Node::Object(o) => Rc::strong_count(o),
            Node::Environment(e) => Rc::strong_count(e),
        }
    }

    /// `None` when the node is borrowed and cannot be inspected.
    fn trace(&self) -> Option<Vec<HeapRef>> {
        let mut out = Vec::new();
        match self {
            Node::Object(o) => o.try_borrow().ok()?.trace(&mut out),
            Node::Environment(e) => e.try_borrow().ok()?.trace(&mut out),
        }
        Some(out)
    }

    /// The references the node held, to be dropped once every borrow is
    /// released.
    fn sever(&self) -> Option<Box<dyn Any>> {
        match self {
            Node::Object(o) => Some(Box::new(o.try_borrow_mut().ok()?.sever())),
            Node::Environment(e) => Some(Box::new(e.try_borrow_mut().ok()?.sever())),
        }
    }
}

/// Frees every object and environment that is only reachable from other
/// garbage. Returns the number of objects freed.
pub fn collect_cycles() -> usize {
    let before = live_objects();
    let nodes: Vec<Node> = REGISTRY.with(|r| {
        let mut r = r.borrow_mut();
        let objects = r.objects.upgrade_all().into_iter().map(Node::Object);
        let environments = r.environments.upgrade_all().into_iter().map(Node::Environment);
        objects.chain(environments).collect()
    });
    let index: HashMap<usize, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.address(), i))
        .collect();

    // References from outside the heap. `nodes` itself holds one of each.
    let mut external: Vec<isize> = nodes.iter().map(|n| n.strong_count() as isize - 1).collect();
    let mut edges: Vec<Vec<usize>> = Vec::with_capacity(nodes.len());
    let mut pinned = vec![false; nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        let mut targets = Vec::new();
        match node.trace() {
            Some(refs) => {
                for HeapRef(address) in refs {
                    if let Some(&j) = index.get(&address) {
                        external[j] -= 1;
                        targets.push(j);
                    }
                }
            }
            None => pinned[i] = true,
        }
        edges.push(targets);
    }

    let mut reachable = vec![false; nodes.len()];
    let mut pending: Vec<usize> = (0..nodes.len())
        .filter(|&i| external[i] > 0 || pinned[i])
        .collect();
    while let Some(i) = pending.pop() {
        if reachable[i] {
            continue;
        }
        reachable[i] = true;
        pending.extend(edges[i].iter().copied().filter(|&j| !reachable[j]));
    }

    let severed: Vec<Box<dyn Any>> = nodes
        .iter()
        .zip(&reachable)
        .filter(|(_, &live)| !live)
        .filter_map(|(n, _)| n.sever())
        .collect();
    let garbage = severed.len();
    drop(severed);
    drop(nodes);

    let freed = before.saturating_sub(live_objects());
    debug!("cycle collection: {} unreachable nodes, {} objects freed", garbage, freed);
    freed
}

/// Configuration for the heap manager.
#[derive(Debug, Clone, Default)]
pub struct HeapConfig {
    /// Maximum number of live objects. None means unlimited.
    pub max_objects: Option<usize>,
}

impl HeapConfig {
    pub fn unlimited() -> Self {
        HeapConfig { max_objects: None }
    }

    pub fn with_limit(max_objects: usize) -> Self {
        HeapConfig {
            max_objects: Some(max_objects),
        }
    }
}

/// Enforces the configured object limit and decides when to collect.
#[derive(Debug)]
pub struct Heap {
    config: HeapConfig,
    peak: usize,
    next_collection: usize,
}

impl Default for Heap {
    fn default() -> Self {
        Heap::new(HeapConfig::default())
    }
}

impl Heap {
    pub fn new(config: HeapConfig) -> Self {
        Heap {
            config,
            peak: 0,
            next_collection: COLLECTION_THRESHOLD,
        }
    }

    fn at_limit(&self, live: usize) -> bool {
        self.config.max_objects.map_or(false, |max| live >= max)
    }

    /// Checks that one more object fits, collecting cycles first when the
    /// limit or the collection threshold is reached. Raises a RangeError if
    /// the object still does not fit.
    pub fn allocate(&mut self) -> Result<(), JErrorType> {
        let mut live = live_objects();
        if live >= self.next_collection || self.at_limit(live) {
            collect_cycles();
            live = live_objects();
            self.next_collection = live.saturating_mul(2).max(COLLECTION_THRESHOLD);
        }
        if self.at_limit(live) {
            return Err(Message::OutOfMemory.into());
        }
        self.peak = self.peak.max(live + 1);
        Ok(())
    }

    pub fn can_allocate(&self) -> bool {
        !self.at_limit(live_objects())
    }

    /// Highest live count seen by `allocate`.
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn max_objects(&self) -> Option<usize> {
        self.config.max_objects
    }

    /// Remaining headroom, if limited.
    pub fn available(&self) -> Option<usize> {
        self.config
            .max_objects
            .map(|max| max.saturating_sub(live_objects()))
    }
}
