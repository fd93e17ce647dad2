//! Reclaiming scopes kept alive only by reference cycles
//!
//! A function declared in a scope is bound there and also captures it, so
//! the two hold each other through `Rc` and would never be freed. When a
//! scope is left while something besides its frame still holds it, the
//! heap reachable from it is counted: a node whose strong count is fully
//! explained by references from other visited nodes can only be reached
//! through them. Nodes that no outside reference leads to are emptied,
//! which breaks their cycles and lets `Rc` free them.
//!
//! Scopes that survive are remembered weakly and examined again once
//! enough of them pile up, because the closure that kept one alive may be
//! dropped later.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexSet;
use tracing::trace;

use super::{Scope, ScopeRef};
use crate::value::{ArrayRef, ClassValue, FunctionValue, InstanceValue, ObjectRef, Value};

/// Deferred sweeps never run for fewer pending scopes than this.
const MIN_SWEEP: usize = 64;

/// Identity of a heap node: the address of its `Rc` allocation.
pub(super) type NodeId = *const ();

/// Scopes that outlived their frame, held weakly until the next sweep.
#[derive(Debug, Default)]
pub(super) struct CycleCollector {
    pending: Vec<Weak<RefCell<Scope>>>,
    sweep_at: usize,
}

impl CycleCollector {
    /// Dispose of the handle to a scope that was just left.
    ///
    /// `current` is the scope execution continues in; it and its
    /// ancestors are in use and never examined.
    pub(super) fn release(&mut self, scope: ScopeRef, current: &ScopeRef) {
        // Nothing else holds it, so dropping the handle frees it
        if Rc::strong_count(&scope) == 1 {
            return;
        }

        let active = active_chain(current);
        let survivors = collect(vec![scope], &active);
        self.defer(survivors);

        if self.pending.len() >= self.sweep_at.max(MIN_SWEEP) {
            self.sweep(&active);
        }
    }

    /// Examine every pending scope that is still alive.
    pub(super) fn sweep(&mut self, active: &IndexSet<NodeId>) {
        let roots: Vec<ScopeRef> = self.pending.drain(..).filter_map(|s| s.upgrade()).collect();
        let survivors = collect(roots, active);
        self.defer(survivors);
        self.sweep_at = self.pending.len() * 2;
    }

    /// Examine a global scope that was replaced, along with everything
    /// pending. Nothing is running any more, so no scope counts as active.
    pub(super) fn retire(&mut self, globals: ScopeRef) {
        let mut roots: Vec<ScopeRef> = self.pending.drain(..).filter_map(|s| s.upgrade()).collect();
        roots.push(globals);
        let survivors = collect(roots, &IndexSet::new());
        self.defer(survivors);
        self.sweep_at = self.pending.len() * 2;
    }

    fn defer(&mut self, survivors: Vec<ScopeRef>) {
        self.pending.extend(survivors.iter().map(Rc::downgrade));
    }
}

/// The running scope and every scope enclosing it.
pub(super) fn active_chain(current: &ScopeRef) -> IndexSet<NodeId> {
    let mut chain = IndexSet::new();
    let mut cursor = Some(Rc::clone(current));
    while let Some(scope) = cursor {
        chain.insert(Rc::as_ptr(&scope).cast::<()>());
        cursor = scope.borrow().parent.clone();
    }
    chain
}

// ═══════════════════════════════════════════════════════════════════════
// Heap Nodes
// ═══════════════════════════════════════════════════════════════════════

/// A shared allocation that can take part in a cycle.
enum Node {
    Scope(ScopeRef),
    Array(ArrayRef),
    Object(ObjectRef),
    Instance(Rc<InstanceValue>),
    Function(Rc<FunctionValue>),
    Class(Rc<ClassValue>),
}

impl Node {
    fn of(value: &Value) -> Option<Node> {
        match value {
            Value::Array(items) => Some(Node::Array(Rc::clone(items))),
            Value::Object(entries) => Some(Node::Object(Rc::clone(entries))),
            Value::Instance(instance) => Some(Node::Instance(Rc::clone(instance))),
            Value::Function(func) => Some(Node::Function(Rc::clone(func))),
            Value::Class(class) => Some(Node::Class(Rc::clone(class))),
            _ => None,
        }
    }

    fn id(&self) -> NodeId {
        match self {
            Node::Scope(rc) => Rc::as_ptr(rc).cast::<()>(),
            Node::Array(rc) => Rc::as_ptr(rc).cast::<()>(),
            Node::Object(rc) => Rc::as_ptr(rc).cast::<()>(),
            Node::Instance(rc) => Rc::as_ptr(rc).cast::<()>(),
            Node::Function(rc) => Rc::as_ptr(rc).cast::<()>(),
            Node::Class(rc) => Rc::as_ptr(rc).cast::<()>(),
        }
    }

    fn strong_count(&self) -> usize {
        match self {
            Node::Scope(rc) => Rc::strong_count(rc),
            Node::Array(rc) => Rc::strong_count(rc),
            Node::Object(rc) => Rc::strong_count(rc),
            Node::Instance(rc) => Rc::strong_count(rc),
            Node::Function(rc) => Rc::strong_count(rc),
            Node::Class(rc) => Rc::strong_count(rc),
        }
    }

    /// Everything this node holds strongly, or `None` if it is borrowed
    /// right now and cannot be inspected.
    fn children(&self) -> Option<Vec<Node>> {
        let children = match self {
            Node::Scope(scope) => {
                let scope = scope.try_borrow().ok()?;
                let nodes: Vec<Node> = scope
                    .bindings
                    .values()
                    .filter_map(|binding| Node::of(&binding.value))
                    .chain(scope.parent.iter().map(|p| Node::Scope(Rc::clone(p))))
                    .collect();
                nodes
            }
            Node::Array(items) => items.try_borrow().ok()?.iter().filter_map(Node::of).collect(),
            Node::Object(entries) => entries
                .try_borrow()
                .ok()?
                .values()
                .filter_map(Node::of)
                .collect(),
            Node::Instance(instance) => {
                let fields = instance.fields.try_borrow().ok()?;
                let mut nodes: Vec<Node> = fields.values().filter_map(Node::of).collect();
                nodes.push(Node::Class(Rc::clone(&instance.class)));
                nodes
            }
            Node::Function(func) => {
                let mut nodes = vec![Node::Scope(Rc::clone(&func.closure))];
                nodes.extend(func.receiver.as_ref().and_then(Node::of));
                nodes
            }
            Node::Class(class) => vec![Node::Scope(Rc::clone(&class.closure))],
        };
        Some(children)
    }

    /// Drop the references this node holds. Functions and classes are
    /// immutable; emptying the scopes they capture is enough.
    fn clear(&self) {
        match self {
            Node::Scope(scope) => {
                let taken = scope
                    .try_borrow_mut()
                    .map(|mut scope| std::mem::take(&mut scope.bindings));
                drop(taken);
            }
            Node::Array(items) => {
                let taken = items.try_borrow_mut().map(|mut items| std::mem::take(&mut *items));
                drop(taken);
            }
            Node::Object(entries) => {
                let taken = entries
                    .try_borrow_mut()
                    .map(|mut entries| std::mem::take(&mut *entries));
                drop(taken);
            }
            Node::Instance(instance) => {
                let taken = instance
                    .fields
                    .try_borrow_mut()
                    .map(|mut fields| std::mem::take(&mut *fields));
                drop(taken);
            }
            Node::Function(_) | Node::Class(_) => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Trial Deletion
// ═══════════════════════════════════════════════════════════════════════

struct Entry {
    node: Node,

    /// Strong references explained by visited nodes and by the root handles
    accounted: usize,

    /// Indices of the nodes this one references
    edges: Vec<usize>,

    /// Could not be inspected, so assumed reachable
    opaque: bool,
}

struct Graph {
    ids: IndexSet<NodeId>,
    entries: Vec<Entry>,
    queue: Vec<usize>,
}

impl Graph {
    fn new() -> Self {
        Self {
            ids: IndexSet::new(),
            entries: Vec::new(),
            queue: Vec::new(),
        }
    }

    fn discover(&mut self, node: Node) -> usize {
        let (index, inserted) = self.ids.insert_full(node.id());
        if inserted {
            self.entries.push(Entry {
                node,
                accounted: 0,
                edges: Vec::new(),
                opaque: false,
            });
            self.queue.push(index);
        }
        index
    }
}

/// Clear whatever is reachable from `roots` but provably unreachable from
/// anywhere else, and return the roots that are still in use.
///
/// Scopes in `active` are treated as referenced from outside and not
/// traversed.
fn collect(roots: Vec<ScopeRef>, active: &IndexSet<NodeId>) -> Vec<ScopeRef> {
    let mut graph = Graph::new();

    for root in &roots {
        if active.contains(&Rc::as_ptr(root).cast::<()>()) {
            continue;
        }
        let index = graph.discover(Node::Scope(Rc::clone(root)));
        graph.entries[index].accounted += 1;
    }

    while let Some(index) = graph.queue.pop() {
        let Some(children) = graph.entries[index].node.children() else {
            graph.entries[index].opaque = true;
            continue;
        };
        for child in children {
            if active.contains(&child.id()) {
                continue;
            }
            let child = graph.discover(child);
            graph.entries[child].accounted += 1;
            graph.entries[index].edges.push(child);
        }
    }

    // Anything referenced from outside the graph is live, and so is
    // everything it reaches. The graph itself holds one clone per node.
    let mut live = vec![false; graph.entries.len()];
    let mut stack = Vec::new();
    for (index, entry) in graph.entries.iter().enumerate() {
        let outside = entry.node.strong_count().saturating_sub(1 + entry.accounted);
        if entry.opaque || outside > 0 {
            live[index] = true;
            stack.push(index);
        }
    }
    while let Some(index) = stack.pop() {
        for &child in &graph.entries[index].edges {
            if !live[child] {
                live[child] = true;
                stack.push(child);
            }
        }
    }

    let mut freed = 0;
    for (entry, _) in graph.entries.iter().zip(&live).filter(|(_, live)| !**live) {
        if matches!(entry.node, Node::Scope(_)) {
            freed += 1;
        }
        entry.node.clear();
    }
    trace!(visited = graph.entries.len(), freed, "collected scope cycles");

    let mut kept = IndexSet::new();
    roots
        .into_iter()
        .filter(|root| {
            let id = Rc::as_ptr(root).cast::<()>();
            let in_use = graph.ids.get_index_of(&id).map_or(true, |index| live[index]);
            in_use && kept.insert(id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::environment::BindingMode;
    use crate::eval::call_value;
    use crate::eval::test_support::eval;
    use crate::lexer::Span;
    use crate::parser::parse_source;
    use crate::{Environment, EvalContext};

    fn define_fn(env: &mut Environment, source: &str) {
        let program = parse_source(source).expect("parse failed");
        crate::interpreter::run(&program, env, &EvalContext::new()).expect("run failed");
    }

    #[test]
    fn test_call_scope_with_local_function_is_freed() {
        let mut env = Environment::new();
        define_fn(&mut env, "function f(a) { function g() { return 1; } return 0; }");

        let array = Value::array(vec![Value::Integer(1)]);
        let weak = match &array {
            Value::Array(items) => Rc::downgrade(items),
            _ => unreachable!(),
        };

        let f = env.get("f").expect("f is defined");
        let result = call_value(&f, vec![array], Span::new(1, 1), &mut env, &EvalContext::new());
        assert_eq!(result.unwrap(), Value::Integer(0));
        assert!(weak.upgrade().is_none(), "call scope was not freed");
    }

    #[test]
    fn test_block_scope_with_local_function_is_freed() {
        let mut env = Environment::new();
        let program = parse_source("function g() {}").expect("parse failed");
        let decl = match &program.statements[0].kind {
            crate::ast::StmtKind::Function(decl) => Rc::clone(decl),
            other => panic!("expected function, got {other:?}"),
        };

        let array = Value::array(vec![Value::Integer(1)]);
        let weak = match &array {
            Value::Array(items) => Rc::downgrade(items),
            _ => unreachable!(),
        };

        {
            let mut guard = env.scope_guard();
            guard.define_with_mode("held", array, BindingMode::Constant);
            let func = FunctionValue::new(decl, guard.current_scope());
            guard.define("g", Value::function(func));
        }

        assert!(weak.upgrade().is_none(), "block scope was not freed");
        assert!(env.is_global_scope());
    }

    #[test]
    fn test_escaping_closure_keeps_scope() {
        let source = r#"
            function counter() {
                let n = 0;
                function next() { n = n + 1; return n; }
                return next;
            }
            let tick = counter();
            tick(); tick();
            tick();
        "#;
        assert_eq!(eval(source).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_closure_dropped_later_is_swept() {
        let mut env = Environment::new();
        define_fn(
            &mut env,
            "function make() { let box = {}; box.get = () => box; return box; }",
        );

        let make = env.get("make").expect("make is defined");
        let boxed = call_value(&make, vec![], Span::new(1, 1), &mut env, &EvalContext::new())
            .expect("call failed");
        let weak = match &boxed {
            Value::Object(entries) => Rc::downgrade(entries),
            _ => unreachable!(),
        };

        // Still reachable: the sweep must leave it intact
        env.collect_cycles();
        assert!(weak.upgrade().is_some());

        drop(boxed);
        env.collect_cycles();
        assert!(weak.upgrade().is_none(), "unreachable cycle survived a sweep");
    }

    #[test]
    fn test_many_live_closures_survive_sweeps() {
        let source = r#"
            let fs = [];
            for (let i = 0; i < 500; i = i + 1) {
                let k = i;
                fs[i] = () => k;
            }
            let total = 0;
            foreach (f : fs) total = total + f();
            total;
        "#;
        assert_eq!(eval(source).unwrap(), Value::Integer(124750));
    }
}
