// Shared fixtures for the evaluator integration tests.
#![allow(dead_code)]

use std::rc::Rc;

use phpintel::eval::{Definition, Evaluator, Reply, Trigger, TriggerKind};
use phpintel::libs::{BlobStore, Buffer, ImportHandler, Library, NullController, Stdlib};
use phpintel::model::{Element, ScopeRef};

pub fn lpath(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Buffer over `blob` with an empty stdlib and an empty federation store.
pub fn buffer(blob: Element) -> Buffer {
    buffer_with(blob, Stdlib::empty(), BlobStore::new("workspace"))
}

/// Buffer over `blob`. The store doubles as the import handler and is
/// registered as a federation library.
pub fn buffer_with(blob: Element, stdlib: Stdlib, store: BlobStore) -> Buffer {
    let blob = Rc::new(blob);
    let stdlib = Rc::new(stdlib);
    let store = Rc::new(store);
    let mut buf = Buffer::new(
        blob,
        Rc::clone(&stdlib),
        Rc::clone(&store) as Rc<dyn ImportHandler>,
    );
    buf.add_lib(store as Rc<dyn Library>);
    buf
}

/// Evaluate one trigger from the given start scope.
pub fn eval_at(buf: &Buffer, kind: TriggerKind, expr: &str, scope: &[&str]) -> Reply {
    let start_scope = ScopeRef::new(Rc::clone(buf.blob()), lpath(scope));
    let ctlr = NullController;
    Evaluator::new(buf, &ctlr, Trigger::new(kind, expr), start_scope)
        .run()
        .expect("evaluation failed fatally")
}

pub fn completion_pairs(reply: &Reply) -> Vec<(String, String)> {
    match reply {
        Reply::Completions(items) => items
            .iter()
            .map(|c| (c.kind.as_str().to_string(), c.name.clone()))
            .collect(),
        other => panic!("expected completions, got {other:?}"),
    }
}

pub fn calltips(reply: &Reply) -> Vec<String> {
    match reply {
        Reply::Calltips(items) => items.clone(),
        other => panic!("expected calltips, got {other:?}"),
    }
}

pub fn definitions(reply: &Reply) -> Vec<Definition> {
    match reply {
        Reply::Definitions(items) => items.clone(),
        other => panic!("expected definitions, got {other:?}"),
    }
}

pub fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(kind, name)| (kind.to_string(), name.to_string()))
        .collect()
}
