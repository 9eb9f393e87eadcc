// Tests for CITDL resolution through the hit engine: scope walks, type
// hops, imports, the federation sweep, and the recursion guard.

mod common;

use std::rc::Rc;

use common::{buffer, buffer_with, calltips, completion_pairs, definitions, eval_at, lpath, pairs};
use phpintel::eval::{CompletionKind, Evaluator, Trigger, TriggerKind};
use phpintel::libs::{BlobStore, FlagController, Stdlib};
use phpintel::model::{Attribute, Element, ScopeRef};

#[test]
fn test_variable_type_hop_resolves_members() {
    let blob = Element::blob("buf")
        .with_child(
            Element::class("DB")
                .with_child(Element::function("query"))
                .with_child(Element::function("close")),
        )
        .with_child(Element::variable("db").with_citdl("DB"));
    let buf = buffer(blob);
    let reply = eval_at(&buf, TriggerKind::Members, "db", &[]);
    assert_eq!(
        completion_pairs(&reply),
        pairs(&[("function", "close"), ("function", "query")])
    );
}

#[test]
fn test_call_hop_follows_the_return_type() {
    let blob = Element::blob("buf")
        .with_child(Element::class("DB").with_child(Element::function("query")))
        .with_child(Element::function("connect").with_returns("DB"));
    let buf = buffer(blob);
    let reply = eval_at(&buf, TriggerKind::Members, "connect()", &[]);
    assert_eq!(completion_pairs(&reply), pairs(&[("function", "query")]));
}

#[test]
fn test_function_without_return_type_yields_nothing() {
    let blob = Element::blob("buf").with_child(Element::function("mystery"));
    let buf = buffer(blob);
    let reply = eval_at(&buf, TriggerKind::Members, "mystery()", &[]);
    assert!(completion_pairs(&reply).is_empty());
}

#[test]
fn test_unresolved_first_part_becomes_empty_reply() {
    let buf = buffer(Element::blob("buf"));
    let reply = eval_at(&buf, TriggerKind::Members, "ghost", &[]);
    assert!(completion_pairs(&reply).is_empty());
}

#[test]
fn test_superclass_member_resolution() {
    let blob = Element::blob("buf")
        .with_child(Element::class("Animal").with_child(Element::function("speak")))
        .with_child(
            Element::class("Dog").with_classrefs(vec!["Animal".to_string()]),
        );
    let buf = buffer(blob);
    let reply = eval_at(&buf, TriggerKind::Calltip, "Dog.speak", &[]);
    assert_eq!(calltips(&reply), vec!["speak(...)"]);
}

#[test]
fn test_recursion_guard_retries_from_parent_scope() {
    // The class variable shadows the class's own name, so the inner type
    // inference keeps re-entering "X" until the guard escalates to the
    // global scope where the class itself wins.
    let blob = Element::blob("buf").with_child(
        Element::class("X")
            .with_child(Element::variable("X").with_citdl("X"))
            .with_child(Element::function("foo").with_signature("foo($n)")),
    );
    let buf = buffer(blob);
    let reply = eval_at(&buf, TriggerKind::Calltip, "X.foo", &["X"]);
    assert_eq!(calltips(&reply), vec!["foo($n)"]);
}

#[test]
fn test_recursion_guard_defn_lands_on_the_member() {
    let blob = Element::blob("buf").with_child(
        Element::class("X")
            .with_child(Element::variable("X").with_citdl("X"))
            .with_child(Element::function("foo")),
    );
    let buf = buffer(blob);
    let defns = definitions(&eval_at(&buf, TriggerKind::Defn, "X.foo", &["X"]));
    assert_eq!(defns.len(), 1);
    assert_eq!(defns[0].name, "foo");
    assert_eq!(defns[0].kind, CompletionKind::Function);
    assert_eq!(defns[0].lpath, lpath(&["X", "foo"]));
}

#[test]
fn test_include_everything_matches_the_longest_prefix() {
    let pkg = Rc::new(
        Element::blob("pkglib").with_child(
            Element::class("Pkg").with_child(
                Element::class("Sub")
                    .with_child(Element::function("f").with_signature("f($x)")),
            ),
        ),
    );
    let mut store = BlobStore::new("workspace");
    store.add_blob(pkg);
    let buf = buffer_with(Element::blob("buf"), Stdlib::empty(), store);

    let reply = eval_at(&buf, TriggerKind::Calltip, "Pkg.Sub.f", &[]);
    assert_eq!(calltips(&reply), vec!["f($x)"]);

    let defns = definitions(&eval_at(&buf, TriggerKind::Defn, "Pkg.Sub.f", &[]));
    assert_eq!(defns[0].blob, "pkglib");
    assert_eq!(defns[0].lpath, lpath(&["Pkg", "Sub", "f"]));
}

#[test]
fn test_direct_import_resolves_symbols() {
    let helpers = Rc::new(
        Element::blob("helpers.php")
            .with_child(Element::function("helper_fn").with_signature("helper_fn($arg)")),
    );
    let mut store = BlobStore::new("workspace");
    store.add_blob(helpers);
    let blob = Element::blob("buf").with_child(Element::import("helpers.php"));
    let buf = buffer_with(blob, Stdlib::empty(), store);
    let reply = eval_at(&buf, TriggerKind::Calltip, "helper_fn", &[]);
    assert_eq!(calltips(&reply), vec!["helper_fn($arg)"]);
}

#[test]
fn test_absolute_import_spec_retries_without_the_leading_slash() {
    let helpers = Rc::new(
        Element::blob("helpers.php").with_child(Element::function("helper_fn")),
    );
    let mut store = BlobStore::new("workspace");
    store.add_blob(helpers);
    // The parser recorded an absolute include path the store cannot serve.
    let blob = Element::blob("buf").with_child(Element::import("/helpers.php"));
    let buf = buffer_with(blob, Stdlib::empty(), store);
    let reply = eval_at(&buf, TriggerKind::Calltip, "helper_fn", &[]);
    assert_eq!(calltips(&reply), vec!["helper_fn(...)"]);
}

#[test]
fn test_not_yet_defined_hits_are_never_returned() {
    let blob = Element::blob("buf").with_child(
        Element::variable("pending")
            .with_attributes(vec![Attribute::NotYetDefined])
            .with_citdl("DB"),
    );
    let buf = buffer(blob);
    assert!(completion_pairs(&eval_at(&buf, TriggerKind::Members, "pending", &[])).is_empty());
    assert!(definitions(&eval_at(&buf, TriggerKind::Defn, "pending", &[])).is_empty());
}

#[test]
fn test_defn_keeps_the_variable_itself() {
    let blob = Element::blob("buf")
        .with_child(Element::class("DB").with_child(Element::function("query")))
        .with_child(Element::variable("db").with_citdl("DB"));
    let buf = buffer(blob);
    let defns = definitions(&eval_at(&buf, TriggerKind::Defn, "db", &[]));
    assert_eq!(defns[0].name, "db");
    assert_eq!(defns[0].kind, CompletionKind::Variable);
    assert_eq!(defns[0].lpath, lpath(&["db"]));
}

#[test]
fn test_broken_start_scope_is_a_fatal_error() {
    let buf = buffer(Element::blob("buf"));
    let start_scope = ScopeRef::new(Rc::clone(buf.blob()), lpath(&["NoSuchScope"]));
    let ctlr = phpintel::libs::NullController;
    let result = Evaluator::new(
        &buf,
        &ctlr,
        Trigger::new(TriggerKind::Members, "anything"),
        start_scope,
    )
    .run();
    assert!(result.is_err());
}

#[test]
fn test_cancelled_evaluation_returns_an_empty_reply() {
    let blob = Element::blob("buf").with_child(Element::variable("x").with_citdl("X"));
    let buf = buffer(blob);
    let ctlr = FlagController::new();
    ctlr.cancel();
    let start_scope = ScopeRef::new(Rc::clone(buf.blob()), Vec::new());
    let reply = Evaluator::new(
        &buf,
        &ctlr,
        Trigger::new(TriggerKind::Variables, "x"),
        start_scope,
    )
    .run()
    .unwrap();
    assert!(reply.is_empty());
}
