use veld_analysis::{AnalysisError, AnalysisHost, ScopeKind};
use veld_common::Span;
use veld_semantic::{SemScopeKind, SemanticDb, TreeBuilder};

struct Fixture {
    db: SemanticDb,
    file: veld_semantic::NodeId,
    class: veld_semantic::NodeId,
    local: veld_semantic::NodeId,
    param: veld_semantic::NodeId,
    field: veld_semantic::NodeId,
}

// package demo
// import other.Helper
// import wild.*
// class C {
//   val v          <- shadowed by the block-local `v`
//   fun m(p) {
//     { val v   <- query offset sits here }
//   }
// }
fn fixture() -> Fixture {
    let mut b = TreeBuilder::new();
    let other = b.package("other");
    let other_file = b.file(other, "helper.veld", Span::new(0, 100));
    let helper = b.class(other_file, "Helper", None, Span::new(0, 50));
    let wild = b.package("wild");
    let wild_file = b.file(wild, "w.veld", Span::new(0, 100));
    b.function(wild_file, "free", Span::new(0, 50));

    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 500));
    b.import(file, helper, None, Span::new(0, 10));
    b.import_star(file, wild, Span::new(10, 20));
    let class = b.class(file, "C", None, Span::new(20, 400));
    let field = b.field(class, "v", None, false, Span::new(30, 38));
    let method = b.method(class, "m", Span::new(40, 300));
    let param = b.param(method, "p", None, Span::new(45, 50));
    let block = b.block(method, Span::new(60, 280));
    let local = b.local(block, "v", None, true, Span::new(70, 80));

    Fixture {
        db: b.finish(),
        file,
        class,
        local,
        param,
        field,
    }
}

#[test]
fn context_scopes_are_ordered_innermost_first() {
    let f = fixture();
    let host = AnalysisHost::new();
    let session = host.new_session(f.db);
    let provider = session.scope_provider();

    let context = provider.scope_context_at(f.file, 100).unwrap();
    let kinds: Vec<ScopeKind> = context
        .scope
        .parts()
        .unwrap()
        .unwrap()
        .iter()
        .map(|s| s.kind().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec![
            ScopeKind::Local,
            ScopeKind::Delegating, // method parameters
            ScopeKind::Delegating, // class member scope
            ScopeKind::Import { star: false },
            ScopeKind::Import { star: true },
            ScopeKind::Package,
        ]
    );
}

#[test]
fn block_local_shadows_class_member() {
    let f = fixture();
    let host = AnalysisHost::new();
    let session = host.new_session(f.db);
    let provider = session.scope_provider();

    let context = provider.scope_context_at(f.file, 100).unwrap();
    let v = context.scope.lookup("v").unwrap().unwrap();
    assert_eq!(v.node(), f.local);
    assert_ne!(v.node(), f.field);
    assert!(v.is_mutable().unwrap());

    let p = context.scope.lookup("p").unwrap().unwrap();
    assert_eq!(p.node(), f.param);
}

#[test]
fn receivers_are_deduplicated_preserving_order() {
    let f = fixture();
    let host = AnalysisHost::new();
    let session = host.new_session(f.db);
    let provider = session.scope_provider();

    let context = provider.scope_context_at(f.file, 100).unwrap();
    // The method layer and the class layer both contribute the class
    // instance type; the context reports it once.
    let class_ty = session.db().class_instance_type(f.class).unwrap();
    assert_eq!(context.receivers, vec![class_ty]);
}

#[test]
fn position_outside_any_function_is_an_error() {
    let f = fixture();
    let host = AnalysisHost::new();
    let session = host.new_session(f.db);
    let provider = session.scope_provider();

    // Offset 30 is inside the class but not inside a function-like node.
    assert!(matches!(
        provider.scope_context_at(f.file, 30),
        Err(AnalysisError::NoEnclosingScope { offset: 30 })
    ));

    // A non-file node is rejected outright.
    assert!(matches!(
        provider.scope_context_at(f.class, 100),
        Err(AnalysisError::UnsupportedSymbolKind { .. })
    ));
}

#[test]
fn unrecognized_scope_shape_fails_fast() {
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 200));
    let func = b.function(file, "f", Span::new(0, 150));
    b.type_param(func, "T", Span::new(5, 6));
    b.param(func, "x", None, Span::new(10, 11));
    let db = b.finish();

    let host = AnalysisHost::new();
    let session = host.new_session(db);
    let provider = session.scope_provider();

    // Type-parameter scopes have no wrapper; conversion must refuse rather
    // than silently produce a generic one.
    assert!(matches!(
        provider.scope_context_at(file, 100),
        Err(AnalysisError::UnimplementedScopeKind(SemScopeKind::TypeParams))
    ));
}

#[test]
fn registered_scopes_survive_reclamation() {
    let f = fixture();
    let host = AnalysisHost::new();
    let session = host.new_session(f.db);
    let provider = session.scope_provider();

    let context = provider.scope_context_at(f.file, 100).unwrap();
    let registered = provider.registry().len();
    assert!(registered >= 6);

    // Everything the context references was pinned at registration time,
    // so reclaiming computed resolution state must not break lookups.
    session.db().sweep_memos();
    let v = context.scope.lookup("v").unwrap().unwrap();
    assert_eq!(v.node(), f.local);
    let free = context.scope.lookup("free").unwrap();
    assert!(free.is_some());
}
