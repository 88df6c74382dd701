use veld_analysis::{AnalysisHost, ScopeKind};
use veld_common::Span;
use veld_semantic::TreeBuilder;

#[test]
fn composite_lookup_is_first_match_wins() {
    // Both classes declare `m`; the composite must resolve to the first
    // part's declaration.
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 300));
    let first = b.class(file, "A", None, Span::new(0, 100));
    let a_m = b.method(first, "m", Span::new(10, 20));
    let second = b.class(file, "B", None, Span::new(100, 200));
    let b_m = b.method(second, "m", Span::new(110, 120));
    let b_only = b.method(second, "only_in_b", Span::new(130, 140));
    let db = b.finish();

    let host = AnalysisHost::new();
    let session = host.new_session(db);
    let provider = session.scope_provider();
    let builder = provider.symbol_builder();

    let scope_a = provider.member_scope(&builder.symbol(first).unwrap()).unwrap();
    let scope_b = provider.member_scope(&builder.symbol(second).unwrap()).unwrap();
    let composite = provider
        .composite_scope(vec![scope_a.clone(), scope_b.clone()])
        .unwrap();
    assert_eq!(composite.kind().unwrap(), ScopeKind::Composite);
    assert_eq!(composite.parts().unwrap().unwrap().len(), 2);

    let m = composite.lookup("m").unwrap().unwrap();
    assert_eq!(m.node(), a_m);
    assert_ne!(m.node(), b_m);

    // Names not bound by the first part still resolve through later parts.
    let only = composite.lookup("only_in_b").unwrap().unwrap();
    assert_eq!(only.node(), b_only);
}

#[test]
fn composite_enumeration_dedupes_shadowed_names() {
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 300));
    let first = b.class(file, "A", None, Span::new(0, 100));
    let a_m = b.method(first, "m", Span::new(10, 20));
    let second = b.class(file, "B", None, Span::new(100, 200));
    let b_m = b.method(second, "m", Span::new(110, 120));
    let b_x = b.field(second, "x", None, false, Span::new(130, 140));
    let db = b.finish();

    let host = AnalysisHost::new();
    let session = host.new_session(db);
    let provider = session.scope_provider();
    let builder = provider.symbol_builder();

    let scope_a = provider.member_scope(&builder.symbol(first).unwrap()).unwrap();
    let scope_b = provider.member_scope(&builder.symbol(second).unwrap()).unwrap();
    let composite = provider.composite_scope(vec![scope_a, scope_b]).unwrap();

    let names: Vec<_> = composite
        .names()
        .unwrap()
        .into_iter()
        .map(|a| session.db().text(a))
        .collect();
    assert_eq!(names, vec!["m", "x"]);

    // `B::m` is shadowed by `A::m`: invisible to lookup, so enumeration
    // must not surface it either.
    let nodes: Vec<_> = composite
        .symbols()
        .unwrap()
        .iter()
        .map(|s| s.node())
        .collect();
    assert_eq!(nodes, vec![a_m, b_x]);
    assert!(!nodes.contains(&b_m));
}

#[test]
fn explicit_import_resolves_under_alias() {
    let mut b = TreeBuilder::new();
    let other = b.package("other");
    let other_file = b.file(other, "helper.veld", Span::new(0, 100));
    let helper = b.class(other_file, "Helper", None, Span::new(0, 50));

    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 200));
    b.import(file, helper, Some("H"), Span::new(0, 10));
    let func = b.function(file, "f", Span::new(20, 180));
    let db = b.finish();

    let host = AnalysisHost::new();
    let session = host.new_session(db);
    let provider = session.scope_provider();

    let context = provider.scope_context_at(file, 100).unwrap();
    let imported = context.scope.lookup("H").unwrap().unwrap();
    assert_eq!(imported.node(), helper);
    // The original name is only reachable through its own package.
    assert!(context.scope.lookup("Helper").unwrap().is_none());
    let _ = func;
}

#[test]
fn star_import_resolves_through_package_scopes() {
    let mut b = TreeBuilder::new();
    let wild = b.package("wild");
    let wild_file = b.file(wild, "w.veld", Span::new(0, 100));
    let free = b.function(wild_file, "free", Span::new(0, 50));

    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 200));
    b.import_star(file, wild, Span::new(0, 10));
    b.function(file, "f", Span::new(20, 180));
    let db = b.finish();

    let host = AnalysisHost::new();
    let session = host.new_session(db);
    let provider = session.scope_provider();

    let context = provider.scope_context_at(file, 100).unwrap();
    let via_star = context.scope.lookup("free").unwrap().unwrap();
    assert_eq!(via_star.node(), free);

    // The star-import wrapper itself enumerates the imported package's
    // declarations.
    let star = context
        .scope
        .parts()
        .unwrap()
        .unwrap()
        .iter()
        .find(|s| s.kind().unwrap() == (ScopeKind::Import { star: true }))
        .cloned()
        .unwrap();
    let names: Vec<_> = star
        .names()
        .unwrap()
        .into_iter()
        .map(|a| session.db().text(a))
        .collect();
    assert_eq!(names, vec!["free"]);
}

#[test]
fn lookup_of_unknown_name_is_none() {
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 200));
    let class = b.class(file, "A", None, Span::new(0, 100));
    b.method(class, "m", Span::new(10, 20));
    let db = b.finish();

    let host = AnalysisHost::new();
    let session = host.new_session(db);
    let provider = session.scope_provider();
    let scope = provider
        .member_scope(&provider.symbol_builder().symbol(class).unwrap())
        .unwrap();

    assert!(scope.lookup("never_mentioned_anywhere").unwrap().is_none());
    let empty = provider.composite_scope(Vec::new()).unwrap();
    assert!(empty.lookup("m").unwrap().is_none());
    assert!(empty.names().unwrap().is_empty());
}
