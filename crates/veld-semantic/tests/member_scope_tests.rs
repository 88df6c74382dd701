use veld_common::Span;
use veld_semantic::{NodeKind, TreeBuilder};

fn names(db: &veld_semantic::SemanticDb, scope: veld_semantic::SemScopeId) -> Vec<String> {
    db.scope_names(scope).into_iter().map(|a| db.text(a)).collect()
}

#[test]
fn declared_scope_excludes_inherited_members() {
    // class B { fun m() }; class D : B { val n }
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 300));
    let base = b.class(file, "B", None, Span::new(0, 100));
    b.method(base, "m", Span::new(10, 40));
    let derived = b.class(file, "D", Some(base), Span::new(100, 200));
    b.field(derived, "n", None, false, Span::new(110, 130));
    let db = b.finish();

    let declared = db.declared_member_scope_of_class(derived).unwrap();
    assert_eq!(names(&db, declared), vec!["n"]);

    let full = db.member_scope_of_class(derived).unwrap();
    assert_eq!(names(&db, full), vec!["n", "m"]);
}

#[test]
fn override_shadows_inherited_member() {
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 300));
    let base = b.class(file, "B", None, Span::new(0, 100));
    let base_m = b.method(base, "m", Span::new(10, 40));
    let derived = b.class(file, "D", Some(base), Span::new(100, 200));
    let derived_m = b.method(derived, "m", Span::new(110, 140));
    let db = b.finish();

    let full = db.member_scope_of_class(derived).unwrap();
    let m = db.lookup_atom("m").unwrap();
    assert_eq!(db.scope_lookup(full, m), Some(derived_m));
    // The base declaration is shadowed entirely, not appended.
    assert_eq!(db.scope_members(full), vec![derived_m]);
    assert_ne!(derived_m, base_m);
}

#[test]
fn package_scope_spans_all_files() {
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file_a = b.file(pkg, "a.veld", Span::new(0, 100));
    let file_b = b.file(pkg, "b.veld", Span::new(100, 200));
    let class = b.class(file_a, "A", None, Span::new(0, 50));
    let func = b.function(file_b, "helper", Span::new(100, 150));
    let db = b.finish();

    let scope = db.package_member_scope(pkg).unwrap();
    assert_eq!(db.scope_members(scope), vec![class, func]);
    assert_eq!(
        db.scope_kind(scope),
        Some(veld_semantic::SemScopeKind::PackageMembers)
    );
}

#[test]
fn member_scope_rejects_non_class_nodes() {
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 100));
    let func = b.function(file, "f", Span::new(0, 50));
    let db = b.finish();

    assert_eq!(db.node(func).unwrap().kind, NodeKind::Function);
    assert!(db.member_scope_of_class(func).is_none());
    assert!(db.package_member_scope(file).is_none());
}
