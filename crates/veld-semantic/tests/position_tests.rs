use veld_common::Span;
use veld_semantic::{SemScopeKind, TreeBuilder, TypeData};

// package demo
// import other.Helper
// import wild.*
// class C {
//   fun m(p) {        <- method
//     { val v }       <- block containing the query offset
//   }
// }
fn build() -> (
    veld_semantic::SemanticDb,
    veld_semantic::NodeId, // file
    veld_semantic::NodeId, // class
    veld_semantic::NodeId, // method
) {
    let mut b = TreeBuilder::new();
    let other = b.package("other");
    let other_file = b.file(other, "helper.veld", Span::new(0, 100));
    let helper = b.class(other_file, "Helper", None, Span::new(0, 50));
    let wild = b.package("wild");
    let wild_file = b.file(wild, "wild.veld", Span::new(0, 100));
    b.function(wild_file, "free", Span::new(0, 50));

    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 500));
    b.import(file, helper, None, Span::new(0, 10));
    b.import_star(file, wild, Span::new(10, 20));
    let class = b.class(file, "C", None, Span::new(20, 400));
    let method = b.method(class, "m", Span::new(40, 300));
    b.param(method, "p", None, Span::new(45, 50));
    let block = b.block(method, Span::new(60, 280));
    b.local(block, "v", None, false, Span::new(70, 80));

    (b.finish(), file, class, method)
}

#[test]
fn tower_is_ordered_innermost_first() {
    let (db, file, class, method) = build();
    assert_eq!(db.enclosing_function(file, 100), Some(method));

    let ctx = db.resolution_context_at(method, 100);
    let kinds: Vec<SemScopeKind> = ctx
        .tower
        .iter()
        .filter_map(|e| e.scope)
        .filter_map(|s| db.scope_kind(s))
        .collect();
    // params, class members, explicit imports, star imports, package
    assert_eq!(
        kinds,
        vec![
            SemScopeKind::Declarations,
            SemScopeKind::Declarations,
            SemScopeKind::ExplicitImports,
            SemScopeKind::StarImports,
            SemScopeKind::PackageMembers,
        ]
    );

    let owners: Vec<_> = ctx
        .tower
        .iter()
        .filter_map(|e| e.scope)
        .filter_map(|s| db.scope_owner(s))
        .collect();
    assert_eq!(owners[0], method);
    assert_eq!(owners[1], class);
}

#[test]
fn method_and_class_layers_carry_the_same_receiver() {
    let (db, _, class, method) = build();
    let ctx = db.resolution_context_at(method, 100);

    let receivers: Vec<_> = ctx.tower.iter().filter_map(|e| e.receiver).collect();
    let class_ty = db.class_instance_type(class).unwrap();
    assert_eq!(receivers, vec![class_ty, class_ty]);
    assert_eq!(db.type_data(class_ty), Some(TypeData::Class(class)));
}

#[test]
fn local_scopes_cover_blocks_containing_the_offset() {
    let (db, _, _, method) = build();

    let inside = db.resolution_context_at(method, 100);
    assert_eq!(inside.local_scopes.len(), 1);
    let locals = db.scope_members(inside.local_scopes[0]);
    assert_eq!(locals.len(), 1);
    assert_eq!(db.node(locals[0]).unwrap().kind, veld_semantic::NodeKind::Local);

    // Offset inside the method but outside its block.
    let outside = db.resolution_context_at(method, 290);
    assert!(outside.local_scopes.is_empty());
}

#[test]
fn generic_function_contributes_a_type_param_scope() {
    let mut b = TreeBuilder::new();
    let pkg = b.package("demo");
    let file = b.file(pkg, "main.veld", Span::new(0, 200));
    let f = b.function(file, "f", Span::new(0, 150));
    b.type_param(f, "T", Span::new(5, 6));
    b.param(f, "x", None, Span::new(10, 11));
    let db = b.finish();

    let ctx = db.resolution_context_at(f, 100);
    let kinds: Vec<_> = ctx
        .tower
        .iter()
        .filter_map(|e| e.scope)
        .filter_map(|s| db.scope_kind(s))
        .collect();
    assert_eq!(
        kinds,
        vec![
            SemScopeKind::Declarations,
            SemScopeKind::TypeParams,
            SemScopeKind::PackageMembers,
        ]
    );
}
