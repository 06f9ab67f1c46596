use pretty_assertions::assert_eq;

use insp_diagnostic::ErrorCode;
use insp_ir::{AccessStyle, StringInterner};

use crate::checked::{CheckedForm, CheckedNode, CheckedPattern, DecompositionProtocol, Step};
use crate::test_helpers::{check, parse_match, MockTy, BOOL, INT};
use crate::{check_match, MatchOptions, MatchPosition, SizeProbe};

fn test_pattern(form: &CheckedForm) -> &CheckedPattern {
    match form {
        CheckedForm::Test { pattern, .. } => pattern,
        CheckedForm::Select { .. } => panic!("expected a match-test"),
    }
}

#[test]
fn test_wildcard_has_no_steps() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "v match _");
    host.var("v", INT);
    let checked = check(&mut host, &patterns, id).unwrap();
    assert_eq!(test_pattern(&checked.form).node, CheckedNode::Wildcard);
    assert!(checked.form.test_steps().is_empty());
    assert_eq!(host.events, ["holding int"]);
    assert_eq!(checked.result_ty, BOOL);
}

#[test]
fn test_expression_pattern_is_one_test() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "v match 3");
    host.var("v", INT);
    let checked = check(&mut host, &patterns, id).unwrap();
    let CheckedNode::Expression { cond } = test_pattern(&checked.form).node else {
        panic!("expected an expression node");
    };
    assert_eq!(checked.form.test_steps(), [Step::Test(cond)]);
}

#[test]
fn test_expression_pattern_must_be_comparable() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "s match 3");
    let flags = host.define("Flags", MockTy::Aggregate(vec![(INT, false)]));
    host.var("s", flags);
    let err = check(&mut host, &patterns, id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2004);
}

#[test]
fn test_binding_refers_to_holding() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "v match let x");
    host.var("v", INT);
    let checked = check(&mut host, &patterns, id).unwrap();
    assert!(matches!(
        test_pattern(&checked.form).node,
        CheckedNode::Binding { by_ref: true, .. }
    ));
    assert_eq!(host.events, ["holding int", "bind x &"]);
}

#[test]
fn test_bit_field_element_binds_by_copy() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "s match [let a, let b]");
    let flags = host.define("Flags", MockTy::Aggregate(vec![(INT, false), (INT, true)]));
    host.var("s", flags);
    let checked = check(&mut host, &patterns, id).unwrap();
    assert_eq!(
        host.events,
        ["holding Flags", "field 0", "bind a &", "field 1", "bind b"]
    );
    let CheckedNode::Decomposition {
        protocol,
        elements,
        binding_only,
    } = &test_pattern(&checked.form).node
    else {
        panic!("expected a decomposition");
    };
    assert_eq!(*protocol, DecompositionProtocol::Aggregate);
    assert!(*binding_only);
    assert!(elements.iter().all(|e| e.holding.is_none()));
}

#[test]
fn test_paren_delegates_to_inner_pattern() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "v match (let x)");
    host.var("v", INT);
    let checked = check(&mut host, &patterns, id).unwrap();
    let CheckedNode::Paren(inner) = &test_pattern(&checked.form).node else {
        panic!("expected a paren node");
    };
    assert!(matches!(inner.node, CheckedNode::Binding { .. }));
}

#[test]
fn test_optional_tests_before_each_dereference() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "p match ??let v");
    let int_ptr = host.intern(MockTy::Pointer(INT));
    let int_ptr_ptr = host.intern(MockTy::Pointer(int_ptr));
    host.var("p", int_ptr_ptr);
    let checked = check(&mut host, &patterns, id).unwrap();

    let CheckedNode::Optional { levels, sub } = &test_pattern(&checked.form).node else {
        panic!("expected an optional node");
    };
    assert_eq!(levels.len(), 2);
    let CheckedNode::Binding { decl, by_ref } = sub.node else {
        panic!("expected a binding under the optional");
    };
    assert!(by_ref);
    assert_eq!(
        checked.form.test_steps(),
        [Step::Test(levels[0]), Step::Test(levels[1]), Step::Declare(decl)]
    );
}

#[test]
fn test_optional_on_non_pointer_fails() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "v match ?_");
    host.var("v", INT);
    let err = check(&mut host, &patterns, id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E2004);
}

#[test]
fn test_optional_depth_limit() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "p match ??_");
    let int_ptr = host.intern(MockTy::Pointer(INT));
    let int_ptr_ptr = host.intern(MockTy::Pointer(int_ptr));
    host.var("p", int_ptr_ptr);
    let options = MatchOptions::default().with_max_optional_depth(1);
    let err = check_match(&mut host, &patterns, id, MatchPosition::Nested, &options).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3011);
}

#[test]
fn test_decomposition_interleaves_elements() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "arr match [0, let y]");
    let array = host.intern(MockTy::Array(INT, 2));
    host.var("arr", array);
    let checked = check(&mut host, &patterns, id).unwrap();
    assert_eq!(
        host.events,
        ["holding int[2]", "subscript 0", "holding int", "subscript 1", "bind y &"]
    );

    let CheckedNode::Decomposition { elements, .. } = &test_pattern(&checked.form).node else {
        panic!("expected a decomposition");
    };
    let first = elements[0].holding.unwrap();
    let CheckedNode::Expression { cond } = elements[0].pattern.node else {
        panic!("expected an expression element");
    };
    let CheckedNode::Binding { decl: y, .. } = elements[1].pattern.node else {
        panic!("expected a binding element");
    };
    assert_eq!(
        checked.form.test_steps(),
        [Step::Declare(first), Step::Test(cond), Step::Declare(y)]
    );
}

#[test]
fn test_array_arity_mismatch() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "arr match [let a, let b, let c]");
    let array = host.intern(MockTy::Array(INT, 2));
    host.var("arr", array);
    let err = check(&mut host, &patterns, id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3040);
    assert_eq!(
        err.to_string(),
        "cannot decompose `int[2]` into 3 elements: the array has 2 elements"
    );
}

#[test]
fn test_tuple_like_uses_get_accessor() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "pr match [1, let flag]");
    let pair = host.define(
        "Pair",
        MockTy::Tuple {
            elements: vec![INT, BOOL],
            size: SizeProbe::Size(2),
            get: Some(AccessStyle::Free),
        },
    );
    host.var("pr", pair);
    let checked = check(&mut host, &patterns, id).unwrap();
    let CheckedNode::Decomposition { protocol, .. } = &test_pattern(&checked.form).node else {
        panic!("expected a decomposition");
    };
    assert_eq!(*protocol, DecompositionProtocol::TupleLike(AccessStyle::Free));
    assert_eq!(
        host.events,
        ["holding Pair", "get 0 Free", "holding int", "get 1 Free", "bind flag &"]
    );
}

#[test]
fn test_array_is_preferred_over_other_protocols() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "arr match [_, _]");
    let array = host.intern(MockTy::Array(INT, 2));
    host.var("arr", array);
    check(&mut host, &patterns, id).unwrap();
    assert_eq!(*host.probes.borrow(), ["array_extent int[2]"]);
}

#[test]
fn test_non_constant_tuple_size() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "pr match [let a]");
    let odd = host.define(
        "Odd",
        MockTy::Tuple {
            elements: vec![INT],
            size: SizeProbe::NotConstant,
            get: Some(AccessStyle::Member),
        },
    );
    host.var("pr", odd);
    let err = check(&mut host, &patterns, id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3020);
}

#[test]
fn test_tuple_size_without_accessor() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "pr match [let a]");
    let broken = host.define(
        "Broken",
        MockTy::Tuple {
            elements: vec![INT],
            size: SizeProbe::Size(1),
            get: None,
        },
    );
    host.var("pr", broken);
    let err = check(&mut host, &patterns, id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3020);
    assert_eq!(host.events, ["holding Broken"]);
}

#[test]
fn test_scalar_is_not_destructurable() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "v match [let a]");
    host.var("v", INT);
    let err = check(&mut host, &patterns, id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::E3040);
}

#[test]
fn test_nested_binding_decomposition() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "t match let [c, [x, y]]");
    let inner = host.intern(MockTy::Array(INT, 2));
    let outer = host.define(
        "Nested",
        MockTy::Tuple {
            elements: vec![INT, inner],
            size: SizeProbe::Size(2),
            get: Some(AccessStyle::Member),
        },
    );
    host.var("t", outer);
    let checked = check(&mut host, &patterns, id).unwrap();
    assert_eq!(test_pattern(&checked.form).bindings().len(), 3);
    assert_eq!(
        host.events,
        [
            "holding Nested",
            "get 0 Member",
            "bind c &",
            "get 1 Member",
            "holding int[2]",
            "subscript 0",
            "bind x &",
            "subscript 1",
            "bind y &",
        ]
    );
}

#[test]
fn test_dependent_subject_only_declares_bindings() {
    let interner = StringInterner::new();
    let (mut host, patterns, id) = parse_match(&interner, "t match [let a, int: ?let b]");
    let param = host.define("T", MockTy::Dependent);
    host.var("t", param);
    let checked = check(&mut host, &patterns, id).unwrap();
    assert!(checked.deferred);
    let CheckedNode::Deferred { bindings } = &test_pattern(&checked.form).node else {
        panic!("expected a deferred node");
    };
    assert_eq!(bindings.len(), 2);
    assert_eq!(host.events, ["holding T", "bind a &", "bind b &"]);
}
