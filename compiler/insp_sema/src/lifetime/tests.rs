use insp_ir::{DeclId, StringInterner};

use super::{condition_match, LifetimePlan, LifetimeScope, MatchPosition};

fn qualifies(source: &str) -> bool {
    let interner = StringInterner::new();
    let (module, root) = insp_parse::parse_expression(source, &interner)
        .unwrap_or_else(|e| panic!("failed to parse `{source}`: {e}"));
    condition_match(&module.exprs, root).is_some()
}

#[test]
fn test_bare_match_is_the_condition() {
    assert!(qualifies("x match 1"));
    assert!(qualifies("p match ?let v"));
}

#[test]
fn test_wrapped_match_is_not_the_condition() {
    assert!(!qualifies("(x match 1)"));
    assert!(!qualifies("!(x match 1)"));
    assert!(!qualifies("x match 1 && y"));
    assert!(!qualifies("x"));
}

#[test]
fn test_position_decides_scope() {
    let decls = vec![DeclId::new(0), DeclId::new(1)];
    let branch = LifetimePlan::new(MatchPosition::Condition, decls.clone());
    assert_eq!(branch.scope, LifetimeScope::Branch);
    assert!(branch.is_extended());

    let nested = LifetimePlan::new(MatchPosition::Nested, decls);
    assert_eq!(nested.scope, LifetimeScope::FullExpression);
    assert!(!nested.is_extended());
    assert_eq!(nested.decls.len(), 2);
}
