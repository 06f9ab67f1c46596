use pretty_assertions::assert_eq;

use super::*;

fn shapes() -> (TypeRegistry, TyId, TyId, TyId) {
    let mut types = TypeRegistry::new();
    let shape = types.define_class("Shape", None, vec![FieldDef::new("id", TypePool::INT)]);
    let circle = types.define_class("Circle", Some(shape), vec![FieldDef::new("r", TypePool::INT)]);
    let square = types.define_class("Square", Some(shape), vec![FieldDef::new("side", TypePool::INT)]);
    (types, shape, circle, square)
}

#[test]
fn builtins_resolve_by_name() {
    let types = TypeRegistry::new();
    assert_eq!(types.lookup("int"), Some(TypePool::INT));
    assert_eq!(types.lookup("void"), Some(TypePool::VOID));
    assert_eq!(types.lookup("Shape"), None);
    assert!(types.lookup_constraint("Integral").is_some());
}

#[test]
fn class_fields_list_base_members_first() {
    let (types, _, circle, _) = shapes();
    let names: Vec<&str> = types
        .fields(circle)
        .unwrap()
        .iter()
        .map(|field| field.name.as_str())
        .collect();
    assert_eq!(names, ["id", "r"]);
    assert_eq!(types.field(circle, "r").unwrap().0, 1);
    assert!(types.field(circle, "side").is_none());
}

#[test]
fn derivation_is_reflexive_and_upward_only() {
    let (types, shape, circle, square) = shapes();
    assert!(types.derives_from(circle, shape));
    assert!(types.derives_from(circle, circle));
    assert!(!types.derives_from(shape, circle));
    assert!(!types.derives_from(circle, square));
}

#[test]
fn constraints_ignore_const() {
    let mut types = TypeRegistry::new();
    let integral = types.lookup_constraint("Integral").unwrap();
    let const_int = types.pool_mut().const_of(TypePool::INT);
    assert!(types.satisfies(integral, const_int));
    assert!(!types.satisfies(integral, TypePool::DOUBLE));
    assert_eq!(types.constraint_name(integral), "Integral");
}

#[test]
fn display_reads_like_source() {
    let (mut types, shape, _, _) = shapes();
    let pool = types.pool_mut();
    let const_shape = pool.const_of(shape);
    let ptr = pool.pointer(const_shape);
    let const_ptr = pool.const_of(ptr);
    let arr = pool.array(TypePool::INT, 3);
    assert_eq!(types.display(ptr), "const Shape*");
    assert_eq!(types.display(const_ptr), "const Shape* const");
    assert_eq!(types.display(arr), "int[3]");
}

#[test]
fn user_types_iterate_in_name_order() {
    let (types, _, _, _) = shapes();
    let names: Vec<&str> = types.user_types().map(|user| user.name.as_str()).collect();
    assert_eq!(names, ["Circle", "Shape", "Square"]);
}

#[test]
fn variant_defaults_to_member_accessors() {
    let def = VariantDef::new(vec![TypePool::INT, TypePool::BOOL]);
    assert_eq!(def.size, SizeProbe::Size(2));
    assert_eq!(def.index, Some(AccessStyle::Member));
    let def = def.with_index(None);
    assert_eq!(def.index, None);
}

#[test]
fn optionals_expose_their_payload() {
    let mut types = TypeRegistry::new();
    let maybe = types.define_optional("MaybeInt", TypePool::INT);
    assert_eq!(types.optional_payload(maybe), Some(TypePool::INT));
    assert_eq!(types.optional_payload(TypePool::INT), None);
    assert!(types.fields(maybe).is_none());
}
