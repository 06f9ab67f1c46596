use pretty_assertions::assert_eq;

use insp_ir::TyId;

use super::*;

const SPAN: Span = Span::new(4, 9);

fn pair(a: i64, b: i64) -> Value {
    Value::Record {
        ty: TyId::new(8),
        fields: vec![Value::Int(a), Value::Int(b)],
    }
}

#[test]
fn reads_and_writes_through_member_paths() {
    let mut memory = Memory::new();
    let cell = memory.alloc(pair(1, 2));
    let second = Place::root(cell).project(1);

    assert_eq!(memory.read(&second, SPAN).unwrap(), &Value::Int(2));
    memory.write(&second, Value::Int(20), SPAN).unwrap();
    assert_eq!(memory.read(&Place::root(cell), SPAN).unwrap(), &pair(1, 20));
}

#[test]
fn killed_cells_dangle() {
    let mut memory = Memory::new();
    let cell = memory.alloc(Value::Int(7));
    let place = Place::root(cell);
    memory.kill(cell);

    assert_eq!(
        memory.read(&place, SPAN),
        Err(EvalError::DanglingReference { span: SPAN })
    );
    assert_eq!(
        memory.write(&place, Value::Int(1), SPAN),
        Err(EvalError::DanglingReference { span: SPAN })
    );
}

#[test]
fn cells_are_never_reused() {
    let mut memory = Memory::new();
    let first = memory.alloc(Value::Int(1));
    memory.kill(first);
    let second = memory.alloc(Value::Int(2));

    assert!(memory.read(&Place::root(first), SPAN).is_err());
    assert_eq!(memory.read(&Place::root(second), SPAN).unwrap(), &Value::Int(2));
}

#[test]
fn inactive_alternative_is_reported() {
    let mut memory = Memory::new();
    let cell = memory.alloc(Value::Variant {
        index: 1,
        payload: Box::new(Value::Double(0.5)),
    });

    assert_eq!(
        memory.read(&Place::root(cell).project(1), SPAN).unwrap(),
        &Value::Double(0.5)
    );
    assert_eq!(
        memory.read(&Place::root(cell).project(0), SPAN),
        Err(EvalError::InactiveAlternative {
            requested: 0,
            active: 1,
            span: SPAN,
        })
    );
}

#[test]
fn empty_box_and_out_of_bounds() {
    let mut memory = Memory::new();
    let boxed = memory.alloc(Value::Any(None));
    let array = memory.alloc(Value::Array(vec![Value::Int(1)]));

    assert_eq!(
        memory.read(&Place::root(boxed).project(0), SPAN),
        Err(EvalError::EmptyBox { span: SPAN })
    );
    assert_eq!(
        memory.read(&Place::root(array).project(3), SPAN),
        Err(EvalError::IndexOutOfBounds {
            index: 3,
            len: 1,
            span: SPAN,
        })
    );
}

#[test]
fn place_display_lists_the_path() {
    let mut memory = Memory::new();
    memory.alloc(Value::Void);
    let cell = memory.alloc(pair(0, 0));
    assert_eq!(Place::root(cell).project(0).project(2).to_string(), "c1.0.2");
}
