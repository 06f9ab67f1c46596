//! Shared fixtures for the phase tests.

use insp_diagnostic::ErrorCode;
use insp_eval::{
    EvalError, FieldDef, Interpreter, TupleDef, TypePool, TypeRegistry, Value, VariantDef,
};
use insp_ir::StringInterner;
use insp_sema::MatchOptions;

/// Types every test program may use.
///
/// - `Pair { first, second }` and `Flags { lo: 4-bit, hi }` aggregates
/// - `Shape` with derived `Circle { r }` and `Square { side }`
/// - `Number`, a closed sum of `int` and `double`
/// - `Entry`, a tuple-like of `int` and `bool`
/// - `Box`, a type-erased box
/// - `MaybeInt`, an optional `int`, and `Slot { value: MaybeInt, tag }`
pub fn fixture_types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.define_aggregate(
        "Pair",
        vec![
            FieldDef::new("first", TypePool::INT),
            FieldDef::new("second", TypePool::INT),
        ],
    );
    types.define_aggregate(
        "Flags",
        vec![
            FieldDef::bit_field("lo", TypePool::INT, 4),
            FieldDef::new("hi", TypePool::INT),
        ],
    );
    let shape = types.define_class("Shape", None, vec![FieldDef::new("id", TypePool::INT)]);
    types.define_class("Circle", Some(shape), vec![FieldDef::new("r", TypePool::INT)]);
    types.define_class("Square", Some(shape), vec![FieldDef::new("side", TypePool::INT)]);
    types.define_variant(
        "Number",
        VariantDef::new(vec![TypePool::INT, TypePool::DOUBLE]),
    );
    types.define_tuple("Entry", TupleDef::new(vec![TypePool::INT, TypePool::BOOL]));
    types.define_any("Box");
    let maybe = types.define_optional("MaybeInt", TypePool::INT);
    types.define_aggregate(
        "Slot",
        vec![
            FieldDef::new("value", maybe),
            FieldDef::new("tag", TypePool::INT),
        ],
    );
    types
}

/// What running an entry point produced.
pub struct Outcome {
    pub result: Result<Value, EvalError>,
    pub output: Vec<String>,
}

pub fn run_with(source: &str, entry: &str, args: Vec<Value>, options: MatchOptions) -> Outcome {
    insp_eval::init_tracing();
    let interner = StringInterner::new();
    let module = match insp_eval::compile(source, &interner, fixture_types(), options) {
        Ok(module) => module,
        Err(diagnostics) => {
            let rendered: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
            panic!("program failed to compile:\n{}", rendered.join("\n"));
        }
    };
    let mut interp = Interpreter::new(&module, &interner);
    let result = interp.call(entry, args);
    Outcome {
        result,
        output: interp.output().to_vec(),
    }
}

pub fn run(source: &str, entry: &str, args: Vec<Value>) -> Outcome {
    run_with(source, entry, args, MatchOptions::default())
}

/// Run `main()` and expect an integer.
pub fn run_int(source: &str) -> i64 {
    match run(source, "main", Vec::new()).result {
        Ok(Value::Int(n)) => n,
        other => panic!("expected an int, got {other:?}"),
    }
}

/// Run `main()` and expect a runtime error.
pub fn run_err(source: &str) -> ErrorCode {
    match run(source, "main", Vec::new()).result {
        Err(err) => err.code(),
        Ok(value) => panic!("expected a runtime error, got {value}"),
    }
}

/// Codes of the diagnostics compiling `source` reports.
pub fn compile_errors(source: &str) -> Vec<ErrorCode> {
    let interner = StringInterner::new();
    match insp_eval::compile(source, &interner, fixture_types(), MatchOptions::default()) {
        Ok(_) => Vec::new(),
        Err(diagnostics) => diagnostics.iter().map(|diag| diag.code).collect(),
    }
}
