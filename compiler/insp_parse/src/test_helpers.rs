//! S-expression rendering of parsed trees, for compact test assertions.

use insp_ir::{
    Action, ExprId, ExprKind, Guard, MatchForm, ParsedModule, ParsedType, PatternId, PatternKind,
    StringInterner,
};

use crate::{parse_expression, ParseError};

pub(crate) fn parse_render(source: &str) -> Result<String, ParseError> {
    let interner = StringInterner::new();
    let (module, expr) = parse_expression(source, &interner)?;
    Ok(render_expr(&module, &interner, expr))
}

pub(crate) fn render_expr(module: &ParsedModule, interner: &StringInterner, id: ExprId) -> String {
    let r = |e: ExprId| render_expr(module, interner, e);
    match module.exprs.kind(id) {
        ExprKind::Int(v) => v.to_string(),
        ExprKind::Float(bits) => f64::from_bits(*bits).to_string(),
        ExprKind::Bool(b) => b.to_string(),
        ExprKind::Char(c) => format!("{c:?}"),
        ExprKind::NullPtr => "nullptr".to_string(),
        ExprKind::Ident(name) => interner.lookup(*name).to_string(),
        ExprKind::Unary { op, operand } => format!("({} {})", op.as_symbol(), r(*operand)),
        ExprKind::Binary { op, left, right } => {
            format!("({} {} {})", op.as_symbol(), r(*left), r(*right))
        }
        ExprKind::Assign { target, value } => format!("(= {} {})", r(*target), r(*value)),
        ExprKind::Call { callee, args } => {
            let mut out = format!("(call {}", r(*callee));
            for arg in module.exprs.list(*args) {
                out.push(' ');
                out.push_str(&r(*arg));
            }
            out.push(')');
            out
        }
        ExprKind::Field { base, field, arrow } => format!(
            "({} {} {})",
            if *arrow { "->" } else { "." },
            r(*base),
            interner.lookup(*field)
        ),
        ExprKind::Index { base, index } => format!("(index {} {})", r(*base), r(*index)),
        ExprKind::MemberPtr {
            base,
            member,
            arrow,
        } => format!(
            "({} {} {})",
            if *arrow { "->*" } else { ".*" },
            r(*base),
            r(*member)
        ),
        ExprKind::ArrayLit(items) => {
            let items: Vec<_> = module.exprs.list(*items).iter().map(|&e| r(e)).collect();
            format!("[{}]", items.join(" "))
        }
        ExprKind::Paren(inner) => format!("(paren {})", r(*inner)),
        ExprKind::Match(id) => {
            let construct = module.patterns.match_expr(*id);
            let subject = r(construct.subject);
            match &construct.form {
                MatchForm::Test { pattern, guard } => {
                    let mut out = format!(
                        "(match {subject} {}",
                        render_pattern(module, interner, *pattern)
                    );
                    if let Some(guard) = guard {
                        out.push_str(&format!(" if {}", render_guard(module, interner, guard)));
                    }
                    out.push(')');
                    out
                }
                MatchForm::Select(select) => {
                    let mut out = format!("(select {subject}");
                    if select.is_constexpr {
                        out.push_str(" constexpr");
                    }
                    if let Some(ty) = &select.result {
                        out.push_str(&format!(" -> {}", render_type(interner, ty)));
                    }
                    for arm in &select.arms {
                        out.push_str(&format!(
                            " {{{}",
                            render_pattern(module, interner, arm.pattern)
                        ));
                        if let Some(guard) = &arm.guard {
                            out.push_str(&format!(
                                " if {}",
                                render_guard(module, interner, guard)
                            ));
                        }
                        let action = match &arm.action {
                            Action::Value(e) => r(*e),
                            Action::Jump { kind, value, .. } => match value {
                                Some(v) => format!("{} {}", kind.keyword(), r(*v)),
                                None => kind.keyword().to_string(),
                            },
                        };
                        out.push_str(&format!(" => {action}}}"));
                    }
                    out.push(')');
                    out
                }
            }
        }
        other => format!("<{}>", other.describe()),
    }
}

pub(crate) fn render_pattern(
    module: &ParsedModule,
    interner: &StringInterner,
    id: PatternId,
) -> String {
    let r = |p: PatternId| render_pattern(module, interner, p);
    match module.patterns.kind(id) {
        PatternKind::Wildcard => "_".to_string(),
        PatternKind::Expression(e) => format!("(expr {})", render_expr(module, interner, *e)),
        PatternKind::Binding { name, decomposed } => format!(
            "(let{} {})",
            if *decomposed { "*" } else { "" },
            interner.lookup(*name)
        ),
        PatternKind::Paren(inner) => format!("(group {})", r(*inner)),
        PatternKind::Optional { sub, depth } => {
            format!("({} {})", "?".repeat(*depth as usize), r(*sub))
        }
        PatternKind::Alternative { discriminant, sub } => {
            format!("({}: {})", render_type(interner, discriminant), r(*sub))
        }
        PatternKind::Decomposition {
            elements,
            binding_only,
        } => {
            let items: Vec<_> = module
                .patterns
                .list(*elements)
                .iter()
                .map(|&p| r(p))
                .collect();
            format!(
                "{}[{}]",
                if *binding_only { "let" } else { "" },
                items.join(" ")
            )
        }
    }
}

fn render_guard(module: &ParsedModule, interner: &StringInterner, guard: &Guard) -> String {
    match guard {
        Guard::Expr(e) => render_expr(module, interner, *e),
        Guard::Decl { ty, name, init, .. } => format!(
            "(decl {} {} {})",
            render_type(interner, ty),
            interner.lookup(*name),
            render_expr(module, interner, *init)
        ),
    }
}

pub(crate) fn render_type(interner: &StringInterner, ty: &ParsedType) -> String {
    match ty {
        ParsedType::Named(name) => interner.lookup(*name).to_string(),
        ParsedType::Pointer(inner) => format!("{}*", render_type(interner, inner)),
        ParsedType::Const(inner) => format!("const {}", render_type(interner, inner)),
        ParsedType::Array(inner, n) => format!("{}[{n}]", render_type(interner, inner)),
        ParsedType::Auto => "auto".to_string(),
    }
}
