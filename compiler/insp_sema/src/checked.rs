//! Checked match constructs.
//!
//! Checking produces a tree parallel to the parsed pattern tree: one
//! [`CheckedPattern`] per [`PatternId`], carrying the committed protocol and
//! every declaration and condition the node introduced. The parsed nodes stay
//! untouched.
//!
//! Lowering does not walk this tree directly. It asks for the node's
//! [`Step`]s: declarations and boolean tests in the order they must run,
//! where each test guards everything after it.

use smallvec::SmallVec;

use insp_ir::{AccessStyle, DeclId, ExprId, JumpKind, MatchId, PatternId, Span, TyId};

use crate::{LifetimePlan, Subject};

/// One unit of a short-circuit chain.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Step {
    /// Create and initialize a declaration.
    Declare(DeclId),
    /// Evaluate a `bool` condition; stop the chain when it is false.
    Test(ExprId),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CheckedPattern {
    pub pattern: PatternId,
    pub node: CheckedNode,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CheckedNode {
    Wildcard,
    /// `subject == value`, converted to `bool`.
    Expression { cond: ExprId },
    Binding { decl: DeclId, by_ref: bool },
    Paren(Box<CheckedPattern>),
    /// One truth test per `?`, outermost first. The sub-pattern's subject is
    /// the subject dereferenced once per level.
    Optional {
        levels: SmallVec<[ExprId; 2]>,
        sub: Box<CheckedPattern>,
    },
    Alternative {
        resolution: Resolution,
        sub: Box<CheckedPattern>,
    },
    Decomposition {
        protocol: DecompositionProtocol,
        elements: Vec<CheckedElement>,
        binding_only: bool,
    },
    /// The subject type is dependent. Only the bindings are declared.
    Deferred { bindings: Vec<DeclId> },
}

/// The committed protocol of an alternative pattern.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Resolution {
    /// Tagged union: `index(subject) == index`, then `get<index>(subject)`.
    ClosedSum {
        index: u32,
        cond: ExprId,
        element: DeclId,
    },
    /// Class hierarchy: a pointer obtained by downcast, tested for null.
    Polymorphic {
        via: DowncastVia,
        holding: DeclId,
        cond: ExprId,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DowncastVia {
    /// Built-in checked downcast of the subject's address.
    BuiltIn,
    /// A user `try_cast<D>(subject)` overload.
    TryCast,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DecompositionProtocol {
    Array,
    TupleLike(AccessStyle),
    Aggregate,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CheckedElement {
    /// Reference to the element, when the sub-pattern needs one. Direct
    /// bindings are initialized from the element access itself and
    /// wildcards never touch it.
    pub holding: Option<DeclId>,
    pub pattern: CheckedPattern,
}

impl CheckedPattern {
    /// Steps in evaluation order.
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = Vec::new();
        self.collect_steps(&mut steps);
        steps
    }

    fn collect_steps(&self, out: &mut Vec<Step>) {
        match &self.node {
            CheckedNode::Wildcard => {}
            CheckedNode::Expression { cond } => out.push(Step::Test(*cond)),
            CheckedNode::Binding { decl, .. } => out.push(Step::Declare(*decl)),
            CheckedNode::Paren(sub) => sub.collect_steps(out),
            CheckedNode::Optional { levels, sub } => {
                out.extend(levels.iter().map(|&cond| Step::Test(cond)));
                sub.collect_steps(out);
            }
            CheckedNode::Alternative { resolution, sub } => {
                match *resolution {
                    Resolution::ClosedSum { cond, element, .. } => {
                        out.push(Step::Test(cond));
                        out.push(Step::Declare(element));
                    }
                    Resolution::Polymorphic { holding, cond, .. } => {
                        out.push(Step::Declare(holding));
                        out.push(Step::Test(cond));
                    }
                }
                sub.collect_steps(out);
            }
            CheckedNode::Decomposition { elements, .. } => {
                for element in elements {
                    if let Some(holding) = element.holding {
                        out.push(Step::Declare(holding));
                    }
                    element.pattern.collect_steps(out);
                }
            }
            CheckedNode::Deferred { bindings } => {
                out.extend(bindings.iter().map(|&decl| Step::Declare(decl)));
            }
        }
    }

    /// Named bindings introduced by this pattern, in declaration order.
    pub fn bindings(&self) -> Vec<DeclId> {
        let mut out = Vec::new();
        self.collect_bindings(&mut out);
        out
    }

    fn collect_bindings(&self, out: &mut Vec<DeclId>) {
        match &self.node {
            CheckedNode::Wildcard | CheckedNode::Expression { .. } => {}
            CheckedNode::Binding { decl, .. } => out.push(*decl),
            CheckedNode::Paren(sub)
            | CheckedNode::Optional { sub, .. }
            | CheckedNode::Alternative { sub, .. } => sub.collect_bindings(out),
            CheckedNode::Decomposition { elements, .. } => {
                for element in elements {
                    element.pattern.collect_bindings(out);
                }
            }
            CheckedNode::Deferred { bindings } => out.extend_from_slice(bindings),
        }
    }
}

/// A checked guard. A declaration guard introduces `decl` before testing it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CheckedGuard {
    pub decl: Option<DeclId>,
    pub cond: ExprId,
}

impl CheckedGuard {
    fn push_steps(self, out: &mut Vec<Step>) {
        if let Some(decl) = self.decl {
            out.push(Step::Declare(decl));
        }
        out.push(Step::Test(self.cond));
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CheckedAction {
    /// Produce the value (already converted to the result type).
    Yield(ExprId),
    /// Evaluate for side effects; the construct has type `void`.
    Evaluate(ExprId),
    /// Leave the construct with `return`, `break` or `continue`.
    Escape {
        kind: JumpKind,
        value: Option<ExprId>,
    },
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CheckedArm {
    pub pattern: CheckedPattern,
    pub guard: Option<CheckedGuard>,
    pub action: CheckedAction,
    pub span: Span,
}

impl CheckedArm {
    /// Pattern steps followed by guard steps.
    pub fn steps(&self) -> Vec<Step> {
        let mut steps = self.pattern.steps();
        if let Some(guard) = self.guard {
            guard.push_steps(&mut steps);
        }
        steps
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CheckedForm {
    Test {
        pattern: CheckedPattern,
        guard: Option<CheckedGuard>,
    },
    Select {
        arms: Vec<CheckedArm>,
        is_constexpr: bool,
        /// For `match constexpr`: the first arm whose tests all fold to
        /// `true`. Every other arm is dead.
        static_arm: Option<usize>,
    },
}

impl CheckedForm {
    /// Steps of a match-test: pattern, then guard.
    ///
    /// Empty for a select; use [`CheckedArm::steps`] per arm.
    pub fn test_steps(&self) -> Vec<Step> {
        match self {
            CheckedForm::Test { pattern, guard } => {
                let mut steps = pattern.steps();
                if let Some(guard) = guard {
                    guard.push_steps(&mut steps);
                }
                steps
            }
            CheckedForm::Select { .. } => Vec::new(),
        }
    }
}

/// A fully checked match-test or match-select.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CheckedMatch {
    pub id: MatchId,
    pub subject: Subject,
    pub form: CheckedForm,
    /// `bool` for a match-test; the unified arm type for a select.
    pub result_ty: TyId,
    pub lifetime: LifetimePlan,
    /// The subject type was dependent and no conditions were synthesized.
    pub deferred: bool,
    pub span: Span,
}
