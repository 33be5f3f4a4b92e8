use abacus_types::{Temporal, Unit};

use crate::Location;

/// A node of an already-parsed formula.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// A number literal with a concrete unit.
    Number(Unit),
    Text,
    Boolean,
    Temporal(Temporal),
    /// A value from the environment or a lambda parameter.
    Reference(String),
    Record(Vec<(String, Expr)>),
    /// Access of a field of a record.
    Field { record: Box<Expr>, field: String },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    /// A call of a built-in function.
    Call { function: String, args: Vec<Expr> },
    /// Application of a constructor of a tagged type.
    Construct {
        tagged: String,
        constructor: String,
        args: Vec<Expr>,
    },
    Lambda { parameter: String, body: Box<Expr> },
    Apply {
        function: Box<Expr>,
        argument: Box<Expr>,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, location: Location) -> Self {
        Self { kind, location }
    }

    /// The direct sub-expressions, in the order they are checked.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Number(_)
            | ExprKind::Text
            | ExprKind::Boolean
            | ExprKind::Temporal(_)
            | ExprKind::Reference(_) => vec![],
            ExprKind::Record(fields) => fields.iter().map(|(_, field)| field).collect(),
            ExprKind::Field { record, .. } => vec![record.as_ref()],
            ExprKind::List(elements) | ExprKind::Tuple(elements) => elements.iter().collect(),
            ExprKind::Call { args, .. } | ExprKind::Construct { args, .. } => {
                args.iter().collect()
            }
            ExprKind::Lambda { body, .. } => vec![body.as_ref()],
            ExprKind::Apply { function, argument } => {
                vec![function.as_ref(), argument.as_ref()]
            }
        }
    }

    /// The number of nodes in this tree.
    pub fn num_nodes(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.num_nodes())
            .sum::<usize>()
    }
}
