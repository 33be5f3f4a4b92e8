//! Tests for checking expression trees.

use std::ops::Range;

use abacus_types::{TaggedTypeDef, Unit, ValueType};
use codespan_reporting::files::SimpleFiles;
use itertools::Itertools;

use crate::{
    check, Checked, DiagnosticCode, DiagnosticCollector, Environment, Expr, ExprKind,
    InferenceOptions, Location,
};

fn at(kind: ExprKind, range: Range<usize>) -> Expr {
    Expr::new(kind, Location::new(0, range))
}

fn reference(name: &str, range: Range<usize>) -> Expr {
    at(ExprKind::Reference(name.to_owned()), range)
}

fn number(unit: Unit, range: Range<usize>) -> Expr {
    at(ExprKind::Number(unit), range)
}

fn call(function: &str, args: Vec<Expr>, range: Range<usize>) -> Expr {
    at(
        ExprKind::Call {
            function: function.to_owned(),
            args,
        },
        range,
    )
}

fn lambda(parameter: &str, body: Expr, range: Range<usize>) -> Expr {
    at(
        ExprKind::Lambda {
            parameter: parameter.to_owned(),
            body: Box::new(body),
        },
        range,
    )
}

fn construct(constructor: &str, args: Vec<Expr>, range: Range<usize>) -> Expr {
    at(
        ExprKind::Construct {
            tagged: "Maybe".to_owned(),
            constructor: constructor.to_owned(),
            args,
        },
        range,
    )
}

fn usd() -> ValueType {
    ValueType::Number(Unit::base("USD"))
}

fn env() -> Environment {
    Environment::new()
        .with_reference("price", usd())
        .with_reference("quantity", ValueType::dimensionless())
        .with_reference("name", ValueType::Text)
        .with_reference(
            "order",
            ValueType::record([("id", ValueType::Text), ("total", usd())]).unwrap(),
        )
        .with_reference("items", ValueType::list(usd()))
        .with_tagged_type(
            TaggedTypeDef::parse("Maybe<T> deriving equatable + showable = None | Some(T)")
                .unwrap(),
        )
        .unwrap()
}

fn codes(checked: &Checked) -> Vec<DiagnosticCode> {
    checked
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.code())
        .collect()
}

fn result(checked: &Checked) -> Option<String> {
    checked.result.as_ref().map(ValueType::to_string)
}

fn render_diagnostics(source: &str, checked: Checked) -> String {
    let mut files = SimpleFiles::new();
    files.add("formula".to_owned(), source.to_owned());
    let mut collector = DiagnosticCollector::new(&files);
    collector.collect_all(checked.diagnostics);
    collector.finish().iter().format("\n").to_string()
}

#[test]
fn test_check_call_propagates_units() {
    // price * quantity
    let expr = call(
        "mul",
        vec![reference("price", 0..5), reference("quantity", 8..16)],
        0..16,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());

    assert!(!checked.has_errors());
    assert_eq!(result(&checked).as_deref(), Some("Number[USD]"));
    let node_types: Vec<_> = checked
        .node_types
        .iter()
        .map(|node| node.ty.as_ref().map(ValueType::to_string))
        .collect();
    assert_eq!(
        node_types,
        vec![
            Some("Number[USD]".to_owned()),
            Some("Number".to_owned()),
            Some("Number[USD]".to_owned()),
        ]
    );
}

#[test]
fn test_check_unbound_reference() {
    let source = "prcie * 2";
    let expr = call(
        "mul",
        vec![
            reference("prcie", 0..5),
            number(Unit::dimensionless(), 8..9),
        ],
        0..9,
    );
    let env = Environment::new()
        .with_reference("price", usd())
        .with_reference("quantity", ValueType::dimensionless());
    let checked = check(&expr, &env, &InferenceOptions::default());

    // The unit of the result is unknown, but that isn't reported again.
    assert_eq!(codes(&checked), vec![DiagnosticCode::UnboundReference]);
    assert_eq!(checked.result, None);

    insta::assert_snapshot!(render_diagnostics(source, checked), @r###"
    error[E0114]: Unbound reference
      --> formula:1:1
      |
    1 | prcie * 2
      | ^^^^^ unbound reference 'prcie'
      |
      = Nearest matches: 'price', 'quantity'
    "###);
}

#[test]
fn test_check_missing_field() {
    let source = "order.discount";
    let expr = at(
        ExprKind::Field {
            record: Box::new(reference("order", 0..5)),
            field: "discount".to_owned(),
        },
        0..14,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    let order = env().reference("order").cloned();
    assert_eq!(checked.node_types[0].ty, order);
    assert_eq!(checked.node_types[1].ty, None);

    insta::assert_snapshot!(render_diagnostics(source, checked), @r###"
    error[E0103]: Field missing from complete record
      --> formula:1:1
      |
    1 | order.discount
      | ^^^^^^^^^^^^^^ field 'discount' occurs in one record but not the complete record {id: Text, total: Number[USD]}
    "###);
}

#[test]
fn test_check_field_access() {
    let expr = at(
        ExprKind::Field {
            record: Box::new(reference("order", 0..5)),
            field: "total".to_owned(),
        },
        0..11,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert!(!checked.has_errors());
    assert_eq!(result(&checked).as_deref(), Some("Number[USD]"));

    // A record whose fields are never determined.
    let expr = lambda(
        "r",
        at(
            ExprKind::Field {
                record: Box::new(reference("r", 5..6)),
                field: "total".to_owned(),
            },
            5..12,
        ),
        0..12,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert_eq!(codes(&checked), vec![DiagnosticCode::UndeterminedType]);
    assert_eq!(checked.result, None);
}

#[test]
fn test_check_lambda_and_map() {
    // map(items, x => x * 2)
    let expr = call(
        "map",
        vec![
            reference("items", 4..9),
            lambda(
                "x",
                call(
                    "mul",
                    vec![
                        reference("x", 16..17),
                        number(Unit::dimensionless(), 20..21),
                    ],
                    16..21,
                ),
                11..21,
            ),
        ],
        0..22,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());

    assert!(!checked.has_errors());
    assert_eq!(result(&checked).as_deref(), Some("List<Number[USD]>"));
    let node_types: Vec<_> = checked
        .node_types
        .iter()
        .map(|node| (node.location.range(), node.ty.as_ref().map(ValueType::to_string)))
        .collect();
    assert_eq!(
        node_types,
        vec![
            (4..9, Some("List<Number[USD]>".to_owned())),
            (16..17, Some("Number[USD]".to_owned())),
            (20..21, Some("Number".to_owned())),
            (16..21, Some("Number[USD]".to_owned())),
            (11..21, Some("(Number[USD] -> Number[USD])".to_owned())),
            (0..22, Some("List<Number[USD]>".to_owned())),
        ]
    );
}

#[test]
fn test_check_apply() {
    // (x => x)(true)
    let expr = at(
        ExprKind::Apply {
            function: Box::new(lambda("x", reference("x", 6..7), 1..7)),
            argument: Box::new(at(ExprKind::Boolean, 9..13)),
        },
        0..14,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert!(!checked.has_errors());
    assert_eq!(result(&checked).as_deref(), Some("Boolean"));
}

#[test]
fn test_check_missing_capability() {
    // eq(x => x, y => y)
    let expr = call(
        "eq",
        vec![
            lambda("x", reference("x", 8..9), 3..9),
            lambda("y", reference("y", 16..17), 11..17),
        ],
        0..18,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert_eq!(
        codes(&checked),
        vec![
            DiagnosticCode::MissingCapability,
            DiagnosticCode::MissingCapability
        ]
    );
    // The call itself still has a type.
    assert_eq!(result(&checked).as_deref(), Some("Boolean"));

    let options = InferenceOptions {
        stop_at_first_error: true,
        ..InferenceOptions::default()
    };
    let checked = check(&expr, &env(), &options);
    assert_eq!(codes(&checked), vec![DiagnosticCode::MissingCapability]);
    assert_eq!(checked.result, None);
    // The call was never recorded.
    assert_eq!(checked.node_types.len(), 4);
}

#[test]
fn test_check_booleans_are_unordered() {
    // lt(true, false)
    let expr = call(
        "lt",
        vec![at(ExprKind::Boolean, 3..7), at(ExprKind::Boolean, 9..14)],
        0..15,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert_eq!(
        codes(&checked),
        vec![
            DiagnosticCode::MissingCapability,
            DiagnosticCode::MissingCapability
        ]
    );
    let rendered = render_diagnostics("lt(true, false)", checked);
    assert_eq!(
        rendered.matches("type Boolean is not comparable").count(),
        2,
        "{rendered}"
    );

    // eq(true, false)
    let expr = call(
        "eq",
        vec![at(ExprKind::Boolean, 3..7), at(ExprKind::Boolean, 9..14)],
        0..15,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert!(!checked.has_errors());
    assert_eq!(result(&checked).as_deref(), Some("Boolean"));
}

#[test]
fn test_check_tagged_constructors() {
    // eq(Some(price), None)
    let expr = call(
        "eq",
        vec![
            construct("Some", vec![reference("price", 8..13)], 3..14),
            construct("None", vec![], 16..20),
        ],
        0..21,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert!(!checked.has_errors());
    assert_eq!(result(&checked).as_deref(), Some("Boolean"));

    let none = checked
        .node_types
        .iter()
        .find(|node| node.location.range() == (16..20))
        .unwrap();
    assert_eq!(
        none.ty.as_ref().map(ValueType::to_string).as_deref(),
        Some("Maybe<Number[USD]>")
    );

    let checked = check(
        &construct("None", vec![], 0..4),
        &env(),
        &InferenceOptions::default(),
    );
    assert_eq!(codes(&checked), vec![DiagnosticCode::UndeterminedType]);

    let checked = check(
        &construct("Just", vec![], 0..4),
        &env(),
        &InferenceOptions::default(),
    );
    assert_eq!(codes(&checked), vec![DiagnosticCode::UnknownVariant]);

    let checked = check(
        &construct("Some", vec![], 0..6),
        &env(),
        &InferenceOptions::default(),
    );
    assert_eq!(codes(&checked), vec![DiagnosticCode::InvalidArguments]);
}

#[test]
fn test_check_list_elements() {
    // [1 m, 2 s]
    let expr = at(
        ExprKind::List(vec![
            number(Unit::base("m"), 1..4),
            number(Unit::base("s"), 6..9),
        ]),
        0..10,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert_eq!(codes(&checked), vec![DiagnosticCode::UnitMismatch]);
    assert_eq!(result(&checked).as_deref(), Some("List<Number[m]>"));
}

#[test]
fn test_check_records_and_tuples() {
    let expr = at(
        ExprKind::Record(vec![
            ("name".to_owned(), reference("name", 7..11)),
            (
                "pair".to_owned(),
                at(
                    ExprKind::Tuple(vec![
                        reference("price", 20..25),
                        at(ExprKind::Text, 27..32),
                    ]),
                    19..33,
                ),
            ),
        ]),
        0..34,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert!(!checked.has_errors());
    assert_eq!(
        result(&checked).as_deref(),
        Some("{name: Text, pair: (Number[USD], Text)}")
    );

    let expr = at(
        ExprKind::Record(vec![
            ("a".to_owned(), at(ExprKind::Text, 4..6)),
            ("a".to_owned(), at(ExprKind::Boolean, 11..15)),
        ]),
        0..16,
    );
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert_eq!(codes(&checked), vec![DiagnosticCode::DuplicateFieldNames]);
}

#[test]
fn test_check_undefined_function() {
    let expr = call("fitler", vec![reference("items", 7..12)], 0..13);
    let options = InferenceOptions {
        no_nearest_matches: true,
        ..InferenceOptions::default()
    };
    let source = "fitler(items)";
    let checked = check(&expr, &env(), &options);
    assert_eq!(codes(&checked), vec![DiagnosticCode::UndefinedFunction]);

    insta::assert_snapshot!(render_diagnostics(source, checked), @r###"
    error[E0115]: Undefined function
      --> formula:1:1
      |
    1 | fitler(items)
      | ^^^^^^^^^^^^^ undefined function 'fitler'
    "###);
}

#[test]
fn test_check_argument_count() {
    let expr = call("not", vec![], 0..5);
    let checked = check(&expr, &env(), &InferenceOptions::default());
    assert_eq!(codes(&checked), vec![DiagnosticCode::InvalidArguments]);
    assert_eq!(checked.result, None);
}
