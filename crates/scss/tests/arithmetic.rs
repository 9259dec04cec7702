use scss::calc::Reducer;
use scss::parser::{parse_expr, parse_value};
use scss::scanner::scan_value;
use scss::units::{Quantity, UnitKind, UnitTable, format_quantity, parse_quantity};
use scss::{EvalError, Literal, TokenKind};

fn reduce(source: &str) -> Result<Literal, EvalError> {
    let tokens = scan_value(source, 0).expect("value should scan");
    let expr = parse_expr(&tokens).expect("value should parse");
    Reducer::standard().reduce(&expr)
}

fn parse(source: &str) -> scss::Value {
    let tokens = scan_value(source, 0).expect("value should scan");
    parse_value(&tokens).expect("value should parse")
}

fn render(source: &str) -> String {
    Reducer::standard()
        .reduce_value(&parse(source))
        .expect("value should reduce")
}

fn render_plain(source: &str) -> Result<String, EvalError> {
    Reducer::standard().render_value(&parse(source))
}

// ============================================================================
// Integer Arithmetic
// ============================================================================

#[test]
fn test_integer_addition_stays_integer() {
    let lit = reduce("1 + 2").unwrap();
    assert_eq!(lit.kind, TokenKind::Int);
    assert_eq!(lit.value, "3");
}

#[test]
fn test_division_chain_associates_left() {
    let lit = reduce("15 / 3 / 5").unwrap();
    assert_eq!(lit.kind, TokenKind::Int);
    assert_eq!(lit.value, "1");
}

#[test]
fn test_integer_division_truncates_toward_zero() {
    assert_eq!(reduce("7 / 2").unwrap().value, "3");
    assert_eq!(reduce("-7 / 2").unwrap().value, "-3");
}

#[test]
fn test_integer_overflow() {
    assert!(matches!(
        reduce("9223372036854775807 + 1"),
        Err(EvalError::Overflow { .. })
    ));
}

// ============================================================================
// Unit Arithmetic
// ============================================================================

#[test]
fn test_unitless_operand_adopts_unit() {
    assert_eq!(reduce("4 + 1px").unwrap().value, "5px");
    assert_eq!(reduce("2px * 3").unwrap().value, "6px");
}

#[test]
fn test_result_takes_left_unit() {
    let lit = reduce("1in + 2.54cm").unwrap();
    assert_eq!(lit.kind, TokenKind::UnitIn);
    assert_eq!(lit.value, "2in");
    assert_eq!(reduce("90deg + 0.25turn").unwrap().value, "180deg");
}

#[test]
fn test_cross_family_converts_with_factor_one() {
    assert_eq!(reduce("1px + 90deg").unwrap().value, "91px");
}

#[test]
fn test_slash_divides_when_reduced() {
    assert_eq!(reduce("12px/1.5").unwrap().value, "8px");
}

#[test]
fn test_float_overflow_is_reported() {
    let huge = format!("1{}px", "0".repeat(200));
    let err = reduce(&format!("{huge} * {huge}")).unwrap_err();
    assert!(matches!(err, EvalError::Overflow { pos: 0 }));
}

#[test]
fn test_unit_division_by_zero() {
    let err = reduce("5px / 0").unwrap_err();
    assert!(matches!(err, EvalError::DivisionByZero { pos: 6 }));
}

#[test]
fn test_lengths_round_trip_through_inches() {
    let table = UnitTable::standard();
    for unit in UnitKind::LENGTHS {
        let inches = Quantity::new(1.0, UnitKind::In, 0);
        let back = table.convert(table.convert(inches, unit), UnitKind::In);
        assert!((back.magnitude - 1.0).abs() < 1e-9, "{unit:?}");
    }
}

#[test]
fn test_parse_and_format_quantity() {
    let lit = Literal::new(TokenKind::UnitPt, "12.5PT", 0);
    let q = parse_quantity(&lit).unwrap();
    assert_eq!(q.unit, UnitKind::Pt);
    assert_eq!(format_quantity(&q), "12.5pt");
}

// ============================================================================
// Strings, Colors And Calls
// ============================================================================

#[test]
fn test_strings_concatenate_with_operator() {
    let lit = reduce("a - b").unwrap();
    assert_eq!(lit.kind, TokenKind::String);
    assert_eq!(lit.value, "a-b");
    assert_eq!(reduce("10 + 50%").unwrap().value, "10+50%");
}

#[test]
fn test_color_arithmetic_is_unsupported() {
    assert!(matches!(
        reduce("#fff + #000"),
        Err(EvalError::UnsupportedOperation {
            kind: TokenKind::Color,
            op: TokenKind::Add
        })
    ));
}

#[test]
fn test_color_next_to_number_concatenates() {
    assert_eq!(reduce("#fff + 1").unwrap().value, "#fff+1");
}

#[test]
fn test_unknown_function_keeps_reduced_arguments() {
    assert_eq!(
        render("translate(10px + 5px, 0)"),
        "translate(15px, 0)"
    );
}

// ============================================================================
// Value Lists
// ============================================================================

#[test]
fn test_space_and_comma_lists() {
    assert_eq!(render("1px + 1px solid red, 2px dashed"), "2px solid red, 2px dashed");
}

#[test]
fn test_negative_number_starts_a_new_item() {
    assert_eq!(render("10px -4px"), "10px -4px");
    assert_eq!(render("10px - 4px"), "6px");
}

// ============================================================================
// Plain Values
// ============================================================================

#[test]
fn test_plain_slash_is_a_separator() {
    assert_eq!(render_plain("16 / 9").unwrap(), "16 / 9");
    assert_eq!(render_plain("12px/1.5 serif").unwrap(), "12px/1.5 serif");
    assert_eq!(render_plain("1 / 2 / 3").unwrap(), "1 / 2 / 3");
}

#[test]
fn test_plain_arithmetic_is_not_folded() {
    assert_eq!(render_plain("4 + 1px").unwrap(), "4 + 1px");
    assert_eq!(render_plain("(1px + 2px) 0").unwrap(), "(1px + 2px) 0");
    assert_eq!(render_plain("5px / 0").unwrap(), "5px / 0");
}

#[test]
fn test_calc_folds_pure_arithmetic() {
    assert_eq!(render_plain("calc(1in + 2.54cm)").unwrap(), "2in");
    assert_eq!(render_plain("calc(15 / 3 / 5) auto").unwrap(), "1 auto");
}

#[test]
fn test_calc_with_text_operands_is_kept_verbatim() {
    assert_eq!(render_plain("calc(100% - 10px)").unwrap(), "calc(100% - 10px)");
    assert_eq!(
        render("calc(100% - (2px * 5))"),
        "calc(100% - (2px * 5))"
    );
}

#[test]
fn test_calc_errors_surface() {
    assert!(matches!(
        render_plain("calc(5px / 0)"),
        Err(EvalError::DivisionByZero { pos: 11 })
    ));
}
