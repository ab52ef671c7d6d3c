use glam::Vec3;

use crate::common::reader::{
    extract_between, find_between, parse_array, parse_array_first, parse_flag, parse_numeric,
    tokenize_row, RowReader, SUB_ARRAY_SEPARATOR,
};
use crate::common::types::BoxSphereBounds;
use crate::ParserError;

#[test]
fn tokenize_plain_fields() {
    let fields = tokenize_row("1,Cube,Owner,24,12");
    assert_eq!(fields, vec!["1", "Cube", "Owner", "24", "12"]);
}

#[test]
fn tokenize_quoted_field_with_comma() {
    let fields = tokenize_row(r#"a,"b,c",d"#);
    assert_eq!(fields, vec!["a", "b,c", "d"]);
}

#[test]
fn tokenize_keeps_sub_arrays_intact() {
    let fields = tokenize_row(r#"7,"12\34\56",0\1"#);
    assert_eq!(fields, vec!["7", r"12\34\56", r"0\1"]);
}

#[test]
fn tokenize_trailing_delimiter_and_quoted_last_field() {
    assert_eq!(tokenize_row("a,b,"), vec!["a", "b", ""]);
    assert_eq!(tokenize_row(r#"a,"x, y""#), vec!["a", "x, y"]);
    assert_eq!(tokenize_row(r#""say ""hi""",b"#), vec![r#"say "hi""#, "b"]);
}

#[test]
fn tokenize_empty_line() {
    assert!(tokenize_row("").is_empty());
}

#[test]
fn numeric_conversion() -> Result<(), ParserError> {
    assert_eq!(parse_numeric::<u32>(" 42 ")?, 42);
    assert_eq!(parse_numeric::<i32>("-1")?, -1);
    assert_eq!(parse_numeric::<f32>("0.5")?, 0.5);
    assert!(parse_flag("1")?);
    assert!(!parse_flag("0")?);

    let err = parse_numeric::<u16>("abc").unwrap_err();
    assert!(matches!(err, ParserError::NumericConversion { .. }));
    Ok(())
}

#[test]
fn array_conversion() -> Result<(), ParserError> {
    assert_eq!(parse_array::<i32>(r"12\34\56", SUB_ARRAY_SEPARATOR)?, vec![12, 34, 56]);
    assert_eq!(parse_array_first::<i32>(r"12\34\56", SUB_ARRAY_SEPARATOR)?, 12);
    assert!(parse_array::<i32>("", SUB_ARRAY_SEPARATOR)?.is_empty());

    assert!(matches!(
        parse_array_first::<i32>("", SUB_ARRAY_SEPARATOR),
        Err(ParserError::EmptyArray { .. })
    ));
    assert!(parse_array::<i32>(r"1\x\3", SUB_ARRAY_SEPARATOR).is_err());
    Ok(())
}

#[test]
fn delimiter_extraction() -> Result<(), ParserError> {
    assert_eq!(extract_between::<u32>("TexCoords: 3, Custom: 1", "TexCoords: ", ",")?, 3);
    assert_eq!(extract_between::<u32>("Interpolators: 4/16", "Interpolators: ", "/")?, 4);
    assert_eq!(find_between("VS(2), PS(5)", "PS(", ")"), Some("5"));
    assert_eq!(find_between("VS(2), PS(5)", "GS(", ")"), None);

    assert!(matches!(
        extract_between::<u32>("no match here", "[", "]"),
        Err(ParserError::DelimiterNotFound { .. })
    ));
    Ok(())
}

#[test]
fn row_reader_reports_exhaustion() {
    let row = tokenize_row("1,a");
    let reader = RowReader::new(&row);
    assert_eq!(reader.try_read_field(1), Some("a"));
    assert_eq!(reader.try_read_field(2), None);
}

#[test]
fn bounds_derive_box_and_sphere() {
    let bounds = BoxSphereBounds::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 1.0, 2.0), 4.0);
    assert_eq!(bounds.box_bounds.center, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(bounds.box_bounds.min(), Vec3::new(0.5, 1.0, 1.0));
    assert_eq!(bounds.box_bounds.max(), Vec3::new(1.5, 3.0, 5.0));
    assert_eq!(bounds.sphere_bounds.center, bounds.origin);
    assert_eq!(bounds.sphere_bounds.radius, 4.0);

    let corners = bounds.box_bounds.corners();
    assert_eq!(corners[0], Vec3::new(0.5, 1.0, 5.0));
    assert_eq!(corners[6], Vec3::new(1.5, 3.0, 1.0));
}
