// Axis selection parser

use super::ast::Axis;
use super::lexer::{column_name, ws};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::value,
    multi::separated_list0,
    IResult,
};

/// Parse an axis selection
/// Format: x(col, "Quoted col", ...), y(...) or z(...)
pub fn parse_axis(input: &str) -> IResult<&str, (Axis, Vec<String>)> {
    let (input, axis) = ws(alt((
        value(Axis::X, tag("x")),
        value(Axis::Y, tag("y")),
        value(Axis::Z, tag("z")),
    )))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, columns) = separated_list0(ws(char(',')), ws(column_name))(input)?;
    let (input, _) = ws(char(')'))(input)?;

    Ok((input, (axis, columns)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_x_list() {
        let (_, (axis, cols)) = parse_axis(r#"x(Platelets, "Red blood Cells")"#).unwrap();
        assert_eq!(axis, Axis::X);
        assert_eq!(cols, vec!["Platelets", "Red blood Cells"]);
    }

    #[test]
    fn test_parse_empty_axis() {
        let (_, (axis, cols)) = parse_axis("y()").unwrap();
        assert_eq!(axis, Axis::Y);
        assert!(cols.is_empty());
    }

    #[test]
    fn test_parse_z() {
        let (_, (axis, cols)) = parse_axis(" z( a ) ").unwrap();
        assert_eq!(axis, Axis::Z);
        assert_eq!(cols, vec!["a"]);
    }

    #[test]
    fn test_parse_axis_unclosed() {
        assert!(parse_axis("x(a, b").is_err());
    }

    #[test]
    fn test_parse_axis_trailing_comma() {
        assert!(parse_axis("x(a,)").is_err());
    }
}
