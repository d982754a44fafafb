// Shared token parsers for the view DSL

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{map, map_res, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, tuple},
    IResult,
};

/// Wrap a parser so it skips surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Bare identifier: letter or `_`, then letters, digits or `_`
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            satisfy(|c| c.is_alphabetic() || c == '_'),
            many0(satisfy(|c| c.is_alphanumeric() || c == '_')),
        )),
        String::from,
    )(input)
}

/// Double-quoted string without escapes
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        String::from,
    )(input)
}

/// Column reference: a bare identifier or a quoted name
pub fn column_name(input: &str) -> IResult<&str, String> {
    alt((string_literal, identifier))(input)
}

/// Decimal number. Does not consume a trailing `.` so `1..5` splits cleanly.
pub fn number_literal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        str::parse::<f64>,
    )(input)
}

pub fn unsigned(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("Platelets rest"), Ok((" rest", "Platelets".to_string())));
        assert_eq!(identifier("_a1)"), Ok((")", "_a1".to_string())));
        assert!(identifier("1abc").is_err());
    }

    #[test]
    fn test_column_name_quoted() {
        let (rest, name) = column_name(r#""Red blood Cells", x"#).unwrap();
        assert_eq!(name, "Red blood Cells");
        assert_eq!(rest, ", x");
    }

    #[test]
    fn test_number_literal() {
        assert_eq!(number_literal("-1.5)"), Ok((")", -1.5)));
        assert_eq!(number_literal("3..7"), Ok(("..7", 3.0)));
        assert!(number_literal("abc").is_err());
    }

    #[test]
    fn test_ws() {
        let (rest, v) = ws(unsigned)("  42  ,").unwrap();
        assert_eq!(v, 42);
        assert_eq!(rest, ",");
    }
}
