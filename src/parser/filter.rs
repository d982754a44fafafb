// Filter parser

use super::lexer::{column_name, number_literal, unsigned, ws};
use crate::filter::{FilterRange, FilterSpec};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::map,
    multi::separated_list1,
    sequence::{delimited, separated_pair},
    IResult,
};

fn parse_bounds(input: &str) -> IResult<&str, FilterRange> {
    map(
        separated_pair(ws(number_literal), tag(".."), ws(number_literal)),
        |(lo, hi)| FilterRange::Bounds(lo, hi),
    )(input)
}

fn parse_indices(input: &str) -> IResult<&str, FilterRange> {
    map(
        delimited(
            ws(char('{')),
            separated_list1(ws(char(',')), ws(unsigned)),
            ws(char('}')),
        ),
        |indices| FilterRange::Indices(indices.into_iter().collect()),
    )(input)
}

/// Parse a filter
/// Format: filter(col: lo..hi) or filter(col: {0, 2})
pub fn parse_filter(input: &str) -> IResult<&str, FilterSpec> {
    let (input, _) = ws(tag("filter"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, column) = ws(column_name)(input)?;
    let (input, _) = ws(char(':'))(input)?;
    let (input, range) = alt((parse_indices, parse_bounds))(input)?;
    let (input, _) = ws(char(')'))(input)?;

    Ok((input, FilterSpec::new(column, range)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounds() {
        let (_, spec) = parse_filter("filter(Platelets: -1.5..2)").unwrap();
        assert_eq!(spec.column, "Platelets");
        assert_eq!(spec.range, FilterRange::Bounds(-1.5, 2.0));
    }

    #[test]
    fn test_parse_index_set() {
        let (_, spec) = parse_filter(r#"filter("Patient age quantile": {0, 2})"#).unwrap();
        assert_eq!(spec.column, "Patient age quantile");
        assert_eq!(spec.range, FilterRange::Indices([0, 2].into_iter().collect()));
    }

    #[test]
    fn test_parse_empty_set_rejected() {
        assert!(parse_filter("filter(a: {})").is_err());
    }

    #[test]
    fn test_parse_missing_range() {
        assert!(parse_filter("filter(a)").is_err());
    }
}
