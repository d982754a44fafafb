// Option toggle parsers: color, trendline, cluster, marker

use super::lexer::{column_name, string_literal, unsigned, ws};
use crate::options::ChartOption;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    sequence::{delimited, preceded},
    IResult,
};

/// Format: color(col)
pub fn parse_color(input: &str) -> IResult<&str, ChartOption> {
    let (input, _) = ws(tag("color"))(input)?;
    let (input, column) = delimited(ws(char('(')), ws(column_name), ws(char(')')))(input)?;
    Ok((input, ChartOption::Color(column)))
}

/// Format: trendline()
pub fn parse_trendline(input: &str) -> IResult<&str, ChartOption> {
    let (input, _) = ws(tag("trendline"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, ChartOption::Trendline))
}

/// Format: cluster(col, k: 3)
pub fn parse_cluster(input: &str) -> IResult<&str, ChartOption> {
    let (input, _) = ws(tag("cluster"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, variable) = ws(column_name)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, clusters) = preceded(ws(tag("k:")), ws(unsigned))(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, ChartOption::Explore { variable, clusters }))
}

pub fn parse_toggle(input: &str) -> IResult<&str, ChartOption> {
    alt((parse_color, parse_trendline, parse_cluster))(input)
}

/// Fixed marker colour
/// Format: marker("green")
pub fn parse_marker(input: &str) -> IResult<&str, String> {
    let (input, _) = ws(tag("marker"))(input)?;
    delimited(ws(char('(')), ws(string_literal), ws(char(')')))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        let (_, opt) = parse_toggle(r#"color("SARS-Cov-2 exam result")"#).unwrap();
        assert_eq!(opt, ChartOption::Color("SARS-Cov-2 exam result".into()));
    }

    #[test]
    fn test_parse_trendline() {
        assert_eq!(parse_toggle("trendline()").unwrap().1, ChartOption::Trendline);
    }

    #[test]
    fn test_parse_cluster() {
        let (_, opt) = parse_toggle("cluster(Platelets, k: 3)").unwrap();
        assert_eq!(
            opt,
            ChartOption::Explore {
                variable: "Platelets".into(),
                clusters: 3
            }
        );
    }

    #[test]
    fn test_parse_cluster_missing_k() {
        assert!(parse_cluster("cluster(Platelets)").is_err());
    }

    #[test]
    fn test_parse_marker() {
        assert_eq!(parse_marker(r#"marker("green")"#).unwrap().1, "green");
        assert!(parse_marker("marker(green)").is_err());
    }
}
