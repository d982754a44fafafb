// Chart family parser

use super::lexer::{identifier, ws};
use crate::chart::{ChartFamily, Reshape};
use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::{map_opt, opt},
    IResult,
};

/// Parse a chart family
/// Format: histogram(), scatter(), scatter(melted), box(), heatmap(),
/// par_coords(), strip(), ternary()
pub fn parse_family(input: &str) -> IResult<&str, (ChartFamily, Reshape)> {
    let (input, family) = map_opt(ws(identifier), |name| ChartFamily::from_name(&name))(input)?;
    let (input, _) = ws(char('('))(input)?;

    let (input, melted) = if family == ChartFamily::Scatter {
        opt(ws(tag("melted")))(input)?
    } else {
        (input, None)
    };

    let (input, _) = ws(char(')'))(input)?;

    let reshape = if melted.is_some() { Reshape::Melted } else { Reshape::Auto };
    Ok((input, (family, reshape)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_families() {
        for family in ChartFamily::ALL {
            let input = format!("{}()", family.name());
            let (_, (parsed, reshape)) = parse_family(&input).unwrap();
            assert_eq!(parsed, family);
            assert_eq!(reshape, Reshape::Auto);
        }
    }

    #[test]
    fn test_parse_scatter_melted() {
        let (_, (family, reshape)) = parse_family("scatter( melted )").unwrap();
        assert_eq!(family, ChartFamily::Scatter);
        assert_eq!(reshape, Reshape::Melted);
    }

    #[test]
    fn test_melted_only_for_scatter() {
        assert!(parse_family("histogram(melted)").is_err());
    }

    #[test]
    fn test_unknown_family() {
        assert!(parse_family("pie()").is_err());
    }
}
