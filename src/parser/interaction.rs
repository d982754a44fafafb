// Interaction parsers: flip button and point clicks

use super::lexer::{number_literal, unsigned, ws};
use crate::selection::ClickPoint;
use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::{map_res, opt},
    sequence::{delimited, preceded, separated_pair},
    IResult,
};

/// Format: flip(3)
pub fn parse_flip(input: &str) -> IResult<&str, u32> {
    let (input, _) = ws(tag("flip"))(input)?;
    delimited(
        ws(char('(')),
        map_res(ws(unsigned), |n: usize| u32::try_from(n)),
        ws(char(')')),
    )(input)
}

/// Format: click(4) or click(4, 1.5, 2.0)
pub fn parse_click(input: &str) -> IResult<&str, ClickPoint> {
    let (input, _) = ws(tag("click"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, point_index) = ws(unsigned)(input)?;
    let (input, coords) = opt(preceded(
        ws(char(',')),
        separated_pair(ws(number_literal), ws(char(',')), ws(number_literal)),
    ))(input)?;
    let (input, _) = ws(char(')'))(input)?;

    Ok((
        input,
        ClickPoint {
            point_index,
            x: coords.map(|c| c.0),
            y: coords.map(|c| c.1),
        },
    ))
}
