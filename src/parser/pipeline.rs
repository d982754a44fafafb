// Pipeline parser for the view DSL

use super::ast::{Axis, ViewRequest, ViewScript};
use super::axes::parse_axis;
use super::family::parse_family;
use super::filter::parse_filter;
use super::interaction::{parse_click, parse_flip};
use super::lexer::ws;
use super::toggles::{parse_marker, parse_toggle};
use crate::chart::{ChartFamily, Reshape};
use crate::filter::FilterSpec;
use crate::options::ChartOption;
use crate::selection::ClickPoint;
use nom::{
    branch::alt,
    character::complete::char,
    combinator::{eof, map, opt},
    multi::{separated_list0, separated_list1},
    IResult,
};

#[derive(Debug)]
enum ViewComponent {
    Axis(Axis, Vec<String>),
    Family(ChartFamily, Reshape),
    Toggle(ChartOption),
    Filter(FilterSpec),
    Flip(u32),
    Click(ClickPoint),
    Marker(String),
}

fn parse_view_component(input: &str) -> IResult<&str, ViewComponent> {
    alt((
        map(parse_axis, |(axis, cols)| ViewComponent::Axis(axis, cols)),
        map(parse_toggle, ViewComponent::Toggle),
        map(parse_filter, ViewComponent::Filter),
        map(parse_flip, ViewComponent::Flip),
        map(parse_click, ViewComponent::Click),
        map(parse_marker, ViewComponent::Marker),
        map(parse_family, |(family, reshape)| ViewComponent::Family(family, reshape)),
    ))(input)
}

/// Fold parsed components into one request
fn fold_components(components: Vec<ViewComponent>) -> ViewRequest {
    // Axes and singletons: last one wins. Toggles and clicks accumulate.
    let mut request = ViewRequest::default();
    for comp in components {
        match comp {
            ViewComponent::Axis(Axis::X, cols) => request.x = cols,
            ViewComponent::Axis(Axis::Y, cols) => request.y = cols,
            ViewComponent::Axis(Axis::Z, cols) => request.z = cols,
            ViewComponent::Family(family, reshape) => {
                request.family = family;
                request.reshape = reshape;
            }
            ViewComponent::Toggle(t) => request.options.push(t),
            ViewComponent::Filter(f) => request.filter = Some(f),
            ViewComponent::Flip(n) => request.flip_count = n,
            ViewComponent::Click(p) => request.clicks.points.push(p),
            ViewComponent::Marker(c) => request.marker_color = Some(c),
        }
    }
    request
}

// Script entries need at least one component
fn script_entry(input: &str) -> IResult<&str, ViewRequest> {
    map(
        separated_list1(ws(char('|')), parse_view_component),
        fold_components,
    )(input)
}

/// Parse a complete view description
/// Format: component | component | ...
pub fn parse_view(input: &str) -> IResult<&str, ViewRequest> {
    let (input, components) = separated_list0(ws(char('|')), parse_view_component)(input)?;
    let (input, _) = ws(eof)(input)?;
    let request = fold_components(components);
    Ok((input, request))
}

/// Parse a script of views replayed against one session
/// Format: view ; view ; ...
pub fn parse_script(input: &str) -> IResult<&str, ViewScript> {
    let (input, requests) = separated_list1(ws(char(';')), script_entry)(input)?;
    let (input, _) = opt(ws(char(';')))(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, requests))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterRange;

    #[test]
    fn test_parse_minimal_view() {
        let (_, req) = parse_view("x(A) | y(B)").unwrap();
        assert_eq!(req.x, vec!["A"]);
        assert_eq!(req.y, vec!["B"]);
        assert_eq!(req.family, ChartFamily::Scatter);
        assert_eq!(req.reshape, Reshape::Auto);
    }

    #[test]
    fn test_parse_full_view() {
        let input = r#"x(A, B) | y("Red blood Cells") | histogram() | color(Group) | trendline()
            | cluster(A, k: 3) | filter(Group: {0, 2}) | flip(1) | click(3) | click(5, 1.0, 2.0)
            | marker("green")"#;
        let (_, req) = parse_view(input).unwrap();
        assert_eq!(req.x, vec!["A", "B"]);
        assert_eq!(req.y, vec!["Red blood Cells"]);
        assert_eq!(req.family, ChartFamily::Histogram);
        assert_eq!(req.options.len(), 3);
        assert_eq!(
            req.filter,
            Some(FilterSpec::new("Group", FilterRange::Indices([0, 2].into_iter().collect())))
        );
        assert_eq!(req.flip_count, 1);
        assert_eq!(req.clicks.points.len(), 2);
        assert_eq!(req.marker_color.as_deref(), Some("green"));
    }

    #[test]
    fn test_parse_melted_scatter() {
        let (_, req) = parse_view("x(A, B, C) | y(D) | scatter(melted)").unwrap();
        assert_eq!(req.reshape, Reshape::Melted);
    }

    #[test]
    fn test_last_axis_wins() {
        let (_, req) = parse_view("x(A) | x(B)").unwrap();
        assert_eq!(req.x, vec!["B"]);
    }

    #[test]
    fn test_parse_empty_view() {
        let (_, req) = parse_view("").unwrap();
        assert_eq!(req, ViewRequest::default());
    }

    #[test]
    fn test_parse_view_trailing_pipe() {
        assert!(parse_view("x(A) | y(B) |").is_err());
    }

    #[test]
    fn test_parse_view_unknown_component() {
        assert!(parse_view("x(A) | pie()").is_err());
    }

    #[test]
    fn test_parse_script() {
        let (_, script) = parse_script("x(A) | y(B) ; x(A) | y(B) | click(0);").unwrap();
        assert_eq!(script.len(), 2);
        assert!(script[0].clicks.is_empty());
        assert_eq!(script[1].clicks.points.len(), 1);
    }

    #[test]
    fn test_parse_script_empty_entry() {
        assert!(parse_script("x(A) ;; y(B)").is_err());
        assert!(parse_script("").is_err());
    }
}
