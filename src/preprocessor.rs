// Variable expansion for view scripts

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

/// Replace `$name` references with values from `variables`.
///
/// Outside string literals a value that is neither a bare identifier nor a
/// number is wrapped in quotes, so `--var col="Red blood Cells"` can be used
/// as `x($col)`. Inside string literals the value is inserted as-is.
pub fn expand_variables(input: &str, variables: &HashMap<String, String>) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_string = !in_string;
                output.push(c);
            }
            '$' => {
                let var_name = consume_identifier(&mut chars);
                if var_name.is_empty() {
                    // Lone $
                    output.push('$');
                    continue;
                }
                let val = variables
                    .get(&var_name)
                    .ok_or_else(|| anyhow!("Variable '${}' not defined", var_name))?;
                if in_string || is_bare_token(val) {
                    output.push_str(val);
                } else {
                    output.push('"');
                    output.push_str(val);
                    output.push('"');
                }
            }
            _ => output.push(c),
        }
    }

    Ok(output)
}

fn consume_identifier(chars: &mut Peekable<Chars>) -> String {
    let mut name = String::new();
    if let Some(&c) = chars.peek() {
        if !c.is_alphabetic() && c != '_' {
            return name;
        }
    }

    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

fn is_bare_token(val: &str) -> bool {
    let mut it = val.chars();
    let ident = match it.next() {
        Some(c) if c.is_alphabetic() || c == '_' => it.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    };
    ident || val.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_expansion() {
        let v = vars(&[("col", "Platelets"), ("k", "3")]);
        let output = expand_variables("x($col) | cluster($col, k: $k)", &v).unwrap();
        assert_eq!(output, "x(Platelets) | cluster(Platelets, k: 3)");
    }

    #[test]
    fn test_quotes_names_with_spaces() {
        let v = vars(&[("col", "Red blood Cells")]);
        let output = expand_variables("x($col)", &v).unwrap();
        assert_eq!(output, r#"x("Red blood Cells")"#);
    }

    #[test]
    fn test_string_interpolation() {
        let v = vars(&[("c", "dark green")]);
        let output = expand_variables(r#"marker("$c")"#, &v).unwrap();
        assert_eq!(output, r#"marker("dark green")"#);
    }

    #[test]
    fn test_lone_dollar() {
        let output = expand_variables("Cost ($)", &HashMap::new()).unwrap();
        assert_eq!(output, "Cost ($)");
    }

    #[test]
    fn test_undefined_variable() {
        assert!(expand_variables("x($missing)", &HashMap::new()).is_err());
    }
}
