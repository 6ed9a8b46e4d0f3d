use std::collections::HashMap;
use anyhow::{bail, Result};

/// Options collected from the command line, keyed by name without dashes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    options: HashMap<String, String>,
}

impl CliOptions {
    /// Value of the first of `names` that was given (e.g. `["d", "directory"]`)
    pub fn get(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| self.options.get(*name))
            .map(|value| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Names that are not in `known`
    pub fn unknown<'a>(&'a self, known: &'a [&'a str]) -> impl Iterator<Item = &'a str> {
        self.options
            .keys()
            .map(|key| key.as_str())
            .filter(move |key| !known.contains(key))
    }
}

fn process_option(
    prefix: &str,
    args: &[String],
    i: usize,
    options: &mut HashMap<String, String>,
) -> Result<usize> {
    let arg = &args[i];
    let option = arg.trim_start_matches(prefix);

    // --port=8080
    if let Some((key, value)) = option.split_once('=') {
        if key.is_empty() {
            bail!("Invalid option: {}", arg);
        }
        options.insert(key.to_string(), value.to_string());
        return Ok(i + 1);
    }

    if option.is_empty() {
        bail!("Invalid option: {}", arg);
    }

    if i + 1 < args.len() && !args[i + 1].starts_with('-') {
        options.insert(option.to_string(), args[i + 1].clone());
        Ok(i + 2)
    } else {
        bail!("Option {} requires a value", arg);
    }
}

/// Parse `-k value`, `--key value` and `--key=value` options.
///
/// `args[0]` is the program name like in `std::env::args`. Parsing stops at
/// `--`; positional arguments are skipped.
pub fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut options = HashMap::new();
    let mut i = 1;

    while i < args.len() {
        let arg = &args[i];

        if arg == "--" {
            break;
        }

        if arg.starts_with("--") {
            i = process_option("--", args, i, &mut options)?;
        } else if arg.starts_with('-') && arg.len() > 1 {
            i = process_option("-", args, i, &mut options)?;
        } else {
            i += 1;
        }
    }

    Ok(CliOptions { options })
}
