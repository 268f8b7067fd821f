mod debug_report;

use autobold::{DEFAULT_SENTENCE_SELECTORS, Options, highlight_verbose, inspect, markup};
use std::io::{self, IsTerminal, Read};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut root = match markup::parse_fragment(&config.input) {
        Ok(root) => root,
        Err(err) => {
            eprintln!("error: invalid markup: {err}");
            std::process::exit(1);
        }
    };

    let res =
        highlight_verbose(&mut root, &config.selectors, &config.headword, config.reading.as_deref(), &config.options);
    let summary = inspect(&root, &config.selectors, &config.options);

    if config.quiet {
        println!("{}", markup::to_html(&root));
        return;
    }
    let run = debug_report::Run {
        headword: &config.headword,
        reading: config.reading.as_deref(),
        selectors: &config.selectors,
        report: &res,
        summary: &summary,
        output: &markup::to_html(&root),
    };
    debug_report::print_run(&run, config.color);
}

struct CliConfig {
    input: String,
    headword: String,
    reading: Option<String>,
    selectors: Vec<String>,
    options: Options,
    color: bool,
    quiet: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut headword: Option<String> = None;
    let mut reading: Option<String> = None;
    let mut selectors: Vec<String> = Vec::new();
    let mut options = Options::default();
    let mut color = io::stdout().is_terminal();
    let mut quiet = false;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        // Split `--flag=value` once so both spellings share one match arm.
        let (flag, inline) = match arg.split_once('=') {
            Some((f, v)) if f.starts_with("--") => (f.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            match inline.clone() {
                Some(v) => Ok(v),
                None => args.next().ok_or_else(|| format!("error: {name} expects a value")),
            }
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("autobold {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "-q" | "--quiet" => quiet = true,
            "-w" | "--headword" => headword = Some(value("--headword")?),
            "-r" | "--reading" => reading = Some(value("--reading")?),
            "-s" | "--selector" => selectors.push(value("--selector")?),
            "--fallback" => options.fallback_selector = Some(value("--fallback")?),
            "--no-fallback-selector" => options.fallback_selector = None,
            "--bridge" => {
                let raw = value("--bridge")?;
                options.bridge_limit =
                    raw.parse().map_err(|_| format!("error: invalid --bridge '{raw}' (expected a non-negative integer)"))?;
            }
            "--pretag" => options.pretag = value("--pretag")?,
            "--class" => options.marker_class = value("--class")?,
            "--all" => options.first_match_only = false,
            "--strict" => options.strict_scope = true,
            "--no-fallback" => options.fallback_allowed = false,
            "--no-pretag" => options.convert_pretags = false,
            "--no-regex" => options.pattern_matching = false,
            "-i" | "--input" => {
                let v = value("--input")?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(v);
            }
            "--" => {
                let rest = args.by_ref().collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args.by_ref()).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let headword = headword.unwrap_or_default();
    if headword.trim().is_empty() && reading.as_deref().is_none_or(|r| r.trim().is_empty()) {
        return Err(format!("error: --headword or --reading is required\n\n{}", help_text()));
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    if selectors.is_empty() {
        selectors = DEFAULT_SENTENCE_SELECTORS.iter().map(|s| s.to_string()).collect();
    }

    Ok(CliConfig { input, headword, reading, selectors, options, color, quiet })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "autobold {version}

Bold the target word of a Japanese example sentence in card markup.

Usage:
  autobold [OPTIONS] --headword <word> [--] <markup...>
  autobold [OPTIONS] --headword <word> --input <markup>
  echo '<div class=\"sentence\">…</div>' | autobold -w <word>

Options:
  -w, --headword <word>      Target word (dictionary form).
  -r, --reading <kana>       Reading; stored forms like 課長[かちょう] are fine.
  -s, --selector <sel>       Sentence container selector (repeatable).
                             Default: {default_selectors}
  -i, --input <markup>       Markup to process. If omitted, reads remaining args
                             or stdin when no args are provided.
  --bridge <n>               Max kana between the headword's kanji. Default: 12
  --all                      Bold every match of the winning pattern.
  --strict                   Only work inside a sentence container...
  --no-fallback              ...and never fall back to the card or root.
  --fallback <sel>           Fallback container selector. Default: #qa
  --no-fallback-selector     Fall back straight to the root.
  --pretag <tag>             Pre-marked target tag. Default: t
  --class <class>            Class for inserted <b> markers. Default: auto-bold
  --no-pretag                Do not convert pre-tags.
  --no-regex                 Do not run the pattern cascade.
  -q, --quiet                Print only the resulting markup.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  AUTOBOLD_DEBUG=1           Trace scope, pattern and outcome decisions to stderr.

Exit codes:
  0  Success (including no-match / no-scope outcomes).
  1  Input markup could not be parsed.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_selectors = DEFAULT_SENTENCE_SELECTORS.join(" ")
    )
}
