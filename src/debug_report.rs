use autobold::{BoldSummary, HighlightReport, ScopeOrigin};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// Everything the CLI knows about one pass.
pub struct Run<'a> {
    pub headword: &'a str,
    pub reading: Option<&'a str>,
    pub selectors: &'a [String],
    pub report: &'a HighlightReport,
    pub summary: &'a BoldSummary,
    pub output: &'a str,
}

pub fn print_run(run: &Run<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    let target = match run.reading {
        Some(reading) => format!("{} [{}]", run.headword, reading),
        None => run.headword.to_string(),
    };
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Highlighting: \"{}\"", target), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Scope ━━━", ansi::GRAY));
    print_scope(run, &palette);

    println!("\n{}", palette.paint("━━━ Cascade ━━━", ansi::GRAY));
    print_cascade(run.report, &palette);

    println!("\n{}", palette.paint("━━━ Outcome ━━━", ansi::GRAY));
    let outcome = run.report.outcome;
    let label = if outcome.is_applied() {
        palette.bold(palette.paint(outcome.to_string(), ansi::GREEN))
    } else {
        palette.paint(outcome.to_string(), ansi::YELLOW)
    };
    println!("  {}  {} {}", label, palette.dim("│ state:"), palette.paint(run.summary.to_string(), ansi::BLUE));
    if !outcome.is_applied() {
        println!("\n{}", palette.dim("  Tip: Set AUTOBOLD_DEBUG=1 to see scope and pattern decisions"));
    }

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    println!("  {}", run.output);

    let d = &run.report.details;
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Scope: {}  │  Pre-tags: {}  │  Build: {}",
        palette.paint(format!("{:?}", d.total), ansi::GREEN),
        palette.paint(format!("{:?}", d.scope_time), ansi::CYAN),
        palette.dim(format!("{:?}", d.pretag_time)),
        palette.dim(format!("{:?}", d.build_time)),
    );
    println!();
}

fn print_scope(run: &Run<'_>, palette: &ansi::Palette) {
    let d = &run.report.details;
    let (Some(path), Some(origin)) = (&d.scope_path, &d.scope_origin) else {
        println!("  {}", palette.paint("✗ no sentence container (strict scope)", ansi::YELLOW));
        println!("  {} {}", palette.dim("selectors:"), palette.dim(run.selectors.join(" ")));
        return;
    };

    let origin = match origin {
        ScopeOrigin::Selector { index } => {
            let selector = run.selectors.get(*index).map(String::as_str).unwrap_or("?");
            palette.paint(format!("selector {selector}"), ansi::GREEN)
        }
        ScopeOrigin::Fallback => palette.paint("fallback", ansi::YELLOW),
        ScopeOrigin::Root => palette.paint("root", ansi::YELLOW),
    };
    println!("  {} {}  {} {}", palette.dim("origin:"), origin, palette.dim("│ path:"), palette.paint(format!("{path:?}"), ansi::BLUE));
    if let Some((contains, chars)) = d.scope_score {
        println!(
            "  {} {}  {} {}",
            palette.dim("contains target:"),
            palette.paint(if contains { "yes" } else { "no" }, ansi::CYAN),
            palette.dim("│ japanese chars:"),
            palette.paint(chars.to_string(), ansi::CYAN)
        );
    }
    if d.pretags_converted > 0 {
        println!("  {} {}", palette.dim("pre-tags converted:"), palette.paint(d.pretags_converted.to_string(), ansi::GREEN));
    }
}

fn print_cascade(report: &HighlightReport, palette: &ansi::Palette) {
    let d = &report.details;
    if d.patterns.is_empty() {
        let why = if d.patterns_built == 0 { "cascade not run" } else { "no pattern tried" };
        println!("  {}", palette.dim(why));
        return;
    }

    for (idx, p) in d.patterns.iter().enumerate() {
        let mark = if p.wrapped > 0 {
            palette.paint(format!("✓ {} wrapped", p.wrapped), ansi::GREEN)
        } else {
            palette.dim("✗ miss")
        };
        println!(
            "  {} {} {}  {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.paint(p.source.as_str(), ansi::BLUE),
            mark,
            palette.dim(format!("{:?}", p.duration))
        );
        println!("      {} {}", palette.dim("regex:"), palette.paint(&p.regex, ansi::CYAN));
    }
    let untried = d.patterns_built.saturating_sub(d.patterns.len());
    if untried > 0 {
        println!("  {}", palette.dim(format!("... {} later pattern(s) not tried", untried)));
    }
}
