#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Print a trace line to stderr when `AUTOBOLD_DEBUG` is set.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        if std::env::var_os("AUTOBOLD_DEBUG").is_some() {
            eprintln!($($arg)*);
        }
    };
}
