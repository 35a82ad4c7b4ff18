pub mod styles;

pub use styles::*;

/// writeln that ignores errors, e.g. from a closed pipe.
macro_rules! uwriteln {
    ($out:expr) => {
        let _ = writeln!($out);
    };
    ($out:expr, $($arg:tt)*) => {
        let _ = writeln!($out, $($arg)*);
    };
}
pub(crate) use uwriteln;

pub fn warn(mesg: &str) {
    eprintln!("{}", mesg.warn());
}

pub fn explain(mut out: impl std::io::Write, title: &str, text: &str) {
    uwriteln!(out, "{}: {}", title.explain_title(), text.explain_text());
}

/// Remove escape sequences from the string (e.g. for colors).
#[cfg(test)]
pub fn strip_escapes(s: &str) -> String {
    // Even with an empty style sheet the tabled crate will add escape sequences to the
    // end of lines to reset all modes.
    let mut result = String::with_capacity(s.len());
    let mut escaping = false;

    // Note that escape sequences can be fairly gnarly, e.g. for RGB colors.
    // See https://gist.github.com/fnky/458719343aabd01cfb17a3a4f7296797
    for c in s.chars() {
        if c == '\x1b' {
            escaping = true;
        } else if escaping {
            if c == 'm' {
                escaping = false;
            }
        } else {
            result.push(c);
        }
    }
    result
}
