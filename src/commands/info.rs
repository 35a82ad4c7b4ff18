use super::tables::{add_field, add_simple};
use crate::cli::{DepsArgs, InfoArgs, TableArgs};
use crate::commands::tables::{SimpleTableBuilder, TableBuilder};
use crate::introspect::{self, Platform};
use crate::utils::{self, Styling, uwriteln};
use std::io::Write;

/// Returns false if any of the paths couldn't be introspected.
pub fn info(mut out: impl Write, platform: Platform, args: &InfoArgs) -> bool {
    if let [path] = args.paths.as_slice() {
        let info = match introspect::introspect(path, platform) {
            Ok(info) => info,
            Err(err) => {
                utils::warn(&format!("{}: {err}", path.display()));
                return false;
            }
        };
        let mut b = SimpleTableBuilder::new();
        add_simple!(b, "format", info.format, "container format that was parsed");
        add_simple!(
            b,
            "word size",
            info.word_size,
            "pointer width of the code in bits"
        );
        add_simple!(
            b,
            "debug build",
            info.is_debug_build,
            "symbols or debug info were found, this is a guess"
        );
        add_simple!(
            b,
            "dependencies",
            info.dependencies.join(" "),
            "libraries loaded directly by the binary, as named in the file"
        );
        b.writeln(&mut out, args.explain);
        return true;
    }

    let mut ok = true;
    let mut b = TableBuilder::new();
    b.left("path", "the file that was introspected");
    b.left("format", "container format that was parsed");
    b.right("bits", "pointer width of the code");
    b.left("debug", "symbols or debug info were found, this is a guess");
    b.left(
        "dependencies",
        "libraries loaded directly by the binary, as named in the file",
    );
    let results = introspect::introspect_all(&args.paths, platform);
    for (path, result) in args.paths.iter().zip(results) {
        match result {
            Ok(info) => {
                add_field!(b, "path", path.display());
                add_field!(b, "format", info.format);
                add_field!(b, "bits", info.word_size);
                add_field!(b, "debug", info.is_debug_build);
                add_field!(b, "dependencies", info.dependencies.join(" "));
            }
            Err(err) => {
                utils::warn(&format!("{}: {err}", path.display()));
                ok = false;
            }
        }
    }
    b.writeln(&mut out, args.titles, args.explain);
    ok
}

/// One dependency per line so the output can be piped into other tools.
pub fn deps(mut out: impl Write, platform: Platform, args: &DepsArgs) -> bool {
    match introspect::dependencies_only(&args.path, platform) {
        Ok(names) => {
            for name in names {
                uwriteln!(out, "{name}");
            }
            true
        }
        Err(err) => {
            utils::warn(&format!("{}: {err}", args.path.display()));
            false
        }
    }
}

pub fn sections(mut out: impl Write, platform: Platform, args: &TableArgs) -> bool {
    let summaries = match introspect::section_summaries(&args.path, platform) {
        Ok(summaries) => summaries,
        Err(err) => {
            utils::warn(&format!("{}: {err}", args.path.display()));
            return false;
        }
    };
    if summaries.is_empty() {
        uwriteln!(out, "{}", "no sections".explain_text());
        return true;
    }

    let mut b = TableBuilder::new();
    b.left("name", "section name, may be empty or truncated to eight bytes for PE");
    b.right("offset", "offset of the section's bytes within the file (hex)");
    b.right("size", "number of bytes the section occupies in the file (hex)");
    b.right(
        "addr",
        "RVA for PE, virtual address for ELF, zero if not loaded (hex)",
    );
    for summary in summaries {
        add_field!(b, "name", summary.name);
        add_field!(b, "offset", "{:x}", summary.offset.0);
        add_field!(b, "size", "{:x}", summary.size);
        add_field!(b, "addr", "{:x}", summary.addr);
    }
    b.writeln(&mut out, args.titles, args.explain);
    true
}
