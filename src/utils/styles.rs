//! Used to color and otherwise style various bits of output using a
//! ~/.exedeps/styles.tcss file.
use std::fs::OpenOptions;
use std::io;
use std::io::prelude::*;
use std::path::Path;
use std::sync::LazyLock;
use std::{fs, path::PathBuf};
use termio::prelude::*;
use termio::{StyledString, Termio};

const STYLE_DIR: &str = ".exedeps";
const STYLE_FILE: &str = "styles.tcss";

/// Create the style file if it is missing.
pub fn generate_style_file() {
    if let Some(mut path) = dirs::home_dir() {
        path.push(STYLE_DIR);
        if make_dir(&path) {
            path.push(STYLE_FILE);
            default_styles(path);
        }
    } else {
        eprintln!("couldn't find home directory"); // don't use warn() here
    }
}

/// Element names match the `@element` rules in the style file.
pub trait Styling: Sized {
    fn styled(self, element: &str) -> StyledString;

    fn explain_title(self) -> StyledString {
        self.styled("explain title")
    }

    fn explain_text(self) -> StyledString {
        self.styled("explain text")
    }

    fn table_header(self) -> StyledString {
        self.styled("table header")
    }

    fn table_sep(self) -> StyledString {
        self.styled("table separator")
    }

    fn table_field(self) -> StyledString {
        self.styled("table field")
    }

    fn warn(self) -> StyledString {
        self.styled("warn")
    }
}

impl Styling for String {
    fn styled(self, element: &str) -> StyledString {
        self.style(element, &TCSS)
    }
}

impl Styling for &str {
    fn styled(self, element: &str) -> StyledString {
        self.style(element, &TCSS)
    }
}

static TCSS: LazyLock<Termio> = LazyLock::new(|| {
    let Some(mut path) = dirs::home_dir() else {
        return Termio::new(); // we'll have complained about this already
    };
    path.push(STYLE_DIR);
    path.push(STYLE_FILE);
    if !path.exists() {
        return Termio::new();
    }
    let os_path = path.to_string_lossy().into_owned();
    match Termio::from_file(&os_path) {
        Ok(tcss) => tcss,
        Err(err) => {
            eprintln!("couldn't parse file at {os_path}: {err}"); // don't use warn() here
            Termio::new()
        }
    }
});

fn make_dir(path: &Path) -> bool {
    match fs::create_dir(path) {
        Ok(_) => true,
        Err(err) => match err.kind() {
            io::ErrorKind::AlreadyExists => true,
            _ => {
                eprintln!("couldn't create path for {}: {err}", path.display()); // don't use warn() here
                false
            }
        },
    }
}

fn default_styles(path: PathBuf) {
    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path.clone())
    {
        Ok(mut file) => {
            let defaults = include_str!("default.tcss");
            if let Err(err) = file.write_all(defaults.as_bytes()) {
                eprintln!("error writing defaults to {}: {err}", path.display());
            }
        }
        Err(err) => match err.kind() {
            io::ErrorKind::AlreadyExists => (), // user already has a styles file
            _ => eprintln!("error creating {}: {err}", path.display()), // don't use warn() here
        },
    }
}
