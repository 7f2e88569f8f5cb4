use std::ffi::OsString;
use std::path::PathBuf;

xflags::xflags! {
    /// Builds and publishes the band's web site.
    cmd conductor {
        /// Log more; repeat for even more.
        repeated -v, --verbose
        /// Only log warnings and errors.
        optional -q, --quiet
        /// The site's root directory. Defaults to the config file's directory
        /// or the working directory.
        optional --root root: PathBuf
        /// Read settings from this file instead of `<root>/site.toml`.
        optional --config config: PathBuf

        /// Build the site into the output directory.
        default cmd build {}

        /// Build the site, then upload it and ensure a CDN distribution.
        cmd deploy {
            /// The S3 bucket to upload to.
            optional --bucket bucket: String
        }
    }
}

pub const USAGE: &str = "\
usage: conductor [-v]... [-q] [--root <dir>] [--config <file>] [build | deploy --bucket <name>]

commands:
    build                  build the site (default)
    deploy --bucket <name> build the site, then upload it to <name>";

/// What to do once the site is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Build,
    Deploy { bucket: String },
}

/// Parses command line arguments, excluding the program name.
pub fn parse(args: Vec<OsString>) -> Result<(Conductor, Action), String> {
    let flags = Conductor::from_vec(args).map_err(|e| e.to_string())?;
    let action = match &flags.subcommand {
        ConductorCmd::Build(_) => Action::Build,
        ConductorCmd::Deploy(deploy) => match deploy.bucket.as_deref().map(str::trim) {
            Some(bucket) if !bucket.is_empty() => Action::Deploy { bucket: bucket.to_string() },
            _ => return Err("deploy requires a non-empty --bucket".into()),
        },
    };

    Ok((flags, action))
}

impl Conductor {
    /// The default log filter directive for the requested verbosity.
    pub fn log_directive(&self) -> String {
        let level = match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };

        format!("warn,bandsite={level},conductor={level}")
    }
}
