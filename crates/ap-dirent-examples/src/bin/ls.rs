//! List directories recursively with the host file system.

use anyhow::{anyhow, Context};
use ap_dirent::native::Platform;
use ap_dirent::{encoding, Dir, Encoding, FileType, Narrow, Representation, WideChar, Wide};
use ap_dirent_native::{NativeFs, NATIVE};
use gumdrop::Options;
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Options)]
struct CommandOptions {
    /// Print the help message.
    help: bool,

    /// Use wide names instead of bytes.
    wide: bool,

    /// Locale name for the active encoding, e.g. `C` or `en_US.UTF-8`.
    encoding: Option<String>,

    /// Maximum depth. Zero means unlimited.
    depth: usize,

    /// Show entries of unknown type.
    all: bool,

    /// Start directory.
    #[options(default = ".")]
    start: String,
}

/// Walks the tree, remembering the real path of each directory so links
/// pointing upwards are not entered again.
struct Walker<'o, W> {
    opts: &'o CommandOptions,
    out: W,
    visited: HashSet<PathBuf>,
}

impl<W: Write> Walker<'_, W> {
    /// Returns false if the directory was seen before.
    fn enter(&mut self, path: &str) -> bool {
        match std::fs::canonicalize(path) {
            Ok(real) => self.visited.insert(real),
            // opening the directory reports the problem
            Err(_) => true,
        }
    }

    fn visit<R: Representation>(&mut self, path: &R::Path, depth: usize) -> anyhow::Result<()> {
        let encoding = encoding::active();
        let mut dir = Dir::<_, R>::open(&NATIVE, path)
            .with_context(|| format!("opening {}", R::to_string_lossy(path, encoding)))?;
        while let Some(entry) = dir.read()? {
            if entry.typ == FileType::Unknown && !self.opts.all {
                continue;
            }
            let child = R::join(path, NativeFs::SEPARATORS[0], &entry.name);
            let marker = match entry.typ {
                FileType::Directory => "d",
                FileType::RegularFile => "f",
                FileType::Unknown => "?",
            };
            let shown = R::to_string_lossy(&child, encoding);
            writeln!(self.out, "{marker} {shown}")?;
            if entry.typ == FileType::Directory && depth != 1 {
                if !self.enter(&shown) {
                    tracing::debug!(path = %shown, "already visited");
                    continue;
                }
                self.visit::<R>(&child, core::cmp::max(depth, 1) - 1)?;
            }
        }
        dir.close()?;
        Ok(())
    }

    fn run(&mut self, active: Encoding) -> anyhow::Result<()> {
        let start = self.opts.start.clone();
        self.enter(&start);
        let wide: Vec<WideChar> = start.chars().map(WideChar::from).collect();
        if self.opts.wide {
            self.visit::<Wide>(&wide, self.opts.depth)
        } else {
            self.visit::<Narrow>(&active.encode(&wide).value, self.opts.depth)
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = CommandOptions::parse_args_default_or_exit();
    let mut active = encoding::init_from_env();
    if let Some(name) = &opts.encoding {
        active = Encoding::from_locale(name).ok_or_else(|| anyhow!("unknown encoding {name:?}"))?;
        encoding::set_active(active);
    }
    tracing::debug!(?active, wide = opts.wide, "listing");

    Walker {
        opts: &opts,
        out: std::io::stdout().lock(),
        visited: HashSet::new(),
    }
    .run(active)
}
