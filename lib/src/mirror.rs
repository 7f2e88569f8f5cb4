use std::{fs, io};
use std::path::Path;

use crate::error::{Result, Chainable};
use crate::fstree::FsTree;

/// What [`mirror()`] copied.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Mirrored {
    pub directories: usize,
    pub files: usize,
}

/// Copies the tree at `src` into `dst`.
///
/// Directories are created as needed and, on Unix, receive the permission
/// bits of their source when created. Files are always overwritten. Nothing
/// under `dst` is ever deleted, so files absent from `src` survive.
pub fn mirror<S: AsRef<Path>, D: AsRef<Path>>(src: S, dst: D) -> Result<Mirrored> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    tracing::info!("copying {} to {}", src.display(), dst.display());

    let tree = FsTree::build(src)?;
    let mut mirrored = Mirrored::default();
    for entry in tree.iter() {
        let target = dst.join(entry.relative_path());
        if entry.is_dir() {
            create_dir(&target, &entry.metadata).chain_with(|| error! {
                "failed to create directory",
                "path" => target.display(),
            })?;

            mirrored.directories += 1;
        } else {
            copy_file(&entry.path, &target).chain_with(|| error! {
                "failed to copy file",
                "source path" => entry.path.display(),
                "destination path" => target.display(),
            })?;

            tracing::debug!("copied {}", entry.relative_path().display());
            mirrored.files += 1;
        }
    }

    tracing::info!(
        files = mirrored.files,
        directories = mirrored.directories,
        "copied {}", src.display()
    );

    Ok(mirrored)
}

fn create_dir(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)] {
        use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
        builder.mode(metadata.permissions().mode());
    }

    #[cfg(not(unix))]
    let _ = metadata;

    builder.create(path)
}

fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut reader = fs::File::open(src)?;
    let mut writer = io::BufWriter::new(fs::File::create(dst)?);
    let n = io::copy(&mut reader, &mut writer)?;
    io::Write::flush(&mut writer)?;
    Ok(n)
}
