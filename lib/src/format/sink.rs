use std::{fs, io};
use std::path::{Path, PathBuf};
use std::fmt::Debug;

use crate::error::{Result, Chainable};

pub trait Sink: Debug {
    fn write<V: AsRef<[u8]>>(&self, value: V) -> Result<()> {
        self.write_bytes(value.as_ref())
    }

    fn write_bytes(&self, bytes: &[u8]) -> Result<()>;
}

impl Sink for fs::File {
    fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        use io::Write;

        let mut file = io::BufWriter::new(self);
        file.write_all(bytes)?;
        Ok(file.flush()?)
    }
}

impl Sink for &Path {
    fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        fs::File::create(self)
            .chain(error! {
                "failed to open/create file for writing",
                "file path" => self.display()
            })?
            .write_bytes(bytes)
    }
}

impl Sink for PathBuf {
    fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        <&Path as Sink>::write_bytes(&self.as_path(), bytes)
    }
}

impl<T: Sink> Sink for &T {
    fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        <T as Sink>::write_bytes(self, bytes)
    }
}
