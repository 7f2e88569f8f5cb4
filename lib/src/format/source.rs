use std::{fs, io};
use std::path::Path;
use std::fmt::Debug;

use crate::error::{Result, Chainable, ErrorKind};
use crate::fstree::Entry;

pub trait Source: Debug {
    fn read(self) -> Result<Vec<u8>>;

    fn read_string(self) -> Result<String> where Self: Sized {
        let path = self.path().map(|p| p.display().to_string());
        String::from_utf8(self.read()?).map_err(|_| error! {
            "input is not valid UTF-8",
            "path" => path.as_deref().unwrap_or("<memory>"),
        }.with_kind(ErrorKind::Parse))
    }

    fn path(&self) -> Option<&Path> {
        None
    }
}

impl Source for String {
    fn read(self) -> Result<Vec<u8>> {
        Ok(self.into_bytes())
    }
}

impl Source for &str {
    fn read(self) -> Result<Vec<u8>> {
        Ok(self.as_bytes().to_vec())
    }
}

impl Source for &fs::File {
    fn read(self) -> Result<Vec<u8>> {
        use io::Read;

        let mut data = Vec::new();
        let mut file = io::BufReader::new(self);
        file.read_to_end(&mut data)?;
        Ok(data)
    }
}

impl Source for &Path {
    fn read(self) -> Result<Vec<u8>> {
        let file = fs::File::open(self).chain(error! {
            "failed to open file for reading",
            "file path" => self.display()
        })?;

        file.read()
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}

impl Source for &Entry {
    fn read(self) -> Result<Vec<u8>> {
        self.path.as_ref().read()
    }

    fn path(&self) -> Option<&Path> {
        Some(&*self.path)
    }
}
