mod load;

pub use load::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::page_file_name;

/// Instrument sections by name, iterated in name order.
pub type InstrumentMap = BTreeMap<String, Instrument>;

/// One row of the member roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub name: String,
    pub section: String,
    pub day_job: String,
}

/// An instrument section: one record file plus the members who play in it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Description")]
    pub description: String,
    #[serde(default, alias = "ImagePath", alias = "imagePath")]
    pub image_path: String,
    #[serde(skip_deserializing)]
    pub members: Vec<Member>,
    #[serde(skip_deserializing)]
    pub url: String,
}

impl Instrument {
    /// Derives `url` from the name and collects, in roster order, every
    /// member whose section is exactly this instrument's name.
    pub fn resolve(&mut self, roster: &[Member]) {
        self.url = page_file_name(&self.name);
        self.members = roster.iter()
            .filter(|member| member.section == self.name)
            .cloned()
            .collect();
    }
}
