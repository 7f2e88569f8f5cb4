use std::fs;
use std::path::Path;

use crate::error::{Result, Chainable};
use crate::format::{Format, Json};
use crate::fstree::FsTree;
use crate::band::{Instrument, InstrumentMap, Member};

/// Reads the member roster at `path`.
///
/// The first row is a header and is always discarded. Rows may have any
/// number of fields; rows with fewer than three are skipped silently, and
/// fields past the third are ignored.
pub fn load_members<P: AsRef<Path>>(path: P) -> Result<Vec<Member>> {
    let path = path.as_ref();
    let file = fs::File::open(path).chain_with(|| error! {
        "unable to open roster file",
        "path" => path.display(),
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut members = vec![];
    for (i, record) in reader.records().enumerate() {
        let record = record.chain_with(|| error! {
            "unable to read roster records",
            "path" => path.display(),
            "data row" => i + 1,
        })?;

        if let (Some(name), Some(section), Some(day_job)) = (record.get(0), record.get(1), record.get(2)) {
            members.push(Member {
                name: name.into(),
                section: section.into(),
                day_job: day_job.into(),
            });
        }
    }

    tracing::debug!(path = %path.display(), count = members.len(), "loaded roster");
    Ok(members)
}

/// Reads every `.json` record directly inside `dir`, in file name order, and
/// joins each with its members from `roster`.
///
/// Subdirectories and files with any other extension are ignored. When two
/// records share a name, the later one wins.
pub fn load_instruments<P: AsRef<Path>>(dir: P, roster: &[Member]) -> Result<InstrumentMap> {
    let dir = dir.as_ref();
    let tree = FsTree::build_shallow(dir)
        .chain_with(|| error!("failed to read instrument directory", "path" => dir.display()))?;

    let mut instruments = InstrumentMap::new();
    let records = tree.children(tree.root_id())
        .filter(|entry| entry.is_file() && entry.file_ext() == Some("json"));

    for entry in records {
        let mut instrument: Instrument = Json::read(entry).chain_with(|| error! {
            "failed to parse instrument record",
            "path" => entry.path.display(),
        })?;

        instrument.resolve(roster);
        tracing::debug!(
            name = %instrument.name,
            members = instrument.members.len(),
            "loaded instrument section"
        );

        if let Some(previous) = instruments.insert(instrument.name.clone(), instrument) {
            tracing::warn!(
                name = %previous.name,
                path = %entry.path.display(),
                "duplicate instrument name; replacing earlier record"
            );
        }
    }

    Ok(instruments)
}
