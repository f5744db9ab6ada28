/// A change to one file, as delivered by the host or the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created { identity: String, contents: Vec<u8> },
    Modified { identity: String, contents: Vec<u8> },
    Deleted { identity: String },
    Renamed { from: String, to: String },
}
