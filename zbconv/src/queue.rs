use std::path::{Path, PathBuf};

use zbsave::naming::is_risky_file_name;


/// A file waiting to be converted.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) struct QueuedFile {
    pub name: String,
    pub path: PathBuf,
}


/// The files to convert, keyed by file name.
///
/// Queueing a file whose name is already queued replaces the earlier file but keeps its position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct InputQueue {
    files: Vec<QueuedFile>,
}
impl InputQueue {
    pub fn add<P: Into<PathBuf>>(&mut self, path: P) {
        let path = path.into();
        let name = file_name_of(&path);
        if let Some(existing) = self.files.iter_mut().find(|f| f.name == name) {
            existing.path = path;
        } else {
            self.files.push(QueuedFile { name, path });
        }
    }

    pub fn files(&self) -> &[QueuedFile] {
        &self.files
    }

    /// Names of queued files that are probably legacy saves.
    pub fn risky_names(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(|f| f.name.as_str())
            .filter(|n| is_risky_file_name(n))
            .collect()
    }
}
impl<P: Into<PathBuf>> FromIterator<P> for InputQueue {
    fn from_iter<T: IntoIterator<Item = P>>(iter: T) -> Self {
        let mut queue = Self::default();
        for path in iter {
            queue.add(path);
        }
        queue
    }
}


/// The name a file is queued and reported under.
pub(crate) fn file_name_of(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::InputQueue;
    use std::path::PathBuf;

    #[test]
    fn test_replace_keeps_position() {
        let queue: InputQueue = ["a/save1.dat", "a/save2MP", "b/save1.dat", "save3.dat"]
            .into_iter()
            .collect();
        let names: Vec<&str> = queue.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["save1.dat", "save2MP", "save3.dat"]);
        assert_eq!(queue.files()[0].path, PathBuf::from("b/save1.dat"));
    }

    #[test]
    fn test_risky_names() {
        let queue: InputQueue = ["save1.dat", "save2MP", "save3.mp", "save4.MP.bak"]
            .into_iter()
            .collect();
        assert_eq!(queue.risky_names(), ["save2MP", "save3.mp"]);
    }
}
