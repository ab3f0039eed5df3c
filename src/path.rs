use core::fmt::Debug;

use alloc::string::String;
use alloc::vec::Vec;

use crate::cluster_heap::ClusterHeap;
use crate::error::{Error, OperationError};
use crate::region::data::{CURRENT, PARENT};
use crate::types::ClusterID;

pub(crate) const SEPARATOR: char = '/';

/// Walk `path` from `start`, or from `root` when absolute.
///
/// The last component is returned as a bare name unless `descend` is set,
/// in which case it must name a directory and its cluster is returned instead.
/// Paths ending with `.`, `..` or a separator only leave an empty name.
pub(crate) fn resolve<'a, E, IO>(
    heap: &mut ClusterHeap<IO>,
    start: ClusterID,
    path: &'a str,
    descend: bool,
) -> Result<(ClusterID, &'a str), Error<E>>
where
    E: Debug,
    IO: crate::io::IO<Error = E>,
{
    let mut cluster_id = match path.starts_with(SEPARATOR) {
        true => heap.layout.root(),
        false => start,
    };
    let mut components = path.trim_end_matches(SEPARATOR).split(SEPARATOR).peekable();
    let mut leaf = "";
    while let Some(component) = components.next() {
        let last = components.peek().is_none();
        match component {
            "" | CURRENT => continue,
            PARENT => cluster_id = heap.parent_of(cluster_id)?,
            name if last && !descend => leaf = name,
            name => {
                let (_, entry) = match heap.find(cluster_id, name)? {
                    Some(found) => found,
                    None => return Err(OperationError::PathNotFound.into()),
                };
                if !entry.is_directory {
                    return Err(OperationError::NotDirectory.into());
                }
                cluster_id = entry.first_cluster;
            }
        }
    }
    trace!("Path {} resolved to cluster {} name {:?}", path, cluster_id, leaf);
    Ok((cluster_id, leaf))
}

/// Textual form of `path` taken relative to the absolute `base`
pub(crate) fn join(base: &str, path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();
    if !path.starts_with(SEPARATOR) {
        components.extend(base.split(SEPARATOR).filter(|c| !c.is_empty()));
    }
    for component in path.split(SEPARATOR) {
        match component {
            "" | CURRENT => (),
            PARENT => {
                components.pop();
            }
            name => components.push(name),
        }
    }
    let mut output = String::new();
    for component in components.iter() {
        output.push(SEPARATOR);
        output.push_str(component);
    }
    if output.is_empty() {
        output.push(SEPARATOR);
    }
    output
}

#[cfg(test)]
mod test {
    use super::{join, resolve};
    use crate::cluster_heap::test::heap;
    use crate::cluster_heap::ClusterHeap;
    use crate::error::OperationError;
    use crate::io::memory::MemoryIO;
    use crate::region::fat::Entry;
    use crate::types::ClusterID;

    struct Tree {
        heap: ClusterHeap<MemoryIO>,
        root: ClusterID,
        a: ClusterID,
        b: ClusterID,
        c: ClusterID,
    }

    // /a/b, /a/c, /a/f
    fn tree() -> Tree {
        let mut heap = heap(64 * 1024);
        let root = heap.layout.root();
        heap.fat.set_entry(&mut heap.io, root, Entry::Last).unwrap();
        heap.init_directory(root, root).unwrap();
        let a = heap.create_entry(root, "a", true).unwrap().1.first_cluster;
        let b = heap.create_entry(a, "b", true).unwrap().1.first_cluster;
        let c = heap.create_entry(a, "c", true).unwrap().1.first_cluster;
        heap.create_entry(a, "f", false).unwrap();
        Tree { heap, root, a, b, c }
    }

    #[test]
    fn test_relative_parent() {
        let Tree { mut heap, b, c, .. } = tree();
        assert_eq!(resolve(&mut heap, b, "../c", true).unwrap(), (c, ""));
        let result = resolve(&mut heap, b, "../d", true);
        assert!(result.err().unwrap() == OperationError::PathNotFound);
    }

    #[test]
    fn test_name_only() {
        let Tree { mut heap, root, a, .. } = tree();
        assert_eq!(resolve(&mut heap, root, "/a/new", false).unwrap(), (a, "new"));
        assert_eq!(resolve(&mut heap, a, "new/", false).unwrap(), (a, "new"));
        assert_eq!(resolve(&mut heap, a, "/", false).unwrap(), (root, ""));
        assert_eq!(resolve(&mut heap, a, "..", false).unwrap(), (root, ""));
        assert_eq!(resolve(&mut heap, a, "", false).unwrap(), (a, ""));
        assert_eq!(resolve(&mut heap, root, "/../..//a/./b/..", true).unwrap(), (a, ""));
    }

    #[test]
    fn test_file_in_path() {
        let Tree { mut heap, root, .. } = tree();
        let result = resolve(&mut heap, root, "/a/f/x", false);
        assert!(result.err().unwrap() == OperationError::NotDirectory);
        let result = resolve(&mut heap, root, "/a/f", true);
        assert!(result.err().unwrap() == OperationError::NotDirectory);
        let result = resolve(&mut heap, root, "/x/y", false);
        assert!(result.err().unwrap() == OperationError::PathNotFound);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "a/b"), "/a/b");
        assert_eq!(join("/a/b", "../c/"), "/a/c");
        assert_eq!(join("/a/b", "/x"), "/x");
        assert_eq!(join("/a", "../../.."), "/");
        assert_eq!(join("/a", "./b//c"), "/a/b/c");
    }
}
