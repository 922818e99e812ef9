//! Lazy manifest loading. Manifests for the larger corpora run into millions of cuts so they're
//! never read into memory, a `LazyManifest` is just the path plus a cached cut count and the file
//! is streamed every time it's iterated.
use crate::cut::Cut;
use crate::error::Error;
use flate2::read::MultiGzDecoder;
use once_cell::unsync::OnceCell;
use std::fs::File;
use std::io::{self, prelude::*};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// Opens a manifest for lazy iteration. The file is opened here so a missing or unreadable
/// manifest is reported straight away, but nothing is parsed until the cuts are iterated.
pub fn load_manifest_lazy(path: impl AsRef<Path>) -> Result<LazyManifest, Error> {
    let path = path.as_ref();
    File::open(path).map_err(|e| Error::io(path, e))?;
    debug!("Opened {} for lazy reading", path.display());
    Ok(LazyManifest {
        path: path.to_path_buf(),
        len: Rc::default(),
    })
}

/// Handle to a line-delimited JSON cut manifest on disk. Clones share the cached length.
#[derive(Debug, Clone)]
pub struct LazyManifest {
    path: PathBuf,
    len: Rc<OnceCell<usize>>,
}

impl LazyManifest {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cuts in the manifest. The first call scans the whole file counting lines, after
    /// that it's free.
    pub fn len(&self) -> Result<usize, Error> {
        self.len
            .get_or_try_init(|| {
                let reader = self.open()?;
                let mut count = 0;
                for line in reader.lines() {
                    let line = line.map_err(|e| Error::io(&self.path, e))?;
                    if !line.trim().is_empty() {
                        count += 1;
                    }
                }
                debug!("{} contains {} cuts", self.path.display(), count);
                Ok::<_, Error>(count)
            })
            .copied()
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        self.len().map(|x| x == 0)
    }

    /// Streams the cuts from disk, every call starts again from the top of the file.
    pub fn iter(&self) -> Result<CutReader<Box<dyn BufRead>>, Error> {
        let reader = self.open()?;
        Ok(CutReader::new(reader, self.path.clone()))
    }

    fn open(&self) -> Result<Box<dyn BufRead>, Error> {
        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        if is_gzipped(&self.path) {
            Ok(Box::new(io::BufReader::new(MultiGzDecoder::new(file))))
        } else {
            Ok(Box::new(io::BufReader::new(file)))
        }
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().map(|x| x == "gz").unwrap_or(false)
}

/// Iterator of cuts over any line-delimited JSON source. Blank lines are skipped and line numbers
/// in errors are 1-based so they match what an editor shows.
///
/// A malformed line is reported and reading carries on with the next one, but a read error
/// (truncated or corrupt gzip, disk failure) is reported once and ends the iterator.
pub struct CutReader<R> {
    lines: io::Lines<R>,
    path: PathBuf,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> CutReader<R> {
    /// The path is only used for error messages so for in-memory readers anything descriptive
    /// will do.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            path: path.into(),
            line_no: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for CutReader<R> {
    type Item = Result<Cut, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(line) = self.lines.next() else {
                self.done = true;
                break;
            };
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(Error::io(&self.path, e)));
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(|source| Error::Parse {
                path: self.path.clone(),
                line: self.line_no,
                source,
            }));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    const MANIFEST: &str = r#"{"id":"cut-0","start":0.0,"duration":1.0,"channel":0}
{"id":"cut-1","start":1.0,"duration":2.5,"channel":0}

{"id":"cut-2","start":3.5,"duration":0.5,"channel":0}
"#;

    fn write_gz(path: &Path, contents: &str) {
        let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        enc.write_all(contents.as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn reader_skips_blank_lines() {
        let reader = CutReader::new(io::Cursor::new(MANIFEST), "memory");
        let ids = reader.map(|c| c.unwrap().id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["cut-0", "cut-1", "cut-2"]);
    }

    #[test]
    fn reader_reports_line_of_bad_cut() {
        let text = "{\"id\":\"a\",\"start\":0,\"duration\":1}\n\n{\"id\":\"b\",\"start\":0\n";
        let mut reader = CutReader::new(io::Cursor::new(text), "memory");
        assert!(reader.next().unwrap().is_ok());
        match reader.next().unwrap() {
            Err(Error::Parse { line, path, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(path, PathBuf::from("memory"));
            }
            e => panic!("Expected parse error: {:?}", e),
        }
        assert!(reader.next().is_none());
    }

    fn write_truncated_gz(path: &Path, cuts: usize) {
        let text = (0..cuts)
            .map(|i| format!(r#"{{"id":"cut-{}","start":0.0,"duration":1.0,"channel":0}}"#, i))
            .collect::<Vec<_>>()
            .join("\n");
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(text.as_bytes()).unwrap();
        let bytes = enc.finish().unwrap();
        std::fs::write(path, &bytes[..bytes.len() / 2]).unwrap();
    }

    #[test]
    fn reader_keeps_going_after_bad_line() {
        let text = "not json\n{\"id\":\"a\",\"start\":0,\"duration\":1}\n";
        let results = CutReader::new(io::Cursor::new(text), "memory").collect::<Vec<_>>();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(Error::Parse { line: 1, .. })));
        assert_eq!(results[1].as_ref().unwrap().id, "a");
    }

    #[test]
    fn truncated_gzip_ends_after_one_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuts.jsonl.gz");
        write_truncated_gz(&path, 2000);

        let manifest = load_manifest_lazy(&path).unwrap();
        // Bounded so a reader that never finishes fails instead of hanging
        let results = manifest.iter().unwrap().take(10_000).collect::<Vec<_>>();
        assert!(results.len() < 2000);
        let errors = results.iter().filter(|x| x.is_err()).count();
        assert_eq!(errors, 1);
        assert!(matches!(results.last(), Some(Err(Error::Io { .. }))));
        assert!(results.len() > 1);
    }

    #[test]
    fn gzip_and_plain_are_equivalent() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("cuts.jsonl.gz");
        let plain = dir.path().join("cuts.jsonl");
        write_gz(&gz, MANIFEST);
        std::fs::write(&plain, MANIFEST).unwrap();

        let gz = load_manifest_lazy(&gz).unwrap();
        let plain = load_manifest_lazy(&plain).unwrap();
        assert_eq!(gz.len().unwrap(), 3);
        assert_eq!(plain.len().unwrap(), 3);

        let gz_cuts = gz.iter().unwrap().collect::<Result<Vec<_>, _>>().unwrap();
        let plain_cuts = plain.iter().unwrap().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(gz_cuts, plain_cuts);
    }

    #[test]
    fn missing_manifest_fails_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest_lazy(dir.path().join("nope.jsonl.gz")).unwrap_err();
        assert_eq!(err.io_kind(), Some(io::ErrorKind::NotFound));
    }

    #[test]
    fn length_is_cached_across_clones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cuts.jsonl.gz");
        write_gz(&path, MANIFEST);

        let manifest = load_manifest_lazy(&path).unwrap();
        let copy = manifest.clone();
        assert_eq!(manifest.len().unwrap(), 3);

        // Once counted the file isn't needed to answer len again
        std::fs::remove_file(&path).unwrap();
        assert_eq!(copy.len().unwrap(), 3);
        assert!(!copy.is_empty().unwrap());
        assert!(copy.iter().is_err());
    }
}
