use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pkgdata::{
    Child, Config, EntryKind, Error, ExtractionCache, Loader, Provider, Resource, Result,
    SearchPath, TempSettings, ZipProvider,
};
use tempfile::{TempDir, tempdir};
use zip::write::SimpleFileOptions;

fn write_package_zip(path: &Path) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, content) in [
        ("mypkg/schema.json", "{}"),
        ("mypkg/data/table.csv", "a,b\n1,2\n"),
        ("mypkg/data/nested/notes.txt", "notes"),
        ("mypkg/_internal/impl.txt", "private"),
        ("mypkg/tests/test_data.txt", "test"),
        ("mypkg/.hidden", "hidden"),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// Zip provider that counts calls to `extract`.
#[derive(Debug)]
struct Counting {
    inner: ZipProvider,
    extractions: AtomicUsize,
}

impl Counting {
    fn count(&self) -> usize {
        self.extractions.load(Ordering::SeqCst)
    }
}

impl Provider for Counting {
    fn origin(&self) -> &Path {
        self.inner.origin()
    }

    fn kind(&self, path: &Path) -> Option<EntryKind> {
        self.inner.kind(path)
    }

    fn children(&self, path: &Path) -> Result<Vec<Child>> {
        self.inner.children(path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn extract(&self, path: &Path, destination: &Path) -> Result<()> {
        self.extractions.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        self.inner.extract(path, destination)
    }
}

struct Fixture {
    _dir: TempDir,
    provider: Arc<Counting>,
    cache: Arc<ExtractionCache>,
    loader: Loader,
}

fn zip_fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("mypkg.zip");
    write_package_zip(&archive);

    let provider = Arc::new(Counting {
        inner: ZipProvider::open_package(&archive, "mypkg").unwrap(),
        extractions: AtomicUsize::new(0),
    });
    let cache = Arc::new(ExtractionCache::new());
    let loader = Loader::with_config(Resource::root(provider.clone()), &Config::default())
        .unwrap()
        .with_cache(Arc::clone(&cache));

    Fixture {
        _dir: dir,
        provider,
        cache,
        loader,
    }
}

#[test]
fn cached_extracts_once_and_returns_same_path() {
    let fx = zip_fixture();

    let first = fx.loader.cached(&["data", "table.csv"]).unwrap();
    let second = fx.loader.cached(&["data/table.csv"]).unwrap();

    assert_eq!(first, second);
    assert_eq!(fx.provider.count(), 1);
    assert_eq!(std::fs::read_to_string(&first).unwrap(), "a,b\n1,2\n");
    assert_eq!(fx.loader.get(&["data", "table.csv"]).unwrap(), first);
    assert_eq!(fx.provider.count(), 1);
    fx.cache.release_all();
}

#[test]
fn concurrent_cached_requests_extract_once() {
    let fx = zip_fixture();

    let paths: Vec<PathBuf> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| fx.loader.cached(&["data"]).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(paths.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(fx.provider.count(), 1);
    assert!(paths[0].join("nested").join("notes.txt").is_file());
    fx.cache.release_all();
}

#[test]
fn directory_and_member_are_extracted_separately() {
    let fx = zip_fixture();

    let dir = fx.loader.cached(&["data"]).unwrap();
    let file = fx.loader.cached(&["data", "table.csv"]).unwrap();

    assert!(!file.starts_with(&dir));
    assert_eq!(fx.provider.count(), 2);
    assert_eq!(fx.cache.pending_cleanup(), 2);
    fx.cache.release_all();
}

#[test]
fn as_path_is_scoped_and_uncached() {
    let fx = zip_fixture();

    let first = fx.loader.as_path(&["data"]).unwrap();
    let second = fx.loader.as_path(&["data"]).unwrap();
    let first_path = first.path().to_path_buf();

    assert!(first.is_temporary());
    assert_ne!(first.path(), second.path());
    assert!(first_path.join("table.csv").is_file());
    assert_eq!(fx.provider.count(), 2);

    drop(first);
    assert!(!first_path.exists());
    assert!(second.path().exists());
    assert!(fx.cache.is_empty());
}

#[test]
fn with_path_cleans_up_after_closure() {
    let fx = zip_fixture();

    let seen = fx
        .loader
        .with_path(&["schema.json"], |path| {
            assert!(path.is_file());
            path.to_path_buf()
        })
        .unwrap();

    assert!(!seen.exists());
}

#[test]
fn readable_never_extracts() {
    let fx = zip_fixture();

    let table = fx.loader.readable(&["data", "table.csv"]);
    assert_eq!(table.read_to_string().unwrap(), "a,b\n1,2\n");
    assert!(table.local_path().is_none());

    let names: Vec<_> = fx
        .loader
        .readable(&["data"])
        .iter_dir()
        .unwrap()
        .iter()
        .map(Resource::name)
        .collect();
    assert_eq!(names, vec!["nested", "table.csv"]);
    assert_eq!(fx.provider.count(), 0);
}

#[test]
fn missing_resource_fails_only_when_read() {
    let fx = zip_fixture();

    let missing = fx.loader.readable(&["data", "missing.csv"]);
    assert!(!missing.exists());

    let err = missing.read_bytes().unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err}");
    assert!(fx.loader.as_path(&["data", "missing.csv"]).unwrap_err().is_not_found());
    assert!(fx.loader.cached(&["data", "missing.csv"]).unwrap_err().is_not_found());
    assert_eq!(fx.provider.count(), 0);
}

#[test]
fn release_removes_cached_extractions_once() {
    let fx = zip_fixture();

    let schema = fx.loader.cached(&["schema.json"]).unwrap();
    let data = fx.loader.cached(&["data"]).unwrap();
    assert!(schema.exists() && data.exists());

    let report = fx.cache.release_all();
    assert_eq!(report.released, 2);
    assert_eq!(report.failed, 0);
    assert!(!schema.exists());
    assert!(!data.exists());

    let again = fx.cache.release_all();
    assert_eq!(again.released, 0);
    assert_eq!(again.failed, 0);
}

#[test]
fn description_of_archive_package() {
    let fx = zip_fixture();

    assert_eq!(fx.loader.top_level().unwrap(), vec!["data/", "schema.json"]);
    assert!(fx.loader.description().unwrap().ends_with("* ``data/``\n* ``schema.json``"));
}

#[test]
fn loader_by_name_from_search_path() {
    let dir = tempdir().unwrap();
    write_package_zip(&dir.path().join("mypkg.zip"));
    let config = Config::default().with_search_path(dir.path());

    let loader = Loader::with_config("mypkg.data", &config).unwrap();

    assert_eq!(loader.anchor(), "mypkg.data");
    assert_eq!(loader.top_level().unwrap(), vec!["nested/", "table.csv"]);
    assert_eq!(
        loader.readable(&["nested", "notes.txt"]).read_to_string().unwrap(),
        "notes"
    );
}

#[test]
fn global_cache_is_shared_between_loaders() {
    let dir = tempdir().unwrap();
    write_package_zip(&dir.path().join("mypkg.zip"));
    let config = Config::default().with_search_path(dir.path());

    let a = Loader::with_config("mypkg", &config).unwrap();
    let b = Loader::with_config("mypkg", &config).unwrap();

    let from_a = a.cached(&["schema.json"]).unwrap();
    let from_b = b.cached(&["schema.json"]).unwrap();

    assert_eq!(from_a, from_b);
    assert!(ExtractionCache::global().contains(&a.readable(&["schema.json"]).id()));
}

#[test]
fn unresolvable_package_fails_at_construction() {
    let dir = tempdir().unwrap();
    let resolver = SearchPath::new([dir.path()]);

    let result = Loader::with_resolver("nowhere", &resolver, TempSettings::new());
    assert!(matches!(result, Err(Error::PackageNotFound(name)) if name == "nowhere"));
}

#[test]
fn temp_settings_apply_to_extractions() {
    let dir = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    write_package_zip(&dir.path().join("mypkg.zip"));
    let config = Config {
        temp_prefix: "scratch-".to_owned(),
        temp_dir: Some(scratch.path().to_path_buf()),
        ..Config::default()
    }
    .with_search_path(dir.path());

    let loader = Loader::with_config("mypkg", &config).unwrap();
    let materialized = loader.as_path(&["schema.json"]).unwrap();

    assert!(materialized.path().starts_with(scratch.path()));
    assert!(materialized.path().ends_with("schema.json"));
}
