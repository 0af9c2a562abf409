//! End-to-end pulls against the in-memory hub.

use std::path::{Path, PathBuf};

use ssprompt_adapters::{LocalFilesystem, MemoryFilesystem, MemoryHub, YamlDescriptorCodec};
use ssprompt_core::{
    application::{ApplicationError, FailureReason, ports::Filesystem, services::LOCK_FILE_NAME},
    domain::MetaConfig,
    prelude::*,
};

const DESCRIPTOR: &str = "\
meta:
  name: demo
  version: 0.0.1
text_prompt:
  dirname: text
python_prompt:
  dirname: python
  list:
    - name: prompt
      dependencies:
        - langchain: ^0.0.266
";

fn hub() -> MemoryHub {
    MemoryHub::new()
        .with_project("ptonlix/PromptHub")
        .with_file("demo/demo.yaml", DESCRIPTOR)
        .with_file("demo/text/a.txt", "hello\n")
        .with_file("demo/python/prompt/main.py", "print('hi')\n")
        .with_file("other/readme.md", "not pulled")
}

fn service(hub: &MemoryHub, fs: &MemoryFilesystem) -> ProjectService {
    ProjectService::new(
        Box::new(hub.clone()),
        Box::new(fs.clone()),
        Box::new(YamlDescriptorCodec),
        HubProject::new("ptonlix/PromptHub", Some("demo")).unwrap(),
        Path::new("/work"),
        true,
    )
}

fn fast(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, 0)
}

#[test]
fn second_pull_downloads_nothing() {
    let hub = hub();
    let fs = MemoryFilesystem::new();

    let first = service(&hub, &fs).pull(&fast(3)).unwrap();
    assert!(first.is_complete());
    assert_eq!(first.downloaded.len(), 3);
    assert_eq!(
        fs.read_file(Path::new("/work/demo/python/prompt/main.py")).unwrap(),
        b"print('hi')\n"
    );
    assert!(!fs.exists(Path::new("/work/demo/readme.md")));

    let fetches = hub.fetch_count();
    let writes = fs.write_count();
    let second = service(&hub, &fs).pull(&fast(3)).unwrap();

    assert!(second.downloaded.is_empty());
    assert_eq!(second.skipped.len(), 3);
    assert_eq!(hub.fetch_count(), fetches);
    assert_eq!(fs.write_count(), writes);
    assert_eq!(second.summary(), "3 files up to date (0 downloaded, 3 unchanged)");
}

#[test]
fn transient_failures_are_retried() {
    let hub = hub();
    hub.fail_listing("demo/text", 2);
    hub.fail_download("demo/python/prompt/main.py", 3);
    let fs = MemoryFilesystem::new();

    let report = service(&hub, &fs).pull(&fast(3)).unwrap();
    assert!(report.is_complete(), "{}", report.summary());
    assert_eq!(report.downloaded.len(), 3);
}

#[test]
fn exhausted_retries_leave_siblings_intact() {
    let hub = hub();
    hub.fail_download("demo/text/a.txt", 10);
    let fs = MemoryFilesystem::new();

    let report = service(&hub, &fs).pull(&fast(2)).unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.summary(), "1 of 3 files failed after retries");
    assert!(matches!(report.failures[0].reason, FailureReason::Transport(_)));
    assert!(fs.is_file(Path::new("/work/demo/demo.yaml")));
    assert!(!fs.exists(Path::new("/work/demo/text/a.txt")));
}

#[test]
fn unlisted_subdirectory_is_reported() {
    let hub = hub();
    hub.fail_listing("demo/python", 10);
    let fs = MemoryFilesystem::new();

    let report = service(&hub, &fs).pull(&fast(1)).unwrap();
    assert_eq!(report.failed_directories(), 1);
    assert_eq!(report.failures[0].remote_path, "demo/python");
    assert!(fs.is_file(Path::new("/work/demo/text/a.txt")));
}

#[test]
fn modified_local_file_is_replaced() {
    let hub = hub();
    let fs = MemoryFilesystem::new();
    service(&hub, &fs).pull(&fast(0)).unwrap();

    let path = PathBuf::from("/work/demo/text/a.txt");
    fs.tamper(&path, b"edited locally");

    let report = service(&hub, &fs).pull(&fast(0)).unwrap();
    assert_eq!(report.downloaded, vec![path.clone()]);
    assert_eq!(fs.read_file(&path).unwrap(), b"hello\n");
}

#[test]
fn corrupt_download_is_discarded() {
    let hub = hub();
    hub.corrupt("demo/text/a.txt", "tampered in transit");
    let fs = MemoryFilesystem::new();

    let report = service(&hub, &fs).pull(&fast(3)).unwrap();

    assert_eq!(report.integrity_failures().count(), 1);
    assert!(!fs.exists(Path::new("/work/demo/text/a.txt")));
    assert_eq!(report.downloaded.len(), 2);
}

#[test]
fn lock_is_released_after_pull() {
    let hub = hub();
    let fs = MemoryFilesystem::new();
    service(&hub, &fs).pull(&fast(0)).unwrap();
    assert!(!fs.exists(&Path::new("/work/demo").join(LOCK_FILE_NAME)));
}

#[test]
fn concurrent_pull_is_refused() {
    let hub = hub();
    let fs = MemoryFilesystem::new();
    let dir = Path::new("/work/demo");
    fs.create_dir_all(dir).unwrap();
    assert!(fs.create_new(&dir.join(LOCK_FILE_NAME), b"4242\n").unwrap());

    let err = service(&hub, &fs).pull(&fast(0)).unwrap_err();
    assert!(matches!(
        err,
        SspromptError::Application(ApplicationError::MirrorLocked { .. })
    ));
    assert_eq!(hub.fetch_count(), 0);
}

#[test]
fn remote_descriptor_round_trip() {
    let hub = hub();
    let fs = MemoryFilesystem::new();
    let svc = service(&hub, &fs);

    let descriptor = svc.remote_descriptor(&fast(0)).unwrap().unwrap();
    assert_eq!(descriptor.meta.name, "demo");
    assert_eq!(
        ProjectService::extract_dependencies(&descriptor),
        [DependencySpec::new("langchain", "^0.0.266")]
    );
}

#[test]
fn absent_project_yields_no_descriptor() {
    let hub = MemoryHub::new();
    let fs = MemoryFilesystem::new();
    let svc = service(&hub, &fs);

    assert_eq!(svc.remote_descriptor(&fast(2)).unwrap(), None);
    assert!(!svc.check_project_exists(&fast(0)).unwrap());
}

#[test]
fn descriptor_saved_to_disk_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let svc = ProjectService::new(
        Box::new(MemoryHub::new()),
        Box::new(LocalFilesystem::new()),
        Box::new(YamlDescriptorCodec),
        HubProject::new("ptonlix/PromptHub", Some("demo")).unwrap(),
        dir.path(),
        false,
    );

    let mut descriptor = ProjectDescriptor::new(MetaConfig::new("demo", "0.1.0"));
    descriptor.add_dependencies(
        &[SectionKind::Python],
        &[DependencySpec::parse("openai@latest").unwrap()],
    );
    svc.save_descriptor(&descriptor).unwrap();
    svc.save_descriptor(&descriptor).unwrap();

    assert_eq!(svc.descriptor_path(), dir.path().join("demo.yaml"));
    assert_eq!(svc.local_descriptor().unwrap(), descriptor);
}
