//! Descriptor files on disk.

use artdeps::core::{ArtdepsError, error_count};
use artdeps::descriptor::{load_file, parse, read_file, save_file, save_specs};
use artdeps::test_utils::{DescriptorFixture, TestEnvironment};

#[tokio::test]
async fn test_canonical_form_is_stable() {
    let env = TestEnvironment::with_basic_descriptor().unwrap();
    let parsed = load_file(&env.descriptor_path()).await.unwrap();

    let canonical = save_specs(&parsed.descriptor.servers, &parsed.descriptor.dependencies);
    save_file(&env.descriptor_path(), &canonical).await.unwrap();

    let text = read_file(&env.descriptor_path()).await.unwrap();
    assert_eq!(text, canonical);

    let reparsed = parse(&text);
    assert_eq!(save_specs(&reparsed.descriptor.servers, &reparsed.descriptor.dependencies), canonical);
    assert_eq!(reparsed.descriptor, parsed.descriptor);
}

#[tokio::test]
async fn test_errors_do_not_hide_valid_sections() {
    let env = TestEnvironment::new().unwrap();
    let path = DescriptorFixture::with_errors(&env.snapshot_path).write_to(&env.project_dir).unwrap();

    let parsed = load_file(&path).await.unwrap();
    assert!(parsed.has_errors());
    assert_eq!(error_count(&parsed.diagnostics), 2);
    assert_eq!(parsed.descriptor.servers.len(), 1);
    // Both basic sections plus the repeated Lib_Build section; the ghost section is dropped.
    assert_eq!(parsed.descriptor.dependencies.len(), 3);
}

#[tokio::test]
async fn test_crlf_descriptor() {
    let env = TestEnvironment::new().unwrap();
    let path = env
        .write_descriptor("[[ci]]\r\nType=TeamCity\r\nUrl=https://ci\r\n\r\n[ci::Lib_Build]\r\nPath=a/*\r\nb/*\r\n")
        .unwrap();

    let parsed = load_file(&path).await.unwrap();
    assert!(parsed.diagnostics.is_empty());
    assert_eq!(parsed.descriptor.dependencies[0].path_rules, "a/*\nb/*");
}

#[tokio::test]
async fn test_missing_descriptor() {
    let env = TestEnvironment::new().unwrap();
    let err = load_file(&env.descriptor_path()).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ArtdepsError>(), Some(ArtdepsError::DescriptorNotFound { .. })));
}

#[tokio::test]
async fn test_descriptor_saved_with_byte_order_mark() {
    let env = TestEnvironment::new().unwrap();
    let path = env.write_descriptor("\u{feff}[[ci]]\r\nType=TeamCity\r\nUrl=https://ci\r\n\r\n[ci::Lib_Build]\r\nPath=a/*\r\n").unwrap();

    let parsed = load_file(&path).await.unwrap();
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.descriptor.servers.len(), 1);
    assert_eq!(parsed.descriptor.dependencies.len(), 1);
}
