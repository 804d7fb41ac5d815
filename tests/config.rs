// ABOUTME: Integration tests for manifest parsing and validation.
// ABOUTME: Tests YAML parsing, defaults, discovery, and template generation.

use machine_image::config::*;
use machine_image::error::Error;
use machine_image::types::{ExportFormat, ImageKind, VerifyMode};
use std::path::PathBuf;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_manifest() {
        let yaml = r#"
images:
  - name: fedora
    source: https://example.com/fedora.tar.xz
"#;
        let manifest = Manifest::from_yaml(yaml).unwrap();
        assert_eq!(manifest.images.len(), 1);
        assert_eq!(manifest.timeout, None);

        let image = manifest.images.first();
        assert_eq!(image.name, "fedora");
        assert_eq!(image.action, Action::Pull);
        assert!(image.wait);
        assert_eq!(image.kind, ImageKind::Tar);
        assert_eq!(image.verify, VerifyMode::Signature);
        assert_eq!(image.read_only, None);
        assert!(!image.force);
    }

    #[test]
    fn parse_full_manifest() {
        let yaml = r#"
timeout: 30m
images:
  - name: fedora
    action: pull
    type: raw
    source: https://example.com/fedora.raw.xz
    verify: checksum
    force: true
    timeout: 2h
  - name: fedora-base
    action: clone
    from: fedora
    to: fedora-base
    read_only: true
  - name: backup
    action: export
    path: /var/tmp/backup.tar.gz
    format: gzip
    wait: false
  - name: web
    action: set_properties
    limit_bytes: 1073741824
"#;
        let manifest = Manifest::from_yaml(yaml).unwrap();
        assert_eq!(manifest.timeout, Some(Duration::from_secs(30 * 60)));
        assert_eq!(manifest.images.len(), 4);

        let pull = &manifest.images[0];
        assert_eq!(pull.kind, ImageKind::Raw);
        assert_eq!(pull.verify, VerifyMode::Checksum);
        assert!(pull.force);
        assert_eq!(pull.timeout, Some(Duration::from_secs(2 * 3600)));

        let clone = &manifest.images[1];
        assert_eq!(clone.action, Action::Clone);
        assert_eq!(clone.from(), "fedora");
        assert_eq!(clone.to(), "fedora-base");
        assert!(clone.read_only());

        let export = &manifest.images[2];
        assert_eq!(export.format, ExportFormat::Gzip);
        assert_eq!(export.path, Some(PathBuf::from("/var/tmp/backup.tar.gz")));
        assert!(!export.wait);

        let set = &manifest.images[3];
        assert_eq!(set.action, Action::SetProperties);
        assert_eq!(set.limit_bytes, Some(1 << 30));
    }

    #[test]
    fn resource_timeout_overrides_manifest_default() {
        let yaml = r#"
timeout: 10m
images:
  - name: a
    source: https://example.com/a.tar
  - name: b
    source: https://example.com/b.tar
    timeout: 1m
"#;
        let manifest = Manifest::from_yaml(yaml).unwrap();
        let default = manifest.timeout;

        assert_eq!(
            manifest.images[0].wait_mode(default),
            machine_image::transfer::WaitMode::Wait {
                timeout: Some(Duration::from_secs(600))
            }
        );
        assert_eq!(
            manifest.images[1].wait_mode(default),
            machine_image::transfer::WaitMode::Wait {
                timeout: Some(Duration::from_secs(60))
            }
        );
    }
}

mod validation {
    use super::*;

    fn parse_err(yaml: &str) -> String {
        Manifest::from_yaml(yaml).unwrap_err().to_string()
    }

    #[test]
    fn pull_requires_source() {
        let err = parse_err("images:\n  - name: fedora\n");
        assert!(err.contains("source"), "got: {err}");
    }

    #[test]
    fn import_requires_path() {
        let err = parse_err("images:\n  - name: fedora\n    action: import\n");
        assert!(err.contains("path"), "got: {err}");
    }

    #[test]
    fn clone_requires_distinct_names() {
        let err = parse_err("images:\n  - name: fedora\n    action: clone\n    from: fedora\n");
        assert!(err.contains("distinct"), "got: {err}");
    }

    #[test]
    fn empty_image_list_is_rejected() {
        let err = parse_err("images: []\n");
        assert!(err.contains("at least one image"), "got: {err}");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse_err("images:\n  - name: fedora\n    source: x\n    colour: blue\n");
        assert!(err.contains("colour"), "got: {err}");
    }

    #[test]
    fn invalid_image_name_is_rejected() {
        let err = parse_err("images:\n  - name: ../etc\n    source: x\n");
        assert!(err.contains("image name"), "got: {err}");
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Manifest::from_yaml("images:\n  - name: a\n    action: explode\n").is_err());
    }
}

mod discovery {
    use super::*;

    const MANIFEST: &str = "images:\n  - name: fedora\n    source: https://example.com/f.tar\n";

    #[test]
    fn finds_primary_filename() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), MANIFEST).unwrap();

        let manifest = Manifest::discover(dir.path()).unwrap();
        assert_eq!(manifest.images.first().name, "fedora");
    }

    #[test]
    fn finds_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".machine-image")).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME_DIR), MANIFEST).unwrap();

        assert!(Manifest::discover(dir.path()).is_ok());
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}

mod init {
    use super::*;

    #[test]
    fn template_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("debian"), false).unwrap();

        let manifest = Manifest::discover(dir.path()).unwrap();
        assert_eq!(manifest.images.first().name, "debian");
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), None, false).unwrap();

        let err = init_config(dir.path(), None, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        init_config(dir.path(), Some("other"), true).unwrap();
    }

    #[test]
    fn rejects_invalid_name() {
        let dir = tempfile::tempdir().unwrap();
        let err = init_config(dir.path(), Some("-bad"), false).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
