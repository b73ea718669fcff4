//! Integration tests for manifest crate

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::path::Path;
    use tempfile::tempdir;
    use webdist_config::Config;
    use webdist_manifest::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_assemble_metadata() {
        let temp = tempdir().unwrap();
        write(temp.path(), "VERSION", "0.4.20\n");
        write(temp.path(), "requirements/install.txt", "six\n\nrequests\n");
        write(temp.path(), "requirements/setup.txt", "Babel\n");

        let config = Config::default();
        let metadata = assemble_metadata(&config, temp.path()).await.unwrap();

        assert_eq!(metadata.name, "pyload.webui");
        assert_eq!(metadata.version, "0.4.20");
        assert_eq!(metadata.install_requires, vec!["six", "", "requests"]);
        assert_eq!(metadata.setup_requires, vec!["Babel"]);
        assert_eq!(metadata.dist_stem(), "pyload.webui-0.4.20");
        assert_eq!(
            metadata.classifiers[0],
            "Development Status :: 1 - Planning"
        );
        assert_eq!(
            metadata.classifiers[1],
            "License :: OSI Approved :: GNU Affero General Public License v3"
        );
        assert!(metadata.long_description.is_none());

        let json = serde_json::to_value(&metadata).unwrap();
        assert!(json.get("long_description").is_none());
    }

    #[tokio::test]
    async fn test_missing_setup_requirements_are_empty() {
        let temp = tempdir().unwrap();
        write(temp.path(), "VERSION", "0.1.0\n");
        write(temp.path(), "requirements/install.txt", "six\n");

        let metadata = assemble_metadata(&Config::default(), temp.path())
            .await
            .unwrap();
        assert_eq!(metadata.version, "0.1.0");
        assert_eq!(metadata.install_requires, vec!["six"]);
        assert!(metadata.setup_requires.is_empty());

        let err = get_requires(temp.path(), "setup").await.unwrap_err();
        assert!(err.to_string().contains("setup.txt"));
    }

    #[tokio::test]
    async fn test_missing_install_requirements_fail() {
        let temp = tempdir().unwrap();
        write(temp.path(), "VERSION", "1.0\n");
        write(temp.path(), "requirements/setup.txt", "Babel\n");

        let err = assemble_metadata(&Config::default(), temp.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("install.txt"));
    }

    #[tokio::test]
    async fn test_long_description_excerpt() {
        let temp = tempdir().unwrap();
        write(temp.path(), "README.md", "title\nline1\nline2\nline3\n");
        write(temp.path(), "CHANGELOG.md", "v1\n");

        let description = long_description(temp.path(), 1, 3).await.unwrap();
        assert_eq!(description, "line1\nline2\n\r\n\r\nv1\n");

        std::fs::remove_file(temp.path().join("CHANGELOG.md")).unwrap();
        assert!(long_description(temp.path(), 1, 3).await.is_none());
    }

    proptest! {
        /// Joining the entries back with newlines reproduces the file body.
        #[test]
        fn requirement_lines_roundtrip_file_body(
            lines in prop::collection::vec("[a-z0-9<>=.]{0,8}", 0..12)
        ) {
            let body: String = lines.iter().map(|l| format!("{l}\n")).collect();
            prop_assert_eq!(split_requirement_lines(&body), lines.clone());

            let crlf: String = lines.iter().map(|l| format!("{l}\r\n")).collect();
            prop_assert_eq!(split_requirement_lines(&crlf), lines);
        }
    }
}
