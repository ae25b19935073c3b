//! The two source bodies the tester alternates between.
//!
//! Each variant declares the same class with a differently named method, so
//! every toggle changes the public surface of the rebuilt assembly.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, TesterError};

// Trailing spaces on the class and method lines are part of the text.
const CONTENT_ONE: &str = concat!(
    "\n",
    "using Godot;\n",
    "\n",
    "public class CrashTest \n",
    "{\n",
    "    public void Test() \n",
    "    {\n",
    "        GD.Print(\"Test\");\n",
    "    }\n",
    "}\n",
);

const CONTENT_TWO: &str = concat!(
    "\n",
    "using Godot;\n",
    "\n",
    "public class CrashTest \n",
    "{\n",
    "    public void TestTwo() \n",
    "    {\n",
    "        GD.Print(\"TestTwo\");\n",
    "    }\n",
    "}\n",
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentVariant {
    One,
    Two,
}

impl ContentVariant {
    pub fn text(self) -> &'static str {
        match self {
            ContentVariant::One => CONTENT_ONE,
            ContentVariant::Two => CONTENT_TWO,
        }
    }

    /// Variant to write next given what is currently on disk.
    ///
    /// Only an exact match of `One` advances to `Two`; anything else
    /// (missing file, `Two`, hand-edited content) resets to `One`.
    pub fn next_after(current: Option<&str>) -> Self {
        match current {
            Some(text) if text == CONTENT_ONE => ContentVariant::Two,
            _ => ContentVariant::One,
        }
    }
}

impl fmt::Display for ContentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentVariant::One => write!(f, "ONE"),
            ContentVariant::Two => write!(f, "TWO"),
        }
    }
}

/// Result of a single toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub written: ContentVariant,
    /// The file could not be read beforehand and was created from scratch.
    pub created: bool,
}

/// Replace the file at `path` with the variant that follows its current content.
pub fn toggle_file(path: &Path) -> Result<Toggle> {
    let current = fs::read_to_string(path).ok();
    let created = current.is_none();
    let written = ContentVariant::next_after(current.as_deref());

    fs::write(path, written.text()).map_err(|source| TesterError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Toggle { written, created })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_created_with_one() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CrashTest.cs");

        let toggle = toggle_file(&path).unwrap();

        assert_eq!(toggle.written, ContentVariant::One);
        assert!(toggle.created);
        assert_eq!(fs::read_to_string(&path).unwrap(), CONTENT_ONE);
    }

    #[test]
    fn test_toggle_alternates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CrashTest.cs");

        let written: Vec<_> = (0..4).map(|_| toggle_file(&path).unwrap().written).collect();

        assert_eq!(
            written,
            vec![
                ContentVariant::One,
                ContentVariant::Two,
                ContentVariant::One,
                ContentVariant::Two
            ]
        );
    }

    #[test]
    fn test_foreign_content_resets_to_one() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CrashTest.cs");
        fs::write(&path, "public class Something {}").unwrap();

        let toggle = toggle_file(&path).unwrap();

        assert_eq!(toggle.written, ContentVariant::One);
        assert!(!toggle.created);
    }

    #[test]
    fn test_missing_parent_dir_is_write_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("no-such-dir").join("CrashTest.cs");

        let err = toggle_file(&path).unwrap_err();
        assert!(matches!(err, TesterError::FileWrite { .. }));
    }

    #[test]
    fn test_variants_differ_only_in_method() {
        assert!(ContentVariant::One.text().contains("public void Test() \n"));
        assert!(ContentVariant::Two.text().contains("public void TestTwo() \n"));
        assert_eq!(ContentVariant::next_after(Some(CONTENT_TWO)), ContentVariant::One);
    }

    #[test]
    fn test_file_from_older_tester_run_advances_to_two() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CrashTest.cs");
        let previous = "\nusing Godot;\n\npublic class CrashTest \n{\n    public void Test() \n    {\n        GD.Print(\"Test\");\n    }\n}\n";
        fs::write(&path, previous).unwrap();

        let toggle = toggle_file(&path).unwrap();

        assert_eq!(toggle.written, ContentVariant::Two);
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains("public void TestTwo() \n"));
    }
}
