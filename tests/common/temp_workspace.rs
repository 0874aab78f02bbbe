use std::path::PathBuf;

use rag_chat::config::Settings;
use rag_chat::host::{EditorContext, EditorSelection, WorkspaceHost};
use tempfile::TempDir;

/// Represents a test fixture with files and an optional editor position.
#[derive(Debug)]
pub struct Fixture {
    /// files in fixture
    pub files: Vec<(PathBuf, String)>,
    /// Active document, derived from `$0` markers
    pub active: Option<EditorContext>,
}

/// Parses a fixture into file contents and paths.
///
/// Files start with a `//- path` line. One `$0` marks the cursor line of
/// the active document; two `$0` markers select the lines between them,
/// inclusive.
/// ## Panics
/// if markers span more than one file
pub fn parse_fixture(input: &str) -> Fixture {
    let mut files = Vec::new();
    let mut current_path: Option<PathBuf> = None;
    let mut current_content = String::new();

    let mut markers: Vec<(PathBuf, u32)> = Vec::new();

    for line in input.lines() {
        if let Some(path) = line.strip_prefix("//- ") {
            if let Some(p) = current_path.take() {
                files.push((p, current_content.clone()));
            }
            current_content.clear();
            // Store relative path (trim leading slash)
            current_path = Some(PathBuf::from(path.trim_start_matches('/')));
        } else {
            let mut l = line.to_string();
            if l.contains("$0") {
                // 0-based, like the editor reports it
                let line_no = u32::try_from(current_content.lines().count())
                    .expect("line count out of range");
                let path = current_path.clone().expect("marker before any //- path");
                for _ in 0..l.matches("$0").count() {
                    markers.push((path.clone(), line_no));
                }
                l = l.replace("$0", "");
            }
            current_content.push_str(&l);
            current_content.push('\n');
        }
    }

    if let Some(p) = current_path {
        files.push((p, current_content));
    }

    let active = match markers.as_slice() {
        [] => None,
        [(path, line)] => Some(context(path, EditorSelection::cursor(*line))),
        [(path, start), (other, end)] => {
            assert_eq!(path, other, "selection markers must be in one file");
            Some(context(path, EditorSelection::lines(*start, *end)))
        }
        _ => panic!("at most two $0 markers are supported"),
    };

    Fixture { files, active }
}

fn context(path: &PathBuf, selection: EditorSelection) -> EditorContext {
    EditorContext {
        relative_path: path.to_string_lossy().into_owned(),
        selection: Some(selection),
    }
}

/// Files written into a temporary workspace.
pub struct TestWorkspace {
    /// Temporary folder for the workspace
    pub root: TempDir,
    /// fixture for the workspace
    pub fixture: Fixture,
    /// Canonicalized root path (resolves symlinks like /var -> /private/var on macOS)
    canonical_root: PathBuf,
}

impl TestWorkspace {
    /// creates new workspace
    /// ## Panics
    /// if the files cannot be written
    pub fn new(fixture: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let fixture = parse_fixture(fixture);

        for (path, content) in &fixture.files {
            // path is already relative, just join with root
            let abs = root.path().join(path);
            std::fs::create_dir_all(abs.parent().unwrap()).unwrap();
            std::fs::write(&abs, content).unwrap();
        }

        let canonical_root = root
            .path()
            .canonicalize()
            .expect("Failed to canonicalize root");

        Self {
            root,
            fixture,
            canonical_root,
        }
    }

    /// Returns the canonicalized root path
    pub fn canonical_root(&self) -> &PathBuf {
        &self.canonical_root
    }

    /// Converts a relative path to an absolute path
    pub fn apath(&self, path: &str) -> PathBuf {
        self.canonical_root.join(path)
    }

    /// Writes `settings` as the workspace settings file and returns its path.
    pub fn write_settings(&self, settings: &Settings) -> PathBuf {
        let path = self.apath(rag_chat::config::SETTINGS_FILE);
        let mut document = serde_json::Map::new();
        document.insert(
            rag_chat::config::NAMESPACE.to_string(),
            serde_json::to_value(settings).unwrap(),
        );
        std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
        path
    }

    /// A filesystem host over this workspace with the fixture's active document.
    pub fn host(&self) -> WorkspaceHost {
        let mut host = WorkspaceHost::new(Some(self.canonical_root.clone()))
            .settings_file(self.apath(rag_chat::config::SETTINGS_FILE))
            .context_lines(0);
        if let Some(active) = &self.fixture.active {
            host = host.active_document(active.clone());
        }
        host
    }
}
