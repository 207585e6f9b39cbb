use std::path::{Path, PathBuf};

/// Locations of the files the provider switch reads and rewrites,
/// all derived from the project root.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the schema; relative `file:` locators resolve against it.
    pub fn schema_dir(&self) -> PathBuf {
        self.root.join("prisma")
    }

    pub fn schema(&self) -> PathBuf {
        self.schema_dir().join("schema.prisma")
    }

    pub fn env_file(&self) -> PathBuf {
        self.root.join(".env")
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.schema_dir().join("migrations")
    }

    pub fn embedded_database(&self) -> PathBuf {
        self.schema_dir().join("dev.db")
    }

    /// The embedded database plus the journal files SQLite keeps beside it.
    pub fn embedded_database_files(&self) -> Vec<PathBuf> {
        let db = self.embedded_database();
        let mut files = vec![db.clone()];
        for suffix in ["-journal", "-wal", "-shm"] {
            let mut name = db.clone().into_os_string();
            name.push(suffix);
            files.push(PathBuf::from(name));
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_prisma_layout_from_root() {
        let paths = ProjectPaths::new("/srv/app");
        assert_eq!(paths.schema(), PathBuf::from("/srv/app/prisma/schema.prisma"));
        assert_eq!(paths.env_file(), PathBuf::from("/srv/app/.env"));
        assert_eq!(
            paths.migrations_dir(),
            PathBuf::from("/srv/app/prisma/migrations")
        );
        assert_eq!(
            paths.embedded_database(),
            PathBuf::from("/srv/app/prisma/dev.db")
        );
    }

    #[test]
    fn sidecar_files_follow_database_name() {
        let paths = ProjectPaths::new("app");
        let files = paths.embedded_database_files();
        assert_eq!(files.len(), 4);
        assert!(files.contains(&PathBuf::from("app/prisma/dev.db-wal")));
        assert!(files.contains(&PathBuf::from("app/prisma/dev.db-journal")));
    }
}
