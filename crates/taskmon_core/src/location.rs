use std::fmt;

/// Search prefix that widens a gallery search to every folder.
pub const GLOBAL_SEARCH_PREFIX: &str = "g:";

/// Where the browser currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewLocation {
    /// The folder-tree root (`/`). Has no gallery to refresh.
    #[default]
    FolderTree,
    /// A gallery for one folder, path relative to the collection root.
    Gallery(String),
}

impl ViewLocation {
    /// Parses a browser pathname: `/` is the folder tree, `/a/b` is the
    /// gallery of `a/b`. Leading and trailing slashes are ignored.
    pub fn from_pathname(pathname: &str) -> Self {
        let trimmed = pathname.trim().trim_matches('/');
        if trimmed.is_empty() {
            Self::FolderTree
        } else {
            Self::Gallery(trimmed.to_string())
        }
    }

    /// Location of a folder path as stored in bookmarks (empty means root).
    pub fn for_folder(folder: &str) -> Self {
        Self::from_pathname(folder)
    }

    pub fn pathname(&self) -> String {
        match self {
            Self::FolderTree => "/".to_string(),
            Self::Gallery(path) => format!("/{path}"),
        }
    }

    pub fn is_gallery(&self) -> bool {
        matches!(self, Self::Gallery(_))
    }
}

impl fmt::Display for ViewLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pathname())
    }
}

/// What a processing job covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every folder; used for global searches.
    AllFolders,
    Folder(String),
}

impl Scope {
    /// Resolves the scope for a view. The folder-tree root has none.
    pub fn for_view(location: &ViewLocation, search_query: &str) -> Option<Self> {
        match location {
            ViewLocation::FolderTree => None,
            ViewLocation::Gallery(_) if is_global_search(search_query) => Some(Self::AllFolders),
            ViewLocation::Gallery(path) => Some(Self::Folder(path.clone())),
        }
    }

    /// Path sent to the server; all folders is the empty path.
    pub fn request_path(&self) -> &str {
        match self {
            Self::AllFolders => "",
            Self::Folder(path) => path,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllFolders => f.write_str("<all folders>"),
            Self::Folder(path) => write!(f, "/{path}"),
        }
    }
}

pub fn is_global_search(query: &str) -> bool {
    query
        .trim()
        .to_lowercase()
        .starts_with(GLOBAL_SEARCH_PREFIX)
}
