use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// What gets handed to job creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobInput {
    Files(Vec<PathBuf>),
    Folder(PathBuf),
}

/// External job-creation collaborator. This crate never creates jobs itself.
pub trait JobSink {
    fn create_job(&mut self, input: JobInput) -> Result<()>;
}

/// Either a set of files or a single folder, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    selected_files: BTreeSet<PathBuf>,
    selected_folder: Option<PathBuf>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or remove one file. Always clears the folder selection.
    pub fn select_file(&mut self, path: &Path, is_selected: bool) {
        self.selected_folder = None;
        if is_selected {
            self.selected_files.insert(path.to_path_buf());
        } else {
            self.selected_files.remove(path);
        }
    }

    /// Set or clear the folder. Always clears the file selection.
    pub fn select_folder(&mut self, path: Option<&Path>) {
        self.selected_files.clear();
        self.selected_folder = path.map(Path::to_path_buf);
    }

    pub fn clear(&mut self) {
        self.selected_files.clear();
        self.selected_folder = None;
    }

    pub fn selected_files(&self) -> &BTreeSet<PathBuf> {
        &self.selected_files
    }

    pub fn selected_folder(&self) -> Option<&Path> {
        self.selected_folder.as_deref()
    }

    pub fn is_file_selected(&self, path: &Path) -> bool {
        self.selected_files.contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.selected_files.is_empty() && self.selected_folder.is_none()
    }

    /// The current selection in job form, or `None` if nothing is selected.
    pub fn job_input(&self) -> Option<JobInput> {
        if let Some(folder) = &self.selected_folder {
            return Some(JobInput::Folder(folder.clone()));
        }
        if self.selected_files.is_empty() {
            None
        } else {
            Some(JobInput::Files(self.selected_files.iter().cloned().collect()))
        }
    }
}
