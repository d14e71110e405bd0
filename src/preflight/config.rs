//! Rule-set configuration.
//!
//! A [`PreflightConfiguration`] names the processes a run executes, in order:
//! document-level processes run once per document, page-level processes once
//! per page. The value is immutable for the lifetime of a run and shared
//! read-only by all validators; swapping it selects a different conformance
//! profile without touching engine code.

/// Named validation processes the pipeline can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessName {
    /// Trailer / cross-reference consistency (document level)
    Trailer,
    /// Catalog and page-tree walk (document level, drives page processes)
    PageTree,
    /// Page additional actions
    Actions,
    /// Page annotations
    Annotations,
    /// Color spaces declared in page resources
    ColorSpaces,
    /// Fonts, XObjects and graphics states in page resources
    Resources,
    /// Thumbnail and other page-attached graphic objects
    GraphicObjects,
    /// Page transparency group attribute
    GroupTransparency,
    /// Content stream replay
    ContentStream,
}

/// Immutable process registry for one conformance profile.
#[derive(Debug, Clone)]
pub struct PreflightConfiguration {
    document_processes: Vec<ProcessName>,
    page_processes: Vec<ProcessName>,
}

impl Default for PreflightConfiguration {
    /// The archival (PDF/A-1b style) profile: every process enabled.
    fn default() -> Self {
        Self {
            document_processes: vec![ProcessName::Trailer, ProcessName::PageTree],
            page_processes: vec![
                ProcessName::Actions,
                ProcessName::Annotations,
                ProcessName::ColorSpaces,
                ProcessName::Resources,
                ProcessName::GraphicObjects,
                ProcessName::GroupTransparency,
                ProcessName::ContentStream,
            ],
        }
    }
}

impl PreflightConfiguration {
    /// Replace the document-level process list.
    pub fn with_document_processes(mut self, processes: Vec<ProcessName>) -> Self {
        self.document_processes = processes;
        self
    }

    /// Replace the page-level process list.
    pub fn with_page_processes(mut self, processes: Vec<ProcessName>) -> Self {
        self.page_processes = processes;
        self
    }

    /// Remove one process from both lists.
    pub fn without_process(mut self, process: ProcessName) -> Self {
        self.document_processes.retain(|p| *p != process);
        self.page_processes.retain(|p| *p != process);
        self
    }

    /// Document-level processes in execution order.
    pub fn document_processes(&self) -> &[ProcessName] {
        &self.document_processes
    }

    /// Page-level processes in execution order.
    pub fn page_processes(&self) -> &[ProcessName] {
        &self.page_processes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_runs_everything() {
        let config = PreflightConfiguration::default();
        assert_eq!(
            config.document_processes(),
            &[ProcessName::Trailer, ProcessName::PageTree]
        );
        assert_eq!(config.page_processes().len(), 7);
    }

    #[test]
    fn test_without_process() {
        let config = PreflightConfiguration::default().without_process(ProcessName::ContentStream);
        assert!(!config.page_processes().contains(&ProcessName::ContentStream));
        assert_eq!(config.document_processes().len(), 2);
    }

    #[test]
    fn test_custom_profile() {
        let config = PreflightConfiguration::default()
            .with_document_processes(vec![ProcessName::Trailer]);
        assert_eq!(config.document_processes(), &[ProcessName::Trailer]);
    }
}
