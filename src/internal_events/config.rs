use std::path::Path;

use super::InternalEvent;

#[derive(Debug)]
pub struct ConfigLoaded<'a> {
    pub path: &'a Path,
    pub connectors: usize,
}

impl InternalEvent for ConfigLoaded<'_> {
    fn emit(self) {
        info!(
            message = "Configuration loaded.",
            path = %self.path.display(),
            connectors = self.connectors,
        );
    }
}

#[derive(Debug)]
pub struct ConfigInvalid<'a> {
    pub error: &'a str,
}

impl InternalEvent for ConfigInvalid<'_> {
    fn emit(self) {
        error!(message = "Configuration error.", error = %self.error);
    }
}
