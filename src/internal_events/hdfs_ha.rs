use super::InternalEvent;

#[derive(Debug)]
pub struct HdfsHaConnectorResolved<'a> {
    pub current_host: &'a str,
    pub high_availability: bool,
}

impl InternalEvent for HdfsHaConnectorResolved<'_> {
    fn emit(self) {
        info!(
            message = "Using hdfs hosts.",
            current_host = %self.current_host,
            high_availability = self.high_availability,
        );
    }
}
