mod config;
#[cfg(feature = "connectors-hdfs_ha")]
mod hdfs_ha;

pub use self::config::*;
#[cfg(feature = "connectors-hdfs_ha")]
pub use self::hdfs_ha::*;

pub trait InternalEvent: Sized {
    fn emit(self);
}

pub fn emit(event: impl InternalEvent) {
    event.emit();
}

#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::internal_events::emit($event)
    };
}
