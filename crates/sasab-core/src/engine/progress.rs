#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    BatchStart { total_files: u64 },
    BatchFinish,

    FileStart { file_name: String, output_name: String },
    FileFinish { succeeded: bool },

    /// Human-readable note about the current file, e.g. why it failed.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::BatchFinish);
    }

    #[test]
    fn reporter_forwards_events_in_order() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        reporter.report(Progress::BatchStart { total_files: 2 });
        reporter.report(Progress::Message("hello".to_string()));
        drop(reporter);

        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::BatchStart { total_files: 2 },
                Progress::Message("hello".to_string()),
            ]
        );
    }
}
