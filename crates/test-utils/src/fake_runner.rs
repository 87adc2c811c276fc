use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use relwatch::errors::ExecError;
use relwatch::exec::{EnvMap, SequenceRunner};

/// One recorded `run_sequence` call.
#[derive(Debug, Clone)]
pub struct SequenceRecord {
    pub label: String,
    pub commands: Vec<String>,
    pub env: EnvMap,
    pub kill_seq: Vec<String>,
}

/// A fake sequence runner that:
/// - records every sequence it is asked to run
/// - succeeds, unless the sequence label is marked as failing.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    records: Arc<Mutex<Vec<SequenceRecord>>>,
    failing: HashSet<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded sequences; clone before moving the
    /// runner into an orchestrator.
    pub fn records(&self) -> Arc<Mutex<Vec<SequenceRecord>>> {
        Arc::clone(&self.records)
    }

    /// Make sequences with this label fail with a non-zero exit.
    pub fn fail_label(mut self, label: &str) -> Self {
        self.failing.insert(label.to_string());
        self
    }
}

impl SequenceRunner for RecordingRunner {
    fn run_sequence(
        &mut self,
        label: String,
        commands: Vec<String>,
        env: EnvMap,
        kill_seq: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<(), ExecError>> + Send + '_>> {
        let records = Arc::clone(&self.records);
        let fail = self.failing.contains(&label);

        Box::pin(async move {
            let first_command = commands.first().cloned().unwrap_or_default();
            records.lock().unwrap().push(SequenceRecord {
                label,
                commands,
                env,
                kill_seq,
            });
            if fail {
                Err(ExecError::NonZeroExit {
                    command: first_command,
                    code: 1,
                })
            } else {
                Ok(())
            }
        })
    }
}

/// Flat list of `(label, command)` pairs in execution order.
pub fn executed_commands(records: &Arc<Mutex<Vec<SequenceRecord>>>) -> Vec<(String, String)> {
    records
        .lock()
        .unwrap()
        .iter()
        .flat_map(|record| {
            record
                .commands
                .iter()
                .map(|cmd| (record.label.clone(), cmd.clone()))
                .collect::<Vec<_>>()
        })
        .collect()
}
