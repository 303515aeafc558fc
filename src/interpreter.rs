use std::sync::Arc;

use crate::{
    bitmap::decode::{BitmapDecoder, DibDecoder},
    config::{ErrorPolicy, ReplaySettings},
    foundation::error::{WmfError, WmfResult},
    record::{opcode, store::RecordStore},
    registry::CommandRegistry,
    replay::{context::ReplayContext, surface::DrawSurface},
};

/// A record that failed to decode or replay.
#[derive(Debug)]
pub struct RecordFailure {
    /// Position of the record in the stream.
    pub index: usize,
    pub opcode: u16,
    pub error: WmfError,
}

/// Per-session counters.
#[derive(Debug, Default)]
pub struct ReplayReport {
    /// Records visited, including failed and unknown ones.
    pub records: usize,
    pub replayed: usize,
    pub unknown: usize,
    pub failures: Vec<RecordFailure>,
}

impl ReplayReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Decodes and replays a record sequence against one fresh [`ReplayContext`].
pub struct Interpreter {
    settings: ReplaySettings,
    scale: (f64, f64),
    decoder: Arc<dyn BitmapDecoder>,
}

impl Interpreter {
    pub fn new(settings: ReplaySettings) -> Self {
        Self {
            settings,
            scale: (1.0, 1.0),
            decoder: Arc::new(DibDecoder),
        }
    }

    /// Logical-to-device scale applied to every command.
    pub fn with_scale(mut self, x: f64, y: f64) -> Self {
        self.scale = (x, y);
        self
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn BitmapDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn settings(&self) -> &ReplaySettings {
        &self.settings
    }

    /// Replay `records` in order. Failures are collected in the report unless the settings ask
    /// to stop, in which case the first one is returned.
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    pub fn run(
        &self,
        records: &[RecordStore],
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<ReplayReport> {
        let mut ctx = ReplayContext::with_decoder(Arc::clone(&self.decoder));
        self.run_with(&mut ctx, records, surface)
    }

    /// Like [`Interpreter::run`], against a caller-owned context.
    pub fn run_with(
        &self,
        ctx: &mut ReplayContext,
        records: &[RecordStore],
        surface: &mut dyn DrawSurface,
    ) -> WmfResult<ReplayReport> {
        ctx.sync(surface);
        let limit = self.settings.max_records.unwrap_or(usize::MAX);
        let mut report = ReplayReport::default();

        for (index, record) in records.iter().enumerate() {
            if report.records >= limit {
                tracing::debug!(limit, "record limit reached");
                break;
            }
            report.records += 1;
            let op = record.opcode();
            if op == opcode::EOF {
                break;
            }

            let outcome = CommandRegistry::decode(record).and_then(|mut cmd| {
                if cmd.is_unknown() {
                    report.unknown += 1;
                    tracing::debug!(index, opcode = format_args!("0x{op:04x}"), "unknown record");
                }
                cmd.set_scale(self.scale.0, self.scale.1);
                tracing::trace!(index, name = cmd.name(), "replay");
                cmd.replay(ctx, surface)
            });

            match outcome {
                Ok(()) => report.replayed += 1,
                Err(error) => {
                    tracing::warn!(
                        index,
                        opcode = format_args!("0x{op:04x}"),
                        %error,
                        "record failed"
                    );
                    if self.settings.on_error == ErrorPolicy::Stop {
                        return Err(error);
                    }
                    report.failures.push(RecordFailure {
                        index,
                        opcode: op,
                        error,
                    });
                }
            }
        }

        tracing::debug!(
            records = report.records,
            replayed = report.replayed,
            unknown = report.unknown,
            failed = report.failures.len(),
            "replay finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "../tests/unit/interpreter.rs"]
mod tests;
