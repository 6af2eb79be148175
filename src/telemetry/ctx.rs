use anyhow::Result;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::{debug, error, info, warn, Span};

use super::{config, emit};
use crate::ingestion::types::CycleSummary;

pub trait PhaseSpan {
    fn name(&self) -> &'static str;
    fn span(&self) -> Span;
}

pub trait OpMarker {
    const NAME: &'static str;
    type Phase: PhaseSpan;
    fn root_span() -> Span;
}

/// Typed logging handle for one operation; JSON log lines carry `op`.
pub struct LogCtx<O: OpMarker> {
    pub(crate) json: bool,
    pub(crate) _marker: PhantomData<O>,
}

impl<O: OpMarker> LogCtx<O> {
    pub(crate) fn new() -> Self { LogCtx { json: config::logs_are_json(), _marker: PhantomData } }

    fn op_name(&self) -> &'static str { O::NAME }

    pub fn root_span(&self) -> Span { O::root_span() }

    pub fn root_span_kv<'a, T>(&self, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.root_span();
        let details = kv_to_string(fields);
        if details.is_empty() {
            debug!(op = %self.op_name(), "start");
        } else {
            debug!(op = %self.op_name(), details = %details, "start");
        }
        span
    }

    pub fn span(&self, ph: &O::Phase) -> Span { ph.span() }

    pub fn span_kv<'a, T>(&self, ph: &O::Phase, fields: T) -> Span
    where
        T: IntoIterator<Item = (&'a str, String)>,
    {
        let span = self.span(ph);
        debug!(op = %self.op_name(), phase = ph.name(), details = %kv_to_string(fields), "span_start");
        span
    }

    pub fn info(&self, msg: impl AsRef<str>) { if self.json { info!(op = %self.op_name(), "{}", msg.as_ref()); } else { info!("{}", msg.as_ref()); } }
    pub fn error(&self, msg: impl AsRef<str>) { if self.json { error!(op = %self.op_name(), "{}", msg.as_ref()); } else { error!("{}", msg.as_ref()); } }

    pub fn debug_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { debug!(op = %self.op_name(), details = %details, "{}", msg); }
        else { debug!("{} {}", msg, details); }
    }

    pub fn warn_kv<'a, D>(&self, msg: &str, kv: D)
    where
        D: IntoIterator<Item = (&'a str, String)>,
    {
        let details = kv_to_string(kv);
        if self.json { warn!(op = %self.op_name(), details = %details, "{}", msg); }
        else { warn!("{} {}", msg, details); }
    }

    /// Structured result on stdout; no-op unless `--json` was given.
    pub fn result<T: Serialize>(&self, result: &T) -> Result<()> {
        if !config::json_mode() { return Ok(()); }
        emit::print_result(self.op_name(), result)
    }
}

impl LogCtx<crate::telemetry::ops::agg::Agg> {
    pub fn cycle_summary(&self, s: &CycleSummary) {
        if self.json {
            info!(op = %self.op_name(), feed_id = %s.feed_id, url = %s.url, items = s.items, created = s.created,
                duplicates = s.duplicates, skipped = s.skipped, errors = s.errors, undated = s.undated, "cycle_summary");
        } else {
            info!("✅ {} — items={} created={} duplicates={} skipped={} errors={} undated={}",
                s.feed_name, s.items, s.created, s.duplicates, s.skipped, s.errors, s.undated);
        }
    }
}

fn kv_to_string<'a, T>(kv: T) -> String
where
    T: IntoIterator<Item = (&'a str, String)>,
{
    kv.into_iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::kv_to_string;

    #[test]
    fn kv_pairs_join_with_spaces() {
        let s = kv_to_string([("feed", "a".to_string()), ("items", 3.to_string())]);
        assert_eq!(s, "feed=a items=3");
        assert_eq!(kv_to_string(Vec::<(&str, String)>::new()), "");
    }
}
