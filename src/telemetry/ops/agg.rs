use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Agg;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Cycle, SelectFeed, MarkFetched, Fetch, WritePost }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Cycle => "cycle",
        Phase::SelectFeed => "select_feed",
        Phase::MarkFetched => "mark_fetched",
        Phase::Fetch => "fetch",
        Phase::WritePost => "write_post",
    }}
    fn span(&self) -> Span { match self {
        Phase::Cycle => info_span!("cycle"),
        Phase::SelectFeed => info_span!("select_feed"),
        Phase::MarkFetched => info_span!("mark_fetched"),
        Phase::Fetch => info_span!("fetch"),
        Phase::WritePost => info_span!("write_post"),
    }}
}

impl OpMarker for Agg {
    const NAME: &'static str = "agg";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("agg") }
}
