use tracing::Span;
use tracing::info_span;

use crate::telemetry::ctx::{OpMarker, PhaseSpan};

#[derive(Copy, Clone, Debug)]
pub struct Feed;

#[derive(Copy, Clone, Debug)]
pub enum Phase { Add, List, Follow, Unfollow, Following }

impl PhaseSpan for Phase {
    fn name(&self) -> &'static str { match self {
        Phase::Add => "add",
        Phase::List => "list",
        Phase::Follow => "follow",
        Phase::Unfollow => "unfollow",
        Phase::Following => "following",
    }}
    fn span(&self) -> Span { match self {
        Phase::Add => info_span!("add"),
        Phase::List => info_span!("list"),
        Phase::Follow => info_span!("follow"),
        Phase::Unfollow => info_span!("unfollow"),
        Phase::Following => info_span!("following"),
    }}
}

impl OpMarker for Feed {
    const NAME: &'static str = "feed";
    type Phase = Phase;
    fn root_span() -> Span { info_span!("feed") }
}
